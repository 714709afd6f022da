//! Additive trend + seasonality regression
//!
//! The model is `y(t) = a + b·t + weekly(t) + yearly(t)`, with each
//! seasonal component a truncated Fourier series. Coefficients come from a
//! ridge-regularised least-squares fit in which only the seasonal terms are
//! penalised. The 80% band is the residual spread, widened with distance
//! past the last observation.

use std::f64::consts::PI;

use nalgebra::{DMatrix, DVector};
use time::{Date, Duration};

use super::series::SeriesPoint;

/// Below this many observations no forecast is produced
pub const MIN_HISTORY_POINTS: usize = 20;
pub const MAX_HORIZON_DAYS: u32 = 3650;

const WEEKLY_ORDER: usize = 3;
const YEARLY_ORDER: usize = 10;
const WEEK_DAYS: f64 = 7.0;
const YEAR_DAYS: f64 = 365.25;
const RIDGE: f64 = 0.1;
/// Two-sided 80% normal quantile
const INTERVAL_Z: f64 = 1.2816;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("horizon of {0} days is longer than the {MAX_HORIZON_DAYS} day limit")]
    Horizon(u32),
    #[error("trend and seasonality could not be separated for this series")]
    Singular,
}

/// Which seasonal components to fit. `daily` is accepted for parity with
/// sub-daily models but has nothing to fit on one value per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seasonality {
    pub daily: bool,
    pub weekly: bool,
    pub yearly: bool,
}

impl Default for Seasonality {
    fn default() -> Self {
        Self {
            daily: true,
            weekly: true,
            yearly: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    pub date: Date,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

struct Design {
    origin: Date,
    span_days: f64,
    seasonality: Seasonality,
}

impl Design {
    fn features(&self, date: Date) -> Vec<f64> {
        let t = (date - self.origin).whole_days() as f64;
        let mut row = vec![1.0, t / self.span_days];
        if self.seasonality.weekly {
            push_fourier(&mut row, t, WEEK_DAYS, WEEKLY_ORDER);
        }
        if self.seasonality.yearly {
            push_fourier(&mut row, t, YEAR_DAYS, YEARLY_ORDER);
        }
        row
    }

    /// Intercept and trend are free, seasonal terms are shrunk.
    fn penalties(&self, width: usize) -> Vec<f64> {
        (0..width)
            .map(|i| if i < 2 { 0.0 } else { RIDGE })
            .collect()
    }
}

fn push_fourier(row: &mut Vec<f64>, t: f64, period: f64, order: usize) {
    for k in 1..=order {
        let angle = 2.0 * PI * k as f64 * t / period;
        row.push(angle.sin());
        row.push(angle.cos());
    }
}

/// Fit on `series` and return one row per observed date followed by one per
/// day of the horizon. Fewer than [`MIN_HISTORY_POINTS`] usable points give
/// an empty result rather than an error.
pub fn make_forecast(
    series: &[SeriesPoint],
    horizon_days: u32,
    seasonality: Seasonality,
) -> Result<Vec<ForecastRow>, Error> {
    if horizon_days > MAX_HORIZON_DAYS {
        return Err(Error::Horizon(horizon_days));
    }

    let mut history: Vec<(Date, f64)> = series
        .iter()
        .filter(|p| p.value.is_finite())
        .map(|p| (p.date, p.value))
        .collect();
    history.sort_by_key(|(date, _)| *date);
    history.dedup_by_key(|(date, _)| *date);
    if history.len() < MIN_HISTORY_POINTS {
        return Ok(Vec::new());
    }

    let origin = history[0].0;
    let last = history[history.len() - 1].0;
    let design = Design {
        origin,
        span_days: (last - origin).whole_days().max(1) as f64,
        seasonality,
    };

    // fit on a unit scale so the ridge strength doesn't depend on the units
    let scale = history
        .iter()
        .map(|(_, v)| v.abs())
        .fold(0.0, f64::max);
    let scale = if scale > 0.0 { scale } else { 1.0 };

    let n = history.len();
    let features: Vec<Vec<f64>> = history.iter().map(|(d, _)| design.features(*d)).collect();
    let width = features[0].len();
    let x = DMatrix::from_row_iterator(n, width, features.into_iter().flatten());
    let y = DVector::from_iterator(n, history.iter().map(|(_, v)| v / scale));
    let beta = ridge_solve(&x, &y, &design.penalties(width))?;

    let sse = (&y - &x * &beta).norm_squared();
    let sigma = (sse / n.saturating_sub(width).max(1) as f64).sqrt() * scale;

    let future = (1..=i64::from(horizon_days)).filter_map(|k| last.checked_add(Duration::days(k)));
    let rows = history
        .iter()
        .map(|(date, _)| *date)
        .chain(future)
        .map(|date| {
            let yhat = DVector::from_vec(design.features(date)).dot(&beta) * scale;
            let ahead = (date - last).whole_days().max(0) as f64;
            let half_width = INTERVAL_Z * sigma * (1.0 + ahead / n as f64).sqrt();
            ForecastRow {
                date,
                yhat,
                yhat_lower: yhat - half_width,
                yhat_upper: yhat + half_width,
            }
        })
        .collect();
    Ok(rows)
}

/// Solve `(XᵀX + diag(penalties)) β = Xᵀy` through a Cholesky factorisation.
fn ridge_solve(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    penalties: &[f64],
) -> Result<DVector<f64>, Error> {
    let xt = x.transpose();
    let gram = &xt * x + DMatrix::from_diagonal(&DVector::from_column_slice(penalties));
    let rhs = &xt * y;

    let beta = gram.cholesky().ok_or(Error::Singular)?.solve(&rhs);
    if beta.iter().all(|b| b.is_finite()) {
        Ok(beta)
    } else {
        Err(Error::Singular)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn series(days: i64, value: impl Fn(f64) -> f64) -> Vec<SeriesPoint> {
        let start = date!(2024 - 01 - 01);
        (0..days)
            .map(|i| SeriesPoint {
                date: start + Duration::days(i),
                value: value(i as f64),
            })
            .collect()
    }

    #[test]
    fn too_little_history_gives_nothing() {
        let short = series(19, |_| 0.5);
        assert_eq!(make_forecast(&short, 30, Seasonality::default()), Ok(vec![]));
        assert_eq!(make_forecast(&[], 30, Seasonality::default()), Ok(vec![]));
    }

    #[test]
    fn returns_history_then_horizon() {
        let history = series(60, |t| 0.4 + 0.001 * t);
        let rows = make_forecast(&history, 30, Seasonality::default()).unwrap();
        assert_eq!(rows.len(), 90);
        assert_eq!(rows[0].date, date!(2024 - 01 - 01));
        assert_eq!(rows[59].date, date!(2024 - 02 - 29));
        assert_eq!(rows[89].date, date!(2024 - 03 - 30));
        assert!(rows.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn recovers_a_straight_line() {
        let history = series(90, |t| 2.0 + 0.01 * t);
        let rows = make_forecast(&history, 10, Seasonality::default()).unwrap();
        let last = rows.last().unwrap();
        // day 99
        assert!((last.yhat - 2.99).abs() < 1e-6, "{}", last.yhat);
        assert!(last.yhat_upper - last.yhat_lower < 1e-6);
    }

    #[test]
    fn follows_a_weekly_cycle() {
        let truth = |t: f64| 5.0 + (2.0 * PI * t / WEEK_DAYS).sin();
        let history = series(140, truth);
        let seasonality = Seasonality {
            yearly: false,
            ..Seasonality::default()
        };
        let rows = make_forecast(&history, 14, seasonality).unwrap();
        for row in &rows[140..] {
            let t = (row.date - date!(2024 - 01 - 01)).whole_days() as f64;
            assert!((row.yhat - truth(t)).abs() < 0.05, "{} vs {}", row.yhat, truth(t));
        }
    }

    #[test]
    fn interval_contains_estimate_and_widens_ahead() {
        let history = series(120, |t| 0.5 + 0.05 * (((t as i64 * 7919) % 13) as f64 / 13.0));
        let rows = make_forecast(&history, 60, Seasonality::default()).unwrap();
        for row in &rows {
            assert!(row.yhat_lower <= row.yhat && row.yhat <= row.yhat_upper);
        }
        let width = |r: &ForecastRow| r.yhat_upper - r.yhat_lower;
        assert!(width(&rows[179]) > width(&rows[119]));
        assert!((width(&rows[0]) - width(&rows[119])).abs() < 1e-12);
    }

    #[test]
    fn missing_days_and_duplicates_are_tolerated() {
        let mut history: Vec<SeriesPoint> = series(80, |t| 0.3 + 0.002 * t)
            .into_iter()
            .enumerate()
            .filter(|(i, _)| i % 3 != 0)
            .map(|(_, p)| p)
            .collect();
        history.push(history[5]);
        history.reverse();
        let rows = make_forecast(&history, 5, Seasonality::default()).unwrap();
        assert_eq!(rows.len(), 53 + 5);
        assert!(rows.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn absurd_horizon_is_rejected() {
        let history = series(30, |_| 1.0);
        assert_eq!(
            make_forecast(&history, MAX_HORIZON_DAYS + 1, Seasonality::default()),
            Err(Error::Horizon(MAX_HORIZON_DAYS + 1))
        );
    }

    #[test]
    fn unpenalised_empty_column_is_singular() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
        let y = DVector::from_column_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(ridge_solve(&x, &y, &[0.0, 0.0]), Err(Error::Singular));

        let beta = ridge_solve(&x, &y, &[0.0, 1.0]).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-12, "{}", beta[0]);
        assert!(beta[1].abs() < 1e-12);
    }

    #[test]
    fn constant_series_is_flat() {
        let history = series(40, |_| 0.0);
        let rows = make_forecast(&history, 3, Seasonality::default()).unwrap();
        assert!(rows.iter().all(|r| r.yhat.abs() < 1e-9));
    }
}
