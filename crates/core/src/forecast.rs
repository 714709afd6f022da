use serde::{Deserialize, Serialize};

/// One day of the chart payload: the observed value and/or the model estimate
///
/// `hist` and `yhat` are independently optional; a missing value is a gap in
/// that series, never a zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ForecastPoint {
    /// ISO date, `YYYY-MM-DD`
    pub date: String,
    #[serde(default)]
    pub hist: Option<f64>,
    #[serde(default)]
    pub yhat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yhat_lower: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yhat_upper: Option<f64>,
}

impl ForecastPoint {
    pub fn new(date: impl Into<String>, hist: Option<f64>, yhat: Option<f64>) -> Self {
        Self {
            date: date.into(),
            hist,
            yhat,
            yhat_lower: None,
            yhat_upper: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nulls_and_absent_fields_are_gaps() {
        let points: Vec<ForecastPoint> = serde_json::from_str(
            r#"[{"date": "2025-01-01", "hist": 0.4, "yhat": null},
                {"date": "2025-01-02", "yhat": 0.5, "yhat_lower": 0.4, "yhat_upper": 0.6}]"#,
        )
        .unwrap();
        assert_eq!(points[0].yhat, None);
        assert_eq!(points[1].hist, None);
        assert_eq!(points[1].yhat_upper, Some(0.6));
    }

    #[test]
    fn serializes_gaps_as_null() {
        let json = serde_json::to_string(&ForecastPoint::new("2025-01-01", None, Some(1.5))).unwrap();
        assert_eq!(json, r#"{"date":"2025-01-01","hist":null,"yhat":1.5}"#);
    }
}
