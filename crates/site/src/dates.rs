use time::{format_description::BorrowedFormatItem, macros::format_description, Date, Month};

/// `YYYYMMDD`, as NASA POWER takes and returns dates
const COMPACT: &[BorrowedFormatItem<'static>] = format_description!("[year][month][day]");
/// `YYYY-MM-DD`, as dates are shown and sent to the chart
const ISO: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("'{0}' is not a YYYYMMDD date")]
    Compact(String),
    #[error("start {start} is after end {end}")]
    Reversed { start: String, end: String },
}

pub fn parse_compact(raw: &str) -> Result<Date, Error> {
    let trimmed = raw.trim();
    if trimmed.len() != 8 {
        return Err(Error::Compact(trimmed.to_string()));
    }
    Date::parse(trimmed, COMPACT).map_err(|_| Error::Compact(trimmed.to_string()))
}

pub fn format_compact(date: Date) -> String {
    date.format(COMPACT).unwrap_or_default()
}

pub fn format_iso(date: Date) -> String {
    date.format(ISO).unwrap_or_default()
}

/// Inclusive span of days requested from NASA POWER
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Result<Self, Error> {
        if start > end {
            return Err(Error::Reversed {
                start: format_compact(start),
                end: format_compact(end),
            });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, Error> {
        Self::new(parse_compact(start)?, parse_compact(end)?)
    }

    pub fn start_compact(&self) -> String {
        format_compact(self.start)
    }

    pub fn end_compact(&self) -> String {
        format_compact(self.end)
    }
}

/// `years_back` years up to and including `today`. A Feb 29 start that
/// doesn't exist in the earlier year becomes Feb 28.
pub fn default_date_range(years_back: u8, today: Date) -> DateRange {
    let year = today.year() - i32::from(years_back);
    let start = Date::from_calendar_date(year, today.month(), today.day())
        .or_else(|_| Date::from_calendar_date(year, Month::February, 28))
        .unwrap_or(today);
    DateRange { start, end: today }
}
