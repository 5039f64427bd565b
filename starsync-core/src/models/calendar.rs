use chrono::{Datelike, NaiveDate};

use crate::keys;

/// One calendar day in the date dimension.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct DimDate {
    pub date_key: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub year: i64,
    pub quarter: i64,
    pub month: i64,
    pub day_of_month: i64,
    /// ISO weekday, Monday = 1 through Sunday = 7
    pub day_of_week: i64,
    pub is_weekend: i64,
}

impl DimDate {
    pub fn from_date(date: NaiveDate) -> Self {
        let day_of_week = i64::from(date.weekday().number_from_monday());
        let month = i64::from(date.month());

        Self {
            date_key: keys::date_key(date),
            date: date.format("%Y-%m-%d").to_string(),
            year: i64::from(date.year()),
            quarter: (month - 1) / 3 + 1,
            month,
            day_of_month: i64::from(date.day()),
            day_of_week,
            is_weekend: i64::from(day_of_week >= 6),
        }
    }
}

/// Parses a `YYYYMMDD` date key back into a date.
pub fn parse_date_key(date_key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_key, "%Y%m%d").ok()
}
