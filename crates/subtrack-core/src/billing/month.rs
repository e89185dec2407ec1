//! Calendar month value type
//!
//! The atomic granularity of billing. Months are ordered by (year, month)
//! and render as `MM-YYYY`, the format used on the wire and in requests.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when constructing or parsing a [`CalendarMonth`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonthError {
    #[error("expected a month in MM-YYYY format, got '{0}'")]
    Malformed(String),

    #[error("month must be between 1 and 12, got {0}")]
    MonthOutOfRange(u32),

    #[error("year must be between {} and {}, got {0}", CalendarMonth::MIN_YEAR, CalendarMonth::MAX_YEAR)]
    YearOutOfRange(i32),
}

/// A (year, month) pair with month in 1..=12 and a four-digit year
///
/// Field order matters: the derived `Ord` compares year first, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarMonth {
    year: i32,
    month: u8,
}

impl CalendarMonth {
    pub const MIN_YEAR: i32 = 0;
    pub const MAX_YEAR: i32 = 9999;

    /// Create a calendar month, rejecting months outside 1..=12 and years
    /// that do not fit `MM-YYYY`
    pub fn new(year: i32, month: u32) -> Result<Self, MonthError> {
        if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) {
            return Err(MonthError::YearOutOfRange(year));
        }

        match u8::try_from(month) {
            Ok(m @ 1..=12) => Ok(Self { year, month: m }),
            _ => Err(MonthError::MonthOutOfRange(month)),
        }
    }

    /// Calendar year
    #[inline]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month of the year (1..=12)
    #[inline]
    pub fn month(&self) -> u32 {
        u32::from(self.month)
    }

    /// Signed distance in months: `(a.year - b.year) * 12 + (a.month - b.month)`
    #[inline]
    pub fn diff(self, other: CalendarMonth) -> i64 {
        (i64::from(self.year) - i64::from(other.year)) * 12
            + (i64::from(self.month) - i64::from(other.month))
    }

    /// First day of the month, as stored in DATE columns
    pub fn first_day(&self) -> NaiveDate {
        // Years 0..=9999 are all inside chrono's range, so this never misses.
        NaiveDate::from_ymd_opt(self.year, self.month(), 1).unwrap_or(NaiveDate::MIN)
    }
}

impl TryFrom<NaiveDate> for CalendarMonth {
    type Error = MonthError;

    /// The month containing `date`; the day is discarded
    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        Self::new(date.year(), date.month())
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.month, self.year)
    }
}

impl FromStr for CalendarMonth {
    type Err = MonthError;

    /// Parse `MM-YYYY`: exactly two month digits and four year digits
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || MonthError::Malformed(s.to_string());

        let (mm, yyyy) = s.split_once('-').ok_or_else(malformed)?;
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());

        if mm.len() != 2 || yyyy.len() != 4 || !all_digits(mm) || !all_digits(yyyy) {
            return Err(malformed());
        }

        let month: u32 = mm.parse().map_err(|_| malformed())?;
        let year: i32 = yyyy.parse().map_err(|_| malformed())?;

        Self::new(year, month)
    }
}

impl TryFrom<String> for CalendarMonth {
    type Error = MonthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CalendarMonth> for String {
    fn from(month: CalendarMonth) -> Self {
        month.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let m: CalendarMonth = "07-2025".parse().unwrap();
        assert_eq!(m.year(), 2025);
        assert_eq!(m.month(), 7);
        assert_eq!(m.to_string(), "07-2025");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in ["", "7-2025", "07-25", "2025-07", "07/2025", "ab-2025", "07-2025-01", " 07-2025"] {
            assert!(
                matches!(input.parse::<CalendarMonth>(), Err(MonthError::Malformed(_))),
                "expected '{}' to be rejected",
                input
            );
        }
    }

    #[test]
    fn test_month_range() {
        assert_eq!(
            "13-2025".parse::<CalendarMonth>(),
            Err(MonthError::MonthOutOfRange(13))
        );
        assert_eq!(
            "00-2025".parse::<CalendarMonth>(),
            Err(MonthError::MonthOutOfRange(0))
        );
        assert!(CalendarMonth::new(2025, 12).is_ok());
        assert!(CalendarMonth::new(2025, 300).is_err());
    }

    #[test]
    fn test_ordering_is_year_then_month() {
        let dec_2024 = CalendarMonth::new(2024, 12).unwrap();
        let jan_2025 = CalendarMonth::new(2025, 1).unwrap();
        let feb_2025 = CalendarMonth::new(2025, 2).unwrap();

        assert!(dec_2024 < jan_2025);
        assert!(jan_2025 < feb_2025);
        assert_eq!(dec_2024.max(feb_2025), feb_2025);
    }

    #[test]
    fn test_diff() {
        let sep_2025 = CalendarMonth::new(2025, 9).unwrap();
        let mar_2026 = CalendarMonth::new(2026, 3).unwrap();

        assert_eq!(mar_2026.diff(sep_2025), 6);
        assert_eq!(sep_2025.diff(mar_2026), -6);
        assert_eq!(sep_2025.diff(sep_2025), 0);
    }

    #[test]
    fn test_date_round_trip() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 17).unwrap();
        let month = CalendarMonth::try_from(date).unwrap();

        assert_eq!(month.to_string(), "06-2025");
        assert_eq!(month.first_day(), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    }

    #[test]
    fn test_year_bounds() {
        assert_eq!(
            CalendarMonth::new(10_000, 1),
            Err(MonthError::YearOutOfRange(10_000))
        );
        assert_eq!(
            CalendarMonth::new(i32::MAX, 1),
            Err(MonthError::YearOutOfRange(i32::MAX))
        );
        assert!(CalendarMonth::new(-1, 6).is_err());

        let last = CalendarMonth::new(9999, 12).unwrap();
        assert_eq!(last.first_day(), NaiveDate::from_ymd_opt(9999, 12, 1).unwrap());
        let first = CalendarMonth::new(0, 1).unwrap();
        assert_eq!(first.first_day(), NaiveDate::from_ymd_opt(0, 1, 1).unwrap());

        let far = NaiveDate::from_ymd_opt(12_000, 3, 1).unwrap();
        assert!(CalendarMonth::try_from(far).is_err());
    }

    #[test]
    fn test_serde_uses_month_string() {
        let month = CalendarMonth::new(2026, 3).unwrap();
        assert_eq!(serde_json::to_string(&month).unwrap(), "\"03-2026\"");

        let parsed: CalendarMonth = serde_json::from_str("\"11-2024\"").unwrap();
        assert_eq!(parsed, CalendarMonth::new(2024, 11).unwrap());

        assert!(serde_json::from_str::<CalendarMonth>("\"2024-11\"").is_err());
    }
}
