//! Poll windows and zone-local day arithmetic.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeDelta, TimeZone};
use serde::{Deserialize, Serialize};

use crate::{PollwiseError, Result};

/// Grace band around "today", in epoch milliseconds (both bounds inclusive).
///
/// A stored next-poll time inside the band is considered fresh. The
/// all-zero window is a sentinel asking the estimator to derive the band
/// from its reference time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PollWindow {
    /// Lower bound (inclusive).
    pub lower: i64,
    /// Upper bound (inclusive).
    pub upper: i64,
}

impl PollWindow {
    /// The "derive from reference time" sentinel.
    pub const UNSET: Self = Self { lower: 0, upper: 0 };

    /// Creates a window, validating that `lower <= upper`.
    ///
    /// # Errors
    ///
    /// Returns an error if `lower > upper`.
    pub const fn new(lower: i64, upper: i64) -> Result<Self> {
        if lower > upper {
            return Err(PollwiseError::InvalidWindow { lower, upper });
        }
        Ok(Self { lower, upper })
    }

    /// Returns true for the `(0, 0)` sentinel.
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        self.lower == 0 && self.upper == 0
    }

    /// Returns true if `millis` lies within the window, bounds included.
    #[must_use]
    pub const fn contains(&self, millis: i64) -> bool {
        millis >= self.lower && millis <= self.upper
    }
}

impl std::fmt::Display for PollWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.lower, self.upper)
    }
}

/// Returns the first instant of `date` in `zone`.
///
/// When local midnight does not exist (a DST gap starting at midnight)
/// the day starts at the first valid local time after it; when it is
/// ambiguous the earlier instant wins.
pub fn start_of_day<Tz: TimeZone>(zone: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::MIN);
    match zone.from_local_datetime(&midnight) {
        LocalResult::Single(start) | LocalResult::Ambiguous(start, _) => start,
        LocalResult::None => (1..=96)
            .find_map(|quarter| {
                zone.from_local_datetime(&(midnight + TimeDelta::minutes(15 * quarter)))
                    .earliest()
            })
            .unwrap_or_else(|| zone.from_utc_datetime(&midnight)),
    }
}

/// Converts epoch milliseconds into the calendar date observed in `zone`.
///
/// # Errors
///
/// Returns an error if chrono cannot represent the timestamp.
pub fn local_date<Tz: TimeZone>(zone: &Tz, millis: i64) -> Result<NaiveDate> {
    DateTime::from_timestamp_millis(millis)
        .map(|utc| utc.with_timezone(zone).date_naive())
        .ok_or(PollwiseError::TimestampOutOfRange(millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_window_contains_bounds() {
        let window = PollWindow::new(100, 200).unwrap();
        assert!(window.contains(100));
        assert!(window.contains(200));
        assert!(!window.contains(99));
        assert!(!window.contains(201));
    }

    #[test]
    fn test_window_invalid() {
        assert!(matches!(
            PollWindow::new(5, 1),
            Err(PollwiseError::InvalidWindow { lower: 5, upper: 1 })
        ));
    }

    #[test]
    fn test_unset_sentinel() {
        assert!(PollWindow::UNSET.is_unset());
        assert!(PollWindow::default().is_unset());
        assert!(!PollWindow::new(0, 1).unwrap().is_unset());
    }

    #[test]
    fn test_start_of_day_offset() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let start = start_of_day(&tokyo, date);

        assert_eq!(start.date_naive(), date);
        assert_eq!(
            start.timestamp_millis(),
            Utc.with_ymd_and_hms(2024, 3, 9, 15, 0, 0).unwrap().timestamp_millis()
        );
    }

    #[test]
    fn test_local_date_crosses_midnight() {
        // 2024-01-01T23:30:00Z
        let millis = Utc.with_ymd_and_hms(2024, 1, 1, 23, 30, 0).unwrap().timestamp_millis();
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();

        assert_eq!(
            local_date(&Utc, millis).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(
            local_date(&tokyo, millis).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
        assert!(local_date(&Utc, i64::MAX).is_err());
    }
}
