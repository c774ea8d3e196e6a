//! Series schedule state and the deltas produced for it.

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use std::num::ParseIntError;
use std::str::FromStr;

use crate::{PollwiseError, Result};

/// Smallest interval, in days, the scheduler ever uses.
pub const MIN_INTERVAL: i32 = 1;

/// Largest interval, in days: a series is never scheduled more than four weeks out.
pub const MAX_INTERVAL: i32 = 28;

/// Interval used when a series has too little history to estimate one.
pub const DEFAULT_INTERVAL: i32 = 7;

/// Opaque identifier of a tracked series.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    From,
    Into,
)]
#[serde(transparent)]
pub struct SeriesId(i64);

impl SeriesId {
    /// Creates a series identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl FromStr for SeriesId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// How a stored interval value should be read.
///
/// The persisted form is a single signed integer: negative values are
/// manual pins, zero means the estimator never ran, positive values are
/// estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchInterval {
    /// No interval has been computed yet.
    Uninitialized,
    /// Interval forced by the user, in days.
    Pinned(i32),
    /// Interval estimated from the release history, in days.
    Estimated(i32),
}

impl FetchInterval {
    /// Interprets a raw stored interval.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        if raw < 0 {
            Self::Pinned(raw.saturating_neg())
        } else if raw == 0 {
            Self::Uninitialized
        } else {
            Self::Estimated(raw)
        }
    }

    /// Builds a manual pin, validating the number of days.
    ///
    /// # Errors
    ///
    /// Returns an error if `days` is outside `MIN_INTERVAL..=MAX_INTERVAL`.
    pub fn pinned(days: i64) -> Result<Self> {
        if days < i64::from(MIN_INTERVAL) || days > i64::from(MAX_INTERVAL) {
            return Err(PollwiseError::InvalidPin {
                days,
                min: MIN_INTERVAL,
                max: MAX_INTERVAL,
            });
        }
        Ok(Self::Pinned(days as i32))
    }

    /// Returns the raw signed value used for storage.
    #[must_use]
    pub const fn raw(self) -> i32 {
        match self {
            Self::Uninitialized => 0,
            Self::Pinned(days) => -days,
            Self::Estimated(days) => days,
        }
    }

    /// Returns the interval length in days, if one is set.
    #[must_use]
    pub const fn days(self) -> Option<i32> {
        match self {
            Self::Uninitialized => None,
            Self::Pinned(days) | Self::Estimated(days) => Some(days),
        }
    }

    /// Returns true if the interval is a manual pin.
    #[must_use]
    pub const fn is_pinned(self) -> bool {
        matches!(self, Self::Pinned(_))
    }
}

impl std::fmt::Display for FetchInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "unset"),
            Self::Pinned(days) => write!(f, "{days}d (pinned)"),
            Self::Estimated(days) => write!(f, "{days}d"),
        }
    }
}

/// Stored schedule state of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesState {
    /// Series identifier.
    pub id: SeriesId,
    /// Time the newest item was observed, in epoch milliseconds (0 if never).
    pub last_update: i64,
    /// Next scheduled poll, in epoch milliseconds (0 if never scheduled).
    pub next_update: i64,
    /// Signed interval in days; see [`FetchInterval`].
    pub fetch_interval: i32,
}

impl SeriesState {
    /// Creates the state of a series that has never been scheduled.
    #[must_use]
    pub const fn new(id: SeriesId) -> Self {
        Self {
            id,
            last_update: 0,
            next_update: 0,
            fetch_interval: 0,
        }
    }

    /// Returns the interpreted interval.
    #[must_use]
    pub const fn interval(&self) -> FetchInterval {
        FetchInterval::from_raw(self.fetch_interval)
    }

    /// Returns true if the interval is a manual pin.
    #[must_use]
    pub const fn is_pinned(&self) -> bool {
        self.fetch_interval < 0
    }

    /// Applies a schedule delta addressed to this series.
    ///
    /// Returns false and leaves the state untouched if the delta belongs
    /// to another series.
    pub const fn apply(&mut self, update: &ScheduleUpdate) -> bool {
        if self.id.get() != update.id.get() {
            return false;
        }
        self.next_update = update.next_update;
        self.fetch_interval = update.fetch_interval;
        true
    }
}

/// Schedule delta for one series, to be persisted by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleUpdate {
    /// Series the delta applies to.
    pub id: SeriesId,
    /// New next poll time, in epoch milliseconds.
    pub next_update: i64,
    /// New signed interval in days.
    pub fetch_interval: i32,
}

impl ScheduleUpdate {
    /// Creates a schedule delta.
    #[must_use]
    pub const fn new(id: SeriesId, next_update: i64, fetch_interval: i32) -> Self {
        Self {
            id,
            next_update,
            fetch_interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_from_raw() {
        assert_eq!(FetchInterval::from_raw(0), FetchInterval::Uninitialized);
        assert_eq!(FetchInterval::from_raw(-5), FetchInterval::Pinned(5));
        assert_eq!(FetchInterval::from_raw(7), FetchInterval::Estimated(7));
        assert_eq!(FetchInterval::Pinned(5).raw(), -5);
        assert_eq!(FetchInterval::Uninitialized.days(), None);
    }

    #[test]
    fn test_pinned_validation() {
        assert_eq!(FetchInterval::pinned(14).unwrap(), FetchInterval::Pinned(14));
        assert!(matches!(
            FetchInterval::pinned(0),
            Err(PollwiseError::InvalidPin { days: 0, .. })
        ));
        assert!(FetchInterval::pinned(29).is_err());
    }

    #[test]
    fn test_interval_display() {
        assert_eq!(FetchInterval::Uninitialized.to_string(), "unset");
        assert_eq!(FetchInterval::Pinned(3).to_string(), "3d (pinned)");
        assert_eq!(FetchInterval::Estimated(10).to_string(), "10d");
    }

    #[test]
    fn test_apply_update() {
        let mut state = SeriesState::new(SeriesId::new(1));
        assert!(state.apply(&ScheduleUpdate::new(SeriesId::new(1), 1_000, 7)));
        assert_eq!(state.next_update, 1_000);
        assert_eq!(state.fetch_interval, 7);

        assert!(!state.apply(&ScheduleUpdate::new(SeriesId::new(2), 5_000, 3)));
        assert_eq!(state.next_update, 1_000);
    }

    #[test]
    fn test_series_id_parse() {
        assert_eq!("42".parse::<SeriesId>().unwrap(), SeriesId::new(42));
        assert!("abc".parse::<SeriesId>().is_err());
        assert_eq!(SeriesId::new(42).to_string(), "42");
    }
}
