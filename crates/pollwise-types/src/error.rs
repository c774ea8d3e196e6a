//! Error types for pollwise.

use thiserror::Error;

/// Result type alias for pollwise operations.
pub type Result<T> = std::result::Result<T, PollwiseError>;

/// Errors raised when constructing pollwise values from untrusted input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollwiseError {
    /// A manual pin outside the supported interval range.
    #[error("Invalid pinned interval: {days} days (expected {min}..={max})")]
    InvalidPin {
        /// The rejected number of days.
        days: i64,
        /// Smallest accepted value.
        min: i32,
        /// Largest accepted value.
        max: i32,
    },

    /// A poll window whose lower bound lies after its upper bound.
    #[error("Invalid poll window: {lower} > {upper}")]
    InvalidWindow {
        /// Lower bound in epoch milliseconds.
        lower: i64,
        /// Upper bound in epoch milliseconds.
        upper: i64,
    },

    /// An epoch millisecond value chrono cannot represent.
    #[error("Timestamp out of range: {0}")]
    TimestampOutOfRange(i64),
}
