//! Adaptive fetch-interval estimation for pollwise.
//!
//! - [`FetchIntervalEstimator`] - Computes schedule deltas for a series
//! - [`compute_window`] - Grace band around the reference day
//! - [`estimate_interval_days`] - Average release cadence from history
//! - [`double_interval`] - Backoff for dormant series
//! - [`EventHistory`] / [`ScheduleSink`] - Collaborators supplying history and persisting deltas

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod estimator;
mod history;

pub use estimator::{
    DOUBLE_WHEN_OVER, FetchIntervalEstimator, compute_schedule_update, compute_window,
    double_interval, estimate_interval_days,
};
pub use history::{EventHistory, HistoryError, ScheduleSink};
pub use pollwise_types::{DEFAULT_INTERVAL, MAX_INTERVAL, MIN_INTERVAL};
