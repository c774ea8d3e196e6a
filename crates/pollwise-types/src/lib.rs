//! Core types for the pollwise series update scheduler.
//!
//! This crate provides the plain data records exchanged between the
//! estimator and its collaborators:
//!
//! - [`SeriesId`] - Opaque identifier of a tracked series
//! - [`SeriesState`] - Stored schedule state of a series
//! - [`FetchInterval`] - Interpretation of the signed interval value
//! - [`UpdateEvent`] - One observed chapter or episode
//! - [`PollWindow`] - Grace band around "today"
//! - [`ScheduleUpdate`] - Schedule delta to persist

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod event;
mod series;
mod window;

pub use error::{PollwiseError, Result};
pub use event::UpdateEvent;
pub use series::{
    DEFAULT_INTERVAL, FetchInterval, MAX_INTERVAL, MIN_INTERVAL, ScheduleUpdate, SeriesId,
    SeriesState,
};
pub use window::{PollWindow, local_date, start_of_day};
