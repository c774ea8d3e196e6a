//! File-backed series library and batch rescheduling for pollwise.
//!
//! - [`LibraryStore`] - Persistent per-series JSON storage
//! - [`SeriesRecord`] - Stored schedule state, title and release history
//! - [`Refresher`] - Reschedules many series with bounded concurrency
//! - [`due_series`] - Series whose next poll falls before the window ends

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod refresh;
mod store;

pub use refresh::{RefreshConfig, RefreshSummary, Refresher, due_series, is_due};
pub use store::{LibraryStore, Result, SeriesRecord, StoreError};
