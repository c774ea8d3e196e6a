//! Adaptive update scheduling for libraries of serialized manga and anime.
//!
//! This is a facade crate that re-exports functionality from the pollwise
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use pollwise_lib::prelude::*;
//!
//! let now = Utc.with_ymd_and_hms(2024, 5, 15, 10, 30, 0).unwrap();
//! let series = SeriesState::new(SeriesId::new(1));
//!
//! let update = compute_schedule_update(&series, &[], &now, PollWindow::UNSET)
//!     .expect("a new series is always scheduled");
//! assert_eq!(update.fetch_interval, 7);
//! ```

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use pollwise_types::*;

// Re-export the estimator
pub use pollwise_interval::{
    DOUBLE_WHEN_OVER, EventHistory, FetchIntervalEstimator, HistoryError, ScheduleSink,
    compute_schedule_update, compute_window, double_interval, estimate_interval_days,
};

// Re-export the library store
#[cfg(feature = "library")]
pub use pollwise_library::{
    LibraryStore, RefreshConfig, RefreshSummary, Refresher, SeriesRecord, StoreError, due_series,
    is_due,
};

/// Prelude module for convenient imports.
///
/// ```
/// use pollwise_lib::prelude::*;
/// ```
pub mod prelude {
    pub use pollwise_types::{
        FetchInterval, MAX_INTERVAL, PollWindow, PollwiseError, ScheduleUpdate, SeriesId,
        SeriesState, UpdateEvent,
    };

    pub use pollwise_interval::{
        EventHistory, FetchIntervalEstimator, HistoryError, ScheduleSink,
        compute_schedule_update, compute_window, estimate_interval_days,
    };

    #[cfg(feature = "library")]
    pub use pollwise_library::{
        LibraryStore, RefreshConfig, RefreshSummary, Refresher, SeriesRecord, due_series,
    };
}
