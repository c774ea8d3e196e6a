//! Collaborators the estimator reads from and writes to.

use async_trait::async_trait;
use pollwise_types::{ScheduleUpdate, SeriesId, UpdateEvent};
use std::sync::Arc;
use thiserror::Error;

/// Errors reported by history and schedule backends.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// The backend does not know the series.
    #[error("Unknown series: {0}")]
    UnknownSeries(SeriesId),

    /// The backend failed.
    #[error("History backend error: {0}")]
    Backend(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Source of the release history of a series.
#[async_trait]
pub trait EventHistory: Send + Sync {
    /// Returns every known update event of the series, in any order.
    ///
    /// With `exclude_duplicates` set, events flagged as cross-posted
    /// releases are left out.
    async fn events(
        &self,
        id: SeriesId,
        exclude_duplicates: bool,
    ) -> Result<Vec<UpdateEvent>, HistoryError>;
}

/// Destination for computed schedule deltas.
#[async_trait]
pub trait ScheduleSink: Send + Sync {
    /// Durably stores the deltas, returning how many were written.
    async fn apply(&self, updates: &[ScheduleUpdate]) -> Result<usize, HistoryError>;
}

#[async_trait]
impl<T: EventHistory + ?Sized> EventHistory for Arc<T> {
    async fn events(
        &self,
        id: SeriesId,
        exclude_duplicates: bool,
    ) -> Result<Vec<UpdateEvent>, HistoryError> {
        (**self).events(id, exclude_duplicates).await
    }
}

#[async_trait]
impl<T: ScheduleSink + ?Sized> ScheduleSink for Arc<T> {
    async fn apply(&self, updates: &[ScheduleUpdate]) -> Result<usize, HistoryError> {
        (**self).apply(updates).await
    }
}
