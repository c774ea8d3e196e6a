//! Batch rescheduling of a whole library.

use chrono::{DateTime, TimeZone};
use futures::stream::{self, StreamExt};
use pollwise_interval::{
    EventHistory, FetchIntervalEstimator, HistoryError, ScheduleSink, compute_window,
};
use pollwise_types::{PollWindow, ScheduleUpdate, SeriesState};

/// Configuration for a batch refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Maximum number of histories read concurrently.
    pub concurrency: usize,
    /// Only reschedule series whose next poll is due within the window.
    pub only_due: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            only_due: false,
        }
    }
}

/// Outcome of a batch refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    /// Series examined.
    pub examined: usize,
    /// Series whose schedule changed.
    pub updated: usize,
    /// Examined series with a manual pin.
    pub pinned: usize,
    /// Series whose history could not be read.
    pub failed: usize,
}

/// Returns true if the next poll of `series` falls before the end of `window`.
///
/// Series that were never scheduled are always due.
#[must_use]
pub const fn is_due(series: &SeriesState, window: PollWindow) -> bool {
    series.next_update <= window.upper
}

/// Returns the series due for polling within `window`.
pub fn due_series(
    series: &[SeriesState],
    window: PollWindow,
) -> impl Iterator<Item = &SeriesState> + '_ {
    series.iter().filter(move |state| is_due(state, window))
}

/// Reschedules many series against one shared window.
#[derive(Debug)]
pub struct Refresher<H, S> {
    estimator: FetchIntervalEstimator<H>,
    sink: S,
    config: RefreshConfig,
}

impl<H: EventHistory, S: ScheduleSink> Refresher<H, S> {
    /// Creates a refresher writing its deltas to `sink`.
    #[must_use]
    pub const fn new(estimator: FetchIntervalEstimator<H>, sink: S, config: RefreshConfig) -> Self {
        Self {
            estimator,
            sink,
            config,
        }
    }

    /// Returns the refresh configuration.
    #[must_use]
    pub const fn config(&self) -> &RefreshConfig {
        &self.config
    }

    /// Computes the deltas for `series` without persisting them.
    ///
    /// `on_examined` is called once per series as its computation finishes.
    /// Series whose history cannot be read are logged and counted as failed.
    pub async fn plan<Tz, F>(
        &self,
        series: &[SeriesState],
        reference: &DateTime<Tz>,
        mut on_examined: F,
    ) -> (Vec<ScheduleUpdate>, RefreshSummary)
    where
        Tz: TimeZone,
        F: FnMut(&SeriesState),
    {
        let window = compute_window(reference);
        let selected: Vec<&SeriesState> = if self.config.only_due {
            due_series(series, window).collect()
        } else {
            series.iter().collect()
        };

        let mut summary = RefreshSummary::default();
        let mut updates = Vec::new();

        let mut results = stream::iter(selected)
            .map(|state| async move {
                let result = self.estimator.schedule_update(state, reference, window).await;
                (state, result)
            })
            .buffer_unordered(self.config.concurrency.max(1));

        while let Some((state, result)) = results.next().await {
            summary.examined += 1;
            if state.is_pinned() {
                summary.pinned += 1;
            }
            match result {
                Ok(Some(update)) => updates.push(update),
                Ok(None) => {}
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(series = %state.id, error = %e, "Failed to read series history");
                }
            }
            on_examined(state);
        }

        summary.updated = updates.len();
        (updates, summary)
    }

    /// Computes and persists the deltas for `series`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink cannot store the deltas.
    pub async fn run<Tz, F>(
        &self,
        series: &[SeriesState],
        reference: &DateTime<Tz>,
        on_examined: F,
    ) -> Result<RefreshSummary, HistoryError>
    where
        Tz: TimeZone,
        F: FnMut(&SeriesState),
    {
        let (updates, summary) = self.plan(series, reference, on_examined).await;

        if !updates.is_empty() {
            self.sink.apply(&updates).await?;
        }

        tracing::info!(
            examined = summary.examined,
            updated = summary.updated,
            pinned = summary.pinned,
            failed = summary.failed,
            "Library refresh finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LibraryStore, SeriesRecord};
    use chrono::Utc;
    use pollwise_types::{SeriesId, UpdateEvent};
    use std::sync::Arc;
    use tempfile::TempDir;

    const DAY: i64 = 86_400_000;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 10, 30, 0).unwrap()
    }

    fn setup() -> (TempDir, Arc<LibraryStore>) {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(LibraryStore::new(temp_dir.path().to_path_buf()).unwrap());

        let now = now().timestamp_millis();
        store.add_series(SeriesId::new(1), "Fresh").unwrap();
        store.add_series(SeriesId::new(2), "Every ten days").unwrap();
        let events: Vec<_> = [0, 10, 20, 30]
            .iter()
            .map(|d| UpdateEvent::new(now - d * DAY, now - d * DAY))
            .collect();
        store.record_events(SeriesId::new(2), &events).unwrap();
        store.add_series(SeriesId::new(3), "Pinned").unwrap();
        store.set_pin(SeriesId::new(3), 5).unwrap();

        (temp_dir, store)
    }

    fn states(store: &LibraryStore) -> Vec<SeriesState> {
        store
            .list_series()
            .unwrap()
            .into_iter()
            .map(|record: SeriesRecord| record.state)
            .collect()
    }

    fn refresher(store: &Arc<LibraryStore>) -> Refresher<Arc<LibraryStore>, Arc<LibraryStore>> {
        Refresher::new(
            FetchIntervalEstimator::new(Arc::clone(store)),
            Arc::clone(store),
            RefreshConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_refresh_schedules_library() {
        let (_temp_dir, store) = setup();
        let refresher = refresher(&store);
        let mut seen = 0;

        let summary = refresher
            .run(&states(&store), &now(), |_| seen += 1)
            .await
            .unwrap();

        assert_eq!(seen, 3);
        assert_eq!(
            summary,
            RefreshSummary {
                examined: 3,
                updated: 3,
                pinned: 1,
                failed: 0,
            }
        );
        assert_eq!(store.load_series(SeriesId::new(1)).unwrap().state.fetch_interval, 7);
        assert_eq!(store.load_series(SeriesId::new(2)).unwrap().state.fetch_interval, 10);
        assert_eq!(store.load_series(SeriesId::new(3)).unwrap().state.fetch_interval, -5);
    }

    #[tokio::test]
    async fn test_second_refresh_changes_nothing() {
        let (_temp_dir, store) = setup();
        let refresher = refresher(&store);

        refresher.run(&states(&store), &now(), |_| {}).await.unwrap();
        let summary = refresher.run(&states(&store), &now(), |_| {}).await.unwrap();

        assert_eq!(summary.examined, 3);
        assert_eq!(summary.updated, 0);
    }

    #[tokio::test]
    async fn test_missing_history_counts_as_failure() {
        let (_temp_dir, store) = setup();
        let refresher = refresher(&store);
        let mut series = states(&store);
        series.push(SeriesState::new(SeriesId::new(404)));

        let (updates, summary) = refresher.plan(&series, &now(), |_| {}).await;

        assert_eq!(summary.failed, 1);
        assert_eq!(updates.len(), 3);
    }

    #[tokio::test]
    async fn test_only_due_skips_scheduled_series() {
        let (_temp_dir, store) = setup();
        refresher(&store)
            .run(&states(&store), &now(), |_| {})
            .await
            .unwrap();

        let due_only = Refresher::new(
            FetchIntervalEstimator::new(Arc::clone(&store)),
            Arc::clone(&store),
            RefreshConfig {
                concurrency: 2,
                only_due: true,
            },
        );
        let (_, summary) = due_only.plan(&states(&store), &now(), |_| {}).await;
        assert_eq!(summary.examined, 0);

        // A week later the fresh series and the pinned one are due again.
        let later = now() + chrono::TimeDelta::days(7);
        let (_, summary) = due_only.plan(&states(&store), &later, |_| {}).await;
        assert_eq!(summary.examined, 2);
    }

    #[test]
    fn test_due_series() {
        let window = PollWindow::new(100, 200).unwrap();
        let mut early = SeriesState::new(SeriesId::new(1));
        early.next_update = 50;
        let mut edge = SeriesState::new(SeriesId::new(2));
        edge.next_update = 200;
        let mut late = SeriesState::new(SeriesId::new(3));
        late.next_update = 201;
        let never = SeriesState::new(SeriesId::new(4));

        let series = [early, edge, late, never];
        let due: Vec<_> = due_series(&series, window).map(|s| s.id).collect();
        assert_eq!(due, [SeriesId::new(1), SeriesId::new(2), SeriesId::new(4)]);
    }
}
