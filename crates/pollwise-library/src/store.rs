//! Persistent storage of series schedule state and release history.

use async_trait::async_trait;
use directories::ProjectDirs;
use pollwise_interval::{EventHistory, HistoryError, ScheduleSink};
use pollwise_types::{
    FetchInterval, PollwiseError, ScheduleUpdate, SeriesId, SeriesState, UpdateEvent,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during library storage operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to create a directory.
    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        /// The path that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        /// The path that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to delete a file.
    #[error("Failed to delete file '{path}': {source}")]
    DeleteFile {
        /// The path that could not be deleted.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to read directory.
    #[error("Failed to read directory '{path}': {source}")]
    ReadDir {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse JSON.
    #[error("Failed to parse series file '{path}': {source}")]
    ParseJson {
        /// The path that could not be parsed.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// Failed to serialize JSON.
    #[error("Failed to serialize series: {0}")]
    SerializeJson(#[from] serde_json::Error),

    /// Series not found.
    #[error("Series not found: {0}")]
    SeriesNotFound(SeriesId),

    /// Series already tracked.
    #[error("Series already exists: {0}")]
    SeriesExists(SeriesId),

    /// Rejected value.
    #[error(transparent)]
    Invalid(#[from] PollwiseError),
}

/// Result type for library storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// A tracked series as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesRecord {
    /// Schedule state.
    pub state: SeriesState,
    /// Display title.
    pub title: String,
    /// Every observed chapter or episode.
    #[serde(default)]
    pub events: Vec<UpdateEvent>,
}

impl SeriesRecord {
    /// Creates a record for a series that has never been scheduled.
    #[must_use]
    pub fn new(id: SeriesId, title: impl Into<String>) -> Self {
        Self {
            state: SeriesState::new(id),
            title: title.into(),
            events: Vec::new(),
        }
    }

    /// Returns the series identifier.
    #[must_use]
    pub const fn id(&self) -> SeriesId {
        self.state.id
    }

    /// Appends observed events and moves `last_update` to the newest
    /// observation.
    pub fn record(&mut self, events: &[UpdateEvent]) {
        self.events.extend_from_slice(events);
        if let Some(newest) = events.iter().map(|event| event.fetch_timestamp).max() {
            self.state.last_update = self.state.last_update.max(newest);
        }
    }

    /// Returns the history, optionally without cross-posted duplicates.
    #[must_use]
    pub fn history(&self, exclude_duplicates: bool) -> Vec<UpdateEvent> {
        self.events
            .iter()
            .filter(|event| !(exclude_duplicates && event.duplicate))
            .copied()
            .collect()
    }
}

/// Manages persistent state for tracked series.
///
/// Series are stored as JSON files in `<base>/series/<id>.json`.
#[derive(Debug, Clone)]
pub struct LibraryStore {
    /// Base directory for library storage.
    base_path: PathBuf,
    /// Directory for series JSON files.
    series_path: PathBuf,
}

impl LibraryStore {
    /// Creates a library store rooted at the given base path.
    ///
    /// Creates the necessary subdirectories if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created.
    pub fn new(base_path: PathBuf) -> Result<Self> {
        let series_path = base_path.join("series");

        for path in [&base_path, &series_path] {
            if !path.exists() {
                fs::create_dir_all(path).map_err(|e| StoreError::CreateDir {
                    path: path.clone(),
                    source: e,
                })?;
            }
        }

        Ok(Self {
            base_path,
            series_path,
        })
    }

    /// Returns the default path for pollwise data.
    ///
    /// Uses the `directories` crate to find the appropriate location:
    /// - Linux: `~/.local/share/pollwise/`
    /// - macOS: `~/Library/Application Support/pollwise/`
    /// - Windows: `C:\Users\<User>\AppData\Roaming\pollwise\`
    ///
    /// Falls back to `~/.pollwise/` if the platform-specific location
    /// cannot be determined.
    #[must_use]
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("", "", "pollwise").map_or_else(dirs_fallback, |proj_dirs| {
            proj_dirs.data_dir().to_path_buf()
        })
    }

    /// Creates a library store at the default path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created.
    pub fn with_default_path() -> Result<Self> {
        Self::new(Self::default_path())
    }

    /// Returns the base path for library storage.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Returns the path to a series file.
    #[must_use]
    pub fn series_file(&self, id: SeriesId) -> PathBuf {
        self.series_path.join(format!("{id}.json"))
    }

    /// Starts tracking a new series.
    ///
    /// # Errors
    ///
    /// Returns an error if the series is already tracked or cannot be written.
    pub fn add_series(&self, id: SeriesId, title: impl Into<String>) -> Result<SeriesRecord> {
        if self.series_file(id).exists() {
            return Err(StoreError::SeriesExists(id));
        }
        let record = SeriesRecord::new(id, title);
        self.save_series(&record)?;
        Ok(record)
    }

    /// Saves a series to persistent storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the series cannot be serialized or written to disk.
    pub fn save_series(&self, record: &SeriesRecord) -> Result<()> {
        let path = self.series_file(record.id());
        let json = serde_json::to_string_pretty(record)?;

        fs::write(&path, json).map_err(|e| StoreError::WriteFile { path, source: e })
    }

    /// Loads a series from persistent storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the series file cannot be read or parsed.
    pub fn load_series(&self, id: SeriesId) -> Result<SeriesRecord> {
        let path = self.series_file(id);

        if !path.exists() {
            return Err(StoreError::SeriesNotFound(id));
        }

        let content = fs::read_to_string(&path).map_err(|e| StoreError::ReadFile {
            path: path.clone(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| StoreError::ParseJson { path, source: e })
    }

    /// Lists all series in persistent storage, sorted by identifier.
    ///
    /// Files that fail to parse are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the series directory cannot be read.
    pub fn list_series(&self) -> Result<Vec<SeriesRecord>> {
        let entries = fs::read_dir(&self.series_path).map_err(|e| StoreError::ReadDir {
            path: self.series_path.clone(),
            source: e,
        })?;

        let mut records = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| StoreError::ReadDir {
                path: self.series_path.clone(),
                source: e,
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let content = fs::read_to_string(&path).map_err(|e| StoreError::ReadFile {
                    path: path.clone(),
                    source: e,
                })?;

                match serde_json::from_str::<SeriesRecord>(&content) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable series file");
                    }
                }
            }
        }

        records.sort_by_key(SeriesRecord::id);

        Ok(records)
    }

    /// Deletes a series from persistent storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the series file cannot be deleted.
    pub fn delete_series(&self, id: SeriesId) -> Result<()> {
        let path = self.series_file(id);

        if !path.exists() {
            return Err(StoreError::SeriesNotFound(id));
        }

        fs::remove_file(&path).map_err(|e| StoreError::DeleteFile { path, source: e })
    }

    /// Appends newly observed events to a series.
    ///
    /// # Errors
    ///
    /// Returns an error if the series cannot be loaded or saved.
    pub fn record_events(&self, id: SeriesId, events: &[UpdateEvent]) -> Result<SeriesRecord> {
        let mut record = self.load_series(id)?;
        record.record(events);
        self.save_series(&record)?;
        Ok(record)
    }

    /// Pins the interval of a series to `days`.
    ///
    /// # Errors
    ///
    /// Returns an error if `days` is out of range or the series cannot be
    /// loaded or saved.
    pub fn set_pin(&self, id: SeriesId, days: i64) -> Result<SeriesRecord> {
        let interval = FetchInterval::pinned(days)?;
        let mut record = self.load_series(id)?;
        record.state.fetch_interval = interval.raw();
        self.save_series(&record)?;
        Ok(record)
    }

    /// Removes a manual pin so the next schedule run estimates again.
    ///
    /// # Errors
    ///
    /// Returns an error if the series cannot be loaded or saved.
    pub fn clear_pin(&self, id: SeriesId) -> Result<SeriesRecord> {
        let mut record = self.load_series(id)?;
        if record.state.is_pinned() {
            record.state.fetch_interval = FetchInterval::Uninitialized.raw();
            self.save_series(&record)?;
        }
        Ok(record)
    }

    /// Applies schedule deltas, returning how many series were written.
    ///
    /// # Errors
    ///
    /// Returns an error on the first series that cannot be loaded or saved.
    pub fn apply_updates(&self, updates: &[ScheduleUpdate]) -> Result<usize> {
        let mut written = 0;
        for update in updates {
            let mut record = self.load_series(update.id)?;
            if record.state.apply(update) {
                self.save_series(&record)?;
                written += 1;
            }
        }
        Ok(written)
    }
}

impl From<StoreError> for HistoryError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::SeriesNotFound(id) => Self::UnknownSeries(id),
            other => Self::Backend(Box::new(other)),
        }
    }
}

#[async_trait]
impl EventHistory for LibraryStore {
    async fn events(
        &self,
        id: SeriesId,
        exclude_duplicates: bool,
    ) -> std::result::Result<Vec<UpdateEvent>, HistoryError> {
        Ok(self.load_series(id)?.history(exclude_duplicates))
    }
}

#[async_trait]
impl ScheduleSink for LibraryStore {
    async fn apply(&self, updates: &[ScheduleUpdate]) -> std::result::Result<usize, HistoryError> {
        Ok(self.apply_updates(updates)?)
    }
}

/// Fallback for determining home directory.
fn dirs_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".pollwise")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_store() -> (TempDir, LibraryStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = LibraryStore::new(temp_dir.path().to_path_buf()).unwrap();
        (temp_dir, store)
    }

    #[test]
    fn test_store_creation() {
        let (temp_dir, store) = create_store();

        assert!(store.base_path().exists());
        assert!(temp_dir.path().join("series").exists());
    }

    #[test]
    fn test_add_and_load_series() {
        let (_temp_dir, store) = create_store();
        let id = SeriesId::new(12);

        store.add_series(id, "Frieren").unwrap();

        let loaded = store.load_series(id).unwrap();
        assert_eq!(loaded.title, "Frieren");
        assert_eq!(loaded.state, SeriesState::new(id));
        assert!(loaded.events.is_empty());
    }

    #[test]
    fn test_add_existing_series() {
        let (_temp_dir, store) = create_store();
        let id = SeriesId::new(12);

        store.add_series(id, "Frieren").unwrap();
        assert!(matches!(
            store.add_series(id, "Again"),
            Err(StoreError::SeriesExists(_))
        ));
    }

    #[test]
    fn test_list_series_sorted_and_skips_corrupt() {
        let (temp_dir, store) = create_store();

        store.add_series(SeriesId::new(30), "C").unwrap();
        store.add_series(SeriesId::new(4), "A").unwrap();
        store.add_series(SeriesId::new(12), "B").unwrap();
        fs::write(temp_dir.path().join("series").join("99.json"), "{ not json").unwrap();

        let ids: Vec<_> = store
            .list_series()
            .unwrap()
            .iter()
            .map(SeriesRecord::id)
            .collect();
        assert_eq!(ids, [SeriesId::new(4), SeriesId::new(12), SeriesId::new(30)]);
    }

    #[test]
    fn test_delete_series() {
        let (_temp_dir, store) = create_store();
        let id = SeriesId::new(1);

        store.add_series(id, "Gone").unwrap();
        store.delete_series(id).unwrap();

        assert!(matches!(
            store.load_series(id),
            Err(StoreError::SeriesNotFound(_))
        ));
        assert!(matches!(
            store.delete_series(id),
            Err(StoreError::SeriesNotFound(_))
        ));
    }

    #[test]
    fn test_record_events_moves_last_update() {
        let (_temp_dir, store) = create_store();
        let id = SeriesId::new(1);
        store.add_series(id, "Weekly").unwrap();

        store
            .record_events(id, &[UpdateEvent::new(100, 5_000), UpdateEvent::new(90, 3_000)])
            .unwrap();
        let record = store
            .record_events(id, &[UpdateEvent::new(0, 4_000)])
            .unwrap();

        assert_eq!(record.events.len(), 3);
        assert_eq!(record.state.last_update, 5_000);
    }

    #[test]
    fn test_history_filters_duplicates() {
        let mut record = SeriesRecord::new(SeriesId::new(1), "Mirror");
        record.record(&[
            UpdateEvent::new(1, 1),
            UpdateEvent::new(2, 2).as_duplicate(),
        ]);

        assert_eq!(record.history(true).len(), 1);
        assert_eq!(record.history(false).len(), 2);
    }

    #[test]
    fn test_pin_and_clear() {
        let (_temp_dir, store) = create_store();
        let id = SeriesId::new(1);
        store.add_series(id, "Pinned").unwrap();

        let record = store.set_pin(id, 5).unwrap();
        assert_eq!(record.state.fetch_interval, -5);
        assert!(matches!(
            store.set_pin(id, 40),
            Err(StoreError::Invalid(PollwiseError::InvalidPin { days: 40, .. }))
        ));

        let record = store.clear_pin(id).unwrap();
        assert_eq!(record.state.fetch_interval, 0);
    }

    #[test]
    fn test_apply_updates() {
        let (_temp_dir, store) = create_store();
        let id = SeriesId::new(1);
        store.add_series(id, "Scheduled").unwrap();

        let written = store
            .apply_updates(&[ScheduleUpdate::new(id, 86_400_000, 7)])
            .unwrap();
        assert_eq!(written, 1);

        let state = store.load_series(id).unwrap().state;
        assert_eq!(state.next_update, 86_400_000);
        assert_eq!(state.fetch_interval, 7);

        assert!(matches!(
            store.apply_updates(&[ScheduleUpdate::new(SeriesId::new(2), 0, 7)]),
            Err(StoreError::SeriesNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_store_as_history() {
        let (_temp_dir, store) = create_store();
        let id = SeriesId::new(1);
        store.add_series(id, "History").unwrap();
        store
            .record_events(id, &[UpdateEvent::new(1, 1), UpdateEvent::new(2, 2).as_duplicate()])
            .unwrap();

        assert_eq!(store.events(id, true).await.unwrap().len(), 1);
        assert!(matches!(
            store.events(SeriesId::new(2), true).await,
            Err(HistoryError::UnknownSeries(_))
        ));
    }
}
