//! CLI command implementations.

use crate::config::Config;
use chrono::DateTime;
use chrono_tz::Tz;
use pollwise_lib::LibraryStore;
use std::sync::Arc;

pub(crate) mod info;
pub(crate) mod list;
pub(crate) mod schedule;
pub(crate) mod series;

/// State shared by every command.
#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) store: Arc<LibraryStore>,
    pub(crate) config: Config,
    /// Zone whose day boundaries schedules snap to.
    pub(crate) zone: Tz,
    /// Instant treated as "now".
    pub(crate) reference: DateTime<Tz>,
    pub(crate) quiet: bool,
}
