//! Library maintenance commands: add, record, pin, unpin and remove.

use super::Session;
use crate::display::parse_timestamp;
use anyhow::{Context, Result};
use pollwise_lib::prelude::*;

/// Start tracking a series.
pub(crate) fn add(session: &Session, id: SeriesId, title: &str) -> Result<()> {
    let record = session
        .store
        .add_series(id, title)
        .with_context(|| format!("Failed to add series {id}"))?;
    println!("Tracking {} ({})", record.title, record.id());
    Ok(())
}

/// Record a newly observed chapter or episode.
///
/// The fetch time defaults to the reference time; a missing upload time is
/// stored as unknown (0).
pub(crate) fn record(
    session: &Session,
    id: SeriesId,
    upload: Option<&str>,
    fetch: Option<&str>,
    duplicate: bool,
) -> Result<()> {
    let upload = upload
        .map(|s| parse_timestamp(s, &session.zone))
        .transpose()?
        .unwrap_or(0);
    let fetch = match fetch {
        Some(s) => parse_timestamp(s, &session.zone)?,
        None => session.reference.timestamp_millis(),
    };

    let mut event = UpdateEvent::new(upload, fetch);
    if duplicate {
        event = event.as_duplicate();
    }

    let record = session
        .store
        .record_events(id, &[event])
        .with_context(|| format!("Failed to record event for series {id}"))?;
    println!(
        "Recorded event for {} ({} events total)",
        record.title,
        record.events.len()
    );
    Ok(())
}

/// Pin the fetch interval of a series.
pub(crate) fn pin(session: &Session, id: SeriesId, days: i64) -> Result<()> {
    let record = session
        .store
        .set_pin(id, days)
        .with_context(|| format!("Failed to pin series {id}"))?;
    println!("{}: interval {}", record.title, record.state.interval());
    Ok(())
}

/// Remove a manual pin.
pub(crate) fn unpin(session: &Session, id: SeriesId) -> Result<()> {
    let record = session
        .store
        .clear_pin(id)
        .with_context(|| format!("Failed to unpin series {id}"))?;
    println!(
        "{}: interval will be estimated on the next schedule run",
        record.title
    );
    Ok(())
}

/// Stop tracking a series.
pub(crate) fn remove(session: &Session, id: SeriesId) -> Result<()> {
    session
        .store
        .delete_series(id)
        .with_context(|| format!("Failed to remove series {id}"))?;
    println!("Removed series {id}");
    Ok(())
}
