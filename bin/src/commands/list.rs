//! List command implementation.

use super::Session;
use crate::display::format_millis;
use anyhow::{Context, Result};
use pollwise_lib::{is_due, prelude::*};

/// List tracked series, optionally only those due within the poll window.
pub(crate) fn list_series(session: &Session, only_due: bool) -> Result<()> {
    let window = compute_window(&session.reference);
    let records: Vec<SeriesRecord> = session
        .store
        .list_series()
        .context("Failed to read library")?
        .into_iter()
        .filter(|record| !only_due || is_due(&record.state, window))
        .collect();

    if records.is_empty() {
        println!("No series found.");
        return Ok(());
    }

    println!(
        "{:<10} {:<30} {:<12} {:<22} {:<4}",
        "ID", "TITLE", "INTERVAL", "NEXT UPDATE", "DUE"
    );
    println!("{}", "-".repeat(82));

    for record in &records {
        println!(
            "{:<10} {:<30} {:<12} {:<22} {:<4}",
            record.id(),
            truncate(&record.title, 30),
            record.state.interval().to_string(),
            format_millis(record.state.next_update, &session.zone),
            if is_due(&record.state, window) { "yes" } else { "" },
        );
    }

    println!("\nTotal: {} series", records.len());
    Ok(())
}

fn truncate(title: &str, width: usize) -> String {
    if title.chars().count() <= width {
        return title.to_string();
    }
    let mut short: String = title.chars().take(width.saturating_sub(3)).collect();
    short.push_str("...");
    short
}
