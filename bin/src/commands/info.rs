//! Info and window command implementations.

use super::Session;
use crate::display::format_millis;
use anyhow::{Context, Result};
use pollwise_lib::{is_due, prelude::*};

/// Show the schedule of one series and what a reschedule would produce.
pub(crate) fn show_info(session: &Session, id: SeriesId) -> Result<()> {
    let record = session
        .store
        .load_series(id)
        .with_context(|| format!("Unknown series: {id}"))?;
    let state = record.state;
    let history = record.history(session.config.exclude_duplicates);
    let window = compute_window(&session.reference);

    println!("Series:      {}", record.title);
    println!("ID:          {id}");
    println!("Interval:    {}", state.interval());
    println!("Last update: {}", format_millis(state.last_update, &session.zone));
    println!("Next update: {}", format_millis(state.next_update, &session.zone));
    println!("Due:         {}", if is_due(&state, window) { "yes" } else { "no" });
    println!(
        "History:     {} events ({} duplicates)",
        record.events.len(),
        record.events.len() - record.history(true).len()
    );

    if !state.is_pinned() {
        println!(
            "Estimated:   {}d from release history",
            estimate_interval_days(&history, &session.zone)
        );
    }

    match compute_schedule_update(&state, &history, &session.reference, window) {
        Some(update) => println!(
            "\nReschedule:  {} every {}",
            format_millis(update.next_update, &session.zone),
            FetchInterval::from_raw(update.fetch_interval)
        ),
        None => println!("\nReschedule:  up to date"),
    }

    Ok(())
}

/// Show the poll window around the reference time.
pub(crate) fn show_window(session: &Session) -> Result<()> {
    let window = compute_window(&session.reference);

    println!("Zone:      {}", session.zone);
    println!("Reference: {}", session.reference.format("%Y-%m-%d %H:%M:%S %Z"));
    println!(
        "Window:    {} .. {}",
        format_millis(window.lower, &session.zone),
        format_millis(window.upper, &session.zone)
    );
    println!("Raw:       {window}");
    Ok(())
}
