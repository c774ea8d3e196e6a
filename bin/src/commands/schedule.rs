//! Schedule command implementation.
//!
//! Recomputes the fetch interval and next poll time of every tracked series
//! against one shared poll window.

use super::Session;
use crate::display::format_millis;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use pollwise_lib::prelude::*;
use std::sync::Arc;

/// Reschedule the library, or print the planned changes with `dry_run`.
pub(crate) async fn schedule(
    session: &Session,
    only_due: bool,
    dry_run: bool,
    concurrency: Option<usize>,
) -> Result<()> {
    let records = session.store.list_series().context("Failed to read library")?;
    if records.is_empty() {
        println!("No series tracked. Add one with `pollwise add <id> <title>`.");
        return Ok(());
    }
    let series: Vec<SeriesState> = records.iter().map(|r| r.state).collect();

    let estimator = FetchIntervalEstimator::new(Arc::clone(&session.store))
        .exclude_duplicates(session.config.exclude_duplicates);
    let config = RefreshConfig {
        concurrency: concurrency.unwrap_or(session.config.concurrency),
        only_due,
    };
    let refresher = Refresher::new(estimator, Arc::clone(&session.store), config);

    let progress = if session.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(series.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} series {msg}")
                .context("Invalid progress template")?
                .progress_chars("=>-"),
        );
        pb
    };
    let on_examined = |state: &SeriesState| {
        progress.set_message(state.id.to_string());
        progress.inc(1);
    };

    if dry_run {
        let (updates, summary) = refresher
            .plan(&series, &session.reference, on_examined)
            .await;
        progress.finish_and_clear();

        if updates.is_empty() {
            println!("All {} examined series are up to date.", summary.examined);
            return Ok(());
        }

        println!(
            "{:<10} {:<10} {:<10} {:<24} {:<24}",
            "ID", "OLD", "NEW", "NEXT (OLD)", "NEXT (NEW)"
        );
        println!("{}", "-".repeat(80));
        for update in &updates {
            let Some(current) = series.iter().find(|s| s.id == update.id) else {
                continue;
            };
            println!(
                "{:<10} {:<10} {:<10} {:<24} {:<24}",
                update.id,
                current.interval().to_string(),
                FetchInterval::from_raw(update.fetch_interval).to_string(),
                format_millis(current.next_update, &session.zone),
                format_millis(update.next_update, &session.zone),
            );
        }
        println!(
            "\n{} of {} examined series would change (dry run, nothing saved)",
            summary.updated, summary.examined
        );
        return Ok(());
    }

    let summary = refresher
        .run(&series, &session.reference, on_examined)
        .await
        .context("Failed to save schedules")?;
    progress.finish_and_clear();

    println!(
        "Examined {} series: {} rescheduled, {} pinned, {} failed",
        summary.examined, summary.updated, summary.pinned, summary.failed
    );
    if summary.failed > 0 {
        anyhow::bail!("{} series could not be scheduled", summary.failed);
    }
    Ok(())
}
