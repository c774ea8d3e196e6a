//! Fetch-interval estimation and next-poll scheduling.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone};
use pollwise_types::{
    DEFAULT_INTERVAL, MAX_INTERVAL, MIN_INTERVAL, PollWindow, ScheduleUpdate, SeriesState,
    UpdateEvent, local_date, start_of_day,
};

use crate::{EventHistory, HistoryError};

/// Histories up to this many events use the short sample.
const SMALL_HISTORY: usize = 8;

/// Distinct dates sampled for small histories.
const SHORT_SAMPLE: usize = 3;

/// Distinct dates sampled for larger histories.
const LONG_SAMPLE: usize = 10;

/// Distinct dates a sample needs before its cadence is trusted.
const MIN_DISTINCT_DATES: usize = 3;

/// Days of grace on each side of the reference day.
const GRACE_PERIOD_DAYS: u64 = 1;

/// Missed cycles after which a series counts as dormant and its divisor doubles.
pub const DOUBLE_WHEN_OVER: i64 = 10;

/// Computes schedule deltas for series, pulling release history from an
/// [`EventHistory`].
#[derive(Debug, Clone)]
pub struct FetchIntervalEstimator<H> {
    history: H,
    exclude_duplicates: bool,
}

impl<H: EventHistory> FetchIntervalEstimator<H> {
    /// Creates an estimator reading from `history`.
    ///
    /// Cross-posted duplicates are excluded from the history by default.
    #[must_use]
    pub const fn new(history: H) -> Self {
        Self {
            history,
            exclude_duplicates: true,
        }
    }

    /// Sets whether cross-posted duplicates are excluded from the history.
    #[must_use]
    pub const fn exclude_duplicates(mut self, exclude: bool) -> Self {
        self.exclude_duplicates = exclude;
        self
    }

    /// Returns the history collaborator.
    #[must_use]
    pub const fn history(&self) -> &H {
        &self.history
    }

    /// Computes the schedule delta for `series` at `reference`.
    ///
    /// Pinned series never touch the history. Pass [`PollWindow::UNSET`]
    /// to derive the window from `reference`.
    ///
    /// Returns `Ok(None)` when neither the next poll time nor the interval
    /// changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be read.
    pub async fn schedule_update<Tz: TimeZone>(
        &self,
        series: &SeriesState,
        reference: &DateTime<Tz>,
        window: PollWindow,
    ) -> Result<Option<ScheduleUpdate>, HistoryError> {
        let interval = if series.is_pinned() {
            pinned_interval(series.fetch_interval)
        } else {
            let events = self
                .history
                .events(series.id, self.exclude_duplicates)
                .await?;
            estimate_interval_days(&events, &reference.timezone())
        };
        Ok(resolve_update(series, interval, reference, window))
    }

    /// Returns the grace window around the day of `reference`.
    #[must_use]
    pub fn window<Tz: TimeZone>(&self, reference: &DateTime<Tz>) -> PollWindow {
        compute_window(reference)
    }
}

/// Computes the schedule delta for `series` from an already fetched history.
///
/// `events` is ignored for pinned series.
#[must_use]
pub fn compute_schedule_update<Tz: TimeZone>(
    series: &SeriesState,
    events: &[UpdateEvent],
    reference: &DateTime<Tz>,
    window: PollWindow,
) -> Option<ScheduleUpdate> {
    let interval = if series.is_pinned() {
        pinned_interval(series.fetch_interval)
    } else {
        estimate_interval_days(events, &reference.timezone())
    };
    resolve_update(series, interval, reference, window)
}

/// Returns the window `[yesterday 00:00, tomorrow 00:00 - 1ms]` around the
/// local day of `reference`, in epoch milliseconds.
#[must_use]
pub fn compute_window<Tz: TimeZone>(reference: &DateTime<Tz>) -> PollWindow {
    let zone = reference.timezone();
    let today = reference.date_naive();
    let grace = chrono::Days::new(GRACE_PERIOD_DAYS);

    let lower = start_of_day(&zone, today.checked_sub_days(grace).unwrap_or(today));
    let upper = start_of_day(&zone, today.checked_add_days(grace).unwrap_or(today));

    PollWindow {
        lower: lower.timestamp_millis(),
        upper: upper.timestamp_millis() - 1,
    }
}

/// Estimates the number of days between releases, clamped to
/// `MIN_INTERVAL..=MAX_INTERVAL`.
///
/// Upload dates are preferred; locally observed fetch dates are the
/// fallback when the source does not declare enough of them. Without
/// three distinct dates in either, the default of seven days applies.
#[must_use]
pub fn estimate_interval_days<Tz: TimeZone>(events: &[UpdateEvent], zone: &Tz) -> i32 {
    let sample = if events.len() <= SMALL_HISTORY {
        SHORT_SAMPLE
    } else {
        LONG_SAMPLE
    };

    let upload_dates = recent_dates(
        events
            .iter()
            .filter(|event| event.has_upload_date())
            .map(|event| event.upload_timestamp),
        zone,
        sample,
    );
    let fetch_dates = recent_dates(
        events.iter().map(|event| event.fetch_timestamp),
        zone,
        sample,
    );

    let cadence = if upload_dates.len() >= MIN_DISTINCT_DATES {
        average_gap(&upload_dates)
    } else if fetch_dates.len() >= MIN_DISTINCT_DATES {
        average_gap(&fetch_dates)
    } else {
        None
    };
    let interval = cadence.unwrap_or(i64::from(DEFAULT_INTERVAL));

    interval.clamp(i64::from(MIN_INTERVAL), i64::from(MAX_INTERVAL)) as i32
}

/// Grows `delta` geometrically while more than `double_when_over` cycles of
/// it would have elapsed in `days_since_anchor`, never exceeding
/// `MAX_INTERVAL`.
#[must_use]
pub fn double_interval(delta: i32, days_since_anchor: i64, double_when_over: i64) -> i32 {
    let mut delta = delta.max(MIN_INTERVAL);
    while delta < MAX_INTERVAL {
        let cycle = days_since_anchor.div_euclid(i64::from(delta)) + 1;
        if cycle <= double_when_over {
            return delta;
        }
        delta = delta.saturating_mul(2);
    }
    MAX_INTERVAL
}

/// Most recent distinct local dates among `timestamps`, newest first.
fn recent_dates<Tz: TimeZone>(
    timestamps: impl Iterator<Item = i64>,
    zone: &Tz,
    sample: usize,
) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = timestamps
        .filter_map(|millis| local_date(zone, millis).ok())
        .collect();
    dates.sort_unstable_by(|a, b| b.cmp(a));
    dates.dedup();
    dates.truncate(sample);
    dates
}

/// Average whole days between consecutive entries of a newest-first list.
///
/// Returns `None` for fewer than two dates, where no gap exists.
fn average_gap(dates: &[NaiveDate]) -> Option<i64> {
    let (newest, oldest) = (dates.first()?, dates.last()?);
    let spans = i64::try_from(dates.len().checked_sub(1)?).ok()?;
    (*newest - *oldest).num_days().checked_div_euclid(spans)
}

/// Normalizes a stored pin so its magnitude stays within bounds.
fn pinned_interval(raw: i32) -> i32 {
    -raw.saturating_abs().clamp(MIN_INTERVAL, MAX_INTERVAL)
}

fn resolve_update<Tz: TimeZone>(
    series: &SeriesState,
    interval: i32,
    reference: &DateTime<Tz>,
    window: PollWindow,
) -> Option<ScheduleUpdate> {
    let window = if window.is_unset() {
        compute_window(reference)
    } else {
        window
    };
    let next_update = next_update(series, interval, reference, window);

    if next_update == series.next_update && interval == series.fetch_interval {
        return None;
    }

    tracing::debug!(
        series = %series.id,
        interval,
        previous_interval = series.fetch_interval,
        next_update,
        previous_next_update = series.next_update,
        "Rescheduled series"
    );
    Some(ScheduleUpdate::new(series.id, next_update, interval))
}

/// Next poll time in epoch milliseconds.
///
/// A stored value inside `window` is kept unless the stored interval was
/// never initialized.
fn next_update<Tz: TimeZone>(
    series: &SeriesState,
    interval: i32,
    reference: &DateTime<Tz>,
    window: PollWindow,
) -> i64 {
    if window.contains(series.next_update) && series.fetch_interval != 0 {
        return series.next_update;
    }

    let zone = reference.timezone();
    let anchor_date = if series.last_update > 0 {
        local_date(&zone, series.last_update).unwrap_or_else(|_| reference.date_naive())
    } else {
        reference.date_naive()
    };
    let anchor = anchor_date.and_time(NaiveTime::MIN);
    let days_since_anchor = (reference.naive_local() - anchor).num_days();

    let days = interval.saturating_abs().max(MIN_INTERVAL);
    let divisor = if interval < 0 {
        days
    } else {
        double_interval(days, days_since_anchor, DOUBLE_WHEN_OVER)
    };
    let cycle = days_since_anchor.div_euclid(i64::from(divisor));

    let offset_millis = i64::from(reference.offset().fix().local_minus_utc()) * 1000;
    match shift_days(anchor, (cycle + 1).saturating_mul(i64::from(days))) {
        Some(next) => next.and_utc().timestamp_millis() - offset_millis,
        None => {
            tracing::warn!(
                series = %series.id,
                anchor = %anchor,
                "Next poll time out of range; keeping stored value"
            );
            series.next_update
        }
    }
}

fn shift_days(anchor: NaiveDateTime, days: i64) -> Option<NaiveDateTime> {
    anchor.checked_add_signed(TimeDelta::try_days(days)?)
}
