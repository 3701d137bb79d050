//! Time normalization.
//!
//! Converts the four `EventTime` flavors into instants in a single display
//! timezone, and answers day-membership questions. Every function here is
//! total: malformed or missing input degrades to a deterministic fallback
//! instead of erroring.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::event::{Event, EventTime};

/// Minutes in a nominal day. Used as the clamp ceiling for day geometry.
pub const MINUTES_PER_DAY: u32 = 1440;

/// Resolve an event boundary into an instant in the display timezone `tz`.
///
/// - Zoned instants are interpreted in their own source tzid, then converted
///   to `tz`. An unparseable tzid degrades to floating interpretation.
/// - Floating instants are interpreted directly in `tz`.
/// - Date-only boundaries become start of day in `tz`.
/// - A missing boundary degrades to `now` in `tz`.
pub fn resolve(time: Option<&EventTime>, tz: Tz, now: DateTime<Utc>) -> DateTime<Tz> {
    match time {
        Some(EventTime::DateTimeUtc(dt)) => dt.with_timezone(&tz),
        Some(EventTime::DateTimeZoned { datetime, tzid }) => match tzid.parse::<Tz>() {
            Ok(source_tz) => resolve_local(*datetime, source_tz, now).with_timezone(&tz),
            Err(_) => resolve_local(*datetime, tz, now),
        },
        Some(EventTime::DateTimeFloating(dt)) => resolve_local(*dt, tz, now),
        Some(EventTime::Date(d)) => start_of_day(*d, tz, now),
        None => now.with_timezone(&tz),
    }
}

/// Start of the given calendar day in `tz`, DST-safe.
pub fn start_of_day(day: NaiveDate, tz: Tz, now: DateTime<Utc>) -> DateTime<Tz> {
    resolve_local(day.and_time(NaiveTime::MIN), tz, now)
}

/// Interpret a wall-clock time in `tz`, handling DST folds and gaps.
/// Ambiguous times take the earlier instant; times inside a spring-forward
/// gap shift forward past the gap.
fn resolve_local(naive: chrono::NaiveDateTime, tz: Tz, now: DateTime<Utc>) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) => dt,
        chrono::LocalResult::Ambiguous(earlier, _) => earlier,
        chrono::LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .unwrap_or_else(|| now.with_timezone(&tz)),
    }
}

/// Whether `event` should appear on `day` when displayed in `tz`.
///
/// All-day events compare raw calendar dates with the exclusive-end rule.
/// Timed events overlap-test their resolved interval against the day's
/// `[start-of-day, next-start-of-day)` window.
pub fn falls_on_day(event: &Event, day: NaiveDate, tz: Tz, now: DateTime<Utc>) -> bool {
    if event.is_all_day() {
        let start = event.start.date_naive();
        // End date ≤ start date appears in the wild; treat it as one day.
        let end = match &event.end {
            EventTime::Date(d) => (*d).max(start + Duration::days(1)),
            _ => start + Duration::days(1),
        };
        return start <= day && day < end;
    }

    let day_start = start_of_day(day, tz, now);
    let day_end = start_of_day(day + Duration::days(1), tz, now);
    let start = resolve(Some(&event.start), tz, now);
    let end = resolve(Some(&event.end), tz, now).max(start);

    if start == end {
        // Zero-length events belong to the day containing their instant.
        day_start <= start && start < day_end
    } else {
        start < day_end && end > day_start
    }
}

/// Minutes from local midnight of `day` to `instant`, clamped to [0, 1440].
pub fn clamped_minute_of_day(
    instant: DateTime<Tz>,
    day: NaiveDate,
    tz: Tz,
    now: DateTime<Utc>,
) -> u32 {
    let day_start = start_of_day(day, tz, now);
    let minutes = (instant - day_start).num_minutes();
    minutes.clamp(0, MINUTES_PER_DAY as i64) as u32
}

/// The hour bucket (0–23) containing a minute-of-day value.
pub fn hour_bucket(minute: u32) -> u32 {
    (minute / 60).min(23)
}

/// Format a minute-of-day as "HH:MM". Minute 1440 renders as "24:00".
pub fn format_clock(minute: u32) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}
