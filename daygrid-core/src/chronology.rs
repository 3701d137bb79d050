//! Ordered traversal over a day layout.
//!
//! The chronological order (all-day events first, then timed events by
//! ascending clamped start) is the basis for sequential next/prev
//! navigation, and `nearest_event` backs "jump to now" selection.

use crate::event::Event;
use crate::layout::DayLayout;

/// All-day events in stored order, then timed events in ascending start
/// order. Stable across repeated calls for the same layout.
pub fn chronological_order(layout: &DayLayout) -> Vec<&Event> {
    layout
        .all_day
        .iter()
        .chain(layout.timed.iter().map(|entry| &entry.event))
        .collect()
}

/// The timed event whose start minute is closest to `target_minute`, ties
/// going to the earlier event. Falls back to the first all-day event when
/// the day has no timed events, and `None` when the day is empty.
pub fn nearest_event<'a>(layout: &'a DayLayout, target_minute: u32) -> Option<&'a Event> {
    let mut best: Option<(u32, &Event)> = None;

    for entry in &layout.timed {
        let distance = entry.start_minutes.abs_diff(target_minute);
        // Strict improvement only, so the earlier candidate wins ties.
        if best.is_none_or(|(d, _)| distance < d) {
            best = Some((distance, &entry.event));
        }
    }

    best.map(|(_, event)| event)
        .or_else(|| layout.all_day.first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, EventStatus, EventTime};
    use crate::layout::layout_day;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use chrono_tz::Tz;

    const TZ: Tz = chrono_tz::UTC;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 5, 12, 0, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()
    }

    fn timed(id: &str, start_h: u32, end_h: u32) -> Event {
        Event {
            id: id.into(),
            summary: id.into(),
            description: None,
            location: None,
            start: EventTime::DateTimeUtc(Utc.with_ymd_and_hms(2024, 2, 5, start_h, 0, 0).unwrap()),
            end: EventTime::DateTimeUtc(Utc.with_ymd_and_hms(2024, 2, 5, end_h, 0, 0).unwrap()),
            status: EventStatus::Confirmed,
            recurrence: None,
            recurrence_id: None,
            organizer: None,
            attendees: vec![],
            updated: None,
        }
    }

    fn all_day(id: &str) -> Event {
        Event {
            start: EventTime::Date(day()),
            end: EventTime::Date(day() + chrono::Duration::days(1)),
            ..timed(id, 0, 0)
        }
    }

    #[test]
    fn test_all_day_before_timed_and_timed_ascending() {
        let layout = layout_day(
            &[timed("late", 15, 16), all_day("ad"), timed("early", 9, 10)],
            day(),
            TZ,
            now(),
        );
        let order: Vec<_> = chronological_order(&layout)
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(order, vec!["ad", "early", "late"]);
    }

    #[test]
    fn test_nearest_event_picks_minimum_distance() {
        let layout = layout_day(&[timed("a", 9, 10), timed("b", 14, 15)], day(), TZ, now());
        assert_eq!(nearest_event(&layout, 10 * 60).unwrap().id, "a");
        assert_eq!(nearest_event(&layout, 13 * 60).unwrap().id, "b");
    }

    #[test]
    fn test_nearest_event_tie_goes_to_earlier() {
        // 09:00 and 11:00 are equidistant from 10:00.
        let layout = layout_day(&[timed("a", 9, 10), timed("b", 11, 12)], day(), TZ, now());
        assert_eq!(nearest_event(&layout, 10 * 60).unwrap().id, "a");
    }

    #[test]
    fn test_nearest_event_falls_back_to_all_day_then_none() {
        let layout = layout_day(&[all_day("ad")], day(), TZ, now());
        assert_eq!(nearest_event(&layout, 600).unwrap().id, "ad");

        let empty = layout_day(&[], day(), TZ, now());
        assert!(nearest_event(&empty, 600).is_none());
    }
}
