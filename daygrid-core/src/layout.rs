//! Per-day geometric layout.
//!
//! Turns an unordered event snapshot into a deterministic layout for one
//! (day, timezone) pair: all-day strip, clamped timed-event geometry,
//! overlap grouping, greedy column packing, and an hour-bucket index.
//! The output is a frozen snapshot; callers never mutate it and every call
//! recomputes from scratch.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::event::{Event, EventStatus};
use crate::time;

/// Geometry for one timed event on one day. Never mutated after layout.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEventLayout {
    pub event: Event,
    /// Clamped minute-of-day start, in [0, 1440]
    pub start_minutes: u32,
    /// Clamped minute-of-day end, in [start_minutes, 1440]
    pub end_minutes: u32,
    /// Hour bucket containing the clamped start
    pub start_hour: u32,
    /// Last hour bucket the event touches
    pub end_hour: u32,
    /// Minutes past the start hour's boundary
    pub minute_offset: u32,
    pub duration_minutes: u32,
    /// Overlap-group id, dense from 0 in start order
    pub group: usize,
    /// Column within the group, 0-based
    pub column: usize,
    /// Total columns in this event's group
    pub group_columns: usize,
    /// Number of events in this event's group (1 for singletons)
    pub group_size: usize,
}

impl TimedEventLayout {
    pub fn has_overlap(&self) -> bool {
        self.group_size > 1
    }
}

/// Layout for one (day, timezone) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct DayLayout {
    pub day: NaiveDate,
    /// All-day events in input order
    pub all_day: Vec<Event>,
    /// Timed events ascending by clamped start (stable for equal starts)
    pub timed: Vec<TimedEventLayout>,
    /// Indices into `timed`, keyed by starting hour bucket
    hours: Vec<Vec<usize>>,
}

impl DayLayout {
    /// Timed events whose clamped start falls in hour bucket `hour` (0–23).
    pub fn starting_in_hour(&self, hour: u32) -> impl Iterator<Item = &TimedEventLayout> {
        self.hours
            .get(hour as usize)
            .into_iter()
            .flatten()
            .map(|&i| &self.timed[i])
    }

    pub fn is_empty(&self) -> bool {
        self.all_day.is_empty() && self.timed.is_empty()
    }
}

/// Compute the layout for `day` as displayed in `tz`.
///
/// Total over arbitrary input: cancelled events are dropped, events not on
/// the day are dropped, inverted intervals are normalized, everything else
/// clamps into the [0, 1440] minute window.
pub fn layout_day(events: &[Event], day: NaiveDate, tz: Tz, now: DateTime<Utc>) -> DayLayout {
    let mut all_day = Vec::new();
    let mut timed_input = Vec::new();

    for event in events {
        if event.status == EventStatus::Cancelled {
            continue;
        }
        if !time::falls_on_day(event, day, tz, now) {
            continue;
        }
        if event.is_all_day() {
            all_day.push(event.clone());
        } else {
            timed_input.push(event);
        }
    }

    let mut timed = resolve_and_clamp(&timed_input, day, tz, now);
    timed.sort_by_key(|entry| entry.start_minutes); // stable: input order breaks ties

    assign_overlap_groups(&mut timed);
    pack_columns(&mut timed);

    let mut hours: Vec<Vec<usize>> = vec![Vec::new(); 24];
    for (i, entry) in timed.iter().enumerate() {
        hours[entry.start_hour as usize].push(i);
    }

    DayLayout {
        day,
        all_day,
        timed,
        hours,
    }
}

/// Resolve start/end instants in `tz` and clamp them to the day window.
fn resolve_and_clamp(
    events: &[&Event],
    day: NaiveDate,
    tz: Tz,
    now: DateTime<Utc>,
) -> Vec<TimedEventLayout> {
    events
        .iter()
        .map(|event| {
            let start_instant = time::resolve(Some(&event.start), tz, now);
            let end_instant = time::resolve(Some(&event.end), tz, now).max(start_instant);

            let start_minutes = time::clamped_minute_of_day(start_instant, day, tz, now);
            let mut end_minutes = time::clamped_minute_of_day(end_instant, day, tz, now);
            // An event running past midnight clamps to the end of this day.
            if end_minutes < start_minutes {
                end_minutes = time::MINUTES_PER_DAY;
            }

            let start_hour = time::hour_bucket(start_minutes);
            let end_hour = time::hour_bucket(end_minutes.saturating_sub(1)).max(start_hour);

            TimedEventLayout {
                event: (*event).clone(),
                start_minutes,
                end_minutes,
                start_hour,
                end_hour,
                minute_offset: start_minutes - start_hour * 60,
                duration_minutes: end_minutes - start_minutes,
                group: 0,
                column: 0,
                group_columns: 1,
                group_size: 1,
            }
        })
        .collect()
}

/// Sweep the start-sorted list into maximal overlap groups. An event joins
/// the current group iff its start is strictly before the running group end.
fn assign_overlap_groups(timed: &mut [TimedEventLayout]) {
    let mut group = 0usize;
    let mut group_end = 0u32;
    let mut group_start_idx = 0usize;

    for i in 0..timed.len() {
        if i > 0 && timed[i].start_minutes >= group_end {
            finish_group(&mut timed[group_start_idx..i], group);
            group += 1;
            group_start_idx = i;
            group_end = 0;
        }
        group_end = group_end.max(timed[i].end_minutes);
    }
    if !timed.is_empty() {
        finish_group(&mut timed[group_start_idx..], group);
    }
}

fn finish_group(members: &mut [TimedEventLayout], group: usize) {
    let size = members.len();
    for entry in members {
        entry.group = group;
        entry.group_size = size;
    }
}

/// Greedy interval-graph coloring within each group: each event takes the
/// lowest column not held by a still-active earlier event. Deterministic
/// given the sorted input.
fn pack_columns(timed: &mut [TimedEventLayout]) {
    let mut start = 0;
    while start < timed.len() {
        let group = timed[start].group;
        let mut end = start;
        while end < timed.len() && timed[end].group == group {
            end += 1;
        }

        let members = &mut timed[start..end];
        // column index → end minute of the latest event placed there
        let mut column_ends: Vec<u32> = Vec::new();

        for i in 0..members.len() {
            let event_start = members[i].start_minutes;
            let column = column_ends
                .iter()
                .position(|&col_end| col_end <= event_start)
                .unwrap_or(column_ends.len());

            if column == column_ends.len() {
                column_ends.push(members[i].end_minutes);
            } else {
                column_ends[column] = members[i].end_minutes;
            }
            members[i].column = column;
        }

        let total = column_ends.len().max(1);
        for entry in members.iter_mut() {
            entry.group_columns = total;
        }

        start = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventStatus, EventTime};
    use chrono::TimeZone;

    const TZ: Tz = chrono_tz::UTC;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 5, 12, 0, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()
    }

    fn timed(id: &str, start_hm: (u32, u32), end_hm: (u32, u32)) -> Event {
        Event {
            id: id.into(),
            summary: id.into(),
            description: None,
            location: None,
            start: EventTime::DateTimeUtc(
                Utc.with_ymd_and_hms(2024, 2, 5, start_hm.0, start_hm.1, 0)
                    .unwrap(),
            ),
            end: EventTime::DateTimeUtc(
                Utc.with_ymd_and_hms(2024, 2, 5, end_hm.0, end_hm.1, 0).unwrap(),
            ),
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
            ..timed(id, (0, 0), (0, 0))
        }
    }

    fn entry<'a>(layout: &'a DayLayout, id: &str) -> &'a TimedEventLayout {
        layout.timed.iter().find(|e| e.event.id == id).unwrap()
    }

    #[test]
    fn test_cancelled_events_are_dropped() {
        let mut event = timed("a", (9, 0), (10, 0));
        event.status = EventStatus::Cancelled;
        let layout = layout_day(&[event], day(), TZ, now());
        assert!(layout.is_empty());
    }

    #[test]
    fn test_partition_all_day_vs_timed() {
        let layout = layout_day(
            &[all_day("ad"), timed("t", (9, 0), (10, 0))],
            day(),
            TZ,
            now(),
        );
        assert_eq!(layout.all_day.len(), 1);
        assert_eq!(layout.timed.len(), 1);
        assert_eq!(layout.all_day[0].id, "ad");
    }

    #[test]
    fn test_geometry_fields() {
        let layout = layout_day(&[timed("a", (9, 30), (10, 45))], day(), TZ, now());
        let a = entry(&layout, "a");
        assert_eq!(a.start_minutes, 570);
        assert_eq!(a.end_minutes, 645);
        assert_eq!(a.start_hour, 9);
        assert_eq!(a.end_hour, 10);
        assert_eq!(a.minute_offset, 30);
        assert_eq!(a.duration_minutes, 75);
    }

    #[test]
    fn test_end_hour_is_last_hour_touched() {
        let layout = layout_day(&[timed("a", (9, 0), (10, 0))], day(), TZ, now());
        assert_eq!(entry(&layout, "a").end_hour, 9);
    }

    #[test]
    fn test_overnight_event_clamps_to_day_window() {
        let mut event = timed("late", (23, 0), (23, 30));
        event.end = EventTime::DateTimeUtc(Utc.with_ymd_and_hms(2024, 2, 6, 1, 0, 0).unwrap());
        let layout = layout_day(&[event], day(), TZ, now());
        let late = entry(&layout, "late");
        assert_eq!(late.start_minutes, 1380);
        assert_eq!(late.end_minutes, 1440);
        assert_eq!(late.end_hour, 23);

        // Same event on the next day clamps to start at minute 0.
        let mut event = timed("late", (23, 0), (23, 30));
        event.end = EventTime::DateTimeUtc(Utc.with_ymd_and_hms(2024, 2, 6, 1, 0, 0).unwrap());
        let next_day = NaiveDate::from_ymd_opt(2024, 2, 6).unwrap();
        let layout = layout_day(&[event], next_day, TZ, now());
        let late = entry(&layout, "late");
        assert_eq!(late.start_minutes, 0);
        assert_eq!(late.end_minutes, 60);
    }

    #[test]
    fn test_two_overlapping_events_get_two_columns() {
        let layout = layout_day(
            &[timed("a", (9, 0), (10, 0)), timed("b", (9, 30), (10, 30))],
            day(),
            TZ,
            now(),
        );
        let a = entry(&layout, "a");
        let b = entry(&layout, "b");
        assert_eq!(a.group, b.group);
        assert_eq!(a.group_size, 2);
        assert!(a.has_overlap());
        assert_eq!(a.column, 0);
        assert_eq!(b.column, 1);
        assert_eq!(a.group_columns, 2);
        assert_eq!(b.group_columns, 2);
    }

    #[test]
    fn test_touching_events_do_not_group_nested_events_do() {
        // A 09:00–10:00, B 10:00–11:00 (touching), C 09:30–09:45 (nested in A)
        let layout = layout_day(
            &[
                timed("a", (9, 0), (10, 0)),
                timed("b", (10, 0), (11, 0)),
                timed("c", (9, 30), (9, 45)),
            ],
            day(),
            TZ,
            now(),
        );
        let a = entry(&layout, "a");
        let b = entry(&layout, "b");
        let c = entry(&layout, "c");

        assert_eq!(a.group, c.group);
        assert_ne!(a.group, b.group);
        assert_eq!(a.group_size, 2);
        assert_eq!(b.group_size, 1);
        assert!(!b.has_overlap());
        assert_eq!((a.column, c.column), (0, 1));
        assert_eq!(b.column, 0);
        assert_eq!(b.group_columns, 1);
    }

    #[test]
    fn test_column_reuse_after_event_ends() {
        // A 09:00–09:30, B 09:15–10:30, C 09:45–10:00: C reuses column 0.
        let layout = layout_day(
            &[
                timed("a", (9, 0), (9, 30)),
                timed("b", (9, 15), (10, 30)),
                timed("c", (9, 45), (10, 0)),
            ],
            day(),
            TZ,
            now(),
        );
        assert_eq!(entry(&layout, "a").column, 0);
        assert_eq!(entry(&layout, "b").column, 1);
        assert_eq!(entry(&layout, "c").column, 0);
        assert_eq!(entry(&layout, "a").group_columns, 2);
    }

    #[test]
    fn test_equal_start_times_pack_in_input_order() {
        let layout = layout_day(
            &[timed("x", (9, 0), (10, 0)), timed("y", (9, 0), (9, 30))],
            day(),
            TZ,
            now(),
        );
        assert_eq!(entry(&layout, "x").column, 0);
        assert_eq!(entry(&layout, "y").column, 1);
    }

    #[test]
    fn test_groups_partition_the_timed_list() {
        let events = [
            timed("a", (8, 0), (9, 0)),
            timed("b", (8, 30), (10, 0)),
            timed("c", (11, 0), (12, 0)),
            timed("d", (11, 30), (11, 45)),
            timed("e", (14, 0), (15, 0)),
        ];
        let layout = layout_day(&events, day(), TZ, now());

        // Every surviving event appears exactly once, groups are contiguous
        // and disjoint, and same-column members never overlap in time.
        assert_eq!(layout.timed.len(), 5);
        for pair in layout.timed.windows(2) {
            assert!(pair[0].start_minutes <= pair[1].start_minutes);
            assert!(pair[0].group <= pair[1].group);
        }
        for x in &layout.timed {
            assert!(x.start_minutes <= x.end_minutes);
            assert!(x.end_minutes <= 1440);
            for y in &layout.timed {
                if x.event.id != y.event.id && x.group == y.group && x.column == y.column {
                    let disjoint = x.end_minutes <= y.start_minutes || y.end_minutes <= x.start_minutes;
                    assert!(disjoint, "{} and {} share a column", x.event.id, y.event.id);
                }
            }
        }
    }

    #[test]
    fn test_hour_index_keyed_by_start_bucket() {
        let layout = layout_day(
            &[timed("a", (9, 15), (10, 0)), timed("b", (9, 45), (11, 0))],
            day(),
            TZ,
            now(),
        );
        let in_nine: Vec<_> = layout.starting_in_hour(9).map(|e| e.event.id.as_str()).collect();
        assert_eq!(in_nine, vec!["a", "b"]);
        assert_eq!(layout.starting_in_hour(10).count(), 0);
    }

    #[test]
    fn test_layout_is_idempotent() {
        let events = [
            all_day("ad"),
            timed("a", (9, 0), (10, 0)),
            timed("b", (9, 30), (10, 30)),
        ];
        let first = layout_day(&events, day(), TZ, now());
        let second = layout_day(&events, day(), TZ, now());
        assert_eq!(first, second);
    }
}
