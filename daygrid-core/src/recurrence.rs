//! RRULE expansion for recurring events.
//!
//! Expands a master recurring event into individual instances within a date
//! range, respecting EXDATEs and instance overrides (events carrying a
//! RECURRENCE-ID that points back at an occurrence).

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use rrule::RRuleSet;

use crate::event::{Event, EventTime, Recurrence};

/// Upper bound on generated occurrences per master within one range.
const MAX_OCCURRENCES: u16 = 365;

/// Build an iCalendar-format RRULE string for the rrule crate parser.
fn build_rrule_string(start: &EventTime, recurrence: &Recurrence) -> String {
    let mut lines = Vec::new();

    // DTSTART — the rrule crate needs a datetime, so all-day dates become midnight UTC
    let dtstart = match start {
        EventTime::Date(d) => format!("DTSTART:{}T000000Z", d.format("%Y%m%d")),
        EventTime::DateTimeUtc(dt) => format!("DTSTART:{}", dt.format("%Y%m%dT%H%M%SZ")),
        EventTime::DateTimeFloating(dt) => format!("DTSTART:{}Z", dt.format("%Y%m%dT%H%M%S")),
        EventTime::DateTimeZoned { datetime, tzid } => {
            format!("DTSTART;TZID={}:{}", tzid, datetime.format("%Y%m%dT%H%M%S"))
        }
    };
    lines.push(dtstart);

    lines.push(format!("RRULE:{}", recurrence.rrule));

    for exdate in &recurrence.exdates {
        let exdate_str = match exdate {
            EventTime::Date(d) => format!("EXDATE:{}T000000Z", d.format("%Y%m%d")),
            EventTime::DateTimeUtc(dt) => format!("EXDATE:{}", dt.format("%Y%m%dT%H%M%SZ")),
            EventTime::DateTimeFloating(dt) => format!("EXDATE:{}Z", dt.format("%Y%m%dT%H%M%S")),
            EventTime::DateTimeZoned { datetime, tzid } => {
                format!("EXDATE;TZID={}:{}", tzid, datetime.format("%Y%m%dT%H%M%S"))
            }
        };
        lines.push(exdate_str);
    }

    lines.join("\n")
}

/// Convert an rrule occurrence datetime back to an EventTime matching the master's variant.
fn occurrence_to_event_time(dt: &DateTime<rrule::Tz>, master_start: &EventTime) -> EventTime {
    match master_start {
        EventTime::Date(_) => EventTime::Date(dt.date_naive()),
        EventTime::DateTimeUtc(_) => EventTime::DateTimeUtc(dt.with_timezone(&Utc)),
        EventTime::DateTimeFloating(_) => EventTime::DateTimeFloating(dt.naive_utc()),
        EventTime::DateTimeZoned { tzid, .. } => EventTime::DateTimeZoned {
            datetime: dt.naive_local(),
            tzid: tzid.clone(),
        },
    }
}

/// Expand a recurring master into instances within [range_start, range_end].
///
/// - `overrides` maps occurrence key strings to override events; a matching
///   override replaces the generated instance, and consumed keys are
///   recorded in `consumed`.
/// - The master itself is NOT included; only instances with `recurrence_id`
///   set.
/// - An unparseable RRULE yields an empty expansion (the caller keeps the
///   master as a plain event so the series stays visible).
fn expand_recurring_event(
    master: &Event,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    overrides: &HashMap<String, Event>,
    consumed: &mut HashSet<String>,
) -> Option<Vec<Event>> {
    let recurrence = master.recurrence.as_ref()?;

    let rrule_str = build_rrule_string(&master.start, recurrence);
    let rrule_set: RRuleSet = rrule_str.parse().ok()?;

    // Subtract/add 1 second to make the range inclusive (after/before are exclusive).
    let tz: rrule::Tz = Utc.into();
    let after = (range_start - Duration::seconds(1)).with_timezone(&tz);
    let before = (range_end + Duration::seconds(1)).with_timezone(&tz);

    let result = rrule_set.after(after).before(before).all(MAX_OCCURRENCES);

    // Master event duration, carried onto every instance
    let duration = match (master.start.to_utc(), master.end.to_utc()) {
        (Some(s), Some(e)) => e - s,
        _ => Duration::zero(),
    };

    let mut events = Vec::new();

    for occ_dt in &result.dates {
        let occ_event_time = occurrence_to_event_time(occ_dt, &master.start);
        let key = occ_event_time.to_key_string();

        if let Some(override_event) = overrides.get(&key) {
            consumed.insert(key);
            events.push(override_event.clone());
            continue;
        }

        // Build instance end time preserving the master's EventTime variant
        let instance_end = match (&master.start, &master.end) {
            (EventTime::Date(d_start), EventTime::Date(d_end)) => {
                let day_diff = (*d_end - *d_start).num_days();
                EventTime::Date(occ_dt.date_naive() + Duration::days(day_diff))
            }
            (EventTime::DateTimeUtc(_), _) => {
                EventTime::DateTimeUtc(occ_dt.with_timezone(&Utc) + duration)
            }
            (EventTime::DateTimeFloating(_), _) => {
                EventTime::DateTimeFloating(occ_dt.naive_utc() + duration)
            }
            (EventTime::DateTimeZoned { tzid, .. }, _) => EventTime::DateTimeZoned {
                datetime: occ_dt.naive_local() + duration,
                tzid: tzid.clone(),
            },
            _ => EventTime::DateTimeUtc(occ_dt.with_timezone(&Utc) + duration),
        };

        events.push(Event {
            start: occ_event_time.clone(),
            end: instance_end,
            recurrence: None,
            recurrence_id: Some(occ_event_time),
            ..master.clone()
        });
    }

    Some(events)
}

/// Materialize a snapshot for a range: plain events pass through, recurring
/// masters are replaced by their in-range instances, and override events
/// appear exactly once (either consumed by their master's expansion or, when
/// the master is absent or out of range, kept as plain events).
pub fn expand_events(
    events: &[Event],
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
) -> Vec<Event> {
    // Overrides, grouped by master uid then occurrence key
    let mut overrides: HashMap<&str, HashMap<String, Event>> = HashMap::new();
    for event in events {
        if let Some(rid) = &event.recurrence_id {
            overrides
                .entry(event.id.as_str())
                .or_default()
                .insert(rid.to_key_string(), event.clone());
        }
    }

    let empty = HashMap::new();
    let mut consumed: HashSet<(String, String)> = HashSet::new();
    let mut expanded = Vec::new();

    for event in events {
        if event.recurrence_id.is_some() {
            continue; // handled via the override maps below
        }
        if event.recurrence.is_none() {
            expanded.push(event.clone());
            continue;
        }

        let own_overrides = overrides.get(event.id.as_str()).unwrap_or(&empty);
        let mut used = HashSet::new();
        match expand_recurring_event(event, range_start, range_end, own_overrides, &mut used) {
            Some(instances) => expanded.extend(instances),
            // Unparseable rule: keep the master visible as a one-off.
            None => expanded.push(event.clone()),
        }
        for key in used {
            consumed.insert((event.id.clone(), key));
        }
    }

    // Orphaned overrides (master missing, or occurrence outside the range)
    for event in events {
        if let Some(rid) = &event.recurrence_id {
            if !consumed.contains(&(event.id.clone(), rid.to_key_string())) {
                expanded.push(event.clone());
            }
        }
    }

    expanded
}
