//! Terminal rendering for daygrid types.
//!
//! Extension traits that turn layouts and events into colored text using
//! owo_colors. The engine computes geometry; this module only draws it.

use daygrid_core::time::format_clock;
use daygrid_core::{DayLayout, Event, EventStatus, EventTime, ParticipationStatus};
use owo_colors::OwoColorize;

/// Extension trait for colored terminal rendering.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Event {
    fn render(&self) -> String {
        let summary = match self.status {
            EventStatus::Tentative => format!("{} {}", self.summary, "(tentative)".dimmed()),
            _ => self.summary.clone(),
        };

        match &self.location {
            Some(location) => format!("{} {}", summary, format!("@ {}", location).dimmed()),
            None => summary,
        }
    }
}

/// Render a full day layout: all-day strip first, then one line per timed
/// event under its starting hour. `selected` gets a marker and bold text.
pub fn render_day(layout: &DayLayout, selected: Option<&str>) -> String {
    let mut lines = Vec::new();

    lines.push(layout.day.format("%A, %B %-d, %Y").bold().to_string());

    if !layout.all_day.is_empty() {
        lines.push(format!("  {}", "all-day".dimmed()));
        for event in &layout.all_day {
            lines.push(event_line(event, "       ", 0, 1, selected));
        }
    }

    for hour in 0..24u32 {
        let entries: Vec<_> = layout.starting_in_hour(hour).collect();
        if entries.is_empty() {
            continue;
        }
        lines.push(format!("  {}", format!("{:02}:00", hour).dimmed()));
        for entry in entries {
            let time = format!(
                "{}–{}",
                format_clock(entry.start_minutes),
                format_clock(entry.end_minutes)
            );
            lines.push(event_line(
                &entry.event,
                &time,
                entry.column,
                entry.group_columns,
                selected,
            ));
        }
    }

    if layout.is_empty() {
        lines.push(format!("  {}", "No events".dimmed()));
    }

    lines.join("\n")
}

fn event_line(
    event: &Event,
    time: &str,
    column: usize,
    columns: usize,
    selected: Option<&str>,
) -> String {
    let is_selected = selected.is_some_and(|id| event.unique_id() == id);
    let marker = if is_selected { "▸" } else { " " };

    let body = if is_selected {
        event.render().bold().to_string()
    } else {
        event.render()
    };

    let column_tag = if columns > 1 {
        format!(" {}", format!("[{}/{}]", column + 1, columns).dimmed())
    } else {
        String::new()
    };

    format!("  {} {} {}{}", marker, time.dimmed(), body, column_tag)
}

/// One-line agenda entry: time in the display timezone, summary, and
/// declined/tentative markers.
pub fn render_agenda_line(
    event: &Event,
    tz: chrono_tz::Tz,
    now: chrono::DateTime<chrono::Utc>,
) -> String {
    let time = match &event.start {
        EventTime::Date(_) => "all-day".to_string(),
        t => daygrid_core::time::resolve(Some(t), tz, now)
            .format("%H:%M")
            .to_string(),
    };

    // Pad before styling: ANSI escape bytes would otherwise count toward
    // the field width and misalign timed rows against the all-day label.
    let time = format!("{:>7}", time);

    let declined = event
        .attendees
        .iter()
        .any(|a| a.is_self && a.response_status == Some(ParticipationStatus::Declined));

    if declined {
        format!("  {} {}", time.dimmed(), event.summary.strikethrough())
    } else {
        format!("  {} {}", time.dimmed(), event.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use daygrid_core::EventStatus;

    fn timed(start_h: u32) -> Event {
        Event {
            id: "evt@daygrid".into(),
            summary: "Team sync".into(),
            description: None,
            location: None,
            start: EventTime::DateTimeUtc(
                chrono::Utc.with_ymd_and_hms(2024, 2, 5, start_h, 0, 0).unwrap(),
            ),
            end: EventTime::DateTimeUtc(
                chrono::Utc.with_ymd_and_hms(2024, 2, 5, start_h + 1, 0, 0).unwrap(),
            ),
            status: EventStatus::Confirmed,
            recurrence: None,
            recurrence_id: None,
            organizer: None,
            attendees: vec![],
            updated: None,
        }
    }

    #[test]
    fn test_agenda_time_column_pads_to_all_day_width() {
        let now = chrono::Utc.with_ymd_and_hms(2024, 2, 5, 12, 0, 0).unwrap();
        let line = render_agenda_line(&timed(9), chrono_tz::UTC, now);
        // "09:00" right-justified in the 7-wide column "all-day" sets.
        assert!(line.contains("  09:00"), "unpadded time in {:?}", line);

        let mut all_day = timed(9);
        all_day.start = EventTime::Date(chrono::NaiveDate::from_ymd_opt(2024, 2, 5).unwrap());
        let line = render_agenda_line(&all_day, chrono_tz::UTC, now);
        assert!(line.contains("all-day"));
    }
}
