use anyhow::Result;
use chrono::Duration;
use chrono_tz::Tz;
use daygrid_core::chronology::chronological_order;
use daygrid_core::source::{Clock, EventSource, SystemClock};
use daygrid_core::{DirectorySource, GlobalConfig, layout_day, recurrence};
use owo_colors::OwoColorize;
use tracing::debug;

use crate::render::render_agenda_line;

/// List upcoming events day by day, one chronologically ordered block per
/// day that has anything on it.
pub fn run(config: &GlobalConfig, tz: Tz, days: i64) -> Result<()> {
    let clock = SystemClock;
    let now = clock.now();
    let today = now.with_timezone(&tz).date_naive();
    let days = days.clamp(1, 365);

    let source = DirectorySource::new(config.events_path());
    let events = source.events();
    debug!(count = events.len(), "loaded event snapshot");

    let range_start =
        daygrid_core::time::start_of_day(today - Duration::days(1), tz, now).with_timezone(&chrono::Utc);
    let range_end = daygrid_core::time::start_of_day(today + Duration::days(days + 1), tz, now)
        .with_timezone(&chrono::Utc);
    let events = recurrence::expand_events(&events, range_start, range_end);

    let mut printed_any = false;

    for offset in 0..days {
        let day = today + Duration::days(offset);
        let layout = layout_day(&events, day, tz, now);
        if layout.is_empty() {
            continue;
        }

        if printed_any {
            println!();
        }
        println!("{}", date_label(offset, day).bold());
        for event in chronological_order(&layout) {
            println!("{}", render_agenda_line(event, tz, now));
        }
        printed_any = true;
    }

    if !printed_any {
        println!("{}", "No events found".dimmed());
    }

    Ok(())
}

/// Human-readable day label (e.g. "Today", "Tomorrow", "Wed Feb 25")
fn date_label(offset: i64, day: chrono::NaiveDate) -> String {
    match offset {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => day.format("%a %b %-d").to_string(),
    }
}
