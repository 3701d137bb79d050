use anyhow::Result;
use chrono_tz::Tz;
use daygrid_core::chronology::nearest_event;
use daygrid_core::source::{Clock, EventSource, SystemClock};
use daygrid_core::time::clamped_minute_of_day;
use daygrid_core::{DirectorySource, GlobalConfig, layout_day, recurrence};
use owo_colors::OwoColorize;

use crate::render::Render;

/// Print the event on today's grid whose start is nearest to now.
pub fn run(config: &GlobalConfig, tz: Tz) -> Result<()> {
    let clock = SystemClock;
    let now = clock.now();
    let today = now.with_timezone(&tz).date_naive();

    let source = DirectorySource::new(config.events_path());
    let events = source.events();

    let range_start = daygrid_core::time::start_of_day(today - chrono::Duration::days(1), tz, now)
        .with_timezone(&chrono::Utc);
    let range_end = daygrid_core::time::start_of_day(today + chrono::Duration::days(2), tz, now)
        .with_timezone(&chrono::Utc);
    let events = recurrence::expand_events(&events, range_start, range_end);

    let layout = layout_day(&events, today, tz, now);
    let minute = clamped_minute_of_day(now.with_timezone(&tz), today, tz, now);

    match nearest_event(&layout, minute) {
        Some(event) => println!("{}", event.render()),
        None => println!("{}", "Nothing on today".dimmed()),
    }

    Ok(())
}
