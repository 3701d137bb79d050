use anyhow::Result;
use chrono::NaiveDate;
use chrono_tz::Tz;
use daygrid_core::source::{Clock, EventSource, SystemClock};
use daygrid_core::{DirectorySource, GlobalConfig, layout_day, recurrence};
use tracing::debug;

use crate::render::render_day;

pub fn run(config: &GlobalConfig, tz: Tz, date: Option<&str>) -> Result<()> {
    let clock = SystemClock;
    let now = clock.now();

    let day = match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| anyhow::anyhow!("Invalid date '{}'. Expected YYYY-MM-DD", s))?,
        None => now.with_timezone(&tz).date_naive(),
    };

    let source = DirectorySource::new(config.events_path());
    let events = source.events();
    debug!(count = events.len(), "loaded event snapshot");

    let range_start = daygrid_core::time::start_of_day(day - chrono::Duration::days(1), tz, now)
        .with_timezone(&chrono::Utc);
    let range_end = daygrid_core::time::start_of_day(day + chrono::Duration::days(2), tz, now)
        .with_timezone(&chrono::Utc);
    let events = recurrence::expand_events(&events, range_start, range_end);

    let layout = layout_day(&events, day, tz, now);
    println!("{}", render_day(&layout, None));

    Ok(())
}
