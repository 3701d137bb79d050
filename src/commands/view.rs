use std::io::{BufRead, Write};

use anyhow::Result;
use chrono_tz::Tz;
use daygrid_core::{
    Action, ColumnMove, DayMove, DirectorySource, EventMove, GlobalConfig, OverlayKind, ScrollMove,
    Session, SystemClock,
};
use owo_colors::OwoColorize;
use tracing::debug;

use crate::render::render_day;

/// Interactive line-mode navigation: reads single-key commands from stdin
/// and redraws the selected day after each transition.
pub fn run(config: &GlobalConfig, tz: Tz) -> Result<()> {
    let mut session = Session::new(
        DirectorySource::new(config.events_path()),
        SystemClock,
        tz,
        config.view(),
    );

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    draw(&session, &mut stdout)?;

    for line in stdin.lock().lines() {
        let line = line?;
        let Some(key) = line.chars().next() else {
            draw(&session, &mut stdout)?;
            continue;
        };

        let action = match key {
            'j' => Some(Action::DayMove(DayMove::Down)),
            'k' => Some(Action::DayMove(DayMove::Up)),
            'J' => Some(Action::DayMove(DayMove::End)),
            'K' => Some(Action::DayMove(DayMove::Start)),
            'n' => Some(Action::EventMove(EventMove::Next)),
            'p' => Some(Action::EventMove(EventMove::Prev)),
            'g' => Some(Action::EventMove(EventMove::First)),
            'G' => Some(Action::EventMove(EventMove::Last)),
            'h' => Some(Action::ColumnMove(ColumnMove::Left)),
            'l' => Some(Action::ColumnMove(ColumnMove::Right)),
            'u' => Some(Action::Scroll(ScrollMove::Up)),
            'd' => Some(Action::Scroll(ScrollMove::Down)),
            't' => Some(Action::JumpToNow),
            '\t' => Some(Action::ToggleFocus),
            'o' => Some(Action::PushOverlay(OverlayKind::Details)),
            'x' => Some(Action::PopOverlay),
            '?' => {
                print_help();
                None
            }
            'q' => break,
            _ => None,
        };

        if let Some(action) = action {
            debug!(?action, "dispatch");
            session.dispatch(action);
        }
        draw(&session, &mut stdout)?;
    }

    Ok(())
}

fn draw(
    session: &Session<DirectorySource, SystemClock>,
    stdout: &mut std::io::Stdout,
) -> Result<()> {
    let layout = session.layout();
    let nav = session.nav();

    writeln!(stdout)?;
    writeln!(
        stdout,
        "{}",
        render_day(&layout, nav.selected_event.as_deref())
    )?;

    let mut status = format!("focus: {:?}", nav.focus);
    if session.view().columns > 1 {
        status.push_str(&format!("  column: {}", nav.focused_column + 1));
    }
    if !nav.overlay_stack().is_empty() {
        status.push_str(&format!("  overlays: {}", nav.overlay_stack().len()));
    }
    writeln!(stdout, "{}", status.dimmed())?;

    Ok(())
}

fn print_help() {
    println!(
        "j/k day  J/K half-window jump  n/p event  g/G first/last  \
         h/l column  u/d scroll  t now  o/x overlay  q quit"
    );
}
