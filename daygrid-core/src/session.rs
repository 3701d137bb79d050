//! One running view session.
//!
//! The single mutable owner of navigation state, wired to an event source
//! and a clock. User input arrives as discrete `Action` values; the session
//! applies the transition atomically and the renderer reads state back
//! through the query surface. Layouts are recomputed from a fresh snapshot
//! on every call, so a background refresh can never leave stale geometry
//! behind.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::chronology;
use crate::config::ViewConfig;
use crate::layout::{self, DayLayout};
use crate::navigation::{
    ColumnMove, DayMove, EventMove, NavigationState, OverlayKind, ScrollMove,
};
use crate::recurrence;
use crate::source::{Clock, EventSource};
use crate::time;

/// A discrete user intent, dispatched by the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    DayMove(DayMove),
    EventMove(EventMove),
    ColumnMove(ColumnMove),
    Scroll(ScrollMove),
    PushOverlay(OverlayKind),
    PopOverlay,
    ToggleFocus,
    /// Select today, pick the event nearest to now, scroll it into view
    JumpToNow,
}

pub struct Session<S: EventSource, C: Clock> {
    source: S,
    clock: C,
    tz: Tz,
    view: ViewConfig,
    nav: NavigationState,
}

impl<S: EventSource, C: Clock> Session<S, C> {
    pub fn new(source: S, clock: C, tz: Tz, view: ViewConfig) -> Self {
        let today = clock.now().with_timezone(&tz).date_naive();
        Session {
            source,
            clock,
            tz,
            view,
            nav: NavigationState::new(today),
        }
    }

    // === Query surface ===

    pub fn nav(&self) -> &NavigationState {
        &self.nav
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn view(&self) -> ViewConfig {
        self.view
    }

    /// The day event navigation and the renderer operate on: the selected
    /// day, or in multi-column mode the focused column's slot within its
    /// group.
    pub fn focused_day(&self) -> NaiveDate {
        self.nav.focused_day(self.view.columns)
    }

    /// Layout for the focused day, from a fresh snapshot.
    pub fn layout(&self) -> DayLayout {
        self.layout_for(self.focused_day())
    }

    /// Layout for an arbitrary day (multi-column renderers call this once
    /// per visible day).
    pub fn layout_for(&self, day: NaiveDate) -> DayLayout {
        let now = self.clock.now();
        let events = self.snapshot_around(day, now);
        layout::layout_day(&events, day, self.tz, now)
    }

    // === Transitions ===

    /// Apply one discrete action. Total: malformed or out-of-range input
    /// clamps or no-ops, and the state is never left mid-transition.
    pub fn dispatch(&mut self, action: Action) {
        let now = self.clock.now();

        match action {
            Action::DayMove(mv) => {
                self.nav.move_day(mv, self.view.window_rows, self.view.columns);
                self.reselect(now);
            }
            Action::EventMove(mv) => {
                let layout = self.layout();
                // A missing selection is not a dangling one: move_event
                // treats it as index −1 so the first move lands on the
                // first event. Only a selection the snapshot dropped gets
                // re-derived here.
                if self.nav.selected_event.is_some() {
                    self.nav
                        .reconcile_selection(&layout, self.minute_of_now(now));
                }
                let order = chronology::chronological_order(&layout);
                self.nav.move_event(mv, &order);
            }
            Action::ColumnMove(mv) => {
                self.nav
                    .move_column(mv, self.view.window_rows, self.view.columns);
                self.reselect(now);
            }
            Action::Scroll(mv) => self.nav.scroll(mv),
            Action::PushOverlay(kind) => self.nav.push_overlay(kind),
            Action::PopOverlay => self.nav.pop_overlay(),
            Action::ToggleFocus => self.nav.toggle_focus(),
            Action::JumpToNow => {
                self.nav.selected_day = now.with_timezone(&self.tz).date_naive();
                self.nav.anchor_day = self.nav.selected_day;
                self.nav.align_column_to_selection(self.view.columns);
                let minute = self.minute_of_now(now);
                let layout = self.layout();
                self.nav.selected_event = None;
                self.nav.reconcile_selection(&layout, minute);
                self.nav.scroll_to_minute(minute);
            }
        }
    }

    /// After a day change the previous selection usually no longer exists
    /// on the new day; re-derive it against the new layout.
    fn reselect(&mut self, now: DateTime<Utc>) {
        let layout = self.layout();
        self.nav.reconcile_selection(&layout, self.minute_of_now(now));
    }

    fn minute_of_now(&self, now: DateTime<Utc>) -> u32 {
        time::clamped_minute_of_day(now.with_timezone(&self.tz), self.focused_day(), self.tz, now)
    }

    /// Fresh snapshot with recurring masters expanded around `day`. The
    /// expansion window is padded a day on each side so midnight-crossing
    /// instances from neighboring days clamp into view correctly.
    fn snapshot_around(&self, day: NaiveDate, now: DateTime<Utc>) -> Vec<crate::event::Event> {
        let events = self.source.events();
        let window_days = self.view.window_rows as i64 * self.view.columns as i64;
        let start = time::start_of_day(day - Duration::days(window_days + 1), self.tz, now)
            .with_timezone(&Utc);
        let end = time::start_of_day(day + Duration::days(window_days + 1), self.tz, now)
            .with_timezone(&Utc);
        recurrence::expand_events(&events, start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, EventStatus, EventTime};
    use crate::navigation::FocusContext;
    use crate::source::{FixedClock, StaticSource};
    use chrono::TimeZone;

    fn timed(id: &str, day: u32, start_h: u32) -> Event {
        Event {
            id: id.into(),
            summary: id.into(),
            description: None,
            location: None,
            start: EventTime::DateTimeUtc(Utc.with_ymd_and_hms(2024, 2, day, start_h, 0, 0).unwrap()),
            end: EventTime::DateTimeUtc(
                Utc.with_ymd_and_hms(2024, 2, day, start_h + 1, 0, 0).unwrap(),
            ),
            status: EventStatus::Confirmed,
            recurrence: None,
            recurrence_id: None,
            organizer: None,
            attendees: vec![],
            updated: None,
        }
    }

    fn session(events: Vec<Event>) -> Session<StaticSource, FixedClock> {
        Session::new(
            StaticSource { events },
            FixedClock(Utc.with_ymd_and_hms(2024, 2, 5, 12, 0, 0).unwrap()),
            chrono_tz::UTC,
            ViewConfig::default(),
        )
    }

    #[test]
    fn test_starts_on_today_in_display_timezone() {
        let s = session(vec![]);
        assert_eq!(
            s.nav().selected_day,
            NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()
        );
        assert_eq!(s.nav().focus, FocusContext::Days);
    }

    #[test]
    fn test_day_move_reselects_on_new_day() {
        let mut s = session(vec![timed("today", 5, 9), timed("tomorrow", 6, 15)]);
        s.dispatch(Action::EventMove(EventMove::Next));
        assert_eq!(s.nav().selected_event.as_deref(), Some("today"));

        s.dispatch(Action::DayMove(DayMove::Down));
        assert_eq!(s.nav().selected_event.as_deref(), Some("tomorrow"));
    }

    #[test]
    fn test_first_event_move_with_no_selection_lands_on_first() {
        // Nearest to the noon clock would be "b"; with nothing selected the
        // first move must land on the first chronological event instead.
        let mut s = session(vec![timed("a", 5, 9), timed("b", 5, 14)]);
        s.dispatch(Action::EventMove(EventMove::Next));
        assert_eq!(s.nav().selected_event.as_deref(), Some("a"));

        let mut s = session(vec![timed("a", 5, 9), timed("b", 5, 14)]);
        s.dispatch(Action::EventMove(EventMove::Prev));
        assert_eq!(s.nav().selected_event.as_deref(), Some("a"));
    }

    #[test]
    fn test_event_move_follows_focused_column() {
        // 2024-02-05 opens a 3-day column group: Mon/Tue/Wed side by side.
        let mut s = Session::new(
            StaticSource {
                events: vec![timed("mon", 5, 9), timed("tue", 6, 9)],
            },
            FixedClock(Utc.with_ymd_and_hms(2024, 2, 5, 12, 0, 0).unwrap()),
            chrono_tz::UTC,
            ViewConfig {
                columns: 3,
                window_rows: 10,
            },
        );

        s.dispatch(Action::ColumnMove(ColumnMove::Right));
        assert_eq!(
            s.focused_day(),
            NaiveDate::from_ymd_opt(2024, 2, 6).unwrap()
        );
        s.dispatch(Action::EventMove(EventMove::Next));
        assert_eq!(s.nav().selected_event.as_deref(), Some("tue"));
        assert_eq!(s.layout().timed[0].event.id, "tue");

        // Jumping to now re-points the column at today.
        s.dispatch(Action::JumpToNow);
        assert_eq!(
            s.focused_day(),
            NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()
        );
        assert_eq!(s.nav().selected_event.as_deref(), Some("mon"));
    }

    #[test]
    fn test_snapshot_change_is_tolerated() {
        // The selected event disappears from the source between dispatches.
        let mut s = session(vec![timed("a", 5, 9), timed("b", 5, 14)]);
        s.dispatch(Action::EventMove(EventMove::Next));
        assert_eq!(s.nav().selected_event.as_deref(), Some("a"));

        s.source.events.retain(|e| e.id != "a");
        s.dispatch(Action::EventMove(EventMove::Next));
        // Selection re-derived (nearest to 12:00 is "b"), then moved within
        // the remaining single-event list.
        assert_eq!(s.nav().selected_event.as_deref(), Some("b"));
    }

    #[test]
    fn test_jump_to_now_selects_nearest_and_scrolls() {
        let mut s = session(vec![timed("morning", 5, 9), timed("evening", 5, 20)]);
        s.dispatch(Action::DayMove(DayMove::Down));
        s.dispatch(Action::JumpToNow);

        assert_eq!(
            s.nav().selected_day,
            NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()
        );
        // Noon is closer to 09:00 than 20:00.
        assert_eq!(s.nav().selected_event.as_deref(), Some("morning"));
        assert_eq!(s.nav().scroll_offset, 12 * 60 / 15);
    }

    #[test]
    fn test_recurring_events_materialize_in_layout() {
        let mut weekly = timed("weekly", 5, 9);
        weekly.recurrence = Some(crate::event::Recurrence {
            rrule: "FREQ=WEEKLY".into(),
            exdates: vec![],
        });
        let s = session(vec![weekly]);

        let next_week = NaiveDate::from_ymd_opt(2024, 2, 12).unwrap();
        let layout = s.layout_for(next_week);
        assert_eq!(layout.timed.len(), 1);
        assert_eq!(layout.timed[0].event.id, "weekly");
        assert_eq!(layout.timed[0].start_minutes, 9 * 60);
    }

    #[test]
    fn test_overlay_flow_through_dispatch() {
        let mut s = session(vec![]);
        s.dispatch(Action::ToggleFocus);
        assert_eq!(s.nav().focus, FocusContext::Timeline);

        s.dispatch(Action::PushOverlay(OverlayKind::Dialog));
        assert_eq!(s.nav().focus, FocusContext::Dialog);
        s.dispatch(Action::ToggleFocus); // no-op under overlay
        assert_eq!(s.nav().focus, FocusContext::Dialog);

        s.dispatch(Action::PopOverlay);
        assert_eq!(s.nav().focus, FocusContext::Timeline);
    }
}
