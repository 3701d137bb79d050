//! Navigation state machine.
//!
//! Owns everything the renderer needs to know about where the user is:
//! selected day, view anchor, selected event, focus context, overlay stack,
//! focused column and scroll offset. State changes only through the
//! transition methods here, and every transition is total: out-of-range
//! moves clamp, empty lists are no-ops, dangling selections are re-derived.

use chrono::{Datelike, Duration, NaiveDate};

use crate::chronology;
use crate::event::Event;
use crate::layout::DayLayout;

/// Scroll granularity: one slot is 15 minutes, 96 slots per day.
pub const SLOT_MINUTES: u32 = 15;
const MAX_SCROLL_SLOT: u32 = 95;

/// The currently active navigable UI region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusContext {
    Days,
    Timeline,
    Details,
    Dialog,
    Command,
    Confirm,
    Notifications,
    Calendars,
    Search,
}

/// Modal UI states that stack on top of the base view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    Details,
    Dialog,
    Confirm,
    Command,
    Notifications,
    Calendars,
    Search,
}

impl OverlayKind {
    fn focus_context(self) -> FocusContext {
        match self {
            OverlayKind::Details => FocusContext::Details,
            OverlayKind::Dialog => FocusContext::Dialog,
            OverlayKind::Confirm => FocusContext::Confirm,
            OverlayKind::Command => FocusContext::Command,
            OverlayKind::Notifications => FocusContext::Notifications,
            OverlayKind::Calendars => FocusContext::Calendars,
            OverlayKind::Search => FocusContext::Search,
        }
    }
}

/// An active overlay, remembering the focus context to restore on dismissal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlay {
    pub kind: OverlayKind,
    saved_focus: FocusContext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayMove {
    Up,
    Down,
    /// Coarse jump back by half the visible window
    Start,
    /// Coarse jump forward by half the visible window
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventMove {
    Next,
    Prev,
    First,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnMove {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMove {
    Up,
    Down,
}

/// An action awaiting confirmation through a Confirm overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    DeleteEvent { event_id: String },
}

/// Selection and focus state for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationState {
    pub selected_day: NaiveDate,
    /// Center of the visible day window; lags the selection to avoid
    /// re-centering on every single-step move.
    pub anchor_day: NaiveDate,
    pub selected_event: Option<String>,
    pub focus: FocusContext,
    overlays: Vec<Overlay>,
    pub focused_column: usize,
    /// Vertical timeline offset in 15-minute slots
    pub scroll_offset: u32,
    edit_buffer: String,
    pending: Option<PendingAction>,
}

impl NavigationState {
    pub fn new(today: NaiveDate) -> Self {
        NavigationState {
            selected_day: today,
            anchor_day: today,
            selected_event: None,
            focus: FocusContext::Days,
            overlays: Vec::new(),
            focused_column: 0,
            scroll_offset: 0,
            edit_buffer: String::new(),
            pending: None,
        }
    }

    pub fn overlay_stack(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn edit_buffer(&self) -> &str {
        &self.edit_buffer
    }

    pub fn set_edit_buffer(&mut self, text: impl Into<String>) {
        self.edit_buffer = text.into();
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn set_pending(&mut self, action: PendingAction) {
        self.pending = Some(action);
    }

    // === Day selection ===

    pub fn move_day(&mut self, mv: DayMove, window_rows: u16, columns: usize) {
        let half_window = (window_rows as i64 / 2).max(1);
        let delta = match mv {
            DayMove::Up => -1,
            DayMove::Down => 1,
            DayMove::Start => -half_window,
            DayMove::End => half_window,
        };
        self.selected_day += Duration::days(delta);
        self.keep_selection_visible(window_rows, columns);
    }

    /// Shift the anchor by the minimum needed to keep the selection boundary
    /// inside the visible window. In multi-column mode the boundary is the
    /// last day of the selection's column group.
    fn keep_selection_visible(&mut self, window_rows: u16, columns: usize) {
        let columns = columns.max(1) as i64;
        let span = (window_rows.max(1) as i64) * columns;
        let low = self.anchor_day - Duration::days(span / 2);
        let high = low + Duration::days(span - 1);

        let boundary = if columns > 1 {
            // Column groups tile absolutely by day number.
            let from_ce = self.selected_day.num_days_from_ce() as i64;
            let group_last = from_ce.div_euclid(columns) * columns + columns - 1;
            self.selected_day + Duration::days(group_last - from_ce)
        } else {
            self.selected_day
        };

        if boundary < low {
            self.anchor_day -= low - boundary;
        } else if boundary > high {
            self.anchor_day += boundary - high;
        }
    }

    // === Event selection ===

    /// Move the event selection over the day's chronological order.
    /// With no current selection the index acts as −1, so the first move in
    /// either direction lands on the first event. Clamps at both ends.
    pub fn move_event(&mut self, mv: EventMove, order: &[&Event]) {
        if order.is_empty() {
            return;
        }

        // Selection keys on unique_id so recurring-series instances that
        // share a uid stay distinguishable.
        let current = self
            .selected_event
            .as_deref()
            .and_then(|id| order.iter().position(|e| e.unique_id() == id))
            .map(|i| i as i64)
            .unwrap_or(-1);

        let last = order.len() as i64 - 1;
        let target = match mv {
            EventMove::Next => (current + 1).clamp(0, last),
            EventMove::Prev => (current - 1).clamp(0, last),
            EventMove::First => 0,
            EventMove::Last => last,
        };

        self.selected_event = Some(order[target as usize].unique_id());
    }

    /// Drop a dangling selection and re-derive it from the layout, so a
    /// background refresh that removed the selected event never crashes
    /// navigation. `target_minute` steers the re-derived pick.
    pub fn reconcile_selection(&mut self, layout: &DayLayout, target_minute: u32) {
        let still_present = self.selected_event.as_deref().is_some_and(|id| {
            layout.all_day.iter().any(|e| e.unique_id() == id)
                || layout.timed.iter().any(|e| e.event.unique_id() == id)
        });

        if !still_present {
            self.selected_event =
                chronology::nearest_event(layout, target_minute).map(|e| e.unique_id());
        }
    }

    // === Column focus ===

    /// The day the focused column shows: the focused slot within the
    /// selected day's column group. In single-column mode this is the
    /// selected day itself.
    pub fn focused_day(&self, columns: usize) -> NaiveDate {
        if columns <= 1 {
            return self.selected_day;
        }
        let columns = columns as i64;
        let from_ce = self.selected_day.num_days_from_ce() as i64;
        let group_start = from_ce.div_euclid(columns) * columns;
        self.selected_day + Duration::days(group_start + self.focused_column as i64 - from_ce)
    }

    /// Point the focused column at the selected day's own slot, so
    /// `focused_day` and `selected_day` coincide again.
    pub fn align_column_to_selection(&mut self, columns: usize) {
        if columns > 1 {
            self.focused_column =
                (self.selected_day.num_days_from_ce() as i64).rem_euclid(columns as i64) as usize;
        }
    }

    /// Move the focused column. At the edges the selected day rolls over by
    /// one while the column index stays put. Single-column mode degenerates
    /// to plain day navigation.
    pub fn move_column(&mut self, mv: ColumnMove, window_rows: u16, columns: usize) {
        if columns <= 1 {
            self.selected_day += match mv {
                ColumnMove::Left => Duration::days(-1),
                ColumnMove::Right => Duration::days(1),
            };
            self.keep_selection_visible(window_rows, columns);
            return;
        }

        match mv {
            ColumnMove::Left => {
                if self.focused_column > 0 {
                    self.focused_column -= 1;
                } else {
                    self.selected_day -= Duration::days(1);
                }
            }
            ColumnMove::Right => {
                if self.focused_column + 1 < columns {
                    self.focused_column += 1;
                } else {
                    self.selected_day += Duration::days(1);
                }
            }
        }
        self.keep_selection_visible(window_rows, columns);
    }

    // === Overlays ===

    pub fn push_overlay(&mut self, kind: OverlayKind) {
        self.overlays.push(Overlay {
            kind,
            saved_focus: self.focus,
        });
        self.focus = kind.focus_context();
    }

    /// Pop the top overlay, restoring the focus context recorded at push
    /// time and running overlay-kind-specific cleanup. No-op on an empty
    /// stack.
    pub fn pop_overlay(&mut self) {
        let Some(overlay) = self.overlays.pop() else {
            return;
        };

        match overlay.kind {
            OverlayKind::Dialog => self.edit_buffer.clear(),
            OverlayKind::Confirm => self.pending = None,
            _ => {}
        }

        self.focus = overlay.saved_focus;
    }

    // === Focus toggle ===

    /// Swap between the two sibling base contexts. No-op while any overlay
    /// is active.
    pub fn toggle_focus(&mut self) {
        if !self.overlays.is_empty() {
            return;
        }
        self.focus = match self.focus {
            FocusContext::Days => FocusContext::Timeline,
            FocusContext::Timeline => FocusContext::Days,
            other => other,
        };
    }

    // === Scrolling ===

    pub fn scroll(&mut self, mv: ScrollMove) {
        self.scroll_offset = match mv {
            ScrollMove::Up => self.scroll_offset.saturating_sub(1),
            ScrollMove::Down => (self.scroll_offset + 1).min(MAX_SCROLL_SLOT),
        };
    }

    /// Scroll so the given minute-of-day's slot is in view.
    pub fn scroll_to_minute(&mut self, minute: u32) {
        self.scroll_offset = (minute / SLOT_MINUTES).min(MAX_SCROLL_SLOT);
    }
}
