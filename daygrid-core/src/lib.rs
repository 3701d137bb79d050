//! Core engine for the daygrid calendar client.
//!
//! This crate is the pure, synchronous half of daygrid:
//! - `event` — provider-neutral calendar event types
//! - `time` — timezone normalization and day-membership
//! - `layout` — per-day geometry (overlap groups, column packing)
//! - `chronology` — ordered traversal and nearest-event lookup
//! - `navigation` / `session` — the keyboard navigation state machine
//! - `source`, `ics`, `recurrence`, `config` — the collaborators the engine
//!   reads from: ICS directory snapshots, RRULE expansion, configuration
//!
//! Everything here is total over messy input: no layout or navigation call
//! panics or returns an error for ordinary calendar data.

pub mod chronology;
pub mod config;
pub mod error;
pub mod event;
pub mod ics;
pub mod layout;
pub mod navigation;
pub mod recurrence;
pub mod session;
pub mod source;
pub mod time;

// Re-export the types collaborators touch most
pub use config::{GlobalConfig, ViewConfig};
pub use error::{DaygridError, DaygridResult};
pub use event::{Attendee, Event, EventStatus, EventTime, ParticipationStatus, Recurrence};
pub use layout::{DayLayout, TimedEventLayout, layout_day};
pub use navigation::{
    ColumnMove, DayMove, EventMove, FocusContext, NavigationState, Overlay, OverlayKind,
    PendingAction, ScrollMove,
};
pub use session::{Action, Session};
pub use source::{Clock, DirectorySource, EventSource, FixedClock, StaticSource, SystemClock};
