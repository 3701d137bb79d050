//! External collaborators: event snapshots and the clock.
//!
//! The engine never does I/O of its own; it pulls a fresh snapshot through
//! `EventSource` on every layout and reads time through `Clock`, so tests
//! and alternative providers plug in without touching the core.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

use crate::event::Event;
use crate::ics;

/// Snapshot provider: the current best-known event set. May be called
/// arbitrarily often; implementations cache, the engine does not.
pub trait EventSource {
    fn events(&self) -> Vec<Event>;
}

/// A directory of .ics files, one event per file. Unparseable files are
/// skipped rather than failing the snapshot.
pub struct DirectorySource {
    path: PathBuf,
}

impl DirectorySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DirectorySource { path: path.into() }
    }
}

impl EventSource for DirectorySource {
    fn events(&self) -> Vec<Event> {
        let Ok(entries) = std::fs::read_dir(&self.path) else {
            return Vec::new();
        };

        entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|e| e == "ics"))
            .filter_map(|path| std::fs::read_to_string(&path).ok())
            .filter_map(|content| ics::parse_event(&content))
            .collect()
    }
}

/// An in-memory snapshot, used by tests and by callers that already hold
/// their events.
pub struct StaticSource {
    pub events: Vec<Event>,
}

impl EventSource for StaticSource {
    fn events(&self) -> Vec<Event> {
        self.events.clone()
    }
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a fixed instant, for deterministic tests.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
