//! Provider-neutral event types.
//!
//! These types represent calendar events in a provider-agnostic way.
//! Sources convert whatever they read (ICS files, provider snapshots) into
//! these types, and the layout/navigation engine works exclusively with them.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A calendar event (provider-neutral)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    pub status: EventStatus,

    // Recurrence fields
    /// RRULE + EXDATEs for master events
    pub recurrence: Option<Recurrence>,
    /// Original start time for this instance (RECURRENCE-ID)
    pub recurrence_id: Option<EventTime>,

    // Meeting data
    pub organizer: Option<Attendee>,
    pub attendees: Vec<Attendee>,

    /// Last modification timestamp (LAST-MODIFIED)
    pub updated: Option<DateTime<Utc>>,
}

impl Event {
    /// Identity that distinguishes recurring-event instances sharing a uid.
    pub fn unique_id(&self) -> String {
        match &self.recurrence_id {
            Some(rid) => format!("{}::{}", self.id, rid.to_key_string()),
            None => self.id.clone(),
        }
    }

    /// All-day events are expressed as calendar dates only.
    pub fn is_all_day(&self) -> bool {
        matches!(self.start, EventTime::Date(_))
    }
}

/// Recurrence definition carried by a master event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recurrence {
    /// RRULE body, e.g. "FREQ=WEEKLY;BYDAY=MO"
    pub rrule: String,
    /// Occurrences removed from the series
    pub exdates: Vec<EventTime>,
}

/// An event attendee (also used for organizer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub name: Option<String>,
    pub email: String,
    pub response_status: Option<ParticipationStatus>,
    /// Whether this attendee is the account owner
    pub is_self: bool,
}

/// PARTSTAT values relevant to display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipationStatus {
    Accepted,
    Declined,
    Tentative,
    NeedsAction,
}

impl ParticipationStatus {
    pub fn from_ics_str(value: &str) -> Option<Self> {
        match value {
            "ACCEPTED" => Some(ParticipationStatus::Accepted),
            "DECLINED" => Some(ParticipationStatus::Declined),
            "TENTATIVE" => Some(ParticipationStatus::Tentative),
            "NEEDS-ACTION" => Some(ParticipationStatus::NeedsAction),
            _ => None,
        }
    }
}

/// An event boundary: either a bare calendar date (all-day, end exclusive)
/// or an instant in one of three timezone flavors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventTime {
    /// All-day date. End dates are exclusive: Feb 5–6 inclusive is stored
    /// with end date Feb 7.
    Date(NaiveDate),
    /// Instant pinned to UTC
    DateTimeUtc(DateTime<Utc>),
    /// Wall-clock time with no timezone; interpreted in the display timezone
    DateTimeFloating(NaiveDateTime),
    /// Wall-clock time in an explicit source timezone
    DateTimeZoned { datetime: NaiveDateTime, tzid: String },
}

impl EventTime {
    /// The calendar date of this boundary, ignoring timezone conversion.
    pub fn date_naive(&self) -> NaiveDate {
        match self {
            EventTime::Date(d) => *d,
            EventTime::DateTimeUtc(dt) => dt.date_naive(),
            EventTime::DateTimeFloating(dt) => dt.date(),
            EventTime::DateTimeZoned { datetime, .. } => datetime.date(),
        }
    }

    /// Best-effort conversion to a UTC instant, used for coarse range
    /// filtering and sorting. Display positioning goes through
    /// `time::resolve` instead, which respects the display timezone.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            EventTime::Date(d) => Some(d.and_time(chrono::NaiveTime::MIN).and_utc()),
            EventTime::DateTimeUtc(dt) => Some(*dt),
            EventTime::DateTimeFloating(dt) => Some(dt.and_utc()),
            EventTime::DateTimeZoned { datetime, tzid } => {
                use chrono::TimeZone;
                let tz: chrono_tz::Tz = tzid.parse().ok()?;
                tz.from_local_datetime(datetime)
                    .earliest()
                    .map(|dt| dt.with_timezone(&Utc))
            }
        }
    }

    /// Key string used to match recurrence overrides to occurrences.
    pub fn to_key_string(&self) -> String {
        match self {
            EventTime::Date(d) => d.format("%Y%m%d").to_string(),
            EventTime::DateTimeUtc(dt) => dt.format("%Y%m%dT%H%M%SZ").to_string(),
            EventTime::DateTimeFloating(dt) => dt.format("%Y%m%dT%H%M%S").to_string(),
            EventTime::DateTimeZoned { datetime, tzid } => {
                format!("{}@{}", datetime.format("%Y%m%dT%H%M%S"), tzid)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}
