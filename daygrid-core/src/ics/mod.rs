//! ICS file parsing.

mod parse;

pub use parse::parse_event;
