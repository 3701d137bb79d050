pub mod agenda;
pub mod day;
pub mod next;
pub mod view;
