//! Core domain types for xchedule.
//!
//! This crate contains:
//! - The event tree (`Event` and its schedule of child events)
//! - Time specifications (instants and periods)
//! - Members, reserved locations and alerts

pub mod event;
pub mod time;

pub use event::{Alert, Event, Location, Member, Walk};
pub use time::{TimeSpec, Timestamp};
