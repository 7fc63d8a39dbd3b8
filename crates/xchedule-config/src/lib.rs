//! Configuration parsing for xchedule.
//!
//! This crate handles:
//! - Reading hierarchical documents (YAML, JSON, TOML, KDL)
//! - Resolving instants, periods and timezones
//! - Discovering referenced event files in a workspace
//! - Building the recursive event tree

pub mod discovery;
pub mod error;
pub mod event;
pub mod source;
pub mod time;

pub use discovery::{EventConfig, find_event_config};
pub use error::{ConfigError, ConfigResult, ErrorKind};
pub use event::{EventBuilder, ScheduleEntry, build_event};
pub use source::{ConfigSource, Format};
pub use time::{TimeError, Zone};
