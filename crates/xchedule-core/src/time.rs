//! Time specifications for events.

use chrono::{DateTime, FixedOffset};
use std::fmt;

/// An absolute instant, keeping the UTC offset it was resolved in.
pub type Timestamp = DateTime<FixedOffset>;

/// When an event happens: a single instant or a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpec {
    /// Start of the event (or the instant itself).
    pub start: Timestamp,
    /// End of the period. `None` for instants.
    pub end: Option<Timestamp>,
}

impl TimeSpec {
    /// A single point in time.
    pub fn instant(start: Timestamp) -> Self {
        Self { start, end: None }
    }

    /// A range from `start` to `end`.
    pub fn period(start: Timestamp, end: Timestamp) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// Whether this spec is a range rather than an instant.
    pub fn is_period(&self) -> bool {
        self.end.is_some()
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const FORMAT: &str = "%Y-%m-%d %H:%M:%S %:z";
        match self.end {
            Some(end) => write!(
                f,
                "{} ~ {}",
                self.start.format(FORMAT),
                end.format(FORMAT)
            ),
            None => write!(f, "{}", self.start.format(FORMAT)),
        }
    }
}
