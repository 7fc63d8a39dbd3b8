//! Event tree definitions.

use derive_more::{Display, From};

use crate::{TimeSpec, Timestamp};

/// A titled, timed node in a schedule tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event title. Never empty.
    pub title: String,
    /// When the event happens.
    pub time: TimeSpec,
    /// Places the event happens at. Not yet read from configuration.
    pub locations: Vec<Location>,
    /// People attending.
    pub members: Vec<Member>,
    /// Child events, in declaration order.
    pub schedule: Vec<Event>,
    /// Reminder times.
    pub alert: Alert,
    /// Free-form notes.
    pub notes: Vec<String>,
    root: bool,
}

impl Event {
    /// Create an event with empty collections.
    pub fn new(title: impl Into<String>, time: TimeSpec, is_root: bool) -> Self {
        Self {
            title: title.into(),
            time,
            locations: Vec::new(),
            members: Vec::new(),
            schedule: Vec::new(),
            alert: Alert::default(),
            notes: Vec::new(),
            root: is_root,
        }
    }

    /// Whether this event is the root of its tree.
    pub fn is_root(&self) -> bool {
        self.root
    }

    /// Pre-order traversal of this event and all of its descendants,
    /// yielding each event with its depth below `self`.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![(0, self)],
        }
    }
}

/// Depth-first iterator over an event tree. See [`Event::walk`].
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    stack: Vec<(usize, &'a Event)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a Event);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, event) = self.stack.pop()?;
        self.stack
            .extend(event.schedule.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, event))
    }
}

/// Someone attending an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From)]
#[display("{name}")]
pub struct Member {
    pub name: String,
}

impl From<&str> for Member {
    fn from(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// Where an event takes place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub name: String,
    pub address: String,
    pub lat_lng: String,
    pub map_url: String,
}

/// Reminders for an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alert {
    /// Alert times, in declaration order.
    pub times: Vec<Timestamp>,
}

impl Alert {
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}
