//! Event tree construction.

use std::path::{Path, PathBuf};
use tracing::{debug, info};
use xchedule_core::{Alert, Event, Location, Member, TimeSpec};

use crate::discovery;
use crate::source::ConfigSource;
use crate::time::{self, Zone};
use crate::{ConfigError, ConfigResult};

/// How a schedule entry is resolved, decided before any recursion.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleEntry {
    /// Defined as a nested map in the parent document.
    Inline {
        identifier: String,
        source: ConfigSource,
    },
    /// Not defined inline; looked up in the workspace.
    File { identifier: String },
}

impl ScheduleEntry {
    /// Classify `identifier` against its parent. Inline definitions take
    /// precedence over files; the filesystem is not touched.
    pub fn classify(parent: &ConfigSource, identifier: &str) -> Self {
        match parent.get_map(identifier) {
            Some(map) => ScheduleEntry::Inline {
                identifier: identifier.to_string(),
                source: ConfigSource::from_map(
                    parent.format(),
                    format!("{}#{}", parent.origin(), identifier),
                    map.clone(),
                ),
            },
            None => ScheduleEntry::File {
                identifier: identifier.to_string(),
            },
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            ScheduleEntry::Inline { identifier, .. } | ScheduleEntry::File { identifier } => {
                identifier
            }
        }
    }
}

/// Builds event trees, resolving file references against a workspace.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    workspace: PathBuf,
}

impl EventBuilder {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
        }
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Build an event and all of its descendants from `source`.
    pub fn build(&self, source: &ConfigSource, is_root: bool) -> ConfigResult<Event> {
        self.build_at(source, is_root, &mut Trail::default())
    }

    /// Load `path` and build it as the root event. A schedule that leads
    /// back to `path` is reported as a cycle.
    pub fn build_file(&self, path: impl AsRef<Path>) -> ConfigResult<Event> {
        let path = path.as_ref();
        let source = ConfigSource::from_file(path)?;
        let mut trail = Trail {
            root_file: Some(canonical(path)),
            frames: Vec::new(),
        };
        let event = self.build_at(&source, true, &mut trail)?;
        info!(
            path = %path.display(),
            events = event.walk().count(),
            "Built event tree"
        );
        Ok(event)
    }

    fn build_at(
        &self,
        source: &ConfigSource,
        is_root: bool,
        trail: &mut Trail,
    ) -> ConfigResult<Event> {
        let at = trail.at();

        let title = read_title(source, &at)?;
        debug!(at = %at, title = %title, origin = %source.origin(), "Building event");

        let zone = read_zone(source, &at)?;
        let time = read_time(source, &zone, &at)?;

        let mut event = Event::new(title, time, is_root);
        event.locations = read_locations(source);
        event.members = read_members(source);
        event.alert = read_alert(source, &zone, &at)?;
        event.notes = source.get_string_vec("notes");
        event.schedule = self.read_schedule(source, trail)?;

        Ok(event)
    }

    fn read_schedule(&self, source: &ConfigSource, trail: &mut Trail) -> ConfigResult<Vec<Event>> {
        let mut events = Vec::new();

        for identifier in source.get_string_vec("schedule") {
            if identifier.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    at: trail.at(),
                    field: "schedule".to_string(),
                    message: "empty event identifier".to_string(),
                });
            }
            trail.check(&identifier, None)?;

            let child = match ScheduleEntry::classify(source, &identifier) {
                ScheduleEntry::Inline {
                    identifier,
                    source: inline,
                } => {
                    debug!(identifier = %identifier, "Resolved inline event");
                    self.descend(&inline, Frame::new(identifier, None), trail)?
                }
                ScheduleEntry::File { identifier } => {
                    let at = trail.at();
                    let found = discovery::find_event_config(&identifier, &self.workspace)
                        .map_err(|e| match e {
                            ConfigError::NotFound { workspace, .. } => {
                                ConfigError::UnresolvedReference {
                                    at,
                                    identifier: identifier.clone(),
                                    workspace,
                                }
                            }
                            other => ConfigError::Load {
                                at,
                                identifier: identifier.clone(),
                                source: Box::new(other),
                            },
                        })?;
                    let path = canonical(&found.path);
                    trail.check(&identifier, Some(&path))?;

                    debug!(identifier = %identifier, path = %path.display(), "Resolved event file");
                    self.descend(&found.source, Frame::new(identifier, Some(path)), trail)?
                }
            };
            events.push(child);
        }

        Ok(events)
    }

    fn descend(
        &self,
        source: &ConfigSource,
        frame: Frame,
        trail: &mut Trail,
    ) -> ConfigResult<Event> {
        trail.frames.push(frame);
        let result = self.build_at(source, false, trail);
        trail.frames.pop();
        result
    }
}

/// Build an event tree from `source`, resolving file references in
/// `workspace`.
pub fn build_event(
    source: &ConfigSource,
    is_root: bool,
    workspace: impl Into<PathBuf>,
) -> ConfigResult<Event> {
    EventBuilder::new(workspace).build(source, is_root)
}

fn read_title(source: &ConfigSource, at: &str) -> ConfigResult<String> {
    source
        .get_string("title")
        .filter(|title| !title.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingField {
            at: at.to_string(),
            field: "title".to_string(),
        })
}

fn read_zone(source: &ConfigSource, at: &str) -> ConfigResult<Zone> {
    let name = source.get_string("timezone");
    time::resolve_timezone(name.as_deref()).map_err(|e| ConfigError::Time {
        at: at.to_string(),
        field: "timezone".to_string(),
        source: e,
    })
}

fn read_time(source: &ConfigSource, zone: &Zone, at: &str) -> ConfigResult<TimeSpec> {
    let text = source
        .get_string("time")
        .ok_or_else(|| ConfigError::MissingField {
            at: at.to_string(),
            field: "time".to_string(),
        })?;

    time::resolve_period(&text, zone).map_err(|e| ConfigError::Time {
        at: at.to_string(),
        field: "time".to_string(),
        source: e,
    })
}

fn read_locations(_source: &ConfigSource) -> Vec<Location> {
    // TODO: read `locations` once the document shape for addresses is settled.
    Vec::new()
}

fn read_members(source: &ConfigSource) -> Vec<Member> {
    source
        .get_string_vec("members")
        .into_iter()
        .map(|name| Member { name })
        .collect()
}

fn read_alert(source: &ConfigSource, zone: &Zone, at: &str) -> ConfigResult<Alert> {
    let times = source
        .get_string_vec("alerts.time")
        .iter()
        .enumerate()
        .map(|(index, text)| {
            time::parse_instant(text, zone).map_err(|e| ConfigError::Time {
                at: at.to_string(),
                field: format!("alerts.time[{index}]"),
                source: e,
            })
        })
        .collect::<ConfigResult<Vec<_>>>()?;

    Ok(Alert { times })
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// One schedule entry being resolved on the active path.
#[derive(Debug)]
struct Frame {
    identifier: String,
    file: Option<PathBuf>,
}

impl Frame {
    fn new(identifier: String, file: Option<PathBuf>) -> Self {
        Self { identifier, file }
    }
}

/// Entries being resolved from the root down to the current event.
/// Siblings never see each other's frames.
#[derive(Debug, Default)]
struct Trail {
    root_file: Option<PathBuf>,
    frames: Vec<Frame>,
}

impl Trail {
    /// `root/a/b` for the event currently being built.
    fn at(&self) -> String {
        std::iter::once("root")
            .chain(self.frames.iter().map(|f| f.identifier.as_str()))
            .collect::<Vec<_>>()
            .join("/")
    }

    fn check(&self, identifier: &str, file: Option<&Path>) -> ConfigResult<()> {
        let repeats_identifier = self.frames.iter().any(|f| f.identifier == identifier);
        let repeats_file = file.is_some_and(|file| {
            self.root_file.as_deref() == Some(file)
                || self.frames.iter().any(|f| f.file.as_deref() == Some(file))
        });

        if repeats_identifier || repeats_file {
            return Err(ConfigError::CycleDetected {
                at: self.at(),
                chain: format!("{} -> {}", self.at(), identifier),
            });
        }
        Ok(())
    }
}
