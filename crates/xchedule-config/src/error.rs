//! Configuration parsing errors.

use std::path::PathBuf;
use thiserror::Error;

use crate::source::Format;
use crate::time::TimeError;

/// Broad class of a [`ConfigError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required field is missing or a value has the wrong shape.
    Validation,
    /// Text could not be parsed (documents, times, timezone names).
    Parse,
    /// A schedule entry could not be resolved, or resolves to an ancestor.
    Resolution,
    /// The workspace or a referenced file could not be read.
    Io,
}

/// Errors raised while loading documents and building events.
///
/// Errors raised by the event builder carry `at`, the path of the event
/// being built (`root/event1/event2`), and the offending field.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{at}: missing required field: {field}")]
    MissingField { at: String, field: String },

    #[error("{at}: invalid value for {field}: {message}")]
    InvalidValue {
        at: String,
        field: String,
        message: String,
    },

    #[error("{at}: {field}: {source}")]
    Time {
        at: String,
        field: String,
        #[source]
        source: TimeError,
    },

    #[error("{at}: can't find event '{identifier}' inline or in {}", .workspace.display())]
    UnresolvedReference {
        at: String,
        identifier: String,
        workspace: PathBuf,
    },

    #[error("{at}: schedule entry '{identifier}': {source}")]
    Load {
        at: String,
        identifier: String,
        #[source]
        source: Box<ConfigError>,
    },

    #[error("no event config starting with '{prefix}' in {}", .workspace.display())]
    NotFound { prefix: String, workspace: PathBuf },

    #[error("{at}: cycle detected in schedule: {chain}")]
    CycleDetected { at: String, chain: String },

    #[error("unsupported config type: {0}")]
    UnsupportedFormat(String),

    #[error("{origin}: {format} parse error: {message}")]
    Parse {
        origin: String,
        format: Format,
        message: String,
    },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::MissingField { .. } | ConfigError::InvalidValue { .. } => {
                ErrorKind::Validation
            }
            ConfigError::Time {
                source: TimeError::MalformedPeriod(_),
                ..
            } => ErrorKind::Validation,
            ConfigError::Time { .. }
            | ConfigError::UnsupportedFormat(_)
            | ConfigError::Parse { .. } => ErrorKind::Parse,
            ConfigError::UnresolvedReference { .. }
            | ConfigError::NotFound { .. }
            | ConfigError::CycleDetected { .. } => ErrorKind::Resolution,
            ConfigError::Io { .. } => ErrorKind::Io,
            ConfigError::Load { source, .. } => source.kind(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
