//! Locating referenced event files in a workspace directory.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::source::{ConfigSource, Format};
use crate::{ConfigError, ConfigResult};

/// Find the file an identifier refers to.
///
/// Only the top level of `workspace` is searched, and only files with a
/// known format extension are candidates. A candidate matches when its name
/// starts with `prefix`. Candidates whose stem is exactly `prefix` win; ties
/// are broken by file name, so the result does not depend on the order the
/// platform lists the directory in.
pub fn locate(prefix: &str, workspace: &Path) -> ConfigResult<Option<PathBuf>> {
    let entries = std::fs::read_dir(workspace).map_err(|e| ConfigError::io(workspace, e))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::io(workspace, e))?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if !name.starts_with(prefix) || !path.is_file() || Format::from_path(&path).is_none() {
            continue;
        }

        let exact = path.file_stem().and_then(|s| s.to_str()) == Some(prefix);
        candidates.push((!exact, name.to_string(), path));
    }

    candidates.sort();
    debug!(
        prefix,
        workspace = %workspace.display(),
        candidates = candidates.len(),
        "Searched workspace for event config"
    );

    Ok(candidates.into_iter().next().map(|(_, _, path)| path))
}

/// An event file found in a workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct EventConfig {
    pub path: PathBuf,
    pub source: ConfigSource,
}

/// Find and load the file an identifier refers to.
pub fn find_event_config(prefix: &str, workspace: &Path) -> ConfigResult<EventConfig> {
    let path = locate(prefix, workspace)?.ok_or_else(|| ConfigError::NotFound {
        prefix: prefix.to_string(),
        workspace: workspace.to_path_buf(),
    })?;

    debug!(path = %path.display(), "Loading event config");
    let source = ConfigSource::from_file(&path)?;
    Ok(EventConfig { path, source })
}
