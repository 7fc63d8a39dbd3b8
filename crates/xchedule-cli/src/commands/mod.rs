//! CLI command implementations.

use anyhow::{Context, Result};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use xchedule_config::EventBuilder;
use xchedule_core::Event;

/// Build the tree rooted at `path` and print it.
pub fn show(path: &Path, workspace: Option<PathBuf>) -> Result<()> {
    let event = build(path, workspace)?;
    print!("{}", render(&event));
    Ok(())
}

pub fn validate(path: &Path, workspace: Option<PathBuf>) -> Result<()> {
    match build(path, workspace) {
        Ok(event) => {
            println!("Configuration is valid ({} events)", event.walk().count());
            Ok(())
        }
        Err(e) => {
            println!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn build(path: &Path, workspace: Option<PathBuf>) -> Result<Event> {
    let workspace = match workspace {
        Some(dir) => dir,
        None => default_workspace(path)?,
    };
    tracing::debug!(workspace = %workspace.display(), "Using workspace");

    EventBuilder::new(workspace)
        .build_file(path)
        .with_context(|| format!("Failed to build events from {}", path.display()))
}

/// The directory containing the root file, or the current directory.
fn default_workspace(path: &Path) -> Result<PathBuf> {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .canonicalize()
        .context("Failed to resolve workspace directory")
}

/// Indented outline of an event tree.
pub fn render(root: &Event) -> String {
    let mut out = String::new();

    for (depth, event) in root.walk() {
        let indent = "  ".repeat(depth);
        let _ = writeln!(out, "{indent}- {} [{}]", event.title, event.time);

        if !event.members.is_empty() {
            let names: Vec<String> = event.members.iter().map(ToString::to_string).collect();
            let _ = writeln!(out, "{indent}  members: {}", names.join(", "));
        }
        for alert in &event.alert.times {
            let _ = writeln!(out, "{indent}  alert: {}", alert.format("%Y-%m-%d %H:%M:%S %:z"));
        }
        for note in &event.notes {
            let _ = writeln!(out, "{indent}  note: {note}");
        }
    }

    out
}
