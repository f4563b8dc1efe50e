//! SessionStart handler: remind about missing project documentation.
//!
//! Checks the project directory for the four expected documentation files
//! and injects a reminder listing the missing ones. Directories that don't
//! look like software projects (home dir, scratch dirs) are left alone.

use anyhow::Result;
use std::path::Path;

use super::{HookInput, HookResponse};

/// Expected documentation files and what each should contain.
const REQUIRED_DOCS: &[(&str, &str)] = &[
    ("README.md", "project description, features, architecture, usage"),
    ("INSTALLATION.md", "installation guide using uv for Python"),
    ("METHODS.md", "algorithms, methods, key design decisions"),
    ("TODO.md", "outstanding issues and planned work"),
];

/// Markers that identify a directory as a software project.
const PROJECT_MARKERS: &[&str] = &[
    ".git",
    "src",
    "package.json",
    "pyproject.toml",
    "setup.py",
    "Cargo.toml",
    "go.mod",
    "CLAUDE.md",
];

pub fn run(input: &HookInput) -> Result<()> {
    let Some(project) = input.project_dir() else {
        return Ok(());
    };
    if !project.is_dir() || !is_project_dir(&project) {
        return Ok(());
    }

    let missing = missing_docs(&project);
    if missing.is_empty() {
        return Ok(());
    }

    let project_name = project
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    HookResponse::session_start(build_reminder(&project_name, &missing)).emit()
}

/// A project should have version control, a source dir, or a manifest.
fn is_project_dir(dir: &Path) -> bool {
    PROJECT_MARKERS.iter().any(|marker| dir.join(marker).exists())
}

/// Which of the required docs are absent, in declaration order.
fn missing_docs(dir: &Path) -> Vec<(&'static str, &'static str)> {
    REQUIRED_DOCS
        .iter()
        .copied()
        .filter(|(filename, _)| !dir.join(filename).exists())
        .collect()
}

fn build_reminder(project_name: &str, missing: &[(&str, &str)]) -> String {
    let missing_list = missing
        .iter()
        .map(|(name, purpose)| format!("  - {name}: {purpose}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "[Doc Check] Project '{project_name}' is missing required documentation:\n\
         {missing_list}\n\
         Create these files when completing significant work. \
         Use /development skill Phase 9 for templates. \
         Prefer uv for Python installation instructions.",
    )
}
