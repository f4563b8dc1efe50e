//! PreToolUse handler: advise Grep/Glob calls from precomputed index files.
//!
//! Before a Grep or Glob call runs, scans `.claude/repo-index/` text files
//! for lines matching terms derived from the pending search and injects the
//! matches as advisory context, so the assistant can jump straight to the
//! right file instead of searching blindly. Never blocks the tool call.

use anyhow::Result;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use super::{HookInput, HookResponse, PROJECT_DIR_ENV};

/// Index files to scan, with the label matches are grouped under.
const INDEX_FILES: &[(&str, &str)] = &[
    ("symbols.txt", "Symbols"),
    ("file-tree.txt", "Files"),
    ("dependencies.txt", "Dependencies"),
];

/// Generic directory names carrying no search signal.
const PATH_STOPLIST: &[&str] = &["src", "lib", "usr", "var", "tmp", "Users"];

/// Regex metacharacters stripped from Grep patterns to recover plain words.
const REGEX_METACHARS: &[char] = &[
    '\\', '.', '*', '+', '?', '^', '$', '{', '}', '(', ')', '|', '[', ']',
];

/// Total matched lines emitted, divided across the existing index files.
const MATCH_BUDGET: usize = 30;

const MIN_TERM_LEN: usize = 3;

pub fn run(input: &HookInput) -> Result<()> {
    if input.tool_name != "Grep" && input.tool_name != "Glob" {
        return Ok(());
    }
    let Some(index_dir) = find_index_dir() else {
        return Ok(());
    };
    let terms = extract_search_terms(&input.tool_name, &input.tool_input);
    if terms.is_empty() {
        return Ok(());
    }
    let matches = search_index_files(&index_dir, &terms);
    if matches.is_empty() {
        return Ok(());
    }

    tracing::debug!(terms = ?terms, "index matches found");
    let context = format!(
        "[Index Search] .claude/repo-index/ matches for {terms:?}:\n{matches}\n\
         Consider reading the indexed file directly instead of searching.",
    );
    HookResponse::pre_tool_use_allow(context).emit()
}

/// Locate `.claude/repo-index/`: project-dir override first, then the cwd,
/// then each ancestor up to (and including) the home directory.
fn find_index_dir() -> Option<PathBuf> {
    if let Ok(project_dir) = std::env::var(PROJECT_DIR_ENV) {
        if !project_dir.is_empty() {
            let candidate = index_dir_in(Path::new(&project_dir));
            if candidate.is_dir() {
                return Some(candidate);
            }
        }
    }

    let cwd = std::env::current_dir().ok()?;
    let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());

    let mut dir = cwd.as_path();
    loop {
        let candidate = index_dir_in(dir);
        if candidate.is_dir() {
            return Some(candidate);
        }
        if home.as_deref() == Some(dir) {
            return None;
        }
        dir = dir.parent()?;
    }
}

fn index_dir_in(dir: &Path) -> PathBuf {
    dir.join(".claude").join("repo-index")
}

/// Derive search terms from the pending tool call's parameters.
///
/// Returns a sorted, deduplicated set: term order is not significant to the
/// scan, and a stable order keeps the advisory text deterministic.
fn extract_search_terms(tool_name: &str, tool_input: &serde_json::Value) -> Vec<String> {
    let mut terms: BTreeSet<String> = BTreeSet::new();
    let pattern = tool_input
        .get("pattern")
        .and_then(|v| v.as_str())
        .unwrap_or("");

    match tool_name {
        "Grep" if !pattern.is_empty() => {
            // Strip regex metacharacters to get plain keywords
            let clean: String = pattern
                .chars()
                .map(|c| if REGEX_METACHARS.contains(&c) { ' ' } else { c })
                .collect();
            terms.extend(
                clean
                    .split_whitespace()
                    .filter(|w| w.chars().count() >= MIN_TERM_LEN)
                    .map(str::to_string),
            );
            // Also keep the raw pattern for exact matching
            if pattern.chars().count() >= MIN_TERM_LEN {
                terms.insert(pattern.to_string());
            }
        }
        "Glob" if !pattern.is_empty() => {
            // Extract meaningful fragments from glob patterns
            let spaced = pattern.replace(['*', '?'], " ");
            for part in spaced.split('/') {
                terms.extend(
                    part.split_whitespace()
                        .map(|w| w.trim_matches('.'))
                        .filter(|w| w.chars().count() >= MIN_TERM_LEN)
                        .map(str::to_string),
                );
            }
        }
        _ => {}
    }

    // Path segments carry context for both tools
    if let Some(path) = tool_input.get("path").and_then(|v| v.as_str()) {
        for component in Path::new(path).components() {
            if let Component::Normal(part) = component {
                let part = part.to_string_lossy();
                if part.chars().count() >= MIN_TERM_LEN
                    && !PATH_STOPLIST.contains(&part.as_ref())
                {
                    terms.insert(part.into_owned());
                }
            }
        }
    }

    terms.into_iter().collect()
}

/// Scan the index files for lines containing any term, case-insensitively.
///
/// The overall line budget is split evenly across however many of the three
/// index files exist. Comment lines (`#`) and blank lines are skipped.
/// Returns matched lines grouped under `[<label>]` headers, or an empty
/// string when nothing matched.
fn search_index_files(index_dir: &Path, terms: &[String]) -> String {
    let lowered: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();

    let existing: Vec<(PathBuf, &str)> = INDEX_FILES
        .iter()
        .filter_map(|(filename, label)| {
            let path = index_dir.join(filename);
            path.is_file().then_some((path, *label))
        })
        .collect();
    if existing.is_empty() {
        return String::new();
    }
    let per_file_cap = MATCH_BUDGET / existing.len();

    let mut out: Vec<String> = Vec::new();
    for (path, label) in existing {
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };

        let mut matched: Vec<&str> = Vec::new();
        for line in content.lines() {
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            let line_lower = line.to_lowercase();
            if lowered.iter().any(|term| line_lower.contains(term)) {
                matched.push(line);
                if matched.len() == per_file_cap {
                    break;
                }
            }
        }

        if !matched.is_empty() {
            out.push(format!("[{label}]"));
            out.extend(matched.iter().map(|l| (*l).to_string()));
        }
    }

    out.join("\n")
}
