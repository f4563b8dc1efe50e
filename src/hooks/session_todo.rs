//! SessionEnd handler: append a session summary section to TODO.md.
//!
//! Parses the session transcript and extracts incomplete tasks, recent user
//! requests, and outstanding-work mentions, then appends a timestamped
//! markdown section to `TODO.md` in the project directory. Runs at session
//! end and must never block termination: every failure is swallowed.

use anyhow::Result;
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::path::Path;

use super::HookInput;
use crate::transcript::tasks::Task;
use crate::transcript::{mentions, parse_transcript, requests, tasks};

const TODO_FILE: &str = "TODO.md";
const TODO_HEADER: &str = "# TODO\n\nOutstanding issues from Claude Code sessions.\n";

/// User requests captured from the transcript; only the last
/// [`MAX_RENDERED_REQUESTS`] of these are rendered.
const MAX_CAPTURED_REQUESTS: usize = 10;
const MAX_RENDERED_REQUESTS: usize = 5;

const MAX_DESCRIPTION_CHARS: usize = 200;
const MAX_REQUEST_CHARS: usize = 150;

pub fn run(input: &HookInput) -> Result<()> {
    let Some(project_dir) = input.project_dir() else {
        return Ok(());
    };
    if input.transcript_path.is_empty() {
        return Ok(());
    }
    let transcript_path = Path::new(&input.transcript_path);
    if !transcript_path.exists() {
        return Ok(());
    }

    let entries = parse_transcript(transcript_path);
    if entries.is_empty() {
        return Ok(());
    }

    let tasks = tasks::extract_tasks(&entries);
    let user_requests = requests::extract_user_requests(&entries, MAX_CAPTURED_REQUESTS);
    let mentions = mentions::extract_outstanding_mentions(&entries);

    let session_id = if input.session_id.is_empty() {
        "unknown"
    } else {
        input.session_id.as_str()
    };

    let Some(section) = build_section(&tasks, &user_requests, &mentions, session_id, Local::now())
    else {
        return Ok(());
    };

    // Write errors must not block session termination
    if let Err(e) = append_section(&project_dir, &section) {
        tracing::debug!("failed to write {TODO_FILE}: {e:#}");
    }
    Ok(())
}

/// Build the markdown section for this session, or `None` when there are no
/// incomplete tasks and no outstanding mentions (nothing worth recording).
///
/// User requests are context only: they are rendered when present but never
/// by themselves cause a section to be written.
fn build_section(
    tasks: &BTreeMap<String, Task>,
    user_requests: &[String],
    mentions: &[String],
    session_id: &str,
    now: DateTime<Local>,
) -> Option<String> {
    let incomplete: Vec<(&String, &Task)> =
        tasks.iter().filter(|(_, t)| t.is_incomplete()).collect();

    if incomplete.is_empty() && mentions.is_empty() {
        return None;
    }

    let short_id: String = session_id.chars().take(8).collect();
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!(
        "\n## Session {} ({short_id})",
        now.format("%Y-%m-%d %H:%M")
    ));
    lines.push(String::new());

    if !incomplete.is_empty() {
        lines.push("### Incomplete Tasks".to_string());
        for (_, task) in &incomplete {
            let status_icon = if task.status == "in_progress" { "🔄" } else { "⬜" };
            let mut line = format!("- [ ] {status_icon} {}", task.subject);
            if !task.description.is_empty() {
                line.push_str(" — ");
                line.push_str(&truncate(&task.description, MAX_DESCRIPTION_CHARS));
            }
            lines.push(line);
        }
        lines.push(String::new());
    }

    if !mentions.is_empty() {
        lines.push("### Outstanding Items".to_string());
        for mention in mentions {
            let clean = mention
                .trim_start_matches(['-', ' ', '*', '>', '#'])
                .trim();
            lines.push(format!("- [ ] {clean}"));
        }
        lines.push(String::new());
    }

    if !user_requests.is_empty() {
        lines.push("### Last User Requests (context)".to_string());
        let start = user_requests.len().saturating_sub(MAX_RENDERED_REQUESTS);
        for request in &user_requests[start..] {
            lines.push(format!("- {}", truncate(request, MAX_REQUEST_CHARS)));
        }
        lines.push(String::new());
    }

    Some(lines.join("\n"))
}

/// Create TODO.md with its fixed header, or append the section after the
/// existing content with exactly one blank line in between.
fn append_section(project_dir: &Path, section: &str) -> Result<()> {
    let todo_path = project_dir.join(TODO_FILE);

    let updated = if todo_path.exists() {
        let existing = std::fs::read_to_string(&todo_path)?;
        format!("{}\n{section}", existing.trim_end_matches('\n'))
    } else {
        format!("{TODO_HEADER}{section}")
    };

    std::fs::write(&todo_path, updated)?;
    Ok(())
}

/// Character-based truncation with an ellipsis marker; never splits a
/// multi-byte character.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max_chars).collect();
        out.push_str("...");
        out
    }
}
