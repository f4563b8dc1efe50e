//! Session transcript parsing.
//!
//! Transcripts are JSONL: one record per line, tagged by a `type`
//! discriminator, carrying nested message content blocks. Entries appear in
//! conversation order (most recent last), which several extraction passes
//! rely on. Malformed lines are skipped silently.

pub mod mentions;
pub mod requests;
pub mod tasks;

use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One transcript record. All fields are optional in the wire format.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Entry {
    /// Record discriminator: "user", "assistant", or other
    #[serde(rename = "type")]
    pub kind: String,
    pub message: Message,
    /// Meta/system records are excluded from user-request extraction
    #[serde(rename = "isMeta")]
    pub is_meta: bool,
    /// Current-state task snapshot, present on some records
    pub todos: Option<Vec<TodoItem>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Message {
    pub content: Content,
}

/// Message content: either a plain string or a list of typed blocks.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Blocks(Vec<Block>),
    Other(Value),
}

impl Default for Content {
    fn default() -> Self {
        Content::Text(String::new())
    }
}

/// One content block. Untagged: objects parse as `Tagged`, bare strings as
/// `Text`, anything else falls through to `Other`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Block {
    Tagged(TaggedBlock),
    Text(String),
    Other(Value),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaggedBlock {
    /// Block discriminator: "text", "tool_use", "tool_result", ...
    #[serde(rename = "type")]
    pub kind: String,
    /// Body of "text" blocks
    pub text: String,
    /// Tool name of "tool_use" blocks
    pub name: String,
    /// Tool parameters of "tool_use" blocks
    pub input: Value,
}

/// One item of a `todos` snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TodoItem {
    pub id: String,
    pub subject: String,
    pub description: String,
    pub status: String,
}

/// Parse a JSONL transcript file. Unreadable files yield an empty list;
/// blank and malformed lines are skipped.
pub fn parse_transcript(path: &Path) -> Vec<Entry> {
    let Ok(file) = File::open(path) else {
        return Vec::new();
    };
    let reader = BufReader::new(file);

    let mut entries = Vec::new();
    for line in reader.lines() {
        let Ok(line) = line else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Ok(entry) = serde_json::from_str::<Entry>(line) {
            entries.push(entry);
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_transcript(dir: &Path, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.join("transcript.jsonl");
        let mut f = File::create(&path).unwrap();
        for line in lines {
            writeln!(f, "{line}").unwrap();
        }
        path
    }

    #[test]
    fn parses_entries_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_transcript(
            tmp.path(),
            &[
                r#"{"type":"user","message":{"content":"hello"}}"#,
                r#"{"type":"assistant","message":{"content":[{"type":"text","text":"hi"}]}}"#,
            ],
        );

        let entries = parse_transcript(&path);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, "user");
        assert_eq!(entries[1].kind, "assistant");
    }

    #[test]
    fn skips_malformed_and_blank_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_transcript(
            tmp.path(),
            &[
                "",
                "not json at all {{{",
                r#"{"type":"user","message":{"content":"ok"}}"#,
            ],
        );

        let entries = parse_transcript(&path);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, "user");
    }

    #[test]
    fn missing_file_yields_empty() {
        assert!(parse_transcript(Path::new("/nonexistent/t.jsonl")).is_empty());
    }

    #[test]
    fn string_and_block_content_both_parse() {
        let entry: Entry =
            serde_json::from_str(r#"{"type":"user","message":{"content":"plain"}}"#).unwrap();
        assert!(matches!(entry.message.content, Content::Text(ref s) if s == "plain"));

        let entry: Entry = serde_json::from_str(
            r#"{"type":"assistant","message":{"content":[{"type":"tool_use","name":"TaskCreate","input":{"subject":"x"}}]}}"#,
        )
        .unwrap();
        let Content::Blocks(blocks) = &entry.message.content else {
            panic!("expected blocks");
        };
        let Block::Tagged(block) = &blocks[0] else {
            panic!("expected tagged block");
        };
        assert_eq!(block.kind, "tool_use");
        assert_eq!(block.name, "TaskCreate");
    }

    #[test]
    fn todos_snapshot_parses() {
        let entry: Entry = serde_json::from_str(
            r#"{"type":"user","todos":[{"id":"7","subject":"ship it","status":"in_progress"}]}"#,
        )
        .unwrap();
        let todos = entry.todos.unwrap();
        assert_eq!(todos[0].id, "7");
        assert_eq!(todos[0].status, "in_progress");
        assert!(todos[0].description.is_empty());
    }
}
