//! Outstanding-work mentions: assistant lines that smell like unfinished
//! business.
//!
//! Each heuristic is a standalone predicate over one line, backed by an
//! enumerated pattern list, so they can be tested independently of the
//! extraction pass.

use regex::Regex;

use super::{Block, Content, Entry};

/// Line openers that report finished work; such lines are never flagged.
pub const COMPLETION_WORDS: &[&str] = &[
    "done",
    "completed",
    "finished",
    "fixed",
    "resolved",
    "implemented",
    "created",
    "added",
    "updated",
    "already",
];

/// Markers that always flag a line, matched as whole words (case-sensitive:
/// these are conventionally written in caps).
pub const STRONG_MARKERS: &[&str] = &["TODO", "FIXME", "HACK", "XXX"];

/// Weaker phrases indicating unfinished work, matched case-insensitively.
pub const WEAK_PHRASES: &[&str] = &[
    "still need to",
    "needs to be",
    "should still",
    "not yet implemented",
    "remains to be",
    "outstanding issue",
    "incomplete",
    "unfinished",
    "couldn't",
    "was not able to",
    "failed to",
    "blocked by",
];

/// Accepted trimmed line lengths, exclusive on both ends.
const MIN_LINE_LEN: usize = 10;
const MAX_LINE_LEN: usize = 300;

/// Most recent mentions retained across the whole transcript.
const MAX_MENTIONS: usize = 20;

/// Compiled mention heuristics. Built once per extraction pass.
pub struct MentionMatcher {
    done: Regex,
    strong: Regex,
    weak: Regex,
}

impl MentionMatcher {
    pub fn new() -> Self {
        // Pattern lists are static and known-valid
        Self {
            done: Regex::new(&format!(r"(?i)^\s*({})", COMPLETION_WORDS.join("|"))).unwrap(),
            strong: Regex::new(&format!(r"\b({})\b", STRONG_MARKERS.join("|"))).unwrap(),
            weak: Regex::new(&format!("(?i)({})", WEAK_PHRASES.join("|"))).unwrap(),
        }
    }

    /// Does the line open with a completion-indicating word?
    pub fn starts_with_completion_word(&self, line: &str) -> bool {
        self.done.is_match(line)
    }

    /// Does the line carry a TODO/FIXME/HACK/XXX marker as a whole word?
    pub fn has_strong_marker(&self, line: &str) -> bool {
        self.strong.is_match(line)
    }

    /// Does the line contain a weaker unfinished-work phrase?
    pub fn has_weak_marker(&self, line: &str) -> bool {
        self.weak.is_match(line)
    }

    /// Full per-line decision: flagged, not completion-prefixed, and of
    /// reasonable length.
    pub fn is_outstanding(&self, line: &str) -> bool {
        let len = line.chars().count();
        if len <= MIN_LINE_LEN || len >= MAX_LINE_LEN {
            return false;
        }
        if self.starts_with_completion_word(line) {
            return false;
        }
        self.has_strong_marker(line) || self.has_weak_marker(line)
    }
}

impl Default for MentionMatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan assistant text blocks line by line for outstanding-work mentions.
///
/// Mentions are deduplicated by lowercased text across the whole transcript;
/// only the most recent [`MAX_MENTIONS`] are kept, in order of appearance.
pub fn extract_outstanding_mentions(entries: &[Entry]) -> Vec<String> {
    let matcher = MentionMatcher::new();
    let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();
    let mut mentions: Vec<String> = Vec::new();

    for entry in entries {
        if entry.kind != "assistant" {
            continue;
        }
        let Content::Blocks(blocks) = &entry.message.content else {
            continue;
        };
        for block in blocks {
            let Block::Tagged(block) = block else {
                continue;
            };
            if block.kind != "text" {
                continue;
            }
            for line in block.text.lines() {
                let line = line.trim();
                if !matcher.is_outstanding(line) {
                    continue;
                }
                if seen.insert(line.to_lowercase()) {
                    mentions.push(line.to_string());
                }
            }
        }
    }

    let start = mentions.len().saturating_sub(MAX_MENTIONS);
    mentions.split_off(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assistant_text(text: &str) -> Entry {
        serde_json::from_str(&format!(
            r#"{{"type":"assistant","message":{{"content":[{{"type":"text","text":{}}}]}}}}"#,
            serde_json::to_string(text).unwrap()
        ))
        .unwrap()
    }

    #[test]
    fn completion_prefixes_are_detected_case_insensitively() {
        let m = MentionMatcher::new();
        assert!(m.starts_with_completion_word("Done with the refactor"));
        assert!(m.starts_with_completion_word("FIXED the race condition"));
        assert!(m.starts_with_completion_word("already handled above"));
        assert!(!m.starts_with_completion_word("We still need to fix this"));
    }

    #[test]
    fn strong_markers_match_whole_words_only() {
        let m = MentionMatcher::new();
        assert!(m.has_strong_marker("TODO: wire up the parser"));
        assert!(m.has_strong_marker("left a FIXME in the loop"));
        assert!(!m.has_strong_marker("the TODOs are tracked elsewhere"));
        assert!(!m.has_strong_marker("todo: lowercase is not a marker"));
    }

    #[test]
    fn weak_phrases_match_case_insensitively() {
        let m = MentionMatcher::new();
        assert!(m.has_weak_marker("We Still Need To update the docs"));
        assert!(m.has_weak_marker("the migration is not yet implemented"));
        assert!(m.has_weak_marker("deploy is blocked by the CI outage"));
        assert!(!m.has_weak_marker("everything looks good"));
    }

    #[test]
    fn outstanding_requires_reasonable_length() {
        let m = MentionMatcher::new();
        assert!(!m.is_outstanding("TODO: x")); // too short
        let long = format!("TODO: {}", "y".repeat(300));
        assert!(!m.is_outstanding(&long)); // too long
        assert!(m.is_outstanding("TODO: fix the flaky watcher test"));
    }

    #[test]
    fn completion_prefix_suppresses_markers() {
        let m = MentionMatcher::new();
        assert!(!m.is_outstanding("Fixed the TODO in the scheduler"));
    }

    #[test]
    fn mentions_deduplicate_case_insensitively() {
        let entries = vec![
            assistant_text("TODO: Fix the cache layer"),
            assistant_text("TODO: FIX THE CACHE LAYER"),
        ];
        let mentions = extract_outstanding_mentions(&entries);
        assert_eq!(mentions, vec!["TODO: Fix the cache layer"]);
    }

    #[test]
    fn only_most_recent_twenty_are_kept() {
        let entries: Vec<Entry> = (0..25)
            .map(|i| assistant_text(&format!("TODO: outstanding item number {i}")))
            .collect();
        let mentions = extract_outstanding_mentions(&entries);
        assert_eq!(mentions.len(), 20);
        assert_eq!(mentions[0], "TODO: outstanding item number 5");
        assert_eq!(mentions[19], "TODO: outstanding item number 24");
    }

    #[test]
    fn user_entries_and_tool_blocks_are_ignored() {
        let user: Entry = serde_json::from_str(
            r#"{"type":"user","message":{"content":[{"type":"text","text":"TODO: not from the assistant"}]}}"#,
        )
        .unwrap();
        let tool: Entry = serde_json::from_str(
            r#"{"type":"assistant","message":{"content":[{"type":"tool_use","name":"Grep","input":{"pattern":"TODO: in a tool call"}}]}}"#,
        )
        .unwrap();
        assert!(extract_outstanding_mentions(&[user, tool]).is_empty());
    }

    #[test]
    fn multiline_text_is_scanned_per_line() {
        let entries = vec![assistant_text(
            "All tests pass now.\nTODO: remove the debug logging\nDone with the cleanup.",
        )];
        let mentions = extract_outstanding_mentions(&entries);
        assert_eq!(mentions, vec!["TODO: remove the debug logging"]);
    }
}
