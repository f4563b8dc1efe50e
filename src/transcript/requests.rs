//! User request extraction: the last few things the user actually asked for.

use super::{Block, Content, Entry};

/// Markup tags identifying command or system messages, not real requests.
const SKIP_TAGS: &[&str] = &[
    "<command-message>",
    "<command-name>",
    "<local-command-stdout>",
    "<system-reminder>",
];

const MIN_REQUEST_LEN: usize = 3;

/// Collect the most recent `max_messages` user-authored texts.
///
/// Multi-part content is flattened to a single string (tool results
/// dropped). Meta entries, command/system markup, and near-empty texts are
/// skipped.
pub fn extract_user_requests(entries: &[Entry], max_messages: usize) -> Vec<String> {
    let mut requests: Vec<String> = Vec::new();

    for entry in entries {
        if entry.kind != "user" || entry.is_meta {
            continue;
        }
        let text = flatten_content(&entry.message.content);
        let trimmed = text.trim();
        if trimmed.chars().count() < MIN_REQUEST_LEN {
            continue;
        }
        if SKIP_TAGS.iter().any(|tag| text.contains(tag)) {
            continue;
        }
        requests.push(trimmed.to_string());
    }

    let start = requests.len().saturating_sub(max_messages);
    requests.split_off(start)
}

/// Flatten message content to one string, joining text blocks with spaces
/// and ignoring tool-result blocks.
fn flatten_content(content: &Content) -> String {
    match content {
        Content::Text(text) => text.clone(),
        Content::Blocks(blocks) => {
            let texts: Vec<&str> = blocks
                .iter()
                .filter_map(|block| match block {
                    Block::Tagged(b) if b.kind == "text" => Some(b.text.as_str()),
                    Block::Text(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect();
            texts.join(" ")
        }
        Content::Other(_) => String::new(),
    }
}
