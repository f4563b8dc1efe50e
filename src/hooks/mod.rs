//! Claude Code hook payloads and response envelopes.
//!
//! Every handler reads one JSON object from stdin and optionally prints one
//! JSON object to stdout. Payload fields are all optional with empty
//! defaults; unknown fields are ignored so newer host versions never break
//! the handlers.

pub mod doc_check;
pub mod index_search;
pub mod session_todo;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable the host sets to the project root, overriding `cwd`.
pub const PROJECT_DIR_ENV: &str = "CLAUDE_PROJECT_DIR";

/// Hook event payload (the union of fields the three handlers use).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HookInput {
    /// Working directory when the hook was invoked
    pub cwd: String,
    /// Tool about to run (PreToolUse events only)
    pub tool_name: String,
    /// Parameters of the pending tool call
    pub tool_input: serde_json::Value,
    /// Path to the session transcript (SessionEnd events only)
    pub transcript_path: String,
    /// Claude Code session ID
    pub session_id: String,
}

impl HookInput {
    /// Parse a hook payload from stdin.
    pub fn from_stdin() -> Result<Self> {
        serde_json::from_reader(std::io::stdin().lock()).context("Failed to parse stdin JSON")
    }

    /// Resolve the project directory: `CLAUDE_PROJECT_DIR` when set and
    /// non-empty, otherwise the payload's `cwd`. `None` when both are empty.
    pub fn project_dir(&self) -> Option<PathBuf> {
        let dir = std::env::var(PROJECT_DIR_ENV)
            .ok()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| self.cwd.clone());
        if dir.is_empty() {
            None
        } else {
            Some(PathBuf::from(dir))
        }
    }
}

/// The `hookSpecificOutput` response Claude Code expects on stdout.
#[derive(Debug, Serialize)]
pub struct HookResponse {
    #[serde(rename = "hookSpecificOutput")]
    output: HookSpecificOutput,
}

#[derive(Debug, Serialize)]
struct HookSpecificOutput {
    #[serde(rename = "hookEventName")]
    hook_event_name: &'static str,
    #[serde(rename = "permissionDecision", skip_serializing_if = "Option::is_none")]
    permission_decision: Option<&'static str>,
    #[serde(rename = "additionalContext")]
    additional_context: String,
}

impl HookResponse {
    /// Advisory context for a SessionStart event.
    pub fn session_start(context: String) -> Self {
        Self {
            output: HookSpecificOutput {
                hook_event_name: "SessionStart",
                permission_decision: None,
                additional_context: context,
            },
        }
    }

    /// Advisory context for a PreToolUse event. The decision is always
    /// "allow"; advisors never block the pending tool call.
    pub fn pre_tool_use_allow(context: String) -> Self {
        Self {
            output: HookSpecificOutput {
                hook_event_name: "PreToolUse",
                permission_decision: Some("allow"),
                additional_context: context,
            },
        }
    }

    /// Print the response as a single JSON line on stdout.
    pub fn emit(&self) -> Result<()> {
        let json = serde_json::to_string(self).context("Failed to serialize hook response")?;
        println!("{json}");
        Ok(())
    }
}
