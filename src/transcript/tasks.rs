//! Task extraction from transcript tool calls.
//!
//! Builds a task map incrementally from `TaskCreate` / `TaskUpdate` tool
//! invocations, then lets the most recent `todos` snapshot (if any) replace
//! the whole map: the snapshot is the task system's own current state and
//! supersedes anything inferred from individual calls.

use serde_json::Value;
use std::collections::BTreeMap;

use super::{Block, Content, Entry};

/// A task reconstructed from the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub subject: String,
    pub description: String,
    pub status: String,
}

impl Task {
    /// Tasks that are neither completed nor deleted still need attention.
    pub fn is_incomplete(&self) -> bool {
        self.status != "completed" && self.status != "deleted"
    }
}

/// Extract tasks from the transcript, keyed by task id.
///
/// Ids allocated for `TaskCreate` calls are sequential ("1", "2", ...) and
/// scoped to this invocation. `TaskUpdate` calls referencing unknown ids are
/// ignored. A `BTreeMap` keeps rendering order stable (string-sorted ids).
pub fn extract_tasks(entries: &[Entry]) -> BTreeMap<String, Task> {
    let mut tasks: BTreeMap<String, Task> = BTreeMap::new();
    let mut counter = 0usize;

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
            if block.kind != "tool_use" {
                continue;
            }

            match block.name.as_str() {
                "TaskCreate" => {
                    counter += 1;
                    tasks.insert(
                        counter.to_string(),
                        Task {
                            subject: str_field(&block.input, "subject")
                                .unwrap_or_else(|| "Unknown task".to_string()),
                            description: str_field(&block.input, "description")
                                .unwrap_or_default(),
                            status: "pending".to_string(),
                        },
                    );
                }
                "TaskUpdate" => {
                    let Some(id) = str_field(&block.input, "taskId") else {
                        continue;
                    };
                    let Some(task) = tasks.get_mut(&id) else {
                        continue;
                    };
                    if let Some(status) = str_field(&block.input, "status") {
                        task.status = status;
                    }
                    if let Some(subject) = str_field(&block.input, "subject") {
                        task.subject = subject;
                    }
                    if let Some(description) = str_field(&block.input, "description") {
                        task.description = description;
                    }
                }
                _ => {}
            }
        }
    }

    // Most recent snapshot wins over everything inferred above
    if let Some(todos) = entries
        .iter()
        .rev()
        .find_map(|e| e.todos.as_ref().filter(|t| !t.is_empty()))
    {
        tasks.clear();
        for todo in todos {
            let id = if todo.id.is_empty() {
                (tasks.len() + 1).to_string()
            } else {
                todo.id.clone()
            };
            tasks.insert(
                id,
                Task {
                    subject: if todo.subject.is_empty() {
                        "Unknown".to_string()
                    } else {
                        todo.subject.clone()
                    },
                    description: todo.description.clone(),
                    status: if todo.status.is_empty() {
                        "pending".to_string()
                    } else {
                        todo.status.clone()
                    },
                },
            );
        }
    }

    tasks
}

/// Non-empty string field lookup on a tool input object.
fn str_field(input: &Value, key: &str) -> Option<String> {
    input
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
