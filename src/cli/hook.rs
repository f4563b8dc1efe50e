use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::OutputConfig;
use crate::hooks::{self, HookInput};

#[derive(Args)]
pub struct HookArgs {
    #[command(subcommand)]
    command: HookCommands,
}

#[derive(Subcommand)]
enum HookCommands {
    /// Install stitch hooks into Claude Code settings.json
    Install(InstallArgs),

    /// Remove stitch hooks from Claude Code settings
    Uninstall(UninstallArgs),

    /// Show which stitch hooks are registered
    Status(StatusArgs),

    /// Handle SessionStart events: documentation presence check (internal, called by Claude Code)
    DocCheck,

    /// Handle PreToolUse events: index-assisted search advisory (internal, called by Claude Code)
    IndexSearch,

    /// Handle SessionEnd events: session summary extraction (internal, called by Claude Code)
    SessionTodo,
}

#[derive(Args)]
struct InstallArgs {
    /// Install globally (~/.claude/settings.json) instead of project-local
    #[arg(long)]
    global: bool,
}

#[derive(Args)]
struct UninstallArgs {
    /// Uninstall from global settings instead of project-local
    #[arg(long)]
    global: bool,
}

#[derive(Args)]
struct StatusArgs {
    /// Directory to check (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,
}

#[derive(Serialize)]
struct HookStatusOutput {
    hooks_installed: bool,
    registered: Vec<String>,
}

pub fn run(args: HookArgs, output: OutputConfig) -> Result<()> {
    match args.command {
        HookCommands::Install(a) => run_install(a, output),
        HookCommands::Uninstall(a) => run_uninstall(a, output),
        HookCommands::Status(a) => run_status(a, output),
        HookCommands::DocCheck => run_handler("doc-check", hooks::doc_check::run),
        HookCommands::IndexSearch => run_handler("index-search", hooks::index_search::run),
        HookCommands::SessionTodo => run_handler("session-todo", hooks::session_todo::run),
    }
}

/// Run a hook handler behind the silent-failure boundary.
///
/// Handlers must never signal failure to the host: a broken payload or an
/// unreadable directory exits 0 with no output, so the only observable
/// "failure" is the absence of advisory output.
fn run_handler(name: &str, handler: fn(&HookInput) -> Result<()>) -> Result<()> {
    let inner = || -> Result<()> {
        let input = HookInput::from_stdin()?;
        handler(&input)
    };
    if let Err(e) = inner() {
        eprintln!("stitch hook {name}: {e:#}");
    }
    Ok(())
}

/// Resolve the target settings.json path.
/// --global → ~/.claude/settings.json
/// otherwise → <git-root>/.claude/settings.json
fn resolve_settings_path(global: bool) -> Result<PathBuf> {
    if global {
        let home = std::env::var("HOME").context("HOME not set")?;
        Ok(PathBuf::from(home).join(".claude").join("settings.json"))
    } else {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .output()
            .context("Failed to run git rev-parse")?;
        if !output.status.success() {
            anyhow::bail!("Not in a git repository. Use --global or run from a git repo.");
        }
        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(PathBuf::from(root).join(".claude").join("settings.json"))
    }
}

/// Build the stitch hook entries for Claude Code settings.json.
fn stitch_hook_entries() -> serde_json::Value {
    json!({
        "hooks": {
            "SessionStart": [
                {
                    "matcher": "startup|resume",
                    "hooks": [
                        {
                            "type": "command",
                            "command": "stitch hook doc-check",
                            "timeout": 10,
                            "statusMessage": "Checking project documentation..."
                        }
                    ]
                }
            ],
            "PreToolUse": [
                {
                    "matcher": "Grep|Glob",
                    "hooks": [
                        {
                            "type": "command",
                            "command": "stitch hook index-search",
                            "timeout": 10,
                            "statusMessage": "Consulting repo index..."
                        }
                    ]
                }
            ],
            "SessionEnd": [
                {
                    "hooks": [
                        {
                            "type": "command",
                            "command": "stitch hook session-todo",
                            "timeout": 30,
                            "statusMessage": "Recording session TODOs..."
                        }
                    ]
                }
            ]
        }
    })
}

/// Check if a hook group entry contains a stitch command.
fn is_stitch_hook_group(group: &serde_json::Value) -> bool {
    if let Some(hooks) = group.get("hooks").and_then(|h| h.as_array()) {
        hooks.iter().any(|h| {
            h.get("command")
                .and_then(|c| c.as_str())
                .map(|c| c.starts_with("stitch hook "))
                .unwrap_or(false)
        })
    } else {
        false
    }
}

/// Merge stitch hooks into an existing settings object.
/// Preserves non-stitch hooks in each event array.
fn merge_hooks(settings: &mut serde_json::Value) {
    let stitch = stitch_hook_entries();
    let stitch_hooks = stitch.get("hooks").unwrap().as_object().unwrap();

    // Ensure settings.hooks exists as an object
    if settings.get("hooks").is_none() || !settings["hooks"].is_object() {
        settings["hooks"] = json!({});
    }

    for (event_name, stitch_entries) in stitch_hooks {
        let stitch_arr = stitch_entries.as_array().unwrap();

        if let Some(existing) = settings["hooks"].get_mut(event_name) {
            if let Some(arr) = existing.as_array_mut() {
                // Remove old stitch entries, then append new ones
                arr.retain(|entry| !is_stitch_hook_group(entry));
                arr.extend(stitch_arr.iter().cloned());
            } else {
                // Event key exists but isn't an array — replace
                settings["hooks"][event_name] = serde_json::Value::Array(stitch_arr.clone());
            }
        } else {
            settings["hooks"][event_name] = serde_json::Value::Array(stitch_arr.clone());
        }
    }
}

/// Remove stitch hooks from a settings object.
/// Returns true if any hooks were removed.
fn remove_stitch_hooks(settings: &mut serde_json::Value) -> bool {
    let mut removed = false;
    if let Some(hooks) = settings.get_mut("hooks").and_then(|h| h.as_object_mut()) {
        for (_event, entries) in hooks.iter_mut() {
            if let Some(arr) = entries.as_array_mut() {
                let before = arr.len();
                arr.retain(|entry| !is_stitch_hook_group(entry));
                if arr.len() < before {
                    removed = true;
                }
            }
        }
        // Clean up empty event arrays
        hooks.retain(|_, v| v.as_array().map(|a| !a.is_empty()).unwrap_or(true));
    }
    // Remove empty hooks object
    if let Some(hooks) = settings.get("hooks").and_then(|h| h.as_object()) {
        if hooks.is_empty() {
            settings.as_object_mut().unwrap().remove("hooks");
        }
    }
    removed
}

/// Collect the stitch commands registered in a settings.json Value.
fn registered_stitch_commands(settings: &serde_json::Value) -> Vec<String> {
    let mut commands = Vec::new();
    if let Some(hooks) = settings.get("hooks").and_then(|h| h.as_object()) {
        for (_event, entries) in hooks {
            let Some(arr) = entries.as_array() else {
                continue;
            };
            for group in arr {
                let Some(group_hooks) = group.get("hooks").and_then(|h| h.as_array()) else {
                    continue;
                };
                for h in group_hooks {
                    if let Some(cmd) = h.get("command").and_then(|c| c.as_str()) {
                        if cmd.starts_with("stitch hook ") {
                            commands.push(cmd.to_string());
                        }
                    }
                }
            }
        }
    }
    commands.sort();
    commands
}

/// Read a settings.json file, returning empty object if missing.
fn read_settings(path: &Path) -> Result<serde_json::Value> {
    if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(json!({}));
        }
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    } else {
        Ok(json!({}))
    }
}

/// Write settings.json, creating parent directories as needed.
fn write_settings(path: &Path, settings: &serde_json::Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let content =
        serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

fn run_install(args: InstallArgs, output: OutputConfig) -> Result<()> {
    let settings_path = resolve_settings_path(args.global)?;

    let mut settings = read_settings(&settings_path)?;
    merge_hooks(&mut settings);
    write_settings(&settings_path, &settings)?;

    if output.json {
        let result = json!({
            "status": "installed",
            "path": settings_path.display().to_string(),
            "global": args.global,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if !output.quiet {
        let scope = if args.global { "global" } else { "project" };
        println!("{} Stitch hooks installed ({})", "✓".green(), scope.cyan());
        println!("  Location: {}", settings_path.display().to_string().dimmed());
        println!("  SessionStart: {}", "doc-check (startup|resume)".cyan());
        println!("  PreToolUse:   {}", "index-search (Grep|Glob)".cyan());
        println!("  SessionEnd:   {}", "session-todo".cyan());
    }

    Ok(())
}

fn run_uninstall(args: UninstallArgs, output: OutputConfig) -> Result<()> {
    let settings_path = resolve_settings_path(args.global)?;

    if !settings_path.exists() {
        if output.json {
            let result = json!({
                "status": "not_installed",
                "path": settings_path.display().to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else if !output.quiet {
            println!("No hooks to remove ({})", settings_path.display());
        }
        return Ok(());
    }

    let mut settings = read_settings(&settings_path)?;
    let removed = remove_stitch_hooks(&mut settings);
    write_settings(&settings_path, &settings)?;

    if output.json {
        let result = json!({
            "status": if removed { "uninstalled" } else { "not_installed" },
            "path": settings_path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if !output.quiet {
        if removed {
            println!(
                "{} Stitch hooks removed from {}",
                "✓".green(),
                settings_path.display()
            );
        } else {
            println!("No stitch hooks found in {}", settings_path.display());
        }
    }

    Ok(())
}

fn run_status(args: StatusArgs, output: OutputConfig) -> Result<()> {
    let repo_root = args
        .path
        .canonicalize()
        .with_context(|| format!("Invalid path: {}", args.path.display()))?;

    let project_settings = repo_root.join(".claude").join("settings.json");
    let registered = if project_settings.exists() {
        read_settings(&project_settings)
            .map(|s| registered_stitch_commands(&s))
            .unwrap_or_default()
    } else {
        Vec::new()
    };
    let hooks_installed = !registered.is_empty();

    if output.json {
        let status = HookStatusOutput {
            hooks_installed,
            registered,
        };
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else if !output.quiet {
        let state = if hooks_installed {
            "installed".green()
        } else {
            "not installed".yellow()
        };
        println!("{} Claude Code hooks: {}", "⚡".bold(), state);
        for command in &registered {
            println!("  {}", command.cyan());
        }
    }

    Ok(())
}
