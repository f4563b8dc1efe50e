use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary project directory for hook tests.
pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new temp directory with a git repo initialized.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        // Initialize a git repo so commands that resolve the git toplevel work
        std::process::Command::new("git")
            .args(["init", "--initial-branch=main"])
            .current_dir(dir.path())
            .output()
            .expect("failed to git init");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the project root, creating parent dirs as needed.
    pub fn write_file(&self, relative_path: &str, content: &str) {
        let full = self.dir.path().join(relative_path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dirs");
        }
        std::fs::write(&full, content).expect("failed to write file");
    }

    /// Write all four documentation files the doc-check hook expects.
    pub fn write_all_docs(&self) {
        for name in ["README.md", "INSTALLATION.md", "METHODS.md", "TODO.md"] {
            self.write_file(name, "# placeholder\n");
        }
    }

    /// Write sample `.claude/repo-index/` files for index-search tests.
    pub fn write_index_fixtures(&self) {
        self.write_file(
            ".claude/repo-index/symbols.txt",
            "# Symbol index\n\
             parseConfig() — config/loader.py:42\n\
             renderDashboard() — ui/dashboard.py:7\n\
             HttpClient — net/client.py:15\n",
        );
        self.write_file(
            ".claude/repo-index/file-tree.txt",
            "# File tree\n\
             config/loader.py\n\
             ui/dashboard.py\n\
             net/client.py\n",
        );
        self.write_file(
            ".claude/repo-index/dependencies.txt",
            "# Dependencies\n\
             requests==2.31\n\
             pyyaml==6.0\n",
        );
    }

    /// Write a JSONL transcript file and return its path.
    pub fn write_transcript(&self, name: &str, lines: &[&str]) -> PathBuf {
        let content: String = lines.iter().map(|l| format!("{l}\n")).collect();
        self.write_file(name, &content);
        self.dir.path().join(name)
    }

    /// Return the path to the stitch binary (built via cargo).
    pub fn stitch_bin() -> PathBuf {
        // assert_cmd finds the binary automatically via cargo
        PathBuf::from(env!("CARGO_BIN_EXE_stitch"))
    }
}
