//! Revision count from the version-control system
//!
//! Runs `git rev-list --count HEAD` (or a configured substitute) as a child
//! process and reports the trimmed standard output.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;

use regex::Regex;
use tokio::process::Command;
use tracing::Level;

use crate::{Error, Result};

/// Default version-control executable.
pub const DEFAULT_VCS: &str = "git";

/// Extracts the repository name from a remote URL ending in `.git`.
static REMOTE_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*/([^.]+)\.git").expect("Invalid remote name regex"));

/// Runs the revision-count command in a working directory.
#[derive(Debug, Clone)]
pub struct RevisionReader {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl Default for RevisionReader {
    fn default() -> Self {
        Self::new(DEFAULT_VCS)
    }
}

impl RevisionReader {
    /// Reader for `<program> rev-list --count HEAD`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: ["rev-list", "--count", "HEAD"].map(String::from).to_vec(),
            cwd: None,
        }
    }

    /// Replace the arguments passed to the program.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Run the command in `dir` instead of the current directory.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Whether the configured program is `git` itself rather than a substitute.
    pub fn is_git(&self) -> bool {
        Path::new(&self.program)
            .file_stem()
            .is_some_and(|stem| stem == DEFAULT_VCS)
    }

    /// Run the revision-count command and return its trimmed output.
    ///
    /// Anything the child prints on stderr is logged as a warning once it
    /// exits and otherwise ignored. There is no timeout: a child that never exits
    /// stalls the caller.
    pub async fn read(&self) -> Result<String> {
        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        self.run(&args, Level::WARN).await
    }

    /// URL of the `origin` remote, via `git remote get-url origin`.
    ///
    /// Returns `None` without running anything when the program is not git.
    /// Stderr from this lookup is only logged at debug level.
    pub async fn remote_url(&self) -> Result<Option<String>> {
        if !self.is_git() {
            tracing::debug!(program = %self.program, "Not git, skipping remote lookup");
            return Ok(None);
        }
        self.run(&["remote", "get-url", "origin"], Level::DEBUG)
            .await
            .map(Some)
    }

    async fn run(&self, args: &[&str], stderr_level: Level) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(ref dir) = self.cwd {
            cmd.current_dir(dir);
        }

        tracing::debug!(program = %self.program, ?args, cwd = ?self.cwd, "Spawning");

        let output = cmd.output().await.map_err(|source| Error::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            if stderr_level == Level::WARN {
                tracing::warn!(program = %self.program, "{}", line);
            } else {
                tracing::debug!(program = %self.program, "{}", line);
            }
        }

        if !output.status.success() {
            return Err(Error::ProcessExit {
                program: self.program.clone(),
                code: output.status.code(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Repository name from a remote URL such as `git@host:org/widget.git`.
///
/// Returns `None` when the URL does not end in `<name>.git` after a slash.
pub fn remote_project_name(url: &str) -> Option<String> {
    REMOTE_NAME_REGEX
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
