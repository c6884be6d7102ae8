use std::path::{Path, PathBuf};
use std::process::Stdio;

use compio::{
    io::compat::AsyncStream,
    process::{ChildStdout, Command},
};
use futures::{AsyncBufReadExt, StreamExt, io::BufReader};
use snafu::Snafu;
use tracing::debug;

use crate::ext::BestEffortPathExt;

/// Handle on a verified Git repository. All queries run relative to `root`
/// and never mutate repository state.
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    /// Opens `path` as a Git repository, verifying it with a single
    /// `rev-parse` query.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let root = path.as_ref().to_path_buf();
        debug!(
            "Verifying Git repository at {}",
            root.best_effort_path_display()
        );

        let repo = Self { root };
        let mut cmd = repo.git_command(&["rev-parse", "--git-dir"]);
        let _ = cmd.stdout(Stdio::null());

        let verified = match cmd.spawn() {
            Ok(handle) => handle
                .wait()
                .await
                .map(|status| status.success())
                .unwrap_or(false),
            Err(_) => false,
        };

        if verified {
            Ok(repo)
        } else {
            NotARepositorySnafu {
                path: repo.root.best_effort_path_display(),
            }
            .fail()
        }
    }

    /// Lists tracked files with one bulk query: `ls-files` for the working
    /// tree, `ls-tree -r` when a branch or ref was requested. Ignore rules
    /// are applied by git itself.
    pub async fn list_tracked_files(&self, branch: Option<&str>) -> Result<Vec<String>, GitError> {
        let args: Vec<&str> = match branch {
            Some(reference) => vec!["ls-tree", "-r", "--name-only", reference],
            None => vec!["ls-files", "--exclude-standard"],
        };

        let mut cmd = self.git_command(&args);
        let mut handle = cmd.spawn().map_err(|source| GitError::ListingFailed {
            path: self.root.best_effort_path_display(),
            source,
        })?;

        let files = match handle.stdout.take() {
            Some(stdout) => read_lines(stdout).await,
            None => Vec::new(),
        };

        let succeeded = handle
            .wait()
            .await
            .map(|status| status.success())
            .map_err(|source| GitError::ListingFailed {
                path: self.root.best_effort_path_display(),
                source,
            })?;

        if succeeded {
            debug!("Listed {} tracked files", files.len());
            Ok(files)
        } else {
            match branch {
                Some(reference) => InvalidReferenceSnafu { reference }.fail(),
                None => NotARepositorySnafu {
                    path: self.root.best_effort_path_display(),
                }
                .fail(),
            }
        }
    }

    /// Base `git` invocation for this repository: stdout piped, stderr
    /// discarded, path quoting disabled so output lines are plain paths.
    pub(super) fn git_command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.args(["-c", "core.quotepath=off"]);
        cmd.args(args);
        cmd.current_dir(&self.root);
        let _ = cmd.stdout(Stdio::piped());
        let _ = cmd.stderr(Stdio::null());
        cmd
    }

    #[cfg(test)]
    pub(crate) fn unverified(root: PathBuf) -> Self {
        Self { root }
    }
}

/// Drains a child's stdout into trimmed, non-empty lines.
async fn read_lines(stdout: ChildStdout) -> Vec<String> {
    let reader = BufReader::new(AsyncStream::new(stdout));
    let mut lines = reader.lines();
    let mut collected = Vec::new();

    while let Some(line_result) = lines.next().await {
        match line_result {
            Ok(line) => {
                let line = line.trim();
                if !line.is_empty() {
                    collected.push(line.to_string());
                }
            }
            Err(e) => debug!("Error reading git output: {e}"),
        }
    }

    collected
}

#[derive(Debug, Snafu)]
pub enum GitError {
    #[snafu(display("'{}' is not a Git repository", path))]
    NotARepository { path: String },
    #[snafu(display("'{}' does not resolve to a valid reference", reference))]
    InvalidReference { reference: String },
    #[snafu(display("Failed to list tracked files in '{}'", path))]
    ListingFailed {
        path: String,
        source: std::io::Error,
    },
}
