//! Best-effort git snapshots of the journal directory.
//!
//! The store enqueues a commit message after each successful write; an owned
//! worker task drains the queue and shells out to git. Nothing here affects
//! data correctness — documents are durable on disk before the enqueue, and
//! every failure is logged and swallowed.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct VersioningSink {
    tx: Option<mpsc::UnboundedSender<String>>,
}

impl VersioningSink {
    /// Spawn the worker for `repo_dir` and return the enqueue handle.
    pub fn spawn(repo_dir: PathBuf) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                if let Err(err) = commit_once(&repo_dir, &message).await {
                    warn!(error = %err, "versioning commit failed");
                }
            }
        });
        Self { tx: Some(tx) }
    }

    /// A sink that drops every message. Used when versioning is disabled in
    /// config and throughout the tests.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Enqueue a commit. Non-blocking; the outcome is never reported back.
    pub fn commit(&self, message: impl Into<String>) {
        if let Some(tx) = &self.tx {
            // The worker only goes away at shutdown; a send failure then is
            // as unimportant as the commit itself.
            let _ = tx.send(message.into());
        }
    }
}

async fn commit_once(repo_dir: &Path, message: &str) -> Result<()> {
    let probe = Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(repo_dir)
        .output()
        .await
        .context("failed to run git")?;
    if !probe.status.success() {
        debug!(dir = %repo_dir.display(), "not a git work tree, skipping snapshot");
        return Ok(());
    }

    run_git(repo_dir, &["add", "-A"]).await?;
    run_git(repo_dir, &["commit", "-m", message]).await?;
    debug!(message, "journal snapshot committed");
    Ok(())
}

async fn run_git(repo_dir: &Path, args: &[&str]) -> Result<()> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .output()
        .await
        .with_context(|| format!("failed to run git {}", args.join(" ")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git {} failed: {}", args.join(" "), stderr.trim());
    }
    Ok(())
}
