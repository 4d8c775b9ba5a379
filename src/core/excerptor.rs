//! Incremental excerption of remote log files past their watermarks
//!
//! For every watermark row the excerptor pulls only the content appended to
//! the remote file since the baseline was recorded and appends it to a local
//! artifact named `<run_id>_<alias>`. After a run against a two-node cluster
//! the run directory holds files like:
//!
//! ```text
//! 1656981757_jul0422_174328_node1_asm_log
//! 1656981757_jul0422_174328_node1_crs_log
//! 1656981757_jul0422_174328_node2_asm_log
//! ```
//!
//! The remote read is `tail -n +<baseline>`, which re-includes the baseline
//! line itself rather than starting strictly after it; preserved as-is, see
//! DESIGN.md. Artifacts are opened in append mode so repeated excerption
//! passes accumulate; deduplication on re-runs is the caller's concern.

use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::{NodeConfig, RunPaths};
use crate::core::watermark::{WatermarkEntry, WatermarkTable};
use crate::error::{HarnessError, HarnessResult};
use crate::traits::{RemoteCommand, RemoteExecutor, SessionFactory};

/// One remote log successfully excerpted to its local artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileExcerpt {
    pub alias: String,
    pub bytes_appended: u64,
}

/// One remote log that could not be excerpted. Fatal for this file only.
#[derive(Debug)]
pub struct FileFailure {
    pub alias: String,
    pub error: HarnessError,
}

/// Per-host excerption outcome.
#[derive(Debug)]
pub struct HostExcerpts {
    pub host: String,
    pub completed: Vec<FileExcerpt>,
    pub failed: Vec<FileFailure>,
    /// Set when no session could be established at all; no files were
    /// attempted on this host.
    pub session_error: Option<HarnessError>,
}

impl HostExcerpts {
    pub fn succeeded(&self) -> bool {
        self.failed.is_empty() && self.session_error.is_none()
    }
}

/// Pulls post-watermark content from every host into local artifacts.
pub struct IncrementalLogExcerptor {
    sessions: Arc<dyn SessionFactory>,
}

impl IncrementalLogExcerptor {
    pub fn new(sessions: Arc<dyn SessionFactory>) -> Self {
        Self { sessions }
    }

    /// Excerpt every watermarked file of every host, one task per host.
    ///
    /// Hosts whose baseline probe failed have no table rows and are skipped.
    /// Within a host, one session covers the whole file loop and is released
    /// on every exit path; a bad file never aborts its siblings.
    pub async fn excerpt(
        &self,
        table: &WatermarkTable,
        nodes: &[NodeConfig],
        paths: &RunPaths,
    ) -> Vec<HostExcerpts> {
        let mut tasks = JoinSet::new();
        for node in nodes {
            let Some(entries) = table.get(&node.host_ip) else {
                continue;
            };

            let sessions = Arc::clone(&self.sessions);
            let node = node.clone();
            let entries = entries.to_vec();
            let paths = paths.clone();
            tasks.spawn(async move { Self::excerpt_host(sessions, node, entries, paths).await });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(join_error) => outcomes.push(HostExcerpts {
                    host: "<unknown>".to_string(),
                    completed: Vec::new(),
                    failed: Vec::new(),
                    session_error: Some(HarnessError::remote("<unknown>", join_error)),
                }),
            }
        }
        // Deterministic reporting order regardless of task completion order.
        outcomes.sort_by(|a, b| a.host.cmp(&b.host));
        outcomes
    }

    async fn excerpt_host(
        sessions: Arc<dyn SessionFactory>,
        node: NodeConfig,
        entries: Vec<WatermarkEntry>,
        paths: RunPaths,
    ) -> HostExcerpts {
        let mut outcome = HostExcerpts {
            host: node.host_ip.clone(),
            completed: Vec::new(),
            failed: Vec::new(),
            session_error: None,
        };

        let session = match sessions.connect(&node.host_ip).await {
            Ok(session) => session,
            Err(error) => {
                warn!(host = %node.host_ip, error = %error, "Excerption session failed");
                outcome.session_error = Some(error);
                return outcome;
            }
        };

        for entry in &entries {
            match Self::excerpt_file(session.as_ref(), &node, entry, &paths).await {
                Ok(excerpt) => {
                    info!(
                        host = %node.host_ip,
                        alias = %excerpt.alias,
                        bytes = excerpt.bytes_appended,
                        "📄 Excerpted remote log"
                    );
                    outcome.completed.push(excerpt);
                }
                Err(error) => {
                    warn!(
                        host = %node.host_ip,
                        alias = %entry.alias,
                        error = %error,
                        "Excerption failed for one file"
                    );
                    outcome.failed.push(FileFailure {
                        alias: entry.alias.clone(),
                        error,
                    });
                }
            }
        }

        if let Err(error) = session.close().await {
            warn!(host = %node.host_ip, error = %error, "Session close failed");
        }
        outcome
    }

    /// Pull one file's post-watermark content and append it locally.
    async fn excerpt_file(
        session: &dyn RemoteExecutor,
        node: &NodeConfig,
        entry: &WatermarkEntry,
        paths: &RunPaths,
    ) -> HarnessResult<FileExcerpt> {
        // The watermark row must still map onto the configured files; a
        // stray path means the table and configuration disagree.
        let alias = node
            .alias_for_path(&entry.remote_path)
            .ok_or_else(|| HarnessError::WatermarkMismatch {
                host: node.host_ip.clone(),
                path: entry.remote_path.clone(),
            })?;

        let output = session.execute(&tail_command(entry)).await?;
        let text = output.stdout_text();

        let artifact = paths.excerpt(alias);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&artifact)
            .await?;
        file.write_all(text.as_bytes()).await?;
        file.flush().await?;

        Ok(FileExcerpt {
            alias: alias.to_string(),
            bytes_appended: text.len() as u64,
        })
    }
}

/// Remote read from the recorded baseline line onward (inclusive).
fn tail_command(entry: &WatermarkEntry) -> RemoteCommand {
    RemoteCommand::new("sudo")
        .arg("tail")
        .arg("-n")
        .arg(format!("+{}", entry.baseline))
        .arg(&entry.remote_path)
}
