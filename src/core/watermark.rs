//! Baseline line counts ("watermarks") for remote log files
//!
//! Before any fault is injected, the tracker snapshots the current line count
//! of every configured log file on every host. One remote `wc -l` invocation
//! covers all of a host's files, so each host costs a single round trip and
//! the counts within a host are taken from one consistent probe.
//!
//! A recorded table looks like:
//!
//! ```text
//! 172.16.110.1 => [
//!   ("/u01/.../alert_+ASM1.log", node1_asm_log, "16699"),
//!   ("/u01/.../crs/trace/alert.log", node1_crs_log, "217206"),
//!   ("/u01/.../alert_orcl1.log", node1_db_log, "74373"),
//! ]
//! ```
//!
//! Baselines are carried as strings: they are forwarded verbatim into the
//! remote tail command and never combined arithmetically.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::NodeConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::traits::{RemoteCommand, RemoteExecutor, SessionFactory};

/// Recorded baseline for one remote log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkEntry {
    pub remote_path: String,
    pub alias: String,
    pub baseline: String,
}

/// Per-host watermark rows, keyed by host address. Row order within a host
/// preserves the configured file order.
pub type WatermarkTable = HashMap<String, Vec<WatermarkEntry>>;

/// A host whose baseline probe failed.
#[derive(Debug)]
pub struct HostFailure {
    pub host: String,
    pub error: HarnessError,
}

/// Aggregate outcome of one baseline pass: successful hosts contribute rows
/// to the table, failed hosts are reported instead of aborting the pass.
#[derive(Debug, Default)]
pub struct BaselineReport {
    pub table: WatermarkTable,
    pub failures: Vec<HostFailure>,
}

impl BaselineReport {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Records per-host log file baselines before fault injection.
pub struct WatermarkTracker {
    sessions: Arc<dyn SessionFactory>,
}

impl WatermarkTracker {
    pub fn new(sessions: Arc<dyn SessionFactory>) -> Self {
        Self { sessions }
    }

    /// Snapshot baselines for every configured host, one task per host.
    ///
    /// Hosts are independent failure domains: a transport failure against one
    /// host is reported in the aggregate and never cancels the in-flight
    /// probes of its siblings.
    pub async fn record_baselines(&self, nodes: &[NodeConfig]) -> BaselineReport {
        let mut tasks = JoinSet::new();
        for node in nodes.iter().cloned() {
            let sessions = Arc::clone(&self.sessions);
            tasks.spawn(async move {
                let host = node.host_ip.clone();
                let outcome = Self::record_host(sessions, node).await;
                (host, outcome)
            });
        }

        let mut report = BaselineReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((host, Ok(entries))) => {
                    info!(host = %host, files = entries.len(), "🔖 Recorded log watermarks");
                    report.table.insert(host, entries);
                }
                Ok((host, Err(error))) => {
                    warn!(host = %host, error = %error, "Baseline probe failed");
                    report.failures.push(HostFailure { host, error });
                }
                Err(join_error) => {
                    report.failures.push(HostFailure {
                        host: "<unknown>".to_string(),
                        error: HarnessError::remote("<unknown>", join_error),
                    });
                }
            }
        }
        report
    }

    /// Probe one host inside a scoped session, released on every exit path.
    async fn record_host(
        sessions: Arc<dyn SessionFactory>,
        node: NodeConfig,
    ) -> HarnessResult<Vec<WatermarkEntry>> {
        let session = sessions.connect(&node.host_ip).await?;
        let probe = Self::probe_host(session.as_ref(), &node).await;
        let closed = session.close().await;

        let entries = probe?;
        closed?;
        Ok(entries)
    }

    async fn probe_host(
        session: &dyn RemoteExecutor,
        node: &NodeConfig,
    ) -> HarnessResult<Vec<WatermarkEntry>> {
        let output = session.execute(&Self::watermark_command(node)).await?;
        parse_wc_output(node, &output.stdout_text())
    }

    /// One `wc -l` invocation covering all of the host's files, in
    /// configured order.
    fn watermark_command(node: &NodeConfig) -> RemoteCommand {
        RemoteCommand::new("sudo")
            .arg("/bin/wc")
            .arg("-l")
            .args(node.log_files.iter().map(|spec| spec.path.clone()))
    }
}

/// Parse combined `wc -l` output into watermark rows.
///
/// The output carries one `<count><ws><path>` line per requested file, in
/// request order, followed by one aggregate `total` line which is discarded.
pub fn parse_wc_output(node: &NodeConfig, output: &str) -> HarnessResult<Vec<WatermarkEntry>> {
    let lines: Vec<&str> = output.lines().filter(|line| !line.trim().is_empty()).collect();

    // One line per file plus the aggregate line; anything shorter means the
    // remote command did not run the way the protocol expects.
    if lines.len() < node.log_files.len() + 1 {
        return Err(HarnessError::remote(
            &node.host_ip,
            format!(
                "watermark probe returned {} lines for {} files",
                lines.len(),
                node.log_files.len()
            ),
        ));
    }

    let mut entries = Vec::with_capacity(node.log_files.len());
    for line in &lines[..node.log_files.len()] {
        let mut parts = line.split_whitespace();
        let (count, path) = match (parts.next(), parts.next()) {
            (Some(count), Some(path)) => (count, path),
            _ => {
                return Err(HarnessError::remote(
                    &node.host_ip,
                    format!("unparseable watermark line: {line:?}"),
                ))
            }
        };

        let alias = node
            .alias_for_path(path)
            .ok_or_else(|| HarnessError::WatermarkMismatch {
                host: node.host_ip.clone(),
                path: path.to_string(),
            })?;

        entries.push(WatermarkEntry {
            remote_path: path.to_string(),
            alias: alias.to_string(),
            baseline: count.to_string(),
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFileSpec;
    use crate::traits::{CommandOutput, MockRemoteExecutor, MockSessionFactory};

    fn node(host_ip: &str, files: &[(&str, &str)]) -> NodeConfig {
        NodeConfig {
            node_name: format!("node-{host_ip}"),
            host_ip: host_ip.to_string(),
            log_files: files
                .iter()
                .map(|(alias, path)| LogFileSpec {
                    alias: alias.to_string(),
                    path: path.to_string(),
                })
                .collect(),
        }
    }

    fn three_log_node() -> NodeConfig {
        node(
            "172.16.110.1",
            &[
                ("node1_asm_log", "/path/a.log"),
                ("node1_crs_log", "/path/b.log"),
                ("node1_db_log", "/path/c.log"),
            ],
        )
    }

    #[test]
    fn test_parse_wc_output_drops_total_line() {
        let output = "1000 /path/a.log\n2000 /path/b.log\n3000 /path/c.log\n117562 total\n";
        let entries = parse_wc_output(&three_log_node(), output).unwrap();

        assert_eq!(
            entries,
            vec![
                WatermarkEntry {
                    remote_path: "/path/a.log".to_string(),
                    alias: "node1_asm_log".to_string(),
                    baseline: "1000".to_string(),
                },
                WatermarkEntry {
                    remote_path: "/path/b.log".to_string(),
                    alias: "node1_crs_log".to_string(),
                    baseline: "2000".to_string(),
                },
                WatermarkEntry {
                    remote_path: "/path/c.log".to_string(),
                    alias: "node1_db_log".to_string(),
                    baseline: "3000".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_wc_output_tolerates_leading_whitespace() {
        // wc right-aligns counts when invoked with multiple files
        let output = "  1000 /path/a.log\n   200 /path/b.log\n 86297 /path/c.log\n 87497 total\n";
        let entries = parse_wc_output(&three_log_node(), output).unwrap();

        assert_eq!(entries[1].baseline, "200");
        assert_eq!(entries[2].remote_path, "/path/c.log");
    }

    #[test]
    fn test_parse_wc_output_short_response_is_protocol_mismatch() {
        let output = "1000 /path/a.log\n117562 total\n";
        let err = parse_wc_output(&three_log_node(), output).unwrap_err();
        assert!(matches!(err, HarnessError::RemoteExecution { .. }));
    }

    #[test]
    fn test_parse_wc_output_unknown_path_is_mismatch() {
        let output = "1000 /path/a.log\n2000 /elsewhere/b.log\n3000 /path/c.log\n6000 total\n";
        let err = parse_wc_output(&three_log_node(), output).unwrap_err();

        match err {
            HarnessError::WatermarkMismatch { host, path } => {
                assert_eq!(host, "172.16.110.1");
                assert_eq!(path, "/elsewhere/b.log");
            }
            other => panic!("expected WatermarkMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_watermark_command_probes_all_files_in_order() {
        let command = WatermarkTracker::watermark_command(&three_log_node());
        assert_eq!(
            command.to_command_line(),
            "sudo /bin/wc -l /path/a.log /path/b.log /path/c.log"
        );
    }

    #[tokio::test]
    async fn test_record_baselines_closes_session() {
        let mut factory = MockSessionFactory::new();
        factory.expect_connect().times(1).returning(|_| {
            let mut session = MockRemoteExecutor::new();
            session.expect_execute().times(1).returning(|_| {
                Ok(CommandOutput {
                    stdout: b"1000 /path/a.log\n2000 /path/b.log\n3000 /path/c.log\n6000 total\n"
                        .to_vec(),
                    stderr: Vec::new(),
                })
            });
            session.expect_close().times(1).returning(|| Ok(()));
            Ok(Box::new(session) as Box<dyn crate::traits::RemoteExecutor>)
        });

        let tracker = WatermarkTracker::new(Arc::new(factory));
        let report = tracker.record_baselines(&[three_log_node()]).await;

        assert!(report.all_succeeded());
        assert_eq!(report.table["172.16.110.1"].len(), 3);
    }

    #[tokio::test]
    async fn test_record_baselines_isolates_host_failures() {
        let mut factory = MockSessionFactory::new();
        factory.expect_connect().times(2).returning(|host| {
            if host == "172.16.110.2" {
                return Err(HarnessError::remote(host, "connection refused"));
            }
            let mut session = MockRemoteExecutor::new();
            session.expect_execute().returning(|_| {
                Ok(CommandOutput {
                    stdout: b"42 /path/a.log\n42 total\n".to_vec(),
                    stderr: Vec::new(),
                })
            });
            session.expect_close().returning(|| Ok(()));
            Ok(Box::new(session) as Box<dyn crate::traits::RemoteExecutor>)
        });

        let nodes = vec![
            node("172.16.110.1", &[("node1_asm_log", "/path/a.log")]),
            node("172.16.110.2", &[("node2_asm_log", "/path/z.log")]),
        ];

        let tracker = WatermarkTracker::new(Arc::new(factory));
        let report = tracker.record_baselines(&nodes).await;

        // Host A's baseline survives host B's transport failure.
        assert_eq!(report.table["172.16.110.1"][0].baseline, "42");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].host, "172.16.110.2");
    }
}
