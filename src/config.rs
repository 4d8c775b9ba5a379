//! Site configuration and per-run artifact path conventions
//!
//! The site configuration is deserialized once from a JSON file named on the
//! command line and passed by reference into every component constructor.
//! Nothing in this crate keeps configuration in process-wide state.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{HarnessError, HarnessResult};

/// One remote log file of interest: a short local alias paired with the
/// absolute path of the file on the remote host.
///
/// Modeled as an ordered list entry rather than a JSON map so the configured
/// file order is explicit; that order decides which files are probed in one
/// watermark round trip.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LogFileSpec {
    pub alias: String,
    pub path: String,
}

/// One database backend host.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    pub node_name: String,
    pub host_ip: String,
    pub log_files: Vec<LogFileSpec>,
}

impl NodeConfig {
    /// Look up the configured alias for an absolute remote path.
    pub fn alias_for_path(&self, path: &str) -> Option<&str> {
        self.log_files
            .iter()
            .find(|spec| spec.path == path)
            .map(|spec| spec.alias.as_str())
    }
}

/// Site-specific constants consumed by the harness, loaded from JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub ssh_user_name: String,
    pub ssh_key_file: PathBuf,
    pub benchmark_binary: PathBuf,
    pub benchmark_config_file: PathBuf,
    pub nodes: Vec<NodeConfig>,
}

impl SiteConfig {
    /// Load and validate the site configuration from a JSON file.
    pub fn load(path: &Path) -> HarnessResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SiteConfig = serde_json::from_str(&content)?;

        if config.nodes.is_empty() {
            return Err(HarnessError::config("site configuration lists no nodes"));
        }
        for node in &config.nodes {
            if node.log_files.is_empty() {
                return Err(HarnessError::config(format!(
                    "node {} lists no log files",
                    node.node_name
                )));
            }
        }

        Ok(config)
    }

    /// Find a node by its host address.
    pub fn node_by_ip(&self, host_ip: &str) -> Option<&NodeConfig> {
        self.nodes.iter().find(|node| node.host_ip == host_ip)
    }

    /// The default fault-injection target: the second configured node, so the
    /// first node keeps serving while its sibling is taken down.
    pub fn default_target_node(&self) -> &NodeConfig {
        self.nodes.get(1).unwrap_or(&self.nodes[0])
    }
}

/// Naming convention for the artifacts of a single run.
///
/// Every run gets its own directory `<log_dest>/<run_id>_<scenario>` holding:
/// `<run_id>.xml` (benchmark result), `<run_id>_runlog` (process log),
/// `<run_id>_workload_log` (benchmark stdout) and one `<run_id>_<alias>` file
/// per excerpted remote log. Downstream tooling locates artifacts by these
/// names.
#[derive(Debug, Clone)]
pub struct RunPaths {
    run_id: String,
    log_dir: PathBuf,
}

impl RunPaths {
    pub fn new(run_id: impl Into<String>, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            run_id: run_id.into(),
            log_dir: log_dir.into(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Benchmark result document written by the workload process.
    pub fn results_xml(&self) -> PathBuf {
        self.log_dir.join(format!("{}.xml", self.run_id))
    }

    /// Harness process log.
    pub fn runlog(&self) -> PathBuf {
        self.log_dir.join(format!("{}_runlog", self.run_id))
    }

    /// Captured stdout of the workload process.
    pub fn workload_log(&self) -> PathBuf {
        self.log_dir.join(format!("{}_workload_log", self.run_id))
    }

    /// Local artifact for one excerpted remote log.
    pub fn excerpt(&self, alias: &str) -> PathBuf {
        self.log_dir.join(format!("{}_{}", self.run_id, alias))
    }
}

/// Generate a run identifier like `1657669952_Jul1222_165232` from the
/// current wall-clock time.
pub fn generate_run_id() -> String {
    chrono::Local::now().format("%s_%b%d%y_%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE_CONFIG: &str = r#"{
        "ssh_user_name": "ansible9",
        "ssh_key_file": "/home/ansible9/.ssh/id_rsa",
        "benchmark_binary": "/opt/bench/bin/charbench",
        "benchmark_config_file": "/opt/bench/configs/soe.xml",
        "nodes": [
            {
                "node_name": "svr005",
                "host_ip": "172.16.110.1",
                "log_files": [
                    {"alias": "node1_asm_log", "path": "/u01/trace/alert_+ASM1.log"},
                    {"alias": "node1_crs_log", "path": "/u01/crs/trace/alert.log"}
                ]
            },
            {
                "node_name": "svr006",
                "host_ip": "172.16.110.2",
                "log_files": [
                    {"alias": "node2_asm_log", "path": "/u01/trace/alert_+ASM2.log"}
                ]
            }
        ]
    }"#;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_sample_config() {
        let file = write_config(SAMPLE_CONFIG);
        let config = SiteConfig::load(file.path()).unwrap();

        assert_eq!(config.ssh_user_name, "ansible9");
        assert_eq!(config.nodes.len(), 2);
        assert_eq!(config.nodes[0].log_files[0].alias, "node1_asm_log");
        assert_eq!(config.default_target_node().host_ip, "172.16.110.2");
    }

    #[test]
    fn test_alias_reverse_lookup() {
        let file = write_config(SAMPLE_CONFIG);
        let config = SiteConfig::load(file.path()).unwrap();
        let node = config.node_by_ip("172.16.110.1").unwrap();

        assert_eq!(
            node.alias_for_path("/u01/crs/trace/alert.log"),
            Some("node1_crs_log")
        );
        assert_eq!(node.alias_for_path("/var/log/messages"), None);
    }

    #[test]
    fn test_empty_nodes_rejected() {
        let file = write_config(
            r#"{"ssh_user_name": "a", "ssh_key_file": "/k",
                "benchmark_binary": "/b", "benchmark_config_file": "/c",
                "nodes": []}"#,
        );
        let err = SiteConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, HarnessError::Configuration { .. }));
    }

    #[test]
    fn test_run_paths_naming_convention() {
        let paths = RunPaths::new("1657669952_Jul1222_165232", "/tmp/logs");

        assert_eq!(
            paths.results_xml().to_str().unwrap(),
            "/tmp/logs/1657669952_Jul1222_165232.xml"
        );
        assert_eq!(
            paths.runlog().to_str().unwrap(),
            "/tmp/logs/1657669952_Jul1222_165232_runlog"
        );
        assert_eq!(
            paths.excerpt("node1_asm_log").to_str().unwrap(),
            "/tmp/logs/1657669952_Jul1222_165232_node1_asm_log"
        );
    }
}
