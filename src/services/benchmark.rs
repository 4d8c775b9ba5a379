//! Benchmark workload process lifecycle
//!
//! The benchmark binary runs locally on the control node and drives load at
//! the cluster; it is an opaque external command to the harness. The runner
//! starts it non-blocking with stdout captured to a per-run file, then the
//! coordinator waits through ramp-up before injecting any fault and through
//! the configured runtime (plus a grace period) before the result document
//! is read.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::info;

use crate::config::{RunPaths, SiteConfig};
use crate::error::{HarnessError, HarnessResult};

/// Fixed wait for the workload to reach steady TPS before fault injection.
/// The detector still sees the leading zeros either way; this only ensures
/// faults land on a fully ramped workload.
pub const RAMP_UP_WAIT: Duration = Duration::from_secs(90);

/// Grace added to the configured runtime before the result file is read, so
/// the workload has finished writing it.
pub const COMPLETION_GRACE: Duration = Duration::from_secs(60);

/// Starts and times the external benchmark process.
pub struct BenchmarkRunner {
    binary: PathBuf,
    config_file: PathBuf,
    runtime_hhmm: String,
    paths: RunPaths,
}

impl BenchmarkRunner {
    pub fn new(config: &SiteConfig, runtime_hhmm: impl Into<String>, paths: RunPaths) -> Self {
        Self {
            binary: config.benchmark_binary.clone(),
            config_file: config.benchmark_config_file.clone(),
            runtime_hhmm: runtime_hhmm.into(),
            paths,
        }
    }

    /// The argument tokens handed to the benchmark binary.
    ///
    /// `-r` points the result document at `<run_id>.xml` inside the run
    /// directory so the detector can find it by convention.
    pub fn command_tokens(&self) -> Vec<String> {
        vec![
            "-c".to_string(),
            self.config_file.display().to_string(),
            "-r".to_string(),
            self.paths.results_xml().display().to_string(),
            "-rt".to_string(),
            self.runtime_hhmm.clone(),
            "-a".to_string(),
            "-v".to_string(),
            "-nc".to_string(),
        ]
    }

    /// Spawn the workload in the background, stdout appended to the per-run
    /// workload log.
    pub async fn start(&self) -> HarnessResult<Child> {
        let stdout_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.paths.workload_log())?;

        let child = Command::new(&self.binary)
            .args(self.command_tokens())
            .stdout(Stdio::from(stdout_file))
            .spawn()?;

        info!(
            binary = %self.binary.display(),
            runtime = %self.runtime_hhmm,
            results = %self.paths.results_xml().display(),
            "🏁 Benchmark workload started"
        );
        Ok(child)
    }

    /// Configured benchmark runtime parsed from `hh:mm`.
    pub fn runtime(&self) -> HarnessResult<Duration> {
        parse_runtime(&self.runtime_hhmm)
    }

    /// How long to block after fault injection before reading the result
    /// document: full runtime plus the completion grace.
    pub fn completion_wait(&self) -> HarnessResult<Duration> {
        Ok(self.runtime()? + COMPLETION_GRACE)
    }
}

/// Parse an `hh:mm` runtime string into a duration.
pub fn parse_runtime(hhmm: &str) -> HarnessResult<Duration> {
    let (hours, minutes) = hhmm
        .split_once(':')
        .ok_or_else(|| HarnessError::config(format!("runtime {hhmm:?} is not hh:mm")))?;

    let hours: u64 = hours
        .parse()
        .map_err(|_| HarnessError::config(format!("runtime {hhmm:?} has non-numeric hours")))?;
    let minutes: u64 = minutes
        .parse()
        .map_err(|_| HarnessError::config(format!("runtime {hhmm:?} has non-numeric minutes")))?;

    Ok(Duration::from_secs(hours * 3600 + minutes * 60))
}
