//! Run coordinator
//!
//! Thin sequencing over the core components: start the benchmark workload,
//! wait for ramp-up, record log watermarks, inject the fault, block until
//! the workload finishes, detect the outage window from the result document
//! and finally excerpt the remote logs past their watermarks.
//!
//! The coordinator is deliberately tolerant: collection failures on one host
//! never abort the run, and a failed detection still leaves the excerpts in
//! place for manual analysis. Every outcome lands in the `RunSummary`.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::{RunPaths, SiteConfig};
use crate::core::detector;
use crate::core::{
    BaselineReport, HostExcerpts, IncrementalLogExcerptor, OutageWindow, WatermarkTracker,
};
use crate::error::{HarnessError, HarnessResult};
use crate::scenario::Scenario;
use crate::services::{BenchmarkRunner, RAMP_UP_WAIT};
use crate::traits::SessionFactory;

/// Everything one scenario run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub window: Option<OutageWindow>,
    pub detection_error: Option<HarnessError>,
    pub baselines: BaselineReport,
    pub excerpts: Vec<HostExcerpts>,
}

impl RunSummary {
    /// True when detection succeeded and every host collected cleanly.
    pub fn clean(&self) -> bool {
        self.window.is_some()
            && self.baselines.all_succeeded()
            && self.excerpts.iter().all(HostExcerpts::succeeded)
    }
}

/// Sequences one failure scenario run end to end.
pub struct Harness {
    config: SiteConfig,
    paths: RunPaths,
    scenario: Scenario,
    target_host: String,
    sessions: Arc<dyn SessionFactory>,
}

impl Harness {
    pub fn new(
        config: SiteConfig,
        paths: RunPaths,
        scenario: Scenario,
        target_host: String,
        sessions: Arc<dyn SessionFactory>,
    ) -> Self {
        Self {
            config,
            paths,
            scenario,
            target_host,
            sessions,
        }
    }

    /// Run the scenario: benchmark, baselines, fault, detection, excerption.
    pub async fn run(&self) -> HarnessResult<RunSummary> {
        let runner = BenchmarkRunner::new(
            &self.config,
            self.scenario.runtime_hhmm(),
            self.paths.clone(),
        );
        let completion_wait = runner.completion_wait()?;
        let mut workload = runner.start().await?;

        info!(wait_secs = RAMP_UP_WAIT.as_secs(), "⏳ Waiting for workload ramp-up");
        tokio::time::sleep(RAMP_UP_WAIT).await;

        // Watermarks must predate the fault so the excerpts cover exactly
        // the disruption.
        let tracker = WatermarkTracker::new(Arc::clone(&self.sessions));
        let baselines = tracker.record_baselines(&self.config.nodes).await;
        for failure in &baselines.failures {
            warn!(host = %failure.host, error = %failure.error, "Baseline missing for host");
        }

        self.inject_fault().await;

        info!(
            wait_secs = completion_wait.as_secs(),
            "⏳ Waiting for benchmark completion"
        );
        tokio::time::sleep(completion_wait).await;

        match workload.try_wait() {
            Ok(Some(status)) => info!(status = %status, "Benchmark workload exited"),
            Ok(None) => warn!("Benchmark workload still running past its runtime"),
            Err(e) => warn!(error = %e, "Could not query benchmark workload status"),
        }

        let (window, detection_error) =
            match detector::detect_from_file(&self.paths.results_xml()).await {
                Ok(window) => (Some(window), None),
                Err(e) => {
                    error!(error = %e, "Outage detection failed");
                    (None, Some(e))
                }
            };

        if let Some(window) = &window {
            info!(
                duration_seconds = window.duration_seconds,
                workload_start = %format_local(window.workload_start_local()),
                outage_start = %format_local(window.outage_start_local()),
                outage_end = %format_local(window.outage_end_local()),
                "📊 Scenario outage measured"
            );
        }

        let excerptor = IncrementalLogExcerptor::new(Arc::clone(&self.sessions));
        let excerpts = excerptor
            .excerpt(&baselines.table, &self.config.nodes, &self.paths)
            .await;

        Ok(RunSummary {
            window,
            detection_error,
            baselines,
            excerpts,
        })
    }

    /// Run the scenario's fault commands against the target host, if the
    /// scenario is driven from the control node. Failures are logged and the
    /// run continues; the detector will report the missing outage.
    async fn inject_fault(&self) {
        let Some(commands) = self.scenario.fault_commands() else {
            info!(scenario = %self.scenario, "Fault is triggered out of band for this scenario");
            return;
        };

        info!(
            scenario = %self.scenario,
            target = %self.target_host,
            "💉 Injecting fault"
        );

        let session = match self.sessions.connect(&self.target_host).await {
            Ok(session) => session,
            Err(e) => {
                error!(target = %self.target_host, error = %e, "Fault injection session failed");
                return;
            }
        };

        for command in &commands {
            match session.execute(command).await {
                Ok(output) => {
                    let stdout = output.stdout_text();
                    if !stdout.is_empty() {
                        info!(target = %self.target_host, stdout = %stdout.trim_end(), "Fault command output");
                    }
                    let stderr = output.stderr_text();
                    if !stderr.is_empty() {
                        info!(target = %self.target_host, stderr = %stderr.trim_end(), "Fault command stderr");
                    }
                }
                Err(e) => {
                    error!(
                        target = %self.target_host,
                        command = %command,
                        error = %e,
                        "Fault command failed"
                    );
                }
            }
        }

        if let Err(e) = session.close().await {
            warn!(target = %self.target_host, error = %e, "Fault injection session close failed");
        }
    }
}

fn format_local(time: Option<chrono::DateTime<chrono::Local>>) -> String {
    time.map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "<out of range>".to_string())
}
