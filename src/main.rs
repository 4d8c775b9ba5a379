//! Main entry point for the harness binary
//!
//! Wires the real SSH transport into the coordinator and runs one failure
//! scenario per invocation. Artifacts land under
//! `<log_dest>/<run_id>_<scenario>/`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use ha_harness::services::SshSessionFactory;
use ha_harness::{generate_run_id, Harness, HarnessResult, RunPaths, Scenario, SiteConfig};

/// Failure-injection benchmarking harness for clustered databases
#[derive(Parser)]
#[command(name = "ha-harness")]
#[command(about = "Runs a failure scenario against a database cluster and measures the outage")]
pub struct Args {
    /// JSON file containing site-specific constants
    #[arg(long, short = 'j')]
    pub config: PathBuf,

    /// Failure scenario to run
    #[arg(long, short = 's', value_enum)]
    pub scenario: Scenario,

    /// Host where fault injection is desired (default: the second configured node)
    #[arg(long, short = 'n')]
    pub node_ip: Option<String>,

    /// Directory where run artifacts are created (default: current directory)
    #[arg(long, short = 'l', default_value = ".")]
    pub log_dest: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[tokio::main]
async fn main() -> HarnessResult<()> {
    let args = Args::parse();

    let config = SiteConfig::load(&args.config)?;

    let run_id = generate_run_id();
    let log_dir = args
        .log_dest
        .join(format!("{}_{}", run_id, args.scenario.slug()));
    std::fs::create_dir_all(&log_dir)?;
    let paths = RunPaths::new(run_id, log_dir);

    ha_harness::logging::init_tracing(&paths.runlog(), &args.log_level)?;
    info!(
        run_id = %paths.run_id(),
        scenario = %args.scenario,
        config = %args.config.display(),
        artifacts = %paths.log_dir().display(),
        "🚀 Starting scenario run"
    );

    let target_host = match args.node_ip {
        Some(node_ip) => node_ip,
        None => config.default_target_node().host_ip.clone(),
    };

    let sessions = Arc::new(SshSessionFactory::new(&config));
    let harness = Harness::new(config, paths, args.scenario, target_host, sessions);
    let summary = harness.run().await?;

    if let Some(window) = &summary.window {
        info!(
            duration_seconds = window.duration_seconds,
            "✅ Run complete"
        );
    } else {
        info!("Run complete without a detected outage window; see the runlog");
    }

    if !summary.clean() {
        info!("One or more hosts reported collection failures; see the runlog");
    }

    Ok(())
}
