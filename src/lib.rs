//! Failure-injection benchmarking harness for clustered databases
//!
//! Drives a failure scenario against a database cluster while an external
//! benchmark workload runs, then answers two questions: how long was the
//! service outage, and what did the cluster's logs say during it. The outage
//! window is detected from the benchmark's TPS time series; the log answer
//! comes from incremental excerption of each host's log files past
//! watermarks recorded before the fault.

pub mod config;
pub mod core;
pub mod error;
pub mod harness;
pub mod logging;
pub mod scenario;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use config::{generate_run_id, LogFileSpec, NodeConfig, RunPaths, SiteConfig};
pub use core::{
    detect, extract_tps_series, BaselineReport, IncrementalLogExcerptor, OutageWindow,
    TpsSample, WatermarkEntry, WatermarkTable, WatermarkTracker,
};
pub use error::{HarnessError, HarnessResult, OutagePhase};
pub use harness::{Harness, RunSummary};
pub use scenario::Scenario;
pub use traits::{CommandOutput, RemoteCommand, RemoteExecutor, SessionFactory};
