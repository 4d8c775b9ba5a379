//! Harness-specific error types

use thiserror::Error;

/// Phase of the outage state machine that a time series failed to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutagePhase {
    /// The workload never produced a non-zero TPS sample.
    WorkloadStart,
    /// TPS never dropped back to zero after ramp-up.
    OutageStart,
    /// TPS never climbed back above the recovery threshold.
    Recovery,
}

impl std::fmt::Display for OutagePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutagePhase::WorkloadStart => write!(f, "workload-start"),
            OutagePhase::OutageStart => write!(f, "outage-start"),
            OutagePhase::Recovery => write!(f, "recovery"),
        }
    }
}

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Malformed benchmark result: {reason}")]
    Parse { reason: String },

    #[error("Time series never reached the {phase} phase")]
    InsufficientData { phase: OutagePhase },

    #[error("Remote execution failed on {host}: {reason}")]
    RemoteExecution { host: String, reason: String },

    #[error("No configured alias matches remote path {path} on host {host}")]
    WatermarkMismatch { host: String, path: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HarnessError {
    /// Convenience constructor for transport-level failures.
    pub fn remote(host: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        HarnessError::RemoteExecution {
            host: host.into(),
            reason: reason.to_string(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        HarnessError::Configuration {
            message: message.into(),
        }
    }

    pub fn parse(reason: impl Into<String>) -> Self {
        HarnessError::Parse {
            reason: reason.into(),
        }
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;
