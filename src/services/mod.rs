//! Real service implementations behind the harness seams

pub mod benchmark;
pub mod ssh;

pub use benchmark::{parse_runtime, BenchmarkRunner, COMPLETION_GRACE, RAMP_UP_WAIT};
pub use ssh::{SshSession, SshSessionFactory, DEFAULT_EXEC_TIMEOUT};
