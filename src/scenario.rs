//! Failure scenario registry
//!
//! Each scenario pairs a benchmark runtime (long enough to cover the
//! expected recovery, sized from prior benchmarking runs) with an optional
//! remote fault-injection command sequence. Scenarios without a command
//! sequence have their fault triggered out of band (hardware resets, HBA
//! port manipulation) while the harness still measures and collects.

use clap::ValueEnum;

use crate::traits::RemoteCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Smoke-test run: short workload, no real fault.
    Testing,
    /// Kernel panic on the target node.
    KernelPanic,
    /// Clean OS shutdown of the target node.
    Shutdown,
    /// Node reset through the platform management API.
    ResetApi,
    /// Storage path loss on the data LUNs.
    HbaDataLun,
    /// Storage path loss on the root LUN.
    HbaRootLun,
    /// All HBA ports down.
    HbaAllPortsDown,
    /// Kill the database instance on the target node.
    InstanceDown,
    /// Crash the listener process on the target node.
    ListenerCrash,
}

impl Scenario {
    /// Benchmark runtime (`hh:mm`) covering ramp-up, the outage and enough
    /// post-recovery samples for detection.
    pub fn runtime_hhmm(&self) -> &'static str {
        match self {
            Scenario::Testing => "00:02",
            Scenario::KernelPanic => "00:20",
            Scenario::Shutdown => "00:20",
            Scenario::ResetApi => "00:20",
            Scenario::HbaDataLun => "00:30",
            Scenario::HbaRootLun => "00:30",
            Scenario::HbaAllPortsDown => "03:30",
            Scenario::InstanceDown => "00:02",
            Scenario::ListenerCrash => "00:03",
        }
    }

    /// Remote commands injecting the fault on the target host, where the
    /// scenario is driven from the control node. `None` means the fault is
    /// triggered out of band.
    pub fn fault_commands(&self) -> Option<Vec<RemoteCommand>> {
        match self {
            Scenario::Testing => Some(vec![RemoteCommand::shell(
                "echo fault injection placeholder; date +%s; date",
            )]),
            Scenario::InstanceDown => Some(vec![
                RemoteCommand::shell("echo monitor processes before instance shutdown"),
                RemoteCommand::shell("date +%s ; date; ps -ef|grep pmon|grep -v grep"),
                RemoteCommand::shell(
                    "date +%s ; date; ps -ef|grep pmon|grep -v grep|grep -v grid\
                     |awk '{print $2}'|sudo xargs kill -9; date +%s ; date",
                ),
                RemoteCommand::shell("echo monitor processes after instance shutdown"),
                RemoteCommand::shell("date +%s ; date; ps -ef|grep pmon|grep -v grep"),
            ]),
            _ => None,
        }
    }

    /// Name used in artifact directory naming (`<run_id>_<scenario>`).
    pub fn slug(&self) -> &'static str {
        match self {
            Scenario::Testing => "testing",
            Scenario::KernelPanic => "kernel_panic",
            Scenario::Shutdown => "shutdown",
            Scenario::ResetApi => "reset_api",
            Scenario::HbaDataLun => "hba_data_lun",
            Scenario::HbaRootLun => "hba_root_lun",
            Scenario::HbaAllPortsDown => "hba_all_ports_down",
            Scenario::InstanceDown => "instance_down",
            Scenario::ListenerCrash => "listener_crash",
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}
