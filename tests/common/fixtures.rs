//! Test data shared across the integration suites

use ha_harness::{LogFileSpec, NodeConfig};

/// Standard two-node cluster test data
pub struct TestFixtures;

impl TestFixtures {
    pub const RUN_ID: &'static str = "1656981757_jul0422_174328";

    pub const HOST_1: &'static str = "172.16.110.1";
    pub const HOST_2: &'static str = "172.16.110.2";

    pub const NODE1_ASM_PATH: &'static str = "/u01/diag/asm/+asm/+ASM1/trace/alert_+ASM1.log";
    pub const NODE1_CRS_PATH: &'static str = "/u01/diag/crs/svr005/crs/trace/alert.log";
    pub const NODE2_ASM_PATH: &'static str = "/u01/diag/asm/+asm/+ASM2/trace/alert_+ASM2.log";

    pub const NODE1_ASM_CONTENT: &'static str =
        "NOTE: client exited [12345]\nNOTE: cleaned up ASM client registration\n";
    pub const NODE1_CRS_CONTENT: &'static str =
        "CRS-1612: network communication missing for half of timeout\n";
    pub const NODE2_ASM_CONTENT: &'static str =
        "NOTE: ASMB process exiting due to lost instance\n";

    pub fn node1() -> NodeConfig {
        NodeConfig {
            node_name: "svr005".to_string(),
            host_ip: Self::HOST_1.to_string(),
            log_files: vec![
                LogFileSpec {
                    alias: "node1_asm_log".to_string(),
                    path: Self::NODE1_ASM_PATH.to_string(),
                },
                LogFileSpec {
                    alias: "node1_crs_log".to_string(),
                    path: Self::NODE1_CRS_PATH.to_string(),
                },
            ],
        }
    }

    pub fn node2() -> NodeConfig {
        NodeConfig {
            node_name: "svr006".to_string(),
            host_ip: Self::HOST_2.to_string(),
            log_files: vec![LogFileSpec {
                alias: "node2_asm_log".to_string(),
                path: Self::NODE2_ASM_PATH.to_string(),
            }],
        }
    }

    pub fn node1_wc_output() -> String {
        format!(
            "  16699 {}\n 217206 {}\n 233905 total\n",
            Self::NODE1_ASM_PATH,
            Self::NODE1_CRS_PATH
        )
    }

    pub fn node2_wc_output() -> String {
        format!("  27358 {}\n  27358 total\n", Self::NODE2_ASM_PATH)
    }
}
