//! Scripted remote-execution mocks for integration tests
//!
//! Builds a `MockSessionFactory` that answers watermark probes and tail
//! commands per host from canned data, so collection paths can be exercised
//! end to end without a real transport.

use std::collections::HashMap;
use std::sync::Arc;

use ha_harness::traits::{CommandOutput, MockRemoteExecutor, MockSessionFactory, RemoteExecutor};
use ha_harness::HarnessError;

/// Canned behavior for one host.
pub struct ScriptedHost {
    pub host: String,
    /// Response to the `wc -l` watermark probe.
    pub wc_output: String,
    /// Response per remote path to `tail -n +N` reads.
    pub tails: HashMap<String, String>,
    /// Refuse the connection outright.
    pub fail_connect: bool,
}

impl ScriptedHost {
    pub fn new(host: &str, wc_output: String) -> Self {
        Self {
            host: host.to_string(),
            wc_output,
            tails: HashMap::new(),
            fail_connect: false,
        }
    }

    pub fn with_tail(mut self, path: &str, content: &str) -> Self {
        self.tails.insert(path.to_string(), content.to_string());
        self
    }

    pub fn failing_connect(host: &str) -> Self {
        Self {
            host: host.to_string(),
            wc_output: String::new(),
            tails: HashMap::new(),
            fail_connect: true,
        }
    }
}

/// Factory whose sessions replay the scripted host behaviors.
pub fn scripted_factory(hosts: Vec<ScriptedHost>) -> MockSessionFactory {
    let hosts = Arc::new(hosts);
    let mut factory = MockSessionFactory::new();

    factory.expect_connect().returning(move |addr| {
        let script = hosts
            .iter()
            .find(|h| h.host == addr)
            .ok_or_else(|| HarnessError::remote(addr, "unscripted host"))?;
        if script.fail_connect {
            return Err(HarnessError::remote(addr, "connection refused"));
        }

        let host = script.host.clone();
        let wc_output = script.wc_output.clone();
        let tails = script.tails.clone();

        let mut session = MockRemoteExecutor::new();
        session.expect_execute().returning(move |command| {
            let line = command.to_command_line();
            if line.starts_with("sudo /bin/wc -l") {
                return Ok(CommandOutput {
                    stdout: wc_output.clone().into_bytes(),
                    stderr: Vec::new(),
                });
            }
            if line.starts_with("sudo tail -n +") {
                for (path, content) in &tails {
                    if line.ends_with(path.as_str()) {
                        return Ok(CommandOutput {
                            stdout: content.clone().into_bytes(),
                            stderr: Vec::new(),
                        });
                    }
                }
            }
            Err(HarnessError::remote(&host, format!("unscripted command: {line}")))
        });
        session.expect_close().returning(|| Ok(()));

        Ok(Box::new(session) as Box<dyn RemoteExecutor>)
    });

    factory
}
