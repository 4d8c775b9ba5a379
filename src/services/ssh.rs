//! SSH-backed remote command execution
//!
//! Real implementation of the remote-execution seam: public-key
//! authentication against the configured hosts, one libssh2 session per
//! host, a fixed per-command execution timeout, and explicit disconnects.
//! All libssh2 calls are blocking and run on the blocking thread pool.
//!
//! Transport failures are returned to the immediate caller as
//! `RemoteExecution` errors; nothing here terminates the process or retries.

use std::io::Read;
use std::net::TcpStream;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::SiteConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::traits::{CommandOutput, RemoteCommand, RemoteExecutor, SessionFactory};

/// Default wall-clock bound on each remote command execution.
pub const DEFAULT_EXEC_TIMEOUT: Duration = Duration::from_secs(30);

const SSH_PORT: u16 = 22;

/// Connects authenticated SSH sessions using the site-wide credentials.
pub struct SshSessionFactory {
    username: String,
    key_file: PathBuf,
    exec_timeout: Duration,
}

impl SshSessionFactory {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            username: config.ssh_user_name.clone(),
            key_file: config.ssh_key_file.clone(),
            exec_timeout: DEFAULT_EXEC_TIMEOUT,
        }
    }

    /// Override the per-command execution timeout (fluent API).
    pub fn with_exec_timeout(mut self, exec_timeout: Duration) -> Self {
        self.exec_timeout = exec_timeout;
        self
    }
}

#[async_trait]
impl SessionFactory for SshSessionFactory {
    async fn connect(&self, host: &str) -> HarnessResult<Box<dyn RemoteExecutor>> {
        let host_owned = host.to_string();
        let username = self.username.clone();
        let key_file = self.key_file.clone();
        let exec_timeout = self.exec_timeout;

        let session = tokio::task::spawn_blocking(move || -> HarnessResult<ssh2::Session> {
            let tcp = TcpStream::connect((host_owned.as_str(), SSH_PORT))
                .map_err(|e| HarnessError::remote(&host_owned, e))?;

            let mut session =
                ssh2::Session::new().map_err(|e| HarnessError::remote(&host_owned, e))?;
            session.set_tcp_stream(tcp);
            session
                .handshake()
                .map_err(|e| HarnessError::remote(&host_owned, e))?;
            session
                .userauth_pubkey_file(&username, None, &key_file, None)
                .map_err(|e| HarnessError::remote(&host_owned, e))?;

            // Bounds every subsequent blocking libssh2 call; expiry surfaces
            // as a transport error, never a silent retry.
            session.set_timeout(exec_timeout.as_millis() as u32);
            Ok(session)
        })
        .await
        .map_err(|e| HarnessError::remote(host, e))??;

        debug!(host = %host, "🔌 SSH session established");
        Ok(Box::new(SshSession {
            host: host.to_string(),
            session: Arc::new(Mutex::new(Some(session))),
        }))
    }
}

/// One open SSH session. Closed explicitly via `close`; a dropped session
/// disconnects when the underlying handle is dropped, but callers are
/// expected to close on every exit path.
pub struct SshSession {
    host: String,
    session: Arc<Mutex<Option<ssh2::Session>>>,
}

impl SshSession {
    fn lock_error(host: &str) -> HarnessError {
        HarnessError::remote(host, "session lock poisoned")
    }
}

#[async_trait]
impl RemoteExecutor for SshSession {
    fn host(&self) -> &str {
        &self.host
    }

    async fn execute(&self, command: &RemoteCommand) -> HarnessResult<CommandOutput> {
        let host = self.host.clone();
        let session = Arc::clone(&self.session);
        let line = command.to_command_line();
        debug!(host = %host, command = %line, "Running remote command");

        tokio::task::spawn_blocking(move || -> HarnessResult<CommandOutput> {
            let guard = session.lock().map_err(|_| Self::lock_error(&host))?;
            let session = guard
                .as_ref()
                .ok_or_else(|| HarnessError::remote(&host, "session already closed"))?;

            let mut channel = session
                .channel_session()
                .map_err(|e| HarnessError::remote(&host, e))?;
            channel
                .exec(&line)
                .map_err(|e| HarnessError::remote(&host, e))?;

            let mut stdout = Vec::new();
            channel
                .read_to_end(&mut stdout)
                .map_err(|e| HarnessError::remote(&host, e))?;

            let mut stderr = Vec::new();
            channel
                .stderr()
                .read_to_end(&mut stderr)
                .map_err(|e| HarnessError::remote(&host, e))?;

            channel
                .wait_close()
                .map_err(|e| HarnessError::remote(&host, e))?;

            Ok(CommandOutput { stdout, stderr })
        })
        .await
        .map_err(|e| HarnessError::remote(&self.host, e))?
    }

    async fn close(&self) -> HarnessResult<()> {
        let host = self.host.clone();
        let session = Arc::clone(&self.session);

        tokio::task::spawn_blocking(move || -> HarnessResult<()> {
            let mut guard = session.lock().map_err(|_| Self::lock_error(&host))?;
            if let Some(session) = guard.take() {
                session
                    .disconnect(None, "harness run finished", None)
                    .map_err(|e| HarnessError::remote(&host, e))?;
            }
            Ok(())
        })
        .await
        .map_err(|e| HarnessError::remote(&self.host, e))?
    }
}
