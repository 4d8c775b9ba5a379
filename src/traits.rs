//! Trait definitions with mockall annotations for testing
//!
//! The remote-execution seam is the only external collaborator of the core
//! collection components. It is expressed as two small traits so tests can
//! inject mocks and the real SSH transport stays behind a narrow contract.

use crate::error::HarnessResult;

/// A remote command as a verb plus arguments.
///
/// Commands are built token-wise and only rendered into a single string at
/// the transport boundary, which keeps construction testable and avoids
/// ad-hoc concatenation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    verb: String,
    args: Vec<String>,
}

impl RemoteCommand {
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            args: Vec::new(),
        }
    }

    /// A full shell pipeline carried as one opaque token. The remote side
    /// hands the line to the login shell, so pipes and `;` sequencing work.
    pub fn shell(line: impl Into<String>) -> Self {
        Self {
            verb: line.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Render the single command line handed to the transport.
    pub fn to_command_line(&self) -> String {
        let mut line = self.verb.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl std::fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_command_line())
    }
}

/// Raw output channels of one remote command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Stdout decoded as text; invalid UTF-8 is replaced, never fatal.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// An open session against one remote host.
///
/// Every execution is bounded by the transport's fixed timeout; expiry and
/// transport failures surface as `HarnessError::RemoteExecution` to the
/// immediate caller, which decides whether sibling work continues. Sessions
/// are a scoped resource: callers acquire one per host, run a bounded batch
/// of commands, and must call `close` on every exit path.
#[mockall::automock]
#[async_trait::async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// The host this session is connected to.
    fn host(&self) -> &str;

    /// Execute one command and return its raw output channels.
    async fn execute(&self, command: &RemoteCommand) -> HarnessResult<CommandOutput>;

    /// Release the session. Idempotent.
    async fn close(&self) -> HarnessResult<()>;
}

/// Factory for authenticated sessions to the configured hosts.
#[mockall::automock]
#[async_trait::async_trait]
pub trait SessionFactory: Send + Sync {
    async fn connect(&self, host: &str) -> HarnessResult<Box<dyn RemoteExecutor>>;
}
