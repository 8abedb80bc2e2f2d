use std::borrow::Cow;
use std::ffi::{CStr, CString, NulError};
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::environment::ShellEnvironment;
use crate::status::RawStatus;

/// Shell family used to interpret the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellKind {
    Unix,
    Windows,
}

impl ShellKind {
    /// The shell `system(3)` would use on this platform.
    pub const fn host() -> Self {
        if cfg!(windows) {
            ShellKind::Windows
        } else {
            ShellKind::Unix
        }
    }

    pub const fn program(self) -> &'static str {
        match self {
            ShellKind::Unix => "/bin/sh",
            ShellKind::Windows => "cmd.exe",
        }
    }

    pub const fn command_flag(self) -> &'static str {
        match self {
            ShellKind::Unix => "-c",
            ShellKind::Windows => "/C",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvocationError {
    #[error("command contains a NUL byte at offset {position}")]
    InteriorNul { position: usize },
}

impl From<NulError> for InvocationError {
    fn from(err: NulError) -> Self {
        InvocationError::InteriorNul {
            position: err.nul_position(),
        }
    }
}

/// A command line ready to be handed to a [`CommandExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    shell: ShellKind,
    command: CString,
    environment: ShellEnvironment,
}

impl CommandInvocation {
    /// Fails when `command` cannot be represented as a null-terminated
    /// string.
    pub fn new(shell: ShellKind, command: impl Into<Vec<u8>>) -> Result<Self, InvocationError> {
        Ok(Self {
            shell,
            command: CString::new(command)?,
            environment: ShellEnvironment::default(),
        })
    }

    pub fn with_environment(mut self, environment: ShellEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn shell(&self) -> ShellKind {
        self.shell
    }

    pub fn command(&self) -> &CStr {
        &self.command
    }

    pub fn command_lossy(&self) -> Cow<'_, str> {
        self.command.to_string_lossy()
    }

    pub fn environment(&self) -> &ShellEnvironment {
        &self.environment
    }
}

/// Trait implemented by concrete command execution strategies.
///
/// `execute` blocks the calling thread until the shell exits. It has no error
/// path: a shell that cannot be started is reported through the returned
/// status, the same way the platform primitive reports it.
pub trait CommandExecutor: Send + Sync {
    fn execute(&self, invocation: &CommandInvocation) -> RawStatus;
}

/// Executes commands by spawning the shell through [`std::process::Command`].
/// Standard streams are inherited; nothing is captured.
///
/// Unlike `system(3)`, the caller's signal disposition is left alone while
/// the shell runs: SIGINT and SIGQUIT are not ignored and SIGCHLD is not
/// blocked. A terminal Ctrl-C therefore reaches the calling process as well
/// as the shell. Use `SystemCallExecutor` for the exact `system(3)`
/// behaviour.
#[cfg(feature = "std-process")]
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCommandExecutor;

#[cfg(feature = "std-process")]
impl ProcessCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "std-process")]
impl CommandExecutor for ProcessCommandExecutor {
    fn execute(&self, invocation: &CommandInvocation) -> RawStatus {
        use std::process::Command;

        let shell = invocation.shell();
        let mut cmd = Command::new(shell.program());
        cmd.arg(shell.command_flag());
        push_command_line(&mut cmd, invocation);
        invocation.environment().apply(&mut cmd);

        match cmd.status() {
            Ok(status) => RawStatus::from(status),
            Err(err) => {
                let status = spawn_failure_status(&err);
                warn!(
                    shell = shell.program(),
                    command = %invocation.command_lossy(),
                    error = %err,
                    raw = status.raw(),
                    "failed to start shell"
                );
                status
            }
        }
    }
}

#[cfg(all(feature = "std-process", unix))]
fn push_command_line(cmd: &mut std::process::Command, invocation: &CommandInvocation) {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    cmd.arg(OsStr::from_bytes(invocation.command().to_bytes()));
}

// cmd.exe does its own parsing of everything after `/C`, so the line is passed
// through without Rust's argument quoting.
#[cfg(all(feature = "std-process", windows))]
fn push_command_line(cmd: &mut std::process::Command, invocation: &CommandInvocation) {
    use std::os::windows::process::CommandExt;

    cmd.raw_arg(invocation.command_lossy().as_ref());
}

/// Maps a spawn error onto the status `system(3)` reports for the same
/// failure: an exec failure looks like the shell exiting with 127, anything
/// else (fork failure, resource exhaustion) is the `-1` sentinel.
pub(crate) fn spawn_failure_status(err: &io::Error) -> RawStatus {
    match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => RawStatus::from_exit_code(127),
        _ => RawStatus::SPAWN_FAILED,
    }
}

/// Calls the C library's `system(3)` directly.
///
/// This is the literal platform primitive: the shell always sees the caller's
/// full environment and working directory, so any overrides on the
/// invocation are ignored.
#[cfg(unix)]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCallExecutor;

#[cfg(unix)]
impl SystemCallExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl CommandExecutor for SystemCallExecutor {
    fn execute(&self, invocation: &CommandInvocation) -> RawStatus {
        if !invocation.environment().is_ambient() {
            debug!(
                command = %invocation.command_lossy(),
                "system(3) ignores environment and working directory overrides"
            );
        }
        if invocation.shell() != ShellKind::Unix {
            debug!(shell = ?invocation.shell(), "system(3) always uses /bin/sh");
        }

        // SAFETY: the pointer comes from a CString owned by `invocation`, which
        // outlives the call; `system` does not retain it.
        #[allow(unsafe_code)]
        let raw = unsafe { libc::system(invocation.command().as_ptr()) };
        RawStatus::from_raw(raw)
    }
}

/// Executor that records invocations instead of spawning anything.
#[cfg(feature = "dry-run")]
#[derive(Debug, Clone)]
pub struct DryRunCommandExecutor {
    log: std::sync::Arc<parking_lot::Mutex<Vec<CommandInvocation>>>,
    status: RawStatus,
}

#[cfg(feature = "dry-run")]
impl DryRunCommandExecutor {
    pub fn new() -> Self {
        Self::with_status(RawStatus::from_raw(0))
    }

    /// Every recorded invocation reports `status`.
    pub fn with_status(status: RawStatus) -> Self {
        Self {
            log: std::sync::Arc::default(),
            status,
        }
    }

    pub fn logged_invocations(&self) -> Vec<CommandInvocation> {
        self.log.lock().clone()
    }

    pub fn invocation_count(&self) -> usize {
        self.log.lock().len()
    }
}

#[cfg(feature = "dry-run")]
impl Default for DryRunCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "dry-run")]
impl CommandExecutor for DryRunCommandExecutor {
    fn execute(&self, invocation: &CommandInvocation) -> RawStatus {
        debug!(command = %invocation.command_lossy(), "dry-run command");
        self.log.lock().push(invocation.clone());
        self.status
    }
}
