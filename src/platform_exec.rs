//! The `C_Platform_Exec` extension.

use std::sync::Arc;

use platform_exec_host::{
    CallContext, CallError, Extension, ExtensionRegistry, LoadError, Module, NativeFunc, Value,
};
#[cfg(unix)]
use platform_exec_runner::SystemCallExecutor;
use platform_exec_runner::{
    CommandExecutor, CommandInvocation, InvocationError, ProcessCommandExecutor, ShellEnvironment,
    ShellKind,
};
use tracing::debug;

use crate::config::{ExecConfig, ExecutorKind};

/// Name of the module produced by the initializer.
pub const MODULE_NAME: &str = "C_Platform_Exec";

/// The module's only slot.
pub const COMMAND_SLOT: &str = "command";

/// Extension that installs `command(cmd)` on a fresh module.
///
/// Cloning is cheap; every clone shares the same executor.
#[derive(Clone)]
pub struct PlatformExec {
    executor: Arc<dyn CommandExecutor>,
    shell: ShellKind,
    environment: ShellEnvironment,
}

impl PlatformExec {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            executor,
            shell: ShellKind::host(),
            environment: ShellEnvironment::default(),
        }
    }

    pub fn from_config(config: &ExecConfig) -> Self {
        let executor: Arc<dyn CommandExecutor> = match config.shell.executor {
            ExecutorKind::Process => Arc::new(ProcessCommandExecutor::new()),
            #[cfg(unix)]
            ExecutorKind::System => Arc::new(SystemCallExecutor::new()),
            #[cfg(not(unix))]
            ExecutorKind::System => {
                tracing::warn!("the system executor is only available on unix; spawning the shell instead");
                Arc::new(ProcessCommandExecutor::new())
            }
        };

        Self::new(executor)
            .with_shell(config.shell.resolved_kind())
            .with_environment(config.environment.clone())
    }

    pub fn with_shell(mut self, shell: ShellKind) -> Self {
        self.shell = shell;
        self
    }

    pub fn with_environment(mut self, environment: ShellEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn shell(&self) -> ShellKind {
        self.shell
    }

    pub fn environment(&self) -> &ShellEnvironment {
        &self.environment
    }

    /// Registers this extension under `identifier`.
    pub fn register(
        self,
        registry: &mut ExtensionRegistry,
        identifier: impl Into<String>,
    ) -> Result<(), LoadError> {
        registry.register(identifier, self)
    }

    /// Runs `cmd` through the shell and returns the raw platform status.
    ///
    /// Shell and spawn failures are encoded in the status and never raised.
    /// The one error is a `cmd` containing an interior NUL byte, which cannot
    /// become a C string and is rejected as [`CallError::InvalidArgument`]
    /// before anything is spawned.
    fn command(&self, ctx: &CallContext, cmd: String) -> Result<i64, CallError> {
        let invocation = CommandInvocation::new(self.shell, cmd)
            .map_err(|err| invalid_command(&err))?
            .with_environment(self.environment.clone());

        debug!(
            thread = ctx.thread(),
            command = %invocation.command_lossy(),
            "running shell command"
        );
        let status = self.executor.execute(&invocation);
        debug!(
            thread = ctx.thread(),
            raw = status.raw(),
            termination = %status.termination(),
            "shell command finished"
        );

        Ok(i64::from(status.raw()))
    }
}

impl Default for PlatformExec {
    fn default() -> Self {
        Self::new(Arc::new(ProcessCommandExecutor::new()))
    }
}

fn invalid_command(err: &InvocationError) -> CallError {
    CallError::InvalidArgument {
        func: COMMAND_SLOT.to_owned(),
        position: 1,
        reason: err.to_string(),
    }
}

impl Extension for PlatformExec {
    fn name(&self) -> &str {
        MODULE_NAME
    }

    fn init(&self, _ctx: &mut CallContext, identifier: &str) -> anyhow::Result<Module> {
        let mut module = Module::new(identifier, MODULE_NAME);

        let this = self.clone();
        let command = NativeFunc::unbound(COMMAND_SLOT, MODULE_NAME, move |ctx, (cmd,): (String,)| {
            this.command(ctx, cmd)
        });
        module.set_slot(COMMAND_SLOT, Value::Func(command));

        debug!(identifier, shell = ?self.shell, "initialised {MODULE_NAME}");
        Ok(module)
    }
}
