//! # platform-exec - `C_Platform_Exec` extension module
//!
//! A native extension for embedding VMs that exposes one operation,
//! `command(cmd)`. It hands `cmd` to the platform's default shell, blocks
//! until the shell exits and returns the status as an integer, exactly as the
//! platform reports it (the `wait(2)` encoding on unix).
//!
//! ## Layout
//!
//! - [`platform_exec_host`]: the extension registration contracts (values,
//!   typed native functions, modules, the registry the VM imports through).
//! - [`platform_exec_runner`]: shell execution strategies and raw status
//!   decoding.
//! - this crate: the `C_Platform_Exec` extension itself, plus configuration
//!   and logging setup for embedders.
//!
//! ## Quickstart
//!
//! ```no_run
//! use platform_exec::{ExecConfig, PlatformExec};
//! use platform_exec_host::{CallContext, ExtensionRegistry, Value};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = ExecConfig::from_env()?;
//! platform_exec::logging::init_tracing(&config.logging.filter);
//!
//! let mut registry = ExtensionRegistry::new();
//! PlatformExec::from_config(&config).register(&mut registry, "lib/exec")?;
//!
//! let mut ctx = CallContext::for_current_thread();
//! let module = registry.import(&mut ctx, "lib/exec")?;
//! let status = module.call(&mut ctx, "command", &[Value::from("exit 7")])?;
//! assert_eq!(status, Value::Int(7 << 8));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod logging;
pub mod platform_exec;

pub use config::{CONFIG_ENV_VAR, ConfigError, ExecConfig, ExecutorKind, LoggingConfig, ShellConfig};
pub use platform_exec::{COMMAND_SLOT, MODULE_NAME, PlatformExec};
