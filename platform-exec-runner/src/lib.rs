//! Runs a command line through the platform's default shell and hands back
//! the status exactly as the platform reports it. The crate exposes a
//! trait-based executor so embedders can swap the process strategy (spawn
//! through `std::process`, call `system(3)` directly, or log-only dry runs)
//! while callers keep one synchronous contract.

pub mod environment;
pub mod executor;
pub mod status;

pub use environment::ShellEnvironment;
#[cfg(feature = "dry-run")]
pub use executor::DryRunCommandExecutor;
#[cfg(feature = "std-process")]
pub use executor::ProcessCommandExecutor;
#[cfg(unix)]
pub use executor::SystemCallExecutor;
pub use executor::{CommandExecutor, CommandInvocation, InvocationError, ShellKind};
pub use status::{RawStatus, Termination};
