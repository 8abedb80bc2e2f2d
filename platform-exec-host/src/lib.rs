//! Contracts shared between native extensions and the VM that embeds them.
//!
//! An extension is discovered through an identifier, initialised once into a
//! [`Module`], and exposes its operations as named slots holding
//! [`NativeFunc`] values. Argument lists are checked against each function's
//! [`Signature`] before the native implementation runs, so extensions never
//! hand-roll arity or type validation.

pub mod context;
pub mod error;
pub mod extension;
pub mod module;
pub mod native;
pub mod signature;
pub mod value;

pub use context::CallContext;
pub use error::{CallError, LoadError, SignatureError};
pub use extension::{Extension, ExtensionRegistry};
pub use module::Module;
pub use native::{Binding, NativeFunc};
pub use signature::{ArgKind, FromArgs, FromValue, IntoValue, Signature};
pub use value::Value;
