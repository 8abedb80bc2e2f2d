use indexmap::IndexMap;

use crate::context::CallContext;
use crate::error::CallError;
use crate::value::Value;

/// A loaded extension module.
///
/// Slots are installed by the extension's initializer while it owns the
/// module. Once the registry wraps the module in an `Arc` it is shared
/// read-only and its slot table no longer changes.
#[derive(Debug)]
pub struct Module {
    identifier: String,
    name: String,
    imports: Vec<String>,
    slots: IndexMap<String, Value>,
}

impl Module {
    /// Creates an empty module named `name` inside the namespace `identifier`.
    pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            imports: Vec::new(),
            slots: IndexMap::new(),
        }
    }

    /// Declares the modules this one depends on.
    pub fn with_imports(mut self, imports: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.imports = imports.into_iter().map(Into::into).collect();
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    /// Installs `value` under `name`, returning the value it replaced.
    pub fn set_slot(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.slots.insert(name.into(), value)
    }

    pub fn get_slot(&self, name: &str) -> Option<&Value> {
        self.slots.get(name)
    }

    /// Slot names in installation order.
    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Calls the function stored in slot `name` with a positional argument
    /// list.
    pub fn call(
        &self,
        ctx: &mut CallContext,
        name: &str,
        args: &[Value],
    ) -> Result<Value, CallError> {
        let slot = self.slots.get(name).ok_or_else(|| CallError::SlotNotFound {
            module: self.name.clone(),
            slot: name.to_owned(),
        })?;
        let func = slot.as_func().ok_or_else(|| CallError::NotCallable {
            module: self.name.clone(),
            slot: name.to_owned(),
            got: slot.type_name(),
        })?;
        func.call(ctx, args)
    }
}
