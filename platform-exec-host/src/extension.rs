//! The module-loading contract between the VM and its native extensions.

use std::sync::Arc;

use hashbrown::HashMap;
use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::context::CallContext;
use crate::error::LoadError;
use crate::module::Module;

/// A native extension: maps a namespace identifier to a populated module.
pub trait Extension: Send + Sync {
    /// Fixed name of the module this extension produces.
    fn name(&self) -> &str;

    /// Builds the module bound under `identifier`. Runs at most once per
    /// identifier and registry.
    fn init(&self, ctx: &mut CallContext, identifier: &str) -> anyhow::Result<Module>;
}

/// Extensions known to a VM instance, and the modules already loaded from
/// them.
///
/// `import` takes `&self` so a registry can be shared between threads of
/// embedded-language execution behind an `Arc`.
#[derive(Default)]
pub struct ExtensionRegistry {
    extensions: IndexMap<String, Arc<dyn Extension>>,
    loaded: Mutex<HashMap<String, Arc<Module>>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        identifier: impl Into<String>,
        extension: impl Extension + 'static,
    ) -> Result<(), LoadError> {
        let identifier = identifier.into();
        if self.extensions.contains_key(&identifier) {
            return Err(LoadError::Duplicate(identifier));
        }
        debug!(identifier = %identifier, module = extension.name(), "registered extension");
        self.extensions.insert(identifier, Arc::new(extension));
        Ok(())
    }

    /// Returns the module bound under `identifier`, running the extension's
    /// initializer on first import.
    pub fn import(&self, ctx: &mut CallContext, identifier: &str) -> Result<Arc<Module>, LoadError> {
        let extension = self
            .extensions
            .get(identifier)
            .ok_or_else(|| LoadError::Unknown(identifier.to_owned()))?;

        let mut loaded = self.loaded.lock();
        if let Some(module) = loaded.get(identifier) {
            return Ok(Arc::clone(module));
        }

        let module = extension
            .init(ctx, identifier)
            .map_err(|source| LoadError::Init {
                identifier: identifier.to_owned(),
                source,
            })?;
        debug!(
            identifier,
            module = module.name(),
            slots = module.slot_count(),
            thread = ctx.thread(),
            "initialised extension module"
        );

        let module = Arc::new(module);
        loaded.insert(identifier.to_owned(), Arc::clone(&module));
        Ok(module)
    }

    pub fn is_loaded(&self, identifier: &str) -> bool {
        self.loaded.lock().contains_key(identifier)
    }

    /// Registered identifiers in registration order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.extensions.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::bail;

    use super::*;

    struct Counting {
        inits: Arc<AtomicUsize>,
    }

    impl Extension for Counting {
        fn name(&self) -> &str {
            "Counting"
        }

        fn init(&self, _ctx: &mut CallContext, identifier: &str) -> anyhow::Result<Module> {
            self.inits.fetch_add(1, Ordering::SeqCst);
            Ok(Module::new(identifier, self.name()))
        }
    }

    struct Broken;

    impl Extension for Broken {
        fn name(&self) -> &str {
            "Broken"
        }

        fn init(&self, _ctx: &mut CallContext, _identifier: &str) -> anyhow::Result<Module> {
            bail!("out of slots")
        }
    }

    #[test]
    fn initializer_runs_once_per_identifier() {
        let inits = Arc::new(AtomicUsize::new(0));
        let mut registry = ExtensionRegistry::new();
        registry
            .register("lib/counting", Counting { inits: Arc::clone(&inits) })
            .unwrap();
        let mut ctx = CallContext::new("test");

        assert!(!registry.is_loaded("lib/counting"));
        let first = registry.import(&mut ctx, "lib/counting").unwrap();
        let second = registry.import(&mut ctx, "lib/counting").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(inits.load(Ordering::SeqCst), 1);
        assert!(registry.is_loaded("lib/counting"));
        assert_eq!(first.identifier(), "lib/counting");
    }

    #[test]
    fn duplicate_identifiers_are_rejected() {
        let mut registry = ExtensionRegistry::new();
        registry.register("lib/x", Broken).unwrap();
        let err = registry.register("lib/x", Broken).unwrap_err();
        assert!(matches!(err, LoadError::Duplicate(id) if id == "lib/x"));
    }

    #[test]
    fn unknown_identifiers_are_rejected() {
        let registry = ExtensionRegistry::new();
        let mut ctx = CallContext::new("test");
        let err = registry.import(&mut ctx, "lib/missing").unwrap_err();
        assert!(matches!(err, LoadError::Unknown(id) if id == "lib/missing"));
    }

    #[test]
    fn failed_initializers_are_not_cached() {
        let mut registry = ExtensionRegistry::new();
        registry.register("lib/broken", Broken).unwrap();
        let mut ctx = CallContext::new("test");

        let err = registry.import(&mut ctx, "lib/broken").unwrap_err();
        assert!(matches!(err, LoadError::Init { .. }));
        assert!(!registry.is_loaded("lib/broken"));
    }

    #[test]
    fn identifiers_keep_registration_order() {
        let mut registry = ExtensionRegistry::new();
        registry.register("b", Broken).unwrap();
        registry.register("a", Broken).unwrap();
        assert_eq!(registry.identifiers().collect::<Vec<_>>(), vec!["b", "a"]);
    }
}
