use std::thread;

/// The implicit execution context handed to every native call.
///
/// One context belongs to one thread of embedded-language execution; it is
/// never shared, so native functions may use it without synchronisation.
#[derive(Debug, Clone)]
pub struct CallContext {
    thread: String,
    calls: u64,
}

impl CallContext {
    pub fn new(thread: impl Into<String>) -> Self {
        Self {
            thread: thread.into(),
            calls: 0,
        }
    }

    /// A context labelled after the current OS thread.
    pub fn for_current_thread() -> Self {
        let current = thread::current();
        let label = match current.name() {
            Some(name) => name.to_owned(),
            None => format!("{:?}", current.id()),
        };
        Self::new(label)
    }

    pub fn thread(&self) -> &str {
        &self.thread
    }

    /// Number of native calls that passed argument validation on this context.
    pub fn calls(&self) -> u64 {
        self.calls
    }

    pub(crate) fn record_call(&mut self) {
        self.calls = self.calls.saturating_add(1);
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::for_current_thread()
    }
}
