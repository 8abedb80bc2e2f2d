use thiserror::Error;

/// Failure raised while calling a native function through the slot protocol.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("{func}() takes {expected} argument(s) but {got} were given")]
    Arity {
        func: String,
        expected: usize,
        got: usize,
    },

    #[error("{func}() argument {position} must be {expected}, not {got}")]
    Type {
        func: String,
        /// 1-based argument position.
        position: usize,
        expected: &'static str,
        got: &'static str,
    },

    #[error("{func}() argument {position} is invalid: {reason}")]
    InvalidArgument {
        func: String,
        position: usize,
        reason: String,
    },

    #[error("{func}() is bound and must be called with a receiver")]
    MissingReceiver { func: String },

    #[error("module `{module}` has no slot `{slot}`")]
    SlotNotFound { module: String, slot: String },

    #[error("slot `{slot}` of module `{module}` holds {got}, which is not callable")]
    NotCallable {
        module: String,
        slot: String,
        got: &'static str,
    },

    #[error("{func}() failed")]
    Native {
        func: String,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("unknown argument code `{code}` in signature `{signature}`")]
    UnknownCode { code: char, signature: String },
}

/// Failure raised by the module-loading contract.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no extension is registered under `{0}`")]
    Unknown(String),

    #[error("an extension is already registered under `{0}`")]
    Duplicate(String),

    #[error("initializer for `{identifier}` failed")]
    Init {
        identifier: String,
        #[source]
        source: anyhow::Error,
    },
}
