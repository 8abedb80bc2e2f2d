use std::fmt;
use std::sync::Arc;

use crate::module::Module;
use crate::native::NativeFunc;

/// A value exchanged between native extensions and the embedding VM.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Int(i64),
    Str(String),
    Func(NativeFunc),
    Module(Arc<Module>),
}

impl Value {
    /// Name of the value's type capability, as reported in argument errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Int(_) => "Int",
            Value::Str(_) => "String",
            Value::Func(_) => "Func",
            Value::Module(_) => "Module",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_func(&self) -> Option<&NativeFunc> {
        match self {
            Value::Func(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_module(&self) -> Option<&Arc<Module>> {
        match self {
            Value::Module(m) => Some(m),
            _ => None,
        }
    }
}

// Functions and modules compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Func(a), Value::Func(b)) => a.ptr_eq(b),
            (Value::Module(a), Value::Module(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Str(s) => f.write_str(s),
            Value::Func(func) => write!(f, "<func {}.{}>", func.owner(), func.name()),
            Value::Module(module) => write!(f, "<module {}>", module.name()),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

impl From<Arc<Module>> for Value {
    fn from(value: Arc<Module>) -> Self {
        Value::Module(value)
    }
}

impl From<NativeFunc> for Value {
    fn from(value: NativeFunc) -> Self {
        Value::Func(value)
    }
}
