//! Declared argument contracts for native functions.
//!
//! A [`Signature`] is written as a compact code string, one character per
//! positional argument:
//!
//! | code | accepts |
//! |------|---------|
//! | `S`  | a string |
//! | `I`  | an integer |
//! | `O`  | any value |
//!
//! Typed functions never spell the code by hand: [`FromArgs`] derives it from
//! the Rust parameter types, so the declared contract and the unpacking logic
//! cannot drift apart.

use std::fmt;
use std::str::FromStr;

use crate::error::{CallError, SignatureError};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    Str,
    Int,
    Any,
}

impl ArgKind {
    pub const fn code(self) -> char {
        match self {
            ArgKind::Str => 'S',
            ArgKind::Int => 'I',
            ArgKind::Any => 'O',
        }
    }

    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            'S' => Some(ArgKind::Str),
            'I' => Some(ArgKind::Int),
            'O' => Some(ArgKind::Any),
            _ => None,
        }
    }

    pub const fn type_name(self) -> &'static str {
        match self {
            ArgKind::Str => "String",
            ArgKind::Int => "Int",
            ArgKind::Any => "Object",
        }
    }

    pub fn accepts(self, value: &Value) -> bool {
        match self {
            ArgKind::Str => matches!(value, Value::Str(_)),
            ArgKind::Int => matches!(value, Value::Int(_)),
            ArgKind::Any => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Signature {
    kinds: Vec<ArgKind>,
}

impl Signature {
    pub fn new(kinds: impl IntoIterator<Item = ArgKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
        }
    }

    pub fn parse(code: &str) -> Result<Self, SignatureError> {
        code.chars()
            .map(|c| {
                ArgKind::from_code(c).ok_or_else(|| SignatureError::UnknownCode {
                    code: c,
                    signature: code.to_owned(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|kinds| Self { kinds })
    }

    pub fn arity(&self) -> usize {
        self.kinds.len()
    }

    pub fn kinds(&self) -> &[ArgKind] {
        &self.kinds
    }

    /// Checks arity first, then each position in order. The first mismatch
    /// is reported.
    pub fn check(&self, func: &str, args: &[Value]) -> Result<(), CallError> {
        if args.len() != self.kinds.len() {
            return Err(CallError::Arity {
                func: func.to_owned(),
                expected: self.kinds.len(),
                got: args.len(),
            });
        }

        for (index, (kind, value)) in self.kinds.iter().zip(args).enumerate() {
            if !kind.accepts(value) {
                return Err(CallError::Type {
                    func: func.to_owned(),
                    position: index + 1,
                    expected: kind.type_name(),
                    got: value.type_name(),
                });
            }
        }

        Ok(())
    }
}

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for kind in &self.kinds {
            write!(f, "{}", kind.code())?;
        }
        Ok(())
    }
}

/// A Rust type that can be extracted from a single argument.
pub trait FromValue: Sized {
    const KIND: ArgKind;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for String {
    const KIND: ArgKind = ArgKind::Str;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl FromValue for i64 {
    const KIND: ArgKind = ArgKind::Int;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_int()
    }
}

impl FromValue for Value {
    const KIND: ArgKind = ArgKind::Any;

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

/// A positional argument list that can be unpacked from `&[Value]`.
pub trait FromArgs: Sized {
    fn signature() -> Signature;

    /// Checks `args` against [`FromArgs::signature`] and unpacks them.
    ///
    /// This is callable on its own, outside [`NativeFunc::call`], so it
    /// validates again even though `call` has already checked the same
    /// signature.
    ///
    /// [`NativeFunc::call`]: crate::NativeFunc::call
    fn from_args(func: &str, args: &[Value]) -> Result<Self, CallError>;
}

fn extract<T: FromValue>(func: &str, args: &[Value], index: usize) -> Result<T, CallError> {
    let value = args.get(index).ok_or_else(|| CallError::Arity {
        func: func.to_owned(),
        expected: index + 1,
        got: args.len(),
    })?;
    T::from_value(value).ok_or_else(|| CallError::Type {
        func: func.to_owned(),
        position: index + 1,
        expected: T::KIND.type_name(),
        got: value.type_name(),
    })
}

impl FromArgs for () {
    fn signature() -> Signature {
        Signature::default()
    }

    fn from_args(func: &str, args: &[Value]) -> Result<Self, CallError> {
        Self::signature().check(func, args)
    }
}

impl<A: FromValue> FromArgs for (A,) {
    fn signature() -> Signature {
        Signature::new([A::KIND])
    }

    fn from_args(func: &str, args: &[Value]) -> Result<Self, CallError> {
        Self::signature().check(func, args)?;
        Ok((extract(func, args, 0)?,))
    }
}

impl<A: FromValue, B: FromValue> FromArgs for (A, B) {
    fn signature() -> Signature {
        Signature::new([A::KIND, B::KIND])
    }

    fn from_args(func: &str, args: &[Value]) -> Result<Self, CallError> {
        Self::signature().check(func, args)?;
        Ok((extract(func, args, 0)?, extract(func, args, 1)?))
    }
}

/// A Rust type that a native function can return to the VM.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl IntoValue for i32 {
    fn into_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Str(self)
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Null
    }
}
