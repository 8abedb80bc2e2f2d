use std::fmt;
use std::sync::Arc;

use crate::context::CallContext;
use crate::error::CallError;
use crate::signature::{FromArgs, IntoValue, Signature};
use crate::value::Value;

/// The unified signature behind every native function. Arguments arrive as a
/// positional slice, already checked against the function's [`Signature`].
pub type NativeImpl = dyn Fn(&mut CallContext, &[Value]) -> Result<Value, CallError> + Send + Sync;

/// Whether a function expects an implicit receiver as its first argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    Unbound,
    Bound,
}

struct Inner {
    name: String,
    owner: String,
    signature: Signature,
    binding: Binding,
    imp: Box<NativeImpl>,
}

/// A named native function. Cloning shares the implementation.
#[derive(Clone)]
pub struct NativeFunc {
    inner: Arc<Inner>,
}

impl NativeFunc {
    pub fn new<F>(
        name: impl Into<String>,
        owner: impl Into<String>,
        signature: Signature,
        binding: Binding,
        imp: F,
    ) -> Self
    where
        F: Fn(&mut CallContext, &[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                owner: owner.into(),
                signature,
                binding,
                imp: Box::new(imp),
            }),
        }
    }

    /// Builds an unbound function whose signature is derived from the Rust
    /// parameter tuple `A`.
    ///
    /// ```
    /// use platform_exec_host::{CallContext, NativeFunc, Value};
    ///
    /// let len = NativeFunc::unbound("len", "Demo", |_ctx, (s,): (String,)| {
    ///     Ok(s.chars().count() as i64)
    /// });
    /// let mut ctx = CallContext::new("main");
    /// assert_eq!(len.signature().to_string(), "S");
    /// assert_eq!(len.call(&mut ctx, &[Value::from("abc")]).unwrap(), Value::Int(3));
    /// ```
    pub fn unbound<A, R, F>(name: impl Into<String>, owner: impl Into<String>, func: F) -> Self
    where
        A: FromArgs + 'static,
        R: IntoValue + 'static,
        F: Fn(&mut CallContext, A) -> Result<R, CallError> + Send + Sync + 'static,
    {
        let name = name.into();
        let func_name = name.clone();
        Self::new(
            name,
            owner,
            A::signature(),
            Binding::Unbound,
            move |ctx, args| {
                let unpacked = A::from_args(&func_name, args)?;
                func(ctx, unpacked).map(IntoValue::into_value)
            },
        )
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Name of the module that installed this function.
    pub fn owner(&self) -> &str {
        &self.inner.owner
    }

    pub fn signature(&self) -> &Signature {
        &self.inner.signature
    }

    pub fn binding(&self) -> Binding {
        self.inner.binding
    }

    pub fn is_unbound(&self) -> bool {
        self.inner.binding == Binding::Unbound
    }

    /// Validates `args` against the signature and invokes the implementation.
    /// The implementation is never reached when validation fails.
    ///
    /// For a [`Binding::Bound`] function the first element of `args` is the
    /// receiver. The signature covers only the arguments after it, but the
    /// implementation receives the full slice, receiver first.
    pub fn call(&self, ctx: &mut CallContext, args: &[Value]) -> Result<Value, CallError> {
        let declared = match self.inner.binding {
            Binding::Unbound => args,
            Binding::Bound => match args.split_first() {
                Some((_receiver, rest)) => rest,
                None => {
                    return Err(CallError::MissingReceiver {
                        func: self.inner.name.clone(),
                    });
                }
            },
        };
        self.inner.signature.check(&self.inner.name, declared)?;

        ctx.record_call();
        tracing::trace!(
            thread = ctx.thread(),
            func = %self.inner.name,
            owner = %self.inner.owner,
            "native call"
        );
        (self.inner.imp)(ctx, args)
    }

    pub fn ptr_eq(&self, other: &NativeFunc) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for NativeFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunc")
            .field("name", &self.inner.name)
            .field("owner", &self.inner.owner)
            .field("signature", &self.inner.signature.to_string())
            .field("binding", &self.inner.binding)
            .finish()
    }
}
