//! Callables: signatures, argument binding and bound methods
//!
//! Every method body receives the instance it was resolved from plus its
//! arguments already bound to parameter names. Binding follows the usual
//! positional / keyword / default rules, so a forwarded trait method accepts
//! exactly the calls the trait's own definition accepts.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::runtime_value::Value;
use crate::traits::errors::CallError;
use crate::traits::instance::Instance;

/// Method body: `(receiver, bound arguments) -> value`
pub type MethodBody = dyn Fn(&Arc<Instance>, &BoundArgs) -> Result<Value, CallError> + Send + Sync;

/// A declared parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Parameter name
    pub name: String,
    /// Default value used when the caller omits the parameter
    pub default: Option<Value>,
}

/// Ordered parameter list (the receiver is implicit)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    /// Create an empty signature
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required parameter
    pub fn param(
        mut self,
        name: &str,
    ) -> Self {
        self.params.push(Param {
            name: name.to_string(),
            default: None,
        });
        self
    }

    /// Add a parameter with a default value
    pub fn param_with_default(
        mut self,
        name: &str,
        default: impl Into<Value>,
    ) -> Self {
        self.params.push(Param {
            name: name.to_string(),
            default: Some(default.into()),
        });
        self
    }

    /// Declared parameters in order
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Bind call arguments to parameter names
    ///
    /// Positional arguments fill parameters left to right, keywords fill by
    /// name, defaults fill whatever is still empty.
    pub fn bind(
        &self,
        function: &str,
        args: Args,
    ) -> Result<BoundArgs, CallError> {
        let Args {
            positional,
            keyword,
        } = args;

        if positional.len() > self.params.len() {
            return Err(CallError::TooManyPositional {
                function: function.to_string(),
                expected: self.params.len(),
                given: positional.len(),
            });
        }

        let mut slots: Vec<Option<Value>> = vec![None; self.params.len()];
        for (slot, value) in slots.iter_mut().zip(positional) {
            *slot = Some(value);
        }

        for (name, value) in keyword {
            let index = self
                .params
                .iter()
                .position(|p| p.name == name)
                .ok_or_else(|| CallError::UnexpectedKeyword {
                    function: function.to_string(),
                    param: name.clone(),
                })?;
            if slots[index].is_some() {
                return Err(CallError::DuplicateArgument {
                    function: function.to_string(),
                    param: name,
                });
            }
            slots[index] = Some(value);
        }

        let mut values = IndexMap::with_capacity(self.params.len());
        for (param, slot) in self.params.iter().zip(slots) {
            let value = slot.or_else(|| param.default.clone()).ok_or_else(|| {
                CallError::MissingArgument {
                    function: function.to_string(),
                    param: param.name.clone(),
                }
            })?;
            values.insert(param.name.clone(), value);
        }

        Ok(BoundArgs {
            function: function.to_string(),
            values,
        })
    }
}

/// Call-site arguments
#[derive(Debug, Clone, Default)]
pub struct Args {
    positional: Vec<Value>,
    keyword: IndexMap<String, Value>,
}

impl Args {
    /// No arguments
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument
    pub fn arg(
        mut self,
        value: impl Into<Value>,
    ) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword argument
    pub fn kwarg(
        mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Self {
        self.keyword.insert(name.to_string(), value.into());
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn keyword(&self) -> &IndexMap<String, Value> {
        &self.keyword
    }
}

/// Arguments after binding, addressed by parameter name
#[derive(Debug, Clone)]
pub struct BoundArgs {
    function: String,
    values: IndexMap<String, Value>,
}

impl BoundArgs {
    /// Get a bound value
    pub fn get(
        &self,
        name: &str,
    ) -> Option<&Value> {
        self.values.get(name)
    }

    /// Get a bound value, failing if the parameter was never declared
    pub fn value(
        &self,
        name: &str,
    ) -> Result<&Value, CallError> {
        self.values
            .get(name)
            .ok_or_else(|| CallError::MissingArgument {
                function: self.function.clone(),
                param: name.to_string(),
            })
    }

    /// Get a bound integer
    pub fn int(
        &self,
        name: &str,
    ) -> Result<i64, CallError> {
        let value = self.value(name)?;
        value.to_int().ok_or_else(|| CallError::TypeMismatch {
            param: name.to_string(),
            expected: "int",
            found: value.type_name(),
        })
    }

    /// Get a bound boolean
    pub fn bool(
        &self,
        name: &str,
    ) -> Result<bool, CallError> {
        let value = self.value(name)?;
        value.to_bool().ok_or_else(|| CallError::TypeMismatch {
            param: name.to_string(),
            expected: "bool",
            found: value.type_name(),
        })
    }

    /// Get a bound string
    pub fn str(
        &self,
        name: &str,
    ) -> Result<&str, CallError> {
        let value = self.value(name)?;
        value.as_str().ok_or_else(|| CallError::TypeMismatch {
            param: name.to_string(),
            expected: "str",
            found: value.type_name(),
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A named callable with a signature
#[derive(Clone)]
pub struct Function {
    name: Arc<str>,
    signature: Arc<Signature>,
    body: Arc<MethodBody>,
}

impl Function {
    /// Create a function from a body closure
    pub fn new<F>(
        name: &str,
        signature: Signature,
        body: F,
    ) -> Self
    where
        F: Fn(&Arc<Instance>, &BoundArgs) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            signature: Arc::new(signature),
            body: Arc::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Invoke with an explicit receiver
    pub fn call(
        &self,
        receiver: &Arc<Instance>,
        args: Args,
    ) -> Result<Value, CallError> {
        let bound = self.signature.bind(&self.name, args)?;
        (self.body)(receiver, &bound)
    }

    /// Bind to a receiver, producing a fresh bound method
    pub fn bind_to(
        &self,
        receiver: Arc<Instance>,
    ) -> BoundMethod {
        BoundMethod {
            receiver,
            function: self.clone(),
        }
    }

    /// Whether two handles share the same body
    pub fn same_body(
        &self,
        other: &Function,
    ) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for Function {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// A function bound to the instance it was resolved from
#[derive(Clone)]
pub struct BoundMethod {
    receiver: Arc<Instance>,
    function: Function,
}

impl BoundMethod {
    pub fn receiver(&self) -> &Arc<Instance> {
        &self.receiver
    }

    pub fn function(&self) -> &Function {
        &self.function
    }

    /// Call with the receiver as the implicit first argument
    pub fn call(
        &self,
        args: Args,
    ) -> Result<Value, CallError> {
        self.function.call(&self.receiver, args)
    }
}

impl fmt::Debug for BoundMethod {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("BoundMethod")
            .field("function", &self.function.name())
            .field("receiver", &self.receiver.type_name())
            .finish()
    }
}
