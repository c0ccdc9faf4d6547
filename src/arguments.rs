//! Constructor argument binding
//!
//! Binds positional and keyword arguments against an ordered list of
//! property names, the way compound values are constructed.

use crate::error::{Error, Result};
use crate::values::Value;
use indexmap::IndexMap;

/// Positional and keyword arguments for a type constructor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    /// Positional arguments, bound left-to-right
    pub positional: Vec<Value>,
    /// Keyword arguments, bound by property name
    pub keyword: IndexMap<String, Value>,
}

impl Arguments {
    /// Create an empty argument list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Add a keyword argument, replacing an earlier one with the same name
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    /// Check if there are no arguments at all
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(positional: Vec<Value>) -> Self {
        Self {
            positional,
            keyword: IndexMap::new(),
        }
    }
}

/// Bind arguments to property names
///
/// Returns only the names that were actually targeted, in declaration
/// order for positional arguments followed by keyword order.
pub fn bind_arguments(names: &[&str], args: Arguments) -> Result<IndexMap<String, Value>> {
    if args.positional.len() > names.len() {
        return Err(Error::Argument(format!(
            "takes {} positional arguments but {} were given",
            names.len(),
            args.positional.len()
        )));
    }

    let mut bound = IndexMap::with_capacity(args.positional.len() + args.keyword.len());
    for (name, value) in names.iter().zip(args.positional) {
        bound.insert(name.to_string(), value);
    }

    for (name, value) in args.keyword {
        if !names.contains(&name.as_str()) {
            return Err(Error::Argument(format!(
                "got an unexpected keyword argument '{}'",
                name
            )));
        }
        if bound.contains_key(&name) {
            return Err(Error::Argument(format!(
                "got multiple values for argument '{}'",
                name
            )));
        }
        bound.insert(name, value);
    }

    Ok(bound)
}
