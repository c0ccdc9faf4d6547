//! XSD-derived types
//!
//! A [`Type`] is one of three variants:
//! - `Unresolved`: a deferred reference by qualified name, replaced by
//!   the schema's type on [`Type::resolve`]
//! - `Simple`: a scalar codec between XML text and a native [`Value`]
//! - `Complex`: an ordered list of element properties followed by
//!   attribute properties, instantiated as [`CompoundValue`]s
//!
//! Types are created once when a schema is loaded, resolved once, and
//! then shared read-only by every render and parse call.

pub mod builtins;
pub mod complex_types;
pub mod elements;
pub mod schemas;
pub mod simple_types;

use std::fmt;
use std::sync::Arc;

use crate::arguments::Arguments;
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::namespaces::QName;
use crate::settings::ParseConfig;
use crate::values::Value;

pub use complex_types::ComplexType;
pub use elements::{
    AttributeProperty, ElementProperty, GroupElement, Occurs, Particle, PropertyDescriptor,
    RefElement,
};
pub use schemas::{Schema, TypeRegistry};
pub use simple_types::SimpleType;

/// Longest chain of name-to-name aliases followed by one resolution
const MAX_ALIAS_CHAIN: usize = 64;

/// A schema type
#[derive(Debug, Clone)]
pub enum Type {
    /// Reference to a type by name, not yet looked up
    Unresolved(QName),
    /// Scalar codec
    Simple(Arc<dyn SimpleType>),
    /// Composite type with element and attribute properties
    Complex(Arc<ComplexType>),
}

impl Type {
    /// Wrap a simple codec
    pub fn simple(codec: impl SimpleType + 'static) -> Self {
        Type::Simple(Arc::new(codec))
    }

    /// Wrap a complex type
    pub fn complex(complex: ComplexType) -> Self {
        Type::Complex(Arc::new(complex))
    }

    /// Create a deferred reference
    pub fn unresolved(qname: QName) -> Self {
        Type::Unresolved(qname)
    }

    /// Display name of the type
    pub fn name(&self) -> String {
        match self {
            Type::Unresolved(qname) => qname.to_string(),
            Type::Simple(simple) => simple.name().to_string(),
            Type::Complex(complex) => complex.name(),
        }
    }

    /// Qualified name of the type, if it has one
    pub fn qname(&self) -> Option<QName> {
        match self {
            Type::Unresolved(qname) => Some(qname.clone()),
            Type::Simple(simple) => Some(simple.qname()),
            Type::Complex(complex) => complex.qname().cloned(),
        }
    }

    /// Check if this is a deferred reference
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Type::Unresolved(_))
    }

    /// Get as simple codec if applicable
    pub fn as_simple(&self) -> Option<&Arc<dyn SimpleType>> {
        match self {
            Type::Simple(simple) => Some(simple),
            _ => None,
        }
    }

    /// Get as complex type if applicable
    pub fn as_complex(&self) -> Option<&Arc<ComplexType>> {
        match self {
            Type::Complex(complex) => Some(complex),
            _ => None,
        }
    }

    /// Check whether a native value can be rendered by this type
    pub fn accept(&self, value: &Value) -> Result<bool> {
        match self {
            Type::Unresolved(qname) => Err(unresolved(qname, "accept")),
            Type::Simple(simple) => Ok(simple.accept(value)),
            Type::Complex(complex) => Ok(complex.accept(value)),
        }
    }

    /// Resolve deferred references against a schema
    ///
    /// Unresolved types are looked up by name, following aliases until a
    /// concrete type is found. Complex types flatten their property lists
    /// in place and return themselves. Simple types are returned unchanged.
    /// Calling this again on the result is a no-op.
    pub fn resolve(&self, schema: &dyn Schema) -> Result<Type> {
        match self {
            Type::Unresolved(qname) => {
                let mut resolved = schema.get_type(qname)?;
                for _ in 0..MAX_ALIAS_CHAIN {
                    let Type::Unresolved(next) = &resolved else {
                        return Ok(resolved);
                    };
                    resolved = schema.get_type(next)?;
                }
                Err(Error::Type(format!(
                    "alias chain from {} does not reach a concrete type",
                    qname
                )))
            }
            Type::Simple(_) => Ok(self.clone()),
            Type::Complex(complex) => {
                complex.resolve(schema)?;
                Ok(self.clone())
            }
        }
    }

    /// Render a value into `node`
    ///
    /// Simple types set the node's text. Complex types append one child
    /// (or attribute) per declared property.
    pub fn render(&self, node: &mut Element, value: &Value) -> Result<()> {
        match self {
            Type::Unresolved(qname) => Err(unresolved(qname, "render")),
            Type::Simple(simple) => simple.render(node, value),
            Type::Complex(complex) => complex.render(node, value),
        }
    }

    /// Parse a value from `node` with the default configuration
    pub fn parse(&self, node: &Element) -> Result<Value> {
        self.parse_with(node, &ParseConfig::default())
    }

    /// Parse a value from `node`
    pub fn parse_with(&self, node: &Element, config: &ParseConfig) -> Result<Value> {
        match self {
            Type::Unresolved(qname) => Err(unresolved(qname, "parse")),
            Type::Simple(simple) => simple.parse(node),
            Type::Complex(complex) => complex.parse(node, config).map(Value::Compound),
        }
    }

    /// Diagnostic signature, `"<type> <name>"` per property
    ///
    /// Empty for simple and unresolved types.
    pub fn signature(&self) -> String {
        match self {
            Type::Complex(complex) => complex.signature(),
            _ => String::new(),
        }
    }

    /// Invoke the type as a constructor
    pub fn call(&self, args: Arguments) -> Result<Value> {
        match self {
            Type::Unresolved(qname) => Err(unresolved(qname, "call")),
            Type::Simple(simple) => simple.call(args),
            Type::Complex(complex) => complex.construct(args).map(Value::Compound),
        }
    }

    /// Zero-argument constructor result
    pub fn default_value(&self) -> Result<Value> {
        self.call(Arguments::new())
    }
}

fn unresolved(qname: &QName, operation: &str) -> Error {
    Error::NotImplemented(format!(
        "{} on unresolved type {}; resolve it against a schema first",
        operation, qname
    ))
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Complex(complex) => write!(f, "{}({})", complex.name(), complex.signature()),
            other => write!(f, "{}", other.name()),
        }
    }
}
