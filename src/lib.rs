//! # xsdbind
//!
//! XSD-derived type system and bidirectional object/XML binding.
//!
//! Schema types are built once, resolved once against a [`Schema`], and
//! then used to marshal [`CompoundValue`]s to and from element trees.
//!
//! ## Features
//!
//! - Deferred type references, element references and groups flattened
//!   in place on resolution
//! - Compound values constructed from positional and keyword arguments
//! - Ordered rendering of values into element trees
//! - Forward-only parsing of element trees into values
//! - Built-in codecs for the common XSD simple types
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use xsdbind::types::builtins::{IntegerType, StringType};
//! use xsdbind::{Arguments, ComplexType, Element, ElementProperty, QName, Type, Value};
//!
//! let item = Arc::new(ComplexType::new(Some(QName::local("Item"))).with_elements(vec![
//!     ElementProperty::new(QName::local("name"), Type::simple(StringType::string())).into(),
//!     ElementProperty::new(QName::local("count"), Type::simple(IntegerType::int())).into(),
//! ]));
//!
//! let value = item.construct(Arguments::new().arg("widget").arg(3)).unwrap();
//!
//! let mut node = Element::new(QName::local("item"));
//! item.render(&mut node, &Value::Compound(value.clone())).unwrap();
//!
//! let parsed = item.parse(&node, &Default::default()).unwrap();
//! assert_eq!(parsed, value);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arguments;
pub mod documents;
pub mod error;
pub mod limits;
pub mod names;
pub mod namespaces;
pub mod settings;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use arguments::{bind_arguments, Arguments};
pub use documents::{Document, Element};
pub use error::{Error, ErrorKind, Result, UnexpectedElement};
pub use limits::Limits;
pub use namespaces::{NamespaceContext, QName};
pub use settings::{ParseConfig, SequenceMatching};
pub use types::{
    AttributeProperty, ComplexType, ElementProperty, GroupElement, Occurs, Particle,
    PropertyDescriptor, RefElement, Schema, SimpleType, Type, TypeRegistry,
};
pub use values::{CompoundValue, Value, ValueShape};

/// Version of the xsdbind library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XSD namespace
pub const XSD_NAMESPACE: &str = types::builtins::XSD_NAMESPACE;

/// XML namespace
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// XMLNS namespace
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";
