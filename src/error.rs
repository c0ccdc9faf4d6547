//! Error types for xsdbind
//!
//! Every failure of the binding core surfaces immediately to the caller.
//! Errors represent schema or programmer contract violations, so nothing
//! here is retried. [`Error::kind`] folds the variants into the small
//! taxonomy message-layer callers classify on.

use std::fmt;
use thiserror::Error;

use crate::namespaces::QName;

/// Result type alias using xsdbind Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for binding operations
#[derive(Error, Debug)]
pub enum Error {
    /// A qualified name is not known to the schema
    #[error("lookup error: {0}")]
    Lookup(String),

    /// Constructor arguments do not bind to the declared properties
    #[error("argument error: {0}")]
    Argument(String),

    /// Invalid value for a type
    #[error("value error: {0}")]
    Value(String),

    /// A child element did not match the declared property sequence
    #[error("value error: {0}")]
    UnexpectedElement(#[from] UnexpectedElement),

    /// An abstract operation was invoked on a type that does not provide it
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// A compound value has no property with the requested name
    #[error("attribute error: {0}")]
    Attribute(String),

    /// Type error in schema or data
    #[error("type error: {0}")]
    Type(String),

    /// Namespace error
    #[error("namespace error: {0}")]
    Namespace(String),

    /// Name error (invalid XML name)
    #[error("name error: {0}")]
    Name(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing or writing error
    #[error("XML error: {0}")]
    Xml(String),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unresolved qname absent from the schema
    Lookup,
    /// Binding mismatch while constructing a compound value
    Argument,
    /// Structural or lexical mismatch
    Value,
    /// Abstract method invoked without a concrete override
    NotImplemented,
    /// Missing expected property
    Attribute,
    /// Malformed schema shape
    Type,
    /// Malformed or oversized XML input
    Xml,
    /// I/O failure
    Io,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Lookup(_) => ErrorKind::Lookup,
            Error::Argument(_) => ErrorKind::Argument,
            Error::Value(_) | Error::UnexpectedElement(_) => ErrorKind::Value,
            Error::NotImplemented(_) => ErrorKind::NotImplemented,
            Error::Attribute(_) => ErrorKind::Attribute,
            Error::Type(_) => ErrorKind::Type,
            Error::Namespace(_) | Error::Name(_) | Error::LimitExceeded(_) | Error::Xml(_) => {
                ErrorKind::Xml
            }
            Error::Io(_) => ErrorKind::Io,
        }
    }
}

/// Structural mismatch found while co-walking children and properties
#[derive(Debug, Clone)]
pub struct UnexpectedElement {
    /// Tag of the child that could not be matched
    pub tag: QName,
    /// Name of the complex type being parsed
    pub type_name: Option<String>,
    /// Property the cursor stopped on, if any remained
    pub expected: Option<QName>,
    /// Zero-based position of the child among its siblings
    pub position: Option<usize>,
}

impl UnexpectedElement {
    /// Create a new unexpected element error
    pub fn new(tag: QName) -> Self {
        Self {
            tag,
            type_name: None,
            expected: None,
            position: None,
        }
    }

    /// Set the complex type being parsed
    pub fn with_type_name(mut self, name: impl Into<String>) -> Self {
        self.type_name = Some(name.into());
        self
    }

    /// Set the property the cursor was on
    pub fn with_expected(mut self, expected: QName) -> Self {
        self.expected = Some(expected);
        self
    }

    /// Set the child position
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

impl fmt::Display for UnexpectedElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unexpected element: {}", self.tag)?;

        if let Some(ref name) = self.type_name {
            write!(f, " in {}", name)?;
        }

        if let Some(position) = self.position {
            write!(f, " at child {}", position)?;
        }

        match self.expected {
            Some(ref expected) => write!(f, " (expected {})", expected),
            None => write!(f, " (no properties left)"),
        }
    }
}

impl std::error::Error for UnexpectedElement {}
