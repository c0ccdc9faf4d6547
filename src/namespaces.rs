//! XML namespace handling
//!
//! This module provides qualified names (QNames) as used for structural
//! matching, and the prefix scopes needed to resolve prefixed tags.

use crate::error::{Error, Result};
use crate::names::validate_ncname;
use std::collections::HashMap;
use std::fmt;

/// XML Namespace URI
pub type NamespaceUri = String;

/// Namespace prefix
pub type Prefix = String;

/// Qualified name (QName) - combination of namespace and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<NamespaceUri>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(|s| s.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }

    /// Parse Clark notation (`{namespace}local` or bare `local`)
    pub fn from_clark(text: &str) -> Result<Self> {
        let qname = match text.strip_prefix('{') {
            Some(rest) => {
                let (ns, local) = rest.split_once('}').ok_or_else(|| {
                    Error::Name(format!("Unterminated namespace in '{}'", text))
                })?;
                if ns.is_empty() {
                    QName::local(local)
                } else {
                    QName::namespaced(ns, local)
                }
            }
            None => QName::local(text),
        };
        validate_ncname(&qname.local_name)?;
        Ok(qname)
    }

    /// Get the namespace URI, if any
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

/// Namespace context for resolving prefixes
#[derive(Debug, Clone, Default)]
pub struct NamespaceContext {
    /// Mapping from prefix to namespace URI
    prefixes: HashMap<Prefix, NamespaceUri>,
    /// Default namespace (no prefix)
    default_namespace: Option<NamespaceUri>,
}

impl NamespaceContext {
    /// Create a new empty namespace context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Set the default namespace
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        let namespace = namespace.into();
        // xmlns="" undeclares the default namespace
        self.default_namespace = if namespace.is_empty() {
            None
        } else {
            Some(namespace)
        };
    }

    /// Get the namespace for a prefix
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(crate::XML_NAMESPACE);
        }
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Get the default namespace
    pub fn get_default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Find a prefix bound to a namespace
    pub fn prefix_for(&self, namespace: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .filter(|(_, ns)| ns.as_str() == namespace)
            .map(|(prefix, _)| prefix.as_str())
            .min()
    }

    /// Check if the context declares nothing
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty() && self.default_namespace.is_none()
    }

    /// Resolve a prefixed element name to a QName
    pub fn resolve(&self, prefixed_name: &str) -> Result<QName> {
        if let Some((prefix, local)) = prefixed_name.split_once(':') {
            let namespace = self
                .get_namespace(prefix)
                .ok_or_else(|| Error::Namespace(format!("Unknown prefix: {}", prefix)))?;
            Ok(QName::namespaced(namespace, local))
        } else {
            Ok(QName::new(self.default_namespace.clone(), prefixed_name))
        }
    }

    /// Resolve a prefixed attribute name to a QName
    ///
    /// Unprefixed attributes are never in the default namespace.
    pub fn resolve_attribute(&self, prefixed_name: &str) -> Result<QName> {
        if prefixed_name.contains(':') {
            self.resolve(prefixed_name)
        } else {
            Ok(QName::local(prefixed_name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qname_creation() {
        let qname = QName::namespaced("http://example.com", "element");
        assert_eq!(qname.namespace, Some("http://example.com".to_string()));
        assert_eq!(qname.local_name, "element");
    }

    #[test]
    fn test_qname_display() {
        let qname = QName::namespaced("http://example.com", "element");
        assert_eq!(qname.to_string(), "{http://example.com}element");

        let qname_local = QName::local("element");
        assert_eq!(qname_local.to_string(), "element");
    }

    #[test]
    fn test_qname_from_clark() {
        let qname = QName::from_clark("{urn:a}item").unwrap();
        assert_eq!(qname, QName::namespaced("urn:a", "item"));
        assert_eq!(QName::from_clark("item").unwrap(), QName::local("item"));
        assert_eq!(QName::from_clark("{}item").unwrap(), QName::local("item"));

        assert!(QName::from_clark("{urn:a item").is_err());
        assert!(QName::from_clark("{urn:a}1item").is_err());
    }

    #[test]
    fn test_resolve_prefixed_name() {
        let mut ctx = NamespaceContext::new();
        ctx.add_prefix("tns", "urn:test");
        ctx.set_default_namespace("urn:default");

        assert_eq!(ctx.resolve("tns:item").unwrap(), QName::namespaced("urn:test", "item"));
        assert_eq!(ctx.resolve("item").unwrap(), QName::namespaced("urn:default", "item"));
        assert_eq!(ctx.resolve_attribute("id").unwrap(), QName::local("id"));
        assert!(ctx.resolve("bad:item").is_err());
    }

    #[test]
    fn test_default_namespace_undeclared() {
        let mut ctx = NamespaceContext::new();
        ctx.add_prefix("a", "urn:a");
        ctx.set_default_namespace("urn:outer");
        ctx.set_default_namespace("");

        assert_eq!(ctx.get_default_namespace(), None);
        assert_eq!(ctx.resolve("item").unwrap(), QName::local("item"));
        assert_eq!(ctx.prefix_for("urn:a"), Some("a"));
    }

    #[test]
    fn test_xml_prefix_is_predeclared() {
        let ctx = NamespaceContext::new();
        assert_eq!(ctx.get_namespace("xml"), Some(crate::XML_NAMESPACE));
    }
}
