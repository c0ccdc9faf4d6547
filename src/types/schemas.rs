//! Schema lookup
//!
//! [`Schema`] is the lookup contract resolution runs against.
//! [`TypeRegistry`] is an in-memory implementation holding global types,
//! element declarations and groups keyed by qualified name.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::namespaces::QName;
use crate::types::builtins::{builtin_types, XSD_NAMESPACE};
use crate::types::elements::{GroupElement, PropertyDescriptor};
use crate::types::Type;

/// Lookup of named types during resolution
pub trait Schema {
    /// Get a global type by qualified name
    ///
    /// Fails with a lookup error if the name is unknown.
    fn get_type(&self, qname: &QName) -> Result<Type>;
}

/// Map of global types
pub type TypeMap = IndexMap<QName, Type>;
/// Map of global element declarations
pub type ElementMap = IndexMap<QName, Arc<dyn PropertyDescriptor>>;
/// Map of group definitions
pub type GroupMap = IndexMap<QName, Arc<GroupElement>>;

/// In-memory schema registry
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    types: TypeMap,
    elements: ElementMap,
    groups: GroupMap,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with the built-in XSD codecs
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for ty in builtin_types() {
            let qname = QName::namespaced(XSD_NAMESPACE, ty.name());
            registry.types.insert(qname, ty);
        }
        registry
    }

    /// Register a global type, replacing any previous one with that name
    pub fn register(&mut self, qname: QName, ty: Type) {
        self.types.insert(qname, ty);
    }

    /// Register a global element declaration
    pub fn add_element(&mut self, element: Arc<dyn PropertyDescriptor>) {
        self.elements.insert(element.qname().clone(), element);
    }

    /// Register a group definition
    pub fn add_group(&mut self, group: Arc<GroupElement>) {
        self.groups.insert(group.qname().clone(), group);
    }

    /// Get a global type
    pub fn get(&self, qname: &QName) -> Option<&Type> {
        self.types.get(qname)
    }

    /// Get a global element declaration
    pub fn get_element(&self, qname: &QName) -> Result<Arc<dyn PropertyDescriptor>> {
        self.elements
            .get(qname)
            .cloned()
            .ok_or_else(|| Error::Lookup(format!("no element {} in schema", qname)))
    }

    /// Get a group definition
    pub fn get_group(&self, qname: &QName) -> Result<Arc<GroupElement>> {
        self.groups
            .get(qname)
            .cloned()
            .ok_or_else(|| Error::Lookup(format!("no group {} in schema", qname)))
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if no types are registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over registered types in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&QName, &Type)> {
        self.types.iter()
    }

    /// Merge another registry into this one, later entries winning
    pub fn merge(&mut self, other: &TypeRegistry) {
        self.types.extend(other.types.clone());
        self.elements.extend(other.elements.clone());
        self.groups.extend(other.groups.clone());
    }

    /// Resolve every registered type once
    ///
    /// Unresolved entries are replaced by their lookup result. Complex
    /// types, including the anonymous ones of global elements, are
    /// flattened in place.
    pub fn resolve_all(&mut self) -> Result<()> {
        let names: Vec<QName> = self.types.keys().cloned().collect();
        for qname in names {
            let resolved = match self.types.get(&qname) {
                Some(ty) => ty.resolve(&*self)?,
                None => continue,
            };
            self.types.insert(qname, resolved);
        }
        for element in self.elements.values() {
            element.resolve(&*self)?;
            element.xsd_type().resolve(&*self)?;
        }
        debug!(
            types = self.types.len(),
            elements = self.elements.len(),
            "resolved schema registry"
        );
        Ok(())
    }
}

impl Schema for TypeRegistry {
    fn get_type(&self, qname: &QName) -> Result<Type> {
        self.types
            .get(qname)
            .cloned()
            .ok_or_else(|| Error::Lookup(format!("no type {} in schema", qname)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Element;
    use crate::error::ErrorKind;
    use crate::types::builtins::IntegerType;
    use crate::types::elements::ElementProperty;
    use crate::types::ComplexType;

    #[test]
    fn test_builtins_registered() {
        let registry = TypeRegistry::with_builtins();
        let int = registry
            .get_type(&QName::namespaced(XSD_NAMESPACE, "int"))
            .unwrap();
        assert_eq!(int.name(), "int");
        assert!(registry.get(&QName::local("int")).is_none());
        assert!(registry.len() > 20);
    }

    #[test]
    fn test_missing_is_lookup_error() {
        let registry = TypeRegistry::new();
        assert!(registry.is_empty());
        let err = registry.get_type(&QName::local("Nope")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lookup);
        assert_eq!(registry.get_group(&QName::local("G")).unwrap_err().kind(), ErrorKind::Lookup);
    }

    #[test]
    fn test_resolve_all_replaces_aliases() {
        let mut registry = TypeRegistry::with_builtins();
        let alias = QName::namespaced("urn:t", "Amount");
        registry.register(
            alias.clone(),
            Type::unresolved(QName::namespaced(XSD_NAMESPACE, "decimal")),
        );
        registry.resolve_all().unwrap();
        assert_eq!(registry.get(&alias).unwrap().name(), "decimal");
    }

    #[test]
    fn test_resolve_all_follows_alias_of_alias() {
        let mut registry = TypeRegistry::with_builtins();
        let a = QName::namespaced("urn:t", "A");
        let b = QName::namespaced("urn:t", "B");
        let holder = ComplexType::new(Some(QName::namespaced("urn:t", "C")))
            .with_elements(vec![ElementProperty::new(QName::local("n"), Type::unresolved(a.clone())).into()]);
        registry.register(QName::namespaced("urn:t", "C"), Type::complex(holder));
        registry.register(a.clone(), Type::unresolved(b.clone()));
        registry.register(b, Type::unresolved(QName::namespaced(XSD_NAMESPACE, "int")));
        registry.resolve_all().unwrap();

        assert_eq!(registry.get(&a).unwrap().name(), "int");
        let holder = registry.get(&QName::namespaced("urn:t", "C")).unwrap();
        let properties = holder.as_complex().unwrap().properties();
        assert_eq!(properties[0].xsd_type().name(), "int");

        let mut node = Element::new(QName::local("c"));
        node.append_child(QName::local("n")).set_text("7");
        let value = holder.parse(&node).unwrap();
        assert_eq!(value.as_compound().unwrap().get("n").unwrap(), &crate::values::Value::Integer(7));
    }

    #[test]
    fn test_resolve_all_resolves_global_elements() {
        let mut registry = TypeRegistry::with_builtins();
        let ct = ComplexType::new(None).with_elements(vec![ElementProperty::new(
            QName::local("n"),
            Type::unresolved(QName::namespaced(XSD_NAMESPACE, "int")),
        )
        .into()]);
        registry.add_element(Arc::new(ElementProperty::new(
            QName::namespaced("urn:t", "count"),
            Type::complex(ct),
        )));
        registry.resolve_all().unwrap();

        let element = registry.get_element(&QName::namespaced("urn:t", "count")).unwrap();
        let ty = element.xsd_type();
        let properties = ty.as_complex().unwrap().properties();
        assert_eq!(properties[0].xsd_type().name(), "int");
    }

    #[test]
    fn test_merge() {
        let mut a = TypeRegistry::new();
        let mut b = TypeRegistry::new();
        b.register(QName::local("X"), Type::simple(IntegerType::int()));
        a.merge(&b);
        assert_eq!(a.len(), 1);
        assert_eq!(a.iter().next().map(|(q, _)| q.clone()), Some(QName::local("X")));
    }
}
