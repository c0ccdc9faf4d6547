//! Property descriptors
//!
//! Element and attribute declarations as seen by a complex type, plus the
//! two indirections that only exist until resolution: references to
//! separately declared elements and reusable groups.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::documents::Element;
use crate::error::{Error, Result};
use crate::namespaces::QName;
use crate::settings::ParseConfig;
use crate::types::schemas::Schema;
use crate::types::Type;
use crate::values::Value;

/// Contract for element and attribute declarations
pub trait PropertyDescriptor: fmt::Debug + Send + Sync {
    /// Tag used for structural matching
    fn qname(&self) -> &QName;

    /// Key used for binding and value access
    fn name(&self) -> &str;

    /// Declared type (the looked-up type once resolved)
    fn xsd_type(&self) -> Type;

    /// Whether repeated occurrences accumulate into a list
    fn is_list(&self) -> bool {
        false
    }

    /// Whether this property is carried as an XML attribute
    fn is_attribute(&self) -> bool {
        false
    }

    /// Value a fresh compound value starts with
    fn default_value(&self) -> Result<Value>;

    /// Write `value` into `parent`
    fn render(&self, parent: &mut Element, value: &Value) -> Result<()>;

    /// Read one occurrence from `node`
    ///
    /// For elements `node` is the matched child; for attributes it is the
    /// element carrying the attribute.
    fn parse(&self, node: &Element, config: &ParseConfig) -> Result<Value>;

    /// Replace a deferred type reference with the schema's type
    fn resolve(&self, schema: &dyn Schema) -> Result<()> {
        let _ = schema;
        Ok(())
    }
}

/// Occurrence bounds for an element (minOccurs, maxOccurs)
/// None for max means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    /// Minimum number of occurrences (default 1)
    pub min: u32,
    /// Maximum number of occurrences (None = unbounded, default 1)
    pub max: Option<u32>,
}

impl Occurs {
    /// Create new occurrence bounds
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Default occurrence (1, 1)
    pub fn once() -> Self {
        Self { min: 1, max: Some(1) }
    }

    /// Optional occurrence (0, 1)
    pub fn optional() -> Self {
        Self { min: 0, max: Some(1) }
    }

    /// Zero or more (0, unbounded)
    pub fn zero_or_more() -> Self {
        Self { min: 0, max: None }
    }

    /// One or more (1, unbounded)
    pub fn one_or_more() -> Self {
        Self { min: 1, max: None }
    }

    /// Check if this element can be absent (minOccurs == 0)
    pub fn is_emptiable(&self) -> bool {
        self.min == 0
    }

    /// Check if element can have multiple occurrences
    pub fn is_multiple(&self) -> bool {
        self.max != Some(1) && self.max != Some(0)
    }
}

impl Default for Occurs {
    fn default() -> Self {
        Self::once()
    }
}

/// A slot holding a type that may be replaced once on resolution
struct TypeSlot(RwLock<Type>);

impl TypeSlot {
    fn new(ty: Type) -> Self {
        Self(RwLock::new(ty))
    }

    fn get(&self) -> Type {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn resolve(&self, schema: &dyn Schema) -> Result<()> {
        let current = self.get();
        // Only deferred references are looked up; concrete complex types
        // are resolved by their own owner so recursive types terminate.
        if current.is_unresolved() {
            let resolved = current.resolve(schema)?;
            *self.0.write().unwrap_or_else(PoisonError::into_inner) = resolved;
        }
        Ok(())
    }
}

/// Element declaration
pub struct ElementProperty {
    qname: QName,
    name: String,
    xsd_type: TypeSlot,
    occurs: Occurs,
}

impl ElementProperty {
    /// Create an element named after the local part of its qname
    pub fn new(qname: QName, xsd_type: Type) -> Self {
        let name = qname.local_name.clone();
        Self {
            qname,
            name,
            xsd_type: TypeSlot::new(xsd_type),
            occurs: Occurs::once(),
        }
    }

    /// Create an element accumulating repeated occurrences into a list
    pub fn list(qname: QName, xsd_type: Type) -> Self {
        Self::new(qname, xsd_type).with_occurs(Occurs::zero_or_more())
    }

    /// Override the binding name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the occurrence bounds
    pub fn with_occurs(mut self, occurs: Occurs) -> Self {
        self.occurs = occurs;
        self
    }

    /// Occurrence bounds
    pub fn occurs(&self) -> Occurs {
        self.occurs
    }

    fn render_one(&self, parent: &mut Element, value: &Value) -> Result<()> {
        let ty = self.xsd_type.get();
        let child = parent.append_child(self.qname.clone());
        ty.render(child, value)
    }
}

impl PropertyDescriptor for ElementProperty {
    fn qname(&self) -> &QName {
        &self.qname
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn xsd_type(&self) -> Type {
        self.xsd_type.get()
    }

    fn is_list(&self) -> bool {
        self.occurs.is_multiple()
    }

    fn default_value(&self) -> Result<Value> {
        if self.is_list() {
            return Ok(Value::List(Vec::new()));
        }
        self.xsd_type.get().default_value()
    }

    fn render(&self, parent: &mut Element, value: &Value) -> Result<()> {
        match value {
            Value::Null => Ok(()),
            Value::List(items) if self.is_list() => items
                .iter()
                .filter(|item| !item.is_null())
                .try_for_each(|item| self.render_one(parent, item)),
            _ if self.is_list() => Err(Error::Value(format!(
                "list element '{}' expects a list, got {:?}",
                self.name, value
            ))),
            _ => self.render_one(parent, value),
        }
    }

    fn parse(&self, node: &Element, config: &ParseConfig) -> Result<Value> {
        self.xsd_type.get().parse_with(node, config)
    }

    fn resolve(&self, schema: &dyn Schema) -> Result<()> {
        self.xsd_type.resolve(schema)
    }
}

impl fmt::Debug for ElementProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementProperty")
            .field("qname", &self.qname)
            .field("name", &self.name)
            .field("type", &self.xsd_type.get().name())
            .field("occurs", &self.occurs)
            .finish()
    }
}

/// Attribute declaration
pub struct AttributeProperty {
    qname: QName,
    name: String,
    xsd_type: TypeSlot,
    required: bool,
    default: Option<String>,
}

impl AttributeProperty {
    /// Create an optional attribute named after the local part of its qname
    pub fn new(qname: QName, xsd_type: Type) -> Self {
        let name = qname.local_name.clone();
        Self {
            qname,
            name,
            xsd_type: TypeSlot::new(xsd_type),
            required: false,
            default: None,
        }
    }

    /// Override the binding name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Mark the attribute as required
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Set the lexical default used when the attribute is absent
    pub fn with_default(mut self, lexical: impl Into<String>) -> Self {
        self.default = Some(lexical.into());
        self
    }

    /// Whether the attribute is required
    pub fn is_required(&self) -> bool {
        self.required
    }

    fn simple_type(&self) -> Result<Arc<dyn crate::types::SimpleType>> {
        match self.xsd_type.get() {
            Type::Simple(simple) => Ok(simple),
            Type::Complex(_) => Err(Error::Type(format!(
                "attribute '{}' must have a simple type",
                self.name
            ))),
            Type::Unresolved(qname) => Err(Error::NotImplemented(format!(
                "attribute '{}' has unresolved type {}",
                self.name, qname
            ))),
        }
    }
}

impl PropertyDescriptor for AttributeProperty {
    fn qname(&self) -> &QName {
        &self.qname
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn xsd_type(&self) -> Type {
        self.xsd_type.get()
    }

    fn is_attribute(&self) -> bool {
        true
    }

    fn default_value(&self) -> Result<Value> {
        match &self.default {
            Some(lexical) => self.simple_type()?.native_value(Some(lexical)),
            None => self.xsd_type.get().default_value(),
        }
    }

    fn render(&self, parent: &mut Element, value: &Value) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }
        let text = self.simple_type()?.xml_value(value)?;
        parent.set_attribute(self.qname.clone(), text);
        Ok(())
    }

    fn parse(&self, node: &Element, _config: &ParseConfig) -> Result<Value> {
        match node.get_attribute_qname(&self.qname) {
            Some(text) => {
                let simple = self.simple_type()?;
                simple.native_value(Some(&simple.white_space().normalize(text)))
            }
            None => self.default_value(),
        }
    }

    fn resolve(&self, schema: &dyn Schema) -> Result<()> {
        self.xsd_type.resolve(schema)
    }
}

impl fmt::Debug for AttributeProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeProperty")
            .field("qname", &self.qname)
            .field("name", &self.name)
            .field("type", &self.xsd_type.get().name())
            .field("required", &self.required)
            .finish()
    }
}

/// Reference to a separately declared element
#[derive(Debug)]
pub struct RefElement {
    target: Particle,
}

impl RefElement {
    /// Create a reference to `target`
    pub fn new(target: impl Into<Particle>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// The referenced declaration
    pub fn target(&self) -> &Particle {
        &self.target
    }
}

/// Reusable, ordered bundle of declarations
#[derive(Debug)]
pub struct GroupElement {
    qname: QName,
    members: Vec<Particle>,
}

impl GroupElement {
    /// Create a group from its members in declared order
    pub fn new(qname: QName, members: Vec<Particle>) -> Self {
        Self { qname, members }
    }

    /// Group name
    pub fn qname(&self) -> &QName {
        &self.qname
    }

    /// Iterate over members in declared order
    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.members.iter()
    }

    /// Number of direct members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the group has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<'a> IntoIterator for &'a GroupElement {
    type Item = &'a Particle;
    type IntoIter = std::slice::Iter<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An entry of a complex type's declared element list
#[derive(Debug, Clone)]
pub enum Particle {
    /// Concrete element (or attribute) declaration
    Property(Arc<dyn PropertyDescriptor>),
    /// Reference, replaced by its target on resolution
    Ref(Arc<RefElement>),
    /// Group, spliced in place by its members on resolution
    Group(Arc<GroupElement>),
}

impl Particle {
    /// Get the concrete declaration, if this is one
    pub fn as_property(&self) -> Option<&Arc<dyn PropertyDescriptor>> {
        match self {
            Particle::Property(prop) => Some(prop),
            _ => None,
        }
    }

    /// Check if this entry is still an indirection
    pub fn is_indirect(&self) -> bool {
        !matches!(self, Particle::Property(_))
    }

    /// Append the concrete declarations this entry stands for
    ///
    /// References are replaced by their target; groups expand to their
    /// members in declared order, recursively.
    pub fn flatten_into(&self, out: &mut Vec<Arc<dyn PropertyDescriptor>>) {
        match self {
            Particle::Property(prop) => out.push(Arc::clone(prop)),
            Particle::Ref(reference) => reference.target().flatten_into(out),
            Particle::Group(group) => {
                for member in group.iter() {
                    member.flatten_into(out);
                }
            }
        }
    }
}

impl From<ElementProperty> for Particle {
    fn from(prop: ElementProperty) -> Self {
        Particle::Property(Arc::new(prop))
    }
}

impl From<AttributeProperty> for Particle {
    fn from(prop: AttributeProperty) -> Self {
        Particle::Property(Arc::new(prop))
    }
}

impl From<Arc<dyn PropertyDescriptor>> for Particle {
    fn from(prop: Arc<dyn PropertyDescriptor>) -> Self {
        Particle::Property(prop)
    }
}

impl From<RefElement> for Particle {
    fn from(reference: RefElement) -> Self {
        Particle::Ref(Arc::new(reference))
    }
}

impl From<Arc<RefElement>> for Particle {
    fn from(reference: Arc<RefElement>) -> Self {
        Particle::Ref(reference)
    }
}

impl From<Arc<GroupElement>> for Particle {
    fn from(group: Arc<GroupElement>) -> Self {
        Particle::Group(group)
    }
}

impl From<GroupElement> for Particle {
    fn from(group: GroupElement) -> Self {
        Particle::Group(Arc::new(group))
    }
}
