//! Complex types
//!
//! A complex type owns an ordered list of element particles followed by
//! attribute particles. Until [`ComplexType::resolve`] runs, particles may
//! still be references or groups; resolution flattens them in place so the
//! type holds concrete property descriptors only.
//!
//! Instances are [`CompoundValue`]s built from a [`ValueShape`] that is
//! computed on first use and cached until the next resolution.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::arguments::{bind_arguments, Arguments};
use crate::documents::Element;
use crate::error::{Error, Result, UnexpectedElement};
use crate::namespaces::QName;
use crate::settings::{ParseConfig, SequenceMatching};
use crate::types::elements::{Particle, PropertyDescriptor};
use crate::types::schemas::Schema;
use crate::values::{CompoundValue, Value, ValueShape};

thread_local! {
    // Complex types whose shape is being built on this thread
    static BUILDING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

#[derive(Default)]
struct State {
    elements: Vec<Particle>,
    attributes: Vec<Particle>,
    shape: Option<Arc<ValueShape>>,
}

/// Composite schema type
pub struct ComplexType {
    qname: Option<QName>,
    state: RwLock<State>,
}

impl ComplexType {
    /// Create an empty complex type, anonymous if `qname` is `None`
    pub fn new(qname: Option<QName>) -> Self {
        Self {
            qname,
            state: RwLock::new(State::default()),
        }
    }

    /// Set the element particles in declared order
    pub fn with_elements(mut self, elements: Vec<Particle>) -> Self {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        state.elements = elements;
        state.shape = None;
        self
    }

    /// Set the attribute particles in declared order
    pub fn with_attributes(mut self, attributes: Vec<Particle>) -> Self {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        state.attributes = attributes;
        state.shape = None;
        self
    }

    /// Display name, `"ComplexType"` for anonymous types
    pub fn name(&self) -> String {
        match &self.qname {
            Some(qname) => qname.local_name.clone(),
            None => "ComplexType".to_string(),
        }
    }

    /// Qualified name, if the type is named
    pub fn qname(&self) -> Option<&QName> {
        self.qname.as_ref()
    }

    /// Element particles as currently stored
    pub fn particles(&self) -> Vec<Particle> {
        self.read_state().elements.clone()
    }

    /// Check that no reference or group particles remain
    pub fn is_resolved(&self) -> bool {
        let state = self.read_state();
        !state
            .elements
            .iter()
            .chain(state.attributes.iter())
            .any(Particle::is_indirect)
    }

    /// Concrete properties in declared order, elements before attributes
    ///
    /// Indirections that are still stored are expanded on the fly.
    pub fn properties(&self) -> Vec<Arc<dyn PropertyDescriptor>> {
        let state = self.read_state();
        let mut properties = Vec::with_capacity(state.elements.len() + state.attributes.len());
        for particle in state.elements.iter().chain(state.attributes.iter()) {
            particle.flatten_into(&mut properties);
        }
        properties
    }

    /// Concrete element properties in declared order
    pub fn element_properties(&self) -> Vec<Arc<dyn PropertyDescriptor>> {
        self.properties()
            .into_iter()
            .filter(|prop| !prop.is_attribute())
            .collect()
    }

    /// Concrete attribute properties in declared order
    pub fn attribute_properties(&self) -> Vec<Arc<dyn PropertyDescriptor>> {
        self.properties()
            .into_iter()
            .filter(|prop| prop.is_attribute())
            .collect()
    }

    /// Flatten references and groups in place and resolve property types
    ///
    /// The stored particle lists are replaced, so every holder of this
    /// type sees the flattened form. Calling this again changes nothing.
    pub fn resolve(&self, schema: &dyn Schema) -> Result<()> {
        let properties = {
            let mut state = self.write_state();
            let elements = flatten(&state.elements);
            let attributes = flatten(&state.attributes);
            let spliced = state
                .elements
                .iter()
                .chain(state.attributes.iter())
                .any(Particle::is_indirect);

            state.elements = elements.iter().cloned().map(Particle::Property).collect();
            state.attributes = attributes.iter().cloned().map(Particle::Property).collect();
            state.shape = None;

            if spliced {
                debug!(
                    type_name = %self.name(),
                    elements = elements.len(),
                    attributes = attributes.len(),
                    "flattened complex type"
                );
            }
            elements.into_iter().chain(attributes).collect::<Vec<_>>()
        };

        for prop in &properties {
            prop.resolve(schema)?;
        }
        debug!(type_name = %self.name(), properties = properties.len(), "resolved complex type");
        Ok(())
    }

    /// Runtime value shape, built on first use
    pub fn shape(&self) -> Result<Arc<ValueShape>> {
        if let Some(shape) = &self.read_state().shape {
            return Ok(Arc::clone(shape));
        }

        let key = self as *const Self as usize;
        let reentered = BUILDING.with(|building| {
            let mut building = building.borrow_mut();
            if building.contains(&key) {
                true
            } else {
                building.push(key);
                false
            }
        });
        if reentered {
            return Err(Error::Type(format!(
                "{} requires an instance of itself to build its default value",
                self.name()
            )));
        }

        let built = self.build_shape();
        BUILDING.with(|building| building.borrow_mut().retain(|k| *k != key));

        let shape = Arc::new(built?);
        self.write_state().shape = Some(Arc::clone(&shape));
        Ok(shape)
    }

    fn build_shape(&self) -> Result<ValueShape> {
        let properties = self.properties();
        let mut defaults = IndexMap::with_capacity(properties.len());
        let mut tags = HashSet::with_capacity(properties.len());

        for prop in &properties {
            if !tags.insert((prop.is_attribute(), prop.qname().clone())) {
                return Err(Error::Type(format!(
                    "{} declares {} more than once",
                    self.name(),
                    prop.qname()
                )));
            }
            if defaults.contains_key(prop.name()) {
                return Err(Error::Type(format!(
                    "{} declares property '{}' more than once",
                    self.name(),
                    prop.name()
                )));
            }
            defaults.insert(prop.name().to_string(), prop.default_value()?);
        }

        debug!(type_name = %self.name(), slots = defaults.len(), "built value shape");
        Ok(ValueShape::new(self.name(), defaults))
    }

    /// Construct a compound value
    ///
    /// Every property starts at its default; positional arguments then fill
    /// properties in declared order and keyword arguments assign by name.
    pub fn construct(self: &Arc<Self>, args: Arguments) -> Result<CompoundValue> {
        let shape = self.shape()?;
        let mut value = CompoundValue::new(Arc::clone(self), Arc::clone(&shape));
        if args.is_empty() {
            return Ok(value);
        }

        let bound = bind_arguments(&shape.names(), args)
            .map_err(|e| match e {
                Error::Argument(msg) => Error::Argument(format!("{}() {}", self.name(), msg)),
                other => other,
            })?;
        for (name, arg) in bound {
            value.set(&name, arg)?;
        }
        Ok(value)
    }

    /// Diagnostic signature, `"<type> <name>"` per property
    pub fn signature(&self) -> String {
        self.properties()
            .iter()
            .map(|prop| format!("{} {}", prop.xsd_type().name(), prop.name()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Check whether `value` is an instance of this type
    pub fn accept(&self, value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Compound(compound) => std::ptr::eq(Arc::as_ptr(compound.xsd_type()), self),
            _ => false,
        }
    }

    /// Render each property of `value` into `node` in declared order
    pub fn render(&self, node: &mut Element, value: &Value) -> Result<()> {
        let compound = match value {
            Value::Compound(compound) => compound,
            other => {
                return Err(Error::Type(format!(
                    "{} cannot render {:?}",
                    self.name(),
                    other
                )))
            }
        };

        for prop in self.properties() {
            let sub_value = compound.get(prop.name())?;
            prop.render(node, sub_value)?;
        }
        Ok(())
    }

    /// Parse `node` into a compound value
    ///
    /// Attributes are read by qname. Children are matched against the
    /// element properties in a single forward pass; the cursor never moves
    /// back, so children must follow declared order.
    pub fn parse(self: &Arc<Self>, node: &Element, config: &ParseConfig) -> Result<CompoundValue> {
        let mut instance = self.construct(Arguments::new())?;
        let (attributes, elements): (Vec<_>, Vec<_>) = self
            .properties()
            .into_iter()
            .partition(|prop| prop.is_attribute());

        for attr in &attributes {
            let value = attr.parse(node, config)?;
            instance.set(attr.name(), value)?;
        }
        if elements.is_empty() {
            return Ok(instance);
        }

        let mut cursor = 0;
        for (position, child) in node.children.iter().enumerate() {
            if elements[cursor].qname() != &child.qname {
                cursor = match config.matching() {
                    SequenceMatching::SingleStep => cursor + 1,
                    SequenceMatching::SkipAbsent => elements[cursor..]
                        .iter()
                        .position(|prop| prop.qname() == &child.qname)
                        .map_or(elements.len(), |offset| cursor + offset),
                };
                trace!(type_name = %self.name(), tag = %child.qname, cursor, "advanced parse cursor");
            }

            let prop = match elements.get(cursor) {
                Some(prop) if prop.qname() == &child.qname => prop,
                other => {
                    let mut err = UnexpectedElement::new(child.qname.clone())
                        .with_type_name(self.name())
                        .with_position(position);
                    if let Some(prop) = other {
                        err = err.with_expected(prop.qname().clone());
                    }
                    return Err(err.into());
                }
            };

            let value = prop.parse(child, config)?;
            if prop.is_list() {
                match instance.get_mut(prop.name())? {
                    Value::List(items) => items.push(value),
                    slot => *slot = Value::List(vec![value]),
                }
            } else {
                instance.set(prop.name(), value)?;
            }
        }
        Ok(instance)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn flatten(particles: &[Particle]) -> Vec<Arc<dyn PropertyDescriptor>> {
    let mut out = Vec::with_capacity(particles.len());
    for particle in particles {
        particle.flatten_into(&mut out);
    }
    out
}

impl fmt::Debug for ComplexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComplexType")
            .field("qname", &self.qname)
            .field("signature", &self.signature())
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
