//! Native values
//!
//! [`Value`] is the native side of every codec. A [`CompoundValue`] is the
//! runtime instance of a complex type: one slot per declared property,
//! addressed by property name through the type's [`ValueShape`].

use crate::error::{Error, Result};
use crate::types::complex_types::ComplexType;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// A native value produced by parsing or supplied by a caller
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value
    Null,
    /// String value
    String(String),
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Decimal value
    Decimal(Decimal),
    /// Float or double value
    Double(f64),
    /// Date and time with a timezone offset
    DateTime(DateTime<FixedOffset>),
    /// Date and time without a timezone
    LocalDateTime(NaiveDateTime),
    /// Date value
    Date(NaiveDate),
    /// Time value
    Time(NaiveTime),
    /// Binary value (hex or base64 decoded)
    Binary(Vec<u8>),
    /// URI value
    Uri(String),
    /// Repeated values of a list property
    List(Vec<Value>),
    /// Instance of a complex type
    Compound(CompoundValue),
}

impl Value {
    /// Check if this is the null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as string slice if applicable
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Uri(s) => Some(s),
            _ => None,
        }
    }

    /// Get as integer if applicable
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as list if applicable
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get as compound value if applicable
    pub fn as_compound(&self) -> Option<&CompoundValue> {
        match self {
            Value::Compound(c) => Some(c),
            _ => None,
        }
    }

    /// Get as mutable compound value if applicable
    pub fn as_compound_mut(&mut self) -> Option<&mut CompoundValue> {
        match self {
            Value::Compound(c) => Some(c),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::String(s) | Value::Uri(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Double(v) => {
                if v.is_nan() {
                    write!(f, "NaN")
                } else if *v == f64::INFINITY {
                    write!(f, "INF")
                } else if *v == f64::NEG_INFINITY {
                    write!(f, "-INF")
                } else {
                    write!(f, "{}", v)
                }
            }
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::LocalDateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
            Value::Binary(b) => {
                for byte in b {
                    write!(f, "{:02X}", byte)?;
                }
                Ok(())
            }
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Compound(c) => write!(f, "{}", c),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::String(s) | Value::Uri(s) => serializer.serialize_str(s),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Double(v) => serializer.serialize_f64(*v),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Compound(c) => c.serialize(serializer),
            other => serializer.collect_str(other),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

impl_from! {
    String => String,
    &str => String,
    bool => Boolean,
    i64 => Integer,
    i32 => Integer,
    u32 => Integer,
    Decimal => Decimal,
    f64 => Double,
    DateTime<FixedOffset> => DateTime,
    NaiveDateTime => LocalDateTime,
    NaiveDate => Date,
    NaiveTime => Time,
    Vec<u8> => Binary,
    Vec<Value> => List,
    CompoundValue => Compound,
}

/// Runtime value shape of a complex type
///
/// Maps each declared property name to its slot and holds the default
/// value table new instances are copied from. Slots follow declaration
/// order, elements before attributes.
#[derive(Debug)]
pub struct ValueShape {
    type_name: String,
    defaults: IndexMap<String, Value>,
}

impl ValueShape {
    /// Create a shape from an ordered default table
    pub fn new(type_name: impl Into<String>, defaults: IndexMap<String, Value>) -> Self {
        Self {
            type_name: type_name.into(),
            defaults,
        }
    }

    /// Name of the complex type this shape belongs to
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Property names in slot order
    pub fn names(&self) -> Vec<&str> {
        self.defaults.keys().map(|k| k.as_str()).collect()
    }

    /// Slot index for a property name
    pub fn slot(&self, name: &str) -> Option<usize> {
        self.defaults.get_index_of(name)
    }

    /// Default value for a property name
    pub fn default_for(&self, name: &str) -> Option<&Value> {
        self.defaults.get(name)
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.defaults.len()
    }

    /// Check if the shape has no slots
    pub fn is_empty(&self) -> bool {
        self.defaults.is_empty()
    }

    fn instantiate(&self) -> Vec<Value> {
        self.defaults.values().cloned().collect()
    }
}

/// Instance of a complex type
#[derive(Clone)]
pub struct CompoundValue {
    xsd_type: Arc<ComplexType>,
    shape: Arc<ValueShape>,
    slots: Vec<Value>,
}

impl CompoundValue {
    /// Create an instance populated with the shape's defaults
    pub(crate) fn new(xsd_type: Arc<ComplexType>, shape: Arc<ValueShape>) -> Self {
        let slots = shape.instantiate();
        Self {
            xsd_type,
            shape,
            slots,
        }
    }

    /// The complex type this value was constructed from
    pub fn xsd_type(&self) -> &Arc<ComplexType> {
        &self.xsd_type
    }

    /// Name of the originating complex type
    pub fn type_name(&self) -> &str {
        self.shape.type_name()
    }

    /// Get a property value by name
    pub fn get(&self, name: &str) -> Result<&Value> {
        let slot = self.slot(name)?;
        Ok(&self.slots[slot])
    }

    /// Get a mutable property value by name
    pub fn get_mut(&mut self, name: &str) -> Result<&mut Value> {
        let slot = self.slot(name)?;
        Ok(&mut self.slots[slot])
    }

    /// Assign a property value by name
    ///
    /// Only declared properties can be assigned.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let slot = self.slot(name)?;
        self.slots[slot] = value.into();
        Ok(())
    }

    /// Check if a property is declared
    pub fn contains(&self, name: &str) -> bool {
        self.shape.slot(name).is_some()
    }

    /// Iterate over `(name, value)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.shape.names().into_iter().zip(self.slots.iter())
    }

    /// Number of declared properties
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the type declares no properties
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Convert to a JSON value for diagnostics
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self)
            .map_err(|e| Error::Value(format!("cannot convert {} to JSON: {}", self.type_name(), e)))
    }

    fn slot(&self, name: &str) -> Result<usize> {
        self.shape.slot(name).ok_or_else(|| {
            Error::Attribute(format!(
                "'{}' object has no attribute '{}'",
                self.type_name(),
                name
            ))
        })
    }
}

impl PartialEq for CompoundValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.xsd_type, &other.xsd_type) && self.slots == other.slots
    }
}

impl fmt::Debug for CompoundValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.type_name());
        for (name, value) in self.iter() {
            s.field(name, value);
        }
        s.finish()
    }
}

impl fmt::Display for CompoundValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.type_name())?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        write!(f, ")")
    }
}

impl Serialize for CompoundValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
