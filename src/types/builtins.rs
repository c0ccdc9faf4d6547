//! XSD built-in simple types
//!
//! Concrete codecs for the primitive and common derived types. Absent
//! element text parses to the empty string for string-like types, to an
//! empty byte sequence for binary types, and to [`Value::Null`] for every
//! other type.

use std::str::FromStr;

use base64::Engine;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat};
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::types::simple_types::{SimpleType, WhiteSpace};
use crate::types::Type;
use crate::values::Value;

/// XSD 1.0 Namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";

fn invalid(type_name: &str, text: &str) -> Error {
    Error::Value(format!("'{}' is not a valid xs:{}", text, type_name))
}

fn unsupported(type_name: &str, value: &Value) -> Error {
    Error::Value(format!("cannot render {:?} as xs:{}", value, type_name))
}

/// Render any scalar through its display form
fn scalar_text(type_name: &str, value: &Value) -> Result<String> {
    match value {
        Value::List(_) | Value::Compound(_) => Err(unsupported(type_name, value)),
        other => Ok(other.to_string()),
    }
}

// =============================================================================
// String types
// =============================================================================

/// anySimpleType: text passes through unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct AnySimpleType;

impl SimpleType for AnySimpleType {
    fn name(&self) -> &str {
        "anySimpleType"
    }

    fn white_space(&self) -> WhiteSpace {
        WhiteSpace::Preserve
    }

    fn xml_value(&self, value: &Value) -> Result<String> {
        scalar_text(self.name(), value)
    }

    fn native_value(&self, text: Option<&str>) -> Result<Value> {
        Ok(Value::String(text.unwrap_or_default().to_string()))
    }
}

/// string and its whitespace-normalizing derivations
#[derive(Debug, Clone)]
pub struct StringType {
    name: &'static str,
    white_space: WhiteSpace,
}

impl StringType {
    /// Create a string-like type with the given white space handling
    pub fn with_name(name: &'static str, white_space: WhiteSpace) -> Self {
        Self { name, white_space }
    }

    /// xs:string
    pub fn string() -> Self {
        Self::with_name("string", WhiteSpace::Preserve)
    }

    /// xs:normalizedString
    pub fn normalized_string() -> Self {
        Self::with_name("normalizedString", WhiteSpace::Replace)
    }

    /// xs:token
    pub fn token() -> Self {
        Self::with_name("token", WhiteSpace::Collapse)
    }
}

impl SimpleType for StringType {
    fn name(&self) -> &str {
        self.name
    }

    fn white_space(&self) -> WhiteSpace {
        self.white_space
    }

    fn xml_value(&self, value: &Value) -> Result<String> {
        scalar_text(self.name, value)
    }

    fn native_value(&self, text: Option<&str>) -> Result<Value> {
        Ok(Value::String(text.unwrap_or_default().to_string()))
    }
}

// =============================================================================
// Boolean
// =============================================================================

/// xs:boolean
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanType;

impl BooleanType {
    fn parse_lexical(text: &str) -> Result<bool> {
        match text {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(invalid("boolean", other)),
        }
    }
}

impl SimpleType for BooleanType {
    fn name(&self) -> &str {
        "boolean"
    }

    fn default_value(&self) -> Value {
        Value::Boolean(false)
    }

    fn xml_value(&self, value: &Value) -> Result<String> {
        let b = match value {
            Value::Boolean(b) => *b,
            Value::String(s) => Self::parse_lexical(s.trim())?,
            other => return Err(unsupported(self.name(), other)),
        };
        Ok(if b { "true" } else { "false" }.to_string())
    }

    fn native_value(&self, text: Option<&str>) -> Result<Value> {
        match text {
            Some(text) => Self::parse_lexical(text).map(Value::Boolean),
            None => Ok(Value::Null),
        }
    }
}

// =============================================================================
// Numeric types
// =============================================================================

/// xs:integer and its bounded derivations
#[derive(Debug, Clone)]
pub struct IntegerType {
    name: &'static str,
    min: i64,
    max: i64,
}

impl IntegerType {
    /// Create an integer type restricted to `min..=max`
    pub fn bounded(name: &'static str, min: i64, max: i64) -> Self {
        Self { name, min, max }
    }

    /// xs:integer (limited to the 64-bit range)
    pub fn integer() -> Self {
        Self::bounded("integer", i64::MIN, i64::MAX)
    }

    /// xs:long
    pub fn long() -> Self {
        Self::bounded("long", i64::MIN, i64::MAX)
    }

    /// xs:int
    pub fn int() -> Self {
        Self::bounded("int", i32::MIN as i64, i32::MAX as i64)
    }

    /// xs:short
    pub fn short() -> Self {
        Self::bounded("short", i16::MIN as i64, i16::MAX as i64)
    }

    /// xs:byte
    pub fn byte() -> Self {
        Self::bounded("byte", i8::MIN as i64, i8::MAX as i64)
    }

    /// xs:nonNegativeInteger
    pub fn non_negative_integer() -> Self {
        Self::bounded("nonNegativeInteger", 0, i64::MAX)
    }

    /// xs:positiveInteger
    pub fn positive_integer() -> Self {
        Self::bounded("positiveInteger", 1, i64::MAX)
    }

    /// xs:nonPositiveInteger
    pub fn non_positive_integer() -> Self {
        Self::bounded("nonPositiveInteger", i64::MIN, 0)
    }

    /// xs:negativeInteger
    pub fn negative_integer() -> Self {
        Self::bounded("negativeInteger", i64::MIN, -1)
    }

    /// xs:unsignedInt
    pub fn unsigned_int() -> Self {
        Self::bounded("unsignedInt", 0, u32::MAX as i64)
    }

    /// xs:unsignedShort
    pub fn unsigned_short() -> Self {
        Self::bounded("unsignedShort", 0, u16::MAX as i64)
    }

    /// xs:unsignedByte
    pub fn unsigned_byte() -> Self {
        Self::bounded("unsignedByte", 0, u8::MAX as i64)
    }

    fn check(&self, value: i64) -> Result<i64> {
        if (self.min..=self.max).contains(&value) {
            Ok(value)
        } else {
            Err(Error::Value(format!(
                "value must be {} <= x <= {} for xs:{}, got {}",
                self.min, self.max, self.name, value
            )))
        }
    }

    fn parse_lexical(&self, text: &str) -> Result<i64> {
        let parsed = text.parse::<i64>().map_err(|_| invalid(self.name, text))?;
        self.check(parsed)
    }
}

impl SimpleType for IntegerType {
    fn name(&self) -> &str {
        self.name
    }

    fn default_value(&self) -> Value {
        Value::Integer(0)
    }

    fn xml_value(&self, value: &Value) -> Result<String> {
        let i = match value {
            Value::Integer(i) => self.check(*i)?,
            Value::String(s) => self.parse_lexical(s.trim())?,
            other => return Err(unsupported(self.name, other)),
        };
        Ok(i.to_string())
    }

    fn native_value(&self, text: Option<&str>) -> Result<Value> {
        match text {
            Some(text) => self.parse_lexical(text).map(Value::Integer),
            None => Ok(Value::Null),
        }
    }
}

/// xs:decimal
#[derive(Debug, Clone, Copy, Default)]
pub struct DecimalType;

impl DecimalType {
    fn parse_lexical(text: &str) -> Result<Decimal> {
        Decimal::from_str(text).map_err(|_| invalid("decimal", text))
    }
}

impl SimpleType for DecimalType {
    fn name(&self) -> &str {
        "decimal"
    }

    fn default_value(&self) -> Value {
        Value::Decimal(Decimal::ZERO)
    }

    fn xml_value(&self, value: &Value) -> Result<String> {
        match value {
            Value::Decimal(d) => Ok(d.to_string()),
            Value::Integer(i) => Ok(i.to_string()),
            Value::String(s) => Self::parse_lexical(s.trim()).map(|d| d.to_string()),
            other => Err(unsupported(self.name(), other)),
        }
    }

    fn native_value(&self, text: Option<&str>) -> Result<Value> {
        match text {
            Some(text) => Self::parse_lexical(text).map(Value::Decimal),
            None => Ok(Value::Null),
        }
    }
}

/// xs:float and xs:double
#[derive(Debug, Clone)]
pub struct FloatType {
    name: &'static str,
}

impl FloatType {
    /// xs:float
    pub fn float() -> Self {
        Self { name: "float" }
    }

    /// xs:double
    pub fn double() -> Self {
        Self { name: "double" }
    }

    fn parse_lexical(&self, text: &str) -> Result<f64> {
        match text {
            "INF" | "+INF" => Ok(f64::INFINITY),
            "-INF" => Ok(f64::NEG_INFINITY),
            "NaN" => Ok(f64::NAN),
            // Rust accepts "inf" and "nan" spellings that XSD does not
            t if t
                .bytes()
                .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E')) =>
            {
                t.parse::<f64>().map_err(|_| invalid(self.name, text))
            }
            _ => Err(invalid(self.name, text)),
        }
    }
}

impl SimpleType for FloatType {
    fn name(&self) -> &str {
        self.name
    }

    fn default_value(&self) -> Value {
        Value::Double(0.0)
    }

    fn xml_value(&self, value: &Value) -> Result<String> {
        let v = match value {
            Value::Double(v) => *v,
            Value::Integer(i) => *i as f64,
            Value::String(s) => self.parse_lexical(s.trim())?,
            other => return Err(unsupported(self.name, other)),
        };
        Ok(Value::Double(v).to_string())
    }

    fn native_value(&self, text: Option<&str>) -> Result<Value> {
        match text {
            Some(text) => self.parse_lexical(text).map(Value::Double),
            None => Ok(Value::Null),
        }
    }
}

// =============================================================================
// Date/time types
// =============================================================================

/// xs:dateTime
///
/// Values with a timezone parse to [`Value::DateTime`], values without
/// one to [`Value::LocalDateTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeType;

impl DateTimeType {
    fn parse_lexical(text: &str) -> Result<Value> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(Value::DateTime(dt));
        }
        NaiveDateTime::parse_from_str(text, LOCAL_DATETIME_FORMAT)
            .map(Value::LocalDateTime)
            .map_err(|_| invalid("dateTime", text))
    }
}

impl SimpleType for DateTimeType {
    fn name(&self) -> &str {
        "dateTime"
    }

    fn default_value(&self) -> Value {
        Value::Null
    }

    fn xml_value(&self, value: &Value) -> Result<String> {
        match value {
            Value::DateTime(dt) => Ok(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::LocalDateTime(dt) => Ok(dt.format(LOCAL_DATETIME_FORMAT).to_string()),
            Value::String(s) => {
                let parsed = Self::parse_lexical(s.trim())?;
                self.xml_value(&parsed)
            }
            other => Err(unsupported(self.name(), other)),
        }
    }

    fn native_value(&self, text: Option<&str>) -> Result<Value> {
        match text {
            Some(text) => Self::parse_lexical(text),
            None => Ok(Value::Null),
        }
    }
}

/// xs:date
#[derive(Debug, Clone, Copy, Default)]
pub struct DateType;

impl SimpleType for DateType {
    fn name(&self) -> &str {
        "date"
    }

    fn default_value(&self) -> Value {
        Value::Null
    }

    fn xml_value(&self, value: &Value) -> Result<String> {
        let date = match value {
            Value::Date(d) => *d,
            Value::DateTime(dt) => dt.date_naive(),
            Value::LocalDateTime(dt) => dt.date(),
            Value::String(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                .map_err(|_| invalid(self.name(), s))?,
            other => return Err(unsupported(self.name(), other)),
        };
        Ok(date.format(DATE_FORMAT).to_string())
    }

    fn native_value(&self, text: Option<&str>) -> Result<Value> {
        match text {
            Some(text) => NaiveDate::parse_from_str(text, DATE_FORMAT)
                .map(Value::Date)
                .map_err(|_| invalid(self.name(), text)),
            None => Ok(Value::Null),
        }
    }
}

/// xs:time
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeType;

impl SimpleType for TimeType {
    fn name(&self) -> &str {
        "time"
    }

    fn default_value(&self) -> Value {
        Value::Null
    }

    fn xml_value(&self, value: &Value) -> Result<String> {
        let time = match value {
            Value::Time(t) => *t,
            Value::LocalDateTime(dt) => dt.time(),
            Value::String(s) => NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
                .map_err(|_| invalid(self.name(), s))?,
            other => return Err(unsupported(self.name(), other)),
        };
        Ok(time.format(TIME_FORMAT).to_string())
    }

    fn native_value(&self, text: Option<&str>) -> Result<Value> {
        match text {
            Some(text) => NaiveTime::parse_from_str(text, TIME_FORMAT)
                .map(Value::Time)
                .map_err(|_| invalid(self.name(), text)),
            None => Ok(Value::Null),
        }
    }
}

// =============================================================================
// Binary types
// =============================================================================

/// xs:base64Binary
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64BinaryType;

impl Base64BinaryType {
    fn decode(text: &str) -> Result<Vec<u8>> {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        base64::engine::general_purpose::STANDARD
            .decode(compact)
            .map_err(|_| invalid("base64Binary", text))
    }
}

impl SimpleType for Base64BinaryType {
    fn name(&self) -> &str {
        "base64Binary"
    }

    fn default_value(&self) -> Value {
        Value::Binary(Vec::new())
    }

    fn xml_value(&self, value: &Value) -> Result<String> {
        match value {
            Value::Binary(bytes) => Ok(base64::engine::general_purpose::STANDARD.encode(bytes)),
            Value::String(s) => Self::decode(s).map(|_| s.trim().to_string()),
            other => Err(unsupported(self.name(), other)),
        }
    }

    fn native_value(&self, text: Option<&str>) -> Result<Value> {
        Self::decode(text.unwrap_or_default()).map(Value::Binary)
    }
}

/// xs:hexBinary
#[derive(Debug, Clone, Copy, Default)]
pub struct HexBinaryType;

impl HexBinaryType {
    fn decode(text: &str) -> Result<Vec<u8>> {
        if text.len() % 2 != 0 || !text.is_ascii() {
            return Err(invalid("hexBinary", text));
        }
        (0..text.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&text[i..i + 2], 16).map_err(|_| invalid("hexBinary", text)))
            .collect()
    }
}

impl SimpleType for HexBinaryType {
    fn name(&self) -> &str {
        "hexBinary"
    }

    fn default_value(&self) -> Value {
        Value::Binary(Vec::new())
    }

    fn xml_value(&self, value: &Value) -> Result<String> {
        match value {
            Value::Binary(_) => Ok(value.to_string()),
            Value::String(s) => Self::decode(s.trim()).map(|b| Value::Binary(b).to_string()),
            other => Err(unsupported(self.name(), other)),
        }
    }

    fn native_value(&self, text: Option<&str>) -> Result<Value> {
        Self::decode(text.unwrap_or_default()).map(Value::Binary)
    }
}

// =============================================================================
// Other types
// =============================================================================

/// xs:anyURI
///
/// Relative references are accepted; anything `url` rejects for reasons
/// other than a missing base is not.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyUriType;

impl AnyUriType {
    fn check(text: &str) -> Result<String> {
        match url::Url::parse(text) {
            Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => Ok(text.to_string()),
            Err(e) => Err(Error::Value(format!("'{}' is not a valid xs:anyURI: {}", text, e))),
        }
    }
}

impl SimpleType for AnyUriType {
    fn name(&self) -> &str {
        "anyURI"
    }

    fn default_value(&self) -> Value {
        Value::Uri(String::new())
    }

    fn xml_value(&self, value: &Value) -> Result<String> {
        match value {
            Value::Uri(s) | Value::String(s) => Self::check(s.trim()),
            other => Err(unsupported(self.name(), other)),
        }
    }

    fn native_value(&self, text: Option<&str>) -> Result<Value> {
        Self::check(text.unwrap_or_default()).map(Value::Uri)
    }
}

// =============================================================================
// Built-in registry
// =============================================================================

/// All built-in codecs, wrapped as types
pub fn builtin_types() -> Vec<Type> {
    vec![
        Type::simple(AnySimpleType),
        Type::simple(StringType::string()),
        Type::simple(StringType::normalized_string()),
        Type::simple(StringType::token()),
        Type::simple(StringType::with_name("language", WhiteSpace::Collapse)),
        Type::simple(StringType::with_name("Name", WhiteSpace::Collapse)),
        Type::simple(StringType::with_name("NCName", WhiteSpace::Collapse)),
        Type::simple(StringType::with_name("ID", WhiteSpace::Collapse)),
        Type::simple(StringType::with_name("IDREF", WhiteSpace::Collapse)),
        Type::simple(StringType::with_name("NMTOKEN", WhiteSpace::Collapse)),
        Type::simple(BooleanType),
        Type::simple(DecimalType),
        Type::simple(IntegerType::integer()),
        Type::simple(IntegerType::long()),
        Type::simple(IntegerType::int()),
        Type::simple(IntegerType::short()),
        Type::simple(IntegerType::byte()),
        Type::simple(IntegerType::non_negative_integer()),
        Type::simple(IntegerType::positive_integer()),
        Type::simple(IntegerType::non_positive_integer()),
        Type::simple(IntegerType::negative_integer()),
        Type::simple(IntegerType::unsigned_int()),
        Type::simple(IntegerType::unsigned_short()),
        Type::simple(IntegerType::unsigned_byte()),
        Type::simple(FloatType::float()),
        Type::simple(FloatType::double()),
        Type::simple(DateTimeType),
        Type::simple(DateType),
        Type::simple(TimeType),
        Type::simple(Base64BinaryType),
        Type::simple(HexBinaryType),
        Type::simple(AnyUriType),
    ]
}

/// Look up a built-in codec by local name
pub fn get_builtin_type(name: &str) -> Option<Type> {
    builtin_types().into_iter().find(|t| t.name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::Arguments;
    use crate::documents::Element;
    use crate::namespaces::QName;
    use chrono::{FixedOffset, TimeZone};
    use proptest::prelude::*;

    fn node(text: Option<&str>) -> Element {
        let mut node = Element::new(QName::local("v"));
        node.text = text.map(str::to_string);
        node
    }

    #[test]
    fn test_string_codec() {
        let codec = StringType::string();
        assert_eq!(codec.native_value(Some(" a b ")).unwrap(), Value::String(" a b ".into()));
        assert_eq!(codec.native_value(None).unwrap(), Value::String(String::new()));
        assert_eq!(codec.xml_value(&Value::Integer(5)).unwrap(), "5");
        assert!(codec.xml_value(&Value::List(vec![])).is_err());
        assert_eq!(codec.call(Arguments::new()).unwrap(), Value::String(String::new()));
    }

    #[test]
    fn test_token_collapses_on_parse() {
        let codec = StringType::token();
        assert_eq!(codec.parse(&node(Some("  a \n b "))).unwrap(), Value::String("a b".into()));
        assert_eq!(StringType::string().parse(&node(Some(" a "))).unwrap(), Value::String(" a ".into()));
    }

    #[test]
    fn test_boolean_codec() {
        let codec = BooleanType;
        assert_eq!(codec.native_value(Some("1")).unwrap(), Value::Boolean(true));
        assert_eq!(codec.native_value(Some("false")).unwrap(), Value::Boolean(false));
        assert_eq!(codec.native_value(None).unwrap(), Value::Null);
        assert!(codec.native_value(Some("yes")).is_err());
        assert_eq!(codec.xml_value(&Value::Boolean(true)).unwrap(), "true");
        assert_eq!(codec.default_value(), Value::Boolean(false));
    }

    #[test]
    fn test_integer_bounds() {
        assert!(IntegerType::byte().native_value(Some("127")).is_ok());
        assert!(IntegerType::byte().native_value(Some("128")).is_err());
        assert!(IntegerType::positive_integer().xml_value(&Value::Integer(0)).is_err());
        assert!(IntegerType::unsigned_int().native_value(Some("4294967295")).is_ok());
        assert!(IntegerType::integer().native_value(Some("1.5")).is_err());
        assert_eq!(IntegerType::int().parse(&node(Some(" 42 "))).unwrap(), Value::Integer(42));
        assert_eq!(IntegerType::int().parse(&node(None)).unwrap(), Value::Null);
    }

    #[test]
    fn test_decimal_keeps_scale() {
        let codec = DecimalType;
        let value = codec.native_value(Some("12.50")).unwrap();
        assert_eq!(value, Value::Decimal(Decimal::new(1250, 2)));
        assert_eq!(codec.xml_value(&value).unwrap(), "12.50");
        assert_eq!(codec.default_value(), Value::Decimal(Decimal::ZERO));
    }

    #[test]
    fn test_float_special_values() {
        let codec = FloatType::double();
        assert_eq!(codec.native_value(Some("INF")).unwrap(), Value::Double(f64::INFINITY));
        assert_eq!(codec.xml_value(&Value::Double(f64::NEG_INFINITY)).unwrap(), "-INF");
        assert_eq!(codec.xml_value(&Value::Double(1.5)).unwrap(), "1.5");
        assert!(matches!(codec.native_value(Some("NaN")).unwrap(), Value::Double(v) if v.is_nan()));
        assert!(codec.native_value(Some("inf")).is_err());
        assert!(codec.native_value(Some("abc")).is_err());
    }

    #[test]
    fn test_datetime_codec() {
        let codec = DateTimeType;
        let value = codec.native_value(Some("2024-01-15T10:30:00+02:00")).unwrap();
        let expected = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 15, 10, 30, 0)
            .unwrap();
        assert_eq!(value, Value::DateTime(expected));
        assert_eq!(codec.xml_value(&value).unwrap(), "2024-01-15T10:30:00+02:00");

        let utc = codec.native_value(Some("2024-01-15T10:30:00Z")).unwrap();
        assert_eq!(codec.xml_value(&utc).unwrap(), "2024-01-15T10:30:00Z");

        let local = codec.native_value(Some("2024-01-15T10:30:00")).unwrap();
        assert!(matches!(local, Value::LocalDateTime(_)));
        assert_eq!(codec.xml_value(&local).unwrap(), "2024-01-15T10:30:00");

        assert!(codec.native_value(Some("yesterday")).is_err());
        assert_eq!(codec.default_value(), Value::Null);
    }

    #[test]
    fn test_date_and_time_codecs() {
        let date = DateType.native_value(Some("2023-12-31")).unwrap();
        assert_eq!(DateType.xml_value(&date).unwrap(), "2023-12-31");
        assert!(DateType.native_value(Some("2023-13-01")).is_err());

        let time = TimeType.native_value(Some("23:59:01")).unwrap();
        assert_eq!(TimeType.xml_value(&time).unwrap(), "23:59:01");
    }

    #[test]
    fn test_binary_codecs() {
        let b64 = Base64BinaryType;
        assert_eq!(b64.native_value(Some("aGVs\nbG8=")).unwrap(), Value::Binary(b"hello".to_vec()));
        assert_eq!(b64.xml_value(&Value::Binary(b"hello".to_vec())).unwrap(), "aGVsbG8=");
        assert_eq!(b64.native_value(None).unwrap(), Value::Binary(Vec::new()));
        assert!(b64.native_value(Some("!!")).is_err());

        let hex = HexBinaryType;
        assert_eq!(hex.native_value(Some("0fA0")).unwrap(), Value::Binary(vec![0x0f, 0xa0]));
        assert_eq!(hex.xml_value(&Value::Binary(vec![0x0f, 0xa0])).unwrap(), "0FA0");
        assert!(hex.native_value(Some("abc")).is_err());
    }

    #[test]
    fn test_any_uri_codec() {
        let codec = AnyUriType;
        assert_eq!(
            codec.native_value(Some("http://example.com/a?b=c")).unwrap(),
            Value::Uri("http://example.com/a?b=c".into())
        );
        assert_eq!(codec.native_value(Some("../relative")).unwrap(), Value::Uri("../relative".into()));
        assert!(codec.native_value(Some("http://exa mple.com")).is_err());
    }

    #[test]
    fn test_builtin_lookup() {
        assert_eq!(get_builtin_type("unsignedShort").map(|t| t.name()), Some("unsignedShort".to_string()));
        assert!(get_builtin_type("duration").is_none());

        let names: Vec<String> = builtin_types().iter().map(|t| t.name()).collect();
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(names.len(), unique.len());
    }

    #[test]
    fn test_render_sets_text() {
        let mut target = node(None);
        IntegerType::int().render(&mut target, &Value::Integer(-3)).unwrap();
        assert_eq!(target.text.as_deref(), Some("-3"));

        IntegerType::int().render(&mut target, &Value::Null).unwrap();
        assert_eq!(target.text, None);
    }

    proptest! {
        #[test]
        fn prop_integer_lexical_inverse(n in any::<i64>()) {
            let codec = IntegerType::integer();
            let text = n.to_string();
            let native = codec.native_value(Some(&text)).unwrap();
            prop_assert_eq!(codec.xml_value(&native).unwrap(), text);
        }

        #[test]
        fn prop_decimal_lexical_inverse(mantissa in -1_000_000_000i64..1_000_000_000, scale in 0u32..8) {
            let codec = DecimalType;
            let text = Decimal::new(mantissa, scale).to_string();
            let native = codec.native_value(Some(&text)).unwrap();
            prop_assert_eq!(codec.xml_value(&native).unwrap(), text);
        }

        #[test]
        fn prop_string_lexical_inverse(text in "[^<&]*") {
            let codec = StringType::string();
            let native = codec.native_value(Some(&text)).unwrap();
            prop_assert_eq!(codec.xml_value(&native).unwrap(), text);
        }
    }
}
