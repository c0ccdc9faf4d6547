//! Simple type codecs
//!
//! A simple type converts between the lexical (text) form found in XML
//! and a native [`Value`]. `xml_value` and `native_value` form an inverse
//! pair over each codec's canonical lexical space.
//!
//! See: https://www.w3.org/TR/xmlschema-2/

use std::fmt;

use crate::arguments::Arguments;
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::namespaces::QName;
use crate::types::builtins::XSD_NAMESPACE;
use crate::values::Value;

/// White space handling of a lexical value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhiteSpace {
    /// Keep the text as is
    #[default]
    Preserve,
    /// Replace tabs, newlines and carriage returns with spaces
    Replace,
    /// Replace, then collapse runs of spaces and trim
    Collapse,
}

impl WhiteSpace {
    /// Normalize a lexical value
    pub fn normalize(&self, value: &str) -> String {
        match self {
            WhiteSpace::Preserve => value.to_string(),
            WhiteSpace::Replace => value.replace(|c: char| matches!(c, '\t' | '\n' | '\r'), " "),
            WhiteSpace::Collapse => value.split_whitespace().collect::<Vec<_>>().join(" "),
        }
    }
}

/// Contract for all simple type codecs
///
/// Concrete codecs override `xml_value` and `native_value`; the defaults
/// fail with a not-implemented error.
pub trait SimpleType: fmt::Debug + Send + Sync {
    /// Local name of the type
    fn name(&self) -> &str;

    /// Qualified name of the type
    fn qname(&self) -> QName {
        QName::namespaced(XSD_NAMESPACE, self.name())
    }

    /// White space handling applied before `native_value` parses text
    fn white_space(&self) -> WhiteSpace {
        WhiteSpace::Collapse
    }

    /// Convert a native value to its lexical form
    fn xml_value(&self, value: &Value) -> Result<String> {
        let _ = value;
        Err(Error::NotImplemented(format!("{}.xml_value", self.name())))
    }

    /// Convert lexical text to a native value
    ///
    /// `None` means the element had no text content.
    fn native_value(&self, text: Option<&str>) -> Result<Value> {
        let _ = text;
        Err(Error::NotImplemented(format!("{}.native_value", self.name())))
    }

    /// Canonical empty value returned by the zero-argument constructor
    fn default_value(&self) -> Value {
        Value::String(String::new())
    }

    /// Check whether a value can be rendered
    fn accept(&self, value: &Value) -> bool {
        value.is_null() || self.xml_value(value).is_ok()
    }

    /// Invoke the codec as a constructor
    ///
    /// No arguments yield [`SimpleType::default_value`]; one positional
    /// argument yields its string form.
    fn call(&self, args: Arguments) -> Result<Value> {
        if !args.keyword.is_empty() {
            return Err(Error::Argument(format!(
                "{}() takes no keyword arguments",
                self.name()
            )));
        }
        let mut positional = args.positional.into_iter();
        match (positional.next(), positional.next()) {
            (None, _) => Ok(self.default_value()),
            (Some(arg), None) => Ok(Value::String(arg.to_string())),
            (Some(_), Some(_)) => Err(Error::Argument(format!(
                "{}() takes at most 1 positional argument",
                self.name()
            ))),
        }
    }

    /// Set the node's text to the lexical form of `value`
    ///
    /// A null value leaves the node without text.
    fn render(&self, node: &mut Element, value: &Value) -> Result<()> {
        node.text = match value {
            Value::Null => None,
            other => Some(self.xml_value(other)?),
        };
        Ok(())
    }

    /// Parse the node's text
    fn parse(&self, node: &Element) -> Result<Value> {
        match node.text.as_deref() {
            Some(text) => self.native_value(Some(&self.white_space().normalize(text))),
            None => self.native_value(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Abstract;

    impl SimpleType for Abstract {
        fn name(&self) -> &str {
            "abstract"
        }
    }

    #[test]
    fn test_white_space_normalize() {
        assert_eq!(WhiteSpace::Preserve.normalize(" a\tb "), " a\tb ");
        assert_eq!(WhiteSpace::Replace.normalize(" a\tb\n"), " a b ");
        assert_eq!(WhiteSpace::Collapse.normalize("  a \t b\n"), "a b");
    }

    #[test]
    fn test_abstract_codec_not_implemented() {
        let codec = Abstract;
        assert!(matches!(codec.xml_value(&Value::Integer(1)), Err(Error::NotImplemented(_))));
        assert!(matches!(codec.native_value(Some("1")), Err(Error::NotImplemented(_))));

        let mut node = Element::new(QName::local("n"));
        node.set_text("1");
        assert!(matches!(codec.parse(&node), Err(Error::NotImplemented(_))));
        assert!(matches!(codec.render(&mut node, &Value::Integer(1)), Err(Error::NotImplemented(_))));
        assert!(!codec.accept(&Value::Integer(1)));
    }

    #[test]
    fn test_call_arguments() {
        let codec = Abstract;
        assert_eq!(codec.call(Arguments::new()).unwrap(), Value::String(String::new()));
        assert_eq!(codec.call(Arguments::new().arg(42)).unwrap(), Value::String("42".into()));
        assert!(matches!(codec.call(Arguments::new().arg(1).arg(2)), Err(Error::Argument(_))));
        assert!(matches!(codec.call(Arguments::new().kwarg("x", 1)), Err(Error::Argument(_))));
        assert_eq!(codec.qname(), QName::namespaced(XSD_NAMESPACE, "abstract"));
    }
}
