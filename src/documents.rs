//! XML element trees
//!
//! This module provides the node type that types render into and parse
//! from. Tags and attribute names are stored namespace-resolved so the
//! binding layer can match them by [`QName`] alone.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::namespaces::{NamespaceContext, QName};
use indexmap::IndexMap;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::path::Path;

/// XML Element in the document tree
#[derive(Debug, Clone)]
pub struct Element {
    /// Element qualified name
    pub qname: QName,
    /// Element attributes in document order
    pub attributes: IndexMap<QName, String>,
    /// Text content (if any)
    pub text: Option<String>,
    /// Child elements
    pub children: Vec<Element>,
    /// Namespace declarations made on this element
    pub namespaces: NamespaceContext,
}

// Namespace declarations are presentation only; trees compare by content.
impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.qname == other.qname
            && self.attributes == other.attributes
            && self.text == other.text
            && self.children == other.children
    }
}

impl Element {
    /// Create a new element
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            attributes: IndexMap::new(),
            text: None,
            children: Vec::new(),
            namespaces: NamespaceContext::new(),
        }
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.qname.local_name
    }

    /// Get the namespace of the element
    pub fn namespace(&self) -> Option<&str> {
        self.qname.namespace.as_deref()
    }

    /// Get an attribute value by local name, ignoring namespaces
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(qname, _)| qname.local_name == name)
            .map(|(_, value)| value.as_str())
    }

    /// Get an attribute value by qualified name
    pub fn get_attribute_qname(&self, qname: &QName) -> Option<&str> {
        self.attributes.get(qname).map(|s| s.as_str())
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attribute(&mut self, qname: QName, value: impl Into<String>) {
        self.attributes.insert(qname, value.into());
    }

    /// Add a child element
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Append a new empty child and return it for filling in
    pub fn append_child(&mut self, qname: QName) -> &mut Element {
        self.children.push(Element::new(qname));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Set text content
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// Find child elements by local name
    pub fn find_children(&self, local_name: &str) -> Vec<&Element> {
        self.children
            .iter()
            .filter(|e| e.local_name() == local_name)
            .collect()
    }

    /// Find the first child with the given qualified name
    pub fn find_child(&self, qname: &QName) -> Option<&Element> {
        self.children.iter().find(|e| &e.qname == qname)
    }

    /// Serialize this element and its subtree to XML text
    ///
    /// Every namespace used in the subtree is declared once on this element.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut prefixes = IndexMap::new();
        self.collect_namespaces(&mut prefixes);

        let mut writer = Writer::new(Vec::new());
        self.write_into(&mut writer, &prefixes, true)?;
        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::Xml(format!("Serialized XML is not UTF-8: {}", e)))
    }

    fn collect_namespaces(&self, prefixes: &mut IndexMap<String, String>) {
        let used = std::iter::once(&self.qname).chain(self.attributes.keys());
        for qname in used {
            let Some(ns) = qname.namespace() else { continue };
            if prefixes.contains_key(ns) {
                continue;
            }
            let prefix = if ns == crate::XML_NAMESPACE {
                "xml".to_string()
            } else {
                match self.namespaces.prefix_for(ns) {
                    Some(p) if !prefixes.values().any(|v| v == p) => p.to_string(),
                    _ => {
                        let mut index = prefixes.len();
                        loop {
                            let candidate = format!("ns{}", index);
                            if !prefixes.values().any(|v| *v == candidate) {
                                break candidate;
                            }
                            index += 1;
                        }
                    }
                }
            };
            prefixes.insert(ns.to_string(), prefix);
        }
        for child in &self.children {
            child.collect_namespaces(prefixes);
        }
    }

    fn prefixed(qname: &QName, prefixes: &IndexMap<String, String>) -> String {
        match qname.namespace().and_then(|ns| prefixes.get(ns)) {
            Some(prefix) => format!("{}:{}", prefix, qname.local_name),
            None => qname.local_name.clone(),
        }
    }

    fn write_into(
        &self,
        writer: &mut Writer<Vec<u8>>,
        prefixes: &IndexMap<String, String>,
        root: bool,
    ) -> Result<()> {
        let name = Self::prefixed(&self.qname, prefixes);
        let mut start = BytesStart::new(name.as_str());

        if root {
            for (ns, prefix) in prefixes {
                if ns == crate::XML_NAMESPACE {
                    continue;
                }
                let decl = format!("xmlns:{}", prefix);
                start.push_attribute((decl.as_str(), ns.as_str()));
            }
        }
        for (qname, value) in &self.attributes {
            let attr_name = Self::prefixed(qname, prefixes);
            start.push_attribute((attr_name.as_str(), value.as_str()));
        }

        if self.text.is_none() && self.children.is_empty() {
            return write_event(writer, Event::Empty(start));
        }

        write_event(writer, Event::Start(start))?;
        if let Some(ref text) = self.text {
            write_event(writer, Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write_into(writer, prefixes, false)?;
        }
        write_event(writer, Event::End(BytesEnd::new(name.as_str())))
    }

    fn from_roxmltree_node(node: roxmltree::Node, limits: &Limits, depth: usize) -> Result<Self> {
        limits.check_xml_depth(depth)?;

        let tag = node.tag_name();
        let mut element = Element::new(QName::new(tag.namespace(), tag.name()));

        limits.check_attributes(node.attributes().count())?;
        for attr in node.attributes() {
            element
                .attributes
                .insert(QName::new(attr.namespace(), attr.name()), attr.value().to_string());
        }

        if depth == 1 {
            for ns in node.namespaces() {
                match ns.name() {
                    Some(prefix) if prefix != "xml" => element.namespaces.add_prefix(prefix, ns.uri()),
                    Some(_) => {}
                    None => element.namespaces.set_default_namespace(ns.uri()),
                }
            }
        }

        for child in node.children() {
            if child.is_element() {
                element.add_child(Self::from_roxmltree_node(child, limits, depth + 1)?);
            } else if let Some(text) = child.text().filter(|_| child.is_text()) {
                append_text(&mut element, text);
            }
        }
        finish_text(&mut element);

        Ok(element)
    }
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Xml(format!("Failed to write XML: {}", e)))
}

fn append_text(element: &mut Element, text: &str) {
    if text.is_empty() {
        return;
    }
    match element.text {
        Some(ref mut existing) => existing.push_str(text),
        None => element.text = Some(text.to_string()),
    }
}

/// Drop indentation around child elements; leaf text is kept verbatim.
fn finish_text(element: &mut Element) {
    let indentation = element
        .text
        .as_deref()
        .is_some_and(|text| text.trim().is_empty());
    if indentation && !element.children.is_empty() {
        element.text = None;
    }
}

/// XML Document representation
#[derive(Debug, Default)]
pub struct Document {
    /// Root element of the document
    pub root: Option<Element>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing element tree
    pub fn with_root(root: Element) -> Self {
        Self { root: Some(root) }
    }

    /// Parse an XML document from a string
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse(xml.as_bytes(), &Limits::default())
    }

    /// Read and parse an XML document from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::parse(&bytes, &Limits::default())
    }

    /// Convert an already parsed roxmltree document
    pub fn from_roxmltree(doc: &roxmltree::Document, limits: &Limits) -> Result<Self> {
        let root = Element::from_roxmltree_node(doc.root_element(), limits, 1)?;
        Ok(Self::with_root(root))
    }

    /// Parse an XML document from bytes
    pub fn parse(xml: &[u8], limits: &Limits) -> Result<Self> {
        limits.check_xml_size(xml.len())?;

        let mut reader = Reader::from_reader(xml);
        let mut doc = Document::new();
        // Each open element is paired with the namespace scope in force for it.
        let mut element_stack: Vec<(Element, NamespaceContext)> = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    limits.check_xml_depth(element_stack.len() + 1)?;
                    let scope = element_stack
                        .last()
                        .map(|(_, scope)| scope.clone())
                        .unwrap_or_default();
                    let (element, scope) = Self::parse_element(&e, scope, limits)?;
                    element_stack.push((element, scope));
                }
                Ok(Event::End(_)) => {
                    if let Some((mut current, _)) = element_stack.pop() {
                        finish_text(&mut current);
                        match element_stack.last_mut() {
                            Some((parent, _)) => parent.add_child(current),
                            None => doc.root = Some(current),
                        }
                    }
                }
                Ok(Event::Empty(e)) => {
                    limits.check_xml_depth(element_stack.len() + 1)?;
                    let scope = element_stack
                        .last()
                        .map(|(_, scope)| scope.clone())
                        .unwrap_or_default();
                    let (element, _) = Self::parse_element(&e, scope, limits)?;
                    match element_stack.last_mut() {
                        Some((parent, _)) => parent.add_child(element),
                        None => doc.root = Some(element),
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some((current, _)) = element_stack.last_mut() {
                        let text = e
                            .unescape()
                            .map_err(|e| Error::Xml(format!("Failed to unescape text: {}", e)))?;
                        append_text(current, &text);
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some((current, _)) = element_stack.last_mut() {
                        let text = std::str::from_utf8(&e)
                            .map_err(|e| Error::Xml(format!("Invalid CDATA: {}", e)))?;
                        append_text(current, text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "Error parsing XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {} // Comments, processing instructions, doctype
            }
            buf.clear();
        }

        if !element_stack.is_empty() {
            return Err(Error::Xml("Unexpected end of document".to_string()));
        }

        Ok(doc)
    }

    /// Parse element from a start tag, returning it with its namespace scope
    fn parse_element(
        start: &BytesStart,
        mut scope: NamespaceContext,
        limits: &Limits,
    ) -> Result<(Element, NamespaceContext)> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| Error::Xml(format!("Invalid element name: {}", e)))?
            .to_string();

        let mut declared = NamespaceContext::new();
        let mut raw_attributes = Vec::new();

        for attr_result in start.attributes() {
            let attr = attr_result
                .map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;

            let attr_name = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| Error::Xml(format!("Invalid attribute name: {}", e)))?
                .to_string();

            let attr_value = attr
                .unescape_value()
                .map_err(|e| Error::Xml(format!("Failed to unescape attribute value: {}", e)))?
                .to_string();

            if attr_name == "xmlns" {
                scope.set_default_namespace(&attr_value);
                declared.set_default_namespace(&attr_value);
            } else if let Some(prefix) = attr_name.strip_prefix("xmlns:") {
                scope.add_prefix(prefix, &attr_value);
                declared.add_prefix(prefix, &attr_value);
            } else {
                raw_attributes.push((attr_name, attr_value));
            }
        }
        limits.check_attributes(raw_attributes.len())?;

        crate::names::validate_qname(&name)?;
        let mut element = Element::new(scope.resolve(&name)?);
        element.namespaces = declared;
        for (attr_name, attr_value) in raw_attributes {
            element
                .attributes
                .insert(scope.resolve_attribute(&attr_name)?, attr_value);
        }

        Ok((element, scope))
    }

    /// Get the root element
    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }

    /// Get the root element mutably
    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.root.as_mut()
    }

    /// Serialize the document to XML text
    pub fn to_xml_string(&self) -> Result<String> {
        match self.root {
            Some(ref root) => root.to_xml_string(),
            None => Err(Error::Xml("Document has no root element".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_xml() {
        let xml = r#"<root><child>text</child></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root.unwrap();
        assert_eq!(root.local_name(), "root");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].local_name(), "child");
        assert_eq!(root.children[0].text.as_deref(), Some("text"));
    }

    #[test]
    fn test_parse_with_attributes() {
        let xml = r#"<root attr1="value1" attr2="a &amp; b"><child/></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root.unwrap();
        assert_eq!(root.get_attribute("attr1"), Some("value1"));
        assert_eq!(root.get_attribute("attr2"), Some("a & b"));
    }

    #[test]
    fn test_parse_resolves_namespaces() {
        let xml = r#"<t:root xmlns:t="urn:t" xmlns="urn:d" t:id="1" plain="2">
                <child/>
                <t:other xmlns="">
                    <bare/>
                </t:other>
            </t:root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root.unwrap();
        assert_eq!(root.qname, QName::namespaced("urn:t", "root"));
        assert_eq!(root.get_attribute_qname(&QName::namespaced("urn:t", "id")), Some("1"));
        assert_eq!(root.get_attribute_qname(&QName::local("plain")), Some("2"));
        assert_eq!(root.children[0].qname, QName::namespaced("urn:d", "child"));
        assert_eq!(root.children[1].qname, QName::namespaced("urn:t", "other"));
        assert_eq!(root.children[1].children[0].qname, QName::local("bare"));
        assert_eq!(root.namespaces.get_namespace("t"), Some("urn:t"));
    }

    #[test]
    fn test_parse_unknown_prefix() {
        let err = Document::from_string("<x:root/>").unwrap_err();
        assert!(matches!(err, Error::Namespace(_)));
    }

    #[test]
    fn test_parse_depth_limit() {
        let limits = Limits::new().with_max_xml_depth(2);
        let err = Document::parse(b"<a><b><c/></b></a>", &limits).unwrap_err();
        assert!(matches!(err, Error::LimitExceeded(_)));
        assert!(Document::parse(b"<a><b/></a>", &limits).is_ok());
    }

    #[test]
    fn test_parse_truncated() {
        assert!(Document::from_string("<a><b></b>").is_err());
    }

    #[test]
    fn test_text_and_cdata() {
        let xml = "<root>\n  <a> padded </a>\n  <b><![CDATA[<raw>]]></b>\n  <c/>\n</root>";
        let root = Document::from_string(xml).unwrap().root.unwrap();
        assert_eq!(root.text, None);
        assert_eq!(root.children[0].text.as_deref(), Some(" padded "));
        assert_eq!(root.children[1].text.as_deref(), Some("<raw>"));
        assert_eq!(root.children[2].text, None);
    }

    #[test]
    fn test_serialize_declares_namespaces_on_root() {
        let mut root = Element::new(QName::namespaced("urn:t", "root"));
        root.set_attribute(QName::local("id"), "a<b");
        root.append_child(QName::namespaced("urn:t", "child")).set_text("x & y");
        root.append_child(QName::namespaced("urn:o", "other"));

        let xml = root.to_xml_string().unwrap();
        assert_eq!(
            xml,
            r#"<ns0:root xmlns:ns0="urn:t" xmlns:ns1="urn:o" id="a&lt;b"><ns0:child>x &amp; y</ns0:child><ns1:other/></ns0:root>"#
        );
    }

    #[test]
    fn test_serialize_reuses_declared_prefix() {
        let mut root = Element::new(QName::namespaced("urn:t", "root"));
        root.namespaces.add_prefix("tns", "urn:t");
        root.append_child(QName::local("plain"));

        let xml = root.to_xml_string().unwrap();
        assert_eq!(xml, r#"<tns:root xmlns:tns="urn:t"><plain/></tns:root>"#);
    }

    #[test]
    fn test_serialize_avoids_generated_prefix_clash() {
        let mut root = Element::new(QName::namespaced("urn:a", "root"));
        root.namespaces.add_prefix("ns1", "urn:a");
        root.append_child(QName::namespaced("urn:b", "child"));

        let xml = root.to_xml_string().unwrap();
        assert_eq!(
            xml,
            r#"<ns1:root xmlns:ns1="urn:a" xmlns:ns2="urn:b"><ns2:child/></ns1:root>"#
        );
        let again = Document::from_string(&xml).unwrap().root.unwrap();
        assert_eq!(again.qname, root.qname);
        assert_eq!(again.children[0].qname, QName::namespaced("urn:b", "child"));
    }

    #[test]
    fn test_whitespace_only_leaf_text_round_trips() {
        let mut root = Element::new(QName::local("root"));
        root.append_child(QName::local("s")).set_text("   ");

        let xml = root.to_xml_string().unwrap();
        let again = Document::from_string(&xml).unwrap().root.unwrap();
        assert_eq!(again.children[0].text.as_deref(), Some("   "));

        let rox = roxmltree::Document::parse(&xml).unwrap();
        let converted = Document::from_roxmltree(&rox, &Limits::default()).unwrap();
        assert_eq!(converted.root.unwrap().children[0].text.as_deref(), Some("   "));
    }

    #[test]
    fn test_serialize_then_parse() {
        let xml = r#"<a:root xmlns:a="urn:a"><a:item n="1">one</a:item><a:item n="2"/></a:root>"#;
        let doc = Document::from_string(xml).unwrap();
        let again = Document::from_string(&doc.to_xml_string().unwrap()).unwrap();
        assert_eq!(doc.root, again.root);
    }

    #[test]
    fn test_from_roxmltree() {
        let xml = r#"<r:root xmlns:r="urn:r" a="1"><r:item>v</r:item></r:root>"#;
        let rox = roxmltree::Document::parse(xml).unwrap();
        let doc = Document::from_roxmltree(&rox, &Limits::default()).unwrap();

        let root = doc.root.unwrap();
        assert_eq!(root.qname, QName::namespaced("urn:r", "root"));
        assert_eq!(root.get_attribute("a"), Some("1"));
        assert_eq!(root.find_child(&QName::namespaced("urn:r", "item")).and_then(|c| c.text.as_deref()), Some("v"));
        assert_eq!(root.namespaces.get_namespace("r"), Some("urn:r"));
        assert_eq!(root, Document::from_string(xml).unwrap().root.unwrap());
    }

    #[test]
    fn test_find_children() {
        let xml = r#"<root><child1/><child2/><child1/></root>"#;
        let root = Document::from_string(xml).unwrap().root.unwrap();
        assert_eq!(root.find_children("child1").len(), 2);
    }
}
