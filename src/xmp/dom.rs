//! Minimal namespace-aware XML tree
//!
//! Just enough of a document model to merge RDF descriptions: elements carry
//! resolved namespace URIs so nodes can move between documents, and the
//! serializer re-declares whatever prefixes a moved node needs.

use std::borrow::Cow;

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::{QName, ResolveResult};
use quick_xml::reader::NsReader;
use quick_xml::Writer;

use log::warn;

use crate::errors::{MetadataError, MetadataResult};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Namespace bound to the reserved `xml` prefix
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Expanded element or attribute name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlName {
    /// Namespace URI, if the name is bound to one
    pub namespace: Option<String>,
    /// Prefix used in the source document
    pub prefix: Option<String>,
    pub local: String,
}

impl XmlName {
    pub fn new(namespace: Option<&str>, prefix: Option<&str>, local: &str) -> Self {
        XmlName {
            namespace: namespace.map(str::to_string),
            prefix: prefix.map(str::to_string),
            local: local.to_string(),
        }
    }

    /// Compares namespace and local name, ignoring the prefix
    pub fn matches(&self, namespace: &str, local: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local == local
    }

    /// Same expanded name as `other`
    pub fn same_as(&self, other: &XmlName) -> bool {
        self.namespace == other.namespace && self.local == other.local
    }

    fn qualified(&self) -> Cow<'_, str> {
        match &self.prefix {
            Some(prefix) => Cow::Owned(format!("{}:{}", prefix, self.local)),
            None => Cow::Borrowed(&self.local),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: XmlName,
    pub value: String,
}

/// Namespace declaration; a `None` prefix is the default namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    pub prefix: Option<String>,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    /// Processing instruction content between `<?` and `?>`
    ProcessingInstruction(String),
    /// XML declaration content between `<?` and `?>`
    Declaration(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: XmlName,
    pub namespaces: Vec<NamespaceDecl>,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlNode>,
}

impl Element {
    pub fn new(name: XmlName) -> Self {
        Element {
            name,
            namespaces: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attribute(&self, namespace: &str, local: &str) -> Option<&XmlAttribute> {
        self.attributes.iter().find(|a| a.name.matches(namespace, local))
    }

    /// Attribute with the same expanded name as `name`
    pub fn attribute_named(&self, name: &XmlName) -> Option<&XmlAttribute> {
        self.attributes.iter().find(|a| a.name.same_as(name))
    }

    /// Removes matching attributes, returning whether any existed
    pub fn remove_attribute(&mut self, namespace: &str, local: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|a| !a.name.matches(namespace, local));
        self.attributes.len() != before
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn child(&self, namespace: &str, local: &str) -> Option<&Element> {
        self.child_elements().find(|e| e.name.matches(namespace, local))
    }

    pub fn child_mut(&mut self, namespace: &str, local: &str) -> Option<&mut Element> {
        self.child_elements_mut().find(|e| e.name.matches(namespace, local))
    }

    /// First child element with the same expanded name as `name`
    pub fn child_named(&self, name: &XmlName) -> Option<&Element> {
        self.child_elements().find(|e| e.name.same_as(name))
    }

    /// Removes matching child elements, returning whether any existed
    pub fn remove_children(&mut self, namespace: &str, local: &str) -> bool {
        let before = self.children.len();
        self.children.retain(|node| !matches!(node, XmlNode::Element(e) if e.name.matches(namespace, local)));
        self.children.len() != before
    }

    /// Concatenated text of all descendants
    pub fn text_value(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Text(t) | XmlNode::CData(t) => out.push_str(t),
                XmlNode::Element(e) => e.collect_text(out),
                _ => {}
            }
        }
    }
}

/// Parsed document: the root element plus whatever surrounds it
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    pub prolog: Vec<XmlNode>,
    pub root: Element,
    pub epilog: Vec<XmlNode>,
}

/// Removes whitespace-only text between child elements
pub(crate) fn drop_indentation(element: &mut Element) {
    let has_elements = element.children.iter().any(|child| matches!(child, XmlNode::Element(_)));
    if has_elements {
        element.children.retain(|child| !matches!(child, XmlNode::Text(text) if text.trim().is_empty()));
    }
}

impl XmlDocument {
    /// Parses UTF-8 XML bytes
    ///
    /// Whitespace-only text is dropped from elements that have element
    /// children and kept as the value of leaf elements. Any well-formedness problem,
    /// including an undeclared prefix, is a `MalformedXml` error.
    pub fn parse(bytes: &[u8]) -> MetadataResult<Self> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut reader = NsReader::from_reader(bytes);
        let mut buf = Vec::new();

        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut root: Option<Element> = None;
        let mut stack: Vec<Element> = Vec::new();

        loop {
            let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
            let namespace = match &event {
                Event::Start(start) | Event::Empty(start) => namespace_of(resolved, start.name())?,
                _ => None,
            };

            let node = match event {
                Event::Start(start) | Event::Empty(start) if root.is_some() && stack.is_empty() => {
                    return Err(MetadataError::MalformedXml(format!(
                        "second root element <{}>",
                        String::from_utf8_lossy(start.name().as_ref())
                    )));
                }
                Event::Start(start) => {
                    stack.push(read_element(&reader, namespace, &start)?);
                    None
                }
                Event::Empty(start) => Some(XmlNode::Element(read_element(&reader, namespace, &start)?)),
                Event::End(_) => match stack.pop() {
                    Some(mut element) => {
                        drop_indentation(&mut element);
                        Some(XmlNode::Element(element))
                    }
                    None => return Err(MetadataError::MalformedXml("unexpected closing tag".to_string())),
                },
                Event::Text(text) => {
                    let value = text.unescape()?;
                    if stack.is_empty() {
                        if !value.trim().is_empty() {
                            return Err(MetadataError::MalformedXml("text outside the root element".to_string()));
                        }
                        None
                    } else {
                        Some(XmlNode::Text(value.into_owned()))
                    }
                }
                Event::CData(data) => Some(XmlNode::CData(String::from_utf8_lossy(&data).into_owned())),
                Event::Comment(comment) => Some(XmlNode::Comment(String::from_utf8_lossy(&comment).into_owned())),
                Event::PI(pi) => Some(XmlNode::ProcessingInstruction(String::from_utf8_lossy(&pi).into_owned())),
                Event::Decl(decl) => Some(XmlNode::Declaration(String::from_utf8_lossy(&decl).into_owned())),
                Event::DocType(_) => None,
                Event::Eof => break,
            };

            if let Some(node) = node {
                match (stack.last_mut(), node) {
                    (Some(parent), node) => parent.children.push(node),
                    (None, XmlNode::Element(element)) => root = Some(element),
                    (None, node) if root.is_none() => prolog.push(node),
                    (None, node) => epilog.push(node),
                }
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(MetadataError::MalformedXml("unexpected end of document".to_string()));
        }

        let root = root.ok_or_else(|| MetadataError::MalformedXml("document has no root element".to_string()))?;
        Ok(XmlDocument { prolog, root, epilog })
    }

    /// Serializes the document as UTF-8
    pub fn to_bytes(&self) -> MetadataResult<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 1);

        for node in &self.prolog {
            write_node(&mut writer, node, &mut Vec::new())?;
            writer.get_mut().push(b'\n');
        }

        write_element(&mut writer, &self.root, &mut Vec::new())?;

        for node in &self.epilog {
            writer.get_mut().push(b'\n');
            write_node(&mut writer, node, &mut Vec::new())?;
        }

        Ok(writer.into_inner())
    }
}

fn namespace_of(resolved: ResolveResult<'_>, name: QName<'_>) -> MetadataResult<Option<String>> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.as_ref()).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) if prefix == b"xml" => Ok(Some(XML_NAMESPACE.to_string())),
        ResolveResult::Unknown(prefix) => Err(MetadataError::MalformedXml(format!(
            "undeclared prefix '{}' in <{}>",
            String::from_utf8_lossy(&prefix),
            String::from_utf8_lossy(name.as_ref())
        ))),
    }
}

fn split_name(name: QName<'_>) -> (Option<String>, String) {
    let prefix = name.prefix().map(|p| String::from_utf8_lossy(p.as_ref()).into_owned());
    let local = String::from_utf8_lossy(name.local_name().as_ref()).into_owned();
    (prefix, local)
}

fn read_element(reader: &NsReader<&[u8]>, namespace: Option<String>, start: &BytesStart<'_>) -> MetadataResult<Element> {
    let (prefix, local) = split_name(start.name());
    let mut element = Element::new(XmlName { namespace, prefix, local });

    for attr in start.attributes() {
        let attr: Attribute = attr.map_err(|e| MetadataError::MalformedXml(e.to_string()))?;
        let value = attr.unescape_value()?.into_owned();

        if attr.key.as_ref() == b"xmlns" {
            element.namespaces.push(NamespaceDecl { prefix: None, uri: value });
            continue;
        }
        if let Some(declared) = attr.key.as_ref().strip_prefix(b"xmlns:") {
            element.namespaces.push(NamespaceDecl {
                prefix: Some(String::from_utf8_lossy(declared).into_owned()),
                uri: value,
            });
            continue;
        }

        let (attr_resolved, _) = reader.resolve_attribute(attr.key);
        let namespace = namespace_of(attr_resolved, attr.key)?;
        let (prefix, local) = split_name(attr.key);
        element.attributes.push(XmlAttribute { name: XmlName { namespace, prefix, local }, value });
    }

    Ok(element)
}

/// Prefix bindings in scope while writing
type Scope = Vec<(Option<String>, String)>;

fn lookup<'s>(scope: &'s Scope, prefix: &Option<String>) -> Option<&'s str> {
    scope.iter().rev().find(|(p, _)| p == prefix).map(|(_, uri)| uri.as_str())
}

/// Declarations `element` has to carry so every name it uses is bound
fn required_declarations(element: &Element, scope: &Scope) -> Vec<NamespaceDecl> {
    let mut declarations = element.namespaces.clone();

    let names = std::iter::once(&element.name).chain(element.attributes.iter().map(|a| &a.name));
    for name in names {
        let Some(namespace) = &name.namespace else {
            continue;
        };
        if name.prefix.as_deref() == Some("xml") {
            continue;
        }

        let declared_here = declarations.iter().find(|d| d.prefix == name.prefix).map(|d| d.uri.as_str());
        match declared_here {
            Some(uri) if uri == namespace => {}
            Some(uri) => warn!("Prefix {:?} is bound to both {} and {}", name.prefix, uri, namespace),
            None if lookup(scope, &name.prefix) == Some(namespace.as_str()) => {}
            None => declarations.push(NamespaceDecl { prefix: name.prefix.clone(), uri: namespace.clone() }),
        }
    }

    declarations
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element, scope: &mut Scope) -> MetadataResult<()> {
    let declarations = required_declarations(element, scope);
    let name = element.name.qualified();
    let mut start = BytesStart::new(name.as_ref());

    for declaration in &declarations {
        let key = match &declaration.prefix {
            Some(prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        };
        start.push_attribute((key.as_str(), declaration.uri.as_str()));
    }
    for attribute in &element.attributes {
        start.push_attribute((attribute.name.qualified().as_ref(), attribute.value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    let depth = scope.len();
    scope.extend(declarations.into_iter().map(|d| (d.prefix, d.uri)));

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child, scope)?;
    }
    writer.write_event(Event::End(BytesEnd::new(name.as_ref())))?;

    scope.truncate(depth);
    Ok(())
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode, scope: &mut Scope) -> MetadataResult<()> {
    match node {
        XmlNode::Element(element) => write_element(writer, element, scope)?,
        XmlNode::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        XmlNode::CData(data) => writer.write_event(Event::CData(BytesCData::new(data.as_str())))?,
        XmlNode::Comment(comment) => writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))?,
        XmlNode::ProcessingInstruction(content) | XmlNode::Declaration(content) => {
            let out = writer.get_mut();
            out.extend_from_slice(b"<?");
            out.extend_from_slice(content.as_bytes());
            out.extend_from_slice(b"?>");
        }
    }
    Ok(())
}
