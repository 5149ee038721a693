use std::fs;
use std::io::Read;
use std::path::Path;
use std::str;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use log::{debug, error};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader as XmlReader;
use serde_json::Value;

use crate::core::item::{Document, Item};
use crate::error::ImportError;

/// Name of the item element when none is configured.
pub const DEFAULT_NODE_NAME: &str = "item";

/// A builder for loading XML documents as item sequences.
///
/// Every element named like the configured node, at any depth and in
/// document order, becomes one [`Item`]. Each child element of that node
/// becomes a field whose value is the child's inner markup, i.e. the child
/// serialized back to XML with its own enclosing tag removed.
///
/// # Examples
///
/// ```
/// use model_importer::item::xml::XmlDocumentReaderBuilder;
/// use serde_json::json;
///
/// let xml = r#"
/// <catalog>
///   <product>
///     <name>Wireless Headphones</name>
///     <description>Noise-cancelling <b>wireless</b> headphones</description>
///   </product>
///   <product>
///     <name>USB-C Cable</name>
///   </product>
/// </catalog>
/// "#;
///
/// let document = XmlDocumentReaderBuilder::new()
///     .node_name("product")
///     .from_str(xml)
///     .unwrap();
///
/// assert_eq!(document.len(), 2);
/// let first = &document.items()[0];
/// assert_eq!(first.get("name"), Some(&json!("Wireless Headphones")));
/// assert_eq!(
///     first.get("description"),
///     Some(&json!("Noise-cancelling <b>wireless</b> headphones"))
/// );
/// ```
#[derive(Debug, Clone)]
pub struct XmlDocumentReaderBuilder {
    node_name: String,
}

impl Default for XmlDocumentReaderBuilder {
    fn default() -> Self {
        Self {
            node_name: DEFAULT_NODE_NAME.to_string(),
        }
    }
}

impl XmlDocumentReaderBuilder {
    /// Creates a builder selecting `<item>` elements.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tag name of the elements to import.
    pub fn node_name<S: AsRef<str>>(mut self, node_name: S) -> Self {
        self.node_name = node_name.as_ref().to_string();
        self
    }

    /// Parses `content` and collects the matching nodes.
    ///
    /// An empty document is returned when the XML is valid but holds no
    /// matching node; deciding whether that is an error is up to the caller.
    pub fn from_str(&self, content: &str) -> Result<Document, ImportError> {
        let root = parse_tree(content)?;

        let mut nodes = Vec::new();
        root.collect_named(&self.node_name, &mut nodes);
        debug!("Found {} '{}' nodes", nodes.len(), self.node_name);

        Ok(Document::new(nodes.into_iter().map(to_item).collect()))
    }

    /// Reads the whole of `rdr`, decodes it and parses it.
    ///
    /// The encoding comes from a byte order mark, else from the XML
    /// declaration, else UTF-8.
    pub fn from_reader<R: Read>(&self, mut rdr: R) -> Result<Document, ImportError> {
        let mut bytes = Vec::new();
        rdr.read_to_end(&mut bytes).map_err(|e| {
            error!("Failed to read XML content: {}", e);
            ImportError::InvalidXml(e.to_string())
        })?;
        self.from_str(&decode(&bytes)?)
    }

    /// Loads, decodes and parses the file at `path`.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Document, ImportError> {
        let file_path = path.as_ref();
        let bytes = fs::read(file_path).map_err(|e| {
            error!("Failed to read XML file {}: {}", file_path.display(), e);
            ImportError::InvalidXml(format!(
                "Failed to read XML file {}: {}",
                file_path.display(),
                e
            ))
        })?;
        self.from_str(&decode(&bytes)?)
    }
}

fn decode(bytes: &[u8]) -> Result<String, ImportError> {
    let encoding = match Encoding::for_bom(bytes) {
        Some((encoding, _)) => encoding,
        None => declared_encoding(bytes).unwrap_or(UTF_8),
    };

    let (content, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(invalid(format!("Content is not valid {}", used.name())));
    }
    debug!("Decoded XML content as {}", used.name());
    Ok(content.into_owned())
}

/// Encoding named by the XML declaration, if any.
///
/// Without a byte order mark the declaration was readable as ASCII, so a
/// declared UTF-16 is read as UTF-8.
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let mut reader = XmlReader::from_reader(bytes);
    let mut buf = Vec::new();

    let Ok(Event::Decl(decl)) = reader.read_event_into(&mut buf) else {
        return None;
    };
    let label = decl.encoding()?.ok()?;
    let encoding = Encoding::for_label(&label)?;

    if encoding == UTF_16LE || encoding == UTF_16BE {
        Some(UTF_8)
    } else {
        Some(encoding)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum XmlNode {
    Element(XmlElement),
    /// Raw, still escaped, character data.
    Text(String),
    CData(String),
    Comment(String),
    Instruction(String),
}

#[derive(Debug, Clone, PartialEq)]
struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    fn from_start(start: &BytesStart) -> Result<Self, ImportError> {
        let name = utf8(start.name().as_ref())?.to_string();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| invalid(format!("Malformed attribute: {}", e)))?;
            let key = utf8(attr.key.as_ref())?.to_string();
            let value = utf8(attr.value.as_ref())?.to_string();
            attributes.push((key, value));
        }

        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    fn push_text(&mut self, text: &str) {
        if let Some(XmlNode::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(XmlNode::Text(text.to_string()));
        }
    }

    /// Drops whitespace-only text children of element-only content. Mixed
    /// content, where some text child is not blank, is left untouched.
    fn drop_blanks(&mut self) {
        let mixed = self.children.iter().any(|child| match child {
            XmlNode::Text(text) => !text.trim().is_empty(),
            _ => false,
        });
        if mixed {
            return;
        }
        self.children
            .retain(|child| !matches!(child, XmlNode::Text(_)));
    }

    /// Pre-order walk collecting every element named `name`, self included.
    fn collect_named<'e>(&'e self, name: &str, found: &mut Vec<&'e XmlElement>) {
        if self.name == name {
            found.push(self);
        }
        for child in &self.children {
            if let XmlNode::Element(element) = child {
                element.collect_named(name, found);
            }
        }
    }

    fn write_markup(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&value.replace('"', "&quot;"));
            out.push('"');
        }

        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        self.write_inner_markup(out);
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    /// Serializes the children only, so exactly one layer, this element's
    /// own tag, is left out.
    fn write_inner_markup(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Element(element) => element.write_markup(out),
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::CData(data) => {
                    out.push_str("<![CDATA[");
                    out.push_str(data);
                    out.push_str("]]>");
                }
                XmlNode::Comment(comment) => {
                    out.push_str("<!--");
                    out.push_str(comment);
                    out.push_str("-->");
                }
                XmlNode::Instruction(content) => {
                    out.push_str("<?");
                    out.push_str(content);
                    out.push_str("?>");
                }
            }
        }
    }

    fn inner_markup(&self) -> String {
        let mut out = String::new();
        self.write_inner_markup(&mut out);
        out
    }
}

fn to_item(node: &XmlElement) -> Item {
    node.children
        .iter()
        .filter_map(|child| match child {
            XmlNode::Element(field) => Some((field.name.as_str(), Value::String(field.inner_markup()))),
            _ => None,
        })
        .collect()
}

fn invalid<S: Into<String>>(detail: S) -> ImportError {
    let detail = detail.into();
    debug!("Invalid XML: {}", detail);
    ImportError::InvalidXml(detail)
}

fn utf8(bytes: &[u8]) -> Result<&str, ImportError> {
    str::from_utf8(bytes).map_err(|e| invalid(format!("Invalid UTF-8: {}", e)))
}

/// Builds the element tree of a whole document.
///
/// The document must hold exactly one root element; only blanks, comments,
/// processing instructions, the declaration and a doctype may surround it.
fn parse_tree(content: &str) -> Result<XmlElement, ImportError> {
    let content = content.trim_start_matches('\u{feff}');
    let mut reader = XmlReader::from_str(content);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| invalid(format!("XML parsing error at {}: {}", reader.buffer_position(), e)))?;

        match event {
            Event::Start(ref start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(invalid("Extra content at the end of the document"));
                }
                stack.push(XmlElement::from_start(start)?);
            }
            Event::Empty(ref start) => {
                let element = XmlElement::from_start(start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Element(element)),
                    None if root.is_none() => root = Some(element),
                    None => return Err(invalid("Extra content at the end of the document")),
                }
            }
            Event::End(_) => {
                let mut element = stack
                    .pop()
                    .ok_or_else(|| invalid("Unexpected closing tag"))?;
                element.drop_blanks();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Element(element)),
                    None => root = Some(element),
                }
            }
            Event::Text(ref text) => {
                let text = utf8(text.as_ref())?;
                match stack.last_mut() {
                    Some(parent) => parent.push_text(text),
                    None if text.trim().is_empty() => {}
                    None => return Err(invalid("Text outside of the root element")),
                }
            }
            Event::GeneralRef(ref reference) => {
                let name = utf8(reference.as_ref())?;
                match stack.last_mut() {
                    Some(parent) => parent.push_text(&format!("&{};", name)),
                    None => return Err(invalid("Entity reference outside of the root element")),
                }
            }
            Event::CData(ref data) => {
                let data = utf8(data.as_ref())?.to_string();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::CData(data)),
                    None => return Err(invalid("CDATA outside of the root element")),
                }
            }
            Event::Comment(ref comment) => {
                if let Some(parent) = stack.last_mut() {
                    parent
                        .children
                        .push(XmlNode::Comment(utf8(comment.as_ref())?.to_string()));
                }
            }
            Event::PI(ref instruction) => {
                if let Some(parent) = stack.last_mut() {
                    parent
                        .children
                        .push(XmlNode::Instruction(utf8(instruction.as_ref())?.to_string()));
                }
            }
            Event::Eof => break,
            // declaration and doctype
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(invalid(format!("Premature end of data in tag {}", open.name)));
    }

    let mut root = root.ok_or_else(|| invalid("Document is empty"))?;
    root.drop_blanks();
    Ok(root)
}
