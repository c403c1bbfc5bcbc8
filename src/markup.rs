//! Minimal owned element tree built from the `quick-xml` event stream.
//!
//! Shared by the XML and DOCX adapters and the validator. Text directly inside an element is
//! concatenated into [`Element::text`]; children keep document order.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{FormatError, FormatResult};

/// An XML element with its attributes, direct text and child elements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    /// Qualified name as written (`w:p`, `xs:element`, `occurrence`).
    pub name: String,
    /// Attributes in document order, values unescaped.
    pub attributes: Vec<(String, String)>,
    /// Concatenated direct text content (not trimmed).
    pub text: String,
    /// Child elements in document order.
    pub children: Vec<Element>,
}

impl Element {
    /// Name without namespace prefix.
    pub fn local_name(&self) -> &str {
        local(&self.name)
    }

    /// Attribute value by qualified or local name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name || local(k) == name)
            .map(|(_, v)| v.as_str())
    }

    /// Children whose local name is `name`.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.local_name() == name)
    }

    /// First child whose local name is `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.local_name() == name)
    }

    /// All descendants (depth first, document order) whose local name is `name`.
    pub fn descendants_named<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut out = Vec::new();
        collect_named(self, name, &mut out);
        out
    }

    /// Returns `true` if the element has no child elements.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Direct text with surrounding whitespace removed.
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }
}

fn collect_named<'a>(el: &'a Element, name: &str, out: &mut Vec<&'a Element>) {
    for c in &el.children {
        if c.local_name() == name {
            out.push(c);
        }
        collect_named(c, name, out);
    }
}

/// Strip a namespace prefix from a qualified name.
pub fn local(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

/// A parsed document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Root element.
    pub root: Element,
}

/// Parse a complete XML document into an element tree.
///
/// Fails on malformed markup, mismatched end tags, more than one root element, or no root.
pub fn parse_document(input: &str) -> FormatResult<Document> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                ensure_single_root(&root, &stack)?;
                stack.push(element_from_start(&start)?);
            }
            Event::Empty(start) => {
                ensure_single_root(&root, &stack)?;
                let el = element_from_start(&start)?;
                attach(el, &mut stack, &mut root);
            }
            Event::End(_) => {
                let el = stack
                    .pop()
                    .ok_or_else(|| FormatError::invalid_document("unexpected end tag"))?;
                attach(el, &mut stack, &mut root);
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c).into_owned();
                push_text(&mut stack, &text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(FormatError::invalid_document(format!(
            "unclosed element <{}>",
            stack.last().map(|e| e.name.as_str()).unwrap_or_default()
        )));
    }
    let root = root.ok_or_else(|| FormatError::invalid_document("document has no root element"))?;
    Ok(Document { root })
}

fn ensure_single_root(root: &Option<Element>, stack: &[Element]) -> FormatResult<()> {
    if root.is_some() && stack.is_empty() {
        return Err(FormatError::invalid_document(
            "document has more than one root element",
        ));
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) -> FormatResult<()> {
    match stack.last_mut() {
        Some(el) => {
            el.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(FormatError::invalid_document("text outside of the root element")),
    }
}

fn attach(el: Element, stack: &mut [Element], root: &mut Option<Element>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(el),
        None => *root = Some(el),
    }
}

fn element_from_start(start: &BytesStart<'_>) -> FormatResult<Element> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}
