// src/opml/document.rs
// =============================================================================
// This module loads an OPML file into an in-memory tree and writes it back.
//
// OPML is plain XML:
//   <opml version="2.0">
//     <head><title>My feeds</title></head>
//     <body>
//       <outline text="Tech">                         <- folder
//         <outline text="LWN" xmlUrl="https://..."/>  <- feed entry
//       </outline>
//     </body>
//   </opml>
//
// We use the `quick-xml` crate which:
// - Reads XML as a stream of events (start tag, text, end tag, ...)
// - Writes the same kind of events back out
//
// quick-xml has no tree of its own, so we build one from the events.
// We keep every node we read (text, comments, the <head> section, ...)
// so the file looks the same after a rewrite, minus the removed feeds.
// =============================================================================

use crate::error::{OpmlError, OpmlResult};
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::path::Path;
use tracing::debug;

// One node of the document tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Character data, stored unescaped
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

// An XML element with its attributes (in document order) and children
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            ..Default::default()
        }
    }

    // Returns the value of an attribute, if present
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    // Iterates over child elements only (skips text, comments, ...)
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    // An outline with at least one child element is a folder
    pub fn has_child_elements(&self) -> bool {
        self.child_elements().next().is_some()
    }

    #[cfg(test)]
    pub fn find_child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|element| element.name == name)
    }

    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(element) if element.name == name => Some(element),
            _ => None,
        })
    }

    // Counts all descendant elements (not including self)
    pub fn descendant_count(&self) -> usize {
        self.child_elements()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }
}

// Builders for constructing trees in tests
#[cfg(test)]
impl Element {
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }
}

// A whole parsed document
//
// prolog = comments/doctype before the root element
// epilog = comments after the root element
// The XML declaration is not stored: we always write our own.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub prolog: Vec<Node>,
    pub root: Element,
    pub epilog: Vec<Node>,
}

impl Document {
    // Reads and parses a document from disk
    pub fn load(path: &Path) -> OpmlResult<Self> {
        let xml = std::fs::read_to_string(path).map_err(|source| OpmlError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&xml)
    }

    // Parses a document from a string
    //
    // Fails unless the input is well-formed: one root element, every tag
    // closed, valid attributes and escapes.
    pub fn parse(xml: &str) -> OpmlResult<Self> {
        let mut reader = Reader::from_str(xml);

        // Elements that have been opened but not closed yet
        let mut stack: Vec<Element> = Vec::new();
        let mut tree = TreeBuilder::default();

        loop {
            let position = reader.buffer_position();
            let xml_error = |source| OpmlError::Xml { position, source };

            let event = reader.read_event().map_err(xml_error)?;

            let node = match event {
                Event::Start(start) => {
                    stack.push(element_from_start(&start, position)?);
                    continue;
                }
                Event::Empty(start) => Node::Element(element_from_start(&start, position)?),
                Event::End(_) => match stack.pop() {
                    Some(element) => Node::Element(element),
                    None => {
                        return Err(OpmlError::Malformed {
                            position,
                            reason: "closing tag without an opening tag".to_string(),
                        })
                    }
                },
                Event::Text(text) => Node::Text(text.unescape().map_err(xml_error)?.into_owned()),
                Event::CData(data) => Node::CData(std::str::from_utf8(&data)?.to_string()),
                Event::Comment(text) => Node::Comment(std::str::from_utf8(&text)?.to_string()),
                Event::PI(text) => {
                    Node::ProcessingInstruction(std::str::from_utf8(&text)?.to_string())
                }
                Event::DocType(text) => Node::DocType(std::str::from_utf8(&text)?.to_string()),
                // We write our own declaration on save
                Event::Decl(_) => continue,
                Event::Eof => break,
            };

            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => tree.push_top_level(node, position)?,
            }
        }

        if let Some(open) = stack.last() {
            return Err(OpmlError::Malformed {
                position: reader.buffer_position(),
                reason: format!("element <{}> is never closed", open.name),
            });
        }

        let document = tree.finish(reader.buffer_position())?;
        debug!(
            root = %document.root.name,
            elements = document.root.descendant_count(),
            "parsed document"
        );
        Ok(document)
    }

    #[cfg(test)]
    pub fn body(&self) -> Option<&Element> {
        self.root.find_child("body")
    }

    pub fn body_mut(&mut self) -> Option<&mut Element> {
        self.root.find_child_mut("body")
    }

    // Serializes the document, starting with a UTF-8 XML declaration
    pub fn to_xml(&self) -> OpmlResult<String> {
        let mut writer = Writer::new(Vec::new());

        write_document(&mut writer, self).map_err(OpmlError::Serialize)?;

        let bytes = writer.into_inner();
        String::from_utf8(bytes).map_err(|e| OpmlError::Utf8(e.utf8_error()))
    }

    // Overwrites `path` with the serialized document (no backup)
    pub fn save(&self, path: &Path) -> OpmlResult<()> {
        let xml = self.to_xml()?;
        std::fs::write(path, xml).map_err(|source| OpmlError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

// Collects the nodes that live outside the root element
#[derive(Default)]
struct TreeBuilder {
    prolog: Vec<Node>,
    root: Option<Element>,
    epilog: Vec<Node>,
}

impl TreeBuilder {
    fn push_top_level(&mut self, node: Node, position: usize) -> OpmlResult<()> {
        match node {
            Node::Element(element) => {
                if self.root.is_some() {
                    return Err(OpmlError::Malformed {
                        position,
                        reason: format!("second root element <{}>", element.name),
                    });
                }
                self.root = Some(element);
            }
            // Line breaks between top-level nodes are re-created on write
            Node::Text(text) if text.trim().is_empty() => {}
            Node::Text(_) | Node::CData(_) => {
                return Err(OpmlError::Malformed {
                    position,
                    reason: "text outside the root element".to_string(),
                });
            }
            other => {
                if self.root.is_none() {
                    self.prolog.push(other);
                } else {
                    self.epilog.push(other);
                }
            }
        }
        Ok(())
    }

    fn finish(self, position: usize) -> OpmlResult<Document> {
        let root = self.root.ok_or_else(|| OpmlError::Malformed {
            position,
            reason: "no root element".to_string(),
        })?;
        Ok(Document {
            prolog: self.prolog,
            root,
            epilog: self.epilog,
        })
    }
}

fn element_from_start(start: &BytesStart, position: usize) -> OpmlResult<Element> {
    let xml_error = |source| OpmlError::Xml { position, source };

    let mut element = Element::new(std::str::from_utf8(start.name().as_ref())?);

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| xml_error(quick_xml::Error::from(e)))?;
        let key = std::str::from_utf8(attribute.key.as_ref())?.to_string();
        let value = attribute.unescape_value().map_err(xml_error)?.into_owned();
        element.attributes.push((key, value));
    }

    Ok(element)
}

fn write_document(writer: &mut Writer<Vec<u8>>, document: &Document) -> quick_xml::Result<()> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_newline(writer)?;

    for node in &document.prolog {
        write_node(writer, node)?;
        write_newline(writer)?;
    }

    write_element(writer, &document.root)?;

    for node in &document.epilog {
        write_newline(writer)?;
        write_node(writer, node)?;
    }

    write_newline(writer)
}

fn write_newline(writer: &mut Writer<Vec<u8>>) -> quick_xml::Result<()> {
    writer.write_event(Event::Text(BytesText::from_escaped("\n")))
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> quick_xml::Result<()> {
    match node {
        Node::Element(element) => write_element(writer, element),
        Node::Text(text) => {
            writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))
        }
        Node::CData(data) => writer.write_event(Event::CData(BytesCData::new(data.as_str()))),
        Node::Comment(text) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))
        }
        Node::ProcessingInstruction(text) => {
            writer.write_event(Event::PI(BytesText::from_escaped(text.as_str())))
        }
        Node::DocType(text) => {
            writer.write_event(Event::DocType(BytesText::from_escaped(text.as_str())))
        }
    }
}

// Elements without children are written as self-closing tags
fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> quick_xml::Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer.write_event(Event::Empty(start));
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))
}
