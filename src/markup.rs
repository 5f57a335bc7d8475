// Immutable element trees with HTML output

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarkupError {
    #[error("Markup write error: {0}")]
    WriteError(String),

    #[error("Markup encoding error: {0}")]
    EncodingError(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    // Appends to the class list; repeated calls accumulate
    pub fn with_class(self, class: &str) -> Self {
        let classes = match self.attr("class") {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, class),
            _ => class.to_string(),
        };
        self.with_attr("class", classes)
    }

    // Sets an attribute, replacing any previous value
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(Node::Text(text.into()))
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn push_child(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map_or(false, |classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    // Depth-first search, the element itself included
    pub fn find_by_class(&self, class: &str) -> Option<&Element> {
        if self.has_class(class) {
            return Some(self);
        }
        self.path_to_class(class)
            .and_then(|path| self.node_at(&path))
            .and_then(Node::as_element)
    }

    // Descendants only
    pub fn path_to_class(&self, class: &str) -> Option<Vec<usize>> {
        for (index, child) in self.children.iter().enumerate() {
            if let Node::Element(element) = child {
                if element.has_class(class) {
                    return Some(vec![index]);
                }
                if let Some(mut rest) = element.path_to_class(class) {
                    rest.insert(0, index);
                    return Some(rest);
                }
            }
        }
        None
    }

    pub fn node_at(&self, path: &[usize]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        let node = self.children.get(*first)?;
        if rest.is_empty() {
            return Some(node);
        }
        node.as_element()?.node_at(rest)
    }

    // Root first; a trailing text node adds nothing
    pub fn ancestry(&self, path: &[usize]) -> Option<Vec<&Element>> {
        let mut chain = vec![self];
        let mut current = self;
        for (depth, index) in path.iter().enumerate() {
            match current.children.get(*index)? {
                Node::Element(element) => {
                    chain.push(element);
                    current = element;
                }
                Node::Text(_) if depth + 1 == path.len() => break,
                Node::Text(_) => return None,
            }
        }
        Some(chain)
    }

    pub fn to_html(&self) -> Result<String, MarkupError> {
        let mut writer = Writer::new(Vec::new());
        self.write_into(&mut writer)?;
        Ok(String::from_utf8(writer.into_inner())?)
    }

    fn write_into(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), MarkupError> {
        let mut start = BytesStart::new(self.tag.as_str());
        for (name, value) in &self.attributes {
            start.push_attribute((name.as_str(), value.as_str()));
        }
        write_event(writer, Event::Start(start))?;

        for child in &self.children {
            match child {
                Node::Element(element) => element.write_into(writer)?,
                Node::Text(text) => write_event(writer, Event::Text(BytesText::new(text)))?,
            }
        }

        write_event(writer, Event::End(BytesEnd::new(self.tag.as_str())))
    }
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), MarkupError> {
    writer
        .write_event(event)
        .map_err(|e| MarkupError::WriteError(e.to_string()))
}
