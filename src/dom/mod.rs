//! Headless DOM
//!
//! A minimal element tree that widgets render into. It carries exactly what
//! the widget runtime needs from a browser DOM:
//!
//! - Ordered attributes (serialization order == insertion order)
//! - Text nodes with HTML escaping
//! - Listener bindings that are *not* part of the markup
//! - `outer_html()` serialization
//!
//! A shadow root serializes as declarative shadow DOM
//! (`<template shadowrootmode="open">`) so rendered widgets can be embedded
//! into a real page as-is.

mod escape;

pub use escape::{escape_attribute, escape_text};

/// Elements that never have children or a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text content is emitted verbatim
const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script"];

/// Whether `name` can be written into markup as an attribute name.
///
/// Letters, digits and `-` `_` `.` `:` only. Anything else could end the
/// tag or start another attribute when serialized.
pub fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b':'))
}

/// A node in the tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    fn write_html(&self, out: &mut String, raw_text: bool) {
        match self {
            Node::Element(el) => el.write_html(out),
            Node::Text(text) if raw_text => out.push_str(text),
            Node::Text(text) => out.push_str(&escape_text(text)),
        }
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
            Node::Text(text) => out.push_str(text),
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
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

/// A listener binding: "when `event` fires on this element, run `action`".
///
/// Bindings live on the element instance, so a re-render (which replaces
/// every element) drops them. They are never serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listener {
    pub event: String,
    pub action: String,
}

/// An element with ordered attributes and child nodes
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
    listeners: Vec<Listener>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    // ─── Builder API ─────────────────────────────────────────

    /// Set an attribute (builder form)
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    pub fn class(self, class: impl Into<String>) -> Self {
        self.attr("class", class)
    }

    /// Inline style declarations
    pub fn style(self, css: impl Into<String>) -> Self {
        self.attr("style", css)
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children<I, N>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(nodes.into_iter().map(Into::into));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    // ─── Attribute access ────────────────────────────────────

    /// Set an attribute, replacing an existing value in place
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(n, _)| n == name)?;
        Some(self.attributes.remove(index).1)
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn element_id(&self) -> Option<&str> {
        self.get_attribute("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attribute("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    // ─── Children ────────────────────────────────────────────

    pub fn append(&mut self, node: impl Into<Node>) {
        self.children.push(node.into());
    }

    pub fn child_nodes(&self) -> &[Node] {
        &self.children
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }

    /// Depth-first search (self included) for an element with the given id
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.find(&|el| el.element_id() == Some(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.find_mut(&|el| el.element_id() == Some(id))
    }

    /// First element (self included) carrying `class`
    pub fn find_by_class(&self, class: &str) -> Option<&Element> {
        self.find(&|el| el.has_class(class))
    }

    /// All elements (self included) carrying `class`, in document order
    pub fn find_all_by_class(&self, class: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect(&|el| el.has_class(class), &mut found);
        found
    }

    fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        if pred(self) {
            return Some(self);
        }
        self.children
            .iter()
            .filter_map(Node::as_element)
            .find_map(|el| el.find(pred))
    }

    fn find_mut(&mut self, pred: &dyn Fn(&Element) -> bool) -> Option<&mut Element> {
        if pred(self) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(el) => el.find_mut(pred),
            Node::Text(_) => None,
        })
    }

    fn collect<'a>(&'a self, pred: &dyn Fn(&Element) -> bool, out: &mut Vec<&'a Element>) {
        if pred(self) {
            out.push(self);
        }
        for el in self.children.iter().filter_map(Node::as_element) {
            el.collect(pred, out);
        }
    }

    /// Visit every element (self included) mutably, depth-first
    pub fn for_each_element_mut(&mut self, f: &mut dyn FnMut(&mut Element)) {
        f(self);
        for node in &mut self.children {
            if let Node::Element(el) = node {
                el.for_each_element_mut(f);
            }
        }
    }

    // ─── Listeners ───────────────────────────────────────────

    /// Bind `action` to `event` on this element
    pub fn add_event_listener(&mut self, event: impl Into<String>, action: impl Into<String>) {
        self.listeners.push(Listener {
            event: event.into(),
            action: action.into(),
        });
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    /// Action bound to `event`, if any (first binding wins)
    pub fn listener_for(&self, event: &str) -> Option<&str> {
        self.listeners
            .iter()
            .find(|l| l.event == event)
            .map(|l| l.action.as_str())
    }

    // ─── Serialization ───────────────────────────────────────

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        let raw = RAW_TEXT_ELEMENTS.contains(&self.tag.as_str());
        for child in &self.children {
            child.write_html(&mut out, raw);
        }
        out
    }

    pub(crate) fn write_open_tag(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }
        out.push('>');
    }

    fn write_html(&self, out: &mut String) {
        self.write_open_tag(out);
        if VOID_ELEMENTS.contains(&self.tag.as_str()) {
            return;
        }
        out.push_str(&self.inner_html());
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

/// An encapsulated subtree attached to a host element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShadowRoot {
    children: Vec<Node>,
}

impl ShadowRoot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every child (and with them every listener binding)
    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn append(&mut self, node: impl Into<Node>) {
        self.children.push(node.into());
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.elements().find_map(|el| el.find_by_id(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(el) => el.find_by_id_mut(id),
            Node::Text(_) => None,
        })
    }

    pub fn find_by_class(&self, class: &str) -> Option<&Element> {
        self.elements().find_map(|el| el.find_by_class(class))
    }

    pub fn find_all_by_class(&self, class: &str) -> Vec<&Element> {
        self.elements()
            .flat_map(|el| el.find_all_by_class(class))
            .collect()
    }

    pub fn for_each_element_mut(&mut self, f: &mut dyn FnMut(&mut Element)) {
        for node in &mut self.children {
            if let Node::Element(el) = node {
                el.for_each_element_mut(f);
            }
        }
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.write_html(&mut out, false);
        }
        out
    }

    /// Serialize as a declarative shadow root template
    pub fn to_template_html(&self) -> String {
        format!(
            "<template shadowrootmode=\"open\">{}</template>",
            self.inner_html()
        )
    }
}
