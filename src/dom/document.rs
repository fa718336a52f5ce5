//! Arena-backed document tree.
//!
//! Nodes live in a flat `Vec` and refer to each other by `NodeId`. Detached
//! nodes stay in the arena; they are simply not reachable from the root.

use crate::dom::selector::Selector;
use crate::types::errors::SelectorError;

pub type NodeId = usize;

/// Id of the document node itself.
pub const DOCUMENT_NODE: NodeId = 0;

/// Elements that never produce a layout box.
const NON_RENDERED_TAGS: &[&str] = &[
    "head", "script", "style", "template", "meta", "link", "title", "base", "noscript",
];

/// Elements that take up space without any text inside them.
const REPLACED_TAGS: &[&str] = &[
    "img", "iframe", "video", "audio", "canvas", "embed", "object", "svg", "input",
    "textarea", "select", "button", "hr", "ins",
];

/// Payload of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Document,
    Element(Element),
    Text(String),
    Comment(String),
}

/// Layout size reported by the host for an element, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderedSize {
    pub width: f64,
    pub height: f64,
}

impl RenderedSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when neither dimension is positive.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 && self.height <= 0.0
    }
}

/// An element: lowercase tag name plus attributes in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    rendered_size: Option<RenderedSize>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            rendered_size: None,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.attributes
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attributes.push((name, value.to_string())),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        let before = self.attributes.len();
        self.attributes.retain(|(n, _)| *n != name);
        before != self.attributes.len()
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class")
            .unwrap_or_default()
            .split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    fn set_classes(&mut self, classes: &[String]) {
        if classes.is_empty() {
            self.remove_attribute("class");
        } else {
            self.set_attribute("class", &classes.join(" "));
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// A child-list change under the observed subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
}

/// A page's document tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    url: String,
    observed: Option<NodeId>,
    pending: Vec<MutationRecord>,
}

impl Document {
    /// Creates a document with an empty `<html><head></head><body></body></html>` skeleton.
    pub fn new(url: &str) -> Self {
        let mut doc = Self {
            nodes: vec![Node::new(NodeData::Document)],
            url: url.to_string(),
            observed: None,
            pending: Vec::new(),
        };
        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.attach(DOCUMENT_NODE, html);
        doc.attach(html, head);
        doc.attach(html, body);
        doc
    }

    /// Parses HTML into a new document. Never fails; malformed markup is repaired leniently.
    pub fn parse(html: &str, url: &str) -> Self {
        crate::dom::parser::parse_html(html, url)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    // === Structure ===

    /// The `<html>` element.
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(DOCUMENT_NODE)
            .iter()
            .copied()
            .find(|&id| self.element(id).is_some())
    }

    pub fn head(&self) -> Option<NodeId> {
        self.root_child_with_tag("head")
    }

    pub fn body(&self) -> Option<NodeId> {
        self.root_child_with_tag("body")
    }

    fn root_child_with_tag(&self, tag: &str) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .copied()
            .find(|&id| self.tag_name(id) == Some(tag))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id).map(|n| &n.data)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.data(id) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(id).map(|n| &mut n.data) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::tag)
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id) {
            Some(NodeData::Text(t)) => Some(t),
            _ => None,
        }
    }

    /// True when the node is reachable from the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == DOCUMENT_NODE {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// True when `ancestor` is `id` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Pre-order traversal of everything below `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    // === Construction ===

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(NodeData::Element(Element::new(tag)))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_node(NodeData::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push_node(NodeData::Comment(text.to_string()))
    }

    fn push_node(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Node::new(data));
        self.nodes.len() - 1
    }

    /// Appends `child` to `parent`, moving it out of its previous parent.
    ///
    /// Requests that would create a cycle, or that target a non-container, are ignored.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent >= self.nodes.len() || child >= self.nodes.len() || child == DOCUMENT_NODE {
            return;
        }
        if self.is_inclusive_ancestor(child, parent) {
            tracing::warn!(parent, child, "refusing to append a node below itself");
            return;
        }
        if matches!(
            self.nodes[parent].data,
            NodeData::Text(_) | NodeData::Comment(_)
        ) {
            return;
        }
        if self.parent(child).is_some() {
            self.remove_child(child);
        }
        self.attach(parent, child);
        self.record(parent, vec![child], Vec::new());
    }

    /// Detaches a node from its parent. The node and its subtree stay in the arena.
    pub fn remove_child(&mut self, child: NodeId) {
        let Some(parent) = self.parent(child) else {
            return;
        };
        self.nodes[parent].children.retain(|&c| c != child);
        self.nodes[child].parent = None;
        self.record(parent, Vec::new(), vec![child]);
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    /// Creates an element and appends it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.create_element(tag);
        self.append_child(parent, id);
        id
    }

    /// Creates a text node and appends it to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.create_text(text);
        self.append_child(parent, id);
        id
    }

    /// Appends text, merging into a trailing text node if there is one.
    pub(crate) fn append_text_merged(&mut self, parent: NodeId, text: &str) {
        if let Some(&last) = self.children(parent).last() {
            if let NodeData::Text(existing) = &mut self.nodes[last].data {
                existing.push_str(text);
                return;
            }
        }
        self.append_text(parent, text);
    }

    // === Title ===

    /// The document title with whitespace collapsed, or an empty string.
    pub fn title(&self) -> String {
        self.descendants(DOCUMENT_NODE)
            .find(|&id| self.tag_name(id) == Some("title"))
            .map(|id| {
                self.text_content(id)
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
    }

    pub fn set_title(&mut self, title: &str) {
        let existing = self
            .descendants(DOCUMENT_NODE)
            .find(|&id| self.tag_name(id) == Some("title"));
        let title_el = match existing {
            Some(id) => id,
            None => {
                let Some(head) = self.head() else {
                    return;
                };
                self.append_element(head, "title")
            }
        };
        let old: Vec<NodeId> = self.children(title_el).to_vec();
        for child in old {
            self.remove_child(child);
        }
        self.append_text(title_el, title);
    }

    // === Text ===

    /// Concatenated text of every descendant text node (the DOM `textContent`).
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(text) = self.text(node) {
                out.push_str(text);
            }
        }
        out
    }

    // === Attributes, classes and style ===

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attribute(name))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(id) {
            el.set_attribute(name, value);
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> bool {
        self.element_mut(id)
            .map(|el| el.remove_attribute(name))
            .unwrap_or(false)
    }

    pub fn class_list(&self, id: NodeId) -> Vec<String> {
        self.element(id)
            .map(|el| el.classes().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).map(|el| el.has_class(class)).unwrap_or(false)
    }

    /// Adds a class. Returns true if the class was not present before.
    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        let mut classes = self.class_list(id);
        if classes.iter().any(|c| c == class) {
            return false;
        }
        classes.push(class.to_string());
        match self.element_mut(id) {
            Some(el) => {
                el.set_classes(&classes);
                true
            }
            None => false,
        }
    }

    /// Removes a class. Returns true if it was present.
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        let mut classes = self.class_list(id);
        let before = classes.len();
        classes.retain(|c| c != class);
        if classes.len() == before {
            return false;
        }
        if let Some(el) = self.element_mut(id) {
            el.set_classes(&classes);
        }
        true
    }

    /// Flips a class and returns whether it is now present.
    pub fn toggle_class(&mut self, id: NodeId, class: &str) -> bool {
        if self.has_class(id, class) {
            self.remove_class(id, class);
            false
        } else {
            self.add_class(id, class)
        }
    }

    /// Reads one property from the inline `style` attribute.
    pub fn style_property(&self, id: NodeId, name: &str) -> Option<String> {
        let style = self.attribute(id, "style")?;
        parse_style(style)
            .into_iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// Sets one property in the inline `style` attribute, keeping the others.
    pub fn set_style_property(&mut self, id: NodeId, name: &str, value: &str) {
        let name = name.trim().to_ascii_lowercase();
        let mut props = self
            .attribute(id, "style")
            .map(parse_style)
            .unwrap_or_default();
        match props.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => props.push((name, value.to_string())),
        }
        let serialized = props
            .iter()
            .map(|(n, v)| format!("{}: {};", n, v))
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attribute(id, "style", &serialized);
    }

    // === Layout ===

    /// Records the size the host laid the element out at.
    pub fn set_rendered_size(&mut self, id: NodeId, size: RenderedSize) {
        if let Some(el) = self.element_mut(id) {
            el.rendered_size = Some(size);
        }
    }

    pub fn rendered_size(&self, id: NodeId) -> Option<RenderedSize> {
        self.element(id).and_then(|el| el.rendered_size)
    }

    /// Whether the element has a non-empty layout box (non-zero width or height).
    ///
    /// Uses the host-reported size when there is one. Otherwise an element counts
    /// as laid out when it is connected, not hidden by itself or an ancestor, and
    /// holds visible text or a replaced element.
    pub fn occupies_space(&self, id: NodeId) -> bool {
        if self.element(id).is_none() || !self.is_connected(id) {
            return false;
        }
        let mut current = Some(id);
        while let Some(node) = current {
            if self.is_hidden_here(node) {
                return false;
            }
            current = self.parent(node);
        }
        self.has_box(id)
    }

    fn is_hidden_here(&self, id: NodeId) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        if el.attribute("hidden").is_some() {
            return true;
        }
        self.style_property(id, "display")
            .map(|v| v.trim_start().to_ascii_lowercase().starts_with("none"))
            .unwrap_or(false)
    }

    fn has_box(&self, id: NodeId) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        if let Some(size) = el.rendered_size {
            return !size.is_empty();
        }
        if NON_RENDERED_TAGS.contains(&el.tag()) {
            return false;
        }
        if REPLACED_TAGS.contains(&el.tag()) {
            let zero = |name: &str| {
                el.attribute(name)
                    .and_then(|v| v.trim().trim_end_matches("px").parse::<f64>().ok())
                    .map(|v| v <= 0.0)
                    .unwrap_or(false)
            };
            return !(zero("width") && zero("height"));
        }
        self.children(id).iter().any(|&child| match self.data(child) {
            Some(NodeData::Text(t)) => !t.trim().is_empty(),
            Some(NodeData::Element(_)) => !self.is_hidden_here(child) && self.has_box(child),
            _ => false,
        })
    }

    // === Queries ===

    pub fn query_selector(&self, selector: &Selector) -> Option<NodeId> {
        self.descendants(DOCUMENT_NODE)
            .find(|&id| selector.matches(self, id))
    }

    pub fn query_selector_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.descendants(DOCUMENT_NODE)
            .filter(|&id| selector.matches(self, id))
            .collect()
    }

    /// Parses `selector` and returns every match in document order.
    pub fn select(&self, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        let parsed = Selector::parse(selector)?;
        Ok(self.query_selector_all(&parsed))
    }

    // === Mutation observation ===

    /// Starts recording child-list mutations anywhere under `root`.
    pub fn observe_child_list(&mut self, root: NodeId) {
        self.observed = Some(root);
        self.pending.clear();
    }

    /// Drains the mutation records collected since the last call.
    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.pending)
    }

    fn record(&mut self, target: NodeId, added_nodes: Vec<NodeId>, removed_nodes: Vec<NodeId>) {
        let Some(root) = self.observed else {
            return;
        };
        if self.is_inclusive_ancestor(root, target) {
            self.pending.push(MutationRecord {
                target,
                added_nodes,
                removed_nodes,
            });
        }
    }
}

/// Iterator returned by [`Document::descendants`].
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}

fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            if name.is_empty() {
                return None;
            }
            Some((name, value.trim().to_string()))
        })
        .collect()
}
