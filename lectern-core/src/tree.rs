use std::collections::BTreeMap;

/// A node in the rendered content tree.
///
/// The host pipeline hands transforms an owned tree of these. Element
/// attributes are the only thing transforms mutate; the structure itself
/// stays put except where a transform explicitly appends children.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    /// Raw HTML passed through verbatim. Always a leaf.
    Html(String),
}

impl Node {
    pub fn element(tag: &str) -> Self {
        Node::Element(Element::new(tag))
    }

    pub fn text<S: Into<String>>(text: S) -> Self {
        Node::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }
}

/// An element node: tag name, attributes, ordered children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub tag: String,
    pub attributes: BTreeMap<String, AttrValue>,
    pub children: Vec<Node>,
}

/// Attribute values are not uniformly textual: boolean attributes like
/// `disabled` and token lists like `rel` show up alongside plain strings.
/// Transforms that only understand textual values must skip the rest.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Flag(bool),
    List(Vec<String>),
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// The attribute's value if present and textual.
    pub fn text_attr(&self, name: &str) -> Option<&str> {
        match self.attributes.get(name) {
            Some(AttrValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    pub fn set_attr<S: Into<String>>(&mut self, name: S, value: AttrValue) {
        self.attributes.insert(name.into(), value);
    }

    pub fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }
}

/// Concatenated text of a node and its descendants, in document order.
pub fn text_content(node: &Node) -> String {
    let mut out = String::new();
    walk(node, &mut |n| {
        if let Node::Text(text) = n {
            out.push_str(text);
        }
    });
    out
}

/// Pre-order depth-first traversal: visit the node, then each ordered
/// child. Every node is visited exactly once; text and raw HTML nodes are
/// leaves.
pub fn walk<F: FnMut(&Node)>(node: &Node, visit: &mut F) {
    visit(node);
    if let Node::Element(el) = node {
        for child in &el.children {
            walk(child, visit);
        }
    }
}

/// Mutable pre-order traversal. Visitors may edit attributes and append
/// children; appended children are traversed too.
pub fn walk_mut<F: FnMut(&mut Node)>(node: &mut Node, visit: &mut F) {
    visit(node);
    if let Node::Element(el) = node {
        for child in &mut el.children {
            walk_mut(child, visit);
        }
    }
}
