use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An evaluated prop value. Attribute literals (`key="x"`) are always text;
/// expression attributes (`key={...}`) may carry numbers and booleans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Text(String),
    Number(f64),
    Boolean(bool),
}

impl PropValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for PropValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropValue::Text(s) => write!(f, "{}", s),
            PropValue::Number(n) => write!(f, "{}", n),
            PropValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// A node in the evaluated view tree.
///
/// Props are sorted by key (BTreeMap) so two renders of the same source are
/// structurally identical, including their serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewNode {
    pub name: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub props: BTreeMap<String, PropValue>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<ViewChild>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ViewChild {
    Text(String),
    Node(ViewNode),
}

impl ViewNode {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            props: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn prop(&self, name: &str) -> Option<&PropValue> {
        self.props.get(name)
    }

    /// Concatenated direct text content, trimmed. Empty string if none.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            if let ViewChild::Text(t) = child {
                out.push_str(t);
            }
        }
        out.trim().to_string()
    }

    /// Child element nodes, skipping text.
    pub fn child_nodes(&self) -> impl Iterator<Item = &ViewNode> {
        self.children.iter().filter_map(|c| match c {
            ViewChild::Node(n) => Some(n),
            ViewChild::Text(_) => None,
        })
    }
}
