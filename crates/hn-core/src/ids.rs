use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Node type tag, serialized as the upper-case keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeType {
    Junction,
    Reservoir,
    Tank,
}

/// Link type tag, serialized as the upper-case keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LinkType {
    Pipe,
    Pump,
    Valve,
}

/// Kind of an entry in the shared node/link id namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Node(NodeType),
    Link(LinkType),
}

impl ElementKind {
    pub const JUNCTION: Self = Self::Node(NodeType::Junction);
    pub const RESERVOIR: Self = Self::Node(NodeType::Reservoir);
    pub const TANK: Self = Self::Node(NodeType::Tank);
    pub const PIPE: Self = Self::Link(LinkType::Pipe);
    pub const PUMP: Self = Self::Link(LinkType::Pump);
    pub const VALVE: Self = Self::Link(LinkType::Valve);

    pub fn is_node(self) -> bool {
        matches!(self, ElementKind::Node(_))
    }

    pub fn is_link(self) -> bool {
        matches!(self, ElementKind::Link(_))
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeType::Junction => "JUNCTION",
            NodeType::Reservoir => "RESERVOIR",
            NodeType::Tank => "TANK",
        };
        f.write_str(s)
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LinkType::Pipe => "PIPE",
            LinkType::Pump => "PUMP",
            LinkType::Valve => "VALVE",
        };
        f.write_str(s)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Node(t) => t.fmt(f),
            ElementKind::Link(t) => t.fmt(f),
        }
    }
}

/// Ids are non-empty and must survive whitespace tokenization.
pub fn check_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::InvalidValue {
            element: id.to_string(),
            field: "id",
            value: String::new(),
            reason: "must be non-empty",
        });
    }
    if id.chars().any(|c| c.is_whitespace() || c == ';') {
        return Err(ValidationError::InvalidValue {
            element: id.to_string(),
            field: "id",
            value: id.to_string(),
            reason: "must not contain whitespace or ';'",
        });
    }
    Ok(())
}
