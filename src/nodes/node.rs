//! Node identity and the persisted node record

use super::position::Position;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a node.
///
/// Assigned once at creation and never reused, so a node deleted and
/// re-created from the menu gets a fresh engine object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Generate a fresh id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A typed processing-unit instance placed in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Name of the node's definition in the [`super::NodeRegistry`]
    pub type_name: String,
    pub position: Position,
}

impl Node {
    /// Creates a node with a freshly generated id
    pub fn new(type_name: impl Into<String>, position: Position) -> Self {
        Self {
            id: NodeId::new(),
            type_name: type_name.into(),
            position,
        }
    }

    /// Creates a node with a known id (for restoring saved graphs)
    pub fn with_id(id: NodeId, type_name: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            type_name: type_name.into(),
            position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = Node::new("Gain", Position::ORIGIN);
        let b = Node::new("Gain", Position::ORIGIN);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_node_serializes_id_as_string() {
        let node = Node::new("Oscillator", Position::new(1.0, 2.0));
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["id"], serde_json::Value::String(node.id.to_string()));
        assert_eq!(json["type_name"], "Oscillator");

        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }
}
