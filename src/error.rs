//! Error taxonomy for graph editing and engine binding
//!
//! None of these are fatal. The editor rejects invalid connections before
//! they reach the store, and the bind/apply cycle degrades every failure to
//! "treat as unconnected" instead of halting.

use crate::nodes::{Edge, NodeId, PortKind, PortRef};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// Producer and consumer port kinds cannot be connected
    InvalidConnection {
        producer: PortKind,
        consumer: PortKind,
    },
    /// Edge names a node or port that no longer exists
    DanglingEdgeReference(Edge),
    /// An identical edge is already stored
    DuplicateEdge(Edge),
    /// Engine object or accessor not available for a port
    UnresolvedPort(PortRef),
    /// No definition registered under this type name
    UnknownNodeType(String),
    /// A definition with this type name is already registered
    DuplicateNodeType(String),
    /// No node with this id in the graph
    UnknownNode(NodeId),
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::InvalidConnection { producer, consumer } => {
                write!(f, "cannot connect a {} output to a {} input", producer, consumer)
            }
            GraphError::DanglingEdgeReference(edge) => write!(f, "edge references a missing node or port: {}", edge),
            GraphError::DuplicateEdge(edge) => write!(f, "edge already exists: {}", edge),
            GraphError::UnresolvedPort(port) => write!(f, "port {} has no live handle yet", port),
            GraphError::UnknownNodeType(name) => write!(f, "unknown node type '{}'", name),
            GraphError::DuplicateNodeType(name) => write!(f, "node type '{}' is already registered", name),
            GraphError::UnknownNode(id) => write!(f, "no node with id {}", id),
        }
    }
}

impl std::error::Error for GraphError {}
