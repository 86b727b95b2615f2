//! Node system - declarative graph data and the node definition registry

pub mod graph;
pub mod node;
pub mod port;
pub mod position;
pub mod registry;

// Re-export core types
pub use graph::{Edge, GraphStore, NodeGraph, PersistedState};
pub use node::{Node, NodeId};
pub use port::{PortDirection, PortKind, PortRef};
pub use position::Position;
pub use registry::{Accessor, DisposeHook, Factory, NodeDefinition, NodeRegistry, PortDefinition};
