//! Graph store contract and the default in-memory store

use super::node::{Node, NodeId};
use super::port::PortRef;
use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque, type-specific per-node state owned by the node's own component.
///
/// The binder only ever hands it to port accessors.
pub type PersistedState = serde_json::Value;

/// A declared link from one node's output port to another node's input port
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub producer_node_id: NodeId,
    pub producer_port_name: String,
    pub consumer_node_id: NodeId,
    pub consumer_port_name: String,
}

impl Edge {
    pub fn new(
        producer_node_id: NodeId,
        producer_port_name: impl Into<String>,
        consumer_node_id: NodeId,
        consumer_port_name: impl Into<String>,
    ) -> Self {
        Self {
            producer_node_id,
            producer_port_name: producer_port_name.into(),
            consumer_node_id,
            consumer_port_name: consumer_port_name.into(),
        }
    }

    /// The output port this edge starts at
    pub fn producer(&self) -> PortRef {
        PortRef::output(self.producer_node_id, self.producer_port_name.clone())
    }

    /// The input port this edge ends at
    pub fn consumer(&self) -> PortRef {
        PortRef::input(self.consumer_node_id, self.consumer_port_name.clone())
    }

    /// Check if either end of this edge is on the given node
    pub fn references(&self, node_id: NodeId) -> bool {
        self.producer_node_id == node_id || self.consumer_node_id == node_id
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{}",
            self.producer_node_id, self.producer_port_name, self.consumer_node_id, self.consumer_port_name
        )
    }
}

/// Caller-owned store of the declarative graph.
///
/// The editor never mutates nodes or edges in place. It computes the next
/// list and hands it over through the change callbacks; the owner decides
/// how to persist it.
pub trait GraphStore {
    fn nodes(&self) -> &[Node];

    fn edges(&self) -> &[Edge];

    /// Persisted state for a node, if the owner keeps any
    fn state(&self, _node_id: NodeId) -> Option<&PersistedState> {
        None
    }

    fn on_nodes_change(&mut self, nodes: Vec<Node>);

    fn on_edges_change(&mut self, edges: Vec<Edge>);

    /// Replace a node's persisted state, e.g. the defaults of a freshly created node
    fn on_state_change(&mut self, _node_id: NodeId, _state: PersistedState) {}

    /// Called after a node has been removed by the editor
    fn on_node_deleted(&mut self, _node_id: NodeId) {}

    /// Start of a group of changes that belong to one gesture
    fn begin_batch(&mut self) {}

    /// End of a group started with [`GraphStore::begin_batch`]
    fn end_batch(&mut self) {}
}

/// Passive in-memory graph store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub states: HashMap<NodeId, PersistedState>,
}

impl NodeGraph {
    /// Creates a new empty node graph
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == node_id)
    }

    pub fn contains_node(&self, node_id: NodeId) -> bool {
        self.find_node(node_id).is_some()
    }

    /// Adds a node with its initial persisted state and returns its id
    pub fn add_node(&mut self, node: Node, state: PersistedState) -> NodeId {
        let id = node.id;
        self.states.insert(id, state);
        self.nodes.push(node);
        id
    }

    /// Removes a node together with every edge that references it
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        let index = self.nodes.iter().position(|node| node.id == node_id)?;
        self.edges.retain(|edge| !edge.references(node_id));
        self.states.remove(&node_id);
        Some(self.nodes.remove(index))
    }

    /// Appends an edge unless an identical one is already stored
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        if self.edges.contains(&edge) {
            return Err(GraphError::DuplicateEdge(edge));
        }
        self.edges.push(edge);
        Ok(())
    }

    /// Removes an edge by value
    pub fn remove_edge(&mut self, edge: &Edge) -> bool {
        let before = self.edges.len();
        self.edges.retain(|existing| existing != edge);
        self.edges.len() != before
    }

    /// Removes edges whose producer or consumer node is gone and returns them
    pub fn prune_dangling(&mut self) -> Vec<Edge> {
        let edges = std::mem::take(&mut self.edges);
        let (kept, dropped): (Vec<Edge>, Vec<Edge>) = edges.into_iter().partition(|edge| {
            self.contains_node(edge.producer_node_id) && self.contains_node(edge.consumer_node_id)
        });
        self.edges = kept;
        dropped
    }

    pub fn set_state(&mut self, node_id: NodeId, state: PersistedState) {
        self.states.insert(node_id, state);
    }

    /// Serialize the graph snapshot for an external persistence layer
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl GraphStore for NodeGraph {
    fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn edges(&self) -> &[Edge] {
        &self.edges
    }

    fn state(&self, node_id: NodeId) -> Option<&PersistedState> {
        self.states.get(&node_id)
    }

    fn on_nodes_change(&mut self, nodes: Vec<Node>) {
        self.nodes = nodes;
        let nodes = &self.nodes;
        self.states.retain(|id, _| nodes.iter().any(|node| node.id == *id));
    }

    fn on_edges_change(&mut self, edges: Vec<Edge>) {
        self.edges = edges;
    }

    fn on_state_change(&mut self, node_id: NodeId, state: PersistedState) {
        if self.contains_node(node_id) {
            self.set_state(node_id, state);
        }
    }
}
