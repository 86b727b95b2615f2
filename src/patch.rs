//! Patch session
//!
//! Ties the declarative graph to the live engine. A [`Patch`] is a
//! [`GraphStore`]: every change it receives marks it dirty and, outside a
//! batch, immediately re-binds the whole graph and re-applies every
//! connection. Changes made inside a batch are coalesced into one cycle.

use crate::engine::{bind, ApplyReport, Binding, ConnectionEffector, EngineContext, EngineObjectCache, Resolved};
use crate::error::GraphError;
use crate::nodes::{Edge, GraphStore, Node, NodeGraph, NodeId, NodeRegistry, PersistedState, PortRef, Position};
use log::debug;
use std::fmt;
use std::rc::Rc;

pub struct Patch {
    graph: NodeGraph,
    registry: Rc<NodeRegistry>,
    context: EngineContext,
    cache: EngineObjectCache,
    effector: ConnectionEffector,
    binding: Binding,
    last_report: ApplyReport,
    batch_depth: usize,
    dirty: bool,
    cycles: usize,
}

impl Patch {
    /// Create an empty patch
    pub fn new(registry: Rc<NodeRegistry>) -> Self {
        Self::with_context(registry, EngineContext::default())
    }

    pub fn with_context(registry: Rc<NodeRegistry>, context: EngineContext) -> Self {
        Self {
            graph: NodeGraph::new(),
            registry,
            context,
            cache: EngineObjectCache::new(),
            effector: ConnectionEffector::new(),
            binding: Binding::default(),
            last_report: ApplyReport::default(),
            batch_depth: 0,
            dirty: false,
            cycles: 0,
        }
    }

    /// Load an existing graph and bring the engine up to date with it
    pub fn from_graph(graph: NodeGraph, registry: Rc<NodeRegistry>) -> Self {
        Self::from_graph_with_context(graph, registry, EngineContext::default())
    }

    pub fn from_graph_with_context(graph: NodeGraph, registry: Rc<NodeRegistry>, context: EngineContext) -> Self {
        let mut patch = Self::with_context(registry, context);
        patch.graph = graph;
        patch.rebind();
        patch
    }

    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    pub fn cache(&self) -> &EngineObjectCache {
        &self.cache
    }

    /// Binding from the most recent cycle
    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    pub fn resolved(&self, port: &PortRef) -> Option<&Resolved> {
        self.binding.resolved(port)
    }

    pub fn last_report(&self) -> &ApplyReport {
        &self.last_report
    }

    pub fn active_connections(&self) -> usize {
        self.effector.active_connections()
    }

    /// Number of bind/apply cycles run so far
    pub fn cycles(&self) -> usize {
        self.cycles
    }

    /// True while changes are waiting for the end of a batch
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Create a node of a registered type with its default state
    pub fn add_node(&mut self, type_name: &str, position: Position) -> Result<NodeId, GraphError> {
        let (node, state) = self.registry.create_node(type_name, position)?;
        let id = self.graph.add_node(node, state);
        self.mark_changed();
        Ok(id)
    }

    /// Remove a node, every edge referencing it, and its engine object
    pub fn remove_node(&mut self, node_id: NodeId) -> Result<Node, GraphError> {
        let node = self.graph.remove_node(node_id).ok_or(GraphError::UnknownNode(node_id))?;
        self.mark_changed();
        Ok(node)
    }

    /// Add an edge after checking both ends and their kinds
    pub fn connect(&mut self, edge: Edge) -> Result<(), GraphError> {
        if let Err(err) = self.registry.validate_edge(&self.graph.nodes, &self.graph.edges, &edge) {
            debug!("Rejected edge {}: {}", edge, err);
            return Err(err);
        }
        self.graph.edges.push(edge);
        self.mark_changed();
        Ok(())
    }

    pub fn disconnect(&mut self, edge: &Edge) -> bool {
        let removed = self.graph.remove_edge(edge);
        if removed {
            self.mark_changed();
        }
        removed
    }

    pub fn set_node_state(&mut self, node_id: NodeId, state: PersistedState) -> Result<(), GraphError> {
        if !self.graph.contains_node(node_id) {
            return Err(GraphError::UnknownNode(node_id));
        }
        self.graph.set_state(node_id, state);
        self.mark_changed();
        Ok(())
    }

    /// Run `f` with every change it makes coalesced into a single cycle
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.begin_batch();
        let result = f(self);
        self.end_batch();
        result
    }

    /// Force a full bind/apply cycle
    pub fn rebind(&mut self) -> &ApplyReport {
        self.run_cycle();
        &self.last_report
    }

    fn mark_changed(&mut self) {
        self.dirty = true;
        if self.batch_depth == 0 {
            self.run_cycle();
        }
    }

    fn run_cycle(&mut self) {
        self.dirty = false;

        // Connections go before the objects they reference
        let torn_down = self.effector.teardown();
        let disposed = self.cache.retain_nodes(&self.graph.nodes);

        let binding = bind(
            &self.graph.nodes,
            &self.graph.edges,
            &self.graph.states,
            &mut self.cache,
            &self.registry,
            &self.context,
        );
        let mut report = self.effector.apply(&binding, &self.graph.edges);
        report.torn_down = torn_down;

        if !report.dropped.is_empty() {
            let dropped = &report.dropped;
            self.graph.edges.retain(|edge| !dropped.contains(edge));
        }

        self.cycles += 1;
        debug!(
            "Cycle {}: {} nodes, {} connections, {} objects disposed",
            self.cycles,
            binding.nodes.len(),
            report.applied,
            disposed
        );
        self.binding = binding;
        self.last_report = report;
    }
}

impl GraphStore for Patch {
    fn nodes(&self) -> &[Node] {
        &self.graph.nodes
    }

    fn edges(&self) -> &[Edge] {
        &self.graph.edges
    }

    fn state(&self, node_id: NodeId) -> Option<&PersistedState> {
        self.graph.states.get(&node_id)
    }

    fn on_nodes_change(&mut self, nodes: Vec<Node>) {
        self.graph.on_nodes_change(nodes);
        self.mark_changed();
    }

    fn on_edges_change(&mut self, edges: Vec<Edge>) {
        self.graph.on_edges_change(edges);
        self.mark_changed();
    }

    fn on_state_change(&mut self, node_id: NodeId, state: PersistedState) {
        self.graph.on_state_change(node_id, state);
        self.mark_changed();
    }

    fn on_node_deleted(&mut self, node_id: NodeId) {
        // The engine object is disposed by the next cycle, once its
        // connections have been retracted
        self.graph.remove_node(node_id);
        self.mark_changed();
    }

    fn begin_batch(&mut self) {
        self.batch_depth += 1;
    }

    fn end_batch(&mut self) {
        self.batch_depth = self.batch_depth.saturating_sub(1);
        if self.batch_depth == 0 && self.dirty {
            self.run_cycle();
        }
    }
}

impl Drop for Patch {
    fn drop(&mut self) {
        self.effector.teardown();
        self.cache.clear();
    }
}

impl fmt::Debug for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Patch")
            .field("graph", &self.graph)
            .field("cache", &self.cache)
            .field("effector", &self.effector)
            .field("cycles", &self.cycles)
            .finish()
    }
}
