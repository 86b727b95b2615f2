//! Graph editor interaction layer
//!
//! A pointer-driven state machine that turns user gestures into
//! [`GraphStore`] change requests. The editor never mutates nodes or edges
//! in place and never writes intermediate drag positions: a gesture either
//! commits once on release or leaves the store untouched.

pub mod input;
pub mod interaction;
pub mod menus;
pub mod port_registry;
pub mod rendering;

pub use hit_test::Hit;
pub use input::EditorEvent;
pub use interaction::InteractionState;
pub use menus::{MenuAction, MenuKind, MenuView};
pub use port_registry::PortRegistry;
pub use rendering::{EdgeView, NodeView, PortView, RenderSnapshot};

use crate::config::EditorConfig;
use crate::nodes::{Edge, GraphStore, NodeId, NodeRegistry, PortDirection, PortRef, Position};
use egui::{Key, PointerButton, Pos2, Rect, Vec2};
use log::debug;
use std::collections::HashMap;

/// Interactive editor over a caller-owned graph store
#[derive(Debug, Clone, Default)]
pub struct GraphEditor {
    config: EditorConfig,
    state: InteractionState,
    ports: PortRegistry,
    node_sizes: HashMap<NodeId, Vec2>,
    /// Committed canvas pan; never written into node positions
    pan: Vec2,
    /// Button that started the current drag; only its release ends it
    drag_button: Option<PointerButton>,
}

impl GraphEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Current pan offset, including an in-flight background drag
    pub fn pan(&self) -> Vec2 {
        self.pan + self.state.pan_delta()
    }

    pub fn ports(&self) -> &PortRegistry {
        &self.ports
    }

    /// Port registry for renderers that report their own port positions
    pub fn ports_mut(&mut self) -> &mut PortRegistry {
        &mut self.ports
    }

    /// Record the size a node was drawn at
    pub fn set_node_size(&mut self, node_id: NodeId, size: Vec2) {
        self.node_sizes.insert(node_id, size);
    }

    pub fn node_size(&self, node_id: NodeId) -> Vec2 {
        self.node_sizes
            .get(&node_id)
            .copied()
            .unwrap_or(self.config.default_node_size)
    }

    /// Screen position of a node's top-left corner, with pan and drag applied
    pub fn node_origin(&self, node_id: NodeId, store: &dyn GraphStore) -> Option<Pos2> {
        let node = store.nodes().iter().find(|node| node.id == node_id)?;
        Some(Pos2::from(node.position) + self.pan() + self.state.drag_delta(node_id))
    }

    pub fn node_rect(&self, node_id: NodeId, store: &dyn GraphStore) -> Option<Rect> {
        let origin = self.node_origin(node_id, store)?;
        Some(Rect::from_min_size(origin, self.node_size(node_id)))
    }

    /// Screen position of a port, if its node exists and has a layout
    pub fn port_position(&self, port: &PortRef, store: &dyn GraphStore) -> Option<Pos2> {
        let origin = self.node_origin(port.node_id, store)?;
        self.ports.screen_position(port, origin)
    }

    /// Producer and consumer port centres of an edge
    pub fn edge_endpoints(&self, edge: &Edge, store: &dyn GraphStore) -> Option<(Pos2, Pos2)> {
        Some((
            self.port_position(&edge.producer(), store)?,
            self.port_position(&edge.consumer(), store)?,
        ))
    }

    /// Convert a screen position to graph coordinates
    pub fn to_graph(&self, pos: Pos2) -> Position {
        Position::from(pos - self.pan())
    }

    /// Bring port layouts in line with the store's nodes.
    ///
    /// Nodes without registered ports get the default layout; layouts of
    /// nodes that are gone are dropped.
    pub fn sync_layout(&mut self, store: &dyn GraphStore, registry: &NodeRegistry) {
        let nodes = store.nodes();
        self.ports.retain_nodes(|id| nodes.iter().any(|node| node.id == id));
        self.node_sizes.retain(|id, _| nodes.iter().any(|node| node.id == *id));

        for node in nodes {
            if self.ports.contains_node(node.id) {
                continue;
            }
            if let Some(definition) = registry.get(&node.type_name) {
                let size = self.node_size(node.id);
                self.ports
                    .layout_default(node.id, definition, size, self.config.port_spacing);
            }
        }
    }

    /// Feed one input event through the state machine.
    ///
    /// Returns true if a change was committed to the store.
    pub fn handle_event(&mut self, event: EditorEvent, store: &mut dyn GraphStore, registry: &NodeRegistry) -> bool {
        self.sync_layout(store, registry);

        match event {
            EditorEvent::PointerPressed { pos, button } => self.pointer_pressed(pos, button, store),
            EditorEvent::PointerMoved { pos } => {
                self.state.track(pos);
                false
            }
            EditorEvent::PointerReleased { pos, button } => self.pointer_released(pos, button, store, registry),
            EditorEvent::PointerCancelled | EditorEvent::KeyPressed(Key::Escape) => {
                self.cancel();
                false
            }
            EditorEvent::KeyPressed(_) => false,
            EditorEvent::MenuSelected(action) => self.menu_selected(action, store, registry),
        }
    }

    /// Abandon the current gesture or close the open menu without side effects
    pub fn cancel(&mut self) {
        if !self.state.is_idle() {
            debug!("Cancelled {:?}", self.state);
        }
        self.state = InteractionState::Idle;
        self.drag_button = None;
    }

    /// Delete a node together with every edge referencing it, as one commit
    pub fn delete_node(&mut self, node_id: NodeId, store: &mut dyn GraphStore) {
        if self.state.involves_node(node_id) {
            self.state = InteractionState::Idle;
        }

        store.begin_batch();
        let edges: Vec<Edge> = store.edges().iter().filter(|edge| !edge.references(node_id)).cloned().collect();
        if edges.len() != store.edges().len() {
            store.on_edges_change(edges);
        }
        let nodes = store.nodes().iter().filter(|node| node.id != node_id).cloned().collect();
        store.on_nodes_change(nodes);
        store.on_node_deleted(node_id);
        store.end_batch();

        self.ports.remove_node(node_id);
        self.node_sizes.remove(&node_id);
        debug!("Deleted node {}", node_id);
    }

    fn pointer_pressed(&mut self, pos: Pos2, button: PointerButton, store: &mut dyn GraphStore) -> bool {
        // A click anywhere closes the menu before being handled
        if self.state.open_menu().is_some() {
            self.state = InteractionState::Idle;
        } else if !self.state.is_idle() {
            return false;
        }

        match button {
            PointerButton::Primary => match self.hit_test(pos, store) {
                Hit::Port(origin) => {
                    self.state = InteractionState::DraggingConnection { origin, current: pos };
                }
                Hit::DeleteButton(node_id) => {
                    self.delete_node(node_id, store);
                    return true;
                }
                Hit::NodeHeader(node_id) => {
                    self.state = InteractionState::DraggingNode {
                        node_id,
                        start: pos,
                        current: pos,
                    };
                }
                Hit::NodeBody(_) => {}
                Hit::Edge(_) | Hit::Background => {
                    self.state = InteractionState::DraggingBackground { start: pos, current: pos };
                }
            },
            PointerButton::Secondary => match self.hit_test(pos, store) {
                Hit::Edge(edge) => {
                    self.state = InteractionState::MenuOpen {
                        kind: MenuKind::Edge(edge),
                        position: pos,
                    };
                }
                Hit::Background => {
                    self.state = InteractionState::MenuOpen {
                        kind: MenuKind::CreateNode,
                        position: pos,
                    };
                }
                _ => {}
            },
            PointerButton::Middle => {
                self.state = InteractionState::DraggingBackground { start: pos, current: pos };
            }
            PointerButton::Extra1 | PointerButton::Extra2 => {}
        }

        if self.state.is_dragging() {
            self.drag_button = Some(button);
        }
        false
    }

    fn pointer_released(
        &mut self,
        pos: Pos2,
        button: PointerButton,
        store: &mut dyn GraphStore,
        registry: &NodeRegistry,
    ) -> bool {
        // Releasing the press that opened a menu keeps it open
        if !self.state.is_dragging() || self.drag_button != Some(button) {
            return false;
        }
        self.drag_button = None;
        self.state.track(pos);

        match std::mem::take(&mut self.state) {
            InteractionState::DraggingNode { node_id, start, .. } => {
                let delta = pos - start;
                if delta == Vec2::ZERO {
                    return false;
                }

                let mut nodes = store.nodes().to_vec();
                let Some(node) = nodes.iter_mut().find(|node| node.id == node_id) else {
                    return false;
                };
                node.position = node.position + delta;
                store.on_nodes_change(nodes);
                true
            }
            InteractionState::DraggingBackground { start, .. } => {
                self.pan += pos - start;
                false
            }
            InteractionState::DraggingConnection { origin, .. } => self.finish_connection(origin, pos, store, registry),
            InteractionState::Idle | InteractionState::MenuOpen { .. } => false,
        }
    }

    /// Turn a wire dropped at `pos` into an edge, or drop it silently
    fn finish_connection(
        &mut self,
        origin: PortRef,
        pos: Pos2,
        store: &mut dyn GraphStore,
        registry: &NodeRegistry,
    ) -> bool {
        let Some(target) = self.port_at(pos, store) else {
            return false;
        };
        let edge = match (origin.direction, target.direction) {
            (a, b) if a == b => return false,
            (PortDirection::Output, _) => {
                Edge::new(origin.node_id, origin.name, target.node_id, target.name)
            }
            (PortDirection::Input, _) => {
                Edge::new(target.node_id, target.name, origin.node_id, origin.name)
            }
        };

        if let Err(err) = registry.validate_edge(store.nodes(), store.edges(), &edge) {
            debug!("Discarded connection {}: {}", edge, err);
            return false;
        }

        let mut edges = store.edges().to_vec();
        edges.push(edge);
        store.on_edges_change(edges);
        true
    }

    fn menu_selected(&mut self, action: MenuAction, store: &mut dyn GraphStore, registry: &NodeRegistry) -> bool {
        if self.state.open_menu().is_none() {
            return false;
        }
        let InteractionState::MenuOpen { kind, position } = std::mem::take(&mut self.state) else {
            return false;
        };

        match (kind, action) {
            (MenuKind::CreateNode, MenuAction::CreateNode(type_name)) => {
                let (node, state) = match registry.create_node(&type_name, self.to_graph(position)) {
                    Ok(created) => created,
                    Err(err) => {
                        debug!("Menu could not create node: {}", err);
                        return false;
                    }
                };

                let node_id = node.id;
                let mut nodes = store.nodes().to_vec();
                nodes.push(node);

                store.begin_batch();
                store.on_nodes_change(nodes);
                store.on_state_change(node_id, state);
                store.end_batch();

                self.sync_layout(store, registry);
                true
            }
            (MenuKind::Edge(edge), MenuAction::DeleteEdge) => {
                let edges: Vec<Edge> = store.edges().iter().filter(|existing| **existing != edge).cloned().collect();
                if edges.len() == store.edges().len() {
                    return false;
                }
                store.on_edges_change(edges);
                true
            }
            _ => false,
        }
    }
}
