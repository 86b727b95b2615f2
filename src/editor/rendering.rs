//! Render snapshot: everything a painter needs to draw one frame
//!
//! The editor does not paint. A host asks for a [`RenderSnapshot`] each
//! frame and draws it with whatever toolkit it uses. Positions already have
//! pan and the in-flight drag delta applied.

use super::{GraphEditor, InteractionState, MenuView};
use crate::nodes::{Edge, GraphStore, NodeId, NodeRegistry, PortKind, PortRef};
use egui::{Pos2, Rect};

#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    pub id: NodeId,
    pub type_name: String,
    pub rect: Rect,
    pub delete_button: Rect,
    /// True while this node follows the pointer
    pub dragging: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeView {
    pub edge: Edge,
    pub from: Pos2,
    pub to: Pos2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortView {
    pub port: PortRef,
    pub kind: PortKind,
    pub center: Pos2,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderSnapshot {
    /// Nodes in draw order, last on top
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    pub ports: Vec<PortView>,
    /// Wire being drawn, from the origin port to the pointer
    pub pending_connection: Option<(Pos2, Pos2)>,
    pub menu: Option<MenuView>,
}

impl GraphEditor {
    /// Build the snapshot for the current frame.
    ///
    /// Edges whose ports have no layout are left out rather than drawn to a
    /// made-up position.
    pub fn render_snapshot(&self, store: &dyn GraphStore, registry: &NodeRegistry) -> RenderSnapshot {
        let mut snapshot = RenderSnapshot::default();

        for node in store.nodes() {
            let Some(rect) = self.node_rect(node.id, store) else {
                continue;
            };
            snapshot.nodes.push(NodeView {
                id: node.id,
                type_name: node.type_name.clone(),
                rect,
                delete_button: self.delete_button_rect(rect),
                dragging: matches!(
                    self.state(),
                    InteractionState::DraggingNode { node_id, .. } if *node_id == node.id
                ),
            });

            let Some(origin) = self.node_origin(node.id, store) else {
                continue;
            };
            let mut ports: Vec<PortView> = self
                .ports()
                .ports_of(node.id)
                .filter_map(|(port, offset)| {
                    let kind = registry.port_kind(node, port.direction, &port.name)?;
                    Some(PortView {
                        port: port.clone(),
                        kind,
                        center: origin + offset,
                    })
                })
                .collect();
            ports.sort_by(|a, b| a.port.is_output().cmp(&b.port.is_output()).then_with(|| a.port.name.cmp(&b.port.name)));
            snapshot.ports.extend(ports);
        }

        snapshot.edges = store
            .edges()
            .iter()
            .filter_map(|edge| {
                let (from, to) = self.edge_endpoints(edge, store)?;
                Some(EdgeView {
                    edge: edge.clone(),
                    from,
                    to,
                })
            })
            .collect();

        snapshot.pending_connection = self
            .state()
            .pending_connection()
            .and_then(|(origin, pointer)| Some((self.port_position(origin, store)?, pointer)));

        snapshot.menu = self
            .state()
            .open_menu()
            .map(|(kind, position)| MenuView::new(kind, position, registry));

        snapshot
    }
}
