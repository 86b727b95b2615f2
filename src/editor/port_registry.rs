//! On-screen port positions
//!
//! Ports are stored as offsets from their node's top-left corner, so they
//! stay valid while a node is dragged or the canvas is panned. A renderer
//! that knows better where it drew a port can overwrite the default layout
//! with [`PortRegistry::register`].

use crate::nodes::{NodeDefinition, NodeId, PortDirection, PortRef};
use egui::{Pos2, Vec2};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct PortRegistry {
    offsets: HashMap<PortRef, Vec2>,
}

impl PortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record where a port sits relative to its node's origin
    pub fn register(&mut self, port: PortRef, offset: Vec2) {
        self.offsets.insert(port, offset);
    }

    pub fn offset(&self, port: &PortRef) -> Option<Vec2> {
        self.offsets.get(port).copied()
    }

    /// Screen position of a port given where its node is drawn
    pub fn screen_position(&self, port: &PortRef, node_origin: Pos2) -> Option<Pos2> {
        self.offset(port).map(|offset| node_origin + offset)
    }

    pub fn contains_node(&self, node_id: NodeId) -> bool {
        self.offsets.keys().any(|port| port.node_id == node_id)
    }

    /// Forget every port of a node
    pub fn remove_node(&mut self, node_id: NodeId) {
        self.offsets.retain(|port, _| port.node_id != node_id);
    }

    /// Forget ports of nodes not accepted by `keep`
    pub fn retain_nodes(&mut self, mut keep: impl FnMut(NodeId) -> bool) {
        self.offsets.retain(|port, _| keep(port.node_id));
    }

    /// Ports of one node with their offsets
    pub fn ports_of(&self, node_id: NodeId) -> impl Iterator<Item = (&PortRef, Vec2)> {
        self.offsets
            .iter()
            .filter(move |(port, _)| port.node_id == node_id)
            .map(|(port, offset)| (port, *offset))
    }

    /// Lay out a node's ports the default way.
    ///
    /// Inputs are spread across the top edge and outputs across the bottom
    /// edge, `spacing` apart and centred on the node.
    pub fn layout_default(&mut self, node_id: NodeId, definition: &NodeDefinition, size: Vec2, spacing: f32) {
        for direction in [PortDirection::Input, PortDirection::Output] {
            let ports = definition.ports(direction);
            let y = match direction {
                PortDirection::Input => 0.0,
                PortDirection::Output => size.y,
            };
            let start_x = if ports.len() > 1 {
                (size.x - (ports.len() - 1) as f32 * spacing) / 2.0
            } else {
                size.x / 2.0
            };

            for (i, port) in ports.iter().enumerate() {
                let offset = Vec2::new(start_x + i as f32 * spacing, y);
                self.register(PortRef::new(node_id, direction, port.name.clone()), offset);
            }
        }
    }

    /// The port closest to `pos` within `radius`.
    ///
    /// `node_origin` maps a node id to where that node is currently drawn;
    /// ports of nodes it has no answer for are ignored.
    pub fn port_at(&self, pos: Pos2, node_origin: impl Fn(NodeId) -> Option<Pos2>, radius: f32) -> Option<PortRef> {
        self.offsets
            .iter()
            .filter_map(|(port, offset)| {
                let center = node_origin(port.node_id)? + *offset;
                let distance = center.distance(pos);
                (distance <= radius).then_some((port, distance))
            })
            .min_by(|(a, da), (b, db)| da.total_cmp(db).then_with(|| a.name.cmp(&b.name)))
            .map(|(port, _)| port.clone())
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}
