//! Interaction state machine states

use super::menus::MenuKind;
use crate::nodes::{NodeId, PortRef};
use egui::{Pos2, Vec2};

/// What the pointer is currently doing.
///
/// There is no terminal state: every gesture ends back in `Idle` (or in
/// `MenuOpen` when the gesture opened a menu).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// A node header was grabbed; the stored position is untouched until release
    DraggingNode {
        node_id: NodeId,
        start: Pos2,
        current: Pos2,
    },
    /// The canvas is being panned
    DraggingBackground { start: Pos2, current: Pos2 },
    /// A wire is being drawn from `origin` to the pointer
    DraggingConnection { origin: PortRef, current: Pos2 },
    MenuOpen { kind: MenuKind, position: Pos2 },
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    /// True for the three drag states
    pub fn is_dragging(&self) -> bool {
        matches!(
            self,
            InteractionState::DraggingNode { .. }
                | InteractionState::DraggingBackground { .. }
                | InteractionState::DraggingConnection { .. }
        )
    }

    /// Update the pointer position of an in-flight drag
    pub fn track(&mut self, pos: Pos2) {
        match self {
            InteractionState::DraggingNode { current, .. }
            | InteractionState::DraggingBackground { current, .. }
            | InteractionState::DraggingConnection { current, .. } => *current = pos,
            InteractionState::Idle | InteractionState::MenuOpen { .. } => {}
        }
    }

    /// Visual offset of a node being dragged
    pub fn drag_delta(&self, node_id: NodeId) -> Vec2 {
        match self {
            InteractionState::DraggingNode {
                node_id: dragged,
                start,
                current,
            } if *dragged == node_id => *current - *start,
            _ => Vec2::ZERO,
        }
    }

    /// Pan offset not yet committed by a background drag
    pub fn pan_delta(&self) -> Vec2 {
        match self {
            InteractionState::DraggingBackground { start, current } => *current - *start,
            _ => Vec2::ZERO,
        }
    }

    /// Origin port and pointer position of an in-flight wire
    pub fn pending_connection(&self) -> Option<(&PortRef, Pos2)> {
        match self {
            InteractionState::DraggingConnection { origin, current } => Some((origin, *current)),
            _ => None,
        }
    }

    pub fn open_menu(&self) -> Option<(&MenuKind, Pos2)> {
        match self {
            InteractionState::MenuOpen { kind, position } => Some((kind, *position)),
            _ => None,
        }
    }

    /// Check if the state refers to the given node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        match self {
            InteractionState::DraggingNode { node_id: dragged, .. } => *dragged == node_id,
            InteractionState::DraggingConnection { origin, .. } => origin.node_id == node_id,
            InteractionState::MenuOpen {
                kind: MenuKind::Edge(edge),
                ..
            } => edge.references(node_id),
            _ => false,
        }
    }
}
