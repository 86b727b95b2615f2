//! Context menus: node creation and edge deletion

use crate::nodes::{Edge, NodeRegistry};
use egui::Pos2;

/// Which menu is open
#[derive(Debug, Clone, PartialEq)]
pub enum MenuKind {
    /// Opened on empty canvas; lists every registered node type
    CreateNode,
    /// Opened on an edge
    Edge(Edge),
}

/// An entry picked from the open menu
#[derive(Debug, Clone, PartialEq)]
pub enum MenuAction {
    CreateNode(String),
    DeleteEdge,
}

/// A menu as the renderer should draw it
#[derive(Debug, Clone, PartialEq)]
pub struct MenuView {
    pub kind: MenuKind,
    /// Top-left corner in screen space
    pub position: Pos2,
    /// Entries in display order, each with the action it triggers
    pub entries: Vec<(String, MenuAction)>,
}

impl MenuView {
    pub fn new(kind: &MenuKind, position: Pos2, registry: &NodeRegistry) -> Self {
        let entries = match kind {
            MenuKind::CreateNode => registry
                .type_names()
                .into_iter()
                .map(|name| (name.to_string(), MenuAction::CreateNode(name.to_string())))
                .collect(),
            MenuKind::Edge(_) => vec![("Delete".to_string(), MenuAction::DeleteEdge)],
        };

        Self {
            kind: kind.clone(),
            position,
            entries,
        }
    }

    /// Check if picking `action` makes sense for this menu
    pub fn offers(&self, action: &MenuAction) -> bool {
        self.entries.iter().any(|(_, entry)| entry == action)
    }
}
