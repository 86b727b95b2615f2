//! Input events consumed by the graph editor
//!
//! The host translates its windowing toolkit's input into these. Positions
//! are in screen space, the same space the port registry and render
//! snapshot use.

use super::menus::MenuAction;
use egui::{Key, PointerButton, Pos2};

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    PointerPressed { pos: Pos2, button: PointerButton },
    PointerMoved { pos: Pos2 },
    PointerReleased { pos: Pos2, button: PointerButton },
    /// Pointer left the canvas or the window lost focus
    PointerCancelled,
    KeyPressed(Key),
    /// An entry of the open menu was picked
    MenuSelected(MenuAction),
}

impl EditorEvent {
    pub fn press(pos: Pos2) -> Self {
        EditorEvent::PointerPressed {
            pos,
            button: PointerButton::Primary,
        }
    }

    pub fn release(pos: Pos2) -> Self {
        EditorEvent::PointerReleased {
            pos,
            button: PointerButton::Primary,
        }
    }

    pub fn right_click(pos: Pos2) -> Self {
        EditorEvent::PointerPressed {
            pos,
            button: PointerButton::Secondary,
        }
    }

    pub fn move_to(pos: Pos2) -> Self {
        EditorEvent::PointerMoved { pos }
    }

    /// Pointer position carried by the event, if any
    pub fn pos(&self) -> Option<Pos2> {
        match self {
            EditorEvent::PointerPressed { pos, .. }
            | EditorEvent::PointerMoved { pos }
            | EditorEvent::PointerReleased { pos, .. } => Some(*pos),
            _ => None,
        }
    }
}
