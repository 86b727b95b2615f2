//! Persisted node position

use egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};
use std::ops::Add;

/// Position of a node's top-left corner in graph coordinates.
///
/// This is what gets persisted. Pan offsets and in-flight drag deltas are
/// applied on top of it at render time and never written back here.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub top: f32,
    pub left: f32,
}

impl Position {
    pub const ORIGIN: Position = Position { top: 0.0, left: 0.0 };

    pub fn new(top: f32, left: f32) -> Self {
        Self { top, left }
    }
}

impl From<Pos2> for Position {
    fn from(pos: Pos2) -> Self {
        Self { top: pos.y, left: pos.x }
    }
}

impl From<Position> for Pos2 {
    fn from(position: Position) -> Self {
        Pos2::new(position.left, position.top)
    }
}

impl Add<Vec2> for Position {
    type Output = Position;

    fn add(self, delta: Vec2) -> Position {
        Position {
            top: self.top + delta.y,
            left: self.left + delta.x,
        }
    }
}
