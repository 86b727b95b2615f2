//! Editor configuration

use crate::constants;
use egui::Vec2;
use serde::{Deserialize, Serialize};

/// Tunable geometry for hit-testing and default layout.
///
/// Every field falls back to the value in [`crate::constants`] when it is
/// missing from a deserialized document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Size used for nodes whose renderer never reported one
    #[serde(with = "vec2_serde")]
    pub default_node_size: Vec2,
    pub header_height: f32,
    pub delete_button_size: f32,
    pub port_hit_radius: f32,
    pub port_spacing: f32,
    pub edge_hit_tolerance: f32,
}

impl EditorConfig {
    /// Parse a configuration from JSON, filling gaps with defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_node_size: Vec2::new(constants::node::DEFAULT_WIDTH, constants::node::DEFAULT_HEIGHT),
            header_height: constants::node::HEADER_HEIGHT,
            delete_button_size: constants::node::DELETE_BUTTON_SIZE,
            port_hit_radius: constants::port::HIT_RADIUS,
            port_spacing: constants::port::SPACING,
            edge_hit_tolerance: constants::edge::HIT_TOLERANCE,
        }
    }
}

mod vec2_serde {
    use egui::Vec2;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(vec: &Vec2, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        [vec.x, vec.y].serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec2, D::Error>
    where
        D: Deserializer<'de>,
    {
        let [x, y] = <[f32; 2]>::deserialize(deserializer)?;
        Ok(Vec2::new(x, y))
    }
}
