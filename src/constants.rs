//! Default values shared by the editor and the engine binding layer
//!
//! Centralized location for hard-coded values; [`crate::config::EditorConfig`]
//! starts from these and may override them.

/// Node box geometry defaults
pub mod node {
    /// Default node width in screen pixels
    pub const DEFAULT_WIDTH: f32 = 150.0;

    /// Default node height in screen pixels
    pub const DEFAULT_HEIGHT: f32 = 80.0;

    /// Height of the draggable header strip at the top of every node
    pub const HEADER_HEIGHT: f32 = 24.0;

    /// Side length of the square delete button at the right end of the header
    pub const DELETE_BUTTON_SIZE: f32 = 18.0;
}

/// Port geometry defaults
pub mod port {
    /// Hit radius around a port centre (ports are drawn 14px wide)
    pub const HIT_RADIUS: f32 = 7.0;

    /// Horizontal spacing between neighbouring ports on the same edge of a node
    pub const SPACING: f32 = 30.0;
}

/// Edge geometry defaults
pub mod edge {
    /// Maximum distance from an edge line that still counts as a hit
    pub const HIT_TOLERANCE: f32 = 5.0;
}

/// Engine defaults
pub mod engine {
    /// Sample rate handed to node factories when none is configured
    pub const DEFAULT_SAMPLE_RATE: f32 = 44_100.0;
}
