//! Patchwire core library
//!
//! Keeps a live signal engine wired to a declarative node graph. The
//! library is split into three layers:
//!
//! - [`nodes`]: the declarative graph (nodes, ports, edges) and the node
//!   definition registry that describes every node type.
//! - [`engine`]: the engine object cache, the dataflow binder that resolves
//!   what each port is connected to, and the connection effector that
//!   applies those resolutions to live handles.
//! - [`editor`]: the pointer-driven interaction state machine that turns
//!   user gestures into graph store mutations.
//!
//! [`Patch`] glues the layers together and re-binds the engine after every
//! committed graph change.

pub mod config;
pub mod constants;
pub mod editor;
pub mod engine;
pub mod error;
pub mod math;
pub mod nodes;
pub mod patch;

pub use config::EditorConfig;
pub use editor::{
    EditorEvent, GraphEditor, Hit, InteractionState, MenuAction, MenuKind, MenuView, PortRegistry,
    RenderSnapshot,
};
pub use engine::{
    bind, Aggregate, AggregatedMixed, ApplyReport, Binding, BoundNode, BoundPort, CallbackPulse, ConnectionEffector,
    EngineContext, EngineObject, EngineObjectCache, EnvelopeOptions, EnvelopedPulse, EnvelopedScalar,
    Handle, Pulse, PulseRelay, Resolved, Scalar, ScalarRelay, Signal,
};
pub use error::GraphError;
pub use nodes::{
    Edge, GraphStore, Node, NodeDefinition, NodeGraph, NodeId, NodeRegistry, PersistedState,
    PortDefinition, PortDirection, PortKind, PortRef, Position,
};
pub use patch::Patch;

// Re-export the screen-space geometry types used by the editor
pub use egui::{Pos2, Rect, Vec2};
