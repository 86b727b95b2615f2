//! Port kinds, directions and connection legality

use super::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection semantics of a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortKind {
    /// Continuous, reference-connected signal
    Signal,
    /// Time-varying numeric control value
    Scalar,
    /// Discrete start/stop timed event
    Pulse,
}

impl PortKind {
    /// Check whether a producer of this kind may feed a consumer of `consumer` kind.
    ///
    /// A continuous signal may also drive a scalar control; every other
    /// pairing must match exactly.
    pub fn can_connect_to(self, consumer: PortKind) -> bool {
        matches!(
            (self, consumer),
            (PortKind::Signal, PortKind::Signal)
                | (PortKind::Signal, PortKind::Scalar)
                | (PortKind::Scalar, PortKind::Scalar)
                | (PortKind::Pulse, PortKind::Pulse)
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            PortKind::Signal => "signal",
            PortKind::Scalar => "scalar",
            PortKind::Pulse => "pulse",
        }
    }
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which side of a node a port sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    Input,
    Output,
}

impl PortDirection {
    pub fn opposite(self) -> PortDirection {
        match self {
            PortDirection::Input => PortDirection::Output,
            PortDirection::Output => PortDirection::Input,
        }
    }
}

/// Fully qualified address of a port
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRef {
    pub node_id: NodeId,
    pub direction: PortDirection,
    pub name: String,
}

impl PortRef {
    pub fn new(node_id: NodeId, direction: PortDirection, name: impl Into<String>) -> Self {
        Self {
            node_id,
            direction,
            name: name.into(),
        }
    }

    pub fn input(node_id: NodeId, name: impl Into<String>) -> Self {
        Self {
            node_id,
            direction: PortDirection::Input,
            name: name.into(),
        }
    }

    pub fn output(node_id: NodeId, name: impl Into<String>) -> Self {
        Self {
            node_id,
            direction: PortDirection::Output,
            name: name.into(),
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(self.direction, PortDirection::Input)
    }

    pub fn is_output(&self) -> bool {
        matches!(self.direction, PortDirection::Output)
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.direction {
            PortDirection::Input => "in",
            PortDirection::Output => "out",
        };
        write!(f, "{}:{}:{}", self.node_id, side, self.name)
    }
}
