//! Live engine binding
//!
//! This module keeps the declarative graph and the live engine in step:
//! - [`cache`]: one persistent engine object per node id
//! - [`binder`]: pure resolution of what every port is connected to
//! - [`effector`]: connect/disconnect side effects on live handles
//! - [`handle`], [`aggregate`]: the kind-tagged handle types and fan-out wrappers
//! - [`relay`], [`envelope`]: reusable handle implementations for node authors

pub mod aggregate;
pub mod binder;
pub mod cache;
pub mod effector;
pub mod envelope;
pub mod handle;
pub mod relay;

#[cfg(test)]
pub(crate) mod testing;

use crate::constants;
use std::any::Any;
use std::rc::Rc;

pub use aggregate::{Aggregate, AggregatedMixed, AggregatedPulse, AggregatedScalar, AggregatedSignal};
pub use binder::{bind, Binding, BoundNode, BoundPort, Resolved};
pub use cache::{CacheStatistics, EngineObjectCache};
pub use effector::{ApplyReport, ConnectionEffector};
pub use envelope::{EnvelopeOptions, EnvelopedPulse, EnvelopedScalar};
pub use handle::{Handle, Pulse, Scalar, Signal};
pub use relay::{CallbackPulse, PulseRelay, ScalarRelay};

/// Opaque live runtime object backing one node
pub type EngineObject = Rc<dyn Any>;

/// Shared settings handed to every node factory
#[derive(Debug, Clone, PartialEq)]
pub struct EngineContext {
    pub sample_rate: f32,
}

impl EngineContext {
    pub fn new(sample_rate: f32) -> Self {
        Self { sample_rate }
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new(constants::engine::DEFAULT_SAMPLE_RATE)
    }
}
