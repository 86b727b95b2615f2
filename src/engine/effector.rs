//! Connection effector
//!
//! Applies a [`Binding`] to the live engine. Every cycle is a full rebuild:
//! all connections from the previous cycle are retracted before the new set
//! is made, so the engine never holds a connection the graph no longer
//! declares.

use super::binder::Binding;
use super::handle::{Handle, Pulse, Scalar, Signal};
use crate::nodes::Edge;
use log::{debug, info};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

type Retract = Box<dyn FnOnce()>;

/// An applied connection and how to undo it
struct Disposer {
    edge: Edge,
    retract: Retract,
}

/// Outcome of one apply cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    /// Connections made
    pub applied: usize,
    /// Connections retracted from the previous cycle
    pub torn_down: usize,
    /// Edges with an end that has no live handle yet
    pub skipped_unresolved: usize,
    /// Edges whose handle kinds cannot be connected
    pub skipped_invalid: usize,
    /// Edges naming a vanished node or port; the store should forget them
    pub dropped: Vec<Edge>,
}

/// Owns the live connections made on behalf of the graph
#[derive(Default)]
pub struct ConnectionEffector {
    applied: Vec<Disposer>,
}

impl ConnectionEffector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retract the previous cycle, then connect every usable edge once
    pub fn apply(&mut self, binding: &Binding, edges: &[Edge]) -> ApplyReport {
        let mut report = ApplyReport {
            torn_down: self.teardown(),
            ..ApplyReport::default()
        };

        let mut seen = HashSet::new();
        for edge in edges {
            if !seen.insert(edge) {
                continue;
            }
            if binding.is_invalid(edge) {
                report.skipped_invalid += 1;
                continue;
            }

            let ports = (binding.port(&edge.producer()), binding.port(&edge.consumer()));
            let (Some(producer), Some(consumer)) = ports else {
                info!("Dropping dangling edge {}", edge);
                report.dropped.push(edge.clone());
                continue;
            };
            if !producer.kind.can_connect_to(consumer.kind) {
                report.skipped_invalid += 1;
                continue;
            }

            let (Some(producer), Some(consumer)) = (&producer.local, &consumer.local) else {
                report.skipped_unresolved += 1;
                continue;
            };
            match connect(producer, consumer) {
                Some(retract) => {
                    self.applied.push(Disposer {
                        edge: edge.clone(),
                        retract,
                    });
                    report.applied += 1;
                }
                None => {
                    debug!("Handle kinds {} -> {} cannot connect for {}", producer.kind(), consumer.kind(), edge);
                    report.skipped_invalid += 1;
                }
            }
        }

        debug!(
            "Applied {} connections (torn down {}, {} unresolved, {} invalid, {} dropped)",
            report.applied,
            report.torn_down,
            report.skipped_unresolved,
            report.skipped_invalid,
            report.dropped.len()
        );
        report
    }

    /// Retract every applied connection, newest first; returns how many
    pub fn teardown(&mut self) -> usize {
        let count = self.applied.len();
        for disposer in self.applied.drain(..).rev() {
            (disposer.retract)();
        }
        count
    }

    pub fn active_connections(&self) -> usize {
        self.applied.len()
    }

    /// Edges currently connected in the engine
    pub fn connected_edges(&self) -> impl Iterator<Item = &Edge> {
        self.applied.iter().map(|disposer| &disposer.edge)
    }
}

impl fmt::Debug for ConnectionEffector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionEffector")
            .field("edges", &self.connected_edges().collect::<Vec<_>>())
            .finish()
    }
}

/// Connect two handles by kind, returning the retraction
fn connect(producer: &Handle, consumer: &Handle) -> Option<Retract> {
    match (producer, consumer) {
        (Handle::Signal(producer), Handle::Signal(consumer)) => Some(signal_to_signal(producer, consumer)),
        (Handle::Signal(producer), Handle::Scalar(consumer)) => Some(signal_to_scalar(producer, consumer)),
        (Handle::Scalar(producer), Handle::Scalar(consumer)) => Some(scalar_to_scalar(producer, consumer)),
        (Handle::Pulse(producer), Handle::Pulse(consumer)) => Some(pulse_to_pulse(producer, consumer)),
        (Handle::Signal(_), Handle::Pulse(_))
        | (Handle::Scalar(_), Handle::Signal(_) | Handle::Pulse(_))
        | (Handle::Pulse(_), Handle::Signal(_) | Handle::Scalar(_)) => None,
    }
}

fn signal_to_signal(producer: &Rc<dyn Signal>, consumer: &Rc<dyn Signal>) -> Retract {
    producer.connect_signal(consumer);
    let (producer, consumer) = (Rc::clone(producer), Rc::clone(consumer));
    Box::new(move || producer.disconnect_signal(&consumer))
}

fn signal_to_scalar(producer: &Rc<dyn Signal>, consumer: &Rc<dyn Scalar>) -> Retract {
    producer.connect_scalar(consumer);
    let (producer, consumer) = (Rc::clone(producer), Rc::clone(consumer));
    Box::new(move || producer.disconnect_scalar(&consumer))
}

fn scalar_to_scalar(producer: &Rc<dyn Scalar>, consumer: &Rc<dyn Scalar>) -> Retract {
    producer.connect(consumer);
    let (producer, consumer) = (Rc::clone(producer), Rc::clone(consumer));
    Box::new(move || producer.disconnect(&consumer))
}

fn pulse_to_pulse(producer: &Rc<dyn Pulse>, consumer: &Rc<dyn Pulse>) -> Retract {
    producer.connect(consumer);
    let (producer, consumer) = (Rc::clone(producer), Rc::clone(consumer));
    Box::new(move || producer.disconnect(&consumer))
}
