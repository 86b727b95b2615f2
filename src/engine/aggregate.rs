//! Fan-out wrappers for ports with more than one connection
//!
//! An aggregate stands in for N handles. Every mutating call is forwarded to
//! each wrapped handle in edge-declaration order, so a node can drive
//! "whatever is connected" without knowing how many consumers there are.

use super::handle::{Handle, Pulse, Scalar, Signal};
use crate::nodes::PortKind;
use log::debug;
use std::fmt;
use std::rc::Rc;

pub struct AggregatedSignal {
    signals: Vec<Rc<dyn Signal>>,
}

impl AggregatedSignal {
    pub fn new(signals: Vec<Rc<dyn Signal>>) -> Self {
        Self { signals }
    }

    pub fn signals(&self) -> &[Rc<dyn Signal>] {
        &self.signals
    }
}

impl Signal for AggregatedSignal {
    fn connect_signal(&self, target: &Rc<dyn Signal>) {
        self.signals.iter().for_each(|signal| signal.connect_signal(target));
    }

    fn disconnect_signal(&self, target: &Rc<dyn Signal>) {
        self.signals.iter().for_each(|signal| signal.disconnect_signal(target));
    }

    fn connect_scalar(&self, target: &Rc<dyn Scalar>) {
        self.signals.iter().for_each(|signal| signal.connect_scalar(target));
    }

    fn disconnect_scalar(&self, target: &Rc<dyn Scalar>) {
        self.signals.iter().for_each(|signal| signal.disconnect_scalar(target));
    }
}

pub struct AggregatedScalar {
    scalars: Vec<Rc<dyn Scalar>>,
}

impl AggregatedScalar {
    pub fn new(scalars: Vec<Rc<dyn Scalar>>) -> Self {
        Self { scalars }
    }

    pub fn scalars(&self) -> &[Rc<dyn Scalar>] {
        &self.scalars
    }
}

impl Scalar for AggregatedScalar {
    fn set_value_at_time(&self, value: f64, start_time: f64) {
        self.scalars.iter().for_each(|scalar| scalar.set_value_at_time(value, start_time));
    }

    fn linear_ramp_to_value_at_time(&self, value: f64, end_time: f64) {
        self.scalars.iter().for_each(|scalar| scalar.linear_ramp_to_value_at_time(value, end_time));
    }

    fn exponential_ramp_to_value_at_time(&self, value: f64, end_time: f64) {
        self.scalars
            .iter()
            .for_each(|scalar| scalar.exponential_ramp_to_value_at_time(value, end_time));
    }

    fn set_target_at_time(&self, target: f64, start_time: f64, time_constant: f64) {
        self.scalars
            .iter()
            .for_each(|scalar| scalar.set_target_at_time(target, start_time, time_constant));
    }

    fn set_value_curve_at_time(&self, values: &[f64], start_time: f64, duration: f64) {
        self.scalars
            .iter()
            .for_each(|scalar| scalar.set_value_curve_at_time(values, start_time, duration));
    }

    fn cancel_scheduled_values(&self, cancel_time: f64) {
        self.scalars.iter().for_each(|scalar| scalar.cancel_scheduled_values(cancel_time));
    }

    fn cancel_and_hold_at_time(&self, cancel_time: f64) {
        self.scalars.iter().for_each(|scalar| scalar.cancel_and_hold_at_time(cancel_time));
    }

    fn connect(&self, target: &Rc<dyn Scalar>) {
        self.scalars.iter().for_each(|scalar| scalar.connect(target));
    }

    fn disconnect(&self, target: &Rc<dyn Scalar>) {
        self.scalars.iter().for_each(|scalar| scalar.disconnect(target));
    }
}

pub struct AggregatedPulse {
    pulses: Vec<Rc<dyn Pulse>>,
}

impl AggregatedPulse {
    pub fn new(pulses: Vec<Rc<dyn Pulse>>) -> Self {
        Self { pulses }
    }

    pub fn pulses(&self) -> &[Rc<dyn Pulse>] {
        &self.pulses
    }
}

impl Pulse for AggregatedPulse {
    fn start(&self, time: f64) {
        self.pulses.iter().for_each(|pulse| pulse.start(time));
    }

    fn stop(&self, time: f64) {
        self.pulses.iter().for_each(|pulse| pulse.stop(time));
    }

    fn connect(&self, target: &Rc<dyn Pulse>) {
        self.pulses.iter().for_each(|pulse| pulse.connect(target));
    }

    fn disconnect(&self, target: &Rc<dyn Pulse>) {
        self.pulses.iter().for_each(|pulse| pulse.disconnect(target));
    }
}

/// Handles of more than one kind behind one port.
///
/// A scalar input may be fed by signal and scalar producers at once, and a
/// signal output may drive signal and scalar inputs. Each call reaches only
/// the wrapped handles that understand it.
pub struct AggregatedMixed {
    handles: Vec<Handle>,
}

impl AggregatedMixed {
    pub fn new(handles: Vec<Handle>) -> Self {
        Self { handles }
    }

    pub fn handles(&self) -> &[Handle] {
        &self.handles
    }

    pub fn contains_kind(&self, kind: PortKind) -> bool {
        self.handles.iter().any(|handle| handle.kind() == kind)
    }

    fn signals(&self) -> impl Iterator<Item = &Rc<dyn Signal>> {
        self.handles.iter().filter_map(Handle::as_signal)
    }

    fn scalars(&self) -> impl Iterator<Item = &Rc<dyn Scalar>> {
        self.handles.iter().filter_map(Handle::as_scalar)
    }

    fn pulses(&self) -> impl Iterator<Item = &Rc<dyn Pulse>> {
        self.handles.iter().filter_map(Handle::as_pulse)
    }
}

impl Signal for AggregatedMixed {
    fn connect_signal(&self, target: &Rc<dyn Signal>) {
        self.signals().for_each(|signal| signal.connect_signal(target));
    }

    fn disconnect_signal(&self, target: &Rc<dyn Signal>) {
        self.signals().for_each(|signal| signal.disconnect_signal(target));
    }

    fn connect_scalar(&self, target: &Rc<dyn Scalar>) {
        self.signals().for_each(|signal| signal.connect_scalar(target));
    }

    fn disconnect_scalar(&self, target: &Rc<dyn Scalar>) {
        self.signals().for_each(|signal| signal.disconnect_scalar(target));
    }
}

impl Scalar for AggregatedMixed {
    fn set_value_at_time(&self, value: f64, start_time: f64) {
        self.scalars().for_each(|scalar| scalar.set_value_at_time(value, start_time));
    }

    fn linear_ramp_to_value_at_time(&self, value: f64, end_time: f64) {
        self.scalars().for_each(|scalar| scalar.linear_ramp_to_value_at_time(value, end_time));
    }

    fn exponential_ramp_to_value_at_time(&self, value: f64, end_time: f64) {
        self.scalars()
            .for_each(|scalar| scalar.exponential_ramp_to_value_at_time(value, end_time));
    }

    fn set_target_at_time(&self, target: f64, start_time: f64, time_constant: f64) {
        self.scalars()
            .for_each(|scalar| scalar.set_target_at_time(target, start_time, time_constant));
    }

    fn set_value_curve_at_time(&self, values: &[f64], start_time: f64, duration: f64) {
        self.scalars()
            .for_each(|scalar| scalar.set_value_curve_at_time(values, start_time, duration));
    }

    fn cancel_scheduled_values(&self, cancel_time: f64) {
        self.scalars().for_each(|scalar| scalar.cancel_scheduled_values(cancel_time));
    }

    fn cancel_and_hold_at_time(&self, cancel_time: f64) {
        self.scalars().for_each(|scalar| scalar.cancel_and_hold_at_time(cancel_time));
    }

    fn connect(&self, target: &Rc<dyn Scalar>) {
        self.scalars().for_each(|scalar| scalar.connect(target));
    }

    fn disconnect(&self, target: &Rc<dyn Scalar>) {
        self.scalars().for_each(|scalar| scalar.disconnect(target));
    }
}

impl Pulse for AggregatedMixed {
    fn start(&self, time: f64) {
        self.pulses().for_each(|pulse| pulse.start(time));
    }

    fn stop(&self, time: f64) {
        self.pulses().for_each(|pulse| pulse.stop(time));
    }

    fn connect(&self, target: &Rc<dyn Pulse>) {
        self.pulses().for_each(|pulse| pulse.connect(target));
    }

    fn disconnect(&self, target: &Rc<dyn Pulse>) {
        self.pulses().for_each(|pulse| pulse.disconnect(target));
    }
}

/// An aggregate as produced by the binder
#[derive(Clone)]
pub enum Aggregate {
    Signal(Rc<AggregatedSignal>),
    Scalar(Rc<AggregatedScalar>),
    Pulse(Rc<AggregatedPulse>),
    Mixed(Rc<AggregatedMixed>),
}

impl Aggregate {
    /// Wrap every given handle, in order.
    ///
    /// Handles of one kind get that kind's aggregate; anything else becomes
    /// [`Aggregate::Mixed`]. Returns `None` when no handles are given.
    pub fn from_handles(handles: &[Handle]) -> Option<Aggregate> {
        let kind = handles.first()?.kind();
        if handles.iter().any(|handle| handle.kind() != kind) {
            debug!("Mixing handle kinds in an aggregate of {}", handles.len());
            return Some(Aggregate::Mixed(Rc::new(AggregatedMixed::new(handles.to_vec()))));
        }

        let aggregate = match kind {
            PortKind::Signal => Aggregate::Signal(Rc::new(AggregatedSignal::new(
                handles.iter().filter_map(|h| h.as_signal().cloned()).collect(),
            ))),
            PortKind::Scalar => Aggregate::Scalar(Rc::new(AggregatedScalar::new(
                handles.iter().filter_map(|h| h.as_scalar().cloned()).collect(),
            ))),
            PortKind::Pulse => Aggregate::Pulse(Rc::new(AggregatedPulse::new(
                handles.iter().filter_map(|h| h.as_pulse().cloned()).collect(),
            ))),
        };
        Some(aggregate)
    }

    /// The one kind every wrapped handle shares, `None` when mixed
    pub fn kind(&self) -> Option<PortKind> {
        match self {
            Aggregate::Signal(_) => Some(PortKind::Signal),
            Aggregate::Scalar(_) => Some(PortKind::Scalar),
            Aggregate::Pulse(_) => Some(PortKind::Pulse),
            Aggregate::Mixed(_) => None,
        }
    }

    /// Number of wrapped handles
    pub fn len(&self) -> usize {
        match self {
            Aggregate::Signal(aggregate) => aggregate.signals.len(),
            Aggregate::Scalar(aggregate) => aggregate.scalars.len(),
            Aggregate::Pulse(aggregate) => aggregate.pulses.len(),
            Aggregate::Mixed(aggregate) => aggregate.handles.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The wrapped handles, in order
    pub fn handles(&self) -> Vec<Handle> {
        match self {
            Aggregate::Signal(aggregate) => aggregate.signals.iter().cloned().map(Handle::Signal).collect(),
            Aggregate::Scalar(aggregate) => aggregate.scalars.iter().cloned().map(Handle::Scalar).collect(),
            Aggregate::Pulse(aggregate) => aggregate.pulses.iter().cloned().map(Handle::Pulse).collect(),
            Aggregate::Mixed(aggregate) => aggregate.handles.clone(),
        }
    }

    /// The aggregate itself as a single handle of its kind.
    ///
    /// A mixed aggregate has no single kind; use [`Aggregate::as_signal`]
    /// or [`Aggregate::as_scalar`] to drive its parts.
    pub fn as_handle(&self) -> Option<Handle> {
        match self {
            Aggregate::Signal(aggregate) => Some(Handle::Signal(aggregate.clone())),
            Aggregate::Scalar(aggregate) => Some(Handle::Scalar(aggregate.clone())),
            Aggregate::Pulse(aggregate) => Some(Handle::Pulse(aggregate.clone())),
            Aggregate::Mixed(_) => None,
        }
    }

    /// Drive every wrapped signal handle
    pub fn as_signal(&self) -> Option<Rc<dyn Signal>> {
        match self {
            Aggregate::Signal(aggregate) => Some(aggregate.clone() as Rc<dyn Signal>),
            Aggregate::Mixed(aggregate) if aggregate.contains_kind(PortKind::Signal) => Some(aggregate.clone() as Rc<dyn Signal>),
            _ => None,
        }
    }

    /// Drive every wrapped scalar handle
    pub fn as_scalar(&self) -> Option<Rc<dyn Scalar>> {
        match self {
            Aggregate::Scalar(aggregate) => Some(aggregate.clone() as Rc<dyn Scalar>),
            Aggregate::Mixed(aggregate) if aggregate.contains_kind(PortKind::Scalar) => Some(aggregate.clone() as Rc<dyn Scalar>),
            _ => None,
        }
    }

    /// Drive every wrapped pulse handle
    pub fn as_pulse(&self) -> Option<Rc<dyn Pulse>> {
        match self {
            Aggregate::Pulse(aggregate) => Some(aggregate.clone() as Rc<dyn Pulse>),
            Aggregate::Mixed(aggregate) if aggregate.contains_kind(PortKind::Pulse) => Some(aggregate.clone() as Rc<dyn Pulse>),
            _ => None,
        }
    }
}

/// Structural equality: same kind, same wrapped handles in the same order
impl PartialEq for Aggregate {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.handles() == other.handles()
    }
}

impl fmt::Debug for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregate")
            .field("kind", &self.kind())
            .field("handles", &self.handles())
            .finish()
    }
}
