//! Envelope shaping onto a target scalar
//!
//! Both types are consumer-side handles whose target scalar is attached
//! later, typically once the owning node's output resolves. Until a target
//! is attached every call is a no-op.

use super::handle::{Pulse, Scalar};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Attack/release times in milliseconds and the value range swept
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeOptions {
    pub attack_ms: f64,
    pub release_ms: f64,
    pub min_value: f64,
    pub max_value: f64,
}

impl Default for EnvelopeOptions {
    fn default() -> Self {
        Self {
            attack_ms: 0.0,
            release_ms: 0.0,
            min_value: 0.0,
            max_value: 1.0,
        }
    }
}

impl EnvelopeOptions {
    pub fn attack_seconds(&self) -> f64 {
        self.attack_ms / 1000.0
    }

    pub fn release_seconds(&self) -> f64 {
        self.release_ms / 1000.0
    }
}

/// A pulse that sweeps its target from min to max on start and back on stop
#[derive(Default)]
pub struct EnvelopedPulse {
    options: Cell<EnvelopeOptions>,
    target: RefCell<Option<Rc<dyn Scalar>>>,
}

impl EnvelopedPulse {
    pub fn new(options: EnvelopeOptions) -> Self {
        Self {
            options: Cell::new(options),
            target: RefCell::new(None),
        }
    }

    pub fn options(&self) -> EnvelopeOptions {
        self.options.get()
    }

    pub fn set_options(&self, options: EnvelopeOptions) {
        self.options.set(options);
    }

    /// Change only the attack and release times
    pub fn set_times(&self, attack_ms: f64, release_ms: f64) {
        let mut options = self.options.get();
        options.attack_ms = attack_ms;
        options.release_ms = release_ms;
        self.options.set(options);
    }

    pub fn set_target(&self, target: Option<Rc<dyn Scalar>>) {
        *self.target.borrow_mut() = target;
    }

    pub fn has_target(&self) -> bool {
        self.target.borrow().is_some()
    }

    fn target(&self) -> Option<Rc<dyn Scalar>> {
        self.target.borrow().clone()
    }
}

impl Pulse for EnvelopedPulse {
    fn start(&self, time: f64) {
        let Some(target) = self.target() else { return };
        let options = self.options.get();
        target.set_value_at_time(options.min_value, time);
        target.linear_ramp_to_value_at_time(options.max_value, time + options.attack_seconds());
    }

    fn stop(&self, time: f64) {
        let Some(target) = self.target() else { return };
        let options = self.options.get();
        target.linear_ramp_to_value_at_time(options.min_value, time + options.release_seconds());
    }
}

impl fmt::Debug for EnvelopedPulse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvelopedPulse")
            .field("options", &self.options.get())
            .field("has_target", &self.has_target())
            .finish()
    }
}

/// A scalar whose `set_value_at_time` ramps up from zero over the attack time.
///
/// Every other automation call passes straight through to the target.
#[derive(Default)]
pub struct EnvelopedScalar {
    attack_ms: Cell<f64>,
    target: RefCell<Option<Rc<dyn Scalar>>>,
}

impl EnvelopedScalar {
    pub fn new(attack_ms: f64) -> Self {
        Self {
            attack_ms: Cell::new(attack_ms),
            target: RefCell::new(None),
        }
    }

    pub fn attack_ms(&self) -> f64 {
        self.attack_ms.get()
    }

    pub fn set_attack_ms(&self, attack_ms: f64) {
        self.attack_ms.set(attack_ms);
    }

    pub fn set_target(&self, target: Option<Rc<dyn Scalar>>) {
        *self.target.borrow_mut() = target;
    }

    fn with_target(&self, f: impl FnOnce(&Rc<dyn Scalar>)) {
        let target = self.target.borrow().clone();
        if let Some(target) = target {
            f(&target);
        }
    }
}

impl Scalar for EnvelopedScalar {
    fn set_value_at_time(&self, value: f64, start_time: f64) {
        let attack = self.attack_ms.get() / 1000.0;
        self.with_target(|target| {
            target.set_value_at_time(0.0, start_time);
            target.linear_ramp_to_value_at_time(value, start_time + attack);
        });
    }

    fn linear_ramp_to_value_at_time(&self, value: f64, end_time: f64) {
        self.with_target(|target| target.linear_ramp_to_value_at_time(value, end_time));
    }

    fn exponential_ramp_to_value_at_time(&self, value: f64, end_time: f64) {
        self.with_target(|target| target.exponential_ramp_to_value_at_time(value, end_time));
    }

    fn set_target_at_time(&self, target_value: f64, start_time: f64, time_constant: f64) {
        self.with_target(|target| target.set_target_at_time(target_value, start_time, time_constant));
    }

    fn set_value_curve_at_time(&self, values: &[f64], start_time: f64, duration: f64) {
        self.with_target(|target| target.set_value_curve_at_time(values, start_time, duration));
    }

    fn cancel_scheduled_values(&self, cancel_time: f64) {
        self.with_target(|target| target.cancel_scheduled_values(cancel_time));
    }

    fn cancel_and_hold_at_time(&self, cancel_time: f64) {
        self.with_target(|target| target.cancel_and_hold_at_time(cancel_time));
    }
}

impl fmt::Debug for EnvelopedScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvelopedScalar")
            .field("attack_ms", &self.attack_ms.get())
            .finish()
    }
}
