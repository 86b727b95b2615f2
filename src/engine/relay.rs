//! Producer-side handles that forward to whatever they are connected to
//!
//! Node authors expose these from output ports: the effector connects them
//! to consumer handles, and the node simply drives the relay.

use super::handle::{same_rc, Pulse, Scalar};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Fans start/stop events out to every connected pulse
#[derive(Default)]
pub struct PulseRelay {
    targets: RefCell<Vec<Rc<dyn Pulse>>>,
}

impl PulseRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_count(&self) -> usize {
        self.targets.borrow().len()
    }

    pub fn is_connected(&self) -> bool {
        self.target_count() > 0
    }

    fn snapshot(&self) -> Vec<Rc<dyn Pulse>> {
        self.targets.borrow().clone()
    }
}

impl Pulse for PulseRelay {
    fn start(&self, time: f64) {
        // Snapshot first so a target may reconnect while handling the event
        for target in self.snapshot() {
            target.start(time);
        }
    }

    fn stop(&self, time: f64) {
        for target in self.snapshot() {
            target.stop(time);
        }
    }

    fn connect(&self, target: &Rc<dyn Pulse>) {
        let mut targets = self.targets.borrow_mut();
        if !targets.iter().any(|existing| same_rc(existing, target)) {
            targets.push(target.clone());
        }
    }

    fn disconnect(&self, target: &Rc<dyn Pulse>) {
        self.targets.borrow_mut().retain(|existing| !same_rc(existing, target));
    }
}

impl fmt::Debug for PulseRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PulseRelay").field("targets", &self.target_count()).finish()
    }
}

/// Forwards automation calls to every connected scalar
#[derive(Default)]
pub struct ScalarRelay {
    targets: RefCell<Vec<Rc<dyn Scalar>>>,
}

impl ScalarRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_count(&self) -> usize {
        self.targets.borrow().len()
    }

    pub fn is_connected(&self) -> bool {
        self.target_count() > 0
    }

    fn each(&self, mut f: impl FnMut(&Rc<dyn Scalar>)) {
        let targets = self.targets.borrow().clone();
        targets.iter().for_each(|target| f(target));
    }
}

impl Scalar for ScalarRelay {
    fn set_value_at_time(&self, value: f64, start_time: f64) {
        self.each(|target| target.set_value_at_time(value, start_time));
    }

    fn linear_ramp_to_value_at_time(&self, value: f64, end_time: f64) {
        self.each(|target| target.linear_ramp_to_value_at_time(value, end_time));
    }

    fn exponential_ramp_to_value_at_time(&self, value: f64, end_time: f64) {
        self.each(|target| target.exponential_ramp_to_value_at_time(value, end_time));
    }

    fn set_target_at_time(&self, target_value: f64, start_time: f64, time_constant: f64) {
        self.each(|target| target.set_target_at_time(target_value, start_time, time_constant));
    }

    fn set_value_curve_at_time(&self, values: &[f64], start_time: f64, duration: f64) {
        self.each(|target| target.set_value_curve_at_time(values, start_time, duration));
    }

    fn cancel_scheduled_values(&self, cancel_time: f64) {
        self.each(|target| target.cancel_scheduled_values(cancel_time));
    }

    fn cancel_and_hold_at_time(&self, cancel_time: f64) {
        self.each(|target| target.cancel_and_hold_at_time(cancel_time));
    }

    fn connect(&self, target: &Rc<dyn Scalar>) {
        let mut targets = self.targets.borrow_mut();
        if !targets.iter().any(|existing| same_rc(existing, target)) {
            targets.push(target.clone());
        }
    }

    fn disconnect(&self, target: &Rc<dyn Scalar>) {
        self.targets.borrow_mut().retain(|existing| !same_rc(existing, target));
    }
}

impl fmt::Debug for ScalarRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarRelay").field("targets", &self.target_count()).finish()
    }
}

type PulseCallback = Box<dyn Fn(f64)>;

/// Consumer-side pulse that runs callbacks on start/stop
pub struct CallbackPulse {
    on_start: RefCell<PulseCallback>,
    on_stop: RefCell<PulseCallback>,
}

impl CallbackPulse {
    pub fn new() -> Self {
        Self {
            on_start: RefCell::new(Box::new(|_| {})),
            on_stop: RefCell::new(Box::new(|_| {})),
        }
    }

    pub fn set_on_start(&self, callback: impl Fn(f64) + 'static) {
        *self.on_start.borrow_mut() = Box::new(callback);
    }

    pub fn set_on_stop(&self, callback: impl Fn(f64) + 'static) {
        *self.on_stop.borrow_mut() = Box::new(callback);
    }
}

impl Default for CallbackPulse {
    fn default() -> Self {
        Self::new()
    }
}

impl Pulse for CallbackPulse {
    fn start(&self, time: f64) {
        (self.on_start.borrow())(time);
    }

    fn stop(&self, time: f64) {
        (self.on_stop.borrow())(time);
    }
}

impl fmt::Debug for CallbackPulse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CallbackPulse")
    }
}
