//! Kind-tagged live handles
//!
//! Every resolved port value is one of three handle kinds. Each kind is a
//! trait so node authors can back it with whatever their engine provides;
//! the effector dispatches on the [`Handle`] tag rather than on a type
//! hierarchy.

use crate::nodes::PortKind;
use std::fmt;
use std::rc::Rc;

/// Continuous, reference-connected signal endpoint
pub trait Signal {
    /// Route this signal into another signal endpoint
    fn connect_signal(&self, target: &Rc<dyn Signal>);

    fn disconnect_signal(&self, target: &Rc<dyn Signal>);

    /// Let this signal drive a scalar control
    fn connect_scalar(&self, target: &Rc<dyn Scalar>);

    fn disconnect_scalar(&self, target: &Rc<dyn Scalar>);
}

/// Time-varying numeric control value. Times are in seconds.
pub trait Scalar {
    fn set_value_at_time(&self, value: f64, start_time: f64);

    fn linear_ramp_to_value_at_time(&self, value: f64, end_time: f64);

    fn exponential_ramp_to_value_at_time(&self, value: f64, end_time: f64);

    fn set_target_at_time(&self, target: f64, start_time: f64, time_constant: f64);

    /// Follow `values` evenly spread over `duration` seconds from `start_time`
    fn set_value_curve_at_time(&self, values: &[f64], start_time: f64, duration: f64);

    fn cancel_scheduled_values(&self, cancel_time: f64);

    fn cancel_and_hold_at_time(&self, cancel_time: f64);

    /// Forward this scalar's values to `target`. Only producers need this.
    fn connect(&self, _target: &Rc<dyn Scalar>) {}

    fn disconnect(&self, _target: &Rc<dyn Scalar>) {}
}

/// Discrete start/stop timed event
pub trait Pulse {
    fn start(&self, time: f64);

    fn stop(&self, time: f64);

    /// Forward this pulse's events to `target`. Only producers need this.
    fn connect(&self, _target: &Rc<dyn Pulse>) {}

    fn disconnect(&self, _target: &Rc<dyn Pulse>) {}
}

/// A live handle of one of the three port kinds
#[derive(Clone)]
pub enum Handle {
    Signal(Rc<dyn Signal>),
    Scalar(Rc<dyn Scalar>),
    Pulse(Rc<dyn Pulse>),
}

impl Handle {
    pub fn kind(&self) -> PortKind {
        match self {
            Handle::Signal(_) => PortKind::Signal,
            Handle::Scalar(_) => PortKind::Scalar,
            Handle::Pulse(_) => PortKind::Pulse,
        }
    }

    pub fn as_signal(&self) -> Option<&Rc<dyn Signal>> {
        match self {
            Handle::Signal(signal) => Some(signal),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Rc<dyn Scalar>> {
        match self {
            Handle::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_pulse(&self) -> Option<&Rc<dyn Pulse>> {
        match self {
            Handle::Pulse(pulse) => Some(pulse),
            _ => None,
        }
    }

    /// Address of the underlying object, used for identity comparisons
    pub fn addr(&self) -> usize {
        match self {
            Handle::Signal(signal) => rc_addr(signal),
            Handle::Scalar(scalar) => rc_addr(scalar),
            Handle::Pulse(pulse) => rc_addr(pulse),
        }
    }

    /// Check if both handles point at the same live object
    pub fn same_as(&self, other: &Handle) -> bool {
        self.kind() == other.kind() && self.addr() == other.addr()
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle::{:?}({:#x})", self.kind(), self.addr())
    }
}

/// Data address of an `Rc`, ignoring any vtable
pub(crate) fn rc_addr<T: ?Sized>(rc: &Rc<T>) -> usize {
    Rc::as_ptr(rc) as *const () as usize
}

/// Pointer identity for trait-object `Rc`s
pub(crate) fn same_rc<T: ?Sized>(a: &Rc<T>, b: &Rc<T>) -> bool {
    rc_addr(a) == rc_addr(b)
}
