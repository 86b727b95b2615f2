//! Recording handle doubles for unit tests

use super::handle::{rc_addr, Handle, Pulse, Scalar, Signal};
use crate::nodes::{NodeDefinition, NodeRegistry, PortDefinition};
use std::cell::RefCell;
use std::rc::Rc;

/// One observed call on a recording handle. Targets are identified by address.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ConnectSignal(usize),
    DisconnectSignal(usize),
    ConnectScalar(usize),
    DisconnectScalar(usize),
    SetValueAtTime(f64, f64),
    LinearRamp(f64, f64),
    ExponentialRamp(f64, f64),
    SetTarget(f64, f64, f64),
    SetValueCurve(Vec<f64>, f64, f64),
    CancelScheduled(f64),
    CancelAndHold(f64),
    Connect(usize),
    Disconnect(usize),
    Start(f64),
    Stop(f64),
}

#[derive(Debug, Default)]
struct Recorder {
    label: String,
    calls: RefCell<Vec<Call>>,
}

impl Recorder {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn push(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

macro_rules! recording_handle {
    ($name:ident) => {
        #[derive(Debug, Default)]
        pub struct $name {
            recorder: Recorder,
        }

        impl $name {
            pub fn new(label: &str) -> Self {
                Self {
                    recorder: Recorder::new(label),
                }
            }

            #[allow(dead_code)]
            pub fn label(&self) -> &str {
                &self.recorder.label
            }

            pub fn calls(&self) -> Vec<Call> {
                self.recorder.calls.borrow().clone()
            }

            #[allow(dead_code)]
            pub fn clear(&self) {
                self.recorder.calls.borrow_mut().clear();
            }
        }
    };
}

recording_handle!(RecordingSignal);
recording_handle!(RecordingScalar);
recording_handle!(RecordingPulse);

impl Signal for RecordingSignal {
    fn connect_signal(&self, target: &Rc<dyn Signal>) {
        self.recorder.push(Call::ConnectSignal(rc_addr(target)));
    }

    fn disconnect_signal(&self, target: &Rc<dyn Signal>) {
        self.recorder.push(Call::DisconnectSignal(rc_addr(target)));
    }

    fn connect_scalar(&self, target: &Rc<dyn Scalar>) {
        self.recorder.push(Call::ConnectScalar(rc_addr(target)));
    }

    fn disconnect_scalar(&self, target: &Rc<dyn Scalar>) {
        self.recorder.push(Call::DisconnectScalar(rc_addr(target)));
    }
}

impl Scalar for RecordingScalar {
    fn set_value_at_time(&self, value: f64, start_time: f64) {
        self.recorder.push(Call::SetValueAtTime(value, start_time));
    }

    fn linear_ramp_to_value_at_time(&self, value: f64, end_time: f64) {
        self.recorder.push(Call::LinearRamp(value, end_time));
    }

    fn exponential_ramp_to_value_at_time(&self, value: f64, end_time: f64) {
        self.recorder.push(Call::ExponentialRamp(value, end_time));
    }

    fn set_target_at_time(&self, target: f64, start_time: f64, time_constant: f64) {
        self.recorder.push(Call::SetTarget(target, start_time, time_constant));
    }

    fn set_value_curve_at_time(&self, values: &[f64], start_time: f64, duration: f64) {
        self.recorder.push(Call::SetValueCurve(values.to_vec(), start_time, duration));
    }

    fn cancel_scheduled_values(&self, cancel_time: f64) {
        self.recorder.push(Call::CancelScheduled(cancel_time));
    }

    fn cancel_and_hold_at_time(&self, cancel_time: f64) {
        self.recorder.push(Call::CancelAndHold(cancel_time));
    }

    fn connect(&self, target: &Rc<dyn Scalar>) {
        self.recorder.push(Call::Connect(rc_addr(target)));
    }

    fn disconnect(&self, target: &Rc<dyn Scalar>) {
        self.recorder.push(Call::Disconnect(rc_addr(target)));
    }
}

impl Pulse for RecordingPulse {
    fn start(&self, time: f64) {
        self.recorder.push(Call::Start(time));
    }

    fn stop(&self, time: f64) {
        self.recorder.push(Call::Stop(time));
    }

    fn connect(&self, target: &Rc<dyn Pulse>) {
        self.recorder.push(Call::Connect(rc_addr(target)));
    }

    fn disconnect(&self, target: &Rc<dyn Pulse>) {
        self.recorder.push(Call::Disconnect(rc_addr(target)));
    }
}

pub struct NumberObject {
    pub out: Rc<RecordingScalar>,
}

pub struct GainObject {
    pub gain: Rc<RecordingScalar>,
}

pub struct TriggerObject {
    pub out: Rc<RecordingPulse>,
}

pub struct VoiceObject {
    pub trigger: Rc<RecordingPulse>,
}

pub struct OscillatorObject {
    pub input: Rc<RecordingSignal>,
    pub out: Rc<RecordingSignal>,
}

/// A small catalogue covering every port kind.
///
/// - `Number`: scalar output `Out`
/// - `Gain`: scalar input `In`
/// - `Trigger`: pulse output `Out`
/// - `Voice`: pulse input `Trigger`
/// - `Oscillator`: signal input `In`, signal output `Out`
/// - `Silent`: scalar output `Out` without an accessor
pub fn registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    let definitions = vec![
        NodeDefinition::new("Number", |_| NumberObject {
            out: Rc::new(RecordingScalar::new("number")),
        })
        .with_output(
            PortDefinition::scalar("Out")
                .with_accessor(|object: &Rc<NumberObject>, _| Some(Handle::Scalar(object.out.clone()))),
        ),
        NodeDefinition::new("Gain", |_| GainObject {
            gain: Rc::new(RecordingScalar::new("gain")),
        })
        .with_input(
            PortDefinition::scalar("In")
                .with_accessor(|object: &Rc<GainObject>, _| Some(Handle::Scalar(object.gain.clone()))),
        ),
        NodeDefinition::new("Trigger", |_| TriggerObject {
            out: Rc::new(RecordingPulse::new("trigger")),
        })
        .with_output(
            PortDefinition::pulse("Out")
                .with_accessor(|object: &Rc<TriggerObject>, _| Some(Handle::Pulse(object.out.clone()))),
        ),
        NodeDefinition::new("Voice", |_| VoiceObject {
            trigger: Rc::new(RecordingPulse::new("voice")),
        })
        .with_input(
            PortDefinition::pulse("Trigger")
                .with_accessor(|object: &Rc<VoiceObject>, _| Some(Handle::Pulse(object.trigger.clone()))),
        ),
        NodeDefinition::new("Oscillator", |_| OscillatorObject {
            input: Rc::new(RecordingSignal::new("osc in")),
            out: Rc::new(RecordingSignal::new("osc out")),
        })
        .with_input(
            PortDefinition::signal("In")
                .with_accessor(|object: &Rc<OscillatorObject>, _| Some(Handle::Signal(object.input.clone()))),
        )
        .with_output(
            PortDefinition::signal("Out")
                .with_accessor(|object: &Rc<OscillatorObject>, _| Some(Handle::Signal(object.out.clone()))),
        ),
        NodeDefinition::new("Silent", |_| ()).with_output(PortDefinition::scalar("Out")),
    ];

    for definition in definitions {
        if let Err(err) = registry.register(definition) {
            panic!("test registry: {}", err);
        }
    }
    registry
}
