//! End-to-end scenarios: editor gestures driving a live patch

use patchwire::{
    CallbackPulse, Edge, EditorEvent, GraphEditor, GraphError, GraphStore, Handle, MenuAction, NodeDefinition,
    NodeId, NodeRegistry, Patch, PortDefinition, PortRef, Pos2, Position, Pulse, PulseRelay, Resolved, Scalar,
    ScalarRelay, Signal,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

struct Knob {
    out: Rc<ScalarRelay>,
}

/// Scalar input that records the values it is set to
#[derive(Default)]
struct Param {
    values: RefCell<Vec<(f64, f64)>>,
}

impl Scalar for Param {
    fn set_value_at_time(&self, value: f64, start_time: f64) {
        self.values.borrow_mut().push((value, start_time));
    }

    fn linear_ramp_to_value_at_time(&self, _value: f64, _end_time: f64) {}

    fn exponential_ramp_to_value_at_time(&self, _value: f64, _end_time: f64) {}

    fn set_target_at_time(&self, _target: f64, _start_time: f64, _time_constant: f64) {}

    fn set_value_curve_at_time(&self, _values: &[f64], _start_time: f64, _duration: f64) {}

    fn cancel_scheduled_values(&self, _cancel_time: f64) {}

    fn cancel_and_hold_at_time(&self, _cancel_time: f64) {}
}

struct Amp {
    level: Rc<Param>,
}

struct Clock {
    out: Rc<PulseRelay>,
}

struct Voice {
    trigger: Rc<CallbackPulse>,
    starts: Rc<RefCell<Vec<f64>>>,
}

/// Signal that counts the targets it currently feeds
#[derive(Default)]
struct Tone {
    links: Cell<usize>,
}

impl Signal for Tone {
    fn connect_signal(&self, _target: &Rc<dyn Signal>) {
        self.links.set(self.links.get() + 1);
    }

    fn disconnect_signal(&self, _target: &Rc<dyn Signal>) {
        self.links.set(self.links.get() - 1);
    }

    fn connect_scalar(&self, _target: &Rc<dyn Scalar>) {
        self.links.set(self.links.get() + 1);
    }

    fn disconnect_scalar(&self, _target: &Rc<dyn Scalar>) {
        self.links.set(self.links.get() - 1);
    }
}

struct Osc {
    out: Rc<Tone>,
}

struct Filter {
    input: Rc<Tone>,
}

struct Setup {
    registry: Rc<NodeRegistry>,
    disposed: Rc<Cell<usize>>,
}

fn setup() -> Setup {
    let _ = env_logger::builder().is_test(true).try_init();
    let disposed = Rc::new(Cell::new(0));
    let counter = disposed.clone();

    let mut registry = NodeRegistry::new();
    let definitions = vec![
        NodeDefinition::new("Knob", |_| Knob {
            out: Rc::new(ScalarRelay::new()),
        })
        .with_output(
            PortDefinition::scalar("Out").with_accessor(|knob: &Rc<Knob>, _| Some(Handle::Scalar(knob.out.clone()))),
        ),
        NodeDefinition::new("Amp", |_| Amp {
            level: Rc::new(Param::default()),
        })
        .with_input(
            PortDefinition::scalar("In").with_accessor(|amp: &Rc<Amp>, _| Some(Handle::Scalar(amp.level.clone()))),
        )
        .with_dispose(move |_: &Amp| counter.set(counter.get() + 1)),
        NodeDefinition::new("Clock", |_| Clock {
            out: Rc::new(PulseRelay::new()),
        })
        .with_output(
            PortDefinition::pulse("Out").with_accessor(|clock: &Rc<Clock>, _| Some(Handle::Pulse(clock.out.clone()))),
        ),
        NodeDefinition::new("Voice", |_| {
            let starts = Rc::new(RefCell::new(Vec::new()));
            let trigger = CallbackPulse::new();
            let log = starts.clone();
            trigger.set_on_start(move |time| log.borrow_mut().push(time));
            Voice {
                trigger: Rc::new(trigger),
                starts,
            }
        })
        .with_input(
            PortDefinition::pulse("Trigger")
                .with_accessor(|voice: &Rc<Voice>, _| Some(Handle::Pulse(voice.trigger.clone()))),
        ),
        NodeDefinition::new("Osc", |_| Osc {
            out: Rc::new(Tone::default()),
        })
        .with_output(
            PortDefinition::signal("Out").with_accessor(|osc: &Rc<Osc>, _| Some(Handle::Signal(osc.out.clone()))),
        ),
        NodeDefinition::new("Filter", |_| Filter {
            input: Rc::new(Tone::default()),
        })
        .with_input(
            PortDefinition::signal("In")
                .with_accessor(|filter: &Rc<Filter>, _| Some(Handle::Signal(filter.input.clone()))),
        ),
    ];
    for definition in definitions {
        registry.register(definition).unwrap();
    }

    Setup {
        registry: Rc::new(registry),
        disposed,
    }
}

fn object<T: 'static>(patch: &Patch, id: NodeId) -> Rc<T> {
    patch.binding().node(id).and_then(|node| node.object::<T>()).unwrap()
}

#[test]
fn scalar_edge_resolves_to_producer_handle_and_reverts_on_removal() {
    let setup = setup();
    let mut patch = Patch::new(setup.registry.clone());
    let a = patch.add_node("Knob", Position::ORIGIN).unwrap();
    let b = patch.add_node("Amp", Position::new(200.0, 0.0)).unwrap();
    let edge = Edge::new(a, "Out", b, "In");
    let input = PortRef::input(b, "In");

    patch.connect(edge.clone()).unwrap();

    let knob = object::<Knob>(&patch, a);
    let amp = object::<Amp>(&patch, b);
    assert_eq!(patch.resolved(&input), Some(&Resolved::Single(Handle::Scalar(knob.out.clone()))));
    assert_eq!(knob.out.target_count(), 1);

    knob.out.set_value_at_time(0.5, 1.0);
    assert_eq!(*amp.level.values.borrow(), vec![(0.5, 1.0)]);

    assert!(patch.disconnect(&edge));
    assert_eq!(patch.resolved(&input), Some(&Resolved::Unconnected));
    assert!(!knob.out.is_connected());
}

#[test]
fn fan_in_pulse_aggregate_starts_every_producer() {
    let setup = setup();
    let mut patch = Patch::new(setup.registry.clone());
    let (c, d, e) = patch.batch(|patch| {
        let c = patch.add_node("Clock", Position::ORIGIN).unwrap();
        let d = patch.add_node("Clock", Position::new(0.0, 200.0)).unwrap();
        let e = patch.add_node("Voice", Position::new(200.0, 100.0)).unwrap();
        patch.connect(Edge::new(c, "Out", e, "Trigger")).unwrap();
        patch.connect(Edge::new(d, "Out", e, "Trigger")).unwrap();
        (c, d, e)
    });

    let resolved = patch.resolved(&PortRef::input(e, "Trigger")).unwrap();
    let aggregate = resolved.aggregate().unwrap();
    assert_eq!(aggregate.len(), 2);
    assert_eq!(
        aggregate.handles(),
        vec![
            Handle::Pulse(object::<Clock>(&patch, c).out.clone()),
            Handle::Pulse(object::<Clock>(&patch, d).out.clone()),
        ]
    );

    let handle = resolved.handle().unwrap();
    handle.as_pulse().unwrap().start(2.0);

    // Each clock relays into the voice once
    assert_eq!(*object::<Voice>(&patch, e).starts.borrow(), vec![2.0, 2.0]);
}

#[test]
fn signal_and_scalar_producers_share_one_scalar_input() {
    let setup = setup();
    let mut patch = Patch::new(setup.registry.clone());
    let (osc, knob, amp) = patch.batch(|patch| {
        let osc = patch.add_node("Osc", Position::ORIGIN).unwrap();
        let knob = patch.add_node("Knob", Position::new(0.0, 200.0)).unwrap();
        let amp = patch.add_node("Amp", Position::new(200.0, 100.0)).unwrap();
        patch.connect(Edge::new(osc, "Out", amp, "In")).unwrap();
        patch.connect(Edge::new(knob, "Out", amp, "In")).unwrap();
        (osc, knob, amp)
    });

    assert!(patch.binding().invalid.is_empty());
    assert_eq!(patch.active_connections(), 2);

    let tone = object::<Osc>(&patch, osc).out.clone();
    let relay = object::<Knob>(&patch, knob).out.clone();
    assert_eq!(tone.links.get(), 1);
    assert_eq!(relay.target_count(), 1);

    let resolved = patch.resolved(&PortRef::input(amp, "In")).unwrap();
    assert_eq!(resolved.connection_count(), 2);
    assert_eq!(
        resolved.aggregate().unwrap().handles(),
        vec![Handle::Signal(tone.clone()), Handle::Scalar(relay.clone())]
    );
    assert!(resolved.handle().is_none());

    // Automation reaches the knob; the oscillator has no schedule to follow
    resolved.scalar().unwrap().set_value_at_time(0.25, 4.0);
    assert_eq!(*object::<Amp>(&patch, amp).level.values.borrow(), vec![(0.25, 4.0)]);

    patch.remove_node(osc).unwrap();
    assert_eq!(tone.links.get(), 0);
    assert_eq!(patch.active_connections(), 1);
    assert_eq!(
        patch.resolved(&PortRef::input(amp, "In")),
        Some(&Resolved::Single(Handle::Scalar(relay)))
    );
}

#[test]
fn signal_output_feeds_signal_and_scalar_consumers() {
    let setup = setup();
    let mut patch = Patch::new(setup.registry.clone());
    let (osc, filter, amp) = patch.batch(|patch| {
        let osc = patch.add_node("Osc", Position::ORIGIN).unwrap();
        let filter = patch.add_node("Filter", Position::new(200.0, 0.0)).unwrap();
        let amp = patch.add_node("Amp", Position::new(200.0, 200.0)).unwrap();
        patch.connect(Edge::new(osc, "Out", filter, "In")).unwrap();
        patch.connect(Edge::new(osc, "Out", amp, "In")).unwrap();
        (osc, filter, amp)
    });

    assert!(patch.binding().invalid.is_empty());
    assert_eq!(patch.active_connections(), 2);
    assert_eq!(object::<Osc>(&patch, osc).out.links.get(), 2);

    let resolved = patch.resolved(&PortRef::output(osc, "Out")).unwrap();
    assert_eq!(resolved.connection_count(), 2);
    assert_eq!(
        resolved.aggregate().unwrap().handles(),
        vec![
            Handle::Signal(object::<Filter>(&patch, filter).input.clone()),
            Handle::Scalar(object::<Amp>(&patch, amp).level.clone()),
        ]
    );
    assert!(resolved.signal().is_some());
    assert!(resolved.scalar().is_some());
    assert!(resolved.pulse().is_none());
}

#[test]
fn rebinding_an_unchanged_graph_is_stable() {
    let setup = setup();
    let mut patch = Patch::new(setup.registry.clone());
    let (c, d, e) = patch.batch(|patch| {
        let c = patch.add_node("Clock", Position::ORIGIN).unwrap();
        let d = patch.add_node("Clock", Position::ORIGIN).unwrap();
        let e = patch.add_node("Voice", Position::ORIGIN).unwrap();
        patch.connect(Edge::new(c, "Out", e, "Trigger")).unwrap();
        patch.connect(Edge::new(d, "Out", e, "Trigger")).unwrap();
        (c, d, e)
    });
    let first = patch.binding().clone();

    for _ in 0..3 {
        patch.rebind();
    }

    assert_eq!(patch.binding(), &first);
    assert_eq!(patch.resolved(&PortRef::input(e, "Trigger")).unwrap().connection_count(), 2);
    assert_eq!(patch.active_connections(), 2);
    assert_eq!(object::<Clock>(&patch, c).out.target_count(), 1);
    assert_eq!(object::<Clock>(&patch, d).out.target_count(), 1);
}

#[test]
fn duplicate_edge_leaves_edge_list_unchanged() {
    let setup = setup();
    let mut patch = Patch::new(setup.registry.clone());
    let a = patch.add_node("Knob", Position::ORIGIN).unwrap();
    let b = patch.add_node("Amp", Position::ORIGIN).unwrap();
    let edge = Edge::new(a, "Out", b, "In");

    patch.connect(edge.clone()).unwrap();
    assert_eq!(patch.connect(edge.clone()), Err(GraphError::DuplicateEdge(edge)));
    assert_eq!(patch.graph().edges.len(), 1);
    assert_eq!(patch.active_connections(), 1);
}

#[test]
fn signal_output_never_connects_to_pulse_input() {
    let setup = setup();
    let mut patch = Patch::new(setup.registry.clone());
    let osc = patch.add_node("Osc", Position::ORIGIN).unwrap();
    let voice = patch.add_node("Voice", Position::ORIGIN).unwrap();

    let result = patch.connect(Edge::new(osc, "Out", voice, "Trigger"));
    assert!(matches!(result, Err(GraphError::InvalidConnection { .. })));
    assert!(patch.graph().edges.is_empty());
}

#[test]
fn editor_delete_cascades_and_disposes_in_one_cycle() {
    let setup = setup();
    let registry = setup.registry.clone();
    let mut patch = Patch::new(registry.clone());
    let knob = patch.add_node("Knob", Position::ORIGIN).unwrap();
    let amp = patch.add_node("Amp", Position::new(200.0, 0.0)).unwrap();
    patch.connect(Edge::new(knob, "Out", amp, "In")).unwrap();
    let relay = object::<Knob>(&patch, knob).out.clone();
    let cycles = patch.cycles();

    let mut editor = GraphEditor::new();
    // Delete button in the header's right end of the Amp node
    assert!(editor.handle_event(EditorEvent::press(Pos2::new(138.0, 212.0)), &mut patch, &registry));

    assert_eq!(patch.cycles(), cycles + 1);
    assert!(patch.graph().edges.is_empty());
    assert!(!patch.cache().contains(amp));
    assert!(patch.cache().contains(knob));
    assert_eq!(setup.disposed.get(), 1);
    assert!(!relay.is_connected());
}

#[test]
fn editor_drag_commits_one_move_and_keeps_engine_object() {
    let setup = setup();
    let registry = setup.registry.clone();
    let mut patch = Patch::new(registry.clone());
    let id = patch.add_node("Amp", Position::new(100.0, 100.0)).unwrap();
    let before = object::<Amp>(&patch, id);
    let cycles = patch.cycles();

    let mut editor = GraphEditor::new();
    editor.handle_event(EditorEvent::press(Pos2::new(110.0, 110.0)), &mut patch, &registry);
    for step in 1..=5 {
        let pos = Pos2::new(110.0 + step as f32 * 10.0, 110.0);
        editor.handle_event(EditorEvent::move_to(pos), &mut patch, &registry);
    }
    assert_eq!(patch.cycles(), cycles);

    assert!(editor.handle_event(EditorEvent::release(Pos2::new(160.0, 110.0)), &mut patch, &registry));
    assert_eq!(patch.cycles(), cycles + 1);
    assert_eq!(patch.graph().find_node(id).unwrap().position, Position::new(100.0, 150.0));
    assert!(Rc::ptr_eq(&before, &object::<Amp>(&patch, id)));
}

#[test]
fn editor_builds_a_connected_patch_from_menus_and_wires() {
    let setup = setup();
    let registry = setup.registry.clone();
    let mut patch = Patch::new(registry.clone());
    let mut editor = GraphEditor::new();

    for (pos, type_name) in [(Pos2::new(0.0, 0.0), "Knob"), (Pos2::new(0.0, 200.0), "Amp")] {
        editor.handle_event(EditorEvent::right_click(pos), &mut patch, &registry);
        assert!(editor.handle_event(
            EditorEvent::MenuSelected(MenuAction::CreateNode(type_name.to_string())),
            &mut patch,
            &registry,
        ));
    }
    let knob = patch.graph().nodes[0].id;
    let amp = patch.graph().nodes[1].id;
    assert!(patch.cache().contains(knob) && patch.cache().contains(amp));

    // Knob output at the bottom centre, Amp input at the top centre
    editor.handle_event(EditorEvent::press(Pos2::new(75.0, 80.0)), &mut patch, &registry);
    editor.handle_event(EditorEvent::move_to(Pos2::new(75.0, 150.0)), &mut patch, &registry);
    assert!(editor.handle_event(EditorEvent::release(Pos2::new(74.0, 201.0)), &mut patch, &registry));

    assert_eq!(patch.edges(), &[Edge::new(knob, "Out", amp, "In")]);
    assert_eq!(patch.active_connections(), 1);
    assert!(object::<Knob>(&patch, knob).out.is_connected());
}
