//! Dataflow binder
//!
//! Resolves, for every declared port of every node, which live handles it is
//! connected to. Binding is a pure function of the declarative graph plus
//! the engine object cache: it never connects anything itself (that is the
//! effector's job) and it is re-run from scratch on every graph change.
//!
//! Resolution per port:
//! - no usable edge: [`Resolved::Unconnected`]
//! - one: [`Resolved::Single`] with the other end's handle
//! - more: [`Resolved::Aggregate`] over all of them, in edge order

use super::aggregate::Aggregate;
use super::cache::EngineObjectCache;
use super::handle::{Handle, Pulse, Scalar, Signal};
use super::{EngineContext, EngineObject};
use crate::nodes::{Edge, Node, NodeId, NodeRegistry, PersistedState, PortDirection, PortKind, PortRef};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// What a port resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// No edge, or none whose other end has a live handle
    Unconnected,
    Single(Handle),
    Aggregate(Aggregate),
}

impl Resolved {
    fn from_handles(handles: Vec<Handle>) -> Resolved {
        match handles.len() {
            0 => Resolved::Unconnected,
            1 => handles.into_iter().next().map_or(Resolved::Unconnected, Resolved::Single),
            _ => Aggregate::from_handles(&handles).map_or(Resolved::Unconnected, Resolved::Aggregate),
        }
    }

    pub fn is_connected(&self) -> bool {
        !matches!(self, Resolved::Unconnected)
    }

    /// A single handle standing for everything connected.
    ///
    /// `None` when unconnected, or when the connections mix kinds.
    pub fn handle(&self) -> Option<Handle> {
        match self {
            Resolved::Unconnected => None,
            Resolved::Single(handle) => Some(handle.clone()),
            Resolved::Aggregate(aggregate) => aggregate.as_handle(),
        }
    }

    /// Every connected signal handle behind one handle
    pub fn signal(&self) -> Option<Rc<dyn Signal>> {
        match self {
            Resolved::Unconnected => None,
            Resolved::Single(handle) => handle.as_signal().cloned(),
            Resolved::Aggregate(aggregate) => aggregate.as_signal(),
        }
    }

    /// Every connected scalar handle behind one handle
    pub fn scalar(&self) -> Option<Rc<dyn Scalar>> {
        match self {
            Resolved::Unconnected => None,
            Resolved::Single(handle) => handle.as_scalar().cloned(),
            Resolved::Aggregate(aggregate) => aggregate.as_scalar(),
        }
    }

    pub fn pulse(&self) -> Option<Rc<dyn Pulse>> {
        match self {
            Resolved::Unconnected => None,
            Resolved::Single(handle) => handle.as_pulse().cloned(),
            Resolved::Aggregate(aggregate) => aggregate.as_pulse(),
        }
    }

    pub fn aggregate(&self) -> Option<&Aggregate> {
        match self {
            Resolved::Aggregate(aggregate) => Some(aggregate),
            _ => None,
        }
    }

    /// Number of live handles behind this port
    pub fn connection_count(&self) -> usize {
        match self {
            Resolved::Unconnected => 0,
            Resolved::Single(_) => 1,
            Resolved::Aggregate(aggregate) => aggregate.len(),
        }
    }
}

/// One declared port after binding
#[derive(Debug, Clone, PartialEq)]
pub struct BoundPort {
    pub name: String,
    pub kind: PortKind,
    /// This node's own handle for the port, from its accessor
    pub local: Option<Handle>,
    /// What the port is connected to
    pub resolved: Resolved,
}

/// One node after binding
#[derive(Clone)]
pub struct BoundNode {
    pub node_id: NodeId,
    pub type_name: String,
    pub engine_object: EngineObject,
    pub inputs: Vec<BoundPort>,
    pub outputs: Vec<BoundPort>,
}

impl BoundNode {
    pub fn input(&self, name: &str) -> Option<&BoundPort> {
        self.inputs.iter().find(|port| port.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&BoundPort> {
        self.outputs.iter().find(|port| port.name == name)
    }

    pub fn port(&self, direction: PortDirection, name: &str) -> Option<&BoundPort> {
        match direction {
            PortDirection::Input => self.input(name),
            PortDirection::Output => self.output(name),
        }
    }

    /// The engine object downcast to its concrete type
    pub fn object<T: 'static>(&self) -> Option<Rc<T>> {
        Rc::clone(&self.engine_object).downcast::<T>().ok()
    }
}

impl PartialEq for BoundNode {
    fn eq(&self, other: &Self) -> bool {
        self.node_id == other.node_id
            && self.type_name == other.type_name
            && Rc::ptr_eq(&self.engine_object, &other.engine_object)
            && self.inputs == other.inputs
            && self.outputs == other.outputs
    }
}

impl fmt::Debug for BoundNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundNode")
            .field("node_id", &self.node_id)
            .field("type_name", &self.type_name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish()
    }
}

/// Result of one bind cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Binding {
    /// Bound nodes in graph order; nodes of unknown type are absent
    pub nodes: Vec<BoundNode>,
    /// Edges naming a node or port that does not exist
    pub dangling: Vec<Edge>,
    /// Edges whose port kinds cannot be connected
    pub invalid: Vec<Edge>,
    /// Ports with edges but no live handle of their own
    pub unresolved: Vec<PortRef>,
}

impl Binding {
    pub fn node(&self, node_id: NodeId) -> Option<&BoundNode> {
        self.nodes.iter().find(|node| node.node_id == node_id)
    }

    pub fn port(&self, port: &PortRef) -> Option<&BoundPort> {
        self.node(port.node_id)?.port(port.direction, &port.name)
    }

    pub fn resolved(&self, port: &PortRef) -> Option<&Resolved> {
        self.port(port).map(|bound| &bound.resolved)
    }

    pub fn is_dangling(&self, edge: &Edge) -> bool {
        self.dangling.contains(edge)
    }

    pub fn is_invalid(&self, edge: &Edge) -> bool {
        self.invalid.contains(edge)
    }
}

/// Local handles of one node, gathered before edges are resolved
struct LocalPorts {
    node: Node,
    object: EngineObject,
    inputs: Vec<(String, PortKind, Option<Handle>)>,
    outputs: Vec<(String, PortKind, Option<Handle>)>,
}

impl LocalPorts {
    fn find(&self, direction: PortDirection, name: &str) -> Option<&(String, PortKind, Option<Handle>)> {
        let ports = match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        };
        ports.iter().find(|(port_name, _, _)| port_name == name)
    }
}

/// Resolve every port of every node against the current edges.
///
/// Engine objects come from `cache` (created on first use). Persisted state
/// missing from `states` falls back to the node type's default state.
/// Failures never abort the bind: unknown node types, dangling or illegal
/// edges, and ports without a live handle are recorded in the returned
/// [`Binding`] and otherwise treated as unconnected.
pub fn bind(
    nodes: &[Node],
    edges: &[Edge],
    states: &HashMap<NodeId, PersistedState>,
    cache: &mut EngineObjectCache,
    registry: &NodeRegistry,
    context: &EngineContext,
) -> Binding {
    let mut locals: Vec<LocalPorts> = Vec::with_capacity(nodes.len());
    for node in nodes {
        let Some(definition) = registry.get(&node.type_name) else {
            warn!("Skipping node {} of unknown type '{}'", node.id, node.type_name);
            continue;
        };

        let object = cache.get_or_create(node, definition, context);
        let state = states.get(&node.id).unwrap_or(&definition.default_state);
        let resolve_ports = |direction: PortDirection| {
            definition
                .ports(direction)
                .iter()
                .map(|port| (port.name.clone(), port.kind, port.resolve(&object, state)))
                .collect::<Vec<_>>()
        };

        locals.push(LocalPorts {
            node: node.clone(),
            inputs: resolve_ports(PortDirection::Input),
            outputs: resolve_ports(PortDirection::Output),
            object,
        });
    }

    let index: HashMap<NodeId, usize> = locals
        .iter()
        .enumerate()
        .map(|(i, local)| (local.node.id, i))
        .collect();
    let lookup = |port: &PortRef| {
        index
            .get(&port.node_id)
            .and_then(|&i| locals[i].find(port.direction, &port.name))
    };

    let mut binding = Binding::default();
    let mut seen = HashSet::new();
    let mut usable: Vec<&Edge> = Vec::new();
    for edge in edges {
        if !seen.insert(edge) {
            continue;
        }
        match (lookup(&edge.producer()), lookup(&edge.consumer())) {
            (Some((_, producer, _)), Some((_, consumer, _))) => {
                if producer.can_connect_to(*consumer) {
                    usable.push(edge);
                } else {
                    debug!("Ignoring {} edge into {} port: {}", producer, consumer, edge);
                    binding.invalid.push(edge.clone());
                }
            }
            _ => binding.dangling.push(edge.clone()),
        }
    }

    // Ports that have edges but no live handle of their own
    let mut unresolved: Vec<PortRef> = Vec::new();
    for edge in &usable {
        for port in [edge.producer(), edge.consumer()] {
            let missing = matches!(lookup(&port), Some((_, _, None)));
            if missing && !unresolved.contains(&port) {
                unresolved.push(port);
            }
        }
    }
    binding.unresolved = unresolved;

    // The handle at the far end of an edge, seen from `direction`
    let far_handle = |edge: &Edge, direction: PortDirection| -> Option<Handle> {
        let far = match direction {
            PortDirection::Input => edge.producer(),
            PortDirection::Output => edge.consumer(),
        };
        lookup(&far).and_then(|(_, _, handle)| handle.clone())
    };

    let bind_ports = |local: &LocalPorts, direction: PortDirection| -> Vec<BoundPort> {
        let ports = match direction {
            PortDirection::Input => &local.inputs,
            PortDirection::Output => &local.outputs,
        };
        ports
            .iter()
            .map(|(name, kind, handle)| {
                let here = PortRef::new(local.node.id, direction, name.clone());
                let handles: Vec<Handle> = usable
                    .iter()
                    .filter(|edge| match direction {
                        PortDirection::Input => edge.consumer() == here,
                        PortDirection::Output => edge.producer() == here,
                    })
                    .filter_map(|edge| far_handle(edge, direction))
                    .collect();

                BoundPort {
                    name: name.clone(),
                    kind: *kind,
                    local: handle.clone(),
                    resolved: Resolved::from_handles(handles),
                }
            })
            .collect()
    };

    binding.nodes = locals
        .iter()
        .map(|local| BoundNode {
            node_id: local.node.id,
            type_name: local.node.type_name.clone(),
            engine_object: Rc::clone(&local.object),
            inputs: bind_ports(local, PortDirection::Input),
            outputs: bind_ports(local, PortDirection::Output),
        })
        .collect();

    debug!(
        "Bound {} nodes over {} edges ({} dangling, {} invalid, {} unresolved ports)",
        binding.nodes.len(),
        usable.len(),
        binding.dangling.len(),
        binding.invalid.len(),
        binding.unresolved.len()
    );
    binding
}
