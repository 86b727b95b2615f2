//! Node definition registry
//!
//! Adapter over the external catalogue of node types. Each definition
//! declares its ports, how to reach a live handle for each port from the
//! node's engine object, and how to build that engine object in the first
//! place. Concrete node behaviour lives with whoever registers definitions.

use super::graph::{Edge, PersistedState};
use super::node::{Node, NodeId};
use super::port::{PortDirection, PortKind};
use super::position::Position;
use crate::engine::{EngineContext, EngineObject, Handle};
use crate::error::GraphError;
use log::{debug, info};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Resolves a port's live handle from the node's engine object and persisted state
pub type Accessor = Rc<dyn Fn(&EngineObject, &PersistedState) -> Option<Handle>>;

/// Builds a node's engine object
pub type Factory = Rc<dyn Fn(&EngineContext) -> EngineObject>;

/// Releases external resources held by an engine object
pub type DisposeHook = Rc<dyn Fn(&EngineObject)>;

/// Port definition for a node type
#[derive(Clone)]
pub struct PortDefinition {
    pub name: String,
    pub kind: PortKind,
    accessor: Option<Accessor>,
}

impl PortDefinition {
    pub fn new(name: &str, kind: PortKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            accessor: None,
        }
    }

    pub fn signal(name: &str) -> Self {
        Self::new(name, PortKind::Signal)
    }

    pub fn scalar(name: &str) -> Self {
        Self::new(name, PortKind::Scalar)
    }

    pub fn pulse(name: &str) -> Self {
        Self::new(name, PortKind::Pulse)
    }

    /// Attach a typed accessor.
    ///
    /// The engine object is downcast to `T` before the accessor runs; a
    /// node whose object is not a `T` resolves this port to nothing.
    pub fn with_accessor<T, F>(mut self, accessor: F) -> Self
    where
        T: Any,
        F: Fn(&Rc<T>, &PersistedState) -> Option<Handle> + 'static,
    {
        self.accessor = Some(Rc::new(move |object: &EngineObject, state: &PersistedState| {
            let typed = Rc::clone(object).downcast::<T>().ok()?;
            accessor(&typed, state)
        }));
        self
    }

    pub fn has_accessor(&self) -> bool {
        self.accessor.is_some()
    }

    /// Run the accessor, if any
    pub fn resolve(&self, object: &EngineObject, state: &PersistedState) -> Option<Handle> {
        self.accessor.as_ref().and_then(|accessor| accessor(object, state))
    }
}

impl fmt::Debug for PortDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortDefinition")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("has_accessor", &self.accessor.is_some())
            .finish()
    }
}

/// Everything the core needs to know about one node type
#[derive(Clone)]
pub struct NodeDefinition {
    pub type_name: String,
    pub inputs: Vec<PortDefinition>,
    pub outputs: Vec<PortDefinition>,
    pub default_state: PersistedState,
    factory: Factory,
    dispose: Option<DisposeHook>,
}

impl NodeDefinition {
    /// Create a definition whose engine objects are built by `factory`
    pub fn new<T, F>(type_name: &str, factory: F) -> Self
    where
        T: Any,
        F: Fn(&EngineContext) -> T + 'static,
    {
        Self {
            type_name: type_name.to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            default_state: PersistedState::Null,
            factory: Rc::new(move |context: &EngineContext| Rc::new(factory(context)) as EngineObject),
            dispose: None,
        }
    }

    pub fn with_input(mut self, port: PortDefinition) -> Self {
        self.inputs.push(port);
        self
    }

    pub fn with_output(mut self, port: PortDefinition) -> Self {
        self.outputs.push(port);
        self
    }

    pub fn with_default_state(mut self, state: PersistedState) -> Self {
        self.default_state = state;
        self
    }

    /// Register a hook run when a node of this type leaves the graph
    pub fn with_dispose<T, F>(mut self, dispose: F) -> Self
    where
        T: Any,
        F: Fn(&T) + 'static,
    {
        self.dispose = Some(Rc::new(move |object: &EngineObject| {
            if let Some(typed) = object.downcast_ref::<T>() {
                dispose(typed);
            }
        }));
        self
    }

    pub fn ports(&self, direction: PortDirection) -> &[PortDefinition] {
        match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        }
    }

    pub fn port(&self, direction: PortDirection, name: &str) -> Option<&PortDefinition> {
        self.ports(direction).iter().find(|port| port.name == name)
    }

    /// Build a fresh engine object
    pub fn instantiate(&self, context: &EngineContext) -> EngineObject {
        (self.factory)(context)
    }

    /// Run the dispose hook, if any
    pub fn dispose(&self, object: &EngineObject) {
        if let Some(dispose) = &self.dispose {
            dispose(object);
        }
    }
}

impl fmt::Debug for NodeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeDefinition")
            .field("type_name", &self.type_name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("default_state", &self.default_state)
            .finish()
    }
}

/// Registry for node definitions, keyed by type name
#[derive(Debug, Default)]
pub struct NodeRegistry {
    definitions: BTreeMap<String, NodeDefinition>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node definition
    pub fn register(&mut self, definition: NodeDefinition) -> Result<(), GraphError> {
        if self.definitions.contains_key(&definition.type_name) {
            return Err(GraphError::DuplicateNodeType(definition.type_name));
        }

        info!(
            "Registered node type '{}' ({} inputs, {} outputs)",
            definition.type_name,
            definition.inputs.len(),
            definition.outputs.len()
        );
        self.definitions.insert(definition.type_name.clone(), definition);
        Ok(())
    }

    pub fn get(&self, type_name: &str) -> Option<&NodeDefinition> {
        self.definitions.get(type_name)
    }

    /// Kind of a node's port, if the node's type declares it
    pub fn port_kind(&self, node: &Node, direction: PortDirection, name: &str) -> Option<PortKind> {
        self.get(&node.type_name)?.port(direction, name).map(|port| port.kind)
    }

    /// Check a candidate edge before it is handed to a store.
    ///
    /// Both nodes must exist and declare the named ports, the port kinds
    /// must be connectable, and no identical edge may already be stored.
    pub fn validate_edge(&self, nodes: &[Node], edges: &[Edge], edge: &Edge) -> Result<(), GraphError> {
        let find = |id: NodeId| {
            nodes
                .iter()
                .find(|node| node.id == id)
                .ok_or(GraphError::UnknownNode(id))
        };
        let producer = find(edge.producer_node_id)?;
        let consumer = find(edge.consumer_node_id)?;

        let dangling = || GraphError::DanglingEdgeReference(edge.clone());
        let producer_kind = self
            .port_kind(producer, PortDirection::Output, &edge.producer_port_name)
            .ok_or_else(dangling)?;
        let consumer_kind = self
            .port_kind(consumer, PortDirection::Input, &edge.consumer_port_name)
            .ok_or_else(dangling)?;

        if !producer_kind.can_connect_to(consumer_kind) {
            return Err(GraphError::InvalidConnection {
                producer: producer_kind,
                consumer: consumer_kind,
            });
        }
        if edges.contains(edge) {
            return Err(GraphError::DuplicateEdge(edge.clone()));
        }
        Ok(())
    }

    /// All registered type names in sorted order
    pub fn type_names(&self) -> Vec<&str> {
        self.definitions.keys().map(|name| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Create a node of the given type with its default persisted state
    pub fn create_node(&self, type_name: &str, position: Position) -> Result<(Node, PersistedState), GraphError> {
        let definition = self
            .get(type_name)
            .ok_or_else(|| GraphError::UnknownNodeType(type_name.to_string()))?;

        let node = Node::new(type_name, position);
        debug!("Created '{}' node {}", type_name, node.id);
        Ok((node, definition.default_state.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::RecordingScalar;
    use serde_json::json;

    struct GainObject {
        gain: Rc<RecordingScalar>,
    }

    fn gain_definition() -> NodeDefinition {
        NodeDefinition::new("Gain", |_| GainObject {
            gain: Rc::new(RecordingScalar::new("gain")),
        })
        .with_input(PortDefinition::scalar("Gain").with_accessor(|object: &Rc<GainObject>, _| {
            Some(Handle::Scalar(object.gain.clone()))
        }))
        .with_output(PortDefinition::signal("Output"))
        .with_default_state(json!({ "gain": 0.5 }))
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = NodeRegistry::new();
        registry.register(gain_definition()).unwrap();

        let definition = registry.get("Gain").unwrap();
        assert_eq!(definition.inputs.len(), 1);
        assert_eq!(definition.port(PortDirection::Input, "Gain").unwrap().kind, PortKind::Scalar);
        assert!(definition.port(PortDirection::Output, "Gain").is_none());
        assert_eq!(registry.type_names(), vec!["Gain"]);
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let mut registry = NodeRegistry::new();
        registry.register(gain_definition()).unwrap();

        assert_eq!(
            registry.register(gain_definition()),
            Err(GraphError::DuplicateNodeType("Gain".to_string()))
        );
    }

    #[test]
    fn test_typed_accessor() {
        let definition = gain_definition();
        let object = definition.instantiate(&EngineContext::default());
        let port = definition.port(PortDirection::Input, "Gain").unwrap();

        assert!(matches!(port.resolve(&object, &json!(null)), Some(Handle::Scalar(_))));

        // Wrong object type resolves to nothing rather than panicking
        let foreign: EngineObject = Rc::new(42u32);
        assert!(port.resolve(&foreign, &json!(null)).is_none());

        // Ports without an accessor never resolve
        let output = definition.port(PortDirection::Output, "Output").unwrap();
        assert!(!output.has_accessor());
        assert!(output.resolve(&object, &json!(null)).is_none());
    }

    #[test]
    fn test_validate_edge() {
        let mut registry = NodeRegistry::new();
        registry.register(gain_definition()).unwrap();
        registry
            .register(NodeDefinition::new("Trigger", |_| ()).with_output(PortDefinition::pulse("Out")))
            .unwrap();

        let (gain, _) = registry.create_node("Gain", Position::ORIGIN).unwrap();
        let (other, _) = registry.create_node("Gain", Position::ORIGIN).unwrap();
        let (trigger, _) = registry.create_node("Trigger", Position::ORIGIN).unwrap();
        let nodes = vec![gain.clone(), other.clone(), trigger.clone()];

        // signal -> scalar is legal
        let edge = Edge::new(gain.id, "Output", other.id, "Gain");
        assert_eq!(registry.validate_edge(&nodes, &[], &edge), Ok(()));
        assert_eq!(
            registry.validate_edge(&nodes, &[edge.clone()], &edge),
            Err(GraphError::DuplicateEdge(edge))
        );

        let pulse_into_scalar = Edge::new(trigger.id, "Out", gain.id, "Gain");
        assert_eq!(
            registry.validate_edge(&nodes, &[], &pulse_into_scalar),
            Err(GraphError::InvalidConnection {
                producer: PortKind::Pulse,
                consumer: PortKind::Scalar,
            })
        );

        let missing_port = Edge::new(gain.id, "Nope", other.id, "Gain");
        assert!(matches!(
            registry.validate_edge(&nodes, &[], &missing_port),
            Err(GraphError::DanglingEdgeReference(_))
        ));

        let ghost = NodeId::new();
        assert_eq!(
            registry.validate_edge(&nodes, &[], &Edge::new(ghost, "Out", gain.id, "Gain")),
            Err(GraphError::UnknownNode(ghost))
        );
    }

    #[test]
    fn test_create_node_uses_default_state() {
        let mut registry = NodeRegistry::new();
        registry.register(gain_definition()).unwrap();

        let (node, state) = registry.create_node("Gain", Position::new(5.0, 6.0)).unwrap();
        assert_eq!(node.type_name, "Gain");
        assert_eq!(node.position, Position::new(5.0, 6.0));
        assert_eq!(state, json!({ "gain": 0.5 }));

        assert_eq!(
            registry.create_node("Missing", Position::ORIGIN).map(|(node, _)| node.type_name),
            Err(GraphError::UnknownNodeType("Missing".to_string()))
        );
    }
}
