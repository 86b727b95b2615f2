//! Engine object cache
//!
//! One live engine object per node id, created on first use and kept for the
//! whole lifetime of the node. Re-deriving the graph never recreates an
//! object; only disposal (node deletion) removes one.

use super::{EngineContext, EngineObject};
use crate::nodes::{DisposeHook, Node, NodeDefinition, NodeId};
use log::debug;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Statistics about cache usage
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CacheStatistics {
    /// Number of live engine objects
    pub total_entries: usize,
    /// Lookups that found an existing object
    pub cache_hits: usize,
    /// Lookups that had to run a factory
    pub cache_misses: usize,
    /// Objects disposed because their node left the graph
    pub disposed: usize,
}

impl CacheStatistics {
    /// Calculate cache hit ratio
    pub fn hit_ratio(&self) -> f32 {
        let total_accesses = self.cache_hits + self.cache_misses;
        if total_accesses == 0 {
            0.0
        } else {
            self.cache_hits as f32 / total_accesses as f32
        }
    }

    /// Number of objects ever created
    pub fn created(&self) -> usize {
        self.cache_misses
    }
}

struct CachedObject {
    type_name: String,
    object: EngineObject,
    dispose: DisposeHook,
}

impl CachedObject {
    fn release(self) {
        (self.dispose)(&self.object);
    }
}

/// Identity-keyed store of per-node engine objects
#[derive(Default)]
pub struct EngineObjectCache {
    objects: HashMap<NodeId, CachedObject>,
    stats: CacheStatistics,
}

impl EngineObjectCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the node's engine object, building it on first request.
    ///
    /// Repeated calls for the same node id always return the same object.
    pub fn get_or_create(&mut self, node: &Node, definition: &NodeDefinition, context: &EngineContext) -> EngineObject {
        if let Some(cached) = self.objects.get(&node.id) {
            self.stats.cache_hits += 1;
            return Rc::clone(&cached.object);
        }

        self.stats.cache_misses += 1;
        let object = definition.instantiate(context);
        debug!("Created engine object for '{}' node {}", node.type_name, node.id);

        let definition = definition.clone();
        let dispose: DisposeHook = Rc::new(move |object: &EngineObject| definition.dispose(object));
        self.objects.insert(
            node.id,
            CachedObject {
                type_name: node.type_name.clone(),
                object: Rc::clone(&object),
                dispose,
            },
        );
        self.stats.total_entries = self.objects.len();
        object
    }

    /// Cached object for a node, without creating one
    pub fn get(&self, node_id: NodeId) -> Option<EngineObject> {
        self.objects.get(&node_id).map(|cached| Rc::clone(&cached.object))
    }

    pub fn contains(&self, node_id: NodeId) -> bool {
        self.objects.contains_key(&node_id)
    }

    /// Run the node type's dispose hook and forget the object.
    ///
    /// Returns false if nothing was cached for the node.
    pub fn dispose(&mut self, node_id: NodeId) -> bool {
        let Some(cached) = self.objects.remove(&node_id) else {
            return false;
        };

        debug!("Disposing engine object for '{}' node {}", cached.type_name, node_id);
        cached.release();
        self.stats.disposed += 1;
        self.stats.total_entries = self.objects.len();
        true
    }

    /// Dispose every object whose node is not in `nodes`; returns how many were disposed
    pub fn retain_nodes(&mut self, nodes: &[Node]) -> usize {
        let stale: Vec<NodeId> = self
            .objects
            .keys()
            .filter(|id| !nodes.iter().any(|node| node.id == **id))
            .copied()
            .collect();

        stale.into_iter().filter(|id| self.dispose(*id)).count()
    }

    /// Dispose everything
    pub fn clear(&mut self) {
        let ids: Vec<NodeId> = self.objects.keys().copied().collect();
        for id in ids {
            self.dispose(id);
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Get cache statistics
    pub fn statistics(&self) -> &CacheStatistics {
        &self.stats
    }
}

impl fmt::Debug for EngineObjectCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineObjectCache")
            .field("entries", &self.objects.len())
            .field("stats", &self.stats)
            .finish()
    }
}
