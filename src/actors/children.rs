// Named-child bookkeeping shared by the registry actors.
//
// Both hierarchy levels keep the same pair of maps: key -> child handle for
// routing, and child actor id -> key for cleanup when a linked child dies.
// The two maps are only ever mutated together.

use std::collections::HashMap;
use std::hash::Hash;

use kameo::Actor;
use kameo::actor::{ActorId, ActorRef};

/// Bidirectional key <-> child handle bookkeeping for one parent actor
///
/// # Example
///
/// ```rust,ignore
/// let mut devices: ChildRegistry<DeviceId, DeviceEntity> = ChildRegistry::new();
/// devices.insert(device_id.clone(), device_ref);
///
/// // Later, when a linked child reports in on_link_died:
/// if let Some(device_id) = devices.remove_by_actor(dead_id) {
///     info!("Device actor for {} has been terminated", device_id);
/// }
/// ```
pub struct ChildRegistry<K, A: Actor> {
    by_key: HashMap<K, ActorRef<A>>,
    by_actor: HashMap<ActorId, K>,
}

impl<K, A> ChildRegistry<K, A>
where
    K: Clone + Eq + Hash,
    A: Actor,
{
    pub fn new() -> Self {
        Self {
            by_key: HashMap::new(),
            by_actor: HashMap::new(),
        }
    }

    /// Look up the live child registered under `key`
    pub fn get(&self, key: &K) -> Option<&ActorRef<A>> {
        self.by_key.get(key)
    }

    /// Register a child under `key`, replacing any previous mapping for it
    pub fn insert(&mut self, key: K, child: ActorRef<A>) {
        let id = child.id();
        if let Some(previous) = self.by_key.insert(key.clone(), child) {
            self.by_actor.remove(&previous.id());
        }
        self.by_actor.insert(id, key);
    }

    /// Remove the child with the given actor id, returning the key it was
    /// registered under. Unknown ids are a no-op.
    pub fn remove_by_actor(&mut self, id: ActorId) -> Option<K> {
        let key = self.by_actor.remove(&id)?;
        self.by_key.remove(&key);
        Some(key)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Iterate over the keys of all live children
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.by_key.keys()
    }
}

impl<K, A> Default for ChildRegistry<K, A>
where
    K: Clone + Eq + Hash,
    A: Actor,
{
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
