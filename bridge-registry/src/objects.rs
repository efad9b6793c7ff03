//! Handle table for objects passed to clients by reference.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use bridge_primitives::{HostObject, ObjectId, ObjectRef};
use tracing::{debug, trace};

/// Table size below which `register` never sweeps.
const MIN_SWEEP_THRESHOLD: usize = 64;

struct Table {
    entries: HashMap<ObjectId, Weak<dyn HostObject>>,
    sweep_at: usize,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            sweep_at: MIN_SWEEP_THRESHOLD,
        }
    }
}

impl Table {
    fn evict_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.strong_count() > 0);
        self.sweep_at = MIN_SWEEP_THRESHOLD.max(self.entries.len() * 2);
        before - self.entries.len()
    }
}

/// Concurrent table mapping handles to live objects.
///
/// The registry only holds weak associations: it never extends the lifetime
/// of an object. Once every other owner has dropped its reference the entry
/// is treated as gone, and it is physically evicted by a `get` on it, by
/// `len`, `list_ids` or `sweep`, or by a `register` once the table has
/// doubled since the last eviction pass. A `get` may therefore return `None`
/// for a handle that was valid an instant earlier; callers must read `None`
/// as "may have expired".
///
/// A single mutex guards every operation, so all operations are linearizable.
#[derive(Default)]
pub struct ObjectRegistry {
    inner: Mutex<Table>,
}

impl fmt::Debug for ObjectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("ObjectRegistry")
            .field("entries", &inner.entries.len())
            .finish()
    }
}

impl ObjectRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `object` under a fresh handle and returns the handle.
    ///
    /// Every call allocates a new handle, even for an object that is already
    /// registered.
    pub fn register(&self, object: &ObjectRef) -> ObjectId {
        let mut inner = self.lock();
        let evicted = if inner.entries.len() >= inner.sweep_at {
            inner.evict_expired()
        } else {
            0
        };

        let mut id = ObjectId::random();
        while inner.entries.contains_key(&id) {
            id = ObjectId::random();
        }
        inner.entries.insert(id, Arc::downgrade(object));

        debug!(
            id = %id,
            type_name = object.type_name(),
            evicted,
            "object registered"
        );
        id
    }

    /// Returns the live object behind `id`, or `None` if it is unknown or expired.
    #[must_use]
    pub fn get(&self, id: &ObjectId) -> Option<ObjectRef> {
        let mut inner = self.lock();
        let entry = inner.entries.get(id)?;
        if let Some(object) = entry.upgrade() {
            return Some(object);
        }
        inner.entries.remove(id);
        trace!(id = %id, "object expired");
        None
    }

    /// Resolves a handle carried on the wire.
    ///
    /// A string that is not a well-formed handle can never have been issued
    /// and resolves to `None`.
    #[must_use]
    pub fn resolve(&self, handle: &str) -> Option<ObjectRef> {
        let id = handle.parse::<ObjectId>().ok()?;
        self.get(&id)
    }

    /// Removes `id` explicitly. Returns `true` if a live entry was removed.
    ///
    /// Calling this twice, or on an expired handle, returns `false`.
    pub fn unregister(&self, id: &ObjectId) -> bool {
        let removed = self
            .lock()
            .entries
            .remove(id)
            .is_some_and(|entry| entry.strong_count() > 0);
        if removed {
            debug!(id = %id, "object unregistered");
        }
        removed
    }

    /// Returns every live handle.
    #[must_use]
    pub fn list_ids(&self) -> HashSet<ObjectId> {
        let mut inner = self.lock();
        inner.evict_expired();
        inner.entries.keys().copied().collect()
    }

    /// Returns the number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let mut inner = self.lock();
        inner.evict_expired();
        inner.entries.len()
    }

    /// Returns `true` when no live entry remains.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evicts every expired entry, returning how many were removed.
    pub fn sweep(&self) -> usize {
        self.lock().evict_expired()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        *self.lock() = Table::default();
    }
}
