// ── Change notification ──
//
// One registry of listeners per store, shared by every store type.
// Listeners run synchronously, in registration order, after the store
// has released its own locks.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::{error, trace};

/// What a mutation touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// A single cache key changed.
    Key(String),
    /// The whole store changed (reset, unkeyed collections, selection).
    All,
}

impl Change {
    /// Whether a consumer of `key` has to look at this change.
    pub fn affects(&self, key: &str) -> bool {
        match self {
            Self::All => true,
            Self::Key(k) => k == key,
        }
    }
}

/// Callback invoked after every store mutation.
pub type Listener = Arc<dyn Fn(&Change) + Send + Sync>;

type Registry = RwLock<IndexMap<u64, Listener>>;

/// Ordered listener registry with per-listener panic isolation.
pub struct Notifier {
    name: &'static str,
    next_id: AtomicU64,
    listeners: Arc<Registry>,
}

impl Notifier {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            next_id: AtomicU64::new(0),
            listeners: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    /// Register a listener. It stays registered until the returned
    /// [`Subscription`] is unsubscribed or dropped.
    pub fn subscribe(&self, listener: impl Fn(&Change) + Send + Sync + 'static) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.write().insert(id, Arc::new(listener));
        trace!(store = self.name, subscriber = id, "subscribed");
        Subscription {
            inner: Some((Arc::downgrade(&self.listeners), id)),
        }
    }

    /// Invoke every registered listener once, in registration order.
    ///
    /// Must be called without holding any store lock. A panicking listener
    /// is logged and skipped; the others still run.
    pub fn notify(&self, change: &Change) {
        let snapshot: Vec<(u64, Listener)> = self
            .listeners
            .read()
            .iter()
            .map(|(id, l)| (*id, Arc::clone(l)))
            .collect();

        for (id, listener) in snapshot {
            // Unsubscribed by an earlier listener in this same pass.
            if !self.listeners.read().contains_key(&id) {
                continue;
            }
            if catch_unwind(AssertUnwindSafe(|| listener(change))).is_err() {
                error!(
                    store = self.name,
                    subscriber = id,
                    "subscriber panicked during notification"
                );
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.read().len()
    }
}

/// Handle owning one listener registration.
///
/// Unsubscribing is idempotent; dropping the handle unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    inner: Option<(Weak<Registry>, u64)>,
}

impl Subscription {
    /// Remove the listener. Calling this more than once is a no-op.
    pub fn unsubscribe(&mut self) {
        if let Some((registry, id)) = self.inner.take() {
            if let Some(registry) = registry.upgrade() {
                registry.write().shift_remove(&id);
                trace!(subscriber = id, "unsubscribed");
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.inner.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.inner.as_ref().map(|(_, id)| *id))
            .finish()
    }
}
