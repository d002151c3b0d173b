// ── Keyed cache store ──
//
// One slot per cache key, each holding the last value, an in-flight flag
// and the last error. Mutations take the shard lock, release it, then
// notify; listeners may therefore read the store re-entrantly.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, warn};

use super::entry::CacheEntry;
use super::notifier::{Change, Notifier, Subscription};
use crate::error::LoadError;

/// What happens to a cached value when a later load fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Keep showing the last good value next to the error.
    #[default]
    KeepStale,
    /// Drop the value; the entry only carries the error.
    ClearStale,
}

/// Keyed store of [`CacheEntry`] slots with change notification.
pub struct KeyedStore<V> {
    name: &'static str,
    entries: DashMap<String, CacheEntry<V>>,
    policy: ErrorPolicy,
    stale_after: Option<Duration>,
    notifier: Arc<Notifier>,
}

impl<V> KeyedStore<V> {
    pub fn new(name: &'static str, policy: ErrorPolicy) -> Self {
        Self::with_notifier(name, policy, Arc::new(Notifier::new(name)))
    }

    /// Build a store that reports its mutations through an existing notifier.
    pub fn with_notifier(name: &'static str, policy: ErrorPolicy, notifier: Arc<Notifier>) -> Self {
        Self {
            name,
            entries: DashMap::new(),
            policy,
            stale_after: None,
            notifier,
        }
    }

    /// Values older than `ttl` are refetched by the next [`begin_load`](Self::begin_load).
    #[must_use]
    pub fn stale_after(mut self, ttl: Option<Duration>) -> Self {
        self.stale_after = ttl;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Current entry for `key`, or the empty entry if it was never touched.
    pub fn get(&self, key: &str) -> CacheEntry<V> {
        self.entries
            .get(key)
            .map(|e| e.value().clone())
            .unwrap_or_default()
    }

    /// Whether a fetch for `key` would do anything right now.
    pub fn needs_fetch(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .is_none_or(|e| self.entry_needs_fetch(e.value()))
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Mark `key` as loading. Any stale value and error stay visible.
    pub fn load(&self, key: &str) {
        if !self.check_key(key) {
            return;
        }
        self.entries.entry(key.to_owned()).or_default().loading = true;
        self.notify_key(key);
    }

    /// Atomically check whether `key` needs a fetch and, if so, mark it
    /// loading. Returns `false` without mutating or notifying when a load
    /// is already outstanding or a fresh value is cached.
    pub fn begin_load(&self, key: &str) -> bool {
        if !self.check_key(key) {
            return false;
        }
        let started = match self.entries.entry(key.to_owned()) {
            Entry::Occupied(mut slot) => {
                if self.entry_needs_fetch(slot.get()) {
                    slot.get_mut().loading = true;
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(CacheEntry {
                    loading: true,
                    ..CacheEntry::empty()
                });
                true
            }
        };

        if started {
            self.notify_key(key);
        } else {
            debug!(store = self.name, key, "load already satisfied, skipping");
        }
        started
    }

    pub fn load_success(&self, key: &str, value: V) {
        if !self.check_key(key) {
            return;
        }
        {
            let mut entry = self.entries.entry(key.to_owned()).or_default();
            entry.value = Some(Arc::new(value));
            entry.loading = false;
            entry.error = None;
            entry.updated_at = Some(Utc::now());
        }
        self.notify_key(key);
    }

    pub fn load_error(&self, key: &str, error: LoadError) {
        if !self.check_key(key) {
            return;
        }
        {
            let mut entry = self.entries.entry(key.to_owned()).or_default();
            entry.loading = false;
            entry.error = Some(error);
            if self.policy == ErrorPolicy::ClearStale {
                entry.value = None;
                entry.updated_at = None;
            }
        }
        self.notify_key(key);
    }

    /// Drop every entry.
    pub fn reset(&self) {
        self.entries.clear();
        self.notifier.notify(&Change::All);
    }

    pub fn subscribe(&self, listener: impl Fn(&Change) + Send + Sync + 'static) -> Subscription {
        self.notifier.subscribe(listener)
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn entry_needs_fetch(&self, entry: &CacheEntry<V>) -> bool {
        !entry.loading && (entry.value.is_none() || entry.error.is_some() || self.is_stale(entry))
    }

    fn is_stale(&self, entry: &CacheEntry<V>) -> bool {
        let (Some(ttl), Some(at)) = (self.stale_after, entry.updated_at) else {
            return false;
        };
        (Utc::now() - at).to_std().is_ok_and(|age| age >= ttl)
    }

    fn check_key(&self, key: &str) -> bool {
        debug_assert!(!key.is_empty(), "empty cache key passed to {} store", self.name);
        if key.is_empty() {
            warn!(store = self.name, "ignoring mutation with an empty cache key");
            return false;
        }
        true
    }

    fn notify_key(&self, key: &str) {
        self.notifier.notify(&Change::Key(key.to_owned()));
    }
}

impl<V> std::fmt::Debug for KeyedStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedStore")
            .field("name", &self.name)
            .field("entries", &self.entries.len())
            .field("policy", &self.policy)
            .field("stale_after", &self.stale_after)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::LoadErrorKind;

    fn boom() -> LoadError {
        LoadError::new(LoadErrorKind::Application, "boom").with_status(500)
    }

    fn counting(store: &KeyedStore<String>) -> (Arc<AtomicUsize>, Subscription) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let sub = store.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        (count, sub)
    }

    #[test]
    fn unknown_key_is_empty_entry() {
        let store: KeyedStore<String> = KeyedStore::new("test", ErrorPolicy::KeepStale);
        let entry = store.get("nope");
        assert!(entry.is_empty());
        assert!(store.get("").is_empty());
    }

    #[test]
    fn loading_stays_true_until_settled() {
        let store: KeyedStore<String> = KeyedStore::new("test", ErrorPolicy::KeepStale);
        store.load("k");
        assert!(store.get("k").loading);
        assert!(store.get("k").loading);

        store.load_success("k", "v".into());
        let entry = store.get("k");
        assert!(!entry.loading);
        assert_eq!(entry.value(), Some(&"v".to_owned()));
        assert!(entry.updated_at.is_some());
    }

    #[test]
    fn every_mutation_notifies_exactly_once() {
        let store: KeyedStore<String> = KeyedStore::new("test", ErrorPolicy::KeepStale);
        let (count, _sub) = counting(&store);

        store.load("k");
        assert_eq!(count.load(Ordering::SeqCst), 1);
        store.load_success("k", "v".into());
        assert_eq!(count.load(Ordering::SeqCst), 2);
        store.load_error("k", boom());
        assert_eq!(count.load(Ordering::SeqCst), 3);
        store.reset();
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn notification_carries_key() {
        let store: KeyedStore<String> = KeyedStore::new("test", ErrorPolicy::KeepStale);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let _sub = store.subscribe(move |change| s.lock().unwrap().push(change.clone()));

        store.load("a b");
        store.reset();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![Change::Key("a b".into()), Change::All]
        );
    }

    #[test]
    fn listener_can_read_store_reentrantly() {
        let store: Arc<KeyedStore<String>> =
            Arc::new(KeyedStore::new("test", ErrorPolicy::KeepStale));
        let observed = Arc::new(Mutex::new(None));
        let (s, o) = (Arc::clone(&store), Arc::clone(&observed));
        let _sub = store.subscribe(move |_| *o.lock().unwrap() = Some(s.get("k").loading));

        store.load("k");
        assert_eq!(*observed.lock().unwrap(), Some(true));
    }

    #[test]
    fn keep_stale_preserves_value_on_error() {
        let store: KeyedStore<String> = KeyedStore::new("test", ErrorPolicy::KeepStale);
        store.load_success("k", "old".into());
        store.load("k");
        assert_eq!(store.get("k").value(), Some(&"old".to_owned()));

        store.load_error("k", boom());
        let entry = store.get("k");
        assert_eq!(entry.value(), Some(&"old".to_owned()));
        assert_eq!(entry.error.unwrap().status, Some(500));
        assert!(!entry.loading);
    }

    #[test]
    fn clear_stale_drops_value_on_error() {
        let store: KeyedStore<String> = KeyedStore::new("test", ErrorPolicy::ClearStale);
        store.load_success("k", "old".into());
        store.load_error("k", boom());
        let entry = store.get("k");
        assert!(entry.value.is_none());
        assert!(entry.error.is_some());
    }

    #[test]
    fn success_clears_previous_error() {
        let store: KeyedStore<String> = KeyedStore::new("test", ErrorPolicy::KeepStale);
        store.load_error("k", boom());
        store.load("k");
        assert!(store.get("k").error.is_some());

        store.load_success("k", "v".into());
        assert!(store.get("k").error.is_none());
    }

    #[test]
    fn reset_clears_everything() {
        let store: KeyedStore<String> = KeyedStore::new("test", ErrorPolicy::KeepStale);
        store.load_success("a", "1".into());
        store.load("b");
        store.reset();
        assert!(store.is_empty());
        assert!(store.get("a").is_empty());
        assert!(store.get("b").is_empty());
    }

    #[test]
    fn begin_load_dedups_outstanding_and_fresh() {
        let store: KeyedStore<String> = KeyedStore::new("test", ErrorPolicy::KeepStale);
        let (count, _sub) = counting(&store);

        assert!(store.begin_load("k"));
        assert!(!store.begin_load("k"));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        store.load_success("k", "v".into());
        assert!(!store.begin_load("k"));
        assert!(!store.needs_fetch("k"));

        store.load_error("k", boom());
        assert!(store.needs_fetch("k"));
        assert!(store.begin_load("k"));
        assert!(store.get("k").error.is_some());
    }

    #[test]
    fn stale_values_are_refetched() {
        let store: KeyedStore<String> =
            KeyedStore::new("test", ErrorPolicy::KeepStale).stale_after(Some(Duration::ZERO));
        store.load_success("k", "v".into());
        assert!(store.needs_fetch("k"));
        assert!(store.begin_load("k"));
        assert_eq!(store.get("k").value(), Some(&"v".to_owned()));
    }

    #[test]
    fn unsubscribe_stops_notification() {
        let store: KeyedStore<String> = KeyedStore::new("test", ErrorPolicy::KeepStale);
        let (count, mut sub) = counting(&store);
        store.load("k");
        sub.unsubscribe();
        store.load_success("k", "v".into());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn keys_and_len_track_entries() {
        let store: KeyedStore<String> = KeyedStore::new("test", ErrorPolicy::KeepStale);
        store.load("a");
        store.load_success("b", "x".into());
        let mut keys = store.keys();
        keys.sort();
        assert_eq!(keys, vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(store.len(), 2);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "empty cache key")]
    fn empty_key_asserts_in_debug() {
        let store: KeyedStore<String> = KeyedStore::new("test", ErrorPolicy::KeepStale);
        store.load("");
    }
}
