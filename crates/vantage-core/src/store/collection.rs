// ── Organization-scoped entity collection ──
//
// Lock-free lookups by id and slug, plus a sorted snapshot rebuilt on
// every mutation. Writers serialize on the metadata lock so the snapshot
// always reflects the last write.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use super::notifier::{Change, Notifier, Subscription};
use crate::error::LoadError;
use crate::model::Entity;

#[derive(Debug, Default)]
struct Meta {
    scope: Option<String>,
    loading: bool,
    loaded: bool,
    error: Option<LoadError>,
    updated_at: Option<DateTime<Utc>>,
}

/// Point-in-time view of a collection.
#[derive(Debug)]
pub struct CollectionState<T> {
    /// Items sorted by [`Entity::sort_key`].
    pub items: Arc<Vec<Arc<T>>>,
    pub loading: bool,
    /// At least one full load finished for the current scope.
    pub loaded: bool,
    pub error: Option<LoadError>,
    /// Organization the items belong to.
    pub scope: Option<String>,
}

impl<T> Clone for CollectionState<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            loading: self.loading,
            loaded: self.loaded,
            error: self.error.clone(),
            scope: self.scope.clone(),
        }
    }
}

impl<T> Default for CollectionState<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            loading: false,
            loaded: false,
            error: None,
            scope: None,
        }
    }
}

impl<T: PartialEq> PartialEq for CollectionState<T> {
    fn eq(&self, other: &Self) -> bool {
        self.loading == other.loading
            && self.loaded == other.loaded
            && self.error == other.error
            && self.scope == other.scope
            && (Arc::ptr_eq(&self.items, &other.items) || self.items == other.items)
    }
}

/// Unkeyed store holding every project (or team) of one organization.
pub struct CollectionStore<T: Entity> {
    name: &'static str,
    by_id: DashMap<String, Arc<T>>,
    slug_to_id: DashMap<String, String>,
    snapshot: ArcSwap<Vec<Arc<T>>>,
    meta: Mutex<Meta>,
    stale_after: Option<Duration>,
    notifier: Notifier,
}

impl<T: Entity> CollectionStore<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            by_id: DashMap::new(),
            slug_to_id: DashMap::new(),
            snapshot: ArcSwap::from_pointee(Vec::new()),
            meta: Mutex::new(Meta::default()),
            stale_after: None,
            notifier: Notifier::new(name),
        }
    }

    #[must_use]
    pub fn stale_after(mut self, ttl: Option<Duration>) -> Self {
        self.stale_after = ttl;
        self
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// All items, sorted by slug (cheap `Arc` clone).
    pub fn get_all(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.load_full()
    }

    pub fn get_by_id(&self, id: &str) -> Option<Arc<T>> {
        self.by_id.get(id).map(|r| Arc::clone(r.value()))
    }

    pub fn get_by_slug(&self, slug: &str) -> Option<Arc<T>> {
        let id = self.slug_to_id.get(slug)?;
        self.get_by_id(id.value())
    }

    pub fn state(&self) -> CollectionState<T> {
        let meta = self.meta.lock();
        CollectionState {
            items: self.snapshot.load_full(),
            loading: meta.loading,
            loaded: meta.loaded,
            error: meta.error.clone(),
            scope: meta.scope.clone(),
        }
    }

    pub fn scope(&self) -> Option<String> {
        self.meta.lock().scope.clone()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Whether [`begin_load`](Self::begin_load) for `scope` would start a load.
    pub fn needs_fetch(&self, scope: &str) -> bool {
        let meta = self.meta.lock();
        self.meta_needs_fetch(&meta, scope)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Mark the collection loading for `scope`. Switching to another scope
    /// drops the items of the previous one.
    pub fn load(&self, scope: &str) {
        {
            let mut meta = self.meta.lock();
            self.enter_scope(&mut meta, scope);
            meta.loading = true;
        }
        self.notify();
    }

    /// Atomic check-and-mark for `scope`. Returns `false` without mutating
    /// when the scope is already loading or loaded and fresh.
    pub fn begin_load(&self, scope: &str) -> bool {
        {
            let mut meta = self.meta.lock();
            if !self.meta_needs_fetch(&meta, scope) {
                debug!(store = self.name, scope, "load already satisfied, skipping");
                return false;
            }
            self.enter_scope(&mut meta, scope);
            meta.loading = true;
        }
        self.notify();
        true
    }

    /// Replace every item and mark the collection loaded.
    pub fn load_initial_data(&self, items: Vec<T>) {
        {
            let mut meta = self.meta.lock();
            self.replace_all(items);
            Self::mark_loaded(&mut meta);
        }
        self.notify();
    }

    /// Like [`load_initial_data`](Self::load_initial_data), but only if the
    /// collection still belongs to `scope`. Returns whether the items were
    /// applied.
    pub fn load_success(&self, scope: &str, items: Vec<T>) -> bool {
        {
            let mut meta = self.meta.lock();
            if meta.scope.as_deref() != Some(scope) {
                debug!(
                    store = self.name,
                    scope,
                    current = ?meta.scope,
                    "dropping response for a previous organization"
                );
                return false;
            }
            self.replace_all(items);
            Self::mark_loaded(&mut meta);
        }
        self.notify();
        true
    }

    /// Record a failed load for `scope`. Items already present stay
    /// visible. An error for a scope the collection has since left is
    /// dropped; returns whether it was recorded.
    pub fn load_error(&self, scope: &str, error: LoadError) -> bool {
        {
            let mut meta = self.meta.lock();
            if meta.scope.as_deref() != Some(scope) {
                debug!(
                    store = self.name,
                    scope,
                    current = ?meta.scope,
                    "dropping error for a previous organization"
                );
                return false;
            }
            meta.loading = false;
            meta.error = Some(error);
        }
        self.notify();
        true
    }

    /// Insert or replace one item.
    pub fn upsert(&self, item: T) {
        {
            let _meta = self.meta.lock();
            let id = item.id().to_owned();
            if let Some(old) = self.by_id.get(&id) {
                self.slug_to_id.remove(old.slug());
            }
            self.slug_to_id.insert(item.slug().to_owned(), id.clone());
            self.by_id.insert(id, Arc::new(item));
            self.rebuild_snapshot();
        }
        self.notify();
    }

    /// Remove an item by id. Notifies only if it existed.
    pub fn remove(&self, id: &str) -> Option<Arc<T>> {
        let removed = {
            let _meta = self.meta.lock();
            let removed = self.by_id.remove(id).map(|(_, v)| v);
            if let Some(item) = &removed {
                self.slug_to_id.remove(item.slug());
                self.rebuild_snapshot();
            }
            removed
        };
        if removed.is_some() {
            self.notify();
        }
        removed
    }

    /// Rename an item's slug. Returns `false` if no item had `old`.
    pub fn change_slug(&self, old: &str, new: &str) -> bool {
        {
            let _meta = self.meta.lock();
            let Some((_, id)) = self.slug_to_id.remove(old) else {
                return false;
            };
            if let Some(mut slot) = self.by_id.get_mut(&id) {
                let mut item = T::clone(slot.value());
                item.set_slug(new.to_owned());
                *slot = Arc::new(item);
            }
            self.slug_to_id.insert(new.to_owned(), id);
            self.rebuild_snapshot();
        }
        self.notify();
        true
    }

    /// Drop all items and metadata.
    pub fn reset(&self) {
        {
            let mut meta = self.meta.lock();
            *meta = Meta::default();
            self.by_id.clear();
            self.slug_to_id.clear();
            self.rebuild_snapshot();
        }
        self.notify();
    }

    pub fn subscribe(&self, listener: impl Fn(&Change) + Send + Sync + 'static) -> Subscription {
        self.notifier.subscribe(listener)
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn meta_needs_fetch(&self, meta: &Meta, scope: &str) -> bool {
        if meta.scope.as_deref() != Some(scope) {
            return true;
        }
        if meta.loading {
            return false;
        }
        !meta.loaded || meta.error.is_some() || self.is_stale(meta)
    }

    fn is_stale(&self, meta: &Meta) -> bool {
        let (Some(ttl), Some(at)) = (self.stale_after, meta.updated_at) else {
            return false;
        };
        (Utc::now() - at).to_std().is_ok_and(|age| age >= ttl)
    }

    fn enter_scope(&self, meta: &mut Meta, scope: &str) {
        if meta.scope.as_deref() == Some(scope) {
            return;
        }
        if let Some(previous) = meta.scope.as_deref() {
            debug!(store = self.name, previous, scope, "switching organization");
        }
        *meta = Meta {
            scope: Some(scope.to_owned()),
            ..Meta::default()
        };
        self.by_id.clear();
        self.slug_to_id.clear();
        self.rebuild_snapshot();
    }

    fn mark_loaded(meta: &mut Meta) {
        meta.loading = false;
        meta.loaded = true;
        meta.error = None;
        meta.updated_at = Some(Utc::now());
    }

    fn replace_all(&self, items: Vec<T>) {
        self.by_id.clear();
        self.slug_to_id.clear();
        for item in items {
            self.slug_to_id
                .insert(item.slug().to_owned(), item.id().to_owned());
            self.by_id.insert(item.id().to_owned(), Arc::new(item));
        }
        self.rebuild_snapshot();
    }

    fn rebuild_snapshot(&self) {
        let mut values: Vec<Arc<T>> = self.by_id.iter().map(|r| Arc::clone(r.value())).collect();
        values.sort_by(|a, b| a.sort_key().cmp(b.sort_key()));
        self.snapshot.store(Arc::new(values));
    }

    fn notify(&self) {
        self.notifier.notify(&Change::All);
    }
}

impl<T: Entity> std::fmt::Debug for CollectionStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionStore")
            .field("name", &self.name)
            .field("len", &self.by_id.len())
            .finish_non_exhaustive()
    }
}
