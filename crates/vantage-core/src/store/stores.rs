// ── Store context ──
//
// Every store a session needs, created together. Tests build their own
// context; production code may share the lazily-created global one.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use tracing::debug;

use super::collection::CollectionStore;
use super::keyed::{ErrorPolicy, KeyedStore};
use super::release::ReleaseStore;
use super::selection::SelectionStore;
use crate::model::{EventAttachment, Organization, Project, Team};
use crate::selection::{MemoryStorage, SelectionStorage};

/// Construction-time knobs shared by all stores of a context.
#[derive(Clone)]
pub struct StoreSettings {
    /// Cached values older than this are refetched on the next fetch.
    pub stale_after: Option<Duration>,
    pub selection_storage: Arc<dyn SelectionStorage>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            stale_after: None,
            selection_storage: Arc::new(MemoryStorage::new()),
        }
    }
}

impl std::fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSettings")
            .field("stale_after", &self.stale_after)
            .finish_non_exhaustive()
    }
}

static GLOBAL: Lazy<Stores> = Lazy::new(|| Stores::new(StoreSettings::default()));

/// One set of stores. Cheaply cloneable via `Arc<StoresInner>`.
#[derive(Clone, Debug)]
pub struct Stores {
    inner: Arc<StoresInner>,
}

#[derive(Debug)]
struct StoresInner {
    organizations: KeyedStore<Organization>,
    projects: CollectionStore<Project>,
    teams: CollectionStore<Team>,
    releases: ReleaseStore,
    attachments: KeyedStore<Vec<EventAttachment>>,
    selection: SelectionStore,
}

impl Stores {
    pub fn new(settings: StoreSettings) -> Self {
        let ttl = settings.stale_after;
        Self {
            inner: Arc::new(StoresInner {
                organizations: KeyedStore::new("organizations", ErrorPolicy::KeepStale)
                    .stale_after(ttl),
                projects: CollectionStore::new("projects").stale_after(ttl),
                teams: CollectionStore::new("teams").stale_after(ttl),
                releases: ReleaseStore::new(ttl),
                attachments: KeyedStore::new("attachments", ErrorPolicy::ClearStale)
                    .stale_after(ttl),
                selection: SelectionStore::new(settings.selection_storage),
            }),
        }
    }

    /// Process-wide default context with in-memory selection storage.
    pub fn global() -> &'static Stores {
        &GLOBAL
    }

    pub fn organizations(&self) -> &KeyedStore<Organization> {
        &self.inner.organizations
    }

    pub fn projects(&self) -> &CollectionStore<Project> {
        &self.inner.projects
    }

    pub fn teams(&self) -> &CollectionStore<Team> {
        &self.inner.teams
    }

    pub fn releases(&self) -> &ReleaseStore {
        &self.inner.releases
    }

    pub fn attachments(&self) -> &KeyedStore<Vec<EventAttachment>> {
        &self.inner.attachments
    }

    pub fn selection(&self) -> &SelectionStore {
        &self.inner.selection
    }

    /// Reset the stores whose content belongs to one organization and
    /// forget which organization the selection was loaded for.
    pub fn reset_org_scoped(&self) {
        debug!("resetting organization-scoped stores");
        self.inner.projects.reset();
        self.inner.teams.reset();
        self.inner.releases.reset();
        self.inner.attachments.reset();
        self.inner.selection.clear_organization();
    }

    /// Reset every store, including organizations and the selection.
    pub fn reset_all(&self) {
        self.reset_org_scoped();
        self.inner.organizations.reset();
        self.inner.selection.reset();
    }

    /// Whether two handles point at the same context.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Stores {
    fn default() -> Self {
        Self::new(StoreSettings::default())
    }
}
