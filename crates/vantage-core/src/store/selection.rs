// ── Global selection store ──

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use super::notifier::{Change, Notifier, Subscription};
use crate::selection::{
    DateTimeSelection, GlobalSelection, SelectionQuery, SelectionStorage, StoredSelection,
};

/// What views read from the selection store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    pub selection: GlobalSelection,
    /// URL state initialized and organization loaded.
    pub is_ready: bool,
}

/// Fields to persist as last-used. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionUpdate {
    pub projects: Option<Vec<i64>>,
    pub environments: Option<Vec<String>>,
}

#[derive(Debug, Default)]
struct Inner {
    selection: GlobalSelection,
    has_initial_state: bool,
    organization: Option<String>,
    /// Organization whose details are being loaded.
    target: Option<String>,
}

impl Inner {
    fn snapshot(&self) -> SelectionState {
        SelectionState {
            selection: self.selection.clone(),
            is_ready: self.has_initial_state && self.organization.is_some(),
        }
    }
}

pub struct SelectionStore {
    inner: RwLock<Inner>,
    storage: Arc<dyn SelectionStorage>,
    notifier: Notifier,
}

impl SelectionStore {
    pub fn new(storage: Arc<dyn SelectionStorage>) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            storage,
            notifier: Notifier::new("selection"),
        }
    }

    pub fn get(&self) -> SelectionState {
        self.inner.read().snapshot()
    }

    /// Organization passed to the last [`load_initial_data`](Self::load_initial_data).
    pub fn organization(&self) -> Option<String> {
        self.inner.read().organization.clone()
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        self.inner.read().selection.to_query()
    }

    /// Back to the default selection; not ready.
    pub fn reset(&self) {
        *self.inner.write() = Inner::default();
        self.notify();
    }

    /// Seed the selection from the URL. The time window always comes from
    /// `query`. Projects and environments come from `query` when it names
    /// either; otherwise, unless `skip_last_used`, from the last-used
    /// selection stored for `org`.
    pub fn initialize_url_state(&self, org: &str, query: &SelectionQuery, skip_last_used: bool) {
        let mut selection = GlobalSelection {
            datetime: query.datetime(),
            ..GlobalSelection::default()
        };

        if query.has_project_or_environment() {
            selection.projects = query.project.clone().unwrap_or_default();
            selection.environments = query.environment.clone().unwrap_or_default();
        } else if !skip_last_used {
            match self.storage.load(org) {
                Ok(Some(stored)) => {
                    debug!(org, "restoring last-used selection");
                    selection.projects = stored.projects;
                    selection.environments = stored.environments;
                }
                Ok(None) => {}
                Err(e) => warn!(org, error = %e, "ignoring unreadable last-used selection"),
            }
        }

        {
            let mut inner = self.inner.write();
            inner.has_initial_state = true;
            inner.selection = selection;
        }
        self.notify();
    }

    /// Mark `org` as loaded; enables [`save`](Self::save).
    pub fn load_initial_data(&self, org: &str) {
        {
            let mut inner = self.inner.write();
            inner.organization = Some(org.to_owned());
            inner.target = Some(org.to_owned());
        }
        self.notify();
    }

    /// Record `org` as the organization being loaded. A different loaded
    /// organization is forgotten.
    pub fn expect_organization(&self, org: &str) {
        let changed = {
            let mut inner = self.inner.write();
            inner.target = Some(org.to_owned());
            if inner.organization.as_deref().is_some_and(|loaded| loaded != org) {
                inner.organization = None;
                true
            } else {
                false
            }
        };
        if changed {
            self.notify();
        }
    }

    /// Like [`load_initial_data`](Self::load_initial_data), but only while
    /// `org` is still the organization being loaded. Returns whether it
    /// applied.
    pub fn load_success(&self, org: &str) -> bool {
        {
            let mut inner = self.inner.write();
            if inner.target.as_deref() != Some(org) {
                debug!(org, target = ?inner.target, "dropping organization that is no longer selected");
                return false;
            }
            inner.organization = Some(org.to_owned());
        }
        self.notify();
        true
    }

    /// Forget the loaded organization, keeping the selection itself.
    pub fn clear_organization(&self) {
        let changed = self.inner.write().organization.take().is_some();
        if changed {
            self.notify();
        }
    }

    pub fn update_projects(&self, projects: Vec<i64>) {
        self.update(|s| &mut s.projects, projects);
    }

    pub fn update_environments(&self, environments: Vec<String>) {
        self.update(|s| &mut s.environments, environments);
    }

    pub fn update_date_time(&self, datetime: DateTimeSelection) {
        self.update(|s| &mut s.datetime, datetime);
    }

    /// Apply selection parameters from a URL on top of the current state.
    /// Keys absent from `query` leave their part of the selection alone.
    pub fn apply_query(&self, query: &SelectionQuery) {
        if query.has_project_or_environment() {
            self.update_projects(query.project.clone().unwrap_or_default());
            self.update_environments(query.environment.clone().unwrap_or_default());
        }
        if query.has_datetime() {
            self.update_date_time(query.datetime());
        }
    }

    /// Persist last-used projects and environments for the loaded
    /// organization. Without one this does nothing; storage errors are
    /// logged and swallowed.
    pub fn save(&self, update: SelectionUpdate) {
        let (org, record) = {
            let inner = self.inner.read();
            let Some(org) = inner.organization.clone() else {
                debug!("no organization loaded, not saving selection");
                return;
            };
            let record = StoredSelection {
                projects: update
                    .projects
                    .unwrap_or_else(|| inner.selection.projects.clone()),
                environments: update
                    .environments
                    .unwrap_or_else(|| inner.selection.environments.clone()),
            };
            (org, record)
        };

        if let Err(e) = self.storage.save(&org, &record) {
            warn!(org, error = %e, "failed to save last-used selection");
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&Change) + Send + Sync + 'static) -> Subscription {
        self.notifier.subscribe(listener)
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn update<T: PartialEq>(&self, field: impl FnOnce(&mut GlobalSelection) -> &mut T, value: T) {
        {
            let mut inner = self.inner.write();
            let slot = field(&mut inner.selection);
            if *slot == value {
                return;
            }
            *slot = value;
        }
        self.notify();
    }

    fn notify(&self) {
        self.notifier.notify(&Change::All);
    }
}

impl std::fmt::Debug for SelectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionStore")
            .field("state", &self.get())
            .finish_non_exhaustive()
    }
}
