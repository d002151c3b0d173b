// ── Shipped bindings ──
//
// One binding per store. Each reads props from the shared `Stores`
// context and fetches through the action creators.

use tokio::task::JoinHandle;

use vantage_api::ApiClient;

use super::Binding;
use crate::actions;
use crate::model::{
    AttachmentKey, CacheKey, EventAttachment, OrgKey, Organization, Project, ReleaseKey, Team,
};
use crate::store::{
    CacheEntry, Change, CollectionState, CollectionStore, Listener, ReleaseSlice, SelectionState,
    Stores, Subscription,
};

macro_rules! api_binding {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            api: ApiClient,
            stores: Stores,
        }

        impl $name {
            pub fn new(api: ApiClient, stores: Stores) -> Self {
                Self { api, stores }
            }
        }
    };
}

// ── Organization ────────────────────────────────────────────────────

api_binding!(
    /// Organization details for one slug.
    WithOrganization
);

impl Binding for WithOrganization {
    type Key = OrgKey;
    type Props = CacheEntry<Organization>;

    fn props(&self, key: &OrgKey) -> Self::Props {
        self.stores.organizations().get(&key.cache_key())
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        self.stores.organizations().subscribe(move |c| listener(c))
    }

    fn affects(&self, key: &OrgKey, change: &Change) -> bool {
        change.affects(&key.cache_key())
    }

    fn fetch(&self, key: &OrgKey) -> Vec<JoinHandle<()>> {
        actions::fetch_organization(&self.api, &self.stores, key)
            .into_iter()
            .collect()
    }
}

// ── Projects & teams ────────────────────────────────────────────────

/// Collection state as seen from `org`; items of another organization
/// are never shown.
fn scoped_state<T: crate::model::Entity>(store: &CollectionStore<T>, org: &str) -> CollectionState<T> {
    let state = store.state();
    if state.scope.as_deref() == Some(org) {
        state
    } else {
        CollectionState::default()
    }
}

api_binding!(
    /// Every project of an organization.
    WithProjects
);

impl Binding for WithProjects {
    type Key = OrgKey;
    type Props = CollectionState<Project>;

    fn props(&self, key: &OrgKey) -> Self::Props {
        scoped_state(self.stores.projects(), key.org())
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        self.stores.projects().subscribe(move |c| listener(c))
    }

    fn affects(&self, _key: &OrgKey, _change: &Change) -> bool {
        true
    }

    fn fetch(&self, key: &OrgKey) -> Vec<JoinHandle<()>> {
        actions::fetch_projects(&self.api, &self.stores, key)
            .into_iter()
            .collect()
    }
}

api_binding!(
    /// Every team of an organization.
    WithTeams
);

impl Binding for WithTeams {
    type Key = OrgKey;
    type Props = CollectionState<Team>;

    fn props(&self, key: &OrgKey) -> Self::Props {
        scoped_state(self.stores.teams(), key.org())
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        self.stores.teams().subscribe(move |c| listener(c))
    }

    fn affects(&self, _key: &OrgKey, _change: &Change) -> bool {
        true
    }

    fn fetch(&self, key: &OrgKey) -> Vec<JoinHandle<()>> {
        actions::fetch_teams(&self.api, &self.stores, key)
            .into_iter()
            .collect()
    }
}

// ── Release ─────────────────────────────────────────────────────────

api_binding!(
    /// A release and its deploys.
    WithRelease
);

impl Binding for WithRelease {
    type Key = ReleaseKey;
    type Props = ReleaseSlice;

    fn props(&self, key: &ReleaseKey) -> Self::Props {
        self.stores.releases().get(key)
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        self.stores.releases().subscribe(move |c| listener(c))
    }

    fn affects(&self, key: &ReleaseKey, change: &Change) -> bool {
        change.affects(&key.cache_key())
    }

    fn fetch(&self, key: &ReleaseKey) -> Vec<JoinHandle<()>> {
        [
            actions::fetch_release(&self.api, &self.stores, key),
            actions::fetch_deploys(&self.api, &self.stores, key),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

// ── Attachments ─────────────────────────────────────────────────────

api_binding!(
    /// Attachments of one event.
    WithAttachments
);

impl Binding for WithAttachments {
    type Key = AttachmentKey;
    type Props = CacheEntry<Vec<EventAttachment>>;

    fn props(&self, key: &AttachmentKey) -> Self::Props {
        self.stores.attachments().get(&key.cache_key())
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        self.stores.attachments().subscribe(move |c| listener(c))
    }

    fn affects(&self, key: &AttachmentKey, change: &Change) -> bool {
        change.affects(&key.cache_key())
    }

    fn fetch(&self, key: &AttachmentKey) -> Vec<JoinHandle<()>> {
        actions::fetch_attachments(&self.api, &self.stores, key)
            .into_iter()
            .collect()
    }
}

// ── Global selection ────────────────────────────────────────────────

/// The global selection. Keyless and never fetches; the selection is
/// seeded through the store itself.
#[derive(Debug, Clone)]
pub struct WithGlobalSelection {
    stores: Stores,
}

impl WithGlobalSelection {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }
}

impl Binding for WithGlobalSelection {
    type Key = ();
    type Props = SelectionState;

    fn props(&self, _key: &()) -> Self::Props {
        self.stores.selection().get()
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        self.stores.selection().subscribe(move |c| listener(c))
    }

    fn affects(&self, _key: &(), _change: &Change) -> bool {
        true
    }

    fn fetch(&self, _key: &()) -> Vec<JoinHandle<()>> {
        Vec::new()
    }
}
