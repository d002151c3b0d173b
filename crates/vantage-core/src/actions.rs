// ── Action creators ──
//
// Each fetch marks its store loading in the caller's tick, then performs
// the request on the tokio runtime and settles the store with the
// outcome. A `None` return means no request was issued: the data is
// already loading or fresh, or there is no runtime to run it on.
//
// Failures become `LoadError` data on the store; nothing here returns
// an error.

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use vantage_api::ApiClient;

use crate::error::LoadError;
use crate::model::{AttachmentKey, CacheKey, Entity, OrgKey, ReleaseKey};
use crate::store::{CollectionStore, KeyedStore, Stores};

/// Load an organization's details. Once they are available the selection
/// store is told the organization is loaded, unless another organization
/// was requested in the meantime.
pub fn fetch_organization(api: &ApiClient, stores: &Stores, key: &OrgKey) -> Option<JoinHandle<()>> {
    let runtime = runtime()?;
    stores.selection().expect_organization(key.org());
    let cache_key = key.cache_key();
    if !stores.organizations().begin_load(&cache_key) {
        // Fresh details need no request; an in-flight one settles below.
        let entry = stores.organizations().get(&cache_key);
        if !entry.loading && entry.value.is_some() {
            stores.selection().load_success(key.org());
        }
        return None;
    }

    let (api, stores, org) = (api.clone(), stores.clone(), key.org().to_owned());
    Some(runtime.spawn(async move {
        debug!(org, "fetching organization");
        let result = api.organization(&org).await;
        let loaded = result.is_ok();
        settle(stores.organizations(), &cache_key, result);
        if loaded {
            stores.selection().load_success(&org);
        }
    }))
}

/// Load every project of an organization, following pagination.
pub fn fetch_projects(api: &ApiClient, stores: &Stores, key: &OrgKey) -> Option<JoinHandle<()>> {
    let runtime = runtime()?;
    if !stores.projects().begin_load(key.org()) {
        return None;
    }

    let (api, stores, org) = (api.clone(), stores.clone(), key.org().to_owned());
    Some(runtime.spawn(async move {
        debug!(org, "fetching projects");
        let result = api.list_all_projects(&org).await;
        settle_collection(stores.projects(), &org, result);
    }))
}

/// Load every team of an organization, following pagination.
pub fn fetch_teams(api: &ApiClient, stores: &Stores, key: &OrgKey) -> Option<JoinHandle<()>> {
    let runtime = runtime()?;
    if !stores.teams().begin_load(key.org()) {
        return None;
    }

    let (api, stores, org) = (api.clone(), stores.clone(), key.org().to_owned());
    Some(runtime.spawn(async move {
        debug!(org, "fetching teams");
        let result = api.list_all_teams(&org).await;
        settle_collection(stores.teams(), &org, result);
    }))
}

pub fn fetch_release(api: &ApiClient, stores: &Stores, key: &ReleaseKey) -> Option<JoinHandle<()>> {
    let runtime = runtime()?;
    let cache_key = key.cache_key();
    if !stores.releases().releases().begin_load(&cache_key) {
        return None;
    }

    let (api, stores, key) = (api.clone(), stores.clone(), key.clone());
    Some(runtime.spawn(async move {
        debug!(release = %key, "fetching release");
        let result = api
            .project_release(key.org(), key.project(), key.version())
            .await;
        settle(stores.releases().releases(), &cache_key, result);
    }))
}

pub fn fetch_deploys(api: &ApiClient, stores: &Stores, key: &ReleaseKey) -> Option<JoinHandle<()>> {
    let runtime = runtime()?;
    let cache_key = key.cache_key();
    if !stores.releases().deploys().begin_load(&cache_key) {
        return None;
    }

    let (api, stores, key) = (api.clone(), stores.clone(), key.clone());
    Some(runtime.spawn(async move {
        debug!(release = %key, "fetching deploys");
        let result = api.release_deploys(key.org(), key.version()).await;
        settle(stores.releases().deploys(), &cache_key, result);
    }))
}

pub fn fetch_attachments(
    api: &ApiClient,
    stores: &Stores,
    key: &AttachmentKey,
) -> Option<JoinHandle<()>> {
    let runtime = runtime()?;
    let cache_key = key.cache_key();
    if !stores.attachments().begin_load(&cache_key) {
        return None;
    }

    let (api, stores, key) = (api.clone(), stores.clone(), key.clone());
    Some(runtime.spawn(async move {
        debug!(event = %key, "fetching attachments");
        let result = api
            .event_attachments(key.org(), key.project(), key.event_id())
            .await;
        settle(stores.attachments(), &cache_key, result);
    }))
}

/// Drop everything cached for the previous organization and load the
/// new one's details, projects and teams.
pub fn switch_organization(api: &ApiClient, stores: &Stores, key: &OrgKey) -> Vec<JoinHandle<()>> {
    debug!(org = key.org(), "switching organization");
    stores.reset_org_scoped();
    [
        fetch_organization(api, stores, key),
        fetch_projects(api, stores, key),
        fetch_teams(api, stores, key),
    ]
    .into_iter()
    .flatten()
    .collect()
}

// ── Private helpers ──────────────────────────────────────────────────

fn runtime() -> Option<Handle> {
    match Handle::try_current() {
        Ok(handle) => Some(handle),
        Err(_) => {
            warn!("fetch requested outside a tokio runtime, skipping");
            None
        }
    }
}

fn settle<V>(store: &KeyedStore<V>, key: &str, result: Result<V, vantage_api::Error>) {
    match result {
        Ok(value) => store.load_success(key, value),
        Err(e) => {
            warn!(store = store.name(), key, error = %e, "load failed");
            store.load_error(key, LoadError::from(&e));
        }
    }
}

fn settle_collection<T: Entity>(
    store: &CollectionStore<T>,
    org: &str,
    result: Result<Vec<T>, vantage_api::Error>,
) {
    match result {
        Ok(items) => {
            debug!(org, count = items.len(), "collection loaded");
            store.load_success(org, items);
        }
        Err(e) => {
            warn!(org, error = %e, "collection load failed");
            store.load_error(org, LoadError::from(&e));
        }
    }
}
