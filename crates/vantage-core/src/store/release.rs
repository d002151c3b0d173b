use std::sync::Arc;
use std::time::Duration;

use super::entry::CacheEntry;
use super::keyed::{ErrorPolicy, KeyedStore};
use super::notifier::{Change, Notifier, Subscription};
use crate::model::{CacheKey, Deploy, Release, ReleaseKey};

/// A release and its deploys, as one consumer sees them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReleaseSlice {
    pub release: CacheEntry<Release>,
    pub deploys: CacheEntry<Vec<Deploy>>,
}

impl ReleaseSlice {
    pub fn loading(&self) -> bool {
        self.release.loading || self.deploys.loading
    }
}

/// Releases and deploys keyed by project and version.
///
/// Both halves report through one notifier, so a consumer subscribes once.
#[derive(Debug)]
pub struct ReleaseStore {
    releases: KeyedStore<Release>,
    deploys: KeyedStore<Vec<Deploy>>,
}

impl ReleaseStore {
    pub fn new(stale_after: Option<Duration>) -> Self {
        let notifier = Arc::new(Notifier::new("releases"));
        Self {
            releases: KeyedStore::with_notifier("releases", ErrorPolicy::KeepStale, Arc::clone(&notifier))
                .stale_after(stale_after),
            deploys: KeyedStore::with_notifier("deploys", ErrorPolicy::KeepStale, notifier)
                .stale_after(stale_after),
        }
    }

    pub fn get(&self, key: &ReleaseKey) -> ReleaseSlice {
        let key = key.cache_key();
        ReleaseSlice {
            release: self.releases.get(&key),
            deploys: self.deploys.get(&key),
        }
    }

    pub fn releases(&self) -> &KeyedStore<Release> {
        &self.releases
    }

    pub fn deploys(&self) -> &KeyedStore<Vec<Deploy>> {
        &self.deploys
    }

    /// Clear both halves. Listeners see two `Change::All` notifications.
    pub fn reset(&self) {
        self.releases.reset();
        self.deploys.reset();
    }

    pub fn subscribe(&self, listener: impl Fn(&Change) + Send + Sync + 'static) -> Subscription {
        self.releases.subscribe(listener)
    }
}
