use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::LoadError;

/// The cached state of one key.
///
/// `loading` is only true while a request is outstanding. A stale `value`
/// may sit next to a newer `error`, depending on the owning store's
/// [`ErrorPolicy`](super::ErrorPolicy).
#[derive(Debug, PartialEq)]
pub struct CacheEntry<V> {
    pub value: Option<Arc<V>>,
    pub loading: bool,
    pub error: Option<LoadError>,
    /// When `value` was last replaced by a successful load.
    pub updated_at: Option<DateTime<Utc>>,
}

impl<V> CacheEntry<V> {
    /// The entry of a key that was never loaded.
    pub const fn empty() -> Self {
        Self {
            value: None,
            loading: false,
            error: None,
            updated_at: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none() && !self.loading && self.error.is_none()
    }

    /// Borrow the value, if any.
    pub fn value(&self) -> Option<&V> {
        self.value.as_deref()
    }
}

impl<V> Default for CacheEntry<V> {
    fn default() -> Self {
        Self::empty()
    }
}

// Manual impl: cloning an entry never clones `V`.
impl<V> Clone for CacheEntry<V> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            loading: self.loading,
            error: self.error.clone(),
            updated_at: self.updated_at,
        }
    }
}
