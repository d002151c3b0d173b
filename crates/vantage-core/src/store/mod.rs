// ── Reactive stores ──
//
// Keyed and collection stores that own their mutations and notify
// subscribers synchronously.

mod collection;
mod entry;
mod keyed;
mod notifier;
mod release;
mod selection;
mod stores;

pub use collection::{CollectionState, CollectionStore};
pub use entry::CacheEntry;
pub use keyed::{ErrorPolicy, KeyedStore};
pub use notifier::{Change, Listener, Notifier, Subscription};
pub use release::{ReleaseSlice, ReleaseStore};
pub use selection::{SelectionState, SelectionStore, SelectionUpdate};
pub use stores::{StoreSettings, Stores};
