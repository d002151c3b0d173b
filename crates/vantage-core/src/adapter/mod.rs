// ── Subscription adapters ──
//
// An adapter ties a consumer's lifetime to one store subscription. It
// publishes typed props for its current key and asks its binding to
// fetch whenever it is pointed at a key.

mod bindings;
mod stream;

use std::sync::{Arc, Weak};

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::store::{Change, Listener, Subscription};

pub use bindings::{
    WithAttachments, WithGlobalSelection, WithOrganization, WithProjects, WithRelease, WithTeams,
};
pub use stream::{PropsStream, PropsWatchStream};

/// How an adapter reads, watches and fills one store.
pub trait Binding: Send + Sync + 'static {
    type Key: Clone + Send + Sync + 'static;
    type Props: Clone + PartialEq + Default + Send + Sync + 'static;

    /// Props for `key`, computed from current store state.
    fn props(&self, key: &Self::Key) -> Self::Props;

    /// Register `listener` with the underlying store.
    fn subscribe(&self, listener: Listener) -> Subscription;

    /// Whether `change` may alter the props of `key`.
    fn affects(&self, key: &Self::Key, change: &Change) -> bool;

    /// Start whatever loads `key` needs. Returns the spawned requests.
    fn fetch(&self, key: &Self::Key) -> Vec<JoinHandle<()>>;
}

struct Shared<B: Binding> {
    binding: B,
    key: ArcSwapOption<B::Key>,
    props: watch::Sender<B::Props>,
}

impl<B: Binding> Shared<B> {
    fn republish(&self, key: &B::Key) {
        let props = self.binding.props(key);
        self.props.send_if_modified(|current| {
            if *current == props {
                false
            } else {
                *current = props;
                true
            }
        });
    }
}

/// Binds a [`Binding`] to a consumer.
///
/// Unmounted until [`mount`](Self::mount); then subscribed until
/// [`unmount`](Self::unmount) or drop.
pub struct Adapter<B: Binding> {
    shared: Arc<Shared<B>>,
    subscription: Mutex<Option<Subscription>>,
}

impl<B: Binding> Adapter<B> {
    pub fn new(binding: B) -> Self {
        let (props, _) = watch::channel(B::Props::default());
        Self {
            shared: Arc::new(Shared {
                binding,
                key: ArcSwapOption::empty(),
                props,
            }),
            subscription: Mutex::new(None),
        }
    }

    pub fn binding(&self) -> &B {
        &self.shared.binding
    }

    /// Point the adapter at `key`: subscribe to the store, publish the
    /// props for `key`, then fetch. On a mounted adapter this behaves like
    /// [`set_key`](Self::set_key).
    pub fn mount(&self, key: B::Key) -> Vec<JoinHandle<()>> {
        let mut subscription = self.subscription.lock();
        self.shared.key.store(Some(Arc::new(key.clone())));

        if subscription.is_none() {
            let weak = Arc::downgrade(&self.shared);
            *subscription = Some(
                self.shared
                    .binding
                    .subscribe(Arc::new(move |change: &Change| on_change(&weak, change))),
            );
            trace!("adapter mounted");
        }
        drop(subscription);

        self.shared.republish(&key);

        self.shared.binding.fetch(&key)
    }

    /// Switch to another key, keeping the existing subscription.
    pub fn set_key(&self, key: B::Key) -> Vec<JoinHandle<()>> {
        self.mount(key)
    }

    /// Release the subscription. Calling this again is a no-op.
    pub fn unmount(&self) {
        if let Some(mut subscription) = self.subscription.lock().take() {
            subscription.unsubscribe();
            self.shared.key.store(None);
            trace!("adapter unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.lock().is_some()
    }

    pub fn key(&self) -> Option<Arc<B::Key>> {
        self.shared.key.load_full()
    }

    /// Latest published props.
    pub fn props(&self) -> B::Props {
        self.shared.props.borrow().clone()
    }

    pub fn stream(&self) -> PropsStream<B::Props> {
        PropsStream::new(self.shared.props.subscribe())
    }
}

impl<B: Binding> Drop for Adapter<B> {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl<B: Binding> std::fmt::Debug for Adapter<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter")
            .field("binding", &std::any::type_name::<B>())
            .field("mounted", &self.is_mounted())
            .finish_non_exhaustive()
    }
}

fn on_change<B: Binding>(shared: &Weak<Shared<B>>, change: &Change) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let Some(key) = shared.key.load_full() else {
        return;
    };
    if shared.binding.affects(&key, change) {
        shared.republish(&key);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::store::{CacheEntry, ErrorPolicy, KeyedStore};

    /// Binding over a bare keyed store that counts fetches instead of
    /// issuing requests.
    struct Counting {
        store: Arc<KeyedStore<String>>,
        fetches: Arc<AtomicUsize>,
    }

    impl Binding for Counting {
        type Key = String;
        type Props = CacheEntry<String>;

        fn props(&self, key: &String) -> CacheEntry<String> {
            self.store.get(key)
        }

        fn subscribe(&self, listener: Listener) -> Subscription {
            self.store.subscribe(move |change| listener(change))
        }

        fn affects(&self, key: &String, change: &Change) -> bool {
            change.affects(key)
        }

        fn fetch(&self, key: &String) -> Vec<JoinHandle<()>> {
            if self.store.begin_load(key) {
                self.fetches.fetch_add(1, Ordering::SeqCst);
            }
            Vec::new()
        }
    }

    fn adapter() -> (Adapter<Counting>, Arc<KeyedStore<String>>, Arc<AtomicUsize>) {
        let store = Arc::new(KeyedStore::new("test", ErrorPolicy::KeepStale));
        let fetches = Arc::new(AtomicUsize::new(0));
        let adapter = Adapter::new(Counting {
            store: Arc::clone(&store),
            fetches: Arc::clone(&fetches),
        });
        (adapter, store, fetches)
    }

    #[test]
    fn mount_subscribes_and_fetches_once() {
        let (adapter, store, fetches) = adapter();
        adapter.mount("a".into());

        assert!(adapter.is_mounted());
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert!(adapter.props().loading);
        assert_eq!(store.notifier().subscriber_count(), 1);

        store.load_success("a", "hello".into());
        assert_eq!(adapter.props().value(), Some(&"hello".to_owned()));
    }

    #[test]
    fn two_adapters_on_one_key_fetch_once() {
        let (first, store, fetches) = adapter();
        let second = Adapter::new(Counting {
            store: Arc::clone(&store),
            fetches: Arc::clone(&fetches),
        });
        first.mount("a".into());
        second.mount("a".into());
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert!(second.props().loading);
    }

    #[test]
    fn set_key_refetches_without_resubscribing() {
        let (adapter, store, fetches) = adapter();
        adapter.mount("a".into());
        adapter.set_key("b".into());

        assert_eq!(fetches.load(Ordering::SeqCst), 2);
        assert_eq!(store.notifier().subscriber_count(), 1);
        assert_eq!(adapter.key().as_deref(), Some(&"b".to_owned()));

        // Changes to the old key no longer reach the props.
        store.load_success("a", "stale".into());
        assert!(adapter.props().value.is_none());
    }

    #[test]
    fn unmount_is_idempotent_and_stops_updates() {
        let (adapter, store, _) = adapter();
        adapter.mount("a".into());
        adapter.unmount();
        adapter.unmount();

        assert!(!adapter.is_mounted());
        assert_eq!(store.notifier().subscriber_count(), 0);
        store.load_success("a", "late".into());
        assert!(adapter.props().value.is_none());
    }

    #[test]
    fn drop_unsubscribes() {
        let (adapter, store, _) = adapter();
        adapter.mount("a".into());
        drop(adapter);
        assert_eq!(store.notifier().subscriber_count(), 0);
    }

    #[test]
    fn unrelated_keys_do_not_republish() {
        let (adapter, store, _) = adapter();
        adapter.mount("a".into());
        let stream = adapter.stream();
        let before = stream.current().clone();

        store.load_success("other", "x".into());
        assert!(!stream.has_changed());
        assert_eq!(adapter.props(), before);
    }

    #[test]
    fn changed_is_pending_until_publish() {
        let (adapter, store, _) = adapter();
        adapter.mount("a".into());
        let mut stream = adapter.stream();

        let mut changed = tokio_test::task::spawn(stream.changed());
        tokio_test::assert_pending!(changed.poll());

        store.load_success("a", "x".into());
        assert!(changed.is_woken());
        let props = tokio_test::assert_ready!(changed.poll()).unwrap();
        assert_eq!(props.value(), Some(&"x".to_owned()));
    }

    #[tokio::test]
    async fn into_stream_yields_latest_first() {
        use futures_util::StreamExt;

        let (adapter, store, _) = adapter();
        adapter.mount("a".into());
        let mut stream = adapter.stream().into_stream();
        assert!(stream.next().await.unwrap().loading);

        store.load_success("a", "x".into());
        let next = stream.next().await.unwrap();
        assert!(!next.loading);
    }

    #[tokio::test]
    async fn stream_observes_settled_props() {
        let (adapter, store, _) = adapter();
        adapter.mount("a".into());
        let mut stream = adapter.stream();
        assert!(stream.current().loading);

        let writer = Arc::clone(&store);
        tokio::spawn(async move { writer.load_success("a", "done".into()) });

        let settled = stream.wait_for(|p| !p.loading).await.unwrap();
        assert_eq!(settled.value(), Some(&"done".to_owned()));
    }
}
