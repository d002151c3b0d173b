use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// A view's handle on an adapter's props.
///
/// Provides both the props captured at creation and reactive change
/// notification via [`changed`](Self::changed) or by converting to a
/// `Stream`.
pub struct PropsStream<P: Clone + Send + Sync + 'static> {
    current: P,
    receiver: watch::Receiver<P>,
}

impl<P: Clone + Send + Sync + 'static> PropsStream<P> {
    pub(crate) fn new(receiver: watch::Receiver<P>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Props as of creation or the last [`changed`](Self::changed).
    pub fn current(&self) -> &P {
        &self.current
    }

    /// The latest published props.
    pub fn latest(&self) -> P {
        self.receiver.borrow().clone()
    }

    /// Whether props were published since the last [`changed`](Self::changed).
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Wait for the next published props.
    /// Returns `None` once the adapter has been dropped.
    pub async fn changed(&mut self) -> Option<P> {
        self.receiver.changed().await.ok()?;
        let props = self.receiver.borrow_and_update().clone();
        self.current = props.clone();
        Some(props)
    }

    /// Wait until the props satisfy `ready`, checking the latest props
    /// first. Returns `None` if the adapter is dropped before that.
    pub async fn wait_for(&mut self, ready: impl FnMut(&P) -> bool) -> Option<P> {
        let props = {
            let guard = self.receiver.wait_for(ready).await.ok()?;
            P::clone(&guard)
        };
        self.current = props.clone();
        Some(props)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    /// The first item is the latest props.
    pub fn into_stream(self) -> PropsWatchStream<P> {
        PropsWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct PropsWatchStream<P: Clone + Send + Sync + 'static> {
    inner: WatchStream<P>,
}

impl<P: Clone + Send + Sync + 'static> Stream for PropsWatchStream<P> {
    type Item = P;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
