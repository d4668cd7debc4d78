// ── Replay cell ──
//
// Holds the last computed value of a shared stream and hands it to every
// subscriber on arrival. The source computation runs once per cache
// window; late subscribers never trigger a new fetch.

use std::sync::Arc;

use tokio::sync::watch;

use super::loadable::Loadable;
use crate::error::CoreError;
use crate::stream::ViewStream;

/// Cached-last-value cell backed by a `watch` channel.
pub(crate) struct ReplayCell<T: Send + Sync + 'static> {
    tx: watch::Sender<Loadable<T>>,
}

impl<T: Send + Sync + 'static> ReplayCell<T> {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(Loadable::Pending);
        Self { tx }
    }

    /// Publish a fresh value to every subscriber.
    pub(crate) fn publish(&self, value: T) {
        self.publish_loadable(Loadable::Ready(Arc::new(value)));
    }

    /// Publish a failure. The previous value is replaced.
    pub(crate) fn fail(&self, err: CoreError) {
        self.publish_loadable(Loadable::Failed(err));
    }

    pub(crate) fn publish_loadable(&self, value: Loadable<T>) {
        // `send_replace` updates unconditionally, even with zero receivers.
        self.tx.send_replace(value);
    }

    /// Current value (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Loadable<T> {
        self.tx.borrow().clone()
    }

    pub(crate) fn receiver(&self) -> watch::Receiver<Loadable<T>> {
        self.tx.subscribe()
    }

    pub(crate) fn subscribe(&self) -> ViewStream<Loadable<T>> {
        ViewStream::new(self.tx.subscribe())
    }
}
