// ── Action streams ──
//
// Streams fed by explicit `emit` calls from UI handlers. Only the owning
// state holder emits; any number of readers subscribe.

use tokio::sync::{broadcast, watch};
use tracing::trace;

use crate::stream::ViewStream;

/// Buffered inserts per subscriber before the slowest one starts lagging.
const ACTION_CHANNEL_SIZE: usize = 256;

/// An action stream with a current value.
///
/// Subscribers receive the current value immediately, then every
/// subsequent emission.
pub(crate) struct ActionState<T: Clone + Send + Sync + 'static> {
    tx: watch::Sender<T>,
}

impl<T: Clone + Send + Sync + 'static> ActionState<T> {
    pub(crate) fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// Emit a value. Always notifies, even when equal to the current one.
    pub(crate) fn emit(&self, value: T) {
        self.tx.send_replace(value);
    }

    pub(crate) fn current(&self) -> T {
        self.tx.borrow().clone()
    }

    pub(crate) fn receiver(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    pub(crate) fn subscribe(&self) -> ViewStream<T> {
        ViewStream::new(self.tx.subscribe())
    }
}

/// An action stream without a current value.
///
/// Every emission reaches every live subscriber, in order. Subscribers
/// only see emissions made after they subscribed.
pub(crate) struct ActionSubject<T: Clone + Send + 'static> {
    tx: broadcast::Sender<T>,
}

impl<T: Clone + Send + 'static> ActionSubject<T> {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(ACTION_CHANNEL_SIZE);
        Self { tx }
    }

    pub(crate) fn emit(&self, value: T) {
        if self.tx.send(value).is_err() {
            trace!("action emitted with no subscribers");
        }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<T> {
        self.tx.subscribe()
    }
}
