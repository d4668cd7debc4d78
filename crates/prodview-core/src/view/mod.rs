// ── Screen view-models ──
//
// One view-model per screen. Each derives its own streams from the shared
// `Catalog`, owns a dedicated error-message channel, and stops its tasks
// when dropped.

mod detail;
mod list;
mod list_alt;

pub use detail::ProductDetailView;
pub use list::ProductListView;
pub use list_alt::ProductListAltView;

use tokio::sync::watch;

use crate::error::CoreError;

/// Per-screen error text. Stays set until the screen dismisses it.
pub(crate) struct ErrorChannel {
    tx: watch::Sender<Option<String>>,
}

impl ErrorChannel {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Store the normalized message for `err`, notifying only on change.
    pub(crate) fn report(&self, err: &CoreError) {
        let message = err.user_message();
        self.tx.send_if_modified(|current| {
            if current.as_deref() == Some(message.as_str()) {
                false
            } else {
                *current = Some(message);
                true
            }
        });
    }

    pub(crate) fn clear(&self) {
        self.tx.send_if_modified(|current| current.take().is_some());
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }
}
