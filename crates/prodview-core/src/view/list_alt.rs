// ── Selection list screen ──

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::catalog::Catalog;
use crate::model::{Product, ProductId};
use crate::store::Loadable;
use crate::stream::ViewStream;

use super::ErrorChannel;

/// Product list with local additions and the current selection.
pub struct ProductListAltView {
    catalog: Catalog,
    errors: Arc<ErrorChannel>,
    _guard: DropGuard,
}

impl ProductListAltView {
    pub fn new(catalog: &Catalog) -> Self {
        let errors = Arc::new(ErrorChannel::new());
        let cancel = catalog.child_token();
        tokio::spawn(error_task(
            Arc::clone(&errors),
            catalog.products_receiver(),
            cancel.clone(),
        ));

        Self {
            catalog: catalog.clone(),
            errors,
            _guard: cancel.drop_guard(),
        }
    }

    pub fn on_selected(&self, id: ProductId) {
        self.catalog.select_product(id);
    }

    /// Insert the placeholder product.
    pub fn on_add(&self) {
        self.catalog.add_product(None);
    }

    pub fn dismiss_error(&self) {
        self.errors.clear();
    }

    /// Products with local additions. `None` until the catalog first
    /// resolves; the server batch alone after a load failure.
    pub fn products(&self) -> ViewStream<Option<Arc<Vec<Product>>>> {
        self.catalog.subscribe_products_with_add()
    }

    pub fn selected_product(&self) -> ViewStream<Option<Product>> {
        self.catalog.subscribe_selected_product()
    }

    pub fn error_message(&self) -> ViewStream<Option<String>> {
        ViewStream::new(self.errors.subscribe())
    }
}

/// Forward catalog load failures to this screen's error channel.
async fn error_task(
    errors: Arc<ErrorChannel>,
    mut products_rx: watch::Receiver<Loadable<Vec<Product>>>,
    cancel: CancellationToken,
) {
    loop {
        if let Loadable::Failed(e) = &*products_rx.borrow_and_update() {
            errors.report(e);
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = products_rx.changed() => if changed.is_err() { break },
        }
    }
}
