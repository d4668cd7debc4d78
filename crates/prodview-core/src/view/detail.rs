// ── Product detail screen ──

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

use crate::catalog::Catalog;
use crate::model::{Product, Supplier};
use crate::store::Loadable;
use crate::stream::ViewStream;

use super::ErrorChannel;

/// The selected product and its suppliers.
pub struct ProductDetailView {
    catalog: Catalog,
    inner: Arc<DetailInner>,
    _guard: DropGuard,
}

struct DetailInner {
    /// `None` until a supplier result arrives; empty after a failure.
    suppliers: watch::Sender<Option<Arc<Vec<Supplier>>>>,
    errors: ErrorChannel,
}

impl ProductDetailView {
    pub fn new(catalog: &Catalog) -> Self {
        let (suppliers, _) = watch::channel(None);
        let inner = Arc::new(DetailInner {
            suppliers,
            errors: ErrorChannel::new(),
        });

        let cancel = catalog.child_token();
        tokio::spawn(detail_task(
            Arc::clone(&inner),
            catalog.products_receiver(),
            catalog.suppliers_receiver(),
            cancel.clone(),
        ));

        Self {
            catalog: catalog.clone(),
            inner,
            _guard: cancel.drop_guard(),
        }
    }

    /// Page title for the current selection.
    pub fn title(&self) -> Option<String> {
        self.catalog
            .subscribe_selected_product()
            .current()
            .as_ref()
            .map(page_title)
    }

    pub fn dismiss_error(&self) {
        self.inner.errors.clear();
    }

    pub fn product(&self) -> ViewStream<Option<Product>> {
        self.catalog.subscribe_selected_product()
    }

    pub fn suppliers(&self) -> ViewStream<Option<Arc<Vec<Supplier>>>> {
        ViewStream::new(self.inner.suppliers.subscribe())
    }

    pub fn error_message(&self) -> ViewStream<Option<String>> {
        ViewStream::new(self.inner.errors.subscribe())
    }
}

fn page_title(product: &Product) -> String {
    format!("Product Detail for: {}", product.name)
}

async fn detail_task(
    view: Arc<DetailInner>,
    mut products_rx: watch::Receiver<Loadable<Vec<Product>>>,
    mut suppliers_rx: watch::Receiver<Loadable<Vec<Supplier>>>,
    cancel: CancellationToken,
) {
    loop {
        if let Loadable::Failed(e) = &*products_rx.borrow_and_update() {
            view.errors.report(e);
        }

        match &*suppliers_rx.borrow_and_update() {
            Loadable::Pending => {}
            Loadable::Ready(list) => {
                debug!(count = list.len(), "detail suppliers");
                view.suppliers.send_replace(Some(Arc::clone(list)));
            }
            Loadable::Failed(e) => {
                view.errors.report(e);
                view.suppliers.send_replace(Some(Arc::new(Vec::new())));
            }
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = products_rx.changed() => if changed.is_err() { break },
            changed = suppliers_rx.changed() => if changed.is_err() { break },
        }
    }
}
