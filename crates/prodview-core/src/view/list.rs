// ── Filtered product list screen ──

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

use crate::catalog::Catalog;
use crate::model::{Category, CategoryFilter, Product};
use crate::store::{ActionState, Loadable};
use crate::stream::ViewStream;

use super::ErrorChannel;

/// Product list narrowed by a category filter, plus the category list
/// that feeds the filter control.
///
/// Must be created inside a tokio runtime. The derivation task stops
/// when the view is dropped or the catalog shuts down.
pub struct ProductListView {
    inner: Arc<ListInner>,
    _guard: DropGuard,
}

struct ListInner {
    category_selected: ActionState<CategoryFilter>,
    /// `None` until the catalog first resolves.
    products: watch::Sender<Option<Arc<Vec<Product>>>>,
    categories: watch::Sender<Arc<Vec<Category>>>,
    errors: ErrorChannel,
}

impl ProductListView {
    pub fn new(catalog: &Catalog) -> Self {
        let (products, _) = watch::channel(None);
        let (categories, _) = watch::channel(Arc::new(Vec::new()));
        let inner = Arc::new(ListInner {
            category_selected: ActionState::new(CategoryFilter::All),
            products,
            categories,
            errors: ErrorChannel::new(),
        });

        let cancel = catalog.child_token();
        tokio::spawn(filter_task(
            Arc::clone(&inner),
            catalog.products_receiver(),
            catalog.categories_receiver(),
            cancel.clone(),
        ));

        Self {
            inner,
            _guard: cancel.drop_guard(),
        }
    }

    /// Handle a raw category selection from the UI.
    /// `""`, `"0"`, and non-numeric values clear the filter.
    pub fn on_selected(&self, raw: &str) {
        self.select_category(CategoryFilter::from_selection(raw));
    }

    pub fn select_category(&self, filter: CategoryFilter) {
        debug!(?filter, "category selected");
        self.inner.category_selected.emit(filter);
    }

    pub fn category_filter(&self) -> CategoryFilter {
        self.inner.category_selected.current()
    }

    pub fn dismiss_error(&self) {
        self.inner.errors.clear();
    }

    // ── Subscriptions ────────────────────────────────────────────

    /// Products visible under the current filter. `None` until the
    /// catalog first resolves; empty after a load failure.
    pub fn products(&self) -> ViewStream<Option<Arc<Vec<Product>>>> {
        ViewStream::new(self.inner.products.subscribe())
    }

    pub fn categories(&self) -> ViewStream<Arc<Vec<Category>>> {
        ViewStream::new(self.inner.categories.subscribe())
    }

    pub fn error_message(&self) -> ViewStream<Option<String>> {
        ViewStream::new(self.inner.errors.subscribe())
    }
}

async fn filter_task(
    view: Arc<ListInner>,
    mut products_rx: watch::Receiver<Loadable<Vec<Product>>>,
    mut categories_rx: watch::Receiver<Loadable<Vec<Category>>>,
    cancel: CancellationToken,
) {
    let mut filter_rx = view.category_selected.receiver();

    loop {
        {
            let products = products_rx.borrow_and_update();
            let filter = *filter_rx.borrow_and_update();
            match &*products {
                Loadable::Pending => {}
                Loadable::Ready(list) => {
                    let visible = filter.apply(list);
                    debug!(?filter, count = visible.len(), "filtered products");
                    view.products.send_replace(Some(Arc::new(visible)));
                }
                Loadable::Failed(e) => {
                    view.errors.report(e);
                    view.products.send_replace(Some(Arc::new(Vec::new())));
                }
            }

            match &*categories_rx.borrow_and_update() {
                Loadable::Pending => {}
                Loadable::Ready(list) => {
                    view.categories.send_replace(Arc::clone(list));
                }
                Loadable::Failed(e) => {
                    view.errors.report(e);
                    view.categories.send_replace(Arc::new(Vec::new()));
                }
            }
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = products_rx.changed() => if changed.is_err() { break },
            changed = categories_rx.changed() => if changed.is_err() { break },
            changed = filter_rx.changed() => if changed.is_err() { break },
        }
    }
}
