// ── Catalog view-model composer ──
//
// Owns the shared server-backed streams (products, categories, the
// enriched catalog), the product-level action streams (selection,
// insertion), and the background tasks that derive the selected
// product, its suppliers, and the catalog-with-additions from them.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use prodview_api::{CatalogClient, TlsMode, TransportConfig};

use crate::compose::{self, CatalogEvent};
use crate::config::{CatalogConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{Category, Product, ProductId, Supplier, SupplierId};
use crate::store::{ActionState, ActionSubject, Loadable, ReplayCell};
use crate::stream::ViewStream;

type SupplierFetch = Pin<Box<dyn Future<Output = Result<Vec<Supplier>, CoreError>> + Send>>;

// ── CatalogState ─────────────────────────────────────────────────

/// Lifecycle state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogState {
    /// Constructed, background tasks not yet running.
    Idle,
    Running,
    Stopped,
}

// ── Catalog ──────────────────────────────────────────────────────

/// The state holder shared by every screen.
///
/// Cheaply cloneable via `Arc<CatalogInner>`. Construct once at startup,
/// call [`start()`](Self::start), hand clones to the view-models, and
/// call [`shutdown()`](Self::shutdown) on exit.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    config: CatalogConfig,
    client: CatalogClient,
    /// Products as served, before the category join.
    raw_products: ReplayCell<Vec<Product>>,
    categories: ReplayCell<Vec<Category>>,
    /// Products joined with category names and marked up.
    products: ReplayCell<Vec<Product>>,
    product_selected: ActionState<Option<ProductId>>,
    product_inserted: ActionSubject<Product>,
    selected_product: watch::Sender<Option<Product>>,
    suppliers: ReplayCell<Vec<Supplier>>,
    /// `None` until the first batch or insert is folded.
    products_with_add: watch::Sender<Option<Arc<Vec<Product>>>>,
    state: watch::Sender<CatalogState>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Catalog {
    /// Create a catalog from configuration. Does NOT fetch anything --
    /// call [`start()`](Self::start) to load data and spawn the derivations.
    pub fn new(config: CatalogConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let client = CatalogClient::new(config.base_url.clone(), &transport)?;
        Ok(Self::with_client(config, client))
    }

    /// Create a catalog around an existing client.
    pub fn with_client(config: CatalogConfig, client: CatalogClient) -> Self {
        let (selected_product, _) = watch::channel(None);
        let (products_with_add, _) = watch::channel(None);
        let (state, _) = watch::channel(CatalogState::Idle);
        let (last_refresh, _) = watch::channel(None);

        Self {
            inner: Arc::new(CatalogInner {
                config,
                client,
                raw_products: ReplayCell::new(),
                categories: ReplayCell::new(),
                products: ReplayCell::new(),
                product_selected: ActionState::new(None),
                product_inserted: ActionSubject::new(),
                selected_product,
                suppliers: ReplayCell::new(),
                products_with_add,
                state,
                last_refresh,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the catalog configuration.
    pub fn config(&self) -> &CatalogConfig {
        &self.inner.config
    }

    pub fn state(&self) -> CatalogState {
        *self.inner.state.borrow()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Spawn the derivation tasks and load the first cache window.
    ///
    /// Load failures do not fail `start`: they are published on the
    /// affected streams. Calling `start` twice is a no-op.
    pub async fn start(&self) {
        let started = self.inner.state.send_if_modified(|state| {
            if *state == CatalogState::Idle {
                *state = CatalogState::Running;
                true
            } else {
                false
            }
        });
        if !started {
            warn!(state = ?self.state(), "catalog already started");
            return;
        }

        let cancel = self.inner.cancel.clone();

        // Subscribe before spawning so no emission falls between.
        let raw_rx = self.inner.raw_products.receiver();
        let categories_rx = self.inner.categories.receiver();
        let products_for_selection = self.inner.products.receiver();
        let products_for_insertion = self.inner.products.receiver();
        let selected_id_rx = self.inner.product_selected.receiver();
        let selected_rx = self.inner.selected_product.subscribe();
        let inserts_rx = self.inner.product_inserted.subscribe();

        {
            let mut handles = self.inner.task_handles.lock().await;
            handles.push(tokio::spawn(enrich_task(
                self.clone(),
                raw_rx,
                categories_rx,
                cancel.clone(),
            )));
            handles.push(tokio::spawn(selection_task(
                self.clone(),
                products_for_selection,
                selected_id_rx,
                cancel.clone(),
            )));
            handles.push(tokio::spawn(supplier_task(
                self.clone(),
                selected_rx,
                cancel.clone(),
            )));
            handles.push(tokio::spawn(insertion_task(
                self.clone(),
                products_for_insertion,
                inserts_rx,
                cancel.clone(),
            )));

            let interval_secs = self.inner.config.refresh_interval_secs;
            if interval_secs > 0 {
                handles.push(tokio::spawn(refresh_task(
                    self.clone(),
                    interval_secs,
                    cancel.clone(),
                )));
            }
        }

        self.refresh().await;
        info!(server = %self.inner.config.base_url, "catalog started");
    }

    /// Start a new cache window: fetch products and categories again and
    /// publish the results to every subscriber.
    pub async fn refresh(&self) {
        let client = &self.inner.client;
        let (products, categories) = tokio::join!(client.list_products(), client.list_categories());

        match products {
            Ok(raw) => {
                let products: Vec<Product> = raw.into_iter().map(Product::from).collect();
                debug!(count = products.len(), "products loaded");
                self.inner.raw_products.publish(products);
            }
            Err(e) => report_failure(&self.inner.raw_products, "products", e.into()),
        }

        match categories {
            Ok(raw) => {
                let categories: Vec<Category> = raw.into_iter().map(Category::from).collect();
                debug!(count = categories.len(), "categories loaded");
                self.inner.categories.publish(categories);
            }
            Err(e) => report_failure(&self.inner.categories, "categories", e.into()),
        }

        self.inner.last_refresh.send_replace(Some(Utc::now()));
    }

    /// Stop every background task and wait for them to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        self.inner.state.send_replace(CatalogState::Stopped);
        info!("catalog stopped");
    }

    /// Publish `err` as a product load failure through the regular
    /// error path, as if the server had failed.
    pub fn inject_failure(&self, err: CoreError) {
        report_failure(&self.inner.raw_products, "products", err);
    }

    /// Token cancelled when the catalog shuts down. View-models derive
    /// their own lifetimes from it.
    pub(crate) fn child_token(&self) -> CancellationToken {
        self.inner.cancel.child_token()
    }

    pub(crate) fn products_receiver(&self) -> watch::Receiver<Loadable<Vec<Product>>> {
        self.inner.products.receiver()
    }

    pub(crate) fn categories_receiver(&self) -> watch::Receiver<Loadable<Vec<Category>>> {
        self.inner.categories.receiver()
    }

    pub(crate) fn suppliers_receiver(&self) -> watch::Receiver<Loadable<Vec<Supplier>>> {
        self.inner.suppliers.receiver()
    }

    // ── Actions ──────────────────────────────────────────────────

    /// Emit a product selection.
    pub fn select_product(&self, id: ProductId) {
        debug!(product = %id, "product selected");
        self.inner.product_selected.emit(Some(id));
    }

    pub fn clear_selection(&self) {
        self.inner.product_selected.emit(None);
    }

    /// Insert a product locally, without a server round-trip.
    /// `None` inserts [`Product::placeholder`].
    pub fn add_product(&self, product: Option<Product>) {
        let product = product.unwrap_or_else(Product::placeholder);
        self.inner.product_inserted.emit(product);
    }

    // ── Snapshots ────────────────────────────────────────────────

    /// The enriched catalog as currently published.
    pub fn products_snapshot(&self) -> Loadable<Vec<Product>> {
        self.inner.products.snapshot()
    }

    pub fn categories_snapshot(&self) -> Loadable<Vec<Category>> {
        self.inner.categories.snapshot()
    }

    pub fn selected_product_id(&self) -> Option<ProductId> {
        self.inner.product_selected.current()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_refresh.borrow()
    }

    // ── Subscriptions ────────────────────────────────────────────

    /// Products joined with category names, replayed to every subscriber.
    pub fn subscribe_products(&self) -> ViewStream<Loadable<Vec<Product>>> {
        self.inner.products.subscribe()
    }

    pub fn subscribe_categories(&self) -> ViewStream<Loadable<Vec<Category>>> {
        self.inner.categories.subscribe()
    }

    pub fn subscribe_selected_product_id(&self) -> ViewStream<Option<ProductId>> {
        self.inner.product_selected.subscribe()
    }

    pub fn subscribe_selected_product(&self) -> ViewStream<Option<Product>> {
        ViewStream::new(self.inner.selected_product.subscribe())
    }

    /// Suppliers of the selected product. Stays `Pending` until a product
    /// is selected.
    pub fn subscribe_suppliers(&self) -> ViewStream<Loadable<Vec<Supplier>>> {
        self.inner.suppliers.subscribe()
    }

    /// The enriched catalog followed by every product inserted since the
    /// last server batch. `None` until the catalog first resolves.
    pub fn subscribe_products_with_add(&self) -> ViewStream<Option<Arc<Vec<Product>>>> {
        ViewStream::new(self.inner.products_with_add.subscribe())
    }

    pub fn subscribe_state(&self) -> ViewStream<CatalogState> {
        ViewStream::new(self.inner.state.subscribe())
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn build_transport(config: &CatalogConfig) -> TransportConfig {
    let tls = match &config.tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    };
    TransportConfig {
        tls,
        ..TransportConfig::default()
    }
    .with_timeout(config.timeout)
}

/// Log a server-sourced failure and publish it on `cell`.
fn report_failure<T: Send + Sync + 'static>(cell: &ReplayCell<T>, source: &str, err: CoreError) {
    error!(source, error = %err, "{}", err.user_message());
    cell.fail(err);
}

async fn fetch_suppliers(
    client: CatalogClient,
    ids: Vec<SupplierId>,
) -> Result<Vec<Supplier>, CoreError> {
    let requests = ids.iter().map(|id| client.get_supplier(id.get()));
    let suppliers = try_join_all(requests).await?;
    Ok(suppliers.into_iter().map(Supplier::from).collect())
}

// ── Background tasks ─────────────────────────────────────────────

/// Join raw products with categories whenever either changes.
async fn enrich_task(
    catalog: Catalog,
    mut products_rx: watch::Receiver<Loadable<Vec<Product>>>,
    mut categories_rx: watch::Receiver<Loadable<Vec<Category>>>,
    cancel: CancellationToken,
) {
    let markup = catalog.inner.config.price_markup;

    loop {
        let joined = {
            let products = products_rx.borrow_and_update();
            let categories = categories_rx.borrow_and_update();
            products.zip_with(&categories, |p, c| compose::enrich(p, c, markup))
        };
        if !joined.is_pending() {
            if let Some(list) = joined.ready() {
                debug!(count = list.len(), "products with category");
            }
            catalog.inner.products.publish_loadable(joined);
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = products_rx.changed() => if changed.is_err() { break },
            changed = categories_rx.changed() => if changed.is_err() { break },
        }
    }
}

/// Resolve the selected id against the enriched catalog.
async fn selection_task(
    catalog: Catalog,
    mut products_rx: watch::Receiver<Loadable<Vec<Product>>>,
    mut selected_rx: watch::Receiver<Option<ProductId>>,
    cancel: CancellationToken,
) {
    loop {
        let next = {
            let products = products_rx.borrow_and_update();
            let selected = *selected_rx.borrow_and_update();
            match &*products {
                Loadable::Pending => None,
                Loadable::Ready(list) => Some(compose::find_selected(list, selected)),
                Loadable::Failed(_) => Some(None),
            }
        };

        if let Some(product) = next {
            let changed = catalog.inner.selected_product.send_if_modified(|current| {
                if *current == product {
                    false
                } else {
                    *current = product;
                    true
                }
            });
            if changed {
                debug!(
                    product = ?catalog.inner.selected_product.borrow().as_ref().map(|p| p.id),
                    "selected product"
                );
            }
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = products_rx.changed() => if changed.is_err() { break },
            changed = selected_rx.changed() => if changed.is_err() { break },
        }
    }
}

/// Fetch suppliers for each newly selected product, switching to the
/// latest selection.
///
/// Replacing `inflight` drops the previous fetch, which aborts its
/// requests. The generation tag guards publication as well.
async fn supplier_task(
    catalog: Catalog,
    mut selected_rx: watch::Receiver<Option<Product>>,
    cancel: CancellationToken,
) {
    let client = catalog.inner.client.clone();
    let mut generation: u64 = 0;
    let mut inflight: Option<(u64, SupplierFetch)> = None;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = selected_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let selected = selected_rx.borrow_and_update().clone();
                generation += 1;
                if inflight.take().is_some() {
                    debug!(generation, "superseding in-flight supplier fetch");
                }
                // No product: keep the last published suppliers.
                let Some(product) = selected else {
                    continue;
                };

                if product.has_suppliers() {
                    debug!(
                        product = %product.id,
                        count = product.supplier_ids.len(),
                        generation,
                        "fetching suppliers"
                    );
                    let fetch = fetch_suppliers(client.clone(), product.supplier_ids.clone());
                    inflight = Some((generation, Box::pin(fetch)));
                } else {
                    catalog.inner.suppliers.publish(Vec::new());
                }
            }
            result = async {
                match inflight.as_mut() {
                    Some((_, fetch)) => fetch.await,
                    None => std::future::pending().await,
                }
            } => {
                let fetched_generation = inflight.take().map_or(0, |(g, _)| g);
                if fetched_generation != generation {
                    debug!(fetched_generation, generation, "discarding superseded suppliers");
                    continue;
                }
                match result {
                    Ok(suppliers) => {
                        debug!(count = suppliers.len(), "product suppliers");
                        catalog.inner.suppliers.publish(suppliers);
                    }
                    Err(e) => report_failure(&catalog.inner.suppliers, "suppliers", e),
                }
            }
        }
    }
}

/// Fold merge(enriched catalog, inserts) into the running list.
async fn insertion_task(
    catalog: Catalog,
    mut products_rx: watch::Receiver<Loadable<Vec<Product>>>,
    mut inserts_rx: broadcast::Receiver<Product>,
    cancel: CancellationToken,
) {
    let mut acc: Vec<Product> = Vec::new();
    // Pick up a catalog published before this task first ran.
    products_rx.mark_changed();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = products_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let event = match &*products_rx.borrow_and_update() {
                    Loadable::Pending => continue,
                    Loadable::Ready(batch) => CatalogEvent::Batch(batch.to_vec()),
                    Loadable::Failed(_) => CatalogEvent::Batch(Vec::new()),
                };
                compose::fold_insertion(&mut acc, event);
            }
            received = inserts_rx.recv() => match received {
                Ok(product) => {
                    debug!(product = %product.id, "product inserted");
                    compose::fold_insertion(&mut acc, CatalogEvent::Inserted(product));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "insert stream lagged, products dropped");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }

        catalog
            .inner
            .products_with_add
            .send_replace(Some(Arc::new(acc.clone())));
    }
}

/// Start a new cache window every `interval_secs`.
async fn refresh_task(catalog: Catalog, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => catalog.refresh().await,
        }
    }
}
