#![allow(clippy::unwrap_used)]
// Composition tests for `Catalog` and the screen view-models, against a
// wiremock catalog server.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use prodview_core::{
    Catalog, CatalogConfig, CatalogState, CoreError, Product, ProductDetailView,
    ProductId, ProductListAltView, ProductListView, ViewStream,
};

const WAIT: Duration = Duration::from_secs(5);

// ── Fixtures ────────────────────────────────────────────────────────

fn products_json() -> Value {
    json!([
        {
            "id": 1,
            "productName": "Leaf Rake",
            "productCode": "GDN-0011",
            "description": "Leaf rake with 48-inch wooden handle",
            "price": 20.0,
            "categoryId": 1,
            "quantityInStock": 15,
            "supplierIds": [2, 1]
        },
        {
            "id": 2,
            "productName": "Garden Cart",
            "productCode": "GDN-0023",
            "description": "15 gallon capacity rolling garden cart",
            "price": 32.0,
            "categoryId": 1,
            "quantityInStock": 2
        },
        {
            "id": 5,
            "productName": "Hammer",
            "productCode": "TBX-0048",
            "description": "Curved claw steel hammer",
            "price": 0,
            "categoryId": 3,
            "quantityInStock": 8,
            "supplierIds": [3]
        }
    ])
}

fn categories_json() -> Value {
    json!([
        { "id": 1, "name": "Garden" },
        { "id": 3, "name": "Toolbox" }
    ])
}

async fn mount_catalog(server: &MockServer, product_requests: u64) {
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products_json()))
        .expect(product_requests)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(categories_json()))
        .mount(server)
        .await;
}

async fn mount_supplier(server: &MockServer, id: u32, name: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/api/suppliers/{id}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": id, "name": name, "cost": 3.5 })),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn started(server: &MockServer) -> Catalog {
    let config = CatalogConfig::new(Url::parse(&server.uri()).unwrap());
    let catalog = Catalog::new(config).unwrap();
    catalog.start().await;
    catalog
}

async fn wait_for<T: Clone + Send + Sync + 'static>(
    stream: &mut ViewStream<T>,
    predicate: impl FnMut(&T) -> bool,
) -> T {
    tokio::time::timeout(WAIT, stream.wait_for(predicate))
        .await
        .expect("timed out waiting for view")
        .expect("view producer dropped")
}

/// Matches a loaded product list of exactly `n` entries.
fn has_len(n: usize) -> impl Fn(&Option<Arc<Vec<Product>>>) -> bool {
    move |products| products.as_ref().is_some_and(|list| list.len() == n)
}

fn ids(products: &[Product]) -> Vec<u32> {
    products.iter().map(|p| p.id.get()).collect()
}

// ── Enrichment ──────────────────────────────────────────────────────

#[tokio::test]
async fn products_carry_category_names_and_markup() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    let catalog = started(&server).await;

    let mut products = catalog.subscribe_products();
    let loaded = wait_for(&mut products, |p| p.is_ready()).await;
    let list = loaded.ready().unwrap();

    let categories: Vec<_> = list.iter().map(|p| p.category.as_deref()).collect();
    assert_eq!(categories, vec![Some("Garden"), Some("Garden"), Some("Toolbox")]);
    assert!((list[0].price - 30.0).abs() < 1e-9);
    assert!(list[2].price.abs() < f64::EPSILON);
    assert_eq!(list[0].search_key, vec!["Leaf Rake".to_string()]);

    catalog.shutdown().await;
}

#[tokio::test]
async fn shared_catalog_is_fetched_once() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    let catalog = started(&server).await;

    let list = ProductListView::new(&catalog);
    let alt = ProductListAltView::new(&catalog);
    let _detail = ProductDetailView::new(&catalog);

    let mut a = catalog.subscribe_products();
    let mut b = catalog.subscribe_products();
    wait_for(&mut a, |p| p.is_ready()).await;
    wait_for(&mut b, |p| p.is_ready()).await;
    wait_for(&mut list.products(), Option::is_some).await;
    wait_for(&mut alt.products(), has_len(3)).await;

    catalog.shutdown().await;
    // MockServer verifies `expect(1)` on drop.
}

// ── Category filter ─────────────────────────────────────────────────

#[tokio::test]
async fn list_view_filters_by_category() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    let catalog = started(&server).await;
    let view = ProductListView::new(&catalog);
    let mut products = view.products();

    let all = wait_for(&mut products, Option::is_some).await.unwrap();
    assert_eq!(ids(&all), vec![1, 2, 5]);

    view.on_selected("3");
    let tools = wait_for(&mut products, |p| p.as_ref().is_some_and(|l| l.len() == 1)).await;
    assert_eq!(ids(&tools.unwrap()), vec![5]);

    view.on_selected("1");
    let garden = wait_for(&mut products, |p| p.as_ref().is_some_and(|l| l.len() == 2)).await;
    assert_eq!(ids(&garden.unwrap()), vec![1, 2]);

    view.on_selected("0");
    let reset = wait_for(&mut products, |p| p.as_ref().is_some_and(|l| l.len() == 3)).await;
    assert_eq!(ids(&reset.unwrap()), vec![1, 2, 5]);

    let categories = wait_for(&mut view.categories(), |c| !c.is_empty()).await;
    let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Garden", "Toolbox"]);

    catalog.shutdown().await;
}

#[tokio::test]
async fn unknown_category_shows_nothing() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    let catalog = started(&server).await;
    let view = ProductListView::new(&catalog);
    let mut products = view.products();
    wait_for(&mut products, Option::is_some).await;

    view.on_selected("9");
    let visible = wait_for(&mut products, |p| p.as_ref().is_some_and(|l| l.is_empty())).await;
    assert_eq!(visible.map(|l| l.len()), Some(0));
    assert_eq!(*view.error_message().current(), None);

    catalog.shutdown().await;
}

// ── Selection ───────────────────────────────────────────────────────

#[tokio::test]
async fn selection_resolves_against_catalog() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    Mock::given(method("GET"))
        .and(path_regex("^/api/suppliers/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 0, "name": "Any" })))
        .mount(&server)
        .await;
    let catalog = started(&server).await;

    assert_eq!(*catalog.subscribe_selected_product_id().current(), None);

    let mut selected = catalog.subscribe_selected_product();
    catalog.select_product(ProductId(2));
    let product = wait_for(&mut selected, Option::is_some).await.unwrap();
    assert_eq!(product.name, "Garden Cart");
    assert_eq!(product.category.as_deref(), Some("Garden"));

    catalog.select_product(ProductId(99));
    let missing = wait_for(&mut selected, Option::is_none).await;
    assert_eq!(missing, None);
    assert_eq!(catalog.selected_product_id(), Some(ProductId(99)));

    catalog.shutdown().await;
}

// ── Suppliers ───────────────────────────────────────────────────────

#[tokio::test]
async fn suppliers_are_fetched_once_each_in_input_order() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    mount_supplier(&server, 1, "Acme Gardening Supply").await;
    mount_supplier(&server, 2, "Standard Hardware").await;
    let catalog = started(&server).await;
    let view = ProductDetailView::new(&catalog);
    let mut suppliers = view.suppliers();

    catalog.select_product(ProductId(1));
    let list = wait_for(&mut suppliers, Option::is_some).await.unwrap();

    let names: Vec<_> = list.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Standard Hardware", "Acme Gardening Supply"]);
    assert_eq!(view.title().as_deref(), Some("Product Detail for: Leaf Rake"));

    catalog.shutdown().await;
}

#[tokio::test]
async fn product_without_suppliers_makes_no_requests() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    Mock::given(method("GET"))
        .and(path_regex("^/api/suppliers/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 0, "name": "Any" })))
        .expect(0)
        .mount(&server)
        .await;
    let catalog = started(&server).await;
    let mut suppliers = catalog.subscribe_suppliers();
    assert!(suppliers.current().is_pending());

    catalog.select_product(ProductId(2));
    let loaded = wait_for(&mut suppliers, |s| s.is_ready()).await;
    assert!(loaded.ready().unwrap().is_empty());

    catalog.shutdown().await;
}

#[tokio::test]
async fn superseded_supplier_fetch_is_never_delivered() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    Mock::given(method("GET"))
        .and(path_regex("^/api/suppliers/[12]$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": 1, "name": "Slow Supply" }))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    mount_supplier(&server, 3, "Fast Supply").await;
    let catalog = started(&server).await;
    let mut suppliers = catalog.subscribe_suppliers();

    catalog.select_product(ProductId(1));
    tokio::time::sleep(Duration::from_millis(50)).await;
    catalog.select_product(ProductId(5));

    let loaded = wait_for(&mut suppliers, |s| s.is_ready()).await;
    let names: Vec<_> = loaded.ready().unwrap().iter().map(|s| s.name.clone()).collect();
    assert_eq!(names, vec!["Fast Supply".to_string()]);

    tokio::time::sleep(Duration::from_millis(600)).await;
    let after = suppliers.latest();
    let names: Vec<_> = after.ready().unwrap().iter().map(|s| s.name.clone()).collect();
    assert_eq!(names, vec!["Fast Supply".to_string()]);

    catalog.shutdown().await;
}

async fn mount_slow_suppliers(server: &MockServer) {
    for (id, name) in [(1, "Acme Gardening Supply"), (2, "Standard Hardware")] {
        Mock::given(method("GET"))
            .and(path(format!("/api/suppliers/{id}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "id": id, "name": name }))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn selecting_unknown_product_cancels_pending_fetch() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    mount_slow_suppliers(&server).await;
    let catalog = started(&server).await;
    let suppliers = catalog.subscribe_suppliers();

    catalog.select_product(ProductId(1));
    tokio::time::sleep(Duration::from_millis(50)).await;
    catalog.select_product(ProductId(99));

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(suppliers.latest().is_pending());
    assert_eq!(catalog.subscribe_selected_product().latest(), None);

    catalog.shutdown().await;
}

#[tokio::test]
async fn clearing_selection_cancels_pending_fetch() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    mount_slow_suppliers(&server).await;
    mount_supplier(&server, 3, "Fast Supply").await;
    let catalog = started(&server).await;
    let mut suppliers = catalog.subscribe_suppliers();

    // A settled result survives the cleared selection.
    catalog.select_product(ProductId(5));
    wait_for(&mut suppliers, |s| s.is_ready()).await;

    catalog.select_product(ProductId(1));
    tokio::time::sleep(Duration::from_millis(50)).await;
    catalog.clear_selection();
    assert_eq!(catalog.selected_product_id(), None);

    tokio::time::sleep(Duration::from_millis(600)).await;
    let after = suppliers.latest();
    let names: Vec<_> = after.ready().unwrap().iter().map(|s| s.name.clone()).collect();
    assert_eq!(names, vec!["Fast Supply".to_string()]);

    catalog.shutdown().await;
}

#[tokio::test]
async fn one_failed_supplier_fails_the_whole_batch() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    // Not `expect(1)`: the failing join may abort this request early.
    Mock::given(method("GET"))
        .and(path("/api/suppliers/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "name": "Acme" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/suppliers/2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let catalog = started(&server).await;
    let view = ProductDetailView::new(&catalog);

    catalog.select_product(ProductId(1));
    let list = wait_for(&mut view.suppliers(), Option::is_some).await.unwrap();
    assert!(list.is_empty());

    let message = wait_for(&mut view.error_message(), Option::is_some).await;
    assert_eq!(message.as_deref(), Some("Backend returned code 404: Not Found"));

    catalog.shutdown().await;
}

// ── Insertion ───────────────────────────────────────────────────────

#[tokio::test]
async fn inserts_append_after_catalog_in_order() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    let catalog = started(&server).await;
    let view = ProductListAltView::new(&catalog);
    let mut products = view.products();
    wait_for(&mut products, has_len(3)).await;

    view.on_add();
    let custom = Product {
        id: ProductId(77),
        name: "Saw".into(),
        ..Product::placeholder()
    };
    catalog.add_product(Some(custom));

    let list = wait_for(&mut products, has_len(5))
        .await
        .unwrap();
    assert_eq!(ids(&list), vec![1, 2, 5, 42, 77]);
    assert_eq!(list[3].name, "Another One");

    catalog.shutdown().await;
}

#[tokio::test]
async fn refresh_replaces_local_inserts() {
    let server = MockServer::start().await;
    mount_catalog(&server, 2).await;
    let catalog = started(&server).await;
    let mut products = catalog.subscribe_products_with_add();
    wait_for(&mut products, has_len(3)).await;

    catalog.add_product(None);
    wait_for(&mut products, has_len(4)).await;

    catalog.refresh().await;
    let list = wait_for(&mut products, has_len(3))
        .await
        .unwrap();
    assert_eq!(ids(&list), vec![1, 2, 5]);
    assert!(catalog.last_refresh().is_some());

    catalog.shutdown().await;
}

#[tokio::test]
async fn periodic_refresh_starts_new_cache_windows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products_json()))
        .expect(3..)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(categories_json()))
        .mount(&server)
        .await;

    let config = CatalogConfig {
        refresh_interval_secs: 1,
        ..CatalogConfig::new(Url::parse(&server.uri()).unwrap())
    };
    let catalog = Catalog::new(config).unwrap();
    catalog.start().await;
    let first_refresh = catalog.last_refresh().unwrap();

    let mut products = catalog.subscribe_products_with_add();
    wait_for(&mut products, has_len(3)).await;
    catalog.add_product(None);
    wait_for(&mut products, has_len(4)).await;

    // The timed refresh replaces the accumulated list.
    let list = wait_for(&mut products, has_len(3)).await.unwrap();
    assert_eq!(ids(&list), vec![1, 2, 5]);
    assert!(catalog.last_refresh().unwrap() > first_refresh);

    tokio::time::sleep(Duration::from_millis(2500)).await;
    let requests = server.received_requests().await.unwrap();
    let product_requests = requests
        .iter()
        .filter(|r| r.url.path() == "/api/products")
        .count();
    assert!(product_requests >= 3, "got {product_requests} products requests");

    catalog.shutdown().await;
}

// ── Errors ──────────────────────────────────────────────────────────

#[tokio::test]
async fn product_failure_yields_empty_list_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(categories_json()))
        .mount(&server)
        .await;
    let catalog = started(&server).await;
    let view = ProductListView::new(&catalog);

    let list = wait_for(&mut view.products(), Option::is_some).await.unwrap();
    assert!(list.is_empty());

    let message = wait_for(&mut view.error_message(), Option::is_some).await;
    assert_eq!(message.as_deref(), Some("Backend returned code 500: boom"));

    // The category list is unaffected.
    let categories = wait_for(&mut view.categories(), |c| !c.is_empty()).await;
    assert_eq!(categories.len(), 2);

    view.dismiss_error();
    assert_eq!(*view.error_message().current(), None);

    catalog.shutdown().await;
}

#[tokio::test]
async fn injected_failure_reaches_every_screen() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    let catalog = started(&server).await;
    let list = ProductListView::new(&catalog);
    let alt = ProductListAltView::new(&catalog);
    wait_for(&mut list.products(), |p| p.as_ref().is_some_and(|l| !l.is_empty())).await;

    catalog.inject_failure(CoreError::Synthetic {
        message: "products offline".into(),
    });

    let expected = Some("An error occurred: products offline".to_string());
    assert_eq!(wait_for(&mut list.error_message(), Option::is_some).await, expected);
    assert_eq!(wait_for(&mut alt.error_message(), Option::is_some).await, expected);
    let emptied = wait_for(&mut list.products(), |p| p.as_ref().is_some_and(|l| l.is_empty())).await;
    assert_eq!(emptied.map(|l| l.len()), Some(0));

    catalog.shutdown().await;
}

#[tokio::test]
async fn unreachable_server_reports_connection_error() {
    let config = CatalogConfig::new(Url::parse("http://127.0.0.1:1").unwrap());
    let catalog = Catalog::new(config).unwrap();
    catalog.start().await;
    let view = ProductListView::new(&catalog);

    let message = wait_for(&mut view.error_message(), Option::is_some).await.unwrap();
    assert!(message.starts_with("An error occurred: "), "{message}");

    catalog.shutdown().await;
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn start_and_shutdown_update_state() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    let config = CatalogConfig::new(Url::parse(&server.uri()).unwrap());
    let catalog = Catalog::new(config).unwrap();
    assert_eq!(catalog.state(), CatalogState::Idle);

    catalog.start().await;
    assert_eq!(catalog.state(), CatalogState::Running);
    // A second start does not refetch.
    catalog.start().await;

    catalog.shutdown().await;
    assert_eq!(catalog.state(), CatalogState::Stopped);
}
