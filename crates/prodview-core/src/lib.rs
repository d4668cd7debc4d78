//! Reactive view-model layer between `prodview-api` and UI consumers.
//!
//! - **[`Catalog`]** owns the shared, replayed server streams (products,
//!   categories, the category-enriched catalog) and the product-level
//!   action streams. [`start()`](Catalog::start) loads the first cache
//!   window and spawns the derivation tasks; [`shutdown()`](Catalog::shutdown)
//!   stops them.
//!
//! - **Screen view-models** ([`ProductListView`], [`ProductListAltView`],
//!   [`ProductDetailView`]) derive per-screen streams from a `Catalog` and
//!   each carry their own error-message channel.
//!
//! - **[`ViewStream<T>`]** is the subscription handle vended everywhere.
//!   Exposes `current()` / `latest()` / `changed()` / `wait_for()`.
//!
//! - **[`Loadable<T>`]** carries server failures as values, so an error
//!   never terminates a stream other screens still observe.

pub mod catalog;
pub mod compose;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod store;
pub mod stream;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use catalog::{Catalog, CatalogState};
pub use config::{CatalogConfig, DEFAULT_PRICE_MARKUP, TlsVerification};
pub use error::CoreError;
pub use model::{
    Category, CategoryFilter, CategoryId, Product, ProductId, Supplier, SupplierId,
};
pub use store::Loadable;
pub use stream::{ViewStream, ViewWatchStream};
pub use view::{ProductDetailView, ProductListAltView, ProductListView};
