// ── Catalog domain model ──
//
// Canonical types consumed by the view-models and the CLI. Wire types
// from `prodview-api` are converted into these in `convert`.

pub mod category;
pub mod ids;
pub mod product;
pub mod supplier;

pub use category::{Category, CategoryFilter};
pub use ids::{CategoryId, ProductId, SupplierId};
pub use product::Product;
pub use supplier::Supplier;
