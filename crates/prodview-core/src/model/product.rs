// ── Product domain type ──

use serde::{Deserialize, Serialize};

use super::ids::{CategoryId, ProductId, SupplierId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub code: String,
    pub description: String,
    /// Display price. Server records carry the list price; enriched
    /// catalog entries carry the marked-up price.
    pub price: f64,
    pub category_id: CategoryId,
    /// Category name joined from the category list. `None` when no
    /// category with `category_id` exists.
    pub category: Option<String>,
    /// Empty when the product has no suppliers.
    #[serde(default)]
    pub supplier_ids: Vec<SupplierId>,
    #[serde(default)]
    pub search_key: Vec<String>,
    pub quantity_in_stock: Option<u32>,
}

impl Product {
    /// The stand-in used when a product is inserted without a payload.
    pub fn placeholder() -> Self {
        Self {
            id: ProductId(42),
            name: "Another One".into(),
            code: "TBX-0042".into(),
            description: "Our new product".into(),
            price: 8.9,
            category_id: CategoryId(3),
            category: Some("Toolbox".into()),
            supplier_ids: Vec::new(),
            search_key: vec!["Another One".into()],
            quantity_in_stock: Some(30),
        }
    }

    pub fn has_suppliers(&self) -> bool {
        !self.supplier_ids.is_empty()
    }
}
