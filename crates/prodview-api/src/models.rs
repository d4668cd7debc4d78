// Wire types for the catalog API.
//
// Field names follow the server's camelCase JSON. Optional fields use
// `#[serde(default)]` so sparse records still decode.

use serde::{Deserialize, Serialize};

/// A product record as served by `GET api/products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiProduct {
    pub id: u32,
    pub product_name: String,
    #[serde(default)]
    pub product_code: String,
    #[serde(default)]
    pub description: String,
    /// Missing or null prices are treated as zero by consumers.
    #[serde(default)]
    pub price: Option<f64>,
    pub category_id: u32,
    /// Some servers pre-fill this; the core recomputes it from categories.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub supplier_ids: Option<Vec<u32>>,
    #[serde(default)]
    pub quantity_in_stock: Option<u32>,
}

/// A category record as served by `GET api/categories`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCategory {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A supplier record as served by `GET api/suppliers/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSupplier {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub minimum_quantity: Option<u32>,
}
