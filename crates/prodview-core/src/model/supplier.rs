// ── Supplier domain type ──

use serde::{Deserialize, Serialize};

use super::ids::SupplierId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub cost: Option<f64>,
    pub minimum_quantity: Option<u32>,
}
