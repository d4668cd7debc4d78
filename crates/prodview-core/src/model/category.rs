// ── Category and filter types ──

use serde::{Deserialize, Serialize};

use super::ids::CategoryId;
use super::product::Product;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
}

/// Category filter applied by the product list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CategoryFilter {
    /// No filter: every product is visible.
    #[default]
    All,
    Only(CategoryId),
}

impl CategoryFilter {
    /// Interpret a raw UI value (e.g. a `<select>` option).
    ///
    /// Empty, `"0"`, and anything non-numeric clear the filter.
    pub fn from_selection(raw: &str) -> Self {
        match raw.trim().parse::<u32>() {
            Ok(0) | Err(_) => Self::All,
            Ok(id) => Self::Only(CategoryId(id)),
        }
    }

    pub fn matches(self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Only(id) => product.category_id == id,
        }
    }

    /// Products visible under this filter, in catalog order.
    pub fn apply(self, products: &[Product]) -> Vec<Product> {
        products.iter().filter(|p| self.matches(p)).cloned().collect()
    }
}

impl From<CategoryId> for CategoryFilter {
    fn from(id: CategoryId) -> Self {
        if id.get() == 0 {
            Self::All
        } else {
            Self::Only(id)
        }
    }
}
