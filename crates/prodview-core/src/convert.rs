// ── API-to-domain type conversions ──
//
// Bridges raw `prodview_api` wire types into canonical `prodview_core::model`
// types. Missing optional data gets a neutral default: no price is `0.0`,
// no supplier list is empty.

use prodview_api::{ApiCategory, ApiProduct, ApiSupplier};

use crate::model::{Category, CategoryId, Product, ProductId, Supplier, SupplierId};

impl From<ApiProduct> for Product {
    fn from(p: ApiProduct) -> Self {
        Self {
            id: ProductId(p.id),
            name: p.product_name,
            code: p.product_code,
            description: p.description,
            price: p.price.unwrap_or(0.0),
            category_id: CategoryId(p.category_id),
            category: p.category,
            supplier_ids: p
                .supplier_ids
                .unwrap_or_default()
                .into_iter()
                .map(SupplierId)
                .collect(),
            search_key: Vec::new(),
            quantity_in_stock: p.quantity_in_stock,
        }
    }
}

impl From<ApiCategory> for Category {
    fn from(c: ApiCategory) -> Self {
        Self {
            id: CategoryId(c.id),
            name: c.name,
            description: c.description,
        }
    }
}

impl From<ApiSupplier> for Supplier {
    fn from(s: ApiSupplier) -> Self {
        Self {
            id: SupplierId(s.id),
            name: s.name,
            cost: s.cost,
            minimum_quantity: s.minimum_quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_defaults_missing_fields() {
        let api = ApiProduct {
            id: 8,
            product_name: "Saw".into(),
            product_code: "TBX-0022".into(),
            description: String::new(),
            price: None,
            category_id: 3,
            category: None,
            supplier_ids: None,
            quantity_in_stock: None,
        };
        let p = Product::from(api);
        assert_eq!(p.id, ProductId(8));
        assert!((p.price - 0.0).abs() < f64::EPSILON);
        assert!(p.supplier_ids.is_empty());
        assert!(!p.has_suppliers());
    }

    #[test]
    fn supplier_ids_keep_order() {
        let api = ApiProduct {
            id: 1,
            product_name: "Leaf Rake".into(),
            product_code: "GDN-0011".into(),
            description: String::new(),
            price: Some(19.95),
            category_id: 1,
            category: None,
            supplier_ids: Some(vec![5, 2, 9]),
            quantity_in_stock: Some(15),
        };
        let p = Product::from(api);
        assert_eq!(
            p.supplier_ids,
            vec![SupplierId(5), SupplierId(2), SupplierId(9)]
        );
    }
}
