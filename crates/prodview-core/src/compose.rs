// ── Derivation steps ──
//
// Pure functions behind every derived stream. The background tasks in
// `catalog` and `view` only wire inputs to these and publish the result.

use crate::model::{Category, Product, ProductId};

/// One element of the merged catalog-plus-inserts sequence.
#[derive(Debug, Clone)]
pub enum CatalogEvent {
    /// A full server batch.
    Batch(Vec<Product>),
    /// A single locally inserted product.
    Inserted(Product),
}

/// Join products with their category names and apply the price markup.
///
/// Zero prices stay zero. A product whose `category_id` matches no
/// category gets `category: None`.
pub fn enrich(products: &[Product], categories: &[Category], markup: f64) -> Vec<Product> {
    products
        .iter()
        .map(|product| Product {
            price: if is_unpriced(product.price) {
                0.0
            } else {
                product.price * markup
            },
            category: categories
                .iter()
                .find(|c| c.id == product.category_id)
                .map(|c| c.name.clone()),
            search_key: vec![product.name.clone()],
            ..product.clone()
        })
        .collect()
}

/// Zero and NaN prices carry no markup.
#[allow(clippy::float_cmp)]
fn is_unpriced(price: f64) -> bool {
    price == 0.0 || price.is_nan()
}

/// The product with `selected` id, if any.
pub fn find_selected(products: &[Product], selected: Option<ProductId>) -> Option<Product> {
    let id = selected?;
    products.iter().find(|p| p.id == id).cloned()
}

/// Fold one merged event into the running list.
///
/// A batch replaces the list; an insert is appended.
pub fn fold_insertion(acc: &mut Vec<Product>, event: CatalogEvent) {
    match event {
        CatalogEvent::Batch(batch) => *acc = batch,
        CatalogEvent::Inserted(product) => acc.push(product),
    }
}
