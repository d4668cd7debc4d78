//! Product detail command handler.

use serde::Serialize;
use tabled::Tabled;

use prodview_core::{Catalog, Product, ProductDetailView, ProductId, Supplier};

use crate::cli::{GlobalOpts, ShowArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct SupplierRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Cost")]
    cost: String,
    #[tabled(rename = "Min Qty")]
    minimum_quantity: String,
}

impl From<&Supplier> for SupplierRow {
    fn from(s: &Supplier) -> Self {
        Self {
            id: s.id.get(),
            name: s.name.clone(),
            cost: s.cost.map_or_else(|| "-".into(), util::price),
            minimum_quantity: util::opt_or_dash(s.minimum_quantity),
        }
    }
}

/// What the detail screen shows: the product and its suppliers.
#[derive(Debug, Serialize)]
pub(super) struct ProductDetail {
    pub title: String,
    pub product: Product,
    pub suppliers: Vec<Supplier>,
}

pub(super) fn detail_text(detail: &ProductDetail, color: bool) -> String {
    let p = &detail.product;
    let mut lines = vec![
        output::heading(&detail.title, color),
        format!("ID:          {}", p.id),
        format!("Code:        {}", p.code),
        format!("Description: {}", p.description),
        format!("Category:    {}", p.category.as_deref().unwrap_or("-")),
        format!("Price:       {}", util::price(p.price)),
        format!("In stock:    {}", util::opt_or_dash(p.quantity_in_stock)),
        String::new(),
    ];
    if detail.suppliers.is_empty() {
        lines.push("No suppliers for this product".into());
    } else {
        lines.push(output::heading("Suppliers", color));
        let rows: Vec<SupplierRow> = detail.suppliers.iter().map(SupplierRow::from).collect();
        lines.push(output::render_table(&rows));
    }
    lines.join("\n")
}

/// Select `id` and wait for the detail view to show it with suppliers.
pub(super) async fn load_detail(
    catalog: &Catalog,
    view: &ProductDetailView,
    id: ProductId,
) -> Result<ProductDetail, CliError> {
    let known = catalog
        .products_snapshot()
        .ready()
        .is_some_and(|list| list.iter().any(|p| p.id == id));
    if !known {
        return Err(CliError::NotFound {
            resource_type: "product".into(),
            identifier: id.to_string(),
            list_command: "products".into(),
        });
    }

    let already_selected = view.product().latest().is_some_and(|p| p.id == id);
    let mut suppliers = catalog.subscribe_suppliers();

    catalog.select_product(id);
    let product = util::settle(catalog, &mut view.product(), |p| {
        p.as_ref().is_some_and(|p| p.id == id)
    })
    .await?;

    // Reselecting the current product does not refetch.
    let loaded = if already_selected {
        suppliers.latest()
    } else {
        util::next_change(catalog, &mut suppliers).await?
    };
    if let Some(err) = loaded.error() {
        return Err(err.clone().into());
    }

    let Some(product) = product else {
        return Err(CliError::Internal("selection resolved to nothing".into()));
    };
    Ok(ProductDetail {
        title: view
            .title()
            .unwrap_or_else(|| format!("Product Detail for: {}", product.name)),
        suppliers: loaded.ready().map(|s| s.to_vec()).unwrap_or_default(),
        product,
    })
}

pub async fn handle(catalog: &Catalog, args: ShowArgs, global: &GlobalOpts) -> Result<(), CliError> {
    util::loaded_catalog(catalog).await?;

    let view = ProductDetailView::new(catalog);
    let detail = load_detail(catalog, &view, ProductId(args.product_id)).await?;

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &detail,
        |d| detail_text(d, color),
        |d| {
            d.suppliers
                .iter()
                .map(|s| s.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
