//! Product list command handler.

use tabled::Tabled;

use prodview_core::{Catalog, Product, ProductListAltView, ProductListView};

use crate::cli::{GlobalOpts, ProductsArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(super) struct ProductRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Stock")]
    stock: String,
}

impl From<&Product> for ProductRow {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id.get(),
            code: p.code.clone(),
            name: p.name.clone(),
            category: p.category.clone().unwrap_or_else(|| "-".into()),
            price: util::price(p.price),
            stock: util::opt_or_dash(p.quantity_in_stock),
        }
    }
}

pub(super) fn render(global: &GlobalOpts, products: &[Product]) -> Result<String, CliError> {
    output::render_list(&global.output, products, |p| ProductRow::from(p), |p| {
        p.id.to_string()
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    catalog: &Catalog,
    args: ProductsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::loaded_catalog(catalog).await?;

    let products = if args.with_added {
        let view = ProductListAltView::new(catalog);
        let mut stream = view.products();
        let base = catalog
            .products_snapshot()
            .ready()
            .map_or(0, |list| list.len());
        util::settle(catalog, &mut stream, |p| {
            util::loaded_len(p.as_ref()) == Some(base)
        })
        .await?;

        view.on_add();
        let list = util::settle(catalog, &mut stream, |p| {
            util::loaded_len(p.as_ref()) == Some(base + 1)
        })
        .await?;
        list.map(|l| l.to_vec()).unwrap_or_default()
    } else {
        let view = ProductListView::new(catalog);
        if let Some(ref raw) = args.category {
            view.on_selected(raw);
        }
        let filter = view.category_filter();
        let list = util::settle(catalog, &mut view.products(), |p| {
            p.as_ref()
                .is_some_and(|list| list.iter().all(|product| filter.matches(product)))
        })
        .await?;
        list.map(|l| l.to_vec()).unwrap_or_default()
    };

    let out = render(global, &products)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
