//! Category list command handler.

use tabled::Tabled;

use prodview_core::{Catalog, Category};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Category> for CategoryRow {
    fn from(c: &Category) -> Self {
        Self {
            id: c.id.get(),
            name: c.name.clone(),
            description: c.description.clone().unwrap_or_default(),
        }
    }
}

pub async fn handle(catalog: &Catalog, global: &GlobalOpts) -> Result<(), CliError> {
    let loaded =
        util::settle(catalog, &mut catalog.subscribe_categories(), |c| !c.is_pending()).await?;
    if let Some(err) = loaded.error() {
        return Err(err.clone().into());
    }
    let categories = loaded.ready().map(|c| c.to_vec()).unwrap_or_default();

    let out = output::render_list(&global.output, &categories, |c| CategoryRow::from(c), |c| {
        c.id.to_string()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
