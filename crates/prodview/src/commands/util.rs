//! Shared helpers for command handlers.

use std::sync::Arc;
use std::time::Duration;

use prodview_core::{Catalog, Product, ViewStream};

use crate::error::CliError;

/// Slack on top of the request timeout for derived views to settle.
const SETTLE_SLACK: Duration = Duration::from_secs(1);

fn settle_limit(catalog: &Catalog) -> Duration {
    catalog.config().timeout + SETTLE_SLACK
}

/// Wait until `stream` satisfies `predicate`.
pub async fn settle<T: Clone + Send + Sync + 'static>(
    catalog: &Catalog,
    stream: &mut ViewStream<T>,
    predicate: impl FnMut(&T) -> bool,
) -> Result<T, CliError> {
    match tokio::time::timeout(settle_limit(catalog), stream.wait_for(predicate)).await {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(CliError::Internal("view closed before settling".into())),
        Err(_) => Err(CliError::Timeout),
    }
}

/// Wait for the next change on `stream`.
pub async fn next_change<T: Clone + Send + Sync + 'static>(
    catalog: &Catalog,
    stream: &mut ViewStream<T>,
) -> Result<T, CliError> {
    match tokio::time::timeout(settle_limit(catalog), stream.changed()).await {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(CliError::Internal("view closed before settling".into())),
        Err(_) => Err(CliError::Timeout),
    }
}

/// Wait for the first catalog load and fail if it did not succeed.
pub async fn loaded_catalog(catalog: &Catalog) -> Result<(), CliError> {
    let state = settle(catalog, &mut catalog.subscribe_products(), |p| !p.is_pending()).await?;
    match state.error() {
        Some(err) => Err(err.clone().into()),
        None => Ok(()),
    }
}

/// Length of a loaded product list, `None` while still loading.
pub fn loaded_len(products: Option<&Arc<Vec<Product>>>) -> Option<usize> {
    products.map(|list| list.len())
}

/// Format a price for display.
pub fn price(value: f64) -> String {
    format!("{value:.2}")
}

pub fn opt_or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}
