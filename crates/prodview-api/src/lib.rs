// prodview-api: Async Rust client for the product catalog HTTP API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::CatalogClient;
pub use error::Error;
pub use models::{ApiCategory, ApiProduct, ApiSupplier};
pub use transport::{TlsMode, TransportConfig};
