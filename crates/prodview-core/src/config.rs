// ── Runtime catalog configuration ──
//
// Describes *where* the catalog server lives and how derived views are
// computed. Never touches disk: the CLI (via prodview-config) builds a
// `CatalogConfig` and hands it in.

use std::time::Duration;

use url::Url;

/// Markup applied to every list price in the enriched catalog.
pub const DEFAULT_PRICE_MARKUP: f64 = 1.5;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (local development servers).
    DangerAcceptInvalid,
}

/// Configuration for one catalog server.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Server root (e.g., `http://localhost:4200`).
    pub base_url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Multiplier applied to non-zero list prices.
    pub price_markup: f64,
    /// How often to start a new cache window (seconds). 0 = never.
    pub refresh_interval_secs: u64,
}

impl CatalogConfig {
    /// Config for `base_url` with every other field at its default.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            price_markup: DEFAULT_PRICE_MARKUP,
            refresh_interval_secs: 0,
        }
    }
}
