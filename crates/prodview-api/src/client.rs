// Catalog API HTTP client
//
// Wraps `reqwest::Client` with catalog URL construction and status
// handling. Every method returns decoded wire types; the caller never
// sees a raw response.

use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{ApiCategory, ApiProduct, ApiSupplier};
use crate::transport::TransportConfig;

/// Longest body excerpt carried in an error message.
const BODY_PREVIEW_LEN: usize = 200;

/// Raw HTTP client for the catalog server.
///
/// All endpoints live under `{base_url}/api/`. Cheap to clone: the
/// underlying `reqwest::Client` is reference-counted.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CatalogClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the server root (e.g. `http://localhost:4200`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// `GET api/products`
    pub async fn list_products(&self) -> Result<Vec<ApiProduct>, Error> {
        let url = self.api_url("products")?;
        self.get(url).await
    }

    /// `GET api/categories`
    pub async fn list_categories(&self) -> Result<Vec<ApiCategory>, Error> {
        let url = self.api_url("categories")?;
        self.get(url).await
    }

    /// `GET api/suppliers/{id}`
    pub async fn get_supplier(&self, id: u32) -> Result<ApiSupplier, Error> {
        let url = self.api_url(&format!("suppliers/{id}"))?;
        self.get(url).await
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/api/{path}`, tolerating a trailing slash on the base.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url.clone()).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unsuccessful response")
                    .to_owned()
            } else {
                preview(&body).to_owned()
            };
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
                message,
            });
        }

        let body = resp.text().await?;
        trace!(bytes = body.len(), "response body received");

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }
}

/// Leading slice of `body`, cut on a char boundary.
fn preview(body: &str) -> &str {
    if body.len() <= BODY_PREVIEW_LEN {
        return body;
    }
    let mut end = BODY_PREVIEW_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
