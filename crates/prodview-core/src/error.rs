// ── Core error types ──
//
// User-facing errors from prodview-core. Consumers never see reqwest
// errors or JSON parse failures directly: the `From<prodview_api::Error>`
// impl translates transport-layer errors into these variants, and
// `user_message` renders the text a screen shows.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Client-side errors ───────────────────────────────────────────
    #[error("Cannot reach catalog server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to catalog server timed out")]
    Timeout,

    #[error("Invalid response from catalog server: {message}")]
    InvalidResponse { message: String },

    // ── Server-side errors ───────────────────────────────────────────
    #[error("Catalog server returned HTTP {status}: {message}")]
    Backend { status: u16, message: String },

    // ── Injected errors ──────────────────────────────────────────────
    /// Raised on purpose to exercise the error path.
    #[error("Simulated failure: {message}")]
    Synthetic { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Human-readable message shown in a screen's error channel.
    ///
    /// Server responses render as `Backend returned code {status}: ...`;
    /// everything that failed on this side renders as `An error occurred: ...`.
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend { status, message } => {
                format!("Backend returned code {status}: {message}")
            }
            Self::ConnectionFailed { reason, .. } => format!("An error occurred: {reason}"),
            Self::Timeout => "An error occurred: request timed out".into(),
            Self::InvalidResponse { message }
            | Self::Synthetic { message }
            | Self::Config { message } => format!("An error occurred: {message}"),
        }
    }

    /// HTTP status, for errors the server produced.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<prodview_api::Error> for CoreError {
    fn from(err: prodview_api::Error) -> Self {
        match err {
            prodview_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if let Some(status) = e.status() {
                    CoreError::Backend {
                        status: status.as_u16(),
                        message: e.to_string(),
                    }
                } else {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                }
            }
            prodview_api::Error::Status {
                status, message, ..
            } => CoreError::Backend { status, message },
            prodview_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            prodview_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            prodview_api::Error::Deserialization { message, body: _ } => {
                CoreError::InvalidResponse { message }
            }
        }
    }
}
