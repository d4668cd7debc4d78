//! CLI configuration: thin wrapper around `prodview_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--server, --timeout, --markup, --insecure).

use std::time::Duration;

use prodview_core::{CatalogConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use prodview_config::{
    Config, Profile, config_path, load_config, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `CatalogConfig` from the config file, the active profile, and
/// CLI overrides. Precedence: flag > env > profile > defaults.
pub fn resolve_catalog_config(global: &GlobalOpts) -> Result<CatalogConfig, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    let mut catalog = match cfg.profiles.get(&profile_name) {
        Some(profile) => {
            let profile = Profile {
                server: global.server.clone().unwrap_or_else(|| profile.server.clone()),
                ..profile.clone()
            };
            prodview_config::profile_to_catalog_config(&profile, &cfg.defaults)?
        }
        None => {
            // An explicitly requested profile must exist.
            if global.profile.is_some() && global.server.is_none() {
                let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
                available.sort();
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }
            let server = global.server.as_deref().ok_or_else(|| CliError::NoConfig {
                path: config_path().display().to_string(),
            })?;
            let profile = Profile {
                server: server.to_owned(),
                ..Profile::default()
            };
            prodview_config::profile_to_catalog_config(&profile, &cfg.defaults)?
        }
    };

    if let Some(secs) = global.timeout {
        catalog.timeout = Duration::from_secs(secs);
    }
    if let Some(markup) = global.markup {
        if !markup.is_finite() || markup < 0.0 {
            return Err(CliError::Validation {
                field: "markup".into(),
                reason: format!("expected a non-negative number, got {markup}"),
            });
        }
        catalog.price_markup = markup;
    }
    if global.insecure {
        catalog.tls = TlsVerification::DangerAcceptInvalid;
    }

    Ok(catalog)
}
