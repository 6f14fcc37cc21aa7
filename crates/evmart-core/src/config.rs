use std::collections::BTreeMap;

use crate::app_config::{AppConfig, Environment};
use crate::{CatalogKind, ConfigError};

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files. Useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation are decoupled from the process environment so they
/// can be tested with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_timeout = |var: &str, default: &str, max: u64| -> Result<u64, ConfigError> {
        let secs = parse_u64(var, default)?;
        if secs == 0 || secs > max {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("must be between 1 and {max} seconds, got {secs}"),
            });
        }
        Ok(secs)
    };

    let api_base_url = validate_base_url("EVMART_API_BASE_URL", &require("EVMART_API_BASE_URL")?)?;
    let env = parse_environment(&or_default("EVMART_ENV", "development"))?;
    let log_level = or_default("EVMART_LOG_LEVEL", "info");

    let media_storage_base_url = optional("EVMART_MEDIA_STORAGE_BASE_URL")
        .map(|raw| validate_base_url("EVMART_MEDIA_STORAGE_BASE_URL", &raw))
        .transpose()?;
    let media_uploads_base_url = match optional("EVMART_MEDIA_UPLOADS_BASE_URL") {
        Some(raw) => validate_base_url("EVMART_MEDIA_UPLOADS_BASE_URL", &raw)?,
        None => format!("{api_base_url}/uploads"),
    };

    let mut placeholder_urls = BTreeMap::new();
    for kind in CatalogKind::ALL {
        let var = placeholder_var(kind);
        if let Some(raw) = optional(&var) {
            placeholder_urls.insert(kind, validate_base_url(&var, &raw)?);
        }
    }

    let catalog_ttl_secs = parse_u64("EVMART_CATALOG_TTL_SECS", "300")?;
    let media_ttl_secs = parse_u64("EVMART_MEDIA_TTL_SECS", "1800")?;

    let catalog_timeout_secs = parse_timeout("EVMART_CATALOG_TIMEOUT_SECS", "30", 30)?;
    let probe_timeout_secs = parse_timeout("EVMART_PROBE_TIMEOUT_SECS", "3", 10)?;
    let redirect_timeout_secs = parse_timeout("EVMART_REDIRECT_TIMEOUT_SECS", "5", 10)?;

    let catalog_initial_page_size = parse_u32("EVMART_CATALOG_INITIAL_PAGE_SIZE", "100")?;
    let catalog_max_page_size = parse_u32("EVMART_CATALOG_MAX_PAGE_SIZE", "5000")?;
    if catalog_initial_page_size == 0 || catalog_initial_page_size > catalog_max_page_size {
        return Err(ConfigError::InvalidEnvVar {
            var: "EVMART_CATALOG_INITIAL_PAGE_SIZE".to_string(),
            reason: format!(
                "must be between 1 and EVMART_CATALOG_MAX_PAGE_SIZE ({catalog_max_page_size})"
            ),
        });
    }

    let catalog_max_retries = parse_u32("EVMART_CATALOG_MAX_RETRIES", "2")?;
    let catalog_backoff_base_ms = parse_u64("EVMART_CATALOG_BACKOFF_BASE_MS", "500")?;
    let user_agent = or_default("EVMART_USER_AGENT", "evmart/0.1 (catalog-aggregator)");

    Ok(AppConfig {
        env,
        log_level,
        api_base_url,
        media_storage_base_url,
        media_uploads_base_url,
        placeholder_urls,
        catalog_ttl_secs,
        media_ttl_secs,
        catalog_timeout_secs,
        probe_timeout_secs,
        redirect_timeout_secs,
        catalog_initial_page_size,
        catalog_max_page_size,
        catalog_max_retries,
        catalog_backoff_base_ms,
        user_agent,
    })
}

/// Env var holding the placeholder image for `kind`,
/// e.g. `EVMART_PLACEHOLDER_CHARGING_STATIONS_URL`.
fn placeholder_var(kind: CatalogKind) -> String {
    format!(
        "EVMART_PLACEHOLDER_{}_URL",
        kind.slug().replace('-', "_").to_ascii_uppercase()
    )
}

/// Requires an `http(s)://` URL and strips trailing slashes so callers can
/// join paths with a single `/`.
fn validate_base_url(var: &str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected an http(s) URL, got \"{raw}\""),
        });
    }
    Ok(trimmed.to_string())
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "EVMART_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
