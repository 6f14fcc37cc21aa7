use std::collections::BTreeMap;

use crate::CatalogKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub api_base_url: String,
    pub media_storage_base_url: Option<String>,
    pub media_uploads_base_url: String,
    pub placeholder_urls: BTreeMap<CatalogKind, String>,
    pub catalog_ttl_secs: u64,
    pub media_ttl_secs: u64,
    pub catalog_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    pub redirect_timeout_secs: u64,
    pub catalog_initial_page_size: u32,
    pub catalog_max_page_size: u32,
    pub catalog_max_retries: u32,
    pub catalog_backoff_base_ms: u64,
    pub user_agent: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("api_base_url", &self.api_base_url)
            .field("media_storage_base_url", &self.media_storage_base_url)
            .field("media_uploads_base_url", &self.media_uploads_base_url)
            .field("placeholder_urls", &self.placeholder_urls)
            .field("catalog_ttl_secs", &self.catalog_ttl_secs)
            .field("media_ttl_secs", &self.media_ttl_secs)
            .field("catalog_timeout_secs", &self.catalog_timeout_secs)
            .field("probe_timeout_secs", &self.probe_timeout_secs)
            .field("redirect_timeout_secs", &self.redirect_timeout_secs)
            .field("catalog_initial_page_size", &self.catalog_initial_page_size)
            .field("catalog_max_page_size", &self.catalog_max_page_size)
            .field("catalog_max_retries", &self.catalog_max_retries)
            .field("catalog_backoff_base_ms", &self.catalog_backoff_base_ms)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
