// src/config.rs

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the leads backend, without a trailing `/leads`.
    /// Example: "https://api.example.com/api"
    pub api_base_url: String,
    /// SQLite file backing the local key/value store.
    pub storage_path: String,
}

pub const API_URL_ENV: &str = "RANKRENT_API_URL";
pub const STORAGE_ENV: &str = "RANKRENT_STORAGE";

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            storage_path: "rankrent.sqlite3".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by whatever is set in the environment.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                cfg.api_base_url = url;
            }
        }
        if let Ok(path) = std::env::var(STORAGE_ENV) {
            if !path.trim().is_empty() {
                cfg.storage_path = path;
            }
        }
        cfg
    }

    /// Apply explicit overrides (CLI flags) on top of this config.
    pub fn with_overrides(mut self, api_base_url: Option<String>, storage_path: Option<String>) -> Self {
        if let Some(url) = api_base_url {
            self.api_base_url = url;
        }
        if let Some(path) = storage_path {
            self.storage_path = path;
        }
        self
    }
}
