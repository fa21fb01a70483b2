//! Connection settings and endpoint URLs for the document store.
//!
//! Settings are read from `settings.json` in the user's config directory:
//! - Linux: ~/.config/paperless-gallery/settings.json
//! - macOS: ~/Library/Application Support/paperless-gallery/settings.json
//! - Windows: %APPDATA%\paperless-gallery\settings.json
//!
//! `PAPERLESS_URL` and `PAPERLESS_TOKEN` override the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

use crate::error::{GalleryError, Result};
use crate::state::data::DocumentId;

const URL_ENV: &str = "PAPERLESS_URL";
const TOKEN_ENV: &str = "PAPERLESS_TOKEN";

/// Connection settings used to build every authenticated request
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root of the store, e.g. "https://paperless.example.org"
    #[serde(alias = "paperlessUrl")]
    pub base_url: String,
    #[serde(alias = "paperlessAuthToken")]
    pub auth_token: String,
}

impl Config {
    /// Create validated settings. Trailing slashes on the url are dropped.
    pub fn new(base_url: impl Into<String>, auth_token: impl Into<String>) -> Result<Self> {
        let config = Config {
            base_url: base_url.into().trim().trim_end_matches('/').to_string(),
            auth_token: auth_token.into().trim().to_string(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse settings from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Config = serde_json::from_str(json)
            .map_err(|e| GalleryError::Config(format!("settings file: {}", e)))?;
        Config::new(raw.base_url, raw.auth_token)
    }

    /// Load settings from the settings file, then apply environment overrides
    pub fn load() -> Result<Self> {
        let from_file = match Self::settings_path() {
            Some(path) if path.exists() => Some(Self::read_file(&path)?),
            _ => None,
        };

        let base_url = std::env::var(URL_ENV)
            .ok()
            .or_else(|| from_file.as_ref().map(|c| c.base_url.clone()))
            .ok_or_else(|| GalleryError::Config(format!("no base url (set {})", URL_ENV)))?;
        let auth_token = std::env::var(TOKEN_ENV)
            .ok()
            .or_else(|| from_file.as_ref().map(|c| c.auth_token.clone()))
            .ok_or_else(|| GalleryError::Config(format!("no auth token (set {})", TOKEN_ENV)))?;

        Config::new(base_url, auth_token)
    }

    fn read_file(path: &Path) -> Result<Self> {
        debug!("Reading settings from {}", path.display());
        let json = std::fs::read_to_string(path)
            .map_err(|e| GalleryError::Config(format!("{}: {}", path.display(), e)))?;
        Config::from_json(&json)
    }

    /// Get the path where the settings file should be stored
    pub fn settings_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
        path.push("paperless-gallery");
        path.push("settings.json");
        Some(path)
    }

    fn validate(&self) -> Result<()> {
        if self.auth_token.is_empty() {
            return Err(GalleryError::Config("auth token is empty".to_string()));
        }
        let parsed = Url::parse(&self.base_url)?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(GalleryError::Config(format!(
                "unsupported scheme: {} (only http/https allowed)",
                parsed.scheme()
            )));
        }
        Ok(())
    }

    /// Value of the `Authorization` header
    pub fn authorization(&self) -> String {
        format!("token {}", self.auth_token)
    }

    /// Bulk index: every document id in the store
    pub fn index_url(&self) -> String {
        format!("{}/api/documents/", self.base_url)
    }

    /// First page of the tag table
    pub fn tags_url(&self) -> String {
        format!("{}/api/tags/", self.base_url)
    }

    /// Detail record of one document (includes its tag ids)
    pub fn document_url(&self, id: &DocumentId) -> String {
        format!("{}/api/documents/{}/", self.base_url, id)
    }

    pub fn thumbnail_url(&self, id: &DocumentId) -> String {
        format!("{}/api/documents/{}/thumb/", self.base_url, id)
    }

    /// Full-text search, with the query url-encoded
    pub fn search_url(&self, query: &str) -> Result<String> {
        let mut url = Url::parse(&self.index_url())?;
        url.query_pairs_mut().append_pair("query", query);
        Ok(url.into())
    }
}

// The token must never end up in logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}
