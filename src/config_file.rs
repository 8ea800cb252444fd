//! Settings file handling for the API endpoints and listing behaviour.
//!
//! Settings are JSON; every field has a default so a partial file (or no file
//! at all) is valid. The bearer token can be supplied through the
//! `BLUEPRINT_COMPOSER_TOKEN` environment variable instead of the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::repositories::listing::DEFAULT_PER_PAGE;

/// Environment variable that overrides `token`
pub const TOKEN_ENV_VAR: &str = "BLUEPRINT_COMPOSER_TOKEN";

pub const DEFAULT_IMAGE_BUILDER_URL: &str = "https://console.redhat.com/api/image-builder/v1";
pub const DEFAULT_CONTENT_SOURCES_URL: &str = "https://console.redhat.com/api/content-sources/v1";
pub const DEFAULT_FILTER_DEBOUNCE_MS: u64 = 500;
pub const MAX_PER_PAGE: u64 = 100;

/// Client settings that can be saved/loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub image_builder_url: String,
    pub content_sources_url: String,
    /// Rows per page of the repository table
    pub per_page: u64,
    /// Quiet period before filter input triggers a listing
    pub filter_debounce_ms: u64,
    /// Hide hosted-only wizard steps
    pub on_premise: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            image_builder_url: DEFAULT_IMAGE_BUILDER_URL.to_string(),
            content_sources_url: DEFAULT_CONTENT_SOURCES_URL.to_string(),
            per_page: DEFAULT_PER_PAGE,
            filter_debounce_ms: DEFAULT_FILTER_DEBOUNCE_MS,
            on_premise: false,
            token: None,
        }
    }
}

impl Settings {
    /// Save settings to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize settings to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write settings to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load settings from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings from {:?}", path.as_ref()))?;

        let settings: Self =
            serde_json::from_str(&content).context("Failed to parse settings JSON")?;

        Ok(settings)
    }

    /// Load from `path` when given, otherwise defaults; then apply the
    /// environment and validate
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env_token(std::env::var(TOKEN_ENV_VAR).ok());
        settings.validate()?;
        Ok(settings)
    }

    /// A non-empty token from the environment wins over the file
    pub fn apply_env_token(&mut self, token: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.token = Some(token);
        }
    }

    pub fn filter_debounce(&self) -> Duration {
        Duration::from_millis(self.filter_debounce_ms)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        for (field, url) in [
            ("image_builder_url", &self.image_builder_url),
            ("content_sources_url", &self.content_sources_url),
        ] {
            if url.trim().is_empty() {
                anyhow::bail!("{} must be specified", field);
            }
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("{} must be an http or https URL, got {:?}", field, url);
            }
        }

        if !(1..=MAX_PER_PAGE).contains(&self.per_page) {
            anyhow::bail!("per_page must be between 1 and {}", MAX_PER_PAGE);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.per_page, 10);
        assert_eq!(settings.filter_debounce(), Duration::from_millis(500));
        assert!(!settings.on_premise);
        assert!(settings.token.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(br#"{"per_page": 25}"#).unwrap();
        temp_file.flush().unwrap();

        let settings = Settings::load_from_file(temp_file.path()).unwrap();
        assert_eq!(settings.per_page, 25);
        assert_eq!(settings.image_builder_url, DEFAULT_IMAGE_BUILDER_URL);
    }

    #[test]
    fn test_load_invalid_json() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"{ invalid json }").unwrap();
        temp_file.flush().unwrap();

        assert!(Settings::load_from_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_validation_rejects_bad_url_and_page_size() {
        let settings = Settings {
            content_sources_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = Settings {
            per_page: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_env_token_overrides_file() {
        let mut settings = Settings {
            token: Some("from-file".to_string()),
            ..Default::default()
        };
        settings.apply_env_token(Some(" ".to_string()));
        assert_eq!(settings.token.as_deref(), Some("from-file"));
        settings.apply_env_token(Some("from-env".to_string()));
        assert_eq!(settings.token.as_deref(), Some("from-env"));
    }
}
