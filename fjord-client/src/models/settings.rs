// Client configuration
//
// Layering (lowest to highest): built-in defaults, `fjord-client.toml` files, an explicit
// `--config` file, then `FJORD_*` environment variables.

use crate::utils::path_resolver;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid base_url {url:?}: {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub feedback_path: String,
    pub trigger_match_path: String,
    pub request_timeout_secs: u64,
    pub product: String,
    pub platform: String,
    pub locale: String,
    pub channel: String,
    pub user_agent: String,
    pub description_max_length: u32,
    pub cache_path: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            feedback_path: "/api/v1/feedback/".to_string(),
            trigger_match_path: "/api/v1/analytics/triggerrule/match/".to_string(),
            request_timeout_secs: 12,
            product: "Firefox OS".to_string(),
            platform: "Firefox OS".to_string(),
            locale: "en-US".to_string(),
            channel: String::new(),
            user_agent: format!("fjord-client/{}", env!("CARGO_PKG_VERSION")),
            description_max_length: 10000,
            cache_path: None,
            log_dir: None,
        }
    }
}

impl Settings {
    /// Load settings from the standard locations plus an optional explicit file.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut files = path_resolver::config_file_candidates();
        if let Some(p) = explicit {
            files.push(p.to_path_buf());
        }
        Self::load_from(&files, explicit)
    }

    fn load_from(files: &[PathBuf], required: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        for file in files {
            let is_required = required.map(|r| r == file.as_path()).unwrap_or(false);
            builder = builder.add_source(
                config::File::new(&file.to_string_lossy(), config::FileFormat::Toml)
                    .required(is_required),
            );
        }
        builder = builder.add_source(config::Environment::with_prefix("FJORD"));

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.base_url).map_err(|source| ConfigError::BaseUrl {
            url: self.base_url.clone(),
            source,
        })?;
        Ok(())
    }

    /// Absolute URL for an API path relative to `base_url`.
    pub fn endpoint(&self, path: &str) -> Result<url::Url, ConfigError> {
        let base = url::Url::parse(&self.base_url).map_err(|source| ConfigError::BaseUrl {
            url: self.base_url.clone(),
            source,
        })?;
        base.join(path).map_err(|source| ConfigError::BaseUrl {
            url: format!("{}{}", self.base_url, path),
            source,
        })
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache_path
            .clone()
            .unwrap_or_else(path_resolver::default_cache_path)
    }
}
