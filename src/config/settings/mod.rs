
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub select: SelectConfig,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_url: String,
    /// Page size for organization repository listings. Only the first page is fetched.
    pub org_page_size: u32,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            org_page_size: 100,
            user_agent: "repo-router".to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingsConfig {
    pub api_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-ada-002".to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectConfig {
    pub debounce_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_visible: Option<usize>,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            max_visible: None,
        }
    }
}

/// API secrets. These never live in `config.toml`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub github_token: String,
    pub openai_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("github_token", &"<redacted>")
            .field("openai_api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found or could not be created")]
    DirectoryError,
    #[error("Missing required credential: {0} is not set")]
    MissingCredential(&'static str),
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid organization page size: {0} (must be between 1 and 100)")]
    InvalidPageSize(u32),
    #[error("Invalid user agent: cannot be empty")]
    InvalidUserAgent,
    #[error("Invalid model name: {0} (cannot be empty)")]
    InvalidModel(String),
    #[error("Invalid request timeout: {0} (must be between 1 and 300 seconds)")]
    InvalidTimeout(u64),
    #[error("Invalid debounce delay: {0}ms (must be between 1 and 10000)")]
    InvalidDebounce(u64),
    #[error("Invalid visible option limit: {0} (must be at least 1)")]
    InvalidMaxVisible(usize),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Config {
    #[inline]
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join("config.toml");

        if !config_path.exists() {
            return Ok(Self {
                base_dir: config_dir.as_ref().to_path_buf(),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        config.base_dir = config_dir.as_ref().to_path_buf();

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    #[inline]
    pub fn save(&self) -> Result<()> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        let config_dir = self.get_base_dir();

        fs::create_dir_all(config_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                config_dir.display()
            )
        })?;

        let config_path = self.config_file_path();
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// Default configuration directory, `~/.repo-router`
    #[inline]
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(".repo-router"))
            .or_else(|| dirs::config_dir().map(|dir| dir.join("repo-router")))
            .ok_or(ConfigError::DirectoryError)
    }

    #[inline]
    pub fn get_base_dir(&self) -> &Path {
        &self.base_dir
    }

    #[inline]
    pub fn config_file_path(&self) -> PathBuf {
        self.get_base_dir().join("config.toml")
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.github.validate()?;
        self.embeddings.validate()?;
        self.select.validate()?;
        Ok(())
    }
}

impl GitHubConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;

        if !(1..=100).contains(&self.org_page_size) {
            return Err(ConfigError::InvalidPageSize(self.org_page_size));
        }

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidUserAgent);
        }

        if !(1..=300).contains(&self.timeout_seconds) {
            return Err(ConfigError::InvalidTimeout(self.timeout_seconds));
        }

        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        parse_api_url(&self.api_url)
    }

    pub fn set_api_url(&mut self, api_url: String) -> Result<(), ConfigError> {
        parse_api_url(&api_url)?;
        self.api_url = api_url;
        Ok(())
    }

    pub fn set_org_page_size(&mut self, size: u32) -> Result<(), ConfigError> {
        if !(1..=100).contains(&size) {
            return Err(ConfigError::InvalidPageSize(size));
        }
        self.org_page_size = size;
        Ok(())
    }

    pub fn set_timeout_seconds(&mut self, timeout: u64) -> Result<(), ConfigError> {
        if !(1..=300).contains(&timeout) {
            return Err(ConfigError::InvalidTimeout(timeout));
        }
        self.timeout_seconds = timeout;
        Ok(())
    }
}

impl EmbeddingsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;

        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.model.clone()));
        }

        if !(1..=300).contains(&self.timeout_seconds) {
            return Err(ConfigError::InvalidTimeout(self.timeout_seconds));
        }

        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        parse_api_url(&self.api_url)
    }

    pub fn set_api_url(&mut self, api_url: String) -> Result<(), ConfigError> {
        parse_api_url(&api_url)?;
        self.api_url = api_url;
        Ok(())
    }

    pub fn set_model(&mut self, model: String) -> Result<(), ConfigError> {
        if model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(model));
        }
        self.model = model;
        Ok(())
    }

    pub fn set_timeout_seconds(&mut self, timeout: u64) -> Result<(), ConfigError> {
        if !(1..=300).contains(&timeout) {
            return Err(ConfigError::InvalidTimeout(timeout));
        }
        self.timeout_seconds = timeout;
        Ok(())
    }
}

impl SelectConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=10_000).contains(&self.debounce_ms) {
            return Err(ConfigError::InvalidDebounce(self.debounce_ms));
        }

        if self.max_visible == Some(0) {
            return Err(ConfigError::InvalidMaxVisible(0));
        }

        Ok(())
    }

    pub fn set_debounce_ms(&mut self, debounce_ms: u64) -> Result<(), ConfigError> {
        if !(1..=10_000).contains(&debounce_ms) {
            return Err(ConfigError::InvalidDebounce(debounce_ms));
        }
        self.debounce_ms = debounce_ms;
        Ok(())
    }

    pub fn set_max_visible(&mut self, max_visible: Option<usize>) -> Result<(), ConfigError> {
        if max_visible == Some(0) {
            return Err(ConfigError::InvalidMaxVisible(0));
        }
        self.max_visible = max_visible;
        Ok(())
    }
}

impl Credentials {
    /// Read both secrets from the process environment
    #[inline]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read both secrets through `lookup`. Blank values count as missing.
    #[inline]
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &'static str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::MissingCredential(key))
        };

        Ok(Self {
            github_token: read(GITHUB_TOKEN_VAR)?,
            openai_api_key: read(OPENAI_API_KEY_VAR)?,
        })
    }
}

/// Parse an API root, keeping a trailing slash so `Url::join` appends to its path
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };

    let url = Url::parse(&normalized).map_err(|_| ConfigError::InvalidUrl(raw.to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::InvalidUrl(raw.to_string())),
    }
}
