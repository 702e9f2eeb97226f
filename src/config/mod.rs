use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Environment variable that overrides the API base URL
pub const API_URL_ENV: &str = "GARMENTFLOW_API_URL";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which API host to talk to
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApiProfile {
    Local,
    Deployed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_profile")]
    pub profile: ApiProfile,
    #[serde(default = "default_local_url")]
    pub local_url: String,
    #[serde(default = "default_deployed_url")]
    pub deployed_url: String,
    /// Explicit base URL, wins over the profile
    pub base_url: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            local_url: default_local_url(),
            deployed_url: default_deployed_url(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_profile() -> ApiProfile {
    ApiProfile::Local
}

fn default_local_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_deployed_url() -> String {
    "https://garmentflow-server.vercel.app".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl ApiConfig {
    /// Base URL without a trailing slash
    pub fn resolved_base_url(&self) -> String {
        let url = match (&self.base_url, self.profile) {
            (Some(url), _) if !url.trim().is_empty() => url.as_str(),
            (_, ApiProfile::Local) => self.local_url.as_str(),
            (_, ApiProfile::Deployed) => self.deployed_url.as_str(),
        };
        url.trim().trim_end_matches('/').to_string()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached query results (default: 256)
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
    /// Seconds before a cached result is considered stale (default: 300)
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_cache_capacity() -> usize {
    256
}

fn default_cache_ttl() -> u64 {
    300
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory for persisted preferences (default: ./data)
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
        }
    }
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)?
        } else {
            info!("No config file found, using defaults");
            Config::default()
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api.base_url = Some(url);
            }
        }

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).with_context(|| "Failed to parse configuration file")?;
        if config.cache.capacity == 0 {
            anyhow::bail!("cache.capacity must be at least 1");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.api.profile, ApiProfile::Local);
        assert_eq!(config.api.resolved_base_url(), "http://localhost:3000");
        assert_eq!(config.cache.capacity, 256);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_profile_selects_host() {
        let config = Config::parse(
            r#"
            [api]
            profile = "deployed"
            deployed_url = "https://api.example.com/"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.resolved_base_url(), "https://api.example.com");
    }

    #[test]
    fn test_base_url_overrides_profile() {
        let config = Config::parse(
            r#"
            [api]
            profile = "deployed"
            base_url = "http://10.0.0.5:5000"
            timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.api.resolved_base_url(), "http://10.0.0.5:5000");
        assert_eq!(config.api.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_rejects_zero_capacity() {
        assert!(Config::parse("[cache]\ncapacity = 0").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load(Path::new("/nonexistent/garmentflow.toml")).unwrap();
        assert_eq!(config.cache.ttl_secs, 300);
    }
}
