use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_FILE: &str = ".gh-sampler.toml";

const DEFAULT_API_BASE: &str = "https://api.github.com";
const DEFAULT_USER_AGENT: &str = "vulnrisk/1.0";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .gh-sampler.toml.
/// All sections are optional — the tool works with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// GitHub API access settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Sample cache sizing and expiry
    #[serde(default)]
    pub cache: CacheConfig,

    /// Batch fetch pacing
    #[serde(default)]
    pub batch: BatchConfig,

    /// HTTP server settings for `serve`
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    /// Without a token requests are unauthenticated and get the lower public rate limit.
    pub token: Option<String>,
    /// REST API root, overridable with GITHUB_API_BASE_URL.
    pub api_base: String,
    pub user_agent: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: DEFAULT_API_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
        }
    }
}

impl GitHubConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    /// Upper bound on cached samples; the least recently used entry is evicted first.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 600,
            max_entries: 1024,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum upstream requests in flight during a batch
    pub concurrency: usize,
    /// Pause between consecutive groups, in milliseconds
    pub delay_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            delay_ms: 200,
        }
    }
}

impl BatchConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }
}

impl Config {
    /// Load configuration from .gh-sampler.toml in the current directory.
    /// Returns default config if the file doesn't exist, then applies
    /// GITHUB_TOKEN and GITHUB_API_BASE_URL from the environment.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            Config::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Token from the config file takes precedence over GITHUB_TOKEN;
    /// GITHUB_API_BASE_URL always wins over the file.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.github.token.is_none() {
            self.github.token = lookup("GITHUB_TOKEN").filter(|t| !t.is_empty());
        }
        if let Some(base) = lookup("GITHUB_API_BASE_URL").filter(|b| !b.is_empty()) {
            self.github.api_base = base;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.github.token.is_none());
        assert_eq!(config.github.api_base, "https://api.github.com");
        assert_eq!(config.github.user_agent, "vulnrisk/1.0");
        assert_eq!(config.cache.ttl(), Duration::from_secs(600));
        assert_eq!(config.batch.concurrency, 5);
        assert_eq!(config.batch.delay(), Duration::from_millis(200));
        assert_eq!(config.server.listen.port(), 3000);
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[github]
token = "ghp_test"
timeout_secs = 5

[cache]
max_entries = 10

[batch]
delay_ms = 50

[server]
listen = "0.0.0.0:8080"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.github.token.as_deref(), Some("ghp_test"));
        assert_eq!(config.github.timeout(), Duration::from_secs(5));
        // Unset keys inside a present section keep their defaults
        assert_eq!(config.github.api_base, "https://api.github.com");
        assert_eq!(config.cache.max_entries, 10);
        assert_eq!(config.cache.ttl_secs, 600);
        assert_eq!(config.batch.delay_ms, 50);
        assert_eq!(config.batch.concurrency, 5);
        assert_eq!(config.server.listen.port(), 8080);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("gh_sampler_test_config.toml");
        std::fs::write(&path, "[cache]\nttl_secs = 60\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.cache.ttl_secs, 60);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let path = std::env::temp_dir().join("gh_sampler_bad_config.toml");
        std::fs::write(&path, "[cache\nttl_secs = ").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_env_token_fills_missing_token() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            "GITHUB_TOKEN" => Some("from-env".to_string()),
            _ => None,
        });
        assert_eq!(config.github.token.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_file_token_wins_over_env() {
        let mut config = Config::default();
        config.github.token = Some("from-file".to_string());
        config.apply_env(|key| match key {
            "GITHUB_TOKEN" => Some("from-env".to_string()),
            "GITHUB_API_BASE_URL" => Some("http://localhost:9999".to_string()),
            _ => None,
        });
        assert_eq!(config.github.token.as_deref(), Some("from-file"));
        assert_eq!(config.github.api_base, "http://localhost:9999");
    }

    #[test]
    fn test_empty_env_token_is_ignored() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            "GITHUB_TOKEN" => Some(String::new()),
            _ => None,
        });
        assert!(config.github.token.is_none());
    }
}
