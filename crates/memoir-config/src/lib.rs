use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Simple configuration for memoir
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Identity that scopes stories. Unset means signed out.
    #[serde(default)]
    pub identity: Option<String>,

    /// Override for the data directory (documents, blobs, pending queue).
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Coalescing window for the full feed, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    2_000
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path();

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            // Create default config file
            let config = Config::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(&config)?;
            std::fs::write(&path, content)?;
            Ok(config)
        }
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "memoir", "memoir") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.memoir/config.toml")
        }
    }

    /// Resolved data directory.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        if let Some(dirs) = directories::ProjectDirs::from("com", "memoir", "memoir") {
            dirs.data_dir().to_path_buf()
        } else {
            PathBuf::from(".memoir")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.identity.is_none());
        assert_eq!(config.feed.debounce_ms, 2_000);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config {
            identity: Some("alice".to_string()),
            ..Config::default()
        };
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.identity.as_deref(), Some("alice"));
        assert_eq!(parsed.feed.debounce_ms, config.feed.debounce_ms);
    }

    #[test]
    fn test_missing_feed_section_gets_defaults() {
        let parsed: Config = toml::from_str("identity = \"alice\"").unwrap();
        assert_eq!(parsed.feed.debounce_ms, 2_000);
    }
}
