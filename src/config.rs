use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{ConsoleError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    /// Environment variable holding the login token.
    pub token_env: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4567".to_string(),
            token_env: "WSITE_TOKEN".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Drop responses belonging to a superseded dispatch.
    pub discard_stale_responses: bool,
    pub remember_locations: bool,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            discard_stale_responses: true,
            remember_locations: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub lists: ListConfig,
}

fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("wsite-console").join("config.toml"))
}

impl Config {
    /// Load from `path`, or from the platform config directory when `None`.
    /// A missing or broken file yields the defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match config_path() {
                Some(p) => p,
                None => return Config::default(),
            },
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            return Config::default();
        };

        match Self::parse(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring config file: {}", e);
                Config::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConsoleError::Config(e.to_string()))
    }

    /// Resolve the login token: explicit value first, then the configured
    /// environment variable.
    pub fn resolve_token(&self, explicit: Option<String>) -> Option<String> {
        explicit.filter(|t| !t.is_empty()).or_else(|| {
            std::env::var(&self.server.token_env)
                .ok()
                .filter(|t| !t.is_empty())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[server]
base_url = "https://cms.example.org"
token_env = "CMS_TOKEN"

[lists]
discard_stale_responses = false
remember_locations = false
"#;
        let config = Config::parse(toml_str).unwrap();
        assert_eq!(config.server.base_url, "https://cms.example.org");
        assert_eq!(config.server.token_env, "CMS_TOKEN");
        assert!(!config.lists.discard_stale_responses);
        assert!(!config.lists.remember_locations);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config = Config::parse("[server]\nbase_url = \"http://10.0.0.2:8080\"\n").unwrap();
        assert_eq!(config.server.base_url, "http://10.0.0.2:8080");
        assert_eq!(config.server.token_env, "WSITE_TOKEN");
        assert!(config.lists.discard_stale_responses);
    }

    #[test]
    fn invalid_config_is_an_error() {
        let err = Config::parse("[server\nbase_url = 3").unwrap_err();
        assert!(matches!(err, ConsoleError::Config(_)));
    }

    #[test]
    fn missing_file_uses_default() {
        let config = Config::load(Some(Path::new("/nonexistent/wsite-console.toml")));
        assert_eq!(config.server.base_url, "http://localhost:4567");
    }

    #[test]
    fn explicit_token_wins() {
        let config = Config::default();
        assert_eq!(
            config.resolve_token(Some("abc".to_string())),
            Some("abc".to_string())
        );
    }

    #[test]
    fn empty_token_falls_through_to_env() {
        let mut config = Config::default();
        config.server.token_env = "WSITE_CONSOLE_TEST_TOKEN_UNSET".to_string();
        assert_eq!(config.resolve_token(Some(String::new())), None);
    }
}
