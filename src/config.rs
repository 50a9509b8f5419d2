use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Result, ScoutError};
use crate::scoring::CorrelationConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub max_records_per_kind: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/audit.json"),
            max_records_per_kind: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub solana_rpc_url: String,
    pub dexscreener_base: String,
    pub timeout_ms: u64,
    pub social_fixture_path: PathBuf,
    pub memes_path: PathBuf,
    /// Chain facts served in offline mode.
    #[serde(default = "default_tokens_path")]
    pub tokens_path: PathBuf,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            solana_rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            dexscreener_base: "https://api.dexscreener.com".to_string(),
            timeout_ms: 8000,
            social_fixture_path: PathBuf::from("data/social.json"),
            memes_path: PathBuf::from("data/memes.json"),
            tokens_path: default_tokens_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub providers: ProviderConfig,
    pub correlation: CorrelationConfig,
}

impl ScoutConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>)> {
        let config_path = path.or_else(default_config_path);
        let mut config = if let Some(path) = config_path.as_ref() {
            if path.exists() {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| ScoutError::Config(format!("failed to read {}: {}", path.display(), err)))?;
                toml::from_str(&contents)
                    .map_err(|err| ScoutError::Config(format!("failed to parse {}: {}", path.display(), err)))?
            } else {
                ScoutConfig::default()
            }
        } else {
            ScoutConfig::default()
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| ScoutError::Config(format!("failed to create config dir: {}", err)))?;
        }
        let payload = toml::to_string_pretty(self)
            .map_err(|err| ScoutError::Config(format!("failed to serialize config: {}", err)))?;
        std::fs::write(path, payload)
            .map_err(|err| ScoutError::Config(format!("failed to write config: {}", err)))?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Some(host) = non_empty_var("SCOUT_HOST") {
            self.server.host = host;
        }
        if let Some(port) = parsed_var::<u16>("SCOUT_PORT") {
            self.server.port = port;
        }
        if let Some(path) = non_empty_var("SCOUT_STORE_PATH") {
            self.store.path = PathBuf::from(path);
        }
        if let Some(url) = non_empty_var("SOLANA_RPC_URL") {
            self.providers.solana_rpc_url = url;
        }
        if let Some(base) = non_empty_var("DEXSCREENER_API_BASE") {
            self.providers.dexscreener_base = base;
        }
        if let Some(timeout) = parsed_var::<u64>("SCOUT_PROVIDER_TIMEOUT_MS") {
            self.providers.timeout_ms = timeout;
        }
        if let Some(path) = non_empty_var("SCOUT_SOCIAL_PATH") {
            self.providers.social_fixture_path = PathBuf::from(path);
        }
        if let Some(path) = non_empty_var("SCOUT_MEMES_PATH") {
            self.providers.memes_path = PathBuf::from(path);
        }
        if let Some(path) = non_empty_var("SCOUT_TOKENS_PATH") {
            self.providers.tokens_path = PathBuf::from(path);
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parsed_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    non_empty_var(key).and_then(|value| value.trim().parse::<T>().ok())
}

fn default_tokens_path() -> PathBuf {
    PathBuf::from("data/tokens.json")
}

fn default_config_path() -> Option<PathBuf> {
    non_empty_var("SCOUT_CONFIG_PATH")
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/scout.toml")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: ScoutConfig = toml::from_str(
            r#"
            [correlation]
            min_correlation = 0.2
            persist_threshold = 0.3
            opportunity_threshold = 0.6
            "#,
        )
        .unwrap();
        assert!((config.correlation.min_correlation - 0.2).abs() < 1e-12);
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.store.path, PathBuf::from("data/audit.json"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = env::temp_dir().join("meme-scout-missing-config.toml");
        let (config, resolved) = ScoutConfig::load(Some(path.clone())).unwrap();
        assert_eq!(resolved, Some(path));
        assert_eq!(config.providers.timeout_ms, 8000);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let path = env::temp_dir().join("meme-scout-malformed-config.toml");
        std::fs::write(&path, "[server\nport = \"eighty\"").unwrap();
        let err = ScoutConfig::load(Some(path.clone())).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert!(matches!(err, ScoutError::Config(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn written_config_loads_back() {
        let path = env::temp_dir().join("meme-scout-roundtrip-config.toml");
        let mut config = ScoutConfig::default();
        config.server.port = 9911;
        config.write(&path).unwrap();
        let (loaded, _) = ScoutConfig::load(Some(path.clone())).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.server.port, 9911);
    }
}
