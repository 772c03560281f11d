use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::label::LabelOptions;

pub const SUPABASE_URL: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required keys are missing. The settings that do not depend on them are
    /// still resolved so the server can report the problem where it is expected.
    #[error("Missing required configuration: {}", .keys.join(", "))]
    Missing {
        keys: Vec<&'static str>,
        listen_addr: String,
        log_dir: String,
    },
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse TOML from config file at {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid [label] configuration: {0}")]
    InvalidLabel(String),
    #[error("Failed to load config from environment: {0}")]
    Env(#[from] envy::Error),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub storage_bucket: String,
    pub listen_addr: String,
    pub log_dir: String,
    pub label: LabelOptions,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialAppConfig {
    supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
    storage_bucket: Option<String>,
    listen_addr: Option<String>,
    log_dir: Option<String>,
    /// Only read from the file; the environment layer leaves it unset.
    label: Option<LabelOptions>,
}

fn default_storage_bucket() -> String {
    "tool-photos".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Loads `.env`, then the optional TOML file, then the process environment.
    /// Environment values override the file.
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let env_config = envy::from_env::<PartialAppConfig>()?;
        Self::from_layers(config_path, env_config)
    }

    fn from_layers(config_path: Option<&str>, env_config: PartialAppConfig) -> Result<Self, ConfigError> {
        let file: PartialAppConfig = match config_path.map(Path::new) {
            Some(path) if path.exists() => {
                let display = path.display().to_string();
                let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: display.clone(),
                    source,
                })?;
                toml::from_str::<PartialAppConfig>(&contents).map_err(|source| ConfigError::Parse {
                    path: display,
                    source,
                })?
            }
            _ => PartialAppConfig::default(),
        };

        let listen_addr = present(env_config.listen_addr)
            .or(present(file.listen_addr))
            .unwrap_or_else(default_listen_addr);
        let log_dir = present(env_config.log_dir)
            .or(present(file.log_dir))
            .unwrap_or_else(default_log_dir);

        let supabase_url = present(env_config.supabase_url).or(present(file.supabase_url));
        let supabase_anon_key = present(env_config.supabase_anon_key).or(present(file.supabase_anon_key));

        let (supabase_url, supabase_anon_key) = match (supabase_url, supabase_anon_key) {
            (Some(url), Some(key)) => (url, key),
            (url, key) => {
                let mut keys = Vec::new();
                if url.is_none() {
                    keys.push(SUPABASE_URL);
                }
                if key.is_none() {
                    keys.push(SUPABASE_ANON_KEY);
                }
                return Err(ConfigError::Missing {
                    keys,
                    listen_addr,
                    log_dir,
                });
            }
        };

        let label = file.label.unwrap_or_default();
        label.validate().map_err(ConfigError::InvalidLabel)?;

        Ok(AppConfig {
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            supabase_anon_key,
            storage_bucket: present(env_config.storage_bucket)
                .or(present(file.storage_bucket))
                .unwrap_or_else(default_storage_bucket),
            listen_addr,
            log_dir,
            label,
        })
    }
}
