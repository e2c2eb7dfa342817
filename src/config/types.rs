use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors: CorsConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: CorsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    /// Attach CORS headers to asset responses
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Allowed origins (empty = any origin)
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding `{id}.{ext}` asset files
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    /// Read buffer size when streaming asset bytes
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// `Cache-Control: max-age` sent with asset responses
    #[serde(default = "default_cache_max_age")]
    pub cache_max_age_secs: u64,
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("./assets")
}
fn default_chunk_size() -> usize {
    64 * 1024
}
fn default_cache_max_age() -> u64 {
    3600
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            assets_dir: default_assets_dir(),
            chunk_size: default_chunk_size(),
            cache_max_age_secs: default_cache_max_age(),
        }
    }
}
