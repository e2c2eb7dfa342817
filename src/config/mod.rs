mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    expand_paths(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./config.toml",
        "./cinestream.toml",
        "~/.config/cinestream/config.toml",
        "/etc/cinestream/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

fn expand_paths(config: &mut Config) {
    let dir = config.storage.assets_dir.to_string_lossy();
    let expanded = shellexpand::tilde(dir.as_ref()).into_owned();
    config.storage.assets_dir = expanded.into();
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.storage.chunk_size == 0 {
        anyhow::bail!("Storage chunk size cannot be 0");
    }

    for origin in &config.server.cors.allowed_origins {
        if origin.parse::<axum::http::HeaderValue>().is_err() {
            anyhow::bail!("Invalid CORS origin: {:?}", origin);
        }
    }

    if !config.storage.assets_dir.is_dir() {
        tracing::warn!(
            "Assets directory does not exist: {:?}",
            config.storage.assets_dir
        );
    }

    Ok(())
}
