mod cli;

use cinestream::{
    config, server,
    streaming::{AssetByteServer, FsAssetStore},
};
use cinestream_common::{AssetId, Error};
use cinestream_media::range::unsatisfied_content_range;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::sync::Arc;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    assets: Option<PathBuf>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // CLI flags win over the config file
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(assets) = assets {
        config.storage.assets_dir = assets;
    }
    config::validate_config(&config)?;

    tracing::info!("Starting Cinestream server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    server::start_server(config).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "cinestream=trace,cinestream_media=trace,cinestream_common=debug,tower_http=debug"
                .to_string()
        } else {
            "cinestream=debug,cinestream_media=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Start { host, port, assets } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, assets, cli.config.as_deref()))
        }
        Commands::Inspect {
            asset_id,
            range,
            assets,
            json,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(inspect_asset(
                &asset_id,
                range.as_deref(),
                assets,
                cli.config.as_deref(),
                json,
            ))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("cinestream {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn inspect_asset(
    asset_id: &str,
    range: Option<&str>,
    assets: Option<PathBuf>,
    config_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let assets_dir = assets.unwrap_or(config.storage.assets_dir);

    let id: AssetId = asset_id
        .parse()
        .with_context(|| format!("Invalid asset id: {:?}", asset_id))?;
    let store = FsAssetStore::new(assets_dir);
    let server = AssetByteServer::new(Arc::new(store), config.storage.chunk_size);

    let meta = match server.describe(&id, range).await {
        Ok(meta) => meta,
        Err(Error::RangeNotSatisfiable { total }) => {
            println!("Status: 416 Range Not Satisfiable");
            println!("Content-Range: {}", unsatisfied_content_range(total));
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to resolve asset"),
    };

    if json {
        let out = serde_json::json!({
            "asset": meta.asset,
            "status": meta.status().as_u16(),
            "start": meta.range.start,
            "end": meta.range.end,
            "length": meta.range.length,
            "content_range": meta.range.content_range(meta.asset.total_size_bytes),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Asset: {}", meta.asset.id);
    println!("Size: {} bytes", meta.asset.total_size_bytes);
    println!("Type: {}", meta.asset.mime_type);
    println!("Status: {}", meta.status());
    println!("Content-Length: {}", meta.range.length);
    if let Some(content_range) = meta.range.content_range(meta.asset.total_size_bytes) {
        println!("Content-Range: {}", content_range);
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  CORS enabled: {}", config.server.cors.enabled);
            println!("  Assets: {:?}", config.storage.assets_dir);
            println!("  Chunk size: {} bytes", config.storage.chunk_size);
            println!("  Cache max-age: {}s", config.storage.cache_max_age_secs);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Assets: {:?}", config.storage.assets_dir);
        }
    }

    Ok(())
}
