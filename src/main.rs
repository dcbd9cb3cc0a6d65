//! Plugsync - plugin catalog synchronizer.
//!
//! Registers a plugin from a local development path or a published
//! repository URL and reconciles the catalog's delivery links against
//! the plugin's manifest.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use plugsync::sync::{
    register_or_sync_plugin, HostConfig, HttpManifestFetcher, JsonFileStore, PluginLinkStore,
    PluginStore, RetryConfig, SyncContext,
};

/// Plugin catalog synchronizer
#[derive(Parser)]
#[command(name = "plugsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Path to the catalog file
    #[arg(long, global = true, default_value = "plugsync-catalog.json")]
    catalog: PathBuf,

    /// Path to a host configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a plugin or re-sync an already registered one
    Sync {
        /// Local development path or repository URL
        location: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List the plugins in the catalog with their delivery links
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") };
    tracing_subscriber::registry().with(fmt::layer().with_target(false)).with(filter).init();

    let hosts = match &cli.config {
        Some(path) => HostConfig::from_file(path)
            .with_context(|| format!("failed to load host config from {}", path.display()))?,
        None => HostConfig::default(),
    };

    let store = Arc::new(
        JsonFileStore::open(&cli.catalog)
            .with_context(|| format!("failed to open catalog at {}", cli.catalog.display()))?,
    );

    match cli.command {
        Commands::Sync { location, format } => {
            let ctx = SyncContext {
                plugins: store.clone(),
                links: store,
                fetcher: Arc::new(HttpManifestFetcher::new()?),
                hosts,
                retry: RetryConfig::default(),
            };

            let outcome = register_or_sync_plugin(&ctx, &location).await?;

            if format == "json" {
                let body = serde_json::json!({
                    "plugin": outcome.plugin,
                    "links": outcome.links,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!(
                    "{} v{} ({})",
                    outcome.plugin.name, outcome.plugin.version, outcome.plugin.url
                );
                println!(
                    "  {} link(s), {} operation(s) applied",
                    outcome.links.len(),
                    outcome.operations.len()
                );
                for link in &outcome.links {
                    println!("  [{}/{}] {}", link.platform, link.link_type, link.url);
                }
            }
        }
        Commands::List { format } => {
            let plugins = store.list().await?;

            if format == "json" {
                let mut entries = Vec::new();
                for plugin in &plugins {
                    let links = store.find_by_plugin(plugin.uuid).await?;
                    entries.push(serde_json::json!({ "plugin": plugin, "links": links }));
                }
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if plugins.is_empty() {
                println!("Catalog is empty.");
            } else {
                for plugin in &plugins {
                    println!("{} v{} ({})", plugin.name, plugin.version, plugin.url);
                    for link in store.find_by_plugin(plugin.uuid).await? {
                        println!("  [{}/{}] {}", link.platform, link.link_type, link.url);
                    }
                }
            }
        }
    }

    Ok(())
}
