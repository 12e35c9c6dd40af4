//! CLI command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::Path;
use std::sync::Arc;

use crate::cli::summary::{describe_outcome, render_layout, render_summary};
use crate::config::{Config, ConfigLoader, get_config_value, paths, set_config_value};
use crate::decode::wire::{WireEvent, WireNode};
use crate::decode::{decode_compressed_tree, decode_event, decode_node};
use crate::graph::{Direction, LayoutScheduler, TreeLayout};
use crate::models::ResourceNode;
use crate::realtime::{MessageRouter, RouteOutcome};
use crate::services::{HttpBackend, ResourceAction, ResourceService};

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get configuration value
    Get {
        /// Configuration key (e.g., "apiUrl", "layout.direction")
        key: Option<String>,
    },
    /// Set configuration value
    Set {
        /// Configuration key (e.g., "apiUrl", "layout.direction")
        key: String,
        /// Configuration value
        value: String,
    },
    /// List all configuration
    List,
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate,
}

/// Handle configuration subcommands
pub fn handle_config_command(cmd: ConfigSubcommand) -> Result<()> {
    match cmd {
        ConfigSubcommand::Get { key } => {
            let config = ConfigLoader::load().context("Failed to load configuration")?;
            if let Some(key) = key {
                println!("{}", get_config_value(&config, &key)?);
            } else {
                let yaml =
                    serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
                print!("{}", yaml);
            }
        }
        ConfigSubcommand::Set { key, value } => {
            let mut config = ConfigLoader::load().unwrap_or_else(|e| {
                tracing::warn!("Starting from defaults: {:#}", e);
                ConfigLoader::load_defaults()
            });
            set_config_value(&mut config, &key, &value)
                .with_context(|| format!("Failed to set {} = {}", key, value))?;
            ConfigLoader::save_root(&config).context("Failed to save configuration")?;
            println!("Configuration saved");
        }
        ConfigSubcommand::List => {
            let config = ConfigLoader::load().context("Failed to load configuration")?;
            let yaml =
                serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
            print!("{}", yaml);
        }
        ConfigSubcommand::Path => {
            println!("{}", paths::root_config_path().display());
        }
        ConfigSubcommand::Validate => {
            ConfigLoader::load().context("Configuration validation failed")?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}

/// Read a snapshot file: plain tree JSON, or the compressed realtime form
pub fn load_snapshot(path: &Path) -> Result<ResourceNode> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
    let trimmed = contents.trim();
    let root = if trimmed.starts_with('{') {
        let wire: WireNode = serde_json::from_str(trimmed)
            .with_context(|| format!("Failed to parse snapshot: {}", path.display()))?;
        decode_node(wire)
    } else {
        decode_compressed_tree(trimmed)
    };
    root.with_context(|| format!("Failed to decode snapshot: {}", path.display()))
}

fn router_for(config: &Config, snapshot: Option<&Path>) -> Result<MessageRouter> {
    let mut router = MessageRouter::new(config.tree_store(), config.event_store());
    if let Some(path) = snapshot {
        router.store_mut().replace_tree(load_snapshot(path)?);
    }
    Ok(router)
}

/// Feed newline-delimited envelopes through the router
pub fn replay(router: &mut MessageRouter, messages: &str) -> Vec<RouteOutcome> {
    messages
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| router.handle_text(line))
        .collect()
}

pub fn handle_summary(config: &Config, snapshot: &Path, events: Option<&Path>) -> Result<()> {
    let mut router = router_for(config, Some(snapshot))?;
    if let Some(path) = events {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read events: {}", path.display()))?;
        let wire: Vec<WireEvent> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse events: {}", path.display()))?;
        let decoded = wire
            .into_iter()
            .map(decode_event)
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to decode events")?;
        router.events_mut().set_events(decoded);
    }
    print!("{}", render_summary(router.store(), router.events()));
    Ok(())
}

pub fn handle_layout(
    config: &Config,
    snapshot: &Path,
    root: Option<&str>,
    direction: Option<Direction>,
) -> Result<()> {
    let router = router_for(config, Some(snapshot))?;
    let mut options = config.layout_options();
    if let Some(direction) = direction {
        options.direction = direction;
    }
    let scheduler = LayoutScheduler::new(
        Arc::new(TreeLayout),
        config.projection_options(),
        options,
    );
    let layout = scheduler.layout_now(router.store(), root.unwrap_or_default())?;
    print!("{}", render_layout(&layout));
    Ok(())
}

pub fn handle_replay(config: &Config, snapshot: Option<&Path>, messages: &Path) -> Result<()> {
    let mut router = router_for(config, snapshot)?;
    let contents = std::fs::read_to_string(messages)
        .with_context(|| format!("Failed to read messages: {}", messages.display()))?;
    for (index, outcome) in replay(&mut router, &contents).iter().enumerate() {
        println!("{:>4}: {}", index + 1, describe_outcome(outcome));
    }
    println!();
    print!("{}", render_summary(router.store(), router.events()));
    Ok(())
}

fn service_for(config: &Config) -> Result<ResourceService> {
    let backend = HttpBackend::new(&config.api_url, config.request_timeout())?;
    Ok(ResourceService::new(Arc::new(backend)))
}

/// Load tree and events from the backend and print the summary
pub async fn handle_fetch(config: &Config) -> Result<()> {
    let service = service_for(config)?;
    let mut router = MessageRouter::new(config.tree_store(), config.event_store());
    service.load_tree(router.store_mut()).await?;
    service.load_events(router.events_mut()).await?;
    print!("{}", render_summary(router.store(), router.events()));
    Ok(())
}

pub async fn handle_describe(config: &Config, uid: &str) -> Result<()> {
    let service = service_for(config)?;
    print!("{}", service.describe(uid).await?);
    Ok(())
}

/// Request reconcile/suspend/resume for one resource
pub async fn handle_action(config: &Config, action: ResourceAction, uid: &str) -> Result<()> {
    let service = service_for(config)?;
    let mut store = config.tree_store();
    service.load_tree(&mut store).await?;
    service
        .run_action(&mut store, action, uid)
        .await
        .with_context(|| format!("Failed to {} {}", action, uid))?;
    println!("Requested {} for {}", action, uid);
    Ok(())
}
