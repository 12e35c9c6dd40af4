//! fluxtree - live Flux resource tree from the command line
//!
//! Decodes tree snapshots, replays realtime message streams against the
//! tree store, projects graph layouts and drives reconcile/suspend/resume
//! through the backend HTTP API.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use fluxtree::cli::{self, ConfigSubcommand};
use fluxtree::config::ConfigLoader;
use fluxtree::graph::Direction;
use fluxtree::services::ResourceAction;

/// fluxtree - live Flux resource tree from the command line
#[derive(Parser, Debug)]
#[command(name = "fluxtree")]
#[command(about = "Inspect and act on the Flux resource tree", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Print the tree summary of a snapshot file
    Summary {
        /// Tree snapshot (JSON, or base64+gzip as sent over the realtime channel)
        snapshot: PathBuf,
        /// Optional JSON array of events
        #[arg(long)]
        events: Option<PathBuf>,
    },
    /// Project and lay out the graph rooted at a node
    Layout {
        snapshot: PathBuf,
        /// Node uid to root the graph at (defaults to the tree root)
        #[arg(long)]
        root: Option<String>,
        /// Layout direction: right or down
        #[arg(long)]
        direction: Option<Direction>,
    },
    /// Replay newline-delimited realtime messages against a snapshot
    Replay {
        /// Newline-delimited JSON envelopes
        messages: PathBuf,
        /// Starting tree (empty if omitted)
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
    /// Fetch tree and events from the backend and print the summary
    Fetch,
    /// Print the backend's description of a resource
    Describe { uid: String },
    /// Run an action on a Flux resource
    Action {
        #[arg(value_enum)]
        action: ActionArg,
        uid: String,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ActionArg {
    Reconcile,
    Suspend,
    Resume,
}

impl From<ActionArg> for ResourceAction {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Reconcile => ResourceAction::Reconcile,
            ActionArg::Suspend => ResourceAction::Suspend,
            ActionArg::Resume => ResourceAction::Resume,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Command::Config { subcommand } = args.command {
        return cli::handle_config_command(subcommand);
    }

    let log_file = cli::init_logging(args.debug)?;

    // stderr keeps stdout clean for command output
    if let Some(ref log_path) = log_file {
        eprintln!(
            "Debug logging enabled. Logs written to: {}",
            log_path.display()
        );
    }

    let config = ConfigLoader::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load configuration, using defaults: {:#}", e);
        ConfigLoader::load_defaults()
    });
    tracing::debug!(
        "Configuration loaded: apiUrl={}, fluxNamespace={}",
        config.api_url,
        config.flux_namespace
    );

    match args.command {
        Command::Summary { snapshot, events } => {
            cli::handle_summary(&config, &snapshot, events.as_deref())
        }
        Command::Layout {
            snapshot,
            root,
            direction,
        } => cli::handle_layout(&config, &snapshot, root.as_deref(), direction),
        Command::Replay { messages, snapshot } => {
            cli::handle_replay(&config, snapshot.as_deref(), &messages)
        }
        Command::Fetch => cli::handle_fetch(&config).await,
        Command::Describe { uid } => cli::handle_describe(&config, &uid).await,
        Command::Action { action, uid } => cli::handle_action(&config, action.into(), &uid).await,
        Command::Config { .. } => Ok(()),
    }
}
