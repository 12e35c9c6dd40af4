//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod commands;
mod logging;
pub mod summary;

pub use commands::{
    ConfigSubcommand, handle_action, handle_config_command, handle_describe, handle_fetch,
    handle_layout, handle_replay, handle_summary, load_snapshot, replay,
};
pub use logging::init_logging;
