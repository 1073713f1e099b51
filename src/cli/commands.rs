//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Configuration-driven API harvesting engine
#[derive(Parser, Debug)]
#[command(name = "harvester")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding descriptor YAML files
    #[arg(short, long, global = true, default_value = "configs")]
    pub config_dir: PathBuf,

    /// Auth parameter spliced into `{{}}` placeholders (repeatable)
    #[arg(long = "auth-param", global = true)]
    pub auth_params: Vec<String>,

    /// Peek parameter spliced into `{{}}` placeholders (repeatable)
    #[arg(long = "peek-param", global = true)]
    pub peek_params: Vec<String>,

    /// Parameter handed to the post-process hook (repeatable)
    #[arg(long = "post-param", global = true)]
    pub post_params: Vec<String>,

    /// Runtime parameter overrides as inline JSON
    /// (endpoint -> section -> key -> value)
    #[arg(long, global = true)]
    pub runtime_params: Option<String>,

    /// Dashboard API key
    #[arg(long, global = true, default_value = "")]
    pub api_key: String,

    /// Dashboard API secret
    #[arg(long, global = true, default_value = "")]
    pub api_secret: String,

    /// Dashboard plugin id
    #[arg(long, global = true, default_value = "0")]
    pub plugin_id: i64,

    /// Write the merged document here instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a full scan across every descriptor
    Scan,

    /// Probe connection-check endpoints only
    Check,

    /// List the registered adapter plugins
    Plugins,
}
