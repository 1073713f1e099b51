//! CLI module
//!
//! Command-line interface for running harvests.
//!
//! # Commands
//!
//! - `scan` - run a full scan across every descriptor
//! - `check` - probe connection-check endpoints only
//! - `plugins` - list registered adapter plugins

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
