//! CLI command execution

use super::commands::{Cli, Commands};
use crate::adapter::AdapterRegistry;
use crate::engine::{HarvestOptions, Harvester};
use crate::error::{Error, Result};
use crate::types::RuntimeParams;

/// Executes a parsed CLI invocation
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a runner for a parsed command line.
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the selected command.
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Scan => self.harvest(false).await,
            Commands::Check => self.harvest(true).await,
            Commands::Plugins => {
                for plugin in AdapterRegistry::with_builtins().plugins() {
                    println!("{plugin}");
                }
                Ok(())
            }
        }
    }

    async fn harvest(&self, connection_only: bool) -> Result<()> {
        let runtime_params: RuntimeParams = match &self.cli.runtime_params {
            Some(raw) => serde_json::from_str(raw)
                .map_err(|e| Error::config(format!("Invalid --runtime-params JSON: {e}")))?,
            None => RuntimeParams::new(),
        };

        let options = HarvestOptions::new(&self.cli.config_dir)
            .with_auth_params(self.cli.auth_params.clone())
            .with_peek_params(self.cli.peek_params.clone())
            .with_post_params(self.cli.post_params.clone())
            .with_runtime_params(runtime_params)
            .connection_only(connection_only)
            .with_dashboard(&self.cli.api_key, &self.cli.api_secret, self.cli.plugin_id);

        let harvester = Harvester::new();
        let document = harvester.harvest(&options).await?;

        match &self.cli.output {
            Some(path) => std::fs::write(path, &document)?,
            None => {
                let pretty = serde_json::from_slice::<serde_json::Value>(&document)
                    .and_then(|v| serde_json::to_string_pretty(&v))
                    .unwrap_or_else(|_| String::from_utf8_lossy(&document).into_owned());
                println!("{pretty}");
            }
        }
        Ok(())
    }
}
