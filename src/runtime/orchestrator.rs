use anyhow::Result;
use colored::Colorize;
use tracing::info;

use crate::{
    api::serve,
    app::{load_config, load_config_from, AppState, Config},
    cli::{handle_command, Cli, Commands},
    ollama::is_installed as is_ollama_installed,
    utils::init_logger,
};

/// Main runtime orchestrator
pub struct Orchestrator {
    cli: Cli,
    config: Config,
}

impl Orchestrator {
    /// Create a new orchestrator from CLI args
    pub fn new(cli: Cli) -> Result<Self> {
        // An explicit --config must load; the standard locations fall back
        // to defaults
        let config = if let Some(config_path) = &cli.config {
            load_config_from(config_path)?
        } else {
            match load_config() {
                Ok(cfg) => cfg,
                Err(e) => {
                    eprintln!("⚠️  Failed to load config: {}. Using defaults.", e);
                    Config::default()
                }
            }
        };

        Ok(Self { cli, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the orchestrator
    pub async fn run(mut self) -> Result<()> {
        let level = if self.cli.verbose {
            "debug"
        } else {
            self.config.logging.level.as_str()
        };
        init_logger(level);

        let command = self.cli.command();
        if handle_command(&command, &self.config).await? {
            return Ok(());
        }

        if let Commands::Serve { host, port } = command {
            self.apply_overrides(host, port);
        }

        if !is_ollama_installed(&self.config.ollama.binary) {
            eprintln!(
                "{} `{}` not found on PATH; model probes will report nothing installed",
                "⚠️ ".yellow(),
                self.config.ollama.binary
            );
        }

        println!(
            "Starting llama-relay on {} with model {}",
            self.config.server.bind_address().cyan(),
            self.config.generation.default_model.green()
        );

        let state = AppState::from_config(self.config);
        serve(state).await?;

        info!("Shutdown complete");
        Ok(())
    }

    fn apply_overrides(&mut self, host: Option<String>, port: Option<u16>) {
        if let Some(host) = host {
            self.config.server.host = host;
        }
        if let Some(port) = port {
            self.config.server.port = port;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_explicit_config_and_overrides() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nport = 9100\n\n[generation]\ndefault_model = \"phi3:mini\""
        )
        .unwrap();

        let cli = Cli::parse_from(["llama-relay", "--config", file.path().to_str().unwrap()]);
        let mut orchestrator = Orchestrator::new(cli).unwrap();
        assert_eq!(orchestrator.config().server.port, 9100);
        assert_eq!(orchestrator.config().generation.default_model, "phi3:mini");

        orchestrator.apply_overrides(Some("127.0.0.1".to_string()), Some(9200));
        assert_eq!(orchestrator.config().server.bind_address(), "127.0.0.1:9200");
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let cli = Cli::parse_from(["llama-relay", "--config", "/nonexistent/relay.toml"]);
        assert!(Orchestrator::new(cli).is_err());
    }
}
