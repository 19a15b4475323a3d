use anyhow::Result;
use colored::Colorize;
use tokio_util::sync::CancellationToken;

use crate::{
    app::{get_config_dir, init_config, Config},
    models::{ModelId, ModelInstaller, ModelRegistry},
    ollama::{is_installed as is_ollama_installed, OllamaCli, ScriptInstaller},
};

use super::Commands;

/// Handle CLI subcommands. Returns false when the server should start.
pub async fn handle_command(command: &Commands, config: &Config) -> Result<bool> {
    match command {
        Commands::Init => {
            println!("Initializing llama-relay configuration...");
            let path = init_config()?;
            println!("Configuration initialized at {}", path.display());
            Ok(true)
        }
        Commands::List => {
            list_models(config).await?;
            Ok(true)
        }
        Commands::Status => {
            show_status(config).await?;
            Ok(true)
        }
        Commands::Pull { model } => {
            pull_model(config, model).await?;
            Ok(true)
        }
        Commands::Version => {
            show_version();
            Ok(true)
        }
        Commands::Serve { .. } => Ok(false),
    }
}

fn is_listed(installed: &[String], model: &ModelId) -> bool {
    installed.iter().any(|name| model.matches_installed(name))
}

/// Status line for the installer script
fn installer_status(config: &Config) -> String {
    let script = &config.ollama.installer_script;
    if script.exists() {
        format!("{} Installer script: {}", "[OK]".green(), script.display())
    } else {
        format!(
            "{} Installer script: {} not found (will use `{} pull`)",
            "[WARNING]".yellow(),
            script.display(),
            config.ollama.binary
        )
    }
}

/// List installed models, then the advertised catalog
pub async fn list_models(config: &Config) -> Result<()> {
    let registry = OllamaCli::new(&config.ollama.binary);
    let names = registry.list_names().await?;
    let installed = registry.list_installed().await?;

    println!("Installed models:");
    if names.is_empty() {
        println!("  (none)");
    }
    for model in &installed {
        println!(
            "  • {} {}",
            model.name.green(),
            format!("{} {}", model.size, model.modified).trim().dimmed()
        );
    }

    println!();
    println!("Advertised models:");
    for name in &config.catalog.models {
        let id = ModelId::new(name.as_str());
        if is_listed(&names, &id) {
            println!("  • {}", id.to_string().green());
        } else {
            println!("  • {} {}", id, "(not installed)".yellow());
        }
    }
    Ok(())
}

/// Install a model with the same routes the server uses
pub async fn pull_model(config: &Config, model: &str) -> Result<()> {
    let Some(model) = ModelId::from_request(Some(model)) else {
        anyhow::bail!("Model name must not be empty");
    };

    let installer = ScriptInstaller::new(
        &config.ollama.binary,
        &config.ollama.installer_script,
        config.ollama.install_timeout(),
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    println!(
        "Pulling {}, this may take a few minutes...",
        model.to_string().cyan()
    );
    let report = installer.install(&model, cancel).await?;

    if !report.output.trim().is_empty() {
        println!("{}", report.output.trim().dimmed());
    }
    println!(
        "{} Successfully pulled model {} via {:?}",
        "[OK]".green(),
        model,
        report.route
    );
    Ok(())
}

/// Show version information
pub fn show_version() {
    println!("llama-relay v{}", env!("CARGO_PKG_VERSION"));
    println!("   Chat relay for a local Ollama runtime");
}

/// Show status of the runtime, catalog and configuration
async fn show_status(config: &Config) -> Result<()> {
    println!("llama-relay Status:");
    println!();

    // Check Ollama
    let registry = OllamaCli::new(&config.ollama.binary);
    let installed = if is_ollama_installed(&config.ollama.binary) {
        match registry.list_names().await {
            Ok(models) if models.is_empty() => {
                println!("  {} Ollama: Running (no models)", "[WARNING]".yellow());
                models
            }
            Ok(models) => {
                println!(
                    "  {} Ollama: Running ({} models installed)",
                    "[OK]".green(),
                    models.len()
                );
                models
            }
            Err(e) => {
                println!("  {} Ollama: Installed but not responding", "[ERROR]".red());
                println!("      {}", e);
                Vec::new()
            }
        }
    } else {
        println!(
            "  {} Ollama: `{}` not found on PATH",
            "[ERROR]".red(),
            config.ollama.binary
        );
        Vec::new()
    };

    // Installer script
    println!("  {}", installer_status(config));

    // Configuration
    let config_path = get_config_dir()?.join("config.toml");
    if config_path.exists() {
        println!("  {} Configuration: {}", "[OK]".green(), config_path.display());
    } else {
        println!(
            "  {} Configuration: Not found (using defaults)",
            "[WARNING]".yellow()
        );
    }

    println!();
    println!("  Server: http://{}", config.server.bind_address());
    println!("  Default model: {}", config.generation.default_model);

    println!();
    println!("  Catalog:");
    for name in &config.catalog.models {
        let id = ModelId::new(name.as_str());
        if is_listed(&installed, &id) {
            println!("    {} {}", "✓".green(), id);
        } else {
            println!("    • {}", id.to_string().dimmed());
        }
    }

    println!();
    Ok(())
}
