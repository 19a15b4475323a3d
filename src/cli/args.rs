use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "llama-relay")]
#[command(version)]
#[command(about = "Chat relay for a local Ollama runtime", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The subcommand to run; serving is the default
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve {
            host: None,
            port: None,
        })
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP and WebSocket server (default)
    Serve {
        /// Address to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Initialize configuration
    Init,
    /// List installed and advertised models
    List,
    /// Check status of the Ollama runtime and the model catalog
    Status,
    /// Install a model into the Ollama runtime
    Pull {
        /// Model identifier, e.g. phi3:mini
        model: String,
    },
    /// Show version information
    Version,
}
