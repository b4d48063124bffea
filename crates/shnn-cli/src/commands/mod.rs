//! CLI command implementations for hSNN

use clap::{Parser, Subcommand};
use crate::error::CliResult;

pub mod init;
pub mod inspect;
pub mod nir;

/// hSNN - neuromorphic simulation-step code generator
#[derive(Parser, Debug)]
#[command(
    name = "snn",
    version,
    about = "Neuromorphic IR compiler and simulation-step code generator",
    long_about = "hSNN parses, verifies, and lowers neuromorphic IR (NIR) into the \
                  neuron-update and synapse-update C++ translation units a CPU backend \
                  needs to step a spiking network simulation forward."
)]
pub struct HsnnCli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
    
    /// Workspace directory (defaults to current directory)
    #[arg(short, long, global = true)]
    pub workspace: Option<std::path::PathBuf>,
    
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,
    
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new hSNN workspace
    #[command(alias = "new")]
    Init(init::InitCommand),

    /// Inspect workspace and data
    Inspect(inspect::InspectCommand),

    /// NIR-related commands (compile, verify, generate, op list)
    Nir(nir::NirCommand),
}

impl HsnnCli {
    /// Execute the CLI command
    pub async fn execute(self) -> CliResult<()> {
        // Set up workspace and config
        let workspace = self.workspace.unwrap_or_else(|| std::env::current_dir().unwrap());
        let config = self.config;

        // Execute the appropriate subcommand
        match self.command {
            Commands::Init(cmd) => cmd.execute(workspace, config).await,
            Commands::Inspect(cmd) => cmd.execute(workspace, config).await,
            Commands::Nir(cmd) => cmd.execute().await,
        }
    }
}