//! # hSNN CLI - Command Line Interface for the neuromorphic code generator
//!
//! The CLI-first interface to the NIR compiler and simulation-step code
//! generator: build, verify, and lower NIR programs into the C++
//! translation units a CPU backend needs to step a spiking network
//! simulation forward.

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod error;
mod workspace;

use commands::HsnnCli;
use error::CliResult;

#[tokio::main]
async fn main() -> CliResult<()> {
    // Initialize logging with environment variable support
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    // Parse CLI arguments
    let cli = HsnnCli::parse();
    
    // Execute the command
    if let Err(err) = cli.execute().await {
        error!("Command failed: {}", err);
        std::process::exit(1);
    }
    
    Ok(())
}