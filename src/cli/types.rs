//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::check::CheckArgs;
use super::commands::serve::ServeArgs;

#[derive(Parser, Debug)]
#[command(name = "safelink")]
#[command(about = "Safelink - URL safety checker", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .safelink/config.yaml and .safelink/local.yaml)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a single URL against every signal source
    Check(CheckArgs),

    /// Serve the URL check HTTP endpoint
    Serve(ServeArgs),
}
