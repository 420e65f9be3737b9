//! CLI module for the search inference server
//!
//! Provides subcommands:
//! - `serve`: HTTP API server
//! - `ask`: answer a single query and print the result as JSON
//! - `verify`: check a single claim and print the verdict as JSON

pub mod ask;
pub mod serve;
pub mod verify;

use clap::{Parser, Subcommand};

/// Search-augmented inference serving core
#[derive(Parser)]
#[command(name = "pmp-search-inference")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Answer one query without starting a server
    Ask(ask::AskArgs),

    /// Verify one claim against web evidence
    Verify(verify::VerifyArgs),
}
