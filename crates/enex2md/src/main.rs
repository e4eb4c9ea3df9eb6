//! enex2md - Convert Evernote exports to markdown.
//!
//! Provides commands for:
//! - `convert`: Convert an `.enex` export into markdown files
//! - `render`: Render a single ENML document to stdout

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConvertArgs, RenderArgs};
use output::Output;

/// enex2md - Convert Evernote exports to markdown.
#[derive(Parser)]
#[command(name = "enex2md", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an Evernote export into markdown files.
    Convert(ConvertArgs),
    /// Render an ENML document to markdown on stdout.
    Render(RenderArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Convert(args) => args.verbose,
            Self::Render(args) => args.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Convert(args) => args.execute(),
        Commands::Render(args) => args.execute(),
    };

    if let Err(err) = result {
        output.failure(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
