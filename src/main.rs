use anyhow::Result;
use clap::{Parser, Subcommand};

mod archive;
mod comment;
mod entry;
mod filespec;
mod importers;
mod journal;
mod liberal_date;
mod money;
mod rules;
mod tags;

#[derive(Debug, Parser)]
/// Imports Monzo JSON statements into Ledger journals.
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Lists the statements recognised by an importer, and the account each
    /// belongs to.
    Identify(importers::cmd::IdentifyCmd),
    /// Prints the end date of each recognised statement.
    FileDate(importers::cmd::FileDateCmd),
    /// Converts the transactions in recognised statements into journal
    /// entries.
    Extract(importers::cmd::ExtractCmd),
    /// Moves recognised statements into a documents tree, by account and
    /// date.
    Archive(importers::cmd::ArchiveCmd),
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    use Commands::*;
    match &cli.command {
        Identify(cmd) => cmd.run(),
        FileDate(cmd) => cmd.run(),
        Extract(cmd) => cmd.run(),
        Archive(cmd) => cmd.run(),
    }
}
