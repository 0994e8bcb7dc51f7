use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "meet-rec-mover")]
#[command(about = "Move Google Meet recording sets into dated folders", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the config file (default: ~/.config/meet-rec-mover/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// List recording sets found in the source directory
    List(ListCliArgs),
    /// Move a recording set without prompting
    Move(MoveCliArgs),
    /// Print version information
    Version,
}

#[derive(ClapArgs, Debug)]
pub struct ListCliArgs {
    /// Print the scan result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug)]
pub struct MoveCliArgs {
    /// Number of the set as shown by `list` (1-based)
    #[arg(short, long)]
    pub set: usize,
    /// Name of a destination from the config file
    #[arg(short, long, conflicts_with = "path", required_unless_present = "path")]
    pub destination: Option<String>,
    /// Move to this directory instead of a configured destination
    #[arg(short, long)]
    pub path: Option<PathBuf>,
}
