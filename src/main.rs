use anyhow::Result;
use clap::Parser;
use meet_rec_mover::cli::{
    handle_list_command, handle_move_command, run_interactive, Cli, CliCommand,
};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Some(CliCommand::Version) => {
            println!("meet-rec-mover {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(CliCommand::List(args)) => handle_list_command(config_path, args),
        Some(CliCommand::Move(args)) => handle_move_command(config_path, args).await,
        None => run_interactive(config_path).await,
    }
}
