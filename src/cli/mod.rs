//! Terminal front end: listing, prompting and rendering move outcomes.
//!
//! All scanning and moving is delegated to the library modules; this module
//! only decides what to ask and how to print the results.

use anyhow::{anyhow, bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Config;
use crate::converter::{self, DocumentConverter};
use crate::mover::{self, MoveOutcome};
use crate::recording::{self, RecordingSet, ScanReport};
use crate::relocate::{CleanupOutcome, MoveStatus};
use crate::transform::{self, ConversionOutcome, ExtensionOutcome};

pub mod args;
mod interactive;

pub use args::{Cli, CliCommand, ListCliArgs, MoveCliArgs};
pub use interactive::run_interactive;

pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Scan the configured source directory, printing diagnostics to stderr.
fn scan_sets(config: &Config) -> Result<ScanReport> {
    let source_dir = config.source_dir();
    let report = recording::scan(&source_dir)
        .with_context(|| format!("Failed to scan {}", source_dir.display()))?;

    for diagnostic in &report.diagnostics {
        eprintln!("warning: {}", diagnostic);
    }
    Ok(report)
}

fn print_sets(sets: &[RecordingSet]) {
    for (i, set) in sets.iter().enumerate() {
        println!("{}. {}", i + 1, set);
    }
}

pub fn handle_list_command(config_path: Option<&Path>, args: ListCliArgs) -> Result<()> {
    let config = load_config(config_path)?;
    let report = scan_sets(&config)?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize scan result")?
        );
        return Ok(());
    }

    if report.sets.is_empty() {
        println!("No recording sets found in {}", config.source_dir().display());
        return Ok(());
    }

    println!("Recording sets ({}):\n", report.sets.len());
    print_sets(&report.sets);
    Ok(())
}

pub async fn handle_move_command(config_path: Option<&Path>, args: MoveCliArgs) -> Result<()> {
    let config = load_config(config_path)?;
    let mut report = scan_sets(&config)?;

    if args.set == 0 || args.set > report.sets.len() {
        bail!(
            "No recording set #{} (found {}). Run `meet-rec-mover list` to see them.",
            args.set,
            report.sets.len()
        );
    }
    let set = report.sets.swap_remove(args.set - 1);

    let (label, destination) = resolve_destination(&config, args.destination, args.path)?;

    let converter = converter::from_config(&config.drive);
    let outcome = run_move(set, &label, &destination, converter.as_ref()).await?;
    finish(&outcome)
}

/// Announce, run and render one move.
async fn run_move(
    set: RecordingSet,
    label: &str,
    destination: &Path,
    converter: &dyn DocumentConverter,
) -> Result<MoveOutcome> {
    println!(
        "Moving {} to {} ({})...",
        set.identity,
        label,
        destination.display()
    );
    if transform::needs_extension_fix(&set) {
        println!("The recording will get a .mp4 extension.");
    }
    if transform::needs_conversion(&set) {
        println!("The notes (.gdoc) will be converted to .docx.");
    }

    let spinner = create_spinner()?;
    spinner.set_message("Moving...");
    let result = mover::move_set(set, destination, converter).await;
    spinner.finish_and_clear();

    let outcome = result.context("Move aborted")?;
    render_outcome(&outcome);
    Ok(outcome)
}

fn finish(outcome: &MoveOutcome) -> Result<()> {
    if outcome.is_success() {
        Ok(())
    } else {
        bail!("Moving '{}' did not fully succeed", outcome.identity)
    }
}

fn create_spinner() -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("Invalid progress template")?,
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

fn render_outcome(outcome: &MoveOutcome) {
    println!();
    match &outcome.transform.extension {
        ExtensionOutcome::Renamed { to, .. } => {
            println!("Added .mp4 extension: {}", file_name(to));
        }
        ExtensionOutcome::Failed { path, reason } => {
            println!("Could not add .mp4 extension to {}: {}", file_name(path), reason);
        }
        ExtensionOutcome::NoVideo | ExtensionOutcome::AlreadyCanonical => {}
    }
    match &outcome.transform.conversion {
        ConversionOutcome::Converted { to, .. } => {
            println!("Converted notes to {}", file_name(to));
        }
        ConversionOutcome::Failed { path, reason } => {
            println!("Could not convert {}: {}", file_name(path), reason);
        }
        ConversionOutcome::NotRequired => {}
    }

    for role_move in &outcome.relocation.moves {
        match &role_move.status {
            MoveStatus::Moved => println!(
                "  {:<10} {}",
                role_move.role.as_str(),
                role_move.to.display()
            ),
            MoveStatus::Failed { reason } => println!(
                "  {:<10} FAILED ({}): {}",
                role_move.role.as_str(),
                file_name(&role_move.from),
                reason
            ),
        }
    }

    match &outcome.relocation.cleanup {
        CleanupOutcome::Removed { path } => println!("Removed {}", file_name(path)),
        CleanupOutcome::Failed { path, reason } => {
            println!("Could not remove {}: {}", file_name(path), reason)
        }
        CleanupOutcome::Kept { path } => println!("Kept {} in the source folder", file_name(path)),
        CleanupOutcome::NotRequired => {}
    }

    println!();
    if outcome.is_success() {
        println!(
            "Done: '{}' is in {}",
            outcome.identity,
            outcome.relocation.target_dir.display()
        );
    } else {
        println!("Errors occurred while moving '{}':", outcome.identity);
        for reason in outcome.failure_reasons() {
            println!("  - {}", reason);
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Resolve a destination typed by the user.
/// Named destination from the config, or an explicit `--path` with `~` expanded.
fn resolve_destination(
    config: &Config,
    name: Option<String>,
    path: Option<PathBuf>,
) -> Result<(String, PathBuf)> {
    match (name, path) {
        (Some(name), _) => {
            let path = config.destination(&name).ok_or_else(|| {
                anyhow!("Unknown destination '{}'. Add it under [destinations] in the config file.", name)
            })?;
            Ok((name, path))
        }
        (None, Some(path)) => {
            let path = match path.to_str() {
                Some(raw) => crate::global::expand_home(raw),
                None => path,
            };
            Ok(("custom".to_string(), path))
        }
        (None, None) => bail!("Either --destination or --path is required"),
    }
}

fn custom_destination(input: &str) -> Option<PathBuf> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(crate::global::expand_home(trimmed))
    }
}
