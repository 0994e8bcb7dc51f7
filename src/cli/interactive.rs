//! Interactive selection of a recording set and a destination.

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing::info;

use super::{custom_destination, finish, load_config, run_move, scan_sets};
use crate::config::Config;
use crate::converter;

enum DestinationChoice {
    Selected { label: String, path: PathBuf },
    Exit,
}

pub async fn run_interactive(config_path: Option<&Path>) -> Result<()> {
    if !io::stdin().is_terminal() {
        info!("Non-interactive session. Use 'meet-rec-mover list' and 'meet-rec-mover move' instead.");
        return Ok(());
    }

    let theme = ColorfulTheme::default();
    let config = load_config(config_path)?;
    let mut report = scan_sets(&config)?;

    if report.sets.is_empty() {
        println!("No recording sets found in {}", config.source_dir().display());
        return Ok(());
    }

    println!();
    println!("Google Meet recording sets ({})", report.sets.len());
    println!();

    let mut items: Vec<String> = report.sets.iter().map(|set| set.to_string()).collect();
    items.push("Exit".to_string());

    let selection = Select::with_theme(&theme)
        .with_prompt("Which recording set do you want to move?")
        .items(&items)
        .default(0)
        .interact()?;

    if selection >= report.sets.len() {
        println!("Exiting.");
        return Ok(());
    }
    let set = report.sets.swap_remove(selection);

    let (label, destination) = match prompt_destination(&theme, &config)? {
        DestinationChoice::Selected { label, path } => (label, path),
        DestinationChoice::Exit => {
            println!("Exiting.");
            return Ok(());
        }
    };

    let proceed = Confirm::with_theme(&theme)
        .with_prompt(format!(
            "Move '{}' to {}?",
            set.identity,
            destination.display()
        ))
        .default(true)
        .interact()?;

    if !proceed {
        println!("Move cancelled.");
        return Ok(());
    }

    let converter = converter::from_config(&config.drive);
    let outcome = run_move(set, &label, &destination, converter.as_ref()).await?;
    finish(&outcome)
}

fn prompt_destination(theme: &ColorfulTheme, config: &Config) -> Result<DestinationChoice> {
    let destinations = config.destinations();
    if destinations.is_empty() {
        println!("No destinations configured; add some under [destinations] in the config file.");
    }

    let mut items: Vec<String> = destinations
        .iter()
        .map(|(name, path)| format!("{}: {}", name, path.display()))
        .collect();
    items.push("Custom destination...".to_string());
    items.push("Exit".to_string());

    let selection = Select::with_theme(theme)
        .with_prompt("Where should it go?")
        .items(&items)
        .default(0)
        .interact()?;

    if let Some((name, path)) = destinations.get(selection) {
        return Ok(DestinationChoice::Selected {
            label: name.clone(),
            path: path.clone(),
        });
    }

    if selection == destinations.len() {
        let input: String = Input::with_theme(theme)
            .with_prompt("Destination path")
            .validate_with(|input: &String| -> Result<(), &str> {
                if custom_destination(input).is_some() {
                    Ok(())
                } else {
                    Err("Please enter a path")
                }
            })
            .interact_text()?;

        if let Some(path) = custom_destination(&input) {
            return Ok(DestinationChoice::Selected {
                label: "custom".to_string(),
                path,
            });
        }
    }

    Ok(DestinationChoice::Exit)
}
