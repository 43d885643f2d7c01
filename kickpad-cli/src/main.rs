mod layout;
mod sim;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kickpad_core::KEYMAP;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kickpad-cli")]
#[command(about = "Kickpad macro pad host tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the mode table compiled into the firmware
    Keymap,
    /// Run a TOML input scenario through the engine and print what it does
    Simulate {
        /// Scenario file: `[[poll]]` entries with `active` input names and optional `repeat`
        scenario: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Keymap => {
            print!("{}", layout::render(&KEYMAP));
        }
        Command::Simulate { scenario } => {
            let contents = fs::read_to_string(&scenario)
                .with_context(|| format!("reading {}", scenario.display()))?;
            let parsed = sim::Scenario::parse(&contents)?;

            let board = sim::run(&parsed)
                .with_context(|| format!("running {}", scenario.display()))?;

            for record in board.records() {
                println!("[poll {:>4}] {}", record.poll, record.output);
            }
            println!("Active mode: {}", board.active_mode());
        }
    }

    Ok(())
}
