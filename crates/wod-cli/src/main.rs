//! CLI frontend for the World of Darkness character wizard rules.

mod commands;
mod logging;

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};

use crate::logging::{LogConfig, init_logging};

#[derive(Parser)]
#[command(
    name = "wod",
    about = "Point-budget rules for World of Darkness character creation",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace). RUST_LOG overrides this.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported archetypes and their wizard steps
    Archetypes,

    /// Print an archetype's rule table
    Rules {
        /// Archetype name (e.g. Technocrat)
        archetype: String,

        /// Print the table as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Write a blank character build as saved-progress JSON
    New {
        /// Archetype name (e.g. Mage)
        archetype: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a saved build; exits with status 1 when it is invalid
    Validate {
        /// Saved-progress JSON file
        file: PathBuf,

        /// Validate a single step (e.g. attributes, merits-flaws)
        #[arg(short, long)]
        step: Option<String>,

        /// Reference JSON with tradition/convention affinity spheres
        #[arg(long)]
        affinities: Option<PathBuf>,

        /// Rule-table JSON to use instead of the built-in preset
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the recalculated freebie ledger of a saved build
    Freebies {
        /// Saved-progress JSON file
        file: PathBuf,

        /// Rule-table JSON to use instead of the built-in preset
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_verbosity(cli.verbose)
        .with_timestamps(cli.verbose >= 3)
        .with_ansi(io::stderr().is_terminal());
    if let Err(e) = init_logging(&log_config) {
        eprintln!("warning: logging disabled: {e}");
    }

    let result = match cli.command {
        Commands::Archetypes => commands::archetypes::run(),
        Commands::Rules { archetype, json } => commands::rules::run(&archetype, json),
        Commands::New { archetype, output } => commands::new::run(&archetype, output.as_deref()),
        Commands::Validate {
            file,
            step,
            affinities,
            rules,
            json,
        } => commands::validate::run(
            &file,
            step.as_deref(),
            affinities.as_deref(),
            rules.as_deref(),
            json,
        ),
        Commands::Freebies { file, rules } => commands::freebies::run(&file, rules.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
