// Copyright 2026 Seatwatch Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use seatwatch::cli;
use seatwatch::config::{CliOverrides, MonitorConfig};
use seatwatch::logging;

#[derive(Parser)]
#[command(
    name = "seatwatch",
    about = "Seatwatch — watch a course section and get alerted when a seat opens",
    version,
    after_help = "Run 'seatwatch' with no command to start monitoring."
)]
struct Cli {
    /// Path to a JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Append-only log file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Course registration number to watch
    #[arg(long, global = true)]
    crn: Option<String>,

    /// Term code (e.g. "202603")
    #[arg(long, global = true)]
    term: Option<String>,

    /// Department code (e.g. "COSC")
    #[arg(long, global = true)]
    dept: Option<String>,

    /// Seconds between polls
    #[arg(long, global = true)]
    interval: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll and notify until Ctrl-C (default)
    Run,
    /// Poll once and print the current enrollment
    Check {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Send a test notification through every channel
    TestNotify,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Run);

    if let Commands::Completions { shell } = command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "seatwatch", &mut std::io::stdout());
        return Ok(());
    }

    let overrides = CliOverrides {
        crn: cli.crn,
        term: cli.term,
        department: cli.dept,
        interval_secs: cli.interval,
        log_file: cli.log_file,
    };
    let cfg = MonitorConfig::load(cli.config.as_deref(), &overrides)?;
    logging::init(&cli.log_level, &cfg.log_file)?;

    match command {
        Commands::Run => cli::run::run(cfg).await,
        Commands::Check { json } => cli::check::run(&cfg, json).await,
        Commands::TestNotify => cli::test_notify::run(&cfg).await,
        Commands::Completions { .. } => Ok(()),
    }
}
