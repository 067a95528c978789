// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! isd - ask the Industry Solutions Directory questions from the terminal.
//!
//! This is the binary entry point.

mod ask;
mod render;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use isd_config::IsdConfig;
use isd_export::ExportFormat;

/// isd - ask the Industry Solutions Directory questions from the terminal.
#[derive(Parser, Debug)]
#[command(name = "isd", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask one question and stream the answer.
    Ask {
        /// The question; multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,

        /// Also export the conversation (json, md, html).
        #[arg(long, value_name = "FORMAT")]
        export: Option<ExportFormat>,
    },
    /// Launch an interactive session.
    Shell,
    /// List the example questions offered by the server.
    Examples,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => isd_config::load_and_validate_path(path),
        None => isd_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            isd_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);

    let result = run(cli.command, &config).await;
    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {e}", "error".red());
            std::process::exit(1);
        }
    }
}

/// Runs the chosen subcommand. `Ok(false)` means it finished but failed.
async fn run(command: Option<Commands>, config: &IsdConfig) -> Result<bool, isd_core::IsdError> {
    match command {
        Some(Commands::Ask { question, export }) => {
            ask::run_ask(config, &question.join(" "), export).await
        }
        Some(Commands::Shell) => shell::run_shell(config).await.map(|()| true),
        Some(Commands::Examples) => ask::run_examples(config).await.map(|()| true),
        None => {
            println!("isd: use --help for available commands");
            Ok(true)
        }
    }
}

/// Crates whose logs follow `logging.level`; everything else logs at warn.
const LOG_TARGETS: [&str; 6] = [
    "isd",
    "isd_config",
    "isd_core",
    "isd_export",
    "isd_stream",
    "isd_transcript",
];

/// Logs go to stderr; stdout carries only answers.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives: Vec<String> = LOG_TARGETS
            .iter()
            .map(|target| format!("{target}={log_level}"))
            .collect();
        EnvFilter::new(format!("{},warn", directives.join(",")))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
