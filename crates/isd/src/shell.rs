// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `isd shell` command implementation.
//!
//! Launches an interactive REPL with colored prompt, streaming output, and
//! readline history. Every plain line is submitted as a question; lines
//! starting with `/` are commands. Ctrl+C while an answer streams abandons
//! that answer without leaving the shell.

use std::str::FromStr;

use colored::Colorize;
use isd_config::IsdConfig;
use isd_core::types::ExampleCatalog;
use isd_core::{IsdError, QueryStreamer};
use isd_export::{ExportFormat, export_to_dir};
use isd_stream::QueryClient;
use isd_transcript::TurnController;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::warn;

use crate::render::{TerminalRenderer, nth_example, write_examples};

/// One parsed line of shell input.
#[derive(Debug, PartialEq, Eq)]
enum ShellCommand<'a> {
    Empty,
    Quit,
    Help,
    Examples,
    Example(usize),
    Export(ExportFormat),
    Clear,
    Ask(&'a str),
    Invalid(String),
}

fn parse_command(line: &str) -> ShellCommand<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ShellCommand::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return ShellCommand::Ask(line);
    };

    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or_default();
    let arg = words.next();
    match (name, arg) {
        ("quit" | "exit", None) => ShellCommand::Quit,
        ("help", None) => ShellCommand::Help,
        ("examples", None) => ShellCommand::Examples,
        ("clear", None) => ShellCommand::Clear,
        ("example", Some(n)) => match n.parse() {
            Ok(n) => ShellCommand::Example(n),
            Err(_) => ShellCommand::Invalid(format!("not an example number: {n}")),
        },
        ("export", Some(format)) => match ExportFormat::from_str(format) {
            Ok(format) => ShellCommand::Export(format),
            Err(_) => ShellCommand::Invalid(format!(
                "unknown export format `{format}` (use json, md or html)"
            )),
        },
        ("example" | "export", None) => ShellCommand::Invalid(format!("/{name} needs an argument")),
        _ => ShellCommand::Invalid(format!("unknown command `/{command}`, try /help")),
    }
}

const HELP: &str = "\
  <question>             ask a question
  /examples              list example questions
  /example <n>           ask example question n
  /export json|md|html   save the conversation
  /clear                 clear the conversation
  /quit                  leave the shell";

/// Runs the `isd shell` interactive REPL.
pub async fn run_shell(config: &IsdConfig) -> Result<(), IsdError> {
    let client = QueryClient::new(&config.server)?;
    let catalog = match client.example_questions().await {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!(error = %e, "example questions unavailable");
            ExampleCatalog::new()
        }
    };

    let mut controller = TurnController::new(client);
    controller.set_observer(Box::new(TerminalRenderer::stdout()));

    let mut rl = DefaultEditor::new()
        .map_err(|e| IsdError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "isd shell".bold().green());
    println!("Type {} for commands, {} to exit.\n", "/help".yellow(), "/quit".yellow());

    let prompt = format!("{}> ", "isd".green());
    loop {
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };

        let command = parse_command(&line);
        if command != ShellCommand::Empty {
            let _ = rl.add_history_entry(line.as_str());
        }

        match command {
            ShellCommand::Empty => {}
            ShellCommand::Quit => break,
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::Examples => {
                if let Err(e) = write_examples(&mut std::io::stdout().lock(), &catalog) {
                    eprintln!("{}: {e}", "error".red());
                }
            }
            ShellCommand::Example(n) => match nth_example(&catalog, n) {
                Some(question) => {
                    println!("{} {question}", ">".dimmed());
                    submit(&mut controller, question).await;
                }
                None => eprintln!("{}", format!("no example question {n}").yellow()),
            },
            ShellCommand::Export(format) => {
                match export_to_dir(controller.transcript().turns(), format, &config.export) {
                    Ok(path) => println!("exported to {}", path.display()),
                    Err(e) => eprintln!("{}: {e}", "error".red()),
                }
            }
            ShellCommand::Clear => match controller.clear() {
                Ok(()) => println!("{}", "conversation cleared".dimmed()),
                Err(e) => eprintln!("{}: {e}", "error".red()),
            },
            ShellCommand::Ask(question) => submit(&mut controller, question).await,
            ShellCommand::Invalid(message) => eprintln!("{}", message.yellow()),
        }
    }
    Ok(())
}

/// Submits one question; Ctrl+C abandons the answer in flight.
async fn submit<S: QueryStreamer>(controller: &mut TurnController<S>, question: &str) {
    let finished = tokio::select! {
        result = controller.submit(question) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };
    match finished {
        Some(Ok(_)) => {}
        Some(Err(e)) => eprintln!("{}: {e}", "error".red()),
        None => {
            controller.abandon();
            eprintln!("{}", "interrupted".yellow());
        }
    }
}
