// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal rendering of transcript changes.
//!
//! [`TerminalRenderer`] observes the transcript and prints each assistant
//! turn as it evolves: status and summary lines when the display text
//! changes, narrative increments as they arrive, and a footer on settlement.

use std::io::Write;

use colored::Colorize;
use isd_core::types::ExampleCatalog;
use isd_core::{Answer, Role, Settlement, Turn, TurnState};
use isd_transcript::{Change, TranscriptObserver};

/// Prints assistant turns to `out` as they stream.
pub struct TerminalRenderer<W> {
    out: W,
}

impl TerminalRenderer<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn render_replace(&mut self, before: &Turn, after: &Turn) -> std::io::Result<()> {
        if after.role != Role::Assistant {
            return Ok(());
        }
        let printed = before.narrative().unwrap_or_default();
        let narrative = after.narrative().unwrap_or_default();

        if after.content != before.content && !is_failed(after) {
            if !printed.is_empty() {
                writeln!(self.out)?;
            }
            writeln!(self.out, "{}", after.content.dimmed())?;
        }

        match narrative.strip_prefix(printed) {
            Some(fresh) if !fresh.is_empty() => write!(self.out, "{fresh}")?,
            _ => {}
        }

        if !before.state.is_settled() && after.state.is_settled() {
            if !narrative.is_empty() {
                writeln!(self.out)?;
            }
            self.render_footer(after)?;
        }
        self.out.flush()
    }

    fn render_footer(&mut self, turn: &Turn) -> std::io::Result<()> {
        match turn.state {
            TurnState::Settled(Settlement::Failed) => {
                writeln!(self.out, "{}", turn.content.red())?;
            }
            TurnState::Settled(Settlement::Dangling) => {
                writeln!(self.out, "{}", "(answer ended before completion)".yellow())?;
            }
            _ => {
                if let Some(answer) = &turn.answer {
                    self.render_details(answer)?;
                }
            }
        }
        Ok(())
    }

    fn render_details(&mut self, answer: &Answer) -> std::io::Result<()> {
        if let Some(question) = &answer.clarification_question {
            writeln!(self.out, "{} {question}", "?".yellow().bold())?;
        }
        for refinement in &answer.suggested_refinements {
            writeln!(self.out, "  - {refinement}")?;
        }

        let follow_ups = answer.follow_up_questions();
        if !follow_ups.is_empty() {
            writeln!(self.out, "{}", "Follow-up questions:".bold())?;
            for question in follow_ups {
                writeln!(self.out, "  - {question}")?;
            }
        }

        for source in &answer.web_sources {
            writeln!(self.out, "{} {} <{}>", "source:".dimmed(), source.title, source.url)?;
        }

        let mut meta = Vec::new();
        if let Some(elapsed) = answer.elapsed_time {
            meta.push(format!("{elapsed:.1}s"));
        }
        if let Some(usage) = &answer.usage_stats {
            meta.push(format!("{} tokens", usage.total_tokens));
        }
        if let Some(confidence) = &answer.confidence {
            meta.push(format!("confidence {confidence}"));
        }
        if !meta.is_empty() {
            writeln!(self.out, "{}", meta.join(" | ").dimmed())?;
        }
        Ok(())
    }
}

impl<W: Write + Send> TranscriptObserver for TerminalRenderer<W> {
    fn observe(&mut self, _version: u64, change: Change<'_>) {
        if let Change::Replaced { before, after } = change {
            // Output errors never affect the transcript.
            let _ = self.render_replace(before, after);
        }
    }
}

fn is_failed(turn: &Turn) -> bool {
    turn.state == TurnState::Settled(Settlement::Failed)
}

/// Prints the example catalog with a running number per question.
pub fn write_examples(out: &mut impl Write, catalog: &ExampleCatalog) -> std::io::Result<()> {
    if catalog.is_empty() {
        return writeln!(out, "{}", "No example questions available.".dimmed());
    }
    let mut number = 0;
    for (category, questions) in catalog {
        writeln!(out, "{}", category.bold())?;
        for question in questions {
            number += 1;
            writeln!(out, "  {:>2}. {question}", number)?;
        }
    }
    Ok(())
}

/// The `n`th question of the catalog, counting from 1 in display order.
pub fn nth_example(catalog: &ExampleCatalog, n: usize) -> Option<&str> {
    catalog
        .values()
        .flatten()
        .nth(n.checked_sub(1)?)
        .map(String::as_str)
}
