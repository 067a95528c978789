// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Markdown transcript encoder.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use isd_core::{Answer, IsdError, Role, Turn};

use crate::table::{self, cell_text, markdown_cell};
use crate::{TableLimits, TITLE, total_queries};

/// Renders the transcript as a Markdown document.
pub fn render(
    turns: &[Turn],
    limits: &TableLimits,
    exported_at: DateTime<Utc>,
) -> Result<String, IsdError> {
    let mut out = String::new();
    write_document(&mut out, turns, limits, exported_at).map_err(|e| IsdError::Export {
        message: format!("failed to render markdown: {e}"),
        source: Some(Box::new(e)),
    })?;
    Ok(out)
}

fn write_document(
    out: &mut String,
    turns: &[Turn],
    limits: &TableLimits,
    exported_at: DateTime<Utc>,
) -> std::fmt::Result {
    writeln!(out, "# {TITLE}\n")?;
    writeln!(out, "**Date**: {}", exported_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(out, "**Total Queries**: {}\n\n---\n", total_queries(turns))?;

    let mut query = 0;
    for turn in turns {
        match turn.role {
            Role::User => {
                query += 1;
                writeln!(out, "## Query {query}\n")?;
                writeln!(out, "**Question**: {}\n", turn.content)?;
            }
            Role::Assistant => {
                writeln!(out, "**Result**: {}\n", turn.content)?;
                if let Some(answer) = &turn.answer {
                    write_answer(out, answer, limits)?;
                }
                writeln!(out, "---\n")?;
            }
        }
    }
    Ok(())
}

fn write_answer(out: &mut String, answer: &Answer, limits: &TableLimits) -> std::fmt::Result {
    if let Some(narrative) = answer.narrative.as_deref().filter(|n| !n.is_empty()) {
        writeln!(out, "### Insights\n\n{narrative}\n")?;
    }

    let follow_ups = answer.follow_up_questions();
    if !follow_ups.is_empty() {
        writeln!(out, "**Suggested Follow-up Questions:**\n")?;
        for question in follow_ups {
            writeln!(out, "- {question}")?;
        }
        writeln!(out)?;
    }

    if !answer.rows.is_empty() && !answer.columns.is_empty() {
        write_table(out, answer, limits)?;
    }

    if let Some(sql) = &answer.sql {
        writeln!(out, "**SQL**:\n```sql\n{sql}\n```\n")?;
    }
    if let Some(explanation) = &answer.explanation {
        writeln!(out, "**Explanation**: {explanation}\n")?;
    }
    Ok(())
}

fn write_table(out: &mut String, answer: &Answer, limits: &TableLimits) -> std::fmt::Result {
    let columns = table::select_columns(&answer.columns, limits.max_columns);
    if columns.is_empty() {
        return Ok(());
    }

    writeln!(out, "### Results Table\n")?;
    writeln!(out, "**Total Results**: {}\n", answer.rows.len())?;
    writeln!(out, "| {} |", columns.join(" | "))?;
    writeln!(out, "| {} |", vec!["---"; columns.len()].join(" | "))?;

    for row in answer.rows.iter().take(limits.max_rows) {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| markdown_cell(&cell_text(row, c, limits.max_cell_chars)))
            .collect();
        writeln!(out, "| {} |", cells.join(" | "))?;
    }

    if answer.rows.len() > limits.max_rows {
        writeln!(
            out,
            "\n*... and {} more results*",
            answer.rows.len() - limits.max_rows
        )?;
    }
    writeln!(out)
}
