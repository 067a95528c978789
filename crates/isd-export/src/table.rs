// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Result-table shaping shared by the Markdown and HTML encoders.

use std::sync::LazyLock;

use isd_core::types::Row;
use regex::Regex;
use serde_json::Value;

/// Columns shown first when present, in this order.
pub const PRIORITY_COLUMNS: [&str; 4] = ["solutionName", "orgName", "industryName", "solutionAreaName"];

/// Long-form column that always goes last.
pub const DESCRIPTION_COLUMN: &str = "solutionDescription";

/// Columns chosen before the description column is appended.
const LEADING_COLUMNS: usize = 4;

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Picks the columns to export.
///
/// Priority columns first, then other columns in server order up to four,
/// then the description column, all capped at `max_columns`.
pub fn select_columns(columns: &[String], max_columns: usize) -> Vec<&str> {
    let mut selected: Vec<&str> = PRIORITY_COLUMNS
        .iter()
        .copied()
        .filter(|p| columns.iter().any(|c| c == p))
        .collect();

    for column in columns {
        if selected.len() >= LEADING_COLUMNS {
            break;
        }
        if column != DESCRIPTION_COLUMN && !selected.contains(&column.as_str()) {
            selected.push(column.as_str());
        }
    }

    if columns.iter().any(|c| c == DESCRIPTION_COLUMN) {
        selected.push(DESCRIPTION_COLUMN);
    }
    selected.truncate(max_columns);
    selected
}

/// Plain-text cell value: tags stripped, truncated to `max_chars` characters.
pub fn cell_text(row: &Row, column: &str, max_chars: usize) -> String {
    let raw = match row.get(column) {
        None | Some(Value::Null) => return String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    HTML_TAG
        .replace_all(&raw, "")
        .chars()
        .take(max_chars)
        .collect()
}

/// A cell made safe for a Markdown table row.
pub fn markdown_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}
