// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transcript export for the ISD query client.
//!
//! Encodes a transcript as JSON, Markdown, or a standalone HTML page and
//! writes it to `conversation_<timestamp>.<ext>` in the export directory.

pub mod html;
pub mod json;
pub mod markdown;
pub mod table;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use isd_config::ExportConfig;
use isd_core::{IsdError, Role, Turn};
use strum::{Display, EnumString};
use tracing::info;

/// Document title used by the Markdown and HTML encoders.
pub const TITLE: &str = "Industry Solutions Directory - Conversation";

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ExportFormat {
    #[strum(to_string = "json")]
    Json,
    #[strum(to_string = "md", serialize = "markdown")]
    Markdown,
    #[strum(to_string = "html", serialize = "htm")]
    Html,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "md",
            ExportFormat::Html => "html",
        }
    }
}

/// Result-table limits for the Markdown and HTML encoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLimits {
    pub max_rows: usize,
    pub max_columns: usize,
    pub max_cell_chars: usize,
}

impl Default for TableLimits {
    fn default() -> Self {
        Self::from(&ExportConfig::default())
    }
}

impl From<&ExportConfig> for TableLimits {
    fn from(config: &ExportConfig) -> Self {
        Self {
            max_rows: config.max_table_rows,
            max_columns: config.max_table_columns,
            max_cell_chars: config.max_cell_chars,
        }
    }
}

/// Number of questions asked in `turns`.
pub fn total_queries(turns: &[Turn]) -> usize {
    turns.iter().filter(|t| t.role == Role::User).count()
}

/// Encodes `turns` in `format`.
pub fn render(
    turns: &[Turn],
    format: ExportFormat,
    limits: &TableLimits,
    exported_at: DateTime<Utc>,
) -> Result<String, IsdError> {
    match format {
        ExportFormat::Json => json::render(turns, exported_at),
        ExportFormat::Markdown => markdown::render(turns, limits, exported_at),
        ExportFormat::Html => html::render(turns, limits, exported_at),
    }
}

/// File name for an export taken at `exported_at`.
pub fn file_name(format: ExportFormat, exported_at: DateTime<Utc>) -> String {
    format!(
        "conversation_{}.{}",
        exported_at.format("%Y%m%dT%H%M%SZ"),
        format.extension()
    )
}

/// Encodes `turns` and writes them under `config.directory`.
///
/// Returns the path written.
pub fn export_to_dir(
    turns: &[Turn],
    format: ExportFormat,
    config: &ExportConfig,
) -> Result<PathBuf, IsdError> {
    let exported_at = Utc::now();
    let document = render(turns, format, &TableLimits::from(config), exported_at)?;

    let dir = PathBuf::from(&config.directory);
    std::fs::create_dir_all(&dir).map_err(|e| IsdError::Export {
        message: format!("failed to create {}: {e}", dir.display()),
        source: Some(Box::new(e)),
    })?;

    let path = dir.join(file_name(format, exported_at));
    std::fs::write(&path, document).map_err(|e| IsdError::Export {
        message: format!("failed to write {}: {e}", path.display()),
        source: Some(Box::new(e)),
    })?;

    info!(path = %path.display(), %format, turns = turns.len(), "transcript exported");
    Ok(path)
}
