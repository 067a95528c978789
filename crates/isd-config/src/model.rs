// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the ISD query client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IsdConfig {
    /// Answer service endpoints.
    #[serde(default)]
    pub server: ServerConfig,

    /// Log verbosity.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Transcript export settings.
    #[serde(default)]
    pub export: ExportConfig,
}

/// Answer service connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Scheme, host and port of the answer service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the streaming query endpoint.
    #[serde(default = "default_stream_path")]
    pub stream_path: String,

    /// Path of the example-question endpoint.
    #[serde(default = "default_examples_path")]
    pub examples_path: String,

    /// TCP connect timeout. The response body itself has no deadline.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Conversation identifier forwarded with every question.
    #[serde(default)]
    pub conversation_id: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            stream_path: default_stream_path(),
            examples_path: default_examples_path(),
            connect_timeout_secs: default_connect_timeout_secs(),
            conversation_id: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_stream_path() -> String {
    "/api/query/stream".to_string()
}

fn default_examples_path() -> String {
    "/api/examples".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Transcript export configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// Directory export files are written to.
    #[serde(default = "default_export_directory")]
    pub directory: String,

    /// Rows of each result table included in Markdown/HTML exports.
    #[serde(default = "default_max_table_rows")]
    pub max_table_rows: usize,

    /// Columns of each result table included in Markdown/HTML exports.
    #[serde(default = "default_max_table_columns")]
    pub max_table_columns: usize,

    /// Cell values are truncated to this many characters.
    #[serde(default = "default_max_cell_chars")]
    pub max_cell_chars: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_export_directory(),
            max_table_rows: default_max_table_rows(),
            max_table_columns: default_max_table_columns(),
            max_cell_chars: default_max_cell_chars(),
        }
    }
}

fn default_export_directory() -> String {
    ".".to_string()
}

fn default_max_table_rows() -> usize {
    20
}

fn default_max_table_columns() -> usize {
    5
}

fn default_max_cell_chars() -> usize {
    100
}
