// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed payloads of the query-stream event taxonomy.
//!
//! Field access is lenient: a missing field, a `null`, or a value of the wrong
//! JSON type all read as the field's default. Only the `type` discriminator
//! decides whether a frame is kept.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::types::{Row, UsageStats, WebSource};

/// Reads a field, treating `null` and mistyped values as the default.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Discriminator values carried in a frame's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum EventKind {
    Status,
    Metadata,
    Delta,
    Done,
}

/// Progress update: which pipeline phase the server is in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    #[serde(default, deserialize_with = "lenient")]
    pub phase: String,
    #[serde(default, deserialize_with = "lenient")]
    pub message: String,
}

/// Tabular result set attached to a metadata frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultData {
    #[serde(default, deserialize_with = "lenient")]
    pub columns: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub rows: Vec<Row>,
}

/// Query translation and retrieval results, sent once per answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataEvent {
    #[serde(default, deserialize_with = "lenient")]
    pub success: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub intent: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub sql: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub explanation: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub confidence: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub insights: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub data: Option<ResultData>,
    #[serde(default, deserialize_with = "lenient")]
    pub row_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub needs_clarification: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub clarification_question: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub suggested_refinements: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<String>,
}

impl MetadataEvent {
    /// True when the server explicitly reported `success: false`.
    pub fn is_failure(&self) -> bool {
        self.success == Some(false)
    }

    /// Server-supplied row count, falling back to the row set length, then zero.
    pub fn normalized_row_count(&self) -> u64 {
        self.row_count
            .or_else(|| self.data.as_ref().map(|d| d.rows.len() as u64))
            .unwrap_or(0)
    }
}

/// A narrative fragment to append.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeltaEvent {
    #[serde(default, deserialize_with = "lenient")]
    pub content: String,
}

/// Completion statistics, sent once at the end of a successful answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoneEvent {
    #[serde(default, deserialize_with = "lenient")]
    pub web_sources: Vec<WebSource>,
    #[serde(default, deserialize_with = "lenient")]
    pub usage_stats: Option<UsageStats>,
    #[serde(default, deserialize_with = "lenient")]
    pub elapsed_time: Option<f64>,
}

/// A classified frame.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Status(StatusEvent),
    Metadata(Box<MetadataEvent>),
    Delta(DeltaEvent),
    Done(DoneEvent),
}

impl StreamEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            StreamEvent::Status(_) => EventKind::Status,
            StreamEvent::Metadata(_) => EventKind::Metadata,
            StreamEvent::Delta(_) => EventKind::Delta,
            StreamEvent::Done(_) => EventKind::Done,
        }
    }
}
