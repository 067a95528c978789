// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transcript data model: turns, answers, and their lifecycle states.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

/// Display text of an assistant turn whose question needs narrowing down.
pub const CLARIFICATION_PROMPT: &str = "I need clarification to provide the best results";

/// Example questions grouped by category name.
pub type ExampleCatalog = BTreeMap<String, Vec<String>>;

/// A single result row as sent by the server.
pub type Row = Map<String, Value>;

/// Unique identifier for a turn in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(pub uuid::Uuid);

impl TurnId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for TurnId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TurnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Who produced a turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// How a turn reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Settlement {
    /// The server sent `done`, or the turn was a user question.
    Completed,
    /// Transport failure or server-reported failure.
    Failed,
    /// The transport ended before any terminal event.
    Dangling,
}

/// Lifecycle of a turn.
///
/// `Settled` is absorbing: once a turn settles it never streams again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "settlement", rename_all = "snake_case")]
pub enum TurnState {
    /// Placeholder created, no event received yet.
    Pending,
    /// At least one event applied, no terminal event yet.
    Streaming,
    /// Terminal.
    Settled(Settlement),
}

impl TurnState {
    pub fn is_settled(&self) -> bool {
        matches!(self, TurnState::Settled(_))
    }

    /// The "still streaming" flag: true until the single terminal transition.
    pub fn is_streaming(&self) -> bool {
        !self.is_settled()
    }
}

/// One question/answer exchange in the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub id: TurnId,
    pub role: Role,
    /// Display text: the question, the latest status, a summary, or an error.
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<Answer>,
    pub state: TurnState,
    /// Current phase label while streaming.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
}

impl Turn {
    /// A user question. User turns are terminal on creation.
    pub fn user(question: impl Into<String>) -> Self {
        Self {
            id: TurnId::new(),
            role: Role::User,
            content: question.into(),
            timestamp: Utc::now(),
            answer: None,
            state: TurnState::Settled(Settlement::Completed),
            phase: None,
        }
    }

    /// An empty assistant turn awaiting its first stream event.
    pub fn assistant_placeholder() -> Self {
        Self {
            id: TurnId::new(),
            role: Role::Assistant,
            content: String::new(),
            timestamp: Utc::now(),
            answer: None,
            state: TurnState::Pending,
            phase: None,
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.state.is_streaming()
    }

    /// The accumulated narrative, if any delta has arrived.
    pub fn narrative(&self) -> Option<&str> {
        self.answer.as_ref().and_then(|a| a.narrative.as_deref())
    }
}

/// A web page cited by the narrative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebSource {
    #[serde(default, deserialize_with = "crate::events::lenient")]
    pub title: String,
    #[serde(default, deserialize_with = "crate::events::lenient")]
    pub url: String,
}

/// Token usage reported on completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    #[serde(default, deserialize_with = "crate::events::lenient")]
    pub prompt_tokens: u64,
    #[serde(default, deserialize_with = "crate::events::lenient")]
    pub completion_tokens: u64,
    #[serde(default, deserialize_with = "crate::events::lenient")]
    pub total_tokens: u64,
}

/// The incrementally built payload of an assistant turn.
///
/// Status text is overwritten freely, metadata fields are written from a single
/// event, the narrative only grows by appending, and completion fields are set
/// once on `done`. An answer with `error` set carries no trustworthy content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Echo of the question this answer responds to.
    pub question: String,
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Most recent human-readable status message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<Value>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub row_count: u64,
    #[serde(default)]
    pub needs_clarification: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarification_question: Option<String>,
    #[serde(default)]
    pub suggested_refinements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,

    #[serde(default)]
    pub web_sources: Vec<WebSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_stats: Option<UsageStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_time: Option<f64>,
}

impl Answer {
    /// An empty answer for `question`, before any metadata arrived.
    pub fn for_question(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Self::default()
        }
    }

    /// The error-state record that replaces all content on failure.
    pub fn failed(question: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            success: false,
            error: Some(error.into()),
            row_count: 0,
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Follow-up questions suggested in `insights.follow_up_questions`.
    pub fn follow_up_questions(&self) -> Vec<&str> {
        self.insights
            .as_ref()
            .and_then(|i| i.get("follow_up_questions"))
            .and_then(Value::as_array)
            .map(|qs| qs.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// How a stream session ended, from the driver's point of view.
///
/// Every variant except `EndedWithoutDone` has already been reported through
/// exactly one terminal callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SessionOutcome {
    /// A `done` event was observed and the transport ended.
    Completed,
    /// The transport ended without a `done` or error event.
    EndedWithoutDone,
    /// The request failed, returned a non-success status, or the body was
    /// empty or broke.
    TransportFailed,
    /// The server reported `success: false` in a metadata frame.
    ServerFailed,
}
