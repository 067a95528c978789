// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the ISD query client.

use thiserror::Error;

use crate::types::TurnId;

/// Why the turn controller refused a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The question was empty or whitespace only.
    EmptyQuestion,
    /// Another turn is still streaming.
    Busy,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::EmptyQuestion => f.write_str("question is empty"),
            Rejection::Busy => f.write_str("another answer is still streaming"),
        }
    }
}

/// The primary error type used across the ISD crates.
#[derive(Debug, Error)]
pub enum IsdError {
    /// Configuration errors (invalid TOML, bad URLs, client construction).
    #[error("configuration error: {0}")]
    Config(String),

    /// The request could not be made or the response was unusable.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A frame or response body could not be decoded.
    #[error("decode error: {message}")]
    Decode {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The turn controller refused to start a new turn.
    #[error("submission rejected: {0}")]
    Rejected(Rejection),

    /// An update targeted a turn that is not in the transcript.
    #[error("turn not found: {0}")]
    TurnNotFound(TurnId),

    /// Transcript export failed.
    #[error("export error: {message}")]
    Export {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
