// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the ISD query client.
//!
//! Provides the error taxonomy, the transcript data model (turns and
//! answers), the typed stream events, and the traits that connect the stream
//! driver to the transcript reducer.

pub mod error;
pub mod events;
pub mod traits;
pub mod types;

pub use error::{IsdError, Rejection};
pub use events::{DeltaEvent, DoneEvent, EventKind, MetadataEvent, StatusEvent, StreamEvent};
pub use traits::{QueryStreamer, StreamHandler};
pub use types::{Answer, Role, SessionOutcome, Settlement, Turn, TurnId, TurnState};
