// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation transcript for the ISD query client.
//!
//! The [`Transcript`] owns every turn; the [`reducer`] folds stream events
//! into the active assistant turn through replace-by-identifier updates; the
//! [`TurnController`] admits one question at a time and guarantees each
//! assistant turn settles.

pub mod controller;
pub mod reducer;
pub mod store;

pub use controller::TurnController;
pub use reducer::{TurnReducer, finalize_dangling};
pub use store::{Change, Transcript, TranscriptObserver};
