// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for ISD integration tests.
//!
//! # Components
//!
//! - [`ScriptedStreamer`] - Query streamer replaying scripted response bodies
//! - [`sse`] - Event-stream body builders

pub mod scripted;
pub mod sse;

pub use scripted::{Script, ScriptedStreamer};
