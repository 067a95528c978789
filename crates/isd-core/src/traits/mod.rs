// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seams between the stream driver, the transcript reducer, and test doubles.

pub mod handler;
pub mod streamer;

pub use handler::StreamHandler;
pub use streamer::QueryStreamer;
