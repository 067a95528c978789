// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query-stream consumer for the ISD answer service.
//!
//! Bytes from a long-lived HTTP response flow through the
//! [`FrameReassembler`] into the [`decoder`], and [`drive_body`] dispatches
//! each classified event to a [`StreamHandler`](isd_core::StreamHandler) in
//! arrival order. [`QueryClient`] owns the HTTP side.

pub mod client;
pub mod decoder;
pub mod reassembler;
pub mod session;

pub use client::QueryClient;
pub use decoder::decode_line;
pub use reassembler::FrameReassembler;
pub use session::drive_body;
