// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait for anything that can run a query-stream session.

use async_trait::async_trait;

use crate::traits::handler::StreamHandler;
use crate::types::SessionOutcome;

/// Runs one query against the answer service and feeds its events to a handler.
///
/// Implementations never return an error: every failure is reported through
/// `handler.on_error` before returning.
#[async_trait]
pub trait QueryStreamer: Send + Sync {
    async fn stream_query(
        &self,
        question: &str,
        handler: &mut dyn StreamHandler,
    ) -> SessionOutcome;
}
