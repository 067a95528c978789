// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-event callback set invoked by a stream session.

use crate::events::{DoneEvent, MetadataEvent, StatusEvent};

/// Receives the classified events of one stream session.
///
/// Calls are synchronous and arrive strictly in frame order. A session ends
/// with at most one of `on_done` / `on_error`; a session may also end with
/// neither when the transport closes early.
pub trait StreamHandler: Send {
    /// Progress update. May be called any number of times.
    fn on_status(&mut self, event: StatusEvent);

    /// Query results. Never called with a failure payload; those go to `on_error`.
    fn on_metadata(&mut self, event: MetadataEvent);

    /// Narrative fragment, to be appended in arrival order.
    fn on_delta(&mut self, fragment: String);

    /// Normal completion.
    fn on_done(&mut self, event: DoneEvent);

    /// Transport failure or server-reported failure, as user-visible text.
    fn on_error(&mut self, message: String);
}
