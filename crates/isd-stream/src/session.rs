// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stream session driver.
//!
//! Pumps a response body through the [`FrameReassembler`] and the decoder and
//! dispatches each event to a [`StreamHandler`] as soon as its line is
//! complete. Nothing is buffered beyond the current partial line.

use futures::{Stream, StreamExt};
use isd_core::{SessionOutcome, StreamEvent, StreamHandler};
use tracing::{debug, warn};

use crate::decoder;
use crate::reassembler::FrameReassembler;

/// Error text used when a failing metadata frame carries no message.
const UNSPECIFIED_SERVER_ERROR: &str = "the server reported a failure without details";

/// Error text for a successful response that carried no bytes at all.
pub const EMPTY_BODY_ERROR: &str = "empty response body";

/// Consumes `body` until it ends or a failure short-circuits the session.
///
/// A metadata frame with `success: false` is routed to `on_error` instead of
/// `on_metadata`, and reading stops there: the rest of the body is dropped
/// unread, which releases the connection. A body read error is reported
/// through `on_error` as well, and so is a body that ends without a single
/// byte. Reaching the end of a non-empty body without a `done` frame is not an
/// error here; the caller decides how to settle.
pub async fn drive_body<S, B, E>(body: S, handler: &mut dyn StreamHandler) -> SessionOutcome
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut body = std::pin::pin!(body);
    let mut reassembler = FrameReassembler::new();
    let mut saw_done = false;
    let mut frames = 0usize;
    let mut received = 0usize;

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!(error = %e, frames, "response body failed mid-stream");
                handler.on_error(format!("stream interrupted: {e}"));
                return SessionOutcome::TransportFailed;
            }
        };

        let chunk = chunk.as_ref();
        received += chunk.len();
        for line in reassembler.push(chunk) {
            let Some(event) = decoder::decode_line(&line) else {
                continue;
            };
            frames += 1;
            match event {
                StreamEvent::Status(status) => handler.on_status(status),
                StreamEvent::Metadata(metadata) if metadata.is_failure() => {
                    let message = metadata
                        .error
                        .filter(|e| !e.trim().is_empty())
                        .unwrap_or_else(|| UNSPECIFIED_SERVER_ERROR.to_string());
                    warn!(error = %message, "server reported failure");
                    handler.on_error(message);
                    return SessionOutcome::ServerFailed;
                }
                StreamEvent::Metadata(metadata) => handler.on_metadata(*metadata),
                StreamEvent::Delta(delta) => handler.on_delta(delta.content),
                StreamEvent::Done(done) => {
                    saw_done = true;
                    handler.on_done(done);
                }
            }
        }
    }

    reassembler.finish();
    if received == 0 {
        warn!("response body was empty");
        handler.on_error(EMPTY_BODY_ERROR.to_string());
        return SessionOutcome::TransportFailed;
    }
    if saw_done {
        debug!(frames, "stream completed");
        SessionOutcome::Completed
    } else {
        warn!(frames, "stream ended without a done event");
        SessionOutcome::EndedWithoutDone
    }
}
