// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event-stream line decoder.
//!
//! Classifies one complete line into a typed [`StreamEvent`]. Lines that are
//! not `data:` records, payloads that are not JSON, and unknown or missing
//! `type` discriminators all yield `None`: a malformed frame is skipped and
//! the stream carries on. Once the discriminator is known the frame is kept;
//! absent, `null` or mistyped fields read as defaults.

use std::str::FromStr;

use isd_core::{EventKind, IsdError, StreamEvent};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Prefix of event-stream data records.
pub const DATA_PREFIX: &str = "data:";

/// Field holding the event kind.
pub const DISCRIMINATOR: &str = "type";

/// Decodes one line, dropping anything that is not a recognizable event.
pub fn decode_line(line: &str) -> Option<StreamEvent> {
    let payload = data_payload(line)?;
    match decode_payload(payload) {
        Ok(Some(event)) => {
            debug!(kind = %event.kind(), "decoded frame");
            Some(event)
        }
        Ok(None) => None,
        Err(e) => {
            debug!(error = %e, "dropping malformed frame");
            None
        }
    }
}

/// The payload of a `data:` record, without the prefix and its optional space.
fn data_payload(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(DATA_PREFIX)?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Parses and classifies a payload.
///
/// `Ok(None)` means the payload was JSON but carried no known discriminator.
fn decode_payload(payload: &str) -> Result<Option<StreamEvent>, IsdError> {
    let value: Value = serde_json::from_str(payload).map_err(|e| IsdError::Decode {
        message: format!("frame is not JSON: {e}"),
        source: Some(Box::new(e)),
    })?;

    let Some(kind) = value
        .get(DISCRIMINATOR)
        .and_then(Value::as_str)
        .and_then(|s| EventKind::from_str(s).ok())
    else {
        debug!(payload = %payload, "ignoring frame without a known type");
        return Ok(None);
    };

    let event = match kind {
        EventKind::Status => StreamEvent::Status(typed(kind, value)?),
        EventKind::Metadata => StreamEvent::Metadata(Box::new(typed(kind, value)?)),
        EventKind::Delta => StreamEvent::Delta(typed(kind, value)?),
        EventKind::Done => StreamEvent::Done(typed(kind, value)?),
    };
    Ok(Some(event))
}

fn typed<T: DeserializeOwned>(kind: EventKind, value: Value) -> Result<T, IsdError> {
    serde_json::from_value(value).map_err(|e| IsdError::Decode {
        message: format!("malformed {kind} frame: {e}"),
        source: Some(Box::new(e)),
    })
}
