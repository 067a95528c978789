// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted query streamer for deterministic testing.
//!
//! `ScriptedStreamer` implements `QueryStreamer` by replaying queued response
//! bodies through the real session driver, so tests exercise reassembly and
//! decoding without a network.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use tokio::sync::Mutex;

use isd_core::{QueryStreamer, SessionOutcome, StreamHandler};
use isd_stream::drive_body;

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum Script {
    /// The body arrives as these chunks, then the transport closes.
    Body(Vec<Vec<u8>>),
    /// The body arrives as these chunks, then the transport breaks.
    Broken { chunks: Vec<Vec<u8>>, error: String },
    /// The request fails before any byte arrives.
    Reject(String),
}

impl Script {
    /// A body delivered in one chunk.
    pub fn body(text: impl Into<String>) -> Self {
        Script::Body(vec![text.into().into_bytes()])
    }
}

/// A query streamer that replays pre-configured scripts.
///
/// Scripts are popped from a FIFO queue. When the queue is empty the request
/// is rejected with "no scripted response".
#[derive(Clone, Default)]
pub struct ScriptedStreamer {
    scripts: Arc<Mutex<VecDeque<Script>>>,
    questions: Arc<Mutex<Vec<String>>>,
}

impl ScriptedStreamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scripts(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Arc::new(Mutex::new(VecDeque::from(scripts))),
            ..Self::default()
        }
    }

    pub async fn push(&self, script: Script) {
        self.scripts.lock().await.push_back(script);
    }

    /// Questions received so far, in order.
    pub async fn questions(&self) -> Vec<String> {
        self.questions.lock().await.clone()
    }
}

#[async_trait]
impl QueryStreamer for ScriptedStreamer {
    async fn stream_query(
        &self,
        question: &str,
        handler: &mut dyn StreamHandler,
    ) -> SessionOutcome {
        self.questions.lock().await.push(question.to_string());
        let script = self.scripts.lock().await.pop_front();

        let (chunks, error) = match script {
            Some(Script::Body(chunks)) => (chunks, None),
            Some(Script::Broken { chunks, error }) => (chunks, Some(error)),
            Some(Script::Reject(message)) => {
                handler.on_error(message);
                return SessionOutcome::TransportFailed;
            }
            None => {
                handler.on_error("no scripted response".to_string());
                return SessionOutcome::TransportFailed;
            }
        };

        let items = chunks
            .into_iter()
            .map(Ok)
            .chain(error.map(Err))
            .collect::<Vec<Result<Vec<u8>, String>>>();
        drive_body(stream::iter(items), handler).await
    }
}
