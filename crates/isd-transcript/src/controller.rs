// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn controller: admits one question at a time and sees it through.

use isd_core::{IsdError, QueryStreamer, Rejection, SessionOutcome, Turn, TurnId};
use tracing::{info, warn};

use crate::reducer::{self, TurnReducer};
use crate::store::{Transcript, TranscriptObserver};

/// Orchestrates question/answer cycles over a single transcript.
///
/// At most one turn streams at a time. A submission appends the user turn and
/// an assistant placeholder, runs the stream session with a [`TurnReducer`]
/// bound to the placeholder, and guarantees the placeholder is settled when
/// the session returns, whatever the outcome.
#[derive(Debug)]
pub struct TurnController<S> {
    streamer: S,
    transcript: Transcript,
    in_flight: Option<TurnId>,
}

impl<S: QueryStreamer> TurnController<S> {
    pub fn new(streamer: S) -> Self {
        Self::with_transcript(streamer, Transcript::new())
    }

    pub fn with_transcript(streamer: S, transcript: Transcript) -> Self {
        Self {
            streamer,
            transcript,
            in_flight: None,
        }
    }

    pub fn streamer(&self) -> &S {
        &self.streamer
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Installs a transcript observer for rendering.
    pub fn set_observer(&mut self, observer: Box<dyn TranscriptObserver>) {
        self.transcript.set_observer(observer);
    }

    /// True while a submission is between admission and settlement.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Asks `question` and returns the assistant turn once it has settled.
    ///
    /// Fails only on admission: an empty question or another turn still in
    /// flight. Transport and server failures settle the turn in its error
    /// state instead.
    pub async fn submit(&mut self, question: &str) -> Result<TurnId, IsdError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(IsdError::Rejected(Rejection::EmptyQuestion));
        }
        if self.in_flight.is_some() || self.transcript.streaming_turn().is_some() {
            return Err(IsdError::Rejected(Rejection::Busy));
        }

        self.transcript.push(Turn::user(question));
        let id = self.transcript.push(Turn::assistant_placeholder());
        self.in_flight = Some(id);
        info!(turn = %id, question, "turn created");

        let outcome = {
            let mut reducer = TurnReducer::new(&mut self.transcript, id, question);
            self.streamer.stream_query(question, &mut reducer).await
        };

        self.settle(id, outcome);
        Ok(id)
    }

    /// Settles a turn whose submission future was dropped mid-stream.
    ///
    /// Returns the abandoned turn, if there was one.
    pub fn abandon(&mut self) -> Option<TurnId> {
        let id = self.in_flight?;
        warn!(turn = %id, "abandoning in-flight turn");
        self.settle(id, SessionOutcome::EndedWithoutDone);
        Some(id)
    }

    /// User-initiated bulk clear. Refused while a turn is in flight.
    pub fn clear(&mut self) -> Result<(), IsdError> {
        if self.in_flight.is_some() {
            return Err(IsdError::Rejected(Rejection::Busy));
        }
        self.transcript.clear()
    }

    fn settle(&mut self, id: TurnId, outcome: SessionOutcome) {
        match reducer::finalize_dangling(&mut self.transcript, id) {
            Ok(true) => info!(turn = %id, %outcome, "turn settled without a terminal event"),
            Ok(false) => info!(turn = %id, %outcome, "stream session finished"),
            Err(e) => warn!(turn = %id, error = %e, "could not finalize turn"),
        }
        self.in_flight = None;
    }
}
