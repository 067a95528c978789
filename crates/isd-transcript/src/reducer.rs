// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transcript merge reducer.
//!
//! Each `apply_*` function maps the current turn and one stream event to the
//! turn's next value; [`TurnReducer`] binds them to a transcript and a turn
//! identifier so a stream session can drive them as callbacks. Settled turns
//! are never modified again.

use isd_core::types::CLARIFICATION_PROMPT;
use isd_core::{
    Answer, DoneEvent, IsdError, MetadataEvent, Settlement, StatusEvent, StreamHandler, Turn,
    TurnId, TurnState,
};
use tracing::{debug, info, warn};

use crate::store::Transcript;

/// Phase label once results are in and the narrative is being written.
pub const WRITING_PHASE: &str = "writing";

/// Fallback text for a failure reported without details.
const UNKNOWN_ERROR: &str = "Unknown error";

/// True once a metadata event has been merged.
fn has_results(answer: &Answer) -> bool {
    answer.success || answer.needs_clarification
}

/// Status update: most recent message and phase win.
///
/// The status message becomes the display text until results arrive.
pub fn apply_status(turn: &Turn, question: &str, event: &StatusEvent) -> Turn {
    let mut next = turn.clone();
    let answer = next
        .answer
        .get_or_insert_with(|| Answer::for_question(question));
    answer.status = Some(event.message.clone());
    if !has_results(answer) {
        next.content = event.message.clone();
    }
    next.phase = Some(event.phase.clone());
    next.state = TurnState::Streaming;
    next
}

/// Results: every metadata field is copied over, last write wins.
///
/// A failure payload takes the error transition instead.
pub fn apply_metadata(turn: &Turn, question: &str, event: MetadataEvent) -> Turn {
    if event.is_failure() {
        let message = event.error.unwrap_or_else(|| UNKNOWN_ERROR.to_string());
        return apply_error(turn, question, &message);
    }

    let row_count = event.normalized_row_count();
    let (columns, rows) = event
        .data
        .map(|data| (data.columns, data.rows))
        .unwrap_or_default();

    let mut next = turn.clone();
    let answer = next
        .answer
        .get_or_insert_with(|| Answer::for_question(question));
    answer.question = question.to_string();
    answer.success = true;
    answer.error = None;
    answer.intent = event.intent;
    answer.sql = event.sql;
    answer.explanation = event.explanation;
    answer.confidence = event.confidence;
    answer.insights = event.insights;
    answer.columns = columns;
    answer.rows = rows;
    answer.row_count = row_count;
    answer.needs_clarification = event.needs_clarification;
    answer.clarification_question = event.clarification_question;
    answer.suggested_refinements = event.suggested_refinements;
    answer.timestamp = event.timestamp;

    next.content = if event.needs_clarification {
        CLARIFICATION_PROMPT.to_string()
    } else {
        format!("Found {row_count} results")
    };
    next.phase = Some(WRITING_PHASE.to_string());
    next.state = TurnState::Streaming;
    next
}

/// Narrative fragment: appended, nothing else changes.
pub fn apply_delta(turn: &Turn, question: &str, fragment: &str) -> Turn {
    let mut next = turn.clone();
    next.answer
        .get_or_insert_with(|| Answer::for_question(question))
        .narrative
        .get_or_insert_with(String::new)
        .push_str(fragment);
    next.state = TurnState::Streaming;
    next
}

/// Normal completion: merge completion fields and settle.
pub fn apply_done(turn: &Turn, question: &str, event: DoneEvent) -> Turn {
    let mut next = turn.clone();
    let answer = next
        .answer
        .get_or_insert_with(|| Answer::for_question(question));
    answer.web_sources = event.web_sources;
    answer.usage_stats = event.usage_stats;
    answer.elapsed_time = event.elapsed_time;
    next.phase = None;
    next.state = TurnState::Settled(Settlement::Completed);
    next
}

/// Failure: the answer is replaced by an error record and the turn settles.
pub fn apply_error(turn: &Turn, question: &str, message: &str) -> Turn {
    Turn {
        content: format!("Error: {message}"),
        answer: Some(Answer::failed(question, message)),
        phase: None,
        state: TurnState::Settled(Settlement::Failed),
        ..turn.clone()
    }
}

/// Settles turn `id` if the stream ended without a terminal event.
///
/// Only the state changes. Returns whether anything was written; calling it
/// on an already settled turn is a no-op.
pub fn finalize_dangling(transcript: &mut Transcript, id: TurnId) -> Result<bool, IsdError> {
    let turn = transcript.get(id).ok_or(IsdError::TurnNotFound(id))?;
    if turn.state.is_settled() {
        return Ok(false);
    }
    transcript.replace_with(id, |turn| Turn {
        state: TurnState::Settled(Settlement::Dangling),
        ..turn.clone()
    })?;
    warn!(turn = %id, "stream ended without a terminal event");
    Ok(true)
}

/// Binds the merge functions to one turn of a transcript.
pub struct TurnReducer<'a> {
    transcript: &'a mut Transcript,
    turn: TurnId,
    question: String,
}

impl<'a> TurnReducer<'a> {
    pub fn new(transcript: &'a mut Transcript, turn: TurnId, question: impl Into<String>) -> Self {
        Self {
            transcript,
            turn,
            question: question.into(),
        }
    }

    fn merge(&mut self, event: &'static str, update: impl FnOnce(&Turn, &str) -> Turn) {
        match self.transcript.get(self.turn) {
            None => {
                warn!(turn = %self.turn, event, "event for a turn that is not in the transcript");
                return;
            }
            Some(turn) if turn.state.is_settled() => {
                warn!(turn = %self.turn, event, "ignoring event for a settled turn");
                return;
            }
            Some(_) => {}
        }

        let question = self.question.as_str();
        match self.transcript.replace_with(self.turn, |turn| update(turn, question)) {
            Ok(turn) => {
                if let TurnState::Settled(settlement) = turn.state {
                    info!(turn = %turn.id, %settlement, "turn settled");
                } else {
                    debug!(turn = %turn.id, event, "merged event");
                }
            }
            Err(e) => warn!(turn = %self.turn, error = %e, "failed to merge event"),
        }
    }
}

impl StreamHandler for TurnReducer<'_> {
    fn on_status(&mut self, event: StatusEvent) {
        self.merge("status", |turn, question| apply_status(turn, question, &event));
    }

    fn on_metadata(&mut self, event: MetadataEvent) {
        self.merge("metadata", |turn, question| apply_metadata(turn, question, event));
    }

    fn on_delta(&mut self, fragment: String) {
        self.merge("delta", |turn, question| apply_delta(turn, question, &fragment));
    }

    fn on_done(&mut self, event: DoneEvent) {
        self.merge("done", |turn, question| apply_done(turn, question, event));
    }

    fn on_error(&mut self, message: String) {
        self.merge("error", |turn, question| apply_error(turn, question, &message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isd_core::events::ResultData;
    use serde_json::json;

    const QUESTION: &str = "How many solutions exist?";

    fn setup() -> (Transcript, TurnId) {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user(QUESTION));
        let id = transcript.push(Turn::assistant_placeholder());
        (transcript, id)
    }

    fn status(phase: &str, message: &str) -> StatusEvent {
        StatusEvent {
            phase: phase.into(),
            message: message.into(),
        }
    }

    fn ok_metadata(row_count: Option<u64>) -> MetadataEvent {
        MetadataEvent {
            success: Some(true),
            sql: Some("SELECT COUNT(*) FROM solutions".into()),
            row_count,
            ..MetadataEvent::default()
        }
    }

    #[test]
    fn full_answer_scenario() {
        let (mut transcript, id) = setup();
        {
            let mut reducer = TurnReducer::new(&mut transcript, id, QUESTION);
            reducer.on_status(status("thinking", "Analyzing..."));
            reducer.on_metadata(ok_metadata(Some(42)));
            reducer.on_delta("There are ".into());
            reducer.on_delta("42 solutions.".into());
            reducer.on_done(DoneEvent {
                elapsed_time: Some(1.2),
                ..DoneEvent::default()
            });
        }

        let turn = transcript.get(id).unwrap();
        assert_eq!(turn.content, "Found 42 results");
        assert_eq!(turn.narrative(), Some("There are 42 solutions."));
        let answer = turn.answer.as_ref().unwrap();
        assert_eq!(answer.row_count, 42);
        assert_eq!(answer.elapsed_time, Some(1.2));
        assert_eq!(answer.question, QUESTION);
        assert!(!turn.is_streaming());
        assert_eq!(turn.state, TurnState::Settled(Settlement::Completed));
        assert_eq!(turn.phase, None);
    }

    #[test]
    fn status_sets_content_phase_and_streaming() {
        let (mut transcript, id) = setup();
        let mut reducer = TurnReducer::new(&mut transcript, id, QUESTION);
        reducer.on_status(status("thinking", "Analyzing..."));
        reducer.on_status(status("sql", "Generating SQL..."));

        let turn = transcript.get(id).unwrap();
        assert_eq!(turn.content, "Generating SQL...");
        assert_eq!(turn.phase.as_deref(), Some("sql"));
        assert_eq!(turn.state, TurnState::Streaming);
        assert_eq!(
            turn.answer.as_ref().unwrap().status.as_deref(),
            Some("Generating SQL...")
        );
    }

    #[test]
    fn status_after_metadata_keeps_summary() {
        let turn = Turn::assistant_placeholder();
        let turn = apply_metadata(&turn, QUESTION, ok_metadata(Some(3)));
        let turn = apply_status(&turn, QUESTION, &status("insights", "Writing insights..."));
        assert_eq!(turn.content, "Found 3 results");
        assert_eq!(turn.phase.as_deref(), Some("insights"));
    }

    #[test]
    fn deltas_concatenate_in_arrival_order() {
        let turn = Turn::assistant_placeholder();
        let abc = ["A", "B", "C"]
            .iter()
            .fold(turn.clone(), |t, f| apply_delta(&t, QUESTION, f));
        let cab = ["C", "A", "B"]
            .iter()
            .fold(turn, |t, f| apply_delta(&t, QUESTION, f));
        assert_eq!(abc.narrative(), Some("ABC"));
        assert_eq!(cab.narrative(), Some("CAB"));
    }

    #[test]
    fn narrative_is_a_growing_prefix() {
        let mut turn = Turn::assistant_placeholder();
        let mut seen: Vec<String> = Vec::new();
        for fragment in ["The ", "top ", "industry ", "is retail."] {
            turn = apply_delta(&turn, QUESTION, fragment);
            seen.push(turn.narrative().unwrap().to_string());
        }
        let last = seen.last().unwrap();
        assert!(seen.iter().all(|s| last.starts_with(s.as_str())));
    }

    #[test]
    fn delta_changes_nothing_but_the_narrative() {
        let turn = apply_status(
            &Turn::assistant_placeholder(),
            QUESTION,
            &status("thinking", "Analyzing..."),
        );
        let next = apply_delta(&turn, QUESTION, "x");
        assert_eq!(next.content, turn.content);
        assert_eq!(next.phase, turn.phase);
        assert_eq!(
            next.answer.as_ref().unwrap().status,
            turn.answer.as_ref().unwrap().status
        );
    }

    #[test]
    fn metadata_copies_rows_and_normalizes_count() {
        let mut row = isd_core::types::Row::new();
        row.insert("solutionName".into(), json!("Contoso Insights"));
        let event = MetadataEvent {
            success: Some(true),
            data: Some(ResultData {
                columns: vec!["solutionName".into()],
                rows: vec![row.clone(), row],
            }),
            confidence: Some("high".into()),
            insights: Some(json!({"follow_up_questions": ["Which partners?"]})),
            ..MetadataEvent::default()
        };

        let turn = apply_metadata(&Turn::assistant_placeholder(), QUESTION, event);
        let answer = turn.answer.as_ref().unwrap();
        assert_eq!(answer.row_count, 2);
        assert_eq!(answer.rows.len(), 2);
        assert_eq!(answer.columns, vec!["solutionName"]);
        assert_eq!(answer.confidence.as_deref(), Some("high"));
        assert_eq!(answer.follow_up_questions(), vec!["Which partners?"]);
        assert_eq!(turn.content, "Found 2 results");
        assert_eq!(turn.phase.as_deref(), Some(WRITING_PHASE));
        assert!(turn.is_streaming());
    }

    #[test]
    fn metadata_without_rows_counts_zero() {
        let turn = apply_metadata(&Turn::assistant_placeholder(), QUESTION, ok_metadata(None));
        assert_eq!(turn.answer.unwrap().row_count, 0);
        assert_eq!(turn.content, "Found 0 results");
    }

    #[test]
    fn clarification_request_sets_prompt() {
        let event = MetadataEvent {
            success: Some(true),
            needs_clarification: true,
            clarification_question: Some("Which region?".into()),
            suggested_refinements: vec!["Europe".into(), "Asia".into()],
            ..MetadataEvent::default()
        };
        let turn = apply_metadata(&Turn::assistant_placeholder(), QUESTION, event);
        assert_eq!(turn.content, CLARIFICATION_PROMPT);
        let answer = turn.answer.unwrap();
        assert_eq!(answer.clarification_question.as_deref(), Some("Which region?"));
        assert_eq!(answer.suggested_refinements.len(), 2);
    }

    #[test]
    fn duplicate_metadata_is_last_write_wins() {
        let turn = Turn::assistant_placeholder();
        let turn = apply_metadata(&turn, QUESTION, ok_metadata(Some(5)));
        let turn = apply_delta(&turn, QUESTION, "kept");
        let turn = apply_metadata(&turn, QUESTION, ok_metadata(Some(7)));
        assert_eq!(turn.content, "Found 7 results");
        assert_eq!(turn.answer.as_ref().unwrap().row_count, 7);
        assert_eq!(turn.narrative(), Some("kept"));
    }

    #[test]
    fn failing_metadata_takes_the_error_transition() {
        let (mut transcript, id) = setup();
        let mut reducer = TurnReducer::new(&mut transcript, id, QUESTION);
        reducer.on_metadata(MetadataEvent {
            success: Some(false),
            error: Some("Invalid column".into()),
            ..MetadataEvent::default()
        });
        reducer.on_delta("late".into());

        let turn = transcript.get(id).unwrap();
        let answer = turn.answer.as_ref().unwrap();
        assert_eq!(answer.error.as_deref(), Some("Invalid column"));
        assert_eq!(turn.content, "Error: Invalid column");
        assert!(!turn.is_streaming());
        assert_eq!(turn.narrative(), None);
    }

    #[test]
    fn error_replaces_answer_with_error_record() {
        let turn = apply_delta(&Turn::assistant_placeholder(), QUESTION, "partial");
        let turn = apply_error(&turn, QUESTION, "HTTP error 500");
        assert_eq!(turn.content, "Error: HTTP error 500");
        assert_eq!(turn.state, TurnState::Settled(Settlement::Failed));
        let answer = turn.answer.unwrap();
        assert_eq!(answer.error.as_deref(), Some("HTTP error 500"));
        assert_eq!(answer.row_count, 0);
        assert_eq!(answer.question, QUESTION);
        assert!(answer.narrative.is_none());
    }

    #[test]
    fn settled_turn_ignores_late_events() {
        let (mut transcript, id) = setup();
        let mut reducer = TurnReducer::new(&mut transcript, id, QUESTION);
        reducer.on_done(DoneEvent::default());
        reducer.on_status(status("thinking", "again"));
        reducer.on_delta("late".into());
        reducer.on_error("late error".into());

        let turn = transcript.get(id).unwrap();
        assert_eq!(turn.state, TurnState::Settled(Settlement::Completed));
        assert!(turn.content.is_empty());
        assert_eq!(turn.narrative(), None);
    }

    #[test]
    fn dangling_stream_keeps_last_status() {
        let (mut transcript, id) = setup();
        TurnReducer::new(&mut transcript, id, QUESTION)
            .on_status(status("thinking", "Analyzing..."));

        assert!(finalize_dangling(&mut transcript, id).unwrap());
        let turn = transcript.get(id).unwrap();
        assert!(!turn.is_streaming());
        assert_eq!(turn.state, TurnState::Settled(Settlement::Dangling));
        assert_eq!(turn.content, "Analyzing...");
    }

    #[test]
    fn finalize_twice_changes_nothing() {
        let (mut transcript, id) = setup();
        TurnReducer::new(&mut transcript, id, QUESTION).on_delta("x".into());
        finalize_dangling(&mut transcript, id).unwrap();

        let snapshot = transcript.get(id).unwrap().clone();
        let version = transcript.version();
        assert!(!finalize_dangling(&mut transcript, id).unwrap());
        assert_eq!(transcript.get(id).unwrap(), &snapshot);
        assert_eq!(transcript.version(), version);
    }

    #[test]
    fn finalize_does_not_touch_completed_turn() {
        let (mut transcript, id) = setup();
        TurnReducer::new(&mut transcript, id, QUESTION).on_done(DoneEvent::default());
        assert!(!finalize_dangling(&mut transcript, id).unwrap());
        assert_eq!(
            transcript.get(id).unwrap().state,
            TurnState::Settled(Settlement::Completed)
        );
    }

    #[test]
    fn other_turns_are_untouched() {
        let (mut transcript, id) = setup();
        let before = transcript.turns()[0].clone();
        TurnReducer::new(&mut transcript, id, QUESTION).on_error("boom".into());
        assert_eq!(transcript.turns()[0], before);
    }
}
