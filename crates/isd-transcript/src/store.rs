// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Versioned, observable transcript storage.
//!
//! The transcript exclusively owns its turns. Callers never hold references
//! across updates: every mutation goes through [`Transcript::replace_with`],
//! which swaps a turn for a modified copy, bumps the version, and notifies the
//! observer.

use isd_core::{IsdError, Rejection, Turn, TurnId};
use tracing::debug;

/// A committed transcript mutation, as seen by an observer.
#[derive(Debug, Clone, Copy)]
pub enum Change<'a> {
    /// A turn was added at the end.
    Appended(&'a Turn),
    /// A turn was replaced by an updated copy.
    Replaced { before: &'a Turn, after: &'a Turn },
    /// All turns were removed.
    Cleared,
}

/// Receives every committed change, in order.
pub trait TranscriptObserver: Send {
    fn observe(&mut self, version: u64, change: Change<'_>);
}

/// Ordered sequence of turns; insertion order is chronological order.
#[derive(Default)]
pub struct Transcript {
    turns: Vec<Turn>,
    version: u64,
    observer: Option<Box<dyn TranscriptObserver>>,
}

impl std::fmt::Debug for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcript")
            .field("turns", &self.turns)
            .field("version", &self.version)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `observer`, replacing any previous one.
    pub fn set_observer(&mut self, observer: Box<dyn TranscriptObserver>) {
        self.observer = Some(observer);
    }

    /// Bumped on every append, replace and clear.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn get(&self, id: TurnId) -> Option<&Turn> {
        self.turns.iter().find(|t| t.id == id)
    }

    /// The turn that has not settled yet, if any.
    pub fn streaming_turn(&self) -> Option<&Turn> {
        self.turns.iter().find(|t| t.is_streaming())
    }

    /// Appends `turn` and returns its identifier.
    pub fn push(&mut self, turn: Turn) -> TurnId {
        let id = turn.id;
        self.turns.push(turn);
        self.version += 1;
        if let (Some(observer), Some(turn)) = (self.observer.as_mut(), self.turns.last()) {
            observer.observe(self.version, Change::Appended(turn));
        }
        id
    }

    /// Replaces turn `id` with `update(current)`.
    ///
    /// The new turn keeps the identifier of the one it replaces.
    pub fn replace_with(
        &mut self,
        id: TurnId,
        update: impl FnOnce(&Turn) -> Turn,
    ) -> Result<&Turn, IsdError> {
        let index = self
            .turns
            .iter()
            .position(|t| t.id == id)
            .ok_or(IsdError::TurnNotFound(id))?;

        let mut next = update(&self.turns[index]);
        next.id = id;
        let before = std::mem::replace(&mut self.turns[index], next);
        self.version += 1;

        let after = &self.turns[index];
        if let Some(observer) = self.observer.as_mut() {
            observer.observe(
                self.version,
                Change::Replaced {
                    before: &before,
                    after,
                },
            );
        }
        Ok(after)
    }

    /// Removes every turn. Refused while a turn is still streaming.
    pub fn clear(&mut self) -> Result<(), IsdError> {
        if let Some(turn) = self.streaming_turn() {
            debug!(turn = %turn.id, "refusing to clear while streaming");
            return Err(IsdError::Rejected(Rejection::Busy));
        }
        self.turns.clear();
        self.version += 1;
        if let Some(observer) = self.observer.as_mut() {
            observer.observe(self.version, Change::Cleared);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Observer that records `(version, description)` pairs.
    #[derive(Clone, Default)]
    struct Log(Arc<Mutex<Vec<(u64, String)>>>);

    impl TranscriptObserver for Log {
        fn observe(&mut self, version: u64, change: Change<'_>) {
            let entry = match change {
                Change::Appended(turn) => format!("append:{}", turn.content),
                Change::Replaced { before, after } => {
                    format!("replace:{}->{}", before.content, after.content)
                }
                Change::Cleared => "clear".to_string(),
            };
            self.0.lock().unwrap().push((version, entry));
        }
    }

    #[test]
    fn push_preserves_order_and_bumps_version() {
        let mut transcript = Transcript::new();
        let a = transcript.push(Turn::user("first"));
        let b = transcript.push(Turn::user("second"));

        assert_eq!(transcript.version(), 2);
        let ids: Vec<_> = transcript.turns().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn replace_touches_only_the_target_turn() {
        let mut transcript = Transcript::new();
        let a = transcript.push(Turn::user("first"));
        let b = transcript.push(Turn::user("second"));

        transcript
            .replace_with(b, |t| Turn {
                content: "edited".into(),
                ..t.clone()
            })
            .unwrap();

        assert_eq!(transcript.get(a).unwrap().content, "first");
        assert_eq!(transcript.get(b).unwrap().content, "edited");
        assert_eq!(transcript.version(), 3);
    }

    #[test]
    fn replace_cannot_change_the_identifier() {
        let mut transcript = Transcript::new();
        let id = transcript.push(Turn::user("q"));
        transcript.replace_with(id, |_| Turn::user("other")).unwrap();
        assert_eq!(transcript.get(id).unwrap().content, "other");
    }

    #[test]
    fn replace_unknown_turn_fails() {
        let mut transcript = Transcript::new();
        let missing = TurnId::new();
        let err = transcript.replace_with(missing, Turn::clone).unwrap_err();
        assert!(matches!(err, IsdError::TurnNotFound(id) if id == missing));
        assert_eq!(transcript.version(), 0);
    }

    #[test]
    fn observer_sees_every_change_in_order() {
        let log = Log::default();
        let mut transcript = Transcript::new();
        transcript.set_observer(Box::new(log.clone()));

        let id = transcript.push(Turn::user("a"));
        transcript
            .replace_with(id, |t| Turn {
                content: "b".into(),
                ..t.clone()
            })
            .unwrap();
        transcript.clear().unwrap();

        assert_eq!(
            *log.0.lock().unwrap(),
            vec![
                (1, "append:a".to_string()),
                (2, "replace:a->b".to_string()),
                (3, "clear".to_string()),
            ]
        );
    }

    #[test]
    fn clear_is_refused_while_streaming() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user("q"));
        transcript.push(Turn::assistant_placeholder());

        let err = transcript.clear().unwrap_err();
        assert!(matches!(err, IsdError::Rejected(Rejection::Busy)));
        assert_eq!(transcript.len(), 2);
    }
}
