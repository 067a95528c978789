// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON transcript encoder.

use chrono::{DateTime, Utc};
use isd_core::{IsdError, Turn};
use serde::Serialize;

use crate::total_queries;

#[derive(Serialize)]
struct Document<'a> {
    timestamp: DateTime<Utc>,
    total_queries: usize,
    messages: &'a [Turn],
}

/// Renders the transcript as pretty-printed JSON.
pub fn render(turns: &[Turn], exported_at: DateTime<Utc>) -> Result<String, IsdError> {
    let document = Document {
        timestamp: exported_at,
        total_queries: total_queries(turns),
        messages: turns,
    };
    serde_json::to_string_pretty(&document).map_err(|e| IsdError::Export {
        message: format!("failed to encode transcript: {e}"),
        source: Some(Box::new(e)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use isd_core::Answer;
    use serde_json::Value;

    #[test]
    fn document_shape() {
        let turns = vec![
            Turn::user("How many solutions exist?"),
            Turn {
                content: "Found 42 results".into(),
                answer: Some(Answer {
                    row_count: 42,
                    narrative: Some("There are 42 solutions.".into()),
                    ..Answer::for_question("How many solutions exist?")
                }),
                ..Turn::assistant_placeholder()
            },
        ];
        let json: Value = serde_json::from_str(&render(&turns, Utc::now()).unwrap()).unwrap();

        assert_eq!(json["total_queries"], 1);
        assert!(json["timestamp"].is_string());
        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[1]["answer"]["row_count"], 42);
        assert_eq!(messages[1]["answer"]["narrative"], "There are 42 solutions.");
    }

    #[test]
    fn messages_deserialize_back_into_turns() {
        let turns = vec![Turn::user("q")];
        let json: Value = serde_json::from_str(&render(&turns, Utc::now()).unwrap()).unwrap();
        let back: Vec<Turn> = serde_json::from_value(json["messages"].clone()).unwrap();
        assert_eq!(back, turns);
    }
}
