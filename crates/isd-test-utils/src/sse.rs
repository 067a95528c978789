// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for event-stream response bodies.

use serde_json::{Value, json};

/// One `data:` record for `payload`, with its blank-line separator.
pub fn frame(payload: &Value) -> String {
    format!("data: {payload}\n\n")
}

pub fn status(phase: &str, message: &str) -> String {
    frame(&json!({"type": "status", "phase": phase, "message": message}))
}

/// A successful metadata frame reporting `row_count` rows.
pub fn metadata_ok(row_count: u64) -> String {
    frame(&json!({
        "type": "metadata",
        "success": true,
        "sql": "SELECT COUNT(*) FROM solutions",
        "explanation": "Counts all solutions.",
        "confidence": "high",
        "row_count": row_count,
    }))
}

/// A metadata frame carrying a result table.
pub fn metadata_rows(columns: &[&str], rows: Vec<Value>) -> String {
    frame(&json!({
        "type": "metadata",
        "success": true,
        "data": {"columns": columns, "rows": rows},
    }))
}

pub fn metadata_failed(error: &str) -> String {
    frame(&json!({"type": "metadata", "success": false, "error": error}))
}

pub fn delta(content: &str) -> String {
    frame(&json!({"type": "delta", "content": content}))
}

pub fn done(elapsed_time: f64) -> String {
    frame(&json!({"type": "done", "elapsed_time": elapsed_time}))
}

/// Concatenates frames into one body.
pub fn body<I, S>(frames: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    frames.into_iter().map(|f| f.as_ref().to_owned()).collect()
}

/// Splits `body` into chunks of at most `size` bytes, ignoring character
/// and line boundaries.
pub fn chunked(body: &str, size: usize) -> Vec<Vec<u8>> {
    body.as_bytes()
        .chunks(size.max(1))
        .map(<[u8]>::to_vec)
        .collect()
}

/// The body of the canonical "How many solutions exist?" answer.
pub fn solution_count_answer() -> String {
    body([
        status("thinking", "Analyzing..."),
        metadata_ok(42),
        delta("There are "),
        delta("42 solutions."),
        done(1.2),
    ])
}
