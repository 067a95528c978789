// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `isd ask` and `isd examples` command implementations.

use isd_config::IsdConfig;
use isd_core::{IsdError, QueryStreamer, Settlement, TurnState};
use isd_export::{ExportFormat, export_to_dir};
use isd_stream::QueryClient;
use isd_transcript::TurnController;

use crate::render::{TerminalRenderer, write_examples};

/// Runs one question/answer cycle, streaming the answer to stdout.
///
/// Returns `Ok(false)` when the answer settled in error.
pub async fn run_ask(
    config: &IsdConfig,
    question: &str,
    export: Option<ExportFormat>,
) -> Result<bool, IsdError> {
    let client = QueryClient::new(&config.server)?;
    let mut controller = TurnController::new(client);
    controller.set_observer(Box::new(TerminalRenderer::stdout()));

    let succeeded = ask(&mut controller, question).await?;

    if let Some(format) = export {
        let path = export_to_dir(controller.transcript().turns(), format, &config.export)?;
        println!("exported to {}", path.display());
    }
    Ok(succeeded)
}

/// Submits `question` and reports whether the answer settled without error.
pub async fn ask<S: QueryStreamer>(
    controller: &mut TurnController<S>,
    question: &str,
) -> Result<bool, IsdError> {
    let id = controller.submit(question).await?;
    let failed = controller
        .transcript()
        .get(id)
        .is_none_or(|turn| turn.state == TurnState::Settled(Settlement::Failed));
    Ok(!failed)
}

/// Prints the server's example questions.
pub async fn run_examples(config: &IsdConfig) -> Result<(), IsdError> {
    let client = QueryClient::new(&config.server)?;
    let catalog = client.example_questions().await?;
    write_examples(&mut std::io::stdout().lock(), &catalog)
        .map_err(|e| IsdError::Internal(format!("failed to write to stdout: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use isd_core::Rejection;
    use isd_test_utils::{Script, ScriptedStreamer, sse};

    #[tokio::test]
    async fn completed_answer_succeeds() {
        let streamer = ScriptedStreamer::with_scripts(vec![Script::body(sse::solution_count_answer())]);
        let mut controller = TurnController::new(streamer);
        assert!(ask(&mut controller, "How many solutions exist?").await.unwrap());
    }

    #[tokio::test]
    async fn silent_end_still_succeeds() {
        let streamer =
            ScriptedStreamer::with_scripts(vec![Script::body(sse::status("thinking", "..."))]);
        let mut controller = TurnController::new(streamer);
        assert!(ask(&mut controller, "q").await.unwrap());
    }

    #[tokio::test]
    async fn failed_answer_reports_failure() {
        let streamer = ScriptedStreamer::with_scripts(vec![Script::Reject("HTTP error 500".into())]);
        let mut controller = TurnController::new(streamer);
        assert!(!ask(&mut controller, "q").await.unwrap());

        let streamer =
            ScriptedStreamer::with_scripts(vec![Script::body(sse::metadata_failed("bad SQL"))]);
        let mut controller = TurnController::new(streamer);
        assert!(!ask(&mut controller, "q").await.unwrap());
    }

    #[tokio::test]
    async fn empty_question_is_an_error() {
        let mut controller = TurnController::new(ScriptedStreamer::new());
        let err = ask(&mut controller, " ").await.unwrap_err();
        assert!(matches!(err, IsdError::Rejected(Rejection::EmptyQuestion)));
    }
}
