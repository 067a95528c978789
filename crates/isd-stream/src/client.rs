// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the answer service.
//!
//! Provides [`QueryClient`], which posts questions to the streaming query
//! endpoint and feeds the response body to the session driver, and fetches
//! the example-question catalog.

use std::time::Duration;

use async_trait::async_trait;
use isd_config::ServerConfig;
use isd_core::types::ExampleCatalog;
use isd_core::{IsdError, QueryStreamer, SessionOutcome, StreamHandler};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::session::drive_body;

/// Media type of event-stream responses.
const EVENT_STREAM: &str = "text/event-stream";

/// Body of a query submission.
#[derive(Debug, Clone, Serialize)]
struct QueryRequest<'a> {
    question: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<&'a str>,
}

/// Body of the example-question endpoint.
#[derive(Debug, Deserialize)]
struct ExamplesResponse {
    categories: ExampleCatalog,
}

/// HTTP client for the answer service.
#[derive(Debug, Clone)]
pub struct QueryClient {
    client: reqwest::Client,
    stream_url: String,
    examples_url: String,
    conversation_id: Option<String>,
}

impl QueryClient {
    /// Builds a client from the `[server]` config section.
    ///
    /// Only a connect timeout is set. Answers may stream for a long time, so
    /// the body has no overall deadline.
    pub fn new(config: &ServerConfig) -> Result<Self, IsdError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(EVENT_STREAM));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| IsdError::Config(format!("failed to build HTTP client: {e}")))?;

        let base = config.base_url.trim_end_matches('/');
        Ok(Self {
            client,
            stream_url: format!("{base}{}", config.stream_path),
            examples_url: format!("{base}{}", config.examples_path),
            conversation_id: config.conversation_id.clone(),
        })
    }

    /// URL questions are posted to.
    pub fn stream_url(&self) -> &str {
        &self.stream_url
    }

    /// Fetches the example-question catalog, keyed by category name.
    pub async fn example_questions(&self) -> Result<ExampleCatalog, IsdError> {
        let response = self
            .client
            .get(&self.examples_url)
            .send()
            .await
            .map_err(|e| IsdError::Transport {
                message: format!("request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(IsdError::Transport {
                message: format!("HTTP error {}", status.as_u16()),
                source: None,
            });
        }

        let body = response.text().await.map_err(|e| IsdError::Transport {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        let parsed: ExamplesResponse =
            serde_json::from_str(&body).map_err(|e| IsdError::Decode {
                message: format!("malformed example catalog: {e}"),
                source: Some(Box::new(e)),
            })?;

        debug!(categories = parsed.categories.len(), "loaded example questions");
        Ok(parsed.categories)
    }
}

#[async_trait]
impl QueryStreamer for QueryClient {
    async fn stream_query(
        &self,
        question: &str,
        handler: &mut dyn StreamHandler,
    ) -> SessionOutcome {
        let request = QueryRequest {
            question,
            conversation_id: self.conversation_id.as_deref(),
        };

        let response = match self.client.post(&self.stream_url).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, url = %self.stream_url, "query request failed");
                handler.on_error(format!("request failed: {e}"));
                return SessionOutcome::TransportFailed;
            }
        };

        let status = response.status();
        debug!(status = %status, "query response received");
        if !status.is_success() {
            warn!(status = %status, "query rejected by server");
            handler.on_error(format!("HTTP error {}", status.as_u16()));
            return SessionOutcome::TransportFailed;
        }

        let outcome = drive_body(response.bytes_stream(), handler).await;
        info!(outcome = %outcome, "query stream finished");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isd_core::{DoneEvent, MetadataEvent, StatusEvent};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> QueryClient {
        QueryClient::new(&ServerConfig {
            base_url: base_url.to_string(),
            ..ServerConfig::default()
        })
        .unwrap()
    }

    #[derive(Default)]
    struct Errors(Vec<String>);

    impl StreamHandler for Errors {
        fn on_status(&mut self, _event: StatusEvent) {}
        fn on_metadata(&mut self, _event: MetadataEvent) {}
        fn on_delta(&mut self, _fragment: String) {}
        fn on_done(&mut self, _event: DoneEvent) {}
        fn on_error(&mut self, message: String) {
            self.0.push(message);
        }
    }

    #[test]
    fn urls_join_without_double_slash() {
        let client = test_client("http://localhost:8000/");
        assert_eq!(client.stream_url(), "http://localhost:8000/api/query/stream");
    }

    #[tokio::test]
    async fn request_carries_question_and_accept_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/query/stream"))
            .and(header("accept", EVENT_STREAM))
            .and(body_json(serde_json::json!({"question": "How many?"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("data: {\"type\":\"done\"}\n\n", EVENT_STREAM),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut errors = Errors::default();
        let outcome = test_client(&server.uri())
            .stream_query("How many?", &mut errors)
            .await;
        assert_eq!(outcome, SessionOutcome::Completed);
        assert!(errors.0.is_empty());
    }

    #[tokio::test]
    async fn conversation_id_is_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(
                serde_json::json!({"question": "q", "conversation_id": "conv-7"}),
            ))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("data: {\"type\":\"done\"}\n", EVENT_STREAM),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = QueryClient::new(&ServerConfig {
            base_url: server.uri(),
            conversation_id: Some("conv-7".into()),
            ..ServerConfig::default()
        })
        .unwrap();
        let outcome = client.stream_query("q", &mut Errors::default()).await;
        assert_eq!(outcome, SessionOutcome::Completed);
    }

    #[tokio::test]
    async fn non_success_status_reports_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut errors = Errors::default();
        let outcome = test_client(&server.uri()).stream_query("q", &mut errors).await;
        assert_eq!(outcome, SessionOutcome::TransportFailed);
        assert_eq!(errors.0, vec!["HTTP error 500"]);
    }

    #[tokio::test]
    async fn empty_body_reports_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let mut errors = Errors::default();
        let outcome = test_client(&server.uri()).stream_query("q", &mut errors).await;
        assert_eq!(outcome, SessionOutcome::TransportFailed);
        assert_eq!(errors.0, vec!["empty response body"]);
    }

    #[tokio::test]
    async fn unreachable_server_reports_request_failure() {
        // Bind then drop a listener so the port is closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut errors = Errors::default();
        let outcome = test_client(&format!("http://{addr}"))
            .stream_query("q", &mut errors)
            .await;
        assert_eq!(outcome, SessionOutcome::TransportFailed);
        assert_eq!(errors.0.len(), 1);
        assert!(errors.0[0].starts_with("request failed"), "got: {:?}", errors.0);
    }

    #[tokio::test]
    async fn example_questions_parse_categories() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/examples"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "categories": {
                    "Solutions": ["How many solutions exist?"],
                    "Industries": ["Which industries are covered?", "Top industry?"]
                }
            })))
            .mount(&server)
            .await;

        let catalog = test_client(&server.uri()).example_questions().await.unwrap();
        let names: Vec<_> = catalog.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Industries", "Solutions"]);
        assert_eq!(catalog["Industries"].len(), 2);
    }

    #[tokio::test]
    async fn example_questions_reject_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&server)
            .await;

        let err = test_client(&server.uri()).example_questions().await.unwrap_err();
        assert!(matches!(err, IsdError::Decode { .. }), "got: {err}");
    }

    #[tokio::test]
    async fn example_questions_surface_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = test_client(&server.uri()).example_questions().await.unwrap_err();
        assert_eq!(err.to_string(), "transport error: HTTP error 404");
    }
}
