//! Shared helpers for integration tests against a mocked conversion
//! service.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use streamvert::api::{ApiClient, Job};
use streamvert::config::ApiConfig;
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

/// Client pointed at the mock server.
pub fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&ApiConfig {
        base_url: server.uri(),
    })
}

/// Wire-shaped job fixture. `done` jobs get an output URL.
pub fn job_json(id: &str, status: &str, source: &str) -> Value {
    let output_url = if status == "done" {
        Value::from(format!("/converted/{}.mp4", id))
    } else {
        Value::Null
    };

    json!({
        "id": id,
        "status": status,
        "source": source,
        "output_file": format!("{}.mp4", id),
        "output_url": output_url,
        "error": null,
        "created_at": "2026-08-07T12:00:00Z",
    })
}

/// Job fixture in `error` state with the given failure text.
pub fn failed_job_json(id: &str, source: &str, error: &str) -> Value {
    json!({
        "id": id,
        "status": "error",
        "source": source,
        "output_file": format!("{}.mp4", id),
        "output_url": null,
        "error": error,
        "created_at": "2026-08-07T12:00:00Z",
    })
}

/// Typed job built from the same fixture the mock server serves.
pub fn job(id: &str, status: &str, source: &str) -> Job {
    serde_json::from_value(job_json(id, status, source)).unwrap()
}

/// Responds with each template once, in order, then repeats the last.
pub struct SequenceResponder {
    responses: Vec<ResponseTemplate>,
    cursor: AtomicUsize,
}

impl SequenceResponder {
    pub fn new(responses: Vec<ResponseTemplate>) -> Self {
        assert!(!responses.is_empty(), "need at least one response");
        Self {
            responses,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl Respond for SequenceResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let index = self
            .cursor
            .fetch_add(1, Ordering::SeqCst)
            .min(self.responses.len() - 1);
        self.responses[index].clone()
    }
}
