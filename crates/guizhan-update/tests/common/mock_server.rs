//! Wiremock helpers for the mirror API

use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::constants::*;

/// Serve `body` from the build-info endpoint
pub async fn mock_latest(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path(LATEST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Make the build-info endpoint answer with `status`
pub async fn mock_latest_status(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path(LATEST_PATH))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Serve `content` as the artifact
pub async fn mock_artifact(server: &MockServer, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(ARTIFACT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(server)
        .await;
}

/// Fail the test if the artifact is requested
pub async fn expect_no_artifact_request(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(ARTIFACT_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

/// Make the artifact endpoint answer with `status`
pub async fn mock_artifact_status(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path(ARTIFACT_PATH))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
