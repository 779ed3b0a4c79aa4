//! Shared fixtures for module tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::Arc;

use tanuki_client::{Config, GitLabClient, TlsPolicy};
use wiremock::MockServer;

pub const TOKEN: &str = "glpat-tools-test";

/// A mock GitLab and a client pointed at it.
pub async fn mock_gitlab() -> (MockServer, GitLabClient) {
    let server = MockServer::start().await;
    let config = Config::new(&server.uri(), TOKEN, TlsPolicy::Verify).unwrap();
    let client = GitLabClient::new(Arc::new(config));
    (server, client)
}
