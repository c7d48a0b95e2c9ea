//! Mock Conformity deployment using wiremock for integration testing.

#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use conformity_client::{ApiAuth, ConformityClient, RetryPolicy};

pub const TEST_API_KEY: &str = "test-api-key";

/// A mock deployment endpoint with helpers for the common scenarios.
pub struct MockConformityServer {
    server: MockServer,
}

impl MockConformityServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// A client with zero backoff so retry tests run instantly.
    pub fn client(&self) -> ConformityClient {
        ConformityClient::with_http_client(
            self.uri(),
            ApiAuth::new(TEST_API_KEY),
            reqwest::Client::new(),
        )
        .with_retry_policy(RetryPolicy::new(3, 0))
    }

    pub fn client_with_retry(&self, retry: RetryPolicy) -> ConformityClient {
        ConformityClient::with_http_client(
            self.uri(),
            ApiAuth::new(TEST_API_KEY),
            reqwest::Client::new(),
        )
        .with_retry_policy(retry)
    }

    /// Mount a GET mock that returns the given collection document.
    pub async fn mock_collection(&self, endpoint: &str, data: Value) {
        let total = data.as_array().map(Vec::len).unwrap_or(0);
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": data, "meta": { "total": total } })),
            )
            .mount(&self.server)
            .await;
    }

    /// Mount a mock that returns 429 with a Retry-After header.
    pub async fn mock_rate_limited(&self, endpoint: &str, retry_after_secs: u64, times: u64) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(
                ResponseTemplate::new(429)
                    .append_header("Retry-After", retry_after_secs.to_string())
                    .set_body_json(json!({ "errors": [{ "detail": "Rate limit exceeded" }] })),
            )
            .up_to_n_times(times)
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Mount a mock that fails with the given status a number of times.
    pub async fn mock_server_error(&self, endpoint: &str, status: u16, times: u64) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(
                ResponseTemplate::new(status)
                    .set_body_json(json!({ "errors": [{ "detail": "upstream failure" }] })),
            )
            .up_to_n_times(times)
            .expect(times)
            .mount(&self.server)
            .await;
    }
}

/// A unique account id so tests never collide on mock paths.
pub fn random_account_id() -> String {
    format!("acct-{}", uuid::Uuid::new_v4())
}

/// A minimal account resource as the accounts endpoint returns it.
pub fn aws_account_json(acct_id: &str, name: &str, aws_account_id: &str) -> Value {
    json!({
        "id": acct_id,
        "type": "accounts",
        "attributes": {
            "name": name,
            "environment": "production",
            "cloud-type": "aws",
            "awsaccount-id": aws_account_id,
            "tags": [],
        }
    })
}

/// A minimal check resource as the checks endpoint returns it.
pub fn check_json(check_id: &str, rule_id: &str, region: &str, resource: &str) -> Value {
    json!({
        "id": check_id,
        "type": "checks",
        "attributes": {
            "region": region,
            "resourceName": resource,
            "resource": resource,
            "message": format!("{rule_id} failed on {resource}"),
            "suppressed": true,
            "suppressed-until": null,
        },
        "relationships": {
            "rule": { "data": { "id": rule_id } }
        }
    })
}
