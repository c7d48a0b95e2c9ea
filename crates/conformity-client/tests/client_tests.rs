//! Integration tests for `ConformityClient` against a wiremock endpoint.

mod helpers;

use helpers::mock_conformity_server::{
    aws_account_json, random_account_id, MockConformityServer, TEST_API_KEY,
};

use conformity_client::{ApiAuth, ApiClientError, ConformityClient};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_list_accounts_sends_api_key_and_parses() {
    let server = MockConformityServer::new().await;
    Mock::given(method("GET"))
        .and(path("/accounts"))
        .and(header("Authorization", format!("ApiKey {TEST_API_KEY}")))
        .and(header("Content-Type", "application/vnd.api+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                aws_account_json("acct-1", "prod", "111111111111"),
                aws_account_json("acct-2", "dev", "222222222222"),
            ]
        })))
        .expect(1)
        .mount(server.server())
        .await;

    let accounts = server.client().list_accounts().await.unwrap();
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[0].name, "prod");
    assert_eq!(
        accounts[1].provider_identity().as_deref(),
        Some("222222222222")
    );
}

#[tokio::test]
async fn test_content_type_override_is_sent_on_the_wire() {
    let server = MockConformityServer::new().await;
    Mock::given(method("GET"))
        .and(path("/accounts"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(server.server())
        .await;

    let auth = ApiAuth::new(TEST_API_KEY).with_content_type("application/json");
    let client = ConformityClient::with_http_client(server.uri(), auth, reqwest::Client::new());
    let accounts = client.list_accounts().await.unwrap();
    assert!(accounts.is_empty());
}

#[tokio::test]
async fn test_rules_settings_404_means_unconfigured() {
    let server = MockConformityServer::new().await;
    let acct_id = random_account_id();
    Mock::given(method("GET"))
        .and(path(format!("/accounts/{acct_id}/settings/rules")))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .expect(1)
        .mount(server.server())
        .await;

    let settings = server
        .client()
        .get_account_rules_settings(&acct_id)
        .await
        .unwrap();
    assert!(settings.is_empty());
}

#[tokio::test]
async fn test_rules_settings_404_after_transient_failures_still_means_unconfigured() {
    let server = MockConformityServer::new().await;
    let acct_id = random_account_id();
    let endpoint = format!("/accounts/{acct_id}/settings/rules");
    // Exhaust the retry budget with 503s, then answer the last attempt
    // with a 404, which must still be read as "nothing configured".
    server.mock_server_error(&endpoint, 503, 3).await;
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .expect(1)
        .mount(server.server())
        .await;

    let settings = server
        .client()
        .get_account_rules_settings(&acct_id)
        .await
        .unwrap();
    assert!(settings.is_empty());
}

#[tokio::test]
async fn test_transient_503s_are_retried_until_success() {
    let server = MockConformityServer::new().await;
    server.mock_server_error("/accounts", 503, 3).await;
    Mock::given(method("GET"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [aws_account_json("acct-1", "prod", "111111111111")]
        })))
        .expect(1)
        .mount(server.server())
        .await;

    // 3 failures + 1 success = 4 requests, all on one logical call.
    let accounts = server.client().list_accounts().await.unwrap();
    assert_eq!(accounts.len(), 1);
}

#[tokio::test]
async fn test_rate_limit_retried_after_retry_after() {
    let server = MockConformityServer::new().await;
    server.mock_rate_limited("/accounts", 0, 2).await;
    Mock::given(method("GET"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(server.server())
        .await;

    let accounts = server.client().list_accounts().await.unwrap();
    assert!(accounts.is_empty());
}

#[tokio::test]
async fn test_auth_failure_is_not_retried() {
    let server = MockConformityServer::new().await;
    Mock::given(method("GET"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .expect(1)
        .mount(server.server())
        .await;

    let err = server.client().list_accounts().await.unwrap_err();
    assert!(matches!(err, ApiClientError::AuthError(_)));
}

#[tokio::test]
async fn test_retries_exhausted_reports_max_retries() {
    let server = MockConformityServer::new().await;
    // Retry policy allows 3 retries: 4 requests total, all failing.
    server.mock_server_error("/accounts", 503, 4).await;

    let err = server.client().list_accounts().await.unwrap_err();
    match err {
        ApiClientError::MaxRetriesExceeded { attempts, .. } => assert_eq!(attempts, 4),
        other => panic!("Expected MaxRetriesExceeded, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_organisation_external_id_is_memoized() {
    let server = MockConformityServer::new().await;
    Mock::given(method("GET"))
        .and(path("/organisation/external-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "type": "external-ids", "id": "ext-123" }
        })))
        .expect(1)
        .mount(server.server())
        .await;

    let client = server.client();
    assert_eq!(
        client.get_organisation_external_id().await.unwrap(),
        "ext-123"
    );
    // Second call served from the cache, no second request.
    assert_eq!(
        client.get_organisation_external_id().await.unwrap(),
        "ext-123"
    );
}

#[tokio::test]
async fn test_get_organisation_id_from_users() {
    let server = MockConformityServer::new().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "user-1",
                "attributes": { "email": "a@example.com" },
                "relationships": {
                    "organisation": { "data": { "type": "organisations", "id": "org-9" } }
                }
            }]
        })))
        .mount(server.server())
        .await;

    assert_eq!(server.client().get_organisation_id().await.unwrap(), "org-9");
}

#[tokio::test]
async fn test_get_all_users_skips_api_key_pseudo_users() {
    let server = MockConformityServer::new().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "id": "user-1",
                    "attributes": {
                        "email": "a@example.com",
                        "first-name": "Ada",
                        "last-name": "Lovelace",
                        "role": "ADMIN"
                    }
                },
                { "id": "apikey-1", "attributes": { "email": null, "role": "ADMIN" } }
            ]
        })))
        .mount(server.server())
        .await;

    let users = server.client().get_all_users().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email, "a@example.com");
}

#[tokio::test]
async fn test_bot_settings_round_trip_shape() {
    let server = MockConformityServer::new().await;
    Mock::given(method("GET"))
        .and(path("/accounts/acct-1/settings/bot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "attributes": { "settings": { "bot": { "disabled": false, "delay": 2 } } } }
        })))
        .mount(server.server())
        .await;
    Mock::given(method("PATCH"))
        .and(path("/accounts/acct-2/settings/bot"))
        .and(body_partial_json(json!({
            "data": { "attributes": { "settings": { "bot": { "disabled": false, "delay": 2 } } } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
        .expect(1)
        .mount(server.server())
        .await;

    let client = server.client();
    let settings = client.get_account_bot_settings("acct-1").await.unwrap();
    client
        .update_account_bot_settings("acct-2", &settings)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_is_bot_scan_done_when_status_null() {
    let server = MockConformityServer::new().await;
    Mock::given(method("GET"))
        .and(path("/accounts/acct-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": "acct-1",
                "attributes": { "name": "prod", "bot-status": null }
            }
        })))
        .mount(server.server())
        .await;
    Mock::given(method("GET"))
        .and(path("/accounts/acct-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": "acct-2",
                "attributes": { "name": "dev", "bot-status": "RUNNING" }
            }
        })))
        .mount(server.server())
        .await;

    let client = server.client();
    assert!(client.is_bot_scan_done("acct-1").await.unwrap());
    assert!(!client.is_bot_scan_done("acct-2").await.unwrap());
}

#[tokio::test]
async fn test_rule_setting_with_notes_reads_meta() {
    let server = MockConformityServer::new().await;
    Mock::given(method("GET"))
        .and(path("/accounts/acct-1/settings/rules/EC2-001"))
        .and(query_param("notes", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "attributes": {
                    "settings": {
                        "rules": [{ "id": "EC2-001", "enabled": true, "configured": true }]
                    }
                }
            },
            "meta": {
                "notes": [
                    { "note": "tightened", "createdBy": "ops", "createdDate": 1700000000000_i64 }
                ]
            }
        })))
        .mount(server.server())
        .await;

    let rule = server
        .client()
        .get_account_rule_setting("acct-1", "EC2-001", true)
        .await
        .unwrap();
    assert_eq!(rule.rule_id, "EC2-001");
    assert_eq!(rule.notes.len(), 1);
    assert_eq!(rule.notes[0].created_by, "ops");
}

#[tokio::test]
async fn test_create_communication_settings_skips_unconfigured() {
    use conformity_api::models::CommunicationSetting;

    let server = MockConformityServer::new().await;
    Mock::given(method("POST"))
        .and(path("/settings/communication"))
        .and(body_partial_json(json!({
            "data": [{
                "type": "settings",
                "attributes": { "channel": "email" },
                "relationships": {
                    "organisation": { "data": { "type": "organisations", "id": "org-9" } }
                }
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(server.server())
        .await;

    let configured = CommunicationSetting {
        channel: "email".to_string(),
        enabled: true,
        filter: None,
        configuration: Some(json!({ "users": ["user-1"] })),
    };
    let unconfigured = CommunicationSetting {
        channel: "sms".to_string(),
        enabled: true,
        filter: None,
        configuration: None,
    };
    server
        .client()
        .create_communication_settings(&[configured, unconfigured], None, "org-9")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_profile_create_strips_ids() {
    use conformity_api::models::Profile;

    let server = MockConformityServer::new().await;
    Mock::given(method("POST"))
        .and(path("/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "id": "p-new", "attributes": { "name": "baseline" } }
        })))
        .expect(1)
        .mount(server.server())
        .await;

    let profile = Profile::new(json!({
        "data": {
            "id": "p-old",
            "attributes": { "name": "baseline" }
        },
        "meta": { "total": 1 }
    }))
    .unwrap();
    let created = server.client().create_profile(&profile).await.unwrap();
    assert_eq!(created.profile_id(), Some("p-new"));
}
