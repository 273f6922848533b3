//! End-to-end tests: runtime config → credentials → registry → vendor API

use integration_nodes::{NodeContext, NodeRegistry, RuntimeConfig};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, credentials: &str) -> RuntimeConfig {
    let yaml = format!(
        r"
timezone: Europe/Berlin
concurrency: 2
http:
  max_retries: 0
  rate_limit: null
credentials:
{credentials}
",
    )
    .replace("{uri}", &server.uri());
    RuntimeConfig::from_yaml_str(&yaml).unwrap()
}

fn context(config: &RuntimeConfig, registry: &NodeRegistry, node: &str) -> NodeContext {
    let credential = registry.get(node).unwrap().describe().credential;
    NodeContext::from_config(config, credential).unwrap()
}

fn ids(records: &[Value]) -> Vec<String> {
    records
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_zoho_get_all_follows_more_records() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts"))
        .and(query_param("page", "0"))
        .and(query_param("per_page", "200"))
        .and(header("authorization", "Zoho-oauthtoken zoho-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "1"}, {"id": "2"}],
            "info": {"more_records": true}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/accounts"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "3"}],
            "info": {"more_records": false}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(
        &server,
        "  zohoOAuth2Api:\n    access_token: zoho-token\n    base_url: {uri}",
    );
    let registry = NodeRegistry::new();
    let ctx = context(&config, &registry, "zoho");

    let outputs = registry
        .get("zoho")
        .unwrap()
        .run(&ctx, "account", "getAll", vec![json!({"returnAll": true})], 1)
        .await
        .unwrap();

    assert_eq!(ids(&outputs), vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_zoho_listing_failure_names_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/leads"))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "1"}],
            "info": {"more_records": true}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/leads"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .mount(&server)
        .await;

    let config = config_for(
        &server,
        "  zohoOAuth2Api:\n    access_token: zoho-token\n    base_url: {uri}",
    );
    let registry = NodeRegistry::new();
    let ctx = context(&config, &registry, "zoho");

    let err = registry
        .get("zoho")
        .unwrap()
        .run(&ctx, "lead", "getAll", vec![json!({"returnAll": true})], 1)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Listing 'GET /leads' failed at page 1: HTTP 500: down"
    );
}

#[tokio::test]
async fn test_webex_messages_over_several_items() {
    let server = MockServer::start().await;

    for room in ["a", "b"] {
        Mock::given(method("GET"))
            .and(path("/messages"))
            .and(query_param("roomId", room))
            .and(header("authorization", "Bearer webex-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": format!("{room}1")}, {"id": format!("{room}2")}]
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let config = config_for(
        &server,
        "  ciscoWebexOAuth2Api:\n    access_token: webex-token\n    base_url: {uri}",
    );
    let registry = NodeRegistry::new();
    let ctx = context(&config, &registry, "ciscoWebex");

    let outputs = registry
        .get("ciscoWebex")
        .unwrap()
        .run(
            &ctx,
            "message",
            "getAll",
            vec![
                json!({"roomId": "a", "returnAll": true}),
                json!({"roomId": "b", "returnAll": true}),
            ],
            config.concurrency,
        )
        .await
        .unwrap();

    assert_eq!(ids(&outputs), vec!["a1", "a2", "b1", "b2"]);
}

#[tokio::test]
async fn test_tributech_client_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "cc-token",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/status/subscription/sub-1"))
        .and(header("authorization", "Bearer cc-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"state": "active"})))
        .expect(2)
        .mount(&server)
        .await;

    let config = config_for(
        &server,
        "  tributechOAuth2Api:\n    api_url: {uri}\n    auth_url: {uri}/connect/token\n    client_id: id\n    client_secret: secret\n    scope: data-api",
    );
    let registry = NodeRegistry::new();
    let ctx = context(&config, &registry, "tributech");

    let outputs = registry
        .get("tributech")
        .unwrap()
        .run(
            &ctx,
            "status",
            "getSubscriptionStatus",
            vec![json!({"requestId": "sub-1"}), json!({"requestId": "sub-1"})],
            1,
        )
        .await
        .unwrap();

    assert_eq!(outputs, vec![json!({"state": "active"}), json!({"state": "active"})]);
}

#[tokio::test]
async fn test_missing_credential() {
    let server = MockServer::start().await;
    let config = config_for(&server, "  {}");
    let err = NodeContext::from_config(&config, "zohoOAuth2Api").unwrap_err();

    assert!(err.to_string().contains("credentials.zohoOAuth2Api"));
}
