use admin_ox_common::{
    AdminRequestError, CancellationToken, Endpoint, ErrorKind, HttpMethod, RequestBuilder,
    RequestConfig,
};
use serde_json::json;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
};

fn builder_for(base_url: &str) -> RequestBuilder {
    RequestBuilder::new(reqwest::Client::new(), RequestConfig::new(base_url))
}

#[test]
fn test_endpoint_creation() {
    let endpoint = Endpoint::new("/role");
    assert_eq!(endpoint.segments, vec!["role".to_string()]);
    assert!(endpoint.query_params.is_empty());

    let endpoint = Endpoint::new("role").paged(0, 20);
    assert_eq!(
        endpoint.query_params,
        vec![
            ("page".to_string(), "0".to_string()),
            ("size".to_string(), "20".to_string())
        ]
    );
}

#[test]
fn test_http_method_conversion() {
    use reqwest::Method;

    assert_eq!(Method::from(HttpMethod::Get), Method::GET);
    assert_eq!(Method::from(HttpMethod::Put), Method::PUT);
}

#[test]
fn test_request_config_builder() {
    let config = RequestConfig::new("http://localhost:8080")
        .with_header("x-trace", "1")
        .with_user_agent("admin-ox/0.1");

    assert_eq!(config.base_url, "http://localhost:8080");
    assert_eq!(config.default_headers.len(), 1);
    assert_eq!(config.user_agent, Some("admin-ox/0.1".to_string()));
}

#[test]
fn test_url_joining_normalizes_slashes() {
    let endpoint = Endpoint::new("/ping");
    for base in [
        "http://localhost:8080",
        "http://localhost:8080/",
        "  http://localhost:8080/  ",
    ] {
        let url = builder_for(base).build_url(&endpoint).expect("valid base");
        assert_eq!(url.as_str(), "http://localhost:8080/ping", "base {base:?}");
    }

    let url = builder_for("http://localhost:8080/api/")
        .build_url(&Endpoint::new("invitation").paged(0, 20))
        .expect("valid base");
    assert_eq!(url.as_str(), "http://localhost:8080/api/invitation?page=0&size=20");
}

#[test]
fn test_path_segments_are_percent_encoded() {
    let endpoint = Endpoint::from_segments(["role", "1425124398456635400", "a b/c?"]);
    let url = builder_for("http://localhost:8080")
        .build_url(&endpoint)
        .expect("valid base");
    assert_eq!(
        url.as_str(),
        "http://localhost:8080/role/1425124398456635400/a%20b%2Fc%3F"
    );
}

#[test]
fn test_invalid_base_url() {
    let err = builder_for("not a url")
        .build_url(&Endpoint::new("ping"))
        .expect_err("relative base should be rejected");
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[tokio::test]
async fn test_fetch_json_decodes_ids_exactly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/role"))
        .and(query_param("page", "0"))
        .and(query_param("size", "20"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"[{"id": 1425124398456635400, "roleName": "Owner", "invitationLink": null}]"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let value = builder_for(&server.uri())
        .fetch_json(&Endpoint::new("/role").paged(0, 20), &CancellationToken::new())
        .await
        .expect("request should succeed");

    assert_eq!(
        value,
        Some(json!([{"id": "1425124398456635400", "roleName": "Owner", "invitationLink": null}]))
    );
}

#[tokio::test]
async fn test_no_content_and_empty_body_are_absence() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/role/1/abc"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let builder = builder_for(&server.uri());
    let cancel = CancellationToken::new();

    let put = builder
        .put_json(&Endpoint::from_segments(["role", "1", "abc"]), &cancel)
        .await
        .expect("204 is a success");
    assert_eq!(put, None);

    let get = builder
        .fetch_json(&Endpoint::new("ping"), &cancel)
        .await
        .expect("empty 200 is a success");
    assert_eq!(get, None);
}

#[tokio::test]
async fn test_non_success_status_is_typed_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = builder_for(&server.uri())
        .fetch_json(&Endpoint::new("user"), &CancellationToken::new())
        .await
        .expect_err("500 must fail");

    assert_eq!(err.to_string(), "Request failed: 500 Internal Server Error");
    assert_eq!(err.status(), Some(500));
    match err {
        AdminRequestError::Status { body, .. } => assert_eq!(body, "boom"),
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_json_is_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/invitation"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{\"id\":", "application/json"))
        .mount(&server)
        .await;

    let err = builder_for(&server.uri())
        .fetch_json(&Endpoint::new("invitation"), &CancellationToken::new())
        .await
        .expect_err("truncated JSON must fail");
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[tokio::test]
async fn test_cancelled_token_short_circuits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(0)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = builder_for(&server.uri())
        .fetch_json(&Endpoint::new("ping"), &cancel)
        .await
        .expect_err("cancelled before sending");
    assert!(err.is_cancelled());
}

#[tokio::test]
async fn test_in_flight_request_is_cancelled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bot-ping"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "ok"}))
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let builder = builder_for(&server.uri());
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = builder
        .fetch_json(&Endpoint::new("bot-ping"), &cancel)
        .await
        .expect_err("request should be abandoned");
    assert!(err.is_cancelled());
    canceller.await.expect("canceller task");
}
