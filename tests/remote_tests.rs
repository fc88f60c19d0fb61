#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
//! Integration tests for the remote backend client against a local
//! mock server. The client is blocking by design, so every call runs
//! on a blocking thread while the mock server lives on the test
//! runtime.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use league_companion::{AuthOutcome, CompanionError, RemoteClient};

/// Run a blocking remote-client call off the async test runtime.
async fn call_blocking<T, F>(uri: String, call: F) -> T
where
    T: Send + 'static,
    F: FnOnce(RemoteClient) -> T + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let client = RemoteClient::new(uri).unwrap();
        call(client)
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn authenticate_accepts_200() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth"))
        .and(query_param("discord_id", "disc-42"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let outcome = call_blocking(server.uri(), |c| c.authenticate("disc-42")).await;
    assert_eq!(outcome.unwrap(), AuthOutcome::Registered);
}

#[tokio::test(flavor = "multi_thread")]
async fn authenticate_404_with_marker_is_definitively_not_registered() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(404).set_body_string("User not found"))
        .mount(&server)
        .await;

    let outcome = call_blocking(server.uri(), |c| c.authenticate("disc-42")).await;
    assert_eq!(outcome.unwrap(), AuthOutcome::NotRegistered);
}

#[tokio::test(flavor = "multi_thread")]
async fn authenticate_404_without_marker_is_indeterminate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(404).set_body_string("nothing here"))
        .mount(&server)
        .await;

    let outcome = call_blocking(server.uri(), |c| c.authenticate("disc-42")).await;
    assert_eq!(outcome.unwrap(), AuthOutcome::Indeterminate { status: 404 });
}

#[tokio::test(flavor = "multi_thread")]
async fn authenticate_other_failures_are_indeterminate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let outcome = call_blocking(server.uri(), |c| c.authenticate("disc-42")).await;
    assert_eq!(outcome.unwrap(), AuthOutcome::Indeterminate { status: 500 });
}

#[tokio::test(flavor = "multi_thread")]
async fn authenticate_network_failure_is_a_remote_request_error() {
    // Nothing listens on this port.
    let outcome = call_blocking("http://127.0.0.1:1".into(), |c| c.authenticate("x")).await;
    assert!(matches!(outcome, Err(CompanionError::RemoteRequest(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn redeem_code_returns_the_trimmed_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/otp"))
        .and(query_param("otp_pass", "123456"))
        .and(query_param("summonersname", "Ana#NA1,EUW"))
        .respond_with(ResponseTemplate::new(200).set_body_string("  token-abc \n"))
        .mount(&server)
        .await;

    let token = call_blocking(server.uri(), |c| c.redeem_code("123456", "Ana#NA1,EUW")).await;
    assert_eq!(token.unwrap(), "token-abc");
}

#[tokio::test(flavor = "multi_thread")]
async fn redeem_code_rejects_an_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/otp"))
        .respond_with(ResponseTemplate::new(200).set_body_string("   "))
        .mount(&server)
        .await;

    let result = call_blocking(server.uri(), |c| c.redeem_code("123456", "Ana#NA1")).await;
    assert!(matches!(
        result,
        Err(CompanionError::MalformedResponse { .. })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn redeem_code_rejects_non_200() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/otp"))
        .respond_with(ResponseTemplate::new(403).set_body_string("bad code"))
        .mount(&server)
        .await;

    let result = call_blocking(server.uri(), |c| c.redeem_code("000000", "Ana#NA1")).await;
    assert!(matches!(
        result,
        Err(CompanionError::RemoteStatus { status: 403 })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_latest_version_reads_the_version_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/client_version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "1.4.2"})))
        .mount(&server)
        .await;

    let version = call_blocking(server.uri(), |c| c.fetch_latest_version()).await;
    assert_eq!(version.unwrap(), "1.4.2");
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_latest_version_rejects_a_non_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/client_version"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = call_blocking(server.uri(), |c| c.fetch_latest_version()).await;
    assert!(matches!(
        result,
        Err(CompanionError::MalformedResponse { .. })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn join_match_parses_the_join_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/joinmatch"))
        .and(query_param("password", "pin123"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Ana#NA1,abc123"))
        .mount(&server)
        .await;

    let request = call_blocking(server.uri(), |c| c.join_match("pin123")).await.unwrap();
    assert_eq!(request.target_name, "Ana");
    assert_eq!(request.target_tag, "NA1");
    assert_eq!(request.credential, "abc123");
}

#[tokio::test(flavor = "multi_thread")]
async fn join_match_with_no_comma_is_malformed_not_a_crash() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/joinmatch"))
        .respond_with(ResponseTemplate::new(200).set_body_string("malformed"))
        .mount(&server)
        .await;

    let result = call_blocking(server.uri(), |c| c.join_match("pin123")).await;
    assert!(matches!(
        result,
        Err(CompanionError::MalformedResponse { .. })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn join_match_rejects_non_200() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/joinmatch"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = call_blocking(server.uri(), |c| c.join_match("pin123")).await;
    assert!(matches!(
        result,
        Err(CompanionError::RemoteStatus { status: 404 })
    ));
}
