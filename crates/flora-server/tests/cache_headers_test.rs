//! Tests del cache de respuestas a nivel HTTP.

mod helpers;

use std::sync::Arc;

use axum::http::StatusCode;
use helpers::{DownStore, TestApp};

const SEARCH: &str = "/entries/en?search=fire&limit=10&page=1";
const SEARCH_KEY: &str = "entries:/entries/en?limit=10&page=1&search=fire:user:u1";

#[tokio::test]
async fn first_request_misses_then_hits() {
    let app = TestApp::new();
    let token = app.token("u1");

    let miss = app.client.get_as(&token, SEARCH).await;
    miss.assert_status(StatusCode::OK)
        .assert_cache("MISS")
        .assert_header("x-cache-key", SEARCH_KEY);

    let hit = app.client.get_as(&token, SEARCH).await;
    hit.assert_status(StatusCode::OK)
        .assert_cache("HIT")
        .assert_header("x-cache-key", SEARCH_KEY)
        .assert_content_type_contains("application/json");

    assert_eq!(hit.body, miss.body);
}

#[tokio::test]
async fn query_order_does_not_matter() {
    let app = TestApp::new();
    let token = app.token("u1");

    app.client.get_as(&token, SEARCH).await;
    let permuted = app
        .client
        .get_as(&token, "/entries/en?page=1&search=fire&limit=10")
        .await;

    permuted.assert_cache("HIT").assert_header("x-cache-key", SEARCH_KEY);
}

#[tokio::test]
async fn users_get_separate_entries() {
    let app = TestApp::new();

    app.client.get_as(&app.token("u1"), SEARCH).await;
    let other = app.client.get_as(&app.token("u2"), SEARCH).await;

    other.assert_cache("MISS").assert_header(
        "x-cache-key",
        "entries:/entries/en?limit=10&page=1&search=fire:user:u2",
    );
}

#[tokio::test]
async fn request_without_query_has_no_question_mark() {
    let app = TestApp::new();

    let response = app.client.get_as(&app.token("u1"), "/user/me").await;

    response.assert_header("x-cache-key", "user:/user/me:user:u1");
}

#[tokio::test]
async fn response_time_is_reported_in_milliseconds() {
    let app = TestApp::new();

    let response = app.client.get_as(&app.token("u1"), SEARCH).await;

    let value = response.header("x-response-time").unwrap();
    assert!(value.ends_with("ms"), "unexpected value {value}");
    assert!(value.trim_end_matches("ms").parse::<u64>().is_ok());
}

#[tokio::test]
async fn mutations_carry_no_cache_headers() {
    let app = TestApp::new();
    let token = app.token("u1");

    let response = app.client.post_as(&token, "/entries/en/fire/favorite").await;

    response
        .assert_status(StatusCode::NO_CONTENT)
        .assert_header_absent("x-cache")
        .assert_header_absent("x-cache-key")
        .assert_header_absent("x-response-time");
}

#[tokio::test]
async fn error_responses_are_not_stored() {
    let app = TestApp::new();
    let token = app.token("u1");

    let first = app.client.get_as(&token, "/entries/en/zzz").await;
    first.assert_status(StatusCode::NOT_FOUND).assert_cache("MISS");

    let second = app.client.get_as(&token, "/entries/en/zzz").await;
    second.assert_status(StatusCode::NOT_FOUND).assert_cache("MISS");

    let invalid = app.client.get_as(&token, "/entries/en?limit=0").await;
    invalid.assert_status(StatusCode::BAD_REQUEST).assert_cache("MISS");
    let again = app.client.get_as(&token, "/entries/en?limit=0").await;
    again.assert_cache("MISS");
}

#[tokio::test]
async fn store_outage_still_serves_fresh_data() {
    let app = TestApp::with_store(Arc::new(DownStore));
    let token = app.token("u1");

    let response = app.client.get_as(&token, SEARCH).await;

    response
        .assert_status(StatusCode::OK)
        .assert_cache("ERROR")
        .assert_header_absent("x-cache-key")
        .assert_header_exists("x-response-time");
    let body: serde_json::Value = response.json();
    assert_eq!(body["totalDocs"], 4);
}

#[tokio::test]
async fn store_outage_does_not_fail_mutations() {
    let app = TestApp::with_store(Arc::new(DownStore));
    let token = app.token("u1");

    app.client
        .post_as(&token, "/entries/en/fire/favorite")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let favorites = app.client.get_as(&token, "/user/me/favorites").await;
    let body: serde_json::Value = favorites.json();
    assert_eq!(body["results"][0]["word"], "fire");
}
