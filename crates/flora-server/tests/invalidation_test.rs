//! Invalidacion del cache de usuario tras mutaciones.

mod helpers;

use axum::http::StatusCode;
use helpers::TestApp;
use serde_json::Value;

fn words(body: &Value) -> Vec<String> {
    body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["word"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn favoriting_drops_cached_favorites_page() {
    let app = TestApp::new();
    let token = app.token("u1");
    let page = "/user/me/favorites?limit=10&page=1";

    app.client.get_as(&token, page).await.assert_cache("MISS");
    app.client.get_as(&token, page).await.assert_cache("HIT");

    app.client
        .post_as(&token, "/entries/en/water/favorite")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let after = app.client.get_as(&token, page).await;
    after.assert_cache("MISS");
    assert_eq!(words(&after.json()), vec!["water"]);
}

#[tokio::test]
async fn unfavoriting_drops_cached_profile() {
    let app = TestApp::new();
    let token = app.token("u1");
    let profile = "/user/me";

    app.client.post_as(&token, "/entries/en/fire/favorite").await;
    let before: Value = app.client.get_as(&token, profile).await.json();
    assert_eq!(before["favoritesCount"], 1);
    app.client.get_as(&token, profile).await.assert_cache("HIT");

    app.client.delete_as(&token, "/entries/en/fire/unfavorite").await;

    let after = app.client.get_as(&token, profile).await;
    after.assert_cache("MISS");
    let after: Value = after.json();
    assert_eq!(after["favoritesCount"], 0);
}

#[tokio::test]
async fn viewing_a_word_refreshes_history() {
    let app = TestApp::new();
    let token = app.token("u1");
    let history = "/user/me/history?page=1&limit=20";

    let empty: Value = app.client.get_as(&token, history).await.json();
    assert_eq!(empty["totalDocs"], 0);

    app.client
        .get_as(&token, "/entries/en/fire")
        .await
        .assert_status(StatusCode::OK);
    app.client
        .get_as(&token, "/entries/en/water")
        .await
        .assert_status(StatusCode::OK);

    let after = app.client.get_as(&token, history).await;
    after.assert_cache("MISS");
    assert_eq!(words(&after.json()), vec!["water", "fire"]);
}

#[tokio::test]
async fn other_users_cache_is_untouched() {
    let app = TestApp::new();
    let alice = app.token("alice");
    let bob = app.token("bob");
    let page = "/user/me/favorites?limit=10&page=1";

    app.client.get_as(&bob, page).await.assert_cache("MISS");
    app.client.post_as(&alice, "/entries/en/fire/favorite").await;

    app.client.get_as(&bob, page).await.assert_cache("HIT");
}

#[tokio::test]
async fn favoriting_drops_cached_profile() {
    let app = TestApp::new();
    let token = app.token("u1");

    let before = app.client.get_as(&token, "/user/me").await;
    before.assert_cache("MISS");
    let before: Value = before.json();
    assert_eq!(before["favoritesCount"], 0);

    app.client.post_as(&token, "/entries/en/fire/favorite").await;

    let after = app.client.get_as(&token, "/user/me").await;
    after.assert_cache("MISS");
    let after: Value = after.json();
    assert_eq!(after["favoritesCount"], 1);
}

#[tokio::test]
async fn default_pages_without_query_are_dropped() {
    let app = TestApp::new();
    let token = app.token("u1");

    app.client.get_as(&token, "/user/me/favorites").await.assert_cache("MISS");
    app.client.get_as(&token, "/user/me/history").await.assert_cache("MISS");
    app.client.get_as(&token, "/user/me/favorites").await.assert_cache("HIT");

    app.client.post_as(&token, "/entries/en/fire/favorite").await;

    let favorites = app.client.get_as(&token, "/user/me/favorites").await;
    favorites.assert_cache("MISS");
    assert_eq!(words(&favorites.json()), vec!["fire"]);
    app.client.get_as(&token, "/user/me/history").await.assert_cache("MISS");
}

#[tokio::test]
async fn pages_outside_the_enumerated_grid_stay_cached() {
    let app = TestApp::new();
    let token = app.token("u1");
    let odd_limit = "/user/me/favorites?limit=15&page=1";
    let far_page = "/user/me/favorites?limit=10&page=11";

    app.client.get_as(&token, odd_limit).await.assert_cache("MISS");
    app.client.get_as(&token, far_page).await.assert_cache("MISS");

    app.client.post_as(&token, "/entries/en/fire/favorite").await;

    // Hasta que venza el TTL estas paginas siguen sirviendo el valor anterior
    let stale = app.client.get_as(&token, odd_limit).await;
    stale.assert_cache("HIT");
    assert!(words(&stale.json()).is_empty());
    app.client.get_as(&token, far_page).await.assert_cache("HIT");
}
