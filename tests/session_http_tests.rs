// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session store client tests against a local fake auth app.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use castmark::models::SessionStatus;
use castmark::services::{
    HttpSessionStore, IdentityReconciler, SessionExchange, SignInTrigger, StaticHostContext,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::{user_row, FakeProvider, Reply, ScriptedRecords};

#[derive(Default)]
struct FakeAuth {
    /// Fid of the current session; zero means signed out.
    fid: AtomicU64,
    /// Session endpoint answers 503 while set.
    down: AtomicBool,
}

type Auth = Arc<FakeAuth>;

async fn session(State(auth): State<Auth>) -> Result<Json<Value>, StatusCode> {
    if auth.down.load(Ordering::SeqCst) {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    Ok(match auth.fid.load(Ordering::SeqCst) {
        0 => Json(json!({})),
        fid => Json(json!({
            "user": { "fid": fid, "name": "alice" },
            "expires": "2026-11-17T00:00:00.000Z"
        })),
    })
}

async fn credentials_callback(
    State(auth): State<Auth>,
    Query(params): Query<HashMap<String, String>>,
) -> StatusCode {
    let signed = params.get("message").is_some_and(|m| m.contains("Nonce: "))
        && params.get("signature").is_some_and(|s| s.starts_with("0x"))
        && params.get("callbackUrl").map(String::as_str) == Some("/");
    if !signed {
        return StatusCode::UNAUTHORIZED;
    }
    auth.fid.store(42, Ordering::SeqCst);
    StatusCode::OK
}

async fn fake_auth_app() -> (HttpSessionStore, Auth) {
    let auth: Auth = Arc::default();
    let router = Router::new()
        .route("/api/auth/session", get(session))
        .route("/api/auth/callback/credentials", get(credentials_callback))
        .with_state(auth.clone());
    let base = common::serve(router).await;
    let store = HttpSessionStore::new(&base, Duration::from_millis(20)).unwrap();
    (store, auth)
}

#[tokio::test]
async fn test_poll_maps_session_payloads() {
    let (store, auth) = fake_auth_app().await;
    let mut rx = store.subscribe();
    assert_eq!(*rx.borrow_and_update(), SessionStatus::Loading);

    assert_eq!(store.poll_once().await.unwrap(), SessionStatus::Unauthenticated);
    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), SessionStatus::Unauthenticated);

    // Unchanged status is not republished.
    store.poll_once().await.unwrap();
    assert!(!rx.has_changed().unwrap());

    auth.fid.store(42, Ordering::SeqCst);
    store.poll_once().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), SessionStatus::Authenticated(42));
}

#[tokio::test]
async fn test_failed_first_poll_settles_unauthenticated() {
    let offline = HttpSessionStore::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
    let mut rx = offline.subscribe();

    assert!(offline.poll_once().await.is_err());
    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), SessionStatus::Unauthenticated);

    let (store, auth) = fake_auth_app().await;
    auth.down.store(true, Ordering::SeqCst);
    assert!(store.poll_once().await.is_err());
    assert_eq!(store.status(), SessionStatus::Unauthenticated);
}

#[tokio::test]
async fn test_failed_poll_keeps_last_status() {
    let (store, auth) = fake_auth_app().await;
    auth.fid.store(42, Ordering::SeqCst);
    store.poll_once().await.unwrap();

    auth.down.store(true, Ordering::SeqCst);
    let mut rx = store.subscribe();
    assert!(store.poll_once().await.is_err());
    assert!(!rx.has_changed().unwrap());
    assert_eq!(store.status(), SessionStatus::Authenticated(42));

    auth.down.store(false, Ordering::SeqCst);
    auth.fid.store(0, Ordering::SeqCst);
    store.poll_once().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), SessionStatus::Unauthenticated);
}

#[tokio::test]
async fn test_unreachable_session_store_clears_loading() {
    let offline = HttpSessionStore::new("http://127.0.0.1:9", Duration::from_millis(20)).unwrap();
    let records = ScriptedRecords::new();

    let reconciler = IdentityReconciler::new(records.clone(), StaticHostContext(None));
    let handle = reconciler.start(offline.subscribe());
    let poller = offline.spawn_poller();

    let view = tokio::time::timeout(
        Duration::from_secs(5),
        reconciler.subscribe().wait_for(|v| !v.loading),
    )
    .await
    .expect("loading never cleared")
    .unwrap();

    assert!(!view.is_authenticated);
    assert_eq!(view.db_user, None);
    assert!(records.calls().is_empty());

    poller.abort();
    handle.shutdown().await;
}

#[tokio::test]
async fn test_exchange_rejected_without_signature() {
    let (store, auth) = fake_auth_app().await;

    let result = store
        .exchange("/api/auth/callback/credentials?message=hello&callbackUrl=%2F")
        .await;

    assert!(result.is_err());
    assert_eq!(auth.fid.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_sign_in_flow_end_to_end() {
    let (store, _) = fake_auth_app().await;
    let records = ScriptedRecords::new();
    records.push(42, Reply::Row(user_row(42, "alice")));

    let reconciler = IdentityReconciler::new(records, StaticHostContext(None));
    let handle = reconciler.start(store.subscribe());
    let poller = store.spawn_poller();

    let mut watcher = reconciler.subscribe();
    let view = watcher.wait_for(|v| !v.loading).await.unwrap();
    assert!(!view.is_authenticated);
    assert!(!reconciler.request_authentication());

    let trigger = SignInTrigger::new(FakeProvider::default(), store.clone(), "/");
    assert!(trigger.sign_in().await);

    let view = watcher
        .wait_for(|v| v.is_authenticated && !v.loading)
        .await.unwrap();
    assert_eq!(
        view.db_user.as_ref().and_then(|u| u.username.as_deref()),
        Some("alice")
    );

    reconciler.dismiss_auth_prompt();
    assert!(!reconciler.auth_prompt_visible());

    poller.abort();
    handle.shutdown().await;
}

#[tokio::test]
async fn test_app_state_wiring() {
    use castmark::{config::Config, AppState};

    let config = Config {
        auth_callback_url: "/collections".to_string(),
        ..Config::test_default()
    };
    let state = AppState::from_config(config).unwrap();

    assert_eq!(state.sessions.base_url(), "http://localhost:3000");
    assert_eq!(state.sessions.status(), SessionStatus::Loading);
    assert!(state.reconciler.snapshot().loading);

    let trigger = state.sign_in_trigger(FakeProvider::default());
    let signed = castmark::services::SignedMessage {
        message: "m".to_string(),
        signature: "s".to_string(),
    };
    assert!(trigger.handoff_url(&signed).ends_with("&callbackUrl=%2Fcollections"));
}
