mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;

use crs_core::auth::{FileScope, MemoryScope};
use crs_core::{ApiClient, ErrorKind, Role, Scope, SessionContext, TokenStore};

use common::{issued_token, spawn_server, GOOD_PASSWORD, REFRESHED_TOKEN};

fn session(base: &str) -> SessionContext {
    let tokens = Arc::new(TokenStore::in_memory());
    SessionContext::new(ApiClient::new(base, tokens, Duration::from_secs(10)).unwrap())
}

#[tokio::test]
async fn test_login_stores_token_in_requested_scope() {
    let base = spawn_server().await;

    let remembered = session(&base);
    let role = remembered.login("skarimi", GOOD_PASSWORD, true).await.unwrap();
    assert_eq!(role, Some(Role::Admin));
    assert_eq!(remembered.tokens().get(), Some(issued_token()));
    assert_eq!(remembered.tokens().current_scope(), Some(Scope::Persistent));

    let transient = session(&base);
    transient.login("skarimi", GOOD_PASSWORD, false).await.unwrap();
    assert_eq!(transient.tokens().current_scope(), Some(Scope::Session));

    let profile = transient.profile(Role::Student).unwrap();
    assert_eq!(profile.display_name, "Sara Karimi");
    assert_eq!(profile.avatar, 'S');
}

#[tokio::test]
async fn test_failed_login_stores_nothing() {
    let base = spawn_server().await;
    let ctx = session(&base);

    let err = ctx.login("skarimi", "wrong", true).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(err.user_message("Login failed"), "Invalid credentials");
    assert!(!ctx.is_authenticated());
}

#[tokio::test]
async fn test_refresh_replaces_token_in_same_scope() {
    let base = spawn_server().await;
    let ctx = session(&base);
    ctx.login("skarimi", GOOD_PASSWORD, true).await.unwrap();

    ctx.refresh().await.unwrap();
    assert_eq!(ctx.tokens().get().as_deref(), Some(REFRESHED_TOKEN));
    assert_eq!(ctx.tokens().current_scope(), Some(Scope::Persistent));
}

#[tokio::test]
async fn test_refresh_without_refresh_token_is_rejected() {
    let base = spawn_server().await;
    let ctx = session(&base);
    ctx.tokens().set("stale", false);

    let err = ctx.refresh().await.unwrap_err();
    assert_eq!(err.status, 401);
    assert_eq!(ctx.tokens().get().as_deref(), Some("stale"));
}

#[tokio::test]
async fn test_change_password_requires_auth() {
    let base = spawn_server().await;
    let ctx = session(&base);

    let err = ctx.change_password(GOOD_PASSWORD, "new").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    ctx.login("skarimi", GOOD_PASSWORD, false).await.unwrap();
    let done = ctx.change_password(GOOD_PASSWORD, "new").await.unwrap();
    assert_eq!(done, json!({"message": "Password changed"}));

    let err = ctx.change_password("bad", "new").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.message, "old password is wrong");
}

#[tokio::test]
async fn test_logout_clears_file_backed_scopes() {
    let base = spawn_server().await;
    let dir = TempDir::new().unwrap();
    let persistent_path = dir.path().join("tokens.json");
    let tokens = Arc::new(TokenStore::new(
        Box::new(FileScope::new(persistent_path.clone())),
        Box::new(MemoryScope::new()),
    ));
    let ctx = SessionContext::new(ApiClient::new(&base, tokens.clone(), Duration::from_secs(10)).unwrap());

    ctx.login("skarimi", GOOD_PASSWORD, true).await.unwrap();
    assert!(persistent_path.exists());

    // A fresh store over the same file sees the remembered login
    let reopened = TokenStore::new(
        Box::new(FileScope::new(persistent_path.clone())),
        Box::new(MemoryScope::new()),
    );
    assert_eq!(reopened.get(), Some(issued_token()));

    ctx.logout();
    assert_eq!(tokens.get(), None);
    assert!(!persistent_path.exists());
}
