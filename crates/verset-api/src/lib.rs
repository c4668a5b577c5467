//! JSON HTTP layer for Verset.
//!
//! Exposes an axum [`Router`] backed by any [`verset_core::store::VersetStore`].
//! The public surface is one endpoint (`POST /api/draw-verse`); everything
//! under `/api/admin` except login/check is gated on the session cookie.

pub mod admin;
pub mod draw;
pub mod error;
pub mod session;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use verset_core::store::VersetStore;

use session::{AdminAuth, Sessions};

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` merged with
/// `VERSET_`-prefixed environment variables.
///
/// `session_secret` has no default on purpose: a production deployment must
/// supply its own.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub store_path:          PathBuf,
  pub admin_username:      String,
  /// PHC string produced by argon2 (see the `--hash-password` helper).
  pub admin_password_hash: String,
  pub session_secret:      String,
  #[serde(default = "default_session_ttl")]
  pub session_ttl_secs:    u64,
}

fn default_session_ttl() -> u64 { 86_400 }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub auth:     Arc<AdminAuth>,
  pub sessions: Sessions,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: VersetStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Public
    .route("/api/draw-verse", post(draw::handler::<S>))
    // Admin session
    .route("/api/admin/login", post(admin::login::<S>))
    .route("/api/admin/logout", post(admin::logout::<S>))
    .route("/api/admin/check", get(admin::check::<S>))
    // Admin verse pool + ledger
    .route(
      "/api/admin/verses",
      get(admin::list_verses::<S>).post(admin::add_verse::<S>),
    )
    .route("/api/admin/verses/{id}", delete(admin::delete_verse::<S>))
    .route("/api/admin/draws", get(admin::list_draws::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use rand_core::OsRng;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use verset_store_sqlite::SqliteStore;

  async fn make_state(password: &str) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();

    AppState {
      store:    Arc::new(store),
      auth:     Arc::new(AdminAuth {
        username:      "admin".to_string(),
        password_hash: hash,
      }),
      sessions: Sessions::new("test-secret", 3600),
    }
  }

  async fn oneshot_json(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
  ) -> (StatusCode, axum::http::HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
      builder = builder.header(header::COOKIE, cookie);
    }
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let resp = router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, value)
  }

  /// Log in and return the session cookie in `name=value` form.
  async fn login_cookie(state: &AppState<SqliteStore>, password: &str) -> String {
    let (status, headers, _) = oneshot_json(
      state.clone(),
      "POST",
      "/api/admin/login",
      None,
      Some(json!({ "username": "admin", "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let set_cookie = headers
      .get(header::SET_COOKIE)
      .unwrap()
      .to_str()
      .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
  }

  async fn add_verse(state: &AppState<SqliteStore>, cookie: &str, text: &str, reference: &str) -> Value {
    let (status, _, body) = oneshot_json(
      state.clone(),
      "POST",
      "/api/admin/verses",
      Some(cookie),
      Some(json!({ "text": text, "reference": reference })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
  }

  // ── Public draw endpoint ────────────────────────────────────────────────────

  #[tokio::test]
  async fn draw_then_replay_returns_the_same_verse() {
    let state = make_state("secret").await;
    let cookie = login_cookie(&state, "secret").await;
    add_verse(&state, &cookie, "Trust in the Lord", "Prov 3:5").await;

    let (status, _, first) = oneshot_json(
      state.clone(),
      "POST",
      "/api/draw-verse",
      None,
      Some(json!({ "email": "x@y.com", "first_name": "A", "last_name": "B" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["success"], json!(true));
    assert_eq!(first["already_drawn"], json!(false));
    assert_eq!(first["verse"]["reference"], json!("Prov 3:5"));

    // Same email, different case and stray whitespace.
    let (status, _, second) = oneshot_json(
      state.clone(),
      "POST",
      "/api/draw-verse",
      None,
      Some(json!({ "email": " X@Y.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["already_drawn"], json!(true));
    assert_eq!(second["verse"], first["verse"]);

    // Exactly one ledger row.
    let (_, _, draws) =
      oneshot_json(state, "GET", "/api/admin/draws", Some(&cookie), None).await;
    assert_eq!(draws["draws"].as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn draw_rejects_invalid_email() {
    let state = make_state("secret").await;
    let cookie = login_cookie(&state, "secret").await;
    add_verse(&state, &cookie, "Text", "Ref").await;

    let (status, _, body) = oneshot_json(
      state,
      "POST",
      "/api/draw-verse",
      None,
      Some(json!({ "email": "not-an-email" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
  }

  #[tokio::test]
  async fn draw_on_empty_pool_returns_503() {
    let state = make_state("secret").await;

    let (status, _, body) = oneshot_json(
      state,
      "POST",
      "/api/draw-verse",
      None,
      Some(json!({ "email": "x@y.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], json!(false));
  }

  #[tokio::test]
  async fn concurrent_draws_for_one_email_share_a_verse() {
    let state = make_state("secret").await;
    let cookie = login_cookie(&state, "secret").await;
    for i in 0..5 {
      add_verse(&state, &cookie, &format!("Verse {i}"), &format!("Ref {i}")).await;
    }

    // The two spellings normalize to the same ledger key.
    let (a, b) = tokio::join!(
      oneshot_json(
        state.clone(),
        "POST",
        "/api/draw-verse",
        None,
        Some(json!({ "email": "A@x.com" })),
      ),
      oneshot_json(
        state.clone(),
        "POST",
        "/api/draw-verse",
        None,
        Some(json!({ "email": "a@x.com " })),
      ),
    );
    assert_eq!(a.0, StatusCode::OK);
    assert_eq!(b.0, StatusCode::OK);
    assert_eq!(a.2["verse"], b.2["verse"]);

    let (_, _, draws) =
      oneshot_json(state, "GET", "/api/admin/draws", Some(&cookie), None).await;
    assert_eq!(draws["draws"].as_array().unwrap().len(), 1);
  }

  // ── Login / logout / check ──────────────────────────────────────────────────

  #[tokio::test]
  async fn bad_credentials_get_one_generic_message() {
    let state = make_state("secret").await;

    let (status_pw, _, body_pw) = oneshot_json(
      state.clone(),
      "POST",
      "/api/admin/login",
      None,
      Some(json!({ "username": "admin", "password": "wrong" })),
    )
    .await;
    let (status_user, _, body_user) = oneshot_json(
      state,
      "POST",
      "/api/admin/login",
      None,
      Some(json!({ "username": "nobody", "password": "secret" })),
    )
    .await;

    assert_eq!(status_pw, StatusCode::UNAUTHORIZED);
    assert_eq!(status_user, StatusCode::UNAUTHORIZED);
    // Neither response may reveal which field was wrong.
    assert_eq!(body_pw, body_user);
  }

  #[tokio::test]
  async fn check_reflects_session_state() {
    let state = make_state("secret").await;

    let (status, _, body) =
      oneshot_json(state.clone(), "GET", "/api/admin/check", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["logged_in"], json!(false));

    let cookie = login_cookie(&state, "secret").await;
    let (_, _, body) =
      oneshot_json(state, "GET", "/api/admin/check", Some(&cookie), None).await;
    assert_eq!(body["logged_in"], json!(true));
  }

  #[tokio::test]
  async fn logout_revokes_the_session() {
    let state = make_state("secret").await;
    let cookie = login_cookie(&state, "secret").await;

    let (status, _, _) = oneshot_json(
      state.clone(),
      "POST",
      "/api/admin/logout",
      Some(&cookie),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = oneshot_json(
      state,
      "GET",
      "/api/admin/verses",
      Some(&cookie),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  // ── Admin gating ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn guarded_routes_require_a_session() {
    let state = make_state("secret").await;

    let delete_uri = format!("/api/admin/verses/{}", uuid::Uuid::new_v4());
    for (method, uri, body) in [
      ("GET", "/api/admin/verses", None),
      (
        "POST",
        "/api/admin/verses",
        Some(json!({ "text": "T", "reference": "R" })),
      ),
      ("GET", "/api/admin/draws", None),
      ("DELETE", delete_uri.as_str(), None),
    ] {
      let (status, _, value) =
        oneshot_json(state.clone(), method, uri, None, body).await;
      assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
      assert_eq!(value["success"], json!(false));
    }

    // The rejected POST above had no side effect.
    let cookie = login_cookie(&state, "secret").await;
    let (_, _, body) =
      oneshot_json(state, "GET", "/api/admin/verses", Some(&cookie), None).await;
    assert_eq!(body["verses"].as_array().unwrap().len(), 0);
  }

  #[tokio::test]
  async fn stale_cookie_is_unauthorized() {
    let state = make_state("secret").await;
    let (status, _, _) = oneshot_json(
      state,
      "GET",
      "/api/admin/verses",
      Some("verset_session=deadbeef"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  // ── Verse pool management ───────────────────────────────────────────────────

  #[tokio::test]
  async fn add_list_and_delete_verses() {
    let state = make_state("secret").await;
    let cookie = login_cookie(&state, "secret").await;

    let created = add_verse(&state, &cookie, "Trust in the Lord", "Prov 3:5").await;
    let id = created["verse"]["id"].as_str().unwrap().to_string();
    add_verse(&state, &cookie, "The Lord is my shepherd", "Ps 23:1").await;

    let (_, _, listing) = oneshot_json(
      state.clone(),
      "GET",
      "/api/admin/verses",
      Some(&cookie),
      None,
    )
    .await;
    assert_eq!(listing["verses"].as_array().unwrap().len(), 2);
    assert_eq!(listing["stats"]["total_verses"], json!(2));
    // Insertion order.
    assert_eq!(listing["verses"][0]["reference"], json!("Prov 3:5"));

    let (status, _, _) = oneshot_json(
      state.clone(),
      "DELETE",
      &format!("/api/admin/verses/{id}"),
      Some(&cookie),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, _, listing) =
      oneshot_json(state, "GET", "/api/admin/verses", Some(&cookie), None).await;
    assert_eq!(listing["verses"].as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn add_verse_rejects_blank_fields() {
    let state = make_state("secret").await;
    let cookie = login_cookie(&state, "secret").await;

    let (status, _, body) = oneshot_json(
      state,
      "POST",
      "/api/admin/verses",
      Some(&cookie),
      Some(json!({ "text": "   ", "reference": "Ref" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
  }

  #[tokio::test]
  async fn delete_unknown_verse_is_404() {
    let state = make_state("secret").await;
    let cookie = login_cookie(&state, "secret").await;

    let (status, _, _) = oneshot_json(
      state,
      "DELETE",
      &format!("/api/admin/verses/{}", uuid::Uuid::new_v4()),
      Some(&cookie),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Ledger reporting ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn draws_keep_their_snapshot_after_verse_deletion() {
    let state = make_state("secret").await;
    let cookie = login_cookie(&state, "secret").await;
    let created = add_verse(&state, &cookie, "Trust in the Lord", "Prov 3:5").await;
    let id = created["verse"]["id"].as_str().unwrap().to_string();

    oneshot_json(
      state.clone(),
      "POST",
      "/api/draw-verse",
      None,
      Some(json!({ "email": "x@y.com" })),
    )
    .await;

    let (status, _, _) = oneshot_json(
      state.clone(),
      "DELETE",
      &format!("/api/admin/verses/{id}"),
      Some(&cookie),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) =
      oneshot_json(state, "GET", "/api/admin/draws", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    let draws = body["draws"].as_array().unwrap();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0]["verse"]["reference"], json!("Prov 3:5"));
    assert_eq!(draws[0]["email"], json!("x@y.com"));
  }
}
