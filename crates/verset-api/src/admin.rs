//! Handlers for the `/api/admin` endpoints.
//!
//! | Method   | Path                      | Notes |
//! |----------|---------------------------|-------|
//! | `POST`   | `/api/admin/login`        | Sets the session cookie |
//! | `POST`   | `/api/admin/logout`       | Succeeds even without a session |
//! | `GET`    | `/api/admin/check`        | `{"logged_in": bool}`, never 401 |
//! | `GET`    | `/api/admin/verses`       | Guarded; verses + stats |
//! | `POST`   | `/api/admin/verses`       | Guarded; 201 on success |
//! | `DELETE` | `/api/admin/verses/{id}`  | Guarded; 404 if unknown |
//! | `GET`    | `/api/admin/draws`        | Guarded; newest first |

use axum::{
  Json,
  extract::{Path, State},
  http::{HeaderMap, StatusCode, header},
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use verset_core::{store::VersetStore, verse::NewVerse};

use crate::{
  AppState,
  error::ApiError,
  session::{AdminSession, clear_session_cookie, session_cookie, session_token},
};

// ─── Login / logout ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

/// `POST /api/admin/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: VersetStore + Clone + Send + Sync + 'static,
{
  state.auth.verify(&body.username, &body.password)?;

  let token = state.sessions.issue().await;
  tracing::info!("admin logged in");

  Ok((
    [(header::SET_COOKIE, session_cookie(&token))],
    Json(json!({ "success": true })),
  ))
}

/// `POST /api/admin/logout` — revokes the presented session if any.
pub async fn logout<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> impl IntoResponse
where
  S: VersetStore + Clone + Send + Sync + 'static,
{
  if let Some(token) = session_token(&headers) {
    state.sessions.revoke(token).await;
  }
  (
    [(header::SET_COOKIE, clear_session_cookie())],
    Json(json!({ "success": true })),
  )
}

/// `GET /api/admin/check` — session probe for the dashboard; never 401.
pub async fn check<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Json<serde_json::Value>
where
  S: VersetStore + Clone + Send + Sync + 'static,
{
  let logged_in = match session_token(&headers) {
    Some(token) => state.sessions.check(token).await,
    None => false,
  };
  Json(json!({ "logged_in": logged_in }))
}

// ─── Verse pool ──────────────────────────────────────────────────────────────

/// `GET /api/admin/verses` — the pool in insertion order, plus counters.
pub async fn list_verses<S>(
  _session: AdminSession,
  State(state): State<AppState<S>>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: VersetStore + Clone + Send + Sync + 'static,
{
  let verses = state
    .store
    .list_verses()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let stats = state
    .store
    .stats()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(json!({ "success": true, "verses": verses, "stats": stats })))
}

#[derive(Debug, Deserialize)]
pub struct AddVerseBody {
  pub text:      String,
  pub reference: String,
}

/// `POST /api/admin/verses` — body: `{"text": "...", "reference": "..."}`
pub async fn add_verse<S>(
  _session: AdminSession,
  State(state): State<AppState<S>>,
  Json(body): Json<AddVerseBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: VersetStore + Clone + Send + Sync + 'static,
{
  let new_verse = NewVerse::new(&body.text, &body.reference)
    .map_err(|e| ApiError::Validation(e.to_string()))?;

  let verse = state
    .store
    .add_verse(new_verse)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::info!(reference = %verse.reference, "verse added");
  Ok((
    StatusCode::CREATED,
    Json(json!({ "success": true, "verse": verse })),
  ))
}

/// `DELETE /api/admin/verses/{id}` — past draws keep their snapshot.
pub async fn delete_verse<S>(
  _session: AdminSession,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: VersetStore + Clone + Send + Sync + 'static,
{
  let deleted = state
    .store
    .delete_verse(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  if !deleted {
    return Err(ApiError::NotFound(format!("verse {id} not found")));
  }

  tracing::info!(%id, "verse deleted");
  Ok(Json(json!({ "success": true })))
}

// ─── Draw ledger ─────────────────────────────────────────────────────────────

/// `GET /api/admin/draws` — full draw history, newest first.
pub async fn list_draws<S>(
  _session: AdminSession,
  State(state): State<AppState<S>>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: VersetStore + Clone + Send + Sync + 'static,
{
  let draws = state
    .store
    .list_draws()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(json!({ "success": true, "draws": draws })))
}
