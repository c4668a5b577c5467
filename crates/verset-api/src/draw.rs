//! Handler for `POST /api/draw-verse` — the public draw endpoint.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use verset_core::{assign::assign, store::VersetStore};

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct DrawBody {
  pub email:      String,
  #[serde(default)]
  pub first_name: Option<String>,
  #[serde(default)]
  pub last_name:  Option<String>,
}

/// `POST /api/draw-verse` — body: `{"email": "...", "first_name"?, "last_name"?}`
///
/// First draw for an email picks a verse at random and records it; every
/// later draw replays the recorded verse with `already_drawn = true`.
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<DrawBody>,
) -> Result<Json<Value>, ApiError>
where
  S: VersetStore + Clone + Send + Sync + 'static,
{
  let first_name = clean_name(body.first_name);
  let last_name = clean_name(body.last_name);

  let assignment = assign(&*state.store, &body.email, first_name, last_name)
    .await
    .map_err(ApiError::from_assign)?;

  tracing::info!(
    already_drawn = assignment.already_drawn,
    reference = %assignment.verse.reference,
    "verse assigned"
  );

  Ok(Json(json!({
    "success": true,
    "verse": assignment.verse,
    "already_drawn": assignment.already_drawn,
  })))
}

fn clean_name(name: Option<String>) -> Option<String> {
  name
    .map(|s| s.trim().to_owned())
    .filter(|s| !s.is_empty())
}
