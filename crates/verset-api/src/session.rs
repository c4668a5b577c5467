//! Admin session guard: credential check, server-side session tokens, and
//! the `AdminSession` extractor.
//!
//! There is one configured admin identity (username + argon2 PHC hash), not
//! a user table. Sessions live in process memory; a restart logs the admin
//! out, which is acceptable for a single-admin dashboard.

use std::{collections::HashMap, sync::Arc};

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use chrono::{DateTime, Duration, Utc};
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use verset_core::store::VersetStore;

use crate::{AppState, error::ApiError};

/// Cookie carrying the admin session token.
pub const SESSION_COOKIE: &str = "verset_session";

// ─── Credentials ─────────────────────────────────────────────────────────────

/// The single admin identity accepted by this server instance.
#[derive(Clone)]
pub struct AdminAuth {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

impl AdminAuth {
  /// Check a login attempt. Every failure mode collapses into the same
  /// generic error so the response never reveals which field was wrong.
  pub fn verify(&self, username: &str, password: &str) -> Result<(), ApiError> {
    if username != self.username {
      return Err(ApiError::InvalidCredentials);
    }

    let parsed_hash = PasswordHash::new(&self.password_hash)
      .map_err(|_| ApiError::InvalidCredentials)?;

    Argon2::default()
      .verify_password(password.as_bytes(), &parsed_hash)
      .map_err(|_| ApiError::InvalidCredentials)
  }
}

// ─── Session store ───────────────────────────────────────────────────────────

/// In-memory session map: token → expiry.
///
/// Tokens are SHA-256 over the configured secret plus 32 bytes of OS
/// randomness, hex-encoded, so they cannot be guessed even under a weak
/// RNG. Expired entries are dropped on lookup.
#[derive(Clone)]
pub struct Sessions {
  secret: Arc<String>,
  ttl:    Duration,
  inner:  Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl Sessions {
  pub fn new(secret: impl Into<String>, ttl_secs: u64) -> Self {
    Self {
      secret: Arc::new(secret.into()),
      ttl:    Duration::seconds(ttl_secs as i64),
      inner:  Arc::new(RwLock::new(HashMap::new())),
    }
  }

  /// Mint a fresh token valid for the configured TTL.
  pub async fn issue(&self) -> String {
    let mut nonce = [0u8; 32];
    OsRng.fill_bytes(&mut nonce);

    let mut hasher = Sha256::new();
    hasher.update(self.secret.as_bytes());
    hasher.update(nonce);
    let token = hex::encode(hasher.finalize());

    let expires_at = Utc::now() + self.ttl;
    self.inner.write().await.insert(token.clone(), expires_at);
    token
  }

  /// `true` when the token exists and has not expired.
  pub async fn check(&self, token: &str) -> bool {
    let mut map = self.inner.write().await;
    match map.get(token) {
      Some(expires_at) if *expires_at > Utc::now() => true,
      Some(_) => {
        map.remove(token);
        false
      }
      None => false,
    }
  }

  pub async fn revoke(&self, token: &str) {
    self.inner.write().await.remove(token);
  }
}

// ─── Cookie plumbing ─────────────────────────────────────────────────────────

/// Pull the session token out of the `Cookie` header, if present.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
  let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
  cookies
    .split(';')
    .map(str::trim)
    .find_map(|c| c.strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
}

/// `Set-Cookie` value installing `token`.
pub fn session_cookie(token: &str) -> String {
  format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Strict")
}

/// `Set-Cookie` value clearing the session cookie.
pub fn clear_session_cookie() -> String {
  format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0")
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// Zero-size marker: present in a handler means the request carries a live
/// admin session.
pub struct AdminSession;

impl<S> FromRequestParts<AppState<S>> for AdminSession
where
  S: VersetStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token =
      session_token(&parts.headers).ok_or(ApiError::Unauthorized)?;
    if state.sessions.check(token).await {
      Ok(AdminSession)
    } else {
      Err(ApiError::Unauthorized)
    }
  }
}
