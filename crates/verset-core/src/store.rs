//! The `VersetStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g. `verset-store-sqlite`).
//! The HTTP layer (`verset-api`) depends on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{
  draw::{Draw, NewDraw},
  email::EmailAddress,
  verse::{NewVerse, Verse},
};

// ─── Stats ───────────────────────────────────────────────────────────────────

/// Counters shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DrawStats {
  pub total_draws:  u64,
  pub total_verses: u64,
}

// ─── Record outcome ──────────────────────────────────────────────────────────

/// Error returned by [`VersetStore::record_draw`].
///
/// `Conflict` means a row for the same normalized email already exists — in
/// practice a concurrent first draw won the race. Callers recover by
/// re-reading the winning row; the conflict is never shown to an end user.
#[derive(Debug, Error)]
pub enum RecordDrawError<E> {
  #[error("a draw already exists for {0}")]
  Conflict(EmailAddress),

  #[error("store error: {0}")]
  Store(#[source] E),
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Verset storage backend.
///
/// Holds two independent tables: the verse pool (admin-curated, rows are
/// added and deleted) and the draw ledger (append-only, one row per
/// normalized email). Deleting a verse never cascades into the ledger.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait VersetStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Verse pool ────────────────────────────────────────────────────────

  /// Insert a validated verse and return it with its fresh id.
  fn add_verse(
    &self,
    verse: NewVerse,
  ) -> impl Future<Output = Result<Verse, Self::Error>> + Send + '_;

  /// Delete a verse by id. Returns `false` if the id does not exist.
  /// Past draws keep their snapshot of the deleted verse.
  fn delete_verse(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// List the pool in insertion order (stable for admin display).
  fn list_verses(
    &self,
  ) -> impl Future<Output = Result<Vec<Verse>, Self::Error>> + Send + '_;

  fn count_verses(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Draw ledger ───────────────────────────────────────────────────────

  /// Look up the ledger row for a normalized email.
  fn find_draw<'a>(
    &'a self,
    email: &'a EmailAddress,
  ) -> impl Future<Output = Result<Option<Draw>, Self::Error>> + Send + 'a;

  /// Persist one new ledger row with a store-assigned timestamp.
  ///
  /// Must be atomic with respect to the uniqueness of the normalized email:
  /// when two writers race, exactly one succeeds and the other observes
  /// [`RecordDrawError::Conflict`].
  fn record_draw(
    &self,
    draw: NewDraw,
  ) -> impl Future<Output = Result<Draw, RecordDrawError<Self::Error>>> + Send + '_;

  /// List all draws, newest first.
  fn list_draws(
    &self,
  ) -> impl Future<Output = Result<Vec<Draw>, Self::Error>> + Send + '_;

  fn stats(
    &self,
  ) -> impl Future<Output = Result<DrawStats, Self::Error>> + Send + '_;
}
