//! Draw assignment — the one real algorithm in the system.
//!
//! Each email address receives exactly one verse, selected uniformly at
//! random from the current pool on the first draw and replayed verbatim on
//! every draw after that. The ledger's unique key on the normalized email is
//! the serialization point: when two first draws race, the loser re-reads
//! the winning row instead of surfacing an error.

use rand::seq::SliceRandom as _;
use thiserror::Error;

use crate::{
  draw::NewDraw,
  email::EmailAddress,
  store::{RecordDrawError, VersetStore},
  verse::VerseSnapshot,
};

/// The result of [`assign`].
#[derive(Debug, Clone)]
pub struct Assignment {
  pub verse:         VerseSnapshot,
  /// `true` when the email had already drawn and the stored verse was
  /// replayed with no new randomness and no ledger write.
  pub already_drawn: bool,
}

#[derive(Debug, Error)]
pub enum AssignError<E> {
  #[error("invalid email address: {0:?}")]
  InvalidEmail(String),

  #[error("no verses available to draw from")]
  EmptyPool,

  #[error("store error: {0}")]
  Store(#[source] E),
}

/// Assign a verse to `raw_email`, drawing one if this is its first request.
///
/// Idempotent: for a given email the returned verse never changes, and the
/// ledger gains exactly one row on the first call and none after.
pub async fn assign<S: VersetStore>(
  store: &S,
  raw_email: &str,
  first_name: Option<String>,
  last_name: Option<String>,
) -> Result<Assignment, AssignError<S::Error>> {
  let email = EmailAddress::parse(raw_email)
    .map_err(|_| AssignError::InvalidEmail(raw_email.to_owned()))?;

  loop {
    if let Some(existing) =
      store.find_draw(&email).await.map_err(AssignError::Store)?
    {
      return Ok(Assignment { verse: existing.verse, already_drawn: true });
    }

    let pool = store.list_verses().await.map_err(AssignError::Store)?;
    let chosen = pool
      .choose(&mut rand::thread_rng())
      .ok_or(AssignError::EmptyPool)?;

    let new_draw = NewDraw {
      email:      email.clone(),
      first_name: first_name.clone(),
      last_name:  last_name.clone(),
      verse:      chosen.snapshot(),
    };

    match store.record_draw(new_draw).await {
      Ok(draw) => {
        return Ok(Assignment { verse: draw.verse, already_drawn: false });
      }
      // A concurrent first draw for the same email won the race. Loop back
      // to the lookup and return the winning row. The ledger is
      // append-only, so the winner is there to be found.
      Err(RecordDrawError::Conflict(_)) => continue,
      Err(RecordDrawError::Store(e)) => return Err(AssignError::Store(e)),
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
