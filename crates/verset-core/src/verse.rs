//! Verse — one quotable entry in the admin-curated pool.
//!
//! Verses are never mutated in place; the update path is delete + re-add.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A verse as stored in the pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verse {
  pub id:         Uuid,
  pub text:       String,
  pub reference:  String,
  pub created_at: DateTime<Utc>,
}

impl Verse {
  /// The denormalized copy persisted into the draw ledger at draw time.
  pub fn snapshot(&self) -> VerseSnapshot {
    VerseSnapshot {
      id:        self.id,
      text:      self.text.clone(),
      reference: self.reference.clone(),
    }
  }
}

/// The subset of a verse that a draw remembers forever.
///
/// The ledger stores this copy rather than a live foreign key, so deleting a
/// verse from the pool never alters or dangles a past draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseSnapshot {
  pub id:        Uuid,
  pub text:      String,
  pub reference: String,
}

/// A validated request to add a verse to the pool.
#[derive(Debug, Clone)]
pub struct NewVerse {
  text:      String,
  reference: String,
}

impl NewVerse {
  /// Trim both fields and reject blank text or reference.
  pub fn new(text: &str, reference: &str) -> Result<Self> {
    let text = text.trim();
    let reference = reference.trim();
    if text.is_empty() || reference.is_empty() {
      return Err(Error::BlankVerseField);
    }
    Ok(Self { text: text.to_owned(), reference: reference.to_owned() })
  }

  pub fn text(&self) -> &str { &self.text }

  pub fn reference(&self) -> &str { &self.reference }

  pub fn into_parts(self) -> (String, String) { (self.text, self.reference) }
}
