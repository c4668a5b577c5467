//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings, emails in their normalized form.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use verset_core::{
  draw::Draw,
  email::EmailAddress,
  verse::{Verse, VerseSnapshot},
};

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row shuttles ─────────────────────────────────────────────────────────────

/// A `verses` row as raw column values, before decoding.
pub struct RawVerse {
  pub verse_id:   String,
  pub text:       String,
  pub reference:  String,
  pub created_at: String,
}

impl RawVerse {
  pub fn into_verse(self) -> Result<Verse> {
    Ok(Verse {
      id:         decode_uuid(&self.verse_id)?,
      text:       self.text,
      reference:  self.reference,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// A `draws` row as raw column values, before decoding.
pub struct RawDraw {
  pub draw_id:         String,
  pub email:           String,
  pub first_name:      Option<String>,
  pub last_name:       Option<String>,
  pub verse_id:        String,
  pub verse_text:      String,
  pub verse_reference: String,
  pub drawn_at:        String,
}

impl RawDraw {
  pub fn into_draw(self) -> Result<Draw> {
    Ok(Draw {
      id:         decode_uuid(&self.draw_id)?,
      // Stored values were normalized on the way in; re-parsing is a
      // corruption check, not a second normalization.
      email:      EmailAddress::parse(&self.email).map_err(Error::Core)?,
      first_name: self.first_name,
      last_name:  self.last_name,
      verse:      VerseSnapshot {
        id:        decode_uuid(&self.verse_id)?,
        text:      self.verse_text,
        reference: self.verse_reference,
      },
      drawn_at:   decode_dt(&self.drawn_at)?,
    })
  }
}
