//! [`SqliteStore`] — the SQLite implementation of [`VersetStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use verset_core::{
  draw::{Draw, NewDraw},
  email::EmailAddress,
  store::{DrawStats, RecordDrawError, VersetStore},
  verse::{NewVerse, Verse},
};

use crate::{
  Error, Result,
  encode::{RawDraw, RawVerse, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Verset store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// `true` when `err` is a UNIQUE (or other constraint) violation — for the
/// `draws` table that means the normalized email already has a row.
fn is_constraint_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

const DRAW_COLUMNS: &str = "draw_id, email, first_name, last_name, \
                            verse_id, verse_text, verse_reference, drawn_at";

fn draw_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawDraw> {
  Ok(RawDraw {
    draw_id:         row.get(0)?,
    email:           row.get(1)?,
    first_name:      row.get(2)?,
    last_name:       row.get(3)?,
    verse_id:        row.get(4)?,
    verse_text:      row.get(5)?,
    verse_reference: row.get(6)?,
    drawn_at:        row.get(7)?,
  })
}

// ─── VersetStore impl ─────────────────────────────────────────────────────────

impl VersetStore for SqliteStore {
  type Error = Error;

  // ── Verse pool ──────────────────────────────────────────────────────────

  async fn add_verse(&self, verse: NewVerse) -> Result<Verse> {
    let (text, reference) = verse.into_parts();
    let verse = Verse {
      id: Uuid::new_v4(),
      text,
      reference,
      created_at: Utc::now(),
    };

    let id_str   = encode_uuid(verse.id);
    let at_str   = encode_dt(verse.created_at);
    let text_c   = verse.text.clone();
    let ref_c    = verse.reference.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO verses (verse_id, text, reference, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, text_c, ref_c, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(verse)
  }

  async fn delete_verse(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM verses WHERE verse_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(n > 0)
      })
      .await?;

    Ok(deleted)
  }

  async fn list_verses(&self) -> Result<Vec<Verse>> {
    let raws: Vec<RawVerse> = self
      .conn
      .call(|conn| {
        // rowid preserves insertion order even when timestamps collide.
        let mut stmt = conn.prepare(
          "SELECT verse_id, text, reference, created_at
           FROM verses ORDER BY rowid ASC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawVerse {
              verse_id:   row.get(0)?,
              text:       row.get(1)?,
              reference:  row.get(2)?,
              created_at: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVerse::into_verse).collect()
  }

  async fn count_verses(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM verses", [], |r| r.get(0))?)
      })
      .await?;
    Ok(count as u64)
  }

  // ── Draw ledger ─────────────────────────────────────────────────────────

  async fn find_draw(&self, email: &EmailAddress) -> Result<Option<Draw>> {
    let email_str = email.as_str().to_owned();

    let raw: Option<RawDraw> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {DRAW_COLUMNS} FROM draws WHERE email = ?1"),
              rusqlite::params![email_str],
              draw_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDraw::into_draw).transpose()
  }

  async fn record_draw(
    &self,
    new_draw: NewDraw,
  ) -> Result<Draw, RecordDrawError<Error>> {
    let draw = Draw {
      id:         Uuid::new_v4(),
      email:      new_draw.email,
      first_name: new_draw.first_name,
      last_name:  new_draw.last_name,
      verse:      new_draw.verse,
      drawn_at:   Utc::now(),
    };

    let id_str       = encode_uuid(draw.id);
    let email_str    = draw.email.as_str().to_owned();
    let first        = draw.first_name.clone();
    let last         = draw.last_name.clone();
    let verse_id_str = encode_uuid(draw.verse.id);
    let verse_text   = draw.verse.text.clone();
    let verse_ref    = draw.verse.reference.clone();
    let at_str       = encode_dt(draw.drawn_at);

    // The insert and the uniqueness check are one atomic statement; a
    // losing concurrent writer sees the constraint violation, not a
    // partial write.
    let inserted = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "INSERT INTO draws (
             draw_id, email, first_name, last_name,
             verse_id, verse_text, verse_reference, drawn_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str, email_str, first, last,
            verse_id_str, verse_text, verse_ref, at_str,
          ],
        );
        match result {
          Ok(_) => Ok(true),
          Err(e) if is_constraint_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await
      .map_err(|e| RecordDrawError::Store(Error::Database(e)))?;

    if !inserted {
      return Err(RecordDrawError::Conflict(draw.email));
    }

    Ok(draw)
  }

  async fn list_draws(&self) -> Result<Vec<Draw>> {
    let raws: Vec<RawDraw> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {DRAW_COLUMNS} FROM draws
           ORDER BY drawn_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map([], draw_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDraw::into_draw).collect()
  }

  async fn stats(&self) -> Result<DrawStats> {
    let (draws, verses): (i64, i64) = self
      .conn
      .call(|conn| {
        let draws: i64 =
          conn.query_row("SELECT COUNT(*) FROM draws", [], |r| r.get(0))?;
        let verses: i64 =
          conn.query_row("SELECT COUNT(*) FROM verses", [], |r| r.get(0))?;
        Ok((draws, verses))
      })
      .await?;

    Ok(DrawStats { total_draws: draws as u64, total_verses: verses as u64 })
  }
}
