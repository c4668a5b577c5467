//! Draw — the one-time assignment of a verse to an email address.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{email::EmailAddress, verse::VerseSnapshot};

/// A ledger row. Created exactly once per normalized email, never updated.
#[derive(Debug, Clone, Serialize)]
pub struct Draw {
  pub id:         Uuid,
  pub email:      EmailAddress,
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  /// Snapshot of the verse as it was at draw time.
  pub verse:      VerseSnapshot,
  pub drawn_at:   DateTime<Utc>,
}

/// A draw about to be recorded. The id and timestamp are store-assigned.
#[derive(Debug, Clone)]
pub struct NewDraw {
  pub email:      EmailAddress,
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub verse:      VerseSnapshot,
}
