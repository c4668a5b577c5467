//! Normalized email addresses — the uniqueness key of the draw ledger.
//!
//! A draw belongs to an email address, not to a person, so two spellings of
//! the same address must collapse to one key. [`EmailAddress::parse`] trims
//! surrounding whitespace and lowercases before validating, and no other
//! constructor exists; holding an `EmailAddress` means the value is already
//! in canonical form.

use std::fmt;

use serde::Serialize;

use crate::{Error, Result};

/// A trimmed, lowercased, shape-checked email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
  /// Normalize and validate `raw`.
  ///
  /// The accepted shape is `local@domain.tld`: a non-empty local part of
  /// `[A-Za-z0-9._%+-]`, one or more domain labels of `[A-Za-z0-9-]`
  /// separated by dots, and a final label of at least two letters.
  pub fn parse(raw: &str) -> Result<Self> {
    let normalized = raw.trim().to_lowercase();

    let invalid = || Error::InvalidEmail(raw.to_owned());

    let (local, domain) = normalized.split_once('@').ok_or_else(invalid)?;

    if local.is_empty() || domain.contains('@') {
      return Err(invalid());
    }
    if !local
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c))
    {
      return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
      return Err(invalid());
    }
    for label in &labels {
      if label.is_empty()
        || !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
      {
        return Err(invalid());
      }
    }

    // The top-level label must be at least two letters.
    let tld = labels[labels.len() - 1];
    if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
      return Err(invalid());
    }

    Ok(Self(normalized))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for EmailAddress {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}
