//! Error types for `verset-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid email address: {0:?}")]
  InvalidEmail(String),

  #[error("verse text and reference must not be blank")]
  BlankVerseField,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
