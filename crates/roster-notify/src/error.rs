//! Error type for `roster-notify`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid email address: {0}")]
  Address(#[from] lettre::address::AddressError),

  #[error("could not build email: {0}")]
  Message(#[from] lettre::error::Error),

  #[error("smtp error: {0}")]
  Smtp(#[from] lettre::transport::smtp::Error),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The chat platform answered with a non-zero `errcode`.
  #[error("chat api error {code}: {message}")]
  ChatApi { code: i64, message: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
