//! Client records: the one entity the roster tracks.
//!
//! A [`Client`] is what the store hands back: its `renewal_date` is the raw
//! column text, which may be empty or (for rows written by other tools)
//! unparseable. A [`NewClient`] is what callers hand in: its renewal date is
//! already a [`NaiveDate`], so everything written through a store parses.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Format of `renewal_date` in storage and in form input.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ─── Identifier ──────────────────────────────────────────────────────────────

/// Store-assigned identifier. Never reused and never changed after creation.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct ClientId(pub i64);

impl fmt::Display for ClientId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// A persisted client record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
  pub id:                       ClientId,
  pub name:                     String,
  /// Email address or chat handle; free text.
  pub contact:                  String,
  /// Raw `YYYY-MM-DD` text as stored. See [`Client::renewal_on`].
  pub renewal_date:             Option<String>,
  /// Personal-training sessions left.
  pub remaining_sessions:       u32,
  /// Income expected at the next renewal.
  pub renewal_amount:           f64,
  /// Facility sessions left; each one costs the business a fixed fee.
  pub remaining_venue_sessions: u32,
  /// Recipient identifier on the chat platform, if the client has one.
  pub external_id:              Option<String>,
}

impl Client {
  /// The parsed renewal date, or `None` when the column is empty or does not
  /// hold a valid `YYYY-MM-DD` date. A `None` here means "no pending
  /// renewal"; it is never an error.
  pub fn renewal_on(&self) -> Option<NaiveDate> {
    self.renewal_date.as_deref().and_then(parse_renewal_date)
  }
}

/// Parse a renewal date in [`DATE_FORMAT`]. Blank input yields `None`.
pub fn parse_renewal_date(s: &str) -> Option<NaiveDate> {
  let s = s.trim();
  if s.is_empty() {
    return None;
  }
  NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

// ─── NewClient ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::ClientStore::add_client`] and
/// [`crate::store::ClientStore::update_client`]. Updates replace every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClient {
  pub name:                     String,
  pub contact:                  String,
  pub renewal_date:             Option<NaiveDate>,
  pub remaining_sessions:       u32,
  pub renewal_amount:           f64,
  pub remaining_venue_sessions: u32,
  pub external_id:              Option<String>,
}

impl NewClient {
  /// Convenience constructor with no renewal and all balances at zero.
  pub fn new(name: impl Into<String>, contact: impl Into<String>) -> Self {
    Self {
      name:                     name.into(),
      contact:                  contact.into(),
      renewal_date:             None,
      remaining_sessions:       0,
      renewal_amount:           0.0,
      remaining_venue_sessions: 0,
      external_id:              None,
    }
  }

  /// Check the invariants the type system does not already carry.
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::invalid("name", "must not be empty"));
    }
    if !self.renewal_amount.is_finite() || self.renewal_amount < 0.0 {
      return Err(Error::invalid(
        "renewal_amount",
        format!("must be a non-negative amount, got {}", self.renewal_amount),
      ));
    }
    Ok(())
  }

  /// The stored text form of `renewal_date`.
  pub fn renewal_date_text(&self) -> Option<String> {
    self.renewal_date.map(|d| d.format(DATE_FORMAT).to_string())
  }

  /// Build the persisted record once the store has assigned `id`.
  pub fn into_client(self, id: ClientId) -> Client {
    let renewal_date = self.renewal_date_text();
    Client {
      id,
      name: self.name,
      contact: self.contact,
      renewal_date,
      remaining_sessions: self.remaining_sessions,
      renewal_amount: self.renewal_amount,
      remaining_venue_sessions: self.remaining_venue_sessions,
      external_id: self.external_id,
    }
  }
}
