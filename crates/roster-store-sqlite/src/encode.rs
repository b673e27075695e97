//! Row decoding between the `clients` table and [`Client`].
//!
//! Dates stay as the raw column text; parsing happens in
//! [`Client::renewal_on`]. Empty strings in optional text columns read back
//! as `None`.

use roster_core::client::{Client, ClientId};

/// Column list shared by every `SELECT` so [`RawClient::from_row`] indices
/// stay in sync.
pub const CLIENT_COLUMNS: &str = "id, name, contact, renewal_date, \
   remaining_sessions, renewal_amount, remaining_venue_sessions, external_id";

/// Values read directly from a `clients` row, before normalisation.
pub struct RawClient {
  pub id:                       i64,
  pub name:                     String,
  pub contact:                  Option<String>,
  pub renewal_date:             Option<String>,
  pub remaining_sessions:       Option<u32>,
  pub renewal_amount:           Option<f64>,
  pub remaining_venue_sessions: Option<u32>,
  pub external_id:              Option<String>,
}

impl RawClient {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawClient {
      id:                       row.get(0)?,
      name:                     row.get(1)?,
      contact:                  row.get(2)?,
      renewal_date:             row.get(3)?,
      remaining_sessions:       row.get(4)?,
      renewal_amount:           row.get(5)?,
      remaining_venue_sessions: row.get(6)?,
      external_id:              row.get(7)?,
    })
  }

  pub fn into_client(self) -> Client {
    Client {
      id:                       ClientId(self.id),
      name:                     self.name,
      contact:                  self.contact.unwrap_or_default(),
      renewal_date:             non_empty(self.renewal_date),
      remaining_sessions:       self.remaining_sessions.unwrap_or(0),
      renewal_amount:           self.renewal_amount.unwrap_or(0.0),
      remaining_venue_sessions: self.remaining_venue_sessions.unwrap_or(0),
      external_id:              non_empty(self.external_id),
    }
  }
}

fn non_empty(s: Option<String>) -> Option<String> {
  s.filter(|v| !v.trim().is_empty())
}
