//! Monthly income/expense aggregates over the full client list.
//!
//! Recomputed from scratch on every call; nothing is cached.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::client::Client;

/// What the business pays the facility for one venue session.
pub const DEFAULT_VENUE_SESSION_COST: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
  /// The evaluated calendar month, `YYYY-MM`.
  pub month:            String,
  pub client_count:     usize,
  pub expected_income:  f64,
  pub expected_expense: f64,
}

/// Sum of `renewal_amount` over clients renewing in the same year-month as
/// `on`. Clients without a parseable renewal date contribute nothing.
pub fn expected_income(clients: &[Client], on: NaiveDate) -> f64 {
  clients
    .iter()
    .filter(|c| {
      c.renewal_on()
        .is_some_and(|d| d.year() == on.year() && d.month() == on.month())
    })
    .map(|c| c.renewal_amount)
    .sum()
}

/// Remaining venue sessions across all clients, priced at `session_cost`.
pub fn expected_expense(clients: &[Client], session_cost: f64) -> f64 {
  let sessions: u64 = clients
    .iter()
    .map(|c| u64::from(c.remaining_venue_sessions))
    .sum();
  sessions as f64 * session_cost
}

pub fn summarize(clients: &[Client], on: NaiveDate, session_cost: f64) -> Summary {
  Summary {
    month:            on.format("%Y-%m").to_string(),
    client_count:     clients.len(),
    expected_income:  expected_income(clients, on),
    expected_expense: expected_expense(clients, session_cost),
  }
}
