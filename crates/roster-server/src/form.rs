//! Form input for creating and updating clients.
//!
//! Every field arrives as text so that a malformed value becomes a `400`
//! with a message naming the field, rather than an extractor rejection.

use roster_core::{
  Error, Result,
  client::{NewClient, parse_renewal_date},
};
use serde::Deserialize;

/// The fields of the add/edit client form. Missing fields read as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClientForm {
  pub name:                     String,
  pub contact:                  String,
  /// `YYYY-MM-DD`, or empty for no pending renewal.
  pub renewal_date:             String,
  pub remaining_sessions:       String,
  pub renewal_amount:           String,
  pub remaining_venue_sessions: String,
  pub external_id:              Option<String>,
}

impl ClientForm {
  /// Parse and validate into a [`NewClient`]. Nothing is written on error.
  pub fn into_new_client(self) -> Result<NewClient> {
    let input = NewClient {
      renewal_date:             parse_date("renewal_date", &self.renewal_date)?,
      remaining_sessions:       parse_count("remaining_sessions", &self.remaining_sessions)?,
      renewal_amount:           parse_amount("renewal_amount", &self.renewal_amount)?,
      remaining_venue_sessions: parse_count(
        "remaining_venue_sessions",
        &self.remaining_venue_sessions,
      )?,
      name:                     self.name.trim().to_owned(),
      contact:                  self.contact.trim().to_owned(),
      external_id:              self
        .external_id
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty()),
    };
    input.validate()?;
    Ok(input)
  }
}

fn parse_date(field: &'static str, raw: &str) -> Result<Option<chrono::NaiveDate>> {
  if raw.trim().is_empty() {
    return Ok(None);
  }
  parse_renewal_date(raw)
    .map(Some)
    .ok_or_else(|| Error::invalid(field, format!("expected YYYY-MM-DD, got {raw:?}")))
}

fn parse_count(field: &'static str, raw: &str) -> Result<u32> {
  raw.trim().parse().map_err(|_| {
    Error::invalid(field, format!("expected a non-negative whole number, got {raw:?}"))
  })
}

fn parse_amount(field: &'static str, raw: &str) -> Result<f64> {
  raw
    .trim()
    .parse()
    .map_err(|_| Error::invalid(field, format!("expected an amount, got {raw:?}")))
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  fn form() -> ClientForm {
    ClientForm {
      name:                     " Alice ".into(),
      contact:                  "alice@example.com".into(),
      renewal_date:             "2024-06-05".into(),
      remaining_sessions:       "8".into(),
      renewal_amount:           "300.50".into(),
      remaining_venue_sessions: "2".into(),
      external_id:              Some("".into()),
    }
  }

  #[test]
  fn valid_form_parses() {
    let input = form().into_new_client().unwrap();
    assert_eq!(input.name, "Alice");
    assert_eq!(input.renewal_date, NaiveDate::from_ymd_opt(2024, 6, 5));
    assert_eq!(input.remaining_sessions, 8);
    assert_eq!(input.renewal_amount, 300.5);
    assert_eq!(input.remaining_venue_sessions, 2);
    assert_eq!(input.external_id, None);
  }

  #[test]
  fn empty_renewal_date_means_none() {
    let input = ClientForm { renewal_date: "".into(), ..form() }
      .into_new_client()
      .unwrap();
    assert_eq!(input.renewal_date, None);
  }

  #[test]
  fn non_numeric_sessions_are_rejected() {
    let err = ClientForm { remaining_sessions: "eight".into(), ..form() }
      .into_new_client()
      .unwrap_err();
    assert!(
      matches!(err, Error::InvalidField { field: "remaining_sessions", .. }),
      "{err}"
    );
  }

  #[test]
  fn negative_counts_and_amounts_are_rejected() {
    assert!(ClientForm { remaining_venue_sessions: "-1".into(), ..form() }
      .into_new_client()
      .is_err());
    assert!(ClientForm { renewal_amount: "-5".into(), ..form() }
      .into_new_client()
      .is_err());
  }

  #[test]
  fn unparseable_date_is_rejected() {
    let err = ClientForm { renewal_date: "05/06/2024".into(), ..form() }
      .into_new_client()
      .unwrap_err();
    assert!(matches!(err, Error::InvalidField { field: "renewal_date", .. }));
  }

  #[test]
  fn missing_name_is_rejected() {
    assert!(ClientForm { name: "".into(), ..form() }.into_new_client().is_err());
  }
}
