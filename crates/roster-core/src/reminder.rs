//! Reminder evaluation: which clients need a renewal reminder right now.
//!
//! The window is anchored at the evaluation instant, not at a day boundary:
//! a renewal date counts as local midnight of that day and is due when it
//! falls in `[now, now + 7 days]`. Two evaluations on the same day can
//! therefore disagree as `now` advances; in particular a client renewing
//! today drops out once the clock passes midnight.

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use serde::Serialize;

use crate::client::{Client, ClientId, DATE_FORMAT};

/// Width of the forward-looking reminder window.
pub const REMINDER_WINDOW_DAYS: i64 = 7;

/// The inclusive `[start, end]` bounds of the reminder window at `now`.
/// The end saturates at [`NaiveDateTime::MAX`].
pub fn reminder_window(now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
  let end = now
    .checked_add_signed(TimeDelta::days(REMINDER_WINDOW_DAYS))
    .unwrap_or(NaiveDateTime::MAX);
  (now, end)
}

/// Whether `client` falls inside the reminder window at `now`.
pub fn is_due(client: &Client, now: NaiveDateTime) -> bool {
  let Some(date) = client.renewal_on() else {
    return false;
  };
  let at = date.and_time(NaiveTime::MIN);
  let (start, end) = reminder_window(now);
  start <= at && at <= end
}

/// Select the clients due for a reminder, in input order. Clients with a
/// missing or unparseable renewal date are skipped.
pub fn due_for_reminder(clients: &[Client], now: NaiveDateTime) -> Vec<&Client> {
  clients.iter().filter(|c| is_due(c, now)).collect()
}

/// A rendered reminder for one due client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reminder {
  pub client_id: ClientId,
  pub subject:   String,
  pub body:      String,
}

/// Render the reminder text for a client.
pub fn reminder_message(client: &Client) -> Reminder {
  let date = client
    .renewal_on()
    .map(|d| d.format(DATE_FORMAT).to_string())
    .unwrap_or_default();
  Reminder {
    client_id: client.id,
    subject:   format!("Renewal reminder: {}", client.name),
    body:      format!(
      "Client {} is due to renew on {}. Please get in touch!",
      client.name, date
    ),
  }
}
