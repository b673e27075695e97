//! The `NotificationChannel` capability and recipient resolution.
//!
//! Concrete transports (SMTP relay, chat push, log) live in `roster-notify`.
//! Exactly one is chosen per deployment.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::client::Client;

/// A single outbound transport.
///
/// `send` reports failure to its caller; the reminder pass logs and drops
/// it. Implementations never retry.
pub trait NotificationChannel: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Short transport name for logs, e.g. `"email"`.
  fn name(&self) -> &'static str;

  fn send<'a>(
    &'a self,
    recipient: &'a str,
    subject: &'a str,
    body: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// Which address a reminder about a client is delivered to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecipientPolicy {
  /// The client's free-text `contact` field.
  Contact,
  /// The client's chat-platform `external_id`.
  ExternalId,
  /// One operator address receives every reminder.
  Fixed { address: String },
}

impl RecipientPolicy {
  /// The address to notify about `client`, or `None` if the policy yields
  /// nothing usable (no external id, blank contact).
  pub fn recipient_for<'a>(&'a self, client: &'a Client) -> Option<&'a str> {
    let raw = match self {
      Self::Contact => client.contact.as_str(),
      Self::ExternalId => client.external_id.as_deref()?,
      Self::Fixed { address } => address.as_str(),
    };
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::client::{ClientId, NewClient};

  fn client(contact: &str, external_id: Option<&str>) -> Client {
    let mut input = NewClient::new("Dana", contact);
    input.external_id = external_id.map(str::to_owned);
    input.into_client(ClientId(1))
  }

  #[test]
  fn contact_policy_uses_contact() {
    let c = client("dana@example.com", Some("oX123"));
    assert_eq!(
      RecipientPolicy::Contact.recipient_for(&c),
      Some("dana@example.com")
    );
  }

  #[test]
  fn external_id_policy_requires_an_external_id() {
    let with = client("dana@example.com", Some("oX123"));
    let without = client("dana@example.com", None);
    assert_eq!(RecipientPolicy::ExternalId.recipient_for(&with), Some("oX123"));
    assert_eq!(RecipientPolicy::ExternalId.recipient_for(&without), None);
  }

  #[test]
  fn fixed_policy_ignores_the_client() {
    let policy = RecipientPolicy::Fixed { address: "owner@gym.test".into() };
    assert_eq!(policy.recipient_for(&client("", None)), Some("owner@gym.test"));
  }

  #[test]
  fn blank_recipients_are_none() {
    assert_eq!(RecipientPolicy::Contact.recipient_for(&client("  ", None)), None);
  }

  #[test]
  fn policy_deserialises_from_tagged_form() {
    let p: RecipientPolicy =
      serde_json::from_str(r#"{"kind":"fixed","address":"a@b.c"}"#).unwrap();
    assert_eq!(p, RecipientPolicy::Fixed { address: "a@b.c".into() });
    let p: RecipientPolicy = serde_json::from_str(r#"{"kind":"external_id"}"#).unwrap();
    assert_eq!(p, RecipientPolicy::ExternalId);
  }
}
