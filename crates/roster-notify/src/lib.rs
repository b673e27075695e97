//! Notification transports for renewal reminders.
//!
//! Each deployment picks exactly one transport through [`NotifierConfig`]:
//! an SMTP relay, a chat-platform push, or the log. [`Notifier`] wraps the
//! chosen one behind [`NotificationChannel`] so callers stay transport-agnostic.

pub mod chat;
pub mod email;
pub mod error;
pub mod log;

pub use chat::{ChatChannel, ChatConfig};
pub use email::{EmailChannel, EmailConfig, SmtpSecurity};
pub use error::{Error, Result};
pub use log::LogChannel;

use roster_core::notify::{NotificationChannel, RecipientPolicy};
use serde::Deserialize;

/// Upper bound on a single delivery attempt, in seconds.
pub const DEFAULT_SEND_TIMEOUT_SECS: u64 = 30;

/// Transport selection, deserialised from the `[notifier]` config table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotifierConfig {
  Email(EmailConfig),
  Chat(ChatConfig),
  #[default]
  Log,
}

impl NotifierConfig {
  /// The recipient policy used when the config does not name one: email and
  /// log address the client's contact, chat addresses its platform id.
  pub fn default_recipient_policy(&self) -> RecipientPolicy {
    match self {
      Self::Email(_) | Self::Log => RecipientPolicy::Contact,
      Self::Chat(_) => RecipientPolicy::ExternalId,
    }
  }
}

/// The transport chosen at deployment time.
pub enum Notifier {
  Email(EmailChannel),
  Chat(ChatChannel),
  Log(LogChannel),
}

impl Notifier {
  pub fn from_config(config: &NotifierConfig) -> Result<Self> {
    Ok(match config {
      NotifierConfig::Email(c) => Self::Email(EmailChannel::new(c)?),
      NotifierConfig::Chat(c) => Self::Chat(ChatChannel::new(c.clone())?),
      NotifierConfig::Log => Self::Log(LogChannel),
    })
  }
}

impl NotificationChannel for Notifier {
  type Error = Error;

  fn name(&self) -> &'static str {
    match self {
      Self::Email(c) => c.name(),
      Self::Chat(c) => c.name(),
      Self::Log(c) => c.name(),
    }
  }

  async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
    match self {
      Self::Email(c) => c.send(recipient, subject, body).await,
      Self::Chat(c) => c.send(recipient, subject, body).await,
      Self::Log(c) => c
        .send(recipient, subject, body)
        .await
        .map_err(|never| match never {}),
    }
  }
}
