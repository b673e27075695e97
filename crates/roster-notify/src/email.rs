//! Outgoing mail relay over SMTP.

use std::time::Duration;

use lettre::{
  AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
  message::{Mailbox, header::ContentType},
  transport::smtp::authentication::Credentials,
};
use roster_core::notify::NotificationChannel;
use serde::Deserialize;

use crate::{DEFAULT_SEND_TIMEOUT_SECS, Result};

/// Port for SMTP over implicit TLS.
pub const SMTPS_PORT: u16 = 465;

/// How the relay connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmtpSecurity {
  /// TLS from the first byte, usually on port 465.
  Implicit,
  /// Plain connection upgraded with `STARTTLS`, usually on port 587.
  Starttls,
}

/// Relay settings. `port` defaults to 465 (implicit TLS).
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
  pub host:         String,
  #[serde(default = "default_smtp_port")]
  pub port:         u16,
  pub username:     String,
  pub password:     String,
  /// Sender address, e.g. `"Front Desk <desk@gym.example>"`.
  pub from:         String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  /// Unset means implicit TLS on port 465 and `STARTTLS` elsewhere.
  #[serde(default)]
  pub security:     Option<SmtpSecurity>,
}

fn default_smtp_port() -> u16 { SMTPS_PORT }

fn default_timeout_secs() -> u64 { DEFAULT_SEND_TIMEOUT_SECS }

impl EmailConfig {
  pub fn security(&self) -> SmtpSecurity {
    self.security.unwrap_or(if self.port == SMTPS_PORT {
      SmtpSecurity::Implicit
    } else {
      SmtpSecurity::Starttls
    })
  }
}

/// Sends each reminder as a plain-text email through one relay.
pub struct EmailChannel {
  from:      Mailbox,
  transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailChannel {
  pub fn new(config: &EmailConfig) -> Result<Self> {
    let from: Mailbox = config.from.parse()?;
    let creds = Credentials::new(config.username.clone(), config.password.clone());
    let builder = match config.security() {
      SmtpSecurity::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?,
      SmtpSecurity::Starttls => {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
      }
    };
    let transport = builder
      .port(config.port)
      .credentials(creds)
      .timeout(Some(Duration::from_secs(config.timeout_secs)))
      .build();
    Ok(Self { from, transport })
  }

  /// Build the message without sending it.
  pub fn build_message(
    &self,
    recipient: &str,
    subject: &str,
    body: &str,
  ) -> Result<Message> {
    Ok(
      Message::builder()
        .from(self.from.clone())
        .to(recipient.parse()?)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_owned())?,
    )
  }
}

impl NotificationChannel for EmailChannel {
  type Error = crate::Error;

  fn name(&self) -> &'static str { "email" }

  async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
    let message = self.build_message(recipient, subject, body)?;
    self.transport.send(message).await?;
    Ok(())
  }
}
