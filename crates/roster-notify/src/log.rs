//! A channel that only writes reminders to the tracing log.

use std::convert::Infallible;

use roster_core::notify::NotificationChannel;

/// Used when no transport is configured, and for dry runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogChannel;

impl NotificationChannel for LogChannel {
  type Error = Infallible;

  fn name(&self) -> &'static str { "log" }

  async fn send(
    &self,
    recipient: &str,
    subject: &str,
    body: &str,
  ) -> Result<(), Infallible> {
    tracing::info!(recipient, subject, body, "reminder (log channel)");
    Ok(())
  }
}
