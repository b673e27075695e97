//! Test doubles shared by the handler and sweep tests.

use std::{io, sync::Arc, time::Duration};

use roster_core::{memory::MemoryStore, notify::NotificationChannel};
use tokio::sync::mpsc;

use crate::{AppState, ServerConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
  pub recipient: String,
  pub subject:   String,
  pub body:      String,
}

/// Records every send on a channel, or fails every send.
#[derive(Clone)]
pub struct RecordingChannel {
  tx: Option<mpsc::UnboundedSender<Sent>>,
}

impl RecordingChannel {
  pub fn new() -> (Self, mpsc::UnboundedReceiver<Sent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Self { tx: Some(tx) }, rx)
  }

  pub fn failing() -> Self { Self { tx: None } }
}

impl NotificationChannel for RecordingChannel {
  type Error = io::Error;

  fn name(&self) -> &'static str { "recording" }

  async fn send(&self, recipient: &str, subject: &str, body: &str) -> io::Result<()> {
    let Some(tx) = &self.tx else {
      return Err(io::Error::other("transport down"));
    };
    let _ = tx.send(Sent {
      recipient: recipient.to_owned(),
      subject:   subject.to_owned(),
      body:      body.to_owned(),
    });
    Ok(())
  }
}

/// Never finishes within any reasonable timeout.
pub struct SlowChannel(pub Duration);

impl NotificationChannel for SlowChannel {
  type Error = io::Error;

  fn name(&self) -> &'static str { "slow" }

  async fn send(&self, _recipient: &str, _subject: &str, _body: &str) -> io::Result<()> {
    tokio::time::sleep(self.0).await;
    Ok(())
  }
}

pub fn state<N: NotificationChannel>(
  store: MemoryStore,
  notifier: N,
) -> AppState<MemoryStore, N> {
  AppState {
    store:    Arc::new(store),
    notifier: Arc::new(notifier),
    config:   Arc::new(ServerConfig::default()),
  }
}
