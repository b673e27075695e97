//! The reminder pass and the daily background sweep that runs it.
//!
//! [`run_check`] is shared by the sweep and the manual trigger endpoint, so
//! both perform the identical check. They do not coordinate: a manual check
//! racing the timer may notify the same clients twice.
//!
//! Delivery is best-effort and at-most-once. A failed or timed-out send is
//! logged at `warn` and counted; it is never retried and never surfaces as an
//! error to the caller.

use std::{sync::Arc, time::Duration};

use chrono::{Local, NaiveDateTime};
use roster_core::{
  notify::{NotificationChannel, RecipientPolicy},
  reminder::{Reminder, due_for_reminder, reminder_message},
  store::ClientStore,
};
use serde::Serialize;
use tokio::{
  sync::watch,
  task::JoinHandle,
  time::{Instant, MissedTickBehavior, interval_at},
};

use crate::AppState;

/// Period of the background sweep. Not persisted: a restart re-arms a fresh
/// countdown.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Outcome of one reminder pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReminderReport {
  /// Clients inside the reminder window.
  pub due:     usize,
  pub sent:    usize,
  pub failed:  usize,
  /// Due clients the recipient policy had no address for.
  pub skipped: usize,
}

/// Evaluate every client at `now` and notify each due one, sequentially.
///
/// Only a failure to list clients is returned as an error.
pub async fn run_check<S, N>(
  store: &S,
  notifier: &N,
  policy: &RecipientPolicy,
  send_timeout: Duration,
  now: NaiveDateTime,
) -> Result<ReminderReport, S::Error>
where
  S: ClientStore,
  N: NotificationChannel,
{
  let clients = store.list_clients().await?;
  let due = due_for_reminder(&clients, now);
  let mut report = ReminderReport { due: due.len(), ..ReminderReport::default() };

  for client in due {
    let Some(recipient) = policy.recipient_for(client) else {
      tracing::warn!(
        client_id = %client.id,
        name = %client.name,
        "no recipient for due client, skipping"
      );
      report.skipped += 1;
      continue;
    };
    let reminder = reminder_message(client);
    if deliver(notifier, recipient, &reminder, send_timeout).await {
      report.sent += 1;
    } else {
      report.failed += 1;
    }
  }

  tracing::info!(
    channel = notifier.name(),
    due = report.due,
    sent = report.sent,
    failed = report.failed,
    skipped = report.skipped,
    "reminder check finished"
  );
  Ok(report)
}

/// Send one reminder, bounded by `limit`. Returns whether it was delivered.
async fn deliver<N: NotificationChannel>(
  notifier: &N,
  recipient: &str,
  reminder: &Reminder,
  limit: Duration,
) -> bool {
  let send = notifier.send(recipient, &reminder.subject, &reminder.body);
  match tokio::time::timeout(limit, send).await {
    Ok(Ok(())) => {
      tracing::debug!(client_id = %reminder.client_id, recipient, "reminder sent");
      true
    }
    Ok(Err(e)) => {
      tracing::warn!(
        channel = notifier.name(),
        client_id = %reminder.client_id,
        recipient,
        error = %e,
        "reminder delivery failed"
      );
      false
    }
    Err(_) => {
      tracing::warn!(
        channel = notifier.name(),
        client_id = %reminder.client_id,
        recipient,
        timeout_secs = limit.as_secs(),
        "reminder delivery timed out"
      );
      false
    }
  }
}

/// Resolves once `shutdown` is `true` or its sender is gone.
async fn stop_requested(shutdown: &mut watch::Receiver<bool>) {
  let _ = shutdown.wait_for(|stop| *stop).await;
}

// ─── Background sweep ────────────────────────────────────────────────────────

/// Runs [`run_check`] on a fixed period in its own tokio task.
///
/// The task owns its own handles to the store and notifier and takes no lock
/// shared with request handling. The first pass happens one full interval
/// after [`ReminderSweep::spawn`]; missed ticks are skipped, not replayed.
/// Shutdown does not wait for a running pass to finish.
pub struct ReminderSweep<S, N> {
  store:        Arc<S>,
  notifier:     Arc<N>,
  policy:       RecipientPolicy,
  send_timeout: Duration,
  interval:     Duration,
}

impl<S, N> ReminderSweep<S, N>
where
  S: ClientStore + 'static,
  N: NotificationChannel + 'static,
{
  pub fn new(state: &AppState<S, N>) -> Self {
    Self {
      store:        state.store.clone(),
      notifier:     state.notifier.clone(),
      policy:       state.config.recipient_policy(),
      send_timeout: state.config.send_timeout(),
      interval:     SWEEP_INTERVAL,
    }
  }

  /// Override the period; tests use short intervals.
  pub fn with_interval(mut self, interval: Duration) -> Self {
    self.interval = interval;
    self
  }

  /// Arm the timer now and start the task. The task exits as soon as
  /// `shutdown` turns `true` or its sender is dropped; a pass in flight at
  /// that moment is abandoned, along with any send it was waiting on.
  pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
    let first = Instant::now() + self.interval;
    tokio::spawn(self.run(first, shutdown))
  }

  async fn run(self, first: Instant, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = interval_at(first, self.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
      interval_secs = self.interval.as_secs(),
      channel = self.notifier.name(),
      "reminder sweep armed"
    );

    loop {
      tokio::select! {
        changed = shutdown.changed() => {
          if changed.is_err() || *shutdown.borrow() {
            tracing::info!("reminder sweep shutting down");
            break;
          }
        }
        _ = ticker.tick() => {
          tokio::select! {
            () = self.fire() => {}
            () = stop_requested(&mut shutdown) => {
              tracing::info!("reminder sweep shutting down, abandoning pass in flight");
              break;
            }
          }
        }
      }
    }
  }

  async fn fire(&self) {
    tracing::debug!("reminder sweep running");
    let now = Local::now().naive_local();
    if let Err(e) = run_check(
      self.store.as_ref(),
      self.notifier.as_ref(),
      &self.policy,
      self.send_timeout,
      now,
    )
    .await
    {
      tracing::error!(error = %e, "reminder sweep could not list clients");
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, TimeDelta};
  use roster_core::{client::NewClient, memory::MemoryStore};

  use super::*;
  use crate::testing::{RecordingChannel, SlowChannel};

  fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 10)
      .unwrap()
      .and_hms_opt(8, 0, 0)
      .unwrap()
  }

  fn renewing(name: &str, contact: &str, on: Option<NaiveDate>) -> NewClient {
    let mut input = NewClient::new(name, contact);
    input.renewal_date = on;
    input
  }

  async fn seeded() -> MemoryStore {
    let store = MemoryStore::new();
    let d = |day| NaiveDate::from_ymd_opt(2024, 6, day);
    store.add_client(renewing("Ann", "ann@x.test", d(12))).await.unwrap();
    store.add_client(renewing("Ben", "ben@x.test", d(25))).await.unwrap();
    store.add_client(renewing("Cat", "  ", d(14))).await.unwrap();
    store.add_client(renewing("Dan", "dan@x.test", None)).await.unwrap();
    store
  }

  #[tokio::test]
  async fn notifies_each_due_client_once() {
    let store = seeded().await;
    let (channel, mut rx) = RecordingChannel::new();

    let report = run_check(
      &store,
      &channel,
      &RecipientPolicy::Contact,
      Duration::from_secs(5),
      now(),
    )
    .await
    .unwrap();

    assert_eq!(report, ReminderReport { due: 2, sent: 1, failed: 0, skipped: 1 });
    let sent = rx.try_recv().unwrap();
    assert_eq!(sent.recipient, "ann@x.test");
    assert_eq!(sent.subject, "Renewal reminder: Ann");
    assert!(sent.body.contains("2024-06-12"), "{}", sent.body);
    assert!(rx.try_recv().is_err());
  }

  #[tokio::test]
  async fn fixed_policy_sends_everything_to_one_address() {
    let store = seeded().await;
    let (channel, mut rx) = RecordingChannel::new();
    let policy = RecipientPolicy::Fixed { address: "owner@gym.test".into() };

    let report = run_check(&store, &channel, &policy, Duration::from_secs(5), now())
      .await
      .unwrap();

    assert_eq!(report.sent, 2);
    assert_eq!(rx.try_recv().unwrap().recipient, "owner@gym.test");
    assert_eq!(rx.try_recv().unwrap().recipient, "owner@gym.test");
  }

  #[tokio::test]
  async fn failures_are_counted_not_raised() {
    let store = seeded().await;
    let channel = RecordingChannel::failing();

    let report = run_check(
      &store,
      &channel,
      &RecipientPolicy::Contact,
      Duration::from_secs(5),
      now(),
    )
    .await
    .unwrap();

    assert_eq!(report.sent, 0);
    assert_eq!(report.failed, 1);
  }

  #[tokio::test(start_paused = true)]
  async fn slow_delivery_is_bounded_by_the_timeout() {
    let store = seeded().await;
    let channel = SlowChannel(Duration::from_secs(600));

    let report = run_check(
      &store,
      &channel,
      &RecipientPolicy::Contact,
      Duration::from_secs(30),
      now(),
    )
    .await
    .unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.sent, 0);
  }

  #[tokio::test(start_paused = true)]
  async fn sweep_waits_a_full_interval_then_fires() {
    let store = MemoryStore::new();
    let soon = Local::now().date_naive() + TimeDelta::days(3);
    store.add_client(renewing("Eve", "eve@x.test", Some(soon))).await.unwrap();

    let (channel, mut rx) = RecordingChannel::new();
    let state = crate::testing::state(store, channel);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let period = Duration::from_secs(3600);
    let handle = ReminderSweep::new(&state).with_interval(period).spawn(shutdown_rx);

    tokio::time::advance(period - Duration::from_secs(1)).await;
    tokio::task::yield_now().await;
    assert!(rx.try_recv().is_err(), "fired before the first interval");

    tokio::time::advance(Duration::from_secs(1)).await;
    let sent = rx.recv().await.unwrap();
    assert_eq!(sent.recipient, "eve@x.test");

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
  }

  #[tokio::test(start_paused = true)]
  async fn shutdown_abandons_a_pass_in_flight() {
    let store = MemoryStore::new();
    let soon = Local::now().date_naive() + TimeDelta::days(3);
    for name in ["Ann", "Ben", "Cat", "Dan", "Eve"] {
      let contact = format!("{}@x.test", name.to_lowercase());
      store.add_client(renewing(name, &contact, Some(soon))).await.unwrap();
    }

    let state = crate::testing::state(store, SlowChannel(Duration::from_secs(600)));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let period = Duration::from_secs(3600);
    let handle = ReminderSweep::new(&state).with_interval(period).spawn(shutdown_rx);

    // Land inside the first pass, which is now parked on its first send.
    tokio::time::advance(period + Duration::from_secs(1)).await;
    tokio::task::yield_now().await;

    let signalled = Instant::now();
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
    assert!(
      signalled.elapsed() < state.config.send_timeout(),
      "sweep waited {:?} after shutdown",
      signalled.elapsed()
    );
  }

  #[tokio::test(start_paused = true)]
  async fn sweep_exits_when_shutdown_sender_is_dropped() {
    let (channel, _rx) = RecordingChannel::new();
    let state = crate::testing::state(MemoryStore::new(), channel);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let handle = ReminderSweep::new(&state).spawn(shutdown_rx);
    drop(shutdown_tx);
    handle.await.unwrap();
  }
}
