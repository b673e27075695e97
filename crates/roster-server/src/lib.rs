//! HTTP surface and background reminder sweep for the client roster.
//!
//! Exposes an axum [`Router`] backed by any [`ClientStore`] and any
//! [`NotificationChannel`], plus the [`sweep::ReminderSweep`] task that runs
//! the reminder pass once a day. There is no authentication.

pub mod error;
pub mod form;
pub mod handlers;
pub mod sweep;

#[cfg(test)]
mod testing;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{get, post},
};
use roster_core::{
  notify::{NotificationChannel, RecipientPolicy},
  store::ClientStore,
  summary::DEFAULT_VENUE_SESSION_COST,
};
use roster_notify::{DEFAULT_SEND_TIMEOUT_SECS, NotifierConfig};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use handlers::{clients, dashboard, reminders};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime configuration, deserialised from `roster.toml` and `ROSTER_*`
/// environment variables. Every key has a default.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  #[serde(default = "default_store_path")]
  pub store_path:         PathBuf,
  /// Facility cost per remaining venue session.
  #[serde(default = "default_venue_session_cost")]
  pub venue_session_cost: f64,
  /// Upper bound on one notification send.
  #[serde(default = "default_send_timeout_secs")]
  pub send_timeout_secs:  u64,
  #[serde(default)]
  pub notifier:           NotifierConfig,
  /// Overrides the notifier's default recipient policy.
  #[serde(default)]
  pub recipient:          Option<RecipientPolicy>,
}

fn default_host() -> String { "0.0.0.0".to_string() }

fn default_port() -> u16 { 5000 }

fn default_store_path() -> PathBuf { PathBuf::from("fitness_clients.db") }

fn default_venue_session_cost() -> f64 { DEFAULT_VENUE_SESSION_COST }

fn default_send_timeout_secs() -> u64 { DEFAULT_SEND_TIMEOUT_SECS }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:               default_host(),
      port:               default_port(),
      store_path:         default_store_path(),
      venue_session_cost: default_venue_session_cost(),
      send_timeout_secs:  default_send_timeout_secs(),
      notifier:           NotifierConfig::default(),
      recipient:          None,
    }
  }
}

impl ServerConfig {
  pub fn recipient_policy(&self) -> RecipientPolicy {
    self
      .recipient
      .clone()
      .unwrap_or_else(|| self.notifier.default_recipient_policy())
  }

  pub fn send_timeout(&self) -> Duration { Duration::from_secs(self.send_timeout_secs) }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers and the sweep.
pub struct AppState<S, N> {
  pub store:    Arc<S>,
  pub notifier: Arc<N>,
  pub config:   Arc<ServerConfig>,
}

impl<S, N> Clone for AppState<S, N> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      notifier: self.notifier.clone(),
      config:   self.config.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the roster.
pub fn router<S, N>(state: AppState<S, N>) -> Router
where
  S: ClientStore + 'static,
  N: NotificationChannel + 'static,
{
  Router::new()
    .route("/",                     get(dashboard::index::<S, N>))
    .route("/summary",              get(dashboard::summary::<S, N>))
    .route("/clients",              get(clients::list::<S, N>).post(clients::create::<S, N>))
    .route("/clients/{id}",         get(clients::get_one::<S, N>).post(clients::update::<S, N>))
    .route("/clients/{id}/delete",  post(clients::delete::<S, N>))
    .route("/reminders",            get(reminders::preview::<S, N>))
    .route("/reminders/check",      get(reminders::check::<S, N>).post(reminders::check::<S, N>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
