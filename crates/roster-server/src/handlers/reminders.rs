//! Handlers for `/reminders` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/reminders` | Due clients, nothing sent; optional `?at=` |
//! | `GET`, `POST` | `/reminders/check` | Runs the reminder pass now |

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::{Local, NaiveDateTime};
use roster_core::{
  client::Client,
  notify::NotificationChannel,
  reminder::due_for_reminder,
  store::ClientStore,
};
use serde::Deserialize;

use crate::{
  AppState,
  error::ApiError,
  sweep::{ReminderReport, run_check},
};

#[derive(Debug, Default, Deserialize)]
pub struct PreviewParams {
  /// Evaluation instant, `YYYY-MM-DDTHH:MM:SS`. Defaults to local now.
  pub at: Option<NaiveDateTime>,
}

/// `GET /reminders[?at=...]`
pub async fn preview<S, N>(
  State(state): State<AppState<S, N>>,
  Query(params): Query<PreviewParams>,
) -> Result<Json<Vec<Client>>, ApiError>
where
  S: ClientStore,
  N: NotificationChannel,
{
  let clients = state.store.list_clients().await.map_err(ApiError::store)?;
  let now = params.at.unwrap_or_else(|| Local::now().naive_local());
  let due = due_for_reminder(&clients, now).into_iter().cloned().collect();
  Ok(Json(due))
}

/// `GET|POST /reminders/check`: the manual trigger.
///
/// Delivery failures are reported in the counts only; the response is `200`
/// whenever the client list could be read.
pub async fn check<S, N>(
  State(state): State<AppState<S, N>>,
) -> Result<Json<ReminderReport>, ApiError>
where
  S: ClientStore,
  N: NotificationChannel,
{
  let report = run_check(
    state.store.as_ref(),
    state.notifier.as_ref(),
    &state.config.recipient_policy(),
    state.config.send_timeout(),
    Local::now().naive_local(),
  )
  .await
  .map_err(ApiError::store)?;
  Ok(Json(report))
}
