//! Handlers for the list/aggregate view.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/` | All clients plus the monthly summary |
//! | `GET`  | `/summary` | Summary only |
//!
//! Both accept `?as_of=YYYY-MM-DD`; the default is today's local date.

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::{Local, NaiveDate};
use roster_core::{
  client::Client,
  notify::NotificationChannel,
  store::ClientStore,
  summary::{Summary, summarize},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct AsOfParams {
  pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
  pub clients: Vec<Client>,
  pub summary: Summary,
}

async fn load<S, N>(
  state: &AppState<S, N>,
  params: AsOfParams,
) -> Result<(Vec<Client>, Summary), ApiError>
where
  S: ClientStore,
  N: NotificationChannel,
{
  let clients = state.store.list_clients().await.map_err(ApiError::store)?;
  let on = params.as_of.unwrap_or_else(|| Local::now().date_naive());
  let summary = summarize(&clients, on, state.config.venue_session_cost);
  Ok((clients, summary))
}

/// `GET /[?as_of=YYYY-MM-DD]`
pub async fn index<S, N>(
  State(state): State<AppState<S, N>>,
  Query(params): Query<AsOfParams>,
) -> Result<Json<Dashboard>, ApiError>
where
  S: ClientStore,
  N: NotificationChannel,
{
  let (clients, summary) = load(&state, params).await?;
  Ok(Json(Dashboard { clients, summary }))
}

/// `GET /summary[?as_of=YYYY-MM-DD]`
pub async fn summary<S, N>(
  State(state): State<AppState<S, N>>,
  Query(params): Query<AsOfParams>,
) -> Result<Json<Summary>, ApiError>
where
  S: ClientStore,
  N: NotificationChannel,
{
  let (_, summary) = load(&state, params).await?;
  Ok(Json(summary))
}
