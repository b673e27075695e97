//! Handlers for `/clients` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/clients` | All clients, id order |
//! | `POST` | `/clients` | Form body: [`ClientForm`]; `303` to `/` |
//! | `GET`  | `/clients/{id}` | 404 if not found |
//! | `POST` | `/clients/{id}` | Full replace from [`ClientForm`]; `303` to `/` |
//! | `POST` | `/clients/{id}/delete` | `303` to `/`; 404 if not found |
//!
//! Form posts answer with a redirect to the list view, so a browser lands
//! back on the dashboard.

use axum::{
  Form, Json,
  extract::{Path, State},
  response::Redirect,
};
use roster_core::{
  client::{Client, ClientId},
  notify::NotificationChannel,
  store::ClientStore,
};

use crate::{AppState, error::ApiError, form::ClientForm};

fn not_found(id: ClientId) -> ApiError {
  ApiError::NotFound(format!("client {id} not found"))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /clients`
pub async fn list<S, N>(
  State(state): State<AppState<S, N>>,
) -> Result<Json<Vec<Client>>, ApiError>
where
  S: ClientStore,
  N: NotificationChannel,
{
  let clients = state.store.list_clients().await.map_err(ApiError::store)?;
  Ok(Json(clients))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /clients`
pub async fn create<S, N>(
  State(state): State<AppState<S, N>>,
  Form(form): Form<ClientForm>,
) -> Result<Redirect, ApiError>
where
  S: ClientStore,
  N: NotificationChannel,
{
  let input = form.into_new_client()?;
  let client = state
    .store
    .add_client(input)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(client_id = %client.id, name = %client.name, "client added");
  Ok(Redirect::to("/"))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /clients/{id}`
pub async fn get_one<S, N>(
  State(state): State<AppState<S, N>>,
  Path(id): Path<ClientId>,
) -> Result<Json<Client>, ApiError>
where
  S: ClientStore,
  N: NotificationChannel,
{
  let client = state
    .store
    .get_client(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(client))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `POST /clients/{id}`, replacing every field.
pub async fn update<S, N>(
  State(state): State<AppState<S, N>>,
  Path(id): Path<ClientId>,
  Form(form): Form<ClientForm>,
) -> Result<Redirect, ApiError>
where
  S: ClientStore,
  N: NotificationChannel,
{
  let input = form.into_new_client()?;
  state
    .store
    .update_client(id, input)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  tracing::info!(client_id = %id, "client updated");
  Ok(Redirect::to("/"))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `POST /clients/{id}/delete`
pub async fn delete<S, N>(
  State(state): State<AppState<S, N>>,
  Path(id): Path<ClientId>,
) -> Result<Redirect, ApiError>
where
  S: ClientStore,
  N: NotificationChannel,
{
  let removed = state
    .store
    .delete_client(id)
    .await
    .map_err(ApiError::store)?;
  if !removed {
    return Err(not_found(id));
  }
  tracing::info!(client_id = %id, "client deleted");
  Ok(Redirect::to("/"))
}
