//! The `ClientStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `roster-store-sqlite`,
//! or [`crate::memory::MemoryStore`]). The server, the reminder sweep, and the
//! summary endpoint depend on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::client::{Client, ClientId, NewClient};

/// Abstraction over the client record table.
///
/// There is no transaction or locking discipline: concurrent writers may
/// interleave arbitrarily. Updates replace every field except the id.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ClientStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Validate and persist a new client; the store assigns the id.
  fn add_client(
    &self,
    input: NewClient,
  ) -> impl Future<Output = Result<Client, Self::Error>> + Send + '_;

  /// Retrieve a client by id. Returns `None` if not found.
  fn get_client(
    &self,
    id: ClientId,
  ) -> impl Future<Output = Result<Option<Client>, Self::Error>> + Send + '_;

  /// Replace every field of an existing client. Returns `None` if `id` does
  /// not exist; nothing is written in that case.
  fn update_client(
    &self,
    id: ClientId,
    input: NewClient,
  ) -> impl Future<Output = Result<Option<Client>, Self::Error>> + Send + '_;

  /// Delete a client. Returns `false` if `id` did not exist.
  fn delete_client(
    &self,
    id: ClientId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Every client, in id order.
  fn list_clients(
    &self,
  ) -> impl Future<Output = Result<Vec<Client>, Self::Error>> + Send + '_;
}
