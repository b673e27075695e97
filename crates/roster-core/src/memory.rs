//! [`MemoryStore`] is an in-process [`ClientStore`].
//!
//! Holds everything in a `BTreeMap` behind a mutex that is never held across
//! an await point. Used by tests and by throwaway runs that need no file.

use std::{
  collections::BTreeMap,
  sync::{Arc, Mutex, MutexGuard},
};

use crate::{
  Error, Result,
  client::{Client, ClientId, NewClient},
  store::ClientStore,
};

#[derive(Default)]
struct Inner {
  last_id: i64,
  clients: BTreeMap<ClientId, Client>,
}

/// Cloning is cheap; clones share the same table.
#[derive(Clone, Default)]
pub struct MemoryStore {
  inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
    self.inner.lock().map_err(|_| Error::Poisoned)
  }

  /// Insert a record verbatim, bypassing validation. Lets tests seed rows
  /// whose `renewal_date` text would never pass through [`NewClient`].
  pub fn insert_raw(&self, client: Client) -> Result<()> {
    let mut inner = self.lock()?;
    inner.last_id = inner.last_id.max(client.id.0);
    inner.clients.insert(client.id, client);
    Ok(())
  }
}

impl ClientStore for MemoryStore {
  type Error = Error;

  async fn add_client(&self, input: NewClient) -> Result<Client> {
    input.validate()?;
    let mut inner = self.lock()?;
    inner.last_id += 1;
    let client = input.into_client(ClientId(inner.last_id));
    inner.clients.insert(client.id, client.clone());
    Ok(client)
  }

  async fn get_client(&self, id: ClientId) -> Result<Option<Client>> {
    Ok(self.lock()?.clients.get(&id).cloned())
  }

  async fn update_client(
    &self,
    id: ClientId,
    input: NewClient,
  ) -> Result<Option<Client>> {
    input.validate()?;
    let mut inner = self.lock()?;
    let Some(slot) = inner.clients.get_mut(&id) else {
      return Ok(None);
    };
    *slot = input.into_client(id);
    Ok(Some(slot.clone()))
  }

  async fn delete_client(&self, id: ClientId) -> Result<bool> {
    Ok(self.lock()?.clients.remove(&id).is_some())
  }

  async fn list_clients(&self) -> Result<Vec<Client>> {
    Ok(self.lock()?.clients.values().cloned().collect())
  }
}
