//! [`SqliteStore`]: the SQLite implementation of [`ClientStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use roster_core::{
  client::{Client, ClientId, NewClient},
  store::ClientStore,
};

use crate::{
  Result,
  encode::{CLIENT_COLUMNS, RawClient},
  schema::{self, SCHEMA},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A client roster backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        schema::migrate(conn)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run raw SQL against the connection. Lets tests seed rows that bypass
  /// [`NewClient`] validation, as rows written by other tools would.
  #[cfg(test)]
  pub(crate) async fn execute_raw(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ClientStore impl ────────────────────────────────────────────────────────

impl ClientStore for SqliteStore {
  type Error = crate::Error;

  async fn add_client(&self, input: NewClient) -> Result<Client> {
    input.validate()?;

    let name         = input.name.clone();
    let contact      = input.contact.clone();
    let renewal_date = input.renewal_date_text();
    let sessions     = input.remaining_sessions;
    let amount       = input.renewal_amount;
    let venue        = input.remaining_venue_sessions;
    let external_id  = input.external_id.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO clients (
             name, contact, renewal_date, remaining_sessions,
             renewal_amount, remaining_venue_sessions, external_id
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            name,
            contact,
            renewal_date,
            sessions,
            amount,
            venue,
            external_id,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(input.into_client(ClientId(id)))
  }

  async fn get_client(&self, id: ClientId) -> Result<Option<Client>> {
    let raw: Option<RawClient> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1"),
              rusqlite::params![id.0],
              RawClient::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(RawClient::into_client))
  }

  async fn update_client(
    &self,
    id: ClientId,
    input: NewClient,
  ) -> Result<Option<Client>> {
    input.validate()?;

    let name         = input.name.clone();
    let contact      = input.contact.clone();
    let renewal_date = input.renewal_date_text();
    let sessions     = input.remaining_sessions;
    let amount       = input.renewal_amount;
    let venue        = input.remaining_venue_sessions;
    let external_id  = input.external_id.clone();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE clients SET
             name = ?2, contact = ?3, renewal_date = ?4,
             remaining_sessions = ?5, renewal_amount = ?6,
             remaining_venue_sessions = ?7, external_id = ?8
           WHERE id = ?1",
          rusqlite::params![
            id.0,
            name,
            contact,
            renewal_date,
            sessions,
            amount,
            venue,
            external_id,
          ],
        )?)
      })
      .await?;

    Ok((changed > 0).then(|| input.into_client(id)))
  }

  async fn delete_client(&self, id: ClientId) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM clients WHERE id = ?1",
          rusqlite::params![id.0],
        )?)
      })
      .await?;

    Ok(removed > 0)
  }

  async fn list_clients(&self) -> Result<Vec<Client>> {
    let raws: Vec<RawClient> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {CLIENT_COLUMNS} FROM clients ORDER BY id"))?;
        let rows = stmt
          .query_map([], RawClient::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawClient::into_client).collect())
  }
}
