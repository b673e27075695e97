//! SQL schema for the roster SQLite store.
//!
//! Executed once at connection startup. Nullable numeric columns are read
//! back as zero so rows written by other tools still load. Databases whose
//! `clients` table predates `external_id` carry the chat recipient id in an
//! `openid` column; [`migrate`] renames it in place.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS clients (
    id                       INTEGER PRIMARY KEY AUTOINCREMENT,
    name                     TEXT NOT NULL,
    contact                  TEXT,
    renewal_date             TEXT,      -- YYYY-MM-DD, or NULL/'' for none
    remaining_sessions       INTEGER,
    renewal_amount           REAL,
    remaining_venue_sessions INTEGER,
    external_id              TEXT       -- chat-platform recipient id
);
";

/// Column that held the chat recipient id before it became `external_id`.
const LEGACY_EXTERNAL_ID: &str = "openid";

/// Bring an existing `clients` table up to [`SCHEMA`]. Safe to run on every
/// open; a table that already matches is left alone.
pub fn migrate(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
  let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('clients')")?;
  let columns = stmt
    .query_map([], |row| row.get::<_, String>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let has = |name: &str| columns.iter().any(|c| c.eq_ignore_ascii_case(name));
  if has(LEGACY_EXTERNAL_ID) && !has("external_id") {
    conn.execute_batch(
      "ALTER TABLE clients RENAME COLUMN openid TO external_id;",
    )?;
  }
  Ok(())
}
