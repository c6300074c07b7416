//! Store adapter operations over named cache stores.
//!
//! All stores live in one SQLite database, distinguished by the `store`
//! column. A store comes into existence on first write; a lookup miss
//! is a valid outcome (`Ok(None)`), never an error.

use super::connection::CacheDb;
use crate::{CacheRequest, CachedResponse, Error, ResponseKind};
use bytes::Bytes;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;
use url::Url;

impl CacheDb {
    /// Look up a cached response by method + URL.
    ///
    /// Returns `Ok(None)` on a miss.
    pub async fn lookup(&self, store: &str, request: &CacheRequest) -> Result<Option<CachedResponse>, Error> {
        let store = store.to_string();
        let method = request.method.clone();
        let url = request.url.to_string();
        let row = self
            .conn
            .call(move |conn| -> Result<Option<(u16, String, String, Vec<u8>)>, Error> {
                let result = conn.query_row(
                    "SELECT status, kind, headers_json, body FROM entries
                     WHERE store = ?1 AND method = ?2 AND url = ?3",
                    params![store, method, url],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
                );
                match result {
                    Ok(r) => Ok(Some(r)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        match row {
            None => Ok(None),
            Some((status, kind, headers_json, body)) => {
                let kind = ResponseKind::parse(&kind)?;
                let headers = CachedResponse::headers_from_json(&headers_json)?;
                Ok(Some(CachedResponse { status, kind, headers, body: Bytes::from(body) }))
            }
        }
    }

    /// Insert or overwrite the entry for a request key.
    ///
    /// Uses UPSERT semantics: an overwrite replaces the stored response
    /// but keeps the entry's original insertion position, so re-putting
    /// a key never refreshes it in the eviction order.
    pub async fn put(&self, store: &str, request: &CacheRequest, response: CachedResponse) -> Result<(), Error> {
        let store = store.to_string();
        let method = request.method.clone();
        let url = request.url.to_string();
        let headers_json = response.headers_json()?;
        let kind = response.kind.as_str();
        let status = response.status;
        let body = response.body.to_vec();
        let inserted_at = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO entries (store, method, url, status, kind, headers_json, body, inserted_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                     ON CONFLICT(store, method, url) DO UPDATE SET
                        status = excluded.status,
                        kind = excluded.kind,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        inserted_at = excluded.inserted_at",
                    params![store, method, url, status, kind, headers_json, body, inserted_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// All request keys in a store, oldest first.
    pub async fn keys(&self, store: &str) -> Result<Vec<CacheRequest>, Error> {
        let store = store.to_string();
        let rows = self
            .conn
            .call(move |conn| -> Result<Vec<(String, String)>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT method, url FROM entries WHERE store = ?1 ORDER BY id ASC",
                )?;
                let rows = stmt
                    .query_map(params![store], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)?;

        rows.into_iter()
            .map(|(method, url)| {
                let url = Url::parse(&url).map_err(|e| Error::CorruptEntry(e.to_string()))?;
                Ok(CacheRequest::new(method, url))
            })
            .collect()
    }

    /// Delete a single entry. Deleting an absent key is a no-op.
    pub async fn delete(&self, store: &str, request: &CacheRequest) -> Result<bool, Error> {
        let store = store.to_string();
        let method = request.method.clone();
        let url = request.url.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute(
                    "DELETE FROM entries WHERE store = ?1 AND method = ?2 AND url = ?3",
                    params![store, method, url],
                )?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete an entire store. Returns the number of entries removed.
    pub async fn delete_store(&self, store: &str) -> Result<u64, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let deleted = conn.execute("DELETE FROM entries WHERE store = ?1", params![store])?;
                Ok(deleted as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Names of all stores that currently hold at least one entry.
    pub async fn list_store_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT DISTINCT store FROM entries ORDER BY store")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in a store.
    pub async fn entry_count(&self, store: &str) -> Result<u64, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE store = ?1",
                    params![store],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Per-store entry counts, for host diagnostics.
    pub async fn stats(&self) -> Result<Vec<(String, u64)>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<(String, u64)>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT store, COUNT(*) FROM entries GROUP BY store ORDER BY store",
                )?;
                let rows = stmt
                    .query_map([], |row| Ok((row.get(0)?, row.get::<_, i64>(1)? as u64)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)
    }
}
