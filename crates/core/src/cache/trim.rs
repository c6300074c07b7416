//! Entry-count bounding for a single store.

use super::connection::CacheDb;
use crate::Error;
use tokio_rusqlite::params;

impl CacheDb {
    /// Evict oldest entries until the store holds at most `max_entries`.
    ///
    /// Count and delete run inside one connection call, so a store that
    /// shrinks concurrently cannot push the delete below the cap; an
    /// already-deleted row simply doesn't match. Returns the number of
    /// evicted entries.
    ///
    /// Intended to run as detached maintenance after a put; callers on
    /// the response path should not await it.
    pub async fn trim(&self, store: &str, max_entries: usize) -> Result<u64, Error> {
        let label = store.to_string();
        let store = store.to_string();
        let max = max_entries as i64;
        let deleted = self
            .conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE store = ?1",
                    params![store],
                    |row| row.get(0),
                )?;
                if count <= max {
                    return Ok(0);
                }

                let excess = count - max;
                let deleted = conn.execute(
                    "DELETE FROM entries WHERE id IN (
                        SELECT id FROM entries WHERE store = ?1 ORDER BY id ASC LIMIT ?2
                    )",
                    params![store, excess],
                )?;
                Ok(deleted as u64)
            })
            .await
            .map_err(Error::from)?;

        if deleted > 0 {
            tracing::debug!(store = %label, max_entries, deleted, "trimmed cache store");
        }
        Ok(deleted)
    }
}
