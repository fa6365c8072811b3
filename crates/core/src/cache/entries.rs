//! Entry reads and writes within a named store.
//!
//! Entries are immutable snapshots; writing the same key again replaces
//! the previous value in full.

use super::connection::CacheDb;
use super::hash::compute_entry_key;
use crate::http::{Request, Response, ResponseSource};
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A stored response snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CachedEntry {
    pub store: String,
    pub key_hash: String,
    pub method: String,
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    #[serde(skip)]
    pub body: Vec<u8>,
    pub body_len: usize,
    pub stored_at: String,
}

impl CachedEntry {
    /// Snapshot a response for `request` into `store`.
    pub fn from_response(store: &str, request: &Request, response: &Response) -> Self {
        let url = request.url.to_string();
        Self {
            store: store.to_string(),
            key_hash: compute_entry_key(&request.method, &url),
            method: request.method.clone(),
            url,
            status: response.status,
            headers: response.headers.clone(),
            body: response.body.to_vec(),
            body_len: response.body.len(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Rehydrate the stored snapshot as a response served from cache.
    pub fn into_response(self) -> Response {
        Response::new(self.status, self.headers, self.body, ResponseSource::Cache)
    }
}

fn insert_entry(conn: &rusqlite::Connection, entry: &CachedEntry) -> Result<(), Error> {
    let headers_json =
        serde_json::to_string(&entry.headers).map_err(|e| Error::InvalidInput(format!("unencodable headers: {e}")))?;
    conn.execute(
        "INSERT OR IGNORE INTO stores (name, created_at) VALUES (?1, ?2)",
        params![&entry.store, &entry.stored_at],
    )?;
    conn.execute(
        "INSERT INTO entries (store, key_hash, method, url, status, headers_json, body, stored_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(store, key_hash) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            status = excluded.status,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            &entry.store,
            &entry.key_hash,
            &entry.method,
            &entry.url,
            entry.status as i64,
            headers_json,
            &entry.body,
            &entry.stored_at,
        ],
    )?;
    Ok(())
}

impl CacheDb {
    /// Write an entry, opening its store if needed.
    ///
    /// Uses UPSERT semantics: a later write for the same key fully
    /// replaces the earlier one.
    pub async fn put_entry(&self, entry: CachedEntry) -> Result<(), Error> {
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                insert_entry(&tx, &entry)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Write a batch of entries in a single transaction.
    ///
    /// Either every entry lands or none does.
    pub async fn put_entries_atomic(&self, entries: Vec<CachedEntry>) -> Result<(), Error> {
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                for entry in &entries {
                    insert_entry(&tx, entry)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up the entry for `request` in the named store.
    ///
    /// Returns None if the store or the key doesn't exist. Never creates
    /// the store.
    pub async fn match_entry(&self, store: &str, request: &Request) -> Result<Option<CachedEntry>, Error> {
        let store = store.to_string();
        let key_hash = compute_entry_key(&request.method, request.url.as_str());
        self.conn
            .call(move |conn| -> Result<Option<CachedEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT store, key_hash, method, url, status, headers_json, body, stored_at
                     FROM entries WHERE store = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![store, key_hash], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, Vec<u8>>(6)?,
                        row.get::<_, String>(7)?,
                    ))
                });

                let (store, key_hash, method, url, status, headers_json, body, stored_at) = match result {
                    Ok(row) => row,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };

                let headers: Vec<(String, String)> = serde_json::from_str(&headers_json)
                    .map_err(|e| Error::CorruptEntry(format!("headers for {url}: {e}")))?;
                let status = u16::try_from(status)
                    .map_err(|_| Error::CorruptEntry(format!("status {status} for {url}")))?;

                Ok(Some(CachedEntry {
                    store,
                    key_hash,
                    method,
                    url,
                    status,
                    headers,
                    body_len: body.len(),
                    body,
                    stored_at,
                }))
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries held by a store.
    pub async fn entry_count(&self, store: &str) -> Result<u64, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE store = ?1", params![store], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn get(url: &str) -> Request {
        Request::get(Url::parse(url).unwrap())
    }

    fn page(body: &str) -> Response {
        Response::new(
            200,
            vec![("Content-Type".into(), "text/html".into())],
            body.to_string(),
            ResponseSource::Network,
        )
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let req = get("http://localhost:5000/team");

        db.put_entry(CachedEntry::from_response("app-dynamic-v1", &req, &page("<h1>team</h1>")))
            .await
            .unwrap();

        let entry = db.match_entry("app-dynamic-v1", &req).await.unwrap().unwrap();
        assert_eq!(entry.url, "http://localhost:5000/team");
        assert_eq!(entry.body_len, 13);

        let resp = entry.into_response();
        assert_eq!(resp.source, ResponseSource::Cache);
        assert_eq!(resp.text(), "<h1>team</h1>");
        assert_eq!(resp.content_type(), Some("text/html"));
    }

    #[tokio::test]
    async fn test_put_replaces_existing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let req = get("http://localhost:5000/team");

        db.put_entry(CachedEntry::from_response("s", &req, &page("old"))).await.unwrap();
        db.put_entry(CachedEntry::from_response("s", &req, &page("new"))).await.unwrap();

        assert_eq!(db.entry_count("s").await.unwrap(), 1);
        let entry = db.match_entry("s", &req).await.unwrap().unwrap();
        assert_eq!(entry.into_response().text(), "new");
    }

    #[tokio::test]
    async fn test_match_missing_store_does_not_create() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let result = db.match_entry("ghost", &get("http://localhost:5000/")).await.unwrap();
        assert!(result.is_none());
        assert!(!db.has_store("ghost").await.unwrap());
    }

    #[tokio::test]
    async fn test_entries_scoped_to_store() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let req = get("http://localhost:5000/");
        db.put_entry(CachedEntry::from_response("a", &req, &page("root"))).await.unwrap();

        assert!(db.match_entry("a", &req).await.unwrap().is_some());
        assert!(db.match_entry("b", &req).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_store_cascades_entries() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let req = get("http://localhost:5000/");
        db.put_entry(CachedEntry::from_response("a", &req, &page("root"))).await.unwrap();

        db.delete_store("a").await.unwrap();
        assert_eq!(db.entry_count("a").await.unwrap(), 0);
        assert!(db.match_entry("a", &req).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_entries_atomic() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let entries = ["/", "/static/a.js", "/static/a.css"]
            .iter()
            .map(|p| CachedEntry::from_response("s", &get(&format!("http://localhost:5000{p}")), &page(p)))
            .collect();

        db.put_entries_atomic(entries).await.unwrap();
        assert_eq!(db.entry_count("s").await.unwrap(), 3);
    }
}
