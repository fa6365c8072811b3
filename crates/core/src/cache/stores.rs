//! Named store management.
//!
//! A store name embeds its role and the version tag of the build that owns
//! it. Activation keeps exactly the current pair and condemns everything
//! else; there is no other migration or cleanup mechanism.

use std::collections::HashSet;
use std::fmt;

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Logical role of a named store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreRole {
    /// Build assets, pre-populated at install.
    Static,
    /// Navigable page responses, refreshed on every successful navigation.
    Dynamic,
}

impl StoreRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreRole::Static => "static",
            StoreRole::Dynamic => "dynamic",
        }
    }
}

impl fmt::Display for StoreRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build a store identifier: `{prefix}-{role}-{version}`.
pub fn store_name(prefix: &str, role: StoreRole, version: &str) -> String {
    format!("{prefix}-{role}-{version}")
}

/// The store pair recorded by the last successful activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub static_store: String,
    pub dynamic_store: String,
    pub activated_at: String,
}

impl CacheDb {
    /// Open a store, creating it empty if it does not exist.
    ///
    /// Returns true if the store was created by this call.
    pub async fn open_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let created = conn.execute(
                    "INSERT OR IGNORE INTO stores (name, created_at) VALUES (?1, ?2)",
                    params![name, now],
                )?;
                Ok(created == 1)
            })
            .await
            .map_err(Error::from)
    }

    /// Check whether a store exists.
    pub async fn has_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM stores WHERE name = ?1)",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// List all store names in creation order.
    pub async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM stores ORDER BY created_at ASC, name ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, rusqlite::Error>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a store and all of its entries.
    ///
    /// Returns true if the store existed.
    pub async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM stores WHERE name = ?1", params![name])?;
                Ok(deleted == 1)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every store whose name is not in `keep`.
    ///
    /// Idempotent: a second call with the same set deletes nothing.
    /// Returns the names of the deleted stores.
    pub async fn delete_stores_not_in(&self, keep: &[String]) -> Result<Vec<String>, Error> {
        let keep: HashSet<String> = keep.iter().cloned().collect();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let tx = conn.transaction()?;
                let condemned = {
                    let mut stmt = tx.prepare("SELECT name FROM stores")?;
                    stmt.query_map([], |row| row.get::<_, String>(0))?
                        .collect::<Result<Vec<String>, rusqlite::Error>>()?
                        .into_iter()
                        .filter(|name| !keep.contains(name))
                        .collect::<Vec<String>>()
                };
                for name in &condemned {
                    tx.execute("DELETE FROM stores WHERE name = ?1", params![name])?;
                }
                tx.commit()?;
                Ok(condemned)
            })
            .await
            .map_err(Error::from)
    }

    /// Record the store pair of the version that just took control.
    pub async fn record_activation(&self, static_store: &str, dynamic_store: &str) -> Result<(), Error> {
        let static_store = static_store.to_string();
        let dynamic_store = dynamic_store.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO registration (id, static_store, dynamic_store, activated_at)
                     VALUES (1, ?1, ?2, ?3)
                     ON CONFLICT(id) DO UPDATE SET
                        static_store = excluded.static_store,
                        dynamic_store = excluded.dynamic_store,
                        activated_at = excluded.activated_at",
                    params![static_store, dynamic_store, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get the store pair recorded by the last activation, if any.
    pub async fn active_registration(&self) -> Result<Option<Registration>, Error> {
        self.conn
            .call(|conn| -> Result<Option<Registration>, Error> {
                let result = conn.query_row(
                    "SELECT static_store, dynamic_store, activated_at FROM registration WHERE id = 1",
                    [],
                    |row| {
                        Ok(Registration { static_store: row.get(0)?, dynamic_store: row.get(1)?, activated_at: row.get(2)? })
                    },
                );

                match result {
                    Ok(r) => Ok(Some(r)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_name_format() {
        assert_eq!(store_name("htstatus", StoreRole::Static, "v1"), "htstatus-static-v1");
        assert_eq!(store_name("htstatus", StoreRole::Dynamic, "v2"), "htstatus-dynamic-v2");
    }

    #[tokio::test]
    async fn test_open_creates_once() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(!db.has_store("app-static-v1").await.unwrap());
        assert!(db.open_store("app-static-v1").await.unwrap());
        assert!(!db.open_store("app-static-v1").await.unwrap());
        assert!(db.has_store("app-static-v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_stores_not_in() {
        let db = CacheDb::open_in_memory().await.unwrap();
        for name in ["app-v1", "app-static-v1", "app-dynamic-v1", "app-static-v2", "app-dynamic-v2"] {
            db.open_store(name).await.unwrap();
        }

        let keep = vec!["app-static-v2".to_string(), "app-dynamic-v2".to_string()];
        let mut deleted = db.delete_stores_not_in(&keep).await.unwrap();
        deleted.sort();
        assert_eq!(deleted, vec!["app-dynamic-v1", "app-static-v1", "app-v1"]);

        let mut remaining = db.store_names().await.unwrap();
        remaining.sort();
        assert_eq!(remaining, vec!["app-dynamic-v2", "app-static-v2"]);

        let again = db.delete_stores_not_in(&keep).await.unwrap();
        assert!(again.is_empty());
    }

    #[tokio::test]
    async fn test_delete_store() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_store("app-dynamic-v1").await.unwrap();
        assert!(db.delete_store("app-dynamic-v1").await.unwrap());
        assert!(!db.delete_store("app-dynamic-v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_registration_roundtrip() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.active_registration().await.unwrap().is_none());

        db.record_activation("app-static-v1", "app-dynamic-v1").await.unwrap();
        db.record_activation("app-static-v2", "app-dynamic-v2").await.unwrap();

        let reg = db.active_registration().await.unwrap().unwrap();
        assert_eq!(reg.static_store, "app-static-v2");
        assert_eq!(reg.dynamic_store, "app-dynamic-v2");
    }
}
