//! Generic durable key/value store
//!
//! Keys are structured (entity kind + identifying fields) and round-trip
//! through the `entities` table's (kind, id) columns, so `list_keys`
//! filtered by kind reconstructs exactly the set of live records.
//! Single-key reads and writes are atomic at the store level; no
//! multi-key transactions are offered.

use super::DbPool;
use crate::{Error, Result};

/// Structured key identifying one durable record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
    /// Entity kind, e.g. `"paired_device"`
    pub kind: String,

    /// Identifying fields, canonically serialized
    pub id: String,
}

impl EntityKey {
    /// Create a key from kind and identifier
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

impl std::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// Durable key/value store over the entity table
#[derive(Clone)]
pub struct KvStore {
    pool: DbPool,
}

impl KvStore {
    /// Create a new store over the given pool
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Load the value for a key, or `None` if absent
    ///
    /// # Errors
    ///
    /// Returns error if the database operation fails
    pub fn get(&self, key: &EntityKey) -> Result<Option<String>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let result = conn.query_row(
            "SELECT value FROM entities WHERE kind = ?1 AND id = ?2",
            [&key.kind, &key.id],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::Database(e.to_string())),
        }
    }

    /// Store a value under a key, overwriting any previous value
    ///
    /// # Errors
    ///
    /// Returns error if the database operation fails
    pub fn put(&self, key: &EntityKey, value: &str) -> Result<()> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        conn.execute(
            "INSERT INTO entities (kind, id, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(kind, id) DO UPDATE SET value = excluded.value",
            [key.kind.as_str(), key.id.as_str(), value],
        )
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    /// Delete the record under a key, returning whether it existed
    ///
    /// # Errors
    ///
    /// Returns error if the database operation fails
    pub fn delete(&self, key: &EntityKey) -> Result<bool> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let rows = conn
            .execute(
                "DELETE FROM entities WHERE kind = ?1 AND id = ?2",
                [&key.kind, &key.id],
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(rows > 0)
    }

    /// List every stored key
    ///
    /// O(n) in total stored records; acceptable at home scale.
    ///
    /// # Errors
    ///
    /// Returns error if the database operation fails
    pub fn list_keys(&self) -> Result<Vec<EntityKey>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare("SELECT kind, id FROM entities ORDER BY kind, id")
            .map_err(|e| Error::Database(e.to_string()))?;

        let keys = stmt
            .query_map([], |row| {
                Ok(EntityKey {
                    kind: row.get(0)?,
                    id: row.get(1)?,
                })
            })
            .map_err(|e| Error::Database(e.to_string()))?
            .filter_map(std::result::Result::ok)
            .collect();

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory;

    fn store() -> KvStore {
        KvStore::new(init_memory().unwrap())
    }

    #[test]
    fn get_put_delete_round_trip() {
        let store = store();
        let key = EntityKey::new("paired_device", "sony-tv.livingroom");

        assert!(store.get(&key).unwrap().is_none());

        store.put(&key, r#"{"driver_id":"sony-tv"}"#).unwrap();
        assert_eq!(
            store.get(&key).unwrap().as_deref(),
            Some(r#"{"driver_id":"sony-tv"}"#)
        );

        assert!(store.delete(&key).unwrap());
        assert!(store.get(&key).unwrap().is_none());
        assert!(!store.delete(&key).unwrap());
    }

    #[test]
    fn put_overwrites() {
        let store = store();
        let key = EntityKey::new("paired_device", "a.b");

        store.put(&key, "first").unwrap();
        store.put(&key, "second").unwrap();
        assert_eq!(store.get(&key).unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn list_keys_round_trips() {
        let store = store();
        let keys = [
            EntityKey::new("paired_device", "a.b"),
            EntityKey::new("paired_device", "c.d"),
            EntityKey::new("other_kind", "x"),
        ];
        for key in &keys {
            store.put(key, "{}").unwrap();
        }

        let listed = store.list_keys().unwrap();
        assert_eq!(listed.len(), 3);
        for key in &keys {
            assert!(listed.contains(key));
        }

        let paired: Vec<_> = listed
            .into_iter()
            .filter(|k| k.kind == "paired_device")
            .collect();
        assert_eq!(paired.len(), 2);
    }

    #[test]
    fn same_id_different_kind_do_not_collide() {
        let store = store();
        let a = EntityKey::new("kind_a", "shared");
        let b = EntityKey::new("kind_b", "shared");

        store.put(&a, "a").unwrap();
        store.put(&b, "b").unwrap();
        assert_eq!(store.get(&a).unwrap().as_deref(), Some("a"));
        assert_eq!(store.get(&b).unwrap().as_deref(), Some("b"));
    }
}
