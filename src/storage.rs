//! The key-value storage port that the ledger and the shop persist through.
//!
//! Values are plain strings, the way a browser's local storage keeps them.
//! [SqliteStore] keeps them in a single SQLite table and [MemoryStore] keeps
//! them in a hash map for tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use rusqlite::{Connection, OptionalExtension, params};

use crate::Error;

/// Storage key for the golden egg balance, stored as a decimal string.
pub const BALANCE_KEY: &str = "eggBalance";
/// Storage key for the owned accessory IDs, stored as a JSON array.
pub const OWNED_ITEMS_KEY: &str = "ownedItems";
/// Storage key for the selected doll, stored as a JSON object.
pub const SELECTED_DOLL_KEY: &str = "selectedDoll";
/// Storage key for the log of awarded eggs, stored as a JSON array.
pub const REWARD_LOG_KEY: &str = "rewardLog";
/// Storage key for the study goals, stored as a JSON array.
pub const STUDY_GOALS_KEY: &str = "studyGoals";

/// A string key-value store.
///
/// Writes are synchronous: once `set` or `set_all` returns `Ok`, a later
/// `get` observes the new value.
pub trait KeyValueStore {
    /// Get the value stored under `key`, or `None` if there is no such key.
    ///
    /// # Errors
    /// Returns an error if the underlying storage could not be read.
    fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if the underlying storage could not be written.
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Store all `entries` as a single unit: either every entry is written or none are.
    ///
    /// # Errors
    /// Returns an error if the underlying storage could not be written.
    fn set_all(&self, entries: &[(&str, String)]) -> Result<(), Error>;
}

/// Create the table that backs [SqliteStore].
pub fn create_local_storage_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS local_storage (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// A [KeyValueStore] backed by the `local_storage` table of a SQLite database.
///
/// Clones share the same connection.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Wrap a connection whose database has been initialized with
    /// [initialize](crate::db::initialize).
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let connection = self
            .connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::StorageLock)?;

        f(&connection)
    }
}

const UPSERT_SQL: &str = "INSERT INTO local_storage (key, value) VALUES (?1, ?2)
    ON CONFLICT(key) DO UPDATE SET value = excluded.value";

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        self.with_connection(|connection| {
            connection
                .query_row(
                    "SELECT value FROM local_storage WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()
                .map_err(Error::from)
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.with_connection(|connection| {
            connection.execute(UPSERT_SQL, params![key, value])?;
            Ok(())
        })
    }

    fn set_all(&self, entries: &[(&str, String)]) -> Result<(), Error> {
        self.with_connection(|connection| {
            let transaction = connection.unchecked_transaction()?;

            for (key, value) in entries {
                transaction.execute(UPSERT_SQL, params![key, value])?;
            }

            transaction.commit()?;
            Ok(())
        })
    }
}

/// An in-memory [KeyValueStore].
///
/// Clones share the same entries, so a test can keep a clone to inspect
/// what the ledger wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `entries`.
    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        let entries = entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, Error> {
        self.entries.lock().map_err(|_| Error::StorageLock)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.lock()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn set_all(&self, entries: &[(&str, String)]) -> Result<(), Error> {
        let mut map = self.lock()?;

        for (key, value) in entries {
            map.insert(key.to_string(), value.clone());
        }

        Ok(())
    }
}

#[cfg(test)]
mod sqlite_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;

    use crate::storage::{KeyValueStore, SqliteStore, create_local_storage_table};

    fn get_test_store() -> SqliteStore {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");
        create_local_storage_table(&connection).expect("Could not create local storage table");

        SqliteStore::new(Arc::new(Mutex::new(connection)))
    }

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        assert_eq!(Ok(()), create_local_storage_table(&connection));
    }

    #[test]
    fn get_missing_key_returns_none() {
        let store = get_test_store();

        assert_eq!(store.get("eggBalance"), Ok(None));
    }

    #[test]
    fn set_then_get_returns_value() {
        let store = get_test_store();

        store.set("eggBalance", "42").unwrap();

        assert_eq!(store.get("eggBalance"), Ok(Some("42".to_owned())));
    }

    #[test]
    fn set_overwrites_previous_value() {
        let store = get_test_store();

        store.set("eggBalance", "42").unwrap();
        store.set("eggBalance", "7").unwrap();

        assert_eq!(store.get("eggBalance"), Ok(Some("7".to_owned())));
    }

    #[test]
    fn set_all_writes_every_entry() {
        let store = get_test_store();

        store
            .set_all(&[
                ("eggBalance", "5".to_owned()),
                ("ownedItems", "[\"1\"]".to_owned()),
            ])
            .unwrap();

        assert_eq!(store.get("eggBalance"), Ok(Some("5".to_owned())));
        assert_eq!(store.get("ownedItems"), Ok(Some("[\"1\"]".to_owned())));
    }

    #[test]
    fn clones_share_the_connection() {
        let store = get_test_store();
        let clone = store.clone();

        store.set("selectedDoll", "{}").unwrap();

        assert_eq!(clone.get("selectedDoll"), Ok(Some("{}".to_owned())));
    }
}
