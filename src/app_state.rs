//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};

use crate::{Error, config::RewardsConfig, db::initialize, shop::Shop, storage::SqliteStore};

/// The shop shared between request handlers.
///
/// Handlers hold the lock for the whole of a purchase or an award so that
/// requests are applied one at a time.
pub type SharedShop = Arc<Mutex<Shop<SqliteStore>>>;

/// Lock the shared shop.
///
/// # Errors
/// Returns [Error::StorageLock] if the lock is poisoned.
pub fn lock_shop(shop: &SharedShop) -> Result<MutexGuard<'_, Shop<SqliteStore>>, Error> {
    shop.lock()
        .inspect_err(|error| tracing::error!("could not acquire shop lock: {error}"))
        .map_err(|_| Error::StorageLock)
}

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The balance, parent password, session length and timezone settings.
    pub config: RewardsConfig,

    /// The key-value store for the doll, reward log and study goals.
    pub store: SqliteStore,

    /// The balance, owned accessories and cart.
    pub shop: SharedShop,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database and load the balance and
    /// owned accessories, writing the initial balance if none is stored.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or read.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        config: RewardsConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let store = SqliteStore::new(Arc::new(Mutex::new(db_connection)));
        let mut shop = Shop::open(store.clone(), &config)?;
        shop.on_purchase(|accessory| {
            tracing::info!(
                "Purchase complete: {} ({}) for {} golden eggs",
                accessory.name,
                accessory.id,
                accessory.price
            );
        });

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            config,
            store,
            shop: Arc::new(Mutex::new(shop)),
        })
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{
        AppState,
        config::RewardsConfig,
        storage::{BALANCE_KEY, KeyValueStore},
    };

    #[test]
    fn new_writes_initial_balance() {
        let config = RewardsConfig {
            initial_balance: 75,
            ..Default::default()
        };

        let state = AppState::new(Connection::open_in_memory().unwrap(), "foobar", config).unwrap();

        assert_eq!(state.shop.lock().unwrap().balance(), 75);
        assert_eq!(state.store.get(BALANCE_KEY), Ok(Some("75".to_owned())));
    }
}
