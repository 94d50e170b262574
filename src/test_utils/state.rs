use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    app_state::SharedShop,
    config::RewardsConfig,
    db::initialize,
    shop::Shop,
    storage::{BALANCE_KEY, KeyValueStore, SqliteStore},
};

/// A store over a fresh in-memory database.
pub(crate) fn in_memory_store() -> SqliteStore {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    SqliteStore::new(Arc::new(Mutex::new(connection)))
}

/// A shop over a fresh in-memory database holding `balance` golden eggs,
/// along with the store it writes to.
pub(crate) fn shared_shop_with_balance(balance: u64) -> (SharedShop, SqliteStore) {
    let store = in_memory_store();
    store
        .set(BALANCE_KEY, &balance.to_string())
        .expect("Could not set balance");
    let shop = Shop::open(store.clone(), &RewardsConfig::default()).expect("Could not open shop");

    (Arc::new(Mutex::new(shop)), store)
}
