//! The accessories the child has bought.

use std::collections::BTreeSet;

use crate::{
    Error,
    shop::ItemId,
    storage::{KeyValueStore, OWNED_ITEMS_KEY},
};

/// The set of accessory IDs that have been bought, persisted as a JSON array
/// under [OWNED_ITEMS_KEY].
///
/// IDs are only ever added, and only by a fulfilled purchase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnedItems {
    ids: BTreeSet<ItemId>,
}

impl OwnedItems {
    /// Load the owned IDs from `store`.
    ///
    /// A missing entry is an empty set. A malformed entry is replaced with an
    /// empty set, which is written back to the store.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn load(store: &impl KeyValueStore) -> Result<Self, Error> {
        let Some(stored) = store.get(OWNED_ITEMS_KEY)? else {
            return Ok(Self::default());
        };

        match serde_json::from_str::<BTreeSet<ItemId>>(&stored) {
            Ok(ids) => Ok(Self { ids }),
            Err(error) => {
                tracing::warn!(
                    "Could not parse stored owned items {stored:?}: {error}. Resetting to empty."
                );
                let owned = Self::default();
                store.set(OWNED_ITEMS_KEY, &owned.to_json()?)?;
                Ok(owned)
            }
        }
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The set with `id` added, leaving `self` untouched until the caller
    /// has persisted the result.
    pub(crate) fn with(&self, id: &ItemId) -> Self {
        let mut ids = self.ids.clone();
        ids.insert(id.clone());

        Self { ids }
    }

    pub(crate) fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(&self.ids).map_err(Error::from)
    }
}
