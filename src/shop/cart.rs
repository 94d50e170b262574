//! The shopping cart. It lives in memory only and is gone after a restart.

use crate::shop::{Accessory, ItemId};

/// Accessories picked for checking out together, in the order they were added.
///
/// The same accessory may be added more than once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<Accessory>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, accessory: &Accessory) {
        self.items.push(accessory.clone());
    }

    /// Remove every entry for the accessory `id`.
    pub fn remove(&mut self, id: &ItemId) {
        self.items.retain(|item| &item.id != id);
    }

    pub fn items(&self) -> &[Accessory] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The sum of the prices of everything in the cart.
    pub fn total(&self) -> u64 {
        self.items
            .iter()
            .fold(0u64, |total, item| total.saturating_add(item.price.get()))
    }

    /// Whether `balance` covers the whole cart.
    ///
    /// Checkout still works item by item when this is false.
    pub fn can_afford(&self, balance: u64) -> bool {
        self.total() <= balance
    }

    pub(crate) fn take_items(&mut self) -> Vec<Accessory> {
        std::mem::take(&mut self.items)
    }

    pub(crate) fn replace_items(&mut self, items: Vec<Accessory>) {
        self.items = items;
    }
}
