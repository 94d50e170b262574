//! The purchase workflow: deciding whether the child can afford an accessory
//! and, if so, paying for it and adding it to their collection.

use crate::{
    Error,
    config::RewardsConfig,
    ledger::{EggAmount, EggLedger},
    shop::{Accessory, Cart, ItemId, OwnedItems},
    storage::{BALANCE_KEY, KeyValueStore, OWNED_ITEMS_KEY},
};

/// A function called with every accessory that is bought.
pub type PurchaseListener = Box<dyn Fn(&Accessory) + Send + Sync>;

/// The record of a fulfilled purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub item_id: ItemId,
    pub price: EggAmount,
    /// The balance after paying.
    pub balance: u64,
}

/// Why a purchase was rejected: the balance does not cover the price.
#[derive(Debug, Clone, PartialEq)]
pub struct InsufficientEggs {
    pub item_id: ItemId,
    pub price: EggAmount,
    pub balance: u64,
}

impl InsufficientEggs {
    /// How many more eggs are needed.
    pub fn shortfall(&self) -> u64 {
        self.price.get().saturating_sub(self.balance)
    }
}

/// The result of asking to buy one accessory.
#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseOutcome {
    Fulfilled(Receipt),
    Rejected(InsufficientEggs),
}

/// The result of checking out the cart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckoutSummary {
    /// The purchases that went through, in cart order.
    pub fulfilled: Vec<Receipt>,
    /// The cart entries that could not be afforded when their turn came.
    pub skipped: Vec<InsufficientEggs>,
}

/// The child's wallet, collection and cart.
///
/// The shop does not refuse to sell an accessory that is already owned: it
/// will take the eggs again. Callers gate on [Shop::owned] before buying.
pub struct Shop<S> {
    ledger: EggLedger<S>,
    owned: OwnedItems,
    cart: Cart,
    listeners: Vec<PurchaseListener>,
}

impl<S> std::fmt::Debug for Shop<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shop")
            .field("owned", &self.owned)
            .field("cart", &self.cart)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> Shop<S> {
    /// Load the balance and the owned accessories from `store`.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or the defaults cannot be written.
    pub fn open(store: S, config: &RewardsConfig) -> Result<Self, Error> {
        let owned = OwnedItems::load(&store)?;
        let ledger = EggLedger::open(store, config.initial_balance)?;

        Ok(Self {
            ledger,
            owned,
            cart: Cart::new(),
            listeners: Vec::new(),
        })
    }

    pub fn balance(&self) -> u64 {
        self.ledger.read()
    }

    pub fn ledger(&self) -> &EggLedger<S> {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut EggLedger<S> {
        &mut self.ledger
    }

    pub fn owned(&self) -> &OwnedItems {
        &self.owned
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    /// Call `listener` with each accessory after its purchase has been saved.
    pub fn on_purchase(&mut self, listener: impl Fn(&Accessory) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Buy `item` if the balance covers its price.
    ///
    /// On success the price is debited, the item is added to the owned set,
    /// removed from the cart and the purchase listeners are notified.
    /// Otherwise nothing changes and the shortfall is reported.
    ///
    /// # Errors
    /// Returns an error if the purchase could not be saved, in which case
    /// nothing changes.
    pub fn purchase(&mut self, item: &Accessory) -> Result<PurchaseOutcome, Error> {
        if !self.ledger.has_sufficient(item.price.get()) {
            let rejection = InsufficientEggs {
                item_id: item.id.clone(),
                price: item.price,
                balance: self.ledger.read(),
            };
            tracing::info!(
                "Rejected purchase of {} ({}): {} more eggs needed",
                item.name,
                item.id,
                rejection.shortfall()
            );

            return Ok(PurchaseOutcome::Rejected(rejection));
        }

        self.fulfill(item).map(PurchaseOutcome::Fulfilled)
    }

    /// Buy every accessory in the cart, one at a time in cart order.
    ///
    /// Each item is checked against the balance left after the items before
    /// it, so the checkout can partly succeed. The cart is emptied afterwards.
    ///
    /// # Errors
    /// Returns an error if a purchase could not be saved. The purchases before
    /// it stay fulfilled and the unprocessed items are put back in the cart.
    pub fn checkout(&mut self) -> Result<CheckoutSummary, Error> {
        let items = self.cart.take_items();
        let mut summary = CheckoutSummary::default();

        for (index, item) in items.iter().enumerate() {
            match self.purchase(item) {
                Ok(PurchaseOutcome::Fulfilled(receipt)) => summary.fulfilled.push(receipt),
                Ok(PurchaseOutcome::Rejected(rejection)) => summary.skipped.push(rejection),
                Err(error) => {
                    tracing::error!("Checkout stopped at {}: {error}", item.id);
                    self.cart.replace_items(items[index..].to_vec());
                    return Err(error);
                }
            }
        }

        tracing::info!(
            "Checked out {} items, skipped {}",
            summary.fulfilled.len(),
            summary.skipped.len()
        );

        Ok(summary)
    }

    fn fulfill(&mut self, item: &Accessory) -> Result<Receipt, Error> {
        let balance = self.ledger.balance_after_debit(item.price);
        let owned = self.owned.with(&item.id);

        // The debit and the ownership record are written together.
        self.ledger.store().set_all(&[
            (BALANCE_KEY, balance.to_string()),
            (OWNED_ITEMS_KEY, owned.to_json()?),
        ])?;

        self.ledger.set_committed_balance(balance);
        self.owned = owned;
        self.cart.remove(&item.id);

        tracing::info!(
            "Bought {} ({}) for {} eggs, balance is now {balance}",
            item.name,
            item.id,
            item.price
        );

        for listener in &self.listeners {
            listener(item);
        }

        Ok(Receipt {
            item_id: item.id.clone(),
            price: item.price,
            balance,
        })
    }
}
