//! The golden egg ledger: the balance the parent credits and the child spends.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    storage::{BALANCE_KEY, KeyValueStore},
};

/// A positive number of golden eggs, used for prices, rewards and debits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct EggAmount(u64);

impl EggAmount {
    /// Create an amount of eggs.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::ZeroEggAmount] if `amount` is zero.
    pub fn new(amount: u64) -> Result<Self, Error> {
        if amount == 0 {
            Err(Error::ZeroEggAmount)
        } else {
            Ok(Self(amount))
        }
    }

    /// Create an amount of eggs without validation.
    ///
    /// The caller should ensure that `amount` is not zero.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-zero invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub const fn new_unchecked(amount: u64) -> Self {
        Self(amount)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for EggAmount {
    type Error = Error;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EggAmount> for u64 {
    fn from(value: EggAmount) -> Self {
        value.0
    }
}

impl Display for EggAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The golden egg balance, persisted through a [KeyValueStore] under [BALANCE_KEY].
///
/// The balance never goes below zero: [EggLedger::debit] clamps at zero
/// instead of failing, so callers that enforce a spending limit must check
/// [EggLedger::has_sufficient] first.
#[derive(Debug)]
pub struct EggLedger<S> {
    balance: u64,
    store: S,
}

impl<S: KeyValueStore> EggLedger<S> {
    /// Load the balance from `store`.
    ///
    /// If no balance is stored, or the stored value is not a non-negative
    /// integer, the balance is reset to `initial_balance` and that value is
    /// written back to the store straight away.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or the default cannot be written.
    pub fn open(store: S, initial_balance: u64) -> Result<Self, Error> {
        let stored = store.get(BALANCE_KEY)?;

        let balance = match stored.as_deref().map(|value| value.trim().parse::<u64>()) {
            Some(Ok(balance)) => balance,
            Some(Err(error)) => {
                tracing::warn!(
                    "Could not parse stored egg balance {stored:?}: {error}. \
                    Resetting to {initial_balance}."
                );
                store.set(BALANCE_KEY, &initial_balance.to_string())?;
                initial_balance
            }
            None => {
                store.set(BALANCE_KEY, &initial_balance.to_string())?;
                initial_balance
            }
        };

        Ok(Self { balance, store })
    }

    /// The current balance.
    pub fn read(&self) -> u64 {
        self.balance
    }

    /// Whether the balance covers `amount`.
    pub fn has_sufficient(&self, amount: u64) -> bool {
        self.balance >= amount
    }

    /// Add `amount` to the balance and persist it. Returns the new balance.
    ///
    /// # Errors
    /// Returns an error if the new balance cannot be written, in which case
    /// the balance is unchanged.
    pub fn credit(&mut self, amount: EggAmount) -> Result<u64, Error> {
        let balance = self.balance_after_credit(amount);
        self.persist(balance)?;

        tracing::debug!("Credited {amount} eggs, balance is now {balance}");
        Ok(balance)
    }

    /// Subtract `amount` from the balance, stopping at zero, and persist it.
    /// Returns the new balance.
    ///
    /// # Errors
    /// Returns an error if the new balance cannot be written, in which case
    /// the balance is unchanged.
    pub fn debit(&mut self, amount: EggAmount) -> Result<u64, Error> {
        let balance = self.balance_after_debit(amount);
        self.persist(balance)?;

        tracing::debug!("Debited {amount} eggs, balance is now {balance}");
        Ok(balance)
    }

    /// Add `amount` to the balance and write it together with `extra` entries
    /// in a single [KeyValueStore::set_all]. Returns the new balance.
    ///
    /// # Errors
    /// Returns an error if the entries cannot be written, in which case
    /// neither the balance nor the extra entries change.
    pub fn credit_with(
        &mut self,
        amount: EggAmount,
        extra: &[(&str, String)],
    ) -> Result<u64, Error> {
        let balance = self.balance_after_credit(amount);
        let mut entries = Vec::with_capacity(extra.len() + 1);
        entries.push((BALANCE_KEY, balance.to_string()));
        entries.extend(extra.iter().cloned());

        self.store.set_all(&entries)?;
        self.balance = balance;

        tracing::debug!("Credited {amount} eggs, balance is now {balance}");
        Ok(balance)
    }

    pub(crate) fn balance_after_credit(&self, amount: EggAmount) -> u64 {
        self.balance.saturating_add(amount.get())
    }

    pub(crate) fn balance_after_debit(&self, amount: EggAmount) -> u64 {
        self.balance.saturating_sub(amount.get())
    }

    /// Adopt a balance that the caller has already written to the store.
    pub(crate) fn set_committed_balance(&mut self, balance: u64) {
        self.balance = balance;
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    fn persist(&mut self, balance: u64) -> Result<(), Error> {
        self.store.set(BALANCE_KEY, &balance.to_string())?;
        self.balance = balance;

        Ok(())
    }
}


#[cfg(test)]
mod ledger_tests {
    use crate::{
        Error,
        ledger::{EggAmount, EggLedger},
        storage::{BALANCE_KEY, KeyValueStore, MemoryStore},
    };

    fn eggs(amount: u64) -> EggAmount {
        EggAmount::new(amount).unwrap()
    }

    fn open_with_balance(balance: u64) -> (EggLedger<MemoryStore>, MemoryStore) {
        let store = MemoryStore::with_entries(&[(BALANCE_KEY, &balance.to_string())]);
        let ledger = EggLedger::open(store.clone(), 50).unwrap();

        (ledger, store)
    }

    #[test]
    fn open_empty_store_uses_and_persists_default() {
        let store = MemoryStore::new();

        let ledger = EggLedger::open(store.clone(), 50).unwrap();

        assert_eq!(ledger.read(), 50);
        assert_eq!(store.get(BALANCE_KEY), Ok(Some("50".to_owned())));
    }

    #[test]
    fn open_reads_stored_balance() {
        let (ledger, _) = open_with_balance(12);

        assert_eq!(ledger.read(), 12);
    }

    #[test]
    fn open_corrupt_balance_resets_to_default_and_overwrites_it() {
        let store = MemoryStore::with_entries(&[(BALANCE_KEY, "lots of eggs")]);

        let ledger = EggLedger::open(store.clone(), 50).unwrap();

        assert_eq!(ledger.read(), 50);
        assert_eq!(store.get(BALANCE_KEY), Ok(Some("50".to_owned())));
    }

    #[test]
    fn open_negative_balance_resets_to_default() {
        let store = MemoryStore::with_entries(&[(BALANCE_KEY, "-5")]);

        let ledger = EggLedger::open(store.clone(), 20).unwrap();

        assert_eq!(ledger.read(), 20);
        assert_eq!(store.get(BALANCE_KEY), Ok(Some("20".to_owned())));
    }

    #[test]
    fn credit_adds_and_persists() {
        let (mut ledger, store) = open_with_balance(10);

        let got = ledger.credit(eggs(5));

        assert_eq!(got, Ok(15));
        assert_eq!(ledger.read(), 15);
        assert_eq!(store.get(BALANCE_KEY), Ok(Some("15".to_owned())));
    }

    #[test]
    fn credit_saturates_instead_of_overflowing() {
        let (mut ledger, _) = open_with_balance(u64::MAX - 1);

        assert_eq!(ledger.credit(eggs(10)), Ok(u64::MAX));
    }

    #[test]
    fn credit_with_writes_balance_and_extra_entries() {
        let (mut ledger, store) = open_with_balance(10);

        let got = ledger.credit_with(eggs(3), &[("rewardLog", "[]".to_owned())]);

        assert_eq!(got, Ok(13));
        assert_eq!(store.get(BALANCE_KEY), Ok(Some("13".to_owned())));
        assert_eq!(store.get("rewardLog"), Ok(Some("[]".to_owned())));
    }

    #[test]
    fn debit_subtracts_and_persists() {
        let (mut ledger, store) = open_with_balance(10);

        let got = ledger.debit(eggs(4));

        assert_eq!(got, Ok(6));
        assert_eq!(store.get(BALANCE_KEY), Ok(Some("6".to_owned())));
    }

    #[test]
    fn debit_clamps_at_zero() {
        let (mut ledger, store) = open_with_balance(10);

        let got = ledger.debit(eggs(15));

        assert_eq!(got, Ok(0));
        assert_eq!(store.get(BALANCE_KEY), Ok(Some("0".to_owned())));
    }

    #[test]
    fn debit_then_credit_round_trips_above_the_floor() {
        let (mut ledger, _) = open_with_balance(10);

        ledger.debit(eggs(7)).unwrap();
        ledger.credit(eggs(7)).unwrap();

        assert_eq!(ledger.read(), 10);
    }

    #[test]
    fn debit_then_credit_overshoots_when_floor_is_hit() {
        let (mut ledger, _) = open_with_balance(10);

        ledger.debit(eggs(15)).unwrap();
        ledger.credit(eggs(15)).unwrap();

        assert_eq!(ledger.read(), 15);
    }

    #[test]
    fn has_sufficient_is_balance_at_least_amount() {
        let (ledger, _) = open_with_balance(10);

        for amount in 0..=20 {
            assert_eq!(
                ledger.has_sufficient(amount),
                10 >= amount,
                "has_sufficient({amount}) with balance 10"
            );
        }
    }

    #[test]
    fn balance_never_goes_negative_over_mixed_operations() {
        let (mut ledger, store) = open_with_balance(3);
        let operations: [(bool, u64); 8] = [
            (false, 5),
            (true, 2),
            (false, 1),
            (false, 9),
            (true, 20),
            (false, 7),
            (false, 30),
            (true, 1),
        ];
        let mut want: u64 = 3;

        for (is_credit, amount) in operations {
            if is_credit {
                ledger.credit(eggs(amount)).unwrap();
                want += amount;
            } else {
                ledger.debit(eggs(amount)).unwrap();
                want = want.saturating_sub(amount);
            }

            assert_eq!(ledger.read(), want);
            assert_eq!(store.get(BALANCE_KEY), Ok(Some(want.to_string())));
        }
    }

    /// A store whose writes always fail.
    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>, Error> {
            self.0.get(key)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), Error> {
            Err(Error::StorageLock)
        }

        fn set_all(&self, _entries: &[(&str, String)]) -> Result<(), Error> {
            Err(Error::StorageLock)
        }
    }

    #[test]
    fn failed_write_leaves_balance_unchanged() {
        let store = ReadOnlyStore(MemoryStore::with_entries(&[(BALANCE_KEY, "10")]));
        let mut ledger = EggLedger::open(store, 50).unwrap();

        assert_eq!(ledger.credit(eggs(5)), Err(Error::StorageLock));
        assert_eq!(ledger.debit(eggs(5)), Err(Error::StorageLock));
        assert_eq!(
            ledger.credit_with(eggs(5), &[("rewardLog", "[]".to_owned())]),
            Err(Error::StorageLock)
        );
        assert_eq!(ledger.read(), 10);
    }
}
