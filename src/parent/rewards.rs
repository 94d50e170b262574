//! The log of golden eggs the parent has awarded.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    ledger::{EggAmount, EggLedger},
    storage::{KeyValueStore, REWARD_LOG_KEY},
};

/// The reason recorded when the parent leaves the reason blank.
pub const DEFAULT_REWARD_REASON: &str = "Reward";

time::serde::format_description!(reward_date, Date, "[year]-[month]-[day]");

/// One award of golden eggs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardLogEntry {
    pub eggs: EggAmount,
    pub reason: String,
    /// The local date the eggs were awarded on.
    #[serde(with = "reward_date")]
    pub date: Date,
}

/// Every award of golden eggs, newest first, persisted as a JSON array under
/// [REWARD_LOG_KEY].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewardLog {
    entries: Vec<RewardLogEntry>,
}

impl RewardLog {
    /// Load the reward log from `store`.
    ///
    /// A missing log is empty. A malformed log is replaced with an empty one
    /// and the replacement is written back to the store.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn load(store: &impl KeyValueStore) -> Result<Self, Error> {
        let Some(stored) = store.get(REWARD_LOG_KEY)? else {
            return Ok(Self::default());
        };

        match serde_json::from_str(&stored) {
            Ok(entries) => Ok(Self { entries }),
            Err(error) => {
                tracing::warn!("Could not parse stored reward log: {error}. Starting a new log.");
                store.set(REWARD_LOG_KEY, "[]")?;

                Ok(Self::default())
            }
        }
    }

    /// The awards, newest first.
    pub fn entries(&self) -> &[RewardLogEntry] {
        &self.entries
    }

    /// Credit `eggs` to the ledger and record the award at the top of the log.
    ///
    /// A blank `reason` is recorded as [DEFAULT_REWARD_REASON]. The new
    /// balance and the log are written together. Returns the new balance.
    ///
    /// # Errors
    /// Returns an error if the award cannot be saved, in which case neither
    /// the balance nor the log change.
    pub fn award<S: KeyValueStore>(
        &mut self,
        ledger: &mut EggLedger<S>,
        eggs: EggAmount,
        reason: &str,
        date: Date,
    ) -> Result<u64, Error> {
        let reason = match reason.trim() {
            "" => DEFAULT_REWARD_REASON,
            reason => reason,
        };

        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.push(RewardLogEntry {
            eggs,
            reason: reason.to_owned(),
            date,
        });
        entries.extend(self.entries.iter().cloned());

        let json = serde_json::to_string(&entries)?;
        let balance = ledger.credit_with(eggs, &[(REWARD_LOG_KEY, json)])?;
        self.entries = entries;

        tracing::info!("Awarded {eggs} golden eggs for \"{reason}\"");
        Ok(balance)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        ledger::{EggAmount, EggLedger},
        parent::{RewardLog, RewardLogEntry},
        storage::{BALANCE_KEY, KeyValueStore, MemoryStore, REWARD_LOG_KEY},
    };

    fn eggs(amount: u64) -> EggAmount {
        EggAmount::new(amount).unwrap()
    }

    #[test]
    fn missing_log_is_empty_and_not_written() {
        let store = MemoryStore::new();

        let log = RewardLog::load(&store).unwrap();

        assert!(log.entries().is_empty());
        assert_eq!(store.get(REWARD_LOG_KEY), Ok(None));
    }

    #[test]
    fn malformed_log_is_replaced_with_empty_log() {
        let store = MemoryStore::with_entries(&[(REWARD_LOG_KEY, "{not json")]);

        let log = RewardLog::load(&store).unwrap();

        assert!(log.entries().is_empty());
        assert_eq!(store.get(REWARD_LOG_KEY), Ok(Some("[]".to_owned())));
    }

    #[test]
    fn award_credits_ledger_and_prepends_entry() {
        let store = MemoryStore::with_entries(&[(BALANCE_KEY, "10")]);
        let mut ledger = EggLedger::open(store.clone(), 50).unwrap();
        let mut log = RewardLog::load(&store).unwrap();

        log.award(&mut ledger, eggs(2), "Read for 30 minutes", date!(2025 - 03 - 01))
            .unwrap();
        let balance = log
            .award(&mut ledger, eggs(5), "Finished math homework", date!(2025 - 03 - 02))
            .unwrap();

        assert_eq!(balance, 17);
        assert_eq!(store.get(BALANCE_KEY), Ok(Some("17".to_owned())));
        assert_eq!(
            log.entries()[0],
            RewardLogEntry {
                eggs: eggs(5),
                reason: "Finished math homework".to_owned(),
                date: date!(2025 - 03 - 02),
            }
        );
        assert_eq!(log.entries()[1].reason, "Read for 30 minutes");
        assert_eq!(RewardLog::load(&store).unwrap(), log);
    }

    #[test]
    fn blank_reason_is_recorded_as_reward() {
        let store = MemoryStore::new();
        let mut ledger = EggLedger::open(store.clone(), 50).unwrap();
        let mut log = RewardLog::load(&store).unwrap();

        log.award(&mut ledger, eggs(1), "   ", date!(2025 - 03 - 01)).unwrap();

        assert_eq!(log.entries()[0].reason, "Reward");
    }

    #[test]
    fn stored_dates_are_iso_dates() {
        let store = MemoryStore::new();
        let mut ledger = EggLedger::open(store.clone(), 50).unwrap();
        let mut log = RewardLog::load(&store).unwrap();

        log.award(&mut ledger, eggs(1), "Spelling", date!(2025 - 12 - 24))
            .unwrap();

        let stored = store.get(REWARD_LOG_KEY).unwrap().unwrap();
        assert!(stored.contains(r#""date":"2025-12-24""#), "got {stored}");
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
    fn failed_award_changes_nothing() {
        let store = ReadOnlyStore(MemoryStore::with_entries(&[(BALANCE_KEY, "10")]));
        let mut ledger = EggLedger::open(store, 50).unwrap();
        let mut log = RewardLog::default();

        let got = log.award(&mut ledger, eggs(3), "Tidied room", date!(2025 - 01 - 01));

        assert_eq!(got, Err(Error::StorageLock));
        assert_eq!(ledger.read(), 10);
        assert!(log.entries().is_empty());
    }
}
