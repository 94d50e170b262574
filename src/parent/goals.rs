//! Study goals the parent sets, each worth golden eggs when completed.

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    ledger::{EggAmount, EggLedger},
    storage::{KeyValueStore, STUDY_GOALS_KEY},
};

/// A study activity that earns `reward` golden eggs once completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyGoal {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub reward: EggAmount,
    pub completed: bool,
}

fn default_goals() -> Vec<StudyGoal> {
    vec![
        StudyGoal {
            id: 1,
            title: "Complete Math Workbook".to_owned(),
            description: "Finish pages 10-15 in the math workbook".to_owned(),
            reward: EggAmount::new_unchecked(10),
            completed: false,
        },
        StudyGoal {
            id: 2,
            title: "Read a Chapter Book".to_owned(),
            description: "Read one chapter book this week".to_owned(),
            reward: EggAmount::new_unchecked(15),
            completed: false,
        },
        StudyGoal {
            id: 3,
            title: "Practice Spelling Words".to_owned(),
            description: "Learn all 10 spelling words for the week".to_owned(),
            reward: EggAmount::new_unchecked(8),
            completed: true,
        },
    ]
}

/// The study goals, in the order they were added, persisted as a JSON array
/// under [STUDY_GOALS_KEY].
#[derive(Debug, Clone, PartialEq)]
pub struct StudyGoals {
    goals: Vec<StudyGoal>,
}

impl StudyGoals {
    /// Load the study goals from `store`.
    ///
    /// Missing or malformed goals are replaced with the three starter goals,
    /// which are written back to the store.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn load(store: &impl KeyValueStore) -> Result<Self, Error> {
        let stored = store.get(STUDY_GOALS_KEY)?;

        match stored.as_deref().map(serde_json::from_str::<Vec<StudyGoal>>) {
            Some(Ok(goals)) => return Ok(Self { goals }),
            Some(Err(error)) => {
                tracing::warn!(
                    "Could not parse stored study goals: {error}. Using the starter goals."
                );
            }
            None => {}
        }

        let goals = Self {
            goals: default_goals(),
        };
        store.set(STUDY_GOALS_KEY, &goals.to_json()?)?;

        Ok(goals)
    }

    pub fn goals(&self) -> &[StudyGoal] {
        &self.goals
    }

    /// Add a goal that is not yet completed and persist it. Returns the new goal.
    ///
    /// # Errors
    /// Returns [Error::EmptyGoalTitle] if `title` is blank,
    /// [Error::TooManyGoals] if there is no ID left for the goal, or an error
    /// if the goals cannot be written. The goals are unchanged on error.
    pub fn add(
        &mut self,
        store: &impl KeyValueStore,
        title: &str,
        description: &str,
        reward: EggAmount,
    ) -> Result<&StudyGoal, Error> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::EmptyGoalTitle);
        }

        let id = self
            .goals
            .iter()
            .map(|goal| goal.id)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or(Error::TooManyGoals)?;
        let mut goals = self.goals.clone();
        goals.push(StudyGoal {
            id,
            title: title.to_owned(),
            description: description.trim().to_owned(),
            reward,
            completed: false,
        });

        let updated = Self { goals };
        store.set(STUDY_GOALS_KEY, &updated.to_json()?)?;
        *self = updated;

        tracing::debug!("Added study goal {id} \"{title}\" worth {reward} eggs");
        Ok(&self.goals[self.goals.len() - 1])
    }

    /// Mark the goal `id` as completed and credit its reward to the ledger.
    ///
    /// The new balance and the goals are written together. Returns the new balance.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no goal `id`,
    /// [Error::GoalAlreadyCompleted] if its reward has already been given, or
    /// an error if the change cannot be saved, in which case nothing changes.
    pub fn complete<S: KeyValueStore>(
        &mut self,
        ledger: &mut EggLedger<S>,
        id: u32,
    ) -> Result<u64, Error> {
        let position = self
            .goals
            .iter()
            .position(|goal| goal.id == id)
            .ok_or(Error::NotFound)?;

        if self.goals[position].completed {
            return Err(Error::GoalAlreadyCompleted);
        }

        let mut updated = self.clone();
        updated.goals[position].completed = true;
        let reward = updated.goals[position].reward;

        let balance = ledger.credit_with(reward, &[(STUDY_GOALS_KEY, updated.to_json()?)])?;
        *self = updated;

        tracing::info!("Completed study goal {id}, awarding {reward} golden eggs");
        Ok(balance)
    }

    fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(&self.goals)?)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        ledger::{EggAmount, EggLedger},
        parent::StudyGoals,
        storage::{BALANCE_KEY, KeyValueStore, MemoryStore, STUDY_GOALS_KEY},
    };

    fn eggs(amount: u64) -> EggAmount {
        EggAmount::new(amount).unwrap()
    }

    #[test]
    fn missing_goals_are_seeded_and_written() {
        let store = MemoryStore::new();

        let goals = StudyGoals::load(&store).unwrap();

        let titles: Vec<&str> = goals.goals().iter().map(|goal| goal.title.as_str()).collect();
        assert_eq!(
            titles,
            [
                "Complete Math Workbook",
                "Read a Chapter Book",
                "Practice Spelling Words"
            ]
        );
        assert!(goals.goals()[2].completed);
        assert_eq!(StudyGoals::load(&store).unwrap(), goals);
        assert!(store.get(STUDY_GOALS_KEY).unwrap().is_some());
    }

    #[test]
    fn malformed_goals_are_replaced_with_starter_goals() {
        let store = MemoryStore::with_entries(&[(STUDY_GOALS_KEY, r#"[{"id": "one"}]"#)]);

        let goals = StudyGoals::load(&store).unwrap();

        assert_eq!(goals.goals().len(), 3);
        let stored = store.get(STUDY_GOALS_KEY).unwrap().unwrap();
        assert!(stored.contains("Complete Math Workbook"), "got {stored}");
    }

    #[test]
    fn add_assigns_next_id_and_persists() {
        let store = MemoryStore::new();
        let mut goals = StudyGoals::load(&store).unwrap();

        let goal = goals
            .add(&store, "  Practice Piano ", "Twenty minutes of scales", eggs(5))
            .unwrap();

        assert_eq!(goal.id, 4);
        assert_eq!(goal.title, "Practice Piano");
        assert!(!goal.completed);
        assert_eq!(StudyGoals::load(&store).unwrap().goals().len(), 4);
    }

    #[test]
    fn add_rejects_blank_title() {
        let store = MemoryStore::new();
        let mut goals = StudyGoals::load(&store).unwrap();

        let got = goals.add(&store, " ", "No title", eggs(5)).map(|goal| goal.id);

        assert_eq!(got, Err(Error::EmptyGoalTitle));
        assert_eq!(goals.goals().len(), 3);
    }

    #[test]
    fn add_after_largest_id_is_refused() {
        let stored = format!(
            r#"[{{"id":{},"title":"Last","description":"","reward":3,"completed":false}}]"#,
            u32::MAX
        );
        let store = MemoryStore::with_entries(&[(STUDY_GOALS_KEY, &stored)]);
        let mut goals = StudyGoals::load(&store).unwrap();

        let got = goals.add(&store, "One more", "", eggs(5)).map(|goal| goal.id);

        assert_eq!(got, Err(Error::TooManyGoals));
        assert_eq!(goals.goals().len(), 1);
        assert_eq!(store.get(STUDY_GOALS_KEY), Ok(Some(stored)));
    }

    #[test]
    fn complete_credits_reward_once() {
        let store = MemoryStore::with_entries(&[(BALANCE_KEY, "20")]);
        let mut ledger = EggLedger::open(store.clone(), 50).unwrap();
        let mut goals = StudyGoals::load(&store).unwrap();

        let balance = goals.complete(&mut ledger, 2).unwrap();

        assert_eq!(balance, 35);
        assert!(goals.goals()[1].completed);
        assert!(StudyGoals::load(&store).unwrap().goals()[1].completed);
        assert_eq!(store.get(BALANCE_KEY), Ok(Some("35".to_owned())));

        assert_eq!(goals.complete(&mut ledger, 2), Err(Error::GoalAlreadyCompleted));
        assert_eq!(ledger.read(), 35);
    }

    #[test]
    fn complete_unknown_goal_is_not_found() {
        let store = MemoryStore::new();
        let mut ledger = EggLedger::open(store.clone(), 50).unwrap();
        let mut goals = StudyGoals::load(&store).unwrap();

        assert_eq!(goals.complete(&mut ledger, 99), Err(Error::NotFound));
        assert_eq!(ledger.read(), 50);
    }

    #[test]
    fn seeded_completed_goal_cannot_be_completed() {
        let store = MemoryStore::new();
        let mut ledger = EggLedger::open(store.clone(), 50).unwrap();
        let mut goals = StudyGoals::load(&store).unwrap();

        assert_eq!(goals.complete(&mut ledger, 3), Err(Error::GoalAlreadyCompleted));
    }
}
