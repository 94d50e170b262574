use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    storage::{KeyValueStore, SELECTED_DOLL_KEY},
};

/// A doll the child can choose to show on their dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doll {
    pub id: String,
    pub name: String,
    /// The URL of the picture of the doll.
    pub image: String,
    pub description: String,
}

impl Doll {
    fn new(id: &str, name: &str, image: &str, description: &str) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            image: image.to_owned(),
            description: description.to_owned(),
        }
    }
}

static DOLLS: LazyLock<Vec<Doll>> = LazyLock::new(|| {
    vec![
        Doll::new(
            "1",
            "Fashion Doll",
            "https://api.dicebear.com/7.x/avataaars/svg?seed=fashion",
            "The classic fashion doll with stylish outfits",
        ),
        Doll::new(
            "2",
            "Doctor Doll",
            "https://api.dicebear.com/7.x/avataaars/svg?seed=doctor",
            "A doll dressed as a medical professional",
        ),
        Doll::new(
            "3",
            "Astronaut Doll",
            "https://api.dicebear.com/7.x/avataaars/svg?seed=astronaut",
            "A doll ready for space adventures",
        ),
        Doll::new(
            "4",
            "Mermaid Doll",
            "https://api.dicebear.com/7.x/avataaars/svg?seed=mermaid",
            "A doll as a beautiful mermaid",
        ),
        Doll::new(
            "5",
            "Princess Doll",
            "https://api.dicebear.com/7.x/avataaars/svg?seed=princess",
            "A doll as a royal princess",
        ),
    ]
});

/// Every doll in the gallery, in carousel order.
pub fn dolls() -> &'static [Doll] {
    &DOLLS
}

/// Look up a doll by its ID.
///
/// # Errors
/// Returns [Error::NotFound] if no doll has the ID `id`.
pub fn find_doll(id: &str) -> Result<&'static Doll, Error> {
    dolls()
        .iter()
        .find(|doll| doll.id == id)
        .ok_or(Error::NotFound)
}

/// The carousel position after `index`, wrapping from the last doll to the first.
pub fn next_index(index: usize) -> usize {
    (index % dolls().len() + 1) % dolls().len()
}

/// The carousel position before `index`, wrapping from the first doll to the last.
pub fn previous_index(index: usize) -> usize {
    let count = dolls().len();

    (index % count + count - 1) % count
}

/// The doll shown on the child's dashboard, persisted as a JSON object under
/// [SELECTED_DOLL_KEY].
#[derive(Debug, Clone, PartialEq)]
pub struct DollSelection {
    doll: Doll,
}

impl DollSelection {
    /// Load the selected doll from `store`.
    ///
    /// Falls back to the first doll if nothing has been selected yet. A
    /// malformed stored value is also replaced with the first doll, and the
    /// replacement is written back to the store.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn load(store: &impl KeyValueStore) -> Result<Self, Error> {
        let default_doll = || dolls()[0].clone();

        let Some(stored) = store.get(SELECTED_DOLL_KEY)? else {
            return Ok(Self {
                doll: default_doll(),
            });
        };

        match serde_json::from_str::<Doll>(&stored) {
            Ok(doll) => Ok(Self { doll }),
            Err(error) => {
                tracing::warn!(
                    "Could not parse stored doll {stored:?}: {error}. Resetting to the first doll."
                );
                let selection = Self {
                    doll: default_doll(),
                };
                selection.save(store)?;

                Ok(selection)
            }
        }
    }

    pub fn doll(&self) -> &Doll {
        &self.doll
    }

    /// Whether `doll` is the selected doll.
    pub fn is_selected(&self, doll: &Doll) -> bool {
        self.doll.id == doll.id
    }

    /// Make `doll` the selected doll and persist it.
    ///
    /// # Errors
    /// Returns an error if the selection cannot be written, in which case the
    /// selection is unchanged.
    pub fn select(&mut self, store: &impl KeyValueStore, doll: &Doll) -> Result<(), Error> {
        let selection = Self { doll: doll.clone() };
        selection.save(store)?;
        *self = selection;

        tracing::debug!("Selected doll {} ({})", doll.name, doll.id);
        Ok(())
    }

    fn save(&self, store: &impl KeyValueStore) -> Result<(), Error> {
        store.set(SELECTED_DOLL_KEY, &serde_json::to_string(&self.doll)?)
    }
}
