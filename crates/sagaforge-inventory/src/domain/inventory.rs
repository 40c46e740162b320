//! Ordered item list with set semantics.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A player's carried items.
///
/// Order of first acquisition is preserved and an item name appears at most
/// once. Names are compared exactly after trimming; blank names are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Inventory {
    items: Vec<String>,
}

impl Inventory {
    /// Creates an empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an inventory from a list of names, dropping duplicates and
    /// blanks while keeping first occurrences in order.
    pub fn from_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut inventory = Self::new();
        inventory.add_items(items);
        inventory
    }

    /// Returns the items in acquisition order.
    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Returns `true` if an item with exactly this name is carried.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        let name = name.trim();
        self.items.iter().any(|item| item == name)
    }

    /// Number of distinct items carried.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing is carried.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends each item that is not already present.
    pub fn add_items<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for item in items {
            let name = item.as_ref().trim();
            if name.is_empty() || self.contains(name) {
                continue;
            }
            debug!(item = name, "item added");
            self.items.push(name.to_owned());
        }
    }

    /// Removes every listed item. Names that are not carried are ignored.
    pub fn remove_items<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let doomed: Vec<String> = items
            .into_iter()
            .map(|s| s.as_ref().trim().to_owned())
            .collect();
        self.items.retain(|item| !doomed.contains(item));
    }

    /// Replaces the whole inventory.
    pub fn replace<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        *self = Self::from_items(items);
    }
}

impl From<Vec<String>> for Inventory {
    fn from(items: Vec<String>) -> Self {
        Self::from_items(items)
    }
}

impl From<Inventory> for Vec<String> {
    fn from(inventory: Inventory) -> Self {
        inventory.items
    }
}
