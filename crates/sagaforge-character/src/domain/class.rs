//! Stat & class registry.
//!
//! Every class maps to a fixed stat block and starting kit. The registry is
//! total over [`CharacterClass`]; unknown class names only exist at the
//! transport boundary, where [`CharacterClass::from_str`] rejects them.

use std::fmt;
use std::str::FromStr;

use sagaforge_core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Playable character classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterClass {
    /// Front-line fighter.
    Warrior,
    /// Arcane caster.
    Mage,
    /// Stealth and locks.
    Rogue,
    /// Healer and alchemist.
    Herbalist,
}

impl CharacterClass {
    /// All classes, in menu order.
    pub const ALL: [Self; 4] = [Self::Warrior, Self::Mage, Self::Rogue, Self::Herbalist];

    /// Lower-case identifier used in JSON and prompts.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warrior => "warrior",
            Self::Mage => "mage",
            Self::Rogue => "rogue",
            Self::Herbalist => "herbalist",
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CharacterClass {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "warrior" | "wojownik" => Ok(Self::Warrior),
            "mage" | "mag" => Ok(Self::Mage),
            "rogue" | "łotrzyk" | "lotrzyk" => Ok(Self::Rogue),
            "herbalist" | "zielarz" | "zielarka" => Ok(Self::Herbalist),
            other => Err(DomainError::Validation(format!(
                "unknown character class: {other:?}"
            ))),
        }
    }
}

/// Base statistics of a character. Fixed at creation; `hp_base` and
/// `mana_base` are ceilings for the running values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Melee power; modifies combat rolls.
    pub strength: i32,
    /// Agility; modifies stealth and search rolls.
    pub dexterity: i32,
    /// Insight; modifies social and magic rolls.
    pub wisdom: i32,
    /// Maximum hit points.
    pub hp_base: i32,
    /// Maximum mana.
    pub mana_base: i32,
    /// Starting purse.
    pub gold: i32,
}

/// Returns the base stats for a class.
#[must_use]
pub fn stats_for(class: CharacterClass) -> Stats {
    match class {
        CharacterClass::Warrior => Stats {
            strength: 8,
            dexterity: 4,
            wisdom: 2,
            hp_base: 30,
            mana_base: 5,
            gold: 10,
        },
        CharacterClass::Mage => Stats {
            strength: 2,
            dexterity: 4,
            wisdom: 8,
            hp_base: 18,
            mana_base: 30,
            gold: 15,
        },
        CharacterClass::Rogue => Stats {
            strength: 4,
            dexterity: 8,
            wisdom: 3,
            hp_base: 22,
            mana_base: 10,
            gold: 25,
        },
        CharacterClass::Herbalist => Stats {
            strength: 3,
            dexterity: 4,
            wisdom: 7,
            hp_base: 20,
            mana_base: 20,
            gold: 12,
        },
    }
}

/// Returns the starting kit for a class, in display order.
#[must_use]
pub fn starting_inventory(class: CharacterClass) -> Vec<String> {
    let items: &[&str] = match class {
        CharacterClass::Warrior => &["Longsword", "Wooden Shield", "Healing Potion"],
        CharacterClass::Mage => &["Oak Staff", "Spellbook", "Mana Potion"],
        CharacterClass::Rogue => &["Dagger", "Lockpicks", "Dark Cloak"],
        CharacterClass::Herbalist => &["Herb Pouch", "Mortar and Pestle", "Healing Salve"],
    };
    items.iter().map(|&item| item.to_owned()).collect()
}
