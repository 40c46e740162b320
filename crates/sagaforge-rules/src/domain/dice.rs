//! Dice resolution.

use sagaforge_character::{CharacterClass, Player};
use sagaforge_core::rng::DeterministicRng;
use serde::{Deserialize, Serialize};

use super::keywords::{ActionCategory, classify_action};

/// Sides on the resolution die.
pub const DIE_SIDES: u32 = 20;

/// The statistic a roll is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Combat.
    Strength,
    /// Stealth and search.
    Dexterity,
    /// Social and magic.
    Wisdom,
}

impl Attribute {
    /// The attribute an action category keys on.
    #[must_use]
    pub fn for_category(category: ActionCategory) -> Self {
        match category {
            ActionCategory::Combat => Self::Strength,
            ActionCategory::Stealth => Self::Dexterity,
            ActionCategory::Social | ActionCategory::Magic => Self::Wisdom,
        }
    }

    /// Fallback attribute when an action matches no keyword.
    #[must_use]
    pub fn class_default(class: CharacterClass) -> Self {
        match class {
            CharacterClass::Warrior => Self::Strength,
            CharacterClass::Rogue => Self::Dexterity,
            CharacterClass::Mage | CharacterClass::Herbalist => Self::Wisdom,
        }
    }

    /// Reads this attribute's value off a player's base stats.
    #[must_use]
    pub fn value_for(self, player: &Player) -> i32 {
        match self {
            Self::Strength => player.stats.strength,
            Self::Dexterity => player.stats.dexterity,
            Self::Wisdom => player.stats.wisdom,
        }
    }

    /// Lower-case name used in prompts.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Dexterity => "dexterity",
            Self::Wisdom => "wisdom",
        }
    }
}

/// Consequence severity bands keyed on the roll total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollTier {
    /// Total below 7.
    Failure,
    /// Total 7 to 11.
    Partial,
    /// Total 12 to 19.
    Success,
    /// Total 20 or more.
    Critical,
}

impl RollTier {
    /// Maps a resolution total to its tier.
    #[must_use]
    pub fn from_total(total: i32) -> Self {
        match total {
            t if t >= 20 => Self::Critical,
            t if t >= 12 => Self::Success,
            t if t >= 7 => Self::Partial,
            _ => Self::Failure,
        }
    }
}

/// Outcome of binding a d20 to a character statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    /// Natural d20 result in `[1, 20]`.
    pub roll: u32,
    /// Statistic the roll was bound to.
    pub attribute: Attribute,
    /// Keyword category, if the action matched one.
    pub category: Option<ActionCategory>,
    /// Value of `attribute` for the acting player.
    pub modifier: i32,
    /// `roll + modifier`; consequence severity keys on this.
    pub total: i32,
}

impl DiceRoll {
    /// Severity band of this roll's total.
    #[must_use]
    pub fn tier(&self) -> RollTier {
        RollTier::from_total(self.total)
    }
}

/// Rolls a d20 for `player` attempting `action`.
///
/// The statistic comes from the action's keyword category, falling back to
/// the player's class default.
#[must_use]
pub fn resolve(player: &Player, action: &str, rng: &mut dyn DeterministicRng) -> DiceRoll {
    let category = classify_action(action);
    let attribute = category.map_or_else(
        || Attribute::class_default(player.class),
        Attribute::for_category,
    );
    let roll = rng.next_u32_range(1, DIE_SIDES).clamp(1, DIE_SIDES);
    let modifier = attribute.value_for(player);
    // roll is at most 20, so the cast is lossless.
    #[allow(clippy::cast_possible_wrap)]
    let total = roll as i32 + modifier;

    DiceRoll {
        roll,
        attribute,
        category,
        modifier,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sagaforge_test_support::{MockRng, SequenceRng};

    #[test]
    fn test_attack_in_polish_binds_strength_for_every_class() {
        for class in CharacterClass::ALL {
            let player = Player::from_class("Ala", class);
            let mut rng = SequenceRng::new(vec![10]);
            let roll = resolve(&player, "Atakuję wilka", &mut rng);
            assert_eq!(roll.attribute, Attribute::Strength, "{class}");
            assert_eq!(roll.category, Some(ActionCategory::Combat));
        }
    }

    #[test]
    fn test_total_adds_attribute_to_roll() {
        let player = Player::from_class("Borys", CharacterClass::Warrior);
        let mut rng = SequenceRng::new(vec![13]);
        let roll = resolve(&player, "I attack the troll", &mut rng);
        assert_eq!(roll.roll, 13);
        assert_eq!(roll.modifier, 8);
        assert_eq!(roll.total, 21);
        assert_eq!(roll.tier(), RollTier::Critical);
    }

    #[test]
    fn test_unmatched_action_falls_back_to_class_default() {
        let cases = [
            (CharacterClass::Warrior, Attribute::Strength),
            (CharacterClass::Rogue, Attribute::Dexterity),
            (CharacterClass::Mage, Attribute::Wisdom),
            (CharacterClass::Herbalist, Attribute::Wisdom),
        ];
        for (class, expected) in cases {
            let player = Player::from_class("Ala", class);
            let roll = resolve(&player, "I wait quietly", &mut MockRng);
            assert_eq!(roll.attribute, expected, "{class}");
            assert_eq!(roll.category, None);
        }
    }

    #[test]
    fn test_social_and_magic_bind_wisdom() {
        let player = Player::from_class("Ida", CharacterClass::Rogue);
        let social = resolve(&player, "convince the mayor", &mut MockRng);
        let magic = resolve(&player, "cast fireball", &mut MockRng);
        assert_eq!(social.attribute, Attribute::Wisdom);
        assert_eq!(magic.attribute, Attribute::Wisdom);
        assert_eq!(magic.modifier, 3);
    }

    #[test]
    fn test_stealth_binds_dexterity() {
        let player = Player::from_class("Ida", CharacterClass::Warrior);
        let roll = resolve(&player, "sneak into the keep", &mut MockRng);
        assert_eq!(roll.attribute, Attribute::Dexterity);
        assert_eq!(roll.total, 1 + 4);
    }

    #[test]
    fn test_roll_is_clamped_into_die_range() {
        let player = Player::from_class("Ida", CharacterClass::Mage);
        let mut rng = SequenceRng::new(vec![0, 99]);
        assert_eq!(resolve(&player, "wait", &mut rng).roll, 1);
        assert_eq!(resolve(&player, "wait", &mut rng).roll, 20);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(RollTier::from_total(6), RollTier::Failure);
        assert_eq!(RollTier::from_total(7), RollTier::Partial);
        assert_eq!(RollTier::from_total(11), RollTier::Partial);
        assert_eq!(RollTier::from_total(12), RollTier::Success);
        assert_eq!(RollTier::from_total(19), RollTier::Success);
        assert_eq!(RollTier::from_total(20), RollTier::Critical);
    }
}
