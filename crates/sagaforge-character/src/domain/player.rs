//! Party member record.

use sagaforge_inventory::Inventory;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::class::{CharacterClass, Stats, starting_inventory, stats_for};

/// One party member.
///
/// `hp` and `mana` are private so every write goes through the clamping
/// setters: `0 <= hp <= stats.hp_base` and `0 <= mana <= stats.mana_base`
/// hold at all times, including after deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PlayerRecord")]
pub struct Player {
    /// Stable identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Class the player was created from.
    pub class: CharacterClass,
    /// Base stats, never mutated after creation.
    pub stats: Stats,
    hp: i32,
    mana: i32,
    /// Carried items.
    pub inventory: Inventory,
}

/// Unchecked wire form of [`Player`].
#[derive(Deserialize)]
struct PlayerRecord {
    id: Uuid,
    name: String,
    class: CharacterClass,
    stats: Stats,
    hp: i32,
    mana: i32,
    #[serde(default)]
    inventory: Inventory,
}

impl From<PlayerRecord> for Player {
    fn from(record: PlayerRecord) -> Self {
        let mut player = Self {
            id: record.id,
            name: record.name,
            class: record.class,
            stats: record.stats,
            hp: 0,
            mana: 0,
            inventory: record.inventory,
        };
        player.set_hp(record.hp);
        player.set_mana(record.mana);
        player
    }
}

impl Player {
    /// Creates a fresh player from the class registry: full health and mana,
    /// class starting kit.
    #[must_use]
    pub fn from_class(name: impl Into<String>, class: CharacterClass) -> Self {
        let stats = stats_for(class);
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            class,
            stats,
            hp: stats.hp_base,
            mana: stats.mana_base,
            inventory: Inventory::from_items(starting_inventory(class)),
        }
    }

    /// Current hit points.
    #[must_use]
    pub fn hp(&self) -> i32 {
        self.hp
    }

    /// Current mana.
    #[must_use]
    pub fn mana(&self) -> i32 {
        self.mana
    }

    /// Sets hit points, clamped to `[0, stats.hp_base]`.
    pub fn set_hp(&mut self, hp: i32) {
        self.hp = hp.clamp(0, self.stats.hp_base.max(0));
    }

    /// Sets mana, clamped to `[0, stats.mana_base]`.
    pub fn set_mana(&mut self, mana: i32) {
        self.mana = mana.clamp(0, self.stats.mana_base.max(0));
    }

    /// A player is down once their hit points reach zero.
    #[must_use]
    pub fn is_down(&self) -> bool {
        self.hp == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_class_starts_at_full_vitals() {
        let player = Player::from_class("Borys", CharacterClass::Warrior);
        assert_eq!(player.hp(), 30);
        assert_eq!(player.mana(), 5);
        assert!(player.inventory.contains("Longsword"));
        assert!(!player.is_down());
    }

    #[test]
    fn test_set_hp_clamps_to_bounds() {
        let mut player = Player::from_class("Borys", CharacterClass::Warrior);
        player.set_hp(-100);
        assert_eq!(player.hp(), 0);
        assert!(player.is_down());
        player.set_hp(500);
        assert_eq!(player.hp(), 30);
    }

    #[test]
    fn test_set_mana_clamps_to_bounds() {
        let mut player = Player::from_class("Ida", CharacterClass::Mage);
        player.set_mana(31);
        assert_eq!(player.mana(), 30);
        player.set_mana(-1);
        assert_eq!(player.mana(), 0);
    }

    #[test]
    fn test_deserialize_clamps_out_of_range_vitals() {
        let player = Player::from_class("Ida", CharacterClass::Mage);
        let mut json = serde_json::to_value(&player).unwrap();
        json["hp"] = serde_json::json!(999);
        json["mana"] = serde_json::json!(-5);

        let restored: Player = serde_json::from_value(json).unwrap();
        assert_eq!(restored.hp(), 18);
        assert_eq!(restored.mana(), 0);
    }
}
