//! Action classification by keyword stems.
//!
//! Actions are free text, often in Polish. A word matches when it starts
//! with one of the stems below, so inflected forms ("atakuję", "attacking")
//! match the bare stem. A stem ending in `=` must match the whole word.

use serde::{Deserialize, Serialize};

/// What kind of deed an action describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    /// Fighting.
    Combat,
    /// Talking someone into something.
    Social,
    /// Sneaking, stealing, searching.
    Stealth,
    /// Spells and rituals.
    Magic,
}

const COMBAT_STEMS: &[&str] = &[
    "attack", "strike", "hit", "fight", "swing", "slash", "stab", "charge", "smash", "shoot",
    "punch", "kick", "atak", "uderz", "walcz", "bij", "tn", "rąb", "zabij", "strzel", "kopi",
];

const SOCIAL_STEMS: &[&str] = &[
    "persuad", "convinc", "negotiat", "talk", "bargain", "intimidat", "charm", "lie=", "lies=",
    "lied=", "lying", "bluff", "ask", "przekon", "negocj", "rozmaw", "targuj", "targow",
    "zastrasz", "okłam", "pyt", "proszę",
];

const STEALTH_STEMS: &[&str] = &[
    "sneak", "hide", "steal", "search", "lockpick", "pick", "dodge", "climb", "investigat",
    "examin", "skrad", "ukry", "ukradn", "kradn", "szuk", "przeszuk", "unik", "wspin", "otwier",
    "zbad",
];

const MAGIC_STEMS: &[&str] = &[
    "cast", "spell", "magic", "heal", "ritual", "enchant", "summon", "czar", "zaklę", "zakle",
    "magi", "leczę", "lecze", "leczy", "ulecz", "rzucam", "przywoł",
];

/// Classifies an action by its first matching category, checked in the
/// order combat, social, stealth, magic.
#[must_use]
pub fn classify_action(action: &str) -> Option<ActionCategory> {
    let lowered = action.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let matches = |stems: &[&str]| {
        words
            .iter()
            .any(|word| stems.iter().any(|stem| stem_matches(stem, word)))
    };

    [
        (ActionCategory::Combat, COMBAT_STEMS),
        (ActionCategory::Social, SOCIAL_STEMS),
        (ActionCategory::Stealth, STEALTH_STEMS),
        (ActionCategory::Magic, MAGIC_STEMS),
    ]
    .into_iter()
    .find(|(_, stems)| matches(stems))
    .map(|(category, _)| category)
}

fn stem_matches(stem: &str, word: &str) -> bool {
    match stem.strip_suffix('=') {
        Some(whole) => word == whole,
        None => word.starts_with(stem),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polish_attack_is_combat() {
        assert_eq!(
            classify_action("Atakuję wilka"),
            Some(ActionCategory::Combat)
        );
    }

    #[test]
    fn test_english_inflections_match_stems() {
        assert_eq!(
            classify_action("I keep attacking the goblin"),
            Some(ActionCategory::Combat)
        );
        assert_eq!(
            classify_action("Try persuading the guard"),
            Some(ActionCategory::Social)
        );
        assert_eq!(
            classify_action("Sneaking past the sentries"),
            Some(ActionCategory::Stealth)
        );
        assert_eq!(
            classify_action("I cast a warding spell"),
            Some(ActionCategory::Magic)
        );
    }

    #[test]
    fn test_polish_categories() {
        assert_eq!(
            classify_action("Przekonuję kupca"),
            Some(ActionCategory::Social)
        );
        assert_eq!(
            classify_action("Przeszukuję skrzynię"),
            Some(ActionCategory::Stealth)
        );
        assert_eq!(
            classify_action("Rzucam zaklęcie ognia"),
            Some(ActionCategory::Magic)
        );
    }

    #[test]
    fn test_combat_wins_over_later_categories() {
        assert_eq!(
            classify_action("cast a spell and attack"),
            Some(ActionCategory::Combat)
        );
    }

    #[test]
    fn test_stems_only_match_word_starts() {
        // "white" contains "hit" but does not start with it.
        assert_eq!(classify_action("admire the white tower"), None);
    }

    #[test]
    fn test_lookalike_words_do_not_match_short_stems() {
        assert_eq!(classify_action("I target the goblin"), None);
        assert_eq!(classify_action("Salute the lieutenant"), None);
        // "lecz" on its own is the conjunction "but".
        assert_eq!(classify_action("Czekam, lecz cicho"), None);
    }

    #[test]
    fn test_tightened_stems_still_match_their_verbs() {
        assert_eq!(
            classify_action("Targuję się z kupcem"),
            Some(ActionCategory::Social)
        );
        assert_eq!(
            classify_action("I lie to the guard"),
            Some(ActionCategory::Social)
        );
        assert_eq!(
            classify_action("Leczę rannego"),
            Some(ActionCategory::Magic)
        );
        assert_eq!(
            classify_action("Uleczam Borysa"),
            Some(ActionCategory::Magic)
        );
    }

    #[test]
    fn test_no_keyword_returns_none() {
        assert_eq!(classify_action("I wait by the fire"), None);
        assert_eq!(classify_action(""), None);
    }
}
