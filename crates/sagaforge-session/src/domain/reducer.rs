//! State reducer: folds one validated narrator effect into a session.
//!
//! The reducer is pure and total. Anything out of range is clamped rather
//! than rejected, and the party wipe rule has the final word on the
//! outcome regardless of what the narrator declared.

use sagaforge_narrative::{Effect, Message, Outcome};
use tracing::{debug, info};

use super::state::{SessionPhase, SessionState};

/// Applies `effect` on behalf of the player at `acting_index` and appends
/// `narration` to the transcript.
///
/// A terminal session only gains the narration line. An out-of-range
/// `acting_index` skips the per-player part of the effect.
#[must_use]
pub fn apply(
    mut state: SessionState,
    effect: Option<&Effect>,
    acting_index: usize,
    narration: &str,
) -> SessionState {
    state.messages.push(Message::assistant(narration));

    if state.is_terminal() {
        debug!(session_id = %state.session_id, "session is over; effect ignored");
        return state;
    }

    let Some(effect) = effect else {
        return state;
    };

    apply_globals(&mut state, effect);
    apply_to_player(&mut state, effect, acting_index);
    enforce_party_wipe(&mut state);

    if state.is_over {
        state.phase = SessionPhase::Terminal;
        info!(
            session_id = %state.session_id,
            outcome = ?state.outcome,
            "session reached a terminal state"
        );
    }

    state
}

fn apply_globals(state: &mut SessionState, effect: &Effect) {
    if let Some(goal) = &effect.goal {
        state.goal = Some(goal.clone());
    }
    if let Some(quest_log) = &effect.quest_log {
        state.quest_log.clone_from(quest_log);
    }
    if let Some(is_over) = effect.is_over {
        state.is_over = is_over;
    }
    if let Some(outcome) = effect.outcome {
        state.outcome = outcome;
    }
    if state.outcome != Outcome::None {
        state.is_over = true;
    }
}

fn apply_to_player(state: &mut SessionState, effect: &Effect, acting_index: usize) {
    let Some(player) = state.players.get_mut(acting_index) else {
        debug!(acting_index, "acting player out of range; player effects skipped");
        return;
    };

    if let Some(hp) = effect.hp {
        player.set_hp(hp);
    }
    if let Some(mana) = effect.mana {
        player.set_mana(mana);
    }

    if let Some(inventory) = &effect.inventory {
        player.inventory.replace(inventory);
    } else {
        if let Some(added) = &effect.add_items {
            player.inventory.add_items(added);
        }
        if let Some(removed) = &effect.remove_items {
            player.inventory.remove_items(removed);
        }
    }

    debug!(
        player = %player.name,
        hp = player.hp(),
        mana = player.mana(),
        items = player.inventory.len(),
        "player effect applied"
    );
}

fn enforce_party_wipe(state: &mut SessionState) {
    if !state.players.is_empty() && state.players.iter().all(sagaforge_character::Player::is_down)
    {
        state.is_over = true;
        state.outcome = Outcome::Lose;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sagaforge_character::{CharacterClass, Player};
    use sagaforge_core::id::SessionId;
    use sagaforge_test_support::fixed_clock;

    fn active_state(classes: &[CharacterClass]) -> SessionState {
        let mut state = SessionState::new(SessionId::parse("s-1").unwrap(), fixed_clock().0);
        state.phase = SessionPhase::Active;
        state.players = classes
            .iter()
            .enumerate()
            .map(|(i, class)| Player::from_class(format!("P{i}"), *class))
            .collect();
        state
    }

    #[test]
    fn test_no_effect_only_appends_narration() {
        // Arrange
        let state = active_state(&[CharacterClass::Rogue]);
        let before = state.clone();

        // Act
        let after = apply(state, None, 0, "The alley is quiet.");

        // Assert
        assert_eq!(after.messages.len(), 1);
        assert_eq!(after.messages[0], Message::assistant("The alley is quiet."));
        assert_eq!(after.players, before.players);
        assert_eq!(after.phase, SessionPhase::Active);
    }

    #[test]
    fn test_hp_and_mana_are_clamped_to_bounds() {
        let state = active_state(&[CharacterClass::Mage]);
        let effect = Effect {
            hp: Some(500),
            mana: Some(-3),
            ..Effect::default()
        };

        let after = apply(state, Some(&effect), 0, "");

        assert_eq!(after.players[0].hp(), 18);
        assert_eq!(after.players[0].mana(), 0);
    }

    #[test]
    fn test_warrior_taking_lethal_damage_loses_solo_session() {
        // Arrange
        let state = active_state(&[CharacterClass::Warrior]);
        let effect = Effect {
            hp: Some(-100),
            ..Effect::default()
        };

        // Act
        let after = apply(state, Some(&effect), 0, "The troll's club falls.");

        // Assert
        assert_eq!(after.players[0].hp(), 0);
        assert!(after.is_over);
        assert_eq!(after.outcome, Outcome::Lose);
        assert_eq!(after.phase, SessionPhase::Terminal);
    }

    #[test]
    fn test_party_wipe_overrides_declared_win() {
        let mut state = active_state(&[CharacterClass::Warrior, CharacterClass::Mage]);
        state.players[1].set_hp(0);
        let effect = Effect {
            hp: Some(0),
            is_over: Some(true),
            outcome: Some(Outcome::Win),
            ..Effect::default()
        };

        let after = apply(state, Some(&effect), 0, "");

        assert_eq!(after.outcome, Outcome::Lose);
        assert!(after.is_over);
    }

    #[test]
    fn test_partial_wipe_keeps_session_open() {
        let state = active_state(&[CharacterClass::Warrior, CharacterClass::Herbalist]);
        let effect = Effect {
            hp: Some(0),
            ..Effect::default()
        };

        let after = apply(state, Some(&effect), 0, "");

        assert!(after.players[0].is_down());
        assert!(!after.is_over);
        assert_eq!(after.outcome, Outcome::None);
        assert_eq!(after.phase, SessionPhase::Active);
    }

    #[test]
    fn test_adding_same_item_twice_keeps_one_copy() {
        let state = active_state(&[CharacterClass::Rogue]);
        let effect = Effect {
            add_items: Some(vec!["Rope".to_owned()]),
            ..Effect::default()
        };

        let once = apply(state, Some(&effect), 0, "");
        let twice = apply(once, Some(&effect), 0, "");

        let ropes = twice.players[0]
            .inventory
            .items()
            .iter()
            .filter(|item| *item == "Rope")
            .count();
        assert_eq!(ropes, 1);
    }

    #[test]
    fn test_removing_absent_item_is_noop() {
        let state = active_state(&[CharacterClass::Rogue]);
        let before = state.players[0].inventory.clone();
        let effect = Effect {
            remove_items: Some(vec!["Crown".to_owned()]),
            ..Effect::default()
        };

        let after = apply(state, Some(&effect), 0, "");

        assert_eq!(after.players[0].inventory, before);
    }

    #[test]
    fn test_inventory_replacement_wins_over_add_and_remove() {
        let state = active_state(&[CharacterClass::Mage]);
        let effect = Effect {
            inventory: Some(vec!["Ash".to_owned()]),
            add_items: Some(vec!["Gem".to_owned()]),
            remove_items: Some(vec!["Ash".to_owned()]),
            ..Effect::default()
        };

        let after = apply(state, Some(&effect), 0, "");

        assert_eq!(after.players[0].inventory.items(), ["Ash".to_owned()]);
    }

    #[test]
    fn test_add_then_remove_within_one_effect() {
        let state = active_state(&[CharacterClass::Herbalist]);
        let effect = Effect {
            add_items: Some(vec!["Moonpetal".to_owned()]),
            remove_items: Some(vec!["Herb Pouch".to_owned()]),
            ..Effect::default()
        };

        let after = apply(state, Some(&effect), 0, "");

        let items = after.players[0].inventory.items();
        assert_eq!(items.last().map(String::as_str), Some("Moonpetal"));
        assert!(!after.players[0].inventory.contains("Herb Pouch"));
    }

    #[test]
    fn test_globals_are_overwritten() {
        let mut state = active_state(&[CharacterClass::Rogue]);
        state.quest_log = vec!["old".to_owned()];
        let effect = Effect {
            goal: Some("Steal the ledger".to_owned()),
            quest_log: Some(vec!["a".to_owned(), "b".to_owned()]),
            ..Effect::default()
        };

        let after = apply(state, Some(&effect), 0, "");

        assert_eq!(after.goal.as_deref(), Some("Steal the ledger"));
        assert_eq!(after.quest_log, ["a".to_owned(), "b".to_owned()]);
    }

    #[test]
    fn test_declared_outcome_implies_is_over() {
        let state = active_state(&[CharacterClass::Rogue]);
        let effect = Effect {
            outcome: Some(Outcome::Win),
            ..Effect::default()
        };

        let after = apply(state, Some(&effect), 0, "");

        assert!(after.is_over);
        assert_eq!(after.outcome, Outcome::Win);
        assert_eq!(after.phase, SessionPhase::Terminal);
    }

    #[test]
    fn test_terminal_session_ignores_effects() {
        // Arrange
        let mut state = active_state(&[CharacterClass::Warrior]);
        state.is_over = true;
        state.outcome = Outcome::Win;
        state.phase = SessionPhase::Terminal;
        let effect = Effect {
            hp: Some(1),
            goal: Some("more".to_owned()),
            outcome: Some(Outcome::Lose),
            add_items: Some(vec!["Crown".to_owned()]),
            ..Effect::default()
        };
        let before = state.clone();

        // Act
        let after = apply(state, Some(&effect), 0, "Epilogue.");

        // Assert
        assert_eq!(after.players, before.players);
        assert_eq!(after.goal, before.goal);
        assert_eq!(after.outcome, Outcome::Win);
        assert_eq!(after.messages.len(), before.messages.len() + 1);
    }

    #[test]
    fn test_out_of_range_actor_only_applies_globals() {
        let state = active_state(&[CharacterClass::Rogue]);
        let before = state.players.clone();
        let effect = Effect {
            hp: Some(1),
            goal: Some("Flee".to_owned()),
            ..Effect::default()
        };

        let after = apply(state, Some(&effect), 7, "");

        assert_eq!(after.players, before);
        assert_eq!(after.goal.as_deref(), Some("Flee"));
    }

    #[test]
    fn test_empty_party_never_auto_loses() {
        let state = active_state(&[]);
        let effect = Effect {
            goal: Some("Wander".to_owned()),
            ..Effect::default()
        };

        let after = apply(state, Some(&effect), 0, "");

        assert!(!after.is_over);
    }
}
