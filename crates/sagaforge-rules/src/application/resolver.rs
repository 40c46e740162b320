//! Dice resolution against a shared RNG.

use std::sync::Mutex;

use sagaforge_character::Player;
use sagaforge_core::error::DomainError;
use sagaforge_core::rng::DeterministicRng;
use tracing::debug;

use crate::domain::dice::{DiceRoll, resolve};

/// Rolls for `player` attempting `action` using the shared RNG.
///
/// The `Mutex` is locked only for the synchronous roll; callers must not
/// hold it across await points.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the RNG mutex is poisoned.
pub fn roll_for_action(
    player: &Player,
    action: &str,
    rng: &Mutex<dyn DeterministicRng + Send>,
) -> Result<DiceRoll, DomainError> {
    let roll = {
        let mut rng_guard = rng
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
        resolve(player, action, &mut *rng_guard)
    };
    debug!(
        player = %player.name,
        roll = roll.roll,
        attribute = roll.attribute.as_str(),
        total = roll.total,
        "dice resolved"
    );
    Ok(roll)
}
