//! Multi-turn destruction probability analysis.
//!
//! Answers the prediction question the UI shows when hovering a target:
//! if this attacker strikes that defender once per turn, what is the
//! probability the defender is destroyed within k turns? The critical
//! distribution is walked deterministically rather than sampled, so the
//! result is exact (up to floating accumulation, clamped at 1).
//!
//! Display-only output; probabilities are plain `f64` and never feed
//! back into simulation state.

use std::collections::HashMap;

use crate::combat::CRIT_TABLE;
use crate::grid::TileType;
use crate::units::Unit;

/// Probability that the defender dies within each number of turns.
///
/// Returns `max_turns + 1` entries; entry `k` is the probability of
/// destruction within `k` complete attack-turns. Entry 0 is always 0 -
/// nothing is destroyed before the first attack.
///
/// `tile` is the tile the defender stands on (its defense bonus shapes
/// the base damage). The curve is non-decreasing, bounded by [0, 1],
/// and converges to 1 whenever the attack can do damage at all.
#[must_use]
pub fn destroy_probability_curve(
    attacker: &Unit,
    defender: &Unit,
    tile: Option<&TileType>,
    max_turns: u32,
) -> Vec<f64> {
    let base = attacker.get_damage(defender, tile);
    let health = defender.health();

    let mut memo = HashMap::new();
    let mut curve = Vec::with_capacity(max_turns as usize + 1);
    curve.push(0.0);
    for turns in 1..=max_turns {
        curve.push(destroy_within(turns, health, base, &mut memo));
    }

    curve
}

/// Probability of destruction within `turns` further attacks starting
/// from `health`.
///
/// Sums over the critical outcomes: a branch whose clamped damage is
/// zero can never kill and contributes nothing; a branch that empties
/// the health bar contributes its full probability; anything in between
/// recurses with one turn fewer. Memoized on `(turns, health)` since
/// the damage distribution is fixed for the whole call.
fn destroy_within(
    turns: u32,
    health: i32,
    base: i32,
    memo: &mut HashMap<(u32, i32), f64>,
) -> f64 {
    if turns == 0 {
        return 0.0;
    }
    if let Some(&known) = memo.get(&(turns, health)) {
        return known;
    }

    let mut total = 0.0;
    for (critical, probability) in CRIT_TABLE {
        let damage = (base + critical).max(0);
        if damage == 0 {
            continue;
        }

        let remaining = health - damage;
        if remaining <= 0 {
            total += probability;
        } else {
            total += probability * destroy_within(turns - 1, remaining, base, memo);
        }
    }

    // Guard against floating accumulation drift above certainty.
    let total = total.min(1.0);
    memo.insert((turns, health), total);
    total
}
