//! Single-attack resolution with critical-hit modifiers.
//!
//! An attack computes base damage from the unit model, draws a critical
//! modifier from a fixed discrete distribution, applies the clamped
//! total to the defender, and reports whether that destruction ended
//! the game. The resolver never touches the attacker's turn flags;
//! those belong to the caller.
//!
//! No system randomness: the critical draw comes from a small seeded
//! generator so identical seeds replay identical battles.

use crate::error::{GameError, Result};
use crate::grid::TileType;
use crate::units::{Roster, Team, UnitId};

/// The critical-hit distribution: modifier and probability.
///
/// Shared verbatim by the outcome analyzer, which walks the same
/// distribution deterministically instead of sampling it.
pub const CRIT_TABLE: [(i32, f64); 4] = [(-1, 0.2), (0, 0.5), (1, 0.2), (2, 0.1)];

/// [`CRIT_TABLE`] expanded to ten equally likely slots for sampling.
const CRIT_SLOTS: [i32; 10] = [-1, -1, 0, 0, 0, 0, 0, 1, 1, 2];

/// Simple deterministic RNG for critical-hit draws.
#[derive(Debug, Clone)]
pub struct CritRng {
    state: u64,
}

impl CritRng {
    /// Create a generator from a seed. Equal seeds yield equal draw
    /// sequences, which is what tests rely on.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// splitmix64 step; the output mixing keeps the low bits usable for
    /// small modulus draws.
    fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Draw one critical modifier from [`CRIT_TABLE`].
    pub fn roll(&mut self) -> i32 {
        CRIT_SLOTS[(self.next() % 10) as usize]
    }
}

/// What one resolved attack did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackOutcome {
    /// Damage before the critical modifier.
    pub base_damage: i32,
    /// The drawn critical modifier.
    pub critical: i32,
    /// Damage actually applied: `max(0, base + critical)`.
    pub applied_damage: i32,
    /// Whether the defender was destroyed by this attack.
    pub defender_destroyed: bool,
    /// Set when the destruction left no enemy of the attacker standing.
    /// Surfaced to the turn controller; the resolver does not act on it.
    pub winner: Option<Team>,
}

/// Resolve a single attack.
///
/// Computes base damage against the defender on its tile, adds a
/// critical modifier drawn from `rng`, and applies the result. When the
/// defender dies, the active roster is scanned for any remaining enemy
/// of the attacker; if none is left the attacker's team has won.
///
/// # Errors
///
/// Returns [`GameError::InvalidUnitId`] if either unit is not active in
/// the roster.
pub fn resolve_attack(
    roster: &mut Roster,
    attacker: UnitId,
    defender: UnitId,
    defender_tile: Option<&TileType>,
    rng: &mut CritRng,
) -> Result<AttackOutcome> {
    let attacking = roster
        .get(attacker)
        .ok_or(GameError::InvalidUnitId(attacker.as_u32()))?;
    let defending = roster
        .get(defender)
        .ok_or(GameError::InvalidUnitId(defender.as_u32()))?;

    let attacker_team = attacking.team();
    let base_damage = attacking.get_damage(defending, defender_tile);

    let critical = rng.roll();
    let applied_damage = (base_damage + critical).max(0);

    let defending = roster
        .get_mut(defender)
        .ok_or(GameError::InvalidUnitId(defender.as_u32()))?;
    defending.hurt(applied_damage);
    let defender_destroyed = !defending.is_active();

    let winner = (defender_destroyed && !roster.enemy_remains(attacker_team))
        .then_some(attacker_team);

    tracing::debug!(
        base = base_damage,
        critical,
        applied = applied_damage,
        destroyed = defender_destroyed,
        "Attack resolved"
    );

    Ok(AttackOutcome {
        base_damage,
        critical,
        applied_damage,
        defender_destroyed,
        winner,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UnitCatalog;
    use crate::geometry::TilePos;
    use crate::grid::TileType;
    use crate::units::{Facing, Unit};

    const PLAINS: TileType = TileType::new("plains", true, 0, 0);

    fn spawn(roster: &mut Roster, name: &str, team: u8, x: i32) -> UnitId {
        let spec = UnitCatalog::new().find(name).unwrap();
        roster.spawn(Unit::new(
            spec,
            Team(team),
            TilePos::new(x, 0),
            Facing::East,
        ))
    }

    #[test]
    fn test_crit_rolls_stay_in_table() {
        let mut rng = CritRng::new(7);
        for _ in 0..1000 {
            let roll = rng.roll();
            assert!((-1..=2).contains(&roll));
        }
    }

    #[test]
    fn test_crit_rolls_roughly_match_distribution() {
        let mut rng = CritRng::new(42);
        let mut counts = [0u32; 4];
        for _ in 0..10_000 {
            match rng.roll() {
                -1 => counts[0] += 1,
                0 => counts[1] += 1,
                1 => counts[2] += 1,
                _ => counts[3] += 1,
            }
        }

        // Coarse sanity bands around 20% / 50% / 20% / 10%.
        assert!((1500..2500).contains(&counts[0]), "{counts:?}");
        assert!((4500..5500).contains(&counts[1]), "{counts:?}");
        assert!((1500..2500).contains(&counts[2]), "{counts:?}");
        assert!((500..1500).contains(&counts[3]), "{counts:?}");
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = CritRng::new(99);
        let mut b = CritRng::new(99);
        for _ in 0..100 {
            assert_eq!(a.roll(), b.roll());
        }
    }

    #[test]
    fn test_attack_applies_clamped_damage() {
        let mut roster = Roster::new();
        let tank = spawn(&mut roster, "Tank", 0, 0);
        let target = spawn(&mut roster, "Jeep", 1, 1);
        let mut rng = CritRng::new(1);

        let outcome =
            resolve_attack(&mut roster, tank, target, Some(&PLAINS), &mut rng).unwrap();

        // Tank 6 damage vs jeep 1 defense.
        assert_eq!(outcome.base_damage, 5);
        assert_eq!(
            outcome.applied_damage,
            (outcome.base_damage + outcome.critical).max(0)
        );
        assert_eq!(
            roster.get(target).unwrap().health(),
            15 - outcome.applied_damage
        );
        assert!(!outcome.defender_destroyed);
        assert_eq!(outcome.winner, None);
    }

    #[test]
    fn test_zero_base_damage_never_goes_negative() {
        let mut roster = Roster::new();
        // Anti-air deals 0 to a tank in a forest (2 dmg vs 5 defense).
        let gun = spawn(&mut roster, "Anti-Air", 0, 0);
        let forest = TileType::new("forest", true, 2, 0);
        let mut rng = CritRng::new(3);

        for i in 0..10 {
            let tank = spawn(&mut roster, "Tank", 1, 1 + i);
            let outcome =
                resolve_attack(&mut roster, gun, tank, Some(&forest), &mut rng).unwrap();
            assert_eq!(outcome.base_damage, 0);
            assert!(outcome.applied_damage >= 0);
            assert!(outcome.applied_damage <= 2);
        }
    }

    #[test]
    fn test_destruction_and_win_detection() {
        let mut roster = Roster::new();
        let sub = spawn(&mut roster, "Water-Warper", 0, 0);
        let ship = spawn(&mut roster, "Battleship", 1, 1);
        let mut rng = CritRng::new(5);

        // 50 damage against 3 defense annihilates a 15-health ship, and
        // it was the only enemy.
        let outcome = resolve_attack(&mut roster, sub, ship, Some(&PLAINS), &mut rng).unwrap();

        assert!(outcome.defender_destroyed);
        assert_eq!(outcome.winner, Some(Team(0)));
        assert!(roster.get(ship).is_none());
    }

    #[test]
    fn test_no_win_while_enemies_remain() {
        let mut roster = Roster::new();
        let sub = spawn(&mut roster, "Water-Warper", 0, 0);
        let ship = spawn(&mut roster, "Battleship", 1, 1);
        let _second_ship = spawn(&mut roster, "Battleship", 1, 2);
        let mut rng = CritRng::new(5);

        let outcome = resolve_attack(&mut roster, sub, ship, Some(&PLAINS), &mut rng).unwrap();

        assert!(outcome.defender_destroyed);
        assert_eq!(outcome.winner, None);
    }

    #[test]
    fn test_resolver_leaves_attacker_flags_alone() {
        let mut roster = Roster::new();
        let tank = spawn(&mut roster, "Tank", 0, 0);
        let target = spawn(&mut roster, "Jeep", 1, 1);
        let mut rng = CritRng::new(8);

        resolve_attack(&mut roster, tank, target, Some(&PLAINS), &mut rng).unwrap();

        // has_attacked is the turn controller's bookkeeping.
        assert!(!roster.get(tank).unwrap().has_attacked());
    }

    #[test]
    fn test_attacking_with_dead_unit_is_an_error() {
        let mut roster = Roster::new();
        let tank = spawn(&mut roster, "Tank", 0, 0);
        let target = spawn(&mut roster, "Jeep", 1, 1);
        roster.get_mut(tank).unwrap().hurt(100);
        let mut rng = CritRng::new(8);

        let result = resolve_attack(&mut roster, tank, target, Some(&PLAINS), &mut rng);
        assert!(matches!(result, Err(GameError::InvalidUnitId(_))));
    }
}
