//! Unit state and the shared rules contract.
//!
//! A [`Unit`] pairs mutable battle state (health, position, turn flags,
//! fuel, pending path) with an immutable [`UnitSpec`] capability record.
//! Every rule query - movement cost, passability, stoppability, attack
//! range, damage, defense - lives here and dispatches on the spec's
//! domain and rule fields rather than on a type hierarchy.
//!
//! The [`Roster`] owns every unit in a battle. Only spawning and death
//! change its membership; code that iterates while combat may deactivate
//! units must snapshot ids first via [`Roster::active_ids`].

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::catalog::{DamageBonus, Domain, HitRule, UnitClass, UnitSpec};
use crate::geometry::{Fixed, MapPos, TilePos};
use crate::grid::TileType;

/// Player team identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Team(pub u8);

/// Identifier of a unit within its roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Raw index value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// Cardinal facing, stored as one of the four sprite angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Angle 0.
    #[default]
    East,
    /// Angle 90.
    North,
    /// Angle 180.
    West,
    /// Angle 270.
    South,
}

impl Facing {
    /// The facing's angle in degrees.
    #[must_use]
    pub const fn angle(self) -> u16 {
        match self {
            Self::East => 0,
            Self::North => 90,
            Self::West => 180,
            Self::South => 270,
        }
    }

    /// Facing for one of the four sprite angles.
    #[must_use]
    pub const fn from_angle(angle: u16) -> Option<Self> {
        match angle {
            0 => Some(Self::East),
            90 => Some(Self::North),
            180 => Some(Self::West),
            270 => Some(Self::South),
            _ => None,
        }
    }

    /// Snap a movement delta to the nearest cardinal facing.
    ///
    /// The vertical axis wins on a tie; returns `None` when both
    /// deltas are zero (no direction to face).
    #[must_use]
    pub fn from_delta(dx: Fixed, dy: Fixed) -> Option<Self> {
        if dx == Fixed::ZERO && dy == Fixed::ZERO {
            return None;
        }

        // Y grows downward, so a positive dy faces south.
        if dx.abs() > dy.abs() {
            Some(if dx > Fixed::ZERO { Self::East } else { Self::West })
        } else {
            Some(if dy > Fixed::ZERO { Self::South } else { Self::North })
        }
    }
}

/// Per-tick movement step, 3/20 of a tile along each axis.
fn frame_step() -> Fixed {
    Fixed::from_num(3) / Fixed::from_num(20)
}

/// One unit on the battlefield.
#[derive(Debug, Clone)]
pub struct Unit {
    /// Immutable capability record.
    spec: &'static UnitSpec,
    /// Owning team.
    team: Team,
    /// Position in tile units; fractional while in transit.
    pos: MapPos,
    /// Current sprite facing.
    facing: Facing,
    /// Remaining health.
    health: i32,
    /// Remaining fuel for air units.
    fuel: Option<i32>,
    /// Whether the unit has spent its move this turn.
    has_moved: bool,
    /// Whether the unit has spent its attack this turn.
    has_attacked: bool,
    /// False once destroyed; an inactive unit is out of the game.
    active: bool,
    /// Whether movement animation is in progress.
    moving: bool,
    /// Remaining waypoints of the path being walked.
    path: VecDeque<TilePos>,
}

impl Unit {
    /// Create a unit of the given type at a tile.
    #[must_use]
    pub fn new(spec: &'static UnitSpec, team: Team, pos: TilePos, facing: Facing) -> Self {
        Self {
            spec,
            team,
            pos: pos.into(),
            facing,
            health: spec.max_health,
            fuel: spec.max_fuel,
            has_moved: false,
            has_attacked: false,
            active: true,
            moving: false,
            path: VecDeque::new(),
        }
    }

    /// The unit's capability record.
    #[must_use]
    pub fn spec(&self) -> &'static UnitSpec {
        self.spec
    }

    /// Concrete type tag.
    #[must_use]
    pub fn class(&self) -> UnitClass {
        self.spec.class
    }

    /// Movement domain tag.
    #[must_use]
    pub fn domain(&self) -> Domain {
        self.spec.domain
    }

    /// Owning team.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Current position, fractional while in transit.
    #[must_use]
    pub const fn pos(&self) -> MapPos {
        self.pos
    }

    /// The tile the unit stands on, `None` mid-animation.
    #[must_use]
    pub fn tile_pos(&self) -> Option<TilePos> {
        self.pos.tile()
    }

    /// Current sprite facing.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.health
    }

    /// Remaining fuel, `None` for non-air units.
    #[must_use]
    pub const fn fuel(&self) -> Option<i32> {
        self.fuel
    }

    /// Whether the unit is still in the game.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Whether movement animation is in progress.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.moving
    }

    /// Whether the unit has spent its move this turn.
    #[must_use]
    pub const fn has_moved(&self) -> bool {
        self.has_moved
    }

    /// Whether the unit has spent its attack this turn.
    #[must_use]
    pub const fn has_attacked(&self) -> bool {
        self.has_attacked
    }

    /// Mark the move action spent for this turn.
    pub fn mark_moved(&mut self) {
        self.has_moved = true;
    }

    /// Mark the attack action spent for this turn.
    pub fn mark_attacked(&mut self) {
        self.has_attacked = true;
    }

    /// Turn the unit toward a movement or attack delta.
    ///
    /// Leaves the facing unchanged when both deltas are zero.
    pub fn face_towards(&mut self, dx: Fixed, dy: Fixed) {
        if let Some(facing) = Facing::from_delta(dx, dy) {
            self.facing = facing;
        }
    }

    /// Cost of moving over a tile, from the type's cost table.
    #[must_use]
    pub fn move_cost(&self, tile: &TileType) -> Fixed {
        self.spec.move_cost(tile)
    }

    /// Current defense, including the tile bonus where it applies.
    ///
    /// Air units fly above the terrain and take no tile bonus.
    #[must_use]
    pub fn get_defense(&self, tile: Option<&TileType>) -> i32 {
        if self.spec.domain == Domain::Air {
            return self.spec.defense;
        }
        self.spec.defense + tile.map_or(0, |t| t.defense_bonus)
    }

    /// Whether this unit is capable of hitting the target at all.
    #[must_use]
    pub fn can_hit(&self, target: &Unit) -> bool {
        match self.spec.can_hit {
            HitRule::Any => true,
            HitRule::ExceptAir => target.domain() != Domain::Air,
            HitRule::WaterOnly => target.domain() == Domain::Water,
        }
    }

    /// Potential attack damage against a target on the given tile.
    ///
    /// Applies the class damage bonus before subtracting the target's
    /// defense; never negative, and 0 whenever the target cannot be hit.
    #[must_use]
    pub fn get_damage(&self, target: &Unit, target_tile: Option<&TileType>) -> i32 {
        if !self.can_hit(target) {
            return 0;
        }

        let attack = match self.spec.damage_bonus {
            DamageBonus::None => self.spec.damage,
            DamageBonus::VsDomain { domain, bonus } => {
                if target.domain() == domain {
                    self.spec.damage + bonus
                } else {
                    self.spec.damage
                }
            }
            DamageBonus::VsClasses { classes, bonus } => {
                if classes.contains(&target.class()) {
                    self.spec.damage + bonus
                } else {
                    self.spec.damage
                }
            }
            DamageBonus::Surface { ground, water } => match target.domain() {
                Domain::Ground => self.spec.damage + ground,
                Domain::Water => self.spec.damage + water,
                // The payload has nothing for other targets.
                _ => return 0,
            },
        };

        (attack - target.get_defense(target_tile)).max(0)
    }

    /// Whether `to_pos` is within attack range when firing from
    /// `from_pos` on `from_tile`.
    ///
    /// The tile's range bonus extends the reach of surface units; air
    /// units ignore it. Bombardment types refuse targets inside their
    /// minimum range.
    #[must_use]
    pub fn is_tile_in_range(
        &self,
        from_tile: &TileType,
        from_pos: TilePos,
        to_pos: TilePos,
    ) -> bool {
        let mut max_range = self.spec.max_attack_range;
        if self.spec.domain != Domain::Air {
            max_range += from_tile.range_bonus;
        }

        let dist = from_pos.manhattan_distance(to_pos);
        self.spec.min_attack_range <= dist && dist <= max_range
    }

    /// Every position in attack range when firing from `from_pos`.
    ///
    /// Brute-force scan of the bounding box around the unit; positions
    /// off the grid may be included and are up to the caller to ignore.
    #[must_use]
    pub fn positions_in_range(&self, from_tile: &TileType, from_pos: TilePos) -> HashSet<TilePos> {
        let r = self.spec.max_attack_range + from_tile.range_bonus;
        let mut tiles = HashSet::new();

        for x in (from_pos.x - r)..=(from_pos.x + r) {
            for y in (from_pos.y - r)..=(from_pos.y + r) {
                let candidate = TilePos::new(x, y);
                if self.is_tile_in_range(from_tile, from_pos, candidate) {
                    tiles.insert(candidate);
                }
            }
        }

        tiles
    }

    /// Whether the unit at `to_pos` can be attacked from `from_pos`.
    ///
    /// Requires an enemy active unit in range that this unit can hit for
    /// nonzero damage.
    #[must_use]
    pub fn is_attackable(
        &self,
        roster: &Roster,
        from_tile: &TileType,
        from_pos: TilePos,
        to_tile: Option<&TileType>,
        to_pos: TilePos,
    ) -> bool {
        if !self.is_tile_in_range(from_tile, from_pos, to_pos) {
            return false;
        }

        let Some(target) = roster.unit_at(to_pos) else {
            return false;
        };

        target.team != self.team
            && self.can_hit(target)
            && self.get_damage(target, to_tile) != 0
    }

    /// Whether the unit can move over `pos`.
    ///
    /// Composes the domain rule, the type's terrain rule, and blocking:
    /// enemy units bar passage to units of their own domain, except that
    /// teleporters slip through everything.
    #[must_use]
    pub fn is_passable(&self, roster: &Roster, tile: Option<&TileType>, pos: TilePos) -> bool {
        // No tile there at all.
        let Some(tile) = tile else {
            return false;
        };

        if !self.spec.allows_terrain(tile) {
            return false;
        }

        match self.spec.domain {
            Domain::Ground => {
                if tile.name == "water" || tile.name == "wall" {
                    return false;
                }
            }
            Domain::Water => {
                if tile.name != "water" {
                    return false;
                }
            }
            Domain::Air | Domain::Teleport => {}
        }

        if self.spec.domain != Domain::Teleport {
            if let Some(other) = roster.unit_at(pos) {
                if other.team != self.team && other.domain() == self.spec.domain {
                    return false;
                }
            }
        }

        true
    }

    /// Whether the unit can end a move on `pos`.
    ///
    /// No unit may stop on an occupied tile. Air units must cover their
    /// minimum move distance unless the destination is docked at a
    /// friendly carrier; teleporters must always cover theirs.
    #[must_use]
    pub fn is_stoppable(&self, roster: &Roster, tile: Option<&TileType>, pos: TilePos) -> bool {
        let dist = self.pos.manhattan_distance(pos.into());
        let min_dist = Fixed::from_num(self.spec.min_move_distance);

        match self.spec.domain {
            Domain::Air => {
                if dist < min_dist && !self.is_docked_at(roster, pos) {
                    return false;
                }
            }
            Domain::Teleport => {
                if dist < min_dist {
                    return false;
                }
            }
            Domain::Ground | Domain::Water => {}
        }

        if roster.unit_at(pos).is_some() {
            return false;
        }

        self.is_passable(roster, tile, pos)
    }

    /// Whether `pos` is adjacent (Manhattan distance <= 1) to a friendly
    /// carrier.
    #[must_use]
    pub fn is_docked_at(&self, roster: &Roster, pos: TilePos) -> bool {
        let pos: MapPos = pos.into();
        roster.active().any(|(_, u)| {
            u.team == self.team
                && u.class() == UnitClass::Carrier
                && u.pos.manhattan_distance(pos) <= Fixed::ONE
        })
    }

    /// Whether the unit is currently docked.
    #[must_use]
    pub fn is_docked(&self, roster: &Roster) -> bool {
        self.tile_pos()
            .is_some_and(|tile| self.is_docked_at(roster, tile))
    }

    /// Whether the owning player may end the turn.
    ///
    /// An air unit that has not moved and is not docked would strand in
    /// the air, so it blocks the turn from ending. Surfaced to the turn
    /// controller; never resolved here.
    #[must_use]
    pub fn can_turn_end(&self, roster: &Roster) -> bool {
        if self.spec.domain == Domain::Air && !self.has_moved && !self.is_docked(roster) {
            return false;
        }
        true
    }

    /// Assign a path for the unit to walk.
    ///
    /// The path comes from the pathfinder and includes the unit's own
    /// tile, which is dropped here. Empty paths are ignored.
    pub fn set_path(&mut self, mut path: Vec<TilePos>) {
        if path.is_empty() {
            return;
        }

        self.moving = true;
        path.remove(0);
        self.path = path.into();
    }

    /// Advance movement animation by one tick.
    ///
    /// Walking units close on the next waypoint by up to 3/20 of a tile
    /// per axis, re-deriving facing from the step; teleporters collapse
    /// the path and jump straight to its final tile.
    pub fn advance(&mut self) {
        if !self.moving {
            return;
        }

        if self.spec.domain == Domain::Teleport {
            if let Some(&destination) = self.path.back() {
                self.pos = destination.into();
            }
            self.path.clear();
            self.moving = false;
            return;
        }

        if self.path.is_empty() {
            self.moving = false;
            return;
        }

        // Consume the waypoint once we sit exactly on it.
        if let Some(&next) = self.path.front() {
            if self.pos.is_at(next) {
                self.path.pop_front();
                if self.path.is_empty() {
                    return;
                }
            }
        }

        let Some(&next) = self.path.front() else {
            return;
        };

        let step = frame_step();
        let dx = (Fixed::from_num(next.x) - self.pos.x).clamp(-step, step);
        let dy = (Fixed::from_num(next.y) - self.pos.y).clamp(-step, step);

        self.face_towards(dx, dy);
        self.pos.x += dx;
        self.pos.y += dy;
    }

    /// Apply damage, deactivating the unit when health runs out.
    pub fn hurt(&mut self, damage: i32) {
        self.health -= damage;

        if self.health <= 0 {
            self.active = false;
            self.moving = false;
            self.path.clear();
        }
    }

    /// Reset per-turn state when the owning team's turn ends.
    ///
    /// `docked` is whether the unit currently sits next to a friendly
    /// carrier (computed by the caller against the roster). Air units
    /// burn one fuel, refuel when docked, and die of exhaustion at zero.
    /// Returns whether the unit is still alive.
    pub fn finish_turn(&mut self, docked: bool) -> bool {
        self.has_moved = false;
        self.has_attacked = false;

        let Some(fuel) = self.fuel else {
            return true;
        };

        if docked {
            self.fuel = self.spec.max_fuel;
            return true;
        }

        let fuel = fuel - 1;
        self.fuel = Some(fuel);
        if fuel <= 0 {
            self.hurt(self.spec.max_health);
            return false;
        }
        true
    }
}

/// The collection of units participating in one battle.
///
/// Owned by the session; passed by reference into every rule query.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    units: Vec<Unit>,
}

impl Roster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit and return its id.
    pub fn spawn(&mut self, unit: Unit) -> UnitId {
        let id = UnitId(self.units.len() as u32);
        self.units.push(unit);
        id
    }

    /// Look up an active unit. Destroyed units are gone for good and
    /// resolve to `None`.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id.0 as usize).filter(|u| u.is_active())
    }

    /// Mutable lookup of an active unit.
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units
            .get_mut(id.0 as usize)
            .filter(|u| u.is_active())
    }

    /// Iterate the active units in spawn order.
    pub fn active(&self) -> impl Iterator<Item = (UnitId, &Unit)> {
        self.units
            .iter()
            .enumerate()
            .filter(|(_, u)| u.is_active())
            .map(|(i, u)| (UnitId(i as u32), u))
    }

    /// Snapshot of active unit ids.
    ///
    /// Take one before any loop whose body can deactivate units, so the
    /// iteration sequence is frozen up front.
    #[must_use]
    pub fn active_ids(&self) -> Vec<UnitId> {
        self.active().map(|(id, _)| id).collect()
    }

    /// The active unit standing exactly on a tile, if any.
    ///
    /// Units in transit occupy no tile until they arrive.
    #[must_use]
    pub fn unit_at(&self, pos: TilePos) -> Option<&Unit> {
        self.active().map(|(_, u)| u).find(|u| u.pos().is_at(pos))
    }

    /// Id of the active unit standing exactly on a tile.
    #[must_use]
    pub fn id_at(&self, pos: TilePos) -> Option<UnitId> {
        self.active()
            .find(|(_, u)| u.pos().is_at(pos))
            .map(|(id, _)| id)
    }

    /// Number of active units.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// Whether any active unit belongs to a team other than `team`.
    #[must_use]
    pub fn enemy_remains(&self, team: Team) -> bool {
        self.active().any(|(_, u)| u.team() != team)
    }
}
