//! Battle session: the owner of all live game state.
//!
//! One [`Session`] holds the grid, the roster, the turn counter, and
//! the critical-hit generator for the lifetime of one battle, and
//! exposes the operations the turn/UI controller drives: building move
//! and attack menus, executing a confirmed move or attack, advancing
//! movement animation, and ending turns. Nothing here renders or reads
//! input; callers observe state and draw it however they like.

use std::collections::HashSet;

use crate::analysis::destroy_probability_curve;
use crate::catalog::UnitCatalog;
use crate::combat::{resolve_attack, AttackOutcome, CritRng};
use crate::error::{GameError, Result};
use crate::geometry::{Fixed, TilePos};
use crate::grid::{TileCatalog, TileGrid, TileType};
use crate::pathfinding::{find_path, reachable_tiles};
use crate::scenario::ScenarioData;
use crate::units::{Facing, Roster, Team, Unit, UnitId};

/// A running battle.
#[derive(Debug)]
pub struct Session {
    /// The battlefield.
    grid: TileGrid,
    /// Every unit in the battle.
    roster: Roster,
    /// Unit type registry for spawning.
    catalog: UnitCatalog,
    /// Number of teams taking turns.
    num_teams: u8,
    /// Completed turn count; team and day derive from it.
    turn: u32,
    /// Winning team, once only one side remains.
    winner: Option<Team>,
    /// Critical-hit generator.
    rng: CritRng,
}

impl Session {
    /// Start a battle on the given grid.
    ///
    /// # Panics
    ///
    /// Panics if `num_teams` is zero.
    #[must_use]
    pub fn new(grid: TileGrid, num_teams: u8, seed: u64) -> Self {
        assert!(num_teams > 0, "Session needs at least one team");
        Self {
            grid,
            roster: Roster::new(),
            catalog: UnitCatalog::new(),
            num_teams,
            turn: 0,
            winner: None,
            rng: CritRng::new(seed),
        }
    }

    /// Build a battle from parsed scenario data.
    ///
    /// # Errors
    ///
    /// Fails when the grid data is inconsistent, a unit type name is
    /// unknown, or a placement is invalid.
    pub fn from_scenario(data: &ScenarioData) -> Result<Self> {
        if data.teams == 0 {
            return Err(GameError::InvalidState(
                "Scenario must have at least one team".into(),
            ));
        }

        let grid = TileGrid::from_cells(
            data.width,
            data.height,
            data.tiles.clone(),
            TileCatalog::default(),
        )?;

        let mut session = Self::new(grid, data.teams, data.seed);
        for placement in &data.units {
            session.spawn_unit(
                &placement.kind,
                Team(placement.team),
                TilePos::new(placement.x, placement.y),
                placement.angle,
            )?;
        }

        Ok(session)
    }

    /// The battlefield.
    #[must_use]
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Mutable battlefield access, mainly for highlight layers.
    pub fn grid_mut(&mut self) -> &mut TileGrid {
        &mut self.grid
    }

    /// The unit roster.
    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// The team whose turn it is.
    #[must_use]
    pub fn current_team(&self) -> Team {
        Team((self.turn % u32::from(self.num_teams)) as u8)
    }

    /// The current day; one day is one full round of team turns.
    #[must_use]
    pub fn day(&self) -> u32 {
        self.turn / u32::from(self.num_teams) + 1
    }

    /// The winning team, once the battle is decided.
    #[must_use]
    pub const fn winner(&self) -> Option<Team> {
        self.winner
    }

    /// Whether the battle is over.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Instantiate a unit by type name.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownUnitType`] for an unregistered name,
    /// or [`GameError::InvalidState`] for a bad angle or off-grid
    /// position; scenario loading aborts on the first failure.
    pub fn spawn_unit(
        &mut self,
        kind: &str,
        team: Team,
        pos: TilePos,
        angle: u16,
    ) -> Result<UnitId> {
        let spec = self
            .catalog
            .find(kind)
            .ok_or_else(|| GameError::UnknownUnitType(kind.to_string()))?;

        let facing = Facing::from_angle(angle).ok_or_else(|| {
            GameError::InvalidState(format!("Invalid facing angle {angle} for {kind}"))
        })?;

        if !self.grid.in_bounds(pos) {
            return Err(GameError::InvalidState(format!(
                "Placement for {kind} at ({}, {}) is off the grid",
                pos.x, pos.y
            )));
        }

        Ok(self.roster.spawn(Unit::new(spec, team, pos, facing)))
    }

    /// Every tile the unit can move to and stop on this turn.
    ///
    /// Reachability within the unit's speed, filtered down to tiles the
    /// unit may actually end its move on.
    ///
    /// # Errors
    ///
    /// Fails if the unit is missing or still in transit.
    pub fn movable_tiles(&self, id: UnitId) -> Result<HashSet<TilePos>> {
        let (unit, start) = self.unit_at_rest(id)?;

        let reachable = reachable_tiles(
            &self.grid,
            start,
            Fixed::from_num(unit.spec().speed),
            |p| self.grid.tile_at(p).map_or(Fixed::ONE, |t| unit.move_cost(t)),
            |p| unit.is_passable(&self.roster, self.grid.tile_at(p), p),
        );

        Ok(reachable
            .into_iter()
            .filter(|p| unit.is_stoppable(&self.roster, self.grid.tile_at(*p), *p))
            .collect())
    }

    /// Every tile the unit can attack from where it stands.
    ///
    /// # Errors
    ///
    /// Fails if the unit is missing or still in transit.
    pub fn attackable_tiles(&self, id: UnitId) -> Result<HashSet<TilePos>> {
        let (unit, from_pos) = self.unit_at_rest(id)?;
        let from_tile = self.tile_under(from_pos)?;

        Ok(unit
            .positions_in_range(from_tile, from_pos)
            .into_iter()
            .filter(|p| {
                unit.is_attackable(
                    &self.roster,
                    from_tile,
                    from_pos,
                    self.grid.tile_at(*p),
                    *p,
                )
            })
            .collect())
    }

    /// Order a unit to move to a destination tile.
    ///
    /// Pathfinds with the unit's own cost and passability rules and
    /// starts the movement animation; [`Session::tick`] walks it there.
    ///
    /// # Errors
    ///
    /// Fails if the unit is missing, in transit, has already moved this
    /// turn, or the destination is not a legal stop.
    pub fn move_unit(&mut self, id: UnitId, destination: TilePos) -> Result<()> {
        let (unit, start) = self.unit_at_rest(id)?;
        if unit.has_moved() {
            return Err(GameError::InvalidState(
                "Unit has already moved this turn".into(),
            ));
        }

        if !self.movable_tiles(id)?.contains(&destination) {
            return Err(GameError::InvalidState(format!(
                "({}, {}) is not a reachable stop",
                destination.x, destination.y
            )));
        }

        let unit = self.roster.get(id).ok_or(GameError::InvalidUnitId(id.as_u32()))?;
        let path = find_path(
            &self.grid,
            start,
            destination,
            |p| self.grid.tile_at(p).map_or(Fixed::ONE, |t| unit.move_cost(t)),
            |p| unit.is_passable(&self.roster, self.grid.tile_at(p), p),
        );

        tracing::debug!(
            unit = id.as_u32(),
            from = ?(start.x, start.y),
            to = ?(destination.x, destination.y),
            steps = path.len(),
            "Move ordered"
        );

        let unit = self
            .roster
            .get_mut(id)
            .ok_or(GameError::InvalidUnitId(id.as_u32()))?;
        unit.set_path(path);
        unit.mark_moved();
        Ok(())
    }

    /// Execute a confirmed attack on the unit standing at `target_pos`.
    ///
    /// Faces the attacker toward its victim, spends its attack for the
    /// turn, and resolves damage. A destruction that leaves the
    /// attacker's team alone on the field decides the battle.
    ///
    /// # Errors
    ///
    /// Fails if the attacker is missing, in transit, has already
    /// attacked, or the target tile is not attackable.
    pub fn attack(&mut self, id: UnitId, target_pos: TilePos) -> Result<AttackOutcome> {
        let (unit, from_pos) = self.unit_at_rest(id)?;
        if unit.has_attacked() {
            return Err(GameError::InvalidState(
                "Unit has already attacked this turn".into(),
            ));
        }

        let from_tile = self.tile_under(from_pos)?;
        if !unit.is_attackable(
            &self.roster,
            from_tile,
            from_pos,
            self.grid.tile_at(target_pos),
            target_pos,
        ) {
            return Err(GameError::InvalidState(format!(
                "({}, {}) is not attackable",
                target_pos.x, target_pos.y
            )));
        }

        let defender = self
            .roster
            .id_at(target_pos)
            .ok_or_else(|| GameError::InvalidState("No unit at target".into()))?;

        let attacker = self
            .roster
            .get_mut(id)
            .ok_or(GameError::InvalidUnitId(id.as_u32()))?;
        attacker.face_towards(
            Fixed::from_num(target_pos.x - from_pos.x),
            Fixed::from_num(target_pos.y - from_pos.y),
        );
        attacker.mark_attacked();

        let outcome = resolve_attack(
            &mut self.roster,
            id,
            defender,
            self.grid.tile_at(target_pos),
            &mut self.rng,
        )?;

        if let Some(team) = outcome.winner {
            self.winner = Some(team);
        }

        Ok(outcome)
    }

    /// Predicted destruction probabilities for a hover target.
    ///
    /// Entry `k` is the chance the unit at `target_pos` dies within `k`
    /// attack-turns from the attacker where it stands now.
    ///
    /// # Errors
    ///
    /// Fails if either unit is missing or the attacker is in transit.
    pub fn destroy_probabilities(
        &self,
        id: UnitId,
        target_pos: TilePos,
        turns: u32,
    ) -> Result<Vec<f64>> {
        let (unit, _) = self.unit_at_rest(id)?;
        let target = self
            .roster
            .unit_at(target_pos)
            .ok_or_else(|| GameError::InvalidState("No unit at target".into()))?;

        Ok(destroy_probability_curve(
            unit,
            target,
            self.grid.tile_at(target_pos),
            turns,
        ))
    }

    /// The first unit of the current team refusing to end the turn,
    /// typically an aircraft that would strand in the air.
    ///
    /// The controller surfaces this to the player (e.g. by selecting
    /// the unit) rather than forcing the turn through.
    #[must_use]
    pub fn turn_blocker(&self) -> Option<UnitId> {
        let team = self.current_team();
        self.roster
            .active()
            .find(|(_, u)| u.team() == team && !u.can_turn_end(&self.roster))
            .map(|(id, _)| id)
    }

    /// Whether the current team may end its turn.
    #[must_use]
    pub fn can_end_turn(&self) -> bool {
        self.turn_blocker().is_none()
    }

    /// End the current team's turn.
    ///
    /// Resets every current-team unit's action flags and runs its
    /// end-of-turn hooks (fuel burn, refuel, exhaustion deaths), then
    /// passes play to the next team. Returns false without side effects
    /// when a unit blocks the turn from ending.
    pub fn end_turn(&mut self) -> bool {
        if !self.can_end_turn() {
            return false;
        }

        let team = self.current_team();

        // Snapshot first: exhaustion deaths mutate the roster mid-loop.
        for id in self.roster.active_ids() {
            let Some(unit) = self.roster.get(id) else {
                continue;
            };
            if unit.team() != team {
                continue;
            }

            let docked = unit.is_docked(&self.roster);
            if let Some(unit) = self.roster.get_mut(id) {
                unit.finish_turn(docked);
            }
        }

        self.turn += 1;
        tracing::debug!(
            turn = self.turn,
            team = self.current_team().0,
            day = self.day(),
            "Turn ended"
        );
        true
    }

    /// Advance movement animation by one tick for every unit.
    pub fn tick(&mut self) {
        for id in self.roster.active_ids() {
            if let Some(unit) = self.roster.get_mut(id) {
                unit.advance();
            }
        }
    }

    /// An active unit together with the tile it stands on; errors while
    /// the unit is mid-animation.
    fn unit_at_rest(&self, id: UnitId) -> Result<(&Unit, TilePos)> {
        let unit = self
            .roster
            .get(id)
            .ok_or(GameError::InvalidUnitId(id.as_u32()))?;
        let pos = unit.tile_pos().ok_or_else(|| {
            GameError::InvalidState("Unit is in transit".into())
        })?;
        Ok((unit, pos))
    }

    /// The tile under a unit; every resting unit stands on one.
    fn tile_under(&self, pos: TilePos) -> Result<&TileType> {
        self.grid.tile_at(pos).ok_or_else(|| {
            GameError::InvalidState(format!("No tile at ({}, {})", pos.x, pos.y))
        })
    }
}
