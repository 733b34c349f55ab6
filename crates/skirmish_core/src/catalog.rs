//! Data-driven unit type definitions.
//!
//! The whole capability matrix (movement domain, terrain costs and
//! exclusions, range shape, damage bonuses, hit gates, fuel) is flattened
//! into one [`UnitSpec`] record per concrete type instead of an
//! inheritance chain. Rules code matches on the record's fields; adding a
//! unit type means adding a table entry, not a subclass.
//!
//! [`UnitCatalog`] maps the type names used by level data to specs, the
//! registry the external level parser queries when instantiating units.

use serde::{Deserialize, Serialize};

use crate::geometry::Fixed;
use crate::grid::TileType;

/// Movement/terrain category governing passability and movement style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    /// Moves over land; blocked by water and walls.
    Ground,
    /// Moves through water only.
    Water,
    /// Unrestricted by terrain; constrained by fuel and minimum move
    /// distance instead.
    Air,
    /// Jumps directly to its destination rather than walking the path.
    Teleport,
}

/// Concrete unit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitClass {
    /// Heavy ground armor, constant move rate, no air attacks.
    Tank,
    /// Fast wheeled scout, fastest on roads.
    Jeep,
    /// Pathfinding stress variant of the jeep.
    SuperJeep,
    /// Long-range bombardment with a minimum-range floor.
    Artillery,
    /// Dedicated air defense.
    AntiAir,
    /// Infantry with anti-armor missiles.
    AntiArmour,
    /// Heavy naval gun platform.
    Battleship,
    /// Mobile refueling point for aircraft.
    Carrier,
    /// Fast air superiority jet.
    Fighter,
    /// Ground-attack plane.
    Bomber,
    /// Teleporting land infantry.
    Warper,
    /// Teleporting submarine.
    WaterWarper,
}

/// Class-specific damage bonus applied before the defense subtraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageBonus {
    /// No bonus; base damage applies to every target.
    None,
    /// Flat bonus against one movement domain.
    VsDomain {
        /// Domain the bonus applies against.
        domain: Domain,
        /// Damage added.
        bonus: i32,
    },
    /// Flat bonus against specific unit classes.
    VsClasses {
        /// Classes the bonus applies against.
        classes: &'static [UnitClass],
        /// Damage added.
        bonus: i32,
    },
    /// Separate bonuses against ground and water targets; any other
    /// domain takes no damage at all (the bomber's payload profile).
    Surface {
        /// Damage added against ground targets.
        ground: i32,
        /// Damage added against water targets.
        water: i32,
    },
}

/// Capability gate deciding which targets a unit may hit at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitRule {
    /// Can target any unit.
    Any,
    /// Cannot target air units.
    ExceptAir,
    /// Can only target water units.
    WaterOnly,
}

/// Class-specific terrain restriction layered on top of the domain rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerrainRule {
    /// No restriction beyond the domain rule.
    Unrestricted,
    /// Cannot enter the named terrains.
    Exclude(&'static [&'static str]),
    /// Can only enter the named terrains.
    Only(&'static [&'static str]),
}

/// Immutable per-type capability record.
///
/// Move costs are stored as exactly-representable binary fractions and
/// converted to [`Fixed`] at lookup, so cost arithmetic stays
/// deterministic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitSpec {
    /// Registry key used by level data.
    pub name: &'static str,
    /// Human-readable type name for status displays.
    pub display_name: &'static str,
    /// Concrete type tag.
    pub class: UnitClass,
    /// Movement domain tag.
    pub domain: Domain,
    /// Maximum (and starting) health.
    pub max_health: i32,
    /// Movement budget per turn.
    pub speed: i32,
    /// Base attack damage.
    pub damage: i32,
    /// Base defense subtracted from incoming damage.
    pub defense: i32,
    /// Maximum attack range in Manhattan distance.
    pub max_attack_range: i32,
    /// Minimum attack range floor; 0 means no floor.
    pub min_attack_range: i32,
    /// Damage bonus rule.
    pub damage_bonus: DamageBonus,
    /// Target capability gate.
    pub can_hit: HitRule,
    /// Per-terrain move costs; unlisted terrain costs 1.
    pub move_costs: &'static [(&'static str, f32)],
    /// Class-specific terrain restriction, on top of the domain rule.
    pub terrain_rule: TerrainRule,
    /// Minimum distance a move must cover; 0 means unconstrained.
    pub min_move_distance: i32,
    /// Turns of fuel for air units; `None` for everything else.
    pub max_fuel: Option<i32>,
}

impl UnitSpec {
    /// Cost for this type to move over the given tile.
    ///
    /// Unknown terrain names fall back to the minimum cost of 1; costs
    /// below 1 never occur by table construction.
    #[must_use]
    pub fn move_cost(&self, tile: &TileType) -> Fixed {
        for (terrain, cost) in self.move_costs {
            if *terrain == tile.name {
                return Fixed::from_num(*cost);
            }
        }
        Fixed::ONE
    }

    /// True if this type's terrain rule permits the given tile.
    #[must_use]
    pub fn allows_terrain(&self, tile: &TileType) -> bool {
        match self.terrain_rule {
            TerrainRule::Unrestricted => true,
            TerrainRule::Exclude(names) => !names.contains(&tile.name),
            TerrainRule::Only(names) => names.contains(&tile.name),
        }
    }
}

/// Wheeled vehicles slow down off-road.
const JEEP_COSTS: &[(&str, f32)] = &[
    ("plains", 2.0),
    ("sand", 3.0),
    ("forest", 3.0),
    ("road", 1.0),
    ("mountain", 4.0),
];

/// Towed and tracked gun platforms.
const GUN_PLATFORM_COSTS: &[(&str, f32)] = &[
    ("plains", 1.5),
    ("sand", 1.5),
    ("road", 1.0),
    ("mountain", 3.0),
];

/// Infantry on foot.
const INFANTRY_COSTS: &[(&str, f32)] = &[("mountain", 2.0), ("forest", 1.5), ("sand", 1.5)];

/// The full unit roster, one record per concrete type.
pub const UNIT_SPECS: &[UnitSpec] = &[
    UnitSpec {
        name: "Tank",
        display_name: "Tank",
        class: UnitClass::Tank,
        domain: Domain::Ground,
        max_health: 15,
        speed: 5,
        damage: 6,
        defense: 3,
        max_attack_range: 2,
        min_attack_range: 0,
        damage_bonus: DamageBonus::None,
        can_hit: HitRule::ExceptAir,
        move_costs: &[],
        terrain_rule: TerrainRule::Exclude(&["mountain", "forest"]),
        min_move_distance: 0,
        max_fuel: None,
    },
    UnitSpec {
        name: "Jeep",
        display_name: "Jeep",
        class: UnitClass::Jeep,
        domain: Domain::Ground,
        max_health: 15,
        speed: 10,
        damage: 5,
        defense: 1,
        max_attack_range: 2,
        min_attack_range: 0,
        damage_bonus: DamageBonus::None,
        can_hit: HitRule::Any,
        move_costs: JEEP_COSTS,
        terrain_rule: TerrainRule::Unrestricted,
        min_move_distance: 0,
        max_fuel: None,
    },
    UnitSpec {
        name: "SuperJeep",
        display_name: "Incredibly Fast Jeep",
        class: UnitClass::SuperJeep,
        domain: Domain::Ground,
        max_health: 15,
        speed: 100,
        damage: 5,
        defense: 1,
        max_attack_range: 2,
        min_attack_range: 0,
        damage_bonus: DamageBonus::None,
        can_hit: HitRule::Any,
        move_costs: JEEP_COSTS,
        terrain_rule: TerrainRule::Unrestricted,
        min_move_distance: 0,
        max_fuel: None,
    },
    UnitSpec {
        name: "Artillery",
        display_name: "Artillery",
        class: UnitClass::Artillery,
        domain: Domain::Ground,
        max_health: 15,
        speed: 6,
        damage: 7,
        defense: 1,
        max_attack_range: 5,
        min_attack_range: 3,
        damage_bonus: DamageBonus::None,
        can_hit: HitRule::ExceptAir,
        move_costs: GUN_PLATFORM_COSTS,
        terrain_rule: TerrainRule::Exclude(&["forest"]),
        min_move_distance: 0,
        max_fuel: None,
    },
    UnitSpec {
        name: "Anti-Air",
        display_name: "Anti-Air",
        class: UnitClass::AntiAir,
        domain: Domain::Ground,
        max_health: 15,
        speed: 6,
        damage: 2,
        defense: 2,
        max_attack_range: 4,
        min_attack_range: 0,
        damage_bonus: DamageBonus::VsDomain {
            domain: Domain::Air,
            bonus: 7,
        },
        can_hit: HitRule::Any,
        move_costs: GUN_PLATFORM_COSTS,
        terrain_rule: TerrainRule::Exclude(&["forest"]),
        min_move_distance: 0,
        max_fuel: None,
    },
    UnitSpec {
        name: "Anti-Armour",
        display_name: "Anti-Armour",
        class: UnitClass::AntiArmour,
        domain: Domain::Ground,
        max_health: 15,
        speed: 4,
        damage: 4,
        defense: 0,
        max_attack_range: 3,
        min_attack_range: 0,
        damage_bonus: DamageBonus::VsClasses {
            classes: &[UnitClass::Tank, UnitClass::Battleship],
            bonus: 4,
        },
        can_hit: HitRule::ExceptAir,
        move_costs: INFANTRY_COSTS,
        terrain_rule: TerrainRule::Unrestricted,
        min_move_distance: 0,
        max_fuel: None,
    },
    UnitSpec {
        name: "Battleship",
        display_name: "Battleship",
        class: UnitClass::Battleship,
        domain: Domain::Water,
        max_health: 15,
        speed: 8,
        damage: 6,
        defense: 3,
        max_attack_range: 4,
        min_attack_range: 0,
        damage_bonus: DamageBonus::None,
        can_hit: HitRule::Any,
        move_costs: &[],
        terrain_rule: TerrainRule::Unrestricted,
        min_move_distance: 0,
        max_fuel: None,
    },
    UnitSpec {
        name: "Carrier",
        display_name: "Carrier",
        class: UnitClass::Carrier,
        domain: Domain::Water,
        max_health: 15,
        speed: 4,
        damage: 4,
        defense: 2,
        max_attack_range: 2,
        min_attack_range: 0,
        damage_bonus: DamageBonus::None,
        can_hit: HitRule::Any,
        move_costs: &[],
        terrain_rule: TerrainRule::Unrestricted,
        min_move_distance: 0,
        max_fuel: None,
    },
    UnitSpec {
        name: "Fighter",
        display_name: "Fighter",
        class: UnitClass::Fighter,
        domain: Domain::Air,
        max_health: 15,
        speed: 16,
        damage: 5,
        defense: 3,
        max_attack_range: 4,
        min_attack_range: 0,
        damage_bonus: DamageBonus::VsDomain {
            domain: Domain::Air,
            bonus: 2,
        },
        can_hit: HitRule::Any,
        move_costs: &[],
        terrain_rule: TerrainRule::Unrestricted,
        min_move_distance: 6,
        max_fuel: Some(7),
    },
    UnitSpec {
        name: "Bomber",
        display_name: "Bomber",
        class: UnitClass::Bomber,
        domain: Domain::Air,
        max_health: 15,
        speed: 10,
        damage: 4,
        defense: 4,
        max_attack_range: 1,
        min_attack_range: 0,
        damage_bonus: DamageBonus::Surface {
            ground: 4,
            water: 3,
        },
        can_hit: HitRule::ExceptAir,
        move_costs: &[],
        terrain_rule: TerrainRule::Unrestricted,
        min_move_distance: 4,
        max_fuel: Some(10),
    },
    UnitSpec {
        name: "Warper",
        display_name: "Warper",
        class: UnitClass::Warper,
        domain: Domain::Teleport,
        max_health: 15,
        speed: 10,
        damage: 2,
        defense: 3,
        max_attack_range: 1,
        min_attack_range: 0,
        damage_bonus: DamageBonus::None,
        can_hit: HitRule::Any,
        move_costs: &[],
        terrain_rule: TerrainRule::Exclude(&["water"]),
        min_move_distance: 8,
        max_fuel: None,
    },
    UnitSpec {
        name: "Water-Warper",
        display_name: "Water Warper",
        class: UnitClass::WaterWarper,
        domain: Domain::Teleport,
        max_health: 15,
        speed: 15,
        damage: 50,
        defense: 3,
        max_attack_range: 1,
        min_attack_range: 0,
        damage_bonus: DamageBonus::None,
        can_hit: HitRule::WaterOnly,
        move_costs: &[],
        terrain_rule: TerrainRule::Only(&["water"]),
        min_move_distance: 13,
        max_fuel: None,
    },
];

/// Registry mapping type names from level data to unit specs.
///
/// Populated once from [`UNIT_SPECS`]; queried by the external level
/// parser when instantiating units.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitCatalog;

impl UnitCatalog {
    /// Create the registry over the built-in roster.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Find a spec by its registry name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&'static UnitSpec> {
        UNIT_SPECS.iter().find(|spec| spec.name == name)
    }

    /// Spec for a concrete class.
    #[must_use]
    pub fn spec(&self, class: UnitClass) -> &'static UnitSpec {
        // Every class has exactly one entry by construction.
        UNIT_SPECS
            .iter()
            .find(|spec| spec.class == class)
            .unwrap_or(&UNIT_SPECS[0])
    }

    /// All registered specs.
    pub fn all(&self) -> impl Iterator<Item = &'static UnitSpec> {
        UNIT_SPECS.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TileType;

    #[test]
    fn test_every_class_has_exactly_one_spec() {
        for spec in UNIT_SPECS {
            let matching = UNIT_SPECS.iter().filter(|s| s.class == spec.class).count();
            assert_eq!(matching, 1, "duplicate spec for {:?}", spec.class);
        }
        assert_eq!(UNIT_SPECS.len(), 12);
    }

    #[test]
    fn test_find_by_name() {
        let catalog = UnitCatalog::new();
        assert_eq!(catalog.find("Tank").unwrap().class, UnitClass::Tank);
        assert_eq!(
            catalog.find("Anti-Armour").unwrap().class,
            UnitClass::AntiArmour
        );
        assert_eq!(
            catalog.find("Water-Warper").unwrap().class,
            UnitClass::WaterWarper
        );
        assert!(catalog.find("Zeppelin").is_none());
    }

    #[test]
    fn test_spec_by_class_matches_find() {
        let catalog = UnitCatalog::new();
        for spec in catalog.all() {
            assert_eq!(catalog.spec(spec.class).name, spec.name);
        }
    }

    #[test]
    fn test_move_costs_default_to_one() {
        let catalog = UnitCatalog::new();
        let tank = catalog.spec(UnitClass::Tank);
        let plains = TileType::new("plains", true, 0, 0);
        let swamp = TileType::new("swamp", true, 0, 0);

        // No table entry: minimum cost, including for unknown terrain.
        assert_eq!(tank.move_cost(&plains), Fixed::ONE);
        assert_eq!(tank.move_cost(&swamp), Fixed::ONE);
    }

    #[test]
    fn test_jeep_is_fastest_on_roads() {
        let catalog = UnitCatalog::new();
        let jeep = catalog.spec(UnitClass::Jeep);

        let road = TileType::new("road", true, 0, 0);
        let mountain = TileType::new("mountain", false, 1, 2);
        assert_eq!(jeep.move_cost(&road), Fixed::ONE);
        assert_eq!(jeep.move_cost(&mountain), Fixed::from_num(4));
    }

    #[test]
    fn test_fractional_costs_are_exact() {
        let catalog = UnitCatalog::new();
        let artillery = catalog.spec(UnitClass::Artillery);
        let plains = TileType::new("plains", true, 0, 0);

        assert_eq!(
            artillery.move_cost(&plains),
            Fixed::from_num(3) / Fixed::from_num(2)
        );
    }

    #[test]
    fn test_all_costs_at_least_one() {
        // The pathfinding contract requires costs >= 1.
        for spec in UNIT_SPECS {
            for (terrain, cost) in spec.move_costs {
                assert!(
                    *cost >= 1.0,
                    "{} has cost {cost} on {terrain}",
                    spec.name
                );
            }
        }
    }

    #[test]
    fn test_air_units_carry_fuel_and_nothing_else_does() {
        for spec in UNIT_SPECS {
            match spec.domain {
                Domain::Air => assert!(spec.max_fuel.is_some(), "{} needs fuel", spec.name),
                _ => assert!(spec.max_fuel.is_none(), "{} must not have fuel", spec.name),
            }
        }
    }

    #[test]
    fn test_terrain_rules() {
        let catalog = UnitCatalog::new();
        let forest = TileType::new("forest", true, 2, 0);
        let road = TileType::new("road", true, 0, 0);
        let water = TileType::new("water", false, 0, 0);

        let tank = catalog.spec(UnitClass::Tank);
        assert!(!tank.allows_terrain(&forest));
        assert!(tank.allows_terrain(&road));

        let warper = catalog.spec(UnitClass::Warper);
        assert!(!warper.allows_terrain(&water));
        assert!(warper.allows_terrain(&forest));

        let sub = catalog.spec(UnitClass::WaterWarper);
        assert!(sub.allows_terrain(&water));
        assert!(!sub.allows_terrain(&road));
    }

    #[test]
    fn test_min_range_only_on_artillery() {
        for spec in UNIT_SPECS {
            if spec.class == UnitClass::Artillery {
                assert_eq!(spec.min_attack_range, 3);
            } else {
                assert_eq!(spec.min_attack_range, 0, "{}", spec.name);
            }
        }
    }
}
