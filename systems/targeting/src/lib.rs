#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves deterministic targets from the previous snapshot.

use lane_clash_core::{Entity, EntityId, TargetingClass};

/// Configuration parameters required to construct the targeting system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    sight_bonus: f32,
    tower_snap_radius: f32,
}

impl Config {
    /// Creates a configuration from the sight bonus and tower snap radius.
    ///
    /// Mobile attackers notice non-tower enemies up to `range + sight_bonus`
    /// away. While locked on a crown tower they drop it for any non-tower
    /// threat within `tower_snap_radius`.
    #[must_use]
    pub const fn new(sight_bonus: f32, tower_snap_radius: f32) -> Self {
        Self {
            sight_bonus,
            tower_snap_radius,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(20.0, 10.0)
    }
}

/// Targeting system choosing one enemy per attacker.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Targeting {
    config: Config,
}

impl Targeting {
    /// Creates a targeting system using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Resolves the target of `attacker` against `snapshot`.
    ///
    /// `snapshot` holds the entities of the previous generation sorted by
    /// identifier. A still-valid previous target is kept unless a tower lock
    /// can snap to a nearby threat. Otherwise the nearest valid enemy wins,
    /// ties broken by identifier, and crown towers remain the fallback for
    /// mobile attackers at any distance.
    #[must_use]
    pub fn acquire(&self, attacker: &Entity, snapshot: &[Entity]) -> Option<EntityId> {
        if !attacker.stats.can_attack() || attacker.dormant || attacker.is_spell() {
            return None;
        }

        let stationary = is_stationary(attacker);

        if let Some(previous) = attacker.target.and_then(|id| find(snapshot, id)) {
            if self.is_valid(attacker, previous) && (!stationary || attacker.in_range_of(previous)) {
                if previous.is_tower() && !stationary && snaps_off_towers(attacker) {
                    if let Some(threat) = self.nearest(attacker, snapshot, |candidate| {
                        !candidate.is_tower()
                            && attacker.edge_distance(candidate) <= self.config.tower_snap_radius
                    }) {
                        return Some(threat);
                    }
                }
                return Some(previous.id);
            }
        }

        let reach = if stationary {
            attacker.stats.range
        } else {
            attacker.stats.range + self.config.sight_bonus
        };

        let threat = self.nearest(attacker, snapshot, |candidate| {
            !candidate.is_tower() && attacker.edge_distance(candidate) <= reach
        });
        if threat.is_some() || !attacker.stats.targeting.hits_buildings() {
            return threat;
        }

        self.nearest(attacker, snapshot, |candidate| {
            candidate.is_tower() && (!stationary || attacker.in_range_of(candidate))
        })
    }

    fn is_valid(&self, attacker: &Entity, candidate: &Entity) -> bool {
        candidate.side != attacker.side
            && candidate.is_targetable()
            && attacker
                .stats
                .targeting
                .can_target(candidate.stats.movement, candidate.is_structure())
    }

    fn nearest<F>(&self, attacker: &Entity, snapshot: &[Entity], filter: F) -> Option<EntityId>
    where
        F: Fn(&Entity) -> bool,
    {
        let mut best: Option<BestCandidate> = None;
        for candidate in snapshot {
            if !self.is_valid(attacker, candidate) || !filter(candidate) {
                continue;
            }
            let current = BestCandidate {
                distance_sq: attacker.position.distance_squared(candidate.position),
                id: candidate.id,
            };
            match &mut best {
                Some(existing) => {
                    if current.precedes(existing) {
                        *existing = current;
                    }
                }
                None => best = Some(current),
            }
        }
        best.map(|candidate| candidate.id)
    }
}

/// Reports whether an attacker never moves toward its target.
#[must_use]
pub fn is_stationary(entity: &Entity) -> bool {
    entity.is_structure() || entity.stats.speed <= 0.0
}

fn snaps_off_towers(attacker: &Entity) -> bool {
    attacker.stats.targeting != TargetingClass::Building
}

/// Looks up an entity in a snapshot sorted by identifier.
#[must_use]
pub fn find(snapshot: &[Entity], id: EntityId) -> Option<&Entity> {
    snapshot
        .binary_search_by_key(&id, |entity| entity.id)
        .ok()
        .map(|index| &snapshot[index])
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance_sq: f32,
    id: EntityId,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }

        self.id < other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use lane_clash_core::{CardId, Catalog, Side};

    fn spawn(card: &str, id: u32, side: Side, position: (f32, f32)) -> Entity {
        let catalog = Catalog::standard();
        let definition = catalog.get(&CardId::new(card)).expect("card exists");
        let mut entity = Entity::new(
            EntityId::new(id),
            definition,
            definition.stats.clone(),
            1,
            side,
            Vec2::new(position.0, position.1),
        );
        entity.timers.deploy = std::time::Duration::ZERO;
        entity.dormant = false;
        entity
    }

    fn sorted(mut entities: Vec<Entity>) -> Vec<Entity> {
        entities.sort_by_key(|entity| entity.id);
        entities
    }

    #[test]
    fn nearest_enemy_within_sight_is_chosen() {
        let knight = spawn("knight", 1, Side::Player, (50.0, 60.0));
        let snapshot = sorted(vec![
            knight.clone(),
            spawn("knight", 2, Side::Opponent, (50.0, 50.0)),
            spawn("knight", 3, Side::Opponent, (50.0, 45.0)),
            spawn("princess-tower", 4, Side::Opponent, (20.0, 20.0)),
        ]);
        assert_eq!(
            Targeting::default().acquire(&knight, &snapshot),
            Some(EntityId::new(2))
        );
    }

    #[test]
    fn smaller_id_wins_ties() {
        let knight = spawn("knight", 1, Side::Player, (50.0, 60.0));
        let snapshot = sorted(vec![
            knight.clone(),
            spawn("knight", 9, Side::Opponent, (55.0, 60.0)),
            spawn("knight", 4, Side::Opponent, (45.0, 60.0)),
        ]);
        assert_eq!(
            Targeting::default().acquire(&knight, &snapshot),
            Some(EntityId::new(4))
        );
    }

    #[test]
    fn towers_are_the_fallback_at_any_distance() {
        let knight = spawn("knight", 1, Side::Player, (50.0, 90.0));
        let snapshot = sorted(vec![
            knight.clone(),
            spawn("princess-tower", 2, Side::Opponent, (20.0, 20.0)),
            spawn("princess-tower", 3, Side::Opponent, (80.0, 20.0)),
            spawn("knight", 4, Side::Opponent, (50.0, 5.0)),
        ]);
        assert_eq!(
            Targeting::default().acquire(&knight, &snapshot),
            Some(EntityId::new(2))
        );
    }

    #[test]
    fn air_only_attackers_never_fall_back_to_towers() {
        let mut hunter = spawn("archers", 1, Side::Player, (20.0, 40.0));
        hunter.stats.targeting = lane_clash_core::TargetingClass::Air;
        let snapshot = sorted(vec![
            hunter.clone(),
            spawn("princess-tower", 2, Side::Opponent, (20.0, 20.0)),
            spawn("knight", 3, Side::Opponent, (22.0, 38.0)),
        ]);
        assert_eq!(Targeting::default().acquire(&hunter, &snapshot), None);

        let snapshot = sorted(vec![
            hunter.clone(),
            spawn("princess-tower", 2, Side::Opponent, (20.0, 20.0)),
            spawn("minions", 3, Side::Opponent, (22.0, 30.0)),
        ]);
        assert_eq!(
            Targeting::default().acquire(&hunter, &snapshot),
            Some(EntityId::new(3))
        );
    }

    #[test]
    fn ground_attackers_ignore_air_units() {
        let knight = spawn("knight", 1, Side::Player, (50.0, 60.0));
        let snapshot = sorted(vec![
            knight.clone(),
            spawn("minions", 2, Side::Opponent, (50.0, 57.0)),
            spawn("princess-tower", 3, Side::Opponent, (80.0, 20.0)),
        ]);
        assert_eq!(
            Targeting::default().acquire(&knight, &snapshot),
            Some(EntityId::new(3))
        );
    }

    #[test]
    fn building_targeters_ignore_troops() {
        let giant = spawn("giant", 1, Side::Player, (50.0, 60.0));
        let snapshot = sorted(vec![
            giant.clone(),
            spawn("knight", 2, Side::Opponent, (50.0, 56.0)),
            spawn("cannon", 3, Side::Opponent, (60.0, 40.0)),
            spawn("princess-tower", 4, Side::Opponent, (80.0, 20.0)),
        ]);
        assert_eq!(
            Targeting::default().acquire(&giant, &snapshot),
            Some(EntityId::new(3))
        );
    }

    #[test]
    fn tower_locks_snap_to_nearby_threats() {
        let mut knight = spawn("knight", 1, Side::Player, (20.0, 30.0));
        knight.target = Some(EntityId::new(2));
        let snapshot = sorted(vec![
            knight.clone(),
            spawn("princess-tower", 2, Side::Opponent, (20.0, 20.0)),
            spawn("skeletons", 3, Side::Opponent, (24.0, 30.0)),
        ]);
        assert_eq!(
            Targeting::default().acquire(&knight, &snapshot),
            Some(EntityId::new(3))
        );

        let mut giant = spawn("giant", 1, Side::Player, (20.0, 30.0));
        giant.target = Some(EntityId::new(2));
        assert_eq!(
            Targeting::default().acquire(&giant, &snapshot),
            Some(EntityId::new(2))
        );
    }

    #[test]
    fn valid_previous_targets_are_kept() {
        let mut knight = spawn("knight", 1, Side::Player, (50.0, 60.0));
        knight.target = Some(EntityId::new(3));
        let snapshot = sorted(vec![
            knight.clone(),
            spawn("knight", 2, Side::Opponent, (50.0, 57.0)),
            spawn("knight", 3, Side::Opponent, (50.0, 50.0)),
        ]);
        assert_eq!(
            Targeting::default().acquire(&knight, &snapshot),
            Some(EntityId::new(3))
        );
    }

    #[test]
    fn vanished_targets_are_replaced() {
        let mut knight = spawn("knight", 1, Side::Player, (50.0, 60.0));
        knight.target = Some(EntityId::new(99));
        let snapshot = sorted(vec![
            knight.clone(),
            spawn("knight", 2, Side::Opponent, (50.0, 57.0)),
        ]);
        assert_eq!(
            Targeting::default().acquire(&knight, &snapshot),
            Some(EntityId::new(2))
        );
    }

    #[test]
    fn stationary_attackers_only_fire_within_range() {
        let cannon = spawn("cannon", 1, Side::Player, (50.0, 70.0));
        let far = sorted(vec![cannon.clone(), spawn("knight", 2, Side::Opponent, (50.0, 30.0))]);
        assert_eq!(Targeting::default().acquire(&cannon, &far), None);

        let near = sorted(vec![cannon.clone(), spawn("knight", 2, Side::Opponent, (50.0, 55.0))]);
        assert_eq!(
            Targeting::default().acquire(&cannon, &near),
            Some(EntityId::new(2))
        );

        let mut locked = cannon;
        locked.target = Some(EntityId::new(2));
        assert_eq!(Targeting::default().acquire(&locked, &far), None);
    }

    #[test]
    fn invisible_and_dead_enemies_are_skipped() {
        let knight = spawn("knight", 1, Side::Player, (50.0, 60.0));
        let mut ghost = spawn("royal-ghost", 2, Side::Opponent, (50.0, 57.0));
        ghost.invisible = true;
        let mut dead = spawn("knight", 3, Side::Opponent, (50.0, 58.0));
        dead.hp = 0.0;
        let snapshot = sorted(vec![knight.clone(), ghost, dead]);
        assert_eq!(Targeting::default().acquire(&knight, &snapshot), None);
    }

    #[test]
    fn dormant_kings_and_non_attackers_pick_nothing() {
        let mut king = spawn("king-tower", 1, Side::Player, (50.0, 92.0));
        king.dormant = true;
        let hut = spawn("goblin-hut", 2, Side::Player, (50.0, 75.0));
        let snapshot = sorted(vec![
            king.clone(),
            hut.clone(),
            spawn("knight", 3, Side::Opponent, (50.0, 80.0)),
        ]);
        assert_eq!(Targeting::default().acquire(&king, &snapshot), None);
        assert_eq!(Targeting::default().acquire(&hut, &snapshot), None);
    }
}
