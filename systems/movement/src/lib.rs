#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that steers units and separates overlaps.
//!
//! Movement reads the previous snapshot only. A unit heads for its target, or
//! for its lane baseline when it has none; ground units steer around
//! structures and funnel onto a bridge before crossing the river. Collision
//! separation runs once over the next generation after every unit has moved.

use std::time::Duration;

use glam::Vec2;
use lane_clash_core::{arena, Entity, MovementClass, TowerRole, RAGE_MULTIPLIER};

/// Configuration parameters required to construct the movement system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    avoidance_margin: f32,
    avoidance_weight: f32,
    charge_buildup: Duration,
    charge_speed_multiplier: f32,
}

impl Config {
    /// Creates a configuration from the steering and charge knobs.
    #[must_use]
    pub const fn new(
        avoidance_margin: f32,
        avoidance_weight: f32,
        charge_buildup: Duration,
        charge_speed_multiplier: f32,
    ) -> Self {
        Self {
            avoidance_margin,
            avoidance_weight,
            charge_buildup,
            charge_speed_multiplier,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(3.0, 1.5, Duration::from_secs(2), 2.0)
    }
}

/// Position and charge state of a unit after one movement step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    /// New position.
    pub position: Vec2,
    /// Whether the unit moved at all.
    pub moved: bool,
    /// Updated charge buildup.
    pub charge_buildup: Duration,
    /// Whether the unit is charging after the step.
    pub charging: bool,
}

/// Pure movement system.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Movement {
    config: Config,
}

impl Movement {
    /// Creates a movement system using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Point a unit walks toward when it has no target: the enemy princess
    /// tower slot of its own lane.
    #[must_use]
    pub fn lane_baseline(&self, mover: &Entity) -> Vec2 {
        let lane = usize::from(mover.position.x >= arena::MID_X);
        arena::tower_slot(mover.side.other(), TowerRole::Princess, lane)
    }

    /// Unit vector the unit travels along this tick, or zero when it stays put.
    #[must_use]
    pub fn heading(&self, mover: &Entity, destination: Vec2, snapshot: &[Entity]) -> Vec2 {
        let position = mover.position;
        if mover.stats.movement == MovementClass::Ground && self.needs_funnel(position, destination) {
            let bank = if position.y > arena::MID_Y {
                arena::RIVER_BOTTOM + 1.0
            } else {
                arena::RIVER_TOP - 1.0
            };
            let entrance = Vec2::new(arena::nearest_bridge_x(position.x), bank);
            return (entrance - position).normalize_or_zero();
        }

        let direct = (destination - position).normalize_or_zero();
        if direct == Vec2::ZERO || mover.stats.movement == MovementClass::Air {
            return direct;
        }

        let mut steering = direct;
        for obstacle in snapshot {
            if obstacle.id == mover.id
                || !obstacle.is_structure()
                || !obstacle.is_alive()
                || obstacle.position == destination
            {
                continue;
            }
            let reach = mover.stats.hitbox + obstacle.stats.hitbox + self.config.avoidance_margin;
            let offset = position - obstacle.position;
            let distance = offset.length();
            if distance >= reach || distance <= f32::EPSILON {
                continue;
            }
            let strength = self.config.avoidance_weight * (1.0 - distance / reach);
            steering += offset / distance * strength;
        }
        steering.normalize_or_zero()
    }

    /// Advances a unit toward `destination` by one tick.
    ///
    /// `stop_distance` is how close the unit's centre must come to the
    /// destination before it stops; the step never overshoots it.
    #[must_use]
    pub fn step(
        &self,
        mover: &Entity,
        destination: Vec2,
        stop_distance: f32,
        snapshot: &[Entity],
        dt: Duration,
    ) -> Step {
        let idle = Step {
            position: mover.position,
            moved: false,
            charge_buildup: Duration::ZERO,
            charging: false,
        };
        if mover.stats.speed <= 0.0 || mover.is_rooted() || mover.is_structure() {
            return idle;
        }

        let remaining = mover.position.distance(destination) - stop_distance;
        if remaining <= 0.0 {
            return idle;
        }

        let heading = self.heading(mover, destination, snapshot);
        if heading == Vec2::ZERO {
            return idle;
        }

        let (charge_buildup, charging) = self.advance_charge(mover, dt);
        let mut speed = mover.stats.speed;
        if mover.is_raged() {
            speed *= RAGE_MULTIPLIER;
        }
        if mover.charging {
            speed *= self.config.charge_speed_multiplier;
        }
        let distance = (speed * dt.as_secs_f32()).min(remaining.max(0.0));
        let mut position = mover.position + heading * distance;
        if mover.stats.movement == MovementClass::Ground
            && self.stays_on_deck(mover.position, position, destination)
        {
            position.x = clamp_to_deck(mover.position.x, position.x);
        }

        Step {
            position: arena::clamp_to_arena(position),
            moved: distance > 0.0,
            charge_buildup,
            charging,
        }
    }

    /// Charge state after walking for `dt`.
    #[must_use]
    pub fn advance_charge(&self, mover: &Entity, dt: Duration) -> (Duration, bool) {
        if !mover.stats.charges {
            return (Duration::ZERO, false);
        }
        let buildup = mover.timers.charge_buildup.saturating_add(dt);
        (buildup, mover.charging || buildup >= self.config.charge_buildup)
    }

    /// Pushes overlapping units apart, then keeps ground units off the river
    /// and everything inside the arena.
    ///
    /// Only units sharing a layer collide; structures never move. Heavier
    /// units yield less than lighter ones.
    pub fn separate(&self, entities: &mut [Entity]) {
        for first in 0..entities.len() {
            for second in first + 1..entities.len() {
                let (head, tail) = entities.split_at_mut(second);
                separate_pair(&mut head[first], &mut tail[0]);
            }
        }

        for entity in entities.iter_mut() {
            if entity.is_spell() || entity.is_structure() {
                continue;
            }
            if entity.stats.movement == MovementClass::Ground {
                entity.position = keep_out_of_river(entity.position);
            }
            entity.position = arena::clamp_to_arena(entity.position);
        }
    }

    fn needs_funnel(&self, position: Vec2, destination: Vec2) -> bool {
        arena::near_river(position.y)
            && !arena::aligned_with_bridge(position.x)
            && crosses_river(position, destination)
    }

    /// A unit on a bridge deck keeps to it while inside the river band, and
    /// on the approach bank while it still has to cross.
    fn stays_on_deck(&self, from: Vec2, to: Vec2, destination: Vec2) -> bool {
        arena::aligned_with_bridge(from.x)
            && (arena::in_river(to.y)
                || (arena::near_river(to.y) && crosses_river(to, destination)))
    }
}

fn crosses_river(position: Vec2, destination: Vec2) -> bool {
    (position.y - arena::MID_Y).signum() != (destination.y - arena::MID_Y).signum()
}

fn clamp_to_deck(from_x: f32, x: f32) -> f32 {
    let bridge = arena::nearest_bridge_x(from_x);
    x.clamp(
        bridge - arena::BRIDGE_HALF_WIDTH,
        bridge + arena::BRIDGE_HALF_WIDTH,
    )
}

fn separate_pair(first: &mut Entity, second: &mut Entity) {
    if first.is_spell() || second.is_spell() || !first.is_alive() || !second.is_alive() {
        return;
    }
    if first.stats.movement != second.stats.movement {
        return;
    }
    let first_fixed = first.is_structure();
    let second_fixed = second.is_structure();
    if first_fixed && second_fixed {
        return;
    }

    let offset = second.position - first.position;
    let distance = offset.length();
    let overlap = first.stats.hitbox + second.stats.hitbox - distance;
    if overlap <= 0.0 {
        return;
    }
    let normal = if distance > f32::EPSILON {
        offset / distance
    } else {
        Vec2::X
    };

    let (first_share, second_share) = if first_fixed {
        (0.0, 1.0)
    } else if second_fixed {
        (1.0, 0.0)
    } else {
        let total = first.stats.mass + second.stats.mass;
        if total <= 0.0 {
            (0.5, 0.5)
        } else {
            (second.stats.mass / total, first.stats.mass / total)
        }
    };

    first.position -= normal * overlap * first_share;
    second.position += normal * overlap * second_share;
}

/// Units nudged just off a bridge deck return to it; anything further out
/// is put back on the nearest bank.
fn keep_out_of_river(position: Vec2) -> Vec2 {
    if !arena::in_river(position.y) || arena::aligned_with_bridge(position.x) {
        return position;
    }
    let bridge = arena::nearest_bridge_x(position.x);
    if (position.x - bridge).abs() <= 2.0 * arena::BRIDGE_HALF_WIDTH {
        return Vec2::new(clamp_to_deck(bridge, position.x), position.y);
    }
    let y = if position.y < arena::MID_Y {
        arena::RIVER_TOP
    } else {
        arena::RIVER_BOTTOM
    };
    Vec2::new(position.x, y - 0.01 * (arena::MID_Y - y).signum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_clash_core::{CardId, Catalog, EntityId, Side};

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
        entity.timers.deploy = Duration::ZERO;
        entity
    }

    #[test]
    fn coincident_units_separate_along_x() {
        let mut entities = vec![
            spawn("knight", 1, Side::Player, (50.0, 70.0)),
            spawn("knight", 2, Side::Player, (50.0, 70.0)),
        ];
        Movement::default().separate(&mut entities);
        assert!(entities[0].position.x < 50.0);
        assert!(entities[1].position.x > 50.0);
        assert_eq!(entities[0].position.y, 70.0);
        let gap = entities[0].position.distance(entities[1].position);
        assert!((gap - 4.0).abs() < 1e-4);
    }

    #[test]
    fn river_pushes_unaligned_ground_units_to_the_bank() {
        assert_eq!(keep_out_of_river(Vec2::new(50.0, 52.0)).y, arena::RIVER_BOTTOM + 0.01);
        assert_eq!(keep_out_of_river(Vec2::new(50.0, 47.0)).y, arena::RIVER_TOP - 0.01);
        assert_eq!(keep_out_of_river(Vec2::new(20.0, 50.0)), Vec2::new(20.0, 50.0));
    }

    #[test]
    fn baseline_follows_the_lane() {
        let movement = Movement::default();
        let left = spawn("knight", 1, Side::Player, (10.0, 70.0));
        let right = spawn("knight", 2, Side::Opponent, (90.0, 30.0));
        assert_eq!(movement.lane_baseline(&left), Vec2::new(20.0, 20.0));
        assert_eq!(movement.lane_baseline(&right), Vec2::new(80.0, 80.0));
    }
}
