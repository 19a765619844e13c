#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Projectile subsystem advancing in-flight projectiles and resolving impacts.

use std::time::Duration;

use glam::Vec2;
use lane_clash_core::{
    damage::{area_damage_against, within_area},
    Entity, EntityId, Impact, MovementClass, Projectile, ProjectileEffect,
};

/// Outcome of advancing one projectile by a tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Flight {
    /// Projectile carried into the next generation; `None` once it landed.
    pub next: Option<Projectile>,
    /// Damage dealt this tick.
    pub impacts: Vec<(EntityId, Impact)>,
    /// Position of the impact, when the projectile landed this tick.
    pub landed_at: Option<Vec2>,
}

/// Pure projectile system.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Projectiles;

impl Projectiles {
    /// Creates a new projectile system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Advances `projectile` by `dt` against the previous snapshot.
    ///
    /// Homing projectiles refresh their destination to the live position of
    /// their target. Area projectiles damage every enemy around the landing
    /// point, single-target projectiles only their original target when it
    /// still exists, and rolling projectiles damage each ground enemy they
    /// sweep over once.
    #[must_use]
    pub fn advance(&self, projectile: &Projectile, snapshot: &[Entity], dt: Duration) -> Flight {
        let mut next = projectile.clone();
        if let Some(target) = projectile.target.and_then(|id| find(snapshot, id)) {
            if target.is_alive() {
                next.destination = target.position;
            }
        }

        let travel = projectile.speed.max(0.0) * dt.as_secs_f32();
        let remaining = next.position.distance(next.destination);
        let arrived = remaining <= travel;
        let previous = next.position;
        next.position = if arrived {
            next.destination
        } else {
            next.position + (next.destination - next.position) / remaining * travel
        };
        let total = next.start.distance(next.destination);
        next.progress = if arrived || total <= f32::EPSILON {
            1.0
        } else {
            (1.0 - next.position.distance(next.destination) / total).clamp(0.0, 1.0)
        };

        let mut impacts = Vec::new();
        if let Some(ProjectileEffect::Rolling { radius, struck }) = &mut next.effect {
            for candidate in snapshot {
                if candidate.side == projectile.side
                    || !candidate.is_alive()
                    || candidate.is_spell()
                    || candidate.stats.movement != MovementClass::Ground
                    || struck.contains(&candidate.id)
                {
                    continue;
                }
                let closest = closest_on_segment(previous, next.position, candidate.position);
                if !within_area(closest, *radius, candidate.position, candidate.stats.hitbox) {
                    continue;
                }
                let amount = if projectile.crown_tower_scaled {
                    area_damage_against(projectile.damage, candidate.is_tower())
                } else {
                    projectile.damage
                };
                impacts.push((candidate.id, Impact::damage(amount)));
                struck.push(candidate.id);
            }
            return Flight {
                landed_at: arrived.then_some(next.position),
                next: (!arrived).then_some(next),
                impacts,
            };
        }

        if !arrived {
            return Flight {
                next: Some(next),
                impacts,
                landed_at: None,
            };
        }

        match projectile.radius {
            Some(radius) => {
                for candidate in snapshot {
                    if candidate.side == projectile.side
                        || !candidate.is_alive()
                        || candidate.is_spell()
                        || !within_area(next.destination, radius, candidate.position, candidate.stats.hitbox)
                    {
                        continue;
                    }
                    let amount = if projectile.crown_tower_scaled {
                        area_damage_against(projectile.damage, candidate.is_tower())
                    } else {
                        projectile.damage
                    };
                    impacts.push((candidate.id, Impact::damage(amount)));
                }
            }
            None => {
                if let Some(target) = projectile.target.and_then(|id| find(snapshot, id)) {
                    if target.is_alive() {
                        impacts.push((target.id, Impact::damage(projectile.damage)));
                    }
                }
            }
        }

        Flight {
            next: None,
            impacts,
            landed_at: Some(next.destination),
        }
    }
}

fn find(snapshot: &[Entity], id: EntityId) -> Option<&Entity> {
    snapshot
        .binary_search_by_key(&id, |entity| entity.id)
        .ok()
        .map(|index| &snapshot[index])
}

fn closest_on_segment(from: Vec2, to: Vec2, point: Vec2) -> Vec2 {
    let segment = to - from;
    let length_sq = segment.length_squared();
    if length_sq <= f32::EPSILON {
        return from;
    }
    let t = ((point - from).dot(segment) / length_sq).clamp(0.0, 1.0);
    from + segment * t
}
