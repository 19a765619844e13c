#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves attacks between an entity and its target.
//!
//! Melee hits land immediately as impacts; ranged hits become projectile
//! launches that the projectile subsystem resolves on arrival.

use std::time::Duration;

use lane_clash_core::{
    damage::within_area, AttackStyle, Entity, EntityId, Impact, Launch, CHARGE_DAMAGE_MULTIPLIER,
    RAGE_MULTIPLIER,
};

/// Peak height of the cosmetic arc drawn for ranged attacks.
pub const ATTACK_ARC_HEIGHT: f32 = 2.0;

/// Result of one landed attack.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attack {
    /// Damage applied directly this tick.
    pub impacts: Vec<(EntityId, Impact)>,
    /// Projectile launched toward the target.
    pub launch: Option<Launch>,
}

/// Combat system deciding whether an attacker hits this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Combat;

impl Combat {
    /// Creates a new combat system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Reports whether the attacker's hit interval has elapsed at `now`.
    #[must_use]
    pub fn is_ready(&self, attacker: &Entity, now: Duration) -> bool {
        let interval = Duration::from_secs_f32(attacker.stats.hit_interval.max(0.0));
        now.saturating_sub(attacker.last_attack_at) >= interval
    }

    /// Damage the attacker deals with its next hit.
    #[must_use]
    pub fn hit_damage(&self, attacker: &Entity) -> f32 {
        let mut damage = attacker.stats.damage;
        if attacker.is_raged() {
            damage *= RAGE_MULTIPLIER;
        }
        if attacker.charging {
            damage *= CHARGE_DAMAGE_MULTIPLIER;
        }
        damage
    }

    /// Resolves an attack on `target` if it is in range and the attacker is ready.
    ///
    /// `snapshot` holds the previous generation sorted by identifier and is
    /// consulted for melee splash.
    #[must_use]
    pub fn strike(
        &self,
        attacker: &Entity,
        target: &Entity,
        snapshot: &[Entity],
        now: Duration,
    ) -> Option<Attack> {
        if !attacker.stats.can_attack() || !attacker.in_range_of(target) {
            return None;
        }
        if !self.is_ready(attacker, now) {
            return None;
        }

        let damage = self.hit_damage(attacker);
        let splash = attacker.stats.splash_radius;

        match attacker.stats.attack_style {
            AttackStyle::Melee => {
                let impacts = if splash > 0.0 {
                    snapshot
                        .iter()
                        .filter(|candidate| {
                            candidate.side != attacker.side
                                && candidate.is_targetable()
                                && attacker
                                    .stats
                                    .targeting
                                    .can_target(candidate.stats.movement, candidate.is_structure())
                                && within_area(
                                    target.position,
                                    splash,
                                    candidate.position,
                                    candidate.stats.hitbox,
                                )
                        })
                        .map(|candidate| (candidate.id, Impact::damage(damage)))
                        .collect()
                } else {
                    vec![(target.id, Impact::damage(damage))]
                };
                Some(Attack {
                    impacts,
                    launch: None,
                })
            }
            AttackStyle::Ranged => Some(Attack {
                impacts: Vec::new(),
                launch: Some(Launch {
                    side: attacker.side,
                    source: Some(attacker.id),
                    start: attacker.position,
                    destination: target.position,
                    speed: attacker.stats.projectile_speed,
                    target: Some(target.id),
                    damage,
                    radius: (splash > 0.0).then_some(splash),
                    arc_height: ATTACK_ARC_HEIGHT,
                    effect: None,
                    crown_tower_scaled: splash > 0.0,
                }),
            }),
        }
    }
}
