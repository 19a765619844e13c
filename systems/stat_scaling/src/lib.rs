#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level scaling applied to base card stats before entities are created.
//!
//! Troops, buildings and spells grow geometrically with level, crown towers
//! grow linearly, and hit points never exceed a fixed ceiling.

use lane_clash_core::{AbilityBehavior, Stats};

/// Highest card level the scaler honours.
pub const MAX_LEVEL: u32 = 14;

/// Configuration parameters required to construct the stat scaler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    unit_growth: f32,
    tower_growth: f32,
    hp_cap: f32,
    max_level: u32,
}

impl Config {
    /// Creates a configuration from explicit growth rates and limits.
    #[must_use]
    pub const fn new(unit_growth: f32, tower_growth: f32, hp_cap: f32, max_level: u32) -> Self {
        Self {
            unit_growth,
            tower_growth,
            hp_cap,
            max_level,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(1.10, 0.07, 12_000.0, MAX_LEVEL)
    }
}

/// Pure system mapping `(base stats, level)` to scaled stats.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StatScaler {
    config: Config,
}

impl StatScaler {
    /// Creates a scaler using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Clamps a requested level into the supported range.
    #[must_use]
    pub fn clamp_level(&self, level: u32) -> u32 {
        level.clamp(1, self.config.max_level.max(1))
    }

    /// Multiplier applied to hit points and damage at `level`.
    #[must_use]
    pub fn multiplier(&self, level: u32, is_tower: bool) -> f32 {
        let steps = (self.clamp_level(level) - 1) as f32;
        if is_tower {
            1.0 + self.config.tower_growth * steps
        } else {
            self.config.unit_growth.powf(steps)
        }
    }

    /// Scales hit points, shield and damage; every other stat is unchanged.
    #[must_use]
    pub fn scale_stats(&self, base: &Stats, level: u32, is_tower: bool) -> Stats {
        let multiplier = self.multiplier(level, is_tower);
        Stats {
            hp: (base.hp * multiplier).min(self.config.hp_cap),
            damage: base.damage * multiplier,
            shield: (base.shield * multiplier).min(self.config.hp_cap),
            ..base.clone()
        }
    }

    /// Scales the damage carried by a spell behaviour.
    #[must_use]
    pub fn scale_behavior(&self, behavior: &AbilityBehavior, level: u32) -> AbilityBehavior {
        let multiplier = self.multiplier(level, false);
        let mut scaled = behavior.clone();
        match &mut scaled {
            AbilityBehavior::AreaDamage { damage, .. }
            | AbilityBehavior::Stun { damage, .. }
            | AbilityBehavior::RollingProjectile { damage, .. }
            | AbilityBehavior::DamageOverTime { damage, .. } => *damage *= multiplier,
            AbilityBehavior::Summon { .. }
            | AbilityBehavior::Buff { .. }
            | AbilityBehavior::Freeze { .. }
            | AbilityBehavior::Root { .. } => {}
        }
        scaled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn base() -> Stats {
        Stats {
            hp: 1000.0,
            damage: 100.0,
            shield: 50.0,
            ..Stats::default()
        }
    }

    #[test]
    fn level_one_is_identity() {
        let scaler = StatScaler::default();
        assert_eq!(scaler.scale_stats(&base(), 1, false), base());
        assert_eq!(scaler.scale_stats(&base(), 1, true), base());
    }

    #[test]
    fn units_grow_geometrically_and_towers_linearly() {
        let scaler = StatScaler::default();
        let unit = scaler.multiplier(3, false);
        let tower = scaler.multiplier(3, true);
        assert!((unit - 1.21).abs() < 1e-5);
        assert!((tower - 1.14).abs() < 1e-5);
    }

    #[test]
    fn levels_clamp_into_range() {
        let scaler = StatScaler::default();
        assert_eq!(scaler.clamp_level(0), 1);
        assert_eq!(scaler.clamp_level(99), MAX_LEVEL);
        assert_eq!(scaler.multiplier(0, false), 1.0);
    }

    #[test]
    fn hit_points_respect_the_cap() {
        let scaler = StatScaler::default();
        let giant = Stats {
            hp: 9_000.0,
            ..Stats::default()
        };
        assert_eq!(scaler.scale_stats(&giant, MAX_LEVEL, false).hp, 12_000.0);
    }

    #[test]
    fn spell_damage_scales_but_control_effects_do_not() {
        let scaler = StatScaler::default();
        let fireball = AbilityBehavior::AreaDamage {
            radius: 12.5,
            damage: 100.0,
        };
        let freeze = AbilityBehavior::Freeze {
            radius: 12.0,
            ticks: 60,
        };
        match scaler.scale_behavior(&fireball, 2) {
            AbilityBehavior::AreaDamage { damage, radius } => {
                assert!((damage - 110.0).abs() < 1e-4);
                assert_eq!(radius, 12.5);
            }
            other => panic!("unexpected behaviour {other:?}"),
        }
        assert_eq!(scaler.scale_behavior(&freeze, 9), freeze);
    }

    proptest! {
        #[test]
        fn scaling_never_shrinks_stats(level in 1u32..=MAX_LEVEL, tower in any::<bool>()) {
            let scaler = StatScaler::default();
            let scaled = scaler.scale_stats(&base(), level, tower);
            prop_assert!(scaled.hp >= base().hp);
            prop_assert!(scaled.damage >= base().damage);
            prop_assert!(scaled.hp <= 12_000.0);
        }
    }
}
