//! Damage and status effects exchanged between entities within a tick.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Fraction of area and spell damage that crown towers receive.
pub const CROWN_TOWER_DAMAGE_FACTOR: f32 = 0.35;
/// Damage and speed multiplier while raged.
pub const RAGE_MULTIPLIER: f32 = 1.35;
/// Damage multiplier of the first hit landed while charging.
pub const CHARGE_DAMAGE_MULTIPLIER: f32 = 2.0;

/// Accumulated effect landing on a single entity during one tick.
///
/// Systems never touch the next generation directly. They describe what they
/// inflict as impacts, and the world folds every impact for an entity into a
/// single ledger entry before applying it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    /// Raw damage, already scaled for crown towers where applicable.
    pub damage: f32,
    /// Stun applied to the entity.
    pub stun: Duration,
    /// Freeze applied to the entity.
    pub freeze: Duration,
    /// Rage applied to the entity.
    pub rage: Duration,
    /// Root applied to the entity.
    pub root: Duration,
}

impl Impact {
    /// Creates an impact dealing `amount` damage.
    #[must_use]
    pub const fn damage(amount: f32) -> Self {
        Self {
            damage: amount,
            stun: Duration::ZERO,
            freeze: Duration::ZERO,
            rage: Duration::ZERO,
            root: Duration::ZERO,
        }
    }

    /// Folds another impact into this one; damage adds, statuses keep the longest.
    pub fn merge(&mut self, other: &Impact) {
        self.damage += other.damage;
        self.stun = self.stun.max(other.stun);
        self.freeze = self.freeze.max(other.freeze);
        self.rage = self.rage.max(other.rage);
        self.root = self.root.max(other.root);
    }
}

/// Scales area or spell damage for the struck entity.
#[must_use]
pub fn area_damage_against(amount: f32, target_is_tower: bool) -> f32 {
    if target_is_tower {
        amount * CROWN_TOWER_DAMAGE_FACTOR
    } else {
        amount
    }
}

/// Reports whether an entity at `position` with `hitbox` overlaps a circle.
#[must_use]
pub fn within_area(center: Vec2, radius: f32, position: Vec2, hitbox: f32) -> bool {
    center.distance(position) <= radius + hitbox
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn towers_take_reduced_area_damage() {
        assert_eq!(area_damage_against(400.0, true), 140.0);
        assert_eq!(area_damage_against(400.0, false), 400.0);
    }

    #[test]
    fn merging_adds_damage_and_keeps_longest_status() {
        let mut impact = Impact::damage(10.0);
        impact.merge(&Impact {
            stun: Duration::from_millis(500),
            ..Impact::damage(5.0)
        });
        impact.merge(&Impact {
            stun: Duration::from_millis(200),
            ..Impact::default()
        });
        assert_eq!(impact.damage, 15.0);
        assert_eq!(impact.stun, Duration::from_millis(500));
    }

    #[test]
    fn area_checks_include_the_hitbox() {
        assert!(within_area(Vec2::ZERO, 5.0, Vec2::new(7.0, 0.0), 2.0));
        assert!(!within_area(Vec2::ZERO, 5.0, Vec2::new(7.5, 0.0), 2.0));
    }
}
