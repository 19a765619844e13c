#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Formation offsets and entity materialization for card placements.
//!
//! Human placements, scripted decisions, spawner buildings, death spawns and
//! summon spells all create entities through [`SpawnPatterns::materialize`],
//! so every path shares the same formation and level scaling.

use std::f32::consts::TAU;

use glam::Vec2;
use lane_clash_core::{arena, CardDefinition, Entity, EntityId, Side, SpellPhase};
use lane_clash_system_stat_scaling::StatScaler;

/// Default distance between neighbouring units of a formation.
pub const DEFAULT_SPACING: f32 = 3.0;

/// Returns formation offsets around the placement centre.
///
/// One unit stands on the centre, two stand side by side, three form a
/// triangle and four a square. Larger groups put one unit on the centre and
/// fill concentric rings of six, twelve, eighteen units and so on.
#[must_use]
pub fn offsets(count: u32, spacing: f32) -> Vec<Vec2> {
    let half = spacing / 2.0;
    match count {
        0 => Vec::new(),
        1 => vec![Vec2::ZERO],
        2 => vec![Vec2::new(-half, 0.0), Vec2::new(half, 0.0)],
        3 => {
            let height = spacing * 3.0_f32.sqrt() / 2.0;
            vec![
                Vec2::new(0.0, -height * 2.0 / 3.0),
                Vec2::new(-half, height / 3.0),
                Vec2::new(half, height / 3.0),
            ]
        }
        4 => vec![
            Vec2::new(-half, -half),
            Vec2::new(half, -half),
            Vec2::new(-half, half),
            Vec2::new(half, half),
        ],
        _ => {
            let mut out = Vec::with_capacity(count as usize);
            out.push(Vec2::ZERO);
            let mut ring = 1;
            while out.len() < count as usize {
                let slots = 6 * ring;
                let radius = spacing * ring as f32;
                let remaining = count as usize - out.len();
                for slot in 0..slots.min(remaining) {
                    let angle = TAU * slot as f32 / slots as f32;
                    out.push(Vec2::new(angle.cos(), angle.sin()) * radius);
                }
                ring += 1;
            }
            out
        }
    }
}

/// Pure system turning card placements into level-scaled entities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnPatterns {
    scaler: StatScaler,
    spacing: f32,
}

impl Default for SpawnPatterns {
    fn default() -> Self {
        Self::new(StatScaler::default(), DEFAULT_SPACING)
    }
}

impl SpawnPatterns {
    /// Creates a generator using the provided scaler and formation spacing.
    #[must_use]
    pub const fn new(scaler: StatScaler, spacing: f32) -> Self {
        Self { scaler, spacing }
    }

    /// Scaler applied to every materialized entity.
    #[must_use]
    pub const fn scaler(&self) -> &StatScaler {
        &self.scaler
    }

    /// Materializes a placement of `definition` using its own spawn count.
    ///
    /// Identifiers are assigned consecutively starting at `first_id`.
    #[must_use]
    pub fn materialize(
        &self,
        definition: &CardDefinition,
        level: u32,
        side: Side,
        center: Vec2,
        first_id: u32,
    ) -> Vec<Entity> {
        let count = if definition.is_spell() {
            1
        } else {
            definition.spawn_count
        };
        self.materialize_count(definition, count, level, side, center, first_id)
    }

    /// Materializes `count` units of `definition` around `center`.
    #[must_use]
    pub fn materialize_count(
        &self,
        definition: &CardDefinition,
        count: u32,
        level: u32,
        side: Side,
        center: Vec2,
        first_id: u32,
    ) -> Vec<Entity> {
        let level = self.scaler.clamp_level(level);
        let is_tower = definition.tower_role.is_some();
        let stats = self.scaler.scale_stats(&definition.stats, level, is_tower);
        let behavior = definition
            .behavior
            .as_ref()
            .map(|behavior| self.scaler.scale_behavior(behavior, level));

        offsets(count, self.spacing)
            .into_iter()
            .zip(first_id..)
            .map(|(offset, id)| {
                let position = arena::clamp_to_arena(center + offset * side_facing(side));
                let mut entity = Entity::new(
                    EntityId::new(id),
                    definition,
                    stats.clone(),
                    level,
                    side,
                    position,
                );
                entity.spell = behavior.clone().map(SpellPhase::Pending);
                entity
            })
            .collect()
    }
}

fn side_facing(side: Side) -> Vec2 {
    Vec2::new(1.0, -side.forward())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_clash_core::{AbilityBehavior, CardId, Catalog};

    #[test]
    fn formation_sizes_match_the_request() {
        for count in 0..=20 {
            assert_eq!(offsets(count, DEFAULT_SPACING).len(), count as usize);
        }
    }

    #[test]
    fn larger_groups_fill_rings_of_six() {
        let spots = offsets(7, 2.0);
        assert_eq!(spots[0], Vec2::ZERO);
        for spot in &spots[1..] {
            assert!((spot.length() - 2.0).abs() < 1e-4);
        }
        let spots = offsets(9, 2.0);
        assert!((spots[8].length() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn small_formations_keep_units_apart() {
        for count in 2..=4 {
            let spots = offsets(count, DEFAULT_SPACING);
            for (index, a) in spots.iter().enumerate() {
                for b in &spots[index + 1..] {
                    assert!(a.distance(*b) >= DEFAULT_SPACING - 1e-4);
                }
            }
        }
    }

    #[test]
    fn materialized_units_receive_consecutive_ids() {
        let catalog = Catalog::standard();
        let skeletons = catalog.get(&CardId::new("skeletons")).expect("skeletons");
        let patterns = SpawnPatterns::default();
        let entities = patterns.materialize(skeletons, 1, Side::Player, Vec2::new(50.0, 70.0), 40);
        let ids: Vec<u32> = entities.iter().map(|entity| entity.id.get()).collect();
        assert_eq!(ids, vec![40, 41, 42]);
        assert!(entities.iter().all(|entity| entity.side == Side::Player));
    }

    #[test]
    fn spells_materialize_once_with_scaled_behaviour() {
        let catalog = Catalog::standard();
        let fireball = catalog.get(&CardId::new("fireball")).expect("fireball");
        let patterns = SpawnPatterns::default();
        let entities = patterns.materialize(fireball, 2, Side::Opponent, Vec2::new(50.0, 80.0), 0);
        assert_eq!(entities.len(), 1);
        match &entities[0].spell {
            Some(SpellPhase::Pending(AbilityBehavior::AreaDamage { damage, .. })) => {
                assert!((damage - 325.0 * 1.1).abs() < 1e-2);
            }
            other => panic!("unexpected spell phase {other:?}"),
        }
    }

    #[test]
    fn levels_scale_hit_points() {
        let catalog = Catalog::standard();
        let knight = catalog.get(&CardId::new("knight")).expect("knight");
        let patterns = SpawnPatterns::default();
        let entity = &patterns.materialize(knight, 3, Side::Player, Vec2::new(50.0, 70.0), 0)[0];
        assert_eq!(entity.level, 3);
        assert!((entity.max_hp - 660.0 * 1.21).abs() < 1e-2);
    }

    #[test]
    fn placements_near_the_edge_stay_in_the_arena() {
        let catalog = Catalog::standard();
        let minions = catalog.get(&CardId::new("minions")).expect("minions");
        let patterns = SpawnPatterns::default();
        for entity in patterns.materialize(minions, 1, Side::Player, Vec2::new(0.0, 100.0), 0) {
            assert!((0.0..=100.0).contains(&entity.position.x));
            assert!((0.0..=100.0).contains(&entity.position.y));
        }
    }
}
