#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scripted opponent that chooses card plays from battle snapshots.
//!
//! The policy never mutates the battle. It reads a snapshot, rolls the
//! injected random number generator and returns a [`Decision`] that the world
//! validates and folds in. Difficulty grows with trophies: stronger opponents
//! decide faster, place more precisely and push more often.

use std::{cmp::Ordering, time::Duration};

use glam::Vec2;
use lane_clash_core::{
    arena, AbilityBehavior, AttackStyle, BattleState, CardDefinition, CardType, Catalog, Decision,
    Emote, Entity, MovementClass, Side, SimError, TargetingClass, TowerRole,
};
use lane_clash_system_spawn_patterns::SpawnPatterns;
use rand::Rng;
use tracing::debug;

pub mod tuning;

pub use tuning::{
    CadenceTuning, DefenseTuning, EmoteTuning, OffenseTuning, OpponentTuning, PlacementTuning,
    SkillTuning,
};

/// Scripted decision policy for one side.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OpponentPolicy {
    tuning: OpponentTuning,
    patterns: SpawnPatterns,
}

/// Card chosen by one of the passes together with its anchor point.
#[derive(Debug)]
struct Play<'a> {
    definition: &'a CardDefinition,
    anchor: Vec2,
    reason: &'static str,
}

impl OpponentPolicy {
    /// Creates a policy from explicit tuning and a spawn pattern generator.
    #[must_use]
    pub const fn new(tuning: OpponentTuning, patterns: SpawnPatterns) -> Self {
        Self { tuning, patterns }
    }

    /// Tuning in effect.
    #[must_use]
    pub const fn tuning(&self) -> &OpponentTuning {
        &self.tuning
    }

    /// Difficulty in `[0, 1]` derived from trophies.
    #[must_use]
    pub fn difficulty(&self, trophies: u32) -> f32 {
        let full = self.tuning.skill.trophies_for_full_difficulty;
        if full <= 0.0 {
            return 1.0;
        }
        (trophies as f32 / full).clamp(0.0, 1.0)
    }

    /// Card level the policy plays at for `trophies`.
    #[must_use]
    pub fn level(&self, trophies: u32) -> u32 {
        let step = self.tuning.skill.trophies_per_level.max(1);
        (1 + trophies / step).min(self.tuning.skill.max_level)
    }

    /// Computes this tick's decision for `side`.
    ///
    /// Before the side's next-decision timestamp only the emote roll happens.
    /// Otherwise a defensive pass answers threats, an offensive pass may start
    /// a push, and the chosen card is committed only when the side can afford
    /// it; an unaffordable play is abandoned without spending anything.
    pub fn decide<R>(
        &self,
        state: &BattleState,
        catalog: &Catalog,
        side: Side,
        trophies: u32,
        rng: &mut R,
    ) -> Result<Decision, SimError>
    where
        R: Rng + ?Sized,
    {
        let deck = state.decks.get(side);
        let mut decision = Decision {
            next_decision_at: deck.next_decision_at,
            ..Decision::default()
        };
        if state.game_over {
            return Ok(decision);
        }

        let difficulty = self.difficulty(trophies);
        decision.emote = self.roll_emote(difficulty, rng);

        if state.now < deck.next_decision_at {
            return Ok(decision);
        }
        decision.next_decision_at = state.now.saturating_add(self.next_interval(difficulty, rng));

        let hand = deck
            .hand
            .iter()
            .map(|card| catalog.get(card))
            .collect::<Result<Vec<_>, _>>()?;

        let play = match self.defend(state, &hand, side) {
            Some(play) => Some(play),
            None => self.attack(state, &hand, side, difficulty, rng),
        };
        let Some(play) = play else {
            return Ok(decision);
        };

        let position = self.place(play.definition, play.anchor, side, difficulty, rng);
        let cost = play.definition.cost as f32;
        let available = *state.elixir.get(side);
        if available < cost {
            debug!(
                ?side,
                card = %play.definition.id,
                cost,
                available,
                "opponent play abandoned"
            );
            return Ok(decision);
        }

        let cycled = deck.played(&play.definition.id)?;
        let level = self.level(trophies);
        decision.spawned = self.patterns.materialize(
            play.definition,
            level,
            side,
            position,
            state.next_entity_id,
        );
        decision.card = Some(play.definition.id.clone());
        decision.elixir_spent = cost;
        decision.hand = Some(cycled.hand);
        decision.cycle = Some(cycled.cycle);
        debug!(
            ?side,
            card = %play.definition.id,
            reason = play.reason,
            x = position.x,
            y = position.y,
            level,
            "opponent card committed"
        );
        Ok(decision)
    }

    fn roll_emote<R>(&self, difficulty: f32, rng: &mut R) -> Option<Emote>
    where
        R: Rng + ?Sized,
    {
        let chance = self.tuning.emote.base_chance + self.tuning.emote.difficulty_chance * difficulty;
        if rng.gen::<f32>() < chance {
            Some(Emote::ALL[rng.gen_range(0..Emote::ALL.len())])
        } else {
            None
        }
    }

    fn next_interval<R>(&self, difficulty: f32, rng: &mut R) -> Duration
    where
        R: Rng + ?Sized,
    {
        let cadence = &self.tuning.cadence;
        let base = cadence.base_interval.as_secs_f32()
            - cadence.difficulty_speedup.as_secs_f32() * difficulty;
        let jitter = cadence.jitter.as_secs_f32();
        let offset = if jitter > 0.0 {
            rng.gen_range(-jitter..=jitter)
        } else {
            0.0
        };
        Duration::from_secs_f32((base + offset).max(0.0))
    }

    fn defend<'a>(
        &self,
        state: &BattleState,
        hand: &[&'a CardDefinition],
        side: Side,
    ) -> Option<Play<'a>> {
        let tuning = &self.tuning.defense;
        let threats: Vec<&Entity> = state
            .entities_of(side.other())
            .filter(|entity| {
                entity.is_troop()
                    && entity.is_alive()
                    && (entity.position.y - arena::MID_Y) * side.forward() <= tuning.threat_line_offset
            })
            .collect();
        let primary = threats.iter().copied().min_by(|a, b| {
            advance(a, side)
                .partial_cmp(&advance(b, side))
                .unwrap_or(Ordering::Equal)
                .then(a.id.cmp(&b.id))
        })?;

        let available = *state.elixir.get(side);
        let affordable: Vec<&'a CardDefinition> = hand
            .iter()
            .copied()
            .filter(|definition| definition.cost as f32 <= available)
            .collect();

        for definition in affordable.iter().copied() {
            let Some(radius) = area_radius(definition) else {
                continue;
            };
            let cluster: Vec<Vec2> = threats
                .iter()
                .filter(|threat| threat.position.distance(primary.position) <= radius)
                .map(|threat| threat.position)
                .collect();
            if cluster.len() >= tuning.cluster_size {
                let centroid = cluster.iter().copied().sum::<Vec2>() / cluster.len() as f32;
                return Some(Play {
                    definition,
                    anchor: centroid,
                    reason: "cluster",
                });
            }
        }

        let threat_is_air = primary.stats.movement == MovementClass::Air;
        let threat_is_tank = primary.stats.targeting == TargetingClass::Building
            && primary.max_hp >= tuning.tank_hp;
        let threat_splashes =
            primary.stats.attack_style == AttackStyle::Melee && primary.stats.splash_radius > 0.0;

        let mut best: Option<(f32, &'a CardDefinition)> = None;
        for definition in affordable.iter().copied() {
            if definition.is_spell() {
                continue;
            }
            let hits_threat = definition.stats.can_attack()
                && definition
                    .stats
                    .targeting
                    .can_target(primary.stats.movement, false);
            let mut score = 1.0 - tuning.cost_penalty * definition.cost as f32;
            if threat_is_air {
                if !hits_threat {
                    continue;
                }
                score += tuning.anti_air_bonus;
            }
            let swarm = definition.spawn_count >= tuning.swarm_size;
            if swarm && threat_is_tank {
                score += tuning.swarm_vs_tank_bonus;
            }
            if swarm && threat_splashes {
                score -= tuning.swarm_vs_splash_penalty;
            }
            if best.map_or(true, |(top, _)| score > top) {
                best = Some((score, definition));
            }
        }

        let (_, definition) = best?;
        let placement = &self.tuning.placement;
        let home = Vec2::new(0.0, -side.forward());
        let anchor = if definition.is_structure() {
            Vec2::new(
                primary.position.x + (arena::MID_X - primary.position.x) * placement.building_pull,
                arena::MID_Y - side.forward() * placement.building_depth,
            )
        } else {
            match definition.stats.attack_style {
                AttackStyle::Melee => primary.position + home * placement.melee_offset,
                AttackStyle::Ranged => primary.position + home * placement.ranged_offset,
            }
        };
        Some(Play {
            definition,
            anchor,
            reason: "defense",
        })
    }

    fn attack<'a, R>(
        &self,
        state: &BattleState,
        hand: &[&'a CardDefinition],
        side: Side,
        difficulty: f32,
        rng: &mut R,
    ) -> Option<Play<'a>>
    where
        R: Rng + ?Sized,
    {
        let tuning = &self.tuning.offense;
        let elixir = *state.elixir.get(side);
        if elixir < tuning.min_elixir {
            return None;
        }
        let chance = tuning.base_chance + tuning.difficulty_chance * difficulty;
        if elixir < tuning.full_elixir && rng.gen::<f32>() >= chance {
            return None;
        }

        let lane = self.pick_flank(state, side, difficulty, rng);

        let leader = hand
            .iter()
            .copied()
            .filter(|definition| {
                definition.card_type == CardType::Troop
                    && (definition.stats.targeting == TargetingClass::Building
                        || definition.stats.hp >= tuning.tank_hp)
            })
            .max_by(|a, b| a.stats.hp.partial_cmp(&b.stats.hp).unwrap_or(Ordering::Equal));
        if let Some(definition) = leader {
            let depth = (arena::RIVER_BOTTOM - arena::RIVER_TOP) / 2.0 + tuning.bridge_setback;
            return Some(Play {
                definition,
                anchor: Vec2::new(arena::BRIDGE_XS[lane], arena::MID_Y - side.forward() * depth),
                reason: "push",
            });
        }

        let spell = hand.iter().copied().find(|definition| deals_damage(definition))?;
        let anchor = enemy_princess(state, side, lane)?;
        Some(Play {
            definition: spell,
            anchor,
            reason: "spell",
        })
    }

    fn pick_flank<R>(&self, state: &BattleState, side: Side, difficulty: f32, rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        let mut pressure = [0_usize; 2];
        for entity in state.entities_of(side).filter(|entity| entity.is_troop() && entity.is_alive()) {
            pressure[usize::from(entity.position.x >= arena::MID_X)] += 1;
        }
        let follow = self.tuning.offense.flank_follow_base
            + self.tuning.offense.flank_follow_difficulty * difficulty;
        let pressured = match pressure[0].cmp(&pressure[1]) {
            Ordering::Greater => Some(0),
            Ordering::Less => Some(1),
            Ordering::Equal => None,
        };
        match pressured {
            Some(lane) if rng.gen::<f32>() < follow => lane,
            _ => rng.gen_range(0..2),
        }
    }

    fn place<R>(
        &self,
        definition: &CardDefinition,
        anchor: Vec2,
        side: Side,
        difficulty: f32,
        rng: &mut R,
    ) -> Vec2
    where
        R: Rng + ?Sized,
    {
        let spread = self.tuning.placement.max_jitter * (1.0 - difficulty);
        let jitter = if spread > 0.0 {
            Vec2::new(rng.gen_range(-spread..=spread), rng.gen_range(-spread..=spread))
        } else {
            Vec2::ZERO
        };
        let position = anchor + jitter;
        if definition.is_spell() {
            arena::clamp_to_arena(position)
        } else {
            arena::clamp_to_deploy_zone(side, position)
        }
    }
}

fn advance(entity: &Entity, defender: Side) -> f32 {
    (entity.position.y - arena::MID_Y) * defender.forward()
}

fn area_radius(definition: &CardDefinition) -> Option<f32> {
    match definition.behavior.as_ref()? {
        AbilityBehavior::AreaDamage { radius, .. }
        | AbilityBehavior::Stun { radius, .. }
        | AbilityBehavior::DamageOverTime { radius, .. } => Some(*radius),
        _ => None,
    }
}

fn deals_damage(definition: &CardDefinition) -> bool {
    area_radius(definition).is_some()
        || matches!(
            definition.behavior,
            Some(AbilityBehavior::RollingProjectile { .. })
        )
}

fn enemy_princess(state: &BattleState, side: Side, lane: usize) -> Option<Vec2> {
    let slot = arena::tower_slot(side.other(), TowerRole::Princess, lane);
    state
        .towers_of(side.other())
        .min_by(|a, b| {
            a.position
                .distance_squared(slot)
                .partial_cmp(&b.position.distance_squared(slot))
                .unwrap_or(Ordering::Equal)
                .then(a.id.cmp(&b.id))
        })
        .map(|tower| tower.position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_clash_core::CardId;

    #[test]
    fn difficulty_and_level_follow_trophies() {
        let policy = OpponentPolicy::default();
        assert_eq!(policy.difficulty(0), 0.0);
        assert_eq!(policy.difficulty(2_000), 0.5);
        assert_eq!(policy.difficulty(9_000), 1.0);
        assert_eq!(policy.level(0), 1);
        assert_eq!(policy.level(1_499), 3);
        assert_eq!(policy.level(20_000), 11);
    }

    #[test]
    fn area_spells_are_recognized() {
        let catalog = Catalog::standard();
        let fireball = catalog.get(&CardId::new("fireball")).expect("fireball");
        let log = catalog.get(&CardId::new("log")).expect("log");
        let rage = catalog.get(&CardId::new("rage")).expect("rage");
        assert_eq!(area_radius(fireball), Some(12.5));
        assert_eq!(area_radius(log), None);
        assert!(deals_damage(log));
        assert!(!deals_damage(rage));
    }
}
