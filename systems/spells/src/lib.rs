#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spell and effect resolver.
//!
//! A spell entity carries a [`SpellPhase`]. While pending it waits for its
//! travel delay; once landed, instant behaviours resolve in a single tick and
//! duration behaviours switch to an active countdown that pulses on cadence.
//! A spell whose resolution yields no next phase is removed from the next
//! generation.

use std::time::Duration;

use glam::Vec2;
use lane_clash_core::{
    damage::{area_damage_against, within_area},
    AbilityBehavior, CardId, DurationEffect, EffectKind, Entity, EntityId, Impact, Launch,
    MovementClass, ProjectileEffect, Side, SpellPhase,
};

/// Configuration parameters required to construct the spell resolver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    control_pulse: Duration,
}

impl Config {
    /// Creates a configuration from the duration each control pulse applies.
    ///
    /// Freeze, rage and root are refreshed every tick while the spell is
    /// active; each pulse keeps the status alive for `control_pulse`.
    #[must_use]
    pub const fn new(control_pulse: Duration) -> Self {
        Self { control_pulse }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_millis(200))
    }
}

/// Troops a summon spell asks the world to create.
#[derive(Clone, Debug, PartialEq)]
pub struct Summon {
    /// Definition of the summoned troop.
    pub card: CardId,
    /// Troops created.
    pub count: u32,
    /// Fixed level of the summoned troops.
    pub level: u32,
    /// Owner.
    pub side: Side,
    /// Centre of the formation.
    pub position: Vec2,
}

/// Everything one spell produced during a tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Resolution {
    /// Effects landing on entities.
    pub impacts: Vec<(EntityId, Impact)>,
    /// Troops to materialize.
    pub summon: Option<Summon>,
    /// Projectile to launch.
    pub launch: Option<Launch>,
    /// Phase carried into the next generation; `None` removes the spell.
    pub next: Option<SpellPhase>,
    /// Whether the spell landed this tick.
    pub landed: bool,
}

/// Pure spell resolver.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpellResolver {
    config: Config,
}

impl SpellResolver {
    /// Creates a resolver using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Resolves one tick of a landed spell against the previous snapshot.
    #[must_use]
    pub fn resolve(&self, spell: &Entity, snapshot: &[Entity]) -> Resolution {
        match &spell.spell {
            Some(SpellPhase::Pending(behavior)) => self.land(spell, behavior, snapshot),
            Some(SpellPhase::Active(effect)) => self.pulse(spell, effect, snapshot),
            None => Resolution::default(),
        }
    }

    fn land(&self, spell: &Entity, behavior: &AbilityBehavior, snapshot: &[Entity]) -> Resolution {
        let mut resolution = Resolution {
            landed: true,
            ..Resolution::default()
        };
        match behavior {
            AbilityBehavior::AreaDamage { radius, damage } => {
                resolution.impacts = enemies_within(spell, *radius, snapshot)
                    .map(|target| {
                        let amount = area_damage_against(*damage, target.is_tower());
                        (target.id, Impact::damage(amount))
                    })
                    .collect();
            }
            AbilityBehavior::Stun {
                radius,
                damage,
                stun,
            } => {
                let stun = Duration::from_secs_f32(stun.max(0.0));
                resolution.impacts = enemies_within(spell, *radius, snapshot)
                    .map(|target| {
                        let amount = area_damage_against(*damage, target.is_tower());
                        (
                            target.id,
                            Impact {
                                stun,
                                ..Impact::damage(amount)
                            },
                        )
                    })
                    .collect();
            }
            AbilityBehavior::Summon { card, count, level } => {
                resolution.summon = Some(Summon {
                    card: card.clone(),
                    count: *count,
                    level: *level,
                    side: spell.side,
                    position: spell.position,
                });
            }
            AbilityBehavior::RollingProjectile {
                radius,
                damage,
                range,
                speed,
            } => {
                let destination = spell.position + Vec2::new(0.0, spell.side.forward() * *range);
                resolution.launch = Some(Launch {
                    side: spell.side,
                    source: Some(spell.id),
                    start: spell.position,
                    destination,
                    speed: *speed,
                    target: None,
                    damage: *damage,
                    radius: Some(*radius),
                    arc_height: 0.0,
                    effect: Some(ProjectileEffect::Rolling {
                        radius: *radius,
                        struck: Vec::new(),
                    }),
                    crown_tower_scaled: true,
                });
            }
            AbilityBehavior::DamageOverTime {
                radius,
                damage,
                ticks,
                pulse_every,
            } => {
                resolution.next = Some(SpellPhase::Active(activate(
                    EffectKind::DamageOverTime,
                    *radius,
                    *damage,
                    *ticks,
                    *pulse_every,
                )));
            }
            AbilityBehavior::Buff { radius, ticks } => {
                resolution.next = Some(SpellPhase::Active(activate(
                    EffectKind::Rage,
                    *radius,
                    0.0,
                    *ticks,
                    1,
                )));
            }
            AbilityBehavior::Freeze { radius, ticks } => {
                resolution.next = Some(SpellPhase::Active(activate(
                    EffectKind::Freeze,
                    *radius,
                    0.0,
                    *ticks,
                    1,
                )));
            }
            AbilityBehavior::Root { radius, ticks } => {
                resolution.next = Some(SpellPhase::Active(activate(
                    EffectKind::Root,
                    *radius,
                    0.0,
                    *ticks,
                    1,
                )));
            }
        }
        resolution
    }

    fn pulse(&self, spell: &Entity, effect: &DurationEffect, snapshot: &[Entity]) -> Resolution {
        if effect.remaining_ticks == 0 {
            return Resolution::default();
        }

        let mut next = *effect;
        next.remaining_ticks -= 1;
        let fires = effect.ticks_until_pulse == 0;
        next.ticks_until_pulse = if fires {
            effect.pulse_every.saturating_sub(1)
        } else {
            effect.ticks_until_pulse - 1
        };

        let mut resolution = Resolution {
            next: Some(SpellPhase::Active(next)),
            ..Resolution::default()
        };
        if !fires {
            return resolution;
        }

        let pulse = self.config.control_pulse;
        resolution.impacts = match effect.kind {
            EffectKind::DamageOverTime => enemies_within(spell, effect.radius, snapshot)
                .map(|target| {
                    let amount = area_damage_against(effect.damage, target.is_tower());
                    (target.id, Impact::damage(amount))
                })
                .collect(),
            EffectKind::Freeze => enemies_within(spell, effect.radius, snapshot)
                .map(|target| {
                    (
                        target.id,
                        Impact {
                            freeze: pulse,
                            ..Impact::default()
                        },
                    )
                })
                .collect(),
            EffectKind::Rage => snapshot
                .iter()
                .filter(|target| {
                    target.side == spell.side
                        && target.is_alive()
                        && !target.is_spell()
                        && !target.is_tower()
                        && within_area(spell.position, effect.radius, target.position, target.stats.hitbox)
                })
                .map(|target| {
                    (
                        target.id,
                        Impact {
                            rage: pulse,
                            ..Impact::default()
                        },
                    )
                })
                .collect(),
            EffectKind::Root => enemies_within(spell, effect.radius, snapshot)
                .filter(|target| target.is_troop() && target.stats.movement == MovementClass::Ground)
                .map(|target| {
                    (
                        target.id,
                        Impact {
                            root: pulse,
                            ..Impact::default()
                        },
                    )
                })
                .collect(),
        };
        resolution
    }
}

fn activate(kind: EffectKind, radius: f32, damage: f32, ticks: u32, pulse_every: u32) -> DurationEffect {
    DurationEffect {
        kind,
        radius,
        damage,
        remaining_ticks: ticks,
        pulse_every: pulse_every.max(1),
        ticks_until_pulse: 0,
    }
}

fn enemies_within<'a>(
    spell: &'a Entity,
    radius: f32,
    snapshot: &'a [Entity],
) -> impl Iterator<Item = &'a Entity> + 'a {
    snapshot.iter().filter(move |target| {
        target.side != spell.side
            && target.is_alive()
            && !target.is_spell()
            && within_area(spell.position, radius, target.position, target.stats.hitbox)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_clash_core::{CardDefinition, CardType, Catalog, Stats};

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

    fn spell(behavior: AbilityBehavior, side: Side, position: (f32, f32)) -> Entity {
        let definition = CardDefinition {
            id: CardId::new("test-spell"),
            card_type: CardType::Spell,
            cost: 3,
            spawn_count: 1,
            stats: Stats::default(),
            behavior: Some(behavior),
            spawner: None,
            death_spawn: None,
            tower_role: None,
        };
        let mut entity = Entity::new(
            EntityId::new(100),
            &definition,
            Stats::default(),
            1,
            side,
            Vec2::new(position.0, position.1),
        );
        entity.timers.deploy = Duration::ZERO;
        entity
    }

    #[test]
    fn area_damage_spares_allies_and_scales_towers() {
        let fireball = spell(
            AbilityBehavior::AreaDamage {
                radius: 12.5,
                damage: 400.0,
            },
            Side::Player,
            (20.0, 20.0),
        );
        let snapshot = vec![
            spawn("princess-tower", 1, Side::Opponent, (20.0, 20.0)),
            spawn("knight", 2, Side::Opponent, (25.0, 25.0)),
            spawn("knight", 3, Side::Player, (22.0, 22.0)),
            spawn("knight", 4, Side::Opponent, (60.0, 60.0)),
        ];
        let resolution = SpellResolver::default().resolve(&fireball, &snapshot);
        assert!(resolution.landed);
        assert!(resolution.next.is_none());
        assert_eq!(resolution.impacts.len(), 2);
        assert_eq!(resolution.impacts[0].0, EntityId::new(1));
        assert!((resolution.impacts[0].1.damage - 140.0).abs() < 1e-3);
        assert_eq!(resolution.impacts[1], (EntityId::new(2), Impact::damage(400.0)));
    }

    #[test]
    fn stun_applies_damage_and_status() {
        let zap = spell(
            AbilityBehavior::Stun {
                radius: 10.0,
                damage: 75.0,
                stun: 0.5,
            },
            Side::Opponent,
            (50.0, 70.0),
        );
        let snapshot = vec![spawn("knight", 1, Side::Player, (50.0, 72.0))];
        let resolution = SpellResolver::default().resolve(&zap, &snapshot);
        assert_eq!(resolution.impacts[0].1.damage, 75.0);
        assert_eq!(resolution.impacts[0].1.stun, Duration::from_millis(500));
    }

    #[test]
    fn summons_are_handed_to_the_world() {
        let barrel = spell(
            AbilityBehavior::Summon {
                card: CardId::new("goblins"),
                count: 3,
                level: 9,
            },
            Side::Player,
            (20.0, 20.0),
        );
        let resolution = SpellResolver::default().resolve(&barrel, &[]);
        let summon = resolution.summon.expect("summon request");
        assert_eq!((summon.count, summon.level), (3, 9));
        assert_eq!(summon.position, Vec2::new(20.0, 20.0));
        assert!(resolution.next.is_none());
    }

    #[test]
    fn rolling_spells_launch_along_the_forward_axis() {
        let log = spell(
            AbilityBehavior::RollingProjectile {
                radius: 5.0,
                damage: 96.0,
                range: 40.0,
                speed: 25.0,
            },
            Side::Player,
            (30.0, 70.0),
        );
        let resolution = SpellResolver::default().resolve(&log, &[]);
        let launch = resolution.launch.expect("rolling projectile");
        assert_eq!(launch.destination, Vec2::new(30.0, 30.0));
        assert!(matches!(launch.effect, Some(ProjectileEffect::Rolling { .. })));
        assert!(resolution.next.is_none());
    }

    #[test]
    fn damage_over_time_activates_then_pulses_on_cadence() {
        let resolver = SpellResolver::default();
        let mut poison = spell(
            AbilityBehavior::DamageOverTime {
                radius: 10.0,
                damage: 20.0,
                ticks: 6,
                pulse_every: 3,
            },
            Side::Player,
            (50.0, 30.0),
        );
        let snapshot = vec![spawn("knight", 1, Side::Opponent, (50.0, 32.0))];

        let landing = resolver.resolve(&poison, &snapshot);
        assert!(landing.landed);
        assert!(landing.impacts.is_empty());

        let mut pulses = 0;
        let mut ticks = 0;
        poison.spell = landing.next;
        while poison.spell.is_some() {
            let resolution = resolver.resolve(&poison, &snapshot);
            if !resolution.impacts.is_empty() {
                pulses += 1;
                assert_eq!(resolution.impacts[0].1.damage, 20.0);
            }
            poison.spell = resolution.next;
            ticks += 1;
            assert!(ticks < 20, "duration spell never expired");
        }
        assert_eq!(pulses, 2);
        assert_eq!(ticks, 7);
    }

    #[test]
    fn control_effects_pulse_every_tick() {
        let resolver = SpellResolver::default();
        let snapshot = vec![
            spawn("knight", 1, Side::Opponent, (50.0, 32.0)),
            spawn("minions", 2, Side::Opponent, (52.0, 32.0)),
            spawn("knight", 3, Side::Player, (48.0, 32.0)),
            spawn("princess-tower", 4, Side::Player, (50.0, 25.0)),
        ];
        let first_pulse = |behavior| {
            let mut entity = spell(behavior, Side::Player, (50.0, 30.0));
            entity.spell = resolver.resolve(&entity, &snapshot).next;
            resolver.resolve(&entity, &snapshot)
        };

        let freeze = first_pulse(AbilityBehavior::Freeze {
            radius: 12.0,
            ticks: 10,
        });
        let frozen: Vec<u32> = freeze.impacts.iter().map(|(id, _)| id.get()).collect();
        assert_eq!(frozen, vec![1, 2]);

        let rage = first_pulse(AbilityBehavior::Buff {
            radius: 12.0,
            ticks: 10,
        });
        let raged: Vec<u32> = rage.impacts.iter().map(|(id, _)| id.get()).collect();
        assert_eq!(raged, vec![3]);

        let root = first_pulse(AbilityBehavior::Root {
            radius: 12.0,
            ticks: 10,
        });
        let rooted: Vec<u32> = root.impacts.iter().map(|(id, _)| id.get()).collect();
        assert_eq!(rooted, vec![1]);
        assert_eq!(root.impacts[0].1.root, Duration::from_millis(200));
    }
}
