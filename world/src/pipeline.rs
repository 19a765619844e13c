//! Per-entity update pipeline producing the next generation.

use std::time::Duration;

use glam::Vec2;
use lane_clash_core::{
    CardDefinition, Catalog, Entity, EntityState, Event, GameMode, Launch, Side, SimError,
};
use lane_clash_system_targeting::find;
use tracing::debug;

use crate::{ledger::ImpactLedger, Systems};

/// Rage timer kept topped up on every non-spell entity in rage mode.
const ALWAYS_RAGE_PULSE: Duration = Duration::from_millis(100);

/// Distance kept inside attack range when walking up to a target.
const RANGE_SLACK: f32 = 0.05;

/// Read-only inputs shared by every entity update in a tick.
pub(crate) struct Tick<'a> {
    pub(crate) systems: &'a Systems,
    pub(crate) catalog: &'a Catalog,
    /// Previous generation, sorted by identifier.
    pub(crate) snapshot: &'a [Entity],
    pub(crate) mode: GameMode,
    pub(crate) now: Duration,
    pub(crate) dt: Duration,
}

/// Next generation under construction.
pub(crate) struct Generation {
    /// Survivors of the previous generation in identifier order.
    pub(crate) entities: Vec<Entity>,
    /// Entities created this tick, with identifiers above every survivor.
    pub(crate) spawned: Vec<Entity>,
    pub(crate) impacts: ImpactLedger,
    pub(crate) launches: Vec<Launch>,
    pub(crate) next_entity_id: u32,
}

impl Generation {
    pub(crate) fn new(next_entity_id: u32) -> Self {
        Self {
            entities: Vec::new(),
            spawned: Vec::new(),
            impacts: ImpactLedger::default(),
            launches: Vec::new(),
            next_entity_id,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn spawn(
        &mut self,
        systems: &Systems,
        definition: &CardDefinition,
        count: u32,
        level: u32,
        side: Side,
        position: Vec2,
        out_events: &mut Vec<Event>,
    ) {
        let batch = systems.patterns.materialize_count(
            definition,
            count,
            level,
            side,
            position,
            self.next_entity_id,
        );
        self.next_entity_id += batch.len() as u32;
        for entity in &batch {
            out_events.push(Event::EntitySpawned {
                entity: entity.id,
                card: entity.card.clone(),
                side: entity.side,
                position: entity.position,
            });
        }
        self.spawned.extend(batch);
    }
}

/// Runs one entity of the previous generation through the pipeline.
pub(crate) fn advance(
    tick: &Tick<'_>,
    entity: &Entity,
    generation: &mut Generation,
    out_events: &mut Vec<Event>,
) -> Result<(), SimError> {
    if entity.is_spell() {
        return cast(tick, entity, generation, out_events);
    }
    if !entity.is_alive() {
        return remove(tick, entity, generation, out_events);
    }

    let mut next = entity.clone();
    if next.is_deploying() {
        next.timers.deploy = next.timers.deploy.saturating_sub(tick.dt);
        if !next.is_deploying() {
            next.last_attack_at = tick.now;
            next.last_spawn_at = tick.now;
            out_events.push(Event::Deployed {
                entity: next.id,
                card: next.card.clone(),
                position: next.position,
            });
        }
        generation.entities.push(next);
        return Ok(());
    }

    decay_statuses(tick, &mut next);
    let inert = next.is_inert();
    if next.is_building() {
        upkeep(tick, &mut next, inert, generation, out_events)?;
    }
    if inert {
        next.state = EntityState::Idle;
    } else {
        engage(tick, &mut next, generation);
    }
    generation.entities.push(next);
    Ok(())
}

fn remove(
    tick: &Tick<'_>,
    entity: &Entity,
    generation: &mut Generation,
    out_events: &mut Vec<Event>,
) -> Result<(), SimError> {
    let definition = tick.catalog.get(&entity.card)?;
    if let Some(rule) = &definition.death_spawn {
        let spawned = tick.catalog.get(&rule.card)?;
        generation.spawn(
            tick.systems,
            spawned,
            rule.count,
            entity.level,
            entity.side,
            entity.position,
            out_events,
        );
    }
    out_events.push(Event::EntityDestroyed {
        entity: entity.id,
        card: entity.card.clone(),
        side: entity.side,
    });
    Ok(())
}

fn cast(
    tick: &Tick<'_>,
    spell: &Entity,
    generation: &mut Generation,
    out_events: &mut Vec<Event>,
) -> Result<(), SimError> {
    if spell.is_deploying() {
        let mut next = spell.clone();
        next.timers.deploy = next.timers.deploy.saturating_sub(tick.dt);
        next.state = EntityState::Casting;
        generation.entities.push(next);
        return Ok(());
    }

    let resolution = tick.systems.spells.resolve(spell, tick.snapshot);
    generation.impacts.extend(resolution.impacts);
    if let Some(summon) = resolution.summon {
        let definition = tick.catalog.get(&summon.card)?;
        generation.spawn(
            tick.systems,
            definition,
            summon.count,
            summon.level,
            summon.side,
            summon.position,
            out_events,
        );
    }
    generation.launches.extend(resolution.launch);
    if resolution.landed {
        out_events.push(Event::SpellResolved {
            entity: spell.id,
            card: spell.card.clone(),
            position: spell.position,
        });
    }
    if let Some(phase) = resolution.next {
        let mut next = spell.clone();
        next.spell = Some(phase);
        next.state = EntityState::Casting;
        generation.entities.push(next);
    }
    Ok(())
}

fn decay_statuses(tick: &Tick<'_>, entity: &mut Entity) {
    let timers = &mut entity.timers;
    timers.frozen = timers.frozen.saturating_sub(tick.dt);
    timers.stunned = timers.stunned.saturating_sub(tick.dt);
    timers.raged = timers.raged.saturating_sub(tick.dt);
    timers.rooted = timers.rooted.saturating_sub(tick.dt);
    if tick.mode.always_rage() {
        timers.raged = timers.raged.max(ALWAYS_RAGE_PULSE);
    }
}

/// Building decay and spawner cadence.
fn upkeep(
    tick: &Tick<'_>,
    building: &mut Entity,
    inert: bool,
    generation: &mut Generation,
    out_events: &mut Vec<Event>,
) -> Result<(), SimError> {
    let lifetime = building.stats.building_lifetime();
    if lifetime > 0.0 {
        let decay = building.max_hp / lifetime * tick.dt.as_secs_f32();
        building.hp = (building.hp - decay).max(0.0);
    }
    if inert || !building.is_alive() {
        return Ok(());
    }

    let definition = tick.catalog.get(&building.card)?;
    let Some(rule) = &definition.spawner else {
        return Ok(());
    };
    let interval = Duration::from_secs_f32(rule.interval.max(0.0));
    if tick.now.saturating_sub(building.last_spawn_at) < interval {
        return Ok(());
    }
    let spawned = tick.catalog.get(&rule.card)?;
    generation.spawn(
        tick.systems,
        spawned,
        rule.count,
        building.level,
        building.side,
        building.position,
        out_events,
    );
    building.last_spawn_at = tick.now;
    debug!(
        building = building.id.get(),
        card = %rule.card,
        count = rule.count,
        "spawner produced a batch"
    );
    Ok(())
}

/// Target acquisition, attack resolution and movement.
fn engage(tick: &Tick<'_>, entity: &mut Entity, generation: &mut Generation) {
    let systems = tick.systems;
    entity.target = systems.targeting.acquire(entity, tick.snapshot);

    match entity.target.and_then(|id| find(tick.snapshot, id)) {
        Some(target) if entity.in_range_of(target) => {
            entity.state = EntityState::Attacking;
            entity.timers.charge_buildup = Duration::ZERO;
            if let Some(attack) = systems.combat.strike(entity, target, tick.snapshot, tick.now) {
                generation.impacts.extend(attack.impacts);
                generation.launches.extend(attack.launch);
                entity.last_attack_at = tick.now;
                entity.charging = false;
            }
        }
        Some(target) => {
            let stop = (entity.stats.range + entity.stats.hitbox + target.stats.hitbox
                - RANGE_SLACK)
                .max(0.0);
            walk(tick, entity, target.position, stop);
        }
        None => {
            let destination = systems.movement.lane_baseline(entity);
            walk(tick, entity, destination, 0.0);
        }
    }
    entity.invisible = entity.stats.stealth && entity.state != EntityState::Attacking;
}

fn walk(tick: &Tick<'_>, entity: &mut Entity, destination: Vec2, stop_distance: f32) {
    let step = tick
        .systems
        .movement
        .step(entity, destination, stop_distance, tick.snapshot, tick.dt);
    entity.position = step.position;
    entity.timers.charge_buildup = step.charge_buildup;
    entity.charging = step.charging;
    entity.state = if step.moved {
        EntityState::Moving
    } else {
        EntityState::Idle
    };
}
