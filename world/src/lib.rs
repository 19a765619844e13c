#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battle state management for Lane Clash.
//!
//! The world owns the current [`BattleState`] snapshot and advances it in
//! response to [`Command`] values. Every transition is computed into a fresh
//! snapshot while all reads happen against the frozen previous one; the
//! snapshot only replaces the stored state once the whole transition
//! succeeded. Randomness is drawn exclusively from the generator handed in by
//! the caller, so identical seeds and commands replay identically.

use std::time::Duration;

use glam::Vec2;
use lane_clash_core::{
    arena,
    catalog::{KING_TOWER, PRINCESS_TOWER, STANDARD_DECK},
    BattleState, CardId, Catalog, Command, Decision, DeckState, EntityId, Event, GameMode,
    MatchRules, PerSide, Phase, ProjectileId, Side, SimError, TowerRole, MAX_ELIXIR,
};
use lane_clash_system_combat::Combat;
use lane_clash_system_movement::Movement;
use lane_clash_system_opponent::OpponentPolicy;
use lane_clash_system_projectiles::Projectiles;
use lane_clash_system_spawn_patterns::SpawnPatterns;
use lane_clash_system_spells::SpellResolver;
use lane_clash_system_targeting::Targeting;
use rand::Rng;
use tracing::debug;

mod ledger;
mod pipeline;
pub mod query;
mod rules;

use pipeline::{Generation, Tick};

/// Simulated time handed to one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickInput {
    /// Time elapsed since the previous tick.
    pub dt: Duration,
}

impl TickInput {
    /// Creates a tick input advancing the match by `dt`.
    #[must_use]
    pub const fn new(dt: Duration) -> Self {
        Self { dt }
    }
}

/// Parameters used to start a match.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchSetup {
    /// Match variant.
    pub mode: GameMode,
    /// Clock and economy knobs.
    pub rules: MatchRules,
    /// Deck of each side; the first four cards form the opening hand.
    pub decks: PerSide<Vec<CardId>>,
    /// Level of each side's crown towers.
    pub tower_levels: PerSide<u32>,
}

impl MatchSetup {
    /// Creates a setup for `mode` using the standard deck on both sides.
    #[must_use]
    pub fn new(mode: GameMode) -> Self {
        let deck: Vec<CardId> = STANDARD_DECK.iter().map(|name| CardId::new(*name)).collect();
        Self {
            mode,
            rules: MatchRules::default(),
            decks: PerSide::splat(deck),
            tower_levels: PerSide::splat(1),
        }
    }
}

impl Default for MatchSetup {
    fn default() -> Self {
        Self::new(GameMode::Standard)
    }
}

/// Pure systems the world drives every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Systems {
    /// Turns placements into level-scaled entities.
    pub patterns: SpawnPatterns,
    /// Picks targets.
    pub targeting: Targeting,
    /// Resolves attacks.
    pub combat: Combat,
    /// Moves and separates units.
    pub movement: Movement,
    /// Resolves spells.
    pub spells: SpellResolver,
    /// Advances projectiles.
    pub projectiles: Projectiles,
}

impl Systems {
    /// Builds the opening snapshot of a match.
    pub fn new_match(&self, setup: &MatchSetup, catalog: &Catalog) -> Result<BattleState, SimError> {
        let mut entities = Vec::new();
        let mut next_entity_id = 0;
        for side in Side::ALL {
            let level = *setup.tower_levels.get(side);
            for (card, role, lane) in [
                (KING_TOWER, TowerRole::King, 0),
                (PRINCESS_TOWER, TowerRole::Princess, 0),
                (PRINCESS_TOWER, TowerRole::Princess, 1),
            ] {
                let definition = catalog.get(&CardId::new(card))?;
                let towers = self.patterns.materialize(
                    definition,
                    level,
                    side,
                    arena::tower_slot(side, role, lane),
                    next_entity_id,
                );
                next_entity_id += towers.len() as u32;
                entities.extend(towers);
            }
        }

        let deal = |side: Side| -> Result<DeckState, SimError> {
            let deck = setup.decks.get(side);
            for card in deck {
                let _ = catalog.get(card)?;
            }
            DeckState::from_deck(deck)
        };
        let decks = PerSide::new(deal(Side::Player)?, deal(Side::Opponent)?);

        let starting = setup.rules.starting_elixir.clamp(0.0, MAX_ELIXIR);
        Ok(BattleState {
            mode: setup.mode,
            rules: setup.rules.clone(),
            now: Duration::ZERO,
            time_remaining: setup.rules.regular_time,
            phase: Phase::Regular,
            elixir: PerSide::splat(starting),
            crowns: PerSide::default(),
            overtime_baseline: PerSide::default(),
            game_over: false,
            winner: None,
            trophy_delta: None,
            entities,
            projectiles: Vec::new(),
            decks,
            next_entity_id,
            next_projectile_id: 0,
        })
    }

    /// Advances `state` by one tick and returns the next snapshot.
    ///
    /// A finished match is returned unchanged.
    pub fn step<R>(
        &self,
        state: &BattleState,
        catalog: &Catalog,
        input: &TickInput,
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) -> Result<BattleState, SimError>
    where
        R: Rng + ?Sized,
    {
        if state.game_over {
            return Ok(state.clone());
        }

        let dt = input.dt;
        let now = state.now.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        let mut next = state.clone();
        next.now = now;
        rules::advance_clock(&mut next, dt, out_events);
        if next.game_over {
            rules::settle_trophies(&mut next, rng, out_events);
            return Ok(next);
        }
        rules::regenerate_elixir(&mut next, dt);

        let tick = Tick {
            systems: self,
            catalog,
            snapshot: &state.entities,
            mode: state.mode,
            now,
            dt,
        };
        let mut generation = Generation::new(state.next_entity_id);
        for entity in &state.entities {
            pipeline::advance(&tick, entity, &mut generation, out_events)?;
        }
        let Generation {
            mut entities,
            spawned,
            mut impacts,
            launches,
            next_entity_id,
        } = generation;
        entities.extend(spawned);
        self.movement.separate(&mut entities);

        let mut projectiles = Vec::with_capacity(state.projectiles.len() + launches.len());
        for projectile in &state.projectiles {
            let flight = self.projectiles.advance(projectile, &state.entities, dt);
            impacts.extend(flight.impacts);
            if let Some(position) = flight.landed_at {
                out_events.push(Event::ProjectileImpact {
                    projectile: projectile.id,
                    position,
                });
            }
            projectiles.extend(flight.next);
        }
        let mut next_projectile_id = state.next_projectile_id;
        for launch in launches {
            projectiles.push(launch.into_projectile(ProjectileId::new(next_projectile_id)));
            next_projectile_id += 1;
        }

        impacts.settle(&mut entities, out_events);

        next.entities = entities;
        next.projectiles = projectiles;
        next.next_entity_id = next_entity_id;
        next.next_projectile_id = next_projectile_id;

        rules::score_crowns(state, &mut next, out_events);
        rules::evaluate_winner(&mut next);
        rules::settle_trophies(&mut next, rng, out_events);
        Ok(next)
    }

    /// Places a card from `side`'s hand after validating the play.
    #[allow(clippy::too_many_arguments)]
    pub fn play_card(
        &self,
        state: &BattleState,
        catalog: &Catalog,
        side: Side,
        card: CardId,
        position: Vec2,
        level: u32,
        out_events: &mut Vec<Event>,
    ) -> Result<BattleState, SimError> {
        if state.game_over {
            return Err(SimError::MatchOver);
        }
        let deck = state.decks.get(side);
        let cycled = deck.played(&card)?;
        let definition = catalog.get(&card)?;

        let legal = if definition.is_spell() {
            arena::clamp_to_arena(position) == position
        } else {
            arena::in_deploy_zone(side, position)
        };
        if !legal {
            return Err(SimError::IllegalPlacement { side, position });
        }

        let cost = definition.cost as f32;
        let available = *state.elixir.get(side);
        if available < cost {
            return Err(SimError::InsufficientElixir {
                side,
                cost,
                available,
            });
        }

        let spawned = self
            .patterns
            .materialize(definition, level, side, position, state.next_entity_id);
        let mut next = state.clone();
        *next.elixir.get_mut(side) = available - cost;
        *next.decks.get_mut(side) = cycled;
        next.next_entity_id += spawned.len() as u32;
        next.entities.extend(spawned);
        out_events.push(Event::CardPlayed {
            side,
            card,
            position,
        });
        Ok(next)
    }

    /// Folds a policy decision for `side` into the battle.
    ///
    /// Spawned entities are renumbered from the snapshot's identifier
    /// counter, so a decision computed against an older snapshot never
    /// collides with existing entities.
    pub fn fold_decision(
        &self,
        state: &BattleState,
        catalog: &Catalog,
        side: Side,
        decision: Decision,
        out_events: &mut Vec<Event>,
    ) -> Result<BattleState, SimError> {
        let mut next = state.clone();
        if let Some(card) = decision.card {
            if state.game_over {
                return Err(SimError::MatchOver);
            }
            if !state.decks.get(side).holds(&card) {
                return Err(SimError::CardNotInHand(card));
            }
            let _ = catalog.get(&card)?;
            let available = *state.elixir.get(side);
            if available < decision.elixir_spent {
                return Err(SimError::InsufficientElixir {
                    side,
                    cost: decision.elixir_spent,
                    available,
                });
            }

            *next.elixir.get_mut(side) = (available - decision.elixir_spent).clamp(0.0, MAX_ELIXIR);
            let deck = next.decks.get_mut(side);
            if let Some(hand) = decision.hand {
                deck.hand = hand;
            }
            if let Some(cycle) = decision.cycle {
                deck.cycle = cycle;
            }

            let count = decision.spawned.len();
            let mut center = Vec2::ZERO;
            for mut entity in decision.spawned {
                entity.id = EntityId::new(next.next_entity_id);
                entity.side = side;
                next.next_entity_id += 1;
                center += entity.position;
                next.entities.push(entity);
            }
            if count > 0 {
                center /= count as f32;
            }
            out_events.push(Event::CardPlayed {
                side,
                card,
                position: center,
            });
        }

        next.decks.get_mut(side).next_decision_at = decision.next_decision_at;
        if let Some(emote) = decision.emote {
            out_events.push(Event::Emote { side, emote });
        }
        Ok(next)
    }
}

/// Builds the opening snapshot of a match with the default systems.
pub fn new_match(setup: &MatchSetup, catalog: &Catalog) -> Result<BattleState, SimError> {
    Systems::default().new_match(setup, catalog)
}

/// Advances `state` by one tick with the default systems.
pub fn step<R>(
    state: &BattleState,
    catalog: &Catalog,
    input: &TickInput,
    rng: &mut R,
    out_events: &mut Vec<Event>,
) -> Result<BattleState, SimError>
where
    R: Rng + ?Sized,
{
    Systems::default().step(state, catalog, input, rng, out_events)
}

/// Represents the authoritative Lane Clash battle.
#[derive(Clone, Debug, PartialEq)]
pub struct World {
    state: BattleState,
    catalog: Catalog,
    systems: Systems,
}

impl World {
    /// Starts a new match described by `setup`.
    pub fn new(setup: &MatchSetup, catalog: Catalog) -> Result<Self, SimError> {
        let systems = Systems::default();
        let state = systems.new_match(setup, &catalog)?;
        Ok(Self {
            state,
            catalog,
            systems,
        })
    }

    /// Resumes a battle from a previously captured snapshot.
    #[must_use]
    pub fn from_state(state: BattleState, catalog: Catalog) -> Self {
        Self {
            state,
            catalog,
            systems: Systems::default(),
        }
    }

    /// Replaces the systems driving the battle.
    #[must_use]
    pub fn with_systems(mut self, systems: Systems) -> Self {
        self.systems = systems;
        self
    }

    /// Consumes the world and returns its current snapshot.
    #[must_use]
    pub fn into_state(self) -> BattleState {
        self.state
    }
}

/// Applies the provided command to the world.
///
/// On error the world keeps its previous snapshot.
pub fn apply<R>(
    world: &mut World,
    command: Command,
    rng: &mut R,
    out_events: &mut Vec<Event>,
) -> Result<(), SimError>
where
    R: Rng + ?Sized,
{
    let systems = world.systems;
    let next = match command {
        Command::Tick { dt } => systems.step(
            &world.state,
            &world.catalog,
            &TickInput::new(dt),
            rng,
            out_events,
        )?,
        Command::PlayCard {
            side,
            card,
            position,
            level,
        } => systems.play_card(
            &world.state,
            &world.catalog,
            side,
            card,
            position,
            level,
            out_events,
        )?,
        Command::ApplyDecision { side, decision } => {
            systems.fold_decision(&world.state, &world.catalog, side, decision, out_events)?
        }
    };
    world.state = next;
    Ok(())
}

/// Runs `policy` for a scripted `side` and folds its decision into the world.
pub fn play_scripted<R>(
    world: &mut World,
    policy: &OpponentPolicy,
    side: Side,
    trophies: u32,
    rng: &mut R,
    out_events: &mut Vec<Event>,
) -> Result<(), SimError>
where
    R: Rng + ?Sized,
{
    let decision = policy.decide(&world.state, &world.catalog, side, trophies, rng)?;
    if let Some(card) = &decision.card {
        debug!(?side, card = %card, spent = decision.elixir_spent, "scripted play");
    }
    apply(world, Command::ApplyDecision { side, decision }, rng, out_events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_matches_place_six_towers() {
        let state = new_match(&MatchSetup::default(), &Catalog::standard()).expect("match");
        assert_eq!(state.entities.len(), 6);
        assert_eq!(state.next_entity_id, 6);
        for side in Side::ALL {
            assert_eq!(state.towers_alive(side), 3);
            assert!(state.king_alive(side));
        }
        assert_eq!(state.elixir, PerSide::splat(5.0));
        assert_eq!(state.time_remaining, Duration::from_secs(180));
        assert!(state
            .entities
            .windows(2)
            .all(|pair| pair[0].id < pair[1].id));
    }

    #[test]
    fn kings_start_dormant_and_princesses_awake() {
        let state = new_match(&MatchSetup::default(), &Catalog::standard()).expect("match");
        for tower in &state.entities {
            assert_eq!(tower.dormant, tower.is_king());
            assert!(!tower.is_deploying());
        }
    }

    #[test]
    fn decks_must_reference_known_cards() {
        let mut setup = MatchSetup::default();
        setup.decks.opponent[2] = CardId::new("wizard");
        assert_eq!(
            new_match(&setup, &Catalog::standard()),
            Err(SimError::UnknownDefinition(CardId::new("wizard")))
        );

        setup.decks.opponent.truncate(3);
        setup.decks.opponent[2] = CardId::new("giant");
        assert_eq!(
            new_match(&setup, &Catalog::standard()),
            Err(SimError::InvalidDeck(3))
        );
    }

    #[test]
    fn tower_levels_scale_tower_hit_points() {
        let mut setup = MatchSetup::default();
        setup.tower_levels = PerSide::new(1, 11);
        let state = new_match(&setup, &Catalog::standard()).expect("match");
        let player = state.towers_of(Side::Player).map(|t| t.max_hp).sum::<f32>();
        let opponent = state.towers_of(Side::Opponent).map(|t| t.max_hp).sum::<f32>();
        assert!(opponent > player);
    }
}
