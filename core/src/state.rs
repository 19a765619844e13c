//! Immutable battle snapshots and the rules that govern them.

use std::{collections::VecDeque, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    catalog::TowerRole,
    entity::{Entity, Projectile},
    error::SimError,
    CardId, EntityId, PerSide, Side,
};

/// Upper bound of an elixir pool.
pub const MAX_ELIXIR: f32 = 10.0;
/// Cards held in hand at any time.
pub const HAND_SIZE: usize = 4;

/// Stage of the match clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Regulation time.
    Regular,
    /// Extra time after a tied regulation.
    Overtime,
    /// Terminal draw after a tied overtime.
    Tiebreaker,
}

/// Match variant selecting elixir and win-condition overrides.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// Ordinary rules.
    #[default]
    Standard,
    /// Elixir regenerates three times as fast throughout.
    TripleElixir,
    /// Doubled elixir, and any crown lead ends the match.
    SuddenDeath,
    /// Every non-spell entity is permanently raged.
    RageMode,
}

impl GameMode {
    /// Elixir multiplier imposed by the mode regardless of the clock.
    #[must_use]
    pub const fn fixed_elixir_multiplier(self) -> Option<f32> {
        match self {
            Self::TripleElixir => Some(3.0),
            Self::SuddenDeath => Some(2.0),
            Self::Standard | Self::RageMode => None,
        }
    }

    /// Reports whether any crown lead ends the match.
    #[must_use]
    pub const fn is_sudden_death(self) -> bool {
        matches!(self, Self::SuddenDeath)
    }

    /// Reports whether every non-spell entity stays raged.
    #[must_use]
    pub const fn always_rage(self) -> bool {
        matches!(self, Self::RageMode)
    }
}

/// Clock and economy knobs for a match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchRules {
    /// Length of regulation time.
    pub regular_time: Duration,
    /// Length of overtime.
    pub overtime: Duration,
    /// Final stretch of regulation during which elixir regenerates twice as fast.
    pub double_elixir_window: Duration,
    /// Time needed to regenerate one elixir at the base rate.
    pub elixir_period: Duration,
    /// Elixir both sides start with.
    pub starting_elixir: f32,
    /// Smallest trophy change awarded for a decided match.
    pub trophy_min: i32,
    /// Largest trophy change awarded for a decided match.
    pub trophy_max: i32,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            regular_time: Duration::from_secs(180),
            overtime: Duration::from_secs(120),
            double_elixir_window: Duration::from_secs(60),
            elixir_period: Duration::from_millis(2800),
            starting_elixir: 5.0,
            trophy_min: 25,
            trophy_max: 35,
        }
    }
}

impl MatchRules {
    /// Elixir multiplier in effect for the provided mode, phase and clock.
    #[must_use]
    pub fn elixir_multiplier(&self, mode: GameMode, phase: Phase, time_remaining: Duration) -> f32 {
        if let Some(multiplier) = mode.fixed_elixir_multiplier() {
            return multiplier;
        }
        match phase {
            Phase::Regular if time_remaining <= self.double_elixir_window => 2.0,
            Phase::Regular => 1.0,
            Phase::Overtime | Phase::Tiebreaker => 2.0,
        }
    }

    /// Elixir regenerated over `dt` at the provided multiplier.
    #[must_use]
    pub fn elixir_gain(&self, multiplier: f32, dt: Duration) -> f32 {
        let period = self.elixir_period.as_secs_f32();
        if period <= 0.0 {
            return 0.0;
        }
        multiplier * dt.as_secs_f32() / period
    }
}

/// Hand, draw cycle and decision cadence of one side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeckState {
    /// Cards that may be played right now.
    pub hand: [CardId; HAND_SIZE],
    /// Cards waiting to rotate into the hand, front first.
    pub cycle: VecDeque<CardId>,
    /// Earliest match time at which a scripted policy runs again.
    pub next_decision_at: Duration,
}

impl DeckState {
    /// Deals the first cards of `deck` into the hand and queues the rest.
    pub fn from_deck(deck: &[CardId]) -> Result<Self, SimError> {
        if deck.len() < HAND_SIZE {
            return Err(SimError::InvalidDeck(deck.len()));
        }
        let hand = [
            deck[0].clone(),
            deck[1].clone(),
            deck[2].clone(),
            deck[3].clone(),
        ];
        Ok(Self {
            hand,
            cycle: deck[HAND_SIZE..].iter().cloned().collect(),
            next_decision_at: Duration::ZERO,
        })
    }

    /// Reports whether `card` is currently in hand.
    #[must_use]
    pub fn holds(&self, card: &CardId) -> bool {
        self.hand.contains(card)
    }

    /// Returns the deck after playing `card`: it moves to the back of the
    /// cycle and the front of the cycle takes its hand slot.
    pub fn played(&self, card: &CardId) -> Result<Self, SimError> {
        let slot = self
            .hand
            .iter()
            .position(|held| held == card)
            .ok_or_else(|| SimError::CardNotInHand(card.clone()))?;
        let mut next = self.clone();
        next.cycle.push_back(card.clone());
        if let Some(replacement) = next.cycle.pop_front() {
            next.hand[slot] = replacement;
        }
        Ok(next)
    }
}

/// Complete, self-contained snapshot of a battle.
///
/// Snapshots are values: the engine reads one and produces the next, so any
/// snapshot may be serialized, restored and stepped again.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleState {
    /// Active match variant.
    pub mode: GameMode,
    /// Clock and economy knobs.
    pub rules: MatchRules,
    /// Elapsed match time.
    pub now: Duration,
    /// Time left in the current phase.
    pub time_remaining: Duration,
    /// Current clock phase.
    pub phase: Phase,
    /// Elixir pools.
    pub elixir: PerSide<f32>,
    /// Crowns earned by each side.
    pub crowns: PerSide<u8>,
    /// Crowns held by each side when overtime started.
    pub overtime_baseline: PerSide<u8>,
    /// Whether the match has ended.
    pub game_over: bool,
    /// Winner of a finished match; `None` while running or on a draw.
    pub winner: Option<Side>,
    /// Trophy change from the player's point of view, assigned once.
    pub trophy_delta: Option<i32>,
    /// Entities sorted by identifier.
    pub entities: Vec<Entity>,
    /// In-flight projectiles sorted by identifier.
    pub projectiles: Vec<Projectile>,
    /// Hands and cycles.
    pub decks: PerSide<DeckState>,
    /// Identifier handed to the next entity.
    pub next_entity_id: u32,
    /// Identifier handed to the next projectile.
    pub next_projectile_id: u32,
}

impl BattleState {
    /// Looks up an entity by identifier.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities
            .binary_search_by_key(&id, |entity| entity.id)
            .ok()
            .map(|index| &self.entities[index])
    }

    /// Iterator over the entities owned by `side`.
    pub fn entities_of(&self, side: Side) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |entity| entity.side == side)
    }

    /// Iterator over the living crown towers owned by `side`.
    pub fn towers_of(&self, side: Side) -> impl Iterator<Item = &Entity> {
        self.entities_of(side)
            .filter(|entity| entity.is_tower() && entity.is_alive())
    }

    /// Number of living crown towers owned by `side`.
    #[must_use]
    pub fn towers_alive(&self, side: Side) -> usize {
        self.towers_of(side).count()
    }

    /// Reports whether the king tower of `side` still stands.
    #[must_use]
    pub fn king_alive(&self, side: Side) -> bool {
        self.towers_of(side)
            .any(|tower| tower.tower_role == Some(TowerRole::King))
    }

    /// Crowns `side` has earned from the current tower count.
    #[must_use]
    pub fn crowns_from_towers(&self, side: Side) -> u8 {
        let standing = self.towers_alive(side.other()).min(3);
        3 - standing as u8
    }
}
