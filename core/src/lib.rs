#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lane Clash battle engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired transitions, the world executes those commands via its
//! `apply` entry point and returns a fresh [`BattleState`] snapshot, then
//! reports what happened through [`Event`] values. Systems read immutable
//! snapshots and respond exclusively with plain data (impacts, projectiles,
//! decisions) that the world folds into the next generation.

use std::{collections::VecDeque, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub mod arena;
pub mod catalog;
pub mod damage;
pub mod entity;
pub mod error;
pub mod state;

pub use catalog::{
    AbilityBehavior, AttackStyle, CardDefinition, CardType, Catalog, MovementClass, SpawnRule,
    SpawnerRule, Stats, TargetingClass, TowerRole,
};
pub use damage::{Impact, CHARGE_DAMAGE_MULTIPLIER, CROWN_TOWER_DAMAGE_FACTOR, RAGE_MULTIPLIER};
pub use entity::{
    DurationEffect, EffectKind, Entity, EntityState, Launch, Projectile, ProjectileEffect,
    SpellPhase, Timers,
};
pub use error::SimError;
pub use state::{BattleState, DeckState, GameMode, MatchRules, Phase, HAND_SIZE, MAX_ELIXIR};

/// One of the two competitors sharing the arena.
///
/// The player occupies the bottom half of the arena (large `y`), the opponent
/// occupies the top half (small `y`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// Bottom side, advancing toward decreasing `y`.
    Player,
    /// Top side, advancing toward increasing `y`.
    Opponent,
}

impl Side {
    /// Both sides in their canonical iteration order.
    pub const ALL: [Side; 2] = [Side::Player, Side::Opponent];

    /// Returns the competitor facing this side.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Player => Self::Opponent,
            Self::Opponent => Self::Player,
        }
    }

    /// Sign of the `y` axis this side advances along.
    #[must_use]
    pub const fn forward(self) -> f32 {
        match self {
            Self::Player => -1.0,
            Self::Opponent => 1.0,
        }
    }
}

/// Pair of values indexed by [`Side`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerSide<T> {
    /// Value owned by the player side.
    pub player: T,
    /// Value owned by the opponent side.
    pub opponent: T,
}

impl<T> PerSide<T> {
    /// Creates a pair from explicit values.
    #[must_use]
    pub const fn new(player: T, opponent: T) -> Self {
        Self { player, opponent }
    }

    /// Borrows the value owned by `side`.
    #[must_use]
    pub const fn get(&self, side: Side) -> &T {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }

    /// Mutably borrows the value owned by `side`.
    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Player => &mut self.player,
            Side::Opponent => &mut self.opponent,
        }
    }
}

impl<T: Clone> PerSide<T> {
    /// Creates a pair holding the same value for both sides.
    #[must_use]
    pub fn splat(value: T) -> Self {
        Self {
            player: value.clone(),
            opponent: value,
        }
    }
}

/// Unique identifier assigned to an entity for the lifetime of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an in-flight projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Catalog key naming a card definition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    /// Creates a card identifier from its catalog name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Catalog name of the card.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cosmetic reactions a scripted side may display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emote {
    /// Friendly laugh.
    Laugh,
    /// Thumbs up.
    ThumbsUp,
    /// Angry face.
    Angry,
    /// Crying face.
    Crying,
}

impl Emote {
    /// Every emote the policy may pick from.
    pub const ALL: [Emote; 4] = [Emote::Laugh, Emote::ThumbsUp, Emote::Angry, Emote::Crying];
}

/// Outcome of one run of a scripted side's decision policy.
///
/// A decision never mutates state by itself; the world validates and folds it
/// in when handed a [`Command::ApplyDecision`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Card committed by the decision, if any.
    pub card: Option<CardId>,
    /// Entities materialized for the committed card.
    pub spawned: Vec<Entity>,
    /// Elixir deducted for the committed card.
    pub elixir_spent: f32,
    /// Hand after cycling the committed card out, if it changed.
    pub hand: Option<[CardId; HAND_SIZE]>,
    /// Draw queue after cycling the committed card in, if it changed.
    pub cycle: Option<VecDeque<CardId>>,
    /// Cosmetic emote chosen this tick.
    pub emote: Option<Emote>,
    /// Earliest match time at which the policy runs again.
    pub next_decision_at: Duration,
}

/// Commands that express all permissible battle transitions.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Places a card from a side's hand at the provided arena position.
    PlayCard {
        /// Side deploying the card.
        side: Side,
        /// Card taken from the side's hand.
        card: CardId,
        /// Arena coordinate the card lands on.
        position: Vec2,
        /// Level the card is materialized at.
        level: u32,
    },
    /// Folds the output of a decision policy into the battle.
    ApplyDecision {
        /// Side the decision was computed for.
        side: Side,
        /// Decision returned by the policy.
        decision: Decision,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a side committed a card.
    CardPlayed {
        /// Side that played the card.
        side: Side,
        /// Card that was played.
        card: CardId,
        /// Arena coordinate the card was placed at.
        position: Vec2,
    },
    /// Cosmetic marker emitted when an entity finishes deploying.
    Deployed {
        /// Entity that became active.
        entity: EntityId,
        /// Definition backing the entity.
        card: CardId,
        /// Position at which the entity became active.
        position: Vec2,
    },
    /// Confirms that an entity was created by a spawner, death spawn or summon.
    EntitySpawned {
        /// Identifier assigned to the new entity.
        entity: EntityId,
        /// Definition backing the entity.
        card: CardId,
        /// Owner of the new entity.
        side: Side,
        /// Position the entity appeared at.
        position: Vec2,
    },
    /// Confirms that an entity was removed after its hit points ran out.
    EntityDestroyed {
        /// Identifier of the removed entity.
        entity: EntityId,
        /// Definition backing the entity.
        card: CardId,
        /// Owner of the removed entity.
        side: Side,
    },
    /// Reports that a spell resolved its effect at a position.
    SpellResolved {
        /// Spell entity that resolved.
        entity: EntityId,
        /// Definition backing the spell.
        card: CardId,
        /// Arena coordinate of the effect.
        position: Vec2,
    },
    /// Reports that a projectile reached its destination.
    ProjectileImpact {
        /// Projectile that landed.
        projectile: ProjectileId,
        /// Arena coordinate of the impact.
        position: Vec2,
    },
    /// Reports that a dormant king tower woke up.
    KingActivated {
        /// Owner of the king tower.
        side: Side,
    },
    /// Reports that a side destroyed an enemy tower.
    CrownScored {
        /// Side that earned the crown.
        side: Side,
        /// Crowns held by the scorer after the tower fell.
        crowns: u8,
    },
    /// Announces that the match entered a new phase.
    PhaseChanged {
        /// Phase that became active.
        phase: Phase,
    },
    /// Cosmetic emote displayed by a side.
    Emote {
        /// Side showing the emote.
        side: Side,
        /// Emote displayed.
        emote: Emote,
    },
    /// Announces the end of the match.
    MatchEnded {
        /// Winning side, or `None` on a draw.
        winner: Option<Side>,
        /// Trophy change from the player's point of view.
        trophy_delta: i32,
    },
}

#[cfg(test)]
mod tests {
    use super::{CardId, EntityId, PerSide, Side};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn sides_face_each_other() {
        assert_eq!(Side::Player.other(), Side::Opponent);
        assert_eq!(Side::Opponent.other(), Side::Player);
        assert!(Side::Player.forward() < 0.0);
        assert!(Side::Opponent.forward() > 0.0);
    }

    #[test]
    fn per_side_indexes_by_side() {
        let mut pair = PerSide::new(3, 7);
        assert_eq!(*pair.get(Side::Player), 3);
        *pair.get_mut(Side::Opponent) += 1;
        assert_eq!(pair.opponent, 8);
    }

    #[test]
    fn entity_id_round_trips_through_bincode() {
        assert_round_trip(&EntityId::new(42));
    }

    #[test]
    fn card_id_round_trips_through_bincode() {
        assert_round_trip(&CardId::new("knight"));
    }
}
