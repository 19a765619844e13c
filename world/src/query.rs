//! Query functions that provide read-only access to the world state.

use lane_clash_core::{BattleState, CardId, Catalog, Entity, PerSide, Side, HAND_SIZE};

use crate::World;

/// Provides read-only access to the current battle snapshot.
#[must_use]
pub fn state(world: &World) -> &BattleState {
    &world.state
}

/// Provides read-only access to the card catalog.
#[must_use]
pub fn catalog(world: &World) -> &Catalog {
    &world.catalog
}

/// Elixir currently available to `side`.
#[must_use]
pub fn elixir(world: &World, side: Side) -> f32 {
    *world.state.elixir.get(side)
}

/// Crowns held by both sides.
#[must_use]
pub fn crowns(world: &World) -> PerSide<u8> {
    world.state.crowns
}

/// Cards `side` may play right now.
#[must_use]
pub fn hand(world: &World, side: Side) -> &[CardId; HAND_SIZE] {
    &world.state.decks.get(side).hand
}

/// Living entities owned by `side`, spells excluded.
pub fn units_of(world: &World, side: Side) -> impl Iterator<Item = &Entity> {
    world
        .state
        .entities_of(side)
        .filter(|entity| entity.is_alive() && !entity.is_spell())
}

/// Final result of the match once it is over.
#[must_use]
pub fn outcome(world: &World) -> Option<Outcome> {
    let state = &world.state;
    state.game_over.then(|| Outcome {
        winner: state.winner,
        crowns: state.crowns,
        trophy_delta: state.trophy_delta.unwrap_or(0),
    })
}

/// Result of a finished match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// Winning side, or `None` on a draw.
    pub winner: Option<Side>,
    /// Crowns held at the end.
    pub crowns: PerSide<u8>,
    /// Trophy change from the player's point of view.
    pub trophy_delta: i32,
}
