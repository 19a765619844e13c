//! Error type surfaced by engine operations.

use glam::Vec2;
use thiserror::Error;

use crate::{CardId, Side};

/// Failures reported by the engine when a request cannot be honoured.
///
/// Gameplay inconsistencies such as vanished targets are recovered locally and
/// never surface here; these variants describe requests the caller got wrong.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SimError {
    /// A card identifier is missing from the catalog.
    #[error("unknown card definition `{0}`")]
    UnknownDefinition(CardId),
    /// A side attempted to spend more elixir than it holds.
    #[error("{side:?} cannot afford {cost} elixir with {available:.2} available")]
    InsufficientElixir {
        /// Side that attempted the play.
        side: Side,
        /// Elixir the play costs.
        cost: f32,
        /// Elixir the side held.
        available: f32,
    },
    /// A card was placed outside the side's legal deploy zone.
    #[error("{side:?} cannot deploy at ({:.1}, {:.1})", .position.x, .position.y)]
    IllegalPlacement {
        /// Side that attempted the play.
        side: Side,
        /// Requested placement.
        position: Vec2,
    },
    /// A card was played that is not in the side's current hand.
    #[error("card `{0}` is not in hand")]
    CardNotInHand(CardId),
    /// A placement was attempted after the match ended.
    #[error("the match is already over")]
    MatchOver,
    /// A deck holds fewer cards than a hand.
    #[error("a deck needs at least four cards, got {0}")]
    InvalidDeck(usize),
    /// A catalog document could not be parsed.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_card() {
        let error = SimError::UnknownDefinition(CardId::new("hog-rider"));
        assert_eq!(error.to_string(), "unknown card definition `hog-rider`");
    }

    #[test]
    fn placement_messages_include_coordinates() {
        let error = SimError::IllegalPlacement {
            side: Side::Player,
            position: Vec2::new(10.0, 20.0),
        };
        assert_eq!(error.to_string(), "Player cannot deploy at (10.0, 20.0)");
    }
}
