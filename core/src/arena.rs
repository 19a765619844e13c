//! Fixed geometry of the two-lane arena.
//!
//! Coordinates are normalized to a `0..=100` square. The river runs
//! horizontally through the middle and can only be crossed by ground units at
//! one of the two bridges.

use glam::Vec2;

use crate::{catalog::TowerRole, Side};

/// Width of the arena in normalized units.
pub const ARENA_WIDTH: f32 = 100.0;
/// Height of the arena in normalized units.
pub const ARENA_HEIGHT: f32 = 100.0;
/// Upper edge of the river band.
pub const RIVER_TOP: f32 = 46.0;
/// Lower edge of the river band.
pub const RIVER_BOTTOM: f32 = 54.0;
/// Horizontal centres of the two bridges.
pub const BRIDGE_XS: [f32; 2] = [20.0, 80.0];
/// Half width of a bridge deck; ground units inside it may cross.
pub const BRIDGE_HALF_WIDTH: f32 = 4.0;
/// Distance from the river band at which ground units start funneling.
pub const FUNNEL_MARGIN: f32 = 3.0;
/// Margin kept between deployed cards and the arena edges.
pub const DEPLOY_EDGE_MARGIN: f32 = 2.0;

/// Horizontal centre line of the arena.
pub const MID_X: f32 = ARENA_WIDTH / 2.0;
/// Vertical centre line of the arena.
pub const MID_Y: f32 = ARENA_HEIGHT / 2.0;

/// Returns the arena position of a tower slot for `side`.
///
/// Princess towers sit in line with the bridges, the king tower guards the
/// back centre. The opponent layout mirrors the player layout vertically.
#[must_use]
pub fn tower_slot(side: Side, role: TowerRole, lane: usize) -> Vec2 {
    let player = match role {
        TowerRole::King => Vec2::new(MID_X, 92.0),
        TowerRole::Princess => Vec2::new(BRIDGE_XS[lane.min(1)], 80.0),
    };
    match side {
        Side::Player => player,
        Side::Opponent => mirror(player),
    }
}

/// Mirrors a position across the river.
#[must_use]
pub fn mirror(position: Vec2) -> Vec2 {
    Vec2::new(position.x, ARENA_HEIGHT - position.y)
}

/// Reports whether `y` lies inside the river band.
#[must_use]
pub fn in_river(y: f32) -> bool {
    (RIVER_TOP..=RIVER_BOTTOM).contains(&y)
}

/// Reports whether `y` lies inside the widened band where funneling applies.
#[must_use]
pub fn near_river(y: f32) -> bool {
    (RIVER_TOP - FUNNEL_MARGIN..=RIVER_BOTTOM + FUNNEL_MARGIN).contains(&y)
}

/// Returns the centre of the bridge closest to `x`.
#[must_use]
pub fn nearest_bridge_x(x: f32) -> f32 {
    if (x - BRIDGE_XS[0]).abs() <= (x - BRIDGE_XS[1]).abs() {
        BRIDGE_XS[0]
    } else {
        BRIDGE_XS[1]
    }
}

/// Reports whether `x` lies on a bridge deck.
#[must_use]
pub fn aligned_with_bridge(x: f32) -> bool {
    (x - nearest_bridge_x(x)).abs() <= BRIDGE_HALF_WIDTH
}

/// Reports whether `y` lies on the half of the arena owned by `side`.
#[must_use]
pub fn on_own_half(side: Side, y: f32) -> bool {
    match side {
        Side::Player => y > MID_Y,
        Side::Opponent => y < MID_Y,
    }
}

/// Clamps a position into the arena bounds.
#[must_use]
pub fn clamp_to_arena(position: Vec2) -> Vec2 {
    Vec2::new(
        position.x.clamp(0.0, ARENA_WIDTH),
        position.y.clamp(0.0, ARENA_HEIGHT),
    )
}

/// Inclusive corners of the region in which `side` may deploy troops and buildings.
#[must_use]
pub fn deploy_zone(side: Side) -> (Vec2, Vec2) {
    match side {
        Side::Player => (
            Vec2::new(DEPLOY_EDGE_MARGIN, RIVER_BOTTOM + 1.0),
            Vec2::new(ARENA_WIDTH - DEPLOY_EDGE_MARGIN, ARENA_HEIGHT - DEPLOY_EDGE_MARGIN),
        ),
        Side::Opponent => (
            Vec2::new(DEPLOY_EDGE_MARGIN, DEPLOY_EDGE_MARGIN),
            Vec2::new(ARENA_WIDTH - DEPLOY_EDGE_MARGIN, RIVER_TOP - 1.0),
        ),
    }
}

/// Reports whether `position` lies inside the deploy zone of `side`.
#[must_use]
pub fn in_deploy_zone(side: Side, position: Vec2) -> bool {
    let (min, max) = deploy_zone(side);
    position.cmpge(min).all() && position.cmple(max).all()
}

/// Clamps `position` into the deploy zone of `side`.
#[must_use]
pub fn clamp_to_deploy_zone(side: Side, position: Vec2) -> Vec2 {
    let (min, max) = deploy_zone(side);
    position.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opponent_towers_mirror_player_towers() {
        let player = tower_slot(Side::Player, TowerRole::Princess, 1);
        let opponent = tower_slot(Side::Opponent, TowerRole::Princess, 1);
        assert_eq!(player, Vec2::new(80.0, 80.0));
        assert_eq!(opponent, Vec2::new(80.0, 20.0));
        assert_eq!(tower_slot(Side::Opponent, TowerRole::King, 0), Vec2::new(50.0, 8.0));
    }

    #[test]
    fn bridges_are_detected_by_proximity() {
        assert_eq!(nearest_bridge_x(10.0), 20.0);
        assert_eq!(nearest_bridge_x(70.0), 80.0);
        assert!(aligned_with_bridge(22.5));
        assert!(!aligned_with_bridge(50.0));
    }

    #[test]
    fn river_bands_nest() {
        assert!(in_river(50.0));
        assert!(!in_river(44.0));
        assert!(near_river(44.0));
        assert!(!near_river(30.0));
    }

    #[test]
    fn deploy_zones_stay_on_own_half() {
        for side in Side::ALL {
            let (min, max) = deploy_zone(side);
            assert!(on_own_half(side, min.y));
            assert!(on_own_half(side, max.y));
        }
        let clamped = clamp_to_deploy_zone(Side::Opponent, Vec2::new(50.0, 80.0));
        assert_eq!(clamped, Vec2::new(50.0, RIVER_TOP - 1.0));
        assert!(in_deploy_zone(Side::Opponent, clamped));
    }
}
