use std::time::Duration;

use glam::Vec2;
use lane_clash_core::{arena, CardId, Catalog, Entity, EntityId, Side};
use lane_clash_system_movement::Movement;

const TICK: Duration = Duration::from_millis(100);

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

#[test]
fn units_walk_toward_their_destination_at_their_speed() {
    let knight = spawn("knight", 1, Side::Player, (20.0, 80.0));
    let step = Movement::default().step(&knight, Vec2::new(20.0, 60.0), 0.0, &[], TICK);
    assert!(step.moved);
    assert!((step.position.y - 79.4).abs() < 1e-4, "moved to {:?}", step.position);
    assert_eq!(step.position.x, 20.0);
}

#[test]
fn steps_never_overshoot_the_stop_distance() {
    let knight = spawn("knight", 1, Side::Player, (20.0, 60.0));
    let step = Movement::default().step(&knight, Vec2::new(20.0, 59.0), 0.5, &[], TICK);
    assert!((step.position.y - 59.5).abs() < 1e-4);

    let arrived = Movement::default().step(&knight, Vec2::new(20.0, 59.8), 0.5, &[], TICK);
    assert!(!arrived.moved);
    assert_eq!(arrived.position, knight.position);
}

#[test]
fn rage_speeds_units_up() {
    let mut knight = spawn("knight", 1, Side::Player, (20.0, 80.0));
    knight.timers.raged = Duration::from_secs(1);
    let step = Movement::default().step(&knight, Vec2::new(20.0, 60.0), 0.0, &[], TICK);
    assert!((80.0 - step.position.y - 0.6 * 1.35).abs() < 1e-4);
}

#[test]
fn rooted_units_hold_position() {
    let mut knight = spawn("knight", 1, Side::Player, (20.0, 80.0));
    knight.timers.rooted = Duration::from_secs(1);
    let step = Movement::default().step(&knight, Vec2::new(20.0, 60.0), 0.0, &[], TICK);
    assert!(!step.moved);
}

#[test]
fn ground_units_funnel_toward_the_nearest_bridge() {
    let knight = spawn("knight", 1, Side::Player, (40.0, 55.0));
    let heading = Movement::default().heading(&knight, Vec2::new(40.0, 20.0), &[]);
    assert!(heading.x < 0.0, "expected a pull toward the left bridge: {heading:?}");

    let minion = spawn("minions", 2, Side::Player, (40.0, 55.0));
    let heading = Movement::default().heading(&minion, Vec2::new(40.0, 20.0), &[]);
    assert_eq!(heading, Vec2::new(0.0, -1.0));
}

#[test]
fn units_on_a_bridge_cross_straight() {
    let knight = spawn("knight", 1, Side::Player, (20.0, 55.0));
    let heading = Movement::default().heading(&knight, Vec2::new(20.0, 20.0), &[]);
    assert_eq!(heading, Vec2::new(0.0, -1.0));
}

#[test]
fn units_crossing_at_an_angle_stay_on_the_bridge() {
    let movement = Movement::default();
    let mut knight = spawn("knight", 1, Side::Player, (24.0, 56.0));
    let king = Vec2::new(50.0, 8.0);
    let mut ticks = 0;
    while knight.position.y >= arena::RIVER_TOP {
        let step = movement.step(&knight, king, 0.0, &[], TICK);
        assert!(step.moved, "stalled at {:?}", knight.position);
        knight.position = step.position;
        let mut units = vec![knight.clone()];
        movement.separate(&mut units);
        knight.position = units[0].position;
        if arena::in_river(knight.position.y) {
            assert!(arena::aligned_with_bridge(knight.position.x), "left the deck at {:?}", knight.position);
        }
        ticks += 1;
        assert!(ticks < 100, "never cleared the river");
    }
}

#[test]
fn units_nudged_off_a_deck_return_to_it() {
    let mut entities = vec![spawn("knight", 1, Side::Player, (25.5, 50.0))];
    Movement::default().separate(&mut entities);
    assert_eq!(entities[0].position, Vec2::new(24.0, 50.0));
}

#[test]
fn ground_units_steer_around_buildings() {
    let knight = spawn("knight", 1, Side::Player, (49.0, 76.0));
    let cannon = spawn("cannon", 2, Side::Player, (50.0, 70.0));
    let heading = Movement::default().heading(&knight, Vec2::new(50.0, 60.0), &[cannon.clone()]);
    assert!(heading.x < 0.0, "expected to veer away from the cannon: {heading:?}");
    assert!((heading.length() - 1.0).abs() < 1e-4);

    let heading = Movement::default().heading(&knight, cannon.position, &[cannon]);
    assert!(heading.x > 0.0, "the target itself is not avoided");
}

#[test]
fn charge_builds_up_while_walking() {
    let prince = spawn("prince", 1, Side::Player, (20.0, 90.0));
    let movement = Movement::default();
    let mut walker = prince;
    let mut ticks = 0;
    while !walker.charging {
        let step = movement.step(&walker, Vec2::new(20.0, 10.0), 0.0, &[], TICK);
        walker.position = step.position;
        walker.timers.charge_buildup = step.charge_buildup;
        walker.charging = step.charging;
        ticks += 1;
        assert!(ticks < 100, "charge never started");
    }
    assert_eq!(ticks, 20);
}

#[test]
fn heavier_units_yield_less() {
    let mut entities = vec![
        spawn("giant", 1, Side::Player, (50.0, 70.0)),
        spawn("skeletons", 2, Side::Player, (52.0, 70.0)),
    ];
    Movement::default().separate(&mut entities);
    let giant_shift = (entities[0].position.x - 50.0).abs();
    let skeleton_shift = (entities[1].position.x - 52.0).abs();
    assert!(giant_shift < skeleton_shift);
    let gap = entities[0].position.distance(entities[1].position);
    assert!((gap - 4.5).abs() < 1e-4);
}

#[test]
fn structures_are_immovable_and_layers_do_not_collide() {
    let mut entities = vec![
        spawn("cannon", 1, Side::Player, (50.0, 70.0)),
        spawn("knight", 2, Side::Opponent, (51.0, 70.0)),
        spawn("minions", 3, Side::Opponent, (50.0, 70.0)),
    ];
    Movement::default().separate(&mut entities);
    assert_eq!(entities[0].position, Vec2::new(50.0, 70.0));
    assert!((entities[1].position.x - 56.0).abs() < 1e-4);
    assert_eq!(entities[2].position, Vec2::new(50.0, 70.0));
}

#[test]
fn separation_keeps_units_inside_the_arena_and_off_the_river() {
    let mut entities = vec![
        spawn("knight", 1, Side::Player, (0.5, 99.5)),
        spawn("knight", 2, Side::Player, (0.5, 99.5)),
        spawn("knight", 3, Side::Player, (50.0, 51.0)),
    ];
    Movement::default().separate(&mut entities);
    for entity in &entities {
        assert!((0.0..=arena::ARENA_WIDTH).contains(&entity.position.x));
        assert!((0.0..=arena::ARENA_HEIGHT).contains(&entity.position.y));
    }
    assert!(!arena::in_river(entities[2].position.y));
}
