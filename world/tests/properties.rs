use std::time::Duration;

use lane_clash_core::{Catalog, Command, GameMode, Side, MAX_ELIXIR};
use lane_clash_system_opponent::OpponentPolicy;
use lane_clash_world::{self as world, query, MatchSetup, World};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const MODES: [GameMode; 4] = [
    GameMode::Standard,
    GameMode::TripleElixir,
    GameMode::SuddenDeath,
    GameMode::RageMode,
];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn scripted_matches_respect_resource_and_health_bounds(
        seed in any::<u64>(),
        mode in 0_usize..MODES.len(),
        trophies in 0_u32..6_000,
        steps in prop::collection::vec(1_u64..250, 60..240),
    ) {
        let mut world = World::new(&MatchSetup::new(MODES[mode]), Catalog::standard())
            .expect("match");
        let policy = OpponentPolicy::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut events = Vec::new();

        for millis in steps {
            for side in Side::ALL {
                world::play_scripted(&mut world, &policy, side, trophies, &mut rng, &mut events)
                    .expect("policy plays stay legal");
            }
            world::apply(
                &mut world,
                Command::Tick { dt: Duration::from_millis(millis) },
                &mut rng,
                &mut events,
            )
            .expect("tick");

            let state = query::state(&world);
            for side in Side::ALL {
                let elixir = *state.elixir.get(side);
                prop_assert!((0.0..=MAX_ELIXIR).contains(&elixir), "elixir {elixir}");
                prop_assert_eq!(*state.crowns.get(side), state.crowns_from_towers(side));
            }
            for entity in &state.entities {
                prop_assert!(entity.hp <= entity.max_hp, "{:?} hp {}", entity.card, entity.hp);
                prop_assert!(entity.hp >= 0.0);
                prop_assert!(entity.shield <= entity.max_shield);
            }
            prop_assert!(state.entities.windows(2).all(|pair| pair[0].id < pair[1].id));
        }
    }

    #[test]
    fn elixir_never_leaves_its_bounds_for_any_step_size(
        mode in 0_usize..MODES.len(),
        steps in prop::collection::vec(0_u64..20_000, 1..40),
    ) {
        let mut world = World::new(&MatchSetup::new(MODES[mode]), Catalog::standard())
            .expect("match");
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut events = Vec::new();
        for millis in steps {
            world::apply(
                &mut world,
                Command::Tick { dt: Duration::from_millis(millis) },
                &mut rng,
                &mut events,
            )
            .expect("tick");
            for side in Side::ALL {
                let elixir = query::elixir(&world, side);
                prop_assert!((0.0..=MAX_ELIXIR).contains(&elixir));
            }
        }
    }
}
