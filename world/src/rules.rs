//! Match clock, elixir economy and win conditions.

use std::{cmp::Ordering, time::Duration};

use lane_clash_core::{BattleState, Event, PerSide, Phase, Side, MAX_ELIXIR};
use rand::Rng;
use tracing::{debug, info};

/// Side holding more crowns, if any.
fn leader(crowns: &PerSide<u8>) -> Option<Side> {
    match crowns.player.cmp(&crowns.opponent) {
        Ordering::Greater => Some(Side::Player),
        Ordering::Less => Some(Side::Opponent),
        Ordering::Equal => None,
    }
}

fn finish(state: &mut BattleState, winner: Option<Side>) {
    state.game_over = true;
    state.winner = winner;
}

/// Counts the phase clock down and handles its expiry.
pub(crate) fn advance_clock(state: &mut BattleState, dt: Duration, out_events: &mut Vec<Event>) {
    state.time_remaining = state.time_remaining.saturating_sub(dt);
    if !state.time_remaining.is_zero() {
        return;
    }

    let leader = leader(&state.crowns);
    match (state.phase, leader) {
        (Phase::Regular, None) => {
            state.phase = Phase::Overtime;
            state.time_remaining = state.rules.overtime;
            state.overtime_baseline = state.crowns;
            debug!(crowns = state.crowns.player, "regular time tied, overtime starts");
            out_events.push(Event::PhaseChanged {
                phase: Phase::Overtime,
            });
        }
        (Phase::Overtime, None) => {
            state.phase = Phase::Tiebreaker;
            debug!("overtime tied, match ends in a draw");
            out_events.push(Event::PhaseChanged {
                phase: Phase::Tiebreaker,
            });
            finish(state, None);
        }
        (_, winner) => finish(state, winner),
    }
}

/// Regenerates both elixir pools at the rate of the current phase.
pub(crate) fn regenerate_elixir(state: &mut BattleState, dt: Duration) {
    let multiplier = state
        .rules
        .elixir_multiplier(state.mode, state.phase, state.time_remaining);
    let gain = state.rules.elixir_gain(multiplier, dt);
    for side in Side::ALL {
        let pool = state.elixir.get_mut(side);
        *pool = (*pool + gain).clamp(0.0, MAX_ELIXIR);
    }
}

/// Recomputes crowns from the towers still standing.
pub(crate) fn score_crowns(
    previous: &BattleState,
    next: &mut BattleState,
    out_events: &mut Vec<Event>,
) {
    for side in Side::ALL {
        let crowns = next.crowns_from_towers(side);
        if crowns > *previous.crowns.get(side) {
            debug!(?side, crowns, "crown scored");
            out_events.push(Event::CrownScored { side, crowns });
        }
        *next.crowns.get_mut(side) = crowns;
    }
}

/// Ends the match when a king falls or a mode-specific crown trigger fires.
///
/// Sudden death ends on any crown lead; otherwise overtime ends on the first
/// crown scored after overtime began.
pub(crate) fn evaluate_winner(state: &mut BattleState) {
    let kings = PerSide::new(state.king_alive(Side::Player), state.king_alive(Side::Opponent));
    match (kings.player, kings.opponent) {
        (true, true) => {}
        (false, true) => return finish(state, Some(Side::Opponent)),
        (true, false) => return finish(state, Some(Side::Player)),
        (false, false) => {
            let winner = leader(&state.crowns);
            return finish(state, winner);
        }
    }

    if state.mode.is_sudden_death() {
        if let Some(winner) = leader(&state.crowns) {
            finish(state, Some(winner));
        }
    } else if state.phase == Phase::Overtime {
        let scored = PerSide::new(
            state.crowns.player > state.overtime_baseline.player,
            state.crowns.opponent > state.overtime_baseline.opponent,
        );
        let winner = match (scored.player, scored.opponent) {
            (true, false) => Some(Side::Player),
            (false, true) => Some(Side::Opponent),
            (true, true) => leader(&state.crowns),
            (false, false) => None,
        };
        if winner.is_some() {
            finish(state, winner);
        }
    }
}

/// Assigns the trophy delta the first time the match is seen finished.
pub(crate) fn settle_trophies<R>(state: &mut BattleState, rng: &mut R, out_events: &mut Vec<Event>)
where
    R: Rng + ?Sized,
{
    if !state.game_over || state.trophy_delta.is_some() {
        return;
    }
    let low = state.rules.trophy_min.min(state.rules.trophy_max);
    let high = state.rules.trophy_min.max(state.rules.trophy_max);
    let delta = match state.winner {
        Some(Side::Player) => rng.gen_range(low..=high),
        Some(Side::Opponent) => -rng.gen_range(low..=high),
        None => 0,
    };
    state.trophy_delta = Some(delta);
    info!(
        winner = ?state.winner,
        crowns_player = state.crowns.player,
        crowns_opponent = state.crowns.opponent,
        trophy_delta = delta,
        "match ended"
    );
    out_events.push(Event::MatchEnded {
        winner: state.winner,
        trophy_delta: delta,
    });
}
