//! Tuning knobs of the scripted opponent.

use std::time::Duration;

/// Aggregated tuning knobs controlling every adjustable aspect of the opponent policy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OpponentTuning {
    /// Maps trophies to difficulty and card level.
    pub skill: SkillTuning,
    /// Controls how often the policy acts.
    pub cadence: CadenceTuning,
    /// Controls threat detection and defensive card choice.
    pub defense: DefenseTuning,
    /// Controls when and where the policy pushes.
    pub offense: OffenseTuning,
    /// Controls where cards land relative to their anchor.
    pub placement: PlacementTuning,
    /// Controls cosmetic emotes.
    pub emote: EmoteTuning,
}

/// Difficulty and level curve.
#[derive(Clone, Debug, PartialEq)]
pub struct SkillTuning {
    /// Trophies at which difficulty reaches one.
    pub trophies_for_full_difficulty: f32,
    /// Trophies needed per extra card level.
    pub trophies_per_level: u32,
    /// Highest level the policy plays at.
    pub max_level: u32,
}

impl Default for SkillTuning {
    fn default() -> Self {
        Self {
            trophies_for_full_difficulty: 4_000.0,
            trophies_per_level: 500,
            max_level: 11,
        }
    }
}

/// Decision cadence; skilled opponents think faster.
#[derive(Clone, Debug, PartialEq)]
pub struct CadenceTuning {
    /// Interval between decisions at difficulty zero.
    pub base_interval: Duration,
    /// Interval removed at difficulty one.
    pub difficulty_speedup: Duration,
    /// Maximum random deviation added to or removed from each interval.
    pub jitter: Duration,
}

impl Default for CadenceTuning {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_millis(1_500),
            difficulty_speedup: Duration::from_millis(700),
            jitter: Duration::from_millis(400),
        }
    }
}

/// Threat detection and defensive scoring.
#[derive(Clone, Debug, PartialEq)]
pub struct DefenseTuning {
    /// How far past the centre line toward the enemy an enemy troop may
    /// still be before it counts as a threat.
    pub threat_line_offset: f32,
    /// Hit points above which a building-targeting threat counts as a tank.
    pub tank_hp: f32,
    /// Units per placement from which a card counts as a swarm.
    pub swarm_size: u32,
    /// Threats that must share a spell's radius before the spell is used defensively.
    pub cluster_size: usize,
    /// Score bonus for cards able to hit an air threat.
    pub anti_air_bonus: f32,
    /// Score bonus for swarms answering a tank.
    pub swarm_vs_tank_bonus: f32,
    /// Score penalty for swarms facing melee splash.
    pub swarm_vs_splash_penalty: f32,
    /// Score removed per elixir of cost.
    pub cost_penalty: f32,
}

impl Default for DefenseTuning {
    fn default() -> Self {
        Self {
            threat_line_offset: 8.0,
            tank_hp: 1_000.0,
            swarm_size: 3,
            cluster_size: 3,
            anti_air_bonus: 2.0,
            swarm_vs_tank_bonus: 2.0,
            swarm_vs_splash_penalty: 2.0,
            cost_penalty: 0.1,
        }
    }
}

/// Offensive trigger and lane choice.
#[derive(Clone, Debug, PartialEq)]
pub struct OffenseTuning {
    /// Elixir at which the policy always pushes.
    pub full_elixir: f32,
    /// Elixir below which the policy never pushes.
    pub min_elixir: f32,
    /// Push chance per decision at difficulty zero.
    pub base_chance: f32,
    /// Push chance added at difficulty one.
    pub difficulty_chance: f32,
    /// Chance at difficulty zero to follow friendly pressure when picking a flank.
    pub flank_follow_base: f32,
    /// Flank-follow chance added at difficulty one.
    pub flank_follow_difficulty: f32,
    /// Hit points from which a troop counts as a tank worth leading a push.
    pub tank_hp: f32,
    /// Distance behind the river at which pushes are placed.
    pub bridge_setback: f32,
}

impl Default for OffenseTuning {
    fn default() -> Self {
        Self {
            full_elixir: 9.0,
            min_elixir: 6.0,
            base_chance: 0.05,
            difficulty_chance: 0.15,
            flank_follow_base: 0.4,
            flank_follow_difficulty: 0.5,
            tank_hp: 1_000.0,
            bridge_setback: 3.0,
        }
    }
}

/// Anchoring of defensive placements and placement noise.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementTuning {
    /// Distance toward home at which melee defenders land in front of a threat.
    pub melee_offset: f32,
    /// Distance toward home at which ranged defenders land behind a threat.
    pub ranged_offset: f32,
    /// Fraction of the way a defensive building moves toward the arena centre line.
    pub building_pull: f32,
    /// Distance from the centre line at which defensive buildings land.
    pub building_depth: f32,
    /// Placement noise radius at difficulty zero; shrinks to nothing at difficulty one.
    pub max_jitter: f32,
}

impl Default for PlacementTuning {
    fn default() -> Self {
        Self {
            melee_offset: 3.0,
            ranged_offset: 8.0,
            building_pull: 0.5,
            building_depth: 20.0,
            max_jitter: 4.0,
        }
    }
}

/// Emote frequency.
#[derive(Clone, Debug, PartialEq)]
pub struct EmoteTuning {
    /// Emote chance per tick at difficulty zero.
    pub base_chance: f32,
    /// Emote chance added at difficulty one.
    pub difficulty_chance: f32,
}

impl Default for EmoteTuning {
    fn default() -> Self {
        Self {
            base_chance: 0.002,
            difficulty_chance: 0.01,
        }
    }
}
