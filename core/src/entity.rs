//! Entities and projectiles that populate a battle snapshot.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    catalog::{AbilityBehavior, CardDefinition, CardType, Stats, TowerRole},
    CardId, EntityId, ProjectileId, Side,
};

/// Coarse activity of an entity, for adapters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityState {
    /// Deploying, inert or waiting for a target.
    #[default]
    Idle,
    /// Walking or flying toward a destination.
    Moving,
    /// Holding position while hitting a target.
    Attacking,
    /// Spell resolving its effect.
    Casting,
}

/// Countdowns attached to an entity. All values count down to zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timers {
    /// Remaining deploy (or spell travel) time.
    pub deploy: Duration,
    /// Remaining freeze.
    pub frozen: Duration,
    /// Remaining stun.
    pub stunned: Duration,
    /// Remaining rage.
    pub raged: Duration,
    /// Remaining root.
    pub rooted: Duration,
    /// Time spent walking toward the next charge; counts up.
    pub charge_buildup: Duration,
}

/// Kind of rolling effect a duration spell keeps applying.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Periodic damage to enemies.
    DamageOverTime,
    /// Freeze on enemies.
    Freeze,
    /// Rage on allies.
    Rage,
    /// Root on enemy ground troops.
    Root,
}

/// Countdown state of an active duration spell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DurationEffect {
    /// Effect applied on each pulse.
    pub kind: EffectKind,
    /// Effect radius.
    pub radius: f32,
    /// Damage per pulse; zero for control effects.
    pub damage: f32,
    /// Ticks left before the spell expires.
    pub remaining_ticks: u32,
    /// Ticks between two pulses.
    pub pulse_every: u32,
    /// Ticks left until the next pulse.
    pub ticks_until_pulse: u32,
}

/// Lifecycle of a spell entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SpellPhase {
    /// Travelling toward its landing point.
    Pending(AbilityBehavior),
    /// Landed and counting down a duration effect.
    Active(DurationEffect),
}

/// A troop, building, spell or tower taking part in the battle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Identifier, unique within the match.
    pub id: EntityId,
    /// Definition backing the entity.
    pub card: CardId,
    /// Broad category copied from the definition.
    pub card_type: CardType,
    /// Owner.
    pub side: Side,
    /// Arena position.
    pub position: Vec2,
    /// Remaining hit points.
    pub hp: f32,
    /// Hit points at full health.
    pub max_hp: f32,
    /// Remaining shield.
    pub shield: f32,
    /// Shield at full strength.
    pub max_shield: f32,
    /// Level the stats were scaled to.
    pub level: u32,
    /// Level-scaled stats.
    pub stats: Stats,
    /// Current target, re-validated every tick.
    pub target: Option<EntityId>,
    /// Coarse activity.
    pub state: EntityState,
    /// Status countdowns.
    pub timers: Timers,
    /// Match time of the last attack.
    pub last_attack_at: Duration,
    /// Match time of the last spawner batch.
    pub last_spawn_at: Duration,
    /// Whether the entity is currently charging.
    pub charging: bool,
    /// Whether the entity is a king tower that has not woken up.
    pub dormant: bool,
    /// Whether the entity is hidden from enemy targeting.
    pub invisible: bool,
    /// Role of a crown tower.
    pub tower_role: Option<TowerRole>,
    /// Spell lifecycle, for spells only.
    pub spell: Option<SpellPhase>,
}

impl Entity {
    /// Creates a freshly deployed entity from its definition and scaled stats.
    #[must_use]
    pub fn new(
        id: EntityId,
        definition: &CardDefinition,
        stats: Stats,
        level: u32,
        side: Side,
        position: Vec2,
    ) -> Self {
        let deploy = Duration::from_secs_f32(stats.deploy_delay.max(0.0));
        let invisible = stats.stealth;
        Self {
            id,
            card: definition.id.clone(),
            card_type: definition.card_type,
            side,
            position,
            hp: stats.hp,
            max_hp: stats.hp,
            shield: stats.shield,
            max_shield: stats.shield,
            level,
            target: None,
            state: EntityState::Idle,
            timers: Timers {
                deploy,
                ..Timers::default()
            },
            last_attack_at: Duration::ZERO,
            last_spawn_at: Duration::ZERO,
            charging: false,
            dormant: definition.tower_role == Some(TowerRole::King),
            invisible,
            tower_role: definition.tower_role,
            spell: definition.behavior.clone().map(SpellPhase::Pending),
            stats,
        }
    }

    /// Reports whether the entity is a spell.
    #[must_use]
    pub fn is_spell(&self) -> bool {
        self.card_type == CardType::Spell
    }

    /// Reports whether the entity is a crown tower.
    #[must_use]
    pub fn is_tower(&self) -> bool {
        self.tower_role.is_some()
    }

    /// Reports whether the entity is a king tower.
    #[must_use]
    pub fn is_king(&self) -> bool {
        self.tower_role == Some(TowerRole::King)
    }

    /// Reports whether the entity is a stationary structure, towers included.
    #[must_use]
    pub fn is_structure(&self) -> bool {
        self.stats.is_building || self.is_tower()
    }

    /// Reports whether the entity is a placed building, towers excluded.
    #[must_use]
    pub fn is_building(&self) -> bool {
        self.stats.is_building && !self.is_tower()
    }

    /// Reports whether the entity is a mobile troop.
    #[must_use]
    pub fn is_troop(&self) -> bool {
        !self.is_spell() && !self.is_structure()
    }

    /// Reports whether the entity still has hit points left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Reports whether the deploy countdown is still running.
    #[must_use]
    pub fn is_deploying(&self) -> bool {
        !self.timers.deploy.is_zero()
    }

    /// Reports whether a freeze or stun keeps the entity from acting.
    #[must_use]
    pub fn is_inert(&self) -> bool {
        !self.timers.frozen.is_zero() || !self.timers.stunned.is_zero()
    }

    /// Reports whether the entity is raged.
    #[must_use]
    pub fn is_raged(&self) -> bool {
        !self.timers.raged.is_zero()
    }

    /// Reports whether the entity is rooted in place.
    #[must_use]
    pub fn is_rooted(&self) -> bool {
        !self.timers.rooted.is_zero()
    }

    /// Reports whether the entity can be picked as a target by enemies.
    ///
    /// Deploying and invisible entities are skipped; area effects still reach them.
    #[must_use]
    pub fn is_targetable(&self) -> bool {
        self.is_alive() && !self.is_spell() && !self.invisible && !self.is_deploying()
    }

    /// Distance between the edges of two hitboxes, never negative.
    #[must_use]
    pub fn edge_distance(&self, other: &Entity) -> f32 {
        (self.position.distance(other.position) - self.stats.hitbox - other.stats.hitbox).max(0.0)
    }

    /// Reports whether `other` lies within attack range of this entity.
    #[must_use]
    pub fn in_range_of(&self, other: &Entity) -> bool {
        self.edge_distance(other) <= self.stats.range
    }

    /// Applies damage to the shield first and the remainder to hit points.
    pub fn apply_damage(&mut self, amount: f32) {
        if amount <= 0.0 {
            return;
        }
        let absorbed = amount.min(self.shield);
        self.shield -= absorbed;
        self.hp = (self.hp - (amount - absorbed)).clamp(0.0, self.max_hp);
    }
}

/// Extra behaviour attached to a projectile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ProjectileEffect {
    /// Wide projectile sweeping ground enemies along its path.
    Rolling {
        /// Sweep radius.
        radius: f32,
        /// Entities already struck; each is hit at most once.
        struck: Vec<EntityId>,
    },
}

/// In-flight projectile carrying damage toward a destination.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Identifier, unique within the match.
    pub id: ProjectileId,
    /// Owner.
    pub side: Side,
    /// Entity that launched the projectile, if any.
    pub source: Option<EntityId>,
    /// Launch point.
    pub start: Vec2,
    /// Landing point, refreshed while homing.
    pub destination: Vec2,
    /// Current position.
    pub position: Vec2,
    /// Fraction of the path travelled, from zero to one.
    pub progress: f32,
    /// Travel speed in arena units per second.
    pub speed: f32,
    /// Entity followed while homing.
    pub target: Option<EntityId>,
    /// Damage dealt on impact.
    pub damage: f32,
    /// Area radius; `None` for single-target projectiles.
    pub radius: Option<f32>,
    /// Peak height of the cosmetic arc.
    pub arc_height: f32,
    /// Extra behaviour, for rolling spells.
    pub effect: Option<ProjectileEffect>,
    /// Whether crown towers receive reduced damage.
    pub crown_tower_scaled: bool,
}

/// Request to create a projectile; the world assigns its identifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Launch {
    /// Owner.
    pub side: Side,
    /// Entity launching the projectile, if any.
    pub source: Option<EntityId>,
    /// Launch point.
    pub start: Vec2,
    /// Landing point.
    pub destination: Vec2,
    /// Travel speed in arena units per second.
    pub speed: f32,
    /// Entity to follow while homing.
    pub target: Option<EntityId>,
    /// Damage dealt on impact.
    pub damage: f32,
    /// Area radius; `None` for single-target projectiles.
    pub radius: Option<f32>,
    /// Peak height of the cosmetic arc.
    pub arc_height: f32,
    /// Extra behaviour, for rolling spells.
    pub effect: Option<ProjectileEffect>,
    /// Whether crown towers receive reduced damage.
    pub crown_tower_scaled: bool,
}

impl Launch {
    /// Turns the request into an in-flight projectile.
    #[must_use]
    pub fn into_projectile(self, id: ProjectileId) -> Projectile {
        Projectile {
            id,
            side: self.side,
            source: self.source,
            start: self.start,
            destination: self.destination,
            position: self.start,
            progress: 0.0,
            speed: self.speed,
            target: self.target,
            damage: self.damage,
            radius: self.radius,
            arc_height: self.arc_height,
            effect: self.effect,
            crown_tower_scaled: self.crown_tower_scaled,
        }
    }
}

impl Projectile {
    /// Cosmetic height above the ground at the current progress.
    #[must_use]
    pub fn height(&self) -> f32 {
        4.0 * self.arc_height * self.progress * (1.0 - self.progress)
    }

    /// Reports whether the projectile sweeps along its path.
    #[must_use]
    pub fn is_rolling(&self) -> bool {
        matches!(self.effect, Some(ProjectileEffect::Rolling { .. }))
    }
}
