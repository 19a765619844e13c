//! Read-only card catalog consumed by the engine.
//!
//! Cards describe troops, buildings, spells and towers through base
//! [`Stats`] measured at level one. Card-specific behaviour is expressed as
//! data: spells carry an [`AbilityBehavior`], buildings may carry a
//! [`SpawnerRule`], and anything may leave a [`SpawnRule`] behind on death.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{error::SimError, CardId};

/// Building lifetime applied when a definition does not name its own.
pub const DEFAULT_BUILDING_LIFETIME_SECS: f32 = 35.0;

/// Broad category of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    /// Mobile unit.
    Troop,
    /// Stationary structure that decays over time.
    Building,
    /// Short-lived pseudo-entity resolving an effect.
    Spell,
    /// Crown tower placed at match start.
    Tower,
}

/// Layer an entity moves on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementClass {
    /// Walks on the ground and must cross the river on a bridge.
    #[default]
    Ground,
    /// Flies over the river and buildings.
    Air,
}

/// Which enemies an attacker is able to hit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetingClass {
    /// Ground units, buildings and towers.
    #[default]
    Ground,
    /// Air units only.
    Air,
    /// Buildings and towers only.
    Building,
    /// Everything.
    All,
}

impl TargetingClass {
    /// Reports whether an attacker of this class can hit the described target.
    #[must_use]
    pub const fn can_target(self, movement: MovementClass, is_building: bool) -> bool {
        match self {
            Self::Ground => matches!(movement, MovementClass::Ground),
            Self::Air => matches!(movement, MovementClass::Air),
            Self::Building => is_building,
            Self::All => true,
        }
    }

    /// Reports whether this class may fall back to attacking crown towers.
    #[must_use]
    pub const fn hits_buildings(self) -> bool {
        !matches!(self, Self::Air)
    }
}

/// How an attack reaches its target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackStyle {
    /// Damage is applied directly on the tick the hit lands.
    #[default]
    Melee,
    /// A projectile carries the damage to the target.
    Ranged,
}

/// Role of a crown tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerRole {
    /// Back tower; losing it ends the match.
    King,
    /// One of the two lane towers.
    Princess,
}

/// Level-one numbers describing an entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    /// Hit points.
    pub hp: f32,
    /// Damage dealt per hit.
    pub damage: f32,
    /// Seconds between two hits.
    pub hit_interval: f32,
    /// Attack range measured between hitbox edges.
    pub range: f32,
    /// Movement speed in arena units per second.
    pub speed: f32,
    /// Layer the entity moves on.
    pub movement: MovementClass,
    /// Enemies the entity may attack.
    pub targeting: TargetingClass,
    /// Whether the entity is a stationary structure.
    pub is_building: bool,
    /// Seconds spent deploying (or travelling, for spells) before acting.
    pub deploy_delay: f32,
    /// Melee or ranged resolution.
    pub attack_style: AttackStyle,
    /// Collision and targeting radius.
    pub hitbox: f32,
    /// Area radius of each hit; zero for single-target attackers.
    pub splash_radius: f32,
    /// Speed of launched projectiles in arena units per second.
    pub projectile_speed: f32,
    /// Resistance to being pushed during collision separation.
    pub mass: f32,
    /// Shield hit points absorbed before `hp`.
    pub shield: f32,
    /// Whether the unit builds up a charge while walking.
    pub charges: bool,
    /// Whether the unit turns invisible while not attacking.
    pub stealth: bool,
    /// Seconds an undamaged building survives before decaying away.
    pub lifetime: Option<f32>,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            hp: 100.0,
            damage: 0.0,
            hit_interval: 1.0,
            range: 0.0,
            speed: 0.0,
            movement: MovementClass::Ground,
            targeting: TargetingClass::Ground,
            is_building: false,
            deploy_delay: 1.0,
            attack_style: AttackStyle::Melee,
            hitbox: 2.0,
            splash_radius: 0.0,
            projectile_speed: 60.0,
            mass: 4.0,
            shield: 0.0,
            charges: false,
            stealth: false,
            lifetime: None,
        }
    }
}

impl Stats {
    /// Reports whether the entity deals damage at all.
    #[must_use]
    pub fn can_attack(&self) -> bool {
        self.damage > 0.0 && self.range > 0.0
    }

    /// Seconds an undamaged building lasts.
    #[must_use]
    pub fn building_lifetime(&self) -> f32 {
        self.lifetime.unwrap_or(DEFAULT_BUILDING_LIFETIME_SECS)
    }
}

/// Units created at a position, for death spawns and summons.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnRule {
    /// Definition of the spawned unit.
    pub card: CardId,
    /// Units created per batch.
    pub count: u32,
}

/// Periodic production of a spawner building.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnerRule {
    /// Definition of the spawned unit.
    pub card: CardId,
    /// Units created per batch.
    pub count: u32,
    /// Seconds between two batches.
    pub interval: f32,
}

/// Closed set of spell behaviours, parameterized by catalog data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum AbilityBehavior {
    /// One damage pulse over an area.
    AreaDamage {
        /// Effect radius.
        radius: f32,
        /// Damage dealt to each enemy in range.
        damage: f32,
    },
    /// One damage pulse that also stuns.
    Stun {
        /// Effect radius.
        radius: f32,
        /// Damage dealt to each enemy in range.
        damage: f32,
        /// Seconds each struck enemy stays stunned.
        stun: f32,
    },
    /// Troops appearing at the landing point.
    Summon {
        /// Definition of the summoned troop.
        card: CardId,
        /// Troops created.
        count: u32,
        /// Fixed level of the summoned troops.
        level: u32,
    },
    /// A wide projectile rolling forward along the caster's axis.
    RollingProjectile {
        /// Sweep radius.
        radius: f32,
        /// Damage dealt to each ground enemy swept over.
        damage: f32,
        /// Distance travelled.
        range: f32,
        /// Travel speed in arena units per second.
        speed: f32,
    },
    /// Repeated damage pulses over a countdown.
    DamageOverTime {
        /// Effect radius.
        radius: f32,
        /// Damage dealt to each enemy per pulse.
        damage: f32,
        /// Countdown length in ticks.
        ticks: u32,
        /// Ticks between two pulses.
        pulse_every: u32,
    },
    /// Rolling rage applied to allies.
    Buff {
        /// Effect radius.
        radius: f32,
        /// Countdown length in ticks.
        ticks: u32,
    },
    /// Rolling freeze applied to enemies.
    Freeze {
        /// Effect radius.
        radius: f32,
        /// Countdown length in ticks.
        ticks: u32,
    },
    /// Rolling root applied to enemy ground troops.
    Root {
        /// Effect radius.
        radius: f32,
        /// Countdown length in ticks.
        ticks: u32,
    },
}

/// Complete catalog entry for a card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Catalog key.
    pub id: CardId,
    /// Broad category.
    pub card_type: CardType,
    /// Elixir cost.
    #[serde(default)]
    pub cost: u32,
    /// Entities created per placement.
    #[serde(default = "default_spawn_count")]
    pub spawn_count: u32,
    /// Level-one stats.
    #[serde(default)]
    pub stats: Stats,
    /// Spell behaviour, required for spells.
    #[serde(default)]
    pub behavior: Option<AbilityBehavior>,
    /// Periodic production for spawner buildings.
    #[serde(default)]
    pub spawner: Option<SpawnerRule>,
    /// Units left behind when the entity dies.
    #[serde(default)]
    pub death_spawn: Option<SpawnRule>,
    /// Crown tower role, for towers.
    #[serde(default)]
    pub tower_role: Option<TowerRole>,
}

fn default_spawn_count() -> u32 {
    1
}

impl CardDefinition {
    /// Reports whether the card is a spell.
    #[must_use]
    pub fn is_spell(&self) -> bool {
        self.card_type == CardType::Spell
    }

    /// Reports whether the card resolves as a stationary structure.
    #[must_use]
    pub fn is_structure(&self) -> bool {
        matches!(self.card_type, CardType::Building | CardType::Tower) || self.stats.is_building
    }
}

/// Serialized form of a catalog, as stored in configuration files.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogFile {
    /// Card definitions in file order.
    pub cards: Vec<CardDefinition>,
}

/// Lookup table from card identifiers to definitions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    cards: BTreeMap<CardId, CardDefinition>,
}

impl Catalog {
    /// Builds a catalog from the provided definitions; later entries win.
    #[must_use]
    pub fn from_definitions(definitions: impl IntoIterator<Item = CardDefinition>) -> Self {
        let mut cards = BTreeMap::new();
        for definition in definitions {
            let _ = cards.insert(definition.id.clone(), definition);
        }
        Self { cards }
    }

    /// Resolves a card, surfacing unknown identifiers as errors.
    pub fn get(&self, id: &CardId) -> Result<&CardDefinition, SimError> {
        self.cards
            .get(id)
            .ok_or_else(|| SimError::UnknownDefinition(id.clone()))
    }

    /// Adds or replaces a definition.
    pub fn insert(&mut self, definition: CardDefinition) {
        let _ = self.cards.insert(definition.id.clone(), definition);
    }

    /// Iterator over all definitions in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.values()
    }

    /// Number of definitions held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Reports whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Overlays the definitions of a catalog file on top of this catalog.
    pub fn merge(&mut self, file: CatalogFile) {
        for definition in file.cards {
            self.insert(definition);
        }
    }

    /// Parses a TOML catalog document and overlays it on the standard cards.
    pub fn from_toml_str(document: &str) -> Result<Self, SimError> {
        let file: CatalogFile = toml::from_str(document)
            .map_err(|error| SimError::InvalidCatalog(error.to_string()))?;
        let mut catalog = Self::standard();
        catalog.merge(file);
        Ok(catalog)
    }

    /// Built-in card set used when no catalog file is supplied.
    #[must_use]
    pub fn standard() -> Self {
        Self::from_definitions(standard_definitions())
    }
}

/// Identifier of the king tower definition in the standard catalog.
pub const KING_TOWER: &str = "king-tower";
/// Identifier of the princess tower definition in the standard catalog.
pub const PRINCESS_TOWER: &str = "princess-tower";

/// Default eight-card deck used by scripted sides.
pub const STANDARD_DECK: [&str; 8] = [
    "knight",
    "archers",
    "giant",
    "fireball",
    "goblin-hut",
    "minions",
    "arrows",
    "valkyrie",
];

fn card(id: &str, card_type: CardType, cost: u32, spawn_count: u32, stats: Stats) -> CardDefinition {
    CardDefinition {
        id: CardId::new(id),
        card_type,
        cost,
        spawn_count,
        stats,
        behavior: None,
        spawner: None,
        death_spawn: None,
        tower_role: None,
    }
}

fn spell(id: &str, cost: u32, travel: f32, behavior: AbilityBehavior) -> CardDefinition {
    CardDefinition {
        behavior: Some(behavior),
        ..card(
            id,
            CardType::Spell,
            cost,
            1,
            Stats {
                hp: 1.0,
                deploy_delay: travel,
                hitbox: 0.0,
                ..Stats::default()
            },
        )
    }
}

fn melee(hp: f32, damage: f32, hit_interval: f32, speed: f32, hitbox: f32, mass: f32) -> Stats {
    Stats {
        hp,
        damage,
        hit_interval,
        range: 2.0,
        speed,
        hitbox,
        mass,
        ..Stats::default()
    }
}

fn ranged(hp: f32, damage: f32, hit_interval: f32, range: f32, speed: f32) -> Stats {
    Stats {
        hp,
        damage,
        hit_interval,
        range,
        speed,
        targeting: TargetingClass::All,
        attack_style: AttackStyle::Ranged,
        hitbox: 1.5,
        mass: 2.0,
        ..Stats::default()
    }
}

fn structure(hp: f32, lifetime: Option<f32>) -> Stats {
    Stats {
        hp,
        is_building: true,
        hitbox: 4.0,
        mass: 1000.0,
        lifetime,
        ..Stats::default()
    }
}

fn standard_definitions() -> Vec<CardDefinition> {
    vec![
        card("knight", CardType::Troop, 3, 1, melee(660.0, 75.0, 1.2, 6.0, 2.0, 6.0)),
        card(
            "archers",
            CardType::Troop,
            3,
            2,
            ranged(120.0, 42.0, 0.9, 18.0, 6.0),
        ),
        card(
            "giant",
            CardType::Troop,
            5,
            1,
            Stats {
                targeting: TargetingClass::Building,
                ..melee(1900.0, 120.0, 1.5, 4.0, 3.0, 18.0)
            },
        ),
        card(
            "skeletons",
            CardType::Troop,
            1,
            3,
            melee(32.0, 32.0, 1.0, 8.0, 1.5, 1.0),
        ),
        card(
            "goblins",
            CardType::Troop,
            2,
            3,
            melee(80.0, 50.0, 1.1, 10.0, 1.5, 1.5),
        ),
        card(
            "spear-goblins",
            CardType::Troop,
            2,
            3,
            Stats {
                projectile_speed: 70.0,
                ..ranged(52.0, 24.0, 1.7, 17.0, 8.0)
            },
        ),
        card(
            "musketeer",
            CardType::Troop,
            4,
            1,
            ranged(340.0, 100.0, 1.0, 20.0, 6.0),
        ),
        card(
            "minions",
            CardType::Troop,
            3,
            3,
            Stats {
                movement: MovementClass::Air,
                ..ranged(90.0, 40.0, 1.0, 5.0, 8.0)
            },
        ),
        card(
            "baby-dragon",
            CardType::Troop,
            4,
            1,
            Stats {
                movement: MovementClass::Air,
                splash_radius: 5.0,
                hitbox: 2.5,
                mass: 8.0,
                ..ranged(720.0, 100.0, 1.5, 10.0, 8.0)
            },
        ),
        card(
            "valkyrie",
            CardType::Troop,
            4,
            1,
            Stats {
                splash_radius: 4.0,
                ..melee(880.0, 120.0, 1.5, 6.0, 2.5, 10.0)
            },
        ),
        card(
            "mini-pekka",
            CardType::Troop,
            4,
            1,
            melee(600.0, 325.0, 1.8, 8.0, 2.0, 6.0),
        ),
        card(
            "prince",
            CardType::Troop,
            5,
            1,
            Stats {
                charges: true,
                range: 3.0,
                ..melee(1100.0, 245.0, 1.4, 6.0, 2.5, 12.0)
            },
        ),
        card(
            "royal-ghost",
            CardType::Troop,
            3,
            1,
            Stats {
                stealth: true,
                splash_radius: 3.0,
                ..melee(700.0, 120.0, 1.8, 8.0, 2.0, 6.0)
            },
        ),
        card(
            "dark-knight",
            CardType::Troop,
            4,
            1,
            Stats {
                shield: 200.0,
                ..melee(700.0, 140.0, 1.3, 6.0, 2.5, 8.0)
            },
        ),
        card(
            "cannon",
            CardType::Building,
            3,
            1,
            Stats {
                damage: 60.0,
                hit_interval: 0.8,
                range: 20.0,
                attack_style: AttackStyle::Ranged,
                projectile_speed: 70.0,
                ..structure(350.0, Some(30.0))
            },
        ),
        CardDefinition {
            spawner: Some(SpawnerRule {
                card: CardId::new("spear-goblins"),
                count: 1,
                interval: 4.5,
            }),
            death_spawn: Some(SpawnRule {
                card: CardId::new("spear-goblins"),
                count: 1,
            }),
            ..card("goblin-hut", CardType::Building, 5, 1, structure(640.0, None))
        },
        CardDefinition {
            spawner: Some(SpawnerRule {
                card: CardId::new("skeletons"),
                count: 1,
                interval: 3.5,
            }),
            death_spawn: Some(SpawnRule {
                card: CardId::new("skeletons"),
                count: 4,
            }),
            ..card("tombstone", CardType::Building, 3, 1, structure(250.0, Some(30.0)))
        },
        spell(
            "fireball",
            4,
            1.0,
            AbilityBehavior::AreaDamage {
                radius: 12.5,
                damage: 325.0,
            },
        ),
        spell(
            "arrows",
            3,
            0.8,
            AbilityBehavior::AreaDamage {
                radius: 16.0,
                damage: 115.0,
            },
        ),
        spell(
            "zap",
            2,
            0.0,
            AbilityBehavior::Stun {
                radius: 10.0,
                damage: 75.0,
                stun: 0.5,
            },
        ),
        spell(
            "goblin-barrel",
            3,
            1.2,
            AbilityBehavior::Summon {
                card: CardId::new("goblins"),
                count: 3,
                level: 9,
            },
        ),
        spell(
            "log",
            2,
            0.0,
            AbilityBehavior::RollingProjectile {
                radius: 5.0,
                damage: 96.0,
                range: 40.0,
                speed: 25.0,
            },
        ),
        spell(
            "poison",
            4,
            0.2,
            AbilityBehavior::DamageOverTime {
                radius: 14.0,
                damage: 45.0,
                ticks: 480,
                pulse_every: 60,
            },
        ),
        spell(
            "rage",
            2,
            0.0,
            AbilityBehavior::Buff {
                radius: 12.0,
                ticks: 360,
            },
        ),
        spell(
            "freeze",
            4,
            0.0,
            AbilityBehavior::Freeze {
                radius: 12.0,
                ticks: 240,
            },
        ),
        spell(
            "root",
            2,
            0.0,
            AbilityBehavior::Root {
                radius: 10.0,
                ticks: 300,
            },
        ),
        CardDefinition {
            tower_role: Some(TowerRole::King),
            ..card(
                KING_TOWER,
                CardType::Tower,
                0,
                1,
                Stats {
                    damage: 90.0,
                    hit_interval: 1.0,
                    range: 24.0,
                    attack_style: AttackStyle::Ranged,
                    targeting: TargetingClass::All,
                    deploy_delay: 0.0,
                    hitbox: 7.0,
                    projectile_speed: 80.0,
                    ..structure(2400.0, None)
                },
            )
        },
        CardDefinition {
            tower_role: Some(TowerRole::Princess),
            ..card(
                PRINCESS_TOWER,
                CardType::Tower,
                0,
                1,
                Stats {
                    damage: 50.0,
                    hit_interval: 0.8,
                    range: 26.0,
                    attack_style: AttackStyle::Ranged,
                    targeting: TargetingClass::All,
                    deploy_delay: 0.0,
                    hitbox: 6.0,
                    projectile_speed: 80.0,
                    ..structure(1400.0, None)
                },
            )
        },
    ]
}
