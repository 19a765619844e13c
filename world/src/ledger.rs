//! Impact accumulation and settlement.

use std::collections::BTreeMap;

use lane_clash_core::{Entity, EntityId, Event, Impact, Side, TowerRole};
use tracing::debug;

/// Impacts gathered during a tick, merged per entity.
///
/// Damage from every source adds up; status effects keep the longest duration.
#[derive(Debug, Default)]
pub(crate) struct ImpactLedger {
    impacts: BTreeMap<EntityId, Impact>,
}

impl ImpactLedger {
    pub(crate) fn extend<I>(&mut self, impacts: I)
    where
        I: IntoIterator<Item = (EntityId, Impact)>,
    {
        for (id, impact) in impacts {
            self.impacts.entry(id).or_default().merge(&impact);
        }
    }

    /// Applies every impact to `entities`, which must be sorted by identifier.
    ///
    /// Impacts on entities that left the battle this tick are dropped. Dormant
    /// kings wake when they take damage or when a princess tower of theirs falls.
    pub(crate) fn settle(self, entities: &mut [Entity], out_events: &mut Vec<Event>) {
        for (id, impact) in self.impacts {
            let Ok(index) = entities.binary_search_by_key(&id, |entity| entity.id) else {
                continue;
            };
            let entity = &mut entities[index];
            if entity.is_spell() || !entity.is_alive() {
                continue;
            }
            entity.apply_damage(impact.damage);
            let timers = &mut entity.timers;
            timers.stunned = timers.stunned.max(impact.stun);
            timers.frozen = timers.frozen.max(impact.freeze);
            timers.raged = timers.raged.max(impact.rage);
            timers.rooted = timers.rooted.max(impact.root);
            if entity.dormant && impact.damage > 0.0 {
                wake(entity, out_events);
            }
        }

        for side in Side::ALL {
            let princesses = entities
                .iter()
                .filter(|entity| {
                    entity.side == side
                        && entity.tower_role == Some(TowerRole::Princess)
                        && entity.is_alive()
                })
                .count();
            if princesses >= 2 {
                continue;
            }
            if let Some(king) = entities
                .iter_mut()
                .find(|entity| entity.side == side && entity.is_king() && entity.dormant)
            {
                wake(king, out_events);
            }
        }
    }
}

fn wake(king: &mut Entity, out_events: &mut Vec<Event>) {
    king.dormant = false;
    debug!(side = ?king.side, "king tower activated");
    out_events.push(Event::KingActivated { side: king.side });
}
