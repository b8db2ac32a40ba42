//! Per-actor combat statistics: a pure fold over a drained event slice.
//! Nothing in the engine reads these back; they exist for bout summaries.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::events::{AttackOutcome, EventBody, WorldEvent};
use crate::model::ActorId;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatantScorecard {
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub kills: u32,
    pub attacks: u32,
    pub misses: u32,
    pub distance_moved: f64,
    pub ap_spent: f64,
}

/// Fold an event log into per-actor scorecards.
pub fn tally(events: &[WorldEvent]) -> HashMap<ActorId, CombatantScorecard> {
    let mut cards: HashMap<ActorId, CombatantScorecard> = HashMap::new();
    for event in events {
        match &event.body {
            EventBody::CombatantDidAttack { cost, .. } => {
                let card = cards.entry(event.actor.clone()).or_default();
                card.attacks += 1;
                card.ap_spent += cost.ap;
            }
            EventBody::CombatantWasAttacked { source, outcome, damage, .. } => {
                let attacker = cards.entry(source.clone()).or_default();
                if *outcome == AttackOutcome::Miss {
                    attacker.misses += 1;
                } else {
                    attacker.damage_dealt += u64::from(*damage);
                }
                let defender = cards.entry(event.actor.clone()).or_default();
                defender.damage_taken += u64::from(*damage);
            }
            EventBody::CombatantDidDie { killer } => {
                cards.entry(killer.clone()).or_default().kills += 1;
            }
            EventBody::CombatantDidDefend { cost } => {
                cards.entry(event.actor.clone()).or_default().ap_spent += cost.ap;
            }
            EventBody::ActorDidMoveInCombat { distance, cost, .. } => {
                let card = cards.entry(event.actor.clone()).or_default();
                card.distance_moved += distance;
                card.ap_spent += cost.ap;
            }
            _ => {}
        }
    }
    cards
}
