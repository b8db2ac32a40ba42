//! Tactical cost factories. Every primitive prices itself here so the AI
//! can simulate a plan with exactly the arithmetic the reducers will use.

use serde::{Deserialize, Serialize};

use crate::config::EngineTuning;
use crate::model::{Actor, WeaponSchema};
use crate::physics::distance_to_ap;
use crate::rounding::round_ap_up;

/// Price of one action: AP in 0.1 steps, energy in whole joules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionCost {
    pub ap: f64,
    pub energy_j: f64,
}

impl ActionCost {
    pub fn free() -> Self {
        Self { ap: 0.0, energy_j: 0.0 }
    }

    pub fn ap_only(ap: f64) -> Self {
        Self { ap, energy_j: 0.0 }
    }
}

/// Precise swing time for a weapon of `mass_kg` in the hands of a fighter
/// with `fin` finesse. Heavier blades swing slower, finesse buys it back.
fn swing_ap_precise(mass_kg: f64, fin: u32) -> f64 {
    (0.8 + 0.4 * mass_kg) * (20.0 / (10.0 + fin as f64))
}

/// AP to land one strike. Energy cost of a strike is folded into the body's
/// background budget and prices at zero.
pub fn strike_cost(actor: &Actor, weapon: &WeaponSchema) -> ActionCost {
    ActionCost::ap_only(round_ap_up(swing_ap_precise(weapon.mass_kg(), actor.stats.fin)))
}

/// Cleave: same swing arithmetic as a strike, but the sweep drains stamina —
/// a flat price plus a per-kilogram term, scaled by the number of bodies in
/// the arc.
pub fn cleave_cost(
    tuning: &EngineTuning,
    mass_kg: f64,
    fin: u32,
    n_targets: usize,
) -> ActionCost {
    let ap = round_ap_up(swing_ap_precise(mass_kg, fin));
    let energy = (tuning.cleave_energy_base_j + tuning.cleave_energy_per_kg_j * mass_kg)
        * n_targets.max(1) as f64;
    ActionCost { ap, energy_j: energy.ceil() }
}

/// Defend burns whatever the combatant has left.
pub fn defend_cost(current_ap: f64) -> ActionCost {
    ActionCost::ap_only(current_ap)
}

/// AP to cover `distance_m` on foot, rounded against the mover.
pub fn movement_cost(pow: u32, fin: u32, distance_m: f64, mass_kg: f64) -> ActionCost {
    ActionCost::ap_only(round_ap_up(distance_to_ap(pow, fin, distance_m, mass_kg)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ActorId, EnergyStore, HitPoints, PlaceId, SchemaUrn, StatBlock, WeaponRange,
    };
    use std::collections::{BTreeMap, HashSet};

    fn actor(fin: u32) -> Actor {
        Actor {
            id: ActorId::from("a"),
            name: "A".to_string(),
            location: PlaceId::from("arena"),
            stats: StatBlock { fin, ..StatBlock::default() },
            hp: HitPoints::full(100),
            energy: EnergyStore::full(20_000.0),
            body_mass_grams: 70_000.0,
            equipped_weapon: None,
            sessions: HashSet::new(),
        }
    }

    fn sword(mass_grams: f64) -> WeaponSchema {
        WeaponSchema {
            urn: SchemaUrn::from("urn:schema:weapon:sword"),
            name: "Sword".to_string(),
            base_mass_grams: mass_grams,
            range: WeaponRange { optimal: 1.0, max: 1.0, falloff: None, min: None },
            fit: BTreeMap::from([("hand.main".to_string(), 1)]),
        }
    }

    #[test]
    fn strike_ap_rounds_up_and_tracks_mass() {
        let light = strike_cost(&actor(10), &sword(1_000.0));
        let heavy = strike_cost(&actor(10), &sword(3_000.0));
        assert!(heavy.ap > light.ap);
        assert_eq!(light.energy_j, 0.0);
        // on the 0.1 grid
        assert!(((light.ap * 10.0).round() / 10.0 - light.ap).abs() < 1e-9);
    }

    #[test]
    fn finesse_cheapens_the_swing() {
        let clumsy = strike_cost(&actor(10), &sword(1_500.0));
        let deft = strike_cost(&actor(60), &sword(1_500.0));
        assert!(deft.ap < clumsy.ap);
    }

    #[test]
    fn cleave_energy_is_linear_in_mass_and_targets() {
        let tuning = EngineTuning::default();
        let one = cleave_cost(&tuning, 3.0, 10, 1);
        assert_eq!(one.energy_j, 500.0); // 200 + 100*3
        let three = cleave_cost(&tuning, 3.0, 10, 3);
        assert_eq!(three.energy_j, 1500.0);
        // AP identical to the strike formula for the same mass/finesse
        assert_eq!(one.ap, strike_cost(&actor(10), &sword(3_000.0)).ap);
    }

    #[test]
    fn defend_takes_the_remainder() {
        assert_eq!(defend_cost(2.3).ap, 2.3);
        assert_eq!(defend_cost(2.3).energy_j, 0.0);
    }

    #[test]
    fn movement_cost_baseline() {
        let cost = movement_cost(10, 10, 5.0, 70.0);
        assert_eq!(cost.ap, 5.0);
    }
}
