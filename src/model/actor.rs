use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::ids::{ActorId, PlaceId, SchemaUrn, SessionId};
use crate::config::BASELINE_STAT;

/// The six core stats. Baseline is 10; the normal range is 0..100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    pub pow: u32,
    pub fin: u32,
    pub res: u32,
    pub int: u32,
    pub per: u32,
    pub mem: u32,
}

impl Default for StatBlock {
    fn default() -> Self {
        Self {
            pow: BASELINE_STAT,
            fin: BASELINE_STAT,
            res: BASELINE_STAT,
            int: BASELINE_STAT,
            per: BASELINE_STAT,
            mem: BASELINE_STAT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPoints {
    pub current: u32,
    pub max: u32,
}

impl HitPoints {
    pub fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn ratio(&self) -> f64 {
        if self.max == 0 {
            0.0
        } else {
            self.current as f64 / self.max as f64
        }
    }
}

/// Semantic capacitor for stamina. Joules only ever go down during combat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyStore {
    pub joules: f64,
    pub capacity_j: f64,
}

impl EnergyStore {
    pub fn full(capacity_j: f64) -> Self {
        Self { joules: capacity_j, capacity_j }
    }

    /// Normalized fatigue in `[0, 1]`: 0 fresh, 1 spent.
    pub fn fatigue(&self) -> f64 {
        if self.capacity_j <= 0.0 {
            1.0
        } else {
            (1.0 - self.joules / self.capacity_j).clamp(0.0, 1.0)
        }
    }
}

/// An actor as the world store sees it. The combat core reads stats and
/// equipment, and mutates hp/energy only through the helpers below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub location: PlaceId,
    pub stats: StatBlock,
    pub hp: HitPoints,
    pub energy: EnergyStore,
    /// Mass of the body itself, grams. Carried gear is added by the mass API.
    pub body_mass_grams: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipped_weapon: Option<SchemaUrn>,
    /// Combat sessions this actor is enrolled in; used only to veto
    /// cross-session targeting.
    #[serde(default)]
    pub sessions: HashSet<SessionId>,
}

impl Actor {
    pub fn alive(&self) -> bool {
        self.hp.current > 0
    }

    /// Apply damage, flooring at zero. Returns the HP actually removed.
    pub fn decrement_hp(&mut self, damage: u32) -> u32 {
        let removed = damage.min(self.hp.current);
        self.hp.current -= removed;
        removed
    }

    /// Burn stamina. Saturates at zero; the energy store never refunds.
    pub fn consume_energy(&mut self, joules: f64) {
        self.energy.joules = (self.energy.joules - joules.max(0.0)).max(0.0);
    }
}
