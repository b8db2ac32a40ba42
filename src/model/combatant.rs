use serde::{Deserialize, Serialize};

use super::battlefield::BattlefieldPosition;
use super::ids::{ActorId, TeamTag};
use crate::errors::{CombatError, CombatResult};
use crate::rounding::{assert_ap_precision, clean_ap_precision};

/// Per-turn time budget in 0.1-point steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionPoints {
    pub current: f64,
    pub max: f64,
}

impl ActionPoints {
    /// Fresh pool: capacity known, nothing spendable until combat starts.
    pub fn sealed(max: f64) -> Self {
        Self { current: 0.0, max }
    }

    pub fn restore(&mut self) -> f64 {
        let recovered = clean_ap_precision(self.max - self.current);
        self.current = self.max;
        recovered
    }
}

/// Session-scoped view of an actor: position, AP, fatigue, chosen target.
///
/// Owned by the session; only action primitives mutate it, and only while
/// the session is running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub actor_id: ActorId,
    pub team: TeamTag,
    pub position: BattlefieldPosition,
    pub ap: ActionPoints,
    /// Mirror of the actor's energy fatigue in `[0, 1]`; refreshed whenever
    /// a primitive spends the actor's stamina. Hit resolution reads this.
    pub energy_position: f64,
    /// Persistently chosen target; kept across turns until replaced or
    /// invalidated by death/range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ActorId>,
}

impl Combatant {
    pub fn new(
        actor_id: ActorId,
        team: TeamTag,
        position: BattlefieldPosition,
        ap_max: f64,
        energy_position: f64,
    ) -> Self {
        Self {
            actor_id,
            team,
            position,
            ap: ActionPoints::sealed(ap_max),
            energy_position,
            target: None,
        }
    }

    pub fn can_afford(&self, ap_cost: f64) -> bool {
        // half a precision step of slack so 1.5 covers a quoted 1.5
        self.ap.current + 0.05 >= ap_cost
    }

    /// Deduct AP, reconciling float drift and asserting the 0.1 grid.
    pub fn spend_ap(&mut self, ap_cost: f64) -> CombatResult<()> {
        if !self.can_afford(ap_cost) {
            return Err(CombatError::InsufficientAp {
                required: ap_cost,
                available: self.ap.current,
            });
        }
        let next = clean_ap_precision(self.ap.current - ap_cost);
        // spending your entire pool may land a hair below zero before cleanup
        self.ap.current = next.max(0.0);
        assert_ap_precision("combatant.ap.current", self.ap.current);
        Ok(())
    }
}
