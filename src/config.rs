use serde::{Deserialize, Serialize};

/// Seconds of real time one combat turn represents.
pub const TURN_DURATION_SECONDS: f64 = 6.0;

/// Action point budget of a baseline combatant (one point per second of turn).
pub const BASE_AP: f64 = TURN_DURATION_SECONDS;

/// Smallest spendable AP slice. Costs are quoted in units of this step.
pub const MIN_AP_INCREMENT: f64 = 0.1;

/// AP is carried as a decimal with exactly one fractional digit.
pub const TACTICAL_AP_PRECISION_FACTOR: f64 = 10.0;

/// Sentinel for `by_ap` movement meaning "spend everything I have left".
pub const ALL_REMAINING_AP: f64 = -1.0;

/// Default battlefield length in meters.
pub const DEFAULT_BATTLEFIELD_LENGTH_M: u32 = 300;

/// Golden ratio; caps how far Intelligence can stretch the AP budget.
pub const AP_CAPACITY_PHI: f64 = 1.618_033_988_749_895;

/// Baseline stat value. Stats normally range 0..100.
pub const BASELINE_STAT: u32 = 10;

/// Reference body mass used to calibrate the movement curve.
pub const BASELINE_MASS_KG: f64 = 70.0;

/// Targeting tolerance around a weapon's optimal range, in meters.
pub const OPTIMAL_TOLERANCE_STRICT_M: f64 = 0.5;
/// Wider tolerance used for weapons with a damage falloff (ranged).
pub const OPTIMAL_TOLERANCE_FALLOFF_M: f64 = 2.0;

/// Ranged effectiveness halves once per falloff range, capped at this many.
pub const MAX_FALLOFF_RANGES: f64 = 3.0;

/// Tunable knobs the engine leaves configurable per deployment.
///
/// Everything here has a sensible default; hosts that want house rules
/// deserialize their overrides from JSON and hand the struct to the context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineTuning {
    /// Flat energy price of a cleave, in joules.
    pub cleave_energy_base_j: f64,
    /// Additional cleave energy per kilogram of weapon mass.
    pub cleave_energy_per_kg_j: f64,
    /// Distance-per-AP multiplier when moving forward.
    pub forward_efficiency: f64,
    /// Midpoint of the backward efficiency curve at finesse 50.
    pub backward_efficiency_base: f64,
    /// Backward efficiency gained (or lost) per point of finesse around 50.
    pub backward_efficiency_per_fin: f64,
    /// Clamp bounds for backward efficiency.
    pub backward_efficiency_min: f64,
    pub backward_efficiency_max: f64,
}

impl Default for EngineTuning {
    fn default() -> Self {
        Self {
            cleave_energy_base_j: 200.0,
            cleave_energy_per_kg_j: 100.0,
            forward_efficiency: 1.0,
            backward_efficiency_base: 0.5,
            backward_efficiency_per_fin: 0.002,
            backward_efficiency_min: 0.3,
            backward_efficiency_max: 0.8,
        }
    }
}

impl EngineTuning {
    /// Distance multiplier for moving against your facing.
    ///
    /// Panics if the clamp bounds are inverted; that is a deployment
    /// mistake, not a player-visible condition.
    pub fn backward_efficiency(&self, fin: u32) -> f64 {
        assert!(
            self.backward_efficiency_min <= self.backward_efficiency_max,
            "MISSING_DEPENDENCY: backward efficiency clamp is inverted ({} > {})",
            self.backward_efficiency_min,
            self.backward_efficiency_max
        );
        let raw = self.backward_efficiency_base
            + (fin as f64 - 50.0) * self.backward_efficiency_per_fin;
        raw.clamp(self.backward_efficiency_min, self.backward_efficiency_max)
    }
}

/// Bounds for the AI plan search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Wall-clock budget. The search returns its best plan so far on expiry.
    pub time_budget_ms: u64,
    /// Maximum plan length in actions.
    pub max_depth: usize,
    /// Maximum successors expanded per node.
    pub max_branching: usize,
    /// Plans scoring below this are discarded.
    pub min_score_threshold: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            time_budget_ms: 50,
            max_depth: 4,
            max_branching: 8,
            min_score_threshold: 10.0,
        }
    }
}
