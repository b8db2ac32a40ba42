//! Movement physics: the pure curves mapping stats, mass and distance to
//! action points and back. Reducers and the AI planner both lean on the
//! monotonicity of these functions, so keep them free of state.

use crate::config::{AP_CAPACITY_PHI, BASELINE_MASS_KG, BASELINE_STAT, BASE_AP};
use crate::rounding::clean_ap_precision;

/// Floor for the mobility term so degenerate stat lines stay finite.
const MIN_MOBILITY: f64 = 0.05;

/// Floor for body mass; nobody fights at zero kilograms.
const MIN_MASS_KG: f64 = 1.0;

/// Combined power/finesse mobility multiplier. 1.0 for a baseline actor.
fn mobility(pow: u32, fin: u32) -> f64 {
    ((pow + fin) as f64 / (2.0 * BASELINE_STAT as f64)).max(MIN_MOBILITY)
}

/// Mass drag on movement. 1.0 at the 70 kg reference body; sub-linear so a
/// heavy fighter is slowed but not parked.
fn mass_factor(mass_kg: f64) -> f64 {
    (mass_kg.max(MIN_MASS_KG) / BASELINE_MASS_KG).sqrt()
}

/// Precise AP required to cover `distance_m` meters.
///
/// Strictly increasing in distance, monotone decreasing in power and finesse,
/// monotone increasing in mass. Calibrated so a baseline actor
/// (pow = fin = 10, 70 kg) pays 1 AP per meter.
pub fn distance_to_ap(pow: u32, fin: u32, distance_m: f64, mass_kg: f64) -> f64 {
    distance_m * mass_factor(mass_kg) / mobility(pow, fin)
}

/// Precise distance covered by spending `ap`. Inverse of [`distance_to_ap`].
pub fn ap_to_distance(pow: u32, fin: u32, ap: f64, mass_kg: f64) -> f64 {
    ap * mobility(pow, fin) / mass_factor(mass_kg)
}

/// Per-turn AP capacity as modulated by Intelligence.
///
/// `BASE_AP` at the baseline stat, saturating at `BASE_AP · φ` for int 100+.
/// The curve is logarithmic in between, then quantized down to the 0.1 AP
/// grid so capacity itself is a representable AP value.
pub fn ap_capacity(int: u32) -> f64 {
    let x = (((int as f64) - BASELINE_STAT as f64) / 90.0).clamp(0.0, 1.0);
    let growth = (1.0 + x * (std::f64::consts::E - 1.0)).ln();
    let precise = BASE_AP * (1.0 + (AP_CAPACITY_PHI - 1.0) * growth);
    // floor to the grid; never hand out capacity the curve did not earn
    clean_ap_precision((precise * 10.0).floor() / 10.0)
}
