//! Tactical rounding: the conservative discipline that gives combat its
//! grid-like feel. AP rounds up to the next tenth, distance and position
//! round down to whole meters, and both directions always favor the house.

use crate::config::TACTICAL_AP_PRECISION_FACTOR;
use crate::errors::precision_violation;

/// Floating point slop below which a value snaps to the nearest integer.
const SNAP_EPSILON: f64 = 1e-3;

/// Tolerance for the clean-precision mirror check.
const PRECISION_TOLERANCE: f64 = 1e-3;

/// Round an AP amount up to the next 0.1 step.
///
/// The quoted cost is never less than the precise cost.
pub fn round_ap_up(ap: f64) -> f64 {
    (ap * TACTICAL_AP_PRECISION_FACTOR).ceil() / TACTICAL_AP_PRECISION_FACTOR
}

/// Round a distance down to whole meters, snapping values within 1e-3 of an
/// integer first so float artifacts (2.9999999) do not eat a meter.
pub fn round_distance_down(distance_m: f64) -> f64 {
    let nearest = distance_m.round();
    if (distance_m - nearest).abs() < SNAP_EPSILON {
        nearest
    } else {
        distance_m.floor()
    }
}

/// Same policy as [`round_distance_down`]; positions can be negative during
/// intermediate math, and floor keeps the bias consistent on both signs.
pub fn round_position(coordinate_m: f64) -> f64 {
    round_distance_down(coordinate_m)
}

/// Re-quantize an AP value to one decimal place.
///
/// Used only to reconcile subtraction drift after a deduction; it must never
/// be used to shave a cost in the actor's favor.
pub fn clean_ap_precision(ap: f64) -> f64 {
    (ap * TACTICAL_AP_PRECISION_FACTOR).round() / TACTICAL_AP_PRECISION_FACTOR
}

/// Assert that a stored AP value still sits on the 0.1 grid.
///
/// Every AP mutation path calls this with the value it just wrote. A
/// divergence beyond 0.001 from the clean mirror is a programmer error and
/// aborts the reducer.
pub fn assert_ap_precision(what: &str, ap: f64) {
    let mirror = clean_ap_precision(ap);
    if (ap - mirror).abs() >= PRECISION_TOLERANCE {
        precision_violation(what, ap, mirror);
    }
}

/// Assert that a coordinate is a whole number of meters.
pub fn assert_position_precision(what: &str, coordinate_m: f64) {
    let mirror = coordinate_m.round();
    if (coordinate_m - mirror).abs() >= PRECISION_TOLERANCE {
        precision_violation(what, coordinate_m, mirror);
    }
}
