//! Weapon-derived heuristic profiles and the five scorers that rate a plan
//! node. Scores are non-negative; the composite is a weighted sum.

use serde::{Deserialize, Serialize};

use super::analysis::{assess_weapon_capabilities, TacticalSituation};
use super::search::{PlanNode, PlannedAction, ScoreBreakdown};
use crate::model::WeaponClass;

/// Relative importance of each heuristic for one weapon class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeuristicWeights {
    pub damage: f64,
    pub efficiency: f64,
    pub positioning: f64,
    pub momentum: f64,
    pub risk: f64,
}

/// Doctrine for fighting with one weapon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicProfile {
    pub weights: HeuristicWeights,
    pub optimal_distance: f64,
    pub min_safe_distance: f64,
    pub max_effective_distance: f64,
    /// Reach weapons deny the ground at their optimal band.
    pub controls_space: bool,
}

/// Per-class presets. The numbers are doctrine, not physics: melee lives on
/// damage, reach on positioning, ranged splits attention toward risk.
pub fn create_heuristic_profile(weapon: &crate::model::WeaponSchema) -> HeuristicProfile {
    let range = weapon.range;
    match weapon.classify() {
        WeaponClass::Melee => HeuristicProfile {
            weights: HeuristicWeights {
                damage: 0.35,
                efficiency: 0.15,
                positioning: 0.25,
                momentum: 0.15,
                risk: 0.10,
            },
            optimal_distance: range.optimal,
            min_safe_distance: 0.0,
            max_effective_distance: range.max,
            controls_space: false,
        },
        WeaponClass::Reach => HeuristicProfile {
            weights: HeuristicWeights {
                damage: 0.30,
                efficiency: 0.15,
                positioning: 0.30,
                momentum: 0.15,
                risk: 0.10,
            },
            optimal_distance: range.optimal,
            min_safe_distance: (range.optimal - 1.0).max(0.0),
            max_effective_distance: range.max,
            controls_space: true,
        },
        WeaponClass::Ranged => HeuristicProfile {
            weights: HeuristicWeights {
                damage: 0.30,
                efficiency: 0.20,
                positioning: 0.20,
                momentum: 0.10,
                risk: 0.20,
            },
            optimal_distance: range.optimal,
            min_safe_distance: range.min.unwrap_or(range.optimal / 2.0),
            max_effective_distance: range.max,
            controls_space: false,
        },
    }
}

fn is_attack(action: &PlannedAction) -> bool {
    matches!(action, PlannedAction::Strike { .. } | PlannedAction::Cleave)
}

fn is_advance(action: &PlannedAction) -> bool {
    matches!(action, PlannedAction::Advance { .. })
}

/// Distance to the simulated target (falling back to the analysis-time
/// primary) after the simulated moves.
fn final_distance(node: &PlanNode, situation: &TacticalSituation) -> Option<f64> {
    let chosen = node
        .state
        .target
        .as_ref()
        .or(situation.assessments.primary_target.as_ref())?;
    let target = situation.target(chosen)?;
    Some((node.state.coordinate_m - target.coordinate_m).abs() as f64)
}

/// Closing progress toward optimal in `[0, 1]`.
fn gap_progress(node: &PlanNode, situation: &TacticalSituation) -> f64 {
    let Some(d1) = final_distance(node, situation) else {
        return 0.0;
    };
    let Some(d0) = situation.assessments.primary_target_distance else {
        return 0.0;
    };
    let want = situation.assessments.optimal_distance;
    let gap0 = (d0 - want).abs();
    if gap0 < 1e-9 {
        return 1.0;
    }
    let gap1 = (d1 - want).abs();
    ((gap0 - gap1) / gap0).clamp(0.0, 1.0)
}

pub fn damage_score(node: &PlanNode, situation: &TacticalSituation) -> f64 {
    let attacks = node.state.attacks;
    if attacks == 0 {
        return 0.0;
    }
    let Some(d) = final_distance(node, situation) else {
        return 0.0;
    };
    let ranged = situation.weapon_class == WeaponClass::Ranged;
    if !ranged && d > situation.assessments.optimal_distance {
        // swinging from where the blade cannot land is worth nothing
        return 0.0;
    }
    let effectiveness = assess_weapon_capabilities(&situation.weapon, d);
    let mut score = 100.0 * effectiveness;
    if (d - situation.assessments.optimal_distance).abs() < 1e-9 {
        score += 25.0;
    }
    score += 15.0 * ((attacks - 1).min(2)) as f64;
    score
}

pub fn efficiency_score(node: &PlanNode, situation: &TacticalSituation) -> f64 {
    if node.actions.is_empty() {
        return 0.0;
    }
    let spent = (situation.resources.ap_current - node.state.ap).max(0.0);
    let per_action = spent / node.actions.len() as f64;
    let mut score = if (1.0..=2.5).contains(&per_action) { 40.0 } else { 10.0 };
    // light stamina footprint is worth keeping
    let energy_spent_ratio = if situation.resources.energy_max > 0.0 {
        node.state.energy_spent_j / situation.resources.energy_max
    } else {
        0.0
    };
    score += 20.0 * (1.0 - energy_spent_ratio.clamp(0.0, 1.0));
    if node.state.ap >= 1.0 {
        score += 15.0;
    }
    score
}

pub fn positioning_score(node: &PlanNode, situation: &TacticalSituation) -> f64 {
    let Some(d) = final_distance(node, situation) else {
        return 0.0;
    };
    let settled = match situation.weapon_class {
        WeaponClass::Melee => d <= 1.0,
        WeaponClass::Reach => (d - situation.assessments.optimal_distance).abs() < 1e-9,
        WeaponClass::Ranged => d <= situation.assessments.optimal_distance,
    };
    let mut score = if settled { 50.0 } else { 30.0 * gap_progress(node, situation) };
    // hold the middle of the field
    let center = situation.battlefield.center();
    let centrality =
        1.0 - ((node.state.coordinate_m as f64 - center).abs() / center.max(1.0)).min(1.0);
    score += 10.0 * centrality;
    score
}

pub fn momentum_score(node: &PlanNode, situation: &TacticalSituation) -> f64 {
    let mut score: f64 = 0.0;
    let ranged = situation.weapon_class == WeaponClass::Ranged;
    for pair in node.actions.windows(2) {
        if is_advance(&pair[0]) && is_attack(&pair[1]) {
            score += 20.0;
        }
        if is_attack(&pair[0]) && is_advance(&pair[1]) && !ranged {
            score -= 15.0;
        }
    }
    if node.actions.last().map(is_attack).unwrap_or(false) {
        score += 15.0;
    }
    if !ranged && gap_progress(node, situation) >= 0.3 {
        score += 10.0;
    }
    score.max(0.0)
}

pub fn risk_score(node: &PlanNode, situation: &TacticalSituation) -> f64 {
    let mut score: f64 = 100.0;
    if node.state.ap < 0.5 {
        score -= 20.0;
    }
    let energy_spent_ratio = if situation.resources.energy_max > 0.0 {
        node.state.energy_spent_j / situation.resources.energy_max
    } else {
        0.0
    };
    if energy_spent_ratio > 0.5 {
        score -= 15.0;
    }
    if let Some(d) = final_distance(node, situation) {
        let profile_min = match situation.weapon_class {
            WeaponClass::Ranged => situation.weapon.range.min.unwrap_or(0.0),
            _ => 0.0,
        };
        if situation.weapon_class == WeaponClass::Ranged && d < profile_min {
            score -= 20.0;
        }
        if situation.weapon_class != WeaponClass::Ranged && d > situation.weapon.range.max + 3.0
        {
            score -= 10.0;
        }
    }
    let edge = (node.state.coordinate_m).min(
        situation.battlefield.length_m as i64 - node.state.coordinate_m,
    );
    if edge <= 5 {
        score -= 15.0;
    }
    if node.actions.len() > 4 {
        score -= 10.0 * (node.actions.len() - 4) as f64;
    }
    score.max(0.0)
}

/// Weighted composite of the five heuristics.
pub fn composite_score(
    node: &PlanNode,
    situation: &TacticalSituation,
    profile: &HeuristicProfile,
) -> (f64, ScoreBreakdown) {
    let breakdown = ScoreBreakdown {
        damage: damage_score(node, situation),
        efficiency: efficiency_score(node, situation),
        positioning: positioning_score(node, situation),
        momentum: momentum_score(node, situation),
        risk: risk_score(node, situation),
    };
    let w = &profile.weights;
    let total = w.damage * breakdown.damage
        + w.efficiency * breakdown.efficiency
        + w.positioning * breakdown.positioning
        + w.momentum * breakdown.momentum
        + w.risk * breakdown.risk;
    (total, breakdown)
}
