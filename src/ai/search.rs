//! Bounded depth-first search over short action sequences.
//!
//! The search simulates costs with the same arithmetic the reducers use,
//! scores every node through the weapon's heuristic profile, and returns
//! the best plan found before the depth, branching or time budget runs
//! out. Ties go to the first plan found, which makes runs reproducible.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::analysis::TacticalSituation;
use super::heuristics::{composite_score, HeuristicProfile};
use crate::config::{MIN_AP_INCREMENT, SearchConfig};
use crate::costs::movement_cost;
use crate::model::{ActorId, Facing};

/// One step of a simulated plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlannedAction {
    Strike { target: ActorId },
    Cleave,
    Advance { distance: f64 },
    Retreat { distance: f64 },
    Defend,
    SwitchTarget { target: ActorId },
}

/// Projected combatant state along one search branch.
#[derive(Debug, Clone, PartialEq)]
pub struct SimState {
    pub ap: f64,
    pub energy_spent_j: f64,
    pub coordinate_m: i64,
    pub facing: Facing,
    pub attacks: u32,
    pub target: Option<ActorId>,
}

/// A node in the plan tree: the actions taken so far and where they leave
/// the combatant. The composite score is cached after first evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanNode {
    pub actions: Vec<PlannedAction>,
    pub state: SimState,
    pub depth: usize,
    pub score: Option<f64>,
}

/// Per-heuristic contributions to a plan's score.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub damage: f64,
    pub efficiency: f64,
    pub positioning: f64,
    pub momentum: f64,
    pub risk: f64,
}

/// The search's answer: an ordered action list with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPlan {
    pub actions: Vec<PlannedAction>,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Movement steps the generator proposes, in meters.
const MOVE_STEPS: [f64; 5] = [1.0, 2.0, 3.0, 5.0, 8.0];

fn root_node(situation: &TacticalSituation) -> PlanNode {
    PlanNode {
        actions: Vec::new(),
        state: SimState {
            ap: situation.resources.ap_current,
            energy_spent_j: 0.0,
            coordinate_m: situation.position.coordinate_m,
            facing: situation.position.facing,
            attacks: 0,
            target: situation.assessments.primary_target.clone(),
        },
        depth: 0,
        score: None,
    }
}

fn simulated_distance(state: &SimState, situation: &TacticalSituation, id: &ActorId) -> Option<f64> {
    situation.target(id).map(|t| (state.coordinate_m - t.coordinate_m).abs() as f64)
}

/// Whether a move from `from` to `to` crosses or lands on an enemy.
fn path_blocked(situation: &TacticalSituation, from: i64, to: i64) -> bool {
    let (lo, hi) = (from.min(to), from.max(to));
    situation
        .valid_targets
        .iter()
        .any(|t| t.coordinate_m != from && t.coordinate_m >= lo && t.coordinate_m <= hi)
}

/// Enumerate the affordable successor actions of a node, each with its
/// projected state. Order is fixed so the search is deterministic.
pub fn get_valid_actions(
    node: &PlanNode,
    situation: &TacticalSituation,
) -> Vec<(PlannedAction, SimState)> {
    let mut out = Vec::new();
    let state = &node.state;

    // strike the current simulated target
    if let Some(target) = state.target.clone() {
        if let Some(d) = simulated_distance(state, situation, &target) {
            if situation.weapon.can_hit_from(d) && state.ap + 0.05 >= situation.strike_ap {
                let mut next = state.clone();
                next.ap = crate::rounding::clean_ap_precision(next.ap - situation.strike_ap);
                next.attacks += 1;
                out.push((PlannedAction::Strike { target }, next));
            }
        }
    }

    // cleave when the grip allows it and someone stands in the arc
    if situation.two_handed {
        let n_at_optimal = situation
            .valid_targets
            .iter()
            .filter(|t| {
                let d = (state.coordinate_m - t.coordinate_m).abs() as f64;
                (d - situation.weapon.range.optimal).abs() < 1e-9
            })
            .count();
        let energy_needed = situation.cleave_energy_per_target * n_at_optimal as f64;
        let energy_left = situation.resources.energy_current - state.energy_spent_j;
        if n_at_optimal > 0
            && state.ap + 0.05 >= situation.cleave_ap
            && energy_left >= energy_needed
        {
            let mut next = state.clone();
            next.ap = crate::rounding::clean_ap_precision(next.ap - situation.cleave_ap);
            next.energy_spent_j += energy_needed;
            next.attacks += 1;
            out.push((PlannedAction::Cleave, next));
        }
    }

    // moves, both directions, discretized
    for &dist in &MOVE_STEPS {
        let cost = movement_cost(situation.pow, situation.fin, dist, situation.mass_kg).ap;
        if state.ap + 0.05 < cost {
            continue;
        }
        let forward_to = state.coordinate_m + state.facing.sign() * dist as i64;
        if situation.battlefield.contains(forward_to)
            && !path_blocked(situation, state.coordinate_m, forward_to)
        {
            let mut next = state.clone();
            next.ap = crate::rounding::clean_ap_precision(next.ap - cost);
            next.coordinate_m = forward_to;
            out.push((PlannedAction::Advance { distance: dist }, next));
        }
        let backward_to = state.coordinate_m - state.facing.sign() * dist as i64;
        if situation.battlefield.contains(backward_to)
            && !path_blocked(situation, state.coordinate_m, backward_to)
        {
            let mut next = state.clone();
            next.ap = crate::rounding::clean_ap_precision(next.ap - cost);
            next.coordinate_m = backward_to;
            out.push((PlannedAction::Retreat { distance: dist }, next));
        }
    }

    // consider switching to a different reachable enemy
    for t in &situation.valid_targets {
        if Some(&t.actor_id) == state.target.as_ref() {
            continue;
        }
        let d = (state.coordinate_m - t.coordinate_m).abs() as f64;
        if situation.weapon.can_hit_from(d) {
            let mut next = state.clone();
            next.target = Some(t.actor_id.clone());
            out.push((PlannedAction::SwitchTarget { target: t.actor_id.clone() }, next));
            break;
        }
    }

    // burning the rest of the turn bracing is always legal
    if state.ap >= MIN_AP_INCREMENT {
        let mut next = state.clone();
        next.ap = 0.0;
        out.push((PlannedAction::Defend, next));
    }

    out
}

/// Fuse consecutive same-direction moves into one long move.
pub fn optimize_movement_sequence(actions: Vec<PlannedAction>) -> Vec<PlannedAction> {
    let mut out: Vec<PlannedAction> = Vec::with_capacity(actions.len());
    for action in actions {
        match action {
            PlannedAction::Advance { distance } => {
                if let Some(PlannedAction::Advance { distance: prev }) = out.last_mut() {
                    *prev += distance;
                    continue;
                }
                out.push(PlannedAction::Advance { distance });
            }
            PlannedAction::Retreat { distance } => {
                if let Some(PlannedAction::Retreat { distance: prev }) = out.last_mut() {
                    *prev += distance;
                    continue;
                }
                out.push(PlannedAction::Retreat { distance });
            }
            other => out.push(other),
        }
    }
    out
}

struct SearchState<'a> {
    situation: &'a TacticalSituation,
    profile: &'a HeuristicProfile,
    config: &'a SearchConfig,
    deadline: Instant,
    best: Option<(f64, PlanNode, ScoreBreakdown)>,
    expanded: usize,
}

fn dfs(search: &mut SearchState<'_>, node: &mut PlanNode) {
    if Instant::now() >= search.deadline {
        return;
    }
    let (score, breakdown) = composite_score(node, search.situation, search.profile);
    node.score = Some(score);

    if !node.actions.is_empty() && score >= search.config.min_score_threshold {
        let better = match &search.best {
            Some((best_score, _, _)) => score > *best_score,
            None => true,
        };
        if better {
            search.best = Some((score, node.clone(), breakdown));
        }
    }

    // prune: out of depth, out of time slices, or a branch not worth growing
    if node.depth >= search.config.max_depth || node.state.ap < MIN_AP_INCREMENT {
        return;
    }
    if !node.actions.is_empty() && score < search.config.min_score_threshold {
        return;
    }

    let successors = get_valid_actions(node, search.situation);
    for (action, state) in successors.into_iter().take(search.config.max_branching) {
        search.expanded += 1;
        let mut child = PlanNode {
            actions: {
                let mut a = node.actions.clone();
                a.push(action);
                a
            },
            state,
            depth: node.depth + 1,
            score: None,
        };
        dfs(search, &mut child);
        if Instant::now() >= search.deadline {
            return;
        }
    }
}

/// Search for the best plan from `situation`. Returns `None` when nothing
/// beats the score threshold within the budget.
pub fn find_optimal_plan(
    situation: &TacticalSituation,
    profile: &HeuristicProfile,
    config: &SearchConfig,
) -> Option<ScoredPlan> {
    let deadline = Instant::now() + std::time::Duration::from_millis(config.time_budget_ms);
    let mut search = SearchState {
        situation,
        profile,
        config,
        deadline,
        best: None,
        expanded: 0,
    };
    let mut root = root_node(situation);
    dfs(&mut search, &mut root);
    log::debug!(
        "plan search expanded {} nodes, best score {:?}",
        search.expanded,
        search.best.as_ref().map(|(s, _, _)| *s)
    );
    search.best.map(|(score, node, breakdown)| ScoredPlan {
        actions: optimize_movement_sequence(node.actions),
        score,
        breakdown,
    })
}
