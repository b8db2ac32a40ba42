//! Battlefield analysis: the read-only snapshot the planner works from.
//!
//! A `TacticalSituation` is built fresh per planning pass; the distance
//! cache it fills lives in the context but is cleared on entry, so nothing
//! survives across reducer boundaries.

use crate::config::{
    MAX_FALLOFF_RANGES, OPTIMAL_TOLERANCE_FALLOFF_M, OPTIMAL_TOLERANCE_STRICT_M,
};
use crate::context::EngineContext;
use crate::costs::{cleave_cost, strike_cost};
use crate::errors::{CombatError, CombatResult};
use crate::model::{
    ActorId, Battlefield, BattlefieldPosition, SessionId, WeaponClass, WeaponSchema,
};
use crate::team::{can_weapon_hit_from_distance, distance_between};

/// One living enemy, with everything the planner asks about it cached.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetInfo {
    pub actor_id: ActorId,
    pub coordinate_m: i64,
    pub distance: f64,
    pub in_range: bool,
    pub is_optimal: bool,
    pub health_ratio: f64,
}

/// Remaining budgets, normalized for the heuristics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceView {
    pub ap_current: f64,
    pub ap_max: f64,
    pub energy_current: f64,
    pub energy_max: f64,
}

impl ResourceView {
    pub fn energy_ratio(&self) -> f64 {
        if self.energy_max <= 0.0 {
            0.0
        } else {
            self.energy_current / self.energy_max
        }
    }
}

/// Headline judgments derived from the target list.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessments {
    pub primary_target: Option<ActorId>,
    pub primary_target_distance: Option<f64>,
    pub can_attack: bool,
    pub needs_repositioning: bool,
    pub optimal_distance: f64,
}

/// Snapshot handed to the heuristics and the search. Everything the
/// simulation needs is denormalized here so the search never touches the
/// world again.
#[derive(Debug, Clone)]
pub struct TacticalSituation {
    pub session_id: SessionId,
    pub actor_id: ActorId,
    pub weapon: WeaponSchema,
    pub weapon_class: WeaponClass,
    pub two_handed: bool,
    pub pow: u32,
    pub fin: u32,
    pub mass_kg: f64,
    pub strike_ap: f64,
    pub cleave_ap: f64,
    pub cleave_energy_per_target: f64,
    pub backward_efficiency: f64,
    pub battlefield: Battlefield,
    pub position: BattlefieldPosition,
    pub current_target: Option<ActorId>,
    pub valid_targets: Vec<TargetInfo>,
    pub resources: ResourceView,
    pub assessments: Assessments,
}

impl TacticalSituation {
    /// Targeting tolerance around optimal for this weapon.
    pub fn optimal_tolerance(&self) -> f64 {
        if self.weapon.range.falloff.is_some() {
            OPTIMAL_TOLERANCE_FALLOFF_M
        } else {
            OPTIMAL_TOLERANCE_STRICT_M
        }
    }

    pub fn target(&self, id: &ActorId) -> Option<&TargetInfo> {
        self.valid_targets.iter().find(|t| &t.actor_id == id)
    }
}

/// Weapon effectiveness in `[0, 1]` at a given separation.
///
/// Melee is binary at arm's length, reach weapons demand their exact
/// distance, ranged weapons decay by halves past optimal out to three
/// falloff ranges.
pub fn assess_weapon_capabilities(weapon: &WeaponSchema, distance_m: f64) -> f64 {
    match weapon.classify() {
        WeaponClass::Melee => {
            if distance_m <= 1.0 {
                1.0
            } else {
                0.0
            }
        }
        WeaponClass::Reach => {
            if (distance_m - weapon.range.optimal).abs() < 1e-9 {
                1.0
            } else {
                0.0
            }
        }
        WeaponClass::Ranged => {
            let optimal = weapon.range.optimal;
            if distance_m <= optimal {
                return 1.0;
            }
            let falloff = weapon.range.falloff.unwrap_or(1.0).max(1e-9);
            let ranges_out = (distance_m - optimal) / falloff;
            if ranges_out > MAX_FALLOFF_RANGES {
                0.0
            } else {
                0.5_f64.powf(ranges_out)
            }
        }
    }
}

/// Build the planner's snapshot of one combatant's situation.
pub fn analyze_battlefield(
    ctx: &mut EngineContext,
    session_id: &SessionId,
    actor_id: &ActorId,
) -> CombatResult<TacticalSituation> {
    ctx.caches.clear();

    let session = ctx.world.session(session_id)?;
    let combatant = session
        .combatant(actor_id)
        .ok_or_else(|| CombatError::CombatantNotFound(actor_id.to_string()))?;
    let actor = ctx.world.actor(actor_id)?;
    let weapon = ctx.equipped_weapon_schema(actor)?.clone();
    let mass_kg = ctx.compute_combat_mass_kg(actor);

    let mut valid_targets = Vec::new();
    for c in &session.combatants {
        if &c.actor_id == actor_id || c.team == combatant.team {
            continue;
        }
        let Some(enemy_actor) = ctx.world.actors.get(&c.actor_id) else {
            continue;
        };
        if !enemy_actor.alive() {
            continue;
        }
        let distance = distance_between(&combatant.position, &c.position);
        ctx.caches
            .distance
            .insert((actor_id.clone(), c.actor_id.clone()), distance);
        ctx.caches.weapon.insert(actor_id.clone(), weapon.clone());
        let tolerance = if weapon.range.falloff.is_some() {
            OPTIMAL_TOLERANCE_FALLOFF_M
        } else {
            OPTIMAL_TOLERANCE_STRICT_M
        };
        valid_targets.push(TargetInfo {
            actor_id: c.actor_id.clone(),
            coordinate_m: c.position.coordinate_m,
            distance,
            in_range: can_weapon_hit_from_distance(&weapon, distance),
            is_optimal: (distance - weapon.range.optimal).abs() <= tolerance,
            health_ratio: enemy_actor.hp.ratio(),
        });
    }

    let resources = ResourceView {
        ap_current: combatant.ap.current,
        ap_max: combatant.ap.max,
        energy_current: actor.energy.joules,
        energy_max: actor.energy.capacity_j,
    };

    let strike = strike_cost(actor, &weapon);
    let cleave = cleave_cost(&ctx.tuning, weapon.mass_kg(), actor.stats.fin, 1);

    // primary: persistent choice when still listed, else the closest enemy
    let primary = combatant
        .target
        .clone()
        .filter(|t| valid_targets.iter().any(|ti| &ti.actor_id == t))
        .or_else(|| {
            valid_targets
                .iter()
                .min_by(|a, b| a.distance.total_cmp(&b.distance))
                .map(|t| t.actor_id.clone())
        });
    let primary_distance = primary
        .as_ref()
        .and_then(|p| valid_targets.iter().find(|t| &t.actor_id == p))
        .map(|t| t.distance);
    let can_attack = valid_targets
        .iter()
        .any(|t| t.in_range && combatant.ap.current + 0.05 >= strike.ap);
    let needs_repositioning = !valid_targets.iter().any(|t| t.is_optimal);

    let situation = TacticalSituation {
        session_id: session_id.clone(),
        actor_id: actor_id.clone(),
        weapon_class: weapon.classify(),
        two_handed: weapon.is_two_handed(),
        pow: actor.stats.pow,
        fin: actor.stats.fin,
        mass_kg,
        strike_ap: strike.ap,
        cleave_ap: cleave.ap,
        cleave_energy_per_target: cleave.energy_j,
        backward_efficiency: ctx.tuning.backward_efficiency(actor.stats.fin),
        battlefield: session.battlefield,
        position: combatant.position,
        current_target: combatant.target.clone(),
        assessments: Assessments {
            primary_target: primary,
            primary_target_distance: primary_distance,
            can_attack,
            needs_repositioning,
            optimal_distance: weapon.range.optimal,
        },
        weapon,
        valid_targets,
        resources,
    };
    Ok(situation)
}

/// A scored candidate standing spot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionRecommendation {
    pub coordinate_m: i64,
    pub score: f64,
    /// True when the best candidate beats standing still by a clear margin.
    pub should_move: bool,
}

/// Margin a candidate spot must win by before a move is worth the AP.
const REPOSITION_MARGIN: f64 = 10.0;

fn position_score(
    situation: &TacticalSituation,
    coordinate_m: i64,
    target: Option<&TargetInfo>,
) -> f64 {
    let field = situation.battlefield;
    // edges are death; score centrality 0..40
    let centrality = 40.0
        * (1.0 - (coordinate_m as f64 - field.center()).abs() / field.center().max(1.0));
    // distance control 0..100: how well the weapon works from here
    let control = match target {
        Some(t) => {
            let d = (coordinate_m - t.coordinate_m).abs() as f64;
            100.0 * assess_weapon_capabilities(&situation.weapon, d)
        }
        None => 0.0,
    };
    centrality + control
}

/// Propose standing spots within this turn's movement range and score them.
pub fn evaluate_positioning(
    situation: &TacticalSituation,
    target: Option<&ActorId>,
) -> PositionRecommendation {
    let target_info = target.and_then(|t| situation.target(t));
    let here = situation.position.coordinate_m;
    let current_score = position_score(situation, here, target_info);

    let max_reach = crate::physics::ap_to_distance(
        situation.pow,
        situation.fin,
        situation.resources.ap_current,
        situation.mass_kg,
    )
    .floor() as i64;

    let mut best = (here, current_score);
    for delta in 1..=max_reach.max(0) {
        for candidate in [here - delta, here + delta] {
            if !situation.battlefield.contains(candidate) {
                continue;
            }
            // never propose standing on an enemy
            if situation.valid_targets.iter().any(|t| t.coordinate_m == candidate) {
                continue;
            }
            let score = position_score(situation, candidate, target_info);
            if score > best.1 {
                best = (candidate, score);
            }
        }
    }

    PositionRecommendation {
        coordinate_m: best.0,
        score: best.1,
        should_move: best.0 != here && best.1 >= current_score + REPOSITION_MARGIN,
    }
}
