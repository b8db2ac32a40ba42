//! Targeting policy: keep a good target while it lasts, otherwise pick the
//! best candidate in one pass with deterministic tie-breaking.

use crate::config::{OPTIMAL_TOLERANCE_FALLOFF_M, OPTIMAL_TOLERANCE_STRICT_M};
use crate::context::EngineContext;
use crate::errors::{CombatError, CombatResult};
use crate::model::{ActorId, SessionId, WeaponClass};
use crate::team::{can_weapon_hit_from_distance, distance_between};

/// The chosen enemy and how far away it stands.
#[derive(Debug, Clone, PartialEq)]
pub struct ChosenTarget {
    pub actor_id: ActorId,
    pub distance: f64,
}

/// Pick an enemy for `actor_id` in its session.
///
/// Persistence first: a living, reachable, already-chosen target is kept.
/// Otherwise candidates are scanned once, preferring enemies near the
/// weapon's optimal distance (lowest HP among them), then reachable ones by
/// weapon-appropriate score, then the closest enemy as a movement fallback.
pub fn choose_target_for_actor(
    ctx: &EngineContext,
    session_id: &SessionId,
    actor_id: &ActorId,
) -> CombatResult<ChosenTarget> {
    let session = ctx.world.session(session_id)?;
    let combatant = session
        .combatant(actor_id)
        .ok_or_else(|| CombatError::CombatantNotFound(actor_id.to_string()))?;
    let actor = ctx.world.actor(actor_id)?;
    let weapon = ctx.equipped_weapon_schema(actor)?;
    let ranged = weapon.classify() == WeaponClass::Ranged;

    // 1. persistence
    if let Some(current) = combatant.target.as_ref() {
        if let Some(enemy) = session.combatant(current) {
            let alive = ctx.world.actors.get(current).map(|a| a.alive()).unwrap_or(false);
            let hostile = enemy.team != combatant.team;
            let distance = distance_between(&combatant.position, &enemy.position);
            if alive && hostile && can_weapon_hit_from_distance(weapon, distance) {
                log::debug!("{} keeps target {} at {} m", actor_id, current, distance);
                return Ok(ChosenTarget { actor_id: current.clone(), distance });
            }
        }
    }

    let tolerance = if weapon.range.falloff.is_some() {
        OPTIMAL_TOLERANCE_FALLOFF_M
    } else {
        OPTIMAL_TOLERANCE_STRICT_M
    };

    // 2.+3. one pass over living enemies
    let mut any = false;
    let mut closest: Option<(ActorId, f64)> = None;
    let mut best_at_optimal: Option<(ActorId, f64, f64)> = None; // (id, distance, hp_ratio)
    let mut best_in_range: Option<(ActorId, f64, f64)> = None; // (id, distance, score)

    for enemy in &session.combatants {
        if &enemy.actor_id == actor_id || enemy.team == combatant.team {
            continue;
        }
        let Some(enemy_actor) = ctx.world.actors.get(&enemy.actor_id) else {
            continue;
        };
        if !enemy_actor.alive() {
            continue;
        }
        any = true;
        let distance = distance_between(&combatant.position, &enemy.position);

        match &closest {
            Some((_, d)) if *d <= distance => {}
            _ => closest = Some((enemy.actor_id.clone(), distance)),
        }

        if !can_weapon_hit_from_distance(weapon, distance) {
            continue;
        }
        let hp_ratio = enemy_actor.hp.ratio();
        if (distance - weapon.range.optimal).abs() <= tolerance {
            // execute the weakest enemy standing where the weapon wants it
            match &best_at_optimal {
                Some((_, _, best_ratio)) if *best_ratio <= hp_ratio => {}
                _ => best_at_optimal = Some((enemy.actor_id.clone(), distance, hp_ratio)),
            }
        } else {
            let score = if ranged { hp_ratio / distance.max(1e-9) } else { distance };
            match &best_in_range {
                Some((_, _, best)) if *best <= score => {}
                _ => best_in_range = Some((enemy.actor_id.clone(), distance, score)),
            }
        }
    }

    if let Some((id, distance, _)) = best_at_optimal {
        return Ok(ChosenTarget { actor_id: id, distance });
    }
    if let Some((id, distance, _)) = best_in_range {
        return Ok(ChosenTarget { actor_id: id, distance });
    }
    if let Some((id, distance)) = closest {
        return Ok(ChosenTarget { actor_id: id, distance });
    }
    debug_assert!(!any);
    Err(CombatError::NoValidTargets(format!(
        "{} sees no living enemies in session {}",
        actor_id, session_id
    )))
}
