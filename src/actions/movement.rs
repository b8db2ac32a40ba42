use crate::commands::MoveMode;
use crate::config::{ALL_REMAINING_AP, MIN_AP_INCREMENT};
use crate::context::EngineContext;
use crate::costs::{movement_cost, ActionCost};
use crate::errors::{CombatError, CombatResult};
use crate::events::{EventBody, WorldEvent};
use crate::model::{ActorId, MoveDirection, SessionId};
use crate::physics::ap_to_distance;
use crate::rounding::{round_ap_up, round_position};

use super::{declared_since, run_primitive};

/// Move along your facing.
pub fn advance(
    ctx: &mut EngineContext,
    session_id: &SessionId,
    actor_id: &ActorId,
    mode: MoveMode,
    auto_done: bool,
    trace: &str,
) -> Vec<WorldEvent> {
    perform(ctx, session_id, actor_id, MoveDirection::Forward, mode, auto_done, trace)
}

/// Move against your facing. Backing up is less efficient: the same AP buys
/// less ground, scaled by finesse.
pub fn retreat(
    ctx: &mut EngineContext,
    session_id: &SessionId,
    actor_id: &ActorId,
    mode: MoveMode,
    auto_done: bool,
    trace: &str,
) -> Vec<WorldEvent> {
    perform(ctx, session_id, actor_id, MoveDirection::Backward, mode, auto_done, trace)
}

fn perform(
    ctx: &mut EngineContext,
    session_id: &SessionId,
    actor_id: &ActorId,
    direction: MoveDirection,
    mode: MoveMode,
    auto_done: bool,
    trace: &str,
) -> Vec<WorldEvent> {
    let session_id = session_id.clone();
    let actor_id = actor_id.clone();
    run_primitive(ctx, trace, move |ctx| {
        move_inner(ctx, &session_id, &actor_id, direction, mode, auto_done, trace)
    })
}

/// First enemy on the path and how far the mover may go before stopping one
/// meter short of it. Allies never block; corpses never block.
fn check_movement_collision(
    ctx: &EngineContext,
    session_id: &SessionId,
    actor_id: &ActorId,
    p0: i64,
    p1_precise: f64,
    axis: i64,
) -> CombatResult<Option<(i64, f64)>> {
    let session = ctx.world.session(session_id)?;
    let own_team = session
        .combatant(actor_id)
        .map(|c| c.team.clone())
        .ok_or_else(|| CombatError::CombatantNotFound(actor_id.to_string()))?;
    let lo = (p0 as f64).min(p1_precise) - 1e-9;
    let hi = (p0 as f64).max(p1_precise) + 1e-9;

    let mut nearest: Option<(i64, f64)> = None;
    for c in &session.combatants {
        if &c.actor_id == actor_id || c.team == own_team {
            continue;
        }
        let alive = ctx.world.actors.get(&c.actor_id).map(|a| a.alive()).unwrap_or(false);
        if !alive {
            continue;
        }
        let at = c.position.coordinate_m;
        if at == p0 || (at as f64) < lo || (at as f64) > hi {
            continue;
        }
        let stop = at - axis; // one meter short, along the direction of travel
        let allowed = (((stop - p0) * axis) as f64).max(0.0);
        match nearest {
            Some((_, best)) if best <= allowed => {}
            _ => nearest = Some((at, allowed)),
        }
    }
    Ok(nearest)
}

fn move_inner(
    ctx: &mut EngineContext,
    session_id: &SessionId,
    actor_id: &ActorId,
    direction: MoveDirection,
    mode: MoveMode,
    auto_done: bool,
    trace: &str,
) -> CombatResult<Vec<WorldEvent>> {
    let session = ctx.world.session(session_id)?;
    let location = session.location.clone();
    let battlefield = session.battlefield;
    let combatant = session
        .combatant(actor_id)
        .ok_or_else(|| CombatError::CombatantNotFound(actor_id.to_string()))?;
    let position = combatant.position;
    let ap_available = combatant.ap.current;

    let actor = ctx.world.actor(actor_id)?;
    let (pow, fin) = (actor.stats.pow, actor.stats.fin);
    let mass_kg = ctx.compute_combat_mass_kg(actor);
    let efficiency = match direction {
        MoveDirection::Forward => ctx.tuning.forward_efficiency,
        MoveDirection::Backward => ctx.tuning.backward_efficiency(fin),
    };

    let p0 = position.coordinate_m;
    let axis = position.axis_sign(direction);
    let boundary_dist = if axis > 0 {
        (battlefield.length_m as i64 - p0) as f64
    } else {
        p0 as f64
    };

    // distance to attempt and the AP it will be quoted at
    let (distance_precise, ap_quoted) = match mode {
        MoveMode::ByDistance(d) => {
            if d <= 0.0 {
                return Err(CombatError::Forbidden(
                    "movement distance must be positive".to_string(),
                ));
            }
            // covering d meters prices the same in both directions
            (d, movement_cost(pow, fin, d, mass_kg).ap)
        }
        MoveMode::ByAp(requested) => {
            let spend = if requested == ALL_REMAINING_AP { ap_available } else { requested };
            if spend <= 0.0 {
                return Err(CombatError::Forbidden(
                    "movement AP must be positive".to_string(),
                ));
            }
            let quoted = round_ap_up(spend);
            (ap_to_distance(pow, fin, spend, mass_kg) * efficiency, quoted)
        }
        MoveMode::ByMax => {
            let afford = ap_to_distance(pow, fin, ap_available, mass_kg) * efficiency;
            let mut dist = afford.min(boundary_dist);
            let probe = p0 as f64 + (axis as f64) * dist;
            if let Some((_, allowed)) =
                check_movement_collision(ctx, session_id, actor_id, p0, probe, axis)?
            {
                dist = dist.min(allowed);
            }
            if dist < 1.0 {
                // nowhere to go; not an error, just nothing to declare
                return Ok(Vec::new());
            }
            // quoting the inverse can drift a hair past the pool; cap at it
            let quoted = movement_cost(pow, fin, dist / efficiency, mass_kg)
                .ap
                .min(crate::rounding::clean_ap_precision(ap_available));
            (dist, quoted)
        }
    };

    let p1_precise = p0 as f64 + (axis as f64) * distance_precise;
    if p1_precise < -1e-9 || p1_precise > battlefield.length_m as f64 + 1e-9 {
        return Err(CombatError::BoundaryExceeded { max_distance_m: boundary_dist });
    }

    if !matches!(mode, MoveMode::ByMax) {
        if let Some((blocker, allowed)) =
            check_movement_collision(ctx, session_id, actor_id, p0, p1_precise, axis)?
        {
            if distance_precise > allowed + 1e-9 {
                return Err(CombatError::CollisionBlocked {
                    blocker_position_m: blocker,
                    max_distance_m: allowed,
                });
            }
        }
    }

    if ap_available + 0.05 < ap_quoted {
        return Err(CombatError::InsufficientAp {
            required: ap_quoted,
            available: ap_available,
        });
    }

    // tactical rounding bites last: position snaps down to the meter grid
    let p1 = round_position(p1_precise) as i64;
    let distance_covered = ((p1 - p0) * axis).max(0) as f64;
    if distance_covered < 1.0 {
        // rounded away to nothing; charge nothing, declare nothing
        return Ok(Vec::new());
    }

    let cost = ActionCost::ap_only(ap_quoted);
    {
        let session = ctx.world.session_mut(session_id)?;
        let combatant = session.combatant_mut(actor_id).expect("combatant checked above");
        combatant.spend_ap(cost.ap)?;
        combatant.position.coordinate_m = p1;
        combatant.position.speed = distance_covered / cost.ap.max(MIN_AP_INCREMENT);
    }
    log::debug!(
        "{} moved {:?} {} m ({} -> {}) for {:.1} AP",
        actor_id,
        direction,
        distance_covered,
        p0,
        p1,
        cost.ap
    );

    let mut out = vec![ctx.events.declare(
        trace,
        actor_id.clone(),
        location,
        Some(session_id.clone()),
        EventBody::ActorDidMoveInCombat {
            from: p0,
            to: p1,
            distance: distance_covered,
            direction,
            cost,
        },
    )];

    if auto_done {
        let remaining = ctx
            .world
            .session(session_id)?
            .combatant(actor_id)
            .map(|c| c.ap.current)
            .unwrap_or(0.0);
        if remaining < MIN_AP_INCREMENT {
            let mark = ctx.events.len();
            super::done(ctx, session_id, actor_id, trace);
            out.extend(declared_since(ctx, mark));
        }
    }
    Ok(out)
}
