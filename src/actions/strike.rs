use crate::context::EngineContext;
use crate::costs::strike_cost;
use crate::errors::{CombatError, CombatResult};
use crate::events::{AttackOutcome, AttackType, EventBody, WorldEvent};
use crate::model::{ActorId, SessionId};
use crate::resolution::{attack_rating, evasion_rating, resolve_hit};
use crate::team::{can_weapon_hit_from_distance, distance_between};

use super::run_primitive;

/// Strike the explicit target, or the persistently chosen one.
pub fn strike(
    ctx: &mut EngineContext,
    session_id: &SessionId,
    actor_id: &ActorId,
    target: Option<ActorId>,
    trace: &str,
) -> Vec<WorldEvent> {
    let session_id = session_id.clone();
    let actor_id = actor_id.clone();
    run_primitive(ctx, trace, move |ctx| {
        strike_inner(ctx, &session_id, &actor_id, target, trace)
    })
}

fn strike_inner(
    ctx: &mut EngineContext,
    session_id: &SessionId,
    actor_id: &ActorId,
    target: Option<ActorId>,
    trace: &str,
) -> CombatResult<Vec<WorldEvent>> {
    // resolve and validate everything before touching state
    let session = ctx.world.session(session_id)?;
    let location = session.location.clone();
    let combatant = session
        .combatant(actor_id)
        .ok_or_else(|| CombatError::CombatantNotFound(actor_id.to_string()))?;
    let target_id = target
        .or_else(|| combatant.target.clone())
        .ok_or_else(|| CombatError::NoTarget(format!("{} has no target", actor_id)))?;
    let target_combatant = session
        .combatant(&target_id)
        .ok_or_else(|| CombatError::CombatantNotFound(target_id.to_string()))?;
    let target_fatigue = target_combatant.energy_position;

    let actor = ctx.world.actor(actor_id)?;
    let weapon = ctx.equipped_weapon_schema(actor)?.clone();
    let distance = distance_between(&combatant.position, &target_combatant.position);
    if !can_weapon_hit_from_distance(&weapon, distance) {
        return Err(CombatError::OutOfRange(format!(
            "target at {} m, weapon reaches {} m",
            distance, weapon.range.max
        )));
    }

    let cost = strike_cost(actor, &weapon);
    if !combatant.can_afford(cost.ap) {
        return Err(CombatError::InsufficientAp {
            required: cost.ap,
            available: combatant.ap.current,
        });
    }

    let target_actor = ctx.world.actor(&target_id)?;
    let target_was_alive = target_actor.alive();

    // resolve the exchange
    let roll = ctx.roll_weapon_accuracy(actor, &weapon);
    let atk = attack_rating(actor, &weapon, roll.sum);
    let evasion = evasion_rating(target_actor, ctx.compute_combat_mass_kg(target_actor));
    let resolution = resolve_hit(evasion, atk, target_fatigue, ctx.random());
    let (outcome, damage) = if resolution.evaded {
        (AttackOutcome::Miss, 0u32)
    } else {
        let dmg = ctx.roll_weapon_damage(actor, &weapon).sum.round().max(0.0) as u32;
        (AttackOutcome::Hit, dmg)
    };

    // commit
    ctx.world
        .session_mut(session_id)?
        .combatant_mut(actor_id)
        .expect("combatant checked above")
        .spend_ap(cost.ap)?;
    if damage > 0 {
        ctx.world.actor_mut(&target_id)?.decrement_hp(damage);
    }
    let target_now_dead = !ctx.world.actor(&target_id)?.alive();

    let mut out = Vec::with_capacity(3);
    out.push(ctx.events.declare(
        trace,
        actor_id.clone(),
        location.clone(),
        Some(session_id.clone()),
        EventBody::CombatantDidAttack {
            target: target_id.clone(),
            attack_type: AttackType::Strike,
            cost,
            roll,
            attack_rating: atk,
        },
    ));
    out.push(ctx.events.declare(
        trace,
        target_id.clone(),
        location.clone(),
        Some(session_id.clone()),
        EventBody::CombatantWasAttacked {
            source: actor_id.clone(),
            attack_type: AttackType::Strike,
            outcome,
            attack_rating: atk,
            evasion_rating: evasion,
            damage,
        },
    ));
    if target_was_alive && target_now_dead {
        log::info!("{} killed {} in session {}", actor_id, target_id, session_id);
        out.push(ctx.events.declare(
            trace,
            target_id,
            location,
            Some(session_id.clone()),
            EventBody::CombatantDidDie { killer: actor_id.clone() },
        ));
    }
    Ok(out)
}
