use crate::context::EngineContext;
use crate::costs::cleave_cost;
use crate::errors::{CombatError, CombatResult};
use crate::events::{AttackOutcome, AttackType, EventBody, WorldEvent};
use crate::model::{ActorId, SessionId};
use crate::resolution::{attack_rating, evasion_rating, resolve_hit};
use crate::team::distance_between;

use super::run_primitive;

/// Horizontal sweep with a two-handed weapon: every living enemy standing
/// at exactly the weapon's optimal range is attacked in one motion.
pub fn cleave(
    ctx: &mut EngineContext,
    session_id: &SessionId,
    actor_id: &ActorId,
    trace: &str,
) -> Vec<WorldEvent> {
    let session_id = session_id.clone();
    let actor_id = actor_id.clone();
    run_primitive(ctx, trace, move |ctx| cleave_inner(ctx, &session_id, &actor_id, trace))
}

fn cleave_inner(
    ctx: &mut EngineContext,
    session_id: &SessionId,
    actor_id: &ActorId,
    trace: &str,
) -> CombatResult<Vec<WorldEvent>> {
    let session = ctx.world.session(session_id)?;
    let location = session.location.clone();
    let combatant = session
        .combatant(actor_id)
        .ok_or_else(|| CombatError::CombatantNotFound(actor_id.to_string()))?;
    let own_position = combatant.position;
    let own_team = combatant.team.clone();
    let own_ap = combatant.ap.current;

    let actor = ctx.world.actor(actor_id)?;
    let weapon = ctx.equipped_weapon_schema(actor)?.clone();
    if !weapon.is_two_handed() {
        return Err(CombatError::NeedsTwoHandedWeapon(weapon.name.clone()));
    }
    let optimal = weapon.range.optimal;

    // the sweep covers the arc at exactly optimal reach, enemies only, in
    // session insertion order
    let mut targets: Vec<(ActorId, f64)> = Vec::new();
    for c in &session.combatants {
        if &c.actor_id == actor_id || c.team == own_team {
            continue;
        }
        let alive = ctx.world.actors.get(&c.actor_id).map(|a| a.alive()).unwrap_or(false);
        if !alive {
            continue;
        }
        let d = distance_between(&own_position, &c.position);
        if (d - optimal).abs() < 1e-9 {
            targets.push((c.actor_id.clone(), c.energy_position));
        }
    }
    if targets.is_empty() {
        return Err(CombatError::NoEnemiesAtOptimalRange { optimal_m: optimal });
    }

    let cost = cleave_cost(&ctx.tuning, weapon.mass_kg(), actor.stats.fin, targets.len());
    if own_ap + 0.05 < cost.ap {
        return Err(CombatError::InsufficientAp { required: cost.ap, available: own_ap });
    }
    if actor.energy.joules < cost.energy_j {
        return Err(CombatError::InsufficientEnergy {
            required: cost.energy_j,
            available: actor.energy.joules,
        });
    }

    // resolve every target up front so the commit below cannot half-apply
    struct SweepHit {
        target: ActorId,
        roll: crate::dice::RollResult,
        attack: f64,
        evasion: f64,
        outcome: AttackOutcome,
        damage: u32,
    }
    let mut hits: Vec<SweepHit> = Vec::with_capacity(targets.len());
    for (target_id, fatigue) in &targets {
        let target_actor = ctx.world.actor(target_id)?;
        let roll = ctx.roll_weapon_accuracy(actor, &weapon);
        let atk = attack_rating(actor, &weapon, roll.sum);
        let evasion = evasion_rating(target_actor, ctx.compute_combat_mass_kg(target_actor));
        let resolution = resolve_hit(evasion, atk, *fatigue, ctx.random());
        let (outcome, damage) = if resolution.evaded {
            (AttackOutcome::Miss, 0u32)
        } else {
            let dmg = ctx.roll_weapon_damage(actor, &weapon).sum.round().max(0.0) as u32;
            (AttackOutcome::Hit, dmg)
        };
        hits.push(SweepHit {
            target: target_id.clone(),
            roll,
            attack: atk,
            evasion,
            outcome,
            damage,
        });
    }

    // commit: AP and stamina first, then damage per target
    {
        let session = ctx.world.session_mut(session_id)?;
        session
            .combatant_mut(actor_id)
            .expect("combatant checked above")
            .spend_ap(cost.ap)?;
    }
    {
        let actor = ctx.world.actor_mut(actor_id)?;
        actor.consume_energy(cost.energy_j);
        let fatigue = actor.energy.fatigue();
        ctx.world
            .session_mut(session_id)?
            .combatant_mut(actor_id)
            .expect("combatant checked above")
            .energy_position = fatigue;
    }

    let first = &hits[0];
    let mut out = Vec::with_capacity(1 + hits.len());
    // aggregate attack event leads the vector, carrying the first target's roll
    out.push(ctx.events.declare(
        trace,
        actor_id.clone(),
        location.clone(),
        Some(session_id.clone()),
        EventBody::CombatantDidAttack {
            target: first.target.clone(),
            attack_type: AttackType::Cleave,
            cost,
            roll: first.roll.clone(),
            attack_rating: first.attack,
        },
    ));

    for hit in &hits {
        let was_alive = ctx.world.actor(&hit.target)?.alive();
        if hit.damage > 0 {
            ctx.world.actor_mut(&hit.target)?.decrement_hp(hit.damage);
        }
        let now_dead = !ctx.world.actor(&hit.target)?.alive();
        out.push(ctx.events.declare(
            trace,
            hit.target.clone(),
            location.clone(),
            Some(session_id.clone()),
            EventBody::CombatantWasAttacked {
                source: actor_id.clone(),
                attack_type: AttackType::Cleave,
                outcome: hit.outcome,
                attack_rating: hit.attack,
                evasion_rating: hit.evasion,
                damage: hit.damage,
            },
        ));
        if was_alive && now_dead {
            log::info!("{} cleaved down {} in session {}", actor_id, hit.target, session_id);
            out.push(ctx.events.declare(
                trace,
                hit.target.clone(),
                location.clone(),
                Some(session_id.clone()),
                EventBody::CombatantDidDie { killer: actor_id.clone() },
            ));
        }
    }
    Ok(out)
}
