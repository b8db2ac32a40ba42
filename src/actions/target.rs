use crate::context::EngineContext;
use crate::errors::{CombatError, CombatResult};
use crate::events::{EventBody, WorldEvent};
use crate::model::{ActorId, SessionId};

use super::run_primitive;

/// Persistently choose a target. Idempotent: re-choosing the current target
/// declares nothing.
pub fn set_target(
    ctx: &mut EngineContext,
    session_id: &SessionId,
    actor_id: &ActorId,
    target: ActorId,
    trace: &str,
) -> Vec<WorldEvent> {
    let session_id = session_id.clone();
    let actor_id = actor_id.clone();
    run_primitive(ctx, trace, move |ctx| {
        target_inner(ctx, &session_id, &actor_id, target, trace)
    })
}

fn target_inner(
    ctx: &mut EngineContext,
    session_id: &SessionId,
    actor_id: &ActorId,
    target: ActorId,
    trace: &str,
) -> CombatResult<Vec<WorldEvent>> {
    let session = ctx.world.session(session_id)?;
    let location = session.location.clone();
    let combatant = session
        .combatant(actor_id)
        .ok_or_else(|| CombatError::CombatantNotFound(actor_id.to_string()))?;
    if !session.contains(&target) {
        return Err(CombatError::CombatantNotFound(format!(
            "target {} is not in session {}",
            target, session_id
        )));
    }
    if combatant.target.as_ref() == Some(&target) {
        return Ok(Vec::new());
    }

    ctx.world
        .session_mut(session_id)?
        .combatant_mut(actor_id)
        .expect("combatant checked above")
        .target = Some(target.clone());

    Ok(vec![ctx.events.declare(
        trace,
        actor_id.clone(),
        location,
        Some(session_id.clone()),
        EventBody::CombatantDidAcquireTarget { target },
    )])
}
