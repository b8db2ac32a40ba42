use crate::config::MIN_AP_INCREMENT;
use crate::context::EngineContext;
use crate::costs::defend_cost;
use crate::errors::{CombatError, CombatResult};
use crate::events::{EventBody, WorldEvent};
use crate::model::{ActorId, SessionId};

use super::{declared_since, run_primitive};

/// Brace for incoming attacks, spending everything left this turn.
///
/// Below the 0.1 AP threshold the stance is not worth announcing: the
/// residual AP is still consumed but no event is declared.
pub fn defend(
    ctx: &mut EngineContext,
    session_id: &SessionId,
    actor_id: &ActorId,
    auto_done: bool,
    trace: &str,
) -> Vec<WorldEvent> {
    let session_id = session_id.clone();
    let actor_id = actor_id.clone();
    run_primitive(ctx, trace, move |ctx| {
        defend_inner(ctx, &session_id, &actor_id, auto_done, trace)
    })
}

fn defend_inner(
    ctx: &mut EngineContext,
    session_id: &SessionId,
    actor_id: &ActorId,
    auto_done: bool,
    trace: &str,
) -> CombatResult<Vec<WorldEvent>> {
    let session = ctx.world.session(session_id)?;
    let location = session.location.clone();
    let combatant = session
        .combatant(actor_id)
        .ok_or_else(|| CombatError::CombatantNotFound(actor_id.to_string()))?;
    let cost = defend_cost(combatant.ap.current);

    {
        let session = ctx.world.session_mut(session_id)?;
        let combatant = session.combatant_mut(actor_id).expect("combatant checked above");
        combatant.spend_ap(cost.ap)?;
    }

    let mut out = Vec::with_capacity(1);
    if cost.ap >= MIN_AP_INCREMENT {
        out.push(ctx.events.declare(
            trace,
            actor_id.clone(),
            location,
            Some(session_id.clone()),
            EventBody::CombatantDidDefend { cost },
        ));
    }

    if auto_done {
        let mark = ctx.events.len();
        super::done(ctx, session_id, actor_id, trace);
        out.extend(declared_since(ctx, mark));
    }
    Ok(out)
}
