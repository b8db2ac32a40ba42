use crate::context::EngineContext;
use crate::events::WorldEvent;
use crate::model::{ActorId, SessionId, TurnTransition};

use super::{declared_since, run_primitive};

/// Yield the turn. No AP mutation; the session's turn manager closes the
/// outgoing turn and opens the next one, declaring both transitions.
pub fn done(
    ctx: &mut EngineContext,
    session_id: &SessionId,
    actor_id: &ActorId,
    trace: &str,
) -> Vec<WorldEvent> {
    let session_id = session_id.clone();
    let actor_id = actor_id.clone();
    run_primitive(ctx, trace, move |ctx| {
        super::require_combatant_exists(ctx, &session_id, &actor_id)?;
        let mark = ctx.events.len();
        match ctx.advance_turn(&session_id, trace)? {
            TurnTransition::Continue { actor } => {
                log::debug!("turn passed from {} to {}", actor_id, actor);
            }
            TurnTransition::Decided { winner } => {
                log::debug!("combat decided for team {} after {}'s turn", winner, actor_id);
            }
        }
        Ok(declared_since(ctx, mark))
    })
}
