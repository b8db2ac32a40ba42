//! Action primitives: pure reducers over the session state.
//!
//! Every primitive shares one contract: resolve dependencies, validate all
//! preconditions, then mutate and declare events. A failed precondition
//! reports through the error sink and returns an empty vector with state
//! untouched — all-or-nothing per primitive.

mod cleave;
mod defend;
mod done;
mod movement;
mod strike;
mod target;

pub use cleave::cleave;
pub use defend::defend;
pub use done::done;
pub use movement::{advance, retreat};
pub use strike::strike;
pub use target::set_target;

use crate::context::EngineContext;
use crate::errors::{CombatError, CombatResult};
use crate::events::WorldEvent;

/// Run a primitive body, routing failures to the error sink.
pub(crate) fn run_primitive(
    ctx: &mut EngineContext,
    trace: &str,
    body: impl FnOnce(&mut EngineContext) -> CombatResult<Vec<WorldEvent>>,
) -> Vec<WorldEvent> {
    match body(ctx) {
        Ok(events) => events,
        Err(error) => {
            ctx.declare_error(trace, &error);
            Vec::new()
        }
    }
}

/// Events declared since `mark`, for primitives that chain into others
/// (auto-done) and need the combined vector.
pub(crate) fn declared_since(ctx: &EngineContext, mark: usize) -> Vec<WorldEvent> {
    ctx.events.all()[mark..].to_vec()
}

/// Shared lookup: the combatant must exist in the session.
pub(crate) fn require_combatant_exists(
    ctx: &EngineContext,
    session_id: &crate::model::SessionId,
    actor_id: &crate::model::ActorId,
) -> CombatResult<()> {
    let session = ctx.world.session(session_id)?;
    if !session.contains(actor_id) {
        return Err(CombatError::CombatantNotFound(format!(
            "{} is not in session {}",
            actor_id, session_id
        )));
    }
    Ok(())
}
