//! The public reducer surface: one dispatch per command type, each wrapped
//! in the validation decorators it needs. Hosts feed parsed commands in and
//! collect the declared events.

use crate::actions;
use crate::commands::{Command, CommandKind, MoveMode};
use crate::context::EngineContext;
use crate::events::WorldEvent;
use crate::validation::{with_combat_session_and_target, with_existing_combat_session};

/// Apply one command to the world. Events produced by the call are both
/// appended to the context's log and returned in declaration order.
pub fn reduce(ctx: &mut EngineContext, cmd: &Command) -> Vec<WorldEvent> {
    log::debug!("reduce {} from {} [{}]", cmd.kind.kind(), cmd.actor, cmd.trace);
    match &cmd.kind {
        CommandKind::Strike { .. } | CommandKind::Target { .. } => {
            with_combat_session_and_target(ctx, cmd, Box::new(dispatch))
        }
        _ => with_existing_combat_session(ctx, cmd, Box::new(dispatch)),
    }
}

fn dispatch(ctx: &mut EngineContext, cmd: &Command) -> Vec<WorldEvent> {
    // decorators guarantee a present session by the time we get here
    let session_id = cmd.session.clone().expect("decorator checked session");
    match &cmd.kind {
        CommandKind::Strike { target } => {
            actions::strike(ctx, &session_id, &cmd.actor, target.clone(), &cmd.trace)
        }
        CommandKind::Cleave {} => actions::cleave(ctx, &session_id, &cmd.actor, &cmd.trace),
        CommandKind::Defend { auto_done } => {
            actions::defend(ctx, &session_id, &cmd.actor, *auto_done, &cmd.trace)
        }
        CommandKind::Advance { by, value, auto_done } => actions::advance(
            ctx,
            &session_id,
            &cmd.actor,
            MoveMode::from_parts(*by, *value),
            *auto_done,
            &cmd.trace,
        ),
        CommandKind::Retreat { by, value, auto_done } => actions::retreat(
            ctx,
            &session_id,
            &cmd.actor,
            MoveMode::from_parts(*by, *value),
            *auto_done,
            &cmd.trace,
        ),
        CommandKind::Target { target } => {
            actions::set_target(ctx, &session_id, &cmd.actor, target.clone(), &cmd.trace)
        }
        CommandKind::Done {} => actions::done(ctx, &session_id, &cmd.actor, &cmd.trace),
    }
}
