//! Validation decorators: reusable guards wrapped around reducers.
//!
//! Each decorator is total — it never mutates state. It either runs the
//! wrapped reducer or declares a validation error and short-circuits with
//! an empty event vector.

use crate::commands::Command;
use crate::context::EngineContext;
use crate::errors::CombatError;
use crate::events::WorldEvent;

type Reducer<'r> = dyn FnOnce(&mut EngineContext, &Command) -> Vec<WorldEvent> + 'r;

/// Require the command's session to exist and its actor to be a combatant
/// there.
pub fn with_existing_combat_session(
    ctx: &mut EngineContext,
    cmd: &Command,
    reducer: Box<Reducer<'_>>,
) -> Vec<WorldEvent> {
    let Some(session_id) = cmd.session.as_ref() else {
        ctx.declare_error(
            &cmd.trace,
            &CombatError::InvalidSession("command names no session".to_string()),
        );
        return Vec::new();
    };
    let Some(session) = ctx.world.sessions.get(session_id) else {
        ctx.declare_error(
            &cmd.trace,
            &CombatError::InvalidSession(session_id.to_string()),
        );
        return Vec::new();
    };
    if !session.contains(&cmd.actor) {
        ctx.declare_error(
            &cmd.trace,
            &CombatError::Forbidden(format!(
                "{} is not a combatant of session {}",
                cmd.actor, session_id
            )),
        );
        return Vec::new();
    }
    reducer(ctx, cmd)
}

/// Veto commands whose target lives in a different combat session.
///
/// When neither side names a session, the command passes only if both
/// actors are out of combat everywhere.
pub fn with_prevent_cross_session_targeting(
    ctx: &mut EngineContext,
    cmd: &Command,
    reducer: Box<Reducer<'_>>,
) -> Vec<WorldEvent> {
    let Some(target) = cmd.kind.target_arg() else {
        // nothing to guard
        return reducer(ctx, cmd);
    };

    let Ok(attacker) = ctx.world.actor(&cmd.actor) else {
        ctx.declare_error(&cmd.trace, &CombatError::ActorNotFound(cmd.actor.to_string()));
        return Vec::new();
    };
    let Ok(target_actor) = ctx.world.actor(target) else {
        ctx.declare_error(
            &cmd.trace,
            &CombatError::ActorNotFound(format!("target {} not found", target)),
        );
        return Vec::new();
    };

    match cmd.session.as_ref() {
        Some(session_id) => {
            if !target_actor.sessions.contains(session_id) {
                ctx.declare_error(
                    &cmd.trace,
                    &CombatError::Forbidden(format!(
                        "target {} is outside your session",
                        target
                    )),
                );
                return Vec::new();
            }
        }
        None => {
            // sessionless path: only two bystanders may square off
            if !attacker.sessions.is_empty() {
                ctx.declare_error(
                    &cmd.trace,
                    &CombatError::Forbidden(format!("{} is already in combat", cmd.actor)),
                );
                return Vec::new();
            }
            if !target_actor.sessions.is_empty() {
                ctx.declare_error(
                    &cmd.trace,
                    &CombatError::Forbidden(format!("target {} is already in combat", target)),
                );
                return Vec::new();
            }
        }
    }
    reducer(ctx, cmd)
}

/// Both guards, session first.
pub fn with_combat_session_and_target(
    ctx: &mut EngineContext,
    cmd: &Command,
    reducer: Box<Reducer<'_>>,
) -> Vec<WorldEvent> {
    with_existing_combat_session(
        ctx,
        cmd,
        Box::new(move |ctx, cmd| with_prevent_cross_session_targeting(ctx, cmd, reducer)),
    )
}
