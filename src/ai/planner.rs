//! Plan emission: turn a scored plan into the same typed commands a player
//! would submit, ready to feed back through the reducers.

use crate::commands::{Command, CommandKind, MoveBy};
use crate::config::SearchConfig;
use crate::context::EngineContext;
use crate::errors::CombatResult;
use crate::model::{ActorId, SessionId};

use super::analysis::analyze_battlefield;
use super::heuristics::create_heuristic_profile;
use super::search::{find_optimal_plan, PlannedAction, ScoredPlan};
use super::targeting::choose_target_for_actor;

/// Plan a turn for `actor_id` and emit it as commands.
///
/// The sequence starts with a `TARGET` command when the targeting policy
/// picked someone new; movement and attacks follow in plan order. An empty
/// vector means the search found nothing worth doing.
pub fn generate_combat_plan(
    ctx: &mut EngineContext,
    session_id: &SessionId,
    actor_id: &ActorId,
    config: &SearchConfig,
    trace: &str,
) -> CombatResult<Vec<Command>> {
    let chosen = choose_target_for_actor(ctx, session_id, actor_id)?;
    let mut situation = analyze_battlefield(ctx, session_id, actor_id)?;
    situation.assessments.primary_target = Some(chosen.actor_id.clone());
    situation.assessments.primary_target_distance = Some(chosen.distance);

    let profile = create_heuristic_profile(&situation.weapon);
    let plan = find_optimal_plan(&situation, &profile, config);
    let Some(plan) = plan else {
        log::info!("{} found no plan above threshold in {}", actor_id, session_id);
        return Ok(Vec::new());
    };
    log::info!(
        "{} planned {} action(s) scoring {:.1} in {}",
        actor_id,
        plan.actions.len(),
        plan.score,
        session_id
    );
    Ok(emit_commands(ctx, session_id, actor_id, &chosen.actor_id, &plan, trace))
}

fn emit_commands(
    ctx: &mut EngineContext,
    session_id: &SessionId,
    actor_id: &ActorId,
    chosen_target: &ActorId,
    plan: &ScoredPlan,
    trace: &str,
) -> Vec<Command> {
    let mut out = Vec::with_capacity(plan.actions.len() + 1);
    let already_chosen = ctx
        .world
        .session(session_id)
        .ok()
        .and_then(|s| s.combatant(actor_id))
        .and_then(|c| c.target.as_ref())
        == Some(chosen_target);
    if !already_chosen {
        out.push(command(ctx, session_id, actor_id, trace, CommandKind::Target {
            target: chosen_target.clone(),
        }));
    }
    for action in &plan.actions {
        let kind = match action {
            PlannedAction::Strike { target } => CommandKind::Strike { target: Some(target.clone()) },
            PlannedAction::Cleave => CommandKind::Cleave {},
            PlannedAction::Advance { distance } => CommandKind::Advance {
                by: MoveBy::Distance,
                value: *distance,
                auto_done: false,
            },
            PlannedAction::Retreat { distance } => CommandKind::Retreat {
                by: MoveBy::Distance,
                value: *distance,
                auto_done: false,
            },
            PlannedAction::Defend => CommandKind::Defend { auto_done: false },
            PlannedAction::SwitchTarget { target } => {
                CommandKind::Target { target: target.clone() }
            }
        };
        out.push(command(ctx, session_id, actor_id, trace, kind));
    }
    out
}

fn command(
    ctx: &mut EngineContext,
    session_id: &SessionId,
    actor_id: &ActorId,
    trace: &str,
    kind: CommandKind,
) -> Command {
    let id = ctx.uniqid();
    Command::new(id, trace, actor_id.clone(), Some(session_id.clone()), kind)
}
