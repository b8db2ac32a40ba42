//! End-to-end scenarios driven through the public reducer surface.

mod common;

use battleline::ai::{choose_target_for_actor, generate_combat_plan};
use battleline::commands::{Command, CommandKind, MoveBy};
use battleline::config::SearchConfig;
use battleline::events::{AttackOutcome, EventBody};
use battleline::model::{ActorId, Facing, SessionId};
use battleline::{reduce, rng};

use common::{ap_of, battle, coordinate_of, hp_of, ActorSpec};

fn cmd(actor: &str, session: &SessionId, kind: CommandKind) -> Command {
    Command::new("cmd", "trace:test", ActorId::from(actor), Some(session.clone()), kind)
}

fn strike(actor: &str, session: &SessionId, target: &str) -> Command {
    cmd(actor, session, CommandKind::Strike { target: Some(ActorId::from(target)) })
}

#[test]
fn simple_strike_declares_one_exchange() {
    rng::clear_rng();
    rng::seed_rng(11);
    let (mut ctx, session) = battle(&[
        ActorSpec::new("a", "red", 100).weapon("urn:w:sword"),
        ActorSpec::new("b", "blue", 101).facing(Facing::Negative),
    ]);

    let ap_before = ap_of(&ctx, &session, "a");
    let events = reduce(&mut ctx, &strike("a", &session, "b"));

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind(), "COMBATANT_DID_ATTACK");
    assert_eq!(events[1].kind(), "COMBATANT_WAS_ATTACKED");
    assert!(ap_of(&ctx, &session, "a") < ap_before);
    assert!(hp_of(&ctx, "b") > 0);
    assert!(ctx.events.events_of_kind("COMBATANT_DID_DIE").is_empty());
    rng::clear_rng();
}

#[test]
fn lethal_strike_emits_death_in_order() {
    rng::clear_rng();
    rng::seed_rng(11);
    // pin the exchange: max accuracy, then a damage die totalling 50
    rng::force_roll(20, 20);
    rng::force_roll(8, 48);
    let (mut ctx, session) = battle(&[
        ActorSpec::new("a", "red", 100).weapon("urn:w:sword"),
        ActorSpec::new("b", "blue", 101).facing(Facing::Negative).hp(1),
    ]);

    let events = reduce(&mut ctx, &strike("a", &session, "b"));

    assert_eq!(events.len(), 3);
    assert_eq!(events[0].kind(), "COMBATANT_DID_ATTACK");
    match &events[1].body {
        EventBody::CombatantWasAttacked { outcome, damage, .. } => {
            assert_eq!(*outcome, AttackOutcome::Hit);
            assert_eq!(*damage, 50);
        }
        other => panic!("expected WAS_ATTACKED, got {:?}", other),
    }
    match &events[2].body {
        EventBody::CombatantDidDie { killer } => assert_eq!(killer, &ActorId::from("a")),
        other => panic!("expected DID_DIE, got {:?}", other),
    }
    assert_eq!(hp_of(&ctx, "b"), 0);
    rng::clear_rng();
}

#[test]
fn cleave_sweeps_optimal_range_only() {
    rng::clear_rng();
    rng::seed_rng(7);
    let (mut ctx, session) = battle(&[
        ActorSpec::new("a", "red", 100).weapon("urn:w:greatsword"),
        ActorSpec::new("e1", "blue", 102),
        ActorSpec::new("e2", "blue", 102),
        ActorSpec::new("e3", "blue", 102),
        ActorSpec::new("ally", "red", 102),
        ActorSpec::new("far", "blue", 110),
    ]);
    let energy_before = ctx.world.actors[&ActorId::from("a")].energy.joules;

    let events = reduce(&mut ctx, &cmd("a", &session, CommandKind::Cleave {}));

    // one aggregate attack up front, one defense event per swept enemy
    assert_eq!(events[0].kind(), "COMBATANT_DID_ATTACK");
    let attacked: Vec<_> = events
        .iter()
        .filter(|e| e.kind() == "COMBATANT_WAS_ATTACKED")
        .map(|e| e.actor.to_string())
        .collect();
    assert_eq!(attacked, vec!["e1", "e2", "e3"]);
    assert!(events.iter().all(|e| e.actor != ActorId::from("ally")));
    assert!(events.iter().all(|e| e.actor != ActorId::from("far")));

    // the sweep drains stamina: 200 + 100·3 kg, per swept target
    let energy_after = ctx.world.actors[&ActorId::from("a")].energy.joules;
    assert_eq!(energy_before - energy_after, 1500.0);
    rng::clear_rng();
}

#[test]
fn cleave_requires_two_hands_and_bodies_in_the_arc() {
    let (mut ctx, session) = battle(&[
        ActorSpec::new("a", "red", 100).weapon("urn:w:sword"),
        ActorSpec::new("b", "blue", 101),
    ]);
    let events = reduce(&mut ctx, &cmd("a", &session, CommandKind::Cleave {}));
    assert!(events.is_empty());
    assert_eq!(ctx.events.errors().last().unwrap().code, "NEEDS_TWO_HANDED_WEAPON");

    let (mut ctx, session) = battle(&[
        ActorSpec::new("a", "red", 100).weapon("urn:w:greatsword"),
        ActorSpec::new("b", "blue", 110),
    ]);
    let events = reduce(&mut ctx, &cmd("a", &session, CommandKind::Cleave {}));
    assert!(events.is_empty());
    assert_eq!(
        ctx.events.errors().last().unwrap().code,
        "NO_ENEMIES_AT_OPTIMAL_RANGE"
    );
}

#[test]
fn blocked_advance_names_the_blocker_and_the_room_left() {
    let (mut ctx, session) = battle(&[
        ActorSpec::new("a", "red", 100),
        ActorSpec::new("b", "blue", 103).facing(Facing::Negative),
    ]);

    let events = reduce(
        &mut ctx,
        &cmd(
            "a",
            &session,
            CommandKind::Advance { by: MoveBy::Distance, value: 5.0, auto_done: false },
        ),
    );

    assert!(events.is_empty());
    assert_eq!(coordinate_of(&ctx, &session, "a"), 100);
    let err = ctx.events.errors().last().unwrap();
    assert_eq!(err.code, "COLLISION_BLOCKED");
    assert!(err.message.contains("103"));
    assert!(err.message.contains('2'));
}

#[test]
fn retreat_covers_half_the_ground_per_ap() {
    let specs = || {
        [
            ActorSpec::new("a", "red", 150).fin(50),
            ActorSpec::new("b", "blue", 250).facing(Facing::Negative),
        ]
    };

    let (mut forward_ctx, session) = battle(&specs());
    let ap_before = ap_of(&forward_ctx, &session, "a");
    reduce(
        &mut forward_ctx,
        &cmd(
            "a",
            &session,
            CommandKind::Advance { by: MoveBy::Ap, value: 2.0, auto_done: false },
        ),
    );
    let advanced = coordinate_of(&forward_ctx, &session, "a") - 150;
    assert_eq!(ap_before - ap_of(&forward_ctx, &session, "a"), 2.0);

    let (mut backward_ctx, session) = battle(&specs());
    reduce(
        &mut backward_ctx,
        &cmd(
            "a",
            &session,
            CommandKind::Retreat { by: MoveBy::Ap, value: 2.0, auto_done: false },
        ),
    );
    let retreated = 150 - coordinate_of(&backward_ctx, &session, "a");
    assert_eq!(ap_before - ap_of(&backward_ctx, &session, "a"), 2.0);

    assert_eq!(advanced, 6);
    assert_eq!(retreated, 3);
    assert_eq!(retreated * 2, advanced);
}

#[test]
fn planner_closes_and_swings_within_budget() {
    rng::clear_rng();
    rng::seed_rng(3);
    let (mut ctx, session) = battle(&[
        ActorSpec::new("a", "red", 100).weapon("urn:w:sword"),
        ActorSpec::new("b", "blue", 105).facing(Facing::Negative),
    ]);

    let started = std::time::Instant::now();
    let plan = generate_combat_plan(
        &mut ctx,
        &session,
        &ActorId::from("a"),
        &SearchConfig::default(),
        "trace:plan",
    )
    .unwrap();
    assert!(started.elapsed().as_millis() < 100, "planning blew the time contract");

    assert!(!plan.is_empty());
    let has_advance = plan.iter().any(|c| matches!(c.kind, CommandKind::Advance { .. }));
    let has_swing_or_brace = plan
        .iter()
        .any(|c| matches!(c.kind, CommandKind::Strike { .. } | CommandKind::Defend { .. }));
    assert!(has_advance, "plan should close the gap: {:?}", plan);
    assert!(has_swing_or_brace, "plan should end in violence or bracing: {:?}", plan);

    // replaying the plan must fit the 6.0 AP budget without errors
    for command in &plan {
        reduce(&mut ctx, command);
    }
    assert!(ctx.events.errors().is_empty(), "replay errored: {:?}", ctx.events.errors());
    assert!(ap_of(&ctx, &session, "a") >= 0.0);
    rng::clear_rng();
}

#[test]
fn cross_session_strike_is_rejected() {
    use battleline::model::{Battlefield, BattlefieldPosition, PlaceId, TeamTag};

    let (mut ctx, s1) = battle(&[
        ActorSpec::new("a", "red", 100).weapon("urn:w:sword"),
        ActorSpec::new("d", "blue", 101),
    ]);
    // a second, unrelated battle in the same place
    for spec in [ActorSpec::new("c", "red", 10), ActorSpec::new("e", "blue", 11)] {
        let actor = common::make_actor(&spec);
        ctx.world.actors.insert(actor.id.clone(), actor);
    }
    let s2 = SessionId::from("combat:other");
    ctx.create_combat_session(s2.clone(), PlaceId::from(common::ARENA), Battlefield::default())
        .unwrap();
    ctx.add_combatant(
        &s2,
        &ActorId::from("c"),
        TeamTag::from("red"),
        BattlefieldPosition::new(10, Facing::Positive),
    )
    .unwrap();
    ctx.add_combatant(
        &s2,
        &ActorId::from("e"),
        TeamTag::from("blue"),
        BattlefieldPosition::new(11, Facing::Negative),
    )
    .unwrap();

    let events = reduce(&mut ctx, &strike("a", &s1, "c"));
    assert!(events.is_empty());
    let err = ctx.events.errors().last().unwrap();
    assert_eq!(err.code, "FORBIDDEN");
    assert!(err.message.contains("outside your session"));
}

#[test]
fn ap_never_rises_during_a_turn() {
    let (mut ctx, session) = battle(&[
        ActorSpec::new("a", "red", 100).weapon("urn:w:sword"),
        ActorSpec::new("b", "blue", 103).facing(Facing::Negative),
    ]);

    let mut samples = vec![ap_of(&ctx, &session, "a")];
    reduce(
        &mut ctx,
        &cmd(
            "a",
            &session,
            CommandKind::Advance { by: MoveBy::Distance, value: 2.0, auto_done: false },
        ),
    );
    samples.push(ap_of(&ctx, &session, "a"));
    reduce(&mut ctx, &strike("a", &session, "b"));
    samples.push(ap_of(&ctx, &session, "a"));
    reduce(&mut ctx, &cmd("a", &session, CommandKind::Defend { auto_done: false }));
    samples.push(ap_of(&ctx, &session, "a"));

    for window in samples.windows(2) {
        assert!(window[1] <= window[0] + 1e-9, "AP rose mid-turn: {:?}", samples);
    }
    // the pool refills only at transfer
    reduce(&mut ctx, &cmd("a", &session, CommandKind::Done {}));
    assert_eq!(ap_of(&ctx, &session, "a"), 6.0);
}

#[test]
fn target_choice_is_stable_and_idempotent() {
    let (mut ctx, session) = battle(&[
        ActorSpec::new("a", "red", 100).weapon("urn:w:sword"),
        ActorSpec::new("b", "blue", 101).facing(Facing::Negative),
        ActorSpec::new("c", "blue", 150).facing(Facing::Negative),
    ]);

    // choose, persist, choose again: same answer while the target holds up
    let first = choose_target_for_actor(&ctx, &session, &ActorId::from("a")).unwrap();
    let events = reduce(
        &mut ctx,
        &cmd("a", &session, CommandKind::Target { target: first.actor_id.clone() }),
    );
    assert_eq!(events.len(), 1);
    let second = choose_target_for_actor(&ctx, &session, &ActorId::from("a")).unwrap();
    assert_eq!(first.actor_id, second.actor_id);

    // repeating the same TARGET declares nothing further
    for _ in 0..3 {
        let repeat = reduce(
            &mut ctx,
            &cmd("a", &session, CommandKind::Target { target: first.actor_id.clone() }),
        );
        assert!(repeat.is_empty());
    }
    assert_eq!(ctx.events.events_of_kind("COMBATANT_DID_ACQUIRE_TARGET").len(), 1);
}

#[test]
fn defend_spends_the_remainder_and_can_chain_done() {
    let (mut ctx, session) = battle(&[
        ActorSpec::new("a", "red", 100).weapon("urn:w:sword"),
        ActorSpec::new("b", "blue", 101).facing(Facing::Negative),
    ]);

    let events =
        reduce(&mut ctx, &cmd("a", &session, CommandKind::Defend { auto_done: true }));
    // defend event plus the chained turn transfer
    assert_eq!(events[0].kind(), "COMBATANT_DID_DEFEND");
    assert!(events.iter().any(|e| e.kind() == "COMBAT_TURN_DID_END"));
    assert!(events.iter().any(|e| e.kind() == "COMBAT_TURN_DID_START"));
    // the turn moved to b
    let session_state = ctx.world.session(&session).unwrap();
    assert_eq!(session_state.clock.actor, Some(ActorId::from("b")));
}

#[test]
fn max_advance_stops_one_meter_short_of_the_enemy() {
    let (mut ctx, session) = battle(&[
        ActorSpec::new("a", "red", 100),
        ActorSpec::new("b", "blue", 105).facing(Facing::Negative),
    ]);

    let events = reduce(
        &mut ctx,
        &cmd(
            "a",
            &session,
            CommandKind::Advance { by: MoveBy::Max, value: 0.0, auto_done: false },
        ),
    );

    assert_eq!(events.len(), 1);
    match &events[0].body {
        EventBody::ActorDidMoveInCombat { from, to, distance, .. } => {
            assert_eq!(*from, 100);
            assert_eq!(*to, 104); // blocker at 105, stop one meter short
            assert_eq!(*distance, 4.0);
        }
        other => panic!("expected a move event, got {:?}", other),
    }
    assert!(ctx.events.errors().is_empty());
}

#[test]
fn combatant_api_binds_session_and_actor() {
    rng::clear_rng();
    rng::seed_rng(5);
    let (mut ctx, session) = battle(&[
        ActorSpec::new("a", "red", 100).weapon("urn:w:sword"),
        ActorSpec::new("b", "blue", 102).facing(Facing::Negative),
    ]);

    // the scoped view is refused for strangers
    assert!(ctx.combatant_api(&session, &ActorId::from("ghost")).is_err());

    let mut api = ctx.combatant_api(&session, &ActorId::from("a")).unwrap();
    let moved = api.advance(battleline::MoveMode::ByDistance(1.0), false, "trace:api");
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].kind(), "ACTOR_DID_MOVE_IN_COMBAT");
    let struck = api.strike(Some(ActorId::from("b")), "trace:api");
    assert_eq!(struck[0].kind(), "COMBATANT_DID_ATTACK");

    assert_eq!(coordinate_of(&ctx, &session, "a"), 101);
    assert!(ap_of(&ctx, &session, "a") < 6.0);
    rng::clear_rng();
}

#[test]
fn movement_respects_battlefield_bounds() {
    let (mut ctx, session) = battle(&[
        ActorSpec::new("a", "red", 2),
        ActorSpec::new("b", "blue", 200).facing(Facing::Negative),
    ]);

    // a faces the far end; retreating 5 m would leave the field at -3
    let events = reduce(
        &mut ctx,
        &cmd(
            "a",
            &session,
            CommandKind::Retreat { by: MoveBy::Distance, value: 5.0, auto_done: false },
        ),
    );
    assert!(events.is_empty());
    assert_eq!(ctx.events.errors().last().unwrap().code, "BOUNDARY_EXCEEDED");
    assert_eq!(coordinate_of(&ctx, &session, "a"), 2);
}
