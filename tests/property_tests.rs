//! Property-based coverage of the numeric invariants: rounding always
//! favors the house, the physics curves invert cleanly, AP stays on its
//! grid, and movement never leaves the field.

mod common;

use proptest::prelude::*;

use battleline::commands::{Command, CommandKind, MoveBy};
use battleline::model::{ActorId, Facing, SessionId};
use battleline::physics::{ap_capacity, ap_to_distance, distance_to_ap};
use battleline::reduce;
use battleline::rounding::{clean_ap_precision, round_ap_up, round_distance_down};

use common::{battle, ActorSpec};

fn cmd(actor: &str, session: &SessionId, kind: CommandKind) -> Command {
    Command::new("cmd", "trace:prop", ActorId::from(actor), Some(session.clone()), kind)
}

proptest! {
    #[test]
    fn quoted_ap_never_undercuts_the_precise_cost(
        pow in 0u32..=100,
        fin in 0u32..=100,
        distance in 0.0f64..50.0,
        mass in 40.0f64..150.0,
    ) {
        let precise = distance_to_ap(pow, fin, distance, mass);
        let quoted = round_ap_up(precise);
        prop_assert!(quoted >= precise - 1e-12);
        // and the quote sits on the 0.1 grid
        prop_assert!((quoted * 10.0 - (quoted * 10.0).round()).abs() < 1e-9);
    }

    #[test]
    fn rounded_distance_never_overshoots(
        distance in 0.0f64..300.0,
    ) {
        let rounded = round_distance_down(distance);
        prop_assert!(rounded <= distance + 1e-3);
        prop_assert_eq!(rounded, rounded.round());
    }

    #[test]
    fn physics_curves_invert(
        pow in 1u32..=100,
        fin in 1u32..=100,
        distance in 0.1f64..60.0,
        mass in 40.0f64..150.0,
    ) {
        let ap = distance_to_ap(pow, fin, distance, mass);
        let back = ap_to_distance(pow, fin, ap, mass);
        prop_assert!((back - distance).abs() < 1e-9);
    }

    #[test]
    fn movement_gets_cheaper_with_stats_and_dearer_with_mass(
        pow in 0u32..=99,
        fin in 0u32..=99,
        distance in 1.0f64..40.0,
        mass in 40.0f64..149.0,
    ) {
        let base = distance_to_ap(pow, fin, distance, mass);
        prop_assert!(distance_to_ap(pow + 1, fin, distance, mass) <= base);
        prop_assert!(distance_to_ap(pow, fin + 1, distance, mass) <= base);
        prop_assert!(distance_to_ap(pow, fin, distance, mass + 1.0) >= base);
        prop_assert!(distance_to_ap(pow, fin, distance + 1.0, mass) > base);
    }

    #[test]
    fn ap_capacity_is_monotone_and_bounded(int_a in 0u32..=150, int_b in 0u32..=150) {
        let (lo, hi) = if int_a <= int_b { (int_a, int_b) } else { (int_b, int_a) };
        prop_assert!(ap_capacity(lo) <= ap_capacity(hi));
        prop_assert!(ap_capacity(hi) <= 6.0 * 1.618_034 + 1e-6);
        prop_assert!(ap_capacity(lo) >= 6.0);
    }

    #[test]
    fn clean_precision_is_idempotent(raw in -100.0f64..100.0) {
        let once = clean_ap_precision(raw);
        prop_assert_eq!(once, clean_ap_precision(once));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Invariant: after any legal advance/retreat the coordinate is a whole
    // meter inside the field, and AP stays on the 0.1 grid.
    #[test]
    fn moves_stay_on_the_field_and_on_the_grid(
        start in 5i64..295,
        req in prop::collection::vec((any::<bool>(), 1.0f64..10.0), 1..4),
    ) {
        let (mut ctx, session) = battle(&[
            ActorSpec::new("a", "red", start),
            ActorSpec::new("b", "blue", 299).facing(Facing::Negative),
        ]);
        for (forward, dist) in req {
            let kind = if forward {
                CommandKind::Advance { by: MoveBy::Distance, value: dist, auto_done: false }
            } else {
                CommandKind::Retreat { by: MoveBy::Distance, value: dist, auto_done: false }
            };
            reduce(&mut ctx, &cmd("a", &session, kind));

            let combatant = ctx
                .world
                .session(&session)
                .unwrap()
                .combatant(&ActorId::from("a"))
                .unwrap();
            prop_assert!(combatant.position.coordinate_m >= 0);
            prop_assert!(combatant.position.coordinate_m <= 300);
            let ap = combatant.ap.current;
            prop_assert!((ap * 10.0 - (ap * 10.0).round()).abs() < 1e-6, "AP off grid: {}", ap);
            prop_assert!(ap >= 0.0);
        }
    }

    // Invariant: every combatant a cleave touches was an enemy standing at
    // exactly the weapon's optimal range.
    #[test]
    fn cleave_only_touches_enemies_at_optimal(
        e1 in 98i64..107,
        e2 in 98i64..107,
        ally_pos in 98i64..107,
    ) {
        let (mut ctx, session) = battle(&[
            ActorSpec::new("a", "red", 100).weapon("urn:w:greatsword"),
            ActorSpec::new("e1", "blue", e1),
            ActorSpec::new("e2", "blue", e2),
            ActorSpec::new("ally", "red", ally_pos),
        ]);
        let events = reduce(&mut ctx, &cmd("a", &session, CommandKind::Cleave {}));
        let optimal_targets: Vec<i64> = [("e1", e1), ("e2", e2)]
            .iter()
            .filter(|(_, p)| (p - 100).abs() == 2)
            .map(|(_, p)| *p)
            .collect();

        if optimal_targets.is_empty() {
            prop_assert!(events.is_empty());
        } else {
            let attacked: Vec<String> = events
                .iter()
                .filter(|e| e.kind() == "COMBATANT_WAS_ATTACKED")
                .map(|e| e.actor.to_string())
                .collect();
            prop_assert_eq!(attacked.len(), optimal_targets.len());
            prop_assert!(!attacked.contains(&"ally".to_string()));
            for id in attacked {
                let at = if id == "e1" { e1 } else { e2 };
                prop_assert_eq!((at - 100).abs(), 2);
            }
        }
    }

    // Invariant: TARGET is idempotent no matter how often it repeats.
    #[test]
    fn repeated_targeting_declares_once(repeats in 1usize..6) {
        let (mut ctx, session) = battle(&[
            ActorSpec::new("a", "red", 100),
            ActorSpec::new("b", "blue", 101).facing(Facing::Negative),
        ]);
        for _ in 0..repeats {
            reduce(
                &mut ctx,
                &cmd("a", &session, CommandKind::Target { target: ActorId::from("b") }),
            );
        }
        prop_assert_eq!(
            ctx.events.events_of_kind("COMBATANT_DID_ACQUIRE_TARGET").len(),
            1
        );
    }
}
