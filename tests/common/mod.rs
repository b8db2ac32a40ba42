//! Shared fixtures for the integration suites.

use std::collections::{BTreeMap, HashSet};

use battleline::context::{EngineContext, SchemaManager};
use battleline::model::{
    Actor, ActorId, Battlefield, BattlefieldPosition, EnergyStore, Facing, HitPoints, PlaceId,
    SchemaUrn, SessionId, StatBlock, TeamTag, WeaponRange, WeaponSchema,
};

pub const ARENA: &str = "arena";

pub fn sword() -> WeaponSchema {
    WeaponSchema {
        urn: SchemaUrn::from("urn:w:sword"),
        name: "Arming sword".to_string(),
        base_mass_grams: 1_500.0,
        range: WeaponRange { optimal: 1.0, max: 1.0, falloff: None, min: None },
        fit: BTreeMap::from([("hand.main".to_string(), 1)]),
    }
}

pub fn greatsword() -> WeaponSchema {
    WeaponSchema {
        urn: SchemaUrn::from("urn:w:greatsword"),
        name: "Greatsword".to_string(),
        base_mass_grams: 3_000.0,
        range: WeaponRange { optimal: 2.0, max: 2.0, falloff: None, min: None },
        fit: BTreeMap::from([("hand.main".to_string(), 1), ("hand.off".to_string(), 1)]),
    }
}

pub fn bow() -> WeaponSchema {
    WeaponSchema {
        urn: SchemaUrn::from("urn:w:bow"),
        name: "Longbow".to_string(),
        base_mass_grams: 800.0,
        range: WeaponRange { optimal: 20.0, max: 80.0, falloff: Some(15.0), min: Some(3.0) },
        fit: BTreeMap::from([("hand.main".to_string(), 1), ("hand.off".to_string(), 1)]),
    }
}

pub struct ActorSpec {
    pub id: &'static str,
    pub team: &'static str,
    pub position: i64,
    pub facing: Facing,
    pub hp: u32,
    pub weapon: Option<&'static str>,
    pub stats: StatBlock,
}

impl ActorSpec {
    pub fn new(id: &'static str, team: &'static str, position: i64) -> Self {
        Self {
            id,
            team,
            position,
            facing: Facing::Positive,
            hp: 100,
            weapon: None,
            stats: StatBlock::default(),
        }
    }

    pub fn facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    pub fn hp(mut self, hp: u32) -> Self {
        self.hp = hp;
        self
    }

    pub fn weapon(mut self, urn: &'static str) -> Self {
        self.weapon = Some(urn);
        self
    }

    pub fn fin(mut self, fin: u32) -> Self {
        self.stats.fin = fin;
        self
    }
}

pub fn make_actor(spec: &ActorSpec) -> Actor {
    Actor {
        id: ActorId::from(spec.id),
        name: spec.id.to_string(),
        location: PlaceId::from(ARENA),
        stats: spec.stats,
        hp: HitPoints::full(spec.hp),
        energy: EnergyStore::full(20_000.0),
        body_mass_grams: 70_000.0,
        equipped_weapon: spec.weapon.map(SchemaUrn::from),
        sessions: HashSet::new(),
    }
}

/// Build a started session containing the given fighters, in order.
pub fn battle(specs: &[ActorSpec]) -> (EngineContext, SessionId) {
    let mut schemas = SchemaManager::new();
    schemas.register(sword());
    schemas.register(greatsword());
    schemas.register(bow());
    let mut ctx = EngineContext::new(schemas);

    for spec in specs {
        let actor = make_actor(spec);
        ctx.world.actors.insert(actor.id.clone(), actor);
    }

    let session_id = SessionId::from("combat:test");
    ctx.create_combat_session(session_id.clone(), PlaceId::from(ARENA), Battlefield::default())
        .unwrap();
    for spec in specs {
        ctx.add_combatant(
            &session_id,
            &ActorId::from(spec.id),
            TeamTag::from(spec.team),
            BattlefieldPosition::new(spec.position, spec.facing),
        )
        .unwrap();
    }
    ctx.start_combat(&session_id, "test:setup").unwrap();
    // the suites care about events from here on
    ctx.events.drain();
    (ctx, session_id)
}

pub fn ap_of(ctx: &EngineContext, session: &SessionId, actor: &str) -> f64 {
    ctx.world
        .session(session)
        .unwrap()
        .combatant(&ActorId::from(actor))
        .unwrap()
        .ap
        .current
}

pub fn coordinate_of(ctx: &EngineContext, session: &SessionId, actor: &str) -> i64 {
    ctx.world
        .session(session)
        .unwrap()
        .combatant(&ActorId::from(actor))
        .unwrap()
        .position
        .coordinate_m
}

pub fn hp_of(ctx: &EngineContext, actor: &str) -> u32 {
    ctx.world.actors[&ActorId::from(actor)].hp.current
}
