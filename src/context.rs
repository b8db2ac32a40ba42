//! The engine context: world stores, schema catalog, roll surfaces, event
//! and error sinks. One context is the single source of truth for every
//! reducer call; sessions inside it never share mutable state.

use std::collections::HashMap;

use crate::actions;
use crate::commands::MoveMode;
use crate::config::EngineTuning;
use crate::dice::{self, RollResult};
use crate::errors::{CombatError, CombatResult};
use crate::events::{EventLog, WorldEvent};
use crate::model::{
    Actor, ActorId, ActorStore, Battlefield, BattlefieldPosition, CombatSession, PlaceId,
    SchemaUrn, SessionId, TeamTag, TurnTransition, WeaponSchema,
};
use crate::rng;

/// Name → schema catalog. Read-only for the combat core.
#[derive(Debug, Clone, Default)]
pub struct SchemaManager {
    weapons: HashMap<SchemaUrn, WeaponSchema>,
}

impl SchemaManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, schema: WeaponSchema) {
        self.weapons.insert(schema.urn.clone(), schema);
    }

    pub fn get_schema(&self, urn: &SchemaUrn) -> CombatResult<&WeaponSchema> {
        self.weapons
            .get(urn)
            .ok_or_else(|| CombatError::SchemaNotFound(urn.to_string()))
    }
}

/// Actors and sessions, exactly as the host supplied them.
#[derive(Debug, Clone, Default)]
pub struct WorldState {
    pub actors: ActorStore,
    pub sessions: HashMap<SessionId, CombatSession>,
}

impl WorldState {
    pub fn actor(&self, id: &ActorId) -> CombatResult<&Actor> {
        self.actors.get(id).ok_or_else(|| CombatError::ActorNotFound(id.to_string()))
    }

    pub fn actor_mut(&mut self, id: &ActorId) -> CombatResult<&mut Actor> {
        self.actors.get_mut(id).ok_or_else(|| CombatError::ActorNotFound(id.to_string()))
    }

    pub fn session(&self, id: &SessionId) -> CombatResult<&CombatSession> {
        self.sessions.get(id).ok_or_else(|| CombatError::InvalidSession(id.to_string()))
    }

    pub fn session_mut(&mut self, id: &SessionId) -> CombatResult<&mut CombatSession> {
        self.sessions.get_mut(id).ok_or_else(|| CombatError::InvalidSession(id.to_string()))
    }
}

/// Per-planning-pass memoization. Lives for one analysis; `clear` is called
/// when a fresh tactical situation is built so nothing leaks across
/// reducer boundaries.
#[derive(Debug, Clone, Default)]
pub struct AnalysisCaches {
    pub distance: HashMap<(ActorId, ActorId), f64>,
    pub weapon: HashMap<ActorId, WeaponSchema>,
    pub target: HashMap<ActorId, ActorId>,
}

impl AnalysisCaches {
    pub fn clear(&mut self) {
        self.distance.clear();
        self.weapon.clear();
        self.target.clear();
    }
}

/// Everything a reducer call observes and mutates.
#[derive(Debug, Clone, Default)]
pub struct EngineContext {
    pub world: WorldState,
    pub schemas: SchemaManager,
    pub tuning: EngineTuning,
    pub events: EventLog,
    pub caches: AnalysisCaches,
}

impl EngineContext {
    pub fn new(schemas: SchemaManager) -> Self {
        Self {
            world: WorldState::default(),
            schemas,
            tuning: EngineTuning::default(),
            events: EventLog::new(),
            caches: AnalysisCaches::default(),
        }
    }

    pub fn with_tuning(mut self, tuning: EngineTuning) -> Self {
        self.tuning = tuning;
        self
    }

    // ---- equipment & mass surfaces -------------------------------------

    pub fn equipped_weapon_schema(&self, actor: &Actor) -> CombatResult<&WeaponSchema> {
        let urn = actor
            .equipped_weapon
            .as_ref()
            .ok_or_else(|| CombatError::WeaponNotEquipped(actor.id.to_string()))?;
        self.schemas.get_schema(urn)
    }

    /// Total carried mass in grams: the body plus whatever is wielded.
    pub fn compute_actor_mass_grams(&self, actor: &Actor) -> f64 {
        let weapon = actor
            .equipped_weapon
            .as_ref()
            .and_then(|urn| self.schemas.get_schema(urn).ok())
            .map(|w| w.base_mass_grams)
            .unwrap_or(0.0);
        actor.body_mass_grams + weapon
    }

    /// Mass that matters for combat motion, in kilograms.
    pub fn compute_combat_mass_kg(&self, actor: &Actor) -> f64 {
        self.compute_actor_mass_grams(actor) / 1000.0
    }

    // ---- roll surfaces -------------------------------------------------

    pub fn roll_dice(&self, spec: &str) -> RollResult {
        dice::roll_detailed(spec)
    }

    /// Accuracy is a raw d20; stat and weapon modifiers are applied by the
    /// rating functions so events can carry the naked roll.
    pub fn roll_weapon_accuracy(&self, _actor: &Actor, _weapon: &WeaponSchema) -> RollResult {
        dice::roll_detailed("1d20")
    }

    /// Damage dice derive from the weapon's heft and grip; power adds flat.
    pub fn roll_weapon_damage(&self, actor: &Actor, weapon: &WeaponSchema) -> RollResult {
        dice::roll_detailed(&damage_spec(actor, weapon))
    }

    pub fn random(&self) -> f64 {
        rng::random_unit()
    }

    // ---- sinks ---------------------------------------------------------

    pub fn uniqid(&mut self) -> String {
        self.events.uniqid()
    }

    pub fn declare_error(&mut self, trace: &str, error: &CombatError) {
        self.events.declare_error(trace, error);
    }

    // ---- session orchestration ----------------------------------------

    pub fn create_combat_session(
        &mut self,
        id: SessionId,
        location: PlaceId,
        battlefield: Battlefield,
    ) -> CombatResult<()> {
        if self.world.sessions.contains_key(&id) {
            return Err(CombatError::AlreadyPresent(format!("session {}", id)));
        }
        self.world
            .sessions
            .insert(id.clone(), CombatSession::create(id, location, battlefield));
        Ok(())
    }

    /// Enroll an actor into a session and record the membership on the
    /// actor, which is what cross-session checks read later.
    pub fn add_combatant(
        &mut self,
        session_id: &SessionId,
        actor_id: &ActorId,
        team: TeamTag,
        position: BattlefieldPosition,
    ) -> CombatResult<()> {
        let WorldState { actors, sessions } = &mut self.world;
        let actor = actors
            .get(actor_id)
            .ok_or_else(|| CombatError::ActorNotFound(actor_id.to_string()))?;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| CombatError::InvalidSession(session_id.to_string()))?;
        session.add_combatant(actor, team, position)?;
        if let Some(actor) = actors.get_mut(actor_id) {
            actor.sessions.insert(session_id.clone());
        }
        Ok(())
    }

    pub fn start_combat(&mut self, session_id: &SessionId, trace: &str) -> CombatResult<ActorId> {
        let session = self.world.session_mut(session_id)?;
        session.start_combat(trace, &mut self.events)
    }

    pub fn advance_turn(
        &mut self,
        session_id: &SessionId,
        trace: &str,
    ) -> CombatResult<TurnTransition> {
        let WorldState { actors, sessions } = &mut self.world;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| CombatError::InvalidSession(session_id.to_string()))?;
        session.advance_turn(actors, trace, &mut self.events)
    }

    /// Scoped view binding one combatant to its session: the entry point
    /// hosts use to drive action primitives directly.
    pub fn combatant_api(
        &mut self,
        session_id: &SessionId,
        actor_id: &ActorId,
    ) -> CombatResult<CombatantApi<'_>> {
        let session = self.world.session(session_id)?;
        if !session.contains(actor_id) {
            return Err(CombatError::CombatantNotFound(format!(
                "{} is not in session {}",
                actor_id, session_id
            )));
        }
        Ok(CombatantApi {
            ctx: self,
            session_id: session_id.clone(),
            actor_id: actor_id.clone(),
        })
    }
}

/// Damage dice from weapon heft: light arms roll a d6, war weapons a d8,
/// true two-hander mass a d12; a second die for two-handed grips, and
/// power adds flat on top.
fn damage_spec(actor: &Actor, weapon: &WeaponSchema) -> String {
    let mass_kg = weapon.mass_kg();
    let sides = if mass_kg < 1.5 {
        6
    } else if mass_kg < 3.0 {
        8
    } else {
        12
    };
    let count = if weapon.is_two_handed() { 2 } else { 1 };
    let pow_bonus = actor.stats.pow / 5;
    format!("{}d{}+{}[pow]", count, sides, pow_bonus)
}

/// Action primitives bound to one session and one combatant.
///
/// The view borrows the whole context for its lifetime, which is exactly the
/// single-threaded atomic-reducer contract: while an api exists, nothing
/// else observes the session.
pub struct CombatantApi<'a> {
    ctx: &'a mut EngineContext,
    session_id: SessionId,
    actor_id: ActorId,
}

impl CombatantApi<'_> {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn actor_id(&self) -> &ActorId {
        &self.actor_id
    }

    pub fn strike(&mut self, target: Option<ActorId>, trace: &str) -> Vec<WorldEvent> {
        actions::strike(self.ctx, &self.session_id, &self.actor_id, target, trace)
    }

    pub fn cleave(&mut self, trace: &str) -> Vec<WorldEvent> {
        actions::cleave(self.ctx, &self.session_id, &self.actor_id, trace)
    }

    pub fn defend(&mut self, auto_done: bool, trace: &str) -> Vec<WorldEvent> {
        actions::defend(self.ctx, &self.session_id, &self.actor_id, auto_done, trace)
    }

    pub fn advance(&mut self, mode: MoveMode, auto_done: bool, trace: &str) -> Vec<WorldEvent> {
        actions::advance(self.ctx, &self.session_id, &self.actor_id, mode, auto_done, trace)
    }

    pub fn retreat(&mut self, mode: MoveMode, auto_done: bool, trace: &str) -> Vec<WorldEvent> {
        actions::retreat(self.ctx, &self.session_id, &self.actor_id, mode, auto_done, trace)
    }

    pub fn set_target(&mut self, target: ActorId, trace: &str) -> Vec<WorldEvent> {
        actions::set_target(self.ctx, &self.session_id, &self.actor_id, target, trace)
    }

    pub fn done(&mut self, trace: &str) -> Vec<WorldEvent> {
        actions::done(self.ctx, &self.session_id, &self.actor_id, trace)
    }
}
