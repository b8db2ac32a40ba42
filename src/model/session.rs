use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::actor::Actor;
use super::battlefield::{Battlefield, BattlefieldPosition};
use super::combatant::Combatant;
use super::ids::{ActorId, PlaceId, SessionId, TeamTag};
use crate::errors::{CombatError, CombatResult};
use crate::events::{EventBody, EventLog};
use crate::physics::ap_capacity;

/// Read-only world view of actors, keyed by id.
pub type ActorStore = HashMap<ActorId, Actor>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Setup,
    Running,
    Ended,
}

/// Sessions of this engine only ever run the combat strategy; the tag keeps
/// the session record self-describing for hosts that mix session kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStrategy {
    Combat,
}

/// Current round and turn, plus who holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundClock {
    pub round: u32,
    pub turn: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<ActorId>,
}

impl Default for RoundClock {
    fn default() -> Self {
        Self { round: 0, turn: 0, actor: None }
    }
}

/// Result of a turn transfer.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnTransition {
    /// Combat continues; this actor now holds the turn.
    Continue { actor: ActorId },
    /// Exactly one team still has living members; combat is decided.
    Decided { winner: TeamTag },
}

/// The authoritative state machine for one battle.
///
/// Combatants are kept in insertion order — turn assignment walks that
/// order, so it must never be re-sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatSession {
    pub id: SessionId,
    pub location: PlaceId,
    pub strategy: SessionStrategy,
    pub battlefield: Battlefield,
    pub combatants: Vec<Combatant>,
    pub clock: RoundClock,
    pub status: SessionStatus,
}

impl CombatSession {
    pub fn create(id: SessionId, location: PlaceId, battlefield: Battlefield) -> Self {
        Self {
            id,
            location,
            strategy: SessionStrategy::Combat,
            battlefield,
            combatants: Vec::new(),
            clock: RoundClock::default(),
            status: SessionStatus::Setup,
        }
    }

    pub fn contains(&self, actor: &ActorId) -> bool {
        self.combatants.iter().any(|c| &c.actor_id == actor)
    }

    pub fn combatant(&self, actor: &ActorId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| &c.actor_id == actor)
    }

    pub fn combatant_mut(&mut self, actor: &ActorId) -> Option<&mut Combatant> {
        self.combatants.iter_mut().find(|c| &c.actor_id == actor)
    }

    fn index_of(&self, actor: &ActorId) -> Option<usize> {
        self.combatants.iter().position(|c| &c.actor_id == actor)
    }

    /// Enroll an actor. AP capacity is fixed from Intelligence here; the
    /// pool stays sealed (current = 0) until combat starts.
    pub fn add_combatant(
        &mut self,
        actor: &Actor,
        team: TeamTag,
        position: BattlefieldPosition,
    ) -> CombatResult<()> {
        if !actor.alive() {
            return Err(CombatError::Dead(format!("{} cannot join combat", actor.id)));
        }
        if actor.location != self.location {
            return Err(CombatError::NotAtLocation(format!(
                "{} is at {}, session is at {}",
                actor.id, actor.location, self.location
            )));
        }
        if self.contains(&actor.id) {
            return Err(CombatError::AlreadyPresent(actor.id.to_string()));
        }
        if !self.battlefield.contains(position.coordinate_m) {
            return Err(CombatError::BoundaryExceeded {
                max_distance_m: self.battlefield.length_m as f64,
            });
        }
        self.combatants.push(Combatant::new(
            actor.id.clone(),
            team,
            position,
            ap_capacity(actor.stats.int),
            actor.energy.fatigue(),
        ));
        Ok(())
    }

    fn is_alive(&self, actors: &ActorStore, combatant: &Combatant) -> bool {
        actors.get(&combatant.actor_id).map(Actor::alive).unwrap_or(false)
    }

    /// Living teams, deduplicated, in insertion order.
    fn living_teams(&self, actors: &ActorStore) -> Vec<&TeamTag> {
        let mut teams: Vec<&TeamTag> = Vec::new();
        for c in &self.combatants {
            if self.is_alive(actors, c) && !teams.contains(&&c.team) {
                teams.push(&c.team);
            }
        }
        teams
    }

    /// The surviving team, when the battle is decided.
    pub fn winner(&self, actors: &ActorStore) -> Option<TeamTag> {
        match self.living_teams(actors).as_slice() {
            [only] => Some((*only).clone()),
            _ => None,
        }
    }

    /// Open hostilities: first turn goes to the earliest-inserted living
    /// combatant, whose AP pool is unsealed to full.
    pub fn start_combat(&mut self, trace: &str, events: &mut EventLog) -> CombatResult<ActorId> {
        if self.status != SessionStatus::Setup {
            return Err(CombatError::InvalidSession(format!(
                "session {} already started",
                self.id
            )));
        }
        // needs at least two teams willing to hurt each other; aliveness was
        // checked at the door and nothing fights before the first turn
        let mut teams: Vec<&TeamTag> = Vec::new();
        for c in &self.combatants {
            if !teams.contains(&&c.team) {
                teams.push(&c.team);
            }
        }
        if teams.len() < 2 {
            return Err(CombatError::NoOpponents(format!(
                "session {} has {} team(s)",
                self.id,
                teams.len()
            )));
        }

        let first = self.combatants[0].actor_id.clone();
        self.status = SessionStatus::Running;
        self.clock = RoundClock { round: 1, turn: 1, actor: Some(first.clone()) };
        if let Some(c) = self.combatant_mut(&first) {
            c.ap.restore();
        }
        log::info!("combat started in session {}, first turn: {}", self.id, first);
        events.declare(
            trace,
            first.clone(),
            self.location.clone(),
            Some(self.id.clone()),
            EventBody::CombatTurnDidStart { round: 1, turn: 1 },
        );
        Ok(first)
    }

    /// Transfer the turn to the next living combatant in insertion order.
    ///
    /// The outgoing combatant recovers to full AP as part of the transfer;
    /// both the close and the open of a turn are declared as events. Dead
    /// combatants are skipped but never removed, so the event history keeps
    /// addressing them.
    pub fn advance_turn(
        &mut self,
        actors: &ActorStore,
        trace: &str,
        events: &mut EventLog,
    ) -> CombatResult<TurnTransition> {
        if self.status != SessionStatus::Running {
            return Err(CombatError::InvalidSession(format!(
                "session {} is not running",
                self.id
            )));
        }
        let outgoing = self
            .clock
            .actor
            .clone()
            .ok_or_else(|| CombatError::InvalidSession("no turn holder".to_string()))?;
        let outgoing_idx = self
            .index_of(&outgoing)
            .ok_or_else(|| CombatError::CombatantNotFound(outgoing.to_string()))?;

        let (round, turn) = (self.clock.round, self.clock.turn);
        let (ap_before, ap_recovered, ap_after) = {
            let c = &mut self.combatants[outgoing_idx];
            let before = c.ap.current;
            let recovered = c.ap.restore();
            (before, recovered, c.ap.current)
        };
        events.declare(
            trace,
            outgoing.clone(),
            self.location.clone(),
            Some(self.id.clone()),
            EventBody::CombatTurnDidEnd { round, turn, ap_before, ap_after, ap_recovered },
        );

        let n = self.combatants.len();
        let next_idx = (1..=n)
            .map(|step| (outgoing_idx + step) % n)
            .find(|&i| self.is_alive(actors, &self.combatants[i]));

        let Some(next_idx) = next_idx else {
            self.status = SessionStatus::Ended;
            self.clock.actor = None;
            return Err(CombatError::NoLivingCombatants(self.id.to_string()));
        };

        if let Some(winner) = self.winner(actors) {
            self.status = SessionStatus::Ended;
            self.clock.actor = None;
            log::info!("session {} decided for team {}", self.id, winner);
            return Ok(TurnTransition::Decided { winner });
        }

        let incoming = self.combatants[next_idx].actor_id.clone();
        if next_idx <= outgoing_idx {
            self.clock.round += 1;
            self.clock.turn = 1;
        } else {
            self.clock.turn += 1;
        }
        self.clock.actor = Some(incoming.clone());
        self.combatants[next_idx].ap.restore();
        events.declare(
            trace,
            incoming.clone(),
            self.location.clone(),
            Some(self.id.clone()),
            EventBody::CombatTurnDidStart { round: self.clock.round, turn: self.clock.turn },
        );
        Ok(TurnTransition::Continue { actor: incoming })
    }
}
