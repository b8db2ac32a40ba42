//! World events: the only externally observable artifact of the core.
//!
//! Events are declared during a single reducer call, appended to the
//! session log in declaration order, and immutable afterwards. Hosts drain
//! the log for broadcasting and persistence.

use serde::{Deserialize, Serialize};

use crate::costs::ActionCost;
use crate::dice::RollResult;
use crate::errors::CombatError;
use crate::model::{ActorId, MoveDirection, PlaceId, SessionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttackType {
    Strike,
    Cleave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttackOutcome {
    Hit,
    Miss,
}

/// Typed payload of a world event. Field names here are a stable contract;
/// the snapshot tests pin them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventBody {
    CombatantDidAttack {
        target: ActorId,
        attack_type: AttackType,
        cost: ActionCost,
        roll: RollResult,
        attack_rating: f64,
    },
    CombatantWasAttacked {
        source: ActorId,
        attack_type: AttackType,
        outcome: AttackOutcome,
        attack_rating: f64,
        evasion_rating: f64,
        damage: u32,
    },
    CombatantDidDie {
        killer: ActorId,
    },
    CombatantDidDefend {
        cost: ActionCost,
    },
    CombatantDidAcquireTarget {
        target: ActorId,
    },
    ActorDidMoveInCombat {
        from: i64,
        to: i64,
        distance: f64,
        direction: MoveDirection,
        cost: ActionCost,
    },
    CombatTurnDidStart {
        round: u32,
        turn: u32,
    },
    CombatTurnDidEnd {
        round: u32,
        turn: u32,
        ap_before: f64,
        ap_after: f64,
        ap_recovered: f64,
    },
}

impl EventBody {
    /// Event type as a stable string, for filtering and log output.
    pub fn kind(&self) -> &'static str {
        match self {
            EventBody::CombatantDidAttack { .. } => "COMBATANT_DID_ATTACK",
            EventBody::CombatantWasAttacked { .. } => "COMBATANT_WAS_ATTACKED",
            EventBody::CombatantDidDie { .. } => "COMBATANT_DID_DIE",
            EventBody::CombatantDidDefend { .. } => "COMBATANT_DID_DEFEND",
            EventBody::CombatantDidAcquireTarget { .. } => "COMBATANT_DID_ACQUIRE_TARGET",
            EventBody::ActorDidMoveInCombat { .. } => "ACTOR_DID_MOVE_IN_COMBAT",
            EventBody::CombatTurnDidStart { .. } => "COMBAT_TURN_DID_START",
            EventBody::CombatTurnDidEnd { .. } => "COMBAT_TURN_DID_END",
        }
    }
}

/// An event as declared: header identifying who/where/when plus the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldEvent {
    pub id: String,
    pub ts: u64,
    pub trace: String,
    pub actor: ActorId,
    pub location: PlaceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionId>,
    #[serde(flatten)]
    pub body: EventBody,
}

impl WorldEvent {
    pub fn kind(&self) -> &'static str {
        self.body.kind()
    }

    /// The secondary actor of the event, when the payload names one.
    pub fn counterpart(&self) -> Option<&ActorId> {
        match &self.body {
            EventBody::CombatantDidAttack { target, .. } => Some(target),
            EventBody::CombatantWasAttacked { source, .. } => Some(source),
            EventBody::CombatantDidDie { killer } => Some(killer),
            EventBody::CombatantDidAcquireTarget { target } => Some(target),
            _ => None,
        }
    }

    pub fn involves(&self, actor: &ActorId) -> bool {
        &self.actor == actor || self.counterpart() == Some(actor)
    }
}

/// A reported (non-fatal) error: code plus the trace it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub trace: String,
    pub code: String,
    pub message: String,
}

impl ErrorRecord {
    pub fn new(trace: &str, error: &CombatError) -> Self {
        Self {
            trace: trace.to_string(),
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

/// Append-only event sink with the query helpers hosts actually use.
///
/// The log also owns id/timestamp generation so every declared event gets a
/// unique, monotonically increasing identity without a global counter.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<WorldEvent>,
    errors: Vec<ErrorRecord>,
    next_serial: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh event id. Serial-based, unique per log.
    pub fn uniqid(&mut self) -> String {
        self.next_serial += 1;
        format!("evt-{:08}", self.next_serial)
    }

    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    /// Declare an event: assign identity, append, hand back a clone for the
    /// reducer's return vector.
    pub fn declare(
        &mut self,
        trace: &str,
        actor: ActorId,
        location: PlaceId,
        session: Option<SessionId>,
        body: EventBody,
    ) -> WorldEvent {
        let event = WorldEvent {
            id: self.uniqid(),
            ts: self.now(),
            trace: trace.to_string(),
            actor,
            location,
            session,
            body,
        };
        self.events.push(event.clone());
        event
    }

    pub fn declare_error(&mut self, trace: &str, error: &CombatError) {
        log::debug!("combat error [{}]: {}", trace, error);
        self.errors.push(ErrorRecord::new(trace, error));
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn all(&self) -> &[WorldEvent] {
        &self.events
    }

    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    pub fn events_of_kind(&self, kind: &str) -> Vec<&WorldEvent> {
        self.events.iter().filter(|e| e.kind() == kind).collect()
    }

    pub fn events_for_actor(&self, actor: &ActorId) -> Vec<&WorldEvent> {
        self.events.iter().filter(|e| e.involves(actor)).collect()
    }

    /// Take everything declared so far, leaving the log empty. Serials keep
    /// counting so ids stay unique across drains.
    pub fn drain(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn drain_errors(&mut self) -> Vec<ErrorRecord> {
        std::mem::take(&mut self.errors)
    }
}
