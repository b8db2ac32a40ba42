//! Typed commands: the reducer-facing form of player and AI intents.
//!
//! Hosts produce these from their intent front-end; the AI planner emits
//! them directly. Shapes mirror the event contract: a header plus a tagged
//! payload.

use serde::{Deserialize, Serialize};

use crate::config::ALL_REMAINING_AP;
use crate::model::{ActorId, SessionId};

/// How a movement amount is quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoveBy {
    Distance,
    Ap,
    Max,
}

/// Resolved movement request used by the primitives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveMode {
    ByDistance(f64),
    ByAp(f64),
    ByMax,
}

impl MoveMode {
    pub fn from_parts(by: MoveBy, value: f64) -> Self {
        match by {
            MoveBy::Distance => MoveMode::ByDistance(value),
            MoveBy::Ap => MoveMode::ByAp(value),
            MoveBy::Max => MoveMode::ByMax,
        }
    }

    pub fn to_parts(self) -> (MoveBy, f64) {
        match self {
            MoveMode::ByDistance(v) => (MoveBy::Distance, v),
            MoveMode::ByAp(v) => (MoveBy::Ap, v),
            MoveMode::ByMax => (MoveBy::Max, 0.0),
        }
    }

    /// Spend-everything sentinel for `by_ap`.
    pub fn all_remaining_ap() -> Self {
        MoveMode::ByAp(ALL_REMAINING_AP)
    }
}

fn is_false(v: &bool) -> bool {
    !*v
}

/// Tagged command payload. Args are flattened next to the `type` tag so the
/// wire shape matches the intent front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandKind {
    Strike {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<ActorId>,
    },
    Cleave {},
    Defend {
        #[serde(default, skip_serializing_if = "is_false")]
        auto_done: bool,
    },
    Advance {
        by: MoveBy,
        #[serde(default)]
        value: f64,
        #[serde(default, skip_serializing_if = "is_false")]
        auto_done: bool,
    },
    Retreat {
        by: MoveBy,
        #[serde(default)]
        value: f64,
        #[serde(default, skip_serializing_if = "is_false")]
        auto_done: bool,
    },
    Target {
        target: ActorId,
    },
    Done {},
}

impl CommandKind {
    /// Command type as a stable string.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandKind::Strike { .. } => "STRIKE",
            CommandKind::Cleave {} => "CLEAVE",
            CommandKind::Defend { .. } => "DEFEND",
            CommandKind::Advance { .. } => "ADVANCE",
            CommandKind::Retreat { .. } => "RETREAT",
            CommandKind::Target { .. } => "TARGET",
            CommandKind::Done {} => "DONE",
        }
    }

    /// The optional target argument, for the cross-session guard.
    pub fn target_arg(&self) -> Option<&ActorId> {
        match self {
            CommandKind::Strike { target } => target.as_ref(),
            CommandKind::Target { target } => Some(target),
            _ => None,
        }
    }
}

/// A command as submitted: correlation header plus typed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub id: String,
    pub ts: u64,
    pub trace: String,
    pub actor: ActorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionId>,
    #[serde(flatten)]
    pub kind: CommandKind,
}

impl Command {
    pub fn new(
        id: impl Into<String>,
        trace: impl Into<String>,
        actor: ActorId,
        session: Option<SessionId>,
        kind: CommandKind,
    ) -> Self {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self { id: id.into(), ts, trace: trace.into(), actor, session, kind }
    }
}

/// Parse a JSON intent into a typed command.
pub fn parse_command(json: &str) -> serde_json::Result<Command> {
    serde_json::from_str(json)
}
