//! Scripted scenarios: a serde-friendly description of a battlefield, its
//! fighters and an optional command script. The CLI replays these; tests
//! use them as compact fixtures.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::commands::Command;
use crate::context::{EngineContext, SchemaManager};
use crate::errors::CombatResult;
use crate::model::{
    Actor, ActorId, Battlefield, BattlefieldPosition, EnergyStore, Facing, HitPoints, PlaceId,
    SchemaUrn, SessionId, StatBlock, TeamTag, WeaponSchema,
};

fn default_hp() -> u32 {
    100
}

fn default_energy() -> f64 {
    20_000.0
}

fn default_mass() -> f64 {
    70_000.0
}

/// One fighter in a scenario file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioActor {
    pub id: ActorId,
    #[serde(default)]
    pub name: Option<String>,
    pub team: TeamTag,
    pub position_m: i64,
    pub facing: Facing,
    #[serde(default)]
    pub stats: Option<StatBlock>,
    #[serde(default = "default_hp")]
    pub hp: u32,
    #[serde(default = "default_energy")]
    pub energy_j: f64,
    #[serde(default = "default_mass")]
    pub body_mass_grams: f64,
    #[serde(default)]
    pub weapon: Option<SchemaUrn>,
}

/// A complete, replayable bout description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub battlefield: Battlefield,
    pub location: PlaceId,
    #[serde(default)]
    pub weapons: Vec<WeaponSchema>,
    pub actors: Vec<ScenarioActor>,
    /// Commands replayed verbatim through the public reducer surface.
    #[serde(default)]
    pub script: Vec<Command>,
}

impl Scenario {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Materialize the scenario: schemas registered, actors stored, session
    /// created and started. Returns the context and the session id.
    pub fn build(&self) -> CombatResult<(EngineContext, SessionId)> {
        let mut schemas = SchemaManager::new();
        for weapon in &self.weapons {
            schemas.register(weapon.clone());
        }
        let mut ctx = EngineContext::new(schemas);

        for spec in &self.actors {
            let actor = Actor {
                id: spec.id.clone(),
                name: spec.name.clone().unwrap_or_else(|| spec.id.to_string()),
                location: self.location.clone(),
                stats: spec.stats.unwrap_or_default(),
                hp: HitPoints::full(spec.hp),
                energy: EnergyStore::full(spec.energy_j),
                body_mass_grams: spec.body_mass_grams,
                equipped_weapon: spec.weapon.clone(),
                sessions: HashSet::new(),
            };
            ctx.world.actors.insert(actor.id.clone(), actor);
        }

        let session_id = SessionId::from("combat:scenario");
        ctx.create_combat_session(session_id.clone(), self.location.clone(), self.battlefield)?;
        for spec in &self.actors {
            ctx.add_combatant(
                &session_id,
                &spec.id,
                spec.team.clone(),
                BattlefieldPosition::new(spec.position_m, spec.facing),
            )?;
        }
        ctx.start_combat(&session_id, "scenario:setup")?;
        Ok((ctx, session_id))
    }
}
