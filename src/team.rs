//! Team relationships and range predicates. Pure reads over combatant
//! slices; the hot paths reuse caller-owned buffers.

use crate::model::{ActorId, BattlefieldPosition, Combatant, WeaponSchema};

/// Enemies are combatants on different teams. Self is never an enemy, and
/// unknown ids are nobody's enemy.
pub fn are_enemies(a: &ActorId, b: &ActorId, combatants: &[Combatant]) -> bool {
    if a == b {
        return false;
    }
    let team_a = combatants.iter().find(|c| &c.actor_id == a).map(|c| &c.team);
    let team_b = combatants.iter().find(|c| &c.actor_id == b).map(|c| &c.team);
    match (team_a, team_b) {
        (Some(ta), Some(tb)) => ta != tb,
        _ => false,
    }
}

/// Index-based ally/enemy partition of a combatant slice.
#[derive(Debug, Clone, Default)]
pub struct TeamSplit {
    pub allies: Vec<usize>,
    pub enemies: Vec<usize>,
}

impl TeamSplit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.allies.clear();
        self.enemies.clear();
    }
}

/// Partition `combatants` around `self_id` in a single pass. The split is
/// written into `out` so per-turn callers can reuse one allocation; self is
/// excluded from both sides.
pub fn compute_allies_and_enemies(
    self_id: &ActorId,
    combatants: &[Combatant],
    out: &mut TeamSplit,
) {
    out.clear();
    let own_team = combatants.iter().find(|c| &c.actor_id == self_id).map(|c| c.team.clone());
    let Some(own_team) = own_team else {
        return;
    };
    for (i, c) in combatants.iter().enumerate() {
        if &c.actor_id == self_id {
            continue;
        }
        if c.team == own_team {
            out.allies.push(i);
        } else {
            out.enemies.push(i);
        }
    }
}

/// Meters between two combatants on the line.
pub fn distance_between(a: &BattlefieldPosition, b: &BattlefieldPosition) -> f64 {
    (a.coordinate_m - b.coordinate_m).abs() as f64
}

/// Whether `weapon` can connect across `distance_m`. Thin alias over the
/// schema predicate so call sites read like the rules text.
pub fn can_weapon_hit_from_distance(weapon: &WeaponSchema, distance_m: f64) -> bool {
    weapon.can_hit_from(distance_m)
}
