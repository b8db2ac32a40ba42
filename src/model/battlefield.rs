use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_BATTLEFIELD_LENGTH_M;

/// The 1-D arena. Coordinates are whole meters in `0..=length_m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Battlefield {
    pub length_m: u32,
}

impl Default for Battlefield {
    fn default() -> Self {
        Self { length_m: DEFAULT_BATTLEFIELD_LENGTH_M }
    }
}

impl Battlefield {
    pub fn contains(&self, coordinate_m: i64) -> bool {
        coordinate_m >= 0 && coordinate_m <= self.length_m as i64
    }

    pub fn center(&self) -> f64 {
        self.length_m as f64 / 2.0
    }
}

/// Axis orientation of a combatant. `Positive` faces the far end of the
/// battlefield, `Negative` faces coordinate zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Positive,
    Negative,
}

impl Facing {
    pub fn sign(self) -> i64 {
        match self {
            Facing::Positive => 1,
            Facing::Negative => -1,
        }
    }

    /// Face toward a coordinate; facing is unchanged when already on it.
    pub fn toward(from_m: i64, to_m: i64, current: Facing) -> Facing {
        match to_m.cmp(&from_m) {
            std::cmp::Ordering::Greater => Facing::Positive,
            std::cmp::Ordering::Less => Facing::Negative,
            std::cmp::Ordering::Equal => current,
        }
    }
}

/// Direction of a move relative to the mover's facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoveDirection {
    Forward,
    Backward,
}

impl MoveDirection {
    pub fn sign(self) -> i64 {
        match self {
            MoveDirection::Forward => 1,
            MoveDirection::Backward => -1,
        }
    }
}

/// Where a combatant stands and which way it is pointed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BattlefieldPosition {
    pub coordinate_m: i64,
    pub facing: Facing,
    /// Meters per second the combatant last moved at; cosmetic for hosts.
    pub speed: f64,
}

impl BattlefieldPosition {
    pub fn new(coordinate_m: i64, facing: Facing) -> Self {
        Self { coordinate_m, facing, speed: 0.0 }
    }

    /// Effective axis sign of a move: direction relative to facing.
    pub fn axis_sign(&self, direction: MoveDirection) -> i64 {
        self.facing.sign() * direction.sign()
    }
}
