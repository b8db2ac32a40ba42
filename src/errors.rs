use serde::{Deserialize, Serialize};

/// Coarse classification of engine failures.
///
/// Validation, environment and physics errors reject the command and leave
/// every piece of state untouched; the host surfaces them to the player.
/// Programmer errors are bugs and panic instead of being constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    Environment,
    Physics,
    Programmer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatError {
    // Validation
    InvalidSession(String),
    Forbidden(String),
    NoTarget(String),
    OutOfRange(String),
    InsufficientAp { required: f64, available: f64 },
    InsufficientEnergy { required: f64, available: f64 },
    NeedsTwoHandedWeapon(String),
    NoEnemiesAtOptimalRange { optimal_m: f64 },
    NoValidTargets(String),
    NotAtLocation(String),
    AlreadyPresent(String),
    Dead(String),
    NoOpponents(String),
    NoLivingCombatants(String),

    // Environment
    ActorNotFound(String),
    CombatantNotFound(String),
    SchemaNotFound(String),
    WeaponNotEquipped(String),

    // Physics
    BoundaryExceeded { max_distance_m: f64 },
    CollisionBlocked { blocker_position_m: i64, max_distance_m: f64 },

    // Programmer (never constructed; see `precision_violation`)
    PrecisionViolation(String),
    MissingDependency(String),
}

impl CombatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CombatError::InvalidSession(_)
            | CombatError::Forbidden(_)
            | CombatError::NoTarget(_)
            | CombatError::OutOfRange(_)
            | CombatError::InsufficientAp { .. }
            | CombatError::InsufficientEnergy { .. }
            | CombatError::NeedsTwoHandedWeapon(_)
            | CombatError::NoEnemiesAtOptimalRange { .. }
            | CombatError::NoValidTargets(_)
            | CombatError::NotAtLocation(_)
            | CombatError::AlreadyPresent(_)
            | CombatError::Dead(_)
            | CombatError::NoOpponents(_)
            | CombatError::NoLivingCombatants(_) => ErrorKind::Validation,
            CombatError::ActorNotFound(_)
            | CombatError::CombatantNotFound(_)
            | CombatError::SchemaNotFound(_)
            | CombatError::WeaponNotEquipped(_) => ErrorKind::Environment,
            CombatError::BoundaryExceeded { .. } | CombatError::CollisionBlocked { .. } => {
                ErrorKind::Physics
            }
            CombatError::PrecisionViolation(_) | CombatError::MissingDependency(_) => {
                ErrorKind::Programmer
            }
        }
    }

    /// Stable machine-readable code, used by error sinks and tests.
    pub fn code(&self) -> &'static str {
        match self {
            CombatError::InvalidSession(_) => "INVALID_SESSION",
            CombatError::Forbidden(_) => "FORBIDDEN",
            CombatError::NoTarget(_) => "NO_TARGET",
            CombatError::OutOfRange(_) => "OUT_OF_RANGE",
            CombatError::InsufficientAp { .. } => "INSUFFICIENT_AP",
            CombatError::InsufficientEnergy { .. } => "INSUFFICIENT_ENERGY",
            CombatError::NeedsTwoHandedWeapon(_) => "NEEDS_TWO_HANDED_WEAPON",
            CombatError::NoEnemiesAtOptimalRange { .. } => "NO_ENEMIES_AT_OPTIMAL_RANGE",
            CombatError::NoValidTargets(_) => "NO_VALID_TARGETS",
            CombatError::NotAtLocation(_) => "NOT_AT_LOCATION",
            CombatError::AlreadyPresent(_) => "ALREADY_PRESENT",
            CombatError::Dead(_) => "DEAD",
            CombatError::NoOpponents(_) => "NO_OPPONENTS",
            CombatError::NoLivingCombatants(_) => "NO_LIVING_COMBATANTS",
            CombatError::ActorNotFound(_) => "ACTOR_NOT_FOUND",
            CombatError::CombatantNotFound(_) => "COMBATANT_NOT_FOUND",
            CombatError::SchemaNotFound(_) => "SCHEMA_NOT_FOUND",
            CombatError::WeaponNotEquipped(_) => "WEAPON_NOT_EQUIPPED",
            CombatError::BoundaryExceeded { .. } => "BOUNDARY_EXCEEDED",
            CombatError::CollisionBlocked { .. } => "COLLISION_BLOCKED",
            CombatError::PrecisionViolation(_) => "PRECISION_VIOLATION",
            CombatError::MissingDependency(_) => "MISSING_DEPENDENCY",
        }
    }
}

impl std::fmt::Display for CombatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CombatError::InvalidSession(msg) => write!(f, "Invalid session: {}", msg),
            CombatError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            CombatError::NoTarget(msg) => write!(f, "No target: {}", msg),
            CombatError::OutOfRange(msg) => write!(f, "Out of range: {}", msg),
            CombatError::InsufficientAp { required, available } => write!(
                f,
                "Insufficient AP (required: {:.1}, available: {:.1})",
                required, available
            ),
            CombatError::InsufficientEnergy { required, available } => write!(
                f,
                "Insufficient energy (required: {:.0} J, available: {:.0} J)",
                required, available
            ),
            CombatError::NeedsTwoHandedWeapon(msg) => {
                write!(f, "Needs a two-handed weapon: {}", msg)
            }
            CombatError::NoEnemiesAtOptimalRange { optimal_m } => {
                write!(f, "No enemies at optimal weapon range ({} m)", optimal_m)
            }
            CombatError::NoValidTargets(msg) => write!(f, "No valid targets: {}", msg),
            CombatError::NotAtLocation(msg) => write!(f, "Actor not at location: {}", msg),
            CombatError::AlreadyPresent(msg) => write!(f, "Already in session: {}", msg),
            CombatError::Dead(msg) => write!(f, "Dead: {}", msg),
            CombatError::NoOpponents(msg) => write!(f, "No opponents: {}", msg),
            CombatError::NoLivingCombatants(msg) => {
                write!(f, "No living combatants: {}", msg)
            }
            CombatError::ActorNotFound(msg) => write!(f, "Actor not found: {}", msg),
            CombatError::CombatantNotFound(msg) => write!(f, "Combatant not found: {}", msg),
            CombatError::SchemaNotFound(msg) => write!(f, "Schema not found: {}", msg),
            CombatError::WeaponNotEquipped(msg) => write!(f, "Weapon not equipped: {}", msg),
            CombatError::BoundaryExceeded { max_distance_m } => write!(
                f,
                "Battlefield boundary exceeded (maximum move: {:.0} m)",
                max_distance_m
            ),
            CombatError::CollisionBlocked { blocker_position_m, max_distance_m } => write!(
                f,
                "Path blocked by enemy at {} m (maximum move: {:.0} m)",
                blocker_position_m, max_distance_m
            ),
            CombatError::PrecisionViolation(msg) => write!(f, "Precision violation: {}", msg),
            CombatError::MissingDependency(msg) => write!(f, "Missing dependency: {}", msg),
        }
    }
}

impl std::error::Error for CombatError {}

/// Fatal precision failure. AP and position mutations are mirrored against a
/// clean-precision recomputation; a ≥0.001 divergence is a bug in the engine,
/// never a recoverable game state.
pub fn precision_violation(what: &str, stored: f64, mirror: f64) -> ! {
    panic!(
        "PRECISION_VIOLATION: {} drifted from its clean mirror (stored {}, expected {})",
        what, stored, mirror
    );
}

pub type CombatResult<T> = Result<T, CombatError>;
