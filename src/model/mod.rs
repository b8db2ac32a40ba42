pub mod actor;
pub mod battlefield;
pub mod combatant;
pub mod ids;
pub mod session;
pub mod weapon;

pub use actor::*;
pub use battlefield::*;
pub use combatant::*;
pub use ids::*;
pub use session::*;
pub use weapon::*;
