//! Opaque string handles. Equality and hashing are by bytes; the engine
//! never parses URN structure out of them.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_string())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identity of an actor in the world store.
    ActorId
);
string_id!(
    /// Identity of a combat session.
    SessionId
);
string_id!(
    /// Identity of a place; combatants must share one to fight.
    PlaceId
);
string_id!(
    /// Schema URN, e.g. `urn:schema:weapon:arming-sword`.
    SchemaUrn
);
string_id!(
    /// Team marker. Combatants with equal tags are allies.
    TeamTag
);
