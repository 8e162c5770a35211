//! Branded ID newtypes.
//!
//! Player identifiers come from the game server and are opaque strings.
//! A [`SyncSessionId`] is minted locally (UUID v7) each time a sync session
//! starts, so log lines and events from different runs can be told apart.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing string value.
            #[must_use]
            pub fn from_string(s: String) -> Self {
                Self(s)
            }

            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the id is the empty string.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

branded_id!(
    /// Server-assigned player identifier. Empty means "not yet known".
    PlayerId
);

branded_id!(
    /// Locally minted identifier for one running sync session.
    SyncSessionId
);

impl SyncSessionId {
    /// Mint a fresh time-ordered id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_id_is_transparent_in_json() {
        let id = PlayerId::from("12345");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"12345\"");
        let back: PlayerId = serde_json::from_str("\"12345\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn default_player_id_is_empty() {
        assert!(PlayerId::default().is_empty());
        assert!(!PlayerId::from("a").is_empty());
    }

    #[test]
    fn generated_session_ids_are_distinct() {
        let a = SyncSessionId::generate();
        let b = SyncSessionId::generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }
}
