//! Identifiers for sessions and category scores.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id! {
    /// One assessment session. Survives restarts through the session store.
    SessionId
}

uuid_id! {
    /// One scoring of one category.
    ///
    /// Resubmitting a category mints a fresh id, so a narrative that
    /// arrives for an older score can tell it has been superseded.
    ScoreId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_score_gets_its_own_id() {
        assert_ne!(ScoreId::new(), ScoreId::new());
    }

    #[test]
    fn session_id_parses_its_display_form() {
        let id = SessionId::new();
        assert_eq!(id.to_string().parse::<SessionId>().unwrap(), id);
        assert!("session-1".parse::<SessionId>().is_err());
    }

    #[test]
    fn ids_are_plain_strings_in_json() {
        let id = ScoreId::new();
        assert_eq!(serde_json::to_string(&id).unwrap(), format!("\"{id}\""));
    }
}
