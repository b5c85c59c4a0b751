use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::model::NewCity;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    /// Sent once by the shell on startup; reads the stored collection.
    AppStarted,
    Configure(Settings),

    GetCity {
        id: String,
    },
    CreateCity(NewCity),
    DeleteCity {
        id: String,
    },

    // Capability callbacks, never sent by the shell.
    #[serde(skip)]
    CitiesRestored(Result<Option<Vec<u8>>, String>),
    #[serde(skip)]
    CitiesPersisted(Result<(), String>),
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AppStarted => "app_started",
            Self::Configure(_) => "configure",
            Self::GetCity { .. } => "get_city",
            Self::CreateCity(_) => "create_city",
            Self::DeleteCity { .. } => "delete_city",
            Self::CitiesRestored(_) => "cities_restored",
            Self::CitiesPersisted(_) => "cities_persisted",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::GetCity { .. } | Self::CreateCity(_) | Self::DeleteCity { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_events_round_trip_through_json() {
        let event = Event::DeleteCity { id: "42".into() };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(serde_json::from_str::<Event>(&json).unwrap(), event);
    }

    #[test]
    fn test_callbacks_are_not_user_initiated() {
        assert!(Event::GetCity { id: "1".into() }.is_user_initiated());
        assert!(!Event::AppStarted.is_user_initiated());
        assert!(!Event::CitiesPersisted(Ok(())).is_user_initiated());
    }
}
