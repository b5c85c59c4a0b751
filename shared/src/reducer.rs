//! Pure state transitions for the city collection.
//!
//! Every mutation of [`CitiesState`] goes through [`reduce`]. The action set is
//! closed, so there is no "unknown action" case to handle at runtime.

use serde::{Deserialize, Serialize};

use crate::model::{City, CityId};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CitiesState {
    /// Insertion order, which is also the order read back from storage.
    pub cities: Vec<City>,
    /// `None` is the empty placeholder. May refer to a city that has since
    /// been removed from `cities`.
    pub current_city: Option<City>,
    pub is_loading: bool,
    /// Empty when there is no error.
    pub error: String,
}

impl CitiesState {
    pub fn current_city_id(&self) -> Option<&CityId> {
        self.current_city.as_ref().map(|city| &city.id)
    }

    pub fn find(&self, id: &str) -> Option<&City> {
        self.cities.iter().find(|city| city.id.as_str() == id)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Loading,
    CitiesLoaded(Vec<City>),
    CityLoaded(City),
    CityCreated(City),
    CityDeleted(CityId),
    Rejected(String),
}

impl Action {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::CitiesLoaded(_) => "cities/loaded",
            Self::CityLoaded(_) => "city/loaded",
            Self::CityCreated(_) => "city/created",
            Self::CityDeleted(_) => "city/deleted",
            Self::Rejected(_) => "rejected",
        }
    }

    /// Whether applying this action replaces the city collection. A delete
    /// counts even when nothing matched.
    #[must_use]
    pub const fn changes_collection(&self) -> bool {
        matches!(
            self,
            Self::CitiesLoaded(_) | Self::CityCreated(_) | Self::CityDeleted(_)
        )
    }
}

#[must_use]
pub fn reduce(state: CitiesState, action: Action) -> CitiesState {
    match action {
        Action::Loading => CitiesState {
            is_loading: true,
            ..state
        },
        Action::CitiesLoaded(cities) => CitiesState {
            cities,
            is_loading: false,
            ..state
        },
        Action::CityLoaded(city) => CitiesState {
            current_city: Some(city),
            is_loading: false,
            ..state
        },
        Action::CityCreated(city) => {
            let mut cities = state.cities;
            cities.push(city.clone());
            CitiesState {
                cities,
                current_city: Some(city),
                is_loading: false,
                error: state.error,
            }
        }
        Action::CityDeleted(id) => {
            let mut cities = state.cities;
            cities.retain(|city| city.id != id);
            CitiesState {
                cities,
                current_city: None,
                is_loading: false,
                error: state.error,
            }
        }
        Action::Rejected(error) => CitiesState {
            error,
            is_loading: false,
            ..state
        },
    }
}
