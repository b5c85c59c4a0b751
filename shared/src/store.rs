//! The city store: sole owner of [`CitiesState`].
//!
//! Shells never touch the state directly. They go through the store's
//! operations, each of which dispatches one or more [`Action`]s through the
//! reducer. The store counts collection-changing actions so the app knows when
//! the collection has to be written back to storage.

use tracing::{debug, info, warn};

use crate::config::{IdStrategy, StorageFailurePolicy};
use crate::model::{City, CityId, NewCity};
use crate::reducer::{reduce, Action, CitiesState};
use crate::{CityError, ErrorKind};

#[derive(Debug, Default)]
pub struct CityStore {
    state: CitiesState,
    ids: IdStrategy,
    revision: u64,
}

impl CityStore {
    pub fn new(ids: IdStrategy) -> Self {
        Self {
            state: CitiesState::default(),
            ids,
            revision: 0,
        }
    }

    /// Builds a store from the stored collection. See [`CityStore::load`].
    pub fn restore(stored: Option<&[u8]>, ids: IdStrategy, policy: StorageFailurePolicy) -> Self {
        let mut store = Self::new(ids);
        store.load(Ok(stored), policy);
        store
    }

    pub fn state(&self) -> &CitiesState {
        &self.state
    }

    pub fn cities(&self) -> &[City] {
        &self.state.cities
    }

    pub fn current_city(&self) -> Option<&City> {
        self.state.current_city.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    pub fn error(&self) -> &str {
        &self.state.error
    }

    pub fn id_strategy(&self) -> IdStrategy {
        self.ids
    }

    pub fn set_id_strategy(&mut self, ids: IdStrategy) {
        self.ids = ids;
    }

    /// Number of collection-changing actions applied so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn dispatch(&mut self, action: Action) {
        debug!(action = action.name(), "dispatch");
        if action.changes_collection() {
            self.revision = self.revision.wrapping_add(1);
        }
        self.state = reduce(std::mem::take(&mut self.state), action);
    }

    /// Loads the result of reading the storage key.
    ///
    /// A missing value loads an empty collection. A read failure, or a value
    /// that is not a JSON array, also loads an empty collection under
    /// [`StorageFailurePolicy::SilentEmpty`]; under
    /// [`StorageFailurePolicy::Propagate`] the collection is left alone and the
    /// failure is recorded in the error field instead. Individual records that
    /// are not valid cities are logged and skipped.
    pub fn load(&mut self, stored: Result<Option<&[u8]>, String>, policy: StorageFailurePolicy) {
        let parsed = stored
            .map_err(CityError::Storage)
            .and_then(|bytes| bytes.map(parse_cities).transpose());

        match parsed {
            Ok(cities) => {
                let cities = cities.unwrap_or_default();
                debug!(count = cities.len(), "stored cities loaded");
                self.dispatch(Action::CitiesLoaded(cities));
            }
            Err(e) => {
                warn!(error = %e, ?policy, "could not load stored cities");
                match policy {
                    StorageFailurePolicy::SilentEmpty => {
                        self.dispatch(Action::CitiesLoaded(Vec::new()));
                    }
                    StorageFailurePolicy::Propagate => {
                        self.reject(ErrorKind::LoadFailed);
                    }
                }
            }
        }
    }

    /// Selects the city with the given id. Does nothing when that city is
    /// already selected.
    pub fn get_city(&mut self, id: &str) {
        if self.state.current_city_id().map(CityId::as_str) == Some(id) {
            return;
        }

        self.dispatch(Action::Loading);

        match self.state.find(id).cloned() {
            Some(city) => self.dispatch(Action::CityLoaded(city)),
            None => {
                debug!(id, "city not found");
                self.reject(ErrorKind::NotFound);
            }
        }
    }

    /// Adds a city with a freshly assigned id and selects it. Returns `None`
    /// when the city could not be created; the error field says why.
    pub fn create_city(&mut self, new: NewCity) -> Option<City> {
        self.dispatch(Action::Loading);

        match self.build_city(new) {
            Ok(city) => {
                info!(id = %city.id, name = %city.city_name, "city created");
                self.dispatch(Action::CityCreated(city.clone()));
                Some(city)
            }
            Err(e) => {
                warn!(error = %e, "error creating city");
                self.reject(ErrorKind::CreateFailed);
                None
            }
        }
    }

    fn build_city(&self, new: NewCity) -> Result<City, CityError> {
        new.position.validate()?;
        let id = self.ids.generate()?;
        Ok(City::from_new(id, new))
    }

    /// Removes the city with the given id, whether or not it exists, and clears
    /// the selection.
    pub fn delete_city(&mut self, id: &str) {
        self.dispatch(Action::Loading);

        let id = CityId::new(id);
        info!(%id, "city deleted");
        self.dispatch(Action::CityDeleted(id));
    }

    pub fn reject(&mut self, kind: ErrorKind) {
        self.dispatch(Action::Rejected(kind.message().to_string()));
    }

    /// The stored representation: a JSON array of every city, in order.
    pub fn serialize(&self) -> Result<Vec<u8>, CityError> {
        Ok(serde_json::to_vec(&self.state.cities)?)
    }
}

/// Only a value that is not a JSON array fails as a whole. Each record is
/// read on its own so one unreadable entry cannot take the others with it.
fn parse_cities(bytes: &[u8]) -> Result<Vec<City>, CityError> {
    let records: Vec<serde_json::Value> = serde_json::from_slice(bytes)?;

    let cities = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<City>(record) {
            Ok(city) => Some(city),
            Err(e) => {
                warn!(index, error = %e, "skipping unreadable stored city");
                None
            }
        })
        .collect();

    Ok(cities)
}
