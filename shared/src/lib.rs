#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod capabilities;
pub mod config;
pub mod event;
pub mod model;
pub mod reducer;
pub mod store;
pub mod view;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::{ConfigError, IdStrategy, Settings, StorageFailurePolicy};
pub use event::Event;
pub use model::{City, CityId, Model, NewCity, Position};
pub use reducer::{reduce, Action, CitiesState};
pub use store::CityStore;
pub use view::{CityItem, CountryItem, ViewModel};

/// Key the collection is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "cities";

/// Failures that end up in the state's error field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    CreateFailed,
    LoadFailed,
    SaveFailed,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::CreateFailed => "CREATE_FAILED",
            Self::LoadFailed => "LOAD_FAILED",
            Self::SaveFailed => "SAVE_FAILED",
        }
    }

    /// Text written into the error field.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotFound => "Could not find city",
            Self::CreateFailed => "There was an error creating the city.",
            Self::LoadFailed => "Could not load saved cities",
            Self::SaveFailed => "Could not save cities",
        }
    }
}

#[derive(Debug, Error)]
pub enum CityError {
    #[error("invalid position: lat={lat}, lng={lng}")]
    InvalidPosition { lat: f64, lng: f64 },

    #[error("system clock is before the Unix epoch: {0}")]
    Clock(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Kv(#[from] capabilities::KvError),
}

pub type CityResult<T> = Result<T, CityError>;

pub mod app {
    use tracing::{debug, info, warn};

    use super::{CityResult, ErrorKind, StorageFailurePolicy};
    use crate::capabilities::{check_value_size, Capabilities};
    use crate::event::Event;
    use crate::model::Model;
    use crate::view::ViewModel;

    #[derive(Default)]
    pub struct App;

    impl App {
        fn restore(model: &Model, caps: &Capabilities) {
            let key = model.settings.storage_key.clone();
            debug!(%key, "reading stored cities");
            caps.key_value.get(key, |result| {
                Event::CitiesRestored(result.map_err(|e| format!("{e:?}")))
            });
        }

        /// Writes the whole collection to storage. Failures come back as
        /// `CitiesPersisted(Err(_))`; nothing waits for the write.
        fn persist(model: &mut Model, caps: &Capabilities) {
            match Self::serialized(model) {
                Ok(bytes) => {
                    let key = model.settings.storage_key.clone();
                    debug!(%key, bytes = bytes.len(), "saving cities");
                    caps.key_value.set(key, bytes, |result| {
                        Event::CitiesPersisted(result.map(|_| ()).map_err(|e| format!("{e:?}")))
                    });
                }
                Err(e) => Self::persist_failed(model, &e.to_string()),
            }
        }

        fn serialized(model: &Model) -> CityResult<Vec<u8>> {
            let bytes = model.store.serialize()?;
            check_value_size(&bytes)?;
            Ok(bytes)
        }

        fn persist_failed(model: &mut Model, error: &str) {
            let policy = model.settings.storage_failure_policy;
            warn!(error, ?policy, "error saving cities");
            if policy == StorageFailurePolicy::Propagate {
                model.store.reject(ErrorKind::SaveFailed);
            }
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            let event_name = event.name();
            if event.is_user_initiated() {
                info!(event = event_name, "user action");
            } else {
                debug!(event = event_name, "update");
            }

            let revision = model.store.revision();

            match event {
                Event::AppStarted => Self::restore(model, caps),

                Event::Configure(settings) => match settings.validate() {
                    Ok(()) => {
                        model.store.set_id_strategy(settings.id_strategy);
                        model.settings = settings;
                    }
                    Err(e) => warn!(error = %e, "ignoring invalid settings"),
                },

                Event::CitiesRestored(result) => {
                    let policy = model.settings.storage_failure_policy;
                    let stored = result.as_ref().map(Option::as_deref).map_err(Clone::clone);
                    model.store.load(stored, policy);
                }

                Event::GetCity { id } => model.store.get_city(&id),

                Event::CreateCity(new) => {
                    model.store.create_city(new);
                }

                Event::DeleteCity { id } => model.store.delete_city(&id),

                Event::CitiesPersisted(Ok(())) => debug!("cities saved"),

                Event::CitiesPersisted(Err(e)) => Self::persist_failed(model, &e),
            }

            if model.store.revision() != revision {
                Self::persist(model, caps);
            }

            caps.render.render();
        }

        fn view(&self, model: &Model) -> ViewModel {
            ViewModel::from_store(&model.store)
        }
    }
}
