mod kv;

pub use self::kv::{check_value_size, KvError, StorageKey, MAX_KEY_LENGTH, MAX_VALUE_SIZE};

pub use crux_core::render::Render;
pub use crux_kv::KeyValue;

use crate::event::Event;
#[allow(unused_imports)]
use crate::App;

/// Shell-facing capabilities. The derive generates the `Effect` enum with one
/// variant per field (`Effect::KeyValue`, `Effect::Render`).
#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub key_value: KeyValue<Event>,
    pub render: Render<Event>,
}
