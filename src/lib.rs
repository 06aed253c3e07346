//! Value normalization and store-reference integrity for structured CMS
//! fields. Turns possibly malformed or double-encoded persisted JSON into
//! typed in-memory models, applies defaulting rules, re-serializes
//! deterministically, and flags dangling references against a read-only
//! store snapshot.

pub mod coerce;
pub mod config;
pub mod decode;
pub mod field;
pub mod grouped;
pub mod statics;
pub mod store;
pub mod value;

pub use coerce::{DataType, Resolution};
pub use config::{FieldArchetype, FieldConfig};
pub use field::{Emit, FieldController, FieldError};
pub use grouped::{GroupedValue, SlotSpec, derive_slots};
pub use store::{SettingRef, StoreEntry, StoreOption, StoreReference, StoreSnapshot};
pub use value::{FvNumber, FvValue};
