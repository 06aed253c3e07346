//! Grouped field values: a fixed set of up to four named slots, each
//! independently type-coerced.
//!
//! Initialization migrates older stored shapes: a slot first looks up its
//! own key in the parsed object, then falls back to the entry at the same
//! ordinal position. Legacy writers that persisted plain arrays are read
//! the same way, purely positionally.

use crate::coerce::{DataType, cast_input, cast_value};
use crate::config::FieldConfig;
use crate::decode;
use crate::statics;
use crate::value::FvValue;
use indexmap::IndexMap;
use log::{debug, warn};

/// One named slot of a grouped field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSpec {
    pub key: String,
    pub label: String,
}

/// Resolve the slot set from configuration. Never yields more than four
/// slots; longer configured lists are truncated.
///
/// Resolution order: field keys paired with labels (missing labels are
/// synthesized numerically), a label list alone (the label text doubles as
/// the key), then the built-in fallback slots.
pub fn derive_slots(config: &FieldConfig) -> Vec<SlotSpec> {
    let fields: Vec<&String> = config.fields.iter().take(statics::MAX_SLOTS).collect();
    let labels: Vec<&String> = config.field_labels.iter().take(statics::MAX_SLOTS).collect();

    if !fields.is_empty() {
        return fields
            .iter()
            .enumerate()
            .map(|(i, key)| SlotSpec {
                key: (*key).clone(),
                label: labels
                    .get(i)
                    .map(|l| (*l).clone())
                    .unwrap_or_else(|| (i + 1).to_string()),
            })
            .collect();
    }

    if !labels.is_empty() {
        return labels
            .iter()
            .map(|label| SlotSpec {
                key: (*label).clone(),
                label: (*label).clone(),
            })
            .collect();
    }

    statics::FALLBACK_SLOT_KEYS
        .iter()
        .map(|key| SlotSpec {
            key: (*key).to_string(),
            label: (*key).to_string(),
        })
        .collect()
}

/// In-memory state of one grouped field instance.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedValue {
    slots: Vec<SlotSpec>,
    data_type: DataType,
    values: IndexMap<String, FvValue>,
}

impl GroupedValue {
    /// Build the slot map from the persisted string, falling back to the
    /// configured default and then to all-null slots.
    ///
    /// The returned flag is true when the persisted value was empty or
    /// unusable, meaning the caller should immediately persist the derived
    /// map so the field never stays in an ambiguous unset state.
    pub fn initialize(config: &FieldConfig, persisted: Option<&str>) -> (Self, bool) {
        let slots = derive_slots(config);
        let data_type = config.data_type;

        if let Some(parsed) = decode::decode(persisted, None) {
            if let Some(values) = slot_values_from(&slots, &parsed, data_type) {
                return (
                    Self {
                        slots,
                        data_type,
                        values,
                    },
                    false,
                );
            }
            debug!(
                "event=grouped_init_unusable_shape type={}",
                parsed.type_name()
            );
        }

        let values = decode::decode(None, config.default.as_ref())
            .and_then(|parsed| slot_values_from(&slots, &parsed, data_type))
            .unwrap_or_else(|| empty_values(&slots));
        (
            Self {
                slots,
                data_type,
                values,
            },
            true,
        )
    }

    pub fn slots(&self) -> &[SlotSpec] {
        &self.slots
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn get(&self, key: &str) -> Option<&FvValue> {
        self.values.get(key)
    }

    /// Cast the raw input and write it into the named slot, returning the
    /// re-serialized canonical string. The internal state and the returned
    /// value always agree after this call.
    pub fn update(&mut self, key: &str, raw: &str) -> Option<String> {
        if !self.slots.iter().any(|slot| slot.key == key) {
            warn!("event=grouped_update_unknown_slot key={key}");
            return None;
        }
        self.values
            .insert(key.to_string(), cast_input(raw, self.data_type));
        Some(self.serialize())
    }

    /// Canonical persisted representation: a compact JSON object with one
    /// entry per slot, in slot order, missing values rendered as null.
    pub fn serialize(&self) -> String {
        let mut map = IndexMap::new();
        for slot in &self.slots {
            map.insert(
                slot.key.clone(),
                self.values.get(&slot.key).cloned().unwrap_or(FvValue::Null),
            );
        }
        FvValue::Object(map).to_json_compact()
    }
}

/// Key match first, positional match second, null otherwise.
fn slot_values_from(
    slots: &[SlotSpec],
    parsed: &FvValue,
    data_type: DataType,
) -> Option<IndexMap<String, FvValue>> {
    let mut values = IndexMap::new();
    match parsed {
        FvValue::Object(map) => {
            for (i, slot) in slots.iter().enumerate() {
                let found = map
                    .get(&slot.key)
                    .or_else(|| map.get_index(i).map(|(_, v)| v));
                values.insert(slot.key.clone(), cast_found(found, data_type));
            }
        }
        FvValue::Array(items) => {
            for (i, slot) in slots.iter().enumerate() {
                values.insert(slot.key.clone(), cast_found(items.get(i), data_type));
            }
        }
        _ => return None,
    }
    Some(values)
}

fn cast_found(found: Option<&FvValue>, data_type: DataType) -> FvValue {
    match found {
        Some(value) if !value.is_null() => cast_value(value, data_type),
        _ => FvValue::Null,
    }
}

fn empty_values(slots: &[SlotSpec]) -> IndexMap<String, FvValue> {
    slots
        .iter()
        .map(|slot| (slot.key.clone(), FvValue::Null))
        .collect()
}
