//! Store references: field values that point into an externally supplied
//! collection of selectable entries.
//!
//! The snapshot is fetched once per session by an external collaborator and
//! handed to every field instance read-only; this module only filters and
//! cross-checks it. Identifiers that no longer resolve to an entry are
//! flagged as orphans for user-directed removal, never dropped silently.

use crate::config::FieldConfig;
use crate::decode;
use crate::statics;
use crate::value::{FvNumber, FvValue};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::Deserialize;
use std::collections::HashMap;

/// Per-entry presentation settings (color swatches etc.).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SettingRef {
    pub id: i64,
    #[serde(default)]
    pub color: Option<String>,
}

/// One selectable entry of a store collection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoreEntry {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub setting: Vec<SettingRef>,
}

/// Read-only, session-wide snapshot of every store collection, keyed by
/// store name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct StoreSnapshot {
    stores: HashMap<String, Vec<StoreEntry>>,
}

impl StoreSnapshot {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn insert(&mut self, store: impl Into<String>, entries: Vec<StoreEntry>) {
        self.stores.insert(store.into(), entries);
    }

    pub fn entries(&self, store: &str) -> Option<&[StoreEntry]> {
        self.stores.get(store).map(Vec::as_slice)
    }
}

/// One selectable candidate offered to the editor.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreOption {
    pub id: i64,
    pub label: String,
    pub swatch: Option<String>,
}

/// Filter the snapshot down to the candidates for one field: entries of the
/// configured store whose type matches, preceded by the synthetic sentinel
/// option when the field allows multiple selections.
///
/// An unknown store name yields an empty candidate list; the reference value
/// itself is untouched (its ids may resolve again once the snapshot is
/// corrected).
pub fn build_options(
    snapshot: &StoreSnapshot,
    store: &str,
    store_type: &str,
    single_only: bool,
) -> Vec<StoreOption> {
    let Some(entries) = snapshot.entries(store) else {
        warn!("event=store_unknown store={store}");
        return Vec::new();
    };

    let mut options = Vec::new();
    if !single_only {
        options.push(StoreOption {
            id: statics::SENTINEL_DEFAULT_ID,
            label: statics::EN_OPTION_DEFAULT.to_string(),
            swatch: None,
        });
    }
    for entry in entries.iter().filter(|e| e.kind == store_type) {
        options.push(StoreOption {
            id: entry.id,
            label: entry.name.clone(),
            swatch: entry.setting.first().and_then(|s| s.color.clone()),
        });
    }
    options
}

/// Identifiers present in `values` but absent from the candidate list.
pub fn find_orphans(values: &[i64], options: &[StoreOption]) -> Vec<i64> {
    values
        .iter()
        .filter(|id| !options.iter().any(|o| o.id == **id))
        .copied()
        .collect()
}

/// In-memory state of one store-reference field instance.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreReference {
    pub store: String,
    pub store_type: String,
    pub values: Vec<i64>,
}

impl StoreReference {
    /// The canonical empty state, with `store`/`storeType` stamped from
    /// configuration.
    pub fn empty(config: &FieldConfig) -> Self {
        Self {
            store: config.store.clone().unwrap_or_default(),
            store_type: config.store_type.clone().unwrap_or_default(),
            values: Vec::new(),
        }
    }

    /// Build from the persisted string, falling back to the configured
    /// default and then to the empty state.
    ///
    /// The returned flag is true when no valid persisted value existed; the
    /// caller should then write the derived state back immediately so the
    /// canonical (possibly empty) representation is established.
    pub fn initialize(config: &FieldConfig, persisted: Option<&str>) -> (Self, bool) {
        if let Some(parsed) = decode::decode(persisted, None) {
            if let Some(mut reference) = Self::from_value(&parsed) {
                reference.values = normalized(&reference.values, config.is_one_to_one);
                return (reference, false);
            }
            debug!(
                "event=store_init_unusable_shape type={}",
                parsed.type_name()
            );
        }

        let fallback = decode::decode(None, config.default.as_ref())
            .as_ref()
            .and_then(Self::from_value);
        match fallback {
            Some(mut reference) => {
                reference.values = normalized(&reference.values, config.is_one_to_one);
                (reference, true)
            }
            None => (Self::empty(config), true),
        }
    }

    /// Read a parsed wire object. Requires the `values` list; identifiers
    /// persisted as numeric strings are tolerated, anything else in the list
    /// is skipped with a diagnostic.
    pub fn from_value(parsed: &FvValue) -> Option<Self> {
        let obj = parsed.as_object()?;
        let raw_values = obj.get(statics::WIRE_VALUES)?.as_array()?;

        let mut values = Vec::with_capacity(raw_values.len());
        for raw in raw_values {
            match raw.as_i64() {
                Some(id) => values.push(id),
                None => debug!(
                    "event=store_value_not_an_id type={}",
                    raw.type_name()
                ),
            }
        }

        Some(Self {
            store: obj
                .get(statics::WIRE_STORE)
                .and_then(FvValue::as_str)
                .unwrap_or_default()
                .to_string(),
            store_type: obj
                .get(statics::WIRE_STORE_TYPE)
                .and_then(FvValue::as_str)
                .unwrap_or_default()
                .to_string(),
            values,
        })
    }

    /// Replace the selection wholesale. `store`/`storeType` are re-stamped
    /// from the current configuration so a configuration change is
    /// reflected in the next write. Multi-select values are stored sorted
    /// ascending; single-select keeps the first real entry and the sentinel
    /// is never injected there.
    pub fn select(&mut self, new_values: &[i64], config: &FieldConfig) {
        self.store = config.store.clone().unwrap_or_default();
        self.store_type = config.store_type.clone().unwrap_or_default();
        self.values = normalized(new_values, config.is_one_to_one);
    }

    /// Drop every currently-orphaned identifier and re-select the rest.
    pub fn remove_orphans(&mut self, options: &[StoreOption], config: &FieldConfig) {
        let orphans = find_orphans(&self.values, options);
        let keep: Vec<i64> = self
            .values
            .iter()
            .copied()
            .filter(|id| !orphans.contains(id))
            .collect();
        self.select(&keep, config);
    }

    /// Advisory: exactly one real entry is selected while the field allows
    /// multiple, so that one option will be enforced across all elements.
    pub fn single_enforced(&self, single_only: bool) -> bool {
        !single_only
            && self
                .values
                .iter()
                .filter(|id| **id != statics::SENTINEL_DEFAULT_ID)
                .count()
                == 1
    }

    /// Advisory: several values are selected and the sentinel is among
    /// them, so the default remains allowed next to the selection.
    pub fn default_also_allowed(&self) -> bool {
        self.values.len() > 1 && self.values.contains(&statics::SENTINEL_DEFAULT_ID)
    }

    pub fn to_value(&self) -> FvValue {
        let mut map = IndexMap::new();
        map.insert(
            statics::WIRE_STORE.to_string(),
            FvValue::String(self.store.clone()),
        );
        map.insert(
            statics::WIRE_STORE_TYPE.to_string(),
            FvValue::String(self.store_type.clone()),
        );
        map.insert(
            statics::WIRE_VALUES.to_string(),
            FvValue::Array(
                self.values
                    .iter()
                    .map(|id| FvValue::Number(FvNumber::I64(*id)))
                    .collect(),
            ),
        );
        FvValue::Object(map)
    }

    /// Canonical persisted representation.
    pub fn serialize(&self) -> String {
        self.to_value().to_json_compact()
    }
}

fn normalized(values: &[i64], single_only: bool) -> Vec<i64> {
    let mut values = values.to_vec();
    if single_only {
        values.retain(|id| *id != statics::SENTINEL_DEFAULT_ID);
        values.truncate(1);
    } else {
        values.sort_unstable();
        values.dedup();
    }
    values
}

#[cfg(test)]
mod tests {
    use super::{StoreEntry, StoreReference, StoreSnapshot, build_options, find_orphans};
    use crate::config::FieldConfig;
    use crate::statics;

    fn entry(id: i64, kind: &str) -> StoreEntry {
        StoreEntry {
            id,
            name: format!("entry-{id}"),
            kind: kind.to_string(),
            setting: Vec::new(),
        }
    }

    fn color_snapshot() -> StoreSnapshot {
        let mut snapshot = StoreSnapshot::default();
        snapshot.insert(
            "colors",
            vec![entry(1, "color"), entry(2, "color"), entry(9, "gradient")],
        );
        snapshot
    }

    fn color_config(single: bool) -> FieldConfig {
        FieldConfig::from_json(&format!(
            r#"{{"store": "colors", "storeType": "color", "isOneToOne": {single}}}"#
        ))
        .expect("config parses")
    }

    #[test]
    fn snapshot_parses_wire_shape() {
        let snapshot = StoreSnapshot::from_json(
            r##"{"colors": [
                {"id": 1, "name": "Red", "type": "color",
                 "setting": [{"id": 10, "color": "#f00"}]},
                {"id": 2, "name": "Plain", "type": "color", "setting": []}
            ]}"##,
        )
        .unwrap();

        let entries = snapshot.entries("colors").unwrap();
        assert_eq!(entries[0].kind, "color");
        assert_eq!(entries[0].setting[0].color.as_deref(), Some("#f00"));
        assert!(snapshot.entries("nope").is_none());
    }

    #[test]
    fn options_filter_by_type_and_prepend_sentinel_for_multi() {
        let snapshot = color_snapshot();
        let options = build_options(&snapshot, "colors", "color", false);
        let ids: Vec<i64> = options.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![statics::SENTINEL_DEFAULT_ID, 1, 2]);
        assert_eq!(options[0].label, statics::EN_OPTION_DEFAULT);

        let options = build_options(&snapshot, "colors", "color", true);
        let ids: Vec<i64> = options.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn unknown_store_yields_empty_candidates() {
        let options = build_options(&color_snapshot(), "missing", "color", false);
        assert!(options.is_empty());
    }

    #[test]
    fn select_sorts_dedups_and_restamps_configuration() {
        let config = color_config(false);
        let mut reference = StoreReference {
            store: "stale".to_string(),
            store_type: "stale".to_string(),
            values: Vec::new(),
        };

        reference.select(&[2, 1, 2, -1], &config);
        assert_eq!(reference.store, "colors");
        assert_eq!(reference.store_type, "color");
        assert_eq!(reference.values, vec![-1, 1, 2]);
    }

    #[test]
    fn single_select_keeps_first_real_entry_and_never_the_sentinel() {
        let config = color_config(true);
        let mut reference = StoreReference::empty(&config);

        reference.select(&[-1, 2, 1], &config);
        assert_eq!(reference.values, vec![2]);

        reference.select(&[], &config);
        assert!(reference.values.is_empty());
    }

    #[test]
    fn orphans_are_flagged_then_removed_on_request() {
        let config = color_config(false);
        let snapshot = color_snapshot();
        let options = build_options(&snapshot, "colors", "color", false);

        let mut reference = StoreReference::empty(&config);
        reference.values = vec![1, 2, 3];

        assert_eq!(find_orphans(&reference.values, &options), vec![3]);

        reference.remove_orphans(&options, &config);
        assert_eq!(reference.values, vec![1, 2]);
    }

    #[test]
    fn advisory_states_follow_selection_shape() {
        let config = color_config(false);
        let mut reference = StoreReference::empty(&config);

        reference.select(&[2], &config);
        assert!(reference.single_enforced(false));
        assert!(!reference.default_also_allowed());

        reference.select(&[-1, 2], &config);
        assert!(reference.default_also_allowed());

        reference.select(&[1, 2], &config);
        assert!(!reference.single_enforced(false));
        assert!(!reference.default_also_allowed());
    }

    #[test]
    fn initialize_accepts_valid_persisted_value() {
        let config = color_config(false);
        let (reference, persist) = StoreReference::initialize(
            &config,
            Some(r#"{"store":"colors","storeType":"color","values":[2,1]}"#),
        );
        assert!(!persist);
        assert_eq!(reference.values, vec![1, 2]);
    }

    #[test]
    fn initialize_tolerates_double_encoding_and_string_ids() {
        let config = color_config(false);
        let raw = r#""{\"store\":\"colors\",\"storeType\":\"color\",\"values\":[\"2\",1]}""#;
        let (reference, persist) = StoreReference::initialize(&config, Some(raw));
        assert!(!persist);
        assert_eq!(reference.values, vec![1, 2]);
    }

    #[test]
    fn initialize_without_valid_value_is_empty_and_requests_persist() {
        let config = color_config(false);
        let (reference, persist) = StoreReference::initialize(&config, Some("{broken"));
        assert!(persist);
        assert_eq!(reference.store, "colors");
        assert_eq!(reference.store_type, "color");
        assert!(reference.values.is_empty());
        assert_eq!(
            reference.serialize(),
            r#"{"store":"colors","storeType":"color","values":[]}"#
        );
    }

    #[test]
    fn serialize_writes_the_wire_format() {
        let config = color_config(false);
        let mut reference = StoreReference::empty(&config);
        reference.select(&[2, 1], &config);
        assert_eq!(
            reference.serialize(),
            r#"{"store":"colors","storeType":"color","values":[1,2]}"#
        );
    }
}
