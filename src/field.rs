//! Per-field controller composing the value models behind one dispatch
//! point.
//!
//! `resolve` is the explicit lifecycle operation: invoked on mount and
//! whenever the externally observed persisted value changes, it returns the
//! canonical value plus whether the caller should persist it (the implicit
//! defaulting write). Edits return an outward `{name, value}` notification;
//! after any of them the internal state and the reported value agree.

use crate::coerce::{self, Resolution};
use crate::config::{FieldArchetype, FieldConfig};
use crate::grouped::GroupedValue;
use crate::statics;
use crate::store::{self, StoreOption, StoreReference, StoreSnapshot};
use crate::value::FvValue;
use log::debug;
use std::sync::Arc;
use thiserror::Error;

/// Outward edit notification for the host's persistence channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emit {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("field `{field}` is a {actual} field, not {expected}")]
    ArchetypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("field `{field}` has no slot `{slot}`")]
    UnknownSlot { field: String, slot: String },
}

/// Closed set of value models; exactly one per archetype.
enum FieldModel {
    Scalar { current: Option<String> },
    Grouped(GroupedValue),
    StoreReference(StoreReference),
}

/// One field instance. Owns its model exclusively; the store snapshot is a
/// shared read-only handle injected at construction.
pub struct FieldController {
    name: String,
    archetype: FieldArchetype,
    config: FieldConfig,
    snapshot: Arc<StoreSnapshot>,
    model: FieldModel,
    last_observed: Option<Option<String>>,
}

impl FieldController {
    pub fn new(
        name: impl Into<String>,
        archetype: FieldArchetype,
        config: FieldConfig,
        snapshot: Arc<StoreSnapshot>,
    ) -> Self {
        let model = match archetype {
            FieldArchetype::Scalar => FieldModel::Scalar { current: None },
            FieldArchetype::Grouped => {
                FieldModel::Grouped(GroupedValue::initialize(&config, None).0)
            }
            FieldArchetype::StoreReference => {
                FieldModel::StoreReference(StoreReference::empty(&config))
            }
        };
        Self {
            name: name.into(),
            archetype,
            config,
            snapshot,
            model,
            last_observed: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn archetype(&self) -> FieldArchetype {
        self.archetype
    }

    /// Swap in a changed configuration. The next write re-stamps whatever
    /// the configuration now says, and the next `resolve` recomputes even
    /// for an unchanged persisted value.
    pub fn set_config(&mut self, config: FieldConfig) {
        self.config = config;
        self.last_observed = None;
    }

    /// Resolve the externally observed persisted value into the canonical
    /// one. Returns `None` when the observed value is identical to the last
    /// resolved one (nothing to do, nothing re-emitted); otherwise the
    /// canonical value plus whether the caller should persist it now.
    pub fn resolve(&mut self, persisted: Option<&str>) -> Option<Resolution> {
        let observed = persisted.map(str::to_string);
        if self.last_observed.as_ref() == Some(&observed) {
            return None;
        }
        self.last_observed = Some(observed);

        let resolution = match &mut self.model {
            FieldModel::Scalar { current } => {
                let resolution =
                    coerce::resolve_default(persisted, self.config.default.as_ref());
                *current = match persisted {
                    Some(value) => Some(value.to_string()),
                    None if resolution.should_persist => Some(resolution.value.clone()),
                    None => None,
                };
                resolution
            }
            FieldModel::Grouped(model) => {
                let (initialized, should_persist) =
                    GroupedValue::initialize(&self.config, persisted);
                *model = initialized;
                Resolution {
                    value: model.serialize(),
                    should_persist,
                }
            }
            FieldModel::StoreReference(model) => {
                let (initialized, should_persist) =
                    StoreReference::initialize(&self.config, persisted);
                *model = initialized;
                Resolution {
                    value: model.serialize(),
                    should_persist,
                }
            }
        };
        Some(resolution)
    }

    /// Cast and set a scalar value.
    pub fn set_scalar(&mut self, raw: &str) -> Result<Emit, FieldError> {
        let value = coerce::to_plain_string(&coerce::cast_input(raw, self.config.data_type));
        let FieldModel::Scalar { current } = &mut self.model else {
            return Err(self.mismatch("scalar"));
        };
        *current = Some(value.clone());
        Ok(self.emit(value))
    }

    /// Flip a boolean scalar. Booleans are never cast, only toggled.
    pub fn toggle(&mut self) -> Result<Emit, FieldError> {
        let FieldModel::Scalar { current } = &mut self.model else {
            return Err(self.mismatch("scalar"));
        };
        let on = current.as_deref().is_some_and(coerce::cast_bool);
        let value = if on {
            statics::BOOL_FALSE
        } else {
            statics::BOOL_TRUE
        };
        *current = Some(value.to_string());
        Ok(self.emit(value.to_string()))
    }

    /// Current scalar value, if this is a scalar field.
    pub fn scalar(&self) -> Option<&str> {
        match &self.model {
            FieldModel::Scalar { current } => current.as_deref(),
            _ => None,
        }
    }

    /// Cast raw input into one slot of a grouped field and report the
    /// re-serialized map.
    pub fn update_slot(&mut self, slot: &str, raw: &str) -> Result<Emit, FieldError> {
        let FieldModel::Grouped(model) = &mut self.model else {
            return Err(self.mismatch("grouped"));
        };
        match model.update(slot, raw) {
            Some(value) => Ok(self.emit(value)),
            None => Err(FieldError::UnknownSlot {
                field: self.name.clone(),
                slot: slot.to_string(),
            }),
        }
    }

    /// Grouped model view, if this is a grouped field.
    pub fn grouped(&self) -> Option<&GroupedValue> {
        match &self.model {
            FieldModel::Grouped(model) => Some(model),
            _ => None,
        }
    }

    /// Replace the selection of a store-reference field.
    pub fn select(&mut self, new_values: &[i64]) -> Result<Emit, FieldError> {
        let FieldModel::StoreReference(model) = &mut self.model else {
            return Err(self.mismatch("store-reference"));
        };
        model.select(new_values, &self.config);
        let value = model.serialize();
        Ok(self.emit(value))
    }

    /// Drop the currently-orphaned identifiers and report the result.
    pub fn remove_orphans(&mut self) -> Result<Emit, FieldError> {
        let options = self.options();
        let FieldModel::StoreReference(model) = &mut self.model else {
            return Err(self.mismatch("store-reference"));
        };
        model.remove_orphans(&options, &self.config);
        let value = model.serialize();
        Ok(self.emit(value))
    }

    /// Candidate options for a store-reference field; empty for the other
    /// archetypes.
    pub fn options(&self) -> Vec<StoreOption> {
        let FieldModel::StoreReference(_) = self.model else {
            debug!(
                "event=options_on_non_store field={} archetype={}",
                self.name,
                self.archetype.name()
            );
            return Vec::new();
        };
        store::build_options(
            &self.snapshot,
            self.config.store.as_deref().unwrap_or_default(),
            self.config.store_type.as_deref().unwrap_or_default(),
            self.config.is_one_to_one,
        )
    }

    /// Identifiers in the current selection that no longer resolve to a
    /// store entry. User-visible, user-resolved; never removed here.
    pub fn orphans(&self) -> Vec<i64> {
        match &self.model {
            FieldModel::StoreReference(model) => {
                store::find_orphans(&model.values, &self.options())
            }
            _ => Vec::new(),
        }
    }

    /// Store-reference view, if this is a store-reference field.
    pub fn reference(&self) -> Option<&StoreReference> {
        match &self.model {
            FieldModel::StoreReference(model) => Some(model),
            _ => None,
        }
    }

    /// Configured default in its parsed form, if any.
    pub fn default_value(&self) -> Option<&FvValue> {
        self.config.default.as_ref()
    }

    fn emit(&mut self, value: String) -> Emit {
        // The emitted value is what the host persists next; remembering it
        // keeps the following resolve() from recomputing a no-op.
        self.last_observed = Some(Some(value.clone()));
        Emit {
            name: self.name.clone(),
            value,
        }
    }

    fn mismatch(&self, expected: &'static str) -> FieldError {
        FieldError::ArchetypeMismatch {
            field: self.name.clone(),
            expected,
            actual: self.archetype.name(),
        }
    }
}
