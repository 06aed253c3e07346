//! Field configuration as supplied by the host.
//!
//! Only the recognized options are modeled; unknown keys in the host's
//! configuration blob are ignored.

use crate::coerce::DataType;
use crate::value::FvValue;
use serde::Deserialize;

/// The field archetype decides which value model handles the persisted
/// string. The set is closed: there is exactly one implementation per
/// variant and one dispatch point in the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldArchetype {
    Scalar,
    Grouped,
    StoreReference,
}

impl FieldArchetype {
    pub fn name(self) -> &'static str {
        match self {
            FieldArchetype::Scalar => "scalar",
            FieldArchetype::Grouped => "grouped",
            FieldArchetype::StoreReference => "store-reference",
        }
    }
}

/// Recognized per-field options.
///
/// `default` may hold a plain scalar, a JSON-encoded string, or an
/// already-structured value; the decode guard treats all three alike.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldConfig {
    pub default: Option<FvValue>,
    pub data_type: DataType,
    pub fields: Vec<String>,
    pub field_labels: Vec<String>,
    pub store: Option<String>,
    pub store_type: Option<String>,
    pub is_one_to_one: bool,
}

impl FieldConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
