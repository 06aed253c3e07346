// Central place for wire keys, reserved identifiers and non-localized strings.
// Keep these out of the model code to reduce duplication and make tweaks safer.

// Persisted wire keys for store-reference values.
pub const WIRE_STORE: &str = "store";
pub const WIRE_STORE_TYPE: &str = "storeType";
pub const WIRE_VALUES: &str = "values";

// Reserved identifier for the synthetic "explicit default / none" option.
// Distinct from an empty selection.
pub const SENTINEL_DEFAULT_ID: i64 = -1;

// Grouped fields never hold more than this many slots; longer configured
// lists are truncated.
pub const MAX_SLOTS: usize = 4;

// Built-in slot keys used when neither `fields` nor `fieldLabels` is
// configured. Order matters: it is also the positional-migration order.
pub const FALLBACK_SLOT_KEYS: [&str; 4] = ["mobile", "tablet", "desktop", "wqhd"];

// The literal text "null" persisted by older writers; treated as "no value",
// distinct from a parse failure.
pub const LITERAL_NULL: &str = "null";

// English UI strings (EN_ prefix to make future localization easier).
pub const EN_OPTION_DEFAULT: &str = "default (none is allowed)";
pub const EN_ADVISORY_SINGLE_ENFORCED: &str = "single option will be enforced across all elements";
pub const EN_ADVISORY_DEFAULT_ALLOWED: &str = "default is also allowed";

// Canonical scalar renderings for toggled boolean fields.
pub const BOOL_TRUE: &str = "1";
pub const BOOL_FALSE: &str = "0";
