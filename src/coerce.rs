//! Scalar coercion and default resolution.
//!
//! Casting is tolerant by contract: numeric input that fails to parse
//! becomes `null` for that slot, never an error and never the text `"NaN"`.
//! Float input ending in a trailing decimal point is held as a provisional
//! literal so mid-keystroke text like `"3."` is not collapsed while typing.

use crate::value::{FvNumber, FvValue};
use serde::{Deserialize, Deserializer};

/// Declared data type applied uniformly to all slots of a grouped field,
/// or to a scalar field's cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataType {
    Integer,
    Float,
    #[default]
    Untyped,
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Anything other than the two typed tags (including null and
        // absence) means "leave input untyped".
        let tag = Option::<String>::deserialize(deserializer)?;
        Ok(match tag.as_deref() {
            Some("integer") => DataType::Integer,
            Some("float") => DataType::Float,
            _ => DataType::Untyped,
        })
    }
}

/// Base-10 parse taking the leading integer prefix, so fractional input
/// like `"5.9"` coerces to `5` and `"12px"` to `12`.
pub fn cast_int_prefix(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for ch in digits.chars() {
        let Some(d) = ch.to_digit(10) else {
            break;
        };
        seen = true;
        value = value.checked_mul(10)?.checked_add(i64::from(d))?;
    }
    if !seen {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// Cast an already-parsed value to the declared type. Used when
/// initializing slots from persisted data.
pub fn cast_value(value: &FvValue, data_type: DataType) -> FvValue {
    match data_type {
        DataType::Integer => match value {
            FvValue::Number(FvNumber::I64(v)) => FvValue::Number(FvNumber::I64(*v)),
            FvValue::Number(FvNumber::U64(v)) => match i64::try_from(*v) {
                Ok(v) => FvValue::Number(FvNumber::I64(v)),
                Err(_) => FvValue::Null,
            },
            FvValue::Number(FvNumber::F64(v)) if v.is_finite() => {
                FvValue::Number(FvNumber::I64(*v as i64))
            }
            FvValue::String(s) => match cast_int_prefix(s) {
                Some(v) => FvValue::Number(FvNumber::I64(v)),
                None => FvValue::Null,
            },
            _ => FvValue::Null,
        },
        DataType::Float => match value {
            // Numeric input keeps its parsed form so re-serialization is stable.
            FvValue::Number(n) => FvValue::Number(n.clone()),
            FvValue::String(s) => cast_float_text(s),
            _ => FvValue::Null,
        },
        DataType::Untyped => value.clone(),
    }
}

/// Cast raw editor input for one slot or scalar.
pub fn cast_input(raw: &str, data_type: DataType) -> FvValue {
    match data_type {
        DataType::Untyped => FvValue::String(raw.to_string()),
        typed => cast_value(&FvValue::String(raw.to_string()), typed),
    }
}

fn cast_float_text(text: &str) -> FvValue {
    let trimmed = text.trim();
    // Provisional: the user is mid-keystroke; keep the literal until a
    // digit makes it parseable.
    if trimmed.ends_with('.') {
        return FvValue::String(trimmed.to_string());
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => FvValue::Number(FvNumber::F64(v)),
        _ => FvValue::Null,
    }
}

/// Truthiness of persisted checkbox-style text.
pub fn cast_bool(text: &str) -> bool {
    let t = text.trim().to_ascii_lowercase();
    matches!(t.as_str(), "true" | "1" | "yes" | "y")
}

/// Plain-string rendering for the outward emission channel.
pub fn to_plain_string(value: &FvValue) -> String {
    match value {
        FvValue::Null => String::new(),
        FvValue::String(s) => s.clone(),
        FvValue::Bool(b) => b.to_string(),
        FvValue::Number(_) | FvValue::Array(_) | FvValue::Object(_) => value.to_json_compact(),
    }
}

/// Result of an explicit defaulting pass: the effective value plus whether
/// the caller should persist it outward.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub value: String,
    pub should_persist: bool,
}

/// Inject the configured default only when the current value is unset.
/// Explicit falsy values (`"0"`, `"false"`, `""`) are preserved.
pub fn resolve_default(current: Option<&str>, default: Option<&FvValue>) -> Resolution {
    if let Some(current) = current {
        return Resolution {
            value: current.to_string(),
            should_persist: false,
        };
    }

    match default.filter(|d| !d.is_null()) {
        Some(default) => Resolution {
            value: to_plain_string(default),
            should_persist: true,
        },
        None => Resolution {
            value: String::new(),
            should_persist: false,
        },
    }
}
