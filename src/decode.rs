//! Tolerant decoding of persisted field strings.
//!
//! A persisted value may be unset, the literal text `"null"`, single-encoded
//! JSON, or JSON that was serialized twice. The guard turns any of these into
//! a parsed structure or a defined "no value" outcome; it never returns an
//! error to the caller. Parse failures fall back to the field's configured
//! default and are logged.

use crate::{FvValue, statics};
use log::warn;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("inner payload of a double-encoded value is malformed: {0}")]
    MalformedInner(serde_json::Error),
}

/// Outcome of a single decode attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A parsed structure.
    Value(FvValue),
    /// Explicitly no value: unset, empty, `"null"`, or JSON `null`.
    Absent,
}

/// Strict decode of one persisted string, including the double-encoding pass.
/// Exposed so callers can distinguish "absent" from "malformed"; most go
/// through [`decode`] instead.
pub fn try_decode(raw: &str) -> Result<Decoded, DecodeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == statics::LITERAL_NULL {
        return Ok(Decoded::Absent);
    }

    let parsed = FvValue::parse_json(trimmed)?;
    match parsed {
        // Serialized twice: the first pass yields a string holding JSON.
        FvValue::String(inner) => {
            let inner_trimmed = inner.trim();
            if inner_trimmed.is_empty() || inner_trimmed == statics::LITERAL_NULL {
                return Ok(Decoded::Absent);
            }
            let value = FvValue::parse_json(inner_trimmed).map_err(DecodeError::MalformedInner)?;
            if value.is_null() {
                return Ok(Decoded::Absent);
            }
            Ok(Decoded::Value(value))
        }
        FvValue::Null => Ok(Decoded::Absent),
        value => Ok(Decoded::Value(value)),
    }
}

/// Decode a persisted value with the configured default as the fallback.
///
/// Returns `Some(structure)` when either source yields one, `None` when both
/// are absent or unrecoverable. A configured default may itself be a
/// JSON-encoded string (decoded with the same double-encoding tolerance) or
/// an already-parsed structure (used as-is).
pub fn decode(persisted: Option<&str>, default: Option<&FvValue>) -> Option<FvValue> {
    if let Some(raw) = persisted {
        match try_decode(raw) {
            Ok(Decoded::Value(value)) => return Some(value),
            Ok(Decoded::Absent) => {}
            Err(err) => {
                warn!("event=decode_failed source=persisted err={err}");
            }
        }
    }

    match default {
        Some(FvValue::String(raw)) => match try_decode(raw) {
            Ok(Decoded::Value(value)) => Some(value),
            Ok(Decoded::Absent) => None,
            Err(err) => {
                warn!("event=decode_failed source=default err={err}");
                None
            }
        },
        Some(FvValue::Null) | None => None,
        Some(value) => Some(value.clone()),
    }
}
