use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// A number that preserves the distinction between I64, U64, and F64.
/// Persisted field values are sensitive to integer vs float formatting,
/// so the distinction survives a parse/serialize cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum FvNumber {
    I64(i64),
    U64(u64),
    F64(f64),
}

impl FvNumber {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FvNumber::I64(v) => Some(*v),
            FvNumber::U64(v) => i64::try_from(*v).ok(),
            FvNumber::F64(_) => None,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            FvNumber::I64(v) => *v as f64,
            FvNumber::U64(v) => *v as f64,
            FvNumber::F64(v) => *v,
        }
    }
}

impl Serialize for FvNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FvNumber::I64(v) => serializer.serialize_i64(*v),
            FvNumber::U64(v) => serializer.serialize_u64(*v),
            FvNumber::F64(v) => serializer.serialize_f64(*v),
        }
    }
}

impl<'de> Deserialize<'de> for FvNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NumberVisitor;

        impl<'de> de::Visitor<'de> for NumberVisitor {
            type Value = FvNumber;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a JSON number")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(FvNumber::I64(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(FvNumber::U64(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(FvNumber::F64(v))
            }
        }

        deserializer.deserialize_any(NumberVisitor)
    }
}

/// A persisted field value in its parsed form.
/// Objects keep insertion order, so slot order and positional migration
/// are stable across parse/serialize cycles.
#[derive(Debug, Clone, PartialEq)]
pub enum FvValue {
    Null,
    Bool(bool),
    Number(FvNumber),
    String(String),
    Array(Vec<FvValue>),
    Object(IndexMap<String, FvValue>),
}

impl FvValue {
    pub fn as_object(&self) -> Option<&IndexMap<String, FvValue>> {
        match self {
            FvValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut IndexMap<String, FvValue>> {
        match self {
            FvValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[FvValue]> {
        match self {
            FvValue::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FvValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view of a value, tolerating identifiers persisted as strings.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FvValue::Number(n) => n.as_i64(),
            FvValue::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FvValue::Null)
    }

    pub fn get(&self, key: &str) -> Option<&FvValue> {
        self.as_object().and_then(|m| m.get(key))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FvValue::Null => "null",
            FvValue::Bool(_) => "bool",
            FvValue::Number(_) => "number",
            FvValue::String(_) => "string",
            FvValue::Array(_) => "array",
            FvValue::Object(_) => "object",
        }
    }

    pub fn parse_json(text: &str) -> Result<FvValue, serde_json::Error> {
        serde_json::from_str::<FvValue>(text)
    }

    /// Serialize in the canonical persisted style:
    /// - compact (no whitespace)
    /// - object keys in insertion order
    /// - non-finite floats rendered as `null` (the wire format is strict JSON)
    pub fn to_json_compact(&self) -> String {
        let mut out = String::new();
        self.write_json(&mut out);
        out
    }

    fn write_json(&self, out: &mut String) {
        match self {
            FvValue::Null => out.push_str("null"),
            FvValue::Bool(v) => out.push_str(if *v { "true" } else { "false" }),
            FvValue::Number(n) => n.write_json(out),
            FvValue::String(s) => write_escaped_string(out, s),
            FvValue::Array(values) => {
                out.push('[');
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    v.write_json(out);
                }
                out.push(']');
            }
            FvValue::Object(map) => {
                out.push('{');
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_escaped_string(out, k);
                    out.push(':');
                    v.write_json(out);
                }
                out.push('}');
            }
        }
    }
}

impl FvNumber {
    fn write_json(&self, out: &mut String) {
        match self {
            FvNumber::I64(v) => out.push_str(&v.to_string()),
            FvNumber::U64(v) => out.push_str(&v.to_string()),
            FvNumber::F64(v) => {
                if v.is_finite() {
                    let mut buf = ryu::Buffer::new();
                    out.push_str(buf.format(*v));
                } else {
                    // NaN/Infinity cannot appear in strict JSON output.
                    out.push_str("null");
                }
            }
        }
    }
}

fn write_escaped_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write as _;
                write!(out, "\\u{:04x}", c as u32).ok();
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

impl Serialize for FvValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FvValue::Null => serializer.serialize_unit(),
            FvValue::Bool(v) => serializer.serialize_bool(*v),
            FvValue::Number(n) => n.serialize(serializer),
            FvValue::String(s) => serializer.serialize_str(s),
            FvValue::Array(values) => values.serialize(serializer),
            FvValue::Object(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for FvValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl<'de> de::Visitor<'de> for ValueVisitor {
            type Value = FvValue;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a JSON value")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(FvValue::Null)
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(FvValue::Null)
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(FvValue::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(FvValue::Number(FvNumber::I64(v)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(FvValue::Number(FvNumber::U64(v)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(FvValue::Number(FvNumber::F64(v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(FvValue::String(v.to_owned()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(FvValue::String(v))
            }

            fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut values = Vec::new();
                while let Some(value) = seq.next_element::<FvValue>()? {
                    values.push(value);
                }
                Ok(FvValue::Array(values))
            }

            fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut values = IndexMap::new();
                while let Some((key, value)) = map.next_entry::<String, FvValue>()? {
                    values.insert(key, value);
                }
                Ok(FvValue::Object(values))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::{FvNumber, FvValue};
    use indexmap::IndexMap;

    #[test]
    fn parse_json_keeps_object_insertion_order() {
        let v = FvValue::parse_json(r#"{"b":1,"a":2,"c":3}"#).unwrap();
        let keys: Vec<&str> = v.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn compact_writer_is_stable_under_reparse() {
        let text = r#"{"mobile":10,"tablet":null,"desktop":"3.","wqhd":1.5}"#;
        let v = FvValue::parse_json(text).unwrap();
        let out = v.to_json_compact();
        assert_eq!(FvValue::parse_json(&out).unwrap(), v);
        assert_eq!(out, text);
    }

    #[test]
    fn non_finite_floats_serialize_as_null() {
        let v = FvValue::Number(FvNumber::F64(f64::NAN));
        assert_eq!(v.to_json_compact(), "null");
        let v = FvValue::Number(FvNumber::F64(f64::INFINITY));
        assert_eq!(v.to_json_compact(), "null");
    }

    #[test]
    fn escaped_strings_roundtrip() {
        let v = FvValue::String("a\"b\\c\nd\te".to_string());
        let out = v.to_json_compact();
        assert_eq!(FvValue::parse_json(&out).unwrap(), v);
    }

    #[test]
    fn as_i64_tolerates_string_identifiers() {
        assert_eq!(FvValue::String(" 42 ".to_string()).as_i64(), Some(42));
        assert_eq!(FvValue::Number(FvNumber::U64(7)).as_i64(), Some(7));
        assert_eq!(FvValue::Number(FvNumber::F64(1.5)).as_i64(), None);
        assert_eq!(FvValue::String("x".to_string()).as_i64(), None);
    }

    #[test]
    fn empty_object_serializes_compact() {
        let v = FvValue::Object(IndexMap::new());
        assert_eq!(v.to_json_compact(), "{}");
    }
}
