use fieldval::FvValue;
use fieldval::decode::{self, Decoded};
use pretty_assertions::assert_eq;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[test]
fn roundtrip_is_idempotent_for_slot_shaped_objects() -> Result<()> {
    let samples = [
        r#"{"mobile":1,"tablet":2,"desktop":3,"wqhd":4}"#,
        r#"{"a":"x","b":null}"#,
        r#"{"store":"colors","storeType":"color","values":[-1,2,7]}"#,
        r#"{"f":1.25,"g":-3,"h":"3."}"#,
        "{}",
    ];

    for text in samples {
        let first = FvValue::parse_json(text)?;
        let second = FvValue::parse_json(&first.to_json_compact())?;
        assert_eq!(second, first, "reparse changed: {text}");
        // And the serialized form itself is stable from then on.
        assert_eq!(second.to_json_compact(), first.to_json_compact());
    }
    Ok(())
}

#[test]
fn double_encoded_value_decodes_to_the_inner_structure() -> Result<()> {
    let value = FvValue::parse_json(r#"{"a":1}"#)?;
    let once = value.to_json_compact();
    let twice = FvValue::String(once.clone()).to_json_compact();
    assert_eq!(twice, "\"{\\\"a\\\":1}\"");

    let Decoded::Value(decoded) = decode::try_decode(&twice)? else {
        panic!("expected a value");
    };
    assert_eq!(decoded, value);

    // Single-encoded input takes one pass and lands on the same structure.
    let Decoded::Value(decoded) = decode::try_decode(&once)? else {
        panic!("expected a value");
    };
    assert_eq!(decoded, value);
    Ok(())
}

#[test]
fn literal_null_text_is_no_value_not_an_error() -> Result<()> {
    assert_eq!(decode::try_decode("null")?, Decoded::Absent);
    assert_eq!(decode::try_decode("")?, Decoded::Absent);
    assert_eq!(decode::try_decode("\"null\"")?, Decoded::Absent);
    Ok(())
}

#[test]
fn malformed_persisted_value_recovers_through_the_default() {
    let default = FvValue::String(r#"{"mobile":10,"tablet":20}"#.to_string());

    let recovered = decode::decode(Some("{definitely not json"), Some(&default))
        .expect("default should take over");
    assert_eq!(
        recovered.get("mobile").and_then(FvValue::as_i64),
        Some(10)
    );

    // Unrecoverable on both ends: a defined "no value", still no error.
    assert_eq!(decode::decode(Some("{broken"), None), None);
}
