use rstest::rstest;

use crate::{DeserializerOptions, Map, Number, Value, from_str, from_str_with_options};

fn object(entries: &[(&str, Value)]) -> Value {
    let mut map = Map::new();
    for (k, v) in entries {
        map.insert((*k).to_string(), v.clone());
    }
    Value::Object(map)
}

fn integer(n: i64) -> Value {
    Value::Number(Number::Integer(n))
}

fn float(x: f64) -> Value {
    Value::Number(Number::Float(x))
}

#[test]
fn null_document() {
    assert_eq!(from_str("null").unwrap(), Value::Null);
}

#[test]
fn boolean_documents() {
    assert_eq!(from_str("true").unwrap(), Value::Boolean(true));
    assert_eq!(from_str("false").unwrap(), Value::Boolean(false));
}

#[test]
fn heterogeneous_array() {
    assert_eq!(
        from_str(r#"[1, 2.5, "x", true, null]"#).unwrap(),
        Value::Array(vec![
            integer(1),
            float(2.5),
            Value::String("x".into()),
            Value::Boolean(true),
            Value::Null,
        ])
    );
}

#[test]
fn object_with_nested_array() {
    assert_eq!(
        from_str(r#"{"k": [1,2]}"#).unwrap(),
        object(&[("k", Value::Array(vec![integer(1), integer(2)]))])
    );
}

#[test]
fn empty_composites() {
    assert_eq!(from_str("{}").unwrap(), object(&[]));
    assert_eq!(from_str("[]").unwrap(), Value::Array(vec![]));
    assert_eq!(
        from_str(r#"{"a": {}, "b": []}"#).unwrap(),
        object(&[("a", object(&[])), ("b", Value::Array(vec![]))])
    );
}

#[test]
fn duplicate_keys_last_value_wins() {
    assert_eq!(
        from_str(r#"{"a":1,"a":2}"#).unwrap(),
        object(&[("a", integer(2))])
    );
}

#[rstest]
#[case("[1,2]")]
#[case(" [ 1 , 2 ] ")]
#[case("\t[\n  1,\r\n  2\n]\n")]
#[case("[1,\t\t2]")]
fn whitespace_never_changes_the_result(#[case] text: &str) {
    assert_eq!(
        from_str(text).unwrap(),
        Value::Array(vec![integer(1), integer(2)])
    );
}

#[rstest]
#[case("0", 0)]
#[case("-0", 0)]
#[case("42", 42)]
#[case("-7", -7)]
#[case("9223372036854775807", i64::MAX)]
#[case("-9223372036854775808", i64::MIN)]
fn integer_literals(#[case] text: &str, #[case] expected: i64) {
    assert_eq!(from_str(text).unwrap(), integer(expected));
}

#[rstest]
#[case("2.5", 2.5)]
#[case("-0.125", -0.125)]
#[case("1.0", 1.0)]
#[case("1e2", 100.0)]
#[case("1E2", 100.0)]
#[case("2e-2", 0.02)]
#[case("12e+1", 120.0)]
#[case("0.5e3", 500.0)]
fn float_literals(#[case] text: &str, #[case] expected: f64) {
    assert_eq!(from_str(text).unwrap(), float(expected));
}

#[test]
fn integer_and_float_stay_distinct() {
    assert_eq!(from_str("1").unwrap(), integer(1));
    assert_eq!(from_str("1.0").unwrap(), float(1.0));
    assert_ne!(from_str("1").unwrap(), from_str("1.0").unwrap());
}

#[test]
fn integer_overflow_widens_to_float() {
    // One past i64::MAX.
    assert_eq!(
        from_str("9223372036854775808").unwrap(),
        float(9_223_372_036_854_775_808.0)
    );
}

#[test]
fn short_escapes() {
    assert_eq!(
        from_str(r#""a\"b\\c\/d\b\f\n\r\t""#).unwrap(),
        Value::String("a\"b\\c/d\u{0008}\u{000C}\n\r\t".into())
    );
}

#[test]
fn unicode_escapes() {
    assert_eq!(
        from_str("\"\\u0041\"").unwrap(),
        Value::String("A".into())
    );
    // Mixed-case hex digits decode alike.
    assert_eq!(
        from_str("\"\\u00e9\\u00E9\"").unwrap(),
        Value::String("éé".into())
    );
}

#[test]
fn surrogate_pair_escapes() {
    assert_eq!(
        from_str("\"\\uD83D\\uDE00\"").unwrap(),
        Value::String("\u{1F600}".into())
    );
}

#[test]
fn escaped_keys() {
    assert_eq!(
        from_str(r#"{"a\nb": 1}"#).unwrap(),
        object(&[("a\nb", integer(1))])
    );
}

#[test]
fn unicode_passes_through_unescaped() {
    assert_eq!(
        from_str("\"héllo \u{1F600}\"").unwrap(),
        Value::String("héllo \u{1F600}".into())
    );
}

#[test]
fn deeply_nested_mixed_document() {
    let value = from_str(r#"{"a": [{"b": [[], {"c": null}]}], "d": false}"#).unwrap();
    assert_eq!(
        value,
        object(&[
            (
                "a",
                Value::Array(vec![object(&[(
                    "b",
                    Value::Array(vec![Value::Array(vec![]), object(&[("c", Value::Null)])])
                )])])
            ),
            ("d", Value::Boolean(false)),
        ])
    );
}

#[test]
fn depth_exactly_at_the_bound_succeeds() {
    let options = DeserializerOptions { max_depth: 16 };
    let text = format!("{}{}", "[".repeat(16), "]".repeat(16));
    assert!(from_str_with_options(&text, options).is_ok());
}

#[test]
fn default_bound_admits_1024_levels() {
    let text = format!("{}{}", "[".repeat(1024), "]".repeat(1024));
    assert!(from_str(&text).is_ok());
}

#[test]
fn a_bound_below_one_still_admits_one_level() {
    let options = DeserializerOptions { max_depth: 0 };
    assert!(from_str_with_options("[]", options).is_ok());
    assert!(from_str_with_options("[[]]", options).is_err());
}

#[test]
fn object_keys_are_reported_in_map_order() {
    let value = from_str(r#"{"b": 1, "a": 2}"#).unwrap();
    let keys: Vec<&str> = value
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["a", "b"]);
}
