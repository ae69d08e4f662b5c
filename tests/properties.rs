//! Round-trip and rejection properties of parse and stringify.

use jsontree::{parse, Absent, Kind, Null, ParseError, Rule, Value, ValueError};
use test_case::test_case;

fn round_trip(value: &Value) -> Value {
    let text = value.stringify().unwrap();
    parse(&text).unwrap_or_else(|e| panic!("{:?} does not re-parse: {}", text, e))
}

// ============================================================================
// Literal round trips
// ============================================================================

#[test]
fn null_round_trips() {
    assert_eq!(round_trip(&Value::from(Null)).as_null(), Ok(Null));
}

#[test_case(true ; "true")]
#[test_case(false ; "false")]
fn boolean_round_trips(b: bool) {
    assert_eq!(round_trip(&Value::from(b)).as_bool(), Ok(b));
}

#[test_case(5.0 ; "integral")]
#[test_case(-12.0 ; "negative integral")]
#[test_case(0.1 ; "tenth")]
#[test_case(-2.75 ; "negative fraction")]
#[test_case(1e21 ; "large")]
#[test_case(3e-9 ; "small")]
#[test_case(f64::MAX ; "max")]
#[test_case(f64::MIN_POSITIVE ; "min positive")]
fn number_round_trips(n: f64) {
    assert_eq!(round_trip(&Value::from(n)).as_f64(), Ok(n));
}

#[test]
fn integer_five_round_trips_as_float() {
    let text = Value::from(5).stringify().unwrap();
    assert_eq!(text, "5.0");
    assert_eq!(parse(&text).unwrap().as_f64(), Ok(5.0));
}

#[test_case("" ; "empty")]
#[test_case("ololo" ; "word")]
#[test_case("top kek" ; "spaces")]
#[test_case("ünïcödé ✓" ; "unicode")]
#[test_case("{[,:]}" ; "punctuation")]
fn string_round_trips(s: &str) {
    assert_eq!(round_trip(&Value::from(s)).as_str(), Ok(s));
}

#[test]
fn quotes_do_not_round_trip() {
    // Strings are written unescaped, so an inner quote ends the string early.
    let text = Value::from("a\"b").stringify().unwrap();
    assert_eq!(text, "\"a\"b\"");
    assert!(parse(&text).is_err());
}

// ============================================================================
// Document round trips
// ============================================================================

#[test_case("null" ; "null")]
#[test_case("[]" ; "empty array")]
#[test_case("{}" ; "empty map")]
#[test_case(r#"[1, 2.5, -3, "x", true, false, null]"# ; "flat array")]
#[test_case(r#"{"b": {"c": [1, {"d": []}]}, "a": "s"}"# ; "nested")]
#[test_case("\n[\t1 ,\n 2 ]\n" ; "whitespace")]
#[test_case(r#"{"path": "C:\\dir"}"# ; "escaped backslash kept raw")]
fn documents_survive_parse_stringify_parse(text: &str) {
    let first = parse(text).unwrap();
    let second = parse(&first.stringify().unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn stringify_is_compact_and_sorted() {
    let value = parse("{ \"z\" : [ 1 , 2 ] , \"a\" : { } }").unwrap();
    assert_eq!(value.stringify().unwrap(), r#"{"a":{},"z":[1.0,2.0]}"#);
}

#[test]
fn sample_document_round_trips() {
    let doc = Value::new();
    doc.set("a", true).unwrap();
    doc.set("b", 5).unwrap();
    doc.set("c", "ololo").unwrap();
    doc.set(
        "top kek",
        vec![Value::from([Value::from(5), true.into()]), "ololo".into()],
    )
    .unwrap();

    let text = doc.stringify().unwrap();
    let parsed = parse(&text).unwrap();
    assert_eq!(parsed, doc);
    assert_eq!(parsed.stringify().unwrap(), text);
}

// ============================================================================
// Rejected documents
// ============================================================================

#[test_case("" ; "empty")]
#[test_case("   " ; "blank")]
#[test_case("\r" ; "carriage return is not whitespace")]
#[test_case("[1,2,]" ; "trailing comma in array")]
#[test_case(r#"{"a":1,}"# ; "trailing comma in map")]
#[test_case(r#"{"a":1,"a":2}"# ; "duplicate key")]
#[test_case(r#"{"":1}"# ; "empty key")]
#[test_case(r#"{"a" 1}"# ; "missing colon")]
#[test_case("[1 2]" ; "missing comma")]
#[test_case("[1" ; "unclosed array")]
#[test_case(r#"{"a":1"# ; "unclosed map")]
#[test_case(r#""abc"# ; "unterminated string")]
#[test_case("-" ; "lone minus")]
#[test_case("1." ; "dangling dot")]
#[test_case("1e5" ; "exponent")]
#[test_case("nul" ; "truncated keyword")]
#[test_case("null null" ; "two values")]
#[test_case("'a'" ; "single quotes")]
fn malformed_documents_fail(text: &str) {
    assert!(parse(text).is_err(), "{:?} should not parse", text);
}

#[test]
fn failures_name_the_rule() {
    let cases: [(&str, Rule); 5] = [
        ("", Rule::Document),
        ("[1,]", Rule::Array),
        (r#"{"a":1,"a":1}"#, Rule::Map),
        ("\"open", Rule::String),
        ("-.5", Rule::Number),
    ];
    for (text, rule) in cases {
        assert_eq!(parse(text).unwrap_err().rule(), rule, "{:?}", text);
    }
}

#[test]
fn trailing_garbage_reports_offset() {
    assert_eq!(
        parse("[1] ]"),
        Err(ParseError::TrailingInput { offset: 4 })
    );
}

// ============================================================================
// Vivification and absent handling
// ============================================================================

#[test]
fn write_then_read_on_default_value() {
    let value = Value::default();
    value.set("x", 5).unwrap();
    assert_eq!(value.get("x").unwrap().as_f64(), Ok(5.0));

    let y = value.get_or_insert("y").unwrap();
    assert_eq!(y.value().kind(), Kind::Absent);
    assert_eq!(value.get("y").unwrap().kind(), Kind::Absent);
    assert_eq!(value.stringify().unwrap(), r#"{"x":5.0}"#);

    y.assign(vec![true]).unwrap();
    assert_eq!(value.stringify().unwrap(), r#"{"x":5.0,"y":[true]}"#);
}

#[test]
fn absent_element_leaves_no_stray_comma() {
    let value = Value::from(vec![Value::from(5), Value::from(Absent)]);
    assert_eq!(value.stringify().unwrap(), "[5.0]");
}

#[test]
fn bare_absent_cannot_be_stringified() {
    assert_eq!(Value::absent().stringify(), Err(ValueError::Absent));
}

#[test]
fn parsed_values_are_mutable_containers() {
    let doc = parse(r#"{"list": [1, 2]}"#).unwrap();
    let list = doc.get("list").unwrap();
    list.set_at(0, Null).unwrap();
    doc.set("extra", "yes").unwrap();
    assert_eq!(
        doc.stringify().unwrap(),
        r#"{"extra":"yes","list":[null,2.0]}"#
    );
}
