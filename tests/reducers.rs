use serde_json::{json, Value};
use value_processors::{Identity, Join, ProcessError, Processor, TakeFirst, Unique};

#[test]
fn take_first_skips_null_and_empty_text() {
    let values = [json!(null), json!(""), json!("a"), json!("b")];
    assert_eq!(TakeFirst.first(&values), json!("a"));
}

#[test]
fn take_first_exhausted_returns_null() {
    assert_eq!(TakeFirst.first(&[json!(null), json!("")]), Value::Null);
    assert_eq!(TakeFirst.first(&[]), Value::Null);
}

#[test]
fn take_first_keeps_falsy_non_text_values() {
    assert_eq!(TakeFirst.first(&[json!(null), json!(0), json!("x")]), json!(0));
    assert_eq!(TakeFirst.first(&[json!(false)]), json!(false));
}

#[test]
fn take_first_as_processor_coerces_its_input() {
    assert_eq!(TakeFirst.process(json!(["", "y"]), None).unwrap(), json!("y"));
    assert_eq!(TakeFirst.process(json!("only"), None).unwrap(), json!("only"));
}

#[test]
fn join_with_custom_separator() {
    let joined = Join::new("-").join(&[json!("a"), json!("b"), json!("c")]).unwrap();
    assert_eq!(joined, "a-b-c");
}

#[test]
fn join_defaults_to_a_single_space() {
    assert_eq!(Join::default().join(&[json!("a"), json!("b")]).unwrap(), "a b");
}

#[test]
fn join_of_nothing_is_empty_text() {
    assert_eq!(Join::default().join(&[]).unwrap(), "");
}

#[test]
fn join_rejects_non_text_elements() {
    let err = Join::default().join(&[json!("a"), json!(1)]).unwrap_err();
    assert!(matches!(err, ProcessError::Usage(msg) if msg.contains("number")));
}

#[test]
fn identity_returns_its_input_unchanged() {
    assert_eq!(Identity.process(json!([1, 2, 3]), None).unwrap(), json!([1, 2, 3]));
    assert_eq!(Identity.process(json!("x"), None).unwrap(), json!("x"));
    assert_eq!(Identity.process(Value::Null, None).unwrap(), Value::Null);
}

#[test]
fn unique_preserves_first_occurrence_order() {
    let values = vec![json!(2), json!(1), json!(2), json!(3), json!(1)];
    assert_eq!(Unique.unique(values), vec![json!(2), json!(1), json!(3)]);
}

#[test]
fn unique_distinguishes_value_kinds() {
    let values = vec![json!(1), json!("1"), json!(1)];
    assert_eq!(Unique.unique(values), vec![json!(1), json!("1")]);
}
