use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};
use value_processors::{Compose, Context, MapCompose, ProcessError, Processor, Stage, TakeFirst};

fn uppercase() -> Stage {
    Stage::map(|v| match v {
        Value::String(s) => Value::String(s.to_uppercase()),
        other => other,
    })
}

fn counting(calls: &Arc<AtomicUsize>) -> Stage {
    let calls = calls.clone();
    Stage::map(move |v| {
        calls.fetch_add(1, Ordering::SeqCst);
        v
    })
}

#[test]
fn compose_chains_scalar_stages_in_order() {
    let p = Compose::new(vec![
        Stage::map(|v| json!(format!("{}!", v.as_str().unwrap_or_default()))),
        uppercase(),
    ]);
    assert_eq!(p.call(json!("hi"), None).unwrap(), json!("HI!"));
}

#[test]
fn compose_returns_null_without_invoking_stages() {
    let calls = Arc::new(AtomicUsize::new(0));
    let p = Compose::new(vec![counting(&calls)]);
    assert_eq!(p.call(Value::Null, None).unwrap(), Value::Null);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn compose_stops_mid_chain_when_a_stage_yields_null() {
    let calls = Arc::new(AtomicUsize::new(0));
    let p = Compose::new(vec![Stage::map(|_| Value::Null), counting(&calls)]);
    assert_eq!(p.call(json!("x"), None).unwrap(), Value::Null);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn compose_feeds_null_onward_when_stop_on_none_is_off() {
    let ctx = Context::new().with("stop_on_none", false);
    let p = Compose::with_context(
        vec![
            Stage::map(|_| Value::Null),
            Stage::map(|v| if v.is_null() { json!("saw null") } else { v }),
        ],
        ctx,
    );
    assert_eq!(p.call(json!("x"), None).unwrap(), json!("saw null"));
}

#[test]
fn compose_propagates_stage_errors_unchanged() {
    let p = Compose::new(vec![Stage::plain(|_| Err(ProcessError::stage("boom")))]);
    let err = p.call(json!(1), None).unwrap_err();
    assert!(matches!(err, ProcessError::Stage(msg) if msg == "boom"));
}

#[test]
fn map_compose_flattens_fan_out_in_element_order() {
    let p = MapCompose::new(vec![Stage::map(|v| Value::Array(vec![v.clone(), v]))]);
    let out = p.call(json!([1, 2]), None).unwrap();
    assert_eq!(out, vec![json!(1), json!(1), json!(2), json!(2)]);
}

#[test]
fn map_compose_drops_elements_via_empty_results() {
    // An empty array and null both make the element vanish.
    let drop_even = Stage::map(|v| {
        if v.as_i64().map(|n| n % 2 == 0).unwrap_or(false) {
            json!([])
        } else {
            v
        }
    });
    let p = MapCompose::new(vec![drop_even]);
    assert_eq!(p.call(json!([1, 2, 3, 4]), None).unwrap(), vec![json!(1), json!(3)]);

    let p = MapCompose::new(vec![Stage::map(|_| Value::Null)]);
    assert!(p.call(json!([1, 2]), None).unwrap().is_empty());
}

#[test]
fn map_compose_coerces_scalar_input() {
    let p = MapCompose::new(vec![uppercase()]);
    assert_eq!(p.call(json!("a"), None).unwrap(), vec![json!("A")]);
    assert!(p.call(Value::Null, None).unwrap().is_empty());
}

#[test]
fn map_compose_aborts_on_the_first_failing_element() {
    let p = MapCompose::new(vec![Stage::plain(|v| {
        if v == json!(2) {
            Err(ProcessError::stage("element 2"))
        } else {
            Ok(v)
        }
    })]);
    assert!(p.call(json!([1, 2, 3]), None).is_err());
}

#[test]
fn runtime_context_wins_over_default() {
    let stage = Stage::contextual(|v, ctx| {
        let lang = ctx.get("lang").and_then(Value::as_str).unwrap_or("");
        Ok(json!(format!("{lang}:{}", v.as_str().unwrap_or(""))))
    });
    let p = Compose::with_context(vec![stage], Context::new().with("lang", "en"));

    let runtime = Context::new().with("lang", "fr");
    assert_eq!(p.call(json!("hello"), Some(&runtime)).unwrap(), json!("fr:hello"));
    assert_eq!(p.call(json!("hello"), None).unwrap(), json!("en:hello"));
}

#[test]
fn default_context_entries_survive_a_partial_runtime_override() {
    let stage = Stage::contextual(|_, ctx| {
        Ok(json!([ctx.get("lang").cloned(), ctx.get("tz").cloned()]))
    });
    let default = Context::new().with("lang", "en").with("tz", "UTC");
    let p = Compose::with_context(vec![stage], default);
    let runtime = Context::new().with("lang", "fr");
    assert_eq!(p.call(json!(0), Some(&runtime)).unwrap(), json!(["fr", "UTC"]));
}

#[test]
fn pipelines_nest_as_stages() {
    let inner = MapCompose::new(vec![uppercase()]);
    let p = Compose::new(vec![Stage::processor(inner), Stage::processor(TakeFirst)]);
    assert_eq!(p.call(json!(["", "a", "b"]), None).unwrap(), json!("A"));
}
