use crate::{
    Error, MatchEngine, MatchedRule, RecordBatch, RouterRegistry, RulesConfig, SchemaError, VarMap,
    decode_sns_messages,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

const MINIMAL_RULES: &str = r#"
rules:
- name: minimal
  routers:
  - name: minimal-router
  vars:
  - name: type
    jsonpath: $..Type
    includes: ['.*']
    excludes:
  template: |
    This {type} just came in
"#;

const VALIDATE_RULES: &str = r#"
rules:
- name: match-includes
  routers:
  - name: print-router
  vars:
  - name: event
    jsonpath: $.Sns.Message.Event
    includes:
    - 'autoscaling:(?P<action>EC2_INSTANCE_\w+)'
    excludes:
    - '.*_ERROR'
  - name: group
    jsonpath: $.Sns.Message.AutoScalingGroupName
  - name: environment
    value: production
  template: "{action} in {group}"
- name: errors
  routers:
  - name: print-router
  - name: pager
  vars:
  - name: event
    jsonpath: $.Sns.Message.Event
    includes: ['.*_ERROR']
  template: "{event}"
"#;

fn sns_record(event: &str, group: &str) -> Value {
    let message = json!({ "Event": event, "AutoScalingGroupName": group }).to_string();
    json!({ "EventSource": "aws:sns", "Sns": { "Subject": "Auto Scaling", "Message": message } })
}

type Calls = Arc<Mutex<Vec<MatchedRule>>>;

fn recording_registry(names: &[&str]) -> (RouterRegistry, Vec<Calls>) {
    let mut registry = RouterRegistry::new();
    let mut all = Vec::new();
    for name in names {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        registry.register(*name, move |m| sink.lock().unwrap().push(m.clone()));
        all.push(calls);
    }
    (registry, all)
}

fn vars(pairs: &[(&str, &str)]) -> VarMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn round_trip_single_record() {
    let config = RulesConfig::from_value(json!({
        "rules": [ {
            "name": "r1",
            "template": "T",
            "vars": [ { "name": "type", "jsonpath": "$.Type", "includes": [".*"] } ],
            "routers": [ { "name": "x" } ]
        } ]
    }))
    .unwrap();
    let (registry, calls) = recording_registry(&["x"]);
    let engine = MatchEngine::new(&config, registry).unwrap();

    let matches = engine.route_matches(&RecordBatch::new(vec![json!({ "Type": "scale-up" })])).unwrap();

    let recorded = calls[0].lock().unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].vars, vars(&[("type", "scale-up")]));
    assert_eq!(recorded[0].name, "r1");
    assert_eq!(recorded[0].template, "T");
    assert_eq!(matches, *recorded);
}

#[test]
fn singleton_batch() {
    let (registry, calls) = recording_registry(&["minimal-router"]);
    let engine = MatchEngine::new(&RulesConfig::from_yaml_str(MINIMAL_RULES).unwrap(), registry).unwrap();

    let batch = RecordBatch::from_json_str(r#"{ "Records": [ { "Sns": { "Type": "Notification" } } ] }"#).unwrap();
    let matches = engine.route_matches(&batch).unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].vars, vars(&[("type", "Notification")]));
    assert_eq!(matches[0].render(), "This Notification just came in\n");
    assert_eq!(calls[0].lock().unwrap().len(), 1);
}

#[test]
fn one_entry_per_matching_record() {
    let (registry, calls) = recording_registry(&["minimal-router"]);
    let engine = MatchEngine::new(&RulesConfig::from_yaml_str(MINIMAL_RULES).unwrap(), registry).unwrap();

    let batch = RecordBatch::new(vec![json!({ "Type": "a" }), json!({ "Other": 1 }), json!({ "Type": "b" })]);
    let matches = engine.match_rules(&batch);

    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].vars["type"], "a");
    assert_eq!(matches[1].vars["type"], "b");
    // match_rules never dispatches.
    assert!(calls[0].lock().unwrap().is_empty());
}

#[test]
fn output_is_rule_major() {
    let config = RulesConfig::from_yaml_str(
        r#"
rules:
- name: first
  template: ""
  vars: []
  routers: []
- name: second
  template: ""
  vars: []
  routers: []
"#,
    )
    .unwrap();
    let engine = MatchEngine::new(&config, RouterRegistry::new()).unwrap();
    let batch = RecordBatch::new(vec![json!({ "n": 1 }), json!({ "n": 2 })]);

    let names: Vec<String> = engine.match_rules(&batch).into_iter().map(|m| m.name).collect();
    assert_eq!(names, vec!["first", "first", "second", "second"]);
}

#[test]
fn sns_batch_through_preprocessing() {
    let (registry, calls) = recording_registry(&["print-router", "pager"]);
    let engine = MatchEngine::new(&RulesConfig::from_yaml_str(VALIDATE_RULES).unwrap(), registry).unwrap();

    let raw = RecordBatch::new(vec![
        sns_record("autoscaling:EC2_INSTANCE_LAUNCH", "web-asg"),
        sns_record("autoscaling:EC2_INSTANCE_LAUNCH_ERROR", "web-asg"),
        sns_record("autoscaling:TEST_NOTIFICATION", "web-asg"),
    ]);

    // Undecoded messages are plain strings, so no path below Message matches.
    assert!(engine.match_rules(&raw).is_empty());

    let matches = engine.route_matches(&decode_sns_messages(&raw).unwrap()).unwrap();
    assert_eq!(matches.len(), 2);

    assert_eq!(matches[0].name, "match-includes");
    assert_eq!(
        matches[0].vars,
        vars(&[
            ("event", "autoscaling:EC2_INSTANCE_LAUNCH"),
            ("action", "EC2_INSTANCE_LAUNCH"),
            ("group", "web-asg"),
            ("environment", "production"),
        ])
    );
    assert_eq!(matches[0].render(), "EC2_INSTANCE_LAUNCH in web-asg");

    assert_eq!(matches[1].name, "errors");
    assert_eq!(matches[1].vars, vars(&[("event", "autoscaling:EC2_INSTANCE_LAUNCH_ERROR")]));

    assert_eq!(calls[0].lock().unwrap().len(), 2);
    assert_eq!(calls[1].lock().unwrap().len(), 1);
}

#[test]
fn unregistered_router_is_skipped_silently() {
    let (registry, calls) = recording_registry(&["print-router"]);
    let engine = MatchEngine::new(&RulesConfig::from_yaml_str(VALIDATE_RULES).unwrap(), registry).unwrap();
    let batch = decode_sns_messages(&RecordBatch::new(vec![sns_record("autoscaling:X_ERROR", "g")])).unwrap();

    let run = engine.route_matches_with_metrics(&batch).unwrap();

    assert_eq!(run.matches.len(), 1);
    assert_eq!(run.metrics.skipped, vec!["pager"]);
    assert_eq!(calls[0].lock().unwrap().len(), 1);
}

#[test]
fn nameless_router_aborts_dispatch() {
    let config = RulesConfig::from_yaml_str(
        r#"
rules:
- name: broken
  template: ""
  vars: []
  routers:
  - name: x
  - channel: nowhere
  - name: x
- name: never-reached
  template: ""
  vars: []
  routers:
  - name: x
"#,
    )
    .unwrap();
    let (registry, calls) = recording_registry(&["x"]);
    let engine = MatchEngine::new(&config, registry).unwrap();

    let err = engine.route_matches(&RecordBatch::new(vec![json!({})])).unwrap_err();

    assert!(matches!(err, Error::RouterName { ref rule, index: 1 } if rule == "broken"));
    assert_eq!(calls[0].lock().unwrap().len(), 1);
}

#[test]
fn empty_router_name_counts_as_missing() {
    let config = RulesConfig::from_value(json!({
        "rules": [ { "name": "r", "template": "", "vars": [], "routers": [ { "name": "" } ] } ]
    }))
    .unwrap();
    let engine = MatchEngine::new(&config, RouterRegistry::new()).unwrap();
    assert!(matches!(engine.route_matches(&RecordBatch::new(vec![json!({})])), Err(Error::RouterName { .. })));
}

#[test]
fn schema_error_prevents_engine() {
    let config = RulesConfig::from_value(json!({
        "rules": [ { "name": "r1", "vars": [], "routers": [], "foo": 1 } ]
    }))
    .unwrap();
    match MatchEngine::new(&config, RouterRegistry::new()).unwrap_err() {
        Error::Schema(SchemaError::Keys { missing, extra, .. }) => {
            assert_eq!(missing, vec!["template"]);
            assert_eq!(extra, vec!["foo"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn conjunction_across_variables() {
    let (registry, _) = recording_registry(&["print-router"]);
    let engine = MatchEngine::new(&RulesConfig::from_yaml_str(VALIDATE_RULES).unwrap(), registry).unwrap();

    // Event matches the include, but the group field is missing.
    let mut record = sns_record("autoscaling:EC2_INSTANCE_TERMINATE", "g");
    record["Sns"]["Message"] = json!({ "Event": "autoscaling:EC2_INSTANCE_TERMINATE" });

    assert!(engine.match_rules(&RecordBatch::new(vec![record])).is_empty());
}

#[test]
fn repeated_routing_is_idempotent() {
    let engine = MatchEngine::new(
        &RulesConfig::from_yaml_str(VALIDATE_RULES).unwrap(),
        RouterRegistry::new().with("print-router", |_| {}),
    )
    .unwrap();
    let batch = decode_sns_messages(&RecordBatch::new(vec![
        sns_record("autoscaling:EC2_INSTANCE_LAUNCH", "a"),
        sns_record("autoscaling:EC2_INSTANCE_LAUNCH_ERROR", "b"),
    ]))
    .unwrap();

    let first = engine.route_matches(&batch).unwrap();
    let second = engine.route_matches(&batch).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn concurrent_batches_share_one_engine() {
    let count = Arc::new(Mutex::new(0usize));
    let sink = count.clone();
    let engine = Arc::new(
        MatchEngine::new(
            &RulesConfig::from_yaml_str(MINIMAL_RULES).unwrap(),
            RouterRegistry::new().with("minimal-router", move |_| *sink.lock().unwrap() += 1),
        )
        .unwrap(),
    );

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = engine.clone();
            std::thread::spawn(move || {
                let batch = RecordBatch::new(vec![json!({ "Type": format!("t{i}") }); 3]);
                engine.route_matches(&batch).unwrap().len()
            })
        })
        .collect();

    let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, 12);
    assert_eq!(*count.lock().unwrap(), 12);
}
