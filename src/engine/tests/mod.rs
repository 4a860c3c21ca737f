use super::*;
use crate::types::{Criterion, Match, MatchType};
use insta::assert_snapshot;
use serde_json::{Value, json};


const RUNNING_APPLICATIONS: &str = r#"Current configuration : 372 bytes
!
Configuration of Partition - class-map
!
!
!
class-map match-any test-class-map1
 match access-group 1000
 match access-group name test_acl
 match application citrix source cli
class-map match-all test-class-map2
 match any
class-map match-any test-class-map3
  description This is a test description.
 match application attribute media-type audio-video
!
!
end
"#;

const RUNNING_DSCP: &str = r#"Current configuration : 305 bytes
!
Configuration of Partition - class-map
!
class-map match-all test-class1
class-map match-all test-class3
 match dscp default  cs1  af31  cs7  60
class-map match-all test-class2
 match discard-class 0
 match security-group destination tag 100
 match input-interface GigabitEthernet3
!
!
end
"#;

const RUNNING_IP: &str = r#"
Current configuration : 348 bytes
!
Configuration of Partition - class-map
!
class-map match-all test-class1
  description This is a test description.
class-map match-any test-class2
 match ip dscp default  7  af11  af23  af41  43  63
 match ip precedence 5
 match ip rtp 3000 1000
!
!
end
"#;

const RUNNING_METADATA: &str = r#"Current configuration : 339 bytes
!
Configuration of Partition - class-map
!
class-map match-all test-class1
class-map match-all test-class3
  description This is a test description.
class-map match-any test-class2
 match metadata device-model this_is_a_device_model
 match mpls experimental topmost 0  1  2  3  4
 match packet length min 100 max 1000
!
!
end
"#;

const RUNNING_PROTOCOL: &str = r#"Current configuration : 365 bytes
!
Configuration of Partition - class-map
!
class-map match-all test-class1
class-map match-all test-class3
  description This is a test description.
 match security-group destination tag 100
class-map match-any test-class2
 match protocol http server "example-server.com"
 match protocol attribute category consumer-internet
 match qos-group 70
!
!
end
"#;

const RUNNING_VLAN: &str = r#"Current configuration : 309 bytes
!
Configuration of Partition - class-map
!
class-map match-all test-class1
class-map match-all test-class3
  description This is a test description.
 match ip precedence 7
class-map match-any test-class2
 match vlan  100
 match vlan inner  20
 match not dscp 21  af32  af43  cs5  43  ef
!
!
end
"#;

fn request(state: State, running: Option<&str>, config: Value) -> Request {
    let config: Vec<ClassMap> = serde_json::from_value(config).unwrap();
    let request = Request::new(state).with_config(config);
    match running {
        Some(text) => request.with_running_config(text),
        None => request,
    }
}

/// Run `state` against `running` and return the commands to apply.
fn commands(state: State, running: &str, config: Value) -> Vec<String> {
    match ClassMapEngine::new()
        .run(&request(state, Some(running), config))
        .unwrap()
    {
        Outcome::Commands(commands) => commands,
        other => panic!("expected commands, got {other:?}"),
    }
}

#[test]
fn test_missing_config_is_reported() {
    for state in [State::Merged, State::Replaced, State::Overridden, State::Rendered] {
        let err = ClassMapEngine::new()
            .run(&request(state, Some(RUNNING_DSCP), json!([])))
            .unwrap_err();
        assert_eq!(
            err,
            ClassMapError::MissingInput {
                state: state.to_string(),
                input: "config".to_string(),
            }
        );
    }
}

#[test]
fn test_missing_running_config_for_parsed() {
    let err = ClassMapEngine::new()
        .run(&Request::new(State::Parsed))
        .unwrap_err();
    assert_eq!(
        err,
        ClassMapError::MissingInput {
            state: "parsed".to_string(),
            input: "running_config".to_string(),
        }
    );
}

#[test]
fn test_duplicate_names_are_rejected() {
    let err = ClassMapEngine::new()
        .run(&request(
            State::Replaced,
            Some(RUNNING_DSCP),
            json!([{"name": "a"}, {"name": "a", "match_type": "match-any"}]),
        ))
        .unwrap_err();
    assert!(matches!(err, ClassMapError::InvalidFormat(_)), "{err:?}");
}

#[test]
fn test_no_running_config_means_empty_device() {
    let outcome = ClassMapEngine::new()
        .run(&request(State::Merged, None, json!([{"name": "fresh"}])))
        .unwrap();
    assert_eq!(
        outcome,
        Outcome::Commands(vec!["class-map match-all fresh".to_string()])
    );
}

#[test]
fn test_run_json() {
    let outcome = ClassMapEngine::new()
        .run_json(
            r#"{"state": "merged",
                "config": [{"name": "test-class2", "matches": [{"qos_group": 70}]}],
                "running_config": "class-map match-any test-class2\n match qos-group 70\n"}"#,
        )
        .unwrap();
    assert!(!outcome.changed());
}

#[test]
fn test_run_json_rejects_malformed_input() {
    let err = ClassMapEngine::new().run_json("{\"state\": ").unwrap_err();
    assert!(matches!(err, ClassMapError::InvalidFormat(_)));
}
