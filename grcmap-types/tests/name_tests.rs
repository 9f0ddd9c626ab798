use grcmap_types::{JoinAction, MegaRelation, TypeName, SNAPSHOT_TYPE};
use std::collections::HashMap;
use std::str::FromStr;

#[test]
fn parse_accepts_plain_names() {
    let name = TypeName::parse("Control").unwrap();
    assert_eq!(name.as_str(), "Control");
    assert_eq!(name.to_string(), "Control");
}

#[test]
fn parse_rejects_blank_and_padded() {
    assert!(TypeName::parse("").is_err());
    assert!(TypeName::parse(" Control").is_err());
    assert!(TypeName::parse("Access Group").is_err());
    assert!(TypeName::from_str("Risk").is_ok());
}

#[test]
fn case_insensitive_compare() {
    let name = TypeName::from("Issue");
    assert!(name.eq_ignore_case("issue"));
    assert!(name.eq_ignore_case("ISSUE"));
    assert!(!name.eq_ignore_case("Audit"));
    assert_ne!(name, TypeName::from("issue"));
}

#[test]
fn snapshot_name() {
    assert_eq!(TypeName::snapshot().as_str(), SNAPSHOT_TYPE);
    assert!(TypeName::snapshot().is_snapshot());
    assert!(!TypeName::from("Control").is_snapshot());
}

#[test]
fn map_lookup_by_str() {
    let mut map = HashMap::new();
    map.insert(TypeName::from("Program"), 1);
    assert_eq!(map.get("Program"), Some(&1));
}

#[test]
fn join_action_opposite() {
    assert_eq!(JoinAction::Map.opposite(), JoinAction::Unmap);
    assert_eq!(JoinAction::Unmap.opposite(), JoinAction::Map);
    assert_eq!(JoinAction::from_str("unmap").unwrap(), JoinAction::Unmap);
    assert!(JoinAction::from_str("delete").is_err());
}

#[test]
fn mega_relation_literals() {
    assert!(MegaRelation::Child.is_child());
    assert!(!MegaRelation::Parent.is_child());
    assert_eq!(MegaRelation::from_is_child(true), MegaRelation::Child);
    assert_eq!(MegaRelation::from_str("parent").unwrap(), MegaRelation::Parent);
    assert_eq!(
        serde_json::to_string(&MegaRelation::Child).unwrap(),
        "\"child\""
    );
}
