// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::TimeZone;
use yare::parameterized;

fn ts() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

#[parameterized(
    business = { "business", Category::Business },
    technology = { "technology", Category::Technology },
    science = { "Science", Category::Science },
    education = { "EDUCATION", Category::Education },
    personal = { "personal", Category::Personal },
    other = { "other", Category::Other },
)]
fn category_from_str(input: &str, expected: Category) {
    assert_eq!(input.parse::<Category>().unwrap(), expected);
}

#[test]
fn category_rejects_unknown() {
    let err = "sports".parse::<Category>().unwrap_err();
    assert!(matches!(err, Error::InvalidCategory(ref s) if s == "sports"));
}

#[test]
fn category_display_roundtrips() {
    for category in Category::ALL {
        assert_eq!(category.to_string().parse::<Category>().unwrap(), category);
    }
}

#[parameterized(
    tree = { "tree", ItemKind::Tree },
    trees = { "trees", ItemKind::Tree },
    note = { "note", ItemKind::Note },
    notes = { "Notes", ItemKind::Note },
)]
fn item_kind_from_str(input: &str, expected: ItemKind) {
    assert_eq!(input.parse::<ItemKind>().unwrap(), expected);
}

#[test]
fn item_kind_rejects_unknown() {
    assert!("folders".parse::<ItemKind>().is_err());
}

#[test]
fn tree_serializes_camel_case() {
    let tree = Tree::new("t1", "Rust", Category::Technology, ts());
    let json = serde_json::to_value(&tree).unwrap();

    assert_eq!(json["id"], "t1");
    assert_eq!(json["category"], "technology");
    assert!(json.get("createdAt").is_some());
    assert!(json.get("updatedAt").is_some());
    assert!(json.get("created_at").is_none());
}

#[test]
fn tree_preserves_unknown_fields() {
    let raw = r#"{
        "id": "t1",
        "name": "Garden",
        "category": "personal",
        "createdAt": "2024-01-01T00:00:00.000Z",
        "updatedAt": "2024-01-02T00:00:00.000Z",
        "pinned": true,
        "nodes": [
            {"id": "n1", "title": "Roses", "level": 0, "parentId": null,
             "icon": "🌹", "expanded": false, "children": []}
        ]
    }"#;

    let tree: Tree = serde_json::from_str(raw).unwrap();
    assert_eq!(tree.extra.get("pinned"), Some(&Value::Bool(true)));
    assert_eq!(tree.nodes[0].extra.get("icon"), Some(&Value::from("🌹")));

    let back = serde_json::to_value(&tree).unwrap();
    assert_eq!(back["pinned"], true);
    assert_eq!(back["nodes"][0]["expanded"], false);
}

#[test]
fn note_defaults_missing_content_and_category() {
    let raw = r#"{"id":"n1","name":"Todo","createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}"#;
    let note: Note = serde_json::from_str(raw).unwrap();
    assert_eq!(note.content, "");
    assert_eq!(note.category, Category::Other);
}

#[test]
fn node_child_of_sets_level_and_parent() {
    let root = Node::root("a", "Root");
    let child = Node::child_of(&root, "b", "Child");
    assert_eq!(child.level, 1);
    assert_eq!(child.parent_id.as_deref(), Some("a"));
}

#[test]
fn item_accessors() {
    let item: Item = Note::new("n1", "Groceries", Category::Personal, ts()).into();
    assert_eq!(item.id(), "n1");
    assert_eq!(item.name(), "Groceries");
    assert_eq!(item.kind(), ItemKind::Note);
    assert_eq!(item.category(), Category::Personal);
}

#[parameterized(
    blank = { "   " },
    empty = { "" },
)]
fn validate_name_rejects_blank(name: &str) {
    assert!(validate_name(name).is_err());
}

#[test]
fn validate_name_limits_length() {
    assert!(validate_name(&"x".repeat(MAX_NAME_LEN)).is_ok());
    assert!(validate_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    // Length is counted in characters, not bytes
    assert!(validate_name(&"я".repeat(MAX_NAME_LEN)).is_ok());
}
