//! Integration tests for `ListMultimap`
//!
//! Values keep insertion order per key and every update leaves older
//! snapshots untouched.

use cmdweave_foundation::{ListMultimap, Value};

#[test]
fn multimap_empty() {
    let map: ListMultimap<Value> = ListMultimap::new();
    assert!(map.is_empty());
    assert_eq!(map.len(), 0);
    assert_eq!(map.key_count(), 0);
    assert!(map.get("missing").is_none());
}

#[test]
fn multimap_keeps_insertion_order_per_key() {
    let map = ListMultimap::new()
        .insert("color", Value::from("red"))
        .insert("size", Value::Int(3))
        .insert("color", Value::from("blue"));

    assert_eq!(map.len(), 3);
    assert_eq!(map.key_count(), 2);
    let colors: Vec<_> = map.get("color").unwrap().iter().cloned().collect();
    assert_eq!(colors, vec![Value::from("red"), Value::from("blue")]);
}

#[test]
fn multimap_updates_leave_snapshots_intact() {
    let before = ListMultimap::new().insert("a", Value::Int(1));
    let after = before.insert("a", Value::Int(2)).insert("b", Value::Int(3));

    assert_eq!(before.len(), 1);
    assert_eq!(after.len(), 3);
    assert!(!before.contains_key("b"));
}

#[test]
fn multimap_remove_key_and_retain() {
    let map: ListMultimap<Value> = [("a", Value::Int(1)), ("a", Value::Int(2)), ("b", Value::Int(3))]
        .into_iter()
        .collect();

    let without_a = map.remove_key("a");
    assert_eq!(without_a.keys().collect::<Vec<_>>(), vec!["b"]);

    let odd = map.retain(|_, v| v.as_int().is_some_and(|n| n % 2 == 1));
    assert_eq!(odd.len(), 2);
    assert_eq!(odd.key_count(), 2);

    let none = map.retain(|key, _| key == "zzz");
    assert!(none.is_empty());
    assert_eq!(map.len(), 3);
}

#[test]
fn multimap_keys_are_sorted() {
    let map = ListMultimap::new()
        .insert("zeta", 1)
        .insert("alpha", 2)
        .insert("mid", 3);
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["alpha", "mid", "zeta"]);
    assert_eq!(map.values().copied().collect::<Vec<_>>(), vec![2, 3, 1]);
}
