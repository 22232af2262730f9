//! Shipping exported replica state through a serializer.

use lww_dict::prelude::*;

type Replica = LwwDictionary<String, String, ManualClock>;
type State = ReplicaState<String, String, u64>;

fn replica() -> Replica {
    LwwDictionary::with_clock(ManualClock::new(0))
}

#[test]
fn state_survives_json_transport() {
    let origin = replica();
    origin.add_with_timestamp("title".into(), "Goodnotes".into(), 1);
    origin.add_with_timestamp("draft".into(), "yes".into(), 2);
    origin.remove_with_timestamp("draft".into(), 3);

    let json = serde_json::to_string(&origin.state()).unwrap();
    let decoded: State = serde_json::from_str(&json).unwrap();

    let peer = replica();
    peer.merge_state(&decoded);

    assert_eq!(peer, origin);
    assert_eq!(peer.lookup(&"title".to_string()), Some("Goodnotes".to_string()));
    assert_eq!(peer.lookup(&"draft".to_string()), None);
}

#[test]
fn timestamped_entry_serializes_fields_by_name() {
    let entry = Timestamped::new("v", 7u64);
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["value"], "v");
    assert_eq!(json["timestamp"], 7);
}

#[test]
fn delta_can_be_shipped_instead_of_full_state() {
    let a = replica();
    let mut b = replica();
    a.add_with_timestamp("x".into(), "1".into(), 5);
    b.add_with_timestamp("x".into(), "0".into(), 1);
    b.add_with_timestamp("y".into(), "2".into(), 1);

    let delta = a.delta(&b);
    let bytes = serde_json::to_vec(&delta).unwrap();
    let decoded: State = serde_json::from_slice(&bytes).unwrap();
    b.apply_delta(&decoded);

    assert_eq!(b.lookup(&"x".to_string()), Some("1".to_string()));
    assert_eq!(b.lookup(&"y".to_string()), Some("2".to_string()));
}
