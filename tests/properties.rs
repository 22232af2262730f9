//! Property tests over generated add/remove histories.

use std::collections::HashMap;

use lww_dict::prelude::*;
use proptest::collection::vec;
use proptest::prelude::*;

type Replica = LwwDictionary<u8, u16, ManualClock>;

#[derive(Debug, Clone)]
enum Op {
    Add { key: u8, value: u16, ts: u64 },
    Remove { key: u8, ts: u64 },
}

/// Small key and timestamp domains so that collisions and ties are common.
fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..8, any::<u16>(), 0u64..6).prop_map(|(key, value, ts)| Op::Add { key, value, ts }),
        (0u8..8, 0u64..6).prop_map(|(key, ts)| Op::Remove { key, ts }),
    ]
}

fn apply(replica: &Replica, ops: &[Op]) {
    for op in ops {
        match *op {
            Op::Add { key, value, ts } => {
                replica.add_with_timestamp(key, value, ts);
            }
            Op::Remove { key, ts } => {
                replica.remove_with_timestamp(key, ts);
            }
        }
    }
}

fn build(ops: &[Op]) -> Replica {
    let replica = LwwDictionary::with_clock(ManualClock::new(0));
    apply(&replica, ops);
    replica
}

/// Rewrites timestamps so every operation across all histories is unique.
fn with_unique_timestamps(histories: Vec<Vec<Op>>) -> Vec<Vec<Op>> {
    let mut next = 0u64;
    histories
        .into_iter()
        .map(|ops| {
            ops.into_iter()
                .map(|op| {
                    next += 1;
                    match op {
                        Op::Add { key, value, .. } => Op::Add { key, value, ts: next },
                        Op::Remove { key, .. } => Op::Remove { key, ts: next },
                    }
                })
                .collect()
        })
        .collect()
}

proptest! {
    #[test]
    fn bidirectional_merge_converges(a_ops in vec(op(), 0..40), b_ops in vec(op(), 0..40)) {
        let a = build(&a_ops);
        let b = build(&b_ops);

        a.merge(&b);
        b.merge(&a);

        prop_assert_eq!(a.get_all(), b.get_all());
        prop_assert_eq!(&a, &b);
    }

    #[test]
    fn merge_is_idempotent(a_ops in vec(op(), 0..40), b_ops in vec(op(), 0..40)) {
        let a = build(&a_ops);
        let b = build(&b_ops);

        a.merge(&b);
        let once = a.clone();
        a.merge(&b);

        prop_assert_eq!(&a, &once);
    }

    #[test]
    fn get_all_agrees_with_lookup(ops in vec(op(), 0..60)) {
        let d = build(&ops);
        let all = d.get_all();

        for key in 0u8..8 {
            prop_assert_eq!(all.get(&key).copied(), d.lookup(&key));
            prop_assert_eq!(all.contains_key(&key), d.contains_key(&key));
        }
        prop_assert_eq!(all.len(), d.len());
    }

    #[test]
    fn local_writes_match_a_reference_model(ops in vec(op(), 0..60)) {
        let d = build(&ops);

        // Reference: highest timestamp per key, later call wins a tie
        let mut adds: HashMap<u8, (u64, u16)> = HashMap::new();
        let mut removes: HashMap<u8, u64> = HashMap::new();
        for op in &ops {
            match *op {
                Op::Add { key, value, ts } => {
                    if adds.get(&key).map_or(true, |&(t, _)| t <= ts) {
                        adds.insert(key, (ts, value));
                    }
                }
                Op::Remove { key, ts } => {
                    if removes.get(&key).map_or(true, |&t| t <= ts) {
                        removes.insert(key, ts);
                    }
                }
            }
        }

        for key in 0u8..8 {
            let expected = adds.get(&key).and_then(|&(added_at, value)| {
                match removes.get(&key) {
                    Some(&removed_at) if removed_at >= added_at => None,
                    _ => Some(value),
                }
            });
            prop_assert_eq!(d.lookup(&key), expected);
        }
    }

    #[test]
    fn merge_order_does_not_matter(
        a_ops in vec(op(), 0..30),
        b_ops in vec(op(), 0..30),
        c_ops in vec(op(), 0..30),
    ) {
        let histories = with_unique_timestamps(vec![a_ops, b_ops, c_ops]);
        let a = build(&histories[0]);
        let b = build(&histories[1]);
        let c = build(&histories[2]);

        let abc = a.clone();
        abc.merge(&b);
        abc.merge(&c);

        let acb = a.clone();
        acb.merge(&c);
        acb.merge(&b);

        let grouped = a.clone();
        let bc = b.clone();
        bc.merge(&c);
        grouped.merge(&bc);

        prop_assert_eq!(&abc, &acb);
        prop_assert_eq!(&abc, &grouped);
    }

    #[test]
    fn delta_matches_full_merge(a_ops in vec(op(), 0..40), b_ops in vec(op(), 0..40)) {
        let a = build(&a_ops);
        let mut b = build(&b_ops);

        let full = b.clone();
        full.merge(&a);

        let delta = a.delta(&b);
        prop_assert!(delta.len() <= a.entry_count() + a.tombstone_count());
        b.apply_delta(&delta);

        prop_assert_eq!(&b, &full);
    }

    #[test]
    fn state_export_matches_merge(a_ops in vec(op(), 0..40), b_ops in vec(op(), 0..40)) {
        let a = build(&a_ops);
        let b = build(&b_ops);

        let via_state = b.clone();
        via_state.merge_state(&a.state());
        b.merge(&a);

        prop_assert_eq!(&via_state, &b);
    }
}
