use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeSet;

fn validate_tree(t: &DupTree) {
    let issues = t.verify_integrity();
    assert!(issues.is_empty(), "integrity violations: {issues:#?}");
}

#[derive(Arbitrary, Clone, Copy, Debug)]
struct Bound {
    #[proptest(strategy = "-2..26i32")]
    key: i32,
    #[proptest(strategy = "proptest::option::of(0..6i32)")]
    value: Option<i32>,
    inclusive: bool,
}

impl Bound {
    fn admits_from_below(&self, entry: (i32, i32)) -> bool {
        match self.value {
            None => entry.0 >= self.key,
            Some(v) => entry > (self.key, v) || (self.inclusive && entry == (self.key, v)),
        }
    }

    fn admits_from_above(&self, entry: (i32, i32)) -> bool {
        match self.value {
            None => entry.0 <= self.key,
            Some(v) => entry < (self.key, v) || (self.inclusive && entry == (self.key, v)),
        }
    }
}

/// A bound with its things materialised so an `Endpoint` can borrow them.
struct OwnedBound {
    key: Thing,
    value: Option<Thing>,
    inclusive: bool,
}

impl OwnedBound {
    fn new(b: &Bound) -> Self {
        Self {
            key: Thing::Int32(b.key),
            value: b.value.map(Thing::Int32),
            inclusive: b.inclusive,
        }
    }

    fn endpoint(&self) -> Endpoint<'_> {
        Endpoint {
            key: &self.key,
            value: self.value.as_ref(),
            inclusive: self.inclusive,
        }
    }
}

#[derive(Arbitrary, Clone, Debug)]
enum Op {
    Add(
        #[proptest(strategy = "0..24i32")] i32,
        #[proptest(strategy = "0..6i32")] i32,
    ),
    Delete(
        #[proptest(strategy = "0..24i32")] i32,
        #[proptest(strategy = "0..6i32")] i32,
    ),
    Range(Option<Bound>, Option<Bound>),
    Neighbours(#[proptest(strategy = "-2..26i32")] i32),
}

fn range_of(t: &DupTree, low: Option<&Bound>, high: Option<&Bound>) -> Vec<(i32, i32)> {
    let low = low.map(OwnedBound::new);
    let high = high.map(OwnedBound::new);
    let mut got = Vec::new();
    let outcome = t
        .iterate(
            low.as_ref().map(OwnedBound::endpoint),
            high.as_ref().map(OwnedBound::endpoint),
            |k, v| {
                got.push((k.as_i32().unwrap(), v.as_i32().unwrap()));
                ControlFlow::Continue(())
            },
        )
        .unwrap();
    assert_eq!(outcome, Traversal::Completed);
    got
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(any::<Op>(), 0..=600)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_int_entries(ops in ops_strategy()) {
        let mut t = DupTree::new(TypeCode::Int32, TypeCode::Int32, None);
        let mut m: BTreeSet<(i32, i32)> = BTreeSet::new();

        for op in ops {
            match op {
                Op::Add(k, v) => {
                    let added = t.add(&Thing::Int32(k), &Thing::Int32(v)).unwrap();
                    prop_assert_eq!(added, m.insert((k, v)));
                }
                Op::Delete(k, v) => {
                    let removed = t.delete(&Thing::Int32(k), &Thing::Int32(v)).unwrap();
                    prop_assert_eq!(removed, m.remove(&(k, v)));
                }
                Op::Range(low, high) => {
                    let got = range_of(&t, low.as_ref(), high.as_ref());
                    let expected: Vec<(i32, i32)> = m
                        .iter()
                        .copied()
                        .filter(|&e| low.map_or(true, |b| b.admits_from_below(e)))
                        .filter(|&e| high.map_or(true, |b| b.admits_from_above(e)))
                        .collect();
                    prop_assert_eq!(got, expected);
                }
                Op::Neighbours(k) => {
                    let key = Thing::Int32(k);
                    let larger = t.next_larger_key(&key).unwrap().and_then(Thing::as_i32);
                    let smaller = t.next_smaller_key(&key).unwrap().and_then(Thing::as_i32);
                    prop_assert_eq!(larger, m.iter().map(|e| e.0).find(|&x| x > k));
                    prop_assert_eq!(smaller, m.iter().rev().map(|e| e.0).find(|&x| x < k));
                    let values: Vec<i32> = t
                        .values_for_key(&key)
                        .unwrap()
                        .iter()
                        .filter_map(Thing::as_i32)
                        .collect();
                    let expected: Vec<i32> = m.range((k, i32::MIN)..=(k, i32::MAX)).map(|e| e.1).collect();
                    prop_assert_eq!(values, expected);
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        validate_tree(&t);
        prop_assert_eq!(range_of(&t, None, None), m.iter().copied().collect::<Vec<_>>());
        prop_assert_eq!(
            t.first().map(|(k, v)| (k.as_i32().unwrap(), v.as_i32().unwrap())),
            m.first().copied()
        );
        prop_assert_eq!(
            t.last().map(|(k, v)| (k.as_i32().unwrap(), v.as_i32().unwrap())),
            m.last().copied()
        );
    }

    #[test]
    fn prop_equivalence_string_keys(
        entries in prop::collection::vec(("[a-c]{0,10}", -3i64..3, any::<bool>()), 0..=300)
    ) {
        let mut t = DupTree::new(TypeCode::String, TypeCode::Int64, None);
        let mut m: BTreeSet<(String, i64)> = BTreeSet::new();

        for (key, value, is_add) in entries {
            let k = Thing::from(key.as_str());
            let v = Thing::Int64(value);
            if is_add {
                prop_assert_eq!(t.add(&k, &v).unwrap(), m.insert((key, value)));
            } else {
                prop_assert_eq!(t.delete(&k, &v).unwrap(), m.remove(&(key, value)));
            }
        }

        validate_tree(&t);
        let mut got = Vec::new();
        t.iterate(None, None, |k, v| {
            got.push((k.as_str().unwrap().to_string(), v.as_i64().unwrap()));
            ControlFlow::Continue(())
        })
        .unwrap();
        prop_assert_eq!(got, m.into_iter().collect::<Vec<_>>());
    }
}

fn text_thing_strategy() -> impl Strategy<Value = Thing> {
    prop_oneof![
        any::<i32>().prop_map(Thing::Int32),
        any::<i64>().prop_map(Thing::Int64),
        any::<f32>().prop_filter("NaN never equals itself", |v| !v.is_nan()).prop_map(Thing::Float32),
        any::<f64>().prop_filter("NaN never equals itself", |v| !v.is_nan()).prop_map(Thing::Float64),
        "\\PC{0,24}".prop_map(Thing::from),
    ]
}

proptest! {
    #[test]
    fn prop_text_round_trip(thing in text_thing_strategy()) {
        let t = thing.type_code();
        // Large enough that strings are never clipped.
        let capacity = min_text_capacity(t).max(thing.as_str().map_or(0, str::len));
        let text = thing.to_text(t, capacity).unwrap();
        prop_assert!(text.len() <= capacity, "{:?} exceeds {}", text, capacity);
        prop_assert_eq!(Thing::parse(&text, t).unwrap(), thing);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

const SMALL_SET: [(i32, i32); 7] = [(1, 1), (1, 2), (2, 1), (3, 3), (3, 1), (0, 9), (1, 0)];

#[test]
fn exhaustive_insert_order_small_set() {
    let mut expected = SMALL_SET.to_vec();
    expected.sort();

    for_each_permutation(&SMALL_SET, |perm| {
        let mut t = DupTree::new(TypeCode::Int32, TypeCode::Int32, None);
        for (k, v) in perm {
            assert!(t.add(&Thing::Int32(k), &Thing::Int32(v)).unwrap());
        }
        validate_tree(&t);
        assert_eq!(range_of(&t, None, None), expected);
        assert!(t.height() <= 4);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    for_each_permutation(&SMALL_SET, |perm| {
        let mut t = DupTree::new(TypeCode::Int32, TypeCode::Int32, None);
        let mut m: BTreeSet<(i32, i32)> = BTreeSet::new();
        for &(k, v) in &SMALL_SET {
            t.add(&Thing::Int32(k), &Thing::Int32(v)).unwrap();
            m.insert((k, v));
        }

        for (k, v) in perm {
            assert!(t.delete(&Thing::Int32(k), &Thing::Int32(v)).unwrap());
            m.remove(&(k, v));
            assert_eq!(t.len(), m.len());
            validate_tree(&t);
            assert_eq!(range_of(&t, None, None), m.iter().copied().collect::<Vec<_>>());
        }
        assert!(t.is_empty());
        assert_eq!(t.height(), 0);
    });
}
