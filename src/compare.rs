//! Three-way comparison of things, dispatched on the declared type.
//!
//! A tree picks one [`Comparator`] for its keys and one for its values when
//! it is created. The same comparators order every insert, delete and range
//! bound for the lifetime of the tree.

use std::cmp::Ordering;

use crate::thing::{Thing, ThingString, TypeCode};

type CompareFn = fn(&Thing, &Thing) -> Ordering;

/// Comparison function bound to one declared type.
#[derive(Clone, Copy)]
pub struct Comparator {
    type_code: TypeCode,
    compare: CompareFn,
}

impl Comparator {
    pub fn for_type(type_code: TypeCode) -> Self {
        let compare: CompareFn = match type_code {
            TypeCode::Int32 => compare_int32,
            TypeCode::Int64 => compare_int64,
            TypeCode::Float32 => compare_float32,
            TypeCode::Float64 => compare_float64,
            TypeCode::String => compare_string,
        };
        Self { type_code, compare }
    }

    #[inline]
    pub fn type_code(&self) -> TypeCode {
        self.type_code
    }

    #[inline]
    pub fn compare(&self, a: &Thing, b: &Thing) -> Ordering {
        (self.compare)(a, b)
    }
}

impl std::fmt::Debug for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Comparator")
            .field("type_code", &self.type_code)
            .finish()
    }
}

// Things reaching a comparator have already been checked against the
// declared type. A mismatch still yields a consistent order (by type).
#[cold]
fn compare_mismatched(a: &Thing, b: &Thing) -> Ordering {
    let (ta, tb) = (a.type_code(), b.type_code());
    if ta == tb {
        Comparator::for_type(ta).compare(a, b)
    } else {
        ta.cmp(&tb)
    }
}

fn compare_int32(a: &Thing, b: &Thing) -> Ordering {
    match (a, b) {
        (Thing::Int32(a), Thing::Int32(b)) => a.cmp(b),
        _ => compare_mismatched(a, b),
    }
}

fn compare_int64(a: &Thing, b: &Thing) -> Ordering {
    match (a, b) {
        (Thing::Int64(a), Thing::Int64(b)) => a.cmp(b),
        _ => compare_mismatched(a, b),
    }
}

/// Sign of `a - b`. Zeroes of either sign are equal; NaN sorts above every
/// number and equal to other NaNs so the order stays total.
fn float_order<F: PartialOrd>(a: F, b: F, a_nan: bool, b_nan: bool) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a_nan.cmp(&b_nan))
}

fn compare_float32(a: &Thing, b: &Thing) -> Ordering {
    match (a, b) {
        (Thing::Float32(a), Thing::Float32(b)) => float_order(*a, *b, a.is_nan(), b.is_nan()),
        _ => compare_mismatched(a, b),
    }
}

fn compare_float64(a: &Thing, b: &Thing) -> Ordering {
    match (a, b) {
        (Thing::Float64(a), Thing::Float64(b)) => float_order(*a, *b, a.is_nan(), b.is_nan()),
        _ => compare_mismatched(a, b),
    }
}

fn compare_string(a: &Thing, b: &Thing) -> Ordering {
    match (a, b) {
        (Thing::String(a), Thing::String(b)) => compare_optional_strings(Some(a), Some(b)),
        _ => compare_mismatched(a, b),
    }
}

/// Byte-wise string order where an absent string sorts before every real
/// string, including the empty one.
pub fn compare_optional_strings(a: Option<&ThingString>, b: Option<&ThingString>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.cmp(b),
    }
}
