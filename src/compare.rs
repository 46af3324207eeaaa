//! A cycle-safe structural equality comparator for [`Value`] graphs, mostly
//! useful in tests that need to assert a decoded graph matches the one that
//! was encoded (handle identity is necessarily different after a round
//! trip, so `==` on the graph itself isn't available).
//!
//! This fixes two bugs flagged in the format's original comparator: it
//! tracks already-visited handle pairs per call (not in a shared/global
//! table, which would leak state and miscompare unrelated calls), and it
//! actually returns `false` on a mismatch instead of unconditionally `true`.

use std::collections::HashSet;
use std::rc::Rc;

use crate::value::Value;

/// True if `a` and `b` describe the same value graph. Numbers compare with
/// `NaN` equal to itself and `+0`/`-0` distinguished, matching this crate's
/// interning semantics (see [`crate::refs`]). Cyclic graphs are handled: a
/// handle pair seen earlier in the same comparison is assumed equal rather
/// than re-walked, which is exactly what lets a pair of isomorphic cyclic
/// graphs compare equal instead of looping forever.
#[must_use]
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    let mut seen = HashSet::new();
    inner(a, b, &mut seen)
}

fn numbers_equal(x: f64, y: f64) -> bool {
    if x.is_nan() && y.is_nan() {
        return true;
    }
    x.to_bits() == y.to_bits()
}

fn handle_pair<T>(a: &Rc<std::cell::RefCell<T>>, b: &Rc<std::cell::RefCell<T>>) -> (usize, usize) {
    (Rc::as_ptr(a) as usize, Rc::as_ptr(b) as usize)
}

/// Marks `pair` visited and returns `true` if it was already visited
/// (callers should treat that as "assume equal and stop recursing").
fn enter(seen: &mut HashSet<(usize, usize)>, pair: (usize, usize)) -> bool {
    if pair.0 == pair.1 || seen.contains(&pair) || seen.contains(&(pair.1, pair.0)) {
        return true;
    }
    seen.insert(pair);
    false
}

fn inner(a: &Value, b: &Value, seen: &mut HashSet<(usize, usize)>) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => numbers_equal(*x, *y),
        (Value::BigInt(x), Value::BigInt(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Symbol(x), Value::Symbol(y)) => x == y,
        (Value::Timestamp(x), Value::Timestamp(y)) => x == y,
        (Value::Function(x), Value::Function(y)) => x.name == y.name && x.source == y.source,
        (Value::Object(ha), Value::Object(hb)) => {
            if enter(seen, handle_pair(ha, hb)) {
                return true;
            }
            let (da, db) = (ha.borrow(), hb.borrow());
            da.accessibility == db.accessibility
                && da.entries.len() == db.entries.len()
                && da.entries.iter().zip(db.entries.iter()).all(|((ka, ea), (kb, eb))| {
                    ka == kb && ea.descriptor == eb.descriptor && inner(&ea.value, &eb.value, seen)
                })
        }
        (Value::Array(ha), Value::Array(hb)) => {
            if enter(seen, handle_pair(ha, hb)) {
                return true;
            }
            let (da, db) = (ha.borrow(), hb.borrow());
            da.accessibility == db.accessibility
                && da.elements.len() == db.elements.len()
                && da.elements.iter().zip(db.elements.iter()).all(|(ea, eb)| {
                    ea.descriptor == eb.descriptor && inner(&ea.value, &eb.value, seen)
                })
        }
        (Value::Mapping(ha), Value::Mapping(hb)) => {
            if enter(seen, handle_pair(ha, hb)) {
                return true;
            }
            let (da, db) = (ha.borrow(), hb.borrow());
            da.accessibility == db.accessibility
                && da.entries.len() == db.entries.len()
                && da.entries.iter().zip(db.entries.iter()).all(|((ka, ea), (kb, eb))| {
                    inner(ka, kb, seen) && ea.descriptor == eb.descriptor && inner(&ea.value, &eb.value, seen)
                })
        }
        (Value::Set(ha), Value::Set(hb)) => {
            if enter(seen, handle_pair(ha, hb)) {
                return true;
            }
            let (da, db) = (ha.borrow(), hb.borrow());
            da.accessibility == db.accessibility
                && da.elements.len() == db.elements.len()
                && da.elements.iter().zip(db.elements.iter()).all(|(ea, eb)| {
                    ea.descriptor == eb.descriptor && inner(&ea.value, &eb.value, seen)
                })
        }
        (Value::Custom(ha), Value::Custom(hb)) => {
            if enter(seen, handle_pair(ha, hb)) {
                return true;
            }
            let (da, db) = (ha.borrow(), hb.borrow());
            da.class_name == db.class_name
                && da.accessibility == db.accessibility
                && da.entries.len() == db.entries.len()
                && da.entries.iter().zip(db.entries.iter()).all(|((ka, ea), (kb, eb))| {
                    ka == kb && ea.descriptor == eb.descriptor && inner(&ea.value, &eb.value, seen)
                })
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::PropertyDescriptorFlags;
    use crate::value::PropertyEntry;
    use crate::value::PropertyKey;

    #[test]
    fn equal_primitives_compare_equal() {
        assert!(deep_equal(&Value::Number(1.0), &Value::Number(1.0)));
        assert!(deep_equal(&Value::String("a".into()), &Value::String("a".into())));
    }

    #[test]
    fn nan_is_equal_to_itself() {
        assert!(deep_equal(&Value::Number(f64::NAN), &Value::Number(f64::NAN)));
    }

    #[test]
    fn signed_zero_is_distinguished() {
        assert!(!deep_equal(&Value::Number(0.0), &Value::Number(-0.0)));
    }

    #[test]
    fn mismatched_variants_are_unequal() {
        assert!(!deep_equal(&Value::Null, &Value::Undefined));
        assert!(!deep_equal(&Value::Bool(true), &Value::Number(1.0)));
    }

    #[test]
    fn mismatched_object_entries_are_unequal() {
        let a = Value::object();
        let b = Value::object();
        if let Value::Object(h) = &a {
            h.borrow_mut().entries.push((
                PropertyKey::String("x".into()),
                PropertyEntry::new(Value::Number(1.0), PropertyDescriptorFlags::ENUMERABLE),
            ));
        }
        if let Value::Object(h) = &b {
            h.borrow_mut().entries.push((
                PropertyKey::String("x".into()),
                PropertyEntry::new(Value::Number(2.0), PropertyDescriptorFlags::ENUMERABLE),
            ));
        }
        assert!(!deep_equal(&a, &b));
    }

    #[test]
    fn isomorphic_cycles_compare_equal_without_looping() {
        let a = Value::object();
        if let Value::Object(h) = &a {
            h.borrow_mut().entries.push((
                PropertyKey::String("self".into()),
                PropertyEntry::new(a.clone(), PropertyDescriptorFlags::ENUMERABLE),
            ));
        }
        let b = Value::object();
        if let Value::Object(h) = &b {
            h.borrow_mut().entries.push((
                PropertyKey::String("self".into()),
                PropertyEntry::new(b.clone(), PropertyDescriptorFlags::ENUMERABLE),
            ));
        }
        assert!(deep_equal(&a, &b));
    }

    #[test]
    fn repeated_calls_do_not_leak_state_between_each_other() {
        let a = Value::object();
        let b = Value::object();
        assert!(deep_equal(&a, &a.clone()));
        // an unrelated pair that happens to reuse no state from the call above
        assert!(!deep_equal(&a, &b));
    }
}
