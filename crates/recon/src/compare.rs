use serde_json::{Number, Value};

/// Structural equality between two extracted values. `None` is absence.
///
/// Absence only equals absence. Mappings compare by key set and recursively
/// by value; sequences by length and position. Values of different JSON
/// kinds are never equal.
pub fn values_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => deep_equal(a, b),
        _ => false,
    }
}

/// Recursive equality over present values.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(ma), Value::Object(mb)) => {
            ma.len() == mb.len()
                && ma
                    .iter()
                    .all(|(k, va)| mb.get(k).is_some_and(|vb| deep_equal(va, vb)))
        }
        (Value::Array(xa), Value::Array(xb)) => {
            xa.len() == xb.len() && xa.iter().zip(xb).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Number(na), Value::Number(nb)) => numbers_equal(na, nb),
        (Value::String(sa), Value::String(sb)) => sa == sb,
        (Value::Bool(ba), Value::Bool(bb)) => ba == bb,
        (Value::Null, Value::Null) => true,
        _ => false,
    }
}

/// Numeric equality independent of representation: `1` equals `1.0`.
///
/// Integers compare exactly. An integer against a float compares exactly too:
/// the float must be integral and in range, then both compare as integers.
/// Only float against float uses f64 equality.
pub fn numbers_equal(a: &Number, b: &Number) -> bool {
    match (a.is_f64(), b.is_f64()) {
        (false, false) => integers_equal(a, b),
        (true, true) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
        (true, false) => a.as_f64().is_some_and(|x| float_equals_integer(x, b)),
        (false, true) => b.as_f64().is_some_and(|y| float_equals_integer(y, a)),
    }
}

fn integers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    // One negative i64, one u64 above i64::MAX.
    false
}

// 2^63 and 2^64 are exact in f64.
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

fn float_equals_integer(x: f64, n: &Number) -> bool {
    if !x.is_finite() || x.fract() != 0.0 {
        return false;
    }
    if let Some(i) = n.as_i64() {
        return (-TWO_POW_63..TWO_POW_63).contains(&x) && x as i64 == i;
    }
    if let Some(u) = n.as_u64() {
        return (0.0..TWO_POW_64).contains(&x) && x as u64 == u;
    }
    false
}
