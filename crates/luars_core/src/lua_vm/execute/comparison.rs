/// Comparison operators `==`, `<`, `<=`
///
/// Numbers compare by mathematical value across subtypes, strings bytewise.
/// `__eq` is only tried for two distinct tables or two distinct userdata;
/// `__lt` / `__le` whenever the operands are not both numbers or both strings.
use crate::lua_value::LuaValue;
use crate::lua_vm::execute::metamethod::{TmKind, try_comp_tm, try_eq_tm};
use crate::lua_vm::{LuaError, LuaResult, LuaState};

// 2^63 as f64, the first float above every i64
const TWO_POW_63: f64 = 9223372036854775808.0;

pub fn equals(lua_state: &mut LuaState, a: &LuaValue, b: &LuaValue) -> LuaResult<bool> {
    if a.raw_equals(b) {
        return Ok(true);
    }
    match (a, b) {
        (LuaValue::Table(_), LuaValue::Table(_))
        | (LuaValue::Userdata(_), LuaValue::Userdata(_)) => {
            Ok(try_eq_tm(lua_state, a, b)?.unwrap_or(false))
        }
        _ => Ok(false),
    }
}

pub fn less_than(lua_state: &mut LuaState, a: &LuaValue, b: &LuaValue) -> LuaResult<bool> {
    if let Some(r) = num_less_than(a, b) {
        return Ok(r);
    }
    if let (LuaValue::String(x), LuaValue::String(y)) = (a, b) {
        return Ok(x.as_bytes() < y.as_bytes());
    }
    try_comp_tm(lua_state, a, b, TmKind::Lt)?.ok_or_else(|| order_error(a, b))
}

pub fn less_equal(lua_state: &mut LuaState, a: &LuaValue, b: &LuaValue) -> LuaResult<bool> {
    if let Some(r) = num_less_equal(a, b) {
        return Ok(r);
    }
    if let (LuaValue::String(x), LuaValue::String(y)) = (a, b) {
        return Ok(x.as_bytes() <= y.as_bytes());
    }
    try_comp_tm(lua_state, a, b, TmKind::Le)?.ok_or_else(|| order_error(a, b))
}

fn order_error(a: &LuaValue, b: &LuaValue) -> LuaError {
    let (t1, t2) = (a.type_name(), b.type_name());
    if t1 == t2 {
        LuaError::type_error(format!("attempt to compare two {} values", t1))
    } else {
        LuaError::type_error(format!("attempt to compare {} with {}", t1, t2))
    }
}

/// `a < b` for two numbers; `None` unless both are numbers.
pub fn num_less_than(a: &LuaValue, b: &LuaValue) -> Option<bool> {
    Some(match (a, b) {
        (LuaValue::Integer(i), LuaValue::Integer(j)) => i < j,
        (LuaValue::Float(x), LuaValue::Float(y)) => x < y,
        (LuaValue::Integer(i), LuaValue::Float(f)) => lt_int_float(*i, *f),
        (LuaValue::Float(f), LuaValue::Integer(i)) => lt_float_int(*f, *i),
        _ => return None,
    })
}

/// `a <= b` for two numbers; `None` unless both are numbers.
pub fn num_less_equal(a: &LuaValue, b: &LuaValue) -> Option<bool> {
    Some(match (a, b) {
        (LuaValue::Integer(i), LuaValue::Integer(j)) => i <= j,
        (LuaValue::Float(x), LuaValue::Float(y)) => x <= y,
        (LuaValue::Integer(i), LuaValue::Float(f)) => le_int_float(*i, *f),
        (LuaValue::Float(f), LuaValue::Integer(i)) => le_float_int(*f, *i),
        _ => return None,
    })
}

// Mixed comparisons go through floor/ceil of the float so large integers
// are not rounded by an int-to-float conversion.

fn lt_int_float(i: i64, f: f64) -> bool {
    if f.is_nan() {
        return false;
    }
    let c = f.ceil();
    if c >= TWO_POW_63 {
        true
    } else if c < -TWO_POW_63 {
        false
    } else {
        i < c as i64
    }
}

fn le_int_float(i: i64, f: f64) -> bool {
    if f.is_nan() {
        return false;
    }
    let fl = f.floor();
    if fl >= TWO_POW_63 {
        true
    } else if fl < -TWO_POW_63 {
        false
    } else {
        i <= fl as i64
    }
}

fn lt_float_int(f: f64, i: i64) -> bool {
    if f.is_nan() {
        return false;
    }
    let fl = f.floor();
    if fl >= TWO_POW_63 {
        false
    } else if fl < -TWO_POW_63 {
        true
    } else {
        (fl as i64) < i
    }
}

fn le_float_int(f: f64, i: i64) -> bool {
    if f.is_nan() {
        return false;
    }
    let c = f.ceil();
    if c >= TWO_POW_63 {
        false
    } else if c < -TWO_POW_63 {
        true
    } else {
        (c as i64) <= i
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_number_order() {
        let i = LuaValue::integer;
        let f = LuaValue::float;
        assert_eq!(num_less_than(&i(1), &f(1.5)), Some(true));
        assert_eq!(num_less_than(&f(1.5), &i(1)), Some(false));
        assert_eq!(num_less_equal(&i(2), &f(2.0)), Some(true));
        assert_eq!(num_less_equal(&f(2.5), &i(2)), Some(false));
        assert_eq!(num_less_than(&i(i64::MAX), &f(9.3e18)), Some(true));
        assert_eq!(num_less_than(&i(i64::MAX), &f(TWO_POW_63)), Some(true));
        assert_eq!(num_less_equal(&f(-1e300), &i(i64::MIN)), Some(true));
        assert_eq!(num_less_than(&i(0), &f(f64::NAN)), Some(false));
        assert_eq!(num_less_equal(&f(f64::NAN), &i(0)), Some(false));
        assert_eq!(num_less_than(&i(1), &LuaValue::string("2")), None);
    }

    #[test]
    fn test_order_errors() {
        let mut state = LuaState::default();
        let t = LuaValue::table(state.create_table(0, 0));
        let err = less_than(&mut state, &LuaValue::integer(1), &t).unwrap_err();
        assert_eq!(err, LuaError::type_error("attempt to compare number with table"));
        let err = less_equal(&mut state, &t, &t).unwrap_err();
        assert_eq!(err, LuaError::type_error("attempt to compare two table values"));
        // mixed string / number is not coerced
        assert!(less_than(&mut state, &LuaValue::string("1"), &LuaValue::integer(2)).is_err());
    }
}
