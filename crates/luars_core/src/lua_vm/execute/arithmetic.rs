/// Arithmetic operators
///
/// Integer add/sub/mul wrap around, `/` and `^` always produce floats, `%`
/// is floored. Numeric strings are coerced; everything else goes through
/// the tag method of the operator.
use crate::lua_value::LuaValue;
use crate::lua_vm::execute::metamethod::{TmKind, try_bin_tm, try_unary_tm};
use crate::lua_vm::{LuaError, LuaResult, LuaState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl ArithOp {
    pub const fn tm(self) -> TmKind {
        match self {
            ArithOp::Add => TmKind::Add,
            ArithOp::Sub => TmKind::Sub,
            ArithOp::Mul => TmKind::Mul,
            ArithOp::Div => TmKind::Div,
            ArithOp::Mod => TmKind::Mod,
            ArithOp::Pow => TmKind::Pow,
        }
    }
}

/// `a op b` with coercion and tag-method fallback.
pub fn arith(
    lua_state: &mut LuaState,
    op: ArithOp,
    a: &LuaValue,
    b: &LuaValue,
) -> LuaResult<LuaValue> {
    if let (Some(x), Some(y)) = (a.to_number(), b.to_number()) {
        return raw_arith(op, &x, &y);
    }
    try_bin_tm(lua_state, a, b, op.tm())
}

/// Unary minus with coercion and `__unm` fallback.
pub fn unm(lua_state: &mut LuaState, a: &LuaValue) -> LuaResult<LuaValue> {
    match a.to_number() {
        Some(LuaValue::Integer(i)) => Ok(LuaValue::Integer(i.wrapping_neg())),
        Some(LuaValue::Float(n)) => Ok(LuaValue::Float(-n)),
        _ => try_unary_tm(lua_state, a, TmKind::Unm),
    }
}

/// Arithmetic on two numbers.
pub fn raw_arith(op: ArithOp, x: &LuaValue, y: &LuaValue) -> LuaResult<LuaValue> {
    if let (LuaValue::Integer(i), LuaValue::Integer(j)) = (x, y) {
        let (i, j) = (*i, *j);
        match op {
            ArithOp::Add => return Ok(LuaValue::Integer(i.wrapping_add(j))),
            ArithOp::Sub => return Ok(LuaValue::Integer(i.wrapping_sub(j))),
            ArithOp::Mul => return Ok(LuaValue::Integer(i.wrapping_mul(j))),
            ArithOp::Mod => return int_mod(i, j).map(LuaValue::Integer),
            ArithOp::Div | ArithOp::Pow => {}
        }
    }

    let (a, b) = (number_of(x)?, number_of(y)?);
    Ok(LuaValue::Float(match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::Div => a / b,
        ArithOp::Pow => a.powf(b),
        ArithOp::Mod => float_mod(a, b),
    }))
}

fn number_of(v: &LuaValue) -> LuaResult<f64> {
    match v {
        LuaValue::Integer(i) => Ok(*i as f64),
        LuaValue::Float(n) => Ok(*n),
        _ => Err(LuaError::type_error(format!(
            "attempt to perform arithmetic on a {} value",
            v.type_name()
        ))),
    }
}

/// Floored integer modulo.
pub fn int_mod(a: i64, b: i64) -> LuaResult<i64> {
    if b == 0 {
        return Err(LuaError::runtime_error("attempt to perform 'n%%0'"));
    }
    // wrapping_rem handles i64::MIN % -1
    let r = a.wrapping_rem(b);
    if r != 0 && (r ^ b) < 0 {
        Ok(r + b)
    } else {
        Ok(r)
    }
}

/// Floored float modulo: the result takes the sign of the divisor.
pub fn float_mod(a: f64, b: f64) -> f64 {
    let m = a % b;
    if (m > 0.0 && b < 0.0) || (m < 0.0 && b > 0.0) {
        m + b
    } else {
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_ops() {
        let i = LuaValue::integer;
        assert_eq!(raw_arith(ArithOp::Add, &i(2), &i(3)).unwrap(), i(5));
        assert!(raw_arith(ArithOp::Add, &i(2), &i(3)).unwrap().is_integer());
        assert_eq!(
            raw_arith(ArithOp::Add, &i(i64::MAX), &i(1)).unwrap(),
            i(i64::MIN)
        );
        assert!(raw_arith(ArithOp::Div, &i(6), &i(3)).unwrap().is_float());
        assert!(raw_arith(ArithOp::Pow, &i(2), &i(3)).unwrap().is_float());
    }

    #[test]
    fn test_floored_mod() {
        assert_eq!(int_mod(7, 3), Ok(1));
        assert_eq!(int_mod(-7, 3), Ok(2));
        assert_eq!(int_mod(7, -3), Ok(-2));
        assert_eq!(int_mod(i64::MIN, -1), Ok(0));
        assert!(int_mod(1, 0).is_err());
        assert_eq!(float_mod(-7.0, 3.0), 2.0);
        assert_eq!(float_mod(7.0, -3.0), -2.0);
        assert!(float_mod(1.0, 0.0).is_nan());
    }

    #[test]
    fn test_mixed_promotes_to_float() {
        let r = raw_arith(ArithOp::Mul, &LuaValue::integer(2), &LuaValue::float(1.5)).unwrap();
        assert_eq!(r, LuaValue::float(3.0));
        assert!(r.is_float());
    }
}
