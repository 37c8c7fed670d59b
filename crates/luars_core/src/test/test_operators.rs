// Tests for arithmetic, comparison and concatenation with tag-method fallbacks
use super::s;
use crate::*;

fn vector_mt(state: &mut LuaState) -> TableRef {
    let mt = state.create_table(0, 4);
    mt.raw_set(
        &s("__add"),
        LuaValue::native("add", |_, args| {
            // (table, number) or (number, table)
            let n = if args.arg1().is_table() { args.arg(2) } else { args.arg1() };
            Ok(Varargs::single(LuaValue::string(&format!("added {}", n))))
        }),
    )
    .unwrap();
    mt.raw_set(
        &s("__unm"),
        LuaValue::native("unm", |_, args| {
            assert_eq!(args.count(), 2);
            Ok(Varargs::single(s("negated")))
        }),
    )
    .unwrap();
    mt.raw_set(
        &s("__concat"),
        LuaValue::native("concat", |_, _| Ok(Varargs::single(s("joined")))),
    )
    .unwrap();
    mt
}

#[test]
fn test_arith_numbers_and_strings() {
    let mut state = LuaState::default();
    let i = LuaValue::integer;
    assert_eq!(state.arith(ArithOp::Add, &i(1), &i(2)).unwrap(), i(3));
    assert_eq!(state.arith(ArithOp::Div, &i(7), &i(2)).unwrap(), LuaValue::float(3.5));
    assert_eq!(state.arith(ArithOp::Mod, &i(-5), &i(3)).unwrap(), i(1));
    assert_eq!(state.arith(ArithOp::Pow, &i(2), &i(10)).unwrap(), LuaValue::float(1024.0));

    // numeric strings coerce
    assert_eq!(state.arith(ArithOp::Mul, &s("3"), &i(4)).unwrap(), i(12));
    assert_eq!(state.arith(ArithOp::Sub, &s("0x10"), &s("1.5")).unwrap(), LuaValue::float(14.5));
    assert_eq!(state.unm(&s("2")).unwrap(), i(-2));

    let err = state.arith(ArithOp::Add, &i(1), &s("abc")).unwrap_err();
    assert_eq!(err, LuaError::type_error("attempt to perform arithmetic on a string value"));
    let err = state.arith(ArithOp::Mod, &i(1), &i(0)).unwrap_err();
    assert_eq!(err.kind_name(), "RuntimeError");
}

#[test]
fn test_arith_metamethods() {
    let mut state = LuaState::default();
    let mt = vector_mt(&mut state);
    let v = LuaValue::table(state.create_table(0, 0));
    state.set_metatable(&v, Some(mt)).unwrap();

    assert_eq!(state.arith(ArithOp::Add, &v, &LuaValue::integer(1)).unwrap(), s("added 1"));
    // right operand's metatable is used when the left has none
    assert_eq!(state.arith(ArithOp::Add, &LuaValue::integer(2), &v).unwrap(), s("added 2"));
    assert_eq!(state.unm(&v).unwrap(), s("negated"));

    let err = state.arith(ArithOp::Sub, &v, &LuaValue::integer(1)).unwrap_err();
    assert_eq!(err, LuaError::type_error("attempt to perform arithmetic on a table value"));
    let plain = LuaValue::table(state.create_table(0, 0));
    let err = state.unm(&plain).unwrap_err();
    assert_eq!(err, LuaError::type_error("attempt to perform arithmetic on a table value"));
    let err = state.arith(ArithOp::Add, &LuaValue::integer(1), &LuaValue::nil()).unwrap_err();
    assert_eq!(err, LuaError::type_error("attempt to perform arithmetic on a nil value"));
}

#[test]
fn test_concat() {
    let mut state = LuaState::default();
    let mt = vector_mt(&mut state);
    let v = LuaValue::table(state.create_table(0, 0));
    state.set_metatable(&v, Some(mt)).unwrap();

    assert_eq!(state.concat(&s("a"), &LuaValue::integer(1)).unwrap(), s("a1"));
    assert_eq!(state.concat(&v, &s("x")).unwrap(), s("joined"));
    assert_eq!(state.concat(&s("x"), &v).unwrap(), s("joined"));
    assert_eq!(
        state.concat_all(&[s("<"), v.clone(), s(">")]).unwrap(),
        s("<joined")
    );

    let plain = LuaValue::table(state.create_table(0, 0));
    let err = state.concat(&s("x"), &plain).unwrap_err();
    assert_eq!(err, LuaError::type_error("attempt to concatenate a table value"));
}

#[test]
fn test_equality() {
    let mut state = LuaState::default();
    let a = LuaValue::table(state.create_table(0, 0));
    let b = LuaValue::table(state.create_table(0, 0));
    assert!(state.equals(&a, &a).unwrap());
    assert!(!state.equals(&a, &b).unwrap());
    assert!(state.equals(&LuaValue::integer(1), &LuaValue::float(1.0)).unwrap());
    assert!(!state.equals(&LuaValue::integer(1), &s("1")).unwrap());

    let mt = state.create_table(0, 0);
    mt.raw_set(
        &s("__eq"),
        LuaValue::native("eq", |_, _| Ok(Varargs::single(LuaValue::boolean(true)))),
    )
    .unwrap();
    state.set_metatable(&a, Some(mt.clone())).unwrap();
    assert!(state.equals(&a, &b).unwrap());
    assert!(state.equals(&b, &a).unwrap());

    // __eq is never consulted across types
    assert!(!state.equals(&a, &LuaValue::integer(1)).unwrap());
}

#[test]
fn test_ordering() {
    let mut state = LuaState::default();
    assert!(state.less_than(&LuaValue::integer(1), &LuaValue::float(1.5)).unwrap());
    assert!(state.less_equal(&LuaValue::float(2.0), &LuaValue::integer(2)).unwrap());
    assert!(state.less_than(&s("abc"), &s("abd")).unwrap());
    assert!(state.less_equal(&s(""), &s("a")).unwrap());
    assert!(!state.less_than(&s("b"), &s("a")).unwrap());

    let a = LuaValue::table(state.create_table(0, 0));
    let b = LuaValue::table(state.create_table(0, 0));
    let err = state.less_than(&a, &b).unwrap_err();
    assert_eq!(err, LuaError::type_error("attempt to compare two table values"));

    let mt = state.create_table(0, 0);
    mt.raw_set(
        &s("__lt"),
        LuaValue::native("lt", |_, _| Ok(Varargs::single(LuaValue::integer(0)))),
    )
    .unwrap();
    state.set_metatable(&b, Some(mt)).unwrap();
    // the result is converted with truthiness: 0 is true
    assert!(state.less_than(&a, &b).unwrap());
    // no __le: no fallback to __lt
    assert!(state.less_equal(&a, &b).is_err());
}
