// Tests for FromLua / IntoLua
use super::s;
use crate::*;

#[test]
fn test_scalars() {
    let mut state = LuaState::default();
    assert_eq!(42i32.into_lua(&mut state).unwrap(), LuaValue::integer(42));
    assert_eq!(1.5f64.into_lua(&mut state).unwrap(), LuaValue::float(1.5));
    assert_eq!(true.into_lua(&mut state).unwrap(), LuaValue::boolean(true));
    assert_eq!("hi".into_lua(&mut state).unwrap(), s("hi"));
    assert!(().into_lua(&mut state).unwrap().is_nil());

    assert_eq!(i64::from_lua(s("12"), &state).unwrap(), 12);
    assert_eq!(f64::from_lua(LuaValue::integer(3), &state).unwrap(), 3.0);
    assert_eq!(String::from_lua(LuaValue::integer(7), &state).unwrap(), "7");
    assert_eq!(String::from_lua(LuaValue::float(0.5), &state).unwrap(), "0.5");
    assert!(bool::from_lua(LuaValue::integer(0), &state).unwrap());
    assert!(!bool::from_lua(LuaValue::nil(), &state).unwrap());
}

#[test]
fn test_conversion_errors() {
    let state = LuaState::default();
    let err = i8::from_lua(LuaValue::integer(300), &state).unwrap_err();
    assert_eq!(err, LuaError::type_error("number 300 has no representation as i8"));
    let err = u32::from_lua(LuaValue::integer(-1), &state).unwrap_err();
    assert_eq!(err.kind_name(), "TypeError");
    let err = String::from_lua(LuaValue::boolean(false), &state).unwrap_err();
    assert_eq!(err, LuaError::type_error("string expected, got boolean"));
    let err = Vec::<i64>::from_lua(LuaValue::integer(1), &state).unwrap_err();
    assert_eq!(err, LuaError::type_error("table expected, got number"));
}

#[test]
fn test_option() {
    let mut state = LuaState::default();
    assert_eq!(Option::<i64>::from_lua(LuaValue::nil(), &state).unwrap(), None);
    assert_eq!(Option::<i64>::from_lua(LuaValue::integer(5), &state).unwrap(), Some(5));
    assert!(Option::<i64>::from_lua(s("x"), &state).is_err());
    assert!(None::<i64>.into_lua(&mut state).unwrap().is_nil());
    assert_eq!(Some("v").into_lua(&mut state).unwrap(), s("v"));
}

#[test]
fn test_vec_tables() {
    let mut state = LuaState::default();
    let value = vec![10i64, 20, 30].into_lua(&mut state).unwrap();
    let table = value.as_table().unwrap();
    assert_eq!(table.length(), 3);
    assert_eq!(table.get_int(2), LuaValue::integer(20));
    assert_eq!(Vec::<i64>::from_lua(value.clone(), &state).unwrap(), vec![10, 20, 30]);

    let nested = vec![vec!["a".to_string()], vec![]].into_lua(&mut state).unwrap();
    let back = Vec::<Vec<String>>::from_lua(nested, &state).unwrap();
    assert_eq!(back, vec![vec!["a".to_string()], vec![]]);

    // elements stop at the border
    let t = state.create_table(0, 0);
    t.set_int(1, LuaValue::integer(1));
    t.set_int(3, LuaValue::integer(3));
    assert_eq!(Vec::<i64>::from_lua(LuaValue::table(t), &state).unwrap(), vec![1]);
}
