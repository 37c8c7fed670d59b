// Tests for the value model: tags, equality, display, coercion, varargs
use super::s;
use crate::*;

#[test]
fn test_type_tag_constants() {
    assert_eq!(LuaType::Nil.code(), 0);
    assert_eq!(LuaType::Boolean.code(), 1);
    assert_eq!(LuaType::LightUserdata.code(), 2);
    assert_eq!(LuaType::Number.code(), 3);
    assert_eq!(LuaType::String.code(), 4);
    assert_eq!(LuaType::Table.code(), 5);
    assert_eq!(LuaType::Function.code(), 6);
    assert_eq!(LuaType::Userdata.code(), 7);
    assert_eq!(LuaType::Thread.code(), 8);
    assert_eq!(LuaType::Value.code(), 9);
    assert_eq!(LuaType::None.code(), -1);
    assert_eq!(LuaType::Int.code(), -2);
    for code in -2..=9 {
        assert_eq!(LuaType::from_code(code).map(LuaType::code), Some(code));
    }
    assert_eq!(LuaType::from_code(10), None);
}

#[test]
fn test_raw_equality() {
    let mut state = LuaState::default();
    let a = LuaValue::table(state.create_table(0, 0));
    let b = LuaValue::table(state.create_table(0, 0));
    assert!(!a.raw_equals(&b));
    assert!(a.raw_equals(&a.clone()));
    assert!(LuaValue::integer(1).raw_equals(&LuaValue::float(1.0)));
    assert!(!LuaValue::integer(1).raw_equals(&LuaValue::float(1.5)));
    assert!(s("abc").raw_equals(&LuaValue::bytes(b"abc".to_vec())));
    assert!(!s("1").raw_equals(&LuaValue::integer(1)));
    assert!(!LuaValue::float(f64::NAN).raw_equals(&LuaValue::float(f64::NAN)));

    let f = LuaValue::native("f", |_, _| Ok(Varargs::none()));
    let g = LuaValue::native("f", |_, _| Ok(Varargs::none()));
    assert!(f.raw_equals(&f.clone()));
    assert!(!f.raw_equals(&g));
}

#[test]
fn test_equal_numbers_share_a_key() {
    let t = TableRef::new(0, 0);
    t.raw_set(&LuaValue::float(7.0), s("seven")).unwrap();
    assert_eq!(t.raw_get(&LuaValue::integer(7)), s("seven"));
    t.raw_set(&LuaValue::integer(1 << 40), s("big")).unwrap();
    assert_eq!(t.raw_get(&LuaValue::float((1u64 << 40) as f64)), s("big"));
    assert_eq!(t.key_count(), 2);
}

#[test]
fn test_display_strings() {
    assert_eq!(LuaValue::nil().to_display_string(), "nil");
    assert_eq!(LuaValue::boolean(true).to_display_string(), "true");
    assert_eq!(LuaValue::boolean(false).to_display_string(), "false");
    assert_eq!(LuaValue::integer(-42).to_display_string(), "-42");
    assert_eq!(LuaValue::float(3.25).to_display_string(), "3.25");
    assert_eq!(LuaValue::float(1e100).to_display_string(), "1e+100");
    assert_eq!(LuaValue::float(2.0).to_display_string(), "2");
    assert_eq!(s("text").to_display_string(), "text");

    let t = LuaValue::table(TableRef::new(0, 0));
    assert!(t.to_display_string().starts_with("table: 0x"));
    let f = LuaValue::native("f", |_, _| Ok(Varargs::none()));
    assert!(f.to_display_string().starts_with("function: 0x"));
}

#[test]
fn test_coercion() {
    assert_eq!(LuaValue::integer(3).to_float(), Ok(3.0));
    assert_eq!(s(" 10 ").to_long(), Ok(10));
    assert_eq!(s("2.5").to_float(), Ok(2.5));
    assert_eq!(LuaValue::float(2.9).to_long(), Ok(2));
    assert_eq!(LuaValue::float(-2.9).to_int(), Ok(-2));
    assert_eq!(s("0x1p4").to_float(), Ok(16.0));

    let err = s("abc").to_float().unwrap_err();
    assert_eq!(err, LuaError::type_error("number expected, got string"));
    let err = LuaValue::boolean(true).to_long().unwrap_err();
    assert_eq!(err, LuaError::type_error("number expected, got boolean"));
    assert!(LuaValue::integer(1 << 40).to_int().is_err());
    assert!(LuaValue::float(f64::INFINITY).to_long().is_err());
    let err = LuaValue::float(1e30).to_long().unwrap_err();
    assert_eq!(err, LuaError::type_error("number has no integer representation"));
    assert!(LuaValue::float(-9.3e18).to_int().is_err());
}

#[test]
fn test_truthiness_and_kinds() {
    assert!(LuaValue::nil().is_falsy());
    assert!(LuaValue::boolean(false).is_falsy());
    assert!(LuaValue::integer(0).is_truthy());
    assert!(s("").is_truthy());
    assert_eq!(LuaValue::integer(1).type_name(), "number");
    assert_eq!(LuaValue::float(1.0).type_name(), "number");
    assert_eq!(LuaValue::integer(1).subtype_tag(), LuaType::Int);
    assert_eq!(LuaValue::float(1.0).subtype_tag(), LuaType::Number);
    assert_eq!(
        LuaValue::thread(crate::lua_value::LuaThread::new(())).type_tag(),
        LuaType::Thread
    );
}

#[test]
fn test_varargs_none() {
    let none = Varargs::none();
    assert_eq!(none.count(), 0);
    assert!(none.arg1().is_nil());
    assert_eq!(none.type_at(1), LuaType::None);
    assert_eq!(none.to_string(), "none");

    let one = Varargs::single(LuaValue::nil());
    assert_eq!(one.count(), 1);
    assert_eq!(one.type_at(1), LuaType::Nil);
    assert_ne!(one.to_string(), none.to_string());
}
