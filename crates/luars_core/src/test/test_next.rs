// Tests for the traversal protocol
use super::s;
use crate::*;

fn key_after(t: &TableRef, key: LuaValue) -> Option<LuaValue> {
    t.next(&key).unwrap().map(|(k, _)| k)
}

fn value_after(t: &TableRef, key: LuaValue) -> Option<LuaValue> {
    t.next(&key).unwrap().map(|(_, v)| v)
}

#[test]
fn test_next() {
    let t = TableRef::new(0, 0);
    assert_eq!(t.next(&LuaValue::nil()).unwrap(), None);

    // insert array elements
    t.set_int(1, s("one"));
    assert_eq!(key_after(&t, LuaValue::nil()), Some(LuaValue::integer(1)));
    assert_eq!(value_after(&t, LuaValue::nil()), Some(s("one")));
    assert_eq!(t.next(&LuaValue::integer(1)).unwrap(), None);
    t.set_int(2, s("two"));
    assert_eq!(key_after(&t, LuaValue::nil()), Some(LuaValue::integer(1)));
    assert_eq!(key_after(&t, LuaValue::integer(1)), Some(LuaValue::integer(2)));
    assert_eq!(value_after(&t, LuaValue::integer(1)), Some(s("two")));
    assert_eq!(t.next(&LuaValue::integer(2)).unwrap(), None);

    // insert hash elements
    t.raw_set(&s("aa"), s("aaa")).unwrap();
    assert_eq!(key_after(&t, LuaValue::integer(2)), Some(s("aa")));
    assert_eq!(value_after(&t, LuaValue::integer(2)), Some(s("aaa")));
    assert_eq!(t.next(&s("aa")).unwrap(), None);
    t.raw_set(&s("bb"), s("bbb")).unwrap();
    assert_eq!(key_after(&t, LuaValue::nil()), Some(LuaValue::integer(1)));
    assert_eq!(key_after(&t, LuaValue::integer(1)), Some(LuaValue::integer(2)));
    assert_eq!(key_after(&t, LuaValue::integer(2)), Some(s("aa")));
    assert_eq!(key_after(&t, s("aa")), Some(s("bb")));
    assert_eq!(value_after(&t, s("aa")), Some(s("bbb")));
    assert_eq!(t.next(&s("bb")).unwrap(), None);
}

#[test]
fn test_full_traversal_order() {
    let t = TableRef::new(0, 0);
    t.set_int(1, s("v1"));
    t.set_int(2, s("v2"));
    t.raw_set(&s("aa"), s("va")).unwrap();
    t.raw_set(&s("bb"), s("vb")).unwrap();

    let mut seen = Vec::new();
    let mut key = LuaValue::nil();
    while let Some((k, v)) = t.next(&key).unwrap() {
        seen.push((k.clone(), v));
        key = k;
    }
    assert_eq!(
        seen,
        vec![
            (LuaValue::integer(1), s("v1")),
            (LuaValue::integer(2), s("v2")),
            (s("aa"), s("va")),
            (s("bb"), s("vb")),
        ]
    );
    assert_eq!(seen, t.pairs());
}

#[test]
fn test_skips_array_holes() {
    let t = TableRef::new(0, 0);
    for i in 1..=4 {
        t.set_int(i, LuaValue::integer(i));
    }
    t.set_int(2, LuaValue::nil());
    t.set_int(3, LuaValue::nil());
    assert_eq!(key_after(&t, LuaValue::integer(1)), Some(LuaValue::integer(4)));
    // a float key naming an array slot is accepted
    assert_eq!(key_after(&t, LuaValue::float(1.0)), Some(LuaValue::integer(4)));
}

#[test]
fn test_invalid_key() {
    let t = TableRef::new(0, 0);
    t.raw_set(&s("present"), LuaValue::boolean(true)).unwrap();
    let err = t.next(&s("absent")).unwrap_err();
    assert_eq!(err, LuaError::runtime_error("invalid key to 'next'"));
    assert_eq!(err.kind_name(), "RuntimeError");
    assert!(t.next(&LuaValue::integer(7)).is_err());
    assert!(t.next(&LuaValue::float(f64::NAN)).is_err());
}

#[test]
fn test_remove_during_traversal() {
    let t = TableRef::new(0, 0);
    for i in 1..=10 {
        t.set_int(i, LuaValue::integer(i));
    }
    for i in 0..30 {
        t.raw_set(&s(&format!("k{}", i)), LuaValue::integer(i)).unwrap();
    }

    // clear every entry as it is visited
    let mut visited = 0;
    let mut key = LuaValue::nil();
    while let Some((k, _)) = t.next(&key).unwrap() {
        t.raw_set(&k, LuaValue::nil()).unwrap();
        visited += 1;
        key = k;
    }
    assert_eq!(visited, 40);
    assert_eq!(t.key_count(), 0);
    assert_eq!(t.length(), 0);
}

#[test]
fn test_remove_other_keys_during_traversal() {
    let t = TableRef::new(0, 0);
    for i in 0..12 {
        t.raw_set(&s(&format!("k{}", i)), LuaValue::integer(i)).unwrap();
    }

    // visiting a key removes the one after it; removed keys are never yielded
    let mut seen = Vec::new();
    let mut key = LuaValue::nil();
    while let Some((k, v)) = t.next(&key).unwrap() {
        let i = v.as_integer().unwrap();
        seen.push(i);
        t.raw_set(&s(&format!("k{}", i + 1)), LuaValue::nil()).unwrap();
        key = k;
    }
    assert_eq!(seen, vec![0, 2, 4, 6, 8, 10]);
    assert_eq!(t.key_count(), 6);
}
