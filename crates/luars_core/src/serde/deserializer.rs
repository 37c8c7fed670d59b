/// Deserializer for converting serde_json::Value to Lua values
///
/// - JSON null -> Lua nil
/// - JSON boolean -> Lua boolean
/// - JSON number -> Lua integer when it fits an i64, float otherwise
/// - JSON string -> Lua string
/// - JSON array -> Lua table (array part)
/// - JSON object -> Lua table (hash part)
use serde_json::Value as JsonValue;

use crate::lua_value::LuaValue;
use crate::lua_vm::{LuaError, LuaResult, LuaState};

/// Convert a serde_json::Value to a Lua value
pub fn from_value(json_value: &JsonValue, state: &mut LuaState) -> LuaResult<LuaValue> {
    match json_value {
        JsonValue::Null => Ok(LuaValue::nil()),
        JsonValue::Bool(b) => Ok(LuaValue::boolean(*b)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(LuaValue::integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(LuaValue::float(f))
            } else {
                Err(LuaError::type_error(format!("invalid JSON number {}", n)))
            }
        }
        JsonValue::String(s) => Ok(LuaValue::string(s)),
        JsonValue::Array(arr) => json_array_to_lua_table(arr, state),
        JsonValue::Object(obj) => json_object_to_lua_table(obj, state),
    }
}

/// Convert a JSON string to a Lua value
pub fn from_str(json_str: &str, state: &mut LuaState) -> LuaResult<LuaValue> {
    let json_value: JsonValue = serde_json::from_str(json_str)
        .map_err(|e| LuaError::runtime_error(format!("failed to parse JSON: {}", e)))?;
    from_value(&json_value, state)
}

fn json_array_to_lua_table(arr: &[JsonValue], state: &mut LuaState) -> LuaResult<LuaValue> {
    let table = state.create_table(arr.len(), 0);
    for (i, item) in arr.iter().enumerate() {
        // null elements leave holes
        let value = from_value(item, state)?;
        table.set_int(i as i64 + 1, value);
    }
    Ok(LuaValue::table(table))
}

fn json_object_to_lua_table(
    obj: &serde_json::Map<String, JsonValue>,
    state: &mut LuaState,
) -> LuaResult<LuaValue> {
    let table = state.create_table(0, obj.len());
    for (key, value_json) in obj {
        let value = from_value(value_json, state)?;
        table.raw_set(&LuaValue::string(key), value)?;
    }
    Ok(LuaValue::table(table))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        let mut state = LuaState::default();
        let v = from_str(r#"{"n": 3, "f": 1.5, "list": [true, "x"]}"#, &mut state).unwrap();
        let t = v.as_table().unwrap();
        assert_eq!(t.raw_get(&LuaValue::string("n")), LuaValue::integer(3));
        assert!(t.raw_get(&LuaValue::string("n")).is_integer());
        assert_eq!(t.raw_get(&LuaValue::string("f")), LuaValue::float(1.5));
        let list = t.raw_get(&LuaValue::string("list"));
        let list = list.as_table().unwrap();
        assert_eq!(list.length(), 2);
        assert_eq!(list.get_int(2), LuaValue::string("x"));
    }

    #[test]
    fn test_invalid_json() {
        let mut state = LuaState::default();
        assert!(from_str("{", &mut state).is_err());
    }
}
