/// Serializer for converting Lua values to serde_json::Value
///
/// - Lua nil -> JSON null
/// - Lua boolean -> JSON boolean
/// - Lua integer / float -> JSON number (NaN and infinities are rejected)
/// - Lua string -> JSON string
/// - Lua table with keys exactly 1..n -> JSON array
/// - Other Lua tables -> JSON object (string and number keys only)
/// - functions, userdata, threads -> error
use ahash::AHashSet;
use serde_json::{Map, Number, Value as JsonValue};

use crate::lua_value::number::format_float;
use crate::lua_value::{LuaValue, TableRef};
use crate::lua_vm::{LuaError, LuaResult};

/// Convert a Lua value to a serde_json::Value
pub fn to_value(lua_value: &LuaValue) -> LuaResult<JsonValue> {
    let mut visited = AHashSet::new();
    to_value_internal(lua_value, &mut visited)
}

/// Convert a Lua value to a JSON string
pub fn to_string(lua_value: &LuaValue, pretty: bool) -> LuaResult<String> {
    let json_value = to_value(lua_value)?;
    let result = if pretty {
        serde_json::to_string_pretty(&json_value)
    } else {
        serde_json::to_string(&json_value)
    };
    result.map_err(|e| LuaError::runtime_error(format!("failed to serialize to JSON: {}", e)))
}

fn to_value_internal(lua_value: &LuaValue, visited: &mut AHashSet<usize>) -> LuaResult<JsonValue> {
    match lua_value {
        LuaValue::Nil => Ok(JsonValue::Null),
        LuaValue::Boolean(b) => Ok(JsonValue::Bool(*b)),
        LuaValue::Integer(i) => Ok(JsonValue::Number(Number::from(*i))),
        LuaValue::Float(n) => Number::from_f64(*n)
            .map(JsonValue::Number)
            .ok_or_else(|| LuaError::type_error(format!("cannot serialize number {} to JSON", format_float(*n)))),
        LuaValue::String(s) => Ok(JsonValue::String(s.to_string_lossy().into_owned())),
        LuaValue::Table(t) => {
            let addr = t.as_ptr() as usize;
            if !visited.insert(addr) {
                return Err(LuaError::type_error("circular reference detected in table"));
            }
            let result = if is_array_like(t) {
                table_to_json_array(t, visited)
            } else {
                table_to_json_object(t, visited)
            };
            visited.remove(&addr);
            result
        }
        _ => Err(LuaError::type_error(format!(
            "cannot serialize a {} value to JSON",
            lua_value.type_name()
        ))),
    }
}

/// Keys are exactly `1..=n`. The empty table counts as an array.
fn is_array_like(table: &TableRef) -> bool {
    let table = table.borrow();
    let len = table.length();
    table.key_count() == len && (1..=len as i64).all(|i| !table.get_int(i).is_nil())
}

fn table_to_json_array(table: &TableRef, visited: &mut AHashSet<usize>) -> LuaResult<JsonValue> {
    let len = table.length();
    let mut arr = Vec::with_capacity(len);
    for i in 1..=len as i64 {
        // no borrow is held while recursing
        let value = table.get_int(i);
        arr.push(to_value_internal(&value, visited)?);
    }
    Ok(JsonValue::Array(arr))
}

fn table_to_json_object(table: &TableRef, visited: &mut AHashSet<usize>) -> LuaResult<JsonValue> {
    let mut map = Map::new();
    for (key, value) in table.pairs() {
        let key = match &key {
            LuaValue::String(s) => s.to_string_lossy().into_owned(),
            LuaValue::Integer(_) | LuaValue::Float(_) => key.to_display_string(),
            _ => {
                return Err(LuaError::type_error(format!(
                    "cannot use a {} key in a JSON object",
                    key.type_name()
                )));
            }
        };
        // 1 and "1" both map to the JSON key "1"
        if map.contains_key(&key) {
            return Err(LuaError::type_error(format!(
                "duplicate key '{}' in JSON object",
                key
            )));
        }
        map.insert(key, to_value_internal(&value, visited)?);
    }
    Ok(JsonValue::Object(map))
}
