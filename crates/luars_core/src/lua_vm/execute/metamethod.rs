/// Tag-method resolution
///
/// Metatable lookup per value kind, the loop-guarded `__index` / `__newindex`
/// chains, and the binary, unary and comparison fallbacks used by the
/// operators. Based on Lua's ltm.c and the luaV_finishget / luaV_finishset
/// loops of lvm.c.
use crate::lua_value::{LuaValue, TableRef, Varargs};
use crate::lua_vm::{LuaError, LuaResult, LuaState};

/// Tag Method types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TmKind {
    Index = 0,
    NewIndex = 1,
    Mode = 2,
    Len = 3,
    Eq = 4,
    Add = 5,
    Sub = 6,
    Mul = 7,
    Mod = 8,
    Pow = 9,
    Div = 10,
    Unm = 11,
    Lt = 12,
    Le = 13,
    Concat = 14,
    Call = 15,
    Metatable = 16,
    ToString = 17,
}

impl TmKind {
    /// Number of tag methods
    pub const N: usize = 18;

    /// Every tag method, in discriminant order.
    pub const ALL: [TmKind; TmKind::N] = [
        TmKind::Index,
        TmKind::NewIndex,
        TmKind::Mode,
        TmKind::Len,
        TmKind::Eq,
        TmKind::Add,
        TmKind::Sub,
        TmKind::Mul,
        TmKind::Mod,
        TmKind::Pow,
        TmKind::Div,
        TmKind::Unm,
        TmKind::Lt,
        TmKind::Le,
        TmKind::Concat,
        TmKind::Call,
        TmKind::Metatable,
        TmKind::ToString,
    ];

    pub fn from_u8(value: u8) -> Option<Self> {
        TmKind::ALL.get(value as usize).copied()
    }

    /// The metatable key, used verbatim by bindings installing metamethods.
    pub const fn name(self) -> &'static str {
        match self {
            TmKind::Index => "__index",
            TmKind::NewIndex => "__newindex",
            TmKind::Mode => "__mode",
            TmKind::Len => "__len",
            TmKind::Eq => "__eq",
            TmKind::Add => "__add",
            TmKind::Sub => "__sub",
            TmKind::Mul => "__mul",
            TmKind::Mod => "__mod",
            TmKind::Pow => "__pow",
            TmKind::Div => "__div",
            TmKind::Unm => "__unm",
            TmKind::Lt => "__lt",
            TmKind::Le => "__le",
            TmKind::Concat => "__concat",
            TmKind::Call => "__call",
            TmKind::Metatable => "__metatable",
            TmKind::ToString => "__tostring",
        }
    }
}

/// Metatable of a value: own metatable for tables and userdata, the shared
/// string metatable for strings, none for everything else.
pub fn get_metatable(lua_state: &LuaState, value: &LuaValue) -> Option<TableRef> {
    match value {
        LuaValue::Table(t) => t.get_metatable(),
        LuaValue::Userdata(ud) => ud.get_metatable(),
        LuaValue::String(_) => lua_state.string_metatable(),
        _ => None,
    }
}

/// Raw lookup of `tm` in the metatable of `value`; nil when absent.
pub fn get_metamethod(lua_state: &LuaState, value: &LuaValue, tm: TmKind) -> LuaValue {
    match get_metatable(lua_state, value) {
        // raw access, a metatable's own __index is never consulted
        Some(mt) => mt.raw_get(lua_state.tm_name(tm)),
        None => LuaValue::Nil,
    }
}

#[inline]
fn table_tm(lua_state: &LuaState, table: &TableRef, tm: TmKind) -> LuaValue {
    match table.get_metatable() {
        Some(mt) => mt.raw_get(lua_state.tm_name(tm)),
        None => LuaValue::Nil,
    }
}

/// Call a tag method and keep its first result (luaT_callTMres).
pub fn call_tm_res(
    lua_state: &mut LuaState,
    tm: &LuaValue,
    arg1: LuaValue,
    arg2: LuaValue,
) -> LuaResult<LuaValue> {
    let results = lua_state.call(tm, Varargs::two(arg1, arg2))?;
    Ok(results.arg1())
}

/// Metatable-aware read `obj[key]`.
pub fn index(lua_state: &mut LuaState, obj: &LuaValue, key: &LuaValue) -> LuaResult<LuaValue> {
    let mut current = obj.clone();
    for _ in 0..lua_state.option().max_tag_loop {
        let tm = match &current {
            LuaValue::Table(t) => {
                let value = t.raw_get(key);
                if !value.is_nil() {
                    return Ok(value);
                }
                let tm = table_tm(lua_state, t, TmKind::Index);
                if tm.is_nil() {
                    return Ok(LuaValue::Nil);
                }
                tm
            }
            _ => {
                let tm = get_metamethod(lua_state, &current, TmKind::Index);
                if tm.is_nil() {
                    return Err(LuaError::type_error(format!(
                        "attempt to index a {} value",
                        current.type_name()
                    )));
                }
                tm
            }
        };
        if tm.is_function() {
            return call_tm_res(lua_state, &tm, current, key.clone());
        }
        // repeat over the tag method
        current = tm;
    }
    log::debug!("__index chain exceeded {} hops", lua_state.option().max_tag_loop);
    Err(LuaError::runtime_error("'__index' chain too long; possible loop"))
}

/// Metatable-aware write `obj[key] = value`.
pub fn new_index(
    lua_state: &mut LuaState,
    obj: &LuaValue,
    key: &LuaValue,
    value: LuaValue,
) -> LuaResult<()> {
    let mut current = obj.clone();
    for _ in 0..lua_state.option().max_tag_loop {
        let tm = match &current {
            LuaValue::Table(t) => {
                let tm = if t.raw_get(key).is_nil() {
                    table_tm(lua_state, t, TmKind::NewIndex)
                } else {
                    LuaValue::Nil
                };
                if tm.is_nil() {
                    return t.raw_set(key, value);
                }
                tm
            }
            _ => {
                let tm = get_metamethod(lua_state, &current, TmKind::NewIndex);
                if tm.is_nil() {
                    return Err(LuaError::type_error(format!(
                        "attempt to index a {} value",
                        current.type_name()
                    )));
                }
                tm
            }
        };
        if tm.is_function() {
            let args = Varargs::multiple(vec![current, key.clone(), value]);
            lua_state.call(&tm, args)?;
            return Ok(());
        }
        current = tm;
    }
    log::debug!("__newindex chain exceeded {} hops", lua_state.option().max_tag_loop);
    Err(LuaError::runtime_error("'__newindex' chain too long; possible loop"))
}

/// Binary tag method: left operand first, then right (luaT_trybinTM).
pub fn try_bin_tm(
    lua_state: &mut LuaState,
    p1: &LuaValue,
    p2: &LuaValue,
    tm: TmKind,
) -> LuaResult<LuaValue> {
    let mut metamethod = get_metamethod(lua_state, p1, tm);
    if metamethod.is_nil() {
        metamethod = get_metamethod(lua_state, p2, tm);
    }
    if !metamethod.is_nil() {
        return call_tm_res(lua_state, &metamethod, p1.clone(), p2.clone());
    }

    Err(match tm {
        TmKind::Concat => {
            let bad = if is_concat_operand(p1) { p2 } else { p1 };
            LuaError::type_error(format!(
                "attempt to concatenate a {} value",
                bad.type_name()
            ))
        }
        _ => {
            let bad = if p1.to_number().is_some() { p2 } else { p1 };
            LuaError::type_error(format!(
                "attempt to perform arithmetic on a {} value",
                bad.type_name()
            ))
        }
    })
}

/// Unary tag method (`__unm`, `__len`); the operand is passed twice.
pub fn try_unary_tm(lua_state: &mut LuaState, p: &LuaValue, tm: TmKind) -> LuaResult<LuaValue> {
    let metamethod = get_metamethod(lua_state, p, tm);
    if !metamethod.is_nil() {
        return call_tm_res(lua_state, &metamethod, p.clone(), p.clone());
    }
    Err(match tm {
        TmKind::Len => {
            LuaError::type_error(format!("attempt to get length of a {} value", p.type_name()))
        }
        _ => LuaError::type_error(format!(
            "attempt to perform arithmetic on a {} value",
            p.type_name()
        )),
    })
}

/// Comparison tag method (`__lt`, `__le`).
/// Returns `None` when neither operand provides one.
pub fn try_comp_tm(
    lua_state: &mut LuaState,
    p1: &LuaValue,
    p2: &LuaValue,
    tm: TmKind,
) -> LuaResult<Option<bool>> {
    let mut metamethod = get_metamethod(lua_state, p1, tm);
    if metamethod.is_nil() {
        metamethod = get_metamethod(lua_state, p2, tm);
    }
    if metamethod.is_nil() {
        return Ok(None);
    }
    let result = call_tm_res(lua_state, &metamethod, p1.clone(), p2.clone())?;
    Ok(Some(result.is_truthy()))
}

/// Equality tag method for two non-raw-equal tables or userdata.
/// Returns `None` when neither operand provides `__eq`.
pub fn try_eq_tm(
    lua_state: &mut LuaState,
    p1: &LuaValue,
    p2: &LuaValue,
) -> LuaResult<Option<bool>> {
    try_comp_tm(lua_state, p1, p2, TmKind::Eq)
}

/// Length operator `#v`.
pub fn len(lua_state: &mut LuaState, value: &LuaValue) -> LuaResult<LuaValue> {
    match value {
        LuaValue::String(s) => Ok(LuaValue::Integer(s.len() as i64)),
        LuaValue::Table(t) => {
            let tm = table_tm(lua_state, t, TmKind::Len);
            if tm.is_nil() {
                Ok(LuaValue::Integer(t.length() as i64))
            } else {
                call_tm_res(lua_state, &tm, value.clone(), value.clone())
            }
        }
        _ => try_unary_tm(lua_state, value, TmKind::Len),
    }
}

/// String conversion honouring `__tostring`.
pub fn tostring(lua_state: &mut LuaState, value: &LuaValue) -> LuaResult<LuaValue> {
    let tm = get_metamethod(lua_state, value, TmKind::ToString);
    if tm.is_nil() {
        return Ok(match value {
            LuaValue::String(_) => value.clone(),
            _ => LuaValue::string(&value.to_display_string()),
        });
    }
    let result = lua_state.call(&tm, Varargs::single(value.clone()))?.arg1();
    if !result.is_string() {
        return Err(LuaError::type_error("'__tostring' must return a string"));
    }
    Ok(result)
}

#[inline]
pub(crate) fn is_concat_operand(value: &LuaValue) -> bool {
    matches!(
        value,
        LuaValue::String(_) | LuaValue::Integer(_) | LuaValue::Float(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tm_names_roundtrip() {
        for (i, tm) in TmKind::ALL.iter().enumerate() {
            assert_eq!(*tm as usize, i);
            assert_eq!(TmKind::from_u8(i as u8), Some(*tm));
            assert!(tm.name().starts_with("__"));
        }
        assert_eq!(TmKind::from_u8(TmKind::N as u8), None);
        assert_eq!(TmKind::Metatable.name(), "__metatable");
        assert_eq!(TmKind::ToString.name(), "__tostring");
    }

    #[test]
    fn test_metatable_per_kind() {
        let mut state = LuaState::default();
        let mt = state.create_table(0, 0);
        state.set_string_metatable(Some(mt.clone()));
        assert_eq!(get_metatable(&state, &LuaValue::string("abc")), Some(mt));
        assert_eq!(get_metatable(&state, &LuaValue::integer(1)), None);
        assert_eq!(get_metatable(&state, &LuaValue::nil()), None);
    }
}
