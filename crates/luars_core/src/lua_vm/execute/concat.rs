/// Concatenation operator `..`
use crate::lua_value::LuaValue;
use crate::lua_value::number::format_float;
use crate::lua_vm::execute::metamethod::{TmKind, is_concat_operand, try_bin_tm};
use crate::lua_vm::{LuaResult, LuaState};

/// `a .. b`: strings and numbers join directly, anything else goes to `__concat`.
pub fn concat(lua_state: &mut LuaState, a: &LuaValue, b: &LuaValue) -> LuaResult<LuaValue> {
    if is_concat_operand(a) && is_concat_operand(b) {
        let mut buf = Vec::new();
        append_piece(&mut buf, a);
        append_piece(&mut buf, b);
        return Ok(LuaValue::bytes(buf));
    }
    try_bin_tm(lua_state, a, b, TmKind::Concat)
}

/// `v1 .. v2 .. ... .. vn`, right associative like the operator.
/// Runs of strings and numbers are joined in one buffer.
pub fn concat_all(lua_state: &mut LuaState, values: &[LuaValue]) -> LuaResult<LuaValue> {
    let Some((last, rest)) = values.split_last() else {
        return Ok(LuaValue::string(""));
    };
    let mut acc = last.clone();
    let mut end = rest.len();
    while end > 0 {
        // longest run of plain operands ending at `end`, joined with `acc`
        let mut start = end;
        if is_concat_operand(&acc) {
            while start > 0 && is_concat_operand(&rest[start - 1]) {
                start -= 1;
            }
        }
        if start < end {
            let mut buf = Vec::new();
            for v in &rest[start..end] {
                append_piece(&mut buf, v);
            }
            append_piece(&mut buf, &acc);
            acc = LuaValue::bytes(buf);
            end = start;
        } else {
            acc = concat(lua_state, &rest[end - 1], &acc)?;
            end -= 1;
        }
    }
    Ok(acc)
}

fn append_piece(buf: &mut Vec<u8>, value: &LuaValue) {
    match value {
        LuaValue::String(s) => buf.extend_from_slice(s.as_bytes()),
        LuaValue::Integer(i) => {
            let mut fmt = itoa::Buffer::new();
            buf.extend_from_slice(fmt.format(*i).as_bytes());
        }
        LuaValue::Float(n) => buf.extend_from_slice(format_float(*n).as_bytes()),
        _ => {}
    }
}
