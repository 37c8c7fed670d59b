// Lua value and table core
// Tagged values, hybrid array/hash tables, metatable dispatch and traversal,
// embedded by an interpreter through `LuaState`.

#[cfg(test)]
mod test;

pub mod gc;
pub mod lua_value;
pub mod lua_vm;

#[cfg(feature = "serde")]
pub mod serde;

pub use gc::{GC, GcStats};
pub use lua_value::{
    FromLua, IntoLua, LuaFunction, LuaString, LuaTable, LuaType, LuaUserdata, LuaValue, TableRef,
    Varargs,
};
pub use lua_vm::{ArithOp, LuaCallHandler, LuaError, LuaResult, LuaState, SafeOption, TmKind};
