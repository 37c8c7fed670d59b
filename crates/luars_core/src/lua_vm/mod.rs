// Execution context for the value and table core
// The interpreter loop and the compiler live outside this crate; they reach
// tables, metatables and operators through `LuaState`.
mod execute;
mod lua_error;
pub mod lua_limits;
mod lua_state;
mod safe_option;

pub use execute::{ArithOp, TmKind};
pub use lua_error::{LuaError, LuaResult};
pub use lua_state::{LuaCallHandler, LuaState};
pub use safe_option::SafeOption;
