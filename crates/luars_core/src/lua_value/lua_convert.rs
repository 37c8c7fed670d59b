//! `FromLua` / `IntoLua` - bidirectional conversion between Rust types and `LuaValue`.
//!
//! These traits let native function bindings take and return plain Rust types
//! instead of matching on `LuaValue` by hand.
//!
//! # Built-in impls
//! - `()`, `bool`, `i8`..`i64`, `u8`..`u64`, `f32`, `f64`
//! - `String`, `&str`
//! - `Option<T>` where `T: FromLua` / `T: IntoLua`
//! - `LuaValue` (identity)
//! - `Vec<T>` (array-like tables)
//!
//! # User extensibility
//! ```ignore
//! impl FromLua for MyVec3 {
//!     fn from_lua(value: LuaValue, state: &LuaState) -> LuaResult<Self> {
//!         // extract from userdata or table
//!     }
//! }
//! ```

use crate::lua_value::LuaValue;
use crate::lua_vm::{LuaError, LuaResult, LuaState};

/// Convert a `LuaValue` into a Rust type.
pub trait FromLua: Sized {
    /// Fails with a `TypeError` on mismatch.
    fn from_lua(value: LuaValue, state: &LuaState) -> LuaResult<Self>;
}

/// Convert a Rust type into a `LuaValue`.
pub trait IntoLua {
    /// `state` is available for conversions that allocate tables.
    fn into_lua(self, state: &mut LuaState) -> LuaResult<LuaValue>;
}

fn expected(what: &str, value: &LuaValue) -> LuaError {
    LuaError::type_error(format!("{} expected, got {}", what, value.type_name()))
}

// ==================== Identity: LuaValue ====================

impl FromLua for LuaValue {
    #[inline]
    fn from_lua(value: LuaValue, _state: &LuaState) -> LuaResult<Self> {
        Ok(value)
    }
}

impl IntoLua for LuaValue {
    #[inline]
    fn into_lua(self, _state: &mut LuaState) -> LuaResult<LuaValue> {
        Ok(self)
    }
}

// ==================== Unit ====================

impl FromLua for () {
    #[inline]
    fn from_lua(_value: LuaValue, _state: &LuaState) -> LuaResult<Self> {
        Ok(())
    }
}

impl IntoLua for () {
    #[inline]
    fn into_lua(self, _state: &mut LuaState) -> LuaResult<LuaValue> {
        Ok(LuaValue::nil())
    }
}

// ==================== Boolean ====================

impl FromLua for bool {
    #[inline]
    fn from_lua(value: LuaValue, _state: &LuaState) -> LuaResult<Self> {
        // Lua truthiness: nil and false are false, everything else true
        Ok(value.is_truthy())
    }
}

impl IntoLua for bool {
    #[inline]
    fn into_lua(self, _state: &mut LuaState) -> LuaResult<LuaValue> {
        Ok(LuaValue::boolean(self))
    }
}

// ==================== Integer types ====================

macro_rules! impl_lua_int {
    ($($ty:ty),*) => {
        $(
            impl FromLua for $ty {
                #[inline]
                fn from_lua(value: LuaValue, _state: &LuaState) -> LuaResult<Self> {
                    let i = value.to_long()?;
                    <$ty>::try_from(i).map_err(|_| {
                        LuaError::type_error(format!(
                            "number {} has no representation as {}",
                            i,
                            stringify!($ty)
                        ))
                    })
                }
            }

            impl IntoLua for $ty {
                #[inline]
                fn into_lua(self, _state: &mut LuaState) -> LuaResult<LuaValue> {
                    Ok(LuaValue::integer(self as i64))
                }
            }
        )*
    };
}

impl_lua_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

// ==================== Float types ====================

macro_rules! impl_lua_float {
    ($($ty:ty),*) => {
        $(
            impl FromLua for $ty {
                #[inline]
                fn from_lua(value: LuaValue, _state: &LuaState) -> LuaResult<Self> {
                    Ok(value.to_float()? as $ty)
                }
            }

            impl IntoLua for $ty {
                #[inline]
                fn into_lua(self, _state: &mut LuaState) -> LuaResult<LuaValue> {
                    Ok(LuaValue::float(self as f64))
                }
            }
        )*
    };
}

impl_lua_float!(f32, f64);

// ==================== String ====================

impl FromLua for String {
    #[inline]
    fn from_lua(value: LuaValue, _state: &LuaState) -> LuaResult<Self> {
        match &value {
            LuaValue::String(s) => Ok(s.to_string_lossy().into_owned()),
            // Lua coerces numbers to strings
            LuaValue::Integer(_) | LuaValue::Float(_) => Ok(value.to_display_string()),
            _ => Err(expected("string", &value)),
        }
    }
}

impl IntoLua for String {
    #[inline]
    fn into_lua(self, _state: &mut LuaState) -> LuaResult<LuaValue> {
        Ok(LuaValue::string(&self))
    }
}

impl IntoLua for &str {
    #[inline]
    fn into_lua(self, _state: &mut LuaState) -> LuaResult<LuaValue> {
        Ok(LuaValue::string(self))
    }
}

// ==================== Option<T> ====================

impl<T: FromLua> FromLua for Option<T> {
    #[inline]
    fn from_lua(value: LuaValue, state: &LuaState) -> LuaResult<Self> {
        if value.is_nil() {
            Ok(None)
        } else {
            T::from_lua(value, state).map(Some)
        }
    }
}

impl<T: IntoLua> IntoLua for Option<T> {
    #[inline]
    fn into_lua(self, state: &mut LuaState) -> LuaResult<LuaValue> {
        match self {
            Some(v) => v.into_lua(state),
            None => Ok(LuaValue::nil()),
        }
    }
}

// ==================== Vec<T> (array tables) ====================

impl<T: FromLua> FromLua for Vec<T> {
    fn from_lua(value: LuaValue, state: &LuaState) -> LuaResult<Self> {
        let Some(table) = value.as_table() else {
            return Err(expected("table", &value));
        };
        let len = table.length();
        let mut result = Vec::with_capacity(len);
        for i in 1..=len {
            result.push(T::from_lua(table.get_int(i as i64), state)?);
        }
        Ok(result)
    }
}

impl<T: IntoLua> IntoLua for Vec<T> {
    fn into_lua(self, state: &mut LuaState) -> LuaResult<LuaValue> {
        let table = state.create_table(self.len(), 0);
        for (i, item) in self.into_iter().enumerate() {
            let value = item.into_lua(state)?;
            table.set_int(i as i64 + 1, value);
        }
        Ok(LuaValue::table(table))
    }
}
