// Lua value model
// Scalars inline, strings shared and immutable, tables/functions/userdata/threads
// shared by reference.
mod lua_convert;
mod lua_function;
mod lua_string;
mod lua_table;
mod lua_value;
pub mod number;

use std::fmt;

pub use lua_convert::{FromLua, IntoLua};
pub use lua_function::{LuaClosure, LuaFunction, LuaThread, LuaUserdata, NativeFn, NativeFunction};
pub use lua_string::LuaString;
pub use lua_table::{LuaTable, TableRef};
pub use lua_value::{LuaType, LuaValue, LuaValueKind, float_to_integer};

/// Values passed to and returned from calls.
/// - Empty: no values (also the NONE singleton)
/// - Single: one value, no heap allocation
/// - Many: 2+ values
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Varargs {
    #[default]
    Empty,
    Single(LuaValue),
    Many(Vec<LuaValue>),
}

impl Varargs {
    /// The "no values" list. Every argument reads as nil, `count()` is 0 and
    /// `type_at` reports `LuaType::None`.
    #[inline(always)]
    pub const fn none() -> Self {
        Varargs::Empty
    }

    #[inline(always)]
    pub fn single(value: LuaValue) -> Self {
        Varargs::Single(value)
    }

    #[inline(always)]
    pub fn two(v1: LuaValue, v2: LuaValue) -> Self {
        Varargs::Many(vec![v1, v2])
    }

    pub fn multiple(values: Vec<LuaValue>) -> Self {
        let mut values = values;
        match values.len() {
            0 => Varargs::Empty,
            1 => Varargs::Single(values.pop().unwrap_or_default()),
            _ => Varargs::Many(values),
        }
    }

    /// Prepend `first` to these values (used to redirect `__call`).
    pub fn prepend(self, first: LuaValue) -> Self {
        let mut values = Vec::with_capacity(self.count() + 1);
        values.push(first);
        values.extend(self.into_vec());
        Varargs::multiple(values)
    }

    #[inline(always)]
    pub fn into_vec(self) -> Vec<LuaValue> {
        match self {
            Varargs::Empty => Vec::new(),
            Varargs::Single(v) => vec![v],
            Varargs::Many(v) => v,
        }
    }

    #[inline(always)]
    pub fn count(&self) -> usize {
        match self {
            Varargs::Empty => 0,
            Varargs::Single(_) => 1,
            Varargs::Many(v) => v.len(),
        }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Argument `i`, 1-based; nil when absent.
    pub fn arg(&self, i: usize) -> LuaValue {
        self.get(i).cloned().unwrap_or_default()
    }

    #[inline]
    pub fn arg1(&self) -> LuaValue {
        self.arg(1)
    }

    /// Type of argument `i`, 1-based; `LuaType::None` past the end.
    pub fn type_at(&self, i: usize) -> LuaType {
        match self.get(i) {
            Some(v) => v.type_tag(),
            None => LuaType::None,
        }
    }

    pub fn is_none_at(&self, i: usize) -> bool {
        self.get(i).is_none()
    }

    /// Values from position `start` (1-based) onward.
    pub fn subargs(&self, start: usize) -> Varargs {
        let start = start.max(1);
        match self {
            Varargs::Empty => Varargs::Empty,
            Varargs::Single(v) if start == 1 => Varargs::Single(v.clone()),
            Varargs::Single(_) => Varargs::Empty,
            Varargs::Many(v) => Varargs::multiple(v.iter().skip(start - 1).cloned().collect()),
        }
    }

    fn get(&self, i: usize) -> Option<&LuaValue> {
        if i == 0 {
            return None;
        }
        match self {
            Varargs::Empty => None,
            Varargs::Single(v) => (i == 1).then_some(v),
            Varargs::Many(v) => v.get(i - 1),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LuaValue> {
        match self {
            Varargs::Empty => [].iter(),
            Varargs::Single(v) => std::slice::from_ref(v).iter(),
            Varargs::Many(v) => v.iter(),
        }
    }
}

impl From<LuaValue> for Varargs {
    fn from(value: LuaValue) -> Self {
        Varargs::Single(value)
    }
}

impl From<Vec<LuaValue>> for Varargs {
    fn from(values: Vec<LuaValue>) -> Self {
        Varargs::multiple(values)
    }
}

impl fmt::Display for Varargs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Varargs::Empty => f.write_str("none"),
            Varargs::Single(v) => write!(f, "{}", v),
            Varargs::Many(values) => {
                f.write_str("(")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_str(")")
            }
        }
    }
}
