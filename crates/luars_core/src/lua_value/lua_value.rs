// LuaValue - closed tagged union over the Lua value kinds
//
// Scalars (nil, boolean, integer, float) are stored inline. Strings are
// immutable and shared; tables, functions, userdata and threads are shared
// references compared by identity.
//
// Type tag numbering follows lua.h and must never change:
//   nil=0 boolean=1 lightuserdata=2 number=3 string=4 table=5
//   function=6 userdata=7 thread=8 value=9, none=-1, int-subtype=-2
use std::fmt;
use std::rc::Rc;

use crate::lua_value::number::{format_float, str_to_number};
use crate::lua_value::{LuaFunction, LuaString, LuaThread, LuaUserdata, TableRef};
use crate::lua_vm::{LuaError, LuaResult};

/// Stable type tag constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum LuaType {
    /// Internal: integer provenance of a number
    Int = -2,
    /// Absent argument in a variable-argument slot
    None = -1,
    Nil = 0,
    Boolean = 1,
    LightUserdata = 2,
    Number = 3,
    String = 4,
    Table = 5,
    Function = 6,
    Userdata = 7,
    Thread = 8,
    Value = 9,
}

impl LuaType {
    pub const fn code(self) -> i32 {
        self as i8 as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            -2 => LuaType::Int,
            -1 => LuaType::None,
            0 => LuaType::Nil,
            1 => LuaType::Boolean,
            2 => LuaType::LightUserdata,
            3 => LuaType::Number,
            4 => LuaType::String,
            5 => LuaType::Table,
            6 => LuaType::Function,
            7 => LuaType::Userdata,
            8 => LuaType::Thread,
            9 => LuaType::Value,
            _ => return None,
        })
    }

    pub const fn name(self) -> &'static str {
        match self {
            LuaType::Int => "number",
            LuaType::None => "no value",
            LuaType::Nil => "nil",
            LuaType::Boolean => "boolean",
            LuaType::LightUserdata => "lightuserdata",
            LuaType::Number => "number",
            LuaType::String => "string",
            LuaType::Table => "table",
            LuaType::Function => "function",
            LuaType::Userdata => "userdata",
            LuaType::Thread => "thread",
            LuaType::Value => "value",
        }
    }
}

#[derive(Clone, Default)]
pub enum LuaValue {
    #[default]
    Nil,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(Rc<LuaString>),
    Table(TableRef),
    Function(Rc<LuaFunction>),
    Userdata(Rc<LuaUserdata>),
    Thread(Rc<LuaThread>),
}

/// Finer-grained kind than `LuaType`, distinguishing the number subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LuaValueKind {
    Nil,
    Boolean,
    Integer,
    Float,
    String,
    Table,
    Function,
    Userdata,
    Thread,
}

impl LuaValue {
    // ============ Constructors ============

    #[inline(always)]
    pub const fn nil() -> Self {
        LuaValue::Nil
    }

    #[inline(always)]
    pub const fn boolean(b: bool) -> Self {
        LuaValue::Boolean(b)
    }

    #[inline(always)]
    pub const fn integer(i: i64) -> Self {
        LuaValue::Integer(i)
    }

    #[inline(always)]
    pub const fn float(n: f64) -> Self {
        LuaValue::Float(n)
    }

    pub fn string(s: &str) -> Self {
        LuaValue::String(Rc::new(LuaString::from_str(s)))
    }

    pub fn bytes(b: impl Into<Box<[u8]>>) -> Self {
        LuaValue::String(Rc::new(LuaString::new(b)))
    }

    #[inline]
    pub fn table(t: TableRef) -> Self {
        LuaValue::Table(t)
    }

    pub fn function(f: LuaFunction) -> Self {
        LuaValue::Function(Rc::new(f))
    }

    pub fn native<F>(name: &str, func: F) -> Self
    where
        F: Fn(&mut crate::lua_vm::LuaState, super::Varargs) -> LuaResult<super::Varargs> + 'static,
    {
        LuaValue::Function(Rc::new(LuaFunction::native(name, func)))
    }

    pub fn userdata(u: LuaUserdata) -> Self {
        LuaValue::Userdata(Rc::new(u))
    }

    pub fn thread(t: LuaThread) -> Self {
        LuaValue::Thread(Rc::new(t))
    }

    // ============ Type queries ============

    /// Type tag as seen by scripts; both number subtypes report `Number`.
    pub fn type_tag(&self) -> LuaType {
        match self {
            LuaValue::Nil => LuaType::Nil,
            LuaValue::Boolean(_) => LuaType::Boolean,
            LuaValue::Integer(_) | LuaValue::Float(_) => LuaType::Number,
            LuaValue::String(_) => LuaType::String,
            LuaValue::Table(_) => LuaType::Table,
            LuaValue::Function(_) => LuaType::Function,
            LuaValue::Userdata(_) => LuaType::Userdata,
            LuaValue::Thread(_) => LuaType::Thread,
        }
    }

    /// Like `type_tag`, but integers report `LuaType::Int`.
    pub fn subtype_tag(&self) -> LuaType {
        match self {
            LuaValue::Integer(_) => LuaType::Int,
            _ => self.type_tag(),
        }
    }

    pub fn kind(&self) -> LuaValueKind {
        match self {
            LuaValue::Nil => LuaValueKind::Nil,
            LuaValue::Boolean(_) => LuaValueKind::Boolean,
            LuaValue::Integer(_) => LuaValueKind::Integer,
            LuaValue::Float(_) => LuaValueKind::Float,
            LuaValue::String(_) => LuaValueKind::String,
            LuaValue::Table(_) => LuaValueKind::Table,
            LuaValue::Function(_) => LuaValueKind::Function,
            LuaValue::Userdata(_) => LuaValueKind::Userdata,
            LuaValue::Thread(_) => LuaValueKind::Thread,
        }
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_tag().name()
    }

    #[inline(always)]
    pub fn is_nil(&self) -> bool {
        matches!(self, LuaValue::Nil)
    }

    #[inline(always)]
    pub fn is_boolean(&self) -> bool {
        matches!(self, LuaValue::Boolean(_))
    }

    #[inline(always)]
    pub fn is_integer(&self) -> bool {
        matches!(self, LuaValue::Integer(_))
    }

    #[inline(always)]
    pub fn is_float(&self) -> bool {
        matches!(self, LuaValue::Float(_))
    }

    #[inline(always)]
    pub fn is_number(&self) -> bool {
        matches!(self, LuaValue::Integer(_) | LuaValue::Float(_))
    }

    #[inline(always)]
    pub fn is_string(&self) -> bool {
        matches!(self, LuaValue::String(_))
    }

    #[inline(always)]
    pub fn is_table(&self) -> bool {
        matches!(self, LuaValue::Table(_))
    }

    #[inline(always)]
    pub fn is_function(&self) -> bool {
        matches!(self, LuaValue::Function(_))
    }

    #[inline(always)]
    pub fn is_userdata(&self) -> bool {
        matches!(self, LuaValue::Userdata(_))
    }

    #[inline(always)]
    pub fn is_thread(&self) -> bool {
        matches!(self, LuaValue::Thread(_))
    }

    /// `nil` and `false` are falsy, everything else is truthy.
    #[inline(always)]
    pub fn is_falsy(&self) -> bool {
        matches!(self, LuaValue::Nil | LuaValue::Boolean(false))
    }

    #[inline(always)]
    pub fn is_truthy(&self) -> bool {
        !self.is_falsy()
    }

    /// Reference types: identity matters for equality.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            LuaValue::Table(_) | LuaValue::Function(_) | LuaValue::Userdata(_) | LuaValue::Thread(_)
        )
    }

    // ============ Accessors ============

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            LuaValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view of a number, accepting floats with an exact integer value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            LuaValue::Integer(i) => Some(*i),
            LuaValue::Float(n) => float_to_integer(*n),
            _ => None,
        }
    }

    /// Float payload only, no conversion.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            LuaValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value of either number subtype.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            LuaValue::Integer(i) => Some(*i as f64),
            LuaValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_lua_string(&self) -> Option<&Rc<LuaString>> {
        match self {
            LuaValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            LuaValue::String(s) => s.as_str(),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&TableRef> {
        match self {
            LuaValue::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Rc<LuaFunction>> {
        match self {
            LuaValue::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_userdata(&self) -> Option<&Rc<LuaUserdata>> {
        match self {
            LuaValue::Userdata(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_thread(&self) -> Option<&Rc<LuaThread>> {
        match self {
            LuaValue::Thread(t) => Some(t),
            _ => None,
        }
    }

    // ============ Coercion ============

    /// Number value of `self`, converting numeric strings.
    /// Returns `None` for anything that is not a number after coercion.
    pub fn to_number(&self) -> Option<LuaValue> {
        match self {
            LuaValue::Integer(_) | LuaValue::Float(_) => Some(self.clone()),
            LuaValue::String(s) => s.as_str().and_then(str_to_number),
            _ => None,
        }
    }

    /// Coerce to a float, failing with `TypeError` for non-numbers.
    pub fn to_float(&self) -> LuaResult<f64> {
        match self.to_number() {
            Some(LuaValue::Integer(i)) => Ok(i as f64),
            Some(LuaValue::Float(n)) => Ok(n),
            _ => Err(self.number_expected()),
        }
    }

    /// Coerce to a 64-bit integer. Floats are truncated toward zero;
    /// NaN, infinities and values outside the i64 range have no integer
    /// representation.
    pub fn to_long(&self) -> LuaResult<i64> {
        match self.to_number() {
            Some(LuaValue::Integer(i)) => Ok(i),
            Some(LuaValue::Float(n)) => float_to_integer(n.trunc()).ok_or_else(|| {
                LuaError::type_error("number has no integer representation")
            }),
            _ => Err(self.number_expected()),
        }
    }

    /// Coerce to a 32-bit integer, failing when the value does not fit.
    pub fn to_int(&self) -> LuaResult<i32> {
        let l = self.to_long()?;
        i32::try_from(l)
            .map_err(|_| LuaError::type_error("number has no integer representation"))
    }

    fn number_expected(&self) -> LuaError {
        LuaError::type_error(format!("number expected, got {}", self.type_name()))
    }

    // ============ Equality ============

    /// Primitive equality: by tag, then by value. Numbers compare by
    /// mathematical value across subtypes; reference types by identity;
    /// strings by content.
    pub fn raw_equals(&self, other: &LuaValue) -> bool {
        match (self, other) {
            (LuaValue::Nil, LuaValue::Nil) => true,
            (LuaValue::Boolean(a), LuaValue::Boolean(b)) => a == b,
            (LuaValue::Integer(a), LuaValue::Integer(b)) => a == b,
            (LuaValue::Float(a), LuaValue::Float(b)) => a == b,
            (LuaValue::Integer(i), LuaValue::Float(f)) | (LuaValue::Float(f), LuaValue::Integer(i)) => {
                float_to_integer(*f) == Some(*i)
            }
            (LuaValue::String(a), LuaValue::String(b)) => Rc::ptr_eq(a, b) || a == b,
            (LuaValue::Table(a), LuaValue::Table(b)) => a.ptr_eq(b),
            (LuaValue::Function(a), LuaValue::Function(b)) => Rc::ptr_eq(a, b),
            (LuaValue::Userdata(a), LuaValue::Userdata(b)) => Rc::ptr_eq(a, b),
            (LuaValue::Thread(a), LuaValue::Thread(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    // ============ Hashing ============

    /// Content hash used to place keys in a table's hash part.
    /// Consistent with `raw_equals` for normalized keys.
    #[inline]
    pub fn hash_value(&self) -> u64 {
        match self {
            LuaValue::Nil => 0,
            LuaValue::Boolean(b) => *b as u64,
            LuaValue::Integer(i) => *i as u64,
            LuaValue::Float(n) => {
                let bits = n.to_bits();
                bits ^ (bits >> 32)
            }
            LuaValue::String(s) => s.hash(),
            LuaValue::Table(t) => ptr_hash(t.as_ptr() as *const u8),
            LuaValue::Function(f) => ptr_hash(Rc::as_ptr(f) as *const u8),
            LuaValue::Userdata(u) => ptr_hash(Rc::as_ptr(u) as *const u8),
            LuaValue::Thread(t) => ptr_hash(Rc::as_ptr(t) as *const u8),
        }
    }

    /// Address of the referenced object, for identity display.
    pub fn raw_ptr_repr(&self) -> *const u8 {
        match self {
            LuaValue::String(s) => Rc::as_ptr(s) as *const u8,
            LuaValue::Table(t) => t.as_ptr() as *const u8,
            LuaValue::Function(f) => Rc::as_ptr(f) as *const u8,
            LuaValue::Userdata(u) => Rc::as_ptr(u) as *const u8,
            LuaValue::Thread(t) => Rc::as_ptr(t) as *const u8,
            _ => std::ptr::null(),
        }
    }

    // ============ Display ============

    /// Locale-independent text form, without consulting `__tostring`.
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }
}

/// Exact integer value of a float, if it has one.
#[inline]
pub fn float_to_integer(n: f64) -> Option<i64> {
    // 2^63 as f64; the cast saturates, so the range check must be exclusive above
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if n.fract() == 0.0 && n >= -LIMIT && n < LIMIT {
        Some(n as i64)
    } else {
        None
    }
}

#[inline(always)]
fn ptr_hash(p: *const u8) -> u64 {
    (p as usize as u64) >> 3
}

impl PartialEq for LuaValue {
    fn eq(&self, other: &Self) -> bool {
        self.raw_equals(other)
    }
}

impl fmt::Debug for LuaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LuaValue::Nil => write!(f, "nil"),
            LuaValue::Boolean(b) => write!(f, "{}", b),
            LuaValue::Integer(i) => write!(f, "{}", i),
            LuaValue::Float(n) => write!(f, "{}", format_float(*n)),
            LuaValue::String(s) => write!(f, "{:?}", s),
            LuaValue::Table(_) => write!(f, "table({:p})", self.raw_ptr_repr()),
            LuaValue::Function(func) => write!(f, "{:?}({:p})", func, self.raw_ptr_repr()),
            LuaValue::Userdata(_) => write!(f, "userdata({:p})", self.raw_ptr_repr()),
            LuaValue::Thread(_) => write!(f, "thread({:p})", self.raw_ptr_repr()),
        }
    }
}

impl fmt::Display for LuaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LuaValue::Nil => f.write_str("nil"),
            LuaValue::Boolean(b) => f.write_str(if *b { "true" } else { "false" }),
            LuaValue::Integer(i) => {
                let mut buf = itoa::Buffer::new();
                f.write_str(buf.format(*i))
            }
            LuaValue::Float(n) => f.write_str(&format_float(*n)),
            LuaValue::String(s) => write!(f, "{}", s),
            LuaValue::Table(_) => write!(f, "table: {:p}", self.raw_ptr_repr()),
            LuaValue::Function(_) => write!(f, "function: {:p}", self.raw_ptr_repr()),
            LuaValue::Userdata(_) => write!(f, "userdata: {:p}", self.raw_ptr_repr()),
            LuaValue::Thread(_) => write!(f, "thread: {:p}", self.raw_ptr_repr()),
        }
    }
}

impl From<bool> for LuaValue {
    fn from(b: bool) -> Self {
        LuaValue::Boolean(b)
    }
}

impl From<i64> for LuaValue {
    fn from(i: i64) -> Self {
        LuaValue::Integer(i)
    }
}

impl From<f64> for LuaValue {
    fn from(n: f64) -> Self {
        LuaValue::Float(n)
    }
}

impl From<&str> for LuaValue {
    fn from(s: &str) -> Self {
        LuaValue::string(s)
    }
}

impl From<TableRef> for LuaValue {
    fn from(t: TableRef) -> Self {
        LuaValue::Table(t)
    }
}
