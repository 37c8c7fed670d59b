use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use smol_str::SmolStr;

use crate::lua_value::{TableRef, Varargs};
use crate::lua_vm::{LuaResult, LuaState};

/// Signature of a native (Rust) function callable from Lua.
pub type NativeFn = dyn Fn(&mut LuaState, Varargs) -> LuaResult<Varargs>;

/// A callable value.
///
/// Native functions are invoked directly by the core. Closures belong to the
/// interpreter: the core only carries them around and hands them back to the
/// state's `LuaCallHandler` when one needs to run.
pub enum LuaFunction {
    Native(NativeFunction),
    Closure(LuaClosure),
}

pub struct NativeFunction {
    name: SmolStr,
    func: Box<NativeFn>,
}

impl NativeFunction {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn call(&self, state: &mut LuaState, args: Varargs) -> LuaResult<Varargs> {
        (self.func)(state, args)
    }
}

/// Interpreter-owned closure. The payload is opaque to the core.
pub struct LuaClosure {
    payload: Rc<dyn Any>,
}

impl LuaClosure {
    pub fn new(payload: Rc<dyn Any>) -> Self {
        Self { payload }
    }

    pub fn payload(&self) -> &Rc<dyn Any> {
        &self.payload
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl LuaFunction {
    pub fn native<F>(name: &str, func: F) -> Self
    where
        F: Fn(&mut LuaState, Varargs) -> LuaResult<Varargs> + 'static,
    {
        LuaFunction::Native(NativeFunction {
            name: SmolStr::new(name),
            func: Box::new(func),
        })
    }

    pub fn closure<T: Any>(payload: T) -> Self {
        LuaFunction::Closure(LuaClosure::new(Rc::new(payload)))
    }

    pub fn name(&self) -> &str {
        match self {
            LuaFunction::Native(f) => f.name(),
            LuaFunction::Closure(_) => "?",
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, LuaFunction::Native(_))
    }
}

impl fmt::Debug for LuaFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LuaFunction::Native(n) => write!(f, "native function '{}'", n.name),
            LuaFunction::Closure(_) => write!(f, "closure"),
        }
    }
}

/// Opaque host object with an optional per-object metatable.
pub struct LuaUserdata {
    data: RefCell<Box<dyn Any>>,
    metatable: RefCell<Option<TableRef>>,
}

impl LuaUserdata {
    pub fn new<T: Any>(data: T) -> Self {
        Self {
            data: RefCell::new(Box::new(data)),
            metatable: RefCell::new(None),
        }
    }

    /// Run `f` against the host value if it has type `T`.
    pub fn with<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let data = self.data.borrow();
        data.downcast_ref::<T>().map(f)
    }

    pub fn with_mut<T: Any, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut data = self.data.borrow_mut();
        data.downcast_mut::<T>().map(f)
    }

    pub fn get_metatable(&self) -> Option<TableRef> {
        self.metatable.borrow().clone()
    }

    pub fn set_metatable(&self, metatable: Option<TableRef>) {
        *self.metatable.borrow_mut() = metatable;
    }
}

impl fmt::Debug for LuaUserdata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LuaUserdata").finish_non_exhaustive()
    }
}

/// Coroutine handle. The scheduler owns what is inside; the core never looks.
pub struct LuaThread {
    handle: Box<dyn Any>,
}

impl LuaThread {
    pub fn new<T: Any>(handle: T) -> Self {
        Self {
            handle: Box::new(handle),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.handle.downcast_ref::<T>()
    }
}

impl fmt::Debug for LuaThread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LuaThread").finish_non_exhaustive()
    }
}
