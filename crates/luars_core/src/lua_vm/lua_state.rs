// Lua execution state
// Owns the runtime configuration, the seam to the interpreter for calling
// Lua closures, the shared string metatable and the cycle collector.

use std::rc::Rc;

use crate::gc::{GC, GcStats};
use crate::lua_value::{LuaClosure, LuaFunction, LuaValue, TableRef, Varargs};
use crate::lua_vm::execute::{arithmetic, comparison, concat, metamethod};
use crate::lua_vm::safe_option::SafeOption;
use crate::lua_vm::{ArithOp, LuaError, LuaResult, TmKind};

/// Invocation primitive supplied by the interpreter.
///
/// Native functions are called directly; closures compiled from Lua code are
/// opaque to the core and handed to this handler.
pub trait LuaCallHandler {
    fn call_closure(
        &self,
        state: &mut LuaState,
        closure: &LuaClosure,
        args: Varargs,
    ) -> LuaResult<Varargs>;
}

pub struct LuaState {
    option: SafeOption,
    call_handler: Option<Rc<dyn LuaCallHandler>>,
    /// Metatable shared by all strings
    string_mt: Option<TableRef>,
    /// Nesting of calls made through `call`
    call_depth: usize,
    /// Pre-filled nil slice, `option.nil_fill_size` long
    nils: Box<[LuaValue]>,
    /// Interned metatag keys, indexed by `TmKind`
    tm_names: Box<[LuaValue]>,
    gc: GC,
}

impl LuaState {
    pub fn new(option: SafeOption) -> Self {
        let nils = vec![LuaValue::Nil; option.nil_fill_size].into_boxed_slice();
        let tm_names = TmKind::ALL
            .iter()
            .map(|tm| LuaValue::string(tm.name()))
            .collect();
        let gc = GC::new(&option);
        LuaState {
            option,
            call_handler: None,
            string_mt: None,
            call_depth: 0,
            nils,
            tm_names,
            gc,
        }
    }

    #[inline(always)]
    pub fn option(&self) -> &SafeOption {
        &self.option
    }

    pub fn set_call_handler(&mut self, handler: Rc<dyn LuaCallHandler>) {
        self.call_handler = Some(handler);
    }

    #[inline(always)]
    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    /// `n` nils, at most `nil_fill_size`.
    pub fn nils(&self, n: usize) -> &[LuaValue] {
        &self.nils[..n.min(self.nils.len())]
    }

    #[inline(always)]
    pub(crate) fn tm_name(&self, tm: TmKind) -> &LuaValue {
        &self.tm_names[tm as usize]
    }

    // ============ Tables and collection ============

    /// Create a table tracked by the cycle collector.
    pub fn create_table(&mut self, narr: usize, nrec: usize) -> TableRef {
        self.gc.check_gc();
        let table = TableRef::new(narr, nrec);
        self.gc.track(&table);
        table
    }

    /// Reclaim tables kept alive only by reference cycles among themselves.
    pub fn collect_garbage(&mut self) -> GcStats {
        self.gc.full_gc()
    }

    pub fn gc_tracked(&self) -> usize {
        self.gc.tracked()
    }

    // ============ Metatables ============

    pub fn string_metatable(&self) -> Option<TableRef> {
        self.string_mt.clone()
    }

    pub fn set_string_metatable(&mut self, metatable: Option<TableRef>) {
        self.string_mt = metatable;
    }

    pub fn get_metatable(&self, value: &LuaValue) -> Option<TableRef> {
        metamethod::get_metatable(self, value)
    }

    /// What `getmetatable(v)` reports: the `__metatable` field when the
    /// metatable has one, the metatable itself otherwise, nil without one.
    pub fn get_metatable_field(&self, value: &LuaValue) -> LuaValue {
        match self.get_metatable(value) {
            Some(mt) => {
                let field = mt.raw_get(self.tm_name(TmKind::Metatable));
                if field.is_nil() {
                    LuaValue::Table(mt)
                } else {
                    field
                }
            }
            None => LuaValue::Nil,
        }
    }

    /// Attach, replace or detach the metatable of a table or userdata.
    /// Fails when the current metatable is protected by `__metatable`.
    pub fn set_metatable(&mut self, value: &LuaValue, metatable: Option<TableRef>) -> LuaResult<()> {
        match value {
            LuaValue::Table(t) => t.set_metatable(metatable),
            LuaValue::Userdata(ud) => {
                if let Some(current) = ud.get_metatable() {
                    if !current.raw_get(self.tm_name(TmKind::Metatable)).is_nil() {
                        log::debug!("rejected metatable change on protected userdata");
                        return Err(LuaError::runtime_error("cannot change a protected metatable"));
                    }
                }
                ud.set_metatable(metatable);
                Ok(())
            }
            _ => Err(LuaError::type_error(format!(
                "cannot set the metatable of a {} value",
                value.type_name()
            ))),
        }
    }

    // ============ Calls ============

    /// Invoke `func` with `args`. Non-functions are redirected to their
    /// `__call` tag method with `func` prepended to the arguments.
    pub fn call(&mut self, func: &LuaValue, args: Varargs) -> LuaResult<Varargs> {
        if self.call_depth >= self.option.max_call_depth {
            return Err(LuaError::runtime_error("stack overflow"));
        }
        self.call_depth += 1;
        let result = self.dispatch_call(func, args);
        self.call_depth -= 1;
        result
    }

    /// `call`, keeping only the first result.
    pub fn call1(&mut self, func: &LuaValue, args: Varargs) -> LuaResult<LuaValue> {
        Ok(self.call(func, args)?.arg1())
    }

    fn dispatch_call(&mut self, func: &LuaValue, args: Varargs) -> LuaResult<Varargs> {
        match func {
            LuaValue::Function(f) => match &**f {
                LuaFunction::Native(native) => native.call(self, args),
                LuaFunction::Closure(closure) => match self.call_handler.clone() {
                    Some(handler) => handler.call_closure(self, closure, args),
                    None => Err(LuaError::runtime_error(
                        "cannot call a Lua closure: no interpreter attached",
                    )),
                },
            },
            _ => {
                let tm = metamethod::get_metamethod(self, func, TmKind::Call);
                if tm.is_nil() {
                    return Err(LuaError::type_error(format!(
                        "attempt to call a {} value",
                        func.type_name()
                    )));
                }
                self.call(&tm, args.prepend(func.clone()))
            }
        }
    }

    // ============ Indexing ============

    /// `obj[key]`, following `__index`.
    pub fn index(&mut self, obj: &LuaValue, key: &LuaValue) -> LuaResult<LuaValue> {
        metamethod::index(self, obj, key)
    }

    /// `obj[key] = value`, following `__newindex`.
    pub fn new_index(&mut self, obj: &LuaValue, key: &LuaValue, value: LuaValue) -> LuaResult<()> {
        metamethod::new_index(self, obj, key, value)
    }

    // ============ Operators ============

    pub fn arith(&mut self, op: ArithOp, a: &LuaValue, b: &LuaValue) -> LuaResult<LuaValue> {
        arithmetic::arith(self, op, a, b)
    }

    pub fn unm(&mut self, a: &LuaValue) -> LuaResult<LuaValue> {
        arithmetic::unm(self, a)
    }

    pub fn len(&mut self, value: &LuaValue) -> LuaResult<LuaValue> {
        metamethod::len(self, value)
    }

    pub fn concat(&mut self, a: &LuaValue, b: &LuaValue) -> LuaResult<LuaValue> {
        concat::concat(self, a, b)
    }

    pub fn concat_all(&mut self, values: &[LuaValue]) -> LuaResult<LuaValue> {
        concat::concat_all(self, values)
    }

    pub fn equals(&mut self, a: &LuaValue, b: &LuaValue) -> LuaResult<bool> {
        comparison::equals(self, a, b)
    }

    pub fn less_than(&mut self, a: &LuaValue, b: &LuaValue) -> LuaResult<bool> {
        comparison::less_than(self, a, b)
    }

    pub fn less_equal(&mut self, a: &LuaValue, b: &LuaValue) -> LuaResult<bool> {
        comparison::less_equal(self, a, b)
    }

    /// `tostring(v)`, honouring `__tostring`.
    pub fn tostring(&mut self, value: &LuaValue) -> LuaResult<LuaValue> {
        metamethod::tostring(self, value)
    }
}

impl Default for LuaState {
    fn default() -> Self {
        Self::new(SafeOption::default())
    }
}
