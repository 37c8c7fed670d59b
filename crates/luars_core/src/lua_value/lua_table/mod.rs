// LuaTable - hybrid array + hash container
mod hash_table;
mod value_array;

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::lua_value::lua_table::{hash_table::LuaHashTable, value_array::LuaValueArray};
use crate::lua_value::{LuaValue, float_to_integer};
use crate::lua_vm::{LuaError, LuaResult, TmKind};

pub struct LuaTable {
    array: LuaValueArray,
    hash: LuaHashTable,
    meta: Option<TableRef>,
}

/// Normalized form of a key: integral floats become integers.
/// Fails for nil and NaN.
fn normalize_key(key: &LuaValue) -> LuaResult<LuaValue> {
    match key {
        LuaValue::Nil => Err(LuaError::key_error("nil")),
        LuaValue::Float(n) if n.is_nan() => Err(LuaError::key_error("NaN")),
        LuaValue::Float(n) => Ok(match float_to_integer(*n) {
            Some(i) => LuaValue::Integer(i),
            None => key.clone(),
        }),
        _ => Ok(key.clone()),
    }
}

impl LuaTable {
    /// Create a table with room for `asize` array slots and `hsize` hash keys.
    pub fn new(asize: usize, hsize: usize) -> Self {
        Self {
            array: LuaValueArray::new(asize),
            hash: LuaHashTable::new(hsize),
            meta: None,
        }
    }

    // ============ Metatable ============

    #[inline(always)]
    pub fn has_metatable(&self) -> bool {
        self.meta.is_some()
    }

    pub fn get_metatable(&self) -> Option<TableRef> {
        self.meta.clone()
    }

    /// Replace the metatable without any protection check.
    pub fn set_metatable(&mut self, metatable: Option<TableRef>) {
        self.meta = metatable;
    }

    // ============ Raw access ============

    /// Value stored under `key`, or nil. Never consults the metatable.
    pub fn raw_get(&self, key: &LuaValue) -> LuaValue {
        match key {
            LuaValue::Integer(i) => self.get_int(*i),
            LuaValue::Float(n) => match float_to_integer(*n) {
                Some(i) => self.get_int(i),
                None => self.hash.get(key).cloned().unwrap_or_default(),
            },
            LuaValue::Nil => LuaValue::Nil,
            _ => self.hash.get(key).cloned().unwrap_or_default(),
        }
    }

    #[inline]
    pub fn get_int(&self, key: i64) -> LuaValue {
        if let Some(v) = self.array.get_int(key) {
            return v.clone();
        }
        self.hash.get_int(key).cloned().unwrap_or_default()
    }

    pub fn get_str(&self, key: &str) -> LuaValue {
        self.raw_get(&LuaValue::string(key))
    }

    /// Store `value` under `key`; nil removes the key.
    /// Fails with `KeyError` for nil and NaN keys, leaving the table untouched.
    pub fn raw_set(&mut self, key: &LuaValue, value: LuaValue) -> LuaResult<()> {
        let key = normalize_key(key)?;
        match key {
            LuaValue::Integer(i) => self.set_int(i, value),
            _ => self.set_hash(key, value),
        }
        Ok(())
    }

    /// Integer-key store: array part for in-range keys and the append
    /// position, hash part otherwise.
    pub fn set_int(&mut self, key: i64, value: LuaValue) {
        if self.array.contains(key) {
            self.array.set_int(key, value);
        } else if key > 0
            && key as u64 == self.array.len() as u64 + 1
            && self.hash.get_int(key).is_none()
        {
            if value.is_nil() {
                return;
            }
            if self.array.at_resize_point() && self.array.is_sparse() && self.shrink_array() {
                // key now lies past the array
                self.set_hash(LuaValue::Integer(key), value);
                return;
            }
            self.array.push(value);
            self.migrate_from_hash();
        } else {
            self.set_hash(LuaValue::Integer(key), value);
        }
    }

    pub fn set_str(&mut self, key: &str, value: LuaValue) {
        self.set_hash(LuaValue::string(key), value);
    }

    fn set_hash(&mut self, key: LuaValue, value: LuaValue) {
        if value.is_nil() {
            self.hash.remove(&key);
        } else {
            if self.array.is_sparse() && self.hash.needs_rehash_for(&key) {
                self.shrink_array();
            }
            self.hash.insert(key, value);
        }
    }

    /// Give back array slots when most of them are empty, moving the live
    /// entries past the new size into the hash part. Only called while a new
    /// key is being inserted.
    fn shrink_array(&mut self) -> bool {
        if self.array.is_empty() {
            return false;
        }
        let size = self.array.optimal_size();
        if size >= self.array.len() {
            return false;
        }
        log::trace!(
            "shrink array part: {} -> {} slots, {} live",
            self.array.len(),
            size,
            self.array.live()
        );
        for (k, v) in self.array.truncate(size) {
            self.hash.insert(LuaValue::Integer(k), v);
        }
        true
    }

    /// After the array part grew, pull the keys that now continue it
    /// out of the hash part.
    fn migrate_from_hash(&mut self) {
        if self.hash.is_empty() {
            return;
        }
        loop {
            let next = self.array.len() as i64 + 1;
            match self.hash.remove(&LuaValue::Integer(next)) {
                Some(v) => self.array.push(v),
                None => break,
            }
        }
    }

    // ============ Length and introspection ============

    /// A border of the table: the array part's border, continued into the
    /// hash part when the array is full and the next key lives there.
    pub fn length(&self) -> usize {
        let border = self.array.border();
        if border < self.array.len()
            || self.hash.is_empty()
            || self.hash.get_int(border as i64 + 1).is_none()
        {
            return border;
        }
        self.hash_border(border as i64 + 1)
    }

    /// Border search in the hash part, `i` being a present key.
    fn hash_border(&self, mut i: i64) -> usize {
        let mut j = i.saturating_mul(2);
        while self.hash.get_int(j).is_some() {
            i = j;
            if j > i64::MAX / 2 {
                // pathological table: linear scan
                let mut k = 1;
                while !self.get_int(k).is_nil() {
                    k += 1;
                }
                return (k - 1) as usize;
            }
            j *= 2;
        }
        while j - i > 1 {
            let m = i + (j - i) / 2;
            if self.hash.get_int(m).is_some() {
                i = m;
            } else {
                j = m;
            }
        }
        i as usize
    }

    /// Live keys across both parts.
    pub fn key_count(&self) -> usize {
        self.array.live() + self.hash.len()
    }

    /// Allocated capacity of the hash part.
    pub fn hash_length(&self) -> usize {
        self.hash.capacity()
    }

    /// Number of array-part slots.
    pub fn array_length(&self) -> usize {
        self.array.len()
    }

    // ============ Iteration ============

    /// Entry following `key` in traversal order; `None` once exhausted.
    ///
    /// Array slots come first in ascending order, then the hash part in node
    /// order. Clearing existing keys during a traversal is safe; adding new
    /// keys is not supported and may skip or repeat entries.
    pub fn next(&self, key: &LuaValue) -> LuaResult<Option<(LuaValue, LuaValue)>> {
        let array_start = match key {
            LuaValue::Nil => Some(0),
            LuaValue::Integer(i) if self.array.contains(*i) => Some(*i as usize),
            LuaValue::Float(n) => match float_to_integer(*n) {
                Some(i) if self.array.contains(i) => Some(i as usize),
                _ => None,
            },
            _ => None,
        };

        let hash_start = match array_start {
            Some(start) => {
                if let Some(idx) = self.array.next_live(start) {
                    let value = self.array.get_int(idx as i64 + 1).cloned().unwrap_or_default();
                    return Ok(Some((LuaValue::Integer(idx as i64 + 1), value)));
                }
                0
            }
            None => {
                let key = normalize_key(key)
                    .map_err(|_| LuaError::runtime_error("invalid key to 'next'"))?;
                match self.hash.position_of(&key) {
                    Some(pos) => pos + 1,
                    None => return Err(LuaError::runtime_error("invalid key to 'next'")),
                }
            }
        };

        Ok(self
            .hash
            .next_from(hash_start)
            .map(|(k, v)| (k.clone(), v.clone())))
    }

    /// Snapshot of all live entries in `next` order.
    pub fn pairs(&self) -> Vec<(LuaValue, LuaValue)> {
        let mut result = Vec::with_capacity(self.key_count());
        for (i, v) in self.array.iter().enumerate() {
            if !v.is_nil() {
                result.push((LuaValue::Integer(i as i64 + 1), v.clone()));
            }
        }
        for (k, v) in self.hash.iter() {
            result.push((k.clone(), v.clone()));
        }
        result
    }

    // ============ Misc ============

    /// `(weak_keys, weak_values)` as declared by the metatable's `__mode`.
    /// Reported for bindings; entries are always held strongly.
    pub fn weak_mode(&self) -> (bool, bool) {
        let Some(mt) = &self.meta else {
            return (false, false);
        };
        // A table may be its own metatable
        let mode = match mt.try_borrow() {
            Some(mt) => mt.get_str(TmKind::Mode.name()),
            None => self.get_str(TmKind::Mode.name()),
        };
        match mode.as_lua_string() {
            Some(s) => (s.as_bytes().contains(&b'k'), s.as_bytes().contains(&b'v')),
            None => (false, false),
        }
    }

    /// Visit every value the table holds a reference to, including dead
    /// hash keys and the metatable.
    pub(crate) fn for_each_reference(&self, mut f: impl FnMut(&LuaValue)) {
        for v in self.array.iter() {
            f(v);
        }
        self.hash.for_each_reference(&mut f);
        if let Some(mt) = &self.meta {
            f(&LuaValue::Table(mt.clone()));
        }
    }

    /// Remove all contents and the metatable, returning what was held so
    /// the caller decides when it is dropped.
    pub(crate) fn clear(&mut self) -> Vec<LuaValue> {
        let mut dropped = self.array.take();
        for (k, v) in self.hash.take() {
            dropped.push(k);
            dropped.push(v);
        }
        if let Some(mt) = self.meta.take() {
            dropped.push(LuaValue::Table(mt));
        }
        dropped
    }
}

impl Drop for LuaTable {
    // Release nested tables iteratively so long chains do not recurse
    fn drop(&mut self) {
        let mut pending = self.clear();
        while let Some(value) = pending.pop() {
            if let LuaValue::Table(t) = &value {
                if Rc::strong_count(t.rc()) == 1 {
                    if let Ok(mut inner) = t.rc().try_borrow_mut() {
                        pending.append(&mut inner.clear());
                    }
                }
            }
        }
    }
}

impl Default for LuaTable {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

/// Shared handle to a table.
///
/// Every holder (array slot, hash entry, metatable slot, host variable) keeps
/// the table alive; equality on handles is identity.
#[derive(Clone, Default)]
pub struct TableRef(Rc<RefCell<LuaTable>>);

impl TableRef {
    pub fn new(asize: usize, hsize: usize) -> Self {
        TableRef(Rc::new(RefCell::new(LuaTable::new(asize, hsize))))
    }

    pub fn from_table(table: LuaTable) -> Self {
        TableRef(Rc::new(RefCell::new(table)))
    }

    #[inline(always)]
    pub fn ptr_eq(&self, other: &TableRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[inline(always)]
    pub fn as_ptr(&self) -> *const RefCell<LuaTable> {
        Rc::as_ptr(&self.0)
    }

    #[inline]
    pub fn borrow(&self) -> Ref<'_, LuaTable> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, LuaTable> {
        self.0.borrow_mut()
    }

    pub fn try_borrow(&self) -> Option<Ref<'_, LuaTable>> {
        self.0.try_borrow().ok()
    }

    pub(crate) fn rc(&self) -> &Rc<RefCell<LuaTable>> {
        &self.0
    }

    // ============ Surface used by the interpreter ============

    pub fn raw_get(&self, key: &LuaValue) -> LuaValue {
        self.borrow().raw_get(key)
    }

    pub fn raw_set(&self, key: &LuaValue, value: LuaValue) -> LuaResult<()> {
        self.borrow_mut().raw_set(key, value)
    }

    pub fn get_int(&self, key: i64) -> LuaValue {
        self.borrow().get_int(key)
    }

    pub fn set_int(&self, key: i64, value: LuaValue) {
        self.borrow_mut().set_int(key, value)
    }

    pub fn next(&self, key: &LuaValue) -> LuaResult<Option<(LuaValue, LuaValue)>> {
        self.borrow().next(key)
    }

    pub fn length(&self) -> usize {
        self.borrow().length()
    }

    pub fn key_count(&self) -> usize {
        self.borrow().key_count()
    }

    pub fn hash_length(&self) -> usize {
        self.borrow().hash_length()
    }

    pub fn get_metatable(&self) -> Option<TableRef> {
        self.borrow().get_metatable()
    }

    /// Metatable-aware read, see `LuaState::index`.
    pub fn get(&self, state: &mut crate::lua_vm::LuaState, key: &LuaValue) -> LuaResult<LuaValue> {
        state.index(&LuaValue::Table(self.clone()), key)
    }

    /// Metatable-aware write, see `LuaState::new_index`.
    pub fn set(
        &self,
        state: &mut crate::lua_vm::LuaState,
        key: &LuaValue,
        value: LuaValue,
    ) -> LuaResult<()> {
        state.new_index(&LuaValue::Table(self.clone()), key, value)
    }

    /// Attach, replace or detach the metatable, refusing when the current
    /// one is protected by a `__metatable` field.
    pub fn set_metatable(&self, metatable: Option<TableRef>) -> LuaResult<()> {
        if let Some(current) = self.get_metatable() {
            if !current.raw_get(&LuaValue::string("__metatable")).is_nil() {
                log::debug!("rejected metatable change on protected table");
                return Err(LuaError::runtime_error("cannot change a protected metatable"));
            }
        }
        self.borrow_mut().set_metatable(metatable);
        Ok(())
    }

    pub fn pairs(&self) -> Vec<(LuaValue, LuaValue)> {
        self.borrow().pairs()
    }
}

impl PartialEq for TableRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl std::fmt::Debug for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "table({:p})", self.as_ptr())
    }
}
