use crate::lua_value::LuaValue;
use crate::lua_vm::lua_limits::{hash_capacity_for, hash_load_limit};

/// Hash part of a table - chained scatter over an entry arena.
///
/// Layout:
/// 1. `nodes` is an arena of entries in insertion order, at most `capacity` long
/// 2. `slots[main_position(key)]` holds the index of the most recently
///    inserted node for that position, each node links to the next one
///    through `next`
/// 3. Removing a key only clears its value. The dead key keeps its place in
///    the chain so an in-progress traversal can still find it; dead nodes are
///    dropped by the next rehash
///
/// Invariant: `live <= hash_load_limit(capacity) < capacity`.
pub struct LuaHashTable {
    nodes: Vec<Node>,
    slots: Vec<u32>,
    capacity: usize,
    live: usize,
}

struct Node {
    key: LuaValue,
    value: LuaValue,
    /// Next node sharing the same main position, `NO_NODE` = chain end
    next: u32,
}

const NO_NODE: u32 = u32::MAX;

impl Node {
    #[inline(always)]
    fn is_dead(&self) -> bool {
        self.value.is_nil()
    }
}

impl LuaHashTable {
    /// Create a hash part able to hold `size` keys without growing.
    pub fn new(size: usize) -> Self {
        let mut table = Self {
            nodes: Vec::new(),
            slots: Vec::new(),
            capacity: 0,
            live: 0,
        };
        if size > 0 {
            table.resize(hash_capacity_for(size));
        }
        table
    }

    /// Allocated capacity.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live keys.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    #[inline(always)]
    fn main_position(&self, key: &LuaValue) -> usize {
        (key.hash_value() % self.capacity as u64) as usize
    }

    /// Index of the node holding `key`, dead or alive.
    fn find_node(&self, key: &LuaValue) -> Option<usize> {
        if self.capacity == 0 {
            return None;
        }
        let mut idx = self.slots[self.main_position(key)];
        while idx != NO_NODE {
            let node = &self.nodes[idx as usize];
            if node.key.raw_equals(key) {
                return Some(idx as usize);
            }
            idx = node.next;
        }
        None
    }

    #[inline]
    pub fn get(&self, key: &LuaValue) -> Option<&LuaValue> {
        self.find_node(key)
            .map(|idx| &self.nodes[idx].value)
            .filter(|v| !v.is_nil())
    }

    /// Fast path for integer keys: no temporary `LuaValue` on the caller side.
    #[inline]
    pub fn get_int(&self, key: i64) -> Option<&LuaValue> {
        if self.capacity == 0 {
            return None;
        }
        let mut idx = self.slots[(key as u64 % self.capacity as u64) as usize];
        while idx != NO_NODE {
            let node = &self.nodes[idx as usize];
            if let LuaValue::Integer(k) = node.key {
                if k == key {
                    return if node.is_dead() { None } else { Some(&node.value) };
                }
            }
            idx = node.next;
        }
        None
    }

    /// Insert or update a key with a non-nil value. The key must already be
    /// normalized (no nil, no NaN, no integral floats).
    pub fn insert(&mut self, key: LuaValue, value: LuaValue) {
        debug_assert!(!value.is_nil());

        let existing = self.find_node(&key);
        if let Some(idx) = existing {
            if !self.nodes[idx].is_dead() {
                self.nodes[idx].value = value;
                return;
            }
        }

        // A new live key
        if self.live + 1 > hash_load_limit(self.capacity) {
            self.rehash(self.live + 1);
            self.insert_new_key(key, value);
            return;
        }
        if let Some(idx) = existing {
            // Revive the dead node in place, its chain link is still valid
            self.nodes[idx].value = value;
            self.live += 1;
            return;
        }
        if self.nodes.len() == self.capacity {
            // Arena full of dead nodes: compact
            self.rehash(self.live + 1);
        }
        self.insert_new_key(key, value);
    }

    /// Remove `key`, returning its value if it was live.
    pub fn remove(&mut self, key: &LuaValue) -> Option<LuaValue> {
        let idx = self.find_node(key)?;
        let node = &mut self.nodes[idx];
        if node.is_dead() {
            return None;
        }
        self.live -= 1;
        Some(std::mem::take(&mut node.value))
    }

    /// Append a node and link it at the head of its chain.
    /// Caller guarantees there is room in the arena.
    /// Inserting `key` would grow the node arena.
    pub fn needs_rehash_for(&self, key: &LuaValue) -> bool {
        self.get(key).is_none() && self.live + 1 > hash_load_limit(self.capacity)
    }

    fn insert_new_key(&mut self, key: LuaValue, value: LuaValue) {
        debug_assert!(self.nodes.len() < self.capacity);
        let mp = self.main_position(&key);
        let idx = self.nodes.len() as u32;
        self.nodes.push(Node {
            key,
            value,
            next: self.slots[mp],
        });
        self.slots[mp] = idx;
        self.live += 1;
    }

    /// Rebuild for at least `needed` live keys. Never shrinks the capacity.
    fn rehash(&mut self, needed: usize) {
        let new_capacity = hash_capacity_for(needed).max(self.capacity);
        log::trace!(
            "rehash hash part: capacity {} -> {}, {} live keys",
            self.capacity,
            new_capacity,
            self.live
        );
        self.resize(new_capacity);
    }

    fn resize(&mut self, new_capacity: usize) {
        let old_nodes = std::mem::replace(&mut self.nodes, Vec::with_capacity(new_capacity));
        self.slots = vec![NO_NODE; new_capacity];
        self.capacity = new_capacity;
        self.live = 0;

        for node in old_nodes {
            if !node.is_dead() {
                self.insert_new_key(node.key, node.value);
            }
        }
    }

    /// Traversal position of `key`: the index of its node, dead or alive.
    #[inline]
    pub fn position_of(&self, key: &LuaValue) -> Option<usize> {
        self.find_node(key)
    }

    /// First live entry at node index `from` or later.
    pub fn next_from(&self, from: usize) -> Option<(&LuaValue, &LuaValue)> {
        self.nodes
            .iter()
            .skip(from)
            .find(|node| !node.is_dead())
            .map(|node| (&node.key, &node.value))
    }

    /// Live entries in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = (&LuaValue, &LuaValue)> {
        self.nodes
            .iter()
            .filter(|node| !node.is_dead())
            .map(|node| (&node.key, &node.value))
    }

    /// Every key and value held by the arena, including dead keys.
    pub(crate) fn for_each_reference(&self, mut f: impl FnMut(&LuaValue)) {
        for node in &self.nodes {
            f(&node.key);
            f(&node.value);
        }
    }

    /// Drop every entry, returning the old keys and values. Capacity is kept.
    pub fn take(&mut self) -> Vec<(LuaValue, LuaValue)> {
        let nodes = std::mem::take(&mut self.nodes);
        self.slots.fill(NO_NODE);
        self.live = 0;
        nodes.into_iter().map(|n| (n.key, n.value)).collect()
    }
}
