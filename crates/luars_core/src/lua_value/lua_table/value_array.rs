use crate::lua_value::LuaValue;

/// Array part of a table: slots for integer keys `1..=len()`.
///
/// Slots may hold nil (holes). The border is tracked incrementally: it moves
/// forward when the slot after it is filled and walks back over the nil tail
/// when its last slot is cleared. The table shrinks it only while inserting a
/// new key, so keys handed out by `next` stay valid while entries are being
/// removed.
pub struct LuaValueArray {
    array: Vec<LuaValue>,
    border: usize,
    live: usize,
}

impl LuaValueArray {
    pub fn new(capacity: usize) -> Self {
        Self {
            array: Vec::with_capacity(capacity),
            border: 0,
            live: 0,
        }
    }

    /// Number of slots (not the border).
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.array.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    /// Border reported by the length operator.
    #[inline(always)]
    pub fn border(&self) -> usize {
        self.border
    }

    /// Non-nil slots.
    #[inline(always)]
    pub fn live(&self) -> usize {
        self.live
    }

    /// Whether `key` addresses an existing slot.
    #[inline(always)]
    pub fn contains(&self, key: i64) -> bool {
        key >= 1 && (key as u64) <= self.array.len() as u64
    }

    #[inline(always)]
    pub fn get_int(&self, key: i64) -> Option<&LuaValue> {
        if key >= 1 {
            self.array.get((key - 1) as usize)
        } else {
            None
        }
    }

    /// Overwrite an existing slot. `key` must satisfy `contains`.
    pub fn set_int(&mut self, key: i64, value: LuaValue) {
        let index = (key - 1) as usize;
        let was_nil = self.array[index].is_nil();
        let is_nil = value.is_nil();
        self.array[index] = value;

        match (was_nil, is_nil) {
            (true, false) => {
                self.live += 1;
                if index == self.border {
                    self.advance_border();
                }
            }
            (false, true) => {
                self.live -= 1;
                if index + 1 == self.border {
                    self.retreat_border();
                }
            }
            _ => {}
        }
    }

    /// Append a non-nil value at key `len() + 1`.
    pub fn push(&mut self, value: LuaValue) {
        debug_assert!(!value.is_nil());
        self.array.push(value);
        self.live += 1;
        if self.border + 1 == self.array.len() {
            self.border += 1;
        }
    }

    /// Fewer than half of the slots are in use.
    #[inline]
    pub fn is_sparse(&self) -> bool {
        self.live * 2 < self.array.len()
    }

    /// Slot count at which an append reconsiders the array size.
    #[inline]
    pub fn at_resize_point(&self) -> bool {
        self.array.len() >= 4 && self.array.len().is_power_of_two()
    }

    /// Largest power of two `n` such that more than half of the keys `1..=n`
    /// are in use, capped at the current slot count.
    pub fn optimal_size(&self) -> usize {
        let mut optimal = 0;
        let mut count = 0;
        let mut slot = 0;
        let mut twotoi = 1usize;
        while twotoi / 2 < self.live {
            let end = twotoi.min(self.array.len());
            while slot < end {
                if !self.array[slot].is_nil() {
                    count += 1;
                }
                slot += 1;
            }
            if count > twotoi / 2 {
                optimal = end;
            }
            twotoi *= 2;
        }
        optimal
    }

    /// Cut the array down to `size` slots, returning the live entries that
    /// were beyond it with their keys.
    pub fn truncate(&mut self, size: usize) -> Vec<(i64, LuaValue)> {
        if size >= self.array.len() {
            return Vec::new();
        }
        let tail = self.array.split_off(size);
        self.array.shrink_to_fit();
        let moved: Vec<(i64, LuaValue)> = tail
            .into_iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nil())
            .map(|(i, v)| ((size + i + 1) as i64, v))
            .collect();
        self.live -= moved.len();
        if self.border > size {
            self.border = size;
            self.retreat_border();
        }
        moved
    }

    /// Slot index (0-based) of the first non-nil value at or after `from`.
    pub fn next_live(&self, from: usize) -> Option<usize> {
        (from..self.array.len()).find(|&i| !self.array[i].is_nil())
    }

    pub fn iter(&self) -> impl Iterator<Item = &LuaValue> {
        self.array.iter()
    }

    /// Remove every slot, returning the old contents.
    pub fn take(&mut self) -> Vec<LuaValue> {
        self.border = 0;
        self.live = 0;
        std::mem::take(&mut self.array)
    }

    fn advance_border(&mut self) {
        while self.border < self.array.len() && !self.array[self.border].is_nil() {
            self.border += 1;
        }
    }

    fn retreat_border(&mut self) {
        while self.border > 0 && self.array[self.border - 1].is_nil() {
            self.border -= 1;
        }
    }
}
