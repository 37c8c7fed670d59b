//! Centralized limits for the value and table core.
//!
//! All magic numbers that control table growth and tag-method resolution
//! are collected here.

// ===== Metamethods =====

/// Maximum number of hops through `__index` / `__newindex` chains.
pub const MAXTAGLOOP: usize = 100;

/// Default maximum nesting of calls made through the core (metamethods, `__call`).
pub const MAX_CALL_DEPTH: usize = 200;

/// Default length of the shared pre-filled nil slice.
pub const NIL_FILL_SIZE: usize = 250;

/// Default pause before a cycle collection, as a percentage of the tables
/// that survived the previous one.
pub const DEFAULT_GC_PAUSE: usize = 200;

/// Number of tracked tables below which no cycle collection is attempted.
pub const GC_MIN_TABLES: usize = 64;

// ===== Hash part =====

/// Hash-part capacities, in growth order. Past the last entry the ladder
/// continues with `cap + cap / 3`.
pub const HASH_CAPACITIES: [usize; 8] = [0, 2, 4, 7, 10, 14, 19, 25];

/// A hash part of capacity `c` holds at most `c * LOAD_NUM / LOAD_DEN` live keys.
pub const LOAD_NUM: usize = 6;
pub const LOAD_DEN: usize = 7;

/// Maximum number of live keys a hash part of `capacity` may hold.
#[inline]
pub const fn hash_load_limit(capacity: usize) -> usize {
    capacity * LOAD_NUM / LOAD_DEN
}

/// Smallest ladder capacity able to hold `count` live keys.
pub fn hash_capacity_for(count: usize) -> usize {
    for &cap in HASH_CAPACITIES.iter() {
        if hash_load_limit(cap) >= count {
            return cap;
        }
    }
    let mut cap = HASH_CAPACITIES[HASH_CAPACITIES.len() - 1];
    while hash_load_limit(cap) < count {
        cap += cap / 3;
    }
    cap
}
