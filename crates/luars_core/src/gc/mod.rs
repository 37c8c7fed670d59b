// Cycle collector for reference-counted tables
//
// Tables are shared through `Rc`, so acyclic garbage is reclaimed as soon as
// the last handle drops. Cycles (a table used as its own metatable, two tables
// pointing at each other) are reclaimed here by trial deletion:
//
// - Count, for every tracked table, the references held by other tracked tables
//   (array slots, hash keys and values including dead keys, metatable slot).
// - A table whose strong count exceeds that internal count is referenced from
//   outside the tracked graph (host variables, call arguments, closures,
//   userdata, untracked tables) and is a root.
// - Mark everything reachable from the roots through tracked tables.
// - Unmarked tables are only kept alive by each other: clear their contents,
//   which breaks the cycles and lets `Rc` free them.
//
// Anything the collector cannot see through (native closures, userdata) counts
// as an external reference, so the collector only ever errs on keeping things.
//
// `__mode` is recognized (see `LuaTable::weak_mode`) but weak entries are still
// held strongly.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ahash::AHashMap;

use crate::lua_value::{LuaTable, LuaValue, TableRef};
use crate::lua_vm::SafeOption;

type TablePtr = *const RefCell<LuaTable>;

/// Statistics of one collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GcStats {
    /// Tables tracked when the collection started.
    pub tracked: usize,
    /// Tables found reachable.
    pub survived: usize,
    /// Tables cleared as unreachable cycles.
    pub collected: usize,
}

pub struct GC {
    tables: Vec<Weak<RefCell<LuaTable>>>,
    /// Tracked count that triggers the next automatic collection.
    threshold: usize,
    pause: usize,
    min_tables: usize,
}

impl GC {
    pub fn new(option: &SafeOption) -> Self {
        GC {
            tables: Vec::new(),
            threshold: option.gc_min_tables,
            pause: option.gc_pause,
            min_tables: option.gc_min_tables,
        }
    }

    /// Start tracking `table` for cycle collection.
    pub fn track(&mut self, table: &TableRef) {
        self.tables.push(Rc::downgrade(table.rc()));
    }

    /// Number of tracked entries, including ones already freed but not yet pruned.
    pub fn tracked(&self) -> usize {
        self.tables.len()
    }

    #[inline]
    pub fn should_collect(&self) -> bool {
        self.tables.len() >= self.threshold
    }

    /// Run a collection if the tracked count passed the threshold.
    pub fn check_gc(&mut self) -> Option<GcStats> {
        if self.should_collect() {
            Some(self.full_gc())
        } else {
            None
        }
    }

    /// Run a full collection.
    pub fn full_gc(&mut self) -> GcStats {
        let live: Vec<Rc<RefCell<LuaTable>>> =
            self.tables.iter().filter_map(Weak::upgrade).collect();
        let index: AHashMap<TablePtr, usize> = live
            .iter()
            .enumerate()
            .map(|(i, rc)| (Rc::as_ptr(rc), i))
            .collect();

        // Phase 1: internal reference counts
        let mut internal = vec![0usize; live.len()];
        let mut opaque = vec![false; live.len()];
        for (i, rc) in live.iter().enumerate() {
            let Ok(table) = rc.try_borrow() else {
                // in use by a caller: keep it and everything it reaches
                opaque[i] = true;
                continue;
            };
            table.for_each_reference(|value| {
                if let LuaValue::Table(t) = value {
                    if let Some(&j) = index.get(&t.as_ptr()) {
                        internal[j] += 1;
                    }
                }
            });
        }

        // Phase 2: roots, then propagate
        let mut marked = vec![false; live.len()];
        let mut gray: Vec<usize> = Vec::new();
        for (i, rc) in live.iter().enumerate() {
            // `live` itself holds one strong reference
            let external = Rc::strong_count(rc).saturating_sub(1 + internal[i]);
            if external > 0 || opaque[i] {
                marked[i] = true;
                gray.push(i);
            }
        }
        while let Some(i) = gray.pop() {
            let Ok(table) = live[i].try_borrow() else {
                continue;
            };
            table.for_each_reference(|value| {
                if let LuaValue::Table(t) = value {
                    if let Some(&j) = index.get(&t.as_ptr()) {
                        if !marked[j] {
                            marked[j] = true;
                            gray.push(j);
                        }
                    }
                }
            });
        }

        // Phase 3: clear garbage; contents drop after every borrow is released
        let mut dropped: Vec<Vec<LuaValue>> = Vec::new();
        let mut survivors = Vec::new();
        for (i, rc) in live.iter().enumerate() {
            if marked[i] {
                survivors.push(Rc::downgrade(rc));
            } else if let Ok(mut table) = rc.try_borrow_mut() {
                dropped.push(table.clear());
            }
        }

        let stats = GcStats {
            tracked: live.len(),
            survived: survivors.len(),
            collected: live.len() - survivors.len(),
        };
        self.tables = survivors;
        self.threshold = (stats.survived * self.pause / 100).max(self.min_tables);
        drop(dropped);
        drop(live);

        if stats.collected > 0 {
            log::debug!(
                "cycle collection: {} tracked, {} collected, next at {}",
                stats.tracked,
                stats.collected,
                self.threshold
            );
        }
        stats
    }
}
