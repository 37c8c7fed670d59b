use crate::lua_vm::lua_limits::{
    DEFAULT_GC_PAUSE, GC_MIN_TABLES, MAX_CALL_DEPTH, MAXTAGLOOP, NIL_FILL_SIZE,
};

/// Per-state runtime configuration.
///
/// Created once together with a `LuaState` and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SafeOption {
    /// Hops allowed through `__index` / `__newindex` chains.
    pub max_tag_loop: usize,
    /// Maximum nesting of calls made through the core.
    pub max_call_depth: usize,
    /// Length of the pre-filled nil slice returned by `LuaState::nils`.
    pub nil_fill_size: usize,
    /// Cycle collection runs once the tracked table count grows past
    /// `gc_pause` percent of the count that survived the last collection.
    pub gc_pause: usize,
    /// Tracked table count below which no collection is attempted.
    pub gc_min_tables: usize,
}

impl Default for SafeOption {
    fn default() -> Self {
        Self {
            max_tag_loop: MAXTAGLOOP,
            max_call_depth: MAX_CALL_DEPTH,
            nil_fill_size: NIL_FILL_SIZE,
            gc_pause: DEFAULT_GC_PAUSE,
            gc_min_tables: GC_MIN_TABLES,
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let option: SafeOption = serde_json::from_str(r#"{ "max_tag_loop": 8 }"#).unwrap();
        assert_eq!(option.max_tag_loop, 8);
        assert_eq!(option.max_call_depth, MAX_CALL_DEPTH);
        assert_eq!(option.gc_min_tables, GC_MIN_TABLES);
    }
}
