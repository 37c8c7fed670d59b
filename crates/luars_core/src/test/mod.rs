// Test module organization
pub mod test_convert;
pub mod test_next;
pub mod test_operators;
pub mod test_value;

use crate::LuaValue;

/// Route `log` output through the test harness.
pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) fn s(v: &str) -> LuaValue {
    LuaValue::string(v)
}
