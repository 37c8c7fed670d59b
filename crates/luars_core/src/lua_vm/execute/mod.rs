// Operator semantics layered over the raw value and table operations
pub(crate) mod arithmetic;
pub(crate) mod comparison;
pub(crate) mod concat;
pub(crate) mod metamethod;

pub use arithmetic::ArithOp;
pub use metamethod::TmKind;
