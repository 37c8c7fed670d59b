use thiserror::Error;

/// Errors raised by the value and table core.
///
/// Every variant carries a fully formatted message so a protected-call layer
/// above the core can report it without further context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LuaError {
    /// `nil` or NaN used as a table key
    #[error("table index is {key}")]
    KeyError { key: String },
    /// Operation attempted on operand types it does not support
    #[error("{message}")]
    TypeError { message: String },
    /// Tag-method loop, protected metatable, bad `next` key, stack overflow
    #[error("{message}")]
    RuntimeError { message: String },
}

pub type LuaResult<T> = Result<T, LuaError>;

impl LuaError {
    pub fn key_error(key: impl Into<String>) -> Self {
        LuaError::KeyError { key: key.into() }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        LuaError::TypeError {
            message: message.into(),
        }
    }

    pub fn runtime_error(message: impl Into<String>) -> Self {
        LuaError::RuntimeError {
            message: message.into(),
        }
    }

    /// Short name of the error kind, as reported to embedding code.
    pub fn kind_name(&self) -> &'static str {
        match self {
            LuaError::KeyError { .. } => "KeyError",
            LuaError::TypeError { .. } => "TypeError",
            LuaError::RuntimeError { .. } => "RuntimeError",
        }
    }
}
