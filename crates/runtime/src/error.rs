//! Runtime Error Handling
//!
//! Every fallible runtime operation returns [`Result`]. Errors raised by user
//! code (comparators, custom `inspect`/`to_s`, equality or hash hooks) travel
//! through the same channel and reach the caller unchanged.
//!
//! # Usage
//!
//! ```ignore
//! if index < 0 {
//!     return Err(RuntimeError::argument("index too small"));
//! }
//! ```
//!
//! Embedders turn the error into their own reporting at the top level:
//! ```ignore
//! match slash_runtime::send(&receiver, "sort", &[]) {
//!     Ok(sorted) => ...,
//!     Err(RuntimeError::Exit(code)) => std::process::exit(code),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

use crate::value::Value;
use std::fmt;

/// Result type used throughout the runtime
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Error kinds raised by the runtime core
#[derive(Debug, Clone)]
pub enum RuntimeError {
    /// ArgumentError: a well-typed argument with an unacceptable value
    Argument(String),
    /// TypeError: an argument or callback result of the wrong class
    Type(String),
    /// Invalid operation on an object in the wrong state
    InvalidOperation(String),
    /// NoMethodError: the receiver's class does not define the method
    NoMethod { class: String, method: String },
    /// A value raised by user code, propagated unchanged
    Thrown(Value),
    /// Exit request carrying the process exit code
    Exit(i32),
}

impl RuntimeError {
    pub fn argument(msg: impl Into<String>) -> Self {
        RuntimeError::Argument(msg.into())
    }

    pub fn type_error(msg: impl Into<String>) -> Self {
        RuntimeError::Type(msg.into())
    }

    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        RuntimeError::InvalidOperation(msg.into())
    }

    pub fn no_method(class: impl Into<String>, method: impl Into<String>) -> Self {
        RuntimeError::NoMethod {
            class: class.into(),
            method: method.into(),
        }
    }

    /// Name of the runtime error class this error is reported as
    pub fn class_name(&self) -> &'static str {
        match self {
            RuntimeError::Argument(_) => "ArgumentError",
            RuntimeError::Type(_) => "TypeError",
            RuntimeError::InvalidOperation(_) => "Error",
            RuntimeError::NoMethod { .. } => "NoMethodError",
            RuntimeError::Thrown(_) => "Error",
            RuntimeError::Exit(_) => "Exit",
        }
    }

    /// Exit code if this error is an exit request
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            RuntimeError::Exit(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::Argument(msg) => write!(f, "ArgumentError: {}", msg),
            RuntimeError::Type(msg) => write!(f, "TypeError: {}", msg),
            RuntimeError::InvalidOperation(msg) => write!(f, "Error: {}", msg),
            RuntimeError::NoMethod { class, method } => {
                write!(f, "NoMethodError: undefined method '{}' for {}", method, class)
            }
            RuntimeError::Thrown(value) => match value.inspect() {
                Ok(text) => write!(f, "Error: {}", text),
                Err(_) => write!(f, "Error: <{}>", value.type_name()),
            },
            RuntimeError::Exit(code) => write!(f, "exit({})", code),
        }
    }
}

impl std::error::Error for RuntimeError {}
