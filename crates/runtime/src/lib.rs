//! Slash Runtime: the Array core
//!
//! Key design principles:
//! - Value: What the language talks about (Nil, Int, String, Array, etc.)
//! - Array: growable sequence shared by reference and mutated in place
//! - Everything that runs user code (comparators, inspect/to_s, equality and
//!   hash hooks) is fallible and its errors propagate unchanged
//!
//! # Modules
//!
//! - `store`: backing store growth/shrink arithmetic
//! - `array`: the Array container
//! - `enumerator`: snapshot Array::Enumerator
//! - `sort`: randomized quicksort
//! - `diff`: hash-table backed set difference
//! - `methods`: method tables and `send`
//! - `system`: exit and strftime
//! - `config`: environment configuration

pub mod array;
pub mod config;
pub mod diff;
pub mod enumerator;
pub mod error;
pub mod methods;
pub mod sort;
pub mod store;
pub mod system;
pub mod value;

// Re-export key types and functions
pub use array::{Array, ItemsView};
pub use config::RuntimeConfig;
pub use diff::{MembershipTable, ValueTable};
pub use enumerator::ArrayEnumerator;
pub use error::{Result, RuntimeError};
pub use methods::{make_array, responds_to, send};
pub use sort::Comparator;
pub use value::{Function, MAX_INT, Object, Value};
