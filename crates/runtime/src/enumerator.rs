//! Array::Enumerator
//!
//! Captures a copy of the array's contents when created, so mutating the
//! array afterwards never affects an enumeration in progress.
//!
//! The cursor protocol is "advance, then read":
//!
//! ```text
//! cursor == 0              before the first element
//! 1 <= cursor <= len       positioned at items[cursor - 1]
//! cursor > len             exhausted
//! ```
//!
//! `advance` moves into the exhausted state exactly once (on the call that
//! runs off the end); later calls return false without moving.

use crate::array::Array;
use crate::error::{Result, RuntimeError};
use crate::value::Value;
use std::cell::Cell;
use std::fmt;

const INVALID_OPERATION: &str = "Invalid operation on Array::Enumerator";

#[derive(Default)]
pub struct ArrayEnumerator {
    /// `None` for an enumerator that was never bound to an array
    items: Option<Box<[Value]>>,
    cursor: Cell<usize>,
}

impl ArrayEnumerator {
    pub fn new(array: &Array) -> Self {
        ArrayEnumerator {
            items: Some(array.to_vec().into_boxed_slice()),
            cursor: Cell::new(0),
        }
    }

    /// Enumerator with no captured items; every operation on it fails
    pub fn unbound() -> Self {
        Self::default()
    }

    fn items(&self) -> Result<&[Value]> {
        self.items
            .as_deref()
            .ok_or_else(|| RuntimeError::invalid_operation(INVALID_OPERATION))
    }

    /// Number of captured elements
    pub fn captured_len(&self) -> usize {
        self.items.as_deref().map_or(0, <[Value]>::len)
    }

    /// Move to the next element; false once the end has been passed
    pub fn advance(&self) -> Result<bool> {
        let count = self.items()?.len();
        let at = self.cursor.get();
        if at > count {
            Ok(false)
        } else if at == count {
            self.cursor.set(at + 1);
            Ok(false)
        } else {
            self.cursor.set(at + 1);
            Ok(true)
        }
    }

    /// The element the cursor is positioned at
    pub fn current(&self) -> Result<Value> {
        let items = self.items()?;
        let at = self.cursor.get();
        if at == 0 || at > items.len() {
            return Err(RuntimeError::invalid_operation(INVALID_OPERATION));
        }
        Ok(items[at - 1].clone())
    }
}

impl fmt::Debug for ArrayEnumerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayEnumerator")
            .field("bound", &self.items.is_some())
            .field("len", &self.captured_len())
            .field("cursor", &self.cursor.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_invalid(result: Result<Value>) -> bool {
        matches!(result, Err(RuntimeError::InvalidOperation(_)))
    }

    #[test]
    fn test_protocol_trace() {
        let array = Array::from_values(vec![Value::string("x"), Value::string("y")]);
        let e = array.enumerate();

        assert!(is_invalid(e.current()));
        assert!(e.advance().unwrap());
        assert_eq!(e.current().unwrap().as_str(), Some("x"));
        assert!(e.advance().unwrap());
        assert_eq!(e.current().unwrap().as_str(), Some("y"));
        assert!(!e.advance().unwrap());
        assert!(!e.advance().unwrap());
        assert!(is_invalid(e.current()));
    }

    #[test]
    fn test_empty_capture() {
        let e = Array::new().enumerate();
        assert!(!e.advance().unwrap());
        assert!(is_invalid(e.current()));
        assert!(!e.advance().unwrap());
    }

    #[test]
    fn test_snapshot_isolated_from_mutation() {
        let array = Array::from_values(vec![Value::Int(1), Value::Int(2)]);
        let e = array.enumerate();
        array.set(0, Value::Int(100)).unwrap();
        array.push(&[Value::Int(3)]).unwrap();

        let mut seen = Vec::new();
        while e.advance().unwrap() {
            seen.push(e.current().unwrap().as_int().unwrap());
        }
        assert_eq!(seen, vec![1, 2]);
        assert_eq!(e.captured_len(), 2);
    }

    #[test]
    fn test_unbound_enumerator() {
        let e = ArrayEnumerator::unbound();
        assert!(matches!(
            e.advance(),
            Err(RuntimeError::InvalidOperation(ref m)) if m == INVALID_OPERATION
        ));
        assert!(is_invalid(e.current()));
    }
}
