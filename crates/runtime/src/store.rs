//! Backing store for Array
//!
//! Owns the slot vector and all capacity arithmetic. Capacity is the number of
//! allocated slots (`slots.len()`), the logical length is tracked separately.
//!
//! # Invariants
//!
//! - `len <= capacity`
//! - every slot in `[len, capacity)` holds `Value::Nil`
//! - capacity is at least 2 once the store has been allocated or grown
//!
//! Growth doubles and shrinking halves, but shrinking only starts once the
//! length drops below half the capacity. Resizing to zero keeps the
//! allocation so that repeatedly pushing and popping a single element does not
//! reallocate.

use crate::value::Value;
use tracing::trace;

/// Smallest capacity the store allocates
pub const MIN_CAPACITY: usize = 2;

#[derive(Clone)]
pub struct BackingStore {
    slots: Vec<Value>,
    len: usize,
}

impl BackingStore {
    /// Empty store with the minimum capacity, all slots nil
    pub fn new() -> Self {
        BackingStore {
            slots: vec![Value::Nil; MIN_CAPACITY],
            len: 0,
        }
    }

    /// Store pre-populated with `values`; capacity is `max(2, values.len())`
    pub fn from_values(mut values: Vec<Value>) -> Self {
        let len = values.len();
        values.resize(len.max(MIN_CAPACITY), Value::Nil);
        values.shrink_to_fit();
        BackingStore { slots: values, len }
    }

    /// Fully populated store whose capacity equals its length exactly
    pub fn exact(mut values: Vec<Value>) -> Self {
        values.shrink_to_fit();
        let len = values.len();
        BackingStore { slots: values, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// The occupied slots `[0, len)`
    pub fn as_slice(&self) -> &[Value] {
        &self.slots[..self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [Value] {
        &mut self.slots[..self.len]
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.as_slice().get(index)
    }

    /// Set the logical length, reallocating when the capacity rules demand it
    pub fn resize(&mut self, new_len: usize) {
        let old_len = self.len;
        if new_len < old_len {
            // Vacated slots go back to nil (and release what they held)
            for slot in &mut self.slots[new_len..old_len] {
                *slot = Value::Nil;
            }
        }
        self.len = new_len;

        if new_len == 0 {
            return;
        }

        let old_capacity = self.capacity();
        if new_len > old_capacity {
            let mut capacity = old_capacity.max(MIN_CAPACITY);
            while new_len > capacity {
                capacity *= 2;
            }
            self.slots.resize(capacity, Value::Nil);
            self.slots.shrink_to_fit();
            trace!(old_capacity, capacity, len = new_len, "array storage grown");
        } else if new_len < old_capacity / 2 {
            let mut capacity = old_capacity;
            while new_len < capacity / 2 && capacity / 2 >= MIN_CAPACITY {
                capacity /= 2;
            }
            self.slots.truncate(capacity);
            self.slots.shrink_to_fit();
            trace!(old_capacity, capacity, len = new_len, "array storage shrunk");
        }
    }

    /// Write slot `index`, growing and extending the length as needed
    ///
    /// Slots spanned by the extension already hold nil, so a sparse write
    /// leaves them reading as nil.
    pub fn set(&mut self, index: usize, value: Value) {
        if index >= self.capacity() {
            self.resize(index + 1);
        }
        if index >= self.len {
            self.len = index + 1;
        }
        self.slots[index] = value;
    }

    /// Append `values` at the tail
    pub fn push(&mut self, values: &[Value]) {
        let start = self.len;
        self.resize(start + values.len());
        self.slots[start..start + values.len()].clone_from_slice(values);
    }

    pub fn pop(&mut self) -> Option<Value> {
        if self.len == 0 {
            return None;
        }
        let value = std::mem::take(&mut self.slots[self.len - 1]);
        self.resize(self.len - 1);
        Some(value)
    }

    /// Shift existing elements right and write `values` at the front
    pub fn unshift(&mut self, values: &[Value]) {
        let count = values.len();
        self.resize(self.len + count);
        // The `count` nil slots at the tail rotate round to the front
        self.slots[..self.len].rotate_right(count);
        self.slots[..count].clone_from_slice(values);
    }

    pub fn shift(&mut self) -> Option<Value> {
        if self.len == 0 {
            return None;
        }
        let value = std::mem::take(&mut self.slots[0]);
        self.slots[..self.len].rotate_left(1);
        self.resize(self.len - 1);
        Some(value)
    }
}

impl Default for BackingStore {
    fn default() -> Self {
        Self::new()
    }
}
