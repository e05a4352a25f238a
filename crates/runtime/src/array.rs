//! Array: the runtime's growable sequence
//!
//! An `Array` is shared through `Value::Array(Rc<Array>)` and mutated in place,
//! so the backing store sits behind a `RefCell`. Two ways of reading the
//! contents are offered to the rest of the runtime:
//!
//! - [`Array::view`]: an aliased, zero-copy view of the live storage. While a
//!   view is alive every mutation of the array fails with an
//!   invalid-operation error, so the storage can never be reallocated under
//!   it. Use it for short, non-escaping reads.
//! - [`Array::to_vec`]: a defensive copy that is independent of the array.
//!
//! Every operation that may run user code (element `inspect`/`to_s`,
//! equality and hash hooks) iterates over a copy, so that code is free to
//! mutate the array. Sorting, set difference and enumeration live in their
//! own modules (`sort`, `diff`, `enumerator`).

use crate::enumerator::ArrayEnumerator;
use crate::error::{Result, RuntimeError};
use crate::store::BackingStore;
use crate::value::{MAX_INT, Value};
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::ops::Deref;

const RECURSIVE_MARKER: &str = "[ <recursive> ]";

pub struct Array {
    store: RefCell<BackingStore>,
    /// Set while `to_s`/`inspect` is rendering this array
    rendering: Cell<bool>,
}

/// Aliased view of an array's occupied slots
///
/// Holds a shared borrow of the storage: the array refuses to mutate until
/// the view is dropped.
pub struct ItemsView<'a> {
    store: Ref<'a, BackingStore>,
}

impl Deref for ItemsView<'_> {
    type Target = [Value];

    fn deref(&self) -> &[Value] {
        self.store.as_slice()
    }
}

/// Scoped reentrancy guard for rendering
///
/// Clears the flag when dropped, whether rendering finished or an element's
/// `inspect` raised.
struct RenderGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> RenderGuard<'a> {
    /// Returns `None` if a render of the same array is already in progress
    fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(RenderGuard { flag })
        }
    }
}

impl Drop for RenderGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Resolve a possibly negative index against `len`
fn adjust_index(index: i64, len: usize) -> i64 {
    if index < 0 {
        index.saturating_add(len as i64)
    } else {
        index
    }
}

impl Array {
    /// Empty array with capacity 2
    pub fn new() -> Self {
        Self::with_store(BackingStore::new())
    }

    /// Array holding `values`, capacity `max(2, values.len())`
    pub fn from_values(values: Vec<Value>) -> Self {
        Self::with_store(BackingStore::from_values(values))
    }

    fn with_store(store: BackingStore) -> Self {
        Array {
            store: RefCell::new(store),
            rendering: Cell::new(false),
        }
    }

    pub fn len(&self) -> usize {
        self.store.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.borrow().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.store.borrow().capacity()
    }

    /// Zero-copy view of the live storage (see module docs)
    pub fn view(&self) -> ItemsView<'_> {
        ItemsView {
            store: self.store.borrow(),
        }
    }

    /// Independent copy of the current contents
    pub fn to_vec(&self) -> Vec<Value> {
        self.store.borrow().as_slice().to_vec()
    }

    fn store_mut(&self) -> Result<RefMut<'_, BackingStore>> {
        self.store.try_borrow_mut().map_err(|_| {
            RuntimeError::invalid_operation("Array modified while its items are borrowed")
        })
    }

    /// Element at `index`; negative counts from the end, out of range is nil
    pub fn get(&self, index: i64) -> Value {
        let store = self.store.borrow();
        let index = adjust_index(index, store.len());
        if index < 0 {
            return Value::Nil;
        }
        store.get(index as usize).cloned().unwrap_or_default()
    }

    /// Assign `index`, extending the array with nils when writing past the end
    pub fn set(&self, index: i64, value: Value) -> Result<Value> {
        let mut store = self.store_mut()?;
        let index = adjust_index(index, store.len());
        if index < 0 {
            return Err(RuntimeError::argument("index too small"));
        }
        store.set(index as usize, value.clone());
        Ok(value)
    }

    /// Append `values`, returning the new length
    pub fn push(&self, values: &[Value]) -> Result<usize> {
        let mut store = self.store_mut()?;
        store.push(values);
        Ok(store.len())
    }

    /// Remove and return the last element, nil when empty
    pub fn pop(&self) -> Result<Value> {
        Ok(self.store_mut()?.pop().unwrap_or_default())
    }

    /// Prepend `values` (in the order given), returning the new length
    pub fn unshift(&self, values: &[Value]) -> Result<usize> {
        let mut store = self.store_mut()?;
        store.unshift(values);
        Ok(store.len())
    }

    /// Remove and return the first element, nil when empty
    pub fn shift(&self) -> Result<Value> {
        Ok(self.store_mut()?.shift().unwrap_or_default())
    }

    /// New array with this array's elements followed by `other`'s
    ///
    /// The result is exactly as large as it needs to be.
    pub fn concat(&self, other: &Array) -> Array {
        let left = self.view();
        let right = other.view();
        let mut items = Vec::with_capacity(left.len() + right.len());
        items.extend_from_slice(&left);
        items.extend_from_slice(&right);
        Self::with_store(BackingStore::exact(items))
    }

    /// Order-sensitive element-wise equality
    pub fn equals(&self, other: &Value) -> Result<bool> {
        let Value::Array(other) = other else {
            return Ok(false);
        };
        let mine = self.to_vec();
        let theirs = other.to_vec();
        if mine.len() != theirs.len() {
            return Ok(false);
        }
        for (a, b) in mine.iter().zip(theirs.iter()) {
            if !a.equals(b)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// XOR of the element hashes
    ///
    /// Deliberately order-insensitive: `[1, 2]` and `[2, 1]` hash alike even
    /// though they are not equal.
    pub fn hash_code(&self) -> Result<i64> {
        let mut hash: i64 = 0;
        for item in self.to_vec() {
            hash ^= item.hash_code()?;
        }
        Ok(hash % MAX_INT)
    }

    /// Render as `[e0, e1, ...]` using each element's `inspect`
    ///
    /// An array reached again while it is being rendered (directly or through
    /// nested arrays) renders as `[ <recursive> ]`.
    pub fn to_s(&self) -> Result<String> {
        let Some(_guard) = RenderGuard::acquire(&self.rendering) else {
            return Ok(RECURSIVE_MARKER.to_string());
        };
        let items = self.to_vec();
        let mut out = String::from("[");
        for (i, item) in items.iter().enumerate() {
            if i != 0 {
                out.push_str(", ");
            }
            out.push_str(&item.inspect()?);
        }
        out.push(']');
        Ok(out)
    }

    pub fn inspect(&self) -> Result<String> {
        self.to_s()
    }

    /// Whether a render of this array is currently on the stack
    pub fn is_rendering(&self) -> bool {
        self.rendering.get()
    }

    /// Concatenate the `to_s` of every element, separated by `separator`
    ///
    /// Unlike `to_s`, the output size is computed first and the result is
    /// written into a single allocation.
    pub fn join(&self, separator: &str) -> Result<String> {
        let parts = self
            .to_vec()
            .iter()
            .map(Value::to_s)
            .collect::<Result<Vec<String>>>()?;

        let mut length: usize = parts.iter().map(String::len).sum();
        if !parts.is_empty() {
            length += separator.len() * (parts.len() - 1);
        }

        let mut out = String::with_capacity(length);
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                out.push_str(separator);
            }
            out.push_str(part);
        }
        debug_assert_eq!(out.len(), length);
        Ok(out)
    }

    /// Snapshot enumerator over the current contents
    pub fn enumerate(&self) -> ArrayEnumerator {
        ArrayEnumerator::new(self)
    }
}

impl Default for Array {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Array {
    // Element values are left out: an array may contain itself
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.store.try_borrow() {
            Ok(store) => f
                .debug_struct("Array")
                .field("len", &store.len())
                .field("capacity", &store.capacity())
                .finish(),
            Err(_) => f.write_str("Array { <borrowed> }"),
        }
    }
}

impl From<Vec<Value>> for Array {
    fn from(values: Vec<Value>) -> Self {
        Array::from_values(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Object;
    use std::rc::Rc;

    fn int_array(values: &[i64]) -> Array {
        Array::from_values(values.iter().copied().map(Value::Int).collect())
    }

    fn ints(array: &Array) -> Vec<i64> {
        array
            .to_vec()
            .iter()
            .map(|v| v.as_int().unwrap_or(-1))
            .collect()
    }

    #[derive(Debug)]
    struct Exploding;

    impl Object for Exploding {
        fn class_name(&self) -> &str {
            "Exploding"
        }

        fn inspect(&self) -> Result<String> {
            Err(RuntimeError::Thrown(Value::string("inspect failed")))
        }

        fn to_s(&self) -> Result<String> {
            Err(RuntimeError::Thrown(Value::string("to_s failed")))
        }
    }

    #[test]
    fn test_new_array_is_empty() {
        let array = Array::new();
        assert_eq!(array.len(), 0);
        assert_eq!(array.capacity(), 2);
        assert!(array.get(0).is_nil());
    }

    #[test]
    fn test_get_negative_and_out_of_range() {
        let array = int_array(&[10, 20, 30]);
        assert_eq!(array.get(-1).as_int(), Some(30));
        assert_eq!(array.get(-3).as_int(), Some(10));
        assert!(array.get(-4).is_nil());
        assert!(array.get(3).is_nil());
        assert!(array.get(i64::MIN).is_nil());
    }

    #[test]
    fn test_set_negative_index() {
        let array = int_array(&[1, 2, 3]);
        assert_eq!(array.set(-1, Value::Int(9)).unwrap().as_int(), Some(9));
        assert_eq!(ints(&array), vec![1, 2, 9]);

        let err = array.set(-4, Value::Int(0)).unwrap_err();
        assert!(matches!(err, RuntimeError::Argument(ref m) if m == "index too small"));
        assert_eq!(ints(&array), vec![1, 2, 9]);
    }

    #[test]
    fn test_set_sparse_extension() {
        let array = int_array(&[1]);
        array.set(4, Value::Int(5)).unwrap();
        assert_eq!(array.len(), 5);
        assert!(array.get(1).is_nil());
        assert!(array.get(3).is_nil());
        assert_eq!(array.get(4).as_int(), Some(5));
        assert!(array.capacity() >= 5);
    }

    #[test]
    fn test_push_pop() {
        let array = Array::new();
        assert_eq!(array.push(&[Value::Int(1), Value::Int(2)]).unwrap(), 2);
        assert_eq!(array.push(&[Value::Int(3)]).unwrap(), 3);
        assert_eq!(array.pop().unwrap().as_int(), Some(3));
        assert_eq!(array.pop().unwrap().as_int(), Some(2));
        assert_eq!(array.pop().unwrap().as_int(), Some(1));
        assert!(array.pop().unwrap().is_nil());
        assert_eq!(array.len(), 0);
    }

    #[test]
    fn test_unshift_shift() {
        let array = int_array(&[9]);
        assert_eq!(array.unshift(&[Value::Int(1), Value::Int(2)]).unwrap(), 3);
        assert_eq!(ints(&array), vec![1, 2, 9]);
        assert_eq!(array.shift().unwrap().as_int(), Some(1));
        assert_eq!(array.shift().unwrap().as_int(), Some(2));
        assert_eq!(array.shift().unwrap().as_int(), Some(9));
        assert!(array.shift().unwrap().is_nil());
    }

    #[test]
    fn test_concat_exact_capacity() {
        let a = int_array(&[1, 2]);
        let b = int_array(&[3]);
        let c = a.concat(&b);
        assert_eq!(ints(&c), vec![1, 2, 3]);
        assert_eq!(c.capacity(), 3);
        assert_eq!(ints(&a), vec![1, 2]);
        assert_eq!(ints(&b), vec![3]);

        let self_concat = a.concat(&a);
        assert_eq!(ints(&self_concat), vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_equality_is_ordered_hash_is_not() {
        let a = int_array(&[1, 2]);
        let b = Value::array(int_array(&[2, 1]));
        let c = Value::array(int_array(&[1, 2]));
        assert!(!a.equals(&b).unwrap());
        assert!(a.equals(&c).unwrap());
        assert!(!a.equals(&Value::Int(1)).unwrap());
        assert_eq!(a.hash_code().unwrap(), b.hash_code().unwrap());
    }

    #[test]
    fn test_to_s() {
        let array = Array::from_values(vec![
            Value::Int(1),
            Value::string("two"),
            Value::Nil,
            Value::array(int_array(&[3])),
        ]);
        assert_eq!(array.to_s().unwrap(), "[1, \"two\", nil, [3]]");
        assert_eq!(Array::new().inspect().unwrap(), "[]");
    }

    #[test]
    fn test_to_s_recursive() {
        let array = Rc::new(int_array(&[1]));
        array.push(&[Value::Array(array.clone())]).unwrap();
        assert_eq!(array.to_s().unwrap(), "[1, [ <recursive> ]]");
        assert!(!array.is_rendering());
    }

    #[test]
    fn test_render_guard_cleared_on_error() {
        let array = Array::from_values(vec![Value::Int(1), Value::Object(Rc::new(Exploding))]);
        let err = array.to_s().unwrap_err();
        assert!(matches!(err, RuntimeError::Thrown(_)));
        assert!(!array.is_rendering());

        array.pop().unwrap();
        assert_eq!(array.to_s().unwrap(), "[1]");
    }

    #[test]
    fn test_join() {
        let array = Array::from_values(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(array.join("-").unwrap(), "a-b-c");
        assert_eq!(array.join("").unwrap(), "abc");
        assert_eq!(Array::new().join("-").unwrap(), "");

        let mixed = Array::from_values(vec![Value::Int(1), Value::Nil, Value::Float(2.5)]);
        assert_eq!(mixed.join(", ").unwrap(), "1, , 2.5");
    }

    #[test]
    fn test_join_propagates_to_s_error() {
        let array = Array::from_values(vec![Value::Object(Rc::new(Exploding))]);
        assert!(matches!(array.join(","), Err(RuntimeError::Thrown(_))));
    }

    #[test]
    fn test_view_blocks_mutation() {
        let array = int_array(&[1, 2]);
        let view = array.view();
        assert_eq!(view.len(), 2);
        assert!(matches!(
            array.push(&[Value::Int(3)]),
            Err(RuntimeError::InvalidOperation(_))
        ));
        drop(view);
        assert_eq!(array.push(&[Value::Int(3)]).unwrap(), 3);
    }

    #[test]
    fn test_element_hook_may_mutate_array() {
        #[derive(Debug)]
        struct Grower(std::cell::RefCell<Option<Rc<Array>>>);

        impl Object for Grower {
            fn class_name(&self) -> &str {
                "Grower"
            }

            fn inspect(&self) -> Result<String> {
                if let Some(array) = self.0.borrow().as_ref() {
                    array.push(&[Value::Int(0)])?;
                }
                Ok("g".to_string())
            }
        }

        let grower = Rc::new(Grower(std::cell::RefCell::new(None)));
        let array = Rc::new(Array::from_values(vec![Value::Object(grower.clone())]));
        *grower.0.borrow_mut() = Some(array.clone());

        assert_eq!(array.to_s().unwrap(), "[g]");
        assert_eq!(array.len(), 2);

        // Break the cycle
        grower.0.borrow_mut().take();
    }

    #[test]
    fn test_to_vec_is_independent() {
        let array = int_array(&[1, 2]);
        let copy = array.to_vec();
        array.set(0, Value::Int(100)).unwrap();
        assert_eq!(copy[0].as_int(), Some(1));
    }
}
