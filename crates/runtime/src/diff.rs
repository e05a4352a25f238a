//! Array difference (`a - b`)
//!
//! Loads every element of `b` into a hash table, then keeps the elements of
//! `a` the table does not contain. Membership uses the runtime's value-hash
//! and value-equality protocols, the same ones `Array#==` and `Array#hash`
//! use, so the table is an injected [`MembershipTable`] rather than a local
//! hashing scheme.

use crate::array::Array;
use crate::error::Result;
use crate::value::Value;
use std::collections::HashMap;
use tracing::debug;

/// Hash-table collaborator: insert and lookup keyed by runtime values
pub trait MembershipTable {
    fn insert(&mut self, key: Value) -> Result<()>;
    fn contains(&self, key: &Value) -> Result<bool>;
}

/// Default table: buckets keyed by value hash, resolved by value equality
#[derive(Debug, Default)]
pub struct ValueTable {
    buckets: HashMap<i64, Vec<Value>>,
    len: usize,
}

impl ValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl MembershipTable for ValueTable {
    fn insert(&mut self, key: Value) -> Result<()> {
        let hash = key.hash_code()?;
        let bucket = self.buckets.entry(hash).or_default();
        for existing in bucket.iter() {
            if existing.equals(&key)? {
                return Ok(());
            }
        }
        bucket.push(key);
        self.len += 1;
        Ok(())
    }

    fn contains(&self, key: &Value) -> Result<bool> {
        let Some(bucket) = self.buckets.get(&key.hash_code()?) else {
            return Ok(false);
        };
        for existing in bucket {
            if existing.equals(key)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Elements of `items` not present in `table`, order and duplicates kept
pub fn retain_missing<T: MembershipTable + ?Sized>(
    items: &[Value],
    table: &T,
) -> Result<Vec<Value>> {
    let mut kept = Vec::with_capacity(items.len());
    for item in items {
        if !table.contains(item)? {
            kept.push(item.clone());
        }
    }
    Ok(kept)
}

impl Array {
    /// New array of the elements of `self` that do not occur in `other`
    pub fn difference(&self, other: &Array) -> Result<Array> {
        self.difference_with(other, &mut ValueTable::new())
    }

    /// [`Array::difference`] with a caller-supplied table
    pub fn difference_with<T: MembershipTable + ?Sized>(
        &self,
        other: &Array,
        table: &mut T,
    ) -> Result<Array> {
        // Copies: hash and equality hooks may touch either array
        for item in other.to_vec() {
            table.insert(item)?;
        }
        let kept = retain_missing(&self.to_vec(), table)?;
        debug!(
            receiver = self.len(),
            other = other.len(),
            kept = kept.len(),
            "array difference"
        );
        Ok(Array::from_values(kept))
    }
}
