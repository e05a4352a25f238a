//! Array sort
//!
//! Randomized quicksort over a private copy of the array. The source array is
//! never touched, so a comparator that fails (or mutates the source) cannot
//! leave it half sorted.
//!
//! Ties go to the right-hand partition and the pivot is random, so the sort
//! is not stable. Recursion depth equals the partition depth: a comparator
//! that always answers "not less" drives it to O(n) depth and O(n²) time.

use crate::array::Array;
use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::value::Value;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use tracing::debug;

thread_local! {
    /// Pivot source for `Array::sort`, seeded once per thread
    static PIVOT_RNG: RefCell<StdRng> = RefCell::new(RuntimeConfig::from_env().pivot_rng());
}

/// How elements are ordered against the pivot
#[derive(Clone, Copy)]
pub enum Comparator<'a> {
    /// The runtime's three-way comparison
    Standard,
    /// A user callable `(a, b) -> Int`, negative meaning `a < b`
    Callable(&'a Value),
}

impl Comparator<'_> {
    /// Whether `item` sorts strictly before `pivot`
    fn precedes(&self, item: &Value, pivot: &Value) -> Result<bool> {
        match self {
            Comparator::Standard => Ok(item.compare(pivot)?.is_lt()),
            Comparator::Callable(f) => {
                let result = f.call(&[item.clone(), pivot.clone()])?;
                match result {
                    Value::Int(n) => Ok(n < 0),
                    other => Err(RuntimeError::type_error(format!(
                        "sort: comparator must return Int, got {}",
                        other.type_name()
                    ))),
                }
            }
        }
    }
}

/// Sort `items` in place
pub fn quicksort<R: Rng + ?Sized>(
    items: &mut [Value],
    comparator: Comparator<'_>,
    rng: &mut R,
) -> Result<()> {
    let count = items.len();
    if count < 2 {
        return Ok(());
    }

    let pivot_idx = rng.gen_range(0..count);
    items.swap(pivot_idx, count - 1);

    let mut m = 0;
    for i in 0..count - 1 {
        if comparator.precedes(&items[i], &items[count - 1])? {
            items.swap(i, m);
            m += 1;
        }
    }
    items.swap(m, count - 1);

    let (lower, upper) = items.split_at_mut(m);
    quicksort(lower, comparator, rng)?;
    quicksort(&mut upper[1..], comparator, rng)
}

impl Array {
    /// Sorted copy of this array
    ///
    /// `comparator`, when given, is called as `comparator(a, b)` and must
    /// return an Int. Its errors abort the sort and are returned unchanged.
    pub fn sort(&self, comparator: Option<&Value>) -> Result<Array> {
        // A fresh generator per call: the comparator may itself sort
        let mut rng = PIVOT_RNG.with(|r| StdRng::seed_from_u64(r.borrow_mut().r#gen()));
        self.sort_with_rng(comparator, &mut rng)
    }

    /// Sorted copy, drawing pivots from `rng`
    pub fn sort_with_rng<R: Rng + ?Sized>(
        &self,
        comparator: Option<&Value>,
        rng: &mut R,
    ) -> Result<Array> {
        let mut items = self.to_vec();
        let comparator = comparator.map_or(Comparator::Standard, Comparator::Callable);
        if let Err(e) = quicksort(&mut items, comparator, rng) {
            debug!(len = items.len(), error = %e, "sort aborted");
            return Err(e);
        }
        Ok(Array::from_values(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn ints(values: &[Value]) -> Vec<i64> {
        values.iter().map(|v| v.as_int().unwrap_or(-1)).collect()
    }

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_sort_default_comparison() {
        let array = Array::from_values(vec![Value::Int(3), Value::Int(1), Value::Int(2)]);
        let sorted = array.sort(None).unwrap();
        assert_eq!(ints(&sorted.to_vec()), vec![1, 2, 3]);
        assert_eq!(ints(&array.to_vec()), vec![3, 1, 2]);
    }

    #[test]
    fn test_sort_with_duplicates_and_many_seeds() {
        let input: Vec<i64> = vec![5, 3, 9, 3, 1, 0, 5, 7, 2, 8, 3, 6, 4, 1];
        let mut expected = input.clone();
        expected.sort();

        for seed in 0..32 {
            let array = Array::from_values(input.iter().copied().map(Value::Int).collect());
            let mut rng = StdRng::seed_from_u64(seed);
            let sorted = array.sort_with_rng(None, &mut rng).unwrap();
            assert_eq!(ints(&sorted.to_vec()), expected, "seed {}", seed);
        }
    }

    #[test]
    fn test_sort_with_comparator_descending() {
        let array = Array::from_values((1..=6).map(Value::Int).collect());
        let desc = Value::function("desc", |args| {
            let a = args[0].expect_int("desc")?;
            let b = args[1].expect_int("desc")?;
            Ok(Value::Int(b - a))
        });
        let sorted = array.sort_with_rng(Some(&desc), &mut seeded()).unwrap();
        assert_eq!(ints(&sorted.to_vec()), vec![6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_comparator_must_return_int() {
        let array = Array::from_values(vec![Value::Int(2), Value::Int(1)]);
        let bad = Value::function("bad", |_| Ok(Value::string("less")));
        let err = array.sort_with_rng(Some(&bad), &mut seeded()).unwrap_err();
        assert!(matches!(err, RuntimeError::Type(_)));
    }

    #[test]
    fn test_comparator_error_propagates_unchanged() {
        let array = Array::from_values((0..10).map(Value::Int).collect());
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let failing = Value::function("failing", move |_| {
            counter.set(counter.get() + 1);
            if counter.get() == 3 {
                Err(RuntimeError::Thrown(Value::string("comparator blew up")))
            } else {
                Ok(Value::Int(-1))
            }
        });

        let err = array.sort_with_rng(Some(&failing), &mut seeded()).unwrap_err();
        match err {
            RuntimeError::Thrown(v) => assert_eq!(v.as_str(), Some("comparator blew up")),
            other => panic!("expected thrown error, got {:?}", other),
        }
        assert_eq!(calls.get(), 3);
        assert_eq!(ints(&array.to_vec()), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_comparator_may_mutate_source() {
        let array = Rc::new(Array::from_values(vec![Value::Int(2), Value::Int(1)]));
        let source = array.clone();
        let cmp = Value::function("mutating", move |args| {
            source.push(&[Value::Int(0)])?;
            Ok(Value::Int(args[0].expect_int("cmp")? - args[1].expect_int("cmp")?))
        });
        let sorted = array.sort_with_rng(Some(&cmp), &mut seeded()).unwrap();
        assert_eq!(ints(&sorted.to_vec()), vec![1, 2]);
        assert!(array.len() > 2);
    }

    #[test]
    fn test_incomparable_elements() {
        let array = Array::from_values(vec![Value::Int(1), Value::string("a")]);
        assert!(matches!(
            array.sort_with_rng(None, &mut seeded()),
            Err(RuntimeError::Type(_))
        ));
    }

    #[test]
    fn test_short_arrays() {
        assert_eq!(Array::new().sort(None).unwrap().len(), 0);
        let one = Array::from_values(vec![Value::string("only")]);
        assert_eq!(one.sort(None).unwrap().get(0).as_str(), Some("only"));
    }
}
