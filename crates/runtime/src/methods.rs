//! Method tables for Array and Array::Enumerator
//!
//! Each class registers its native methods under the names user programs
//! call them by. [`send`] looks a method up on the receiver's class, checks
//! the argument count and runs it.
//!
//! ```text
//! Array               enumerate [] []= length push pop unshift shift
//!                     to_a to_s inspect hash sort concat + - == join
//! Array::Enumerator   next current
//! ```

use crate::array::Array;
use crate::enumerator::ArrayEnumerator;
use crate::error::{Result, RuntimeError};
use crate::value::Value;
use std::rc::Rc;
use tracing::debug;

/// Accepted argument counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    /// Between zero and n arguments
    AtMost(usize),
    /// Any number of arguments
    Variadic,
}

impl Arity {
    fn accepts(self, argc: usize) -> bool {
        match self {
            Arity::Exact(n) => argc == n,
            Arity::AtMost(n) => argc <= n,
            Arity::Variadic => true,
        }
    }

    fn describe(self) -> String {
        match self {
            Arity::Exact(n) => n.to_string(),
            Arity::AtMost(n) => format!("0..{}", n),
            Arity::Variadic => "any".to_string(),
        }
    }
}

/// A registered native method
pub struct Method<R> {
    pub name: &'static str,
    pub arity: Arity,
    pub func: fn(&Rc<R>, &[Value]) -> Result<Value>,
}

macro_rules! method {
    ($name:expr, $arity:expr, $func:expr) => {
        Method {
            name: $name,
            arity: $arity,
            func: $func,
        }
    };
}

pub static ARRAY_METHODS: &[Method<Array>] = &[
    method!("enumerate", Arity::Exact(0), array_enumerate),
    method!("[]", Arity::Exact(1), array_get),
    method!("[]=", Arity::Exact(2), array_set),
    method!("length", Arity::Exact(0), array_length),
    method!("push", Arity::Variadic, array_push),
    method!("pop", Arity::Exact(0), array_pop),
    method!("unshift", Arity::Variadic, array_unshift),
    method!("shift", Arity::Exact(0), array_shift),
    method!("to_a", Arity::Exact(0), array_to_a),
    method!("to_s", Arity::Exact(0), array_to_s),
    method!("inspect", Arity::Exact(0), array_to_s),
    method!("hash", Arity::Exact(0), array_hash),
    method!("sort", Arity::AtMost(1), array_sort),
    method!("concat", Arity::Exact(1), array_concat),
    method!("+", Arity::Exact(1), array_concat),
    method!("-", Arity::Exact(1), array_diff),
    method!("==", Arity::Exact(1), array_eq),
    method!("join", Arity::AtMost(1), array_join),
];

pub static ENUMERATOR_METHODS: &[Method<ArrayEnumerator>] = &[
    method!("next", Arity::Exact(0), enumerator_next),
    method!("current", Arity::Exact(0), enumerator_current),
];

fn lookup<'a, R>(table: &'a [Method<R>], name: &str) -> Option<&'a Method<R>> {
    table.iter().find(|m| m.name == name)
}

fn invoke<R>(
    class: &str,
    table: &[Method<R>],
    receiver: &Rc<R>,
    name: &str,
    args: &[Value],
) -> Result<Value> {
    let method = lookup(table, name).ok_or_else(|| RuntimeError::no_method(class, name))?;
    if !method.arity.accepts(args.len()) {
        return Err(RuntimeError::argument(format!(
            "{}#{}: wrong number of arguments ({} for {})",
            class,
            name,
            args.len(),
            method.arity.describe()
        )));
    }
    let result = (method.func)(receiver, args);
    if let Err(e) = &result {
        debug!(class, method = name, error = %e, "method raised");
    }
    result
}

/// Call method `name` on `receiver`
pub fn send(receiver: &Value, name: &str, args: &[Value]) -> Result<Value> {
    match receiver {
        Value::Array(array) => invoke("Array", ARRAY_METHODS, array, name, args),
        Value::Enumerator(e) => invoke("Array::Enumerator", ENUMERATOR_METHODS, e, name, args),
        other => Err(RuntimeError::no_method(other.type_name(), name)),
    }
}

/// Whether `receiver`'s class defines `name`
pub fn responds_to(receiver: &Value, name: &str) -> bool {
    match receiver {
        Value::Array(_) => lookup(ARRAY_METHODS, name).is_some(),
        Value::Enumerator(_) => lookup(ENUMERATOR_METHODS, name).is_some(),
        _ => false,
    }
}

/// Allocate a new Array value holding `values`
pub fn make_array(values: Vec<Value>) -> Value {
    Value::array(Array::from_values(values))
}

fn expect_array<'a>(value: &'a Value, method: &str) -> Result<&'a Rc<Array>> {
    value.as_array().ok_or_else(|| {
        RuntimeError::type_error(format!(
            "Array#{}: expected Array, got {}",
            method,
            value.type_name()
        ))
    })
}

fn length_value(len: usize) -> Value {
    Value::Int(len as i64)
}

fn array_enumerate(array: &Rc<Array>, _args: &[Value]) -> Result<Value> {
    Ok(Value::Enumerator(Rc::new(array.enumerate())))
}

fn array_get(array: &Rc<Array>, args: &[Value]) -> Result<Value> {
    let index = args[0].expect_int("Array#[]")?;
    Ok(array.get(index))
}

fn array_set(array: &Rc<Array>, args: &[Value]) -> Result<Value> {
    let index = args[0].expect_int("Array#[]=")?;
    array.set(index, args[1].clone())
}

fn array_length(array: &Rc<Array>, _args: &[Value]) -> Result<Value> {
    Ok(length_value(array.len()))
}

fn array_push(array: &Rc<Array>, args: &[Value]) -> Result<Value> {
    array.push(args).map(length_value)
}

fn array_pop(array: &Rc<Array>, _args: &[Value]) -> Result<Value> {
    array.pop()
}

fn array_unshift(array: &Rc<Array>, args: &[Value]) -> Result<Value> {
    array.unshift(args).map(length_value)
}

fn array_shift(array: &Rc<Array>, _args: &[Value]) -> Result<Value> {
    array.shift()
}

fn array_to_a(array: &Rc<Array>, _args: &[Value]) -> Result<Value> {
    Ok(Value::Array(array.clone()))
}

fn array_to_s(array: &Rc<Array>, _args: &[Value]) -> Result<Value> {
    array.to_s().map(Value::from)
}

fn array_hash(array: &Rc<Array>, _args: &[Value]) -> Result<Value> {
    array.hash_code().map(Value::Int)
}

fn array_sort(array: &Rc<Array>, args: &[Value]) -> Result<Value> {
    array.sort(args.first()).map(Value::array)
}

fn array_concat(array: &Rc<Array>, args: &[Value]) -> Result<Value> {
    let other = expect_array(&args[0], "concat")?;
    Ok(Value::array(array.concat(other)))
}

fn array_diff(array: &Rc<Array>, args: &[Value]) -> Result<Value> {
    let other = expect_array(&args[0], "-")?;
    array.difference(other).map(Value::array)
}

fn array_eq(array: &Rc<Array>, args: &[Value]) -> Result<Value> {
    Value::Array(array.clone()).equals(&args[0]).map(Value::Bool)
}

fn array_join(array: &Rc<Array>, args: &[Value]) -> Result<Value> {
    let separator = match args.first() {
        None => "",
        Some(Value::String(s)) => s.as_ref(),
        Some(other) => {
            return Err(RuntimeError::type_error(format!(
                "Array#join: expected String, got {}",
                other.type_name()
            )));
        }
    };
    array.join(separator).map(Value::from)
}

fn enumerator_next(e: &Rc<ArrayEnumerator>, _args: &[Value]) -> Result<Value> {
    e.advance().map(Value::Bool)
}

fn enumerator_current(e: &Rc<ArrayEnumerator>, _args: &[Value]) -> Result<Value> {
    e.current()
}
