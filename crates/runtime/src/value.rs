use crate::array::Array;
use crate::enumerator::ArrayEnumerator;
use crate::error::{Result, RuntimeError};
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Upper bound (exclusive) of hash codes produced by the runtime
pub const MAX_INT: i64 = i64::MAX;

/// Native function signature for callables
pub type NativeFn = dyn Fn(&[Value]) -> Result<Value>;

/// Callable value: a named native function
///
/// Comparators passed to `Array#sort` are Functions. Equality is by identity.
#[derive(Clone)]
pub struct Function {
    name: Rc<str>,
    f: Rc<NativeFn>,
}

impl Function {
    pub fn new(name: &str, f: impl Fn(&[Value]) -> Result<Value> + 'static) -> Self {
        Function {
            name: Rc::from(name),
            f: Rc::new(f),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> Result<Value> {
        (self.f)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({})", self.name)
    }
}

/// Protocol hooks for values defined outside the runtime core
///
/// Every hook may run arbitrary user code and may fail; failures are
/// propagated unchanged by the Array operations that invoke them.
pub trait Object: fmt::Debug {
    /// Class name used in error messages and default rendering
    fn class_name(&self) -> &str;

    fn inspect(&self) -> Result<String> {
        Ok(format!("#<{}>", self.class_name()))
    }

    fn to_s(&self) -> Result<String> {
        self.inspect()
    }

    /// Value equality against an arbitrary value (identity is checked first)
    fn equals(&self, _other: &Value) -> Result<bool> {
        Ok(false)
    }

    /// Value hash; must agree with `equals`. Defaults to object identity.
    fn hash_code(&self) -> Result<i64> {
        let addr = self as *const Self as *const () as usize;
        Ok(fold_hash(addr as u64))
    }
}

/// Value: What the language talks about
///
/// Collections (`Array`, `Enumerator`) and host objects are reference types:
/// cloning a Value shares the underlying object, like the runtime's pointers.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// The nil sentinel, also used for unused array slots
    #[default]
    Nil,

    Bool(bool),

    Int(i64),

    Float(f64),

    /// Immutable string
    String(Rc<str>),

    /// Growable array (shared, mutable in place)
    Array(Rc<Array>),

    /// Array::Enumerator snapshot iterator
    Enumerator(Rc<ArrayEnumerator>),

    /// Native callable
    Function(Function),

    /// Host-defined object with its own protocol hooks
    Object(Rc<dyn Object>),
}

fn fold_hash(h: u64) -> i64 {
    (h % MAX_INT as u64) as i64
}

fn hash_of<T: Hash>(tag: u8, v: T) -> i64 {
    let mut hasher = DefaultHasher::new();
    tag.hash(&mut hasher);
    v.hash(&mut hasher);
    fold_hash(hasher.finish())
}

impl Value {
    pub fn string(s: &str) -> Self {
        Value::String(Rc::from(s))
    }

    pub fn array(array: Array) -> Self {
        Value::Array(Rc::new(array))
    }

    pub fn function(name: &str, f: impl Fn(&[Value]) -> Result<Value> + 'static) -> Self {
        Value::Function(Function::new(name, f))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Rc<Array>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Class name as seen by user programs
    pub fn type_name(&self) -> &str {
        match self {
            Value::Nil => "Nil",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Array(_) => "Array",
            Value::Enumerator(_) => "Array::Enumerator",
            Value::Function(_) => "Function",
            Value::Object(o) => o.class_name(),
        }
    }

    /// Require an Int, raising a TypeError naming `what` otherwise
    pub fn expect_int(&self, what: &str) -> Result<i64> {
        self.as_int().ok_or_else(|| {
            RuntimeError::type_error(format!(
                "{}: expected Int, got {}",
                what,
                self.type_name()
            ))
        })
    }

    /// Standard value-equality protocol
    pub fn equals(&self, other: &Value) -> Result<bool> {
        match (self, other) {
            (Value::Nil, Value::Nil) => Ok(true),
            (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
            (Value::Int(a), Value::Int(b)) => Ok(a == b),
            (Value::Float(a), Value::Float(b)) => Ok(a == b),
            (Value::String(a), Value::String(b)) => Ok(a == b),
            (Value::Array(a), Value::Array(b)) if Rc::ptr_eq(a, b) => Ok(true),
            (Value::Array(a), _) => a.equals(other),
            (Value::Enumerator(a), Value::Enumerator(b)) => Ok(Rc::ptr_eq(a, b)),
            (Value::Function(a), Value::Function(b)) => Ok(Rc::ptr_eq(&a.f, &b.f)),
            (Value::Object(a), Value::Object(b)) if Rc::ptr_eq(a, b) => Ok(true),
            (Value::Object(a), _) => a.equals(other),
            _ => Ok(false),
        }
    }

    /// Standard value-hash protocol, consistent with [`Value::equals`]
    pub fn hash_code(&self) -> Result<i64> {
        match self {
            Value::Nil => Ok(0),
            Value::Bool(b) => Ok(hash_of(1, b)),
            Value::Int(n) => Ok(hash_of(2, n)),
            // +0.0 and -0.0 are equal, so they must hash alike
            Value::Float(x) if *x == 0.0 => Ok(hash_of(3, 0u64)),
            Value::Float(x) => Ok(hash_of(3, x.to_bits())),
            Value::String(s) => Ok(hash_of(4, s.as_ref())),
            Value::Array(a) => a.hash_code(),
            Value::Enumerator(e) => Ok(hash_of(5, Rc::as_ptr(e) as usize)),
            Value::Function(func) => Ok(hash_of(6, Rc::as_ptr(&func.f) as *const () as usize)),
            Value::Object(o) => o.hash_code(),
        }
    }

    /// Universal inspect protocol (debug rendering)
    pub fn inspect(&self) -> Result<String> {
        match self {
            Value::Nil => Ok("nil".to_string()),
            Value::String(s) => Ok(format!("{:?}", s.as_ref())),
            Value::Array(a) => a.inspect(),
            Value::Object(o) => o.inspect(),
            _ => self.to_s(),
        }
    }

    /// Universal to-string protocol
    pub fn to_s(&self) -> Result<String> {
        match self {
            Value::Nil => Ok(String::new()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Int(n) => Ok(n.to_string()),
            Value::Float(x) => Ok(format!("{:?}", x)),
            Value::String(s) => Ok(s.to_string()),
            Value::Array(a) => a.to_s(),
            Value::Enumerator(_) => Ok("#<Array::Enumerator>".to_string()),
            Value::Function(func) => Ok(format!("#<Function {}>", func.name())),
            Value::Object(o) => o.to_s(),
        }
    }

    /// Standard three-way comparison
    ///
    /// Numbers compare numerically (Int and Float mix), strings bytewise.
    /// Anything else raises a TypeError.
    pub fn compare(&self, other: &Value) -> Result<Ordering> {
        let ordering = match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        };
        ordering.ok_or_else(|| {
            RuntimeError::type_error(format!(
                "comparison of {} with {} failed",
                self.type_name(),
                other.type_name()
            ))
        })
    }

    /// Invoke a callable with the given arguments
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        match self {
            Value::Function(func) => func.call(args),
            _ => Err(RuntimeError::type_error(format!(
                "{} is not callable",
                self.type_name()
            ))),
        }
    }
}

// Equality for host code and tests. A failing equality hook compares unequal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other).unwrap_or(false)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}
