//! Runtime value representation
//!
//! This module defines the [`Value`] enum, which represents every runtime value
//! the ape interpreter manipulates. Values are immutable once constructed:
//! operations (see `interpreter::ops`) build new values rather than mutating
//! their operands, so cloning a value is always cheap (`Rc` around the larger
//! variants).
//!
//! # Value Types
//!
//! - [`Value::Void`]: result of a function that returns nothing
//! - [`Value::Bool`], [`Value::Str`], [`Value::Int`], [`Value::Rational`]
//! - [`Value::Map`]: insertion-ordered key/value association
//! - [`Value::Func`] / [`Value::NativeFunc`]: user and host functions
//! - [`Value::IndexValuePair`]: a container entry captured by the breadcrumb
//!   ledger so a single index can be restored during rollback
//!
//! # Equality
//!
//! [`Value::equals`] is type-discriminating: values of different kinds are never
//! equal, even `Int(1)` and `Rational(1.0)`.

use std::fmt;
use std::rc::Rc;

use crate::ast::{Block, LiteralKind};
use crate::interpreter::builtins::NativeCall;
use crate::interpreter::constants::VOID_LITERAL;
use crate::interpreter::errors::RuntimeError;

/// Host callback behind a [`Value::NativeFunc`]
pub type NativeFn = fn(&mut NativeCall<'_>) -> Result<Value, RuntimeError>;

/// Runtime values in the interpreter
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Void,
    Bool(bool),
    Str(Rc<str>),
    Int(i64),
    Rational(f64),
    Map(Rc<MapValue>),
    Func(Rc<Function>),
    NativeFunc(Rc<NativeFunction>),
    IndexValuePair(Rc<IndexValuePair>),
}

/// A user-defined function. First class: it can be stored and passed around.
#[derive(Debug)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Rc<Block>,
}

/// A host-implemented function
#[derive(Debug)]
pub struct NativeFunction {
    pub name: String,
    pub params: Vec<String>,
    pub callback: NativeFn,
    /// Variadic natives receive their arguments under the keys "0", "1", ...
    pub variadic: bool,
}

/// One container entry: the index and the value stored there
#[derive(Debug, Clone)]
pub struct IndexValuePair {
    pub index: Value,
    pub value: Value,
}

/// Insertion-ordered map keyed by [`Value::equals`]
///
/// A map never holds a Void entry: indexing a missing key yields Void, and
/// storing Void removes the key.
#[derive(Debug, Clone, Default)]
pub struct MapValue {
    entries: Vec<(Value, Value)>,
}

impl MapValue {
    pub fn new() -> Self {
        MapValue::default()
    }

    /// Build a map from entries in order; later duplicates overwrite earlier ones
    pub fn from_entries(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        entries
            .into_iter()
            .fold(MapValue::new(), |map, (key, value)| map.with(key, value))
    }

    /// Look up the value stored at `key`
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.equals(key))
            .map(|(_, v)| v)
    }

    /// Copy of this map with `key` bound to `value` (or removed if `value` is Void)
    pub fn with(&self, key: Value, value: Value) -> MapValue {
        let mut entries = self.entries.clone();
        let existing = entries.iter().position(|(k, _)| k.equals(&key));
        match (existing, value.is_void()) {
            (Some(pos), true) => {
                entries.remove(pos);
            }
            (Some(pos), false) => entries[pos].1 = value,
            (None, true) => {}
            (None, false) => entries.push((key, value)),
        }
        MapValue { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl Value {
    /// Construct a value from a literal token
    pub fn from_literal(kind: LiteralKind, lexeme: &str) -> Result<Value, RuntimeError> {
        match kind {
            LiteralKind::Str => Ok(Value::string(lexeme)),
            LiteralKind::Int => {
                lexeme
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| RuntimeError::InvalidLiteral {
                        kind: "integer",
                        lexeme: lexeme.to_string(),
                    })
            }
            LiteralKind::Rational => {
                lexeme
                    .parse::<f64>()
                    .map(Value::Rational)
                    .map_err(|_| RuntimeError::InvalidLiteral {
                        kind: "rational",
                        lexeme: lexeme.to_string(),
                    })
            }
            LiteralKind::True => Ok(Value::Bool(true)),
            LiteralKind::False => Ok(Value::Bool(false)),
        }
    }

    pub fn string(s: impl Into<Rc<str>>) -> Value {
        Value::Str(s.into())
    }

    pub fn map(map: MapValue) -> Value {
        Value::Map(Rc::new(map))
    }

    pub fn index_value_pair(index: Value, value: Value) -> Value {
        Value::IndexValuePair(Rc::new(IndexValuePair { index, value }))
    }

    /// Human-readable kind name used in type errors
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Int(_) => "int",
            Value::Rational(_) => "rational",
            Value::Map(_) => "map",
            Value::Func(_) => "function",
            Value::NativeFunc(_) => "native function",
            Value::IndexValuePair(_) => "index/value pair",
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    /// Int and Rational satisfy the number capability
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Rational(_))
    }

    /// Get the bool value, returns None if not a Bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the integer value, returns None if not an Int
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Expect a bool value, returns a type error if not a Bool
    pub fn expect_bool(&self) -> Result<bool, RuntimeError> {
        self.as_bool()
            .ok_or_else(|| RuntimeError::type_error("bool", self))
    }

    /// Expect a string value, returns a type error if not a Str
    pub fn expect_str(&self) -> Result<&str, RuntimeError> {
        self.as_str()
            .ok_or_else(|| RuntimeError::type_error("string", self))
    }

    /// Reflexive, type-discriminating equality
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            // NaN compares equal to itself so equality stays reflexive
            (Value::Rational(a), Value::Rational(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|other| v.equals(other)))
            }
            (Value::Func(a), Value::Func(b)) => a.name == b.name,
            (Value::NativeFunc(a), Value::NativeFunc(b)) => a.name == b.name,
            (Value::IndexValuePair(a), Value::IndexValuePair(b)) => {
                a.index.equals(&b.index) && a.value.equals(&b.value)
            }
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => write!(f, "{}", VOID_LITERAL),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Str(s) => write!(f, "{}", s),
            Value::Int(n) => write!(f, "{}", n),
            Value::Rational(x) => write!(f, "{}", x),
            Value::Map(map) => {
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                Ok(())
            }
            Value::Func(func) => write!(f, "FUNC: {}", func.name),
            Value::NativeFunc(native) => write!(f, "NATIVE: {}", native.name),
            Value::IndexValuePair(pair) => write!(f, "{}: {}", pair.index, pair.value),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Rational(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_literal() {
        assert_eq!(
            Value::from_literal(LiteralKind::Int, "42").unwrap(),
            Value::Int(42)
        );
        assert_eq!(
            Value::from_literal(LiteralKind::Rational, "2.5").unwrap(),
            Value::Rational(2.5)
        );
        assert_eq!(
            Value::from_literal(LiteralKind::Str, "hi").unwrap(),
            Value::from("hi")
        );
        assert_eq!(
            Value::from_literal(LiteralKind::False, "false").unwrap(),
            Value::Bool(false)
        );
        assert!(matches!(
            Value::from_literal(LiteralKind::Int, "4x2"),
            Err(RuntimeError::InvalidLiteral { kind: "integer", .. })
        ));
    }

    #[test]
    fn test_equals_discriminates_kinds() {
        assert!(!Value::Int(1).equals(&Value::Bool(true)));
        assert!(!Value::Int(1).equals(&Value::Rational(1.0)));
        assert!(!Value::Void.equals(&Value::from("VOID")));
        assert!(Value::Rational(f64::NAN).equals(&Value::Rational(f64::NAN)));
    }

    #[test]
    fn test_map_equality_ignores_order() {
        let a = MapValue::from_entries([(Value::Int(1), Value::from("a")), (Value::Int(2), Value::from("b"))]);
        let b = MapValue::from_entries([(Value::Int(2), Value::from("b")), (Value::Int(1), Value::from("a"))]);
        assert_eq!(Value::map(a), Value::map(b));
    }

    #[test]
    fn test_map_with_void_removes_entry() {
        let map = MapValue::from_entries([(Value::from("k"), Value::Int(1))]);
        let cleared = map.with(Value::from("k"), Value::Void);
        assert!(cleared.is_empty());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_to_string() {
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::Bool(false).to_string(), "False");
        assert_eq!(Value::Int(-7).to_string(), "-7");
        assert_eq!(Value::Rational(2.5).to_string(), "2.5");
        assert_eq!(Value::Void.to_string(), "VOID");

        let map = MapValue::from_entries([
            (Value::from("a"), Value::Int(1)),
            (Value::from("b"), Value::Bool(false)),
        ]);
        assert_eq!(Value::map(map).to_string(), "a: 1, b: False");
        assert_eq!(
            Value::index_value_pair(Value::Int(0), Value::from("x")).to_string(),
            "0: x"
        );
    }
}
