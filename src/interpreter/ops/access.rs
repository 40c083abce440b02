//! Container access: index and field reads, list and map literals, and the
//! copy-on-write path update used by indexed assignment and rollback.

use crate::ast::Expr;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{Exec, RuntimeError};
use crate::memory::value::{MapValue, Value};

impl Value {
    /// `container[index]`: a map entry (Void when absent) or one character of
    /// a string (Void when out of range)
    pub fn index(&self, index: &Value) -> Result<Value, RuntimeError> {
        match self {
            Value::Map(map) => Ok(map.get(index).cloned().unwrap_or_default()),
            Value::Str(s) => {
                let position = index
                    .as_int()
                    .ok_or_else(|| RuntimeError::type_error("int", index))?;
                Ok(usize::try_from(position)
                    .ok()
                    .and_then(|i| s.chars().nth(i))
                    .map(|c| Value::string(c.to_string()))
                    .unwrap_or_default())
            }
            other => Err(RuntimeError::type_error("map or string", other)),
        }
    }

    /// `object.field`: the map entry keyed by the field name
    pub fn field(&self, name: &str) -> Result<Value, RuntimeError> {
        match self {
            Value::Map(map) => Ok(map.get(&Value::from(name)).cloned().unwrap_or_default()),
            other => Err(RuntimeError::type_error("map", other)),
        }
    }
}

/// Copy of `root` with the entry reached through `path` replaced by `value`.
///
/// Every container along the path is copied; storing Void removes the final key.
pub(crate) fn update_path(root: &Value, path: &[Value], value: Value) -> Result<Value, RuntimeError> {
    let Some((key, rest)) = path.split_first() else {
        return Ok(value);
    };
    let map = root
        .as_map()
        .ok_or_else(|| RuntimeError::type_error("map", root))?;
    let child = map.get(key).cloned().unwrap_or_default();
    let updated = update_path(&child, rest, value)?;
    Ok(Value::map(map.with(key.clone(), updated)))
}

/// Value reached by following `path` from `root`
pub(crate) fn read_path(root: &Value, path: &[Value]) -> Result<Value, RuntimeError> {
    path.iter()
        .try_fold(root.clone(), |container, key| container.index(key))
}

impl Interpreter {
    /// A list literal is a map keyed by Int positions `0..n`
    pub(crate) fn evaluate_list(&mut self, items: &[Expr]) -> Exec<Value> {
        let mut entries = Vec::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            let value = self.evaluate_expr(item)?;
            entries.push((Value::Int(position as i64), value));
        }
        Ok(Value::map(MapValue::from_entries(entries)))
    }

    /// Keys and values are evaluated in source order, key before value
    pub(crate) fn evaluate_map(&mut self, entries: &[(Expr, Expr)]) -> Exec<Value> {
        let mut evaluated = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let key = self.evaluate_expr(key)?;
            let value = self.evaluate_expr(value)?;
            evaluated.push((key, value));
        }
        Ok(Value::map(MapValue::from_entries(evaluated)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        let inner = MapValue::from_entries([(Value::from("k"), Value::Int(1))]);
        Value::map(MapValue::from_entries([
            (Value::Int(0), Value::map(inner)),
            (Value::Int(1), Value::from("x")),
        ]))
    }

    #[test]
    fn test_index_missing_key_is_void() {
        assert_eq!(sample().index(&Value::Int(7)).unwrap(), Value::Void);
    }

    #[test]
    fn test_string_index() {
        let s = Value::from("héllo");
        assert_eq!(s.index(&Value::Int(1)).unwrap(), Value::from("é"));
        assert_eq!(s.index(&Value::Int(9)).unwrap(), Value::Void);
        assert!(s.index(&Value::from("0")).is_err());
    }

    #[test]
    fn test_field_reads_string_key() {
        let inner = sample().index(&Value::Int(0)).unwrap();
        assert_eq!(inner.field("k").unwrap(), Value::Int(1));
        assert!(Value::Int(3).field("k").is_err());
    }

    #[test]
    fn test_update_path_copies() {
        let root = sample();
        let path = [Value::Int(0), Value::from("k")];
        let updated = update_path(&root, &path, Value::Int(2)).unwrap();

        assert_eq!(read_path(&updated, &path).unwrap(), Value::Int(2));
        assert_eq!(read_path(&root, &path).unwrap(), Value::Int(1));
        assert_eq!(updated.index(&Value::Int(1)).unwrap(), Value::from("x"));
    }

    #[test]
    fn test_update_path_void_removes() {
        let updated = update_path(&sample(), &[Value::Int(1)], Value::Void).unwrap();
        assert_eq!(updated.as_map().map(MapValue::len), Some(1));
    }
}
