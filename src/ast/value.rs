use crate::ast::evaluator::{Function, Scope};
use crate::ast::Node;
use crate::error::Result;
use std::collections::HashMap;
use std::fmt;

/// Read-only name bindings an expression is evaluated against.
pub type Environment = HashMap<String, Value>;

/// Dynamically typed runtime value.
///
/// Values are never mutated by the evaluator; every operation builds a new one.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Map(HashMap<String, Value>),
    Seq(Sequence),
    Nil,
    Function(Callable),
}

/// Homogeneous ordered sequence. Narrow integers widen to `Value::Int` when read.
#[derive(Debug, Clone, PartialEq)]
pub enum Sequence {
    Str(Vec<String>),
    Int(Vec<i64>),
    Int32(Vec<i32>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Map(_) => "mapping",
            Value::Seq(sequence) => sequence.type_name(),
            Value::Nil => "nil",
            Value::Function(_) => "function",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Bool(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Value::Str(value) = self {
            Some(value)
        } else {
            None
        }
    }
}

impl Sequence {
    pub fn len(&self) -> usize {
        match self {
            Sequence::Str(items) => items.len(),
            Sequence::Int(items) => items.len(),
            Sequence::Int32(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index` as a value, `None` when out of range.
    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            Sequence::Str(items) => items.get(index).cloned().map(Value::Str),
            Sequence::Int(items) => items.get(index).copied().map(Value::Int),
            Sequence::Int32(items) => items.get(index).map(|&item| Value::Int(item as i64)),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Sequence::Str(_) => "sequence of string",
            Sequence::Int(_) => "sequence of int",
            Sequence::Int32(_) => "sequence of int32",
        }
    }
}

/// Named built-in function as it appears inside a [`Value`].
#[derive(Clone)]
pub struct Callable {
    name: String,
    function: Function,
}

impl Callable {
    pub fn new(name: &str, function: Function) -> Self {
        Self {
            name: name.to_string(),
            function,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the function with unevaluated arguments.
    pub fn call(&self, args: &[Node], scope: &Scope<'_>) -> Result<Value> {
        (self.function)(args, scope)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callable").field(&self.name).finish()
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{}", value),
            Value::Str(value) => f.write_str(value),
            Value::Bool(value) => write!(f, "{}", value),
            Value::Map(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                f.write_str("map[")?;
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}:{}", key, map[key])?;
                }
                f.write_str("]")
            }
            Value::Seq(sequence) => write!(f, "{}", sequence),
            Value::Nil => f.write_str("<nil>"),
            Value::Function(callable) => write!(f, "func {}", callable.name),
        }
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = match self {
            Sequence::Str(items) => items.clone(),
            Sequence::Int(items) => items.iter().map(|item| item.to_string()).collect(),
            Sequence::Int32(items) => items.iter().map(|item| item.to_string()).collect(),
        };
        write!(f, "[{}]", items.join(" "))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::Seq(Sequence::Str(value))
    }
}

impl From<Vec<&str>> for Value {
    fn from(value: Vec<&str>) -> Self {
        Value::Seq(Sequence::Str(
            value.into_iter().map(|item| item.to_string()).collect(),
        ))
    }
}

impl From<Vec<i64>> for Value {
    fn from(value: Vec<i64>) -> Self {
        Value::Seq(Sequence::Int(value))
    }
}

impl From<Vec<i32>> for Value {
    fn from(value: Vec<i32>) -> Self {
        Value::Seq(Sequence::Int32(value))
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(value: HashMap<String, Value>) -> Self {
        Value::Map(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Nil, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrow_sequence_widens_on_read() {
        let sequence = Sequence::Int32(vec![1, 2, 3]);
        assert_eq!(sequence.get(1), Some(Value::Int(2)));
        assert_eq!(sequence.get(3), None);
        assert_eq!(sequence.len(), 3);
    }

    #[test]
    fn test_variants_never_compare_equal_across_types() {
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Str("1".to_string()), Value::Int(1));
        assert_ne!(
            Value::Seq(Sequence::Int(vec![1])),
            Value::Seq(Sequence::Int32(vec![1]))
        );
        assert_eq!(Value::Nil, Value::Nil);
    }

    #[test]
    fn test_display() {
        let map = Value::Map(HashMap::from([
            ("b".to_string(), Value::Int(2)),
            ("a".to_string(), Value::from(vec!["x", "y"])),
        ]));
        assert_eq!(map.to_string(), "map[a:[x y] b:2]");
        assert_eq!(Value::Nil.to_string(), "<nil>");
        assert_eq!(Value::Float(0.5).to_string(), "0.5");
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(3_i32), Value::Int(3));
        assert_eq!(Value::from(None::<i64>), Value::Nil);
        assert_eq!(Value::from("abc").as_str(), Some("abc"));
        assert_eq!(Value::from(true).as_bool(), Some(true));
    }
}
