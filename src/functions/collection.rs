use crate::ast::{Node, Scope, Sequence, Value};
use crate::error::{Error, Result};
use crate::functions::Registry;
use exprule_macros::builtin;

pub fn register(registry: &mut Registry) {
    registry.register_function("contains", contains);
    registry.register_function("newSlice", new_slice);
    registry.register_function("isEmpty", is_empty);
}

/// `contains(s, substr)` or `contains(items, item)` over a sequence of strings.
#[builtin("contains")]
pub fn contains(container: Value, item: String) -> Result<Value> {
    match container {
        Value::Str(text) => Ok(Value::Bool(text.contains(item.as_str()))),
        Value::Seq(Sequence::Str(items)) => Ok(Value::Bool(items.iter().any(|i| *i == item))),
        other => Err(Error::argument_type(
            "contains",
            1,
            "string or sequence of string",
            &other,
        )),
    }
}

/// Collects string arguments into a sequence, in argument order.
pub fn new_slice(args: &[Node], scope: &Scope<'_>) -> Result<Value> {
    let items = args
        .iter()
        .enumerate()
        .map(|(i, arg)| match scope.evaluate(arg)? {
            Value::Str(item) => Ok(item),
            other => Err(Error::argument_type("newSlice", i + 1, "string", &other)),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::Seq(Sequence::Str(items)))
}

/// True only for `Nil` and the empty string.
#[builtin("isEmpty")]
pub fn is_empty(value: Value) -> Result<Value> {
    let empty = match value {
        Value::Nil => true,
        Value::Str(text) => text.is_empty(),
        _ => false,
    };
    Ok(Value::Bool(empty))
}
