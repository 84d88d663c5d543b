use crate::ast::numeric::{float_arithmetic, unify, FloatOp, Operands};
use crate::ast::{Environment, LiteralKind, Node, Operator, Parser, UnaryOperator, Value};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::functions::{builtins, Registry};
use log::{debug, trace};
use rayon::prelude::*;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

/// Built-in function body. Receives its arguments unevaluated and forces them
/// through [`Scope::evaluate`] in whatever order it needs.
pub type Function = Arc<dyn Fn(&[Node], &Scope<'_>) -> Result<Value> + Send + Sync>;

/// Recursive tree-walking evaluator.
///
/// Holds no per-run state, so one instance can serve concurrent runs.
#[derive(Debug, Clone)]
pub struct Evaluator {
    registry: Arc<Registry>,
    config: Config,
}

/// Evaluation callback handed to built-ins, bound to one run's environment.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    evaluator: &'a Evaluator,
    environment: &'a Environment,
    depth: usize,
}

impl<'a> Scope<'a> {
    /// Reduces `node` to a value against this scope's environment.
    pub fn evaluate(&self, node: &Node) -> Result<Value> {
        let nested = self.nested()?;
        self.evaluator.evaluate_node(node, &nested)
    }

    /// Like [`Scope::evaluate`], but borrows from the environment for
    /// identifier, selector and index chains instead of copying the whole target.
    fn lookup(&self, node: &Node) -> Result<Cow<'a, Value>> {
        let nested = self.nested()?;
        match node {
            Node::Identifier(name) => Ok(lookup_binding(name, self.environment)),
            Node::Paren(inner) => nested.lookup(inner),
            Node::Selector { object, field } => select(nested.lookup(object)?, field),
            Node::Index { object, index } => {
                let target = nested.lookup(object)?;
                let index = nested.evaluate(index)?;
                index_into(target, index)
            }
            _ => self.evaluator.evaluate_node(node, &nested).map(Cow::Owned),
        }
    }

    fn nested(&self) -> Result<Scope<'a>> {
        let max_depth = self.evaluator.config.max_depth;
        if self.depth >= max_depth {
            return Err(Error::DepthExceeded(max_depth));
        }
        Ok(Scope {
            depth: self.depth + 1,
            ..*self
        })
    }

    pub fn environment(&self) -> &'a Environment {
        self.environment
    }

    pub fn config(&self) -> &'a Config {
        &self.evaluator.config
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// Creates an evaluator backed by the shared built-in registry.
    pub fn new() -> Self {
        Self {
            registry: builtins(),
            config: Config::default(),
        }
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            registry: builtins(),
            config,
        }
    }

    /// Creates an evaluator whose calls resolve against `registry` instead of the built-ins.
    pub fn with_registry(registry: Registry, config: Config) -> Self {
        Self {
            registry: Arc::new(registry),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Parse an expression string into a syntax tree.
    pub fn parse_expression(&self, expression: &str) -> Result<Node> {
        Parser::parse_expression(expression)
    }

    /// Parses and evaluates `expression` against `environment`.
    ///
    /// This is the single point where failures are reported back to the caller;
    /// no partial value accompanies an error.
    pub fn run(&self, expression: &str, environment: &Environment) -> Result<Value> {
        let result = self
            .parse_expression(expression)
            .and_then(|ast| self.evaluate(&ast, environment));

        match &result {
            Ok(value) => trace!("{} => {:?}", expression, value),
            Err(err) => debug!("{} failed ({:?}): {}", expression, err.kind(), err),
        }
        result
    }

    /// Parses `expression` once and evaluates it against every environment in parallel.
    ///
    /// Results keep the order of `environments`.
    pub fn run_batch(
        &self,
        expression: &str,
        environments: &[Environment],
    ) -> Result<Vec<Result<Value>>> {
        let ast = self.parse_expression(expression)?;
        debug!(
            "Evaluating {} against {} environments",
            expression,
            environments.len()
        );
        Ok(environments
            .par_iter()
            .map(|environment| self.evaluate(&ast, environment))
            .collect())
    }

    /// Evaluates a pre-parsed tree against `environment`.
    pub fn evaluate(&self, ast: &Node, environment: &Environment) -> Result<Value> {
        let scope = Scope {
            evaluator: self,
            environment,
            depth: 0,
        };
        scope.evaluate(ast)
    }

    fn evaluate_node(&self, node: &Node, scope: &Scope<'_>) -> Result<Value> {
        match node {
            Node::Paren(inner) => scope.evaluate(inner),

            Node::Literal { kind, raw } => evaluate_literal(*kind, raw),

            Node::Identifier(name) => Ok(resolve_identifier(name, scope.environment)),

            Node::Selector { object, field } => {
                select(scope.lookup(object)?, field).map(Cow::into_owned)
            }

            Node::Index { object, index } => {
                let target = scope.lookup(object)?;
                let index = scope.evaluate(index)?;
                index_into(target, index).map(Cow::into_owned)
            }

            Node::Unary { operator, operand } => {
                let operand = scope.evaluate(operand)?;
                apply_unary(*operator, operand)
            }

            Node::Binary { .. } => evaluate_chain(node, scope),

            Node::Call { callee, args } => {
                let name = match callee.as_ref() {
                    Node::Identifier(name) => name,
                    other => return Err(Error::InvalidCallee(other.kind_name().to_string())),
                };

                match self.registry.resolve(name) {
                    Value::Function(callable) => {
                        trace!("Calling {} with {} arguments", name, args.len());
                        callable.call(args, scope)
                    }
                    Value::Nil => Err(Error::UnknownFunction(name.clone())),
                    other => Err(Error::NotCallable {
                        name: name.clone(),
                        found: other.type_name().to_string(),
                    }),
                }
            }
        }
    }
}

/// Looks `name` up in `bindings`. `true` and `false` always win, absent names yield `Nil`.
pub(crate) fn resolve_identifier(name: &str, bindings: &HashMap<String, Value>) -> Value {
    lookup_binding(name, bindings).into_owned()
}

fn lookup_binding<'m>(name: &str, bindings: &'m HashMap<String, Value>) -> Cow<'m, Value> {
    match name {
        "true" => Cow::Owned(Value::Bool(true)),
        "false" => Cow::Owned(Value::Bool(false)),
        _ => bindings.get(name).map_or(Cow::Owned(Value::Nil), Cow::Borrowed),
    }
}

/// Folds a left-nested run of binary operators in a loop, so a flat
/// `a + b + c ...` costs one level of depth rather than one per operand.
///
/// Operands are still forced left to right; `&&` and `||` do not short-circuit.
fn evaluate_chain(node: &Node, scope: &Scope<'_>) -> Result<Value> {
    let mut pending = Vec::new();
    let mut leftmost = node;
    while let Node::Binary {
        left,
        operator,
        right,
    } = leftmost
    {
        pending.push((*operator, right.as_ref()));
        leftmost = left;
    }

    let mut value = scope.evaluate(leftmost)?;
    for (operator, right) in pending.into_iter().rev() {
        let right = scope.evaluate(right)?;
        value = apply_binary(operator, value, right)?;
    }
    Ok(value)
}

fn evaluate_literal(kind: LiteralKind, raw: &str) -> Result<Value> {
    let invalid = |reason: String| Error::InvalidLiteral {
        kind: kind.to_string(),
        raw: raw.to_string(),
        reason,
    };

    match kind {
        LiteralKind::Int => raw
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| invalid(e.to_string())),
        LiteralKind::Float => raw
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| invalid(e.to_string())),
        // Quotes are stripped verbatim; escapes are left as written.
        LiteralKind::String => raw
            .len()
            .checked_sub(1)
            .filter(|&end| end >= 1)
            .and_then(|end| raw.get(1..end))
            .map(|text| Value::Str(text.to_string()))
            .ok_or_else(|| invalid("missing quotes".to_string())),
        LiteralKind::Char => Err(Error::UnsupportedLiteral {
            kind: kind.to_string(),
            raw: raw.to_string(),
        }),
    }
}

fn select<'a>(target: Cow<'a, Value>, field: &str) -> Result<Cow<'a, Value>> {
    match target {
        Cow::Borrowed(Value::Map(map)) => Ok(lookup_binding(field, map)),
        Cow::Owned(Value::Map(map)) => Ok(Cow::Owned(resolve_identifier(field, &map))),
        other => Err(Error::NotAMapping {
            field: field.to_string(),
            found: other.type_name().to_string(),
        }),
    }
}

fn index_into<'a>(target: Cow<'a, Value>, index: Value) -> Result<Cow<'a, Value>> {
    match (target, index) {
        (Cow::Borrowed(Value::Map(map)), Value::Str(key)) => {
            Ok(map.get(&key).map_or(Cow::Owned(Value::Nil), Cow::Borrowed))
        }
        (Cow::Owned(Value::Map(mut map)), Value::Str(key)) => {
            Ok(Cow::Owned(map.remove(&key).unwrap_or(Value::Nil)))
        }
        (target, Value::Int(position)) => match target.as_ref() {
            Value::Seq(sequence) => usize::try_from(position)
                .ok()
                .and_then(|position| sequence.get(position))
                .map(Cow::Owned)
                .ok_or(Error::IndexOutOfRange {
                    index: position,
                    len: sequence.len(),
                }),
            other => Err(invalid_index(other, &Value::Int(position))),
        },
        (target, index) => Err(invalid_index(&target, &index)),
    }
}

fn invalid_index(target: &Value, index: &Value) -> Error {
    Error::InvalidIndex {
        target: target.type_name().to_string(),
        index: index.type_name().to_string(),
    }
}

fn apply_unary(operator: UnaryOperator, operand: Value) -> Result<Value> {
    match (operator, operand) {
        (UnaryOperator::Not, Value::Bool(value)) => Ok(Value::Bool(!value)),
        (UnaryOperator::Negate, Value::Int(value)) => Ok(Value::Int(value.wrapping_neg())),
        (UnaryOperator::Negate, Value::Float(value)) => Ok(Value::Float(-value)),
        (operator, operand) => Err(Error::InvalidUnaryOperation {
            operator: operator.to_string(),
            operand: operand.to_string(),
        }),
    }
}

fn apply_binary(operator: Operator, left: Value, right: Value) -> Result<Value> {
    let result = match unify(left, right) {
        Operands::Int(l, r) => match operator {
            Operator::Add => Value::Int(l.wrapping_add(r)),
            Operator::Subtract => Value::Int(l.wrapping_sub(r)),
            Operator::Multiply => Value::Int(l.wrapping_mul(r)),
            Operator::Divide => Value::Int(checked_integer(l, r, i64::wrapping_div)?),
            Operator::Modulo => Value::Int(checked_integer(l, r, i64::wrapping_rem)?),
            Operator::LessThan => Value::Bool(l < r),
            Operator::GreaterThan => Value::Bool(l > r),
            Operator::LessThanOrEqual => Value::Bool(l <= r),
            Operator::GreaterThanOrEqual => Value::Bool(l >= r),
            Operator::Equal => Value::Bool(l == r),
            Operator::NotEqual => Value::Bool(l != r),
            Operator::And | Operator::Or => {
                return Err(invalid_binary(&Value::Int(l), operator, &Value::Int(r)))
            }
        },

        Operands::Float(l, r) => match operator {
            Operator::Add => Value::Float(float_arithmetic(FloatOp::Add, l, r)),
            Operator::Subtract => Value::Float(float_arithmetic(FloatOp::Sub, l, r)),
            Operator::Multiply => Value::Float(float_arithmetic(FloatOp::Mul, l, r)),
            Operator::Divide => Value::Float(float_arithmetic(FloatOp::Div, l, r)),
            Operator::LessThan => Value::Bool(l < r),
            Operator::GreaterThan => Value::Bool(l > r),
            Operator::LessThanOrEqual => Value::Bool(l <= r),
            Operator::GreaterThanOrEqual => Value::Bool(l >= r),
            Operator::Equal => Value::Bool(l == r),
            Operator::NotEqual => Value::Bool(l != r),
            Operator::Modulo | Operator::And | Operator::Or => {
                return Err(invalid_binary(&Value::Float(l), operator, &Value::Float(r)))
            }
        },

        Operands::Other(l, r) => match (operator, l, r) {
            (Operator::Add, Value::Str(l), Value::Str(r)) => Value::Str(l + &r),
            (Operator::And, Value::Bool(l), Value::Bool(r)) => Value::Bool(l && r),
            (Operator::Or, Value::Bool(l), Value::Bool(r)) => Value::Bool(l || r),
            (Operator::Equal, l, r) => Value::Bool(l == r),
            (Operator::NotEqual, l, r) => Value::Bool(l != r),
            (operator, l, r) => return Err(invalid_binary(&l, operator, &r)),
        },
    };

    Ok(result)
}

fn checked_integer(left: i64, right: i64, op: fn(i64, i64) -> i64) -> Result<i64> {
    if right == 0 {
        Err(Error::DivisionByZero)
    } else {
        Ok(op(left, right))
    }
}

fn invalid_binary(left: &Value, operator: Operator, right: &Value) -> Error {
    Error::InvalidBinaryOperation {
        left: left.to_string(),
        operator: operator.to_string(),
        right: right.to_string(),
    }
}
