use crate::ast::Value;
use log::trace;
use rust_decimal::Decimal;

/// Operand pair after numeric promotion.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operands {
    Int(i64, i64),
    Float(f64, f64),
    /// At least one side is non-numeric; left untouched.
    Other(Value, Value),
}

/// Brings both operands to a shared numeric representation.
///
/// An integer paired with a float is widened to float. Any other pairing is
/// passed through for the operator dispatch to accept or reject.
pub(crate) fn unify(left: Value, right: Value) -> Operands {
    match (left, right) {
        (Value::Int(l), Value::Int(r)) => Operands::Int(l, r),
        (Value::Float(l), Value::Float(r)) => Operands::Float(l, r),
        (Value::Int(l), Value::Float(r)) => Operands::Float(l as f64, r),
        (Value::Float(l), Value::Int(r)) => Operands::Float(l, r as f64),
        (l, r) => Operands::Other(l, r),
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum FloatOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Float arithmetic with `+ - *` routed through exact decimals.
///
/// Division stays plain IEEE-754.
pub(crate) fn float_arithmetic(op: FloatOp, left: f64, right: f64) -> f64 {
    if op == FloatOp::Div {
        return left / right;
    }

    match decimal_arithmetic(op, left, right) {
        Some(result) => result,
        None => {
            trace!(
                "decimal fallback for {:?} on {} and {}, using f64",
                op,
                left,
                right
            );
            match op {
                FloatOp::Add => left + right,
                FloatOp::Sub => left - right,
                FloatOp::Mul => left * right,
                FloatOp::Div => left / right,
            }
        }
    }
}

fn decimal_arithmetic(op: FloatOp, left: f64, right: f64) -> Option<f64> {
    let l = to_decimal(left)?;
    let r = to_decimal(right)?;
    match op {
        FloatOp::Add => exact_sum(l.checked_add(r)?, l, r),
        FloatOp::Sub => exact_sum(l.checked_sub(r)?, l, r),
        FloatOp::Mul => exact_product(l, r),
        FloatOp::Div => None,
    }
}

/// `Decimal` rounds instead of failing once a sum needs more than 96 bits of
/// mantissa, which shows up as a scale below the wider operand's.
fn exact_sum(result: Decimal, l: Decimal, r: Decimal) -> Option<f64> {
    if result.scale() < l.scale().max(r.scale()) {
        return None;
    }
    result.to_string().parse::<f64>().ok()
}

/// Multiplies the integer mantissas directly so products finer than
/// `Decimal`'s 28 fractional digits are not rounded away.
fn exact_product(l: Decimal, r: Decimal) -> Option<f64> {
    let mantissa = l.mantissa().checked_mul(r.mantissa())?;
    let scale = l.scale() + r.scale();
    format!("{}e-{}", mantissa, scale).parse::<f64>().ok()
}

/// Exact decimal for the shortest text that round-trips to `value`.
///
/// Values `Decimal` cannot hold without rounding yield `None`.
fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    let decimal = Decimal::from_scientific(&format!("{:e}", value)).ok()?;
    let exact = decimal.to_string().parse::<f64>().ok()? == value;
    exact.then_some(decimal)
}
