use std::fmt;

mod evaluator;
mod numeric;
mod parser;
mod value;

pub(crate) use evaluator::resolve_identifier;
pub use evaluator::{Evaluator, Function, Scope};
pub use parser::{ExpressionParser as Parser, Rule};
pub use value::{Callable, Environment, Sequence, Value};

/// The lexical kind of a literal, as reported by the parser.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Int,
    Float,
    String,
    Char,
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LiteralKind::Int => "int",
            LiteralKind::Float => "float",
            LiteralKind::String => "string",
            LiteralKind::Char => "char",
        };
        f.write_str(name)
    }
}

/// Syntax tree produced by [`Parser`] and consumed read-only by [`Evaluator`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal source text, quotes included for strings.
    Literal {
        kind: LiteralKind,
        raw: String,
    },
    Identifier(String),
    Selector {
        object: Box<Node>,
        field: String,
    },
    Index {
        object: Box<Node>,
        index: Box<Node>,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<Node>,
    },
    Binary {
        left: Box<Node>,
        operator: Operator,
        right: Box<Node>,
    },
    Call {
        callee: Box<Node>,
        args: Vec<Node>,
    },
    Paren(Box<Node>),
}

impl Node {
    pub fn literal(kind: LiteralKind, raw: &str) -> Self {
        Node::Literal {
            kind,
            raw: raw.to_string(),
        }
    }

    pub fn identifier(name: &str) -> Self {
        Node::Identifier(name.to_string())
    }

    pub fn binary(left: Node, operator: Operator, right: Node) -> Self {
        Node::Binary {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    pub fn unary(operator: UnaryOperator, operand: Node) -> Self {
        Node::Unary {
            operator,
            operand: Box::new(operand),
        }
    }

    pub fn selector(object: Node, field: &str) -> Self {
        Node::Selector {
            object: Box::new(object),
            field: field.to_string(),
        }
    }

    pub fn index(object: Node, index: Node) -> Self {
        Node::Index {
            object: Box::new(object),
            index: Box::new(index),
        }
    }

    pub fn call(callee: Node, args: Vec<Node>) -> Self {
        Node::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn paren(inner: Node) -> Self {
        Node::Paren(Box::new(inner))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Literal { .. } => "literal",
            Node::Identifier(_) => "identifier",
            Node::Selector { .. } => "selector",
            Node::Index { .. } => "index",
            Node::Unary { .. } => "unary expression",
            Node::Binary { .. } => "binary expression",
            Node::Call { .. } => "call",
            Node::Paren(_) => "parenthesized expression",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Equal,
    NotEqual,
    And,
    Or,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Modulo => "%",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::GreaterThanOrEqual => ">=",
            Operator::LessThanOrEqual => "<=",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::And => "&&",
            Operator::Or => "||",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl TryFrom<&str> for Operator {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Subtract),
            "*" => Ok(Operator::Multiply),
            "/" => Ok(Operator::Divide),
            "%" => Ok(Operator::Modulo),
            ">" => Ok(Operator::GreaterThan),
            "<" => Ok(Operator::LessThan),
            ">=" => Ok(Operator::GreaterThanOrEqual),
            "<=" => Ok(Operator::LessThanOrEqual),
            "==" => Ok(Operator::Equal),
            "!=" => Ok(Operator::NotEqual),
            "&&" => Ok(Operator::And),
            "||" => Ok(Operator::Or),
            _ => Err(format!("Unknown operator: {}", value)),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
    Negate,
    Plus,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            UnaryOperator::Not => "!",
            UnaryOperator::Negate => "-",
            UnaryOperator::Plus => "+",
        };
        f.write_str(symbol)
    }
}

impl TryFrom<&str> for UnaryOperator {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "!" => Ok(UnaryOperator::Not),
            "-" => Ok(UnaryOperator::Negate),
            "+" => Ok(UnaryOperator::Plus),
            _ => Err(format!("Unknown unary operator: {}", value)),
        }
    }
}
