use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse failure classification, stable across runs with identical inputs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed expression text or a literal the engine cannot represent.
    Parse,
    /// A fault raised while reducing a well-formed tree to a value.
    Evaluation,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("unsupported literal kind {kind}: {raw}")]
    UnsupportedLiteral { kind: String, raw: String },

    #[error("invalid {kind} literal {raw}: {reason}")]
    InvalidLiteral {
        kind: String,
        raw: String,
        reason: String,
    },

    #[error("invalid binary operation. left: {left}, operation: {operator}, right: {right}")]
    InvalidBinaryOperation {
        left: String,
        operator: String,
        right: String,
    },

    #[error("invalid unary operation. operation: {operator}, operand: {operand}")]
    InvalidUnaryOperation { operator: String, operand: String },

    #[error("selector .{field} needs a mapping, found {found}")]
    NotAMapping { field: String, found: String },

    #[error("cannot index {target} with {index}")]
    InvalidIndex { target: String, index: String },

    #[error("index out of range [{index}] with length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("integer divide by zero")]
    DivisionByZero,

    #[error("call target must be a function name, found {0}")]
    InvalidCallee(String),

    #[error("unknown function {0}")]
    UnknownFunction(String),

    #[error("{name} is not callable, found {found}")]
    NotCallable { name: String, found: String },

    #[error("{function} expects {expected} arguments, got {found}")]
    ArgumentCount {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("argument {position} of {function} must be {expected}, found {found}")]
    ArgumentType {
        function: String,
        position: usize,
        expected: String,
        found: String,
    },

    #[error("invalid pattern: {0}")]
    Regex(String),

    #[error("expression nested deeper than {0} levels")]
    DepthExceeded(usize),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Parse(_) | Error::UnsupportedLiteral { .. } | Error::InvalidLiteral { .. } => {
                ErrorKind::Parse
            }
            _ => ErrorKind::Evaluation,
        }
    }

    pub(crate) fn argument_type(
        function: &str,
        position: usize,
        expected: &str,
        found: &crate::ast::Value,
    ) -> Self {
        Error::ArgumentType {
            function: function.to_string(),
            position,
            expected: expected.to_string(),
            found: found.type_name().to_string(),
        }
    }
}

impl From<pest::error::Error<crate::ast::Rule>> for Error {
    fn from(value: pest::error::Error<crate::ast::Rule>) -> Self {
        Error::Parse(value.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(value: regex::Error) -> Self {
        Error::Regex(value.to_string())
    }
}
