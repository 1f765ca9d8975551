use std::{error::Error, fmt::Display};

/// A fatal execution error. Every variant aborts the program; there is no
/// local recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// An operand has the wrong kind for the operation.
    Type(String),
    /// Use before declaration, redeclaration, or assignment to an
    /// undeclared variable.
    Name(String),
    /// A value is outside an operation's domain: bad index, empty pop,
    /// duplicate or missing dictionary key, division by zero.
    Domain(String),
    /// Control-flow statements do not nest properly.
    Structure(String),
}

pub type RunResult<T> = Result<T, RuntimeError>;

impl Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::Type(message) => write!(f, "type error: {message}"),
            RuntimeError::Name(message) => write!(f, "name error: {message}"),
            RuntimeError::Domain(message) => write!(f, "domain error: {message}"),
            RuntimeError::Structure(message) => write!(f, "control flow error: {message}"),
        }
    }
}

impl Error for RuntimeError {}
