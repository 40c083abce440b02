//! Runtime error types for the ape interpreter
//!
//! This module defines [`RuntimeError`], which represents every error that can
//! occur while evaluating a program handed to the interpreter.
//!
//! All runtime errors are fatal: they halt the current run, and the interpreter
//! records the location of the statement that was executing (see
//! [`Interpreter::current_location`](crate::interpreter::engine::Interpreter::current_location)).
//!
//! Non-local exits are not errors. `return`, `break` and `fallthrough` travel as
//! a `Flow` result; a `reverse` travels on the error channel as
//! `Interrupt::Reverse` so it can cross expression and call boundaries with
//! `?` until a skip block intercepts it.

use thiserror::Error;

use crate::memory::value::Value;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// Lookup or assignment of a name declared in no enclosing scope
    #[error("undefined name '{name}'")]
    UndefinedName { name: String },

    /// Operand-kind mismatch (arithmetic, comparison, assignment target, call)
    #[error("type error: expected {expected}, got {got}")]
    TypeError { expected: String, got: String },

    /// A `reverse` escaped every enclosing skip/seize
    #[error("unhandled reversal with payload {payload}")]
    UnhandledReversal { payload: String },

    /// Literal lexeme that does not parse for its kind
    #[error("invalid {kind} literal '{lexeme}'")]
    InvalidLiteral { kind: &'static str, lexeme: String },

    /// Integer division or modulo by zero
    #[error("division by zero in {operation}")]
    DivisionByZero { operation: String },

    /// Integer overflow in arithmetic operation
    #[error("integer overflow in {operation}")]
    IntegerOverflow { operation: String },

    /// Function argument count mismatch
    #[error("function '{function}' expects {expected} argument(s), got {got}")]
    ArgumentCountMismatch {
        function: String,
        expected: usize,
        got: usize,
    },

    /// Call nesting exceeded the configured limit
    #[error("call depth exceeded the limit of {limit}")]
    CallDepthExceeded { limit: usize },

    /// `break` or `fallthrough` reached a function boundary
    #[error("'{jump}' used outside of a loop or switch")]
    MisplacedJump { jump: &'static str },

    /// Breadcrumb ledger capacity exceeded
    #[error("breadcrumb ledger limit exceeded: {limit} entries")]
    LedgerLimitExceeded { limit: usize },

    /// Scope handle refers to a scope that has already been discarded
    #[error("scope #{serial} no longer exists")]
    StaleScope { serial: u64 },

    /// A breadcrumb could not be restored during rollback
    #[error("failed to restore breadcrumb: {message}")]
    RestoreFailed { message: String },

    /// Main function not found
    #[error("no main() function found")]
    NoMainFunction,

    /// File or process operation performed by a native function failed
    #[error("{operation} '{target}' failed: {message}")]
    Io {
        operation: &'static str,
        target: String,
        message: String,
    },
}

impl RuntimeError {
    /// Type error naming the expected kind and the kind actually found
    pub fn type_error(expected: impl Into<String>, got: &Value) -> Self {
        RuntimeError::TypeError {
            expected: expected.into(),
            got: got.kind_name().to_string(),
        }
    }

    pub fn restore_failed(message: impl Into<String>) -> Self {
        RuntimeError::RestoreFailed {
            message: message.into(),
        }
    }

    pub fn io(operation: &'static str, target: &str, err: &std::io::Error) -> Self {
        RuntimeError::Io {
            operation,
            target: target.to_string(),
            message: err.to_string(),
        }
    }
}

/// Why evaluation stopped before producing a value
#[derive(Debug, Clone)]
pub(crate) enum Interrupt {
    /// Rollback signal carrying the `reverse` payload
    Reverse(Value),
    Error(RuntimeError),
}

impl Interrupt {
    /// Collapse into the error reported to the embedder
    pub(crate) fn into_error(self) -> RuntimeError {
        match self {
            Interrupt::Reverse(payload) => RuntimeError::UnhandledReversal {
                payload: payload.to_string(),
            },
            Interrupt::Error(err) => err,
        }
    }
}

impl From<RuntimeError> for Interrupt {
    fn from(err: RuntimeError) -> Self {
        Interrupt::Error(err)
    }
}

/// Result of evaluating anything that may be interrupted
pub(crate) type Exec<T> = Result<T, Interrupt>;
