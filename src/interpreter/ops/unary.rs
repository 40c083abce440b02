use crate::ast::UnOp;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;

impl Value {
    /// Apply a unary operator: `!` on Bool, `-` on numbers
    pub fn unary(&self, op: UnOp) -> Result<Value, RuntimeError> {
        match (op, self) {
            (UnOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
            (UnOp::Not, other) => Err(RuntimeError::type_error("bool", other)),
            (UnOp::Neg, Value::Int(n)) => {
                n.checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| RuntimeError::IntegerOverflow {
                        operation: format!("-({})", n),
                    })
            }
            (UnOp::Neg, Value::Rational(x)) => Ok(Value::Rational(-x)),
            (UnOp::Neg, other) => Err(RuntimeError::type_error("number", other)),
        }
    }
}
