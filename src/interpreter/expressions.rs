//! Expression evaluation
//!
//! Every expression except a call is referentially transparent: it reads the
//! scope chain and builds a new [`Value`] without mutating anything. The
//! per-kind operations live on [`Value`] itself (see `interpreter::ops`); this
//! module only walks the tree and evaluates operands left to right.

use crate::ast::Expr;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{Exec, RuntimeError};
use crate::memory::value::Value;

impl Interpreter {
    pub(crate) fn evaluate_expr(&mut self, expr: &Expr) -> Exec<Value> {
        match expr {
            Expr::Literal { kind, lexeme } => Ok(Value::from_literal(*kind, lexeme)?),

            Expr::Ident(name) => Ok(self.scopes.get(self.current, name)?),

            Expr::Group(inner) => self.evaluate_expr(inner),

            Expr::Unary { op, expr } => {
                let operand = self.evaluate_expr(expr)?;
                Ok(operand.unary(*op)?)
            }

            Expr::Binary { op, left, right } => {
                // Both sides are always evaluated, `&&` and `||` included
                let lhs = self.evaluate_expr(left)?;
                let rhs = self.evaluate_expr(right)?;
                Ok(lhs.binary(*op, &rhs)?)
            }

            Expr::Call { callee, args } => self.evaluate_call(callee, args),

            Expr::Dot { object, field } => {
                let object = self.evaluate_expr(object)?;
                Ok(object.field(field)?)
            }

            Expr::Index { container, index } => {
                let container = self.evaluate_expr(container)?;
                let index = self.evaluate_expr(index)?;
                Ok(container.index(&index)?)
            }

            Expr::List(items) => self.evaluate_list(items),

            Expr::Map(entries) => self.evaluate_map(entries),
        }
    }

    /// Evaluate a condition, which must produce a Bool
    pub(crate) fn evaluate_condition(&mut self, expr: &Expr) -> Exec<bool> {
        let value = self.evaluate_expr(expr)?;
        Ok(value.expect_bool()?)
    }
}

/// Short description of an expression's shape for diagnostics
pub(crate) fn describe_expr(expr: &Expr) -> &'static str {
    match expr {
        Expr::Literal { .. } => "literal",
        Expr::Ident(_) => "identifier",
        Expr::Group(_) => "grouping",
        Expr::Unary { .. } => "unary expression",
        Expr::Binary { .. } => "binary expression",
        Expr::Call { .. } => "call",
        Expr::Dot { .. } => "field access",
        Expr::Index { .. } => "index expression",
        Expr::List(_) => "list literal",
        Expr::Map(_) => "map literal",
    }
}

impl RuntimeError {
    /// Type error for an expression that cannot be assigned to
    pub(crate) fn not_assignable(expr: &Expr) -> Self {
        RuntimeError::TypeError {
            expected: "assignable target".to_string(),
            got: describe_expr(expr).to_string(),
        }
    }
}
