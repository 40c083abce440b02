//! Assignment and lvalue resolution
//!
//! An assignable target is an identifier, optionally followed by a chain of
//! index (`m[k]`) and field (`m.k`) accesses. Values are immutable, so storing
//! into `m[a][b]` rebuilds the containers along the path and rebinds `m` in
//! the scope that owns it.
//!
//! Every rebinding first records a breadcrumb so an enclosing skip block can
//! restore it:
//! - plain variables record the previous value of the binding
//! - indexed targets record only the previous entry at the final index, as an
//!   index/value pair, so unrelated entries written later are left alone when
//!   the entry is restored

use crate::ast::{AssignOp, Expr, IncOp};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{Exec, RuntimeError};
use crate::interpreter::ops::access::{read_path, update_path};
use crate::ledger::Breadcrumb;
use crate::memory::value::Value;

/// A resolved assignment target: the root variable plus the evaluated keys
#[derive(Debug, Clone)]
pub(crate) struct LValue {
    pub name: String,
    pub path: Vec<Value>,
}

impl Interpreter {
    /// Evaluate the index expressions of `target`, left to right
    pub(crate) fn resolve_lvalue(&mut self, target: &Expr) -> Exec<LValue> {
        match target {
            Expr::Ident(name) => Ok(LValue {
                name: name.clone(),
                path: Vec::new(),
            }),
            Expr::Group(inner) => self.resolve_lvalue(inner),
            Expr::Index { container, index } => {
                let mut lvalue = self.resolve_lvalue(container)?;
                let key = self.evaluate_expr(index)?;
                lvalue.path.push(key);
                Ok(lvalue)
            }
            Expr::Dot { object, field } => {
                let mut lvalue = self.resolve_lvalue(object)?;
                lvalue.path.push(Value::from(field.as_str()));
                Ok(lvalue)
            }
            other => Err(RuntimeError::not_assignable(other).into()),
        }
    }

    pub(crate) fn read_lvalue(&self, lvalue: &LValue) -> Result<Value, RuntimeError> {
        let root = self.scopes.get(self.current, &lvalue.name)?;
        read_path(&root, &lvalue.path)
    }

    /// Store `value` at `lvalue`, recording what it replaces
    pub(crate) fn assign_to_lvalue(&mut self, lvalue: &LValue, value: Value) -> Result<(), RuntimeError> {
        let owner = self
            .scopes
            .get_scope(self.current, &lvalue.name)?
            .ok_or_else(|| RuntimeError::UndefinedName {
                name: lvalue.name.clone(),
            })?;
        let bound = self.scopes.get(owner, &lvalue.name)?;

        let (crumb, updated) = match lvalue.path.split_last() {
            None => (
                Breadcrumb::Binding {
                    scope: owner,
                    name: lvalue.name.clone(),
                    previous: bound,
                },
                value,
            ),
            Some((key, parents)) => {
                let updated = update_path(&bound, &lvalue.path, value)?;
                let previous = read_path(&bound, parents)?.index(key)?;
                (
                    Breadcrumb::Entry {
                        scope: owner,
                        name: lvalue.name.clone(),
                        path: parents.to_vec(),
                        previous: Value::index_value_pair(key.clone(), previous),
                    },
                    updated,
                )
            }
        };

        self.record(crumb)?;
        self.scopes.define(owner, &lvalue.name, updated)
    }

    /// `target = value` and the compound forms `target op= value`
    pub(crate) fn execute_assignment(&mut self, target: &Expr, op: AssignOp, value: &Expr) -> Exec<()> {
        let lvalue = self.resolve_lvalue(target)?;
        let rhs = self.evaluate_expr(value)?;

        let new_value = match op.binary_op() {
            None => rhs,
            Some(bin_op) => self.read_lvalue(&lvalue)?.binary(bin_op, &rhs)?,
        };

        tracing::trace!(variable = %lvalue.name, value = %new_value, "assign");
        Ok(self.assign_to_lvalue(&lvalue, new_value)?)
    }

    /// `target++` / `target--`
    pub(crate) fn execute_inc_dec(&mut self, target: &Expr, op: IncOp) -> Exec<()> {
        let lvalue = self.resolve_lvalue(target)?;
        let current = self.read_lvalue(&lvalue)?;
        let new_value = match op {
            IncOp::Increment => current.checked_add(&Value::Int(1))?,
            IncOp::Decrement => current.checked_sub(&Value::Int(1))?,
        };
        Ok(self.assign_to_lvalue(&lvalue, new_value)?)
    }
}
