//! Statement execution implementation
//!
//! This module handles declarations, expression statements, blocks and
//! `if`/`elif`/`else`. Loops live in `loops`, `switch` and `return` in
//! `jumps`, and `skip`/`reverse` in `reversal`.
//!
//! # Implementation
//!
//! All statement execution methods are implemented as `pub(crate)` methods
//! on the [`Interpreter`] struct and return the statement's [`Flow`], so
//! `return`, `break` and `fallthrough` bubble up through the callers that
//! care about them.

use std::rc::Rc;

use crate::ast::{Block, CondBlock, Decl, Expr, Stmt, VarDecl};
use crate::interpreter::engine::{Flow, Interpreter};
use crate::interpreter::errors::Exec;
use crate::ledger::Breadcrumb;
use crate::memory::value::{Function, Value};

impl Interpreter {
    /// Bind a declaration in the current scope
    pub(crate) fn execute_decl(&mut self, decl: &Decl) -> Exec<()> {
        match decl {
            Decl::Func(func) => {
                let value = Value::Func(Rc::new(Function {
                    name: func.name.clone(),
                    params: func.params.clone(),
                    body: Rc::clone(&func.body),
                }));
                self.scopes.define(self.current, &func.name, value)?;
            }
            Decl::Var(var) => self.execute_var_decl(var)?,
            Decl::Class(class) => {
                tracing::debug!(class = %class.name, "class declarations have no runtime effect");
            }
        }
        Ok(())
    }

    /// `name := value`, or Void without an initializer
    pub(crate) fn execute_var_decl(&mut self, var: &VarDecl) -> Exec<()> {
        let value = match &var.value {
            Some(init) => self.evaluate_expr(init)?,
            None => Value::Void,
        };
        Ok(self.scopes.define(self.current, &var.name, value)?)
    }

    /// Evaluate an expression for its effects.
    ///
    /// An `undo` annotation is recorded only once the expression has run, so
    /// a rollback never undoes something that did not happen.
    pub(crate) fn execute_expr_stmt(&mut self, expr: &Expr, undo: Option<&Rc<Stmt>>) -> Exec<Flow> {
        let value = self.evaluate_expr(expr)?;
        tracing::trace!(%value, "expression statement");

        if let Some(stmt) = undo {
            self.record(Breadcrumb::Replay {
                scope: self.current,
                stmt: Rc::clone(stmt),
            })?;
        }
        Ok(Flow::Normal)
    }

    /// Execute a block in a fresh child of the current scope
    pub(crate) fn execute_block(&mut self, block: &Block) -> Exec<Flow> {
        self.scoped(self.current, |interp| {
            interp.execute_statements(&block.statements)
        })
    }

    pub(crate) fn execute_if(&mut self, branches: &[CondBlock], else_branch: Option<&Block>) -> Exec<Flow> {
        for branch in branches {
            if self.evaluate_condition(&branch.condition)? {
                return self.execute_block(&branch.body);
            }
        }

        match else_branch {
            Some(block) => self.execute_block(block),
            None => Ok(Flow::Normal),
        }
    }
}
