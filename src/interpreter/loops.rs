//! Loop statement execution (`for` and `while`).
//!
//! Both forms share one AST node; a `while` loop simply has no initializer
//! and no increment. `break` is propagated via `LoopBodyResult` so the loop
//! driver can react without inspecting the flow value itself.
//!
//! `return` inside a loop body is handled by returning
//! `LoopBodyResult::Exit`, which causes the loop to unwind immediately and
//! hand the flow to the enclosing statement. A `fallthrough` cannot leave a
//! loop body and fails with `MisplacedJump`.

use crate::ast::{Block, Expr, Stmt, VarDecl};
use crate::interpreter::engine::{Flow, Interpreter};
use crate::interpreter::errors::{Exec, RuntimeError};

/// Result returned by [`Interpreter::execute_loop_body`] to signal how the body ended.
pub(crate) enum LoopBodyResult {
    /// Body completed normally; the loop should iterate again.
    Continue,
    /// `break` was encountered; the loop should exit cleanly.
    Break,
    /// `return`; the loop unwinds and propagates it.
    Exit(Flow),
}

impl Interpreter {
    /// Executes all statements in `body` inside a fresh scope.
    pub(crate) fn execute_loop_body(&mut self, body: &Block) -> Exec<LoopBodyResult> {
        Ok(match self.execute_block(body)? {
            Flow::Normal => LoopBodyResult::Continue,
            Flow::Break => LoopBodyResult::Break,
            Flow::Fallthrough => {
                return Err(RuntimeError::MisplacedJump { jump: "fallthrough" }.into())
            }
            flow => LoopBodyResult::Exit(flow),
        })
    }

    /// Executes a `for`/`while` loop.
    ///
    /// The condition is evaluated before each iteration and the increment runs
    /// after each body execution. The initializer lives in a loop scope that
    /// encloses every iteration's body scope and is discarded when the loop ends.
    pub(crate) fn execute_for(
        &mut self,
        init: Option<&VarDecl>,
        condition: &Expr,
        increment: Option<&Stmt>,
        body: &Block,
    ) -> Exec<Flow> {
        self.scoped(self.current, |interp| {
            if let Some(init) = init {
                interp.execute_var_decl(init)?;
            }

            let mut iterations: u64 = 0;
            let flow = loop {
                if !interp.evaluate_condition(condition)? {
                    break Flow::Normal;
                }

                match interp.execute_loop_body(body)? {
                    LoopBodyResult::Exit(flow) => break flow,
                    LoopBodyResult::Break => break Flow::Normal,
                    LoopBodyResult::Continue => {}
                }
                iterations += 1;

                if let Some(inc) = increment {
                    interp.execute_statement(inc)?;
                }
            };

            tracing::trace!(iterations, "loop finished");
            Ok(flow)
        })
    }
}
