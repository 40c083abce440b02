use crate::ast::{Block, CaseNode, Expr, StmtKind};
use crate::interpreter::engine::{Flow, Interpreter};
use crate::interpreter::errors::{Exec, RuntimeError};
use crate::memory::value::Value;

impl Interpreter {
    pub(crate) fn execute_return(&mut self, expr: Option<&Expr>) -> Exec<Flow> {
        let return_val = match expr {
            Some(ret_expr) => self.evaluate_expr(ret_expr)?,
            None => Value::Void,
        };
        Ok(Flow::Return(return_val))
    }

    /// Run the first case whose value equals the subject (or the `default`
    /// clause), continuing into following cases only through `fallthrough`
    pub(crate) fn execute_switch(&mut self, subject: &Expr, cases: &[CaseNode]) -> Exec<Flow> {
        let switch_val = self.evaluate_expr(subject)?;

        let mut match_index: Option<usize> = None;
        let mut default_index: Option<usize> = None;

        for (i, case) in cases.iter().enumerate() {
            match case {
                CaseNode::Case { value, .. } => {
                    let case_val = self.evaluate_expr(value)?;
                    if switch_val.equals(&case_val) {
                        match_index = Some(i);
                        break;
                    }
                }
                CaseNode::Default { .. } => {
                    default_index.get_or_insert(i);
                }
            }
        }

        let Some(start) = match_index.or(default_index) else {
            return Ok(Flow::Normal);
        };

        for case in &cases[start..] {
            match self.execute_block(case.body())? {
                Flow::Fallthrough if ends_with_fallthrough(case.body()) => continue,
                // Only a trailing `fallthrough` hands control to the next case
                Flow::Fallthrough => {
                    return Err(RuntimeError::MisplacedJump { jump: "fallthrough" }.into())
                }
                // Implicit break at the end of a case; `break` leaves the switch too
                Flow::Normal | Flow::Break => return Ok(Flow::Normal),
                flow @ Flow::Return(_) => return Ok(flow),
            }
        }

        Ok(Flow::Normal)
    }
}

fn ends_with_fallthrough(body: &Block) -> bool {
    body.statements
        .last()
        .is_some_and(|stmt| matches!(stmt.kind, StmtKind::Fallthrough))
}
