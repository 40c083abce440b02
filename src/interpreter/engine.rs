// Execution engine for the ape interpreter

use crate::ast::{Decl, Program, SourceLocation, Stmt, StmtKind};
use crate::interpreter::config::InterpreterConfig;
use crate::interpreter::errors::{Exec, RuntimeError};
use crate::ledger::Ledger;
use crate::memory::scope::{ScopeArena, ScopeId};
use crate::memory::value::Value;
use crate::terminal::Terminal;

/// How a statement finished
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Flow {
    Normal,
    Break,
    Fallthrough,
    Return(Value),
}

/// Tree-walking interpreter for ape programs
pub struct Interpreter {
    /// Every live scope; index 0 is the global scope
    pub(crate) scopes: ScopeArena,

    /// Scope the next statement executes in
    pub(crate) current: ScopeId,

    /// Undo log for open skip blocks
    pub(crate) ledger: Ledger,

    /// Captured output of the native functions
    pub(crate) terminal: Terminal,

    pub(crate) config: InterpreterConfig,

    /// Location of the statement being executed
    pub(crate) current_location: SourceLocation,

    /// Set by `reverse` and cleared by the seize clause that handles it.
    /// Nothing is recorded in the ledger while it is set.
    pub(crate) reversing: bool,

    pub(crate) call_depth: usize,
}

impl Interpreter {
    /// Create an interpreter with the default configuration
    pub fn new() -> Self {
        Self::with_config(InterpreterConfig::default())
    }

    /// Create an interpreter whose global scope holds the native function table
    pub fn with_config(config: InterpreterConfig) -> Self {
        let scopes = ScopeArena::new();
        let mut interpreter = Interpreter {
            current: scopes.global(),
            scopes,
            ledger: Ledger::new(config.max_breadcrumbs),
            terminal: Terminal::new(config.echo_output),
            config,
            current_location: SourceLocation::new(1, 1),
            reversing: false,
            call_depth: 0,
        };
        interpreter.install_natives();
        interpreter
    }

    /// Load one top-level declaration into the global scope
    pub fn interpret(&mut self, decl: &Decl) -> Result<(), RuntimeError> {
        let result = self.execute_decl(decl);
        self.settle(result)
    }

    /// Load every declaration of `program` in order
    pub fn load(&mut self, program: &Program) -> Result<(), RuntimeError> {
        program
            .declarations
            .iter()
            .try_for_each(|decl| self.interpret(decl))
    }

    /// Run the program from start to finish
    pub fn run_main(&mut self) -> Result<Value, RuntimeError> {
        let global = self.scopes.global();
        let main_fn = match self.scopes.get_local(global, "main")? {
            Some(main_fn) => main_fn,
            None => return Err(RuntimeError::NoMainFunction),
        };

        let result = self.call_value(&main_fn, Vec::new());
        let value = self.settle(result)?;
        tracing::debug!(result = %value, "main returned");
        Ok(value)
    }

    /// Call the global function `name` with already-evaluated arguments
    pub fn call(&mut self, name: &str, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let function = self.scopes.get(self.scopes.global(), name)?;
        let result = self.call_value(&function, args);
        self.settle(result)
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    /// Value bound to `name` in the global scope
    pub fn global(&self, name: &str) -> Option<Value> {
        self.scopes
            .get_local(self.scopes.global(), name)
            .ok()
            .flatten()
    }

    /// Number of breadcrumbs currently held, skip markers included
    pub fn ledger_len(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_reversing(&self) -> bool {
        self.reversing
    }

    /// Location of the statement that executed last (or failed)
    pub fn current_location(&self) -> SourceLocation {
        self.current_location
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Turn an interrupted evaluation into the embedder-facing result.
    ///
    /// A run that fails leaves no half-open scopes, skips or rollbacks
    /// behind, so the interpreter can be used again afterwards.
    fn settle<T>(&mut self, result: Exec<T>) -> Result<T, RuntimeError> {
        result.map_err(|interrupt| {
            let err = interrupt.into_error();
            tracing::debug!(
                error = %err,
                line = self.current_location.line,
                column = self.current_location.column,
                "run aborted"
            );
            self.reset();
            err
        })
    }

    fn reset(&mut self) {
        self.scopes.truncate_to_global();
        self.current = self.scopes.global();
        self.ledger.clear();
        self.reversing = false;
        self.call_depth = 0;
    }

    /// Run `body` in a fresh scope enclosed by `parent`, discarding the scope
    /// afterwards however `body` ends
    pub(crate) fn scoped<T>(
        &mut self,
        parent: ScopeId,
        body: impl FnOnce(&mut Self) -> Exec<T>,
    ) -> Exec<T> {
        let scope = self.scopes.push(parent);
        let saved = std::mem::replace(&mut self.current, scope);
        let result = body(self);
        self.current = saved;
        self.scopes.pop(scope);
        result
    }

    /// Execute statements in the current scope, stopping at the first
    /// non-normal flow
    pub(crate) fn execute_statements(&mut self, statements: &[Stmt]) -> Exec<Flow> {
        for stmt in statements {
            let flow = self.execute_statement(stmt)?;
            if flow != Flow::Normal {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    /// Execute a single statement
    pub(crate) fn execute_statement(&mut self, stmt: &Stmt) -> Exec<Flow> {
        self.current_location = stmt.location;

        match &stmt.kind {
            StmtKind::Block(block) => self.execute_block(block),
            StmtKind::Expr { expr, undo } => self.execute_expr_stmt(expr, undo.as_ref()),
            StmtKind::Return(expr) => self.execute_return(expr.as_ref()),
            StmtKind::Decl(decl) => {
                self.execute_decl(decl)?;
                Ok(Flow::Normal)
            }
            StmtKind::Assign { target, op, value } => {
                self.execute_assignment(target, *op, value)?;
                Ok(Flow::Normal)
            }
            StmtKind::IncDec { target, op } => {
                self.execute_inc_dec(target, *op)?;
                Ok(Flow::Normal)
            }
            StmtKind::For {
                init,
                condition,
                increment,
                body,
            } => self.execute_for(init.as_ref(), condition, increment.as_deref(), body),
            StmtKind::If {
                branches,
                else_branch,
            } => self.execute_if(branches, else_branch.as_ref()),
            StmtKind::Break => Ok(Flow::Break),
            StmtKind::Fallthrough => Ok(Flow::Fallthrough),
            StmtKind::Switch { subject, cases } => self.execute_switch(subject, cases),
            StmtKind::Skip(skip) => self.execute_skip(skip),
            StmtKind::Reverse(payload) => {
                let payload = self.evaluate_expr(payload)?;
                Err(self.begin_reversal(payload))
            }
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
