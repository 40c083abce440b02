//! Skip blocks, `reverse` and seize dispatch.
//!
//! Entering `skip { ... }` pushes a marker onto the breadcrumb ledger. While
//! at least one skip is open, every rebinding records the value it replaces.
//! `reverse v` marks the interpreter as reversing and raises
//! `Interrupt::Reverse(v)`, which unwinds through blocks and calls with `?`
//! until the innermost skip intercepts it. That skip pops its breadcrumbs
//! newest first, restoring each one, resolves its marker and tries its seize
//! clauses in source order with the bare `seize` last. When nothing matches
//! the reversal keeps unwinding to the next skip out.
//!
//! # Skip outcomes
//!
//! | body ends with     | breadcrumbs                                  |
//! |--------------------|----------------------------------------------|
//! | normal / `break`   | kept for enclosing skips, marker resolved    |
//! | `return`           | dropped without restoring                    |
//! | `reverse`          | restored, then the seize clauses are tried   |
//! | runtime error      | dropped, the error keeps propagating         |

use std::rc::Rc;

use crate::ast::{Block, Seize, SkipStmt, Stmt};
use crate::interpreter::engine::{Flow, Interpreter};
use crate::interpreter::errors::{Exec, Interrupt, RuntimeError};
use crate::interpreter::ops::access::update_path;
use crate::ledger::{Breadcrumb, SkipMarker};
use crate::memory::scope::ScopeId;
use crate::memory::value::Value;

impl Interpreter {
    /// Record an undo step unless a rollback is replaying
    pub(crate) fn record(&mut self, crumb: Breadcrumb) -> Result<(), RuntimeError> {
        if self.reversing {
            return Ok(());
        }
        self.ledger.record(crumb)
    }

    /// Start unwinding towards the nearest skip block
    pub(crate) fn begin_reversal(&mut self, payload: Value) -> Interrupt {
        tracing::debug!(%payload, open_skips = self.ledger.open_skips(), "reverse");
        self.reversing = true;
        Interrupt::Reverse(payload)
    }

    pub(crate) fn execute_skip(&mut self, skip: &SkipStmt) -> Exec<Flow> {
        let enclosing = self.current;
        let marker = self.ledger.open_skip(self.scopes.next_serial())?;

        match self.execute_block(&skip.body) {
            Ok(flow @ Flow::Return(_)) => {
                self.ledger.discard(marker);
                Ok(flow)
            }
            Ok(flow) => {
                self.ledger.close(marker);
                Ok(flow)
            }
            Err(Interrupt::Reverse(payload)) => {
                if let Err(err) = self.roll_back(marker, enclosing) {
                    self.ledger.discard(marker);
                    return Err(err.into());
                }
                self.ledger.close(marker);
                self.dispatch_seize(&skip.seizes, payload)
            }
            Err(err) => {
                self.ledger.discard(marker);
                Err(err)
            }
        }
    }

    /// Restore every breadcrumb recorded after `marker`, newest first.
    /// `enclosing` is the scope the skip statement itself ran in.
    fn roll_back(&mut self, marker: SkipMarker, enclosing: ScopeId) -> Result<(), RuntimeError> {
        let mut restored = 0usize;
        while let Some(crumb) = self.ledger.pop_above(marker) {
            self.restore(marker, enclosing, crumb)?;
            restored += 1;
        }
        tracing::debug!(restored, "rolled back skip");
        Ok(())
    }

    fn restore(
        &mut self,
        marker: SkipMarker,
        enclosing: ScopeId,
        crumb: Breadcrumb,
    ) -> Result<(), RuntimeError> {
        match crumb {
            Breadcrumb::Marker(_) => Err(RuntimeError::restore_failed(
                "found an unresolved skip marker inside a rollback",
            )),

            Breadcrumb::Binding {
                scope,
                name,
                previous,
            } => {
                if !self.restorable(marker, scope)? {
                    return Ok(());
                }
                self.scopes.define(scope, &name, previous)
            }

            Breadcrumb::Entry {
                scope,
                name,
                mut path,
                previous,
            } => {
                if !self.restorable(marker, scope)? {
                    return Ok(());
                }
                let Value::IndexValuePair(pair) = &previous else {
                    return Err(RuntimeError::restore_failed(format!(
                        "entry breadcrumb for '{}' holds a {}",
                        name,
                        previous.kind_name()
                    )));
                };
                let bound = self.scopes.get_local(scope, &name)?.ok_or_else(|| {
                    RuntimeError::restore_failed(format!("'{}' is no longer bound", name))
                })?;
                path.push(pair.index.clone());
                let restored = update_path(&bound, &path, pair.value.clone())?;
                self.scopes.define(scope, &name, restored)
            }

            // An undo statement always runs. When the scope it was recorded in
            // is gone it runs in the scope enclosing the skip.
            Breadcrumb::Replay { scope, stmt } => {
                let scope = if self.restorable(marker, scope)? {
                    scope
                } else {
                    enclosing
                };
                self.replay(scope, &stmt)
            }
        }
    }

    /// Whether `scope` is still live for a breadcrumb recorded in it.
    ///
    /// Scopes born inside the skip being rolled back may already be gone;
    /// value breadcrumbs for them are dropped. A scope older than the skip must
    /// still exist.
    fn restorable(&self, marker: SkipMarker, scope: ScopeId) -> Result<bool, RuntimeError> {
        if self.scopes.contains(scope) {
            return Ok(true);
        }
        if marker.encloses(scope.serial()) {
            tracing::trace!(scope = scope.serial(), "breadcrumb scope was discarded inside the skip");
            return Ok(false);
        }
        Err(RuntimeError::restore_failed(format!(
            "scope #{} was discarded while a skip that predates it was open",
            scope.serial()
        )))
    }

    /// Run an undo annotation in the scope its expression ran in
    fn replay(&mut self, scope: ScopeId, stmt: &Rc<Stmt>) -> Result<(), RuntimeError> {
        let saved = std::mem::replace(&mut self.current, scope);
        let outcome = self.execute_statement(stmt);
        self.current = saved;

        match outcome {
            Ok(Flow::Normal) => Ok(()),
            Ok(flow) => Err(RuntimeError::restore_failed(format!(
                "undo statement ended with {:?}",
                flow
            ))),
            Err(Interrupt::Reverse(payload)) => Err(RuntimeError::restore_failed(format!(
                "undo statement reversed with payload {}",
                payload
            ))),
            Err(Interrupt::Error(err)) => Err(RuntimeError::restore_failed(format!(
                "undo statement failed: {}",
                err
            ))),
        }
    }

    /// Try each seize clause against the reversal payload
    fn dispatch_seize(&mut self, seizes: &[Seize], payload: Value) -> Exec<Flow> {
        let mut fallback: Option<&Block> = None;

        for seize in seizes {
            match &seize.pattern {
                Some(pattern) => {
                    let candidate = self.evaluate_expr(pattern)?;
                    if candidate.equals(&payload) {
                        return self.seize(&seize.body, &payload);
                    }
                }
                None => {
                    fallback.get_or_insert(&seize.body);
                }
            }
        }

        match fallback {
            Some(body) => self.seize(body, &payload),
            None => {
                tracing::debug!(%payload, "no seize clause matched");
                Err(Interrupt::Reverse(payload))
            }
        }
    }

    fn seize(&mut self, body: &Block, payload: &Value) -> Exec<Flow> {
        tracing::debug!(%payload, "reversal seized");
        self.reversing = false;
        self.execute_block(body)
    }
}
