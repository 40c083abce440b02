// Breadcrumb ledger for reverse execution
//
// One small undo record per mutating statement executed inside a `skip`
// block, instead of a snapshot of the whole state.
// The ledger only stores the records; replaying them is the interpreter's job
// (see `interpreter::reversal`), because restoring needs the scope arena and,
// for undo annotations, the evaluator.

use std::rc::Rc;

use crate::ast::Stmt;
use crate::interpreter::errors::RuntimeError;
use crate::memory::{scope::ScopeId, value::Value};

/// Start boundary of one `skip` block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipMarker {
    id: u64,
    horizon: u64,
}

impl SkipMarker {
    /// Whether the scope with `serial` was created inside this skip, i.e. at or
    /// after the horizon recorded when it was entered
    pub fn encloses(&self, serial: u64) -> bool {
        serial >= self.horizon
    }
}

/// One recorded undo step
#[derive(Debug, Clone)]
pub enum Breadcrumb {
    Marker(SkipMarker),
    /// `name` in `scope` held `previous` before it was rebound
    Binding {
        scope: ScopeId,
        name: String,
        previous: Value,
    },
    /// One container entry inside the value bound to `name`.
    ///
    /// `path` leads from the bound value to the container that was updated;
    /// `previous` is an [`Value::IndexValuePair`] holding the updated index
    /// and what was stored there before (Void if the index was absent).
    Entry {
        scope: ScopeId,
        name: String,
        path: Vec<Value>,
        previous: Value,
    },
    /// Statement to replay in `scope` to invert an expression statement
    Replay { scope: ScopeId, stmt: Rc<Stmt> },
}

/// LIFO log of breadcrumbs shared by every open skip block
#[derive(Debug)]
pub struct Ledger {
    crumbs: Vec<Breadcrumb>,
    open: usize,
    next_marker: u64,
    limit: usize,
}

impl Ledger {
    pub fn new(limit: usize) -> Self {
        Ledger {
            crumbs: Vec::new(),
            open: 0,
            next_marker: 0,
            limit,
        }
    }

    /// Whether a mutation happening now could ever be rolled back
    pub fn is_recording(&self) -> bool {
        self.open > 0
    }

    /// Number of skip blocks currently open
    pub fn open_skips(&self) -> usize {
        self.open
    }

    /// Push a marker for a skip block entered while scope serial `horizon` was next
    pub fn open_skip(&mut self, horizon: u64) -> Result<SkipMarker, RuntimeError> {
        let marker = SkipMarker {
            id: self.next_marker,
            horizon,
        };
        self.push(Breadcrumb::Marker(marker))?;
        self.next_marker += 1;
        self.open += 1;
        Ok(marker)
    }

    /// Record an undo step; a no-op when no skip is open
    pub fn record(&mut self, crumb: Breadcrumb) -> Result<(), RuntimeError> {
        if !self.is_recording() {
            return Ok(());
        }
        self.push(crumb)
    }

    fn push(&mut self, crumb: Breadcrumb) -> Result<(), RuntimeError> {
        if self.crumbs.len() >= self.limit {
            return Err(RuntimeError::LedgerLimitExceeded { limit: self.limit });
        }
        self.crumbs.push(crumb);
        Ok(())
    }

    /// Pop the newest breadcrumb recorded after `marker`.
    ///
    /// Returns `None` once `marker` itself is on top; the marker stays in place.
    pub fn pop_above(&mut self, marker: SkipMarker) -> Option<Breadcrumb> {
        match self.crumbs.last() {
            Some(Breadcrumb::Marker(top)) if *top == marker => None,
            Some(_) => self.crumbs.pop(),
            None => None,
        }
    }

    /// Resolve `marker`, keeping the breadcrumbs recorded after it so an
    /// enclosing skip can still roll them back
    pub fn close(&mut self, marker: SkipMarker) {
        if let Some(pos) = self.position(marker) {
            self.crumbs.remove(pos);
            self.resolved();
        }
    }

    /// Drop `marker` and everything recorded after it without restoring
    pub fn discard(&mut self, marker: SkipMarker) {
        if let Some(pos) = self.position(marker) {
            self.crumbs.truncate(pos);
            self.resolved();
        }
    }

    fn resolved(&mut self) {
        self.open -= 1;
        if self.open == 0 {
            // Nothing left that could restore these
            self.crumbs.clear();
        }
    }

    fn position(&self, marker: SkipMarker) -> Option<usize> {
        self.crumbs
            .iter()
            .rposition(|c| matches!(c, Breadcrumb::Marker(m) if *m == marker))
    }

    pub fn clear(&mut self) {
        self.crumbs.clear();
        self.open = 0;
    }

    /// Get the number of breadcrumbs, markers included
    pub fn len(&self) -> usize {
        self.crumbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crumbs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::scope::ScopeArena;

    fn binding(scope: ScopeId, name: &str, previous: i64) -> Breadcrumb {
        Breadcrumb::Binding {
            scope,
            name: name.to_string(),
            previous: Value::Int(previous),
        }
    }

    #[test]
    fn test_nothing_recorded_outside_skip() {
        let arena = ScopeArena::new();
        let mut ledger = Ledger::new(16);

        ledger.record(binding(arena.global(), "x", 0)).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_pop_above_stops_at_marker() {
        let arena = ScopeArena::new();
        let mut ledger = Ledger::new(16);
        let marker = ledger.open_skip(arena.next_serial()).unwrap();
        ledger.record(binding(arena.global(), "x", 0)).unwrap();
        ledger.record(binding(arena.global(), "x", 1)).unwrap();

        let newest = ledger.pop_above(marker);
        assert!(matches!(
            newest,
            Some(Breadcrumb::Binding { previous: Value::Int(1), .. })
        ));
        assert!(ledger.pop_above(marker).is_some());
        assert!(ledger.pop_above(marker).is_none());
        assert_eq!(ledger.len(), 1);

        ledger.close(marker);
        assert!(ledger.is_empty());
        assert!(!ledger.is_recording());
    }

    #[test]
    fn test_close_inner_keeps_crumbs_for_outer() {
        let arena = ScopeArena::new();
        let mut ledger = Ledger::new(16);
        let outer = ledger.open_skip(arena.next_serial()).unwrap();
        ledger.record(binding(arena.global(), "x", 0)).unwrap();
        let inner = ledger.open_skip(arena.next_serial()).unwrap();
        ledger.record(binding(arena.global(), "x", 1)).unwrap();

        ledger.close(inner);
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.open_skips(), 1);

        let mut restored = 0;
        while ledger.pop_above(outer).is_some() {
            restored += 1;
        }
        assert_eq!(restored, 2);
    }

    #[test]
    fn test_discard_drops_without_restoring() {
        let arena = ScopeArena::new();
        let mut ledger = Ledger::new(16);
        let outer = ledger.open_skip(arena.next_serial()).unwrap();
        ledger.record(binding(arena.global(), "x", 0)).unwrap();
        let inner = ledger.open_skip(arena.next_serial()).unwrap();
        ledger.record(binding(arena.global(), "x", 1)).unwrap();

        ledger.discard(inner);
        assert_eq!(ledger.len(), 2);

        ledger.discard(outer);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_limit_exceeded() {
        let arena = ScopeArena::new();
        let mut ledger = Ledger::new(2);
        ledger.open_skip(arena.next_serial()).unwrap();
        ledger.record(binding(arena.global(), "x", 0)).unwrap();

        assert_eq!(
            ledger.record(binding(arena.global(), "x", 1)),
            Err(RuntimeError::LedgerLimitExceeded { limit: 2 })
        );
    }

    #[test]
    fn test_marker_horizon() {
        let mut arena = ScopeArena::new();
        let before = arena.push(arena.global());
        let mut ledger = Ledger::new(4);
        let marker = ledger.open_skip(arena.next_serial()).unwrap();
        let inside = arena.push(before);

        assert!(!marker.encloses(before.serial()));
        assert!(marker.encloses(inside.serial()));
    }
}
