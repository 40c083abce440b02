use crate::interpreter::constants::{DEFAULT_MAX_BREADCRUMBS, DEFAULT_MAX_CALL_DEPTH, DEFAULT_SHELL};

/// Limits and host settings for one [`Interpreter`](crate::interpreter::engine::Interpreter)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Breadcrumb ledger capacity
    pub max_breadcrumbs: usize,
    /// Deepest permitted call nesting
    pub max_call_depth: usize,
    /// Also write program output to the process stdout
    pub echo_output: bool,
    /// Shell program run by the `shell` native
    pub shell: String,
}

impl InterpreterConfig {
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo_output = echo;
        self
    }

    pub fn with_max_breadcrumbs(mut self, limit: usize) -> Self {
        self.max_breadcrumbs = limit;
        self
    }

    pub fn with_max_call_depth(mut self, limit: usize) -> Self {
        self.max_call_depth = limit;
        self
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            max_breadcrumbs: DEFAULT_MAX_BREADCRUMBS,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            echo_output: false,
            shell: DEFAULT_SHELL.to_string(),
        }
    }
}
