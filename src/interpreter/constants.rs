// Constants for the ape interpreter

/// Rendering of [`Value::Void`](crate::memory::value::Value::Void)
pub const VOID_LITERAL: &str = "VOID";

/// Default breadcrumb ledger capacity (markers included)
pub const DEFAULT_MAX_BREADCRUMBS: usize = 1 << 20;

/// Default limit on nested function calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// Program used by the `shell` native, invoked as `<shell> -c <cmd>`
pub const DEFAULT_SHELL: &str = "bash";
