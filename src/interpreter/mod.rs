//! ape interpreter execution engine
//!
//! This module provides the core execution logic:
//! - [`engine`]: Main interpreter, statement dispatch and the embedder API
//! - [`errors`]: Runtime error types
//! - [`builtins`]: Native functions installed in every global scope
//! - [`config`]: Limits and host settings
//!
//! # Execution Model
//!
//! The interpreter walks the AST directly. Each statement reports how it
//! finished (normally, `break`, `fallthrough` or `return`), while `reverse`
//! and runtime errors travel on the error channel until a skip block or the
//! embedder API catches them.
//!
//! Function calls bind their arguments in a scope parented at the global
//! scope, so a function body sees its parameters, its own locals and globals,
//! never the locals of its caller or of the scope it was declared in.

pub mod builtins;
mod calls;
pub mod config;
pub mod constants;
pub mod engine;
pub mod errors;
mod expressions;
mod jumps;
mod loops;
mod ops;
mod reversal;
mod statements;
