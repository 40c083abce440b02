//! # Introduction
//!
//! ape is a dynamically typed tree-walking interpreter with a reverse-execution
//! facility: a `skip` block records every rebinding made inside it, and a
//! `reverse <value>` anywhere below it rolls those rebindings back and hands
//! the value to the block's `seize` clauses.
//!
//! ## Execution pipeline
//!
//! ```text
//! (external parser) → AST → Interpreter ⇄ Ledger → Terminal
//! ```
//!
//! 1. [`ast`]: the node types the interpreter consumes, plus constructors for
//!    building programs without source text.
//! 2. [`interpreter`]: walks the AST, dispatches calls to user functions and
//!    natives, and implements skip/reverse/seize.
//! 3. [`memory`]: the runtime model: immutable [`memory::value::Value`]s bound
//!    in an arena of nested [`memory::scope::Scope`]s.
//! 4. [`ledger`]: the LIFO breadcrumb log a rollback replays.
//! 5. [`terminal`]: captured output of `println` and `shell`.
//!
//! ## Example
//!
//! ```
//! use ape::ast::{Decl, Expr, Seize, Stmt};
//! use ape::Interpreter;
//!
//! let mut interp = Interpreter::new();
//! interp.interpret(&Decl::var("x", Expr::int(0))).unwrap();
//! interp
//!     .interpret(&Decl::func(
//!         "main",
//!         &[],
//!         vec![Stmt::skip(
//!             vec![
//!                 Stmt::assign("x", Expr::int(2)),
//!                 Stmt::reverse(Expr::ident("x")),
//!             ],
//!             vec![Seize::matching(
//!                 Expr::int(2),
//!                 vec![Stmt::expr(Expr::call("println", vec![Expr::string("caught")]))],
//!             )],
//!         )],
//!     ))
//!     .unwrap();
//!
//! interp.run_main().unwrap();
//! assert_eq!(interp.terminal().get_output(), vec!["caught"]);
//! assert_eq!(interp.global("x"), Some(ape::Value::Int(0)));
//! ```

pub mod ast;
pub mod interpreter;
pub mod ledger;
pub mod memory;
pub mod terminal;

pub use interpreter::config::InterpreterConfig;
pub use interpreter::engine::Interpreter;
pub use interpreter::errors::RuntimeError;
pub use memory::value::Value;
