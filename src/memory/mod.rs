//! Memory model for the ape interpreter
//!
//! This module provides the core state abstractions:
//! - [`value`]: Runtime value representation (Void, Bool, Str, Int, Rational,
//!   Map, functions, index/value pairs)
//! - [`scope`]: Arena of nested name environments
//!
//! # Mutation
//!
//! Values never change in place. Assigning to `m[k]` builds a new map and
//! rebinds `m` in the scope that owns it, which is what lets the breadcrumb
//! ledger restore an entry by rebinding the previous container contents.

pub mod scope;
pub mod value;
