pub mod access;
pub mod assign;
pub mod binary;
pub mod unary;

// Operator semantics are inherent methods on `Value`; the `Interpreter`
// methods here only evaluate operands and resolve assignment targets.
