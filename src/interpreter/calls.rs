//! Function call protocol
//!
//! User functions and natives are invoked the same way: the callee is
//! evaluated first, then every argument left to right, and the arguments are
//! bound in a fresh scope whose parent is the **global** scope rather than the
//! scope the function was declared in. Natives with a variadic signature get
//! their arguments under the names `"0"`, `"1"`, ...

use std::rc::Rc;

use crate::ast::Expr;
use crate::interpreter::builtins::NativeCall;
use crate::interpreter::engine::{Flow, Interpreter};
use crate::interpreter::errors::{Exec, RuntimeError};
use crate::memory::value::{Function, NativeFunction, Value};

impl Interpreter {
    pub(crate) fn evaluate_call(&mut self, callee: &Expr, args: &[Expr]) -> Exec<Value> {
        let function = self.evaluate_expr(callee)?;
        if !matches!(function, Value::Func(_) | Value::NativeFunc(_)) {
            return Err(RuntimeError::type_error("function", &function).into());
        }

        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.evaluate_expr(arg)?);
        }
        self.call_value(&function, arg_values)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(function = %function, argc = args.len()))]
    pub(crate) fn call_value(&mut self, function: &Value, args: Vec<Value>) -> Exec<Value> {
        match function {
            Value::Func(func) => self.call_user(Rc::clone(func), args),
            Value::NativeFunc(native) => self.call_native(Rc::clone(native), args),
            other => Err(RuntimeError::type_error("function", other).into()),
        }
    }

    fn call_user(&mut self, func: Rc<Function>, args: Vec<Value>) -> Exec<Value> {
        if args.len() != func.params.len() {
            return Err(RuntimeError::ArgumentCountMismatch {
                function: func.name.clone(),
                expected: func.params.len(),
                got: args.len(),
            }
            .into());
        }

        self.enter_call()?;
        let global = self.scopes.global();
        let result = self.scoped(global, |interp| {
            for (param, arg) in func.params.iter().zip(args) {
                interp.scopes.define(interp.current, param, arg)?;
            }
            interp.execute_statements(&func.body.statements)
        });
        self.call_depth -= 1;

        match result? {
            Flow::Normal => Ok(Value::Void),
            Flow::Return(value) => Ok(value),
            Flow::Break => Err(RuntimeError::MisplacedJump { jump: "break" }.into()),
            Flow::Fallthrough => Err(RuntimeError::MisplacedJump { jump: "fallthrough" }.into()),
        }
    }

    fn call_native(&mut self, native: Rc<NativeFunction>, args: Vec<Value>) -> Exec<Value> {
        if !native.variadic && args.len() != native.params.len() {
            return Err(RuntimeError::ArgumentCountMismatch {
                function: native.name.clone(),
                expected: native.params.len(),
                got: args.len(),
            }
            .into());
        }

        self.enter_call()?;
        let global = self.scopes.global();
        let result = self.scoped(global, |interp| {
            let scope = interp.current;
            let argc = args.len();
            if native.variadic {
                for (position, arg) in args.into_iter().enumerate() {
                    interp.scopes.define(scope, &position.to_string(), arg)?;
                }
            } else {
                for (param, arg) in native.params.iter().zip(args) {
                    interp.scopes.define(scope, param, arg)?;
                }
            }

            let mut call = NativeCall::new(interp, scope, argc);
            Ok((native.callback)(&mut call)?)
        });
        self.call_depth -= 1;
        result
    }

    fn enter_call(&mut self) -> Result<(), RuntimeError> {
        if self.call_depth >= self.config.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded {
                limit: self.config.max_call_depth,
            });
        }
        self.call_depth += 1;
        Ok(())
    }
}
