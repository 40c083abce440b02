//! Built-in (native) function implementations
//!
//! This module provides the host functions defined in the global scope of
//! every interpreter, plus the [`NativeCall`] handle they receive.
//!
//! # Supported Built-ins
//!
//! - `println(...)`: concatenated string forms of all arguments plus a newline
//! - `read(filename)`: file contents as a string
//! - `write(filename, data)`: replace the file contents with `data`
//! - `touch(filename)`: create or truncate a file
//! - `delete(filename)`: remove a file
//! - `shell(cmd)`: run `cmd` through the configured shell and print its output
//!
//! # Implementation Notes
//!
//! - Output goes to the interpreter's [`Terminal`], never straight to stdout
//! - `read`, `write` and `shell` fail the run on I/O errors; `touch` and
//!   `delete` only log a warning, since a missing file is routinely expected
//! - Natives read their arguments from the call scope by parameter name

use std::fs;
use std::process::Command;
use std::rc::Rc;

use crate::interpreter::config::InterpreterConfig;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::scope::ScopeId;
use crate::memory::value::{NativeFn, NativeFunction, Value};
use crate::terminal::Terminal;

/// Access a native function has to its arguments and the interpreter
pub struct NativeCall<'a> {
    interpreter: &'a mut Interpreter,
    scope: ScopeId,
    argc: usize,
}

impl<'a> NativeCall<'a> {
    pub(crate) fn new(interpreter: &'a mut Interpreter, scope: ScopeId, argc: usize) -> Self {
        NativeCall {
            interpreter,
            scope,
            argc,
        }
    }

    /// Argument bound to parameter `name`
    pub fn arg(&self, name: &str) -> Result<Value, RuntimeError> {
        self.interpreter
            .scopes
            .get_local(self.scope, name)?
            .ok_or_else(|| RuntimeError::UndefinedName {
                name: name.to_string(),
            })
    }

    /// Argument bound to parameter `name`, which must be a string
    pub fn str_arg(&self, name: &str) -> Result<String, RuntimeError> {
        Ok(self.arg(name)?.expect_str()?.to_string())
    }

    /// Arguments of a variadic call, in order
    pub fn positional(&self) -> Result<Vec<Value>, RuntimeError> {
        (0..self.argc)
            .map(|position| self.arg(&position.to_string()))
            .collect()
    }

    pub fn argc(&self) -> usize {
        self.argc
    }

    pub fn terminal(&mut self) -> &mut Terminal {
        &mut self.interpreter.terminal
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.interpreter.config
    }
}

/// Entry of the native function table
struct NativeSpec {
    name: &'static str,
    params: &'static [&'static str],
    variadic: bool,
    callback: NativeFn,
}

const NATIVE_TABLE: &[NativeSpec] = &[
    NativeSpec {
        name: "println",
        params: &[],
        variadic: true,
        callback: builtin_println,
    },
    NativeSpec {
        name: "read",
        params: &["filename"],
        variadic: false,
        callback: builtin_read,
    },
    NativeSpec {
        name: "write",
        params: &["filename", "data"],
        variadic: false,
        callback: builtin_write,
    },
    NativeSpec {
        name: "touch",
        params: &["filename"],
        variadic: false,
        callback: builtin_touch,
    },
    NativeSpec {
        name: "delete",
        params: &["filename"],
        variadic: false,
        callback: builtin_delete,
    },
    NativeSpec {
        name: "shell",
        params: &["cmd"],
        variadic: false,
        callback: builtin_shell,
    },
];

impl Interpreter {
    pub(crate) fn install_natives(&mut self) {
        for spec in NATIVE_TABLE {
            self.define_native(NativeFunction {
                name: spec.name.to_string(),
                params: spec.params.iter().map(|p| p.to_string()).collect(),
                callback: spec.callback,
                variadic: spec.variadic,
            });
        }
    }

    /// Define a host function with named parameters in the global scope,
    /// replacing any binding of the same name
    pub fn register_native(&mut self, name: &str, params: &[&str], callback: NativeFn) {
        self.define_native(NativeFunction {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            callback,
            variadic: false,
        });
    }

    /// Define a host function taking any number of arguments in the global scope
    pub fn register_variadic_native(&mut self, name: &str, callback: NativeFn) {
        self.define_native(NativeFunction {
            name: name.to_string(),
            params: Vec::new(),
            callback,
            variadic: true,
        });
    }

    fn define_native(&mut self, native: NativeFunction) {
        let name = native.name.clone();
        self.scopes
            .define_global(&name, Value::NativeFunc(Rc::new(native)));
    }
}

fn builtin_println(call: &mut NativeCall<'_>) -> Result<Value, RuntimeError> {
    let mut line: String = call
        .positional()?
        .iter()
        .map(|value| value.to_string())
        .collect();
    line.push('\n');
    call.terminal().print(&line);
    Ok(Value::Void)
}

fn builtin_read(call: &mut NativeCall<'_>) -> Result<Value, RuntimeError> {
    let filename = call.str_arg("filename")?;
    let contents = fs::read_to_string(&filename).map_err(|e| RuntimeError::io("read", &filename, &e))?;
    Ok(Value::string(contents))
}

fn builtin_write(call: &mut NativeCall<'_>) -> Result<Value, RuntimeError> {
    let filename = call.str_arg("filename")?;
    let data = call.str_arg("data")?;
    fs::write(&filename, data).map_err(|e| RuntimeError::io("write", &filename, &e))?;
    Ok(Value::Void)
}

fn builtin_touch(call: &mut NativeCall<'_>) -> Result<Value, RuntimeError> {
    let filename = call.str_arg("filename")?;
    if let Err(err) = fs::File::create(&filename) {
        tracing::warn!(%filename, %err, "touch failed");
    }
    Ok(Value::Void)
}

fn builtin_delete(call: &mut NativeCall<'_>) -> Result<Value, RuntimeError> {
    let filename = call.str_arg("filename")?;
    if let Err(err) = fs::remove_file(&filename) {
        tracing::warn!(%filename, %err, "delete failed");
    }
    Ok(Value::Void)
}

fn builtin_shell(call: &mut NativeCall<'_>) -> Result<Value, RuntimeError> {
    let cmd = call.str_arg("cmd")?;
    let shell = call.config().shell.clone();

    let output = Command::new(&shell)
        .arg("-c")
        .arg(&cmd)
        .output()
        .map_err(|e| RuntimeError::io("shell", &cmd, &e))?;
    tracing::debug!(%cmd, status = %output.status, "shell command finished");

    let terminal = call.terminal();
    terminal.print(&String::from_utf8_lossy(&output.stdout));
    terminal.print(&String::from_utf8_lossy(&output.stderr));
    Ok(Value::Void)
}
