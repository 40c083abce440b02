use crate::ast::BinOp;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;

/// Numeric operands after Int/Rational promotion
enum Operands {
    Ints(i64, i64),
    Rationals(f64, f64),
}

fn operand_error(expected: &str, op: BinOp, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::TypeError {
        expected: expected.to_string(),
        got: format!("{} {} {}", left.kind_name(), op.symbol(), right.kind_name()),
    }
}

fn numbers(op: BinOp, left: &Value, right: &Value) -> Result<Operands, RuntimeError> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(Operands::Ints(*a, *b)),
        (Value::Int(a), Value::Rational(b)) => Ok(Operands::Rationals(*a as f64, *b)),
        (Value::Rational(a), Value::Int(b)) => Ok(Operands::Rationals(*a, *b as f64)),
        (Value::Rational(a), Value::Rational(b)) => Ok(Operands::Rationals(*a, *b)),
        _ => Err(operand_error("numbers", op, left, right)),
    }
}

fn overflow(a: i64, op: BinOp, b: i64) -> RuntimeError {
    RuntimeError::IntegerOverflow {
        operation: format!("{} {} {}", a, op.symbol(), b),
    }
}

impl Value {
    /// Apply a binary operator; both operands are already evaluated
    pub fn binary(&self, op: BinOp, rhs: &Value) -> Result<Value, RuntimeError> {
        match op {
            BinOp::Add => self.checked_add(rhs),
            BinOp::Sub => self.checked_sub(rhs),
            BinOp::Mul => self.checked_mul(rhs),
            BinOp::Div => self.checked_div(rhs),
            BinOp::Mod => self.checked_rem(rhs),
            BinOp::Pow => self.pow(rhs),
            BinOp::Eq => Ok(Value::Bool(self.equals(rhs))),
            BinOp::Ne => Ok(Value::Bool(!self.equals(rhs))),
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => self.compare(op, rhs),
            BinOp::And | BinOp::Or => match (self, rhs) {
                (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(if op == BinOp::And {
                    *a && *b
                } else {
                    *a || *b
                })),
                _ => Err(operand_error("bools", op, self, rhs)),
            },
        }
    }

    /// `+`: numeric addition or string concatenation
    pub fn checked_add(&self, rhs: &Value) -> Result<Value, RuntimeError> {
        if let (Value::Str(a), Value::Str(b)) = (self, rhs) {
            return Ok(Value::string(format!("{}{}", a, b)));
        }
        if matches!(self, Value::Str(_)) || matches!(rhs, Value::Str(_)) {
            return Err(operand_error("strings", BinOp::Add, self, rhs));
        }

        match numbers(BinOp::Add, self, rhs)? {
            Operands::Ints(a, b) => a
                .checked_add(b)
                .map(Value::Int)
                .ok_or_else(|| overflow(a, BinOp::Add, b)),
            Operands::Rationals(a, b) => Ok(Value::Rational(a + b)),
        }
    }

    pub fn checked_sub(&self, rhs: &Value) -> Result<Value, RuntimeError> {
        match numbers(BinOp::Sub, self, rhs)? {
            Operands::Ints(a, b) => a
                .checked_sub(b)
                .map(Value::Int)
                .ok_or_else(|| overflow(a, BinOp::Sub, b)),
            Operands::Rationals(a, b) => Ok(Value::Rational(a - b)),
        }
    }

    pub fn checked_mul(&self, rhs: &Value) -> Result<Value, RuntimeError> {
        match numbers(BinOp::Mul, self, rhs)? {
            Operands::Ints(a, b) => a
                .checked_mul(b)
                .map(Value::Int)
                .ok_or_else(|| overflow(a, BinOp::Mul, b)),
            Operands::Rationals(a, b) => Ok(Value::Rational(a * b)),
        }
    }

    /// `/`: integer division truncates toward zero; rational division is IEEE-754
    pub fn checked_div(&self, rhs: &Value) -> Result<Value, RuntimeError> {
        match numbers(BinOp::Div, self, rhs)? {
            Operands::Ints(a, 0) => Err(RuntimeError::DivisionByZero {
                operation: format!("{} / 0", a),
            }),
            Operands::Ints(a, b) => a
                .checked_div(b)
                .map(Value::Int)
                .ok_or_else(|| overflow(a, BinOp::Div, b)),
            Operands::Rationals(a, b) => Ok(Value::Rational(a / b)),
        }
    }

    /// `%`: defined for Int/Int only
    pub fn checked_rem(&self, rhs: &Value) -> Result<Value, RuntimeError> {
        match (self, rhs) {
            (Value::Int(a), Value::Int(0)) => Err(RuntimeError::DivisionByZero {
                operation: format!("{} % 0", a),
            }),
            (Value::Int(a), Value::Int(b)) => a
                .checked_rem(*b)
                .map(Value::Int)
                .ok_or_else(|| overflow(*a, BinOp::Mod, *b)),
            _ => Err(operand_error("ints", BinOp::Mod, self, rhs)),
        }
    }

    /// `**`: computed in floating point, truncated back to Int when both
    /// operands are Int
    pub fn pow(&self, rhs: &Value) -> Result<Value, RuntimeError> {
        match numbers(BinOp::Pow, self, rhs)? {
            Operands::Ints(a, b) => {
                let power = (a as f64).powf(b as f64).trunc();
                // 2^63 is the first f64 past i64::MAX
                if !power.is_finite()
                    || power < i64::MIN as f64
                    || power >= 9_223_372_036_854_775_808.0
                {
                    return Err(overflow(a, BinOp::Pow, b));
                }
                Ok(Value::Int(power as i64))
            }
            Operands::Rationals(a, b) => Ok(Value::Rational(a.powf(b))),
        }
    }

    /// Ordering comparison between two numbers
    pub fn compare(&self, op: BinOp, rhs: &Value) -> Result<Value, RuntimeError> {
        let ordering = match numbers(op, self, rhs)? {
            Operands::Ints(a, b) => a.partial_cmp(&b),
            Operands::Rationals(a, b) => a.partial_cmp(&b),
        };

        // NaN is unordered, so every comparison with it is false
        let result = ordering.is_some_and(|ord| match op {
            BinOp::Lt => ord.is_lt(),
            BinOp::Le => ord.is_le(),
            BinOp::Gt => ord.is_gt(),
            BinOp::Ge => ord.is_ge(),
            _ => false,
        });
        Ok(Value::Bool(result))
    }
}
