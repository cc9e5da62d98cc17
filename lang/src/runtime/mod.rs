use std::{fmt::Formatter, rc::Rc};

use thiserror::Error;

use crate::{
    runtime::{
        builtins::Builtins,
        env::Environment,
        eval::Eval,
        print::{stdout_handler, SharedPrintHandler},
    },
    syntax::tree::{Expr, Ident, Lambda},
};

pub mod builtins;
pub mod env;
pub mod eval;
pub mod print;
pub mod serialize;
mod stack;

pub use eval::{evaluate, evaluate_with};
pub use serialize::serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, argc: usize) -> bool {
        match self {
            Arity::Exactly(n) => argc == n,
            Arity::AtLeast(n) => argc >= n,
        }
    }
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("NameError: unbound identifier: {0}")]
    NameError(Ident),
    #[error("TypeError: {0}")]
    TypeError(String),
    #[error("ArityError: {callee} expects {expected} argument(s), got {got}")]
    ArityError {
        callee: String,
        expected: Arity,
        got: usize,
    },
    #[error("DivisionByZeroError: division by zero")]
    DivisionByZero,
    #[error("UnknownPrimitiveError: unknown primitive operation: {0}")]
    UnknownPrimitive(Ident),
    #[error("UnserializableError: cannot serialize {0}")]
    Unserializable(&'static str),
}

/// A closure: a lambda paired with the environment it was evaluated in.
pub struct Closure {
    pub lambda: Rc<Lambda>,
    pub env: Environment,
}

#[derive(Clone)]
pub enum Value {
    NumberValue(i64),
    StringValue(String),
    BoolValue(bool),
    PrimitiveValue(Ident),
    ClosureValue(Rc<Closure>),
    /// Placeholder for a slot whose evaluation failed. The evaluator never
    /// produces it; the failure itself travels as `Err`.
    ErrorValue,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::NumberValue(_) => "number",
            Value::StringValue(_) => "string",
            Value::BoolValue(_) => "boolean",
            Value::PrimitiveValue(_) => "primitive",
            Value::ClosureValue(_) => "closure",
            Value::ErrorValue => "error",
        }
    }
}

impl std::fmt::Debug for Closure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Closure")
            .field("params", &self.lambda.params)
            .field("body", &self.lambda.body)
            .finish()
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::NumberValue(n) => f.debug_tuple("NumberValue").field(n).finish(),
            Value::StringValue(s) => f.debug_tuple("StringValue").field(s).finish(),
            Value::BoolValue(b) => f.debug_tuple("BoolValue").field(b).finish(),
            Value::PrimitiveValue(op) => f.debug_tuple("PrimitiveValue").field(op).finish(),
            Value::ClosureValue(c) => f.debug_tuple("ClosureValue").field(c).finish(),
            Value::ErrorValue => write!(f, "ErrorValue"),
        }
    }
}

impl std::cmp::PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::NumberValue(lhs), Value::NumberValue(rhs)) => lhs == rhs,
            (Value::StringValue(lhs), Value::StringValue(rhs)) => lhs == rhs,
            (Value::BoolValue(lhs), Value::BoolValue(rhs)) => lhs == rhs,
            (Value::PrimitiveValue(lhs), Value::PrimitiveValue(rhs)) => lhs == rhs,
            (Value::ClosureValue(lhs), Value::ClosureValue(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Value::ErrorValue, Value::ErrorValue) => true,
            _ => false,
        }
    }
}

/// Owns the top-level environment and the output sink.
pub struct Context {
    pub env: Environment,
    out: SharedPrintHandler,
}

impl Context {
    /// An empty context; call `load_builtins` to bind the primitives.
    pub fn new() -> Context {
        Context::with_output(stdout_handler())
    }

    pub fn with_output(out: SharedPrintHandler) -> Context {
        Context {
            env: Environment::new(),
            out,
        }
    }

    pub fn load_builtins(&mut self) {
        self.env = Builtins::init(&self.env);
    }

    pub fn eval(&self, expr: &Expr) -> Result<Value, RuntimeError> {
        expr.eval_in(&self.env, &self.out)
    }

    /// Evaluates each form in order and returns the last value.
    pub fn source(&self, program: &[Expr]) -> Result<Option<Value>, RuntimeError> {
        let mut value = None;
        for expr in program {
            value = Some(self.eval(expr)?);
        }
        Ok(value)
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}
