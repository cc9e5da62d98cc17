use std::collections::HashMap;

use lazy_static::lazy_static;
use tracing::{debug, trace};

use crate::runtime::{
    env::Environment,
    print::PrintHandler,
    Arity, RuntimeError,
    RuntimeError::{ArityError, DivisionByZero, TypeError, UnknownPrimitive},
    Value,
    Value::{BoolValue, NumberValue, PrimitiveValue, StringValue},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimOp {
    Add,
    Sub,
    Mul,
    Div,
    LessEq,
    Equal,
    Println,
    Seq,
    Concat,
}

lazy_static! {
    static ref PRIMITIVES: HashMap<&'static str, PrimOp> =
        PrimOp::ALL.iter().map(|op| (op.name(), *op)).collect();
}

impl PrimOp {
    pub const ALL: [PrimOp; 9] = [
        PrimOp::Add,
        PrimOp::Sub,
        PrimOp::Mul,
        PrimOp::Div,
        PrimOp::LessEq,
        PrimOp::Equal,
        PrimOp::Println,
        PrimOp::Seq,
        PrimOp::Concat,
    ];

    pub fn from_name(name: &str) -> Option<PrimOp> {
        PRIMITIVES.get(name).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimOp::Add => "+",
            PrimOp::Sub => "-",
            PrimOp::Mul => "*",
            PrimOp::Div => "/",
            PrimOp::LessEq => "<=",
            PrimOp::Equal => "equal?",
            PrimOp::Println => "println",
            PrimOp::Seq => "seq",
            PrimOp::Concat => "++",
        }
    }

    pub fn arity(self) -> Arity {
        match self {
            PrimOp::Add | PrimOp::Sub | PrimOp::Mul | PrimOp::Div => Arity::Exactly(2),
            PrimOp::LessEq | PrimOp::Equal => Arity::Exactly(2),
            PrimOp::Println => Arity::Exactly(1),
            PrimOp::Seq | PrimOp::Concat => Arity::AtLeast(1),
        }
    }
}

pub struct Builtins {}

impl Builtins {
    /// Extends `env` with the top-level bindings: every primitive, `error`
    /// (bound but not implemented) and the boolean constants.
    pub fn init(env: &Environment) -> Environment {
        let primitives = PrimOp::ALL
            .iter()
            .map(|op| op.name())
            .chain(std::iter::once("error"))
            .map(|name| (name.to_owned(), PrimitiveValue(name.to_owned())));

        let constants = vec![
            ("true".to_owned(), BoolValue(true)),
            ("false".to_owned(), BoolValue(false)),
        ];

        env.extend(primitives.chain(constants))
    }
}

pub fn apply_primitive(
    op: &str,
    args: Vec<Value>,
    out: &PrintHandler,
) -> Result<Value, RuntimeError> {
    let prim = PrimOp::from_name(op).ok_or_else(|| UnknownPrimitive(op.to_owned()))?;

    let arity = prim.arity();
    if !arity.accepts(args.len()) {
        return Err(ArityError {
            callee: op.to_owned(),
            expected: arity,
            got: args.len(),
        });
    }

    trace!(op, argc = args.len(), "apply primitive");

    match prim {
        PrimOp::Add => numbers(op, &args).map(|(l, r)| NumberValue(l.wrapping_add(r))),
        PrimOp::Sub => numbers(op, &args).map(|(l, r)| NumberValue(l.wrapping_sub(r))),
        PrimOp::Mul => numbers(op, &args).map(|(l, r)| NumberValue(l.wrapping_mul(r))),
        PrimOp::Div => match numbers(op, &args)? {
            (_, 0) => Err(DivisionByZero),
            (l, r) => Ok(NumberValue(l.wrapping_div(r))),
        },
        PrimOp::LessEq => numbers(op, &args).map(|(l, r)| BoolValue(l <= r)),
        PrimOp::Equal => Ok(BoolValue(args[0].to_string() == args[1].to_string())),
        PrimOp::Println => match &args[0] {
            StringValue(s) => {
                debug!(len = s.len(), "println");
                out.println(s);
                Ok(BoolValue(true))
            }
            other => Err(TypeError(format!(
                "println expects a string, got {}",
                other.type_name()
            ))),
        },
        // every argument has already been evaluated by the caller
        PrimOp::Seq => args.into_iter().last().ok_or(ArityError {
            callee: op.to_owned(),
            expected: arity,
            got: 0,
        }),
        PrimOp::Concat => Ok(StringValue(args.iter().map(concat_piece).collect())),
    }
}

fn numbers(op: &str, args: &[Value]) -> Result<(i64, i64), RuntimeError> {
    match (&args[0], &args[1]) {
        (NumberValue(l), NumberValue(r)) => Ok((*l, *r)),
        (l, r) => Err(TypeError(format!(
            "{} expects two numbers, got {} and {}",
            op,
            l.type_name(),
            r.type_name()
        ))),
    }
}

fn concat_piece(value: &Value) -> String {
    match value {
        StringValue(s) => s.clone(),
        NumberValue(n) => n.to_string(),
        other => other.to_string(),
    }
}
