use std::{collections::HashSet, rc::Rc};

use thiserror::Error;

use crate::syntax::tree::{
    Datum,
    Expr::{self, *},
    Ident, Lambda,
    Lit::*,
    Program,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    #[error("SyntaxError: empty list is not an expression")]
    EmptyList,
    #[error("SyntaxError: 'if' expects exactly 3 operands, got {0}")]
    IfArity(usize),
    #[error("SyntaxError: lambda parameter must be an identifier, got {} `{}`", .0.shape(), .0)]
    InvalidParam(Datum),
    #[error("SyntaxError: duplicate lambda parameter '{0}'")]
    DuplicateParam(Ident),
}

pub fn parse_program(data: &[Datum]) -> Result<Program, SyntaxError> {
    data.iter().map(parse).collect()
}

/// Converts one surface datum into an expression tree.
pub fn parse(datum: &Datum) -> Result<Expr, SyntaxError> {
    match datum {
        Datum::Int(n) => Ok(LitExpr(LitNumber(*n))),
        Datum::Text(s) => Ok(LitExpr(LitString(s.clone()))),
        Datum::Sym(name) => Ok(IdExpr(name.clone())),
        Datum::List(items) => parse_list(items),
    }
}

fn parse_list(items: &[Datum]) -> Result<Expr, SyntaxError> {
    match items {
        [] => Err(SyntaxError::EmptyList),

        [Datum::Sym(head), rest @ ..] if head == "if" => match rest {
            [cond, then, otherwise] => Ok(IfExpr(
                Box::new(parse(cond)?),
                Box::new(parse(then)?),
                Box::new(parse(otherwise)?),
            )),
            _ => Err(SyntaxError::IfArity(rest.len())),
        },

        [Datum::List(params), Datum::Sym(arrow), body] if arrow == "=>" => {
            parse_lambda(params, body)
        }

        [callee, args @ ..] => {
            let callee = parse(callee)?;
            let args = args.iter().map(parse).collect::<Result<Vec<_>, _>>()?;
            Ok(ApplyExpr(Box::new(callee), args))
        }
    }
}

fn parse_lambda(params: &[Datum], body: &Datum) -> Result<Expr, SyntaxError> {
    let mut seen = HashSet::with_capacity(params.len());
    let params = params
        .iter()
        .map(|param| match param {
            Datum::Sym(name) if seen.insert(name.as_str()) => Ok(name.clone()),
            Datum::Sym(name) => Err(SyntaxError::DuplicateParam(name.clone())),
            other => Err(SyntaxError::InvalidParam(other.clone())),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LambdaExpr(Rc::new(Lambda {
        params,
        body: parse(body)?,
    })))
}
