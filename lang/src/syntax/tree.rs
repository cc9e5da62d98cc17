use std::{fmt::Formatter, rc::Rc};

pub type Ident = String;

/// Untyped surface data: what the reader produces and the parser consumes.
#[derive(Debug, PartialEq, Clone)]
pub enum Datum {
    Int(i64),
    Text(String),
    Sym(Ident),
    List(Vec<Datum>),
}

#[derive(Debug, PartialEq, Clone)]
pub enum Lit {
    LitNumber(i64),
    LitString(String),
    LitBool(bool),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Lambda {
    pub params: Vec<Ident>,
    pub body: Expr,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    LitExpr(Lit),
    IdExpr(Ident),
    IfExpr(Box<Expr>, Box<Expr>, Box<Expr>),
    /// Shared so that every closure built from this node points at the same body.
    LambdaExpr(Rc<Lambda>),
    ApplyExpr(Box<Expr>, Vec<Expr>),
}

pub type Program = Vec<Expr>;

impl Expr {
    pub fn number(n: i64) -> Expr {
        Expr::LitExpr(Lit::LitNumber(n))
    }

    pub fn string(s: &str) -> Expr {
        Expr::LitExpr(Lit::LitString(s.to_owned()))
    }

    pub fn bool(b: bool) -> Expr {
        Expr::LitExpr(Lit::LitBool(b))
    }

    pub fn id(name: &str) -> Expr {
        Expr::IdExpr(name.to_owned())
    }

    pub fn if_else(cond: Expr, then: Expr, otherwise: Expr) -> Expr {
        Expr::IfExpr(Box::new(cond), Box::new(then), Box::new(otherwise))
    }

    pub fn lambda(params: &[&str], body: Expr) -> Expr {
        Expr::LambdaExpr(Rc::new(Lambda {
            params: params.iter().map(|p| (*p).to_owned()).collect(),
            body,
        }))
    }

    pub fn apply(callee: Expr, args: Vec<Expr>) -> Expr {
        Expr::ApplyExpr(Box::new(callee), args)
    }
}

impl Datum {
    pub fn sym(name: &str) -> Datum {
        Datum::Sym(name.to_owned())
    }

    pub fn text(s: &str) -> Datum {
        Datum::Text(s.to_owned())
    }

    /// Short description of the node kind, used in diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Datum::Int(_) => "integer",
            Datum::Text(_) => "string",
            Datum::Sym(_) => "symbol",
            Datum::List(_) => "list",
        }
    }
}

impl std::fmt::Display for Datum {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Datum::Int(n) => write!(f, "{}", n),
            Datum::Text(s) => {
                write!(f, "\"")?;
                for c in s.chars() {
                    match c {
                        '"' => write!(f, "\\\"")?,
                        '\\' => write!(f, "\\\\")?,
                        '\n' => write!(f, "\\n")?,
                        '\t' => write!(f, "\\t")?,
                        c => write!(f, "{}", c)?,
                    }
                }
                write!(f, "\"")
            }
            Datum::Sym(name) => write!(f, "{}", name),
            Datum::List(items) => {
                let items: Vec<String> = items.iter().map(|item| item.to_string()).collect();
                write!(f, "({})", items.join(" "))
            }
        }
    }
}
