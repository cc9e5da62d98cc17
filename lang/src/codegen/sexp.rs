use crate::{
    codegen::PartialCodeGenerator,
    syntax::tree::{
        Datum, Expr,
        Expr::{ApplyExpr, IdExpr, IfExpr, LambdaExpr, LitExpr},
        Lit,
        Lit::{LitBool, LitNumber, LitString},
    },
};

/// Turns expressions back into surface data.
///
/// Boolean literals come out as the identifiers `true` and `false`, which
/// the top-level environment binds to the same values.
pub struct SexpCodeGenerator;

impl SexpCodeGenerator {
    pub fn new() -> SexpCodeGenerator {
        SexpCodeGenerator {}
    }
}

impl Default for SexpCodeGenerator {
    fn default() -> Self {
        SexpCodeGenerator::new()
    }
}

impl PartialCodeGenerator for SexpCodeGenerator {
    type Output = Datum;

    fn partial_codegen_expr(&self, expr: &Expr) -> Datum {
        expr.codegen_to_sexp()
    }

    fn partial_codegen_lit(&self, lit: &Lit) -> Datum {
        lit.codegen_to_sexp()
    }
}

trait TargetSexp {
    fn codegen_to_sexp(&self) -> Datum;
}

impl<T: TargetSexp> TargetSexp for Box<T> {
    fn codegen_to_sexp(&self) -> Datum {
        (**self).codegen_to_sexp()
    }
}

impl TargetSexp for Lit {
    fn codegen_to_sexp(&self) -> Datum {
        match self {
            LitNumber(n) => Datum::Int(*n),
            LitString(s) => Datum::Text(s.clone()),
            LitBool(b) => Datum::Sym(b.to_string()),
        }
    }
}

impl TargetSexp for Expr {
    fn codegen_to_sexp(&self) -> Datum {
        match self {
            LitExpr(lit) => lit.codegen_to_sexp(),
            IdExpr(id) => Datum::Sym(id.clone()),
            IfExpr(cond, then, otherwise) => Datum::List(vec![
                Datum::sym("if"),
                cond.codegen_to_sexp(),
                then.codegen_to_sexp(),
                otherwise.codegen_to_sexp(),
            ]),
            LambdaExpr(lambda) => Datum::List(vec![
                Datum::List(lambda.params.iter().cloned().map(Datum::Sym).collect()),
                Datum::sym("=>"),
                lambda.body.codegen_to_sexp(),
            ]),
            ApplyExpr(f, args) => {
                let mut items = Vec::with_capacity(args.len() + 1);
                items.push(f.codegen_to_sexp());
                items.extend(args.iter().map(|arg| arg.codegen_to_sexp()));
                Datum::List(items)
            }
        }
    }
}
