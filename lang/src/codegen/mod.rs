use crate::syntax::tree::{Expr, Lit, Program};

pub trait PartialCodeGenerator {
    type Output;

    fn partial_codegen_expr(&self, expr: &Expr) -> Self::Output;

    fn partial_codegen_lit(&self, lit: &Lit) -> Self::Output;
}

pub trait CodeGenerator: PartialCodeGenerator {
    fn codegen(&self, program: &Program) -> Vec<Self::Output> {
        program
            .iter()
            .map(|expr| self.partial_codegen_expr(expr))
            .collect()
    }
}

impl<T: PartialCodeGenerator> CodeGenerator for T {}

pub mod sexp;
