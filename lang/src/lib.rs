extern crate pest;
#[macro_use]
extern crate pest_derive;

pub mod codegen;
pub mod runtime;
pub mod syntax;


pub use crate::syntax::{CompileError, Compiler};
