use thiserror::Error;

use crate::syntax::{
    parse::{parse_program, SyntaxError},
    read::{ReadError, SexpReader},
    tree::Program,
};

pub mod parse;
pub mod read;
pub mod tree;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl CompileError {
    pub fn with_path(self, path: &str) -> CompileError {
        match self {
            CompileError::Read(e) => CompileError::Read(e.with_path(path)),
            syntax => syntax,
        }
    }
}

pub struct Compiler;

impl Compiler {
    /// Reads source text and parses every top-level form.
    pub fn compile(input: &str) -> Result<Program, CompileError> {
        let data = SexpReader::read(input)?;
        tracing::debug!(forms = data.len(), "read surface forms");
        Ok(parse_program(&data)?)
    }
}
