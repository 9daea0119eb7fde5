//! Go source front-end.
//!
//! A deliberately small reader for Go files: it understands the package
//! clause, imports and type declarations in full, and checks every other
//! top-level declaration only for balanced delimiters before skipping it.
pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::{FieldDecl, File, TypeExpr, TypeFold, TypeSpec};

/// 1-based source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{pos}: {message}")]
pub struct SyntaxError {
    pub message: String,
    pub pos: Pos,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, pos: Pos) -> Self {
        Self { message: message.into(), pos }
    }
}

/// Tokenize and parse a whole Go file.
pub fn parse_source(source: &str) -> Result<File, SyntaxError> {
    let tokens = lexer::Lexer::new(source).tokenize()?;
    parser::Parser::new(tokens).parse_file()
}
