//! A small recursive-descent front end: enough of a lexer and parser to
//! turn source text into a tree the rest of the crate can optimize and lay
//! out. Kept deliberately unsophisticated — no error recovery, no type
//! checking — since parser sophistication is out of scope here; its job is
//! only to be a real producer of trees so the crate is runnable end to end.

mod lexer;
mod parser;

use crate::compiler::Compiler;
use crate::error::CompileError;

/// Parses `source` into `compiler`, declaring every symbol and setting
/// `compiler.root` to the program's entry sequence.
pub fn parse_program(compiler: &mut Compiler, path: &str, source: &str) -> Result<(), CompileError> {
    let tokens = lexer::lex(path, source)?;
    parser::Parser::new(compiler, path, tokens).parse_program()
}
