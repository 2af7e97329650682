//! Typed errors for everything that is a normal, recoverable failure:
//! command-line misuse and front-end lex/parse errors. Violations of a
//! structural invariant (an exhaustive match reaching a kind it shouldn't,
//! a required child missing from a node that must have one) are bugs in
//! whatever produced the tree, not user errors, and stay `panic!`/
//! `unreachable!` rather than being folded in here.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("cannot read input file {path}: {source}")]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: {message}")]
    Syntax {
        path: String,
        line: u32,
        message: String,
    },

    #[error("undeclared identifier '{name}' at line {line}")]
    UndeclaredIdentifier { name: String, line: u32 },

    #[error("'{name}' redeclared at line {line}")]
    Redeclared { name: String, line: u32 },
}
