//! Hand-written lexer. Produces a flat token vector; the parser looks ahead
//! by indexing into it rather than the lexer exposing a peekable iterator,
//! which keeps backtracking in the parser trivial.

use crate::error::CompileError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Number(i64),
    KwAuto,
    KwVar,
    KwFn,
    KwIf,
    KwElse,
    KwWhile,
    KwBreak,
    KwContinue,
    KwReturn,
    KwPrint,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Bang,
    AndAnd,
    OrOr,
    EqEq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
}

fn keyword(word: &str) -> Option<TokenKind> {
    Some(match word {
        "auto" => TokenKind::KwAuto,
        "var" => TokenKind::KwVar,
        "fn" => TokenKind::KwFn,
        "if" => TokenKind::KwIf,
        "else" => TokenKind::KwElse,
        "while" => TokenKind::KwWhile,
        "break" => TokenKind::KwBreak,
        "continue" => TokenKind::KwContinue,
        "return" => TokenKind::KwReturn,
        "print" => TokenKind::KwPrint,
        _ => return None,
    })
}

pub fn lex(path: &str, source: &str) -> Result<Vec<Token>, CompileError> {
    let mut tokens = Vec::new();
    let mut line: u32 = 1;
    let bytes = source.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        let c = bytes[i] as char;

        if c == '\n' {
            line += 1;
            i += 1;
            continue;
        }
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c == '/' && bytes.get(i + 1) == Some(&b'/') {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < bytes.len() && (bytes[i] as char).is_ascii_digit() {
                i += 1;
            }
            let text = &source[start..i];
            let value = text.parse::<i64>().map_err(|_| CompileError::Syntax {
                path: path.to_owned(),
                line,
                message: format!("invalid integer literal '{}'", text),
            })?;
            tokens.push(Token {
                kind: TokenKind::Number(value),
                line,
            });
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < bytes.len() && ((bytes[i] as char).is_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            let word = &source[start..i];
            let kind = keyword(word).unwrap_or_else(|| TokenKind::Ident(word.to_owned()));
            tokens.push(Token { kind, line });
            continue;
        }

        let two = if i + 1 < bytes.len() {
            Some(&source[i..i + 2])
        } else {
            None
        };

        let (kind, len) = match two {
            Some("&&") => (TokenKind::AndAnd, 2),
            Some("||") => (TokenKind::OrOr, 2),
            Some("==") => (TokenKind::EqEq, 2),
            Some("!=") => (TokenKind::NotEq, 2),
            Some("<=") => (TokenKind::Le, 2),
            Some(">=") => (TokenKind::Ge, 2),
            _ => match c {
                '(' => (TokenKind::LParen, 1),
                ')' => (TokenKind::RParen, 1),
                '{' => (TokenKind::LBrace, 1),
                '}' => (TokenKind::RBrace, 1),
                ',' => (TokenKind::Comma, 1),
                ';' => (TokenKind::Semi, 1),
                '=' => (TokenKind::Assign, 1),
                '+' => (TokenKind::Plus, 1),
                '-' => (TokenKind::Minus, 1),
                '*' => (TokenKind::Star, 1),
                '/' => (TokenKind::Slash, 1),
                '!' => (TokenKind::Bang, 1),
                '<' => (TokenKind::Lt, 1),
                '>' => (TokenKind::Gt, 1),
                other => {
                    return Err(CompileError::Syntax {
                        path: path.to_owned(),
                        line,
                        message: format!("unexpected character '{}'", other),
                    })
                }
            },
        };
        tokens.push(Token { kind, line });
        i += len;
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        line,
    });
    Ok(tokens)
}
