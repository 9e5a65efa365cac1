use crate::token::{Pos, Token, TokenKind};
use std::fmt;
use thiserror::Error;

/// Source location without the token's borrowed file label.
#[derive(Debug, Clone, PartialEq)]
pub struct Loc {
    pub file: String,
    pub line: usize,
    pub col: usize,
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

impl<'a> From<Pos<'a>> for Loc {
    fn from(pos: Pos<'a>) -> Self {
        Loc {
            file: pos.file.to_string(),
            line: pos.line,
            col: pos.col,
        }
    }
}

// Token information without lifetime
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub kind: TokenKind,
    pub loc: Loc,
}

impl fmt::Display for TokenInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl<'a> From<&Token<'a>> for TokenInfo {
    fn from(token: &Token<'a>) -> Self {
        TokenInfo {
            kind: token.kind.clone(),
            loc: token.pos.into(),
        }
    }
}

// Main error type for the compiler
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Gen(#[from] GenError),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Location to anchor the diagnostic at, when the error has one.
    pub fn loc(&self) -> Option<&Loc> {
        match self {
            Error::Lex(e) => Some(e.loc()),
            Error::Parse(e) => e.loc(),
            Error::Gen(e) => Some(e.loc()),
            Error::InvalidTarget(_) | Error::Io(_) => None,
        }
    }
}

// Lexer errors
#[derive(Debug, Error, Clone)]
pub enum LexError {
    #[error("Unexpected control character")]
    UnexpectedControlChar { loc: Loc },

    #[error("Unexpected character")]
    UnexpectedChar { loc: Loc },

    #[error("Invalid number literal")]
    InvalidNumber { loc: Loc },
}

impl LexError {
    pub fn loc(&self) -> &Loc {
        match self {
            LexError::UnexpectedControlChar { loc }
            | LexError::UnexpectedChar { loc }
            | LexError::InvalidNumber { loc } => loc,
        }
    }
}

// Parser errors
#[derive(Debug, Error, Clone)]
pub enum ParseError {
    #[error("Invalid statement")]
    InvalidStatement { loc: Loc },

    #[error("Invalid expression")]
    InvalidExpression { loc: Loc },

    #[error("Invalid parameter")]
    InvalidParameter { loc: Loc },

    #[error("Unexpected token {0}")]
    UnexpectedToken(TokenInfo),

    #[error("Unexpected end of file")]
    UnexpectedEof,
}

impl ParseError {
    pub fn loc(&self) -> Option<&Loc> {
        match self {
            ParseError::InvalidStatement { loc }
            | ParseError::InvalidExpression { loc }
            | ParseError::InvalidParameter { loc } => Some(loc),
            ParseError::UnexpectedToken(info) => Some(&info.loc),
            ParseError::UnexpectedEof => None,
        }
    }
}

// Code generation errors
#[derive(Debug, Error, Clone)]
pub enum GenError {
    #[error("Invalid type identifier {name}")]
    InvalidTypeIdentifier { name: String, loc: Loc },

    #[error("Variable {name} is already declared")]
    AlreadyDeclared { name: String, loc: Loc },

    #[error("Variable {name} is not declared")]
    NotDeclared { name: String, loc: Loc },

    #[error("Cannot assign to a constant variable")]
    AssignToConst { name: String, loc: Loc },

    #[error("Cannot modify a constant variable")]
    ModifyConst { name: String, loc: Loc },

    #[error("Cannot declare a constant without an assignment")]
    ConstWithoutAssignment { name: String, loc: Loc },

    #[error("Not implemented: {what}")]
    NotImplemented { what: &'static str, loc: Loc },
}

impl GenError {
    pub fn loc(&self) -> &Loc {
        match self {
            GenError::InvalidTypeIdentifier { loc, .. }
            | GenError::AlreadyDeclared { loc, .. }
            | GenError::NotDeclared { loc, .. }
            | GenError::AssignToConst { loc, .. }
            | GenError::ModifyConst { loc, .. }
            | GenError::ConstWithoutAssignment { loc, .. }
            | GenError::NotImplemented { loc, .. } => loc,
        }
    }
}
