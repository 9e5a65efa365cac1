use crate::error::ParseError;
use crate::token::{Token, TokenKind};

/// Parser state over the token stream. The index can be saved and restored,
/// which is what lets an attempted production back off silently before it
/// has committed.
pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    idx: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token<'a>>) -> Self {
        Parser { tokens, idx: 0 }
    }

    /// Peek : Watch next token without consuming it
    pub fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.idx)
    }

    /// Peek the token `n` positions ahead of the cursor
    pub fn peek_nth(&self, n: usize) -> Option<&Token<'a>> {
        self.tokens.get(self.idx + n)
    }

    /// Next : Consume next token and return it
    pub fn next(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.idx).cloned();
        if token.is_some() {
            self.idx += 1;
        }
        token
    }

    /// Current cursor, for later rewinding
    pub fn mark(&self) -> usize {
        self.idx
    }

    /// Restore the cursor to a previously saved mark
    pub fn rewind(&mut self, mark: usize) {
        self.idx = mark;
    }

    /// Peek and check next token is match with condition
    pub fn check_if<F: Fn(&Token) -> bool>(&self, cond: F) -> bool {
        self.peek().map_or(false, |token| cond(token))
    }

    /// Next token must be match with condition
    pub fn expect_tobe<F: Fn(&Token) -> bool>(&mut self, cond: F) -> Result<Token<'a>, ParseError> {
        match self.peek().cloned() {
            Some(token) if cond(&token) => {
                self.idx += 1;
                Ok(token)
            }
            Some(token) => Err(ParseError::UnexpectedToken((&token).into())),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    /// Hard error at the cursor position
    pub fn unexpected_here(&self) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::UnexpectedToken(token.into()),
            None => ParseError::UnexpectedEof,
        }
    }

    /// Does the next token have exactly this kind?
    pub fn next_is(&self, kind: &TokenKind) -> bool {
        self.check_if(|token| token.kind == *kind)
    }
}

#[macro_export]
macro_rules! check {
    ($parser:expr, $kind:pat) => {
        $parser.check_if(|token| matches!(&token.kind, $kind))
    };
}

#[macro_export]
macro_rules! expect {
    ($parser:expr, $kind:pat) => {
        $parser.expect_tobe(|token| matches!(&token.kind, $kind))
    };
}
