use crate::error::LexError;
use crate::message::Msg;
use crate::token::{Pos, Token, TokenKind};

/// Scanner over the source text. Rules are attempted in a fixed order at the
/// input head; the first match wins and the cursor advances past it.
pub struct Lexer<'a> {
    file: &'a str,
    input: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(file: &'a str, source: &str) -> Self {
        Lexer {
            file,
            input: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn peek(&self, n: usize) -> Option<char> {
        self.input.get(self.pos + n).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.peek(0) {
            self.pos += 1;
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn cursor(&self) -> Pos<'a> {
        Pos {
            file: self.file,
            line: self.line,
            col: self.col,
        }
    }

    pub fn tokenize(mut self, msgs: &mut Vec<Msg>) -> Result<Vec<Token<'a>>, LexError> {
        let mut tokens = Vec::new();

        while let Some(ch0) = self.peek(0) {
            // 1. Whitespace
            if ch0 == ' ' || ch0 == '\t' {
                self.advance();
                continue;
            }

            // 2. Newline
            if ch0 == '\n' || (ch0 == '\r' && self.peek(1) == Some('\n')) {
                self.advance_by(if ch0 == '\r' { 2 } else { 1 });
                continue;
            }

            // 3. Line comment
            if ch0 == '/' && self.peek(1) == Some('/') {
                while let Some(ch) = self.peek(0) {
                    self.advance();
                    if ch == '\n' {
                        break;
                    }
                }
                continue;
            }

            // 4. Block comment (non-greedy, may span lines). Without a
            // closing "*/" the rule does not match and the '/' falls
            // through to the symbol rule.
            if ch0 == '/' && self.peek(1) == Some('*') {
                if let Some(len) = self.block_comment_len() {
                    self.advance_by(len);
                    continue;
                }
            }

            // 5. Any control character not consumed by the rules above
            if (ch0 as u32) < 0x20 {
                return Err(LexError::UnexpectedControlChar {
                    loc: self.cursor().into(),
                });
            }

            let pos = self.cursor();

            // 6. Symbols, longest first
            if let Some(ch1) = self.peek(1) {
                if let Some(kind) = double_char_symbol(ch0, ch1) {
                    self.advance_by(2);
                    tokens.push(Token::new(kind, pos));
                    continue;
                }
            }
            if let Some(kind) = single_char_symbol(ch0) {
                self.advance();
                tokens.push(Token::new(kind, pos));
                continue;
            }

            // 7. Integer literal
            if let Some((text, radix, len)) = self
                .scan_radix('x', 16)
                .or_else(|| self.scan_radix('b', 2))
                .or_else(|| self.scan_radix('o', 8))
                .or_else(|| self.scan_dec())
            {
                // A fractional part hands the match over to the float rule.
                // A dot that cannot start a float is swallowed into the
                // literal's span, so "42." lexes as integer 42.
                let dotted = self.peek(len) == Some('.');
                let fractional =
                    dotted && self.peek(len + 1).map_or(false, |c| c.is_ascii_digit());
                if !fractional {
                    let value = i64::from_str_radix(&text, radix).map_err(|_| {
                        LexError::InvalidNumber {
                            loc: pos.into(),
                        }
                    })?;
                    tokens.push(Token::new(TokenKind::Int(value), pos));
                    self.advance_by(if dotted { len + 1 } else { len });
                    continue;
                }
            }

            // 8. Float literal
            if let Some(len) = self.scan_float() {
                let text: String = self.input[self.pos..self.pos + len].iter().collect();
                let value: f64 = text.parse().map_err(|_| LexError::InvalidNumber {
                    loc: pos.into(),
                })?;
                if !value.is_finite() {
                    return Err(LexError::InvalidNumber { loc: pos.into() });
                }
                tokens.push(Token::new(TokenKind::Float(value), pos));
                self.advance_by(len);
                continue;
            }

            // 9. String literal. The value keeps the inner text verbatim;
            // escape sequences are not decoded. An unterminated literal is
            // not a match, so the quote fails below as an identifier char.
            if ch0 == '\'' || ch0 == '"' {
                if let Some((value, len)) = self.scan_str(ch0) {
                    if ch0 == '"' && !value.contains('\'') {
                        msgs.push(Msg::warn("Double quotes are cringe", Some(pos.into())));
                    }
                    tokens.push(Token::new(TokenKind::Str(value), pos));
                    self.advance_by(len);
                    continue;
                }
            }

            // 10. Identifier or keyword
            let mut len = 0;
            while self.peek(len).map_or(false, is_ident_char) {
                len += 1;
            }
            if len == 0 {
                return Err(LexError::UnexpectedChar {
                    loc: self.cursor().into(),
                });
            }
            let lexeme: String = self.input[self.pos..self.pos + len].iter().collect();
            if has_snake_case(&lexeme) {
                msgs.push(Msg::warn("Snake case is cringe", Some(pos.into())));
            }
            let kind = keyword(&lexeme).unwrap_or(TokenKind::Ident(lexeme));
            tokens.push(Token::new(kind, pos));
            self.advance_by(len);
        }

        Ok(tokens)
    }

    /// Length of a terminated block comment at the cursor, "/*" and "*/"
    /// included. The first closing "*/" wins.
    fn block_comment_len(&self) -> Option<usize> {
        let mut i = 2;
        loop {
            match (self.peek(i), self.peek(i + 1)) {
                (Some('*'), Some('/')) => return Some(i + 2),
                (Some(_), _) => i += 1,
                (None, _) => return None,
            }
        }
    }

    /// Prefixed integer literal: "0" prefix digit+.
    fn scan_radix(&self, prefix: char, radix: u32) -> Option<(String, u32, usize)> {
        if self.peek(0) != Some('0') || self.peek(1) != Some(prefix) {
            return None;
        }
        let mut len = 2;
        while self.peek(len).map_or(false, |c| c.is_digit(radix)) {
            len += 1;
        }
        if len == 2 {
            return None;
        }
        let text: String = self.input[self.pos + 2..self.pos + len].iter().collect();
        Some((text, radix, len))
    }

    /// Decimal integer literal: digit+.
    fn scan_dec(&self) -> Option<(String, u32, usize)> {
        let mut len = 0;
        while self.peek(len).map_or(false, |c| c.is_ascii_digit()) {
            len += 1;
        }
        if len == 0 {
            return None;
        }
        let text: String = self.input[self.pos..self.pos + len].iter().collect();
        Some((text, 10, len))
    }

    /// Float literal: digit+ "." digit+ with no exponent and no bare
    /// leading or trailing dot.
    fn scan_float(&self) -> Option<usize> {
        let mut len = 0;
        while self.peek(len).map_or(false, |c| c.is_ascii_digit()) {
            len += 1;
        }
        if len == 0 || self.peek(len) != Some('.') {
            return None;
        }
        let whole = len;
        len += 1;
        while self.peek(len).map_or(false, |c| c.is_ascii_digit()) {
            len += 1;
        }
        if len == whole + 1 {
            return None;
        }
        Some(len)
    }

    /// String literal delimited by `quote`. Returns the inner text and the
    /// total matched length. An escape is a backslash plus any non-newline
    /// character; a bare newline inside the literal is legal.
    fn scan_str(&self, quote: char) -> Option<(String, usize)> {
        let mut i = 1;
        loop {
            match self.peek(i) {
                None => return None,
                Some(c) if c == quote => {
                    let value: String =
                        self.input[self.pos + 1..self.pos + i].iter().collect();
                    return Some((value, i + 1));
                }
                Some('\\') => match self.peek(i + 1) {
                    Some(c) if c != '\n' => i += 2,
                    _ => return None,
                },
                Some(_) => i += 1,
            }
        }
    }
}

fn double_char_symbol(ch0: char, ch1: char) -> Option<TokenKind> {
    match (ch0, ch1) {
        ('=', '=') => Some(TokenKind::EqualEqual),
        ('!', '=') => Some(TokenKind::ExclEqual),
        ('<', '=') => Some(TokenKind::LAngleEqual),
        ('>', '=') => Some(TokenKind::RAngleEqual),
        ('+', '+') => Some(TokenKind::PlusPlus),
        ('-', '-') => Some(TokenKind::MinusMinus),
        _ => None,
    }
}

fn single_char_symbol(ch: char) -> Option<TokenKind> {
    match ch {
        ',' => Some(TokenKind::Comma),
        ';' => Some(TokenKind::Semicolon),
        '=' => Some(TokenKind::Equal),
        '+' => Some(TokenKind::Plus),
        '-' => Some(TokenKind::Minus),
        '*' => Some(TokenKind::Star),
        '/' => Some(TokenKind::Slash),
        '%' => Some(TokenKind::Percent),
        '|' => Some(TokenKind::Pipe),
        '&' => Some(TokenKind::Ampersand),
        '<' => Some(TokenKind::LAngle),
        '>' => Some(TokenKind::RAngle),
        '(' => Some(TokenKind::LParen),
        ')' => Some(TokenKind::RParen),
        '{' => Some(TokenKind::LCurly),
        '}' => Some(TokenKind::RCurly),
        _ => None,
    }
}

fn keyword(s: &str) -> Option<TokenKind> {
    match s {
        "const" => Some(TokenKind::KwConst),
        "if" => Some(TokenKind::KwIf),
        "else" => Some(TokenKind::KwElse),
        "while" => Some(TokenKind::KwWhile),
        "do" => Some(TokenKind::KwDo),
        "for" => Some(TokenKind::KwFor),
        "break" => Some(TokenKind::KwBreak),
        "return" => Some(TokenKind::KwReturn),
        _ => None,
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || (ch as u32) >= 0x80
}

/// An underscore with lowercase ASCII letters on both sides, away from the
/// edges of the identifier.
fn has_snake_case(ident: &str) -> bool {
    let chars: Vec<char> = ident.chars().collect();
    chars.len() >= 3
        && (1..chars.len() - 1).any(|i| {
            chars[i] == '_'
                && chars[i - 1].is_ascii_lowercase()
                && chars[i + 1].is_ascii_lowercase()
        })
}
