#[derive(Debug, Clone)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub pos: Pos<'a>,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, pos: Pos<'a>) -> Self {
        Token { kind, pos }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Double character symbols
    EqualEqual, // '=='
    ExclEqual,  // '!='
    LAngleEqual, // '<='
    RAngleEqual, // '>='
    PlusPlus,   // '++'
    MinusMinus, // '--'

    // Single character symbols
    Comma,     // ','
    Semicolon, // ';'
    Equal,     // '='
    Plus,      // '+'
    Minus,     // '-'
    Star,      // '*'
    Slash,     // '/'
    Percent,   // '%'
    Pipe,      // '|'
    Ampersand, // '&'
    LAngle,    // '<'
    RAngle,    // '>'
    LParen,    // '('
    RParen,    // ')'
    LCurly,    // '{'
    RCurly,    // '}'

    // Keywords
    KwConst,  // "const"
    KwIf,     // "if"
    KwElse,   // "else"
    KwWhile,  // "while"
    KwDo,     // "do"
    KwFor,    // "for"
    KwBreak,  // "break"
    KwReturn, // "return"

    // Identifier
    Ident(String),

    // Literals
    Int(i64),
    Float(f64),
    Str(String),
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use TokenKind::*;
        match self {
            EqualEqual => write!(f, "'=='"),
            ExclEqual => write!(f, "'!='"),
            LAngleEqual => write!(f, "'<='"),
            RAngleEqual => write!(f, "'>='"),
            PlusPlus => write!(f, "'++'"),
            MinusMinus => write!(f, "'--'"),
            Comma => write!(f, "','"),
            Semicolon => write!(f, "';'"),
            Equal => write!(f, "'='"),
            Plus => write!(f, "'+'"),
            Minus => write!(f, "'-'"),
            Star => write!(f, "'*'"),
            Slash => write!(f, "'/'"),
            Percent => write!(f, "'%'"),
            Pipe => write!(f, "'|'"),
            Ampersand => write!(f, "'&'"),
            LAngle => write!(f, "'<'"),
            RAngle => write!(f, "'>'"),
            LParen => write!(f, "'('"),
            RParen => write!(f, "')'"),
            LCurly => write!(f, "'{{'"),
            RCurly => write!(f, "'}}'"),
            KwConst => write!(f, "\"const\""),
            KwIf => write!(f, "\"if\""),
            KwElse => write!(f, "\"else\""),
            KwWhile => write!(f, "\"while\""),
            KwDo => write!(f, "\"do\""),
            KwFor => write!(f, "\"for\""),
            KwBreak => write!(f, "\"break\""),
            KwReturn => write!(f, "\"return\""),
            Ident(name) => write!(f, "identifier \"{}\"", name),
            Int(value) => write!(f, "integer {}", value),
            Float(value) => write!(f, "float {}", value),
            Str(value) => write!(f, "string \"{}\"", value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pos<'a> {
    pub file: &'a str,
    pub line: usize,
    pub col: usize,
}
