use nitroc::lexer::Lexer;
use nitroc::token::{TokenKind, TokenKind::*};

fn assert_single(code: &str, expect: TokenKind) {
    let mut msgs = Vec::new();
    let tokens = Lexer::new("single.nitro", code).tokenize(&mut msgs).unwrap();
    assert_eq!(tokens.len(), 1, "expected one token for {:?}", code);
    assert_eq!(tokens[0].kind, expect);
    assert_eq!(tokens[0].pos.line, 1);
    assert_eq!(tokens[0].pos.col, 1);
}

macro_rules! case {
    ($name:ident, $code:expr, $expect:expr) => {
        #[test]
        fn $name() {
            assert_single($code, $expect);
        }
    };
}

// ---- Double-char symbols ----
case!(equal_equal, "==", EqualEqual);
case!(excl_equal, "!=", ExclEqual);
case!(langle_equal, "<=", LAngleEqual);
case!(rangle_equal, ">=", RAngleEqual);
case!(plus_plus, "++", PlusPlus);
case!(minus_minus, "--", MinusMinus);

// ---- Single-char symbols ----
case!(comma, ",", Comma);
case!(semicolon, ";", Semicolon);
case!(equal, "=", Equal);
case!(plus, "+", Plus);
case!(minus, "-", Minus);
case!(star, "*", Star);
case!(slash, "/", Slash);
case!(percent, "%", Percent);
case!(pipe, "|", Pipe);
case!(ampersand, "&", Ampersand);
case!(langle, "<", LAngle);
case!(rangle, ">", RAngle);
case!(lparen, "(", LParen);
case!(rparen, ")", RParen);
case!(lcurly, "{", LCurly);
case!(rcurly, "}", RCurly);

// ---- Keywords ----
case!(kw_const, "const", KwConst);
case!(kw_if, "if", KwIf);
case!(kw_else, "else", KwElse);
case!(kw_while, "while", KwWhile);
case!(kw_do, "do", KwDo);
case!(kw_for, "for", KwFor);
case!(kw_break, "break", KwBreak);
case!(kw_return, "return", KwReturn);

// ---- Identifiers ----
case!(ident_simple, "abc", Ident(format!("abc")));
case!(ident_with_digits, "a1b2", Ident(format!("a1b2")));
case!(ident_leading_underscore, "_tmp", Ident(format!("_tmp")));
case!(ident_keyword_prefix, "iffy", Ident(format!("iffy")));
case!(ident_non_ascii, "héllo", Ident(format!("héllo")));

// ---- Integer literals ----
case!(number_dec, "42", Int(42));
case!(number_zero, "0", Int(0));
case!(number_hex, "0x1F", Int(31));
case!(number_bin, "0b1010", Int(10));
case!(number_oct, "0o17", Int(15));
case!(number_trailing_dot, "42.", Int(42));

// ---- Float literals ----
case!(float_simple, "42.5", Float(42.5));
case!(float_small, "0.25", Float(0.25));

// ---- String literals (inner text kept verbatim) ----
case!(text_single_quoted, "'hello'", Str(format!("hello")));
case!(text_double_quoted, "\"hello\"", Str(format!("hello")));
case!(text_empty, "''", Str(format!("")));
case!(text_escape_kept_raw, "'a\\nb'", Str(format!("a\\nb")));
case!(text_escaped_quote, "'don\\'t'", Str(format!("don\\'t")));
case!(text_quote_in_other_quotes, "\"it's\"", Str(format!("it's")));
