use nitroc::ast::{BinaryOp, Expr, ExprKind, Stmt, StmtKind};
use nitroc::error::ParseError;
use nitroc::lexer::Lexer;
use nitroc::parsercore::Parser;
use nitroc::token::Token;

fn lex(code: &str) -> Vec<Token<'static>> {
    let mut msgs = Vec::new();
    Lexer::new("test.nitro", code)
        .tokenize(&mut msgs)
        .unwrap_or_else(|err| panic!("lexing {:?} failed: {}", code, err))
}

fn parse(code: &str) -> Result<Vec<Stmt<'static>>, ParseError> {
    Parser::new(lex(code)).parse()
}

fn parse_ok(code: &str) -> Vec<Stmt<'static>> {
    parse(code).unwrap_or_else(|err| panic!("parsing {:?} failed: {}", code, err))
}

fn parse_expr(code: &str) -> Expr<'static> {
    let mut parser = Parser::new(lex(code));
    parser
        .parse_expression()
        .unwrap_or_else(|err| panic!("parsing expression {:?} failed: {}", code, err))
}

fn as_binary<'e>(expr: &'e Expr<'e>, op: BinaryOp) -> (&'e Expr<'e>, &'e Expr<'e>) {
    match &expr.kind {
        ExprKind::Binary(found, left, right) if *found == op => (left.as_ref(), right.as_ref()),
        other => panic!("expected {:?} node, found {:?}", op, other),
    }
}

fn assert_int(expr: &Expr, value: i64) {
    match &expr.kind {
        ExprKind::Int(found) => assert_eq!(*found, value),
        other => panic!("expected integer {}, found {:?}", value, other),
    }
}

// ---- Expressions ----

#[test]
fn multiplication_binds_tighter_than_addition() {
    let expr = parse_expr("1 + 2 * 3");
    let (left, right) = as_binary(&expr, BinaryOp::Add);
    assert_int(left, 1);
    let (rl, rr) = as_binary(right, BinaryOp::Mul);
    assert_int(rl, 2);
    assert_int(rr, 3);
}

#[test]
fn addition_binds_tighter_than_comparison() {
    let expr = parse_expr("1 == 2 + 3");
    let (left, right) = as_binary(&expr, BinaryOp::Eq);
    assert_int(left, 1);
    as_binary(right, BinaryOp::Add);
}

#[test]
fn bitwise_and_binds_tighter_than_bitwise_or() {
    let expr = parse_expr("1 | 2 & 3");
    let (left, right) = as_binary(&expr, BinaryOp::Or);
    assert_int(left, 1);
    as_binary(right, BinaryOp::And);
}

#[test]
fn subtraction_associates_left() {
    let expr = parse_expr("1 - 2 - 3");
    let (left, right) = as_binary(&expr, BinaryOp::Sub);
    assert_int(right, 3);
    let (ll, lr) = as_binary(left, BinaryOp::Sub);
    assert_int(ll, 1);
    assert_int(lr, 2);
}

#[test]
fn binary_node_carries_lhs_location() {
    let expr = parse_expr("1 + 2");
    assert_eq!((expr.pos.line, expr.pos.col), (1, 1));
}

#[test]
fn negated_literals() {
    assert_int(&parse_expr("-5"), -5);
    match parse_expr("-2.5").kind {
        ExprKind::Float(value) => assert_eq!(value, -2.5),
        other => panic!("expected float, found {:?}", other),
    }
}

#[test]
fn minus_before_identifier_is_invalid() {
    let mut parser = Parser::new(lex("- x"));
    assert!(matches!(
        parser.parse_expression(),
        Err(ParseError::InvalidExpression { .. })
    ));
}

#[test]
fn parenthesized_subexpression_carries_paren_location() {
    let expr = parse_expr("  (1 + 2) * 3");
    let (left, _) = as_binary(&expr, BinaryOp::Mul);
    match &left.kind {
        ExprKind::Sub(_) => assert_eq!((left.pos.line, left.pos.col), (1, 3)),
        other => panic!("expected sub-expression, found {:?}", other),
    }
}

#[test]
fn call_and_postfix_win_over_variable() {
    match parse_expr("foo(1, 2)").kind {
        ExprKind::Call(name, args) => {
            assert_eq!(name, "foo");
            assert_eq!(args.len(), 2);
        }
        other => panic!("expected call, found {:?}", other),
    }
    assert!(matches!(parse_expr("a++").kind, ExprKind::Increment(_)));
    assert!(matches!(parse_expr("a--").kind, ExprKind::Decrement(_)));
    assert!(matches!(parse_expr("a").kind, ExprKind::Variable(_)));
}

// ---- Statements ----

#[test]
fn declaration_forms() {
    let stmts = parse_ok("i32 x; const u8 y = 1; x = 2; x++; x--;");
    assert_eq!(stmts.len(), 5);
    assert!(matches!(
        &stmts[0].kind,
        StmtKind::Declare { is_const: false, init: None, .. }
    ));
    assert!(matches!(
        &stmts[1].kind,
        StmtKind::Declare { is_const: true, init: Some(_), .. }
    ));
    assert!(matches!(&stmts[2].kind, StmtKind::Assign { .. }));
    assert!(matches!(&stmts[3].kind, StmtKind::Increment(_)));
    assert!(matches!(&stmts[4].kind, StmtKind::Decrement(_)));
}

#[test]
fn call_statement_with_empty_arguments() {
    let stmts = parse_ok("foo();");
    match &stmts[0].kind {
        StmtKind::Call { name, args } => {
            assert_eq!(name, "foo");
            assert!(args.is_empty());
        }
        other => panic!("expected call, found {:?}", other),
    }
}

#[test]
fn if_else_chain_collects_blocks() {
    let stmts = parse_ok("i32 a; i32 b; if (a) {} else if (b) {} else {}");
    match &stmts[2].kind {
        StmtKind::If { blocks, else_block } => {
            assert_eq!(blocks.len(), 2);
            assert!(else_block.is_some());
        }
        other => panic!("expected if, found {:?}", other),
    }
}

#[test]
fn if_without_trailing_else() {
    let stmts = parse_ok("i32 a; if (a) { a = 1; }");
    match &stmts[1].kind {
        StmtKind::If { blocks, else_block } => {
            assert_eq!(blocks.len(), 1);
            assert!(else_block.is_none());
            assert_eq!(blocks[0].body.len(), 1);
        }
        other => panic!("expected if, found {:?}", other),
    }
}

#[test]
fn while_and_do_while() {
    let stmts = parse_ok("i32 i; while (i < 10) { i++; } do { i--; } while (i > 0);");
    assert!(matches!(
        &stmts[1].kind,
        StmtKind::While { do_while: false, .. }
    ));
    assert!(matches!(
        &stmts[2].kind,
        StmtKind::While { do_while: true, .. }
    ));
}

#[test]
fn for_fills_all_three_clauses() {
    let stmts = parse_ok("for (i32 i = 0; i < 3; i++) { }");
    match &stmts[0].kind {
        StmtKind::For {
            init,
            cond,
            action,
            body,
        } => {
            assert!(matches!(
                init.as_deref().map(|s| &s.kind),
                Some(StmtKind::Declare { .. })
            ));
            assert!(cond.is_some());
            assert!(matches!(
                action.as_deref().map(|s| &s.kind),
                Some(StmtKind::Increment(_))
            ));
            assert!(body.is_empty());
        }
        other => panic!("expected for, found {:?}", other),
    }
}

#[test]
fn for_assignment_action() {
    let stmts = parse_ok("for (i32 i = 0; i < 9; i = i + 3) { }");
    match &stmts[0].kind {
        StmtKind::For { action, .. } => {
            assert!(matches!(
                action.as_deref().map(|s| &s.kind),
                Some(StmtKind::Assign { .. })
            ));
        }
        other => panic!("expected for, found {:?}", other),
    }
}

#[test]
fn function_declaration_with_parameters() {
    let stmts = parse_ok("i32 main(i32 argc, u8 flag) { return 0; }");
    match &stmts[0].kind {
        StmtKind::FuncDecl {
            ret, name, params, body,
        } => {
            assert_eq!(ret, "i32");
            assert_eq!(name, "main");
            assert_eq!(params.len(), 2);
            assert_eq!(params[0].ty, "i32");
            assert_eq!(params[0].name, "argc");
            assert!(matches!(&body[0].kind, StmtKind::Return(Some(_))));
        }
        other => panic!("expected function declaration, found {:?}", other),
    }
}

#[test]
fn bare_return_and_break() {
    let stmts = parse_ok("return; break;");
    assert!(matches!(&stmts[0].kind, StmtKind::Return(None)));
    assert!(matches!(&stmts[1].kind, StmtKind::Break));
}

#[test]
fn nested_scopes() {
    let stmts = parse_ok("{ { i32 x; } }");
    match &stmts[0].kind {
        StmtKind::Scope(inner) => assert!(matches!(&inner[0].kind, StmtKind::Scope(_))),
        other => panic!("expected scope, found {:?}", other),
    }
}

// ---- Diagnostics ----

#[test]
fn unmatched_garbage_is_an_invalid_statement_at_the_start() {
    for code in ["x = ;", "x++)", "if x {}", "break", "42;"] {
        match parse(code) {
            Err(ParseError::InvalidStatement { loc }) => {
                assert_eq!((loc.line, loc.col), (1, 1), "for {:?}", code);
            }
            other => panic!("expected invalid statement for {:?}, found {:?}", code, other),
        }
    }
}

#[test]
fn committed_pattern_reports_unexpected_token() {
    match parse("i32 x = 1 + 2)") {
        Err(ParseError::UnexpectedToken(info)) => assert_eq!(info.loc.col, 14),
        other => panic!("expected unexpected token, found {:?}", other),
    }
}

#[test]
fn missing_semicolon_after_call_commits() {
    match parse("{ foo() }") {
        Err(ParseError::UnexpectedToken(info)) => assert_eq!(info.loc.col, 9),
        other => panic!("expected unexpected token, found {:?}", other),
    }
}

#[test]
fn unclosed_call_reports_at_the_failing_token() {
    match parse("foo(1 + 2;") {
        Err(ParseError::UnexpectedToken(info)) => assert_eq!(info.loc.col, 10),
        other => panic!("expected unexpected token, found {:?}", other),
    }
}

#[test]
fn malformed_parameter_pair() {
    match parse("i32 main(i32) {}") {
        Err(ParseError::InvalidParameter { loc }) => assert_eq!(loc.col, 13),
        other => panic!("expected invalid parameter, found {:?}", other),
    }
}

#[test]
fn committed_if_reports_past_the_condition() {
    assert!(matches!(
        parse("if (1) 2"),
        Err(ParseError::UnexpectedToken(_))
    ));
}

#[test]
fn truncated_input_reports_eof() {
    assert!(matches!(parse("i32 x = 1"), Err(ParseError::UnexpectedEof)));
}
