use crate::ast::{BinaryOp, CondBlock, Expr, ExprKind, Param, Stmt, StmtKind};
use crate::error::ParseError;
use crate::parsercore::Parser;
use crate::token::{Pos, Token, TokenKind, TokenKind::*};
use crate::{check, expect};

// Statement productions are attempted in a fixed order. A production backs
// off silently while only its leading literals have matched; once one of its
// recursive pieces (an expression, an argument or parameter list, a
// statement list, a nested primitive statement) has succeeded, the attempt
// is committed and any later mismatch is a hard error at the failing token.

impl<'a> Parser<'a> {
    /// program = { statement }
    pub fn parse(mut self) -> Result<Vec<Stmt<'a>>, ParseError> {
        let stmts = self.parse_statements()?;
        if let Some(token) = self.peek() {
            return Err(ParseError::InvalidStatement {
                loc: token.pos.into(),
            });
        }
        Ok(stmts)
    }

    /// Greedy statement list: consume statements until the next one fails
    /// without making progress, then stop and leave the cursor there.
    fn parse_statements(&mut self) -> Result<Vec<Stmt<'a>>, ParseError> {
        let mut stmts = Vec::new();
        while self.peek().is_some() {
            let mark = self.mark();
            match self.parse_statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(err) => {
                    if self.mark() == mark {
                        break;
                    }
                    return Err(err);
                }
            }
        }
        Ok(stmts)
    }

    /// statement = primitive ";" | scope | if | while | do-while | for
    ///           | "break" ";" | func-decl | return
    fn parse_statement(&mut self) -> Result<Stmt<'a>, ParseError> {
        let pos = match self.peek() {
            Some(token) => token.pos,
            None => return Err(ParseError::UnexpectedEof),
        };

        // 1. Primitive statements, terminated by ';'
        if let Some(stmt) = self.try_primitive(&Semicolon)? {
            self.next();
            return Ok(stmt);
        }

        // 2. Scope: "{" { statement } "}"
        if check!(self, LCurly) {
            self.next();
            let stmts = self.parse_statements()?;
            expect!(self, RCurly)?;
            return Ok(Stmt {
                kind: StmtKind::Scope(stmts),
                pos,
            });
        }

        // 3. If
        if check!(self, KwIf) {
            if let Some(stmt) = self.try_if(pos)? {
                return Ok(stmt);
            }
        }

        // 4. While / do-while
        if check!(self, KwWhile) {
            if let Some(stmt) = self.try_while(pos)? {
                return Ok(stmt);
            }
        }
        if check!(self, KwDo) {
            if let Some(stmt) = self.try_do_while(pos)? {
                return Ok(stmt);
            }
        }

        // 5. For
        if check!(self, KwFor) {
            if let Some(stmt) = self.try_for(pos)? {
                return Ok(stmt);
            }
        }

        // 6. Break: "break" ";"
        if check!(self, KwBreak) {
            let mark = self.mark();
            self.next();
            if check!(self, Semicolon) {
                self.next();
                return Ok(Stmt {
                    kind: StmtKind::Break,
                    pos,
                });
            }
            self.rewind(mark);
        }

        // 7. Function declaration
        if let Some(stmt) = self.try_func_decl(pos)? {
            return Ok(stmt);
        }

        // 8. Return
        if check!(self, KwReturn) {
            if let Some(stmt) = self.try_return(pos)? {
                return Ok(stmt);
            }
        }

        Err(ParseError::InvalidStatement { loc: pos.into() })
    }

    /// primitive = [ "const" ] ident ident [ "=" expr ]
    ///           | ident "=" expr
    ///           | ident ( "++" | "--" )
    ///           | ident "(" [ expr { "," expr } ] ")"
    ///
    /// The terminator is supplied by the caller ("," statement lists use
    /// ';', for-loop clauses inherit ';' or ')'). It is peeked to settle the
    /// bare-declaration form but never consumed here.
    fn try_primitive(&mut self, term: &TokenKind) -> Result<Option<Stmt<'a>>, ParseError> {
        let mark = self.mark();
        let pos = match self.peek() {
            Some(token) => token.pos,
            None => return Ok(None),
        };

        // Declarations: [ "const" ] ident ident [ "=" expr ]
        let is_const = check!(self, KwConst);
        if is_const {
            self.next();
        }
        if let Some((ty, _)) = self.take_ident() {
            if let Some((name, _)) = self.take_ident() {
                if self.next_is(term) {
                    return Ok(Some(Stmt {
                        kind: StmtKind::Declare {
                            ty,
                            name,
                            is_const,
                            init: None,
                        },
                        pos,
                    }));
                }
                if check!(self, Equal) {
                    self.next();
                    if let Some(init) = self.sub_expression()? {
                        if self.next_is(term) {
                            return Ok(Some(Stmt {
                                kind: StmtKind::Declare {
                                    ty,
                                    name,
                                    is_const,
                                    init: Some(init),
                                },
                                pos,
                            }));
                        }
                        return Err(self.unexpected_here());
                    }
                }
            }
        }
        self.rewind(mark);
        if is_const {
            // No other production starts with "const".
            return Ok(None);
        }

        // The remaining forms share an identifier head and are disjoint on
        // the symbol that follows it.
        let name = match self.take_ident() {
            Some((name, _)) => name,
            None => return Ok(None),
        };
        let follow = match self.peek() {
            Some(token) => token.kind.clone(),
            None => {
                self.rewind(mark);
                return Ok(None);
            }
        };
        match follow {
            // Assignment: ident "=" expr
            Equal => {
                self.next();
                if let Some(value) = self.sub_expression()? {
                    if self.next_is(term) {
                        return Ok(Some(Stmt {
                            kind: StmtKind::Assign { name, value },
                            pos,
                        }));
                    }
                    return Err(self.unexpected_here());
                }
                self.rewind(mark);
                Ok(None)
            }
            // Increment / decrement: ident "++" | ident "--"
            PlusPlus | MinusMinus => {
                self.next();
                if self.next_is(term) {
                    let kind = if follow == PlusPlus {
                        StmtKind::Increment(name)
                    } else {
                        StmtKind::Decrement(name)
                    };
                    return Ok(Some(Stmt { kind, pos }));
                }
                self.rewind(mark);
                Ok(None)
            }
            // Call: ident "(" [ expr { "," expr } ] ")"
            LParen => {
                self.next();
                let args = self.parse_arguments()?;
                expect!(self, RParen)?;
                if self.next_is(term) {
                    return Ok(Some(Stmt {
                        kind: StmtKind::Call { name, args },
                        pos,
                    }));
                }
                Err(self.unexpected_here())
            }
            _ => {
                self.rewind(mark);
                Ok(None)
            }
        }
    }

    /// if = "if" "(" expr ")" "{" statements "}"
    ///      { "else" "if" "(" expr ")" "{" statements "}" }
    ///      [ "else" "{" statements "}" ]
    fn try_if(&mut self, pos: Pos<'a>) -> Result<Option<Stmt<'a>>, ParseError> {
        let mark = self.mark();
        self.next(); // "if"
        if !check!(self, LParen) {
            self.rewind(mark);
            return Ok(None);
        }
        self.next();
        let cond = match self.sub_expression()? {
            Some(cond) => cond,
            None => {
                self.rewind(mark);
                return Ok(None);
            }
        };
        expect!(self, RParen)?;
        expect!(self, LCurly)?;
        let body = self.parse_statements()?;
        expect!(self, RCurly)?;

        let mut blocks = vec![CondBlock { cond, body }];
        let mut else_block = None;
        while check!(self, KwElse) {
            self.next();
            if check!(self, KwIf) {
                self.next();
                expect!(self, LParen)?;
                let cond = self.parse_expression()?;
                expect!(self, RParen)?;
                expect!(self, LCurly)?;
                let body = self.parse_statements()?;
                expect!(self, RCurly)?;
                blocks.push(CondBlock { cond, body });
            } else {
                expect!(self, LCurly)?;
                else_block = Some(self.parse_statements()?);
                expect!(self, RCurly)?;
                break;
            }
        }

        Ok(Some(Stmt {
            kind: StmtKind::If { blocks, else_block },
            pos,
        }))
    }

    /// while = "while" "(" expr ")" "{" statements "}"
    fn try_while(&mut self, pos: Pos<'a>) -> Result<Option<Stmt<'a>>, ParseError> {
        let mark = self.mark();
        self.next(); // "while"
        if !check!(self, LParen) {
            self.rewind(mark);
            return Ok(None);
        }
        self.next();
        let cond = match self.sub_expression()? {
            Some(cond) => cond,
            None => {
                self.rewind(mark);
                return Ok(None);
            }
        };
        expect!(self, RParen)?;
        expect!(self, LCurly)?;
        let body = self.parse_statements()?;
        expect!(self, RCurly)?;
        Ok(Some(Stmt {
            kind: StmtKind::While {
                cond,
                body,
                do_while: false,
            },
            pos,
        }))
    }

    /// do-while = "do" "{" statements "}" "while" "(" expr ")" ";"
    fn try_do_while(&mut self, pos: Pos<'a>) -> Result<Option<Stmt<'a>>, ParseError> {
        let mark = self.mark();
        self.next(); // "do"
        if !check!(self, LCurly) {
            self.rewind(mark);
            return Ok(None);
        }
        self.next();
        let body = self.parse_statements()?;
        expect!(self, RCurly)?;
        expect!(self, KwWhile)?;
        expect!(self, LParen)?;
        let cond = self.parse_expression()?;
        expect!(self, RParen)?;
        expect!(self, Semicolon)?;
        Ok(Some(Stmt {
            kind: StmtKind::While {
                cond,
                body,
                do_while: true,
            },
            pos,
        }))
    }

    /// for = "for" "(" primitive ";" expr ";" primitive ")" "{" statements "}"
    fn try_for(&mut self, pos: Pos<'a>) -> Result<Option<Stmt<'a>>, ParseError> {
        let mark = self.mark();
        self.next(); // "for"
        if !check!(self, LParen) {
            self.rewind(mark);
            return Ok(None);
        }
        self.next();
        let init = match self.try_primitive(&Semicolon)? {
            Some(stmt) => stmt,
            None => {
                self.rewind(mark);
                return Ok(None);
            }
        };
        expect!(self, Semicolon)?;
        let cond = self.parse_expression()?;
        expect!(self, Semicolon)?;
        let action = match self.try_primitive(&RParen)? {
            Some(stmt) => stmt,
            None => return Err(self.unexpected_here()),
        };
        expect!(self, RParen)?;
        expect!(self, LCurly)?;
        let body = self.parse_statements()?;
        expect!(self, RCurly)?;
        Ok(Some(Stmt {
            kind: StmtKind::For {
                init: Some(Box::new(init)),
                cond: Some(cond),
                action: Some(Box::new(action)),
                body,
            },
            pos,
        }))
    }

    /// func-decl = ident ident "(" [ ident ident { "," ident ident } ] ")"
    ///             "{" statements "}"
    fn try_func_decl(&mut self, pos: Pos<'a>) -> Result<Option<Stmt<'a>>, ParseError> {
        let mark = self.mark();
        let ret = match self.take_ident() {
            Some((ret, _)) => ret,
            None => return Ok(None),
        };
        let name = match self.take_ident() {
            Some((name, _)) => name,
            None => {
                self.rewind(mark);
                return Ok(None);
            }
        };
        if !check!(self, LParen) {
            self.rewind(mark);
            return Ok(None);
        }
        self.next();
        let params = self.parse_parameters()?;
        expect!(self, RParen)?;
        expect!(self, LCurly)?;
        let body = self.parse_statements()?;
        expect!(self, RCurly)?;
        Ok(Some(Stmt {
            kind: StmtKind::FuncDecl {
                ret,
                name,
                params,
                body,
            },
            pos,
        }))
    }

    /// return = "return" [ expr ] ";"
    fn try_return(&mut self, pos: Pos<'a>) -> Result<Option<Stmt<'a>>, ParseError> {
        let mark = self.mark();
        self.next(); // "return"
        let value = self.sub_expression()?;
        if check!(self, Semicolon) {
            self.next();
            return Ok(Some(Stmt {
                kind: StmtKind::Return(value),
                pos,
            }));
        }
        if value.is_some() {
            return Err(self.unexpected_here());
        }
        self.rewind(mark);
        Ok(None)
    }

    /// arguments = [ expr { "," expr } ]
    ///
    /// Greedy: stops at the first element that fails without consuming
    /// input, leaving the closing token for the caller.
    fn parse_arguments(&mut self) -> Result<Vec<Expr<'a>>, ParseError> {
        let mut args = Vec::new();
        loop {
            match self.sub_expression()? {
                Some(expr) => args.push(expr),
                None => break,
            }
            if check!(self, Comma) {
                self.next();
            } else {
                break;
            }
        }
        Ok(args)
    }

    /// parameters = [ ident ident { "," ident ident } ]
    fn parse_parameters(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();
        if !check!(self, Ident(_)) {
            return Ok(params);
        }
        loop {
            let ty = match self.take_ident() {
                Some((ty, _)) => ty,
                None => {
                    return Err(ParseError::InvalidParameter {
                        loc: self.current_loc()?,
                    })
                }
            };
            let name = match self.take_ident() {
                Some((name, _)) => name,
                None => {
                    return Err(ParseError::InvalidParameter {
                        loc: self.current_loc()?,
                    })
                }
            };
            params.push(Param { ty, name });
            if check!(self, Comma) {
                self.next();
            } else {
                break;
            }
        }
        Ok(params)
    }

    /// Run an expression placeholder. `Ok(None)` means it failed without
    /// consuming input, so the enclosing pattern may still back off; a
    /// failure past the first token is already a hard error.
    fn sub_expression(&mut self) -> Result<Option<Expr<'a>>, ParseError> {
        let mark = self.mark();
        match self.parse_expression() {
            Ok(expr) => Ok(Some(expr)),
            Err(err) => {
                if self.mark() == mark {
                    Ok(None)
                } else {
                    Err(err)
                }
            }
        }
    }

    fn take_ident(&mut self) -> Option<(String, Pos<'a>)> {
        if let Some(Token {
            kind: Ident(name),
            pos,
        }) = self.peek().cloned()
        {
            self.next();
            return Some((name, pos));
        }
        None
    }

    fn current_loc(&self) -> Result<crate::error::Loc, ParseError> {
        match self.peek() {
            Some(token) => Ok(token.pos.into()),
            None => Err(ParseError::UnexpectedEof),
        }
    }
}

// ----------------------------------------------------------------------------
// Expressions
// ----------------------------------------------------------------------------

impl<'a> Parser<'a> {
    /// expr = <precedence climbing over the binary operator table>
    pub fn parse_expression(&mut self) -> Result<Expr<'a>, ParseError> {
        self.parse_binary(0)
    }

    /// Precedence climbing. Every operator is left-associative, so the right
    /// side binds one level tighter than the operator just consumed.
    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr<'a>, ParseError> {
        let mut lhs = self.parse_primitive_expr()?;
        while let Some(op) = self.peek().and_then(|token| binary_op(&token.kind)) {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.next();
            let rhs = self.parse_binary(prec + 1)?;
            let pos = lhs.pos;
            lhs = Expr {
                kind: ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)),
                pos,
            };
        }
        Ok(lhs)
    }

    /// prim-expr = [ "-" ] int-lit | [ "-" ] float-lit | string-lit
    ///           | ident "(" [ expr { "," expr } ] ")"
    ///           | ident "++" | ident "--" | ident
    ///           | "(" expr ")"
    fn parse_primitive_expr(&mut self) -> Result<Expr<'a>, ParseError> {
        let token = match self.peek().cloned() {
            Some(token) => token,
            None => return Err(ParseError::UnexpectedEof),
        };
        let pos = token.pos;

        match token.kind {
            // Negated literal: the sign lives in the parser, never the lexer.
            Minus => match self.peek_nth(1).map(|t| t.kind.clone()) {
                Some(Int(value)) => {
                    self.next();
                    self.next();
                    Ok(Expr {
                        kind: ExprKind::Int(-value),
                        pos,
                    })
                }
                Some(Float(value)) => {
                    self.next();
                    self.next();
                    Ok(Expr {
                        kind: ExprKind::Float(-value),
                        pos,
                    })
                }
                _ => Err(ParseError::InvalidExpression { loc: pos.into() }),
            },

            Int(value) => {
                self.next();
                Ok(Expr {
                    kind: ExprKind::Int(value),
                    pos,
                })
            }

            Float(value) => {
                self.next();
                Ok(Expr {
                    kind: ExprKind::Float(value),
                    pos,
                })
            }

            Str(value) => {
                self.next();
                Ok(Expr {
                    kind: ExprKind::Str(value),
                    pos,
                })
            }

            // Call, post-increment, post-decrement and plain variable reads
            // share the identifier head; call and ++/-- must win over the
            // bare variable form.
            Ident(name) => match self.peek_nth(1).map(|t| t.kind.clone()) {
                Some(LParen) => {
                    self.next();
                    self.next();
                    let args = self.parse_arguments()?;
                    expect!(self, RParen)?;
                    Ok(Expr {
                        kind: ExprKind::Call(name, args),
                        pos,
                    })
                }
                Some(PlusPlus) => {
                    self.next();
                    self.next();
                    Ok(Expr {
                        kind: ExprKind::Increment(name),
                        pos,
                    })
                }
                Some(MinusMinus) => {
                    self.next();
                    self.next();
                    Ok(Expr {
                        kind: ExprKind::Decrement(name),
                        pos,
                    })
                }
                _ => {
                    self.next();
                    Ok(Expr {
                        kind: ExprKind::Variable(name),
                        pos,
                    })
                }
            },

            // Sub-expression, carrying the opening paren's location
            LParen => {
                let mark = self.mark();
                self.next();
                match self.sub_expression()? {
                    Some(inner) => {
                        expect!(self, RParen)?;
                        Ok(Expr {
                            kind: ExprKind::Sub(Box::new(inner)),
                            pos,
                        })
                    }
                    None => {
                        self.rewind(mark);
                        Err(ParseError::InvalidExpression { loc: pos.into() })
                    }
                }
            }

            _ => Err(ParseError::InvalidExpression { loc: pos.into() }),
        }
    }
}

fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        EqualEqual => Some(BinaryOp::Eq),
        ExclEqual => Some(BinaryOp::Ne),
        LAngle => Some(BinaryOp::Lt),
        LAngleEqual => Some(BinaryOp::Le),
        RAngle => Some(BinaryOp::Gt),
        RAngleEqual => Some(BinaryOp::Ge),
        Pipe => Some(BinaryOp::Or),
        Ampersand => Some(BinaryOp::And),
        Plus => Some(BinaryOp::Add),
        Minus => Some(BinaryOp::Sub),
        Star => Some(BinaryOp::Mul),
        Slash => Some(BinaryOp::Div),
        Percent => Some(BinaryOp::Mod),
        _ => None,
    }
}
