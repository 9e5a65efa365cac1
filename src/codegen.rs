use crate::ast::{CondBlock, Expr, ExprKind, Stmt, StmtKind};
use crate::buffer::CodeBuffer;
use crate::error::{Error, GenError};
use crate::message::Msg;
use crate::token::Pos;
use indexmap::IndexMap;
use once_cell::sync::Lazy;

/// Compilation targets. "debug" emits the textual IR and is the only target
/// for now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Debug,
}

impl std::str::FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Target::Debug),
            _ => Err(Error::InvalidTarget(s.to_string())),
        }
    }
}

/// Result of code generation.
pub struct Artifact {
    pub code: Vec<u8>,
}

static PRIMITIVE_TYPES: Lazy<IndexMap<&'static str, usize>> = Lazy::new(|| {
    IndexMap::from([
        ("i8", 1),
        ("u8", 1),
        ("i16", 2),
        ("u16", 2),
        ("i32", 4),
        ("u32", 4),
    ])
});

#[derive(Debug, Clone)]
struct Variable {
    name: String,
    is_const: bool,
    offset: usize,
}

/// One lexical scope's declarations. `base_offset` is the stack offset at
/// entry; leaving the scope rolls the allocator back to it.
struct Frame {
    vars: Vec<Variable>,
    base_offset: usize,
}

const JMP_SIZE: usize = 11;
const JMP_IF_TRUE_SIZE: usize = 21;
const JMP_IF_FALSE_SIZE: usize = 22;

fn render_jmp(offset: usize) -> Vec<u8> {
    format!("JMP {:.>6}\n", offset).into_bytes()
}

fn render_jmp_if_true(offset: usize) -> Vec<u8> {
    format!(") JMP IF TRUE {:.>6}\n", offset).into_bytes()
}

fn render_jmp_if_false(offset: usize) -> Vec<u8> {
    format!(") JMP IF FALSE {:.>6}\n", offset).into_bytes()
}

/// Walks the AST and emits the line-oriented IR, resolving scopes and
/// stack offsets along the way.
pub struct CodeGen {
    buf: CodeBuffer,
    frames: Vec<Frame>,
    stack_offset: usize,
}

impl CodeGen {
    pub fn generate(
        program: &[Stmt],
        _target: Target,
        msgs: &mut Vec<Msg>,
    ) -> Result<Artifact, GenError> {
        let mut gen = CodeGen {
            buf: CodeBuffer::new(),
            frames: Vec::new(),
            stack_offset: 0,
        };
        gen.gen_statements(program, msgs)?;
        let code = gen.buf.finish(msgs);
        Ok(Artifact { code })
    }

    /// Generate a statement list inside a fresh scope frame.
    fn gen_statements(&mut self, stmts: &[Stmt], msgs: &mut Vec<Msg>) -> Result<(), GenError> {
        self.enter_scope();
        for stmt in stmts {
            self.gen_statement(stmt, msgs)?;
        }
        self.exit_scope();
        Ok(())
    }

    fn gen_statement(&mut self, stmt: &Stmt, msgs: &mut Vec<Msg>) -> Result<(), GenError> {
        match &stmt.kind {
            StmtKind::Declare {
                ty,
                name,
                is_const,
                init,
            } => {
                let size = match PRIMITIVE_TYPES.get(ty.as_str()) {
                    Some(&size) => size,
                    None => {
                        return Err(GenError::InvalidTypeIdentifier {
                            name: ty.clone(),
                            loc: stmt.pos.into(),
                        })
                    }
                };
                if self.declared_in_current(name) {
                    return Err(GenError::AlreadyDeclared {
                        name: name.clone(),
                        loc: stmt.pos.into(),
                    });
                }
                if *is_const && init.is_none() {
                    return Err(GenError::ConstWithoutAssignment {
                        name: name.clone(),
                        loc: stmt.pos.into(),
                    });
                }
                if self.shadows_inherited(name) {
                    msgs.push(Msg::warn(
                        format!("Variable {} shadows a previously declared variable", name),
                        Some(stmt.pos.into()),
                    ));
                }
                let offset = self.stack_offset;
                self.stack_offset += size;
                if let Some(frame) = self.frames.last_mut() {
                    frame.vars.push(Variable {
                        name: name.clone(),
                        is_const: *is_const,
                        offset,
                    });
                }
                if let Some(init) = init {
                    self.gen_expr(init)?;
                    self.buf.push(&format!("> STACK[{}]\n", offset));
                }
            }

            StmtKind::Assign { name, value } => {
                let (offset, is_const) = match self.lookup(name) {
                    Some(var) => (var.offset, var.is_const),
                    None => {
                        return Err(GenError::NotDeclared {
                            name: name.clone(),
                            loc: stmt.pos.into(),
                        })
                    }
                };
                if is_const {
                    return Err(GenError::AssignToConst {
                        name: name.clone(),
                        loc: stmt.pos.into(),
                    });
                }
                self.gen_expr(value)?;
                self.buf.push(&format!("> STACK[{}]\n", offset));
            }

            StmtKind::Increment(name) => self.gen_incdec(name, "++", stmt.pos)?,
            StmtKind::Decrement(name) => self.gen_incdec(name, "--", stmt.pos)?,

            StmtKind::Scope(stmts) => {
                self.buf.push("; BEGIN SCOPE\n");
                self.gen_statements(stmts, msgs)?;
                self.buf.push("; END SCOPE\n");
            }

            StmtKind::If { blocks, else_block } => {
                self.gen_if(blocks, else_block.as_deref(), msgs)?;
            }

            StmtKind::While {
                cond,
                body,
                do_while,
            } => {
                if *do_while {
                    self.gen_do_while(cond, body, msgs)?;
                } else {
                    self.gen_while(cond, body, msgs)?;
                }
            }

            StmtKind::For {
                init,
                cond,
                action,
                body,
            } => {
                self.gen_for(init.as_deref(), cond.as_ref(), action.as_deref(), body, msgs)?;
            }

            StmtKind::Call { .. } => {
                return Err(GenError::NotImplemented {
                    what: "function calls",
                    loc: stmt.pos.into(),
                })
            }
            StmtKind::FuncDecl { .. } => {
                return Err(GenError::NotImplemented {
                    what: "function declarations",
                    loc: stmt.pos.into(),
                })
            }
            StmtKind::Return(_) => {
                return Err(GenError::NotImplemented {
                    what: "return",
                    loc: stmt.pos.into(),
                })
            }
            StmtKind::Break => {
                return Err(GenError::NotImplemented {
                    what: "break",
                    loc: stmt.pos.into(),
                })
            }
        }
        Ok(())
    }

    /// Depth-first expression emission. Every operand lands on the
    /// evaluation stack via a `<` line.
    fn gen_expr(&mut self, expr: &Expr) -> Result<(), GenError> {
        match &expr.kind {
            ExprKind::Int(value) => {
                self.buf.push(&format!("< LITERAL INT {}\n", value));
            }
            ExprKind::Float(value) => {
                self.buf.push(&format!("< LITERAL FLOAT {}\n", value));
            }
            ExprKind::Str(value) => {
                self.buf.push(&format!("< LITERAL STRING {}\n", value));
            }
            ExprKind::Variable(name) => {
                let offset = match self.lookup(name) {
                    Some(var) => var.offset,
                    None => {
                        return Err(GenError::NotDeclared {
                            name: name.clone(),
                            loc: expr.pos.into(),
                        })
                    }
                };
                self.buf.push(&format!("< STACK[{}]\n", offset));
            }
            ExprKind::Increment(name) => self.gen_incdec(name, "++", expr.pos)?,
            ExprKind::Decrement(name) => self.gen_incdec(name, "--", expr.pos)?,
            ExprKind::Sub(inner) => self.gen_expr(inner)?,
            ExprKind::Call(..) => {
                return Err(GenError::NotImplemented {
                    what: "function calls",
                    loc: expr.pos.into(),
                })
            }
            ExprKind::Binary(op, left, right) => {
                self.buf.push("; EVAL A\n");
                self.gen_expr(left)?;
                self.buf.push("; EVAL B\n");
                self.gen_expr(right)?;
                self.buf.push(&format!("< A {{{}}} B\n", op.tag()));
            }
        }
        Ok(())
    }

    // No numeric type check here; any declared non-const variable passes.
    fn gen_incdec(&mut self, name: &str, op: &str, pos: Pos<'_>) -> Result<(), GenError> {
        let (offset, is_const) = match self.lookup(name) {
            Some(var) => (var.offset, var.is_const),
            None => {
                return Err(GenError::NotDeclared {
                    name: name.to_string(),
                    loc: pos.into(),
                })
            }
        };
        if is_const {
            return Err(GenError::ModifyConst {
                name: name.to_string(),
                loc: pos.into(),
            });
        }
        self.buf.push(&format!("STACK[{}]{}\n", offset, op));
        Ok(())
    }

    /// Condition tests first, each jumping into its block; a fall-through
    /// jump picks the else block; every block jumps to the common exit.
    fn gen_if(
        &mut self,
        blocks: &[CondBlock],
        else_block: Option<&[Stmt]>,
        msgs: &mut Vec<Msg>,
    ) -> Result<(), GenError> {
        let enters: Vec<_> = blocks.iter().map(|_| self.buf.marker("if-enter")).collect();
        let else_enter = self.buf.marker("else-enter");
        let if_exit = self.buf.marker("if-exit");

        for (block, enter) in blocks.iter().zip(&enters) {
            self.buf.push("(\n");
            self.gen_expr(&block.cond)?;
            self.buf
                .reserve(*enter, JMP_IF_TRUE_SIZE, Box::new(render_jmp_if_true));
        }
        self.buf.reserve(else_enter, JMP_SIZE, Box::new(render_jmp));

        for (block, enter) in blocks.iter().zip(&enters) {
            self.buf.set(*enter);
            self.buf.push("{\n");
            self.gen_statements(&block.body, msgs)?;
            self.buf.push("}\n");
            self.buf.reserve(if_exit, JMP_SIZE, Box::new(render_jmp));
        }

        self.buf.set(else_enter);
        if let Some(else_stmts) = else_block {
            self.buf.push("{\n");
            self.gen_statements(else_stmts, msgs)?;
            self.buf.push("}\n");
        }
        self.buf.set(if_exit);
        Ok(())
    }

    fn gen_while(
        &mut self,
        cond: &Expr,
        body: &[Stmt],
        msgs: &mut Vec<Msg>,
    ) -> Result<(), GenError> {
        let loop_enter = self.buf.marker("loop-enter");
        let loop_exit = self.buf.marker("loop-exit");

        self.buf.set(loop_enter);
        self.buf.push("(\n");
        self.gen_expr(cond)?;
        self.buf
            .reserve(loop_exit, JMP_IF_FALSE_SIZE, Box::new(render_jmp_if_false));
        self.gen_statements(body, msgs)?;
        self.buf.reserve(loop_enter, JMP_SIZE, Box::new(render_jmp));
        self.buf.set(loop_exit);
        Ok(())
    }

    fn gen_do_while(
        &mut self,
        cond: &Expr,
        body: &[Stmt],
        msgs: &mut Vec<Msg>,
    ) -> Result<(), GenError> {
        let loop_enter = self.buf.marker("loop-enter");

        self.buf.set(loop_enter);
        self.gen_statements(body, msgs)?;
        self.buf.push("(\n");
        self.gen_expr(cond)?;
        self.buf
            .reserve(loop_enter, JMP_IF_TRUE_SIZE, Box::new(render_jmp_if_true));
        Ok(())
    }

    /// Canonical ordering: initialization once, then
    /// loop { condition; body; action }. The action block sits before the
    /// condition block in the buffer; the wiring makes the order right.
    fn gen_for(
        &mut self,
        init: Option<&Stmt>,
        cond: Option<&Expr>,
        action: Option<&Stmt>,
        body: &[Stmt],
        msgs: &mut Vec<Msg>,
    ) -> Result<(), GenError> {
        // Declarations of the initializer live through condition, action and
        // body, but not past the for.
        self.enter_scope();

        if let Some(init) = init {
            self.gen_statement(init, msgs)?;
        }

        let action_marker = self.buf.marker("for-action");
        let cond_marker = self.buf.marker("for-condition");
        let exit_marker = self.buf.marker("for-exit");

        self.buf.reserve(cond_marker, JMP_SIZE, Box::new(render_jmp));

        self.buf.set(action_marker);
        if let Some(action) = action {
            self.gen_statement(action, msgs)?;
        }

        self.buf.set(cond_marker);
        if let Some(cond) = cond {
            self.buf.push("(\n");
            self.gen_expr(cond)?;
            self.buf
                .reserve(exit_marker, JMP_IF_FALSE_SIZE, Box::new(render_jmp_if_false));
        }

        self.gen_statements(body, msgs)?;
        self.buf.reserve(action_marker, JMP_SIZE, Box::new(render_jmp));

        if cond.is_some() {
            self.buf.set(exit_marker);
        }

        self.exit_scope();
        Ok(())
    }

    fn enter_scope(&mut self) {
        self.frames.push(Frame {
            vars: Vec::new(),
            base_offset: self.stack_offset,
        });
    }

    fn exit_scope(&mut self) {
        if let Some(frame) = self.frames.pop() {
            self.stack_offset = frame.base_offset;
        }
    }

    /// Innermost-first lookup across the frame stack.
    fn lookup(&self, name: &str) -> Option<&Variable> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.vars.iter().find(|var| var.name == name))
    }

    fn declared_in_current(&self, name: &str) -> bool {
        self.frames
            .last()
            .map_or(false, |frame| frame.vars.iter().any(|var| var.name == name))
    }

    fn shadows_inherited(&self, name: &str) -> bool {
        self.frames
            .iter()
            .rev()
            .skip(1)
            .any(|frame| frame.vars.iter().any(|var| var.name == name))
    }
}
