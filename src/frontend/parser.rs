//! Recursive-descent parser. Builds nodes directly into the compiler's
//! pool and declares symbols directly into its table as it goes, the way
//! a single-pass parser naturally would — there is no separate AST stage
//! that gets lowered afterward.

use super::lexer::{Token, TokenKind};
use crate::compiler::Compiler;
use crate::error::CompileError;
use crate::node::{
    Asgn, Call, Condition, FncDecl, Iteration, Jump, JumpKind, NodeId, NodeKind, Opcode, Payload,
    VarDecl,
};
use crate::symbol::{Qualifier, SymbolId};

pub struct Parser<'a> {
    compiler: &'a mut Compiler,
    path: String,
    tokens: Vec<Token>,
    pos: usize,
    level: u32,
    current_function: Option<SymbolId>,
}

impl<'a> Parser<'a> {
    pub fn new(compiler: &'a mut Compiler, path: &str, tokens: Vec<Token>) -> Self {
        Parser {
            compiler,
            path: path.to_owned(),
            tokens,
            pos: 0,
            level: 0,
            current_function: None,
        }
    }

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn line(&self) -> u32 {
        self.tokens[self.pos].line
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.tokens[self.pos].kind.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::Syntax {
            path: self.path.clone(),
            line: self.line(),
            message: message.into(),
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<(), CompileError> {
        if std::mem::discriminant(self.peek()) == std::mem::discriminant(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected {}", what)))
        }
    }

    fn expect_ident(&mut self) -> Result<String, CompileError> {
        match self.advance() {
            TokenKind::Ident(name) => Ok(name),
            _ => Err(self.error("expected identifier")),
        }
    }

    // --- node construction helpers ---------------------------------------

    fn node(&mut self, kind: NodeKind, payload: Payload) -> NodeId {
        self.compiler.pool.add_node(kind, payload)
    }

    fn set_children(&mut self, id: NodeId, left: Option<NodeId>, right: Option<NodeId>) {
        let node = self.compiler.pool.get_mut(id);
        node.left = left;
        node.right = right;
    }

    fn chain(&mut self, stmts: Vec<NodeId>) -> Option<NodeId> {
        for pair in stmts.windows(2) {
            self.compiler.pool.get_mut(pair[0]).right = Some(pair[1]);
        }
        stmts.first().copied()
    }

    // --- grammar ----------------------------------------------------------

    pub fn parse_program(mut self) -> Result<(), CompileError> {
        let mut top_level = Vec::new();
        while *self.peek() != TokenKind::Eof {
            top_level.push(self.parse_top_level_decl()?);
        }
        self.compiler.root = self.chain(top_level);
        Ok(())
    }

    fn parse_top_level_decl(&mut self) -> Result<NodeId, CompileError> {
        match self.peek() {
            TokenKind::KwFn => self.parse_fnc_decl(),
            TokenKind::KwVar => self.parse_global_var_decl(),
            _ => Err(self.error("expected 'fn' or 'var' at top level")),
        }
    }

    fn parse_global_var_decl(&mut self) -> Result<NodeId, CompileError> {
        self.advance(); // 'var'
        let name = self.expect_ident()?;
        if self.compiler.symbols.find_var(&name).is_some() {
            let line = self.line();
            return Err(CompileError::Redeclared { name, line });
        }
        let symbol = self.compiler.symbols.put_var(&name, Qualifier::Global, self.level, None);
        let init = if *self.peek() == TokenKind::Assign {
            self.advance();
            self.parse_expr()?
        } else {
            self.node(NodeKind::Const, Payload::Const { value: 0 })
        };
        self.expect(&TokenKind::Semi, "';' after variable declaration")?;
        let id = self.node(NodeKind::VarDecl, Payload::VarDecl(VarDecl { symbol, init }));
        self.set_children(id, None, None);
        Ok(id)
    }

    fn parse_fnc_decl(&mut self) -> Result<NodeId, CompileError> {
        self.advance(); // 'fn'
        let name = self.expect_ident()?;
        if self.compiler.symbols.find_fnc(&name).is_some() {
            let line = self.line();
            return Err(CompileError::Redeclared { name, line });
        }
        let symbol = self.compiler.symbols.put_fnc(&name);

        self.expect(&TokenKind::LParen, "'(' after function name")?;
        let mut params = Vec::new();
        if *self.peek() != TokenKind::RParen {
            loop {
                let param_name = self.expect_ident()?;
                let param_symbol =
                    self.compiler
                        .symbols
                        .put_var(&param_name, Qualifier::Parameter, self.level + 1, Some(symbol));
                params.push(param_symbol);
                if *self.peek() == TokenKind::Comma {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect(&TokenKind::RParen, "')' after parameter list")?;

        let nparam = params.len() as u32;
        if let Some(fnc) = self.compiler.symbols.get_mut(symbol).as_fnc_mut() {
            fnc.nparam = nparam;
            fnc.params = params;
        }

        let previous_function = self.current_function.replace(symbol);
        self.level += 1;
        let body = self.parse_block()?;
        self.level -= 1;
        self.compiler.symbols.delete_level(self.level + 1);
        self.current_function = previous_function;

        let all_vars: Vec<SymbolId> = self.compiler.symbols.variables().collect();
        let nauto = all_vars
            .iter()
            .filter(|&&v| {
                let var = self.compiler.symbols.get(v).as_var().unwrap();
                var.owner == Some(symbol) && var.qualifier == Qualifier::Auto
            })
            .count() as u32;
        if let Some(fnc) = self.compiler.symbols.get_mut(symbol).as_fnc_mut() {
            fnc.nauto = nauto;
            fnc.entry_point = Some(body);
        }

        let id = self.node(NodeKind::FncDecl, Payload::FncDecl(FncDecl { symbol, body }));
        self.set_children(id, None, None);
        Ok(id)
    }

    fn parse_block(&mut self) -> Result<NodeId, CompileError> {
        self.expect(&TokenKind::LBrace, "'{' to start a block")?;
        let mut stmts = Vec::new();
        while *self.peek() != TokenKind::RBrace {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(&TokenKind::RBrace, "'}' to end a block")?;
        let head = self.chain(stmts);
        let id = self.node(NodeKind::Compound, Payload::Single { child: head });
        self.set_children(id, None, None);
        Ok(id)
    }

    fn parse_stmt(&mut self) -> Result<NodeId, CompileError> {
        match self.peek() {
            TokenKind::KwAuto => self.parse_auto_decl(),
            TokenKind::KwIf => self.parse_if(),
            TokenKind::KwWhile => self.parse_while(),
            TokenKind::KwReturn => self.parse_return(),
            TokenKind::KwPrint => self.parse_print(),
            TokenKind::KwBreak => self.parse_jump(JumpKind::Break),
            TokenKind::KwContinue => self.parse_jump(JumpKind::Continue),
            TokenKind::LBrace => self.parse_block(),
            _ => self.parse_expr_stmt(),
        }
    }

    fn parse_auto_decl(&mut self) -> Result<NodeId, CompileError> {
        self.advance(); // 'auto'
        let name = self.expect_ident()?;
        let owner = self.current_function;
        let symbol = self.compiler.symbols.put_var(&name, Qualifier::Auto, self.level, owner);
        let init = if *self.peek() == TokenKind::Assign {
            self.advance();
            self.parse_expr()?
        } else {
            self.node(NodeKind::Const, Payload::Const { value: 0 })
        };
        self.expect(&TokenKind::Semi, "';' after variable declaration")?;
        let id = self.node(NodeKind::VarDecl, Payload::VarDecl(VarDecl { symbol, init }));
        self.set_children(id, None, None);
        Ok(id)
    }

    fn parse_if(&mut self) -> Result<NodeId, CompileError> {
        self.advance(); // 'if'
        self.expect(&TokenKind::LParen, "'(' after 'if'")?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen, "')' after condition")?;
        let then_branch = self.parse_stmt()?;
        let else_branch = if *self.peek() == TokenKind::KwElse {
            self.advance();
            Some(self.parse_stmt()?)
        } else {
            None
        };
        let id = self.node(
            NodeKind::Condition,
            Payload::Condition(Condition {
                cond,
                then_branch,
                else_branch,
            }),
        );
        self.set_children(id, None, None);
        Ok(id)
    }

    fn parse_while(&mut self) -> Result<NodeId, CompileError> {
        self.advance(); // 'while'
        self.expect(&TokenKind::LParen, "'(' after 'while'")?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen, "')' after condition")?;
        let body = self.parse_stmt()?;
        let id = self.node(NodeKind::Iteration, Payload::Iteration(Iteration { cond, body }));
        self.set_children(id, None, None);
        Ok(id)
    }

    fn parse_return(&mut self) -> Result<NodeId, CompileError> {
        self.advance(); // 'return'
        let expr = if *self.peek() != TokenKind::Semi {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(&TokenKind::Semi, "';' after return statement")?;
        let id = self.node(NodeKind::Return, Payload::Single { child: expr });
        self.set_children(id, None, None);
        Ok(id)
    }

    fn parse_print(&mut self) -> Result<NodeId, CompileError> {
        self.advance(); // 'print'
        let expr = self.parse_expr()?;
        self.expect(&TokenKind::Semi, "';' after print statement")?;
        let id = self.node(NodeKind::Print, Payload::Single { child: Some(expr) });
        self.set_children(id, None, None);
        Ok(id)
    }

    fn parse_jump(&mut self, kind: JumpKind) -> Result<NodeId, CompileError> {
        self.advance();
        self.expect(&TokenKind::Semi, "';' after jump statement")?;
        let id = self.node(NodeKind::Jump, Payload::Jump(Jump { kind, level: self.level }));
        self.set_children(id, None, None);
        Ok(id)
    }

    fn parse_expr_stmt(&mut self) -> Result<NodeId, CompileError> {
        // Assignment is the only statement-level expression form besides a
        // bare call; both are wrapped the same way.
        if let TokenKind::Ident(name) = self.peek().clone() {
            if matches!(self.tokens.get(self.pos + 1).map(|t| &t.kind), Some(TokenKind::Assign)) {
                self.advance(); // ident
                self.advance(); // '='
                let symbol = self.resolve_var(&name)?;
                let expr = self.parse_expr()?;
                self.expect(&TokenKind::Semi, "';' after assignment")?;
                let id = self.node(NodeKind::Asgn, Payload::Asgn(Asgn { symbol, expr }));
                self.set_children(id, None, None);
                return Ok(id);
            }
        }
        let expr = self.parse_expr()?;
        self.expect(&TokenKind::Semi, "';' after expression statement")?;
        let id = self.node(NodeKind::Expr, Payload::Single { child: Some(expr) });
        self.set_children(id, None, None);
        Ok(id)
    }

    fn resolve_var(&mut self, name: &str) -> Result<SymbolId, CompileError> {
        self.compiler.symbols.find_var(name).ok_or_else(|| CompileError::UndeclaredIdentifier {
            name: name.to_owned(),
            line: self.line(),
        })
    }

    fn parse_expr(&mut self) -> Result<NodeId, CompileError> {
        self.parse_logic_or()
    }

    fn parse_logic_or(&mut self) -> Result<NodeId, CompileError> {
        let mut left = self.parse_logic_and()?;
        while *self.peek() == TokenKind::OrOr {
            self.advance();
            let right = self.parse_logic_and()?;
            left = self.binop(Opcode::Or, left, right);
        }
        Ok(left)
    }

    fn parse_logic_and(&mut self) -> Result<NodeId, CompileError> {
        let mut left = self.parse_equality()?;
        while *self.peek() == TokenKind::AndAnd {
            self.advance();
            let right = self.parse_equality()?;
            left = self.binop(Opcode::And, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<NodeId, CompileError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek() {
                TokenKind::EqEq => Opcode::Eq,
                TokenKind::NotEq => Opcode::Ne,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = self.binop(op, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<NodeId, CompileError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                TokenKind::Lt => Opcode::Lt,
                TokenKind::Gt => Opcode::Gt,
                TokenKind::Le => Opcode::Le,
                TokenKind::Ge => Opcode::Ge,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = self.binop(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<NodeId, CompileError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => Opcode::Add,
                TokenKind::Minus => Opcode::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = self.binop(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<NodeId, CompileError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => Opcode::Mul,
                TokenKind::Slash => Opcode::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = self.binop(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<NodeId, CompileError> {
        let op = match self.peek() {
            TokenKind::Minus => Some(Opcode::Neg),
            TokenKind::Bang => Some(Opcode::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            let id = self.node(NodeKind::Unop, Payload::Unop { op });
            self.set_children(id, Some(operand), None);
            return Ok(id);
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<NodeId, CompileError> {
        match self.peek().clone() {
            TokenKind::Number(value) => {
                self.advance();
                let id = self.node(NodeKind::Const, Payload::Const { value });
                Ok(id)
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(&TokenKind::RParen, "')' to close expression")?;
                Ok(expr)
            }
            TokenKind::Ident(name) => {
                self.advance();
                if *self.peek() == TokenKind::LParen {
                    self.advance();
                    let mut args = Vec::new();
                    if *self.peek() != TokenKind::RParen {
                        loop {
                            args.push(self.parse_expr()?);
                            if *self.peek() == TokenKind::Comma {
                                self.advance();
                                continue;
                            }
                            break;
                        }
                    }
                    self.expect(&TokenKind::RParen, "')' after call arguments")?;
                    let symbol = self.compiler.symbols.find_fnc(&name).ok_or_else(|| {
                        CompileError::UndeclaredIdentifier {
                            name: name.clone(),
                            line: self.line(),
                        }
                    })?;
                    let id = self.node(NodeKind::Call, Payload::Call(Call { symbol, args }));
                    self.set_children(id, None, None);
                    Ok(id)
                } else {
                    let symbol = self.resolve_var(&name)?;
                    let id = self.node(NodeKind::Var, Payload::Var { symbol });
                    Ok(id)
                }
            }
            _ => Err(self.error("expected an expression")),
        }
    }

    fn binop(&mut self, op: Opcode, left: NodeId, right: NodeId) -> NodeId {
        let id = self.node(NodeKind::Binop, Payload::Binop { op });
        self.set_children(id, Some(left), Some(right));
        id
    }
}
