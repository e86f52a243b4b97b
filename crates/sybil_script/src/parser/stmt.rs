//! Statement parsing.

use std::rc::Rc;

use super::expr::starts_expression;
use super::Parser;
use crate::ast::{BinaryOp, Expr, FunctionDef, Param, Stmt, StmtKind, Target};
use crate::errors::{syntax_error, ScriptResult};
use crate::lexer::TokenKind;

impl Parser {
    /// One logical line of simple statements, or one compound statement.
    pub(super) fn parse_statement(&mut self) -> ScriptResult<Vec<Stmt>> {
        match self.cursor.current_kind() {
            TokenKind::If => Ok(vec![self.parse_if()?]),
            TokenKind::While => Ok(vec![self.parse_while()?]),
            TokenKind::For => Ok(vec![self.parse_for()?]),
            TokenKind::Def => Ok(vec![self.parse_def()?]),
            _ => self.parse_simple_line(),
        }
    }

    fn parse_simple_line(&mut self) -> ScriptResult<Vec<Stmt>> {
        let mut stmts = vec![self.parse_simple()?];
        while self.cursor.eat(&TokenKind::Semicolon) {
            if self.cursor.check(&TokenKind::Newline) || self.cursor.is_at_end() {
                break;
            }
            stmts.push(self.parse_simple()?);
        }
        if !self.cursor.is_at_end() {
            self.cursor.expect(&TokenKind::Newline)?;
        }
        Ok(stmts)
    }

    /// `:` followed by either an indented suite or simple statements on the
    /// same line.
    fn parse_block(&mut self) -> ScriptResult<Vec<Stmt>> {
        self.cursor.expect(&TokenKind::Colon)?;
        if !self.cursor.eat(&TokenKind::Newline) {
            return self.parse_simple_line();
        }
        if !self.cursor.eat(&TokenKind::Indent) {
            return Err(syntax_error(
                "expected an indented block",
                self.cursor.current_line(),
            ));
        }
        let mut body = Vec::new();
        while !self.cursor.eat(&TokenKind::Dedent) {
            if self.cursor.is_at_end() {
                break;
            }
            if self.cursor.eat(&TokenKind::Newline) {
                continue;
            }
            body.extend(self.parse_statement()?);
        }
        Ok(body)
    }

    fn parse_simple(&mut self) -> ScriptResult<Stmt> {
        let line = self.cursor.current_line();
        let kind = match self.cursor.current_kind() {
            TokenKind::Pass => {
                self.cursor.advance();
                StmtKind::Pass
            }
            TokenKind::Break | TokenKind::Continue => {
                let token = self.cursor.advance();
                let is_break = token.kind == TokenKind::Break;
                if self.loop_depth == 0 {
                    let keyword = if is_break { "break" } else { "continue" };
                    return Err(syntax_error(format!("'{keyword}' outside loop"), line));
                }
                if is_break {
                    StmtKind::Break
                } else {
                    StmtKind::Continue
                }
            }
            TokenKind::Return => {
                self.cursor.advance();
                if self.function_depth == 0 {
                    return Err(syntax_error("'return' outside function", line));
                }
                let value = if starts_expression(self.cursor.current_kind()) {
                    Some(self.parse_expression_list()?)
                } else {
                    None
                };
                StmtKind::Return(value)
            }
            TokenKind::Raise => {
                self.cursor.advance();
                let value = if starts_expression(self.cursor.current_kind()) {
                    Some(self.parse_expression()?)
                } else {
                    None
                };
                StmtKind::Raise(value)
            }
            TokenKind::Assert => {
                self.cursor.advance();
                let test = self.parse_expression()?;
                let message = if self.cursor.eat(&TokenKind::Comma) {
                    Some(self.parse_expression()?)
                } else {
                    None
                };
                StmtKind::Assert { test, message }
            }
            TokenKind::Del => {
                self.cursor.advance();
                StmtKind::Del(self.parse_target_list()?)
            }
            _ => self.parse_expression_statement()?,
        };
        Ok(Stmt { kind, line })
    }

    fn parse_expression_statement(&mut self) -> ScriptResult<StmtKind> {
        let line = self.cursor.current_line();
        let first = self.parse_expression_list()?;

        let aug_op = match self.cursor.current_kind() {
            TokenKind::PlusEq => Some(BinaryOp::Add),
            TokenKind::MinusEq => Some(BinaryOp::Sub),
            TokenKind::StarEq => Some(BinaryOp::Mul),
            TokenKind::SlashEq => Some(BinaryOp::Div),
            _ => None,
        };
        if let Some(op) = aug_op {
            self.cursor.advance();
            let target = expr_to_target(first, line)?;
            if matches!(target, Target::Tuple(_)) {
                return Err(syntax_error(
                    "illegal expression for augmented assignment",
                    line,
                ));
            }
            let value = self.parse_expression_list()?;
            return Ok(StmtKind::AugAssign { target, op, value });
        }

        if !self.cursor.check(&TokenKind::Eq) {
            return Ok(StmtKind::Expr(first));
        }

        let mut exprs = vec![first];
        while self.cursor.eat(&TokenKind::Eq) {
            exprs.push(self.parse_expression_list()?);
        }
        let value = exprs.pop().unwrap_or(Expr::Tuple(Vec::new()));
        let targets = exprs
            .into_iter()
            .map(|expr| expr_to_target(expr, line))
            .collect::<ScriptResult<Vec<_>>>()?;
        Ok(StmtKind::Assign { targets, value })
    }

    /// Comma-separated assignment targets, as used by `for` and `del`.
    /// Parsed at postfix level so the `in` of a `for` is not swallowed.
    fn parse_target_list(&mut self) -> ScriptResult<Vec<Target>> {
        let line = self.cursor.current_line();
        let mut targets = vec![expr_to_target(self.parse_postfix()?, line)?];
        while self.cursor.eat(&TokenKind::Comma) {
            if !starts_expression(self.cursor.current_kind()) {
                break;
            }
            targets.push(expr_to_target(self.parse_postfix()?, line)?);
        }
        Ok(targets)
    }

    fn parse_if(&mut self) -> ScriptResult<Stmt> {
        let line = self.cursor.current_line();
        self.cursor.expect(&TokenKind::If)?;
        let mut branches = Vec::new();
        let test = self.parse_expression()?;
        branches.push((test, self.parse_block()?));
        let mut orelse = Vec::new();
        loop {
            if self.cursor.eat(&TokenKind::Elif) {
                let test = self.parse_expression()?;
                branches.push((test, self.parse_block()?));
            } else {
                if self.cursor.eat(&TokenKind::Else) {
                    orelse = self.parse_block()?;
                }
                break;
            }
        }
        Ok(Stmt {
            kind: StmtKind::If { branches, orelse },
            line,
        })
    }

    fn parse_while(&mut self) -> ScriptResult<Stmt> {
        let line = self.cursor.current_line();
        self.cursor.expect(&TokenKind::While)?;
        let test = self.parse_expression()?;
        let body = self.parse_loop_body()?;
        Ok(Stmt {
            kind: StmtKind::While { test, body },
            line,
        })
    }

    fn parse_for(&mut self) -> ScriptResult<Stmt> {
        let line = self.cursor.current_line();
        self.cursor.expect(&TokenKind::For)?;
        let mut targets = self.parse_target_list()?;
        let target = if targets.len() == 1 {
            targets.remove(0)
        } else {
            Target::Tuple(targets)
        };
        self.cursor.expect(&TokenKind::In)?;
        let iter = self.parse_expression_list()?;
        let body = self.parse_loop_body()?;
        Ok(Stmt {
            kind: StmtKind::For { target, iter, body },
            line,
        })
    }

    fn parse_loop_body(&mut self) -> ScriptResult<Vec<Stmt>> {
        self.loop_depth += 1;
        let body = self.parse_block();
        self.loop_depth -= 1;
        body
    }

    fn parse_def(&mut self) -> ScriptResult<Stmt> {
        let line = self.cursor.current_line();
        self.cursor.expect(&TokenKind::Def)?;
        let name = self.cursor.expect_ident()?;
        self.cursor.expect(&TokenKind::LParen)?;

        let mut params: Vec<Param> = Vec::new();
        while !self.cursor.check(&TokenKind::RParen) {
            let param_line = self.cursor.current_line();
            let param = self.cursor.expect_ident()?;
            if params.iter().any(|p| p.name == param) {
                return Err(syntax_error(
                    format!("duplicate argument '{param}' in function definition"),
                    param_line,
                ));
            }
            let default = if self.cursor.eat(&TokenKind::Eq) {
                Some(self.parse_expression()?)
            } else {
                if params.iter().any(|p| p.default.is_some()) {
                    return Err(syntax_error(
                        "non-default argument follows default argument",
                        param_line,
                    ));
                }
                None
            };
            params.push(Param {
                name: param,
                default,
            });
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RParen)?;

        let saved_loops = std::mem::take(&mut self.loop_depth);
        self.function_depth += 1;
        let body = self.parse_block();
        self.function_depth -= 1;
        self.loop_depth = saved_loops;

        let def = FunctionDef {
            name,
            params,
            body: body?,
            line,
        };
        Ok(Stmt {
            kind: StmtKind::FunctionDef(Rc::new(def)),
            line,
        })
    }
}

fn expr_to_target(expr: Expr, line: u32) -> ScriptResult<Target> {
    match expr {
        Expr::Name(name) => Ok(Target::Name(name)),
        Expr::Tuple(items) | Expr::List(items) => items
            .into_iter()
            .map(|item| expr_to_target(item, line))
            .collect::<ScriptResult<Vec<_>>>()
            .map(Target::Tuple),
        Expr::Index { object, index } => Ok(Target::Index {
            object: *object,
            index: *index,
        }),
        _ => Err(syntax_error("cannot assign to expression", line)),
    }
}
