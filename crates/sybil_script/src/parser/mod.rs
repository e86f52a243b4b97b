//! Recursive descent parser.
//!
//! - `cursor`: token navigation and expectation helpers
//! - `expr`: expressions, by precedence from `or` down to primaries
//! - `stmt`: statements, blocks, and assignment targets

mod cursor;
mod expr;
mod stmt;

use crate::ast::{Expr, Program};
use crate::errors::ScriptResult;
use crate::lexer::{lex, Token, TokenKind};

use cursor::Cursor;

pub struct Parser {
    cursor: Cursor,
    /// Nesting of `def` bodies; `return` is only valid inside one.
    function_depth: usize,
    /// Nesting of loops within the current function; gates `break`/`continue`.
    loop_depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            function_depth: 0,
            loop_depth: 0,
        }
    }

    /// Parse a whole snippet.
    pub fn parse_program(&mut self, first_line: u32) -> ScriptResult<Program> {
        let mut body = Vec::new();
        while !self.cursor.is_at_end() {
            if self.cursor.eat(&TokenKind::Newline) {
                continue;
            }
            body.extend(self.parse_statement()?);
        }
        Ok(Program { body, first_line })
    }

    /// Parse exactly one expression spanning the whole input.
    pub fn parse_standalone_expression(&mut self) -> ScriptResult<Expr> {
        let expr = self.parse_expression_list()?;
        self.cursor.eat(&TokenKind::Newline);
        if !self.cursor.is_at_end() {
            return Err(self.cursor.unexpected("expected end of expression"));
        }
        Ok(expr)
    }
}

/// Lex and parse `source`, numbering its first line `first_line`.
pub fn parse(source: &str, first_line: u32) -> ScriptResult<Program> {
    let tokens = lex(source, first_line)?;
    Parser::new(tokens).parse_program(first_line)
}

/// Lex and parse a single expression.
pub fn parse_expression(source: &str) -> ScriptResult<Expr> {
    let tokens = lex(source.trim(), 1)?;
    Parser::new(tokens).parse_standalone_expression()
}
