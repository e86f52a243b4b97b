//! Token cursor for navigating the token stream.

use crate::errors::{syntax_error, ScriptError, ScriptResult};
use crate::lexer::{Token, TokenKind};

/// Cursor over a lexed token list. The list always ends with `Eof`, and the
/// cursor never moves past it.
pub struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor {
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut tokens = tokens;
        if !matches!(tokens.last(), Some(t) if t.kind == TokenKind::Eof) {
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(Token::new(TokenKind::Eof, line));
        }
        Cursor { tokens, pos: 0 }
    }

    // Token access

    pub fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    pub fn current_line(&self) -> u32 {
        self.current().line
    }

    /// Kind of the token after the current one.
    pub fn peek_kind(&self) -> &TokenKind {
        let index = (self.pos + 1).min(self.tokens.len() - 1);
        &self.tokens[index].kind
    }

    // Lookahead

    pub fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Check the current token's kind, ignoring any payload.
    pub fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    // Consumption

    pub fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it matches `kind`.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, kind: &TokenKind) -> ScriptResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("expected {}", kind.describe())))
        }
    }

    pub fn expect_ident(&mut self) -> ScriptResult<String> {
        if let TokenKind::Ident(name) = self.current_kind() {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.unexpected("expected a name"))
        }
    }

    /// Syntax error at the current token.
    pub fn unexpected(&self, context: &str) -> ScriptError {
        let found = self.current_kind();
        let message = match found {
            TokenKind::Indent => "unexpected indent".to_string(),
            _ => format!("invalid syntax: {context}, found {}", found.describe()),
        };
        syntax_error(message, self.current_line())
    }
}
