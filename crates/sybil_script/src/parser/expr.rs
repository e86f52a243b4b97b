// Operator precedence parsing, lowest to highest:
// conditional < or < and < not < comparison < additive < multiplicative < unary < postfix

use super::Parser;
use crate::ast::{BinaryOp, CompareOp, Expr, Literal, UnaryOp};
use crate::errors::{syntax_error, ScriptResult};
use crate::lexer::TokenKind;

/// Whether a token can begin an expression.
pub(super) fn starts_expression(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Str(_)
            | TokenKind::Bytes(_)
            | TokenKind::Ident(_)
            | TokenKind::True
            | TokenKind::False
            | TokenKind::None
            | TokenKind::Not
            | TokenKind::Minus
            | TokenKind::Plus
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::LBrace
    )
}

impl Parser {
    /// `a, b, c` builds a tuple; a single expression without a trailing
    /// comma stays as it is.
    pub(super) fn parse_expression_list(&mut self) -> ScriptResult<Expr> {
        let first = self.parse_expression()?;
        if !self.cursor.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.cursor.eat(&TokenKind::Comma) {
            if !starts_expression(self.cursor.current_kind()) {
                break;
            }
            items.push(self.parse_expression()?);
        }
        Ok(Expr::Tuple(items))
    }

    pub(super) fn parse_expression(&mut self) -> ScriptResult<Expr> {
        let then = self.parse_or_expr()?;
        if !self.cursor.eat(&TokenKind::If) {
            return Ok(then);
        }
        let test = self.parse_or_expr()?;
        self.cursor.expect(&TokenKind::Else)?;
        let orelse = self.parse_expression()?;
        Ok(Expr::Conditional {
            test: Box::new(test),
            then: Box::new(then),
            orelse: Box::new(orelse),
        })
    }

    fn parse_or_expr(&mut self) -> ScriptResult<Expr> {
        let mut left = self.parse_and_expr()?;
        while self.cursor.eat(&TokenKind::Or) {
            let right = self.parse_and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and_expr(&mut self) -> ScriptResult<Expr> {
        let mut left = self.parse_not_expr()?;
        while self.cursor.eat(&TokenKind::And) {
            let right = self.parse_not_expr()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not_expr(&mut self) -> ScriptResult<Expr> {
        if self.cursor.eat(&TokenKind::Not) {
            let operand = self.parse_not_expr()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> ScriptResult<Expr> {
        let left = self.parse_additive()?;
        let mut links = Vec::new();
        while let Some(op) = self.match_compare_op() {
            let right = self.parse_additive()?;
            links.push((op, right));
        }
        if links.is_empty() {
            Ok(left)
        } else {
            Ok(Expr::Compare {
                left: Box::new(left),
                links,
            })
        }
    }

    /// Consume a comparison operator, including the two-token `not in`
    /// and `is not`.
    fn match_compare_op(&mut self) -> Option<CompareOp> {
        let op = match self.cursor.current_kind() {
            TokenKind::EqEq => CompareOp::Eq,
            TokenKind::NotEq => CompareOp::NotEq,
            TokenKind::Lt => CompareOp::Lt,
            TokenKind::LtEq => CompareOp::LtEq,
            TokenKind::Gt => CompareOp::Gt,
            TokenKind::GtEq => CompareOp::GtEq,
            TokenKind::In => CompareOp::In,
            TokenKind::Not if matches!(self.cursor.peek_kind(), TokenKind::In) => {
                self.cursor.advance();
                CompareOp::NotIn
            }
            TokenKind::Is => {
                if matches!(self.cursor.peek_kind(), TokenKind::Not) {
                    self.cursor.advance();
                    CompareOp::IsNot
                } else {
                    CompareOp::Is
                }
            }
            _ => return None,
        };
        self.cursor.advance();
        Some(op)
    }

    fn parse_additive(&mut self) -> ScriptResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.cursor.current_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.cursor.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ScriptResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.cursor.current_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::SlashSlash => BinaryOp::FloorDiv,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.cursor.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ScriptResult<Expr> {
        let op = match self.cursor.current_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Pos,
            _ => return self.parse_postfix(),
        };
        self.cursor.advance();
        let operand = self.parse_unary()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    /// Calls and subscripts, applied left to right.
    pub(super) fn parse_postfix(&mut self) -> ScriptResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.cursor.eat(&TokenKind::LParen) {
                let (args, keywords) = self.parse_call_args()?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                    keywords,
                };
            } else if self.cursor.eat(&TokenKind::LBracket) {
                let index = self.parse_expression_list()?;
                self.cursor.expect(&TokenKind::RBracket)?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                };
            } else {
                return Ok(expr);
            }
        }
    }

    /// Arguments after the opening parenthesis, through the closing one.
    fn parse_call_args(&mut self) -> ScriptResult<(Vec<Expr>, Vec<(String, Expr)>)> {
        let mut args = Vec::new();
        let mut keywords: Vec<(String, Expr)> = Vec::new();
        while !self.cursor.check(&TokenKind::RParen) {
            let is_keyword = matches!(self.cursor.current_kind(), TokenKind::Ident(_))
                && matches!(self.cursor.peek_kind(), TokenKind::Eq);
            if is_keyword {
                let line = self.cursor.current_line();
                let name = self.cursor.expect_ident()?;
                self.cursor.advance();
                if keywords.iter().any(|(k, _)| *k == name) {
                    return Err(syntax_error(
                        format!("keyword argument repeated: {name}"),
                        line,
                    ));
                }
                keywords.push((name, self.parse_expression()?));
            } else {
                if !keywords.is_empty() {
                    return Err(syntax_error(
                        "positional argument follows keyword argument",
                        self.cursor.current_line(),
                    ));
                }
                args.push(self.parse_expression()?);
            }
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RParen)?;
        Ok((args, keywords))
    }

    fn parse_primary(&mut self) -> ScriptResult<Expr> {
        let token = self.cursor.current().clone();
        let expr = match token.kind {
            TokenKind::Int(n) => Expr::Literal(Literal::Int(n)),
            TokenKind::Float(x) => Expr::Literal(Literal::Float(x)),
            TokenKind::True => Expr::Literal(Literal::Bool(true)),
            TokenKind::False => Expr::Literal(Literal::Bool(false)),
            TokenKind::None => Expr::Literal(Literal::None),
            TokenKind::Ident(name) => Expr::Name(name),
            TokenKind::Str(mut s) => {
                self.cursor.advance();
                // Adjacent string literals concatenate.
                while let TokenKind::Str(next) = self.cursor.current_kind() {
                    s.push_str(next);
                    self.cursor.advance();
                }
                return Ok(Expr::Literal(Literal::Str(s)));
            }
            TokenKind::Bytes(mut b) => {
                self.cursor.advance();
                while let TokenKind::Bytes(next) = self.cursor.current_kind() {
                    b.extend_from_slice(next);
                    self.cursor.advance();
                }
                return Ok(Expr::Literal(Literal::Bytes(b)));
            }
            TokenKind::LParen => {
                self.cursor.advance();
                return self.parse_parenthesized();
            }
            TokenKind::LBracket => {
                self.cursor.advance();
                let items = self.parse_sequence(&TokenKind::RBracket)?;
                return Ok(Expr::List(items));
            }
            TokenKind::LBrace => {
                self.cursor.advance();
                return self.parse_dict();
            }
            _ => return Err(self.cursor.unexpected("expected an expression")),
        };
        self.cursor.advance();
        Ok(expr)
    }

    /// After `(`: unit tuple, grouping, or tuple display.
    fn parse_parenthesized(&mut self) -> ScriptResult<Expr> {
        if self.cursor.eat(&TokenKind::RParen) {
            return Ok(Expr::Tuple(Vec::new()));
        }
        let first = self.parse_expression()?;
        if self.cursor.eat(&TokenKind::RParen) {
            return Ok(first);
        }
        self.cursor.expect(&TokenKind::Comma)?;
        let mut items = vec![first];
        items.extend(self.parse_sequence(&TokenKind::RParen)?);
        Ok(Expr::Tuple(items))
    }

    /// Comma-separated expressions through `close`, trailing comma allowed.
    fn parse_sequence(&mut self, close: &TokenKind) -> ScriptResult<Vec<Expr>> {
        let mut items = Vec::new();
        while !self.cursor.check(close) {
            items.push(self.parse_expression()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(close)?;
        Ok(items)
    }

    fn parse_dict(&mut self) -> ScriptResult<Expr> {
        let mut entries = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) {
            let key = self.parse_expression()?;
            self.cursor.expect(&TokenKind::Colon)?;
            let value = self.parse_expression()?;
            entries.push((key, value));
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RBrace)?;
        Ok(Expr::Dict(entries))
    }
}
