//! Recursive-descent parser producing an [`Expr`] tree.
//!
//! Precedence, loosest first:
//! `or` / `||`, `and` / `&&`, `not`, comparisons (non-associative),
//! `+ -`, `* / %`, unary `- !`, then literals, signals and parentheses.

use vsm_core::Value;

use super::error::ExprError;
use super::lexer::{tokenize, Spanned, Token};
use super::{BinaryOp, Expr, UnaryOp};

/// Parse condition text into an expression tree.
pub fn parse(src: &str) -> Result<Expr, ExprError> {
    let tokens = tokenize(src)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }

    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;

    match parser.peek() {
        None => Ok(expr),
        Some(extra) => Err(ExprError::UnexpectedToken {
            expected: "end of expression",
            found: extra.token.describe(),
            offset: extra.offset,
        }),
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self) -> Option<&Token> {
        self.peek().map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek_token() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        let mut terms = vec![self.parse_and()?];
        while self.eat(&Token::Or) {
            terms.push(self.parse_and()?);
        }
        Ok(collapse(terms, Expr::Or))
    }

    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        let mut terms = vec![self.parse_not()?];
        while self.eat(&Token::And) {
            terms.push(self.parse_not()?);
        }
        Ok(collapse(terms, Expr::And))
    }

    fn parse_not(&mut self) -> Result<Expr, ExprError> {
        if self.eat(&Token::Not) {
            let inner = self.parse_not()?;
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ExprError> {
        let lhs = self.parse_additive()?;
        let Some(op) = self.peek_token().and_then(comparison_op) else {
            return Ok(lhs);
        };
        self.pos += 1;
        let rhs = self.parse_additive()?;

        if let Some(next) = self.peek() {
            if comparison_op(&next.token).is_some() {
                return Err(ExprError::UnexpectedToken {
                    expected: "`and`, `or` or `)` after a comparison",
                    found: next.token.describe(),
                    offset: next.offset,
                });
            }
        }

        Ok(Expr::Binary(op, Box::new(lhs), Box::new(rhs)))
    }

    fn parse_additive(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek_token() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.parse_term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_term(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek_token() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        let op = match self.peek_token() {
            Some(Token::Minus) => UnaryOp::Neg,
            Some(Token::Bang) => UnaryOp::Not,
            _ => return self.parse_primary(),
        };
        self.pos += 1;
        let inner = self.parse_unary()?;
        Ok(Expr::Unary(op, Box::new(inner)))
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        const EXPECTED: &str = "a value, signal or `(`";

        let Some(Spanned { token, offset }) = self.advance() else {
            return Err(ExprError::UnexpectedEnd { expected: EXPECTED });
        };

        match token {
            Token::Int(i) => Ok(Expr::Literal(Value::Int(i))),
            Token::Float(f) => Ok(Expr::Literal(Value::Float(f))),
            Token::Str(s) => Ok(Expr::Literal(Value::Text(s))),
            Token::True => Ok(Expr::Literal(Value::Int(1))),
            Token::False => Ok(Expr::Literal(Value::Int(0))),
            Token::Ident(name) => Ok(Expr::Signal(name)),
            Token::LParen => {
                let inner = self.parse_or()?;
                match self.advance() {
                    Some(Spanned {
                        token: Token::RParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(ExprError::UnexpectedToken {
                        expected: "`)`",
                        found: other.token.describe(),
                        offset: other.offset,
                    }),
                    None => Err(ExprError::UnexpectedEnd { expected: "`)`" }),
                }
            }
            other => Err(ExprError::UnexpectedToken {
                expected: EXPECTED,
                found: other.describe(),
                offset,
            }),
        }
    }
}

fn comparison_op(token: &Token) -> Option<BinaryOp> {
    match token {
        Token::EqEq => Some(BinaryOp::Eq),
        Token::NotEq => Some(BinaryOp::Ne),
        Token::Lt => Some(BinaryOp::Lt),
        Token::Le => Some(BinaryOp::Le),
        Token::Gt => Some(BinaryOp::Gt),
        Token::Ge => Some(BinaryOp::Ge),
        _ => None,
    }
}

fn collapse(mut terms: Vec<Expr>, wrap: fn(Vec<Expr>) -> Expr) -> Expr {
    if terms.len() == 1 {
        terms.remove(0)
    } else {
        wrap(terms)
    }
}
