//! Expression parser.
//!
//! A hand-written tokenizer and recursive-descent parser for the algebra
//! students write on paper: implicit multiplication (`2x`, `(x-1)(x+1)`),
//! `^` or `**` for powers, a handful of named functions and constants.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! sum     := product (('+' | '-') product)*
//! product := unary (('*' | '/') unary | power)*
//! unary   := ('+' | '-') unary | power
//! power   := primary ('^' unary)?
//! primary := number | name | func '(' sum ')' | '(' sum ')'
//! ```

use gradewise_core::config::SymbolicLimits;
use gradewise_core::error::SymbolicError;
use gradewise_core::expr::{Constant, Expr, Func};

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number(f64),
    Name(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

fn parse_error(offset: usize, message: impl Into<String>) -> SymbolicError {
    SymbolicError::Parse {
        offset,
        message: message.into(),
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, SymbolicError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        let kind = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '0'..='9' | '.' => {
                let end = number_end(input, offset);
                let text = &input[offset..end];
                if input[end..].starts_with('.') {
                    return Err(parse_error(end, "unexpected '.'"));
                }
                let value = text
                    .parse::<f64>()
                    .map_err(|_| parse_error(offset, format!("invalid number {text:?}")))?;
                while chars.peek().is_some_and(|&(i, _)| i < end) {
                    chars.next();
                }
                tokens.push(Token {
                    kind: TokenKind::Number(value),
                    offset,
                });
                continue;
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut end = offset;
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        end = i + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Name(input[offset..end].to_string()),
                    offset,
                });
                continue;
            }
            '+' => TokenKind::Plus,
            '-' | '−' => TokenKind::Minus,
            '*' | '×' | '·' => {
                chars.next();
                if c == '*' && chars.peek().is_some_and(|&(_, next)| next == '*') {
                    chars.next();
                    tokens.push(Token {
                        kind: TokenKind::Caret,
                        offset,
                    });
                } else {
                    tokens.push(Token {
                        kind: TokenKind::Star,
                        offset,
                    });
                }
                continue;
            }
            '/' | '÷' => TokenKind::Slash,
            '^' => TokenKind::Caret,
            '(' | '[' => TokenKind::LParen,
            ')' | ']' => TokenKind::RParen,
            '=' => return Err(parse_error(offset, "equations are not expressions")),
            other => return Err(parse_error(offset, format!("unexpected character {other:?}"))),
        };
        chars.next();
        tokens.push(Token { kind, offset });
    }

    Ok(tokens)
}

/// End of the numeric literal starting at `start`: digits, one decimal
/// point, and an optional exponent that is only consumed when well formed.
fn number_end(input: &str, start: usize) -> usize {
    let bytes = input.as_bytes();
    let mut i = start;
    let mut seen_dot = false;
    while i < bytes.len() {
        match bytes[i] {
            b'0'..=b'9' => i += 1,
            b'.' if !seen_dot => {
                seen_dot = true;
                i += 1;
            }
            _ => break,
        }
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let digits_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        // `2e` is 2 times the constant e.
        if j > digits_start {
            i = j;
        }
    }
    i
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    limits: SymbolicLimits,
    input_len: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.input_len, |t| t.offset)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn descend(&mut self) -> Result<(), SymbolicError> {
        self.depth += 1;
        if self.depth > self.limits.max_depth {
            return Err(SymbolicError::BudgetExceeded(format!(
                "expression nested deeper than {}",
                self.limits.max_depth
            )));
        }
        Ok(())
    }

    fn sum(&mut self) -> Result<Expr, SymbolicError> {
        let mut lhs = self.product()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Plus) => Expr::Add,
                Some(TokenKind::Minus) => Expr::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.product()?;
            lhs = op(Box::new(lhs), Box::new(rhs));
        }
    }

    fn product(&mut self) -> Result<Expr, SymbolicError> {
        let mut lhs = self.unary()?;
        loop {
            lhs = match self.peek() {
                Some(TokenKind::Star) => {
                    self.advance();
                    Expr::Mul(Box::new(lhs), Box::new(self.unary()?))
                }
                Some(TokenKind::Slash) => {
                    self.advance();
                    Expr::Div(Box::new(lhs), Box::new(self.unary()?))
                }
                // Implicit multiplication.
                Some(TokenKind::Number(_) | TokenKind::Name(_) | TokenKind::LParen) => {
                    Expr::Mul(Box::new(lhs), Box::new(self.power()?))
                }
                _ => return Ok(lhs),
            };
        }
    }

    fn unary(&mut self) -> Result<Expr, SymbolicError> {
        match self.peek() {
            Some(TokenKind::Minus) => {
                self.advance();
                self.descend()?;
                let inner = self.unary()?;
                self.depth -= 1;
                Ok(Expr::Neg(Box::new(inner)))
            }
            Some(TokenKind::Plus) => {
                self.advance();
                self.descend()?;
                let inner = self.unary()?;
                self.depth -= 1;
                Ok(inner)
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr, SymbolicError> {
        let base = self.primary()?;
        if self.peek() != Some(&TokenKind::Caret) {
            return Ok(base);
        }
        self.advance();
        self.descend()?;
        let exponent = self.unary()?;
        self.depth -= 1;
        Ok(Expr::Pow(Box::new(base), Box::new(exponent)))
    }

    fn parenthesized(&mut self) -> Result<Expr, SymbolicError> {
        let open = self.offset();
        match self.advance() {
            Some(Token {
                kind: TokenKind::LParen,
                ..
            }) => {}
            _ => return Err(parse_error(open, "expected '('")),
        }
        self.descend()?;
        let inner = self.sum()?;
        self.depth -= 1;
        match self.advance() {
            Some(Token {
                kind: TokenKind::RParen,
                ..
            }) => Ok(inner),
            _ => Err(parse_error(open, "unclosed '('")),
        }
    }

    fn primary(&mut self) -> Result<Expr, SymbolicError> {
        let offset = self.offset();
        match self.peek().cloned() {
            Some(TokenKind::Number(value)) => {
                self.advance();
                Ok(Expr::Num(value))
            }
            Some(TokenKind::Name(name)) => {
                self.advance();
                if let Some(func) = Func::lookup(&name) {
                    if self.peek() != Some(&TokenKind::LParen) {
                        return Err(parse_error(
                            offset,
                            format!("{name} needs a parenthesized argument"),
                        ));
                    }
                    let arg = self.parenthesized()?;
                    Ok(Expr::Call(func, Box::new(arg)))
                } else if let Some(constant) = Constant::lookup(&name) {
                    Ok(Expr::Const(constant))
                } else {
                    Ok(Expr::Sym(name))
                }
            }
            Some(TokenKind::LParen) => self.parenthesized(),
            Some(TokenKind::RParen) => Err(parse_error(offset, "unexpected ')'")),
            Some(_) => Err(parse_error(offset, "expected a number, name, or '('")),
            None => Err(parse_error(offset, "unexpected end of input")),
        }
    }
}

/// Parse `input` into an expression, enforcing the length and depth limits.
pub fn parse_expression(input: &str, limits: &SymbolicLimits) -> Result<Expr, SymbolicError> {
    if input.len() > limits.max_input_len {
        return Err(SymbolicError::BudgetExceeded(format!(
            "input longer than {} bytes",
            limits.max_input_len
        )));
    }

    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(parse_error(0, "empty expression"));
    }

    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        depth: 0,
        limits: *limits,
        input_len: input.len(),
    };
    let expr = parser.sum()?;
    if parser.pos < tokens.len() {
        let offset = parser.offset();
        return Err(parse_error(offset, "unexpected trailing input"));
    }
    Ok(expr)
}
