//! Small arithmetic evaluator.
//!
//! Supports decimal literals, `+ - * / %`, `**` or `^` for powers, unary
//! signs and parentheses. Results must be finite.

use thiserror::Error;

const MAX_DEPTH: usize = 64;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum EvaluationError {
    #[error("expression is empty")]
    Empty,
    #[error("unexpected character `{0}`")]
    UnexpectedChar(char),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected token at position {0}")]
    UnexpectedToken(usize),
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
    #[error("expression is nested too deeply")]
    TooDeep,
    #[error("result is not a finite number")]
    NonFinite,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Power,
    Open,
    Close,
}

/// Evaluate an arithmetic expression.
pub fn evaluate(expression: &str) -> Result<f64, EvaluationError> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(EvaluationError::Empty);
    }

    let mut parser = Parser {
        tokens: &tokens,
        position: 0,
        depth: 0,
    };
    let value = parser.expression()?;

    if parser.position != tokens.len() {
        return Err(EvaluationError::UnexpectedToken(parser.position));
    }

    if !value.is_finite() {
        return Err(EvaluationError::NonFinite);
    }

    Ok(value)
}

/// Render a result the way people expect to read it (`4`, not `4.0`).
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn tokenize(expression: &str) -> Result<Vec<Token>, EvaluationError> {
    let mut tokens = Vec::new();
    let mut chars = expression.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        let token = match ch {
            c if c.is_whitespace() => continue,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' if chars.next_if(|(_, next)| *next == '*').is_some() => Token::Power,
            '*' | '×' => Token::Star,
            '/' | '÷' => Token::Slash,
            '%' => Token::Percent,
            '^' => Token::Power,
            '(' => Token::Open,
            ')' => Token::Close,
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = start + c.len_utf8();
                while let Some((index, next)) =
                    chars.next_if(|(_, next)| next.is_ascii_digit() || *next == '.')
                {
                    end = index + next.len_utf8();
                }

                let raw = &expression[start..end];
                let value = raw
                    .parse::<f64>()
                    .map_err(|_| EvaluationError::InvalidNumber(raw.to_owned()))?;
                Token::Number(value)
            }
            other => return Err(EvaluationError::UnexpectedChar(other)),
        };

        tokens.push(token);
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    position: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        self.position += usize::from(token.is_some());
        token
    }

    fn descend(&mut self) -> Result<(), EvaluationError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvaluationError::TooDeep);
        }
        Ok(())
    }

    fn expression(&mut self) -> Result<f64, EvaluationError> {
        let mut value = self.term()?;

        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.position += 1;
            let rhs = self.term()?;
            value = if op == Token::Plus { value + rhs } else { value - rhs };
        }

        Ok(value)
    }

    fn term(&mut self) -> Result<f64, EvaluationError> {
        let mut value = self.unary()?;

        while let Some(op @ (Token::Star | Token::Slash | Token::Percent)) = self.peek() {
            self.position += 1;
            let rhs = self.unary()?;
            value = match op {
                Token::Star => value * rhs,
                Token::Slash => value / rhs,
                _ => value % rhs,
            };
        }

        Ok(value)
    }

    fn unary(&mut self) -> Result<f64, EvaluationError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.position += 1;
                self.descend()?;
                let value = self.unary();
                self.depth -= 1;
                Ok(-value?)
            }
            Some(Token::Plus) => {
                self.position += 1;
                self.descend()?;
                let value = self.unary();
                self.depth -= 1;
                value
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<f64, EvaluationError> {
        let base = self.primary()?;

        if self.peek() == Some(Token::Power) {
            self.position += 1;
            self.descend()?;
            let exponent = self.unary();
            self.depth -= 1;
            return Ok(base.powf(exponent?));
        }

        Ok(base)
    }

    fn primary(&mut self) -> Result<f64, EvaluationError> {
        let position = self.position;

        match self.advance() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::Open) => {
                self.descend()?;
                let value = self.expression()?;
                self.depth -= 1;

                match self.advance() {
                    Some(Token::Close) => Ok(value),
                    Some(_) => Err(EvaluationError::UnexpectedToken(self.position - 1)),
                    None => Err(EvaluationError::UnexpectedEnd),
                }
            }
            Some(_) => Err(EvaluationError::UnexpectedToken(position)),
            None => Err(EvaluationError::UnexpectedEnd),
        }
    }
}
