//! Recursive-descent arithmetic evaluator
//!
//! Grammar:
//!   expr   := term (('+' | '-') term)*
//!   term   := factor (('*' | '/') factor)*
//!   factor := number | '(' expr ')' | ('+' | '-') factor
//!
//! Only numeric literals, the four operators, and parentheses are accepted;
//! everything else is rejected at the grammar level. The input string is
//! never handed to any general-purpose evaluator.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("division by zero")]
    DivisionByZero,
}

/// Evaluate an arithmetic expression
pub fn evaluate(input: &str) -> Result<f64, ExprError> {
    let mut parser = Parser {
        chars: input.chars().collect(),
        pos: 0,
    };
    let value = parser.expr()?;
    parser.skip_whitespace();
    match parser.peek() {
        Some(c) => Err(ExprError::UnexpectedChar(c)),
        None => Ok(value),
    }
}

/// Render an evaluation result, dropping the fraction for integral values
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expr(&mut self) -> Result<f64, ExprError> {
        let mut value = self.term()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('+') => {
                    self.advance();
                    value += self.term()?;
                }
                Some('-') => {
                    self.advance();
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64, ExprError> {
        let mut value = self.factor()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('*') => {
                    self.advance();
                    value *= self.factor()?;
                }
                Some('/') => {
                    self.advance();
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        return Err(ExprError::DivisionByZero);
                    }
                    value /= divisor;
                }
                _ => return Ok(value),
            }
        }
    }

    fn factor(&mut self) -> Result<f64, ExprError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(ExprError::UnexpectedEnd),
            Some('(') => {
                self.advance();
                let value = self.expr()?;
                self.skip_whitespace();
                match self.advance() {
                    Some(')') => Ok(value),
                    Some(c) => Err(ExprError::UnexpectedChar(c)),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some('-') => {
                self.advance();
                Ok(-self.factor()?)
            }
            Some('+') => {
                self.advance();
                self.factor()
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) => Err(ExprError::UnexpectedChar(c)),
        }
    }

    fn number(&mut self) -> Result<f64, ExprError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.pos += 1;
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse::<f64>()
            .map_err(|_| ExprError::InvalidNumber(literal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(input: &str) -> f64 {
        evaluate(input).unwrap()
    }

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(eval("2 + 2"), 4.0);
        assert_eq!(eval("10 - 3"), 7.0);
        assert_eq!(eval("6 * 7"), 42.0);
        assert_eq!(eval("15 / 4"), 3.75);
    }

    #[test]
    fn test_precedence_and_parens() {
        assert_eq!(eval("2 + 3 * 4"), 14.0);
        assert_eq!(eval("(2 + 3) * 4"), 20.0);
        assert_eq!(eval("3 * (4 + 1)"), 15.0);
        assert_eq!(eval("2 * (3 + (4 - 1))"), 12.0);
    }

    #[test]
    fn test_unary_signs() {
        assert_eq!(eval("-5 + 3"), -2.0);
        assert_eq!(eval("+5"), 5.0);
        assert_eq!(eval("-(2 + 3)"), -5.0);
        assert_eq!(eval("2 - -3"), 5.0);
    }

    #[test]
    fn test_decimals() {
        assert_eq!(eval("1.5 + 2.5"), 4.0);
        assert_eq!(eval(".5 * 4"), 2.0);
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(evaluate("1 / 0"), Err(ExprError::DivisionByZero));
        assert_eq!(evaluate("5 / (2 - 2)"), Err(ExprError::DivisionByZero));
    }

    #[test]
    fn test_malformed_input() {
        assert_eq!(evaluate(""), Err(ExprError::UnexpectedEnd));
        assert_eq!(evaluate("2 +"), Err(ExprError::UnexpectedEnd));
        assert_eq!(evaluate("(1 + 2"), Err(ExprError::UnexpectedEnd));
        assert_eq!(evaluate("1 + 2)"), Err(ExprError::UnexpectedChar(')')));
        assert_eq!(evaluate("2 ^ 2"), Err(ExprError::UnexpectedChar('^')));
        assert_eq!(
            evaluate("1.2.3"),
            Err(ExprError::InvalidNumber("1.2.3".to_string()))
        );
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(4.0), "4");
        assert_eq!(format_value(3.75), "3.75");
        assert_eq!(format_value(-12.0), "-12");
    }
}
