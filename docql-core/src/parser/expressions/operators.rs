//! Predicate operator parsing for docql.
//!
//! Handles operators:
//! - Comparison: `=`, `>`, `>=`, `<`, `<=`
//! - Membership: `IN` (list or parameter operand)
//! - Pattern matching: `LIKE`
//! - Range: `BETWEEN a AND b` or `BETWEEN [a, b]`

use crate::ast::{Operator, Value};
use crate::error::DocqlResult;
use crate::lexer::Token;
use crate::parser::Parser;

impl Parser {
    pub(super) fn parse_condition_operator(&mut self) -> DocqlResult<Operator> {
        let operator = match self.current_token() {
            Token::Equal => Operator::Equals,
            Token::GreaterThan => Operator::GreaterThan,
            Token::GreaterThanEq => Operator::GreaterEqualsThan,
            Token::LessThan => Operator::LesserThan,
            Token::LessThanEq => Operator::LesserEqualsThan,
            Token::In => Operator::In,
            Token::Like => Operator::Like,
            Token::Between => Operator::Between,
            other => {
                return Err(self.error(format!("Expected an operator, got {:?}", other)));
            }
        };

        self.advance();
        Ok(operator)
    }

    /// Parse the right-hand side of a predicate according to its operator.
    pub(super) fn parse_operand(&mut self, operator: Operator) -> DocqlResult<Value> {
        match operator {
            Operator::In => self.parse_in_operand(),
            Operator::Between => self.parse_between_operand(),
            _ => self.parse_value(),
        }
    }

    fn parse_in_operand(&mut self) -> DocqlResult<Value> {
        match self.current_token() {
            Token::LeftBracket | Token::LeftParen | Token::BindVar(_) => self.parse_value(),
            other => Err(self.error(format!(
                "IN expects a list or a parameter, got {:?}",
                other
            ))),
        }
    }

    /// Always yields a two-element array
    fn parse_between_operand(&mut self) -> DocqlResult<Value> {
        let start = self.current_offset();

        if matches!(self.current_token(), Token::LeftBracket | Token::LeftParen) {
            return match self.parse_value()? {
                Value::Array(items) if items.len() == 2 => Ok(Value::Array(items)),
                Value::Array(items) => Err(self.error_at(
                    format!("BETWEEN expects exactly two values, got {}", items.len()),
                    start,
                )),
                _ => Err(self.error_at("BETWEEN expects exactly two values", start)),
            };
        }

        let low = self.parse_value()?;
        if !matches!(self.current_token(), Token::And) {
            return Err(self.error(format!(
                "Expected AND in BETWEEN, got {:?}",
                self.current_token()
            )));
        }
        self.advance(); // consume AND
        let high = self.parse_value()?;

        Ok(Value::Array(vec![low, high]))
    }
}
