//! Value parsing for docql.
//!
//! Handles:
//! - Literals: integers, floats (optionally negative), strings, booleans
//! - Lists: `[a, b]` or `(a, b)`
//! - Objects: `{"key": value, other: value}`
//! - Conversions: `convert(value, type.name)`
//! - Parameters: `@name`

use crate::ast::Value;
use crate::error::DocqlResult;
use crate::lexer::Token;
use crate::parser::Parser;

impl Parser {
    pub(super) fn parse_value(&mut self) -> DocqlResult<Value> {
        self.parse_value_at(0)
    }

    fn parse_value_at(&mut self, depth: usize) -> DocqlResult<Value> {
        match self.current_token() {
            Token::Integer(n) => {
                let value = Value::Integer(*n);
                self.advance();
                Ok(value)
            }
            Token::Float(f) => {
                let value = Value::Float(*f);
                self.advance();
                Ok(value)
            }
            Token::Minus => self.parse_negative_number(),
            Token::String(s) => {
                let value = Value::String(s.clone());
                self.advance();
                Ok(value)
            }
            Token::True => {
                self.advance();
                Ok(Value::Boolean(true))
            }
            Token::False => {
                self.advance();
                Ok(Value::Boolean(false))
            }
            Token::BindVar(name) => {
                let value = Value::Parameter(name.clone());
                self.advance();
                Ok(value)
            }
            Token::LeftBracket => self.parse_list(Token::RightBracket, depth),
            Token::LeftParen => self.parse_list(Token::RightParen, depth),
            Token::LeftBrace => self.parse_object(depth),
            Token::Identifier(name)
                if name.eq_ignore_ascii_case("convert")
                    && matches!(self.peek_token(1), Token::LeftParen) =>
            {
                self.parse_convert(depth)
            }
            other => Err(self.error(format!("Expected a value, got {:?}", other))),
        }
    }

    fn parse_negative_number(&mut self) -> DocqlResult<Value> {
        self.advance(); // consume '-'

        let value = match self.current_token() {
            Token::Integer(n) => Value::Integer(-n),
            Token::Float(f) => Value::Float(-f),
            other => {
                return Err(self.error(format!("Expected a number after '-', got {:?}", other)));
            }
        };

        self.advance();
        Ok(value)
    }

    pub(super) fn enter_nested(&self, depth: usize) -> DocqlResult<usize> {
        let depth = depth + 1;
        if depth > self.limits.max_value_depth {
            return Err(self.error(format!(
                "Values nested too deeply (max {})",
                self.limits.max_value_depth
            )));
        }
        Ok(depth)
    }

    /// Elements up to `close`; the opening delimiter is the current token
    fn parse_list(&mut self, close: Token, depth: usize) -> DocqlResult<Value> {
        let depth = self.enter_nested(depth)?;
        self.advance(); // consume '[' or '('

        let mut items = Vec::new();
        while self.current_token() != &close {
            items.push(self.parse_value_at(depth)?);

            if matches!(self.current_token(), Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        self.expect(close)?;
        Ok(Value::Array(items))
    }

    fn parse_object(&mut self, depth: usize) -> DocqlResult<Value> {
        let depth = self.enter_nested(depth)?;
        self.advance(); // consume '{'

        let mut fields = Vec::new();
        while !matches!(self.current_token(), Token::RightBrace) {
            let key = match self.current_token() {
                Token::String(key) | Token::Identifier(key) => key.clone(),
                other => {
                    return Err(self.error(format!("Expected object key, got {:?}", other)));
                }
            };
            self.advance();
            self.expect(Token::Colon)?;
            fields.push((key, self.parse_value_at(depth)?));

            if matches!(self.current_token(), Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        self.expect(Token::RightBrace)?;
        Ok(Value::Object(fields))
    }

    /// convert(value, type.name)
    fn parse_convert(&mut self, depth: usize) -> DocqlResult<Value> {
        let depth = self.enter_nested(depth)?;
        self.advance(); // consume 'convert'
        self.expect(Token::LeftParen)?;

        let value = self.parse_value_at(depth)?;
        self.expect(Token::Comma)?;
        let type_name = self.parse_path("conversion type")?;
        self.expect(Token::RightParen)?;

        Ok(Value::Convert {
            value: Box::new(value),
            type_name,
        })
    }
}
