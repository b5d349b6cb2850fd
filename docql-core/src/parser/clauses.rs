//! Clause parsing: SELECT, FROM, WHERE, ORDER BY, SKIP, LIMIT.

use crate::ast::{SelectQuery, SortDirection, SortSpec};
use crate::error::DocqlResult;
use crate::lexer::Token;
use crate::parser::Parser;

impl Parser {
    /// SELECT fields FROM entity [WHERE ...] [ORDER BY ...] [SKIP n] [LIMIT n]
    pub(crate) fn parse_select_query(&mut self) -> DocqlResult<SelectQuery> {
        self.expect(Token::Select)?;
        let fields = self.parse_field_list()?;

        self.expect(Token::From)?;
        let entity = self.parse_identifier("collection name")?;

        let condition = if matches!(self.current_token(), Token::Where) {
            self.advance();
            Some(self.parse_condition()?)
        } else {
            None
        };

        let sorts = if matches!(self.current_token(), Token::Order) {
            self.parse_order_by_clause()?
        } else {
            Vec::new()
        };

        let skip = if matches!(self.current_token(), Token::Skip) {
            self.advance();
            self.parse_count("SKIP")?
        } else {
            0
        };

        let limit = if matches!(self.current_token(), Token::Limit) {
            self.advance();
            self.parse_count("LIMIT")?
        } else {
            0
        };

        Ok(SelectQuery {
            fields,
            entity,
            condition,
            sorts,
            skip,
            limit,
        })
    }

    /// `*` or a comma-separated list of field paths; duplicates are dropped
    fn parse_field_list(&mut self) -> DocqlResult<Vec<String>> {
        if matches!(self.current_token(), Token::Star) {
            self.advance();
            return Ok(Vec::new());
        }

        let mut fields: Vec<String> = Vec::new();
        loop {
            let field = self.parse_path("field name")?;
            if !fields.contains(&field) {
                fields.push(field);
            }

            if matches!(self.current_token(), Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        Ok(fields)
    }

    /// ORDER BY field [ASC|DESC] ([,] field [ASC|DESC])*
    fn parse_order_by_clause(&mut self) -> DocqlResult<Vec<SortSpec>> {
        self.advance(); // consume ORDER
        self.expect(Token::By)?;

        let mut sorts = vec![self.parse_sort_spec()?];
        loop {
            match self.current_token() {
                Token::Comma => {
                    self.advance();
                    sorts.push(self.parse_sort_spec()?);
                }
                Token::Identifier(_) => sorts.push(self.parse_sort_spec()?),
                _ => break,
            }
        }

        Ok(sorts)
    }

    fn parse_sort_spec(&mut self) -> DocqlResult<SortSpec> {
        let field = self.parse_path("sort field")?;

        let direction = match self.current_token() {
            Token::Asc => {
                self.advance();
                SortDirection::Asc
            }
            Token::Desc => {
                self.advance();
                SortDirection::Desc
            }
            _ => SortDirection::Asc,
        };

        Ok(SortSpec { field, direction })
    }

    /// Non-negative integer argument of SKIP / LIMIT
    fn parse_count(&mut self, clause: &str) -> DocqlResult<u64> {
        match self.current_token() {
            Token::Integer(n) => {
                let n = *n as u64;
                self.advance();
                Ok(n)
            }
            Token::Minus => Err(self.error(format!("{} must not be negative", clause))),
            other => Err(self.error(format!(
                "{} expects an integer, got {:?}",
                clause, other
            ))),
        }
    }

    /// A single identifier
    pub(crate) fn parse_identifier(&mut self, what: &str) -> DocqlResult<String> {
        match self.current_token() {
            Token::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            other => Err(self.error(format!("Expected {}, got {:?}", what, other))),
        }
    }

    /// Dot-separated identifiers: `address.city`
    pub(crate) fn parse_path(&mut self, what: &str) -> DocqlResult<String> {
        let mut path = self.parse_identifier(what)?;

        while matches!(self.current_token(), Token::Dot) {
            self.advance();
            path.push('.');
            path.push_str(&self.parse_identifier(what)?);
        }

        Ok(path)
    }
}
