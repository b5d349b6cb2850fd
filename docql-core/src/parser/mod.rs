//! Parser module for the docql select language.
//!
//! Converts tokenized input into a [`SelectQuery`]. A failed parse never
//! yields a partial AST.

mod clauses;
mod expressions;
#[cfg(test)]
mod tests;

use crate::ast::SelectQuery;
use crate::error::{DocqlError, DocqlResult};
use crate::lexer::{fragment_of, Lexer, SpannedToken, Token};
use crate::limits::QueryLimits;

/// Parser for docql queries
pub struct Parser {
    pub(crate) tokens: Vec<SpannedToken>,
    pub(crate) position: usize,
    pub(crate) limits: QueryLimits,
    /// Leaf predicates seen so far, checked against `limits.max_predicates`
    pub(crate) predicates: usize,
    input: Vec<char>,
}

impl Parser {
    /// Create a new parser from an input string with default limits
    pub fn new(input: &str) -> DocqlResult<Self> {
        Self::with_limits(input, QueryLimits::default())
    }

    pub fn with_limits(input: &str, limits: QueryLimits) -> DocqlResult<Self> {
        let input: Vec<char> = input.chars().collect();
        if input.len() > limits.max_query_length {
            return Err(DocqlError::grammar(
                format!(
                    "Query is {} characters long (max {})",
                    input.len(),
                    limits.max_query_length
                ),
                fragment_of(&input, limits.max_query_length),
            ));
        }

        let text: String = input.iter().collect();
        let tokens = Lexer::new(&text).tokenize()?;

        Ok(Self {
            tokens,
            position: 0,
            limits,
            predicates: 0,
            input,
        })
    }

    /// Get the current token
    pub(crate) fn current_token(&self) -> &Token {
        self.tokens
            .get(self.position)
            .map(|t| &t.token)
            .unwrap_or(&Token::Eof)
    }

    /// Peek at a token at a given offset from the current position
    pub(crate) fn peek_token(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.position + offset)
            .map(|t| &t.token)
            .unwrap_or(&Token::Eof)
    }

    /// Advance to the next token
    pub(crate) fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    /// Character offset of the current token
    pub(crate) fn current_offset(&self) -> usize {
        self.tokens
            .get(self.position)
            .map(|t| t.offset)
            .unwrap_or(self.input.len())
    }

    /// Grammar error quoting the source text at `offset`
    pub(crate) fn error_at(&self, message: impl Into<String>, offset: usize) -> DocqlError {
        DocqlError::grammar(message, fragment_of(&self.input, offset))
    }

    /// Grammar error quoting the source text at the current token
    pub(crate) fn error(&self, message: impl Into<String>) -> DocqlError {
        self.error_at(message, self.current_offset())
    }

    /// Expect a specific token and advance, or return an error
    pub(crate) fn expect(&mut self, expected: Token) -> DocqlResult<()> {
        if self.current_token() == &expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!(
                "Expected {:?}, got {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    /// Parse a complete query; trailing tokens are an error
    pub fn parse(&mut self) -> DocqlResult<SelectQuery> {
        let query = self.parse_select_query()?;

        if !matches!(self.current_token(), Token::Eof) {
            return Err(self.error(format!(
                "Unexpected token after query: {:?}",
                self.current_token()
            )));
        }

        tracing::trace!(
            entity = %query.entity,
            predicates = self.predicates,
            "parsed select query"
        );
        Ok(query)
    }
}

/// Parse a query string into an AST with default limits
pub fn parse(input: &str) -> DocqlResult<SelectQuery> {
    Parser::new(input)?.parse()
}

/// Parse a query string into an AST under the given limits
pub fn parse_with_limits(input: &str, limits: &QueryLimits) -> DocqlResult<SelectQuery> {
    Parser::with_limits(input, limits.clone())?.parse()
}
