//! WHERE clause parsing.
//!
//! Precedence (lowest to highest):
//! 1. `OR`
//! 2. `AND`
//! 3. `NOT`
//! 4. Predicate: `field [NOT] op operand`
//!
//! Runs of the same connective collapse into one variadic node with the
//! operands in source order, so `a AND b AND c` is `And[a, b, c]` and
//! `a AND b OR c` is `Or[And[a, b], c]`.
//!
//! - `operators`: predicate operators and their operands
//! - `primary`: values (literals, lists, objects, convert, parameters)

mod operators;
mod primary;

use crate::ast::ConditionNode;
use crate::error::DocqlResult;
use crate::lexer::Token;
use crate::parser::Parser;

impl Parser {
    /// Entry point for condition parsing
    pub(crate) fn parse_condition(&mut self) -> DocqlResult<ConditionNode> {
        self.parse_or_condition()
    }

    fn parse_or_condition(&mut self) -> DocqlResult<ConditionNode> {
        let mut terms = vec![self.parse_and_condition()?];

        while matches!(self.current_token(), Token::Or) {
            self.advance(); // consume OR
            terms.push(self.parse_and_condition()?);
        }

        Ok(collapse(terms, ConditionNode::Or))
    }

    fn parse_and_condition(&mut self) -> DocqlResult<ConditionNode> {
        let mut terms = vec![self.parse_term(0)?];

        while matches!(self.current_token(), Token::And) {
            self.advance(); // consume AND
            terms.push(self.parse_term(0)?);
        }

        Ok(collapse(terms, ConditionNode::And))
    }

    /// NOT applies to the next term only; each NOT counts as one nesting level
    fn parse_term(&mut self, depth: usize) -> DocqlResult<ConditionNode> {
        if matches!(self.current_token(), Token::Not) {
            let depth = self.enter_nested(depth)?;
            self.advance(); // consume NOT
            let inner = self.parse_term(depth)?;
            return Ok(ConditionNode::negate(inner));
        }

        self.parse_predicate()
    }

    /// field [NOT] operator operand
    fn parse_predicate(&mut self) -> DocqlResult<ConditionNode> {
        let start = self.current_offset();
        let field = self.parse_path("field name")?;

        let negated = matches!(self.current_token(), Token::Not);
        if negated {
            self.advance();
        }

        let operator = self.parse_condition_operator()?;
        let value = self.parse_operand(operator)?;

        self.predicates += 1;
        if self.predicates > self.limits.max_predicates {
            return Err(self.error_at(
                format!(
                    "Too many predicates (max {})",
                    self.limits.max_predicates
                ),
                start,
            ));
        }

        let leaf = ConditionNode::leaf(field, operator, value);
        Ok(if negated {
            ConditionNode::negate(leaf)
        } else {
            leaf
        })
    }
}

fn collapse(
    mut terms: Vec<ConditionNode>,
    variadic: fn(Vec<ConditionNode>) -> ConditionNode,
) -> ConditionNode {
    if terms.len() == 1 {
        terms.remove(0)
    } else {
        variadic(terms)
    }
}
