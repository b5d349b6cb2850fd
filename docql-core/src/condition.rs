//! Translation of WHERE trees into store-facing conditions.
//!
//! [`translate`] walks a [`ConditionNode`], resolving every value against the
//! parameter map and every field name through a [`FieldResolver`]. Any failure
//! aborts the whole walk, so a partially translated tree is never returned.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::ast::{ConditionNode, Operator};
use crate::error::{DocqlError, DocqlResult};
use crate::value::{resolve, FieldValue, Params};

/// Maps logical names used in query text to the names the store uses.
///
/// Implemented for any `Fn(&str, &str) -> String` taking `(entity, field)`.
/// Unknown fields should be passed through unchanged.
pub trait FieldResolver {
    fn resolve_field(&self, entity: &str, field: &str) -> String;

    fn resolve_entity(&self, entity: &str) -> String {
        entity.to_string()
    }
}

impl<F> FieldResolver for F
where
    F: Fn(&str, &str) -> String,
{
    fn resolve_field(&self, entity: &str, field: &str) -> String {
        self(entity, field)
    }
}

/// Leaves every name as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl FieldResolver for IdentityResolver {
    fn resolve_field(&self, _entity: &str, field: &str) -> String {
        field.to_string()
    }
}

/// Operators a single-field condition can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldOperator {
    Equals,
    GreaterThan,
    GreaterEqualsThan,
    LesserThan,
    LesserEqualsThan,
    In,
    Like,
    Between,
}

impl FieldOperator {
    /// Backend mapping of a leaf operator; the connectives have none.
    pub fn from_operator(operator: Operator) -> Option<Self> {
        match operator {
            Operator::Equals => Some(FieldOperator::Equals),
            Operator::GreaterThan => Some(FieldOperator::GreaterThan),
            Operator::GreaterEqualsThan => Some(FieldOperator::GreaterEqualsThan),
            Operator::LesserThan => Some(FieldOperator::LesserThan),
            Operator::LesserEqualsThan => Some(FieldOperator::LesserEqualsThan),
            Operator::In => Some(FieldOperator::In),
            Operator::Like => Some(FieldOperator::Like),
            Operator::Between => Some(FieldOperator::Between),
            Operator::And | Operator::Or | Operator::Not => None,
        }
    }

    pub fn operator(&self) -> Operator {
        match self {
            FieldOperator::Equals => Operator::Equals,
            FieldOperator::GreaterThan => Operator::GreaterThan,
            FieldOperator::GreaterEqualsThan => Operator::GreaterEqualsThan,
            FieldOperator::LesserThan => Operator::LesserThan,
            FieldOperator::LesserEqualsThan => Operator::LesserEqualsThan,
            FieldOperator::In => Operator::In,
            FieldOperator::Like => Operator::Like,
            FieldOperator::Between => Operator::Between,
        }
    }
}

/// Translated condition tree. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentCondition {
    Field {
        operator: FieldOperator,
        name: String,
        value: FieldValue,
    },
    Not(Box<DocumentCondition>),
    And(Vec<DocumentCondition>),
    Or(Vec<DocumentCondition>),
}

impl DocumentCondition {
    pub fn field(operator: FieldOperator, name: impl Into<String>, value: FieldValue) -> Self {
        DocumentCondition::Field {
            operator,
            name: name.into(),
            value,
        }
    }

    /// Logical negation. Negating a negation unwraps it instead of nesting.
    pub fn negate(self) -> Self {
        match self {
            DocumentCondition::Not(inner) => *inner,
            other => DocumentCondition::Not(Box::new(other)),
        }
    }

    pub fn operator(&self) -> Operator {
        match self {
            DocumentCondition::Field { operator, .. } => operator.operator(),
            DocumentCondition::Not(_) => Operator::Not,
            DocumentCondition::And(_) => Operator::And,
            DocumentCondition::Or(_) => Operator::Or,
        }
    }

    /// Operands of a Not/And/Or node, empty for a field condition
    pub fn children(&self) -> &[DocumentCondition] {
        match self {
            DocumentCondition::Field { .. } => &[],
            DocumentCondition::Not(inner) => std::slice::from_ref(inner.as_ref()),
            DocumentCondition::And(children) | DocumentCondition::Or(children) => children,
        }
    }
}

impl Serialize for DocumentCondition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            DocumentCondition::Field {
                operator,
                name,
                value,
            } => {
                let mut state = serializer.serialize_struct("DocumentCondition", 3)?;
                state.serialize_field("condition", &operator.operator())?;
                state.serialize_field("name", name)?;
                state.serialize_field("value", value)?;
                state.end()
            }
            DocumentCondition::Not(_) | DocumentCondition::And(_) | DocumentCondition::Or(_) => {
                let mut state = serializer.serialize_struct("DocumentCondition", 2)?;
                state.serialize_field("condition", &self.operator())?;
                state.serialize_field("conditions", self.children())?;
                state.end()
            }
        }
    }
}

/// Translate a WHERE tree for `entity`.
pub fn translate(
    node: &ConditionNode,
    params: &Params,
    resolver: &dyn FieldResolver,
    entity: &str,
) -> DocqlResult<DocumentCondition> {
    match node {
        ConditionNode::Leaf {
            field,
            operator,
            value,
        } => {
            let field_operator = FieldOperator::from_operator(*operator)
                .ok_or_else(|| DocqlError::UnsupportedOperator(operator.to_string()))?;

            let value = match (field_operator, resolve(value, params)?) {
                // IN always carries a sequence
                (FieldOperator::In, FieldValue::Array(items)) => FieldValue::Array(items),
                (FieldOperator::In, single) => FieldValue::Array(vec![single]),
                (_, value) => value,
            };

            Ok(DocumentCondition::field(
                field_operator,
                resolver.resolve_field(entity, field),
                value,
            ))
        }
        ConditionNode::Not(inner) => Ok(translate(inner, params, resolver, entity)?.negate()),
        ConditionNode::And(children) => {
            translate_all(children, params, resolver, entity).map(DocumentCondition::And)
        }
        ConditionNode::Or(children) => {
            translate_all(children, params, resolver, entity).map(DocumentCondition::Or)
        }
    }
}

fn translate_all(
    children: &[ConditionNode],
    params: &Params,
    resolver: &dyn FieldResolver,
    entity: &str,
) -> DocqlResult<Vec<DocumentCondition>> {
    children
        .iter()
        .map(|child| translate(child, params, resolver, entity))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Value;
    use serde_json::json;

    fn leaf(field: &str, operator: Operator, value: Value) -> ConditionNode {
        ConditionNode::leaf(field, operator, value)
    }

    fn upper(_entity: &str, field: &str) -> String {
        field.to_uppercase()
    }

    #[test]
    fn test_every_leaf_operator_maps_to_itself() {
        let operators = [
            Operator::Equals,
            Operator::GreaterThan,
            Operator::GreaterEqualsThan,
            Operator::LesserThan,
            Operator::LesserEqualsThan,
            Operator::In,
            Operator::Like,
            Operator::Between,
        ];

        for operator in operators {
            let value = Value::Array(vec![Value::Integer(1), Value::Integer(2)]);
            let translated =
                translate(&leaf("age", operator, value), &Params::new(), &upper, "God").unwrap();

            match translated {
                DocumentCondition::Field {
                    operator: mapped,
                    ref name,
                    ..
                } => {
                    assert_eq!(mapped.operator(), operator);
                    assert_eq!(name, "AGE");
                }
                other => panic!("expected a field condition, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_connective_on_leaf_is_unsupported() {
        for operator in [Operator::And, Operator::Or, Operator::Not] {
            let err = translate(
                &leaf("age", operator, Value::Integer(1)),
                &Params::new(),
                &IdentityResolver,
                "God",
            )
            .unwrap_err();
            assert_eq!(err, DocqlError::UnsupportedOperator(operator.to_string()));
        }
    }

    #[test]
    fn test_double_negation_cancels() {
        let x = leaf("name", Operator::Like, Value::String("Ada".into()));
        let double = ConditionNode::negate(ConditionNode::negate(x.clone()));

        let params = Params::new();
        assert_eq!(
            translate(&double, &params, &IdentityResolver, "God").unwrap(),
            translate(&x, &params, &IdentityResolver, "God").unwrap()
        );
    }

    #[test]
    fn test_single_negation() {
        let x = leaf("name", Operator::Like, Value::String("Ada".into()));
        let translated =
            translate(&ConditionNode::negate(x), &Params::new(), &IdentityResolver, "God").unwrap();
        assert_eq!(translated.operator(), Operator::Not);
        assert_eq!(translated.children()[0].operator(), Operator::Like);
    }

    #[test]
    fn test_and_keeps_order_and_arity() {
        let node = ConditionNode::And(vec![
            leaf("a", Operator::Equals, Value::Integer(1)),
            leaf("b", Operator::Equals, Value::Integer(2)),
            leaf("c", Operator::Equals, Value::Integer(3)),
        ]);
        let translated = translate(&node, &Params::new(), &IdentityResolver, "God").unwrap();
        assert_eq!(
            translated,
            DocumentCondition::And(vec![
                DocumentCondition::field(FieldOperator::Equals, "a", FieldValue::Integer(1)),
                DocumentCondition::field(FieldOperator::Equals, "b", FieldValue::Integer(2)),
                DocumentCondition::field(FieldOperator::Equals, "c", FieldValue::Integer(3)),
            ])
        );
    }

    #[test]
    fn test_child_failure_aborts() {
        let node = ConditionNode::Or(vec![
            leaf("a", Operator::Equals, Value::Integer(1)),
            leaf("b", Operator::Equals, Value::Parameter("missing".into())),
        ]);
        assert_eq!(
            translate(&node, &Params::new(), &IdentityResolver, "God").unwrap_err(),
            DocqlError::UnboundParameter("missing".into())
        );
    }

    #[test]
    fn test_in_parameter_scalar_is_wrapped() {
        let mut params = Params::new();
        params.insert("name".into(), "Ada".into());
        let translated = translate(
            &leaf("name", Operator::In, Value::Parameter("name".into())),
            &params,
            &IdentityResolver,
            "God",
        )
        .unwrap();
        assert_eq!(
            translated,
            DocumentCondition::field(FieldOperator::In, "name", vec!["Ada"].into())
        );
    }

    #[test]
    fn test_resolver_receives_entity() {
        let resolver = |entity: &str, field: &str| format!("{}_{}", entity.to_lowercase(), field);
        let translated = translate(
            &leaf("name", Operator::Equals, Value::String("Ada".into())),
            &Params::new(),
            &resolver,
            "God",
        )
        .unwrap();
        assert_eq!(
            translated,
            DocumentCondition::field(FieldOperator::Equals, "god_name", "Ada".into())
        );
    }

    #[test]
    fn test_serialize() {
        let condition = DocumentCondition::And(vec![
            DocumentCondition::field(FieldOperator::Equals, "name", "Ada".into()),
            DocumentCondition::field(FieldOperator::Between, "age", vec![10, 30].into()).negate(),
        ]);
        assert_eq!(
            serde_json::to_value(&condition).unwrap(),
            json!({
                "condition": "AND",
                "conditions": [
                    {"condition": "EQUALS", "name": "name", "value": "Ada"},
                    {"condition": "NOT", "conditions": [
                        {"condition": "BETWEEN", "name": "age", "value": [10, 30]}
                    ]}
                ]
            })
        );
    }
}
