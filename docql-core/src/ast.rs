use std::fmt;

use serde::Serialize;

/// AST node for a complete select query
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectQuery {
    /// Projected fields, unique, in first-mention order. Empty means `*`.
    pub fields: Vec<String>,
    /// Collection the query reads from
    pub entity: String,
    /// WHERE clause, if any
    pub condition: Option<ConditionNode>,
    /// ORDER BY specs in source order
    pub sorts: Vec<SortSpec>,
    /// SKIP count, 0 = no offset
    pub skip: u64,
    /// LIMIT count, 0 = unbounded
    pub limit: u64,
}

impl SelectQuery {
    /// Names of every parameter referenced by the condition, in source order,
    /// each listed once.
    pub fn parameter_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Some(condition) = &self.condition {
            condition.collect_parameters(&mut names);
        }
        names
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// ORDER BY field [ASC|DESC]
#[derive(Debug, Clone, PartialEq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

/// Condition operators, as named in translated conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Equals,
    GreaterThan,
    GreaterEqualsThan,
    LesserThan,
    LesserEqualsThan,
    In,
    Like,
    Between,
    And,
    Or,
    Not,
}

impl Operator {
    pub fn name(&self) -> &'static str {
        match self {
            Operator::Equals => "EQUALS",
            Operator::GreaterThan => "GREATER_THAN",
            Operator::GreaterEqualsThan => "GREATER_EQUALS_THAN",
            Operator::LesserThan => "LESSER_THAN",
            Operator::LesserEqualsThan => "LESSER_EQUALS_THAN",
            Operator::In => "IN",
            Operator::Like => "LIKE",
            Operator::Between => "BETWEEN",
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Not => "NOT",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Boolean condition tree of a WHERE clause.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionNode {
    Leaf {
        field: String,
        operator: Operator,
        value: Value,
    },
    Not(Box<ConditionNode>),
    /// Two or more children, source order
    And(Vec<ConditionNode>),
    /// Two or more children, source order
    Or(Vec<ConditionNode>),
}

impl ConditionNode {
    pub fn leaf(field: impl Into<String>, operator: Operator, value: Value) -> Self {
        ConditionNode::Leaf {
            field: field.into(),
            operator,
            value,
        }
    }

    pub fn negate(inner: ConditionNode) -> Self {
        ConditionNode::Not(Box::new(inner))
    }

    pub fn operator(&self) -> Operator {
        match self {
            ConditionNode::Leaf { operator, .. } => *operator,
            ConditionNode::Not(_) => Operator::Not,
            ConditionNode::And(_) => Operator::And,
            ConditionNode::Or(_) => Operator::Or,
        }
    }

    /// Number of leaf predicates in this tree
    pub fn predicate_count(&self) -> usize {
        match self {
            ConditionNode::Leaf { .. } => 1,
            ConditionNode::Not(inner) => inner.predicate_count(),
            ConditionNode::And(children) | ConditionNode::Or(children) => {
                children.iter().map(ConditionNode::predicate_count).sum()
            }
        }
    }

    fn collect_parameters(&self, names: &mut Vec<String>) {
        match self {
            ConditionNode::Leaf { value, .. } => value.collect_parameters(names),
            ConditionNode::Not(inner) => inner.collect_parameters(names),
            ConditionNode::And(children) | ConditionNode::Or(children) => {
                for child in children {
                    child.collect_parameters(names);
                }
            }
        }
    }
}

/// Unresolved value as written in the query text.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Array(Vec<Value>),
    /// `{name: value, ...}` in source order
    Object(Vec<(String, Value)>),
    /// `@name`
    Parameter(String),
    /// `convert(value, type.name)`; the type is looked up at resolve time
    Convert { value: Box<Value>, type_name: String },
}

impl Value {
    fn collect_parameters(&self, names: &mut Vec<String>) {
        match self {
            Value::Parameter(name) => {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
            Value::Array(items) => {
                for item in items {
                    item.collect_parameters(names);
                }
            }
            Value::Object(fields) => {
                for (_, item) in fields {
                    item.collect_parameters(names);
                }
            }
            Value::Convert { value, .. } => value.collect_parameters(names),
            Value::Integer(_) | Value::Float(_) | Value::String(_) | Value::Boolean(_) => {}
        }
    }
}
