//! Evaluation of translated conditions against JSON documents.
//!
//! - get_field_value: nested field lookup by dotted path
//! - values_equal / compare_values: JSON equality and ordering
//! - like_regex: LIKE pattern to anchored regex
//! - Predicate: a condition compiled once per query, then matched per document

use std::cmp::Ordering;

use regex::Regex;
use serde_json::Value;
use docql_core::{DocqlError, DocqlResult, DocumentCondition, FieldOperator};

const MAX_PATTERN_LEN: usize = 1000;

/// Extract a nested field value, `Value::Null` when any segment is missing.
#[inline]
pub fn get_field_value<'a>(doc: &'a Value, field_path: &str) -> &'a Value {
    let mut current = doc;

    for part in field_path.split('.') {
        match current.get(part) {
            Some(val) => current = val,
            None => return &Value::Null,
        }
    }

    current
}

/// Equality with numbers compared as f64, so `1` equals `1.0`.
#[inline]
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

/// Ordering between two values of the same kind; `None` across kinds or
/// when either side is null.
#[inline]
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Total order used for sorting: Null < Bool < Number < String < Array < Object.
pub fn sort_order(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    compare_values(a, b).unwrap_or_else(|| rank(a).cmp(&rank(b)))
}

/// Compile a LIKE pattern: `%` matches any run, `_` one character, the rest
/// literally. The match is anchored at both ends.
pub fn like_regex(pattern: &str) -> Result<Regex, regex::Error> {
    if pattern.len() > MAX_PATTERN_LEN {
        return Err(regex::Error::Syntax(format!(
            "Pattern too long (max {} chars)",
            MAX_PATTERN_LEN
        )));
    }

    let mut regex_pattern = String::with_capacity(pattern.len() + 8);
    regex_pattern.push_str("(?s)^");
    for c in pattern.chars() {
        match c {
            '%' => regex_pattern.push_str(".*"),
            '_' => regex_pattern.push('.'),
            other => regex_pattern.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    regex_pattern.push('$');

    Regex::new(&regex_pattern)
}

/// A condition ready to be matched against many documents.
#[derive(Debug)]
pub enum Predicate {
    Compare {
        path: String,
        accept: fn(Ordering) -> bool,
        value: Value,
    },
    Equals {
        path: String,
        value: Value,
    },
    In {
        path: String,
        values: Vec<Value>,
    },
    Between {
        path: String,
        low: Value,
        high: Value,
    },
    Like {
        path: String,
        regex: Regex,
    },
    Not(Box<Predicate>),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Fails with a store error on a leaf the store cannot evaluate, such as
    /// a non-string LIKE pattern or a BETWEEN without exactly two bounds.
    pub fn compile(condition: &DocumentCondition) -> DocqlResult<Self> {
        let predicate = match condition {
            DocumentCondition::Field {
                operator,
                name,
                value,
            } => {
                let path = name.clone();
                let value = value.to_json();
                match operator {
                    FieldOperator::Equals => Predicate::Equals { path, value },
                    FieldOperator::GreaterThan => Predicate::Compare {
                        path,
                        accept: Ordering::is_gt,
                        value,
                    },
                    FieldOperator::GreaterEqualsThan => Predicate::Compare {
                        path,
                        accept: Ordering::is_ge,
                        value,
                    },
                    FieldOperator::LesserThan => Predicate::Compare {
                        path,
                        accept: Ordering::is_lt,
                        value,
                    },
                    FieldOperator::LesserEqualsThan => Predicate::Compare {
                        path,
                        accept: Ordering::is_le,
                        value,
                    },
                    FieldOperator::In => Predicate::In {
                        path,
                        values: match value {
                            Value::Array(items) => items,
                            single => vec![single],
                        },
                    },
                    FieldOperator::Between => match value {
                        Value::Array(bounds) if bounds.len() == 2 => {
                            let mut bounds = bounds.into_iter();
                            let low = bounds.next().unwrap_or(Value::Null);
                            let high = bounds.next().unwrap_or(Value::Null);
                            Predicate::Between { path, low, high }
                        }
                        other => {
                            return Err(DocqlError::StoreError(format!(
                                "BETWEEN on '{}' needs two bounds, got {}",
                                path, other
                            )));
                        }
                    },
                    FieldOperator::Like => {
                        let pattern = value.as_str().ok_or_else(|| {
                            DocqlError::StoreError(format!(
                                "LIKE pattern on '{}' must be a string, got {}",
                                path, value
                            ))
                        })?;
                        let regex = like_regex(pattern).map_err(|e| {
                            DocqlError::StoreError(format!(
                                "Invalid LIKE pattern on '{}': {}",
                                path, e
                            ))
                        })?;
                        Predicate::Like { path, regex }
                    }
                }
            }
            DocumentCondition::Not(inner) => Predicate::Not(Box::new(Predicate::compile(inner)?)),
            DocumentCondition::And(children) => Predicate::And(
                children
                    .iter()
                    .map(Predicate::compile)
                    .collect::<DocqlResult<_>>()?,
            ),
            DocumentCondition::Or(children) => Predicate::Or(
                children
                    .iter()
                    .map(Predicate::compile)
                    .collect::<DocqlResult<_>>()?,
            ),
        };
        Ok(predicate)
    }

    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Predicate::Equals { path, value } => values_equal(get_field_value(doc, path), value),
            Predicate::Compare {
                path,
                accept,
                value,
            } => compare_values(get_field_value(doc, path), value).is_some_and(|o| accept(o)),
            Predicate::In { path, values } => {
                let actual = get_field_value(doc, path);
                values.iter().any(|v| values_equal(actual, v))
            }
            Predicate::Between { path, low, high } => {
                let actual = get_field_value(doc, path);
                compare_values(actual, low).is_some_and(Ordering::is_ge)
                    && compare_values(actual, high).is_some_and(Ordering::is_le)
            }
            Predicate::Like { path, regex } => match get_field_value(doc, path) {
                Value::String(s) => regex.is_match(s),
                _ => false,
            },
            Predicate::Not(inner) => !inner.matches(doc),
            Predicate::And(children) => children.iter().all(|c| c.matches(doc)),
            Predicate::Or(children) => children.iter().any(|c| c.matches(doc)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docql_core::FieldValue;
    use serde_json::json;

    fn field(operator: FieldOperator, name: &str, value: impl Into<FieldValue>) -> Predicate {
        Predicate::compile(&DocumentCondition::field(operator, name, value.into())).unwrap()
    }

    fn compile_error(condition: DocumentCondition) -> String {
        match Predicate::compile(&condition) {
            Err(DocqlError::StoreError(message)) => message,
            other => panic!("expected a store error, got {:?}", other),
        }
    }

    #[test]
    fn test_get_field_value() {
        let doc = json!({"a": {"b": {"c": 42}}});
        assert_eq!(get_field_value(&doc, "a.b.c"), &json!(42));
        assert_eq!(get_field_value(&doc, "a.x"), &Value::Null);
    }

    #[test]
    fn test_values_equal() {
        assert!(values_equal(&json!(1), &json!(1.0)));
        assert!(values_equal(&json!("a"), &json!("a")));
        assert!(!values_equal(&json!(1), &json!("1")));
    }

    #[test]
    fn test_compare_values() {
        assert_eq!(compare_values(&json!(1), &json!(2)), Some(Ordering::Less));
        assert_eq!(compare_values(&json!("b"), &json!("a")), Some(Ordering::Greater));
        assert_eq!(compare_values(&json!(1), &json!("a")), None);
        assert_eq!(compare_values(&Value::Null, &json!(1)), None);
        assert_eq!(sort_order(&Value::Null, &json!(1)), Ordering::Less);
    }

    #[test]
    fn test_like_regex() {
        let re = like_regex("hello%").unwrap();
        assert!(re.is_match("hello world"));
        assert!(!re.is_match("say hello"));

        let re = like_regex("h_llo").unwrap();
        assert!(re.is_match("hallo"));
        assert!(!re.is_match("hllo"));

        // regex metacharacters are literal
        let re = like_regex("a.b%").unwrap();
        assert!(re.is_match("a.bc"));
        assert!(!re.is_match("axbc"));

        assert!(like_regex(&"x".repeat(2000)).is_err());
    }

    #[test]
    fn test_leaf_predicates() {
        let doc = json!({"name": "Diana", "age": 30, "born": "2007-12-03"});

        assert!(field(FieldOperator::Equals, "name", "Diana").matches(&doc));
        assert!(field(FieldOperator::GreaterThan, "age", 29).matches(&doc));
        assert!(!field(FieldOperator::GreaterThan, "age", 30).matches(&doc));
        assert!(field(FieldOperator::GreaterEqualsThan, "age", 30).matches(&doc));
        assert!(field(FieldOperator::LesserThan, "age", 30.5).matches(&doc));
        assert!(field(FieldOperator::LesserEqualsThan, "age", 30).matches(&doc));
        assert!(field(FieldOperator::In, "name", vec!["Ada", "Diana"]).matches(&doc));
        assert!(field(FieldOperator::Between, "age", vec![10, 30]).matches(&doc));
        assert!(!field(FieldOperator::Between, "age", vec![31, 40]).matches(&doc));
        assert!(field(FieldOperator::Like, "name", "D%a").matches(&doc));
        assert!(field(
            FieldOperator::GreaterThan,
            "born",
            chrono::NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
        )
        .matches(&doc));
    }

    #[test]
    fn test_missing_field_never_compares() {
        let doc = json!({"name": "Diana"});
        assert!(!field(FieldOperator::GreaterThan, "age", 1).matches(&doc));
        assert!(!field(FieldOperator::LesserThan, "age", 1).matches(&doc));
        assert!(!field(FieldOperator::Like, "age", "%").matches(&doc));
    }

    #[test]
    fn test_malformed_leaves_are_store_errors() {
        let between = DocumentCondition::field(FieldOperator::Between, "age", vec![10].into());
        assert!(compile_error(between.clone()).contains("two bounds"));
        assert!(compile_error(between.negate()).contains("two bounds"));

        let like = DocumentCondition::field(FieldOperator::Like, "name", 5.into());
        assert!(compile_error(like.clone()).contains("must be a string"));
        assert!(compile_error(like.negate()).contains("must be a string"));

        let long = DocumentCondition::field(FieldOperator::Like, "name", "x".repeat(2000).into());
        assert!(compile_error(DocumentCondition::Or(vec![
            DocumentCondition::field(FieldOperator::Equals, "age", 30.into()),
            long,
        ]))
        .contains("Pattern too long"));
    }

    #[test]
    fn test_connectives() {
        let doc = json!({"name": "Diana", "age": 30});
        let condition = DocumentCondition::Or(vec![
            DocumentCondition::field(FieldOperator::Equals, "name", "Ada".into()),
            DocumentCondition::And(vec![
                DocumentCondition::field(FieldOperator::GreaterThan, "age", 20.into()),
                DocumentCondition::field(FieldOperator::Like, "name", "Ada%".into()).negate(),
            ]),
        ]);
        assert!(Predicate::compile(&condition).unwrap().matches(&doc));
        assert!(!Predicate::compile(&condition.negate()).unwrap().matches(&doc));
    }
}
