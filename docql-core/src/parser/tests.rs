//! Tests for the docql parser.

use super::*;
use crate::ast::*;
use crate::error::DocqlError;

fn condition_of(query: &str) -> ConditionNode {
    parse(query).unwrap().condition.expect("query has a WHERE clause")
}

fn leaf(field: &str, operator: Operator, value: Value) -> ConditionNode {
    ConditionNode::leaf(field, operator, value)
}

fn assert_grammar_error(query: &str) {
    match parse(query) {
        Err(DocqlError::GrammarError { .. }) => {}
        other => panic!("expected grammar error for {:?}, got {:?}", query, other),
    }
}

#[test]
fn test_projection() {
    let query = parse("select name, address from God").unwrap();
    assert_eq!(query.fields, vec!["name", "address"]);
    assert_eq!(query.entity, "God");
    assert!(query.condition.is_none());
    assert!(query.sorts.is_empty());
    assert_eq!(query.skip, 0);
    assert_eq!(query.limit, 0);
}

#[test]
fn test_projection_is_unique() {
    let query = parse("select name, age, name from God").unwrap();
    assert_eq!(query.fields, vec!["name", "age"]);
}

#[test]
fn test_wildcard() {
    let query = parse("SELECT * FROM God").unwrap();
    assert!(query.fields.is_empty());
}

#[test]
fn test_dotted_paths() {
    let query = parse("select address.city from God order by address.zip").unwrap();
    assert_eq!(query.fields, vec!["address.city"]);
    assert_eq!(query.sorts[0].field, "address.zip");
}

#[test]
fn test_order_by_default_asc() {
    let query = parse("select * from God order by name").unwrap();
    assert_eq!(
        query.sorts,
        vec![SortSpec {
            field: "name".to_string(),
            direction: SortDirection::Asc
        }]
    );
}

#[test]
fn test_order_by_multiple() {
    let query = parse("select * from God order by name desc age asc").unwrap();
    assert_eq!(
        query.sorts,
        vec![
            SortSpec {
                field: "name".to_string(),
                direction: SortDirection::Desc
            },
            SortSpec {
                field: "age".to_string(),
                direction: SortDirection::Asc
            },
        ]
    );
    assert!(query.fields.is_empty());
}

#[test]
fn test_order_by_comma_separated() {
    let query = parse("select * from God order by name desc, age").unwrap();
    assert_eq!(query.sorts.len(), 2);
    assert_eq!(query.sorts[1].direction, SortDirection::Asc);
}

#[test]
fn test_skip_and_limit() {
    let query = parse("select * from God skip 10 limit 12").unwrap();
    assert_eq!(query.skip, 10);
    assert_eq!(query.limit, 12);
    assert!(query.condition.is_none());

    assert_eq!(parse("select * from God skip 12").unwrap().skip, 12);
    assert_eq!(parse("select * from God limit 12").unwrap().limit, 12);
}

#[test]
fn test_equals_integer() {
    assert_eq!(
        condition_of("select  * from God where age = 10"),
        leaf("age", Operator::Equals, Value::Integer(10))
    );
}

#[test]
fn test_comparison_floats() {
    assert_eq!(
        condition_of("select * from God where stamina > 10.23"),
        leaf("stamina", Operator::GreaterThan, Value::Float(10.23))
    );
    assert_eq!(
        condition_of("select * from God where stamina >= -10.23"),
        leaf("stamina", Operator::GreaterEqualsThan, Value::Float(-10.23))
    );
    assert_eq!(
        condition_of("select * from God where stamina <= -10.23"),
        leaf("stamina", Operator::LesserEqualsThan, Value::Float(-10.23))
    );
    assert_eq!(
        condition_of("select * from God where stamina < -10"),
        leaf("stamina", Operator::LesserThan, Value::Integer(-10))
    );
}

#[test]
fn test_between_with_and() {
    assert_eq!(
        condition_of("select * from God where age between 10 and 30"),
        leaf(
            "age",
            Operator::Between,
            Value::Array(vec![Value::Integer(10), Value::Integer(30)])
        )
    );
}

#[test]
fn test_between_with_list() {
    assert_eq!(
        condition_of("select * from God where age between [10, 30]"),
        leaf(
            "age",
            Operator::Between,
            Value::Array(vec![Value::Integer(10), Value::Integer(30)])
        )
    );
}

#[test]
fn test_between_requires_two_values() {
    assert_grammar_error("select * from God where age between [10, 20, 30]");
    assert_grammar_error("select * from God where age between (10)");
    assert_grammar_error("select * from God where age between 10 or 30");
}

#[test]
fn test_between_inside_conjunction() {
    assert_eq!(
        condition_of("select * from God where age between 1 and 2 and name = 'x'"),
        ConditionNode::And(vec![
            leaf(
                "age",
                Operator::Between,
                Value::Array(vec![Value::Integer(1), Value::Integer(2)])
            ),
            leaf("name", Operator::Equals, Value::String("x".to_string())),
        ])
    );
}

#[test]
fn test_string_value() {
    assert_eq!(
        condition_of("select * from God where name = \"diana\""),
        leaf("name", Operator::Equals, Value::String("diana".to_string()))
    );
}

#[test]
fn test_object_value() {
    assert_eq!(
        condition_of(
            "select * from God where siblings = {\"apollo\": \"Brother\", \"Zeus\": \"Father\"}"
        ),
        leaf(
            "siblings",
            Operator::Equals,
            Value::Object(vec![
                ("apollo".to_string(), Value::String("Brother".to_string())),
                ("Zeus".to_string(), Value::String("Father".to_string())),
            ])
        )
    );
}

#[test]
fn test_convert_value() {
    assert_eq!(
        condition_of("select * from God where age = convert(12, java.lang.Integer)"),
        leaf(
            "age",
            Operator::Equals,
            Value::Convert {
                value: Box::new(Value::Integer(12)),
                type_name: "java.lang.Integer".to_string(),
            }
        )
    );
}

#[test]
fn test_unknown_convert_type_parses() {
    // unsupported targets are reported when the value is resolved
    assert!(parse("select * from God where age = convert(12, money)").is_ok());
}

#[test]
fn test_in_parenthesized_list() {
    assert_eq!(
        condition_of("select * from God where name in (\"Ada\", \"Apollo\")"),
        leaf(
            "name",
            Operator::In,
            Value::Array(vec![
                Value::String("Ada".to_string()),
                Value::String("Apollo".to_string()),
            ])
        )
    );
}

#[test]
fn test_in_parameter() {
    assert_eq!(
        condition_of("select * from God where name in @names"),
        leaf("name", Operator::In, Value::Parameter("names".to_string()))
    );
}

#[test]
fn test_in_requires_list() {
    assert_grammar_error("select * from God where name in \"Ada\"");
}

#[test]
fn test_like() {
    assert_eq!(
        condition_of("select * from God where name like \"Ada\""),
        leaf("name", Operator::Like, Value::String("Ada".to_string()))
    );
}

#[test]
fn test_not_before_operator() {
    assert_eq!(
        condition_of("select * from God where name not like \"Ada\""),
        ConditionNode::negate(leaf(
            "name",
            Operator::Like,
            Value::String("Ada".to_string())
        ))
    );
}

#[test]
fn test_not_prefix_wraps_one_predicate() {
    assert_eq!(
        condition_of("select * from God where not a = 1 and b = 2"),
        ConditionNode::And(vec![
            ConditionNode::negate(leaf("a", Operator::Equals, Value::Integer(1))),
            leaf("b", Operator::Equals, Value::Integer(2)),
        ])
    );
}

#[test]
fn test_double_not_nests() {
    assert_eq!(
        condition_of("select * from God where not not a = 1"),
        ConditionNode::negate(ConditionNode::negate(leaf(
            "a",
            Operator::Equals,
            Value::Integer(1)
        )))
    );
}

#[test]
fn test_and_chain_is_flat() {
    assert_eq!(
        condition_of("select * from God where a = 1 and b = 2 and c = 3"),
        ConditionNode::And(vec![
            leaf("a", Operator::Equals, Value::Integer(1)),
            leaf("b", Operator::Equals, Value::Integer(2)),
            leaf("c", Operator::Equals, Value::Integer(3)),
        ])
    );
}

#[test]
fn test_or_chain_is_flat() {
    assert_eq!(
        condition_of("select * from God where name = \"Ada\" or age = 20"),
        ConditionNode::Or(vec![
            leaf("name", Operator::Equals, Value::String("Ada".to_string())),
            leaf("age", Operator::Equals, Value::Integer(20)),
        ])
    );
}

#[test]
fn test_and_binds_tighter_than_or() {
    assert_eq!(
        condition_of("select * from God where a = 1 and b = 2 or c = 3"),
        ConditionNode::Or(vec![
            ConditionNode::And(vec![
                leaf("a", Operator::Equals, Value::Integer(1)),
                leaf("b", Operator::Equals, Value::Integer(2)),
            ]),
            leaf("c", Operator::Equals, Value::Integer(3)),
        ])
    );
}

#[test]
fn test_mixed_chain_groups_each_and_run() {
    let condition = condition_of(
        "select * from God where a = 1 and b = 2 or c = 3 and d = 4 or e = 5",
    );
    match condition {
        ConditionNode::Or(children) => {
            assert_eq!(children.len(), 3);
            assert_eq!(children[0].operator(), Operator::And);
            assert_eq!(children[1].operator(), Operator::And);
            assert_eq!(children[2].operator(), Operator::Equals);
        }
        other => panic!("expected Or, got {:?}", other),
    }
}

#[test]
fn test_parameter_value() {
    let query = parse("select * from God where age = @age").unwrap();
    assert_eq!(
        query.condition,
        Some(leaf("age", Operator::Equals, Value::Parameter("age".to_string())))
    );
    assert_eq!(query.parameter_names(), vec!["age"]);
}

#[test]
fn test_boolean_value() {
    assert_eq!(
        condition_of("select * from God where immortal = TRUE"),
        leaf("immortal", Operator::Equals, Value::Boolean(true))
    );
}

#[test]
fn test_nested_list_and_object() {
    assert_eq!(
        condition_of("select * from God where tags = [1, [2.5, 'x'], {k: false}]"),
        leaf(
            "tags",
            Operator::Equals,
            Value::Array(vec![
                Value::Integer(1),
                Value::Array(vec![Value::Float(2.5), Value::String("x".to_string())]),
                Value::Object(vec![("k".to_string(), Value::Boolean(false))]),
            ])
        )
    );
}

#[test]
fn test_full_query() {
    let query = parse(
        "SELECT name FROM God WHERE age > 10 ORDER BY name DESC SKIP 5 LIMIT 20",
    )
    .unwrap();
    assert_eq!(query.fields, vec!["name"]);
    assert_eq!(query.sorts[0].direction, SortDirection::Desc);
    assert_eq!(query.skip, 5);
    assert_eq!(query.limit, 20);
    assert!(query.condition.is_some());
}

#[test]
fn test_quoted_identifier_as_field() {
    assert_eq!(
        condition_of("select * from God where `order` = 1"),
        leaf("order", Operator::Equals, Value::Integer(1))
    );
}

#[test]
fn test_grammar_errors() {
    assert_grammar_error("");
    assert_grammar_error("delete from God");
    assert_grammar_error("select from God");
    assert_grammar_error("select * God");
    assert_grammar_error("select * from God where");
    assert_grammar_error("select * from God where age");
    assert_grammar_error("select * from God where age == ");
    assert_grammar_error("select * from God where age ! 3");
    assert_grammar_error("select * from God where name = \"Ada");
    assert_grammar_error("select * from God where age = 12abc");
    assert_grammar_error("select * from God order name");
    assert_grammar_error("select * from God skip -1");
    assert_grammar_error("select * from God limit 1.5");
    assert_grammar_error("select * from God limit 10 skip 2");
    assert_grammar_error("select * from God where a = 1 garbage");
    assert_grammar_error("select * from God where a = {1: 2}");
}

#[test]
fn test_grammar_error_quotes_fragment() {
    let err = parse("select * from God wher age = 1").unwrap_err();
    assert_eq!(
        err,
        DocqlError::grammar("Unexpected token after query: Identifier(\"wher\")", "wher age = 1")
    );
}

#[test]
fn test_limits_query_length() {
    let limits = QueryLimits {
        max_query_length: 10,
        ..QueryLimits::default()
    };
    assert!(parse_with_limits("select * from God", &limits).is_err());
}

#[test]
fn test_limits_predicates() {
    let limits = QueryLimits {
        max_predicates: 2,
        ..QueryLimits::default()
    };
    assert!(parse_with_limits("select * from God where a = 1 and b = 2", &limits).is_ok());
    assert!(parse_with_limits("select * from God where a = 1 and b = 2 and c = 3", &limits).is_err());
}

#[test]
fn test_limits_value_depth() {
    let limits = QueryLimits {
        max_value_depth: 2,
        ..QueryLimits::default()
    };
    assert!(parse_with_limits("select * from God where a = [[1]]", &limits).is_ok());
    assert!(parse_with_limits("select * from God where a = [[[1]]]", &limits).is_err());
}

#[test]
fn test_limits_not_chain() {
    let limits = QueryLimits {
        max_value_depth: 2,
        ..QueryLimits::default()
    };
    assert!(parse_with_limits("select * from God where not not a = 1", &limits).is_ok());
    assert!(matches!(
        parse_with_limits("select * from God where not not not a = 1", &limits),
        Err(DocqlError::GrammarError { .. })
    ));

    let text = format!("select * from God where {}age = 1", "not ".repeat(15_000));
    assert!(matches!(parse(&text), Err(DocqlError::GrammarError { .. })));
}

#[test]
fn test_limits_convert_nesting() {
    let limits = QueryLimits {
        max_value_depth: 2,
        ..QueryLimits::default()
    };
    assert!(parse_with_limits(
        "select * from God where a = convert(convert(1, long), int)",
        &limits
    )
    .is_ok());
    assert!(parse_with_limits(
        "select * from God where a = convert([[1]], list)",
        &limits
    )
    .is_err());

    let text = format!(
        "select * from God where a = {}1{}",
        "convert(".repeat(4000),
        ", long)".repeat(4000)
    );
    assert!(matches!(parse(&text), Err(DocqlError::GrammarError { .. })));
}
