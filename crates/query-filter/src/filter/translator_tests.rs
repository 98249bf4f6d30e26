//! Tests for translating filter expressions into predicates.

use chrono::NaiveDate;

use super::*;

fn schema() -> Schema {
    Schema::new()
        .with_column("id", ColumnType::Integer)
        .with_column("score", ColumnType::Float)
        .with_column("name", ColumnType::Text)
        .with_column("created", ColumnType::Date)
        .with_column("at", ColumnType::DateTime)
        .with_column("active", ColumnType::Boolean)
}

fn compiled(input: &str) -> Predicate {
    compile(input, &schema())
        .unwrap()
        .expect("expression should produce a predicate")
}

fn rendered(input: &str) -> String {
    compiled(input).to_string()
}

fn id_rows(ids: std::ops::RangeInclusive<i64>) -> Vec<Row> {
    ids.map(|id| {
        let mut row = Row::new();
        row.insert("id".to_string(), Value::Int(id));
        row
    })
    .collect()
}

fn matching_ids(input: &str, rows: &[Row]) -> Vec<i64> {
    let predicate = compiled(input);
    PredicateEvaluator::new(&predicate)
        .filter_rows(rows)
        .into_iter()
        .filter_map(|row| match row.get("id") {
            Some(Value::Int(id)) => Some(*id),
            _ => None,
        })
        .collect()
}

// ==================== Grouping Tests ====================

#[test]
fn test_grouping_integer() {
    assert_eq!(
        rendered("id:gte:1:lte:5|eq:9"),
        "((id >= 1 AND id <= 5) OR id = 9)"
    );
}

#[test]
fn test_grouping_float() {
    assert_eq!(
        rendered("score:gt:1.5:lt:2.5|eq:9.25"),
        "((score > 1.5 AND score < 2.5) OR score = 9.25)"
    );
}

#[test]
fn test_grouping_text() {
    assert_eq!(
        rendered("name:gte:a:lte:m|eq:z"),
        "((name >= 'a' AND name <= 'm') OR name = 'z')"
    );
}

#[test]
fn test_grouping_date() {
    assert_eq!(
        rendered("created:gte:2020-01-01:lte:2020-01-31|eq:2021-06-01"),
        "((created >= '2020-01-01' AND created <= '2020-01-31') OR created = '2021-06-01')"
    );
}

#[test]
fn test_groups_combine_with_and_across_fields() {
    assert_eq!(
        rendered("id:gt:7|lt:14:name:eq:x:score:eq:100"),
        "(((id > 7 OR id < 14) AND name = 'x') AND score = 100)"
    );
    assert_eq!(rendered("id:gte:7|name:eq:x"), "(id >= 7 AND name = 'x')");
}

#[test]
fn test_returning_field_starts_new_group() {
    assert_eq!(
        rendered("id:eq:1|name:eq:x:id:eq:2"),
        "((id = 1 AND name = 'x') AND id = 2)"
    );
}

#[test]
fn test_same_field_with_conjunctive() {
    assert_eq!(rendered("id:gt:1|id:lt:0"), "(id > 1 AND id < 0)");
    assert_eq!(rendered("id:gt:1:id:lt:5"), "(id > 1 AND id < 5)");
    assert_eq!(rendered("id:gt:1:id:lt:5|eq:9"), "(id > 1 AND (id < 5 OR id = 9))");
}

#[test]
fn test_continuation_keeps_field() {
    let predicate = compiled("id:gt:1:lt:5|eq:9");
    assert_eq!(predicate.columns(), vec!["id"]);
}

// ==================== Value Tests ====================

#[test]
fn test_quoted_values_are_transparent() {
    assert_eq!(
        compiled(r#"name:eq:"a:b|c,d""#),
        Predicate::compare(
            "name",
            CompareOp::Eq,
            Operand::Scalar(Value::Text("a:b|c,d".into()))
        )
    );
    assert_eq!(
        compiled(r#"name:like:"%mui:bueno%""#),
        Predicate::compare(
            "name",
            CompareOp::Like,
            Operand::Scalar(Value::Text("%mui:bueno%".into()))
        )
    );
}

#[test]
fn test_quoted_list_is_split() {
    let predicate = compiled(r#"at:between:"2020-01-01T17:22:20.937752,2020-01-31T17:22:20.937752""#);
    let Predicate::Compare(Comparison {
        operand: Operand::Range(Value::DateTime(low), Value::DateTime(high)),
        ..
    }) = &predicate
    else {
        panic!("expected a datetime range, got {predicate:?}");
    };
    assert_eq!(low.date(), NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    assert_eq!(high.date(), NaiveDate::from_ymd_opt(2020, 1, 31).unwrap());
}

#[test]
fn test_escaped_datetime() {
    let predicate = compiled(r"at:lt:2020-01-01T17\:22\:20");
    let expected = NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_hms_opt(17, 22, 20)
        .unwrap();
    assert_eq!(
        predicate,
        Predicate::compare("at", CompareOp::Lt, Operand::Scalar(Value::DateTime(expected)))
    );
}

#[test]
fn test_membership_values_are_coerced() {
    assert_eq!(
        compiled("id:in:1,2,3"),
        Predicate::compare(
            "id",
            CompareOp::In,
            Operand::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        )
    );
}

#[test]
fn test_is_null_and_booleans() {
    assert_eq!(
        compiled("name:is:null"),
        Predicate::compare("name", CompareOp::Is, Operand::Scalar(Value::Null))
    );
    assert_eq!(
        compiled("name:is:NONE"),
        Predicate::compare("name", CompareOp::Is, Operand::Scalar(Value::Null))
    );
    assert_eq!(
        compiled(r#"name:is:"null""#),
        Predicate::compare("name", CompareOp::Is, Operand::Scalar(Value::Text("null".into())))
    );
    assert_eq!(
        compiled("active:is:true"),
        Predicate::compare("active", CompareOp::Is, Operand::Scalar(Value::Bool(true)))
    );
}

#[test]
fn test_unquoted_like_list() {
    assert_eq!(
        compiled("name:like:a%,%z"),
        Predicate::compare(
            "name",
            CompareOp::Like,
            Operand::List(vec![Value::Text("a%".into()), Value::Text("%z".into())])
        )
    );
    assert_eq!(
        compiled(r#"name:like:"a%,%z""#),
        Predicate::compare(
            "name",
            CompareOp::Like,
            Operand::Scalar(Value::Text("a%,%z".into()))
        )
    );
}

// ==================== Inversion Tests ====================

#[test]
fn test_inverted_eq() {
    assert_eq!(matching_ids("id:~eq:2", &id_rows(1..=3)), vec![1, 3]);
}

#[test]
fn test_inverted_in() {
    assert_eq!(matching_ids("id:~in:1,2", &id_rows(1..=4)), vec![3, 4]);
}

#[test]
fn test_inverted_like_and_is() {
    let rows: Vec<Row> = [(1, Some("apple")), (2, Some("melon")), (3, None)]
        .into_iter()
        .map(|(id, name)| {
            let mut row = Row::new();
            row.insert("id".to_string(), Value::Int(id));
            row.insert(
                "name".to_string(),
                name.map(|n| Value::Text(n.to_string())).unwrap_or(Value::Null),
            );
            row
        })
        .collect();

    assert_eq!(matching_ids("name:~is:null", &rows), vec![1, 2]);
    assert_eq!(matching_ids("name:like:a%", &rows), vec![1]);
    assert_eq!(matching_ids("name:~like:a%", &rows), vec![2, 3]);
}

#[test]
fn test_ordering_operators_cannot_be_inverted() {
    for op in ["gt", "gte", "lt", "lte", "between"] {
        let value = if op == "between" { "1,2" } else { "5" };
        let err = compile(&format!("id:~{op}:{value}"), &schema()).unwrap_err();
        assert_eq!(
            err,
            FilterError::OperatorNotInvertible {
                operator: format!("~{op}")
            }
        );
    }
}

// ==================== Between Tests ====================

#[test]
fn test_between_two_bounds() {
    assert_eq!(
        compiled("id:between:1,10"),
        Predicate::compare(
            "id",
            CompareOp::Between,
            Operand::Range(Value::Int(1), Value::Int(10))
        )
    );
}

#[test]
fn test_between_rejects_other_arity() {
    assert_eq!(
        compile("id:between:1,10,20", &schema()).unwrap_err(),
        FilterError::BetweenBounds {
            field: "id".to_string(),
            count: 3
        }
    );
    assert_eq!(
        compile("id:between:5", &schema()).unwrap_err(),
        FilterError::BetweenBounds {
            field: "id".to_string(),
            count: 1
        }
    );
}

// ==================== Error Tests ====================

#[test]
fn test_unknown_field() {
    let err = compile("ghost:eq:1", &schema()).unwrap_err();
    assert_eq!(err, FilterError::unknown_field("ghost"));
    assert_eq!(err.kind(), FilterErrorKind::UnknownField);
}

#[test]
fn test_type_coercion_failure() {
    let err = compile("id:eq:abc", &schema()).unwrap_err();
    assert_eq!(err, FilterError::type_coercion("id", "abc", "integer"));
    assert_eq!(err.kind(), FilterErrorKind::TypeCoercion);

    let err = compile("id:in:1,x,3", &schema()).unwrap_err();
    assert_eq!(err, FilterError::type_coercion("id", "x", "integer"));

    let err = compile("created:eq:2020-13-45", &schema()).unwrap_err();
    assert_eq!(err, FilterError::type_coercion("created", "2020-13-45", "date"));
}

#[test]
fn test_empty_quoted_list() {
    assert_eq!(
        compile(r#"id:in:"""#, &schema()).unwrap_err(),
        FilterError::EmptyList {
            field: "id".to_string()
        }
    );
}

#[test]
fn test_strict_compile() {
    let options = ParseOptions { strict: true };
    assert_eq!(
        compile_with("id:eq:1 junk", &schema(), options).unwrap_err(),
        FilterError::UnrecognizedInput {
            fragment: "junk".to_string(),
            position: 8
        }
    );
    assert!(compile("id:eq:1 junk", &schema()).unwrap().is_some());
}

// ==================== Compilation Tests ====================

#[test]
fn test_empty_expression_compiles_to_nothing() {
    assert_eq!(compile("", &schema()).unwrap(), None);
    assert_eq!(compile("nothing to see", &schema()).unwrap(), None);
}

#[test]
fn test_compile_is_idempotent() {
    let input = "id:gt:7|lt:14:name:~in:a,b:created:between:2020-01-01,2020-12-31";
    assert_eq!(compiled(input), compiled(input));
}

#[test]
fn test_end_to_end_id_range() {
    assert_eq!(
        matching_ids("id:lte:5:gte:4|lt:6", &id_rows(1..=10)),
        vec![1, 2, 3, 4, 5]
    );
}

#[test]
fn test_closure_resolver() {
    let resolver = |field: &str| match field {
        "user" => Some(Column::new("user_id", ColumnType::Integer)),
        _ => None,
    };
    let predicate = compile("user:eq:42", &resolver).unwrap().unwrap();
    assert_eq!(
        predicate,
        Predicate::compare("user_id", CompareOp::Eq, Operand::Scalar(Value::Int(42)))
    );
    assert!(compile("other:eq:1", &resolver).is_err());
}

#[test]
fn test_translate_parsed_clauses() {
    let clauses = FilterParser::parse("score:gte:0.5").unwrap();
    let schema = schema();
    let predicate = Translator::new(&schema).translate(&clauses).unwrap();
    assert_eq!(
        predicate,
        Some(Predicate::compare(
            "score",
            CompareOp::Gte,
            Operand::Scalar(Value::Float(0.5))
        ))
    );
    assert_eq!(Translator::new(&schema).translate(&[]).unwrap(), None);
}
