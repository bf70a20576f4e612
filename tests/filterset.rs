//! End-to-end registry tests: whole requests through a FilterSet, plus
//! ordering fields and type inference at the definition surface.

use proptest::prelude::*;
use sluice::{
    infer_field, params_from_json, Context, DataType, Field, FilterError, FilterSet, FilterValue,
    LookupSelection, MethodOutcome, OrderDir, OrderSpec, Query,
};

fn apply(filters: &FilterSet, params: serde_json::Value) -> Result<Query, FilterError> {
    filters.validate_and_apply(
        &params_from_json(params),
        &Context::new(),
        Query::table("samples"),
    )
}

// ============================================================================
// Whole-request behavior
// ============================================================================

#[test]
fn valid_request_conjoins_all_field_conditions() {
    let filters = FilterSet::builder()
        .field("amount", Field::integer().lookup_expr("amount__gte"))
        .field(
            "tags",
            Field::list(Field::string()).lookup_expr("tags__in"),
        )
        .build()
        .unwrap();

    let query = apply(
        &filters,
        serde_json::json!({"amount": "10", "tags": "a,b"}),
    )
    .unwrap();
    let sql = query.build_sql();
    assert!(sql.contains(r#""amount" >= 10"#), "{}", sql);
    assert!(sql.contains(r#""tags" IN ('a', 'b')"#), "{}", sql);
    assert!(sql.contains("AND"), "{}", sql);
}

#[test]
fn invalid_request_aggregates_and_applies_nothing() {
    let filters = FilterSet::builder()
        .field("amount", Field::integer().lookup_expr("amount__gte"))
        .field("tags", Field::list(Field::string()))
        .build()
        .unwrap();

    let err = apply(&filters, serde_json::json!({"amount": "abc"})).unwrap_err();
    match err {
        FilterError::Validation(errors) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(
                errors.get("amount"),
                Some(&["A valid integer is required.".to_string()][..])
            );
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
}

#[test]
fn failures_across_fields_aggregate_into_one_response() {
    let filters = FilterSet::builder()
        .field("amount", Field::integer())
        .field("active", Field::boolean())
        .field("name", Field::string())
        .build()
        .unwrap();

    let err = apply(
        &filters,
        serde_json::json!({"amount": "abc", "active": "maybe", "name": "fine"}),
    )
    .unwrap_err();
    match err {
        FilterError::Validation(errors) => {
            assert_eq!(errors.len(), 2);
            assert!(errors.get("amount").is_some());
            assert!(errors.get("active").is_some());
            assert!(errors.get("name").is_none());
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
}

#[test]
fn present_falsy_values_still_filter() {
    let filters = FilterSet::builder()
        .field("active", Field::boolean())
        .field("count", Field::integer())
        .build()
        .unwrap();

    let sql = apply(&filters, serde_json::json!({"active": "false", "count": 0}))
        .unwrap()
        .build_sql();
    assert!(sql.contains(r#""active" = FALSE"#), "{}", sql);
    assert!(sql.contains(r#""count" = 0"#), "{}", sql);
}

#[test]
fn default_lookup_uses_the_registered_name() {
    let filters = FilterSet::builder()
        .field("status", Field::string())
        .build()
        .unwrap();
    let sql = apply(&filters, serde_json::json!({"status": "open"}))
        .unwrap()
        .build_sql();
    assert!(sql.contains(r#""status" = 'open'"#), "{}", sql);
}

#[test]
fn negated_field_excludes_matches() {
    let filters = FilterSet::builder()
        .field("status", Field::string().negate())
        .build()
        .unwrap();
    let sql = apply(&filters, serde_json::json!({"status": "closed"}))
        .unwrap()
        .build_sql();
    assert!(sql.contains("NOT"), "{}", sql);
}

#[test]
fn context_reaches_filter_methods() {
    let filters = FilterSet::builder()
        .field("mine", Field::boolean().method("owned_by_caller"))
        .resolver("owned_by_caller", |ctx, query, _| {
            let user = ctx
                .get("user_id")
                .and_then(serde_json::Value::as_i64)
                .unwrap_or_default();
            MethodOutcome::Query(query.filter(sluice::lookup::condition_for(
                "owner_id",
                &FilterValue::Int(user),
            )))
        })
        .build()
        .unwrap();

    let query = filters
        .validate_and_apply(
            &params_from_json(serde_json::json!({"mine": "true"})),
            &Context::new().with("user_id", serde_json::json!(42)),
            Query::table("samples"),
        )
        .unwrap();
    assert!(query.build_sql().contains(r#""owner_id" = 42"#));
}

// ============================================================================
// Ordering through the registry
// ============================================================================

#[test]
fn ordering_field_sorts_by_requested_keys() {
    let filters = FilterSet::builder()
        .field(
            "order",
            Field::ordering(OrderSpec::new(&[("price", "price"), ("name", "name")])),
        )
        .build()
        .unwrap();

    let sql = apply(&filters, serde_json::json!({"order": "-price,name"}))
        .unwrap()
        .build_sql();
    assert!(
        sql.contains(r#"ORDER BY "price" DESC, "name" ASC"#),
        "{}",
        sql
    );
}

#[test]
fn ordering_rejects_undeclared_keys() {
    let filters = FilterSet::builder()
        .field("order", Field::ordering(OrderSpec::new(&[("price", "price")])))
        .build()
        .unwrap();

    let err = apply(&filters, serde_json::json!({"order": "rating"})).unwrap_err();
    match err {
        FilterError::Validation(errors) => {
            assert_eq!(
                errors.get("order"),
                Some(&["\"rating\" is not a valid choice.".to_string()][..])
            );
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
}

#[test]
fn ordering_override_pins_direction() {
    let filters = FilterSet::builder()
        .field(
            "order",
            Field::ordering(
                OrderSpec::new(&[("price", "price")]).with_override(OrderDir::Desc),
            ),
        )
        .build()
        .unwrap();

    let sql = apply(&filters, serde_json::json!({"order": "price"}))
        .unwrap()
        .build_sql();
    assert!(sql.contains(r#"ORDER BY "price" DESC"#), "{}", sql);
}

#[test]
fn ordering_method_takes_precedence() {
    let filters = FilterSet::builder()
        .field(
            "order",
            Field::ordering(OrderSpec::new(&[("price", "price")])).method("custom_order"),
        )
        .resolver("custom_order", |_, query, _| {
            MethodOutcome::Query(query.order_by("created_at", sea_query::Order::Desc))
        })
        .build()
        .unwrap();

    let sql = apply(&filters, serde_json::json!({"order": "price"}))
        .unwrap()
        .build_sql();
    assert!(sql.contains(r#"ORDER BY "created_at" DESC"#), "{}", sql);
}

#[test]
fn ordering_choices_carry_direction_suffixes() {
    let spec = OrderSpec::new(&[("price", "price")]).with_labels(&[("price", "Price")]);
    let choices = spec.choices();
    assert!(choices.contains(&("price".into(), "Price - Ascending".into())));
    assert!(choices.contains(&("-price".into(), "Price - Descending".into())));
}

// ============================================================================
// Inference at the definition surface
// ============================================================================

#[test]
fn inferred_sequence_filters_by_membership() {
    let filters = FilterSet::builder()
        .field_from_type(
            "ids",
            DataType::Sequence(Some(Box::new(DataType::Int))),
            &[],
        )
        .build()
        .unwrap();

    let sql = apply(&filters, serde_json::json!({"ids": "1,2,3"}))
        .unwrap()
        .build_sql();
    assert!(sql.contains(r#""ids" IN (1, 2, 3)"#), "{}", sql);
}

#[test]
fn derived_lookup_family_round_trip() {
    let filters = FilterSet::builder()
        .field_with_lookups(
            "amount",
            Field::integer().lookup_categories(&["range"]),
            LookupSelection::All,
        )
        .build()
        .unwrap();

    assert!(filters.field("amount__gt").is_some());
    assert!(filters.field("amount__lte").is_some());

    let sql = apply(&filters, serde_json::json!({"amount__gt": "7"}))
        .unwrap()
        .build_sql();
    assert!(sql.contains(r#""amount" > 7"#), "{}", sql);
}

proptest! {
    /// Inference is deterministic: the same descriptor always yields the
    /// same field shape, and outcomes are total over the descriptor space.
    #[test]
    fn infer_field_is_deterministic(data_type in data_type_strategy(), name in "[a-z]{1,8}") {
        let first = infer_field(&data_type, &name, &[]);
        let second = infer_field(&data_type, &name, &[]);
        match (first, second) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.kind().type_name(), b.kind().type_name());
                prop_assert_eq!(a.to_string(), b.to_string());
            }
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            (a, b) => prop_assert!(false, "non-deterministic: {:?} vs {:?}", a.is_ok(), b.is_ok()),
        }
    }
}

fn data_type_strategy() -> impl Strategy<Value = DataType> {
    let scalar = prop::sample::select(vec![
        DataType::Bool,
        DataType::Int,
        DataType::Float,
        DataType::Str,
        DataType::Date,
        DataType::Time,
        DataType::DateTime,
        DataType::Duration,
        DataType::Email,
        DataType::IpAddr,
        DataType::Nothing,
        DataType::Decimal { max_digits: 5, decimal_places: 2 },
    ]);
    let leaf = prop_oneof![
        scalar,
        prop::collection::vec("[a-z]{1,4}", 1..4).prop_map(DataType::Enumeration),
        "[A-Z][a-zA-Z]{1,8}".prop_map(DataType::Other),
    ];
    leaf.prop_recursive(2, 8, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|t| DataType::Optional(Box::new(t))),
            inner.prop_map(|t| DataType::Sequence(Some(Box::new(t)))),
            Just(DataType::Sequence(None)),
        ]
    })
}
