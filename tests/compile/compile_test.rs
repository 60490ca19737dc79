// tests/compile/compile_test.rs
#[path = "../common/mod.rs"]
mod common;

use domain_filter::compile::{compile, Algorithm, FilterCompiler};
use domain_filter::sql::check::validate_sql;
use domain_filter::sql::{JoinSpec, PredicateValue, SqlOperator, SqlValue, WherePredicate};
use domain_filter::FilterError;
use insta::assert_snapshot;
use serde_json::json;

#[test]
fn test_user_scenario() {
    let predicates = compile(
        common::recruiting(),
        "user",
        &json!({"email": {"equals": "a@b.com"}, "address": {"state": {"equals": "CA"}}}),
    )
    .unwrap();

    let expected = vec![
        WherePredicate::new("users", "email", SqlOperator::Eq).with_value("a@b.com"),
        WherePredicate::new("address", "state", SqlOperator::Eq).with_value("CA"),
    ];
    assert_eq!(common::sorted(&predicates), common::sorted(&expected));
}

#[test]
fn test_in_scenario() {
    let predicates = compile(
        common::recruiting(),
        "user",
        &json!({"id": {"in": ["x", "y", "z"]}}),
    )
    .unwrap();
    assert_eq!(
        predicates,
        vec![WherePredicate::new("users", "id", SqlOperator::In)
            .with_value(PredicateValue::list(["x", "y", "z"]))]
    );
}

#[test]
fn test_one_predicate_per_operator() {
    let predicates = compile(
        common::recruiting(),
        "job",
        &json!({"hourlyPay": {"greaterThanEqualTo": 15, "lessThan": 30.5}, "isActive": {"equals": true}}),
    )
    .unwrap();
    assert_eq!(
        common::shapes(&predicates),
        ["job.hourly_pay >=", "job.hourly_pay <", "job.is_active ="]
    );
    assert_eq!(
        predicates[1].value,
        Some(PredicateValue::Scalar(SqlValue::Float(30.5)))
    );
}

#[test]
fn test_root_fields_then_chain_order() {
    let predicates = compile(
        common::recruiting(),
        "application",
        &json!({
            "job": {"name": {"iLike": "%driver%"}},
            "user": {"lastName": {"like": "S%"}, "address": {"city": {"equals": "Austin"}}},
            "status": {"notEquals": "rejected"}
        }),
    )
    .unwrap();
    assert_eq!(
        common::shapes(&predicates),
        [
            "application.status !=",
            "job.name ilike",
            "users.last_name like",
            "address.city =",
        ]
    );
}

#[test]
fn test_shared_prefix_compiled_per_chain() {
    let compiler = FilterCompiler::new(common::recruiting());
    let raw = json!({
        "jobRequirements": {
            "priority": {"equals": 1},
            "job": {"name": {"equals": "Driver"}},
            "jobRequirementType": {"requirementType": {"equals": "cdl"}}
        }
    });

    let chains = compiler
        .reference_chains("conversationRequirements", &raw)
        .unwrap();
    assert_eq!(
        chains.iter().map(ToString::to_string).collect::<Vec<_>>(),
        [
            "conversationRequirements -> jobRequirements -> job",
            "conversationRequirements -> jobRequirements -> jobRequirementType",
        ]
    );

    let predicates = compiler.compile("conversationRequirements", &raw).unwrap();
    assert_eq!(
        common::shapes(&predicates),
        [
            "job_requirements.priority =",
            "job.name =",
            "job_requirements.priority =",
            "job_requirement_type.requirement_type =",
        ]
    );

    let query = compiler
        .select_for("conversationRequirements", &raw, Vec::<String>::new())
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(
        query.query,
        "select * from conversation_requirements where job_requirements.priority = $1 and job.name = $2 and job_requirements.priority = $3 and job_requirement_type.requirement_type = $4"
    );
    assert_eq!(query.values.len(), 4);
}

#[test]
fn test_dates_normalized_to_iso() {
    let predicates = compile(
        common::recruiting(),
        "conversation",
        &json!({
            "createdAt": {"greaterThan": "2024-03-01", "in": ["2024-03-05T09:30:00+02:00"]},
            "endedAt": {"isNull": true}
        }),
    )
    .unwrap();

    assert_eq!(
        predicates[0].value,
        Some(PredicateValue::Scalar(SqlValue::Text(
            "2024-03-01T00:00:00.000Z".into()
        )))
    );
    assert_eq!(
        predicates[1].value,
        Some(PredicateValue::List(vec![SqlValue::Text(
            "2024-03-05T07:30:00.000Z".into()
        )]))
    );
    assert_eq!(predicates[2].operator, SqlOperator::IsNull);
    assert_eq!(predicates[2].value, None);
}

#[test]
fn test_null_check_flag_value_is_ignored() {
    let predicates = compile(
        common::recruiting(),
        "user",
        &json!({"lastLoggedIn": {"isNull": false}}),
    )
    .unwrap();
    assert_eq!(common::shapes(&predicates), ["users.last_logged_in is null"]);
}

#[test]
fn test_cycle_compiles_outer_levels_only() {
    let registry = common::mutual_registry();
    let predicates = compile(
        &registry,
        "a",
        &json!({
            "name": {"equals": "outer"},
            "b": {"score": {"greaterThan": 2}, "a": {"id": {"equals": "X"}}}
        }),
    )
    .unwrap();
    assert_eq!(
        common::shapes(&predicates),
        ["a_table.name =", "b_table.score >"]
    );
}

#[test]
fn test_failures_return_nothing() {
    let registry = common::recruiting();
    let compiler = FilterCompiler::new(registry);

    assert_eq!(
        compiler.compile("candidate", &json!({})),
        Err(FilterError::UnknownDomain("candidate".into()))
    );
    assert!(matches!(
        compiler.compile("user", &json!({"email": {"equals": "a@b.com"}, "address": {"state": {"startsWith": "C"}}})),
        Err(FilterError::InvalidFilterShape { .. })
    ));
    assert_eq!(
        compiler.compile("user", &json!({"email": {"equals": "a@b.com"}, "id": {"in": []}})),
        Err(FilterError::MissingValue {
            operator: SqlOperator::In
        })
    );
    assert!(matches!(
        compiler.compile("user", &json!("email = 'a@b.com'")),
        Err(FilterError::InvalidFilterShape { .. })
    ));
}

#[test]
fn test_empty_filter() {
    let predicates = compile(common::recruiting(), "job", &json!({})).unwrap();
    assert!(predicates.is_empty());
}

#[test]
fn test_compile_with_each_algorithm() {
    let registry = common::recruiting();
    let raw = json!({"priority": {"equals": 1}, "job": {"isActive": {"equals": true}}});
    let compiler = FilterCompiler::new(registry);
    assert_eq!(compiler.algorithm(), Algorithm::Graph);

    let graph = compiler.compile_with(Algorithm::Graph, "jobRequirements", &raw).unwrap();
    let stack = compiler
        .with_algorithm(Algorithm::Stack)
        .compile("jobRequirements", &raw)
        .unwrap();
    assert_eq!(common::sorted(&graph), common::sorted(&stack));
}

#[test]
fn test_reference_chains() {
    let compiler = FilterCompiler::new(common::recruiting());
    let chains = compiler
        .reference_chains(
            "llmEvaluationAudit",
            &json!({"conversationRequirements": {"conversation": {"isActive": {"equals": true}}}}),
        )
        .unwrap();
    assert_eq!(chains.len(), 1);
    assert_eq!(
        chains[0].entities().to_vec(),
        ["llmEvaluationAudit", "conversationRequirements", "conversation"]
    );
}

#[test]
fn test_select_for() {
    let compiler = FilterCompiler::new(common::recruiting());
    let query = compiler
        .select_for(
            "user",
            &json!({"email": {"equals": "a@b.com"}, "address": {"state": {"in": ["CA", "NV"]}}}),
            ["users.id", "users.email"],
        )
        .unwrap()
        .join(JoinSpec::join("users", "address").on("address_id", "id"))
        .limit(10)
        .build()
        .unwrap();

    assert_snapshot!(query.query, @"select users.id, users.email from users join address on users.address_id = address.id where users.email = $1 and address.state in ($2, $3) limit 10");
    assert_eq!(
        query.values,
        vec![
            SqlValue::from("a@b.com"),
            SqlValue::from("CA"),
            SqlValue::from("NV"),
        ]
    );
    validate_sql(&query.query).unwrap();
}

#[test]
fn test_predicates_serialize() {
    let predicates = compile(
        common::recruiting(),
        "user",
        &json!({"email": {"isNotNull": true}, "firstName": {"equals": "Ada"}}),
    )
    .unwrap();
    assert_eq!(
        serde_json::to_string(&predicates).unwrap(),
        r#"[{"table":"users","column":"email","operator":"is not null"},{"table":"users","column":"first_name","operator":"=","value":"Ada"}]"#
    );
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_registry_and_compiler_are_shareable() {
    assert_send_sync::<domain_filter::registry::Registry>();
    assert_send_sync::<FilterCompiler<'static>>();
}

#[test]
fn test_concurrent_compiles_agree() {
    let registry = common::recruiting();
    let raw = json!({
        "status": {"in": ["screening", "hired"]},
        "user": {"email": {"iLike": "%@acme.io"}, "address": {"state": {"equals": "CA"}}},
        "job": {"hourlyPay": {"greaterThanEqualTo": 21.5}}
    });
    let expected = compile(registry, "application", &raw).unwrap();

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| FilterCompiler::new(registry).compile("application", &raw)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    assert_eq!(results.len(), 8);
    for result in results {
        assert_eq!(result.unwrap(), expected);
    }
}
