// tests/registry/registry_test.rs
#[path = "../common/mod.rs"]
mod common;

use std::io::Write;

use domain_filter::registry::*;
use domain_filter::FilterError;
use serde_json::json;

#[test]
fn test_recruiting_tables() {
    let registry = common::recruiting();
    let tables: Vec<(&str, &str)> = registry.entities().map(|e| (e.name(), e.table())).collect();
    assert!(tables.contains(&("user", "users")));
    assert!(tables.contains(&("jobRequirements", "job_requirements")));
    assert!(tables.contains(&("llmEvaluationAudit", "llm_evaluation_audit")));
}

#[test]
fn test_recruiting_key_translation() {
    let registry = common::recruiting();
    let user = registry.entry("user").unwrap();
    assert_eq!(user.translate_key("firstName"), Some("first_name"));
    assert_eq!(user.translate_key("lastLoggedIn"), Some("last_logged_in"));
    assert_eq!(user.translate_key("passwordHash"), None);
    assert!(user.references("address"));
    assert!(!user.is_domain_key("address"));

    let address = registry.entry("address").unwrap();
    assert!(address.is_domain_key("address"));
    assert_eq!(address.translate_key("zipCode"), Some("zip_code"));
}

#[test]
fn test_unknown_domain() {
    let registry = common::recruiting();
    assert_eq!(
        registry.entry("invoice").unwrap_err(),
        FilterError::UnknownDomain("invoice".into())
    );
    assert_eq!(
        registry.entry("invoice").unwrap_err().to_string(),
        "No where filter configuration found for domain: invoice"
    );
    assert!(matches!(
        registry.parse_filter("invoice", &json!({})),
        Err(FilterError::UnknownDomain(_))
    ));
}

#[test]
fn test_parse_nested_filter() {
    let registry = common::recruiting();
    let parsed = registry
        .parse_filter(
            "application",
            &json!({
                "status": {"in": ["applied", "screening"]},
                "user": {"email": {"iLike": "%@acme.io"}, "address": {"state": {"equals": "CA"}}},
                "appliedOn": {"greaterThanEqualTo": "2024-01-01"}
            }),
        )
        .unwrap();

    let partition = parsed.partition();
    assert_eq!(
        partition.fields.iter().map(|f| f.key.as_str()).collect::<Vec<_>>(),
        ["status", "appliedOn"]
    );
    let user = parsed.reference("user").unwrap();
    assert_eq!(user.entity(), "user");
    let address = user.reference("address").unwrap();
    assert_eq!(address.partition().fields[0].column, "state");
    assert!(parsed.reference("job").is_none());

    let applied_on = partition.fields[1];
    assert_eq!(applied_on.kind, FieldKind::Date);
    assert!(matches!(
        applied_on.conditions[0].operand,
        Operand::Value(OperandValue::Date(_))
    ));
}

#[test]
fn test_null_check_flags() {
    let registry = common::recruiting();
    let parsed = registry
        .parse_filter(
            "conversation",
            &json!({"endedAt": {"isNull": false}, "isActive": {"isNotNull": true}}),
        )
        .unwrap();
    let fields = parsed.partition().fields;
    assert_eq!(fields[0].conditions[0].operand, Operand::Flag(false));
    assert_eq!(fields[1].conditions[0].operand, Operand::Flag(true));

    assert!(matches!(
        registry.parse_filter("conversation", &json!({"endedAt": {"isNull": "yes"}})),
        Err(FilterError::InvalidFilterShape { .. })
    ));
}

#[test]
fn test_shape_error_reports_path() {
    let registry = common::recruiting();
    let err = registry
        .parse_filter("job", &json!({"hourlyPay": {"like": "%5"}}))
        .unwrap_err();
    match err {
        FilterError::InvalidFilterShape { entity, key, .. } => {
            assert_eq!(entity, "job");
            assert_eq!(key.as_deref(), Some("hourlyPay.like"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = registry
        .parse_filter("user", &json!({"address": {"country": {"equals": "US"}}}))
        .unwrap_err();
    assert!(matches!(
        err,
        FilterError::InvalidFilterShape { ref entity, .. } if entity == "address"
    ));
    assert!(err.is_client_error());
}

#[test]
fn test_non_reference_entity_key_is_rejected() {
    // `job` is registered but `user` does not filter through it.
    let registry = common::recruiting();
    assert!(matches!(
        registry.parse_filter("user", &json!({"job": {"name": {"equals": "x"}}})),
        Err(FilterError::InvalidFilterShape { .. })
    ));
}

#[test]
fn test_invalid_dates() {
    let registry = common::recruiting();
    for bad in [json!("tomorrow"), json!(1700000000), json!("2024-02-30")] {
        assert!(
            registry
                .parse_filter("user", &json!({"createdAt": {"lessThan": bad}}))
                .is_err(),
            "{bad}"
        );
    }
}

#[test]
fn test_from_file() {
    let path = std::env::temp_dir().join(format!("filterc-registry-{}.toml", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        r#"
[entities.team]
table = "teams"
references = ["member"]
fields = {{ name = "string" }}

[entities.member]
table = "members"
fields = {{ joinedAt = "date", seniority = {{ kind = "number", column = "level" }} }}
"#
    )
    .unwrap();

    let registry = Registry::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(registry.len(), 2);
    assert_eq!(
        registry.entry("member").unwrap().translate_key("seniority"),
        Some("level")
    );
    assert!(matches!(
        Registry::from_file(&path),
        Err(RegistryError::Read { .. })
    ));
}

#[test]
fn test_builder_matches_toml() {
    let built = Registry::builder()
        .entity("team", EntityDef::new("teams").field("name", FieldKind::String))
        .build()
        .unwrap();
    let parsed = Registry::from_toml_str("[entities.team]\ntable = \"teams\"\nfields = { name = \"string\" }\n").unwrap();
    assert_eq!(built, parsed);
}

#[test]
fn test_fixture_registries_build() {
    assert_eq!(common::mutual_registry().len(), 2);
    assert_eq!(common::diamond_registry().len(), 5);
}
