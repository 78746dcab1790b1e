use evtdis::{FieldDef, FieldType, FieldValue, MismatchKind, SchemaError, SchemaRegistry};
use rstest::{fixture, rstest};

#[fixture]
fn registry() -> SchemaRegistry {
    let registry = SchemaRegistry::new();
    registry
        .define(
            "Order",
            [
                FieldDef::new("id", FieldType::Int),
                FieldDef::new("price", FieldType::Float),
                FieldDef::new("note", FieldType::Str).with_default(FieldValue::from("")),
            ],
        )
        .unwrap();
    registry
}

fn mismatch(kind: MismatchKind) -> SchemaError {
    SchemaError::SchemaMismatch {
        schema: "Order".to_string(),
        kind,
    }
}

/// Тест проверяет, какую ошибку даёт каждый вид некорректного набора
/// значений.
#[rstest]
#[case::missing_required(
    vec![("price", FieldValue::Float(1.5))],
    MismatchKind::MissingField("id".into())
)]
#[case::int_is_not_float(
    vec![("id", FieldValue::Int(1)), ("price", FieldValue::Int(2))],
    MismatchKind::WrongType { field: "price".into(), expected: FieldType::Float, found: FieldType::Int }
)]
#[case::str_is_not_int(
    vec![("id", FieldValue::from("1")), ("price", FieldValue::Float(2.0))],
    MismatchKind::WrongType { field: "id".into(), expected: FieldType::Int, found: FieldType::Str }
)]
#[case::wrong_type_of_defaulted_field(
    vec![("id", FieldValue::Int(1)), ("price", FieldValue::Float(2.0)), ("note", FieldValue::Bool(true))],
    MismatchKind::WrongType { field: "note".into(), expected: FieldType::Str, found: FieldType::Bool }
)]
#[case::unknown_field(
    vec![("id", FieldValue::Int(1)), ("price", FieldValue::Float(2.0)), ("qty", FieldValue::Int(3))],
    MismatchKind::UnknownField("qty".into())
)]
#[case::smallest_unknown_field_wins(
    vec![("id", FieldValue::Int(1)), ("price", FieldValue::Float(2.0)), ("zz", FieldValue::Int(3)), ("aa", FieldValue::Int(4))],
    MismatchKind::UnknownField("aa".into())
)]
#[case::repeated_value(
    vec![("id", FieldValue::Int(1)), ("price", FieldValue::Float(2.0)), ("id", FieldValue::Int(3))],
    MismatchKind::DuplicateValue("id".into())
)]
fn test_construct_mismatch(
    registry: SchemaRegistry,
    #[case] values: Vec<(&str, FieldValue)>,
    #[case] expected: MismatchKind,
) {
    let err = registry.construct("Order", values).unwrap_err();
    assert!(err.is_mismatch());
    assert_eq!(err, mismatch(expected));
}

/// Тест проверяет, что значение по умолчанию подставляется, а явно
/// переданное его перекрывает.
#[rstest]
#[case::default_used(None, "")]
#[case::default_overridden(Some("rush"), "rush")]
fn test_default_applied(
    registry: SchemaRegistry,
    #[case] note: Option<&str>,
    #[case] expected: &str,
) {
    let mut values = vec![("id", FieldValue::Int(7)), ("price", FieldValue::Float(9.5))];
    if let Some(note) = note {
        values.push(("note", FieldValue::from(note)));
    }

    let event = registry.construct("Order", values).unwrap();
    assert_eq!(event.int("id"), Some(7));
    assert_eq!(event.float("price"), Some(9.5));
    assert_eq!(event.str("note"), Some(expected));
}

#[rstest]
fn test_unknown_schema(registry: SchemaRegistry) {
    let err = registry
        .construct("Refund", [("id", FieldValue::Int(1))])
        .unwrap_err();
    assert_eq!(err, SchemaError::UnknownSchema("Refund".into()));
}

#[rstest]
fn test_redefinition_rejected(registry: SchemaRegistry) {
    let err = registry
        .define("Order", [("id", FieldType::Str)])
        .unwrap_err();
    assert_eq!(err, SchemaError::DuplicateDefinition("Order".into()));

    // Исходная схема не изменилась
    let schema = registry.get("Order").unwrap();
    assert_eq!(schema.fields().len(), 3);
    assert_eq!(schema.field("id").unwrap().ty, FieldType::Int);
}
