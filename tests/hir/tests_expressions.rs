//! Annotation values: constants, typed expressions and casts against
//! declared types.

use crate::helpers::error_assertions::*;
use crate::helpers::model_fixtures::*;
use chrono::{NaiveDate, NaiveTime};
use csdl::PrimitiveKind;
use csdl::hir::{
    ConstantValue, ErrorCode, Expression, ExpressionKind, HasErrors, Model, TypeReference,
    parse_date, parse_time_of_day,
};
use csdl::syntax::{
    ConstantKind, CsdlAnnotation, CsdlDocument, CsdlEnumType, CsdlExpression, CsdlExpressionKind,
    CsdlOperation, CsdlSchema, CsdlStructuredType, CsdlTerm,
};
use rstest::rstest;

/// A schema whose only annotation, on `NS.Thing`, has `value`.
fn annotated(term_type: &str, value: CsdlExpression) -> Model {
    Model::new(
        CsdlDocument::new().with_schema(
            CsdlSchema::new("NS")
                .with_alias("N")
                .with_term(CsdlTerm::new("Value", term_type))
                .with_enum(
                    CsdlEnumType::new("Level")
                        .with_member("Low", None)
                        .with_member("High", None),
                )
                .with_type(CsdlStructuredType::complex("Point"))
                .with_operation(
                    CsdlOperation::function("Twice")
                        .with_parameter("x", "Edm.Int32")
                        .with_return_type("Edm.Int64"),
                )
                .with_type(
                    CsdlStructuredType::complex("Thing")
                        .with_annotation(CsdlAnnotation::new("N.Value").with_value(value)),
                ),
        ),
    )
}

fn value_of(model: &Model) -> &Expression {
    let annotation = model.vocabulary_annotations()[0];
    annotation.value(model).expect("annotation should carry a value")
}

#[rstest]
#[case(ConstantKind::Date, "2024-02-29")]
#[case(ConstantKind::DateTimeOffset, "2024-02-29T12:00:00Z")]
#[case(ConstantKind::Duration, "PT1H")]
#[case(ConstantKind::TimeOfDay, "07:30:00")]
#[case(ConstantKind::Decimal, "-1.25")]
#[case(ConstantKind::Float, "-INF")]
#[case(ConstantKind::Binary, "AQID")]
#[case(ConstantKind::Guid, "21EC2020-3AEA-1069-A2DD-08002B30309D")]
#[case(ConstantKind::EnumMember, "N.Level/High")]
fn test_well_formed_constants(#[case] kind: ConstantKind, #[case] text: &str) {
    let model = annotated("Edm.Untyped", CsdlExpression::constant(kind, text));
    let constant = value_of(&model).as_constant().unwrap();
    assert_eq!(constant.kind(), kind);
    assert_eq!(constant.text(), text);
    assert!(constant.value().is_ok(), "{text}: {:?}", constant.value());
    assert_no_errors(&model.errors());
}

#[rstest]
#[case(ConstantKind::Int, "12x", ErrorCode::InvalidInteger)]
#[case(ConstantKind::Decimal, "1.2.3", ErrorCode::InvalidDecimal)]
#[case(ConstantKind::Float, "infinity", ErrorCode::InvalidFloatingPoint)]
#[case(ConstantKind::TimeOfDay, "25:00", ErrorCode::InvalidTimeOfDay)]
#[case(ConstantKind::DateTimeOffset, "2024-02-29", ErrorCode::InvalidDateTimeOffset)]
#[case(ConstantKind::EnumMember, "N.Level/Medium", ErrorCode::BadUnresolvedEnumMember)]
#[case(ConstantKind::EnumMember, "Level/Low", ErrorCode::InvalidEnumMemberPath)]
fn test_malformed_constants_reach_model_errors(
    #[case] kind: ConstantKind,
    #[case] text: &str,
    #[case] code: ErrorCode,
) {
    let model = annotated("Edm.Untyped", CsdlExpression::constant(kind, text));
    assert!(value_of(&model).as_constant().unwrap().value().is_err());
    assert_error_codes(&model.errors(), &[code]);
}

#[test]
fn test_parsed_values() {
    let model = annotated(
        "Edm.Untyped",
        CsdlExpression::collection(vec![
            CsdlExpression::constant(ConstantKind::Binary, "AQID"),
            CsdlExpression::constant(ConstantKind::EnumMember, "NS.Level/Low"),
            CsdlExpression::constant(ConstantKind::Date, "1999-12-31"),
        ]),
    );
    let ExpressionKind::Collection(elements) = value_of(&model).kind() else {
        panic!("expected a collection");
    };
    let values: Vec<&ConstantValue> = elements
        .iter()
        .map(|element| element.as_constant().unwrap().value().unwrap())
        .collect();

    assert_eq!(values[0], &ConstantValue::Binary(vec![1, 2, 3]));
    let ConstantValue::EnumMember(members) = values[1] else {
        panic!("expected an enum member");
    };
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].name(&model), "Low");
    assert_eq!(members[0].value(&model), 0);
    assert_eq!(
        values[2],
        &ConstantValue::Date(NaiveDate::from_ymd_opt(1999, 12, 31).unwrap())
    );
}

#[test]
fn test_literal_display() {
    assert_eq!(parse_date("0987-01-05").unwrap().to_string(), "0987-01-05");
    let time: NaiveTime = parse_time_of_day("08:05:09.120").unwrap();
    assert_eq!(time.to_string(), "08:05:09.120");
    assert_eq!(parse_time_of_day("08:05").unwrap().to_string(), "08:05:00");
}

#[test]
fn test_static_types() {
    let model = annotated(
        "Edm.Untyped",
        CsdlExpression::new(CsdlExpressionKind::If {
            test: Box::new(CsdlExpression::bool(true)),
            if_true: Box::new(CsdlExpression::apply("N.Twice", vec![CsdlExpression::int(2)])),
            if_false: Some(Box::new(CsdlExpression::cast("Edm.Int64", CsdlExpression::int(0)))),
        }),
    );
    let value = value_of(&model);
    let ty = value.static_type(&model).expect("typed branch");
    assert_eq!(ty.full_name(&model), "Edm.Int64");
    assert!(value.try_cast(&model, &TypeReference::primitive(PrimitiveKind::Int64, false), true));
    assert!(!value.try_cast(&model, &TypeReference::primitive(PrimitiveKind::String, false), false));
    assert_no_errors(&model.errors());
}

#[test]
fn test_cast_to_unknown_type() {
    let model = annotated("Edm.Untyped", CsdlExpression::cast("N.Nowhere", CsdlExpression::int(1)));
    let value = value_of(&model);
    let ExpressionKind::Cast { type_reference, .. } = value.kind() else {
        panic!("expected a cast");
    };
    assert!(type_reference.definition().is_unresolved());
    assert_error_codes(&value.errors(&model), &[ErrorCode::BadUnresolvedType]);
}

#[test]
fn test_record_types() {
    let model = annotated(
        "NS.Point",
        CsdlExpression::collection(vec![
            CsdlExpression::record(Some("N.Point"), vec![("X", CsdlExpression::int(1))]),
            CsdlExpression::record(None, vec![]),
            CsdlExpression::record(Some("N.Missing"), vec![]),
        ]),
    );
    let ExpressionKind::Collection(records) = value_of(&model).kind() else {
        panic!("expected a collection");
    };
    let point = structured(&model, "NS.Point");
    let ExpressionKind::Record { type_name, properties } = records[0].kind() else {
        panic!("expected a record");
    };
    assert_eq!(type_name.as_ref().and_then(|t| t.resolved()), Some(&point));
    assert_eq!(properties[0].property, "X");

    let term_type = term(&model, "NS.Value").type_reference(&model);
    assert!(records[0].try_cast(&model, &term_type, true));
    assert!(records[1].try_cast(&model, &term_type, true));
    assert!(!records[2].try_cast(&model, &term_type, false));
    assert_error_codes(&model.errors(), &[ErrorCode::BadUnresolvedComplexType]);
}

#[test]
fn test_apply_binds_against_model_overloads() {
    let model = annotated("Edm.Int64", CsdlExpression::apply("N.Twice", vec![CsdlExpression::int(2)]));
    let value = value_of(&model);
    let twice = only_operation(&model, "NS.Twice");
    assert_eq!(value.function_binding(&model).and_then(|b| b.into_resolved()), Some(twice));

    let term_type = term(&model, "N.Value").type_reference(&model);
    assert!(value.try_cast(&model, &term_type, true));
    assert!(!value.has_errors(&model));
}
