//! Function overload resolution for `Apply` expressions and lookups.

use crate::helpers::error_assertions::*;
use csdl::hir::{ErrorCode, Expression, HasErrors, Model, Resolution};
use csdl::syntax::{
    ConstantKind, CsdlAnnotation, CsdlDocument, CsdlExpression, CsdlOperation, CsdlSchema,
    CsdlStructuredType, CsdlTerm,
};
use rstest::rstest;

fn overloads() -> Model {
    Model::new(
        CsdlDocument::new().with_schema(
            CsdlSchema::new("NS")
                .with_operation(
                    CsdlOperation::function("F")
                        .with_parameter("x", "Edm.Int32")
                        .with_return_type("Edm.String"),
                )
                .with_operation(
                    CsdlOperation::function("F")
                        .with_parameter("x", "Edm.String")
                        .with_return_type("Edm.String"),
                )
                .with_operation(
                    CsdlOperation::function("Widen")
                        .with_parameter("x", "Edm.Int64")
                        .with_return_type("Edm.Int64"),
                )
                .with_operation(
                    CsdlOperation::function("Widen")
                        .with_parameter("x", "Edm.Double")
                        .with_return_type("Edm.Double"),
                )
                .with_operation(CsdlOperation::function("Dup").with_parameter("x", "Edm.Int32"))
                .with_operation(CsdlOperation::function("Dup").with_parameter("y", "Edm.Int32"))
                .with_operation(CsdlOperation::action("Act").with_parameter("x", "Edm.Int32")),
        ),
    )
}

fn bind(model: &Model, name: &str, arguments: Vec<CsdlExpression>) -> Resolution<csdl::hir::OperationId> {
    let arguments: Vec<Expression> = arguments
        .iter()
        .map(|argument| Expression::build(model, argument))
        .collect();
    model.resolve_overload(name, &arguments, None)
}

#[test]
fn test_int_argument_picks_int32_overload() {
    let model = overloads();
    let binding = bind(&model, "NS.F", vec![CsdlExpression::int(5)]);
    let Resolution::Resolved(function) = binding else {
        panic!("expected a single overload, got {binding:?}");
    };
    assert_eq!(function.signature(&model), "NS.F(Edm.Int32)");
}

#[test]
fn test_string_argument_picks_string_overload() {
    let model = overloads();
    let function = bind(&model, "NS.F", vec![CsdlExpression::string("x")])
        .into_resolved()
        .unwrap();
    assert_eq!(function.signature(&model), "NS.F(Edm.String)");
}

#[test]
fn test_no_matching_overload() {
    let model = overloads();
    let binding = bind(&model, "NS.F", vec![CsdlExpression::bool(true)]);
    let placeholder = binding.placeholder().expect("unresolved binding");
    assert_eq!(placeholder.error().code, ErrorCode::NoMatchingOverload);
    assert!(placeholder.error().message.contains("2 overload(s)"));
}

#[rstest]
#[case(vec![], ErrorCode::NoMatchingOverload)]
#[case(vec![CsdlExpression::int(1), CsdlExpression::int(2)], ErrorCode::NoMatchingOverload)]
fn test_arity_mismatch(#[case] arguments: Vec<CsdlExpression>, #[case] code: ErrorCode) {
    let model = overloads();
    let binding = bind(&model, "NS.F", arguments);
    assert_eq!(binding.placeholder().map(|p| p.error().code), Some(code));
}

#[test]
fn test_duplicate_signatures_are_ambiguous() {
    let model = overloads();
    let binding = bind(&model, "NS.Dup", vec![CsdlExpression::int(1)]);
    assert!(binding.is_ambiguous());
    assert_eq!(binding.candidates().len(), 2);
    assert_error_codes(&binding.placeholder_errors(), &[ErrorCode::BadAmbiguousElementBinding]);
}

#[test]
fn test_promotions_compete_without_exact_match() {
    let model = overloads();
    // An integer constant fits Int64 exactly and Double only by promotion.
    let binding = bind(&model, "NS.Widen", vec![CsdlExpression::int(3)]);
    assert_eq!(
        binding.into_resolved().map(|f| f.signature(&model)),
        Some("NS.Widen(Edm.Int64)".to_string())
    );

    // A float fits Double exactly; Int64 never accepts it.
    let binding = bind(
        &model,
        "NS.Widen",
        vec![CsdlExpression::constant(ConstantKind::Float, "2.5")],
    );
    assert_eq!(
        binding.into_resolved().map(|f| f.signature(&model)),
        Some("NS.Widen(Edm.Double)".to_string())
    );
}

#[test]
fn test_actions_are_not_candidates() {
    let model = overloads();
    let binding = bind(&model, "NS.Act", vec![CsdlExpression::int(1)]);
    assert_eq!(
        binding.placeholder().map(|p| p.error().code),
        Some(ErrorCode::BadUnresolvedOperation)
    );
}

#[test]
fn test_resolution_is_deterministic() {
    let model = overloads();
    let first = bind(&model, "NS.F", vec![CsdlExpression::int(7)]);
    for _ in 0..10 {
        assert_eq!(bind(&model, "NS.F", vec![CsdlExpression::int(7)]), first);
    }
}

#[test]
fn test_apply_in_annotation_binds_once() {
    let document = CsdlDocument::new().with_schema(
        CsdlSchema::new("NS")
            .with_term(CsdlTerm::new("Computed", "Edm.String"))
            .with_operation(
                CsdlOperation::function("Label")
                    .with_parameter("x", "Edm.Int32")
                    .with_return_type("Edm.String"),
            )
            .with_type(
                CsdlStructuredType::complex("Thing").with_annotation(
                    CsdlAnnotation::new("NS.Computed")
                        .with_value(CsdlExpression::apply("NS.Label", vec![CsdlExpression::int(1)])),
                ),
            ),
    );
    let model = Model::new(document);
    let annotation = model.vocabulary_annotations()[0];
    let value = annotation.value(&model).expect("annotation value");

    let first = value.function_binding(&model).expect("apply binding");
    let second = value.function_binding(&model).expect("apply binding");
    assert_eq!(first, second);
    assert!(first.is_resolved());
    assert!(!annotation.has_errors(&model));
    assert_no_errors(&model.errors());
}
