//! Out-of-line annotation targets and annotation lookup.

use crate::helpers::error_assertions::*;
use crate::helpers::model_fixtures::*;
use csdl::hir::{ElementRef, ErrorCode, HasErrors, Model, PlaceholderKind, Resolution};
use csdl::syntax::{
    CsdlAnnotation, CsdlAnnotations, CsdlDocument, CsdlEntityContainer, CsdlExpression,
    CsdlOperation, CsdlOperationImport, CsdlProperty, CsdlReference, CsdlSchema,
    CsdlStructuredType, CsdlTerm,
};
use rstest::rstest;

fn vocabulary() -> CsdlSchema {
    CsdlSchema::new("Org.Vocab")
        .with_alias("V")
        .with_term(CsdlTerm::new("Label", "Edm.String"))
        .with_term(CsdlTerm::new("Rank", "Edm.Int32"))
}

/// The sales document plus a vocabulary and one annotation block targeting
/// `target`.
fn annotated(target: &str) -> Model {
    let mut document = sales_document().with_schema(vocabulary());
    document.schemas[0] = document.schemas[0]
        .clone()
        .with_operation(
            CsdlOperation::function("Top")
                .with_parameter("count", "Edm.Int32")
                .with_return_type("Collection(S.Customer)"),
        )
        .with_annotations(
            CsdlAnnotations::new(target)
                .with_annotation(CsdlAnnotation::new("V.Label").with_value(CsdlExpression::string("x"))),
        );
    Model::new(document)
}

fn only_annotation(model: &Model) -> csdl::hir::AnnotationId {
    let annotations = model.vocabulary_annotations();
    assert_eq!(annotations.len(), 1);
    annotations[0]
}

#[rstest]
#[case("S.Customer")]
#[case("Sales.Customer/Name")]
#[case("S.Service/Customers")]
#[case("S.Service/Me")]
#[case("S.Service")]
#[case("V.Label")]
#[case("S.Top")]
#[case("S.Top(Edm.Int32)/count")]
#[case("Sales.Top/$ReturnType")]
fn test_target_resolves_and_is_found_from_element(#[case] target: &str) {
    let model = annotated(target);
    let annotation = only_annotation(&model);

    let Resolution::Resolved(element) = annotation.target(&model) else {
        panic!("'{target}' should resolve, got {:?}", annotation.target(&model));
    };
    assert!(!annotation.is_inline(&model));
    assert_eq!(annotation.target_path(&model), Some(target));
    assert_eq!(element.vocabulary_annotations(&model), vec![annotation]);
    assert_no_errors(&model.errors());
}

#[test]
fn test_alias_and_full_name_paths_are_equivalent() {
    let model = annotated("S.Service/Customers");
    let annotation = only_annotation(&model);
    assert_eq!(
        model.find_vocabulary_annotations_for_path("Sales.Service/Customers"),
        vec![annotation]
    );
    assert_eq!(
        model.find_vocabulary_annotations_for_path("S.Service/Customers"),
        vec![annotation]
    );

    let customers = model
        .find_entity_container("Sales.Service")
        .into_resolved()
        .and_then(|service| service.find_entity_set(&model, "Customers"))
        .unwrap();
    assert_eq!(customers.vocabulary_annotations(&model), vec![annotation]);
}

#[rstest]
#[case("S.Service/NoSuchSet", PlaceholderKind::EntitySet, ErrorCode::BadUnresolvedEntitySet)]
#[case("S.Customer/Nope", PlaceholderKind::Property, ErrorCode::BadUnresolvedProperty)]
#[case("S.Nothing", PlaceholderKind::Type, ErrorCode::BadUnresolvedType)]
#[case("S.Top(Edm.String)", PlaceholderKind::Operation, ErrorCode::BadUnresolvedOperation)]
#[case("S.Top/nope", PlaceholderKind::Parameter, ErrorCode::BadUnresolvedParameter)]
#[case(
    "S.Service/Customers/Orders/Extra",
    PlaceholderKind::ImpossibleTarget,
    ErrorCode::ImpossibleAnnotationsTarget
)]
fn test_unresolved_targets(
    #[case] target: &str,
    #[case] kind: PlaceholderKind,
    #[case] code: ErrorCode,
) {
    let model = annotated(target);
    let annotation = only_annotation(&model);
    let resolved = annotation.target(&model);

    assert_eq!(resolved.placeholder().map(|p| p.kind()), Some(kind));
    assert_error_codes(&annotation.errors(&model), &[code]);
    assert_error_codes(&model.errors(), &[code]);
}

#[test]
fn test_unknown_term_is_reported() {
    let mut document = sales_document().with_schema(vocabulary());
    document.schemas[0] = document.schemas[0].clone().with_annotations(
        CsdlAnnotations::new("S.Customer").with_annotation(CsdlAnnotation::new("V.Missing")),
    );
    let model = Model::new(document);
    let annotation = only_annotation(&model);

    assert!(annotation.term(&model).is_unresolved());
    assert_eq!(annotation.term_name(&model), "Org.Vocab.Missing");
    assert_error_codes(&model.errors(), &[ErrorCode::BadUnresolvedTerm]);
}

#[test]
fn test_inline_and_out_of_line_annotations_merge() {
    let mut document = sales_document().with_schema(vocabulary());
    let customer = document.schemas[0].structured_types[0]
        .clone()
        .with_annotation(CsdlAnnotation::new("V.Rank").with_value(CsdlExpression::int(1)));
    document.schemas[0].structured_types[0] = customer;
    document.schemas[0] = document.schemas[0].clone().with_annotations(
        CsdlAnnotations::new("Sales.Customer")
            .with_qualifier("Tablet")
            .with_annotation(CsdlAnnotation::new("V.Label").with_value(CsdlExpression::string("c"))),
    );
    let model = Model::new(document);
    let customer = structured(&model, "Sales.Customer");

    let annotations = customer.vocabulary_annotations(&model);
    assert_eq!(annotations.len(), 2);
    assert!(annotations[0].is_inline(&model));
    assert_eq!(annotations[0].term_name(&model), "Org.Vocab.Rank");
    assert_eq!(annotations[0].qualifier(&model), None);
    assert_eq!(
        annotations[0].target(&model),
        Resolution::Resolved(ElementRef::Type(csdl::hir::SchemaType::Structured(customer)))
    );
    assert_eq!(annotations[1].qualifier(&model), Some("Tablet"));
    assert_eq!(
        annotations[1].term(&model),
        Resolution::Resolved(term(&model, "V.Label"))
    );
    assert!(!customer.has_errors(&model));
}

/// Two unbound `NS.F` overloads behind one function import `NS.C/Run`, with
/// one annotation block targeting `target`.
fn overloaded_import(target: &str) -> Model {
    Model::new(
        CsdlDocument::new().with_schema(vocabulary()).with_schema(
            CsdlSchema::new("NS")
                .with_operation(
                    CsdlOperation::function("F")
                        .with_parameter("x", "Edm.Int32")
                        .with_return_type("Edm.String"),
                )
                .with_operation(
                    CsdlOperation::function("F")
                        .with_parameter("x", "Edm.String")
                        .with_parameter("y", "Edm.Boolean")
                        .with_return_type("Edm.String"),
                )
                .with_container(
                    CsdlEntityContainer::new("C").with_import(CsdlOperationImport::function("Run", "NS.F")),
                )
                .with_annotations(
                    CsdlAnnotations::new(target).with_annotation(
                        CsdlAnnotation::new("V.Label").with_value(CsdlExpression::string("x")),
                    ),
                ),
        ),
    )
}

#[rstest]
#[case("NS.C/Run")]
#[case("NS.C/Run/$ReturnType")]
#[case("NS.C/Run/y")]
fn test_overloaded_function_import_targets_resolve(#[case] target: &str) {
    let model = overloaded_import(target);
    let annotation = only_annotation(&model);

    assert!(annotation.target(&model).is_resolved(), "{target}: {:?}", annotation.target(&model));
    assert_no_errors(&model.errors());

    let run = model
        .find_entity_container("NS.C")
        .into_resolved()
        .map(|c| c.find_operation_imports(&model, "Run"))
        .unwrap();
    assert_eq!(run[0].operations(&model).len(), 2);
    assert!(run[0].operation(&model).is_ambiguous());
}

#[test]
fn test_parameter_shared_by_import_overloads_is_ambiguous() {
    let model = overloaded_import("NS.C/Run/x");
    let annotation = only_annotation(&model);
    let target = annotation.target(&model);

    assert!(target.is_ambiguous());
    assert_eq!(target.candidates().len(), 2);
    assert!(target
        .candidates()
        .iter()
        .all(|candidate| matches!(candidate, ElementRef::ImportParameter { .. })));
    assert_error_codes(&model.errors(), &[ErrorCode::BadAmbiguousElementBinding]);
}

fn thing_library(uri: &str) -> CsdlReference {
    CsdlReference::new(
        uri,
        CsdlDocument::new().with_schema(
            CsdlSchema::new("Dup").with_type(
                CsdlStructuredType::entity("Thing").with_property(CsdlProperty::new("Id", "Edm.Int32")),
            ),
        ),
    )
    .with_include("Dup", None)
}

#[rstest]
#[case("Dup.Thing")]
#[case("Dup.Thing/Id")]
fn test_type_declared_by_two_references_is_ambiguous_target(#[case] target: &str) {
    let model = Model::new(
        CsdlDocument::new()
            .with_reference(thing_library("a.xml"))
            .with_reference(thing_library("b.xml"))
            .with_schema(vocabulary().with_annotations(
                CsdlAnnotations::new(target).with_annotation(
                    CsdlAnnotation::new("V.Label").with_value(CsdlExpression::string("x")),
                ),
            )),
    );
    let annotation = only_annotation(&model);
    let resolved = annotation.target(&model);

    assert!(resolved.is_ambiguous(), "{target}: {resolved:?}");
    assert_eq!(resolved.candidates().len(), 2);
    assert_error_codes(&annotation.errors(&model), &[ErrorCode::BadAmbiguousElementBinding]);
}
