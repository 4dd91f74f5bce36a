//! Referenced documents: include aliases, cross-document resolution and
//! `IncludeAnnotations` filtering.

use crate::helpers::error_assertions::*;
use crate::helpers::model_fixtures::*;
use csdl::hir::{ElementRef, Model, ModelOptions, SchemaType};
use csdl::syntax::{
    CsdlAnnotation, CsdlAnnotations, CsdlDocument, CsdlExpression, CsdlIncludeAnnotations,
    CsdlProperty, CsdlReference, CsdlSchema, CsdlStructuredType, CsdlTerm,
};
use rstest::rstest;

/// `Org.Common` (own alias `C`) with an entity `Base` annotated three times
/// out of line, plus the two vocabularies it uses.
fn common_document() -> CsdlDocument {
    CsdlDocument::new()
        .with_schema(
            CsdlSchema::new("Org.Vocab")
                .with_alias("OV")
                .with_term(CsdlTerm::new("Label", "Edm.String")),
        )
        .with_schema(CsdlSchema::new("Other.Vocab").with_term(CsdlTerm::new("Note", "Edm.String")))
        .with_schema(
            CsdlSchema::new("Org.Common")
                .with_alias("C")
                .with_type(
                    CsdlStructuredType::entity("Base")
                        .with_key(["Id"])
                        .with_property(CsdlProperty::new("Id", "Edm.Int32").with_nullable(false)),
                )
                .with_annotations(
                    CsdlAnnotations::new("C.Base")
                        .with_annotation(
                            CsdlAnnotation::new("OV.Label").with_value(CsdlExpression::string("base")),
                        )
                        .with_annotation(
                            CsdlAnnotation::new("OV.Label")
                                .with_qualifier("Phone")
                                .with_value(CsdlExpression::string("b")),
                        )
                        .with_annotation(
                            CsdlAnnotation::new("Other.Vocab.Note")
                                .with_value(CsdlExpression::string("note")),
                        ),
                ),
        )
}

fn main_document(include: Option<CsdlIncludeAnnotations>) -> CsdlDocument {
    let mut reference = CsdlReference::new("https://example.org/common.xml", common_document())
        .with_include("Org.Common", Some("Common"))
        .with_include("Org.Vocab", Some("V"));
    if let Some(include) = include {
        reference = reference.with_include_annotations(include);
    }
    CsdlDocument::new().with_reference(reference).with_schema(
        CsdlSchema::new("App").with_type(
            CsdlStructuredType::entity("Derived")
                .with_base_type("Common.Base")
                .with_property(CsdlProperty::new("Extra", "Edm.String"))
                .with_annotation(CsdlAnnotation::new("V.Label").with_value(CsdlExpression::string("d"))),
        ),
    )
}

fn qualified(term_namespace: &str, qualifier: Option<&str>, target: Option<&str>) -> CsdlIncludeAnnotations {
    let mut include = CsdlIncludeAnnotations::new(term_namespace);
    include.qualifier = qualifier.map(str::to_string);
    include.target_namespace = target.map(str::to_string);
    include
}

#[test]
fn test_base_type_resolves_through_include_alias() {
    let model = Model::new(main_document(None));
    let derived = structured(&model, "App.Derived");
    let base = structured(&model, "Common.Base");

    assert_eq!(base.full_name(&model), "Org.Common.Base");
    assert_ne!(base.model(), model.id());
    assert_eq!(derived.base_types(&model), vec![base]);
    assert_eq!(derived.key(&model).map(<[_]>::len), Some(1));
    assert_eq!(derived.properties(&model).len(), 2);
    assert_eq!(model.find_direct_derived_types(base), vec![derived]);
    assert_no_errors(&model.errors());
}

#[test]
fn test_aliases_are_per_document() {
    let model = Model::new(main_document(None));
    assert_eq!(model.replace_alias("Common.Base").as_deref(), Some("Org.Common.Base"));
    // The referenced document's own alias is not visible to the referencer.
    assert_eq!(model.replace_alias("C.Base"), None);
    assert!(model.find_type("C.Base").is_unresolved());

    let reference = &model.references()[0];
    assert_eq!(reference.uri(), "https://example.org/common.xml");
    assert_eq!(reference.includes().len(), 2);
    let common = reference.model();
    assert!(common.find_type("C.Base").is_resolved());
    assert_eq!(common.alias_namespace("OV"), Some("Org.Vocab"));
}

#[rstest]
#[case(None, 0)]
#[case(Some(qualified("Org.Vocab", None, None)), 2)]
#[case(Some(qualified("Org.Vocab", Some("Phone"), None)), 1)]
#[case(Some(qualified("Other.Vocab", None, None)), 1)]
#[case(Some(qualified("Org.Vocab", None, Some("Org.Common"))), 2)]
#[case(Some(qualified("Org.Vocab", None, Some("Elsewhere"))), 0)]
fn test_include_annotations_selects(
    #[case] include: Option<CsdlIncludeAnnotations>,
    #[case] merged: usize,
) {
    let model = Model::new(main_document(include));
    let own = 1;
    assert_eq!(model.vocabulary_annotations().len(), own + merged);

    let base = structured(&model, "Common.Base");
    assert_eq!(base.vocabulary_annotations(&model).len(), merged);
}

#[test]
fn test_include_all_referenced_annotations_option() {
    let model = Model::with_options(
        main_document(None),
        ModelOptions::default().with_all_referenced_annotations(true),
    );
    let base = structured(&model, "Common.Base");
    let annotations = base.vocabulary_annotations(&model);
    assert_eq!(annotations.len(), 3);

    let terms: Vec<String> = annotations
        .iter()
        .map(|annotation| annotation.term_name(&model))
        .collect();
    assert_eq!(terms, ["Org.Vocab.Label", "Org.Vocab.Label", "Other.Vocab.Note"]);
    assert_eq!(annotations[1].qualifier(&model), Some("Phone"));
    for annotation in annotations {
        assert!(annotation.term(&model).is_resolved());
        assert_eq!(
            annotation.target(&model).into_resolved(),
            Some(ElementRef::Type(SchemaType::Structured(base)))
        );
    }
}

#[test]
fn test_path_lookup_normalizes_with_referencing_aliases() {
    let model = Model::new(main_document(Some(qualified("Org.Vocab", None, None))));
    assert_eq!(model.find_vocabulary_annotations_for_path("Common.Base").len(), 2);
    assert_eq!(model.find_vocabulary_annotations_for_path("Org.Common.Base").len(), 2);
}

#[test]
fn test_referenced_errors_are_reported() {
    let broken = CsdlDocument::new().with_schema(
        CsdlSchema::new("Lib").with_type(CsdlStructuredType::entity("Bad").with_base_type("Lib.Gone")),
    );
    let model = Model::new(
        CsdlDocument::new()
            .with_reference(CsdlReference::new("lib.xml", broken).with_include("Lib", None))
            .with_schema(CsdlSchema::new("App")),
    );
    let errors = model.errors();
    assert_eq!(codes(&errors), vec![csdl::ErrorCode::BadUnresolvedEntityType]);
    assert!(model.references()[0].model().has_errors());
}
