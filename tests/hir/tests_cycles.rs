//! Cycle detection in base type, base term and container extension chains.

use std::rc::Rc;

use crate::helpers::error_assertions::*;
use crate::helpers::model_fixtures::*;
use csdl::hir::{ErrorCode, HasErrors, Model, Resolution};
use csdl::syntax::{CsdlDocument, CsdlEntityContainer, CsdlSchema, CsdlStructuredType, CsdlTerm};
use rstest::rstest;

// =============================================================================
// BASE TYPES
// =============================================================================

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(7)]
#[case(50)]
fn test_every_type_on_a_cycle_is_cyclic(#[case] length: usize) {
    let model = Model::new(CsdlDocument::new().with_schema(entity_cycle(length)));

    for i in 0..length {
        let ty = structured(&model, &format!("NS.T{i}"));
        let base = ty.base_type(&model).expect("declared base type");
        assert!(base.is_cyclic(), "T{i} of a {length}-cycle should be cyclic");
        assert_eq!(base.placeholder().map(|p| p.name()), Some(format!("NS.T{i}").as_str()));
    }
    assert_error_codes(&model.errors(), &vec![ErrorCode::BadCyclicEntity; length]);
}

#[rstest]
#[case(0)]
#[case(4)]
#[case(9)]
fn test_cycle_detected_from_any_entry_point(#[case] entry: usize) {
    let model = Model::new(CsdlDocument::new().with_schema(entity_cycle(10)));

    // Force the chain from a different starting type first.
    let first = structured(&model, &format!("NS.T{entry}"));
    assert!(first.base_type(&model).unwrap().is_cyclic());
    for i in 0..10 {
        assert!(structured(&model, &format!("NS.T{i}")).base_type(&model).unwrap().is_cyclic());
    }
}

#[test]
fn test_type_deriving_from_a_cycle_still_resolves_its_base() {
    let schema = entity_cycle(3)
        .with_type(CsdlStructuredType::entity("Outside").with_base_type("NS.T0"));
    let model = Model::new(CsdlDocument::new().with_schema(schema));

    let outside = structured(&model, "NS.Outside");
    let t0 = structured(&model, "NS.T0");
    assert_eq!(outside.base_type(&model), Some(Resolution::Resolved(t0)));
    assert!(!outside.has_errors(&model));
    assert!(t0.base_type(&model).unwrap().is_cyclic());
}

#[test]
fn test_downstream_type_forced_first() {
    let schema = entity_cycle(4)
        .with_type(CsdlStructuredType::entity("Outside").with_base_type("NS.T2"));
    let model = Model::new(CsdlDocument::new().with_schema(schema));

    let outside = structured(&model, "NS.Outside");
    assert_eq!(
        outside.base_type(&model),
        Some(Resolution::Resolved(structured(&model, "NS.T2")))
    );
    for i in 0..4 {
        assert!(structured(&model, &format!("NS.T{i}")).base_type(&model).unwrap().is_cyclic());
    }
}

#[test]
fn test_cycle_through_alias() {
    let schema = CsdlSchema::new("Very.Long.Namespace")
        .with_alias("V")
        .with_type(CsdlStructuredType::complex("A").with_base_type("V.B"))
        .with_type(CsdlStructuredType::complex("B").with_base_type("Very.Long.Namespace.A"));
    let model = Model::new(CsdlDocument::new().with_schema(schema));

    assert!(structured(&model, "V.A").base_type(&model).unwrap().is_cyclic());
    assert!(structured(&model, "V.B").base_type(&model).unwrap().is_cyclic());
    assert_error_codes(
        &model.errors(),
        &[ErrorCode::BadCyclicComplex, ErrorCode::BadCyclicComplex],
    );
}

#[test]
fn test_base_types_of_cyclic_type_terminate() {
    let model = Model::new(CsdlDocument::new().with_schema(entity_cycle(5)));
    let t0 = structured(&model, "NS.T0");
    assert!(t0.base_types(&model).is_empty());
    assert!(t0.properties(&model).is_empty());
    assert!(model.find_all_derived_types(t0).is_empty());
}

#[test]
fn test_cyclic_placeholder_is_memoized() {
    let model = Model::new(CsdlDocument::new().with_schema(entity_cycle(2)));
    let t0 = structured(&model, "NS.T0");

    let (Some(Resolution::Unresolved(first)), Some(Resolution::Unresolved(second))) =
        (t0.base_type(&model), t0.base_type(&model))
    else {
        panic!("expected cyclic placeholders");
    };
    assert!(Rc::ptr_eq(&first, &second));
}

// =============================================================================
// TERMS AND CONTAINERS
// =============================================================================

#[rstest]
#[case(1)]
#[case(5)]
fn test_term_cycles(#[case] length: usize) {
    let mut schema = CsdlSchema::new("Vocab");
    for i in 0..length {
        schema = schema.with_term(
            CsdlTerm::new(format!("T{i}"), "Edm.String").with_base_term(format!("Vocab.T{}", (i + 1) % length)),
        );
    }
    let model = Model::new(CsdlDocument::new().with_schema(schema));

    for i in 0..length {
        assert!(term(&model, &format!("Vocab.T{i}")).base_term(&model).unwrap().is_cyclic());
    }
    assert_error_codes(&model.errors(), &vec![ErrorCode::BadCyclicTerm; length]);
}

#[test]
fn test_container_extends_cycle() {
    let schema = CsdlSchema::new("NS")
        .with_container(CsdlEntityContainer::new("A").with_extends("NS.B"))
        .with_container(CsdlEntityContainer::new("B").with_extends("NS.A"))
        .with_container(CsdlEntityContainer::new("C").with_extends("NS.A"));
    let model = Model::new(CsdlDocument::new().with_schema(schema));

    let container = |name| model.find_entity_container(name).into_resolved().unwrap();
    assert!(container("NS.A").extends(&model).unwrap().is_cyclic());
    assert!(container("NS.B").extends(&model).unwrap().is_cyclic());
    assert_eq!(
        container("NS.C").extends(&model),
        Some(Resolution::Resolved(container("NS.A")))
    );
    assert_eq!(container("NS.C").lineage(&model).len(), 2);
    assert_error_codes(
        &model.errors(),
        &[ErrorCode::BadCyclicEntityContainer, ErrorCode::BadCyclicEntityContainer],
    );
}

#[test]
fn test_acyclic_chain_has_no_errors() {
    let model = sales_model();
    let vip = structured(&model, "S.VipCustomer");
    assert_eq!(vip.base_types(&model), vec![structured(&model, "Sales.Customer")]);
    assert_no_errors(&model.errors());
}
