//! Entity containers: extends chains, members and operation imports.

use crate::helpers::error_assertions::*;
use crate::helpers::model_fixtures::*;
use csdl::hir::{ContainerId, ErrorCode, HasErrors, Model, NavigationSource, Resolution};
use csdl::syntax::{
    CsdlDocument, CsdlEntityContainer, CsdlEntitySet, CsdlOperation, CsdlOperationImport,
    CsdlSchema, CsdlSingleton, CsdlStructuredType,
};
use rstest::rstest;

fn container(model: &Model, name: &str) -> ContainerId {
    model
        .find_entity_container(name)
        .into_resolved()
        .unwrap_or_else(|| panic!("'{name}' should be a container"))
}

fn layered() -> Model {
    let document = CsdlDocument::new().with_schema(
        CsdlSchema::new("NS")
            .with_alias("N")
            .with_type(CsdlStructuredType::entity("Person"))
            .with_type(CsdlStructuredType::complex("Address"))
            .with_operation(CsdlOperation::function("Count").with_return_type("Edm.Int32"))
            .with_operation(
                CsdlOperation::function("Find")
                    .with_parameter("name", "Edm.String")
                    .with_return_type("Collection(NS.Person)"),
            )
            .with_container(
                CsdlEntityContainer::new("Root")
                    .with_entity_set(CsdlEntitySet::new("People", "NS.Person"))
                    .with_singleton(CsdlSingleton::new("Admin", "N.Person"))
                    .with_import(CsdlOperationImport::function("Count", "NS.Count")),
            )
            .with_container(
                CsdlEntityContainer::new("Middle")
                    .with_extends("N.Root")
                    .with_entity_set(CsdlEntitySet::new("Staff", "NS.Person")),
            )
            .with_container(
                CsdlEntityContainer::new("Leaf")
                    .with_extends("NS.Middle")
                    .with_entity_set(CsdlEntitySet::new("People", "NS.Person"))
                    .with_import(
                        CsdlOperationImport::function("Find", "NS.Find")
                            .with_entity_set("NS.Root/People"),
                    ),
            ),
    );
    Model::new(document)
}

#[test]
fn test_lineage_follows_extends() {
    let model = layered();
    let leaf = container(&model, "NS.Leaf");
    let middle = container(&model, "NS.Middle");
    let root = container(&model, "N.Root");

    assert_eq!(leaf.extends(&model), Some(Resolution::Resolved(middle)));
    assert_eq!(leaf.lineage(&model), vec![leaf, middle, root]);
    assert_eq!(root.extends(&model), None);
    assert_no_errors(&model.errors());
}

#[test]
fn test_member_lookup_prefers_nearest_container() {
    let model = layered();
    let leaf = container(&model, "NS.Leaf");
    let root = container(&model, "NS.Root");

    let people = leaf.find_entity_set(&model, "People").unwrap();
    assert_eq!(people.container(), leaf);
    assert_eq!(leaf.find_entity_set(&model, "Staff").unwrap().container(), container(&model, "NS.Middle"));
    assert_eq!(leaf.all_entity_sets(&model).len(), 3);

    let admin = leaf.find_singleton(&model, "Admin").unwrap();
    assert_eq!(admin.container(), root);
    assert_eq!(
        leaf.find_navigation_source(&model, "Admin"),
        Some(NavigationSource::Singleton(admin))
    );
    assert_eq!(leaf.find_operation_imports(&model, "Count").len(), 1);
    assert!(leaf.find_entity_set(&model, "Nobody").is_none());
}

#[test]
fn test_import_entity_set_with_container_path() {
    let model = layered();
    let leaf = container(&model, "NS.Leaf");
    let root = container(&model, "NS.Root");
    let find = leaf.find_operation_imports(&model, "Find")[0];

    let set = find.entity_set(&model).expect("declared entity set");
    assert_eq!(set.into_resolved().map(|set| set.container()), Some(root));
    assert_eq!(find.parameters(&model).len(), 1);
    assert_eq!(
        find.operation(&model).into_resolved().map(|op| op.full_name(&model)),
        Some("NS.Find".into())
    );
}

#[rstest]
#[case(2)]
#[case(3)]
fn test_extends_cycle_marks_every_container(#[case] length: usize) {
    let mut schema = CsdlSchema::new("NS");
    for i in 0..length {
        schema = schema.with_container(
            CsdlEntityContainer::new(format!("C{i}")).with_extends(format!("NS.C{}", (i + 1) % length)),
        );
    }
    let model = Model::new(CsdlDocument::new().with_schema(schema));

    for i in 0..length {
        let name = format!("NS.C{i}");
        let extends = container(&model, &name).extends(&model).unwrap();
        assert!(extends.is_cyclic(), "{name} should be cyclic");
        assert_eq!(extends.placeholder().unwrap().name(), name);
        assert_eq!(container(&model, &name).lineage(&model).len(), 1);
    }
    assert_error_codes(&model.errors(), &vec![ErrorCode::BadCyclicEntityContainer; length]);
}

#[test]
fn test_unknown_extends() {
    let model = Model::new(CsdlDocument::new().with_schema(
        CsdlSchema::new("NS").with_container(CsdlEntityContainer::new("C").with_extends("NS.Gone")),
    ));
    let extends = container(&model, "NS.C").extends(&model).unwrap();
    assert_eq!(extends.placeholder().unwrap().name(), "NS.Gone");
    assert_error_codes(&model.errors(), &[ErrorCode::BadUnresolvedEntityContainer]);
}

#[test]
fn test_member_types_must_be_entities() {
    let model = Model::new(CsdlDocument::new().with_schema(
        CsdlSchema::new("NS")
            .with_type(CsdlStructuredType::complex("Address"))
            .with_container(
                CsdlEntityContainer::new("C")
                    .with_entity_set(CsdlEntitySet::new("Addresses", "NS.Address"))
                    .with_singleton(CsdlSingleton::new("Nowhere", "NS.Missing")),
            ),
    ));
    let c = container(&model, "NS.C");
    let addresses = c.find_entity_set(&model, "Addresses").unwrap();
    assert_eq!(
        addresses.entity_type(&model).placeholder().map(|p| p.name().to_string()),
        Some("NS.Address".to_string())
    );
    assert_error_codes(
        &c.errors(&model),
        &[ErrorCode::BadUnresolvedEntityType, ErrorCode::BadUnresolvedEntityType],
    );
}

#[test]
fn test_unresolved_import_members() {
    let model = Model::new(CsdlDocument::new().with_schema(
        CsdlSchema::new("NS").with_container(
            CsdlEntityContainer::new("C")
                .with_import(CsdlOperationImport::action("Run", "NS.Run").with_entity_set("Missing")),
        ),
    ));
    let run = container(&model, "NS.C").find_operation_imports(&model, "Run")[0];
    assert!(run.operation(&model).is_unresolved());
    assert!(run.parameters(&model).is_empty());
    assert_error_codes(
        &model.errors(),
        &[ErrorCode::BadUnresolvedOperation, ErrorCode::BadUnresolvedEntitySet],
    );
}

#[test]
fn test_sales_container_members() {
    let model = sales_model();
    let service = container(&model, "S.Service");
    assert_eq!(service.full_name(&model), "Sales.Service");
    assert_eq!(service.entity_sets(&model).len(), 2);
    assert_eq!(service.singletons(&model).len(), 1);

    let customer = structured(&model, "Sales.Customer");
    for source in ["Customers", "Me"] {
        let source = service.find_navigation_source(&model, source).unwrap();
        assert_eq!(source.entity_type(&model), Resolution::Resolved(customer));
    }
}
