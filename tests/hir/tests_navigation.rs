//! Navigation partners, referential constraints and set bindings.

use crate::helpers::error_assertions::*;
use crate::helpers::model_fixtures::*;
use csdl::hir::{
    ErrorCode, HasErrors, Model, ModelOptions, NavigationSource, PlaceholderKind, PropertyId,
    Resolution,
};
use csdl::syntax::{
    CsdlDocument, CsdlEntityContainer, CsdlEntitySet, CsdlNavigationProperty, CsdlProperty,
    CsdlSchema, CsdlStructuredType,
};

fn navigation(model: &Model, ty: &str, name: &str) -> PropertyId {
    structured(model, ty)
        .find_property(model, name)
        .unwrap_or_else(|| panic!("'{ty}' should declare '{name}'"))
}

#[test]
fn test_explicit_partner_and_reciprocal_search_agree() {
    let model = sales_model();
    let orders = navigation(&model, "Sales.Customer", "Orders");
    let customer = navigation(&model, "Sales.Order", "Customer");

    assert_eq!(orders.partner(&model), Some(Resolution::Resolved(customer)));
    assert_eq!(customer.partner(&model), Some(Resolution::Resolved(orders)));
}

#[test]
fn test_reciprocal_search_disabled() {
    let model = Model::with_options(
        sales_document(),
        ModelOptions::default().with_reciprocal_partner_search(false),
    );
    let orders = navigation(&model, "Sales.Customer", "Orders");
    let customer = navigation(&model, "Sales.Order", "Customer");

    assert_eq!(orders.partner(&model), Some(Resolution::Resolved(customer)));
    assert_eq!(customer.partner(&model), None);
    assert_no_errors(&model.errors());
}

#[test]
fn test_inherited_navigation_is_visible_on_derived_type() {
    let model = sales_model();
    let vip = structured(&model, "Sales.VipCustomer");
    let orders = navigation(&model, "Sales.Customer", "Orders");
    assert_eq!(vip.find_property(&model, "Orders"), Some(orders));
    assert_eq!(vip.navigation_properties(&model), vec![orders]);
}

#[test]
fn test_many_partnered_navigation_properties() {
    const COUNT: usize = 40;
    let mut hub = CsdlStructuredType::entity("Hub");
    let mut schema = CsdlSchema::new("NS");
    for i in 0..COUNT {
        hub = hub.with_navigation(CsdlNavigationProperty::new(
            format!("Spoke{i}"),
            format!("Collection(NS.Spoke{i})"),
        ));
        schema = schema.with_type(
            CsdlStructuredType::entity(format!("Spoke{i}")).with_navigation(
                CsdlNavigationProperty::new("Hub", "NS.Hub").with_partner(format!("Spoke{i}")),
            ),
        );
    }
    let model = Model::new(CsdlDocument::new().with_schema(schema.with_type(hub)));

    for i in 0..COUNT {
        let outgoing = navigation(&model, "NS.Hub", &format!("Spoke{i}"));
        let back = navigation(&model, &format!("NS.Spoke{i}"), "Hub");
        assert_eq!(back.partner(&model), Some(Resolution::Resolved(outgoing)));
        assert_eq!(outgoing.partner(&model), Some(Resolution::Resolved(back)));
    }
    assert_no_errors(&model.errors());
}

#[test]
fn test_partner_path_through_type_cast() {
    let document = CsdlDocument::new().with_schema(
        CsdlSchema::new("NS")
            .with_type(
                CsdlStructuredType::entity("Person").with_navigation(
                    CsdlNavigationProperty::new("Pets", "Collection(NS.Animal)")
                        .with_partner("NS.Dog/Owner"),
                ),
            )
            .with_type(CsdlStructuredType::entity("Animal"))
            .with_type(
                CsdlStructuredType::entity("Dog")
                    .with_base_type("NS.Animal")
                    .with_navigation(CsdlNavigationProperty::new("Owner", "NS.Person")),
            ),
    );
    let model = Model::new(document);
    let pets = navigation(&model, "NS.Person", "Pets");
    let owner = navigation(&model, "NS.Dog", "Owner");
    assert_eq!(pets.partner(&model), Some(Resolution::Resolved(owner)));
}

#[test]
fn test_unresolved_partner() {
    let document = CsdlDocument::new().with_schema(
        CsdlSchema::new("NS")
            .with_type(
                CsdlStructuredType::entity("A").with_navigation(
                    CsdlNavigationProperty::new("B", "NS.B").with_partner("Missing"),
                ),
            )
            .with_type(
                CsdlStructuredType::entity("B")
                    .with_property(CsdlProperty::new("Plain", "Edm.String")),
            ),
    );
    let model = Model::new(document);
    let b = navigation(&model, "NS.A", "B");

    let partner = b.partner(&model).expect("explicit partner");
    assert_eq!(
        partner.placeholder().map(|p| p.kind()),
        Some(PlaceholderKind::NavigationPropertyPath)
    );
    assert_error_codes(
        &model.errors(),
        &[ErrorCode::BadUnresolvedNavigationPropertyPath],
    );
}

#[test]
fn test_structural_partner_is_rejected() {
    let document = CsdlDocument::new().with_schema(
        CsdlSchema::new("NS")
            .with_type(
                CsdlStructuredType::entity("A").with_navigation(
                    CsdlNavigationProperty::new("B", "NS.B").with_partner("Plain"),
                ),
            )
            .with_type(
                CsdlStructuredType::entity("B")
                    .with_property(CsdlProperty::new("Plain", "Edm.String")),
            ),
    );
    let model = Model::new(document);
    let b = navigation(&model, "NS.A", "B");
    assert!(b.partner(&model).is_some_and(|partner| partner.is_unresolved()));
}

#[test]
fn test_nullable_on_collection_navigation() {
    let document = CsdlDocument::new().with_schema(
        CsdlSchema::new("NS").with_type(CsdlStructuredType::entity("Node").with_navigation(
            CsdlNavigationProperty::new("Children", "Collection(NS.Node)").with_nullable(false),
        )),
    );
    let model = Model::new(document);
    let children = navigation(&model, "NS.Node", "Children");

    assert!(children.is_collection(&model));
    assert!(!children.is_nullable(&model));
    assert_error_codes(
        &children.errors(&model),
        &[ErrorCode::NavigationPropertyWithCollectionTypeCannotHaveNullableAttribute],
    );
}

#[test]
fn test_referential_constraints_resolve_both_sides() {
    let model = sales_model();
    let customer = navigation(&model, "Sales.Order", "Customer");
    let constraints = customer.referential_constraints(&model);

    assert_eq!(constraints.len(), 1);
    assert_eq!(
        constraints[0].property,
        Resolution::Resolved(navigation(&model, "Sales.Order", "CustomerId"))
    );
    assert_eq!(
        constraints[0].referenced_property,
        Resolution::Resolved(navigation(&model, "Sales.Customer", "Id"))
    );
    assert!(!customer.is_nullable(&model));
}

#[test]
fn test_bad_referential_constraint() {
    let document = CsdlDocument::new().with_schema(
        CsdlSchema::new("NS")
            .with_type(CsdlStructuredType::entity("Principal"))
            .with_type(CsdlStructuredType::entity("Dependent").with_navigation(
                CsdlNavigationProperty::new("Principal", "NS.Principal")
                    .with_constraint("PrincipalId", "Id"),
            )),
    );
    let model = Model::new(document);
    assert_error_codes(
        &model.errors(),
        &[ErrorCode::BadUnresolvedProperty, ErrorCode::BadUnresolvedProperty],
    );
}

#[test]
fn test_set_bindings_resolve_sources() {
    let model = sales_model();
    let container = model.find_entity_container("Sales.Service").into_resolved().unwrap();
    let customers = container.find_entity_set(&model, "Customers").unwrap();
    let orders = container.find_entity_set(&model, "Orders").unwrap();
    let me = container.find_singleton(&model, "Me").unwrap();

    assert_eq!(
        customers.find_navigation_target(&model, "Orders"),
        Some(Resolution::Resolved(NavigationSource::EntitySet(orders)))
    );
    // Qualified container path.
    assert_eq!(
        orders.find_navigation_target(&model, "Customer"),
        Some(Resolution::Resolved(NavigationSource::EntitySet(customers)))
    );
    let bindings = me.navigation_property_bindings(&model);
    assert_eq!(bindings.len(), 1);
    assert_eq!(
        bindings[0].navigation_property,
        Resolution::Resolved(navigation(&model, "Sales.Customer", "Orders"))
    );
    assert_eq!(customers.find_navigation_target(&model, "Nope"), None);
}

#[test]
fn test_unresolved_binding_target_and_path() {
    let document = CsdlDocument::new().with_schema(
        CsdlSchema::new("NS")
            .with_type(
                CsdlStructuredType::entity("Item")
                    .with_navigation(CsdlNavigationProperty::new("Next", "NS.Item")),
            )
            .with_container(
                CsdlEntityContainer::new("C").with_entity_set(
                    CsdlEntitySet::new("Items", "NS.Item")
                        .with_binding("Next", "Elsewhere")
                        .with_binding("Prev", "Items"),
                ),
            ),
    );
    let model = Model::new(document);
    assert_error_codes(
        &model.errors(),
        &[
            ErrorCode::BadUnresolvedEntitySet,
            ErrorCode::BadUnresolvedNavigationPropertyPath,
        ],
    );
}
